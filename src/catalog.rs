use crate::error::{AppError, AppResult};
use log::warn;
use serde::{Deserialize, Serialize};

/// The list compiled into the binary, used when no `--apps` file is given.
const BUILTIN_APPS: &str = include_str!("../apps.yaml");

/// An Android app to look up: package name plus the name users know it by.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct AppRecord {
    pub package: String,
    pub name: String,
}

impl AppRecord {
    pub fn new(package: &str, name: &str) -> Self {
        AppRecord {
            package: package.to_string(),
            name: name.to_string(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Catalog {
    pub apps: Vec<AppRecord>,
}

impl Catalog {
    pub fn from_file(path: &str) -> AppResult<Self> {
        let file = std::fs::File::open(path).map_err(AppError::Io)?;
        let catalog: Catalog = serde_yaml::from_reader(file).map_err(AppError::Yaml)?;
        if catalog.is_empty() {
            warn!("App list '{}' contains no apps", path);
        }
        Ok(catalog)
    }

    pub fn builtin() -> AppResult<Self> {
        Ok(serde_yaml::from_str(BUILTIN_APPS)?)
    }

    /// Loads `path` when given, otherwise the built-in list.
    pub fn load(path: Option<&str>) -> AppResult<Self> {
        match path {
            Some(path) => Self::from_file(path),
            None => Self::builtin(),
        }
    }

    pub fn len(&self) -> usize {
        self.apps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.apps.is_empty()
    }
}
