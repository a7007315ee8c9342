use crate::catalog::AppRecord;
use crate::gemini::TextGenerator;
use crate::report::ResultSet;
use crate::url::direct_url;
use colored::*;
use log::{debug, info, warn};
use regex::Regex;
use std::io::Write;
use std::time::Duration;

pub const DEFAULT_DELAY: Duration = Duration::from_millis(500);

const SLUG_PATTERN: &str = r"^[a-z0-9-]+/[a-z0-9-]+$";
const UNKNOWN: &str = "UNKNOWN";

/// What came back for a single app.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    /// A validated `publisher/app` slug.
    Resolved(String),
    /// The model answered, but not with a usable slug.
    Rejected { response: String },
    /// No answer at all: transport, auth or decoding error.
    Failed { reason: String },
}

impl Resolution {
    pub fn slug(&self) -> Option<&str> {
        match self {
            Resolution::Resolved(slug) => Some(slug),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MappingResult {
    pub record: AppRecord,
    pub outcome: Resolution,
}

pub fn build_prompt(package: &str, name: &str) -> String {
    format!(
        r#"You are an expert on APKMirror website URL structure.

APKMirror uses this URL format: https://www.apkmirror.com/apk/[publisher-slug]/[app-slug]/

Given the app information below, provide ONLY the "publisher-slug/app-slug" part.
Do NOT include the full URL, just the path segment.

App Name: {name}
Package Name: {package}

Rules:
- Publisher slug is usually the company name in lowercase with hyphens (e.g., "google-inc", "facebook-2", "whatsapp-inc")
- App slug is the app name in lowercase with hyphens (e.g., "whatsapp-messenger", "instagram", "youtube")
- Some publishers have numbers (e.g., facebook-2)
- Return ONLY the path like: publisher-slug/app-slug
- If you're not sure, return "UNKNOWN"

Response (just the path, nothing else):"#
    )
}

/// Checks raw model output against the `publisher/app` slug shape.
pub struct SlugValidator {
    pattern: Regex,
}

impl Default for SlugValidator {
    fn default() -> Self {
        Self::new()
    }
}

impl SlugValidator {
    pub fn new() -> Self {
        SlugValidator {
            pattern: Regex::new(SLUG_PATTERN).expect("Invalid slug regex"),
        }
    }

    /// Returns the normalized slug, or `None` if the text is anything but a bare slug.
    pub fn validate(&self, raw: &str) -> Option<String> {
        let text = raw.trim();
        if !text.contains('/') || text == UNKNOWN || text.split('/').count() != 2 {
            return None;
        }
        let unquoted = text.replace(['"', '\''], "");
        let unquoted = unquoted.trim();
        if self.pattern.is_match(unquoted) {
            Some(unquoted.to_string())
        } else {
            None
        }
    }
}

///
/// Asks a text generator for the APKMirror slug of each app, one request at a time.
///
pub struct Resolver<G> {
    generator: G,
    validator: SlugValidator,
    /// Pause after every request, successful or not.
    delay: Duration,
}

impl<G: TextGenerator> Resolver<G> {
    pub fn new(generator: G, delay: Duration) -> Self {
        Resolver {
            generator,
            validator: SlugValidator::new(),
            delay,
        }
    }

    /// One request for one app. Never fails; errors become `Resolution::Failed`.
    pub async fn resolve(&self, record: &AppRecord) -> Resolution {
        let prompt = build_prompt(&record.package, &record.name);
        debug!("Prompt for {}:\n{}", record.package, prompt);

        let outcome = match self.generator.generate(&prompt).await {
            Ok(response) => match self.validator.validate(&response) {
                Some(slug) => Resolution::Resolved(slug),
                None => {
                    warn!(
                        "Rejected response for {}: {:?}",
                        record.package,
                        response.trim()
                    );
                    Resolution::Rejected { response }
                }
            },
            Err(e) => {
                warn!("Gemini request for {} failed: {}", record.package, e);
                Resolution::Failed {
                    reason: e.to_string(),
                }
            }
        };

        tokio::time::sleep(self.delay).await;
        outcome
    }

    /// Resolves every app in order, printing a progress line per app.
    pub async fn resolve_all(&self, apps: &[AppRecord]) -> Vec<MappingResult> {
        let total = apps.len();
        info!("Resolving {} apps", total);
        let mut results = Vec::with_capacity(total);
        for (i, record) in apps.iter().enumerate() {
            print!("[{}/{}] {} ({})... ", i + 1, total, record.name, record.package);
            if let Err(e) = std::io::stdout().flush() {
                debug!("Could not flush progress line: {}", e);
            }
            let outcome = self.resolve(record).await;
            match &outcome {
                Resolution::Resolved(slug) => {
                    println!(
                        "{} {} {}",
                        "✅".green(),
                        slug.green(),
                        direct_url(slug).dimmed()
                    );
                }
                Resolution::Rejected { .. } => println!("{}", "❌ not found".red()),
                Resolution::Failed { .. } => println!("{}", "❌ request failed".red()),
            }
            results.push(MappingResult {
                record: record.clone(),
                outcome,
            });
        }
        results
    }

    /// `resolve_all` folded into succeeded and failed partitions.
    pub async fn run(&self, apps: &[AppRecord]) -> ResultSet {
        ResultSet::from_results(self.resolve_all(apps).await)
    }
}
