/*!
    Result reporting.

    Splits resolver outcomes into succeeded and failed apps, renders the succeeded ones as Kotlin
    map entries and as a JSON file, and prints the end-of-run summary.
*/

use crate::catalog::AppRecord;
use crate::error::AppResult;
use crate::resolver::{MappingResult, Resolution};
use crate::url::search_url;
use colored::*;
use log::{info, warn};
use similar::{ChangeTag, TextDiff};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

pub const DEFAULT_OUTPUT_FILE: &str = "apkmirror_new_mappings.json";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FailedApp {
    pub record: AppRecord,
    pub reason: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResultSet {
    pub succeeded: Vec<(AppRecord, String)>,
    pub failed: Vec<FailedApp>,
}

impl ResultSet {
    /// Partitions outcomes, keeping input order inside each side.
    pub fn from_results(results: Vec<MappingResult>) -> Self {
        results
            .into_iter()
            .fold(ResultSet::default(), |mut set, MappingResult { record, outcome }| {
                match outcome {
                    Resolution::Resolved(slug) => set.succeeded.push((record, slug)),
                    Resolution::Rejected { response } => set.failed.push(FailedApp {
                        record,
                        reason: format!("unusable answer {:?}", response.trim()),
                    }),
                    Resolution::Failed { reason } => set.failed.push(FailedApp { record, reason }),
                }
                set
            })
    }

    pub fn total(&self) -> usize {
        self.succeeded.len() + self.failed.len()
    }

    /// Package to slug. A package listed more than once keeps its last slug.
    pub fn mappings(&self) -> BTreeMap<&str, &str> {
        self.succeeded
            .iter()
            .map(|(record, slug)| (record.package.as_str(), slug.as_str()))
            .collect()
    }

    /// Kotlin `"package" to "slug",` lines, sorted by package.
    pub fn render_kotlin_snippet(&self) -> String {
        self.mappings()
            .into_iter()
            .map(|(package, slug)| format!("        \"{}\" to \"{}\",", package, slug))
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// The JSON file body: a flat object, two-space indented.
    pub fn to_json(&self) -> AppResult<String> {
        Ok(serde_json::to_string_pretty(&self.mappings())?)
    }

    /// Overwrites `path` with the succeeded mappings.
    pub fn write_json(&self, path: &Path) -> AppResult<()> {
        let json = self.to_json()?;
        fs::write(path, json)?;
        info!(
            "Wrote {} mappings to {}",
            self.mappings().len(),
            path.display()
        );
        Ok(())
    }

    pub fn print_summary(&self) {
        let rule = "=".repeat(60);
        println!("\n{}", rule);
        println!("📊 RESULTS");
        println!("{}", rule);
        println!("{} Succeeded: {}", "✅".green(), self.succeeded.len());
        println!("{} Failed: {}", "❌".red(), self.failed.len());

        if !self.succeeded.is_empty() {
            println!("\n{}", rule);
            println!("📋 Kotlin code (add to APKMirrorUrlHelper.kt)");
            println!("{}", rule);
            println!("\n// Mappings generated with Gemini");
            println!("{}", self.render_kotlin_snippet());
        }

        if !self.failed.is_empty() {
            println!("\n{}", rule);
            println!("⚠️  Failed apps (need manual lookup)");
            println!("{}", rule);
            for failed in &self.failed {
                println!(
                    "  - {} ({}): {}",
                    failed.record.name,
                    failed.record.package,
                    failed.reason.dimmed()
                );
                println!("    {}", search_url(&failed.record.package).dimmed());
            }
        }
    }
}

/// Diff between the file currently at `path` and `new_content`.
///
/// Returns `None` when there is no previous file, or it cannot be read.
/// An empty string means the content is unchanged.
pub fn preview_changes(path: &Path, new_content: &str) -> Option<String> {
    let old_content = match fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return None,
        Err(e) => {
            warn!("Could not read previous {}: {}", path.display(), e);
            return None;
        }
    };

    let diff = TextDiff::from_lines(old_content.as_str(), new_content);
    let mut unified_diff = diff.unified_diff();
    let unified_diff_builder = unified_diff
        .context_radius(3)
        .header("previous", "new");

    let mut output_buffer = String::new();
    for hunk in unified_diff_builder.iter_hunks() {
        output_buffer.push_str(&format!("{}\n", hunk.header()));
        for change in hunk.iter_changes() {
            let line = change.value().trim_end();
            match change.tag() {
                ChangeTag::Delete => {
                    output_buffer.push_str(&format!("{}\n", format!("- {}", line).red()))
                }
                ChangeTag::Insert => {
                    output_buffer.push_str(&format!("{}\n", format!("+ {}", line).green()))
                }
                ChangeTag::Equal => output_buffer.push_str(&format!("  {}\n", line)),
            }
        }
    }
    Some(output_buffer)
}
