pub mod catalog;
pub mod error;
pub mod gemini;
pub mod report;
pub mod resolver;
pub mod url;

use catalog::Catalog;
use error::{AppError, AppResult};
use gemini::GeminiClient;
use log::info;
use report::{preview_changes, ResultSet};
use resolver::Resolver;
use std::path::PathBuf;
use std::time::Duration;

/// Everything a run needs, resolved from flags and environment.
#[derive(Debug, Clone)]
pub struct Settings {
    pub api_key: Option<String>,
    /// YAML app list; the built-in list when `None`.
    pub apps: Option<String>,
    pub output: PathBuf,
    pub model: String,
    pub base_url: String,
    pub delay: Duration,
    pub timeout: Duration,
}

/// What to tell the user when no API key was supplied.
pub fn api_key_help() -> String {
    [
        "",
        "❌ The GEMINI_API_KEY environment variable is not set!",
        "",
        "Usage:",
        "  1. Get a Gemini API key:",
        "     https://aistudio.google.com/app/apikey",
        "",
        "  2. Set the environment variable:",
        "     export GEMINI_API_KEY='your-api-key-here'",
        "",
        "  3. Run the tool again:",
        "     apkmirror-mapper",
    ]
    .join("\n")
}

/// Resolves every app, prints the report and writes the JSON file.
///
/// Fails before any request when the API key is missing or the app list cannot be loaded.
pub async fn run(settings: &Settings) -> AppResult<ResultSet> {
    let api_key = settings
        .api_key
        .as_deref()
        .map(str::trim)
        .filter(|key| !key.is_empty())
        .ok_or(AppError::MissingApiKey)?;

    let catalog = Catalog::load(settings.apps.as_deref())?;
    let client = GeminiClient::with_base_url(
        api_key,
        &settings.model,
        &settings.base_url,
        settings.timeout,
    )?;
    info!(
        "Loaded {} apps, querying model {}",
        catalog.len(),
        settings.model
    );

    let rule = "=".repeat(60);
    println!("{}", rule);
    println!("🚀 APKMirror URL Mapping Generator");
    println!("{}", rule);
    println!("\n📱 Generating mappings for {} apps...\n", catalog.len());

    let resolver = Resolver::new(client, settings.delay);
    let results = resolver.run(&catalog.apps).await;
    results.print_summary();

    let json = results.to_json()?;
    match preview_changes(&settings.output, &json) {
        Some(diff) if diff.is_empty() => {
            println!("\nNo changes against the existing {}.", settings.output.display())
        }
        Some(diff) => {
            println!("\nChanges against the existing {}:", settings.output.display());
            print!("{}", diff);
        }
        None => {}
    }
    results.write_json(&settings.output)?;
    println!(
        "\n💾 Mappings saved to '{}'.",
        settings.output.display()
    );
    Ok(results)
}
