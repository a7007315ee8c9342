use apkmirror_mapper::error::AppError;
use apkmirror_mapper::gemini::{DEFAULT_MODEL, GEMINI_API_BASE_URL};
use apkmirror_mapper::report::DEFAULT_OUTPUT_FILE;
use apkmirror_mapper::resolver::DEFAULT_DELAY;
use apkmirror_mapper::{api_key_help, run, Settings};
use clap::Parser;
use log::error;
use std::path::PathBuf;
use std::process;
use std::time::Duration;

#[derive(Parser, Debug)]
#[command(
    version,
    about = "Guess APKMirror publisher/app slugs for Android packages with Gemini"
)]
struct Args {
    /// Gemini API key
    #[arg(long, env = "GEMINI_API_KEY", hide_env_values = true)]
    api_key: Option<String>,

    /// YAML file listing the apps to resolve (defaults to the built-in list)
    #[arg(long)]
    apps: Option<String>,

    /// Where to write the JSON mapping
    #[arg(short, long, default_value = DEFAULT_OUTPUT_FILE)]
    output: PathBuf,

    /// Gemini model name
    #[arg(long, env = "GEMINI_MODEL", default_value = DEFAULT_MODEL)]
    model: String,

    /// Gemini API base URL
    #[arg(long, env = "GEMINI_BASE_URL", default_value = GEMINI_API_BASE_URL)]
    base_url: String,

    /// Pause after each request, in milliseconds
    #[arg(long, default_value_t = DEFAULT_DELAY.as_millis() as u64)]
    delay_ms: u64,

    /// Per-request timeout, in seconds
    #[arg(long, default_value_t = 30)]
    timeout_secs: u64,
}

impl From<Args> for Settings {
    fn from(args: Args) -> Self {
        Settings {
            api_key: args.api_key,
            apps: args.apps,
            output: args.output,
            model: args.model,
            base_url: args.base_url,
            delay: Duration::from_millis(args.delay_ms),
            timeout: Duration::from_secs(args.timeout_secs),
        }
    }
}

#[tokio::main]
async fn main() {
    env_logger::init();
    let settings = Settings::from(Args::parse());
    if let Err(e) = run(&settings).await {
        match e {
            AppError::MissingApiKey => eprintln!("{}", api_key_help()),
            e => error!("Application error: {}", e),
        }
        process::exit(1);
    }
}
