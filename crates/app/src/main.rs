mod demo;

use std::fmt;
use std::sync::Arc;

use dioxus::LaunchBuilder;
use dioxus::desktop::{Config as DesktopConfig, WindowBuilder};
use tracing_subscriber::EnvFilter;

use assess_core::model::TestId;
use backend::BackendConfig;
use services::{AppServices, AttemptService, Clock};
use ui::{App, UiApp, build_app_context};

#[derive(Debug)]
enum ArgsError {
    MissingValue { flag: &'static str },
    UnknownArg(String),
    InvalidTestId { raw: String },
    InvalidApiUrl { raw: String },
}

impl fmt::Display for ArgsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArgsError::MissingValue { flag } => write!(f, "{flag} requires a value"),
            ArgsError::UnknownArg(arg) => write!(f, "unknown argument: {arg}"),
            ArgsError::InvalidTestId { raw } => write!(f, "invalid --test-id value: {raw}"),
            ArgsError::InvalidApiUrl { raw } => write!(f, "invalid --api-url value: {raw}"),
        }
    }
}

impl std::error::Error for ArgsError {}

fn require_value(
    args: &mut impl Iterator<Item = String>,
    flag: &'static str,
) -> Result<String, ArgsError> {
    args.next().ok_or(ArgsError::MissingValue { flag })
}

struct DesktopApp {
    services: AppServices,
    launch_test_id: Option<TestId>,
}

impl UiApp for DesktopApp {
    fn attempts(&self) -> Arc<AttemptService> {
        self.services.attempts()
    }

    fn backend_label(&self) -> String {
        self.services.backend_label().to_string()
    }

    fn launch_test_id(&self) -> Option<TestId> {
        self.launch_test_id
    }
}

#[derive(Debug, Default)]
struct Args {
    api_url: Option<String>,
    token: Option<String>,
    test_id: Option<TestId>,
    demo: bool,
}

fn print_usage() {
    eprintln!("Usage:");
    eprintln!("  cargo run -p app -- [--api-url <url>] [--token <token>] [--test-id <id>]");
    eprintln!("  cargo run -p app -- --demo [--test-id <id>]");
    eprintln!();
    eprintln!("Defaults:");
    eprintln!("  --api-url http://localhost:8080/api");
    eprintln!();
    eprintln!("Environment:");
    eprintln!("  ASSESS_API_BASE_URL, ASSESS_API_TOKEN, ASSESS_HTTP_TIMEOUT_SECS, RUST_LOG");
}

impl Args {
    /// Returns `Ok(None)` when usage was requested.
    fn parse(args: &mut impl Iterator<Item = String>) -> Result<Option<Self>, ArgsError> {
        let mut parsed = Self::default();

        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--api-url" => {
                    let value = require_value(args, "--api-url")?;
                    if value.trim().is_empty() {
                        return Err(ArgsError::InvalidApiUrl { raw: value });
                    }
                    parsed.api_url = Some(value);
                }
                "--token" => parsed.token = Some(require_value(args, "--token")?),
                "--test-id" => {
                    let value = require_value(args, "--test-id")?;
                    let test_id: TestId = value
                        .parse()
                        .map_err(|_| ArgsError::InvalidTestId { raw: value.clone() })?;
                    parsed.test_id = Some(test_id);
                }
                "--demo" => parsed.demo = true,
                "--help" | "-h" => return Ok(None),
                _ => return Err(ArgsError::UnknownArg(arg)),
            }
        }

        Ok(Some(parsed))
    }

    /// Env settings first, flags on top.
    fn backend_config(&self) -> Result<BackendConfig, Box<dyn std::error::Error>> {
        let mut config = match &self.api_url {
            Some(url) => {
                let config = BackendConfig::new(url)
                    .map_err(|_| ArgsError::InvalidApiUrl { raw: url.clone() })?;
                match std::env::var("ASSESS_API_TOKEN") {
                    Ok(token) => config.with_token(token),
                    Err(_) => config,
                }
            }
            None => BackendConfig::from_env()?,
        };
        if let Some(token) = &self.token {
            config = config.with_token(token.clone());
        }
        Ok(config)
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
}

fn build_services(args: &Args, clock: Clock) -> Result<AppServices, Box<dyn std::error::Error>> {
    if args.demo {
        return Ok(AppServices::new_in_memory(demo::seeded_backend()?, clock));
    }
    Ok(AppServices::new_http(args.backend_config()?, clock)?)
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let mut argv = std::env::args().skip(1);
    let Some(args) = Args::parse(&mut argv).map_err(|e| {
        eprintln!("{e}");
        print_usage();
        e
    })?
    else {
        print_usage();
        return Ok(());
    };

    init_tracing();

    let services = build_services(&args, Clock::default())?;
    let launch_test_id = match (args.test_id, args.demo) {
        (Some(test_id), _) => Some(test_id),
        (None, true) => Some(TestId::new(demo::DEMO_TEST_ID)),
        (None, false) => None,
    };
    tracing::info!(
        backend = services.backend_label(),
        launch_test_id = ?launch_test_id,
        "starting assessment app"
    );

    let app: Arc<dyn UiApp> = Arc::new(DesktopApp {
        services,
        launch_test_id,
    });
    let context = build_app_context(&app);

    // On macOS, Dioxus/tao can default to an always-on-top window in some dev setups.
    let desktop_cfg = DesktopConfig::new().with_window(
        WindowBuilder::new()
            .with_title("Assessments")
            .with_always_on_top(false),
    );

    LaunchBuilder::desktop()
        .with_cfg(desktop_cfg)
        .with_context(context)
        .launch(App);
    Ok(())
}

#[tokio::main]
async fn main() {
    if let Err(err) = run().await {
        eprintln!("{err}");
        std::process::exit(2);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Result<Option<Args>, ArgsError> {
        Args::parse(&mut args.iter().map(|s| (*s).to_string()))
    }

    #[test]
    fn parses_flags() {
        let args = parse(&["--api-url", "https://exams.test/api", "--token", "t", "--test-id", "9"])
            .unwrap()
            .unwrap();
        assert_eq!(args.api_url.as_deref(), Some("https://exams.test/api"));
        assert_eq!(args.token.as_deref(), Some("t"));
        assert_eq!(args.test_id, Some(TestId::new(9)));
        assert!(!args.demo);

        let config = args.backend_config().unwrap();
        assert_eq!(config.base_url.as_str(), "https://exams.test/api");
        assert_eq!(config.api_token.as_deref(), Some("t"));
    }

    #[test]
    fn help_short_circuits() {
        assert!(parse(&["--demo", "--help"]).unwrap().is_none());
    }

    #[test]
    fn rejects_bad_input() {
        assert!(matches!(
            parse(&["--test-id", "abc"]),
            Err(ArgsError::InvalidTestId { .. })
        ));
        assert!(matches!(
            parse(&["--token"]),
            Err(ArgsError::MissingValue { flag: "--token" })
        ));
        assert!(matches!(parse(&["--verbose"]), Err(ArgsError::UnknownArg(_))));

        let args = parse(&["--api-url", "ftp://exams.test"]).unwrap().unwrap();
        assert!(args.backend_config().is_err());
    }

    #[test]
    fn demo_backend_holds_the_demo_test() {
        let backend = demo::seeded_backend().unwrap();
        assert!(backend.submissions().unwrap().is_empty());
    }
}
