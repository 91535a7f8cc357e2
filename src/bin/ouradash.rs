//! ouradash CLI - command-line front end for the dashboard core
//!
//! Commands:
//! - render: Build one tab from a saved upload payload
//! - summary: Print headline statistics for a saved upload payload
//! - upload: Send CSV exports to the backend and optionally save the payload
//! - chat: Ask the backend a question about a saved upload payload
//! - doctor: Diagnose configuration and backend reachability

use clap::{Parser, Subcommand, ValueEnum};
use std::fs;
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use oura_dash::client::{BackendSession, HttpBackend, UploadFile};
use oura_dash::dashboard::{NotificationKind, RecordingSink};
use oura_dash::{
    ChartClick, Dashboard, DashboardConfig, DashboardError, Interaction, RecordStore, StoreOverview, Tab,
    TabState, UploadResponse, Window, DASHBOARD_VERSION, PRODUCER_NAME,
};

/// ouradash - health dashboard views from wearable exports
#[derive(Parser)]
#[command(name = "ouradash")]
#[command(version = DASHBOARD_VERSION)]
#[command(about = "Build dashboard views from wearable export data", long_about = None)]
struct Cli {
    /// Backend base URL (overrides OURA_DASH_BACKEND_URL)
    #[arg(long, global = true)]
    backend_url: Option<String>,

    /// Request timeout in seconds (overrides OURA_DASH_TIMEOUT_SECS)
    #[arg(long, global = true)]
    timeout: Option<u64>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Build one tab from a saved upload payload
    Render {
        /// Upload payload JSON (use - for stdin)
        #[arg(short, long)]
        input: PathBuf,

        /// Tab to build
        #[arg(short, long, default_value = "sleep")]
        tab: String,

        /// Time window: a number of days or "all"
        #[arg(short, long)]
        window: Option<String>,

        /// Open the detail view for this day (YYYY-MM-DD)
        #[arg(long)]
        select: Option<String>,

        /// Output file path (use - for stdout)
        #[arg(short, long, default_value = "-")]
        output: PathBuf,

        /// Output format
        #[arg(long, default_value = "json")]
        format: RenderFormat,
    },

    /// Print headline statistics for a saved upload payload
    Summary {
        /// Upload payload JSON (use - for stdin)
        #[arg(short, long)]
        input: PathBuf,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Send CSV exports to the backend
    Upload {
        /// Export files to send
        #[arg(required = true)]
        files: Vec<PathBuf>,

        /// Save the returned payload to this path
        #[arg(long)]
        save: Option<PathBuf>,
    },

    /// Ask the backend about a saved upload payload
    Chat {
        /// Upload payload JSON (use - for stdin)
        #[arg(short, long)]
        input: PathBuf,

        /// Question to ask
        message: String,
    },

    /// Diagnose configuration and backend reachability
    Doctor {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

#[derive(Clone, ValueEnum)]
enum RenderFormat {
    /// Fragment, charts and state as pretty JSON
    Json,
    /// The HTML fragment only
    Html,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    init_logging();
    let cli = Cli::parse();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!(
                "{}",
                serde_json::to_string(&CliError::from(e)).unwrap_or_else(|_| "Unknown error".to_string())
            );
            ExitCode::FAILURE
        }
    }
}

fn init_logging() {
    // `OURA_DASH_LOG_LEVEL`, then `RUST_LOG`, default `info`
    let log_env = std::env::var("OURA_DASH_LOG_LEVEL")
        .or_else(|_| std::env::var("RUST_LOG"))
        .unwrap_or_else(|_| "info".to_string());
    let env_filter = tracing_subscriber::EnvFilter::try_new(&log_env)
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .compact()
        .with_writer(io::stderr)
        .with_ansi(atty::is(atty::Stream::Stderr))
        .with_target(false)
        .with_env_filter(env_filter)
        .init();
}

fn load_config(cli: &Cli) -> Result<DashboardConfig, OuraCliError> {
    let mut config = DashboardConfig::from_env()?;
    if let Some(url) = &cli.backend_url {
        config.backend_url = url.clone();
    }
    if let Some(secs) = cli.timeout {
        config.request_timeout = std::time::Duration::from_secs(secs);
    }
    Ok(config)
}

async fn run(cli: Cli) -> Result<(), OuraCliError> {
    let config = load_config(&cli);
    match cli.command {
        Commands::Render {
            input,
            tab,
            window,
            select,
            output,
            format,
        } => cmd_render(&config?, &input, &tab, window.as_deref(), select.as_deref(), &output, format),
        Commands::Summary { input, json } => cmd_summary(&input, json),
        Commands::Upload { files, save } => cmd_upload(&config?, files, save.as_deref()).await,
        Commands::Chat { input, message } => cmd_chat(&config?, &input, &message).await,
        Commands::Doctor { json } => cmd_doctor(config, json).await,
    }
}

fn cmd_render(
    config: &DashboardConfig,
    input: &Path,
    tab: &str,
    window: Option<&str>,
    select: Option<&str>,
    output: &Path,
    format: RenderFormat,
) -> Result<(), OuraCliError> {
    let tab: Tab = tab.parse()?;
    let window = window.map(str::parse::<Window>).transpose()?;
    let store = read_store(input)?;

    let mut dashboard = Dashboard::with_store(store, config);
    let mut sink = RecordingSink::new();
    dashboard.handle(Interaction::SwitchTab(tab), &mut sink);
    if let Some(window) = window {
        dashboard.handle(Interaction::ChangeWindow(window), &mut sink);
    }
    if let Some(day) = select {
        let mount = tab.detail_chart().ok_or(OuraCliError::NoDetail(tab))?;
        let state = dashboard.handle(Interaction::Select(ChartClick::new(mount, day)), &mut sink);
        if !matches!(state, TabState::Detail(_)) {
            return Err(OuraCliError::NotInWindow(day.to_string()));
        }
    }

    let view = dashboard.view();
    let rendered = match format {
        RenderFormat::Json => serde_json::to_string_pretty(&serde_json::json!({
            "tab": view.tab,
            "container": view.container(),
            "window": dashboard.window(tab).value(),
            "state": dashboard.state(),
            "html": view.html,
            "charts": view.charts,
        }))?,
        RenderFormat::Html => view.html,
    };
    write_output(output, &rendered)
}

fn cmd_summary(input: &Path, json: bool) -> Result<(), OuraCliError> {
    let store = read_store(input)?;
    let overview = StoreOverview::from_store(&store);
    if json {
        println!("{}", serde_json::to_string_pretty(&overview)?);
    } else if overview.is_empty() {
        println!("No recognised health data in payload");
    } else {
        print!("{}", overview.to_text());
    }
    if !json {
        let unknown = store.unrecognised_files();
        if !unknown.is_empty() {
            println!("Kept for chat only: {}", unknown.join(", "));
        }
    }
    Ok(())
}

async fn cmd_upload(config: &DashboardConfig, paths: Vec<PathBuf>, save: Option<&Path>) -> Result<(), OuraCliError> {
    let mut files = Vec::with_capacity(paths.len());
    for path in &paths {
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        let bytes = tokio::fs::read(path).await?;
        files.push(UploadFile::new(name, bytes));
    }

    let session = BackendSession::new(HttpBackend::from_config(config)?);
    let response = session.upload(files).await?;
    if let Some(path) = save {
        fs::write(path, serde_json::to_string_pretty(&response)?)?;
    }

    let mut dashboard = Dashboard::new(config);
    let mut sink = RecordingSink::new();
    let note = dashboard.apply_upload(response, &mut sink);
    if note.kind == NotificationKind::Error {
        return Err(OuraCliError::Dashboard(DashboardError::Upstream(note.message)));
    }
    println!("{}: {}", note.title, note.message);
    if let Some(summary) = dashboard.store().summary() {
        println!("\n{summary}");
    }
    let overview = StoreOverview::from_store(dashboard.store());
    if !overview.is_empty() {
        print!("\n{}", overview.to_text());
    }
    Ok(())
}

async fn cmd_chat(config: &DashboardConfig, input: &Path, message: &str) -> Result<(), OuraCliError> {
    let store = read_store(input)?;
    let session = BackendSession::new(HttpBackend::from_config(config)?);
    let reply = session.chat(&store, message).await?;
    println!("{reply}");
    Ok(())
}

async fn cmd_doctor(config: Result<DashboardConfig, OuraCliError>, json: bool) -> Result<(), OuraCliError> {
    let mut checks: Vec<DoctorCheck> = Vec::new();

    checks.push(DoctorCheck {
        name: "version".to_string(),
        status: CheckStatus::Ok,
        message: format!("{} version {}", PRODUCER_NAME, DASHBOARD_VERSION),
    });

    match config {
        Ok(config) => {
            checks.push(DoctorCheck {
                name: "config".to_string(),
                status: CheckStatus::Ok,
                message: format!(
                    "default window {}, temperature window {}, timeout {}s",
                    config.default_window.label(),
                    config.temperature_window.label(),
                    config.request_timeout.as_secs()
                ),
            });
            checks.push(backend_check(&config).await);
        }
        Err(e) => checks.push(DoctorCheck {
            name: "config".to_string(),
            status: CheckStatus::Error,
            message: CliError::from(e).message,
        }),
    }

    let stdin_check = if atty::is(atty::Stream::Stdin) {
        DoctorCheck {
            name: "stdin".to_string(),
            status: CheckStatus::Ok,
            message: "stdin is a TTY (pass payload files with --input)".to_string(),
        }
    } else {
        DoctorCheck {
            name: "stdin".to_string(),
            status: CheckStatus::Ok,
            message: "stdin is a pipe (--input - will read it)".to_string(),
        }
    };
    checks.push(stdin_check);

    let report = DoctorReport {
        producer: PRODUCER_NAME.to_string(),
        version: DASHBOARD_VERSION.to_string(),
        checks,
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print!("{}", report.to_text());
    }

    if report.has_errors() {
        Err(OuraCliError::DoctorFailed)
    } else {
        Ok(())
    }
}

async fn backend_check(config: &DashboardConfig) -> DoctorCheck {
    let name = "backend".to_string();
    let backend = match HttpBackend::from_config(config) {
        Ok(backend) => backend,
        Err(e) => {
            return DoctorCheck {
                name,
                status: CheckStatus::Error,
                message: format!("Cannot build HTTP client: {e}"),
            }
        }
    };
    match backend.ping().await {
        Ok(status) if status < 500 => DoctorCheck {
            name,
            status: CheckStatus::Ok,
            message: format!("{} answered with status {status}", backend.base_url()),
        },
        Ok(status) => DoctorCheck {
            name,
            status: CheckStatus::Warning,
            message: format!("{} answered with status {status}", backend.base_url()),
        },
        Err(e) => DoctorCheck {
            name,
            status: CheckStatus::Warning,
            message: format!("{} unreachable: {e}", backend.base_url()),
        },
    }
}

fn read_input(input: &Path) -> Result<String, OuraCliError> {
    if input.as_os_str() == "-" {
        let mut buf = String::new();
        io::stdin().read_to_string(&mut buf)?;
        Ok(buf)
    } else {
        Ok(fs::read_to_string(input)?)
    }
}

fn read_store(input: &Path) -> Result<RecordStore, OuraCliError> {
    let response: UploadResponse = serde_json::from_str(&read_input(input)?)?;
    Ok(RecordStore::from_payload(response.into_payload()?))
}

fn write_output(output: &Path, content: &str) -> Result<(), OuraCliError> {
    if output.as_os_str() == "-" {
        let mut stdout = io::stdout().lock();
        stdout.write_all(content.as_bytes())?;
        stdout.write_all(b"\n")?;
        stdout.flush()?;
    } else {
        fs::write(output, content)?;
    }
    Ok(())
}

// Error types

#[derive(Debug)]
enum OuraCliError {
    Io(io::Error),
    Json(serde_json::Error),
    Dashboard(DashboardError),
    NoDetail(Tab),
    NotInWindow(String),
    DoctorFailed,
}

impl From<io::Error> for OuraCliError {
    fn from(e: io::Error) -> Self {
        OuraCliError::Io(e)
    }
}

impl From<serde_json::Error> for OuraCliError {
    fn from(e: serde_json::Error) -> Self {
        OuraCliError::Json(e)
    }
}

impl From<DashboardError> for OuraCliError {
    fn from(e: DashboardError) -> Self {
        OuraCliError::Dashboard(e)
    }
}

#[derive(serde::Serialize)]
struct CliError {
    code: String,
    message: String,
    hint: Option<String>,
}

impl From<OuraCliError> for CliError {
    fn from(e: OuraCliError) -> Self {
        match e {
            OuraCliError::Io(e) => CliError {
                code: "IO_ERROR".to_string(),
                message: e.to_string(),
                hint: Some("Check file paths and permissions".to_string()),
            },
            OuraCliError::Json(e) => CliError {
                code: "JSON_ERROR".to_string(),
                message: e.to_string(),
                hint: Some("Input must be an upload payload saved with 'ouradash upload --save'".to_string()),
            },
            OuraCliError::Dashboard(e) => dashboard_error(e),
            OuraCliError::NoDetail(tab) => CliError {
                code: "NO_DETAIL_VIEW".to_string(),
                message: format!("The {tab} tab has no detail view"),
                hint: Some("Use --select with sleep, activity, heart or metrics".to_string()),
            },
            OuraCliError::NotInWindow(day) => CliError {
                code: "NOT_IN_WINDOW".to_string(),
                message: format!("No record for {day} in the current window"),
                hint: Some("Widen the window with --window all".to_string()),
            },
            OuraCliError::DoctorFailed => CliError {
                code: "DOCTOR_FAILED".to_string(),
                message: "One or more health checks failed".to_string(),
                hint: Some("Review the doctor report for details".to_string()),
            },
        }
    }
}

fn dashboard_error(e: DashboardError) -> CliError {
    let (code, hint) = match &e {
        DashboardError::JsonError(_) => ("JSON_ERROR", Some("Check JSON syntax")),
        DashboardError::HttpError(_) => ("HTTP_ERROR", Some("Run 'ouradash doctor' to check the backend")),
        DashboardError::Upstream(_) => ("BACKEND_ERROR", None),
        DashboardError::UnexpectedResponse => ("UNEXPECTED_RESPONSE", Some("Check the backend version")),
        DashboardError::Busy(_) => ("BUSY", Some("Wait for the pending request to finish")),
        DashboardError::NoCsvFiles => ("NO_CSV_FILES", Some("Pass at least one .csv export file")),
        DashboardError::EmptyMessage => ("EMPTY_MESSAGE", Some("Pass a non-empty question")),
        DashboardError::InvalidWindow(_) => ("INVALID_WINDOW", Some("Use a positive number of days or 'all'")),
        DashboardError::UnknownTab(_) => (
            "UNKNOWN_TAB",
            Some("Tabs: sleep, activity, heart, metrics, temperature, session, cardiovascular, sleepmodel, sleeptime"),
        ),
        DashboardError::Config(_) => ("CONFIG_ERROR", Some("Check OURA_DASH_* environment variables")),
        DashboardError::Io(_) => ("IO_ERROR", Some("Check file paths and permissions")),
    };
    CliError {
        code: code.to_string(),
        message: e.to_string(),
        hint: hint.map(str::to_string),
    }
}

// Report types

#[derive(serde::Serialize)]
struct DoctorReport {
    producer: String,
    version: String,
    checks: Vec<DoctorCheck>,
}

impl DoctorReport {
    fn has_errors(&self) -> bool {
        self.checks.iter().any(|c| matches!(c.status, CheckStatus::Error))
    }

    fn to_text(&self) -> String {
        let mut out = String::new();
        out.push_str("ouradash Doctor Report\n");
        out.push_str("======================\n");
        out.push_str(&format!("Producer: {}\n", self.producer));
        out.push_str(&format!("Version:  {}\n", self.version));
        out.push_str("\nChecks:\n");

        for check in &self.checks {
            let status_icon = match check.status {
                CheckStatus::Ok => "[OK]",
                CheckStatus::Warning => "[WARN]",
                CheckStatus::Error => "[ERR]",
            };
            out.push_str(&format!("  {} {}: {}\n", status_icon, check.name, check.message));
        }
        out
    }
}

#[derive(serde::Serialize)]
struct DoctorCheck {
    name: String,
    status: CheckStatus,
    message: String,
}

#[derive(serde::Serialize)]
#[serde(rename_all = "lowercase")]
enum CheckStatus {
    Ok,
    Warning,
    Error,
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn check(name: &str, status: CheckStatus, message: &str) -> DoctorCheck {
        DoctorCheck {
            name: name.to_string(),
            status,
            message: message.to_string(),
        }
    }

    #[test]
    fn test_dashboard_errors_map_to_codes() {
        let err = CliError::from(OuraCliError::from(DashboardError::Busy("upload")));
        assert_eq!(err.code, "BUSY");
        assert_eq!(err.message, "The upload request is still in progress");
        assert!(err.hint.is_some());

        let err = CliError::from(OuraCliError::from(DashboardError::Upstream("No valid CSV files".into())));
        assert_eq!(err.code, "BACKEND_ERROR");
        assert_eq!(err.message, "Backend returned an error: No valid CSV files");
        assert_eq!(err.hint, None);

        let err = dashboard_error("0".parse::<Window>().unwrap_err());
        assert_eq!(err.code, "INVALID_WINDOW");
        let err = dashboard_error("workouts".parse::<Tab>().unwrap_err());
        assert_eq!(err.code, "UNKNOWN_TAB");
    }

    #[test]
    fn test_io_and_json_errors_convert() {
        let io_err = io::Error::new(io::ErrorKind::NotFound, "payload.json missing");
        let err = CliError::from(OuraCliError::from(io_err));
        assert_eq!(err.code, "IO_ERROR");
        assert_eq!(err.message, "payload.json missing");

        let json_err = serde_json::from_str::<UploadResponse>("{not json").unwrap_err();
        let err = CliError::from(OuraCliError::from(json_err));
        assert_eq!(err.code, "JSON_ERROR");
        assert!(err.hint.unwrap().contains("ouradash upload --save"));
    }

    #[test]
    fn test_cli_only_errors() {
        let err = CliError::from(OuraCliError::NoDetail(Tab::Session));
        assert_eq!(err.code, "NO_DETAIL_VIEW");
        assert_eq!(err.message, format!("The {} tab has no detail view", Tab::Session));

        let err = CliError::from(OuraCliError::NotInWindow("2024-01-02".to_string()));
        assert_eq!(err.code, "NOT_IN_WINDOW");
        assert_eq!(err.message, "No record for 2024-01-02 in the current window");

        let json = serde_json::to_value(CliError::from(OuraCliError::DoctorFailed)).unwrap();
        assert_eq!(json["code"], "DOCTOR_FAILED");
    }

    #[test]
    fn test_doctor_report_text() {
        let report = DoctorReport {
            producer: PRODUCER_NAME.to_string(),
            version: "0.1.0".to_string(),
            checks: vec![
                check("config", CheckStatus::Ok, "default window Last 10 days"),
                check("backend", CheckStatus::Warning, "http://127.0.0.1:5000 unreachable"),
            ],
        };
        assert!(!report.has_errors());
        assert_eq!(
            report.to_text(),
            "ouradash Doctor Report\n\
             ======================\n\
             Producer: oura-dash\n\
             Version:  0.1.0\n\
             \n\
             Checks:\n  \
             [OK] config: default window Last 10 days\n  \
             [WARN] backend: http://127.0.0.1:5000 unreachable\n"
        );

        let failed = DoctorReport {
            checks: vec![check("config", CheckStatus::Error, "bad timeout")],
            ..report
        };
        assert!(failed.has_errors());
        assert!(failed.to_text().contains("  [ERR] config: bad timeout\n"));
    }

    #[test]
    fn test_render_arguments_parse() {
        let cli = Cli::try_parse_from([
            "ouradash", "--backend-url", "http://backend:5000", "render", "-i", "payload.json", "--tab", "heart",
            "--window", "7",
        ])
        .unwrap();
        assert_eq!(cli.backend_url.as_deref(), Some("http://backend:5000"));
        match cli.command {
            Commands::Render { tab, window, output, .. } => {
                assert_eq!(tab, "heart");
                assert_eq!(window.as_deref(), Some("7"));
                assert_eq!(output, PathBuf::from("-"));
            }
            _ => panic!("expected render"),
        }
    }
}
