//! CLI binary for contentforge.
//!
//! A thin shim over the library crate: `serve` maps flags to `ProxyConfig`
//! and runs the proxy, `submit` maps flags to `SubmitConfig` and drives one
//! upload session from the terminal.

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use contentforge::config::{DEFAULT_BIND_ADDR, DEFAULT_SERVER_URL, DEFAULT_WEBHOOK_URL};
use contentforge::{
    serve, submit_file, ProgressCallback, ProxyConfig, SubmitConfig, SubmitOutcome,
    SubmitProgressCallback,
};
use indicatif::{ProgressBar, ProgressStyle};
use std::io;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

// ── ANSI colour helpers (no extra deps) ──────────────────────────────────────

fn green(s: &str) -> String {
    format!("\x1b[32m{s}\x1b[0m")
}
fn red(s: &str) -> String {
    format!("\x1b[31m{s}\x1b[0m")
}
fn dim(s: &str) -> String {
    format!("\x1b[2m{s}\x1b[0m")
}
fn bold(s: &str) -> String {
    format!("\x1b[1m{s}\x1b[0m")
}
fn cyan(s: &str) -> String {
    format!("\x1b[36m{s}\x1b[0m")
}

// ── CLI progress callback using indicatif ────────────────────────────────────

/// Terminal progress callback: a spinner whose message follows the stage
/// label, switching to a poll counter once the upload becomes a job.
struct CliProgressCallback {
    bar: ProgressBar,
}

impl CliProgressCallback {
    fn new() -> Arc<Self> {
        let bar = ProgressBar::new_spinner();
        let style = ProgressStyle::with_template("{spinner:.cyan} {prefix:.bold}  {msg}  ⏱ {elapsed}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
            .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏", "⠿"]);
        bar.set_style(style);
        bar.set_prefix("Preparing");
        bar.enable_steady_tick(Duration::from_millis(80));
        Arc::new(Self { bar })
    }
}

impl SubmitProgressCallback for CliProgressCallback {
    fn on_submit_start(&self, file_name: &str, size_bytes: usize) {
        self.bar.set_prefix("Processing");
        self.bar.println(format!(
            "{} {} {}",
            cyan("◆"),
            bold(&format!("Submitting {file_name}")),
            dim(&format!("({:.2} KB)", size_bytes as f64 / 1024.0)),
        ));
    }

    fn on_stage(&self, stage: &str) {
        self.bar.set_message(stage.to_string());
    }

    fn on_poll(&self, attempt: u32, max_attempts: u32) {
        self.bar.set_prefix("Waiting");
        self.bar
            .set_message(format!("status check {attempt}/{max_attempts}"));
    }

    fn on_complete(&self, _link: &str) {
        self.bar.finish_and_clear();
        eprintln!("{} {}", green("✔"), bold("Content generated successfully"));
    }

    fn on_still_processing(&self, message: &str) {
        self.bar.finish_and_clear();
        eprintln!("{} {}", cyan("⚠"), message);
    }

    fn on_error(&self, message: &str) {
        self.bar.finish_and_clear();
        eprintln!("{} {}", red("✘"), red(message));
    }
}

const AFTER_HELP: &str = r#"EXAMPLES:
  # Run the proxy and upload page on http://127.0.0.1:3000
  contentforge serve

  # Point the proxy at another webhook, with a status endpoint for async jobs
  contentforge serve --webhook-url https://hooks.example.com/webhook/abc \
                     --status-url https://hooks.example.com/webhook/status

  # Submit a brief through a running proxy and print the result link
  contentforge submit brief.pdf

  # Machine-readable result
  contentforge submit --json brief.pdf > result.json

ENVIRONMENT VARIABLES:
  CONTENTFORGE_BIND               Address for `serve` (default 127.0.0.1:3000)
  CONTENTFORGE_WEBHOOK_URL        Webhook uploads are forwarded to
  CONTENTFORGE_STATUS_URL         Upstream status endpoint for job polling
  CONTENTFORGE_SERVER             Proxy base URL for `submit`
  RUST_LOG                        Overrides -v / -q log filtering
"#;

/// Upload PDF content briefs to an automation webhook.
#[derive(Parser, Debug)]
#[command(
    name = "contentforge",
    version,
    about = "Upload proxy and client for a PDF-to-article automation webhook",
    after_help = AFTER_HELP
)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Enable DEBUG-level tracing logs.
    #[arg(short, long, global = true, env = "CONTENTFORGE_VERBOSE")]
    verbose: bool,

    /// Suppress all output except errors.
    #[arg(short, long, global = true, env = "CONTENTFORGE_QUIET")]
    quiet: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the upload proxy and serve the upload page.
    Serve(ServeArgs),
    /// Upload a PDF through a running proxy and wait for the result link.
    Submit(SubmitArgs),
}

#[derive(Args, Debug)]
struct ServeArgs {
    /// Address to listen on.
    #[arg(long, env = "CONTENTFORGE_BIND", default_value = DEFAULT_BIND_ADDR)]
    bind: SocketAddr,

    /// Webhook that receives the forwarded upload.
    #[arg(long, env = "CONTENTFORGE_WEBHOOK_URL", default_value = DEFAULT_WEBHOOK_URL)]
    webhook_url: String,

    /// Upstream status endpoint queried with `?jobId=<id>`.
    #[arg(long, env = "CONTENTFORGE_STATUS_URL")]
    status_url: Option<String>,

    /// Upstream call timeout in seconds.
    #[arg(long, env = "CONTENTFORGE_UPSTREAM_TIMEOUT", default_value_t = 300)]
    upstream_timeout: u64,

    /// Largest accepted upload in MiB.
    #[arg(long, env = "CONTENTFORGE_MAX_UPLOAD_MB", default_value_t = 25)]
    max_upload_mb: usize,
}

#[derive(Args, Debug)]
struct SubmitArgs {
    /// PDF file to upload.
    file: PathBuf,

    /// Base URL of the running proxy.
    #[arg(long, env = "CONTENTFORGE_SERVER", default_value = DEFAULT_SERVER_URL)]
    server: String,

    /// Delay between status polls in milliseconds.
    #[arg(long, env = "CONTENTFORGE_POLL_INTERVAL_MS", default_value_t = 3000)]
    poll_interval_ms: u64,

    /// Delay between progress-stage updates in milliseconds.
    #[arg(long, env = "CONTENTFORGE_STAGE_INTERVAL_MS", default_value_t = 8000)]
    stage_interval_ms: u64,

    /// Status polls before giving up.
    #[arg(long, env = "CONTENTFORGE_MAX_POLL_ATTEMPTS", default_value_t = 40)]
    max_poll_attempts: u32,

    /// Upload request timeout in seconds.
    #[arg(long, env = "CONTENTFORGE_REQUEST_TIMEOUT", default_value_t = 300)]
    request_timeout: u64,

    /// Print the outcome as JSON instead of the bare link.
    #[arg(long, env = "CONTENTFORGE_JSON")]
    json: bool,

    /// Disable the progress spinner.
    #[arg(long, env = "CONTENTFORGE_NO_PROGRESS")]
    no_progress: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // ── Logging setup ────────────────────────────────────────────────────
    // While the spinner is active it carries all the feedback that matters;
    // INFO-level library logs would only tear it.
    let show_progress = match cli.command {
        Command::Submit(ref args) => !cli.quiet && !args.no_progress && !args.json,
        Command::Serve(_) => false,
    };
    let filter = if cli.verbose {
        "debug"
    } else if cli.quiet || show_progress {
        "error"
    } else {
        "info"
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_writer(io::stderr)
        .init();

    match cli.command {
        Command::Serve(args) => run_serve(args).await,
        Command::Submit(args) => run_submit(args, show_progress, cli.quiet).await,
    }
}

async fn run_serve(args: ServeArgs) -> Result<()> {
    let mut builder = ProxyConfig::builder()
        .bind_addr(args.bind)
        .webhook_url(args.webhook_url)
        .upstream_timeout_secs(args.upstream_timeout)
        .max_upload_bytes(args.max_upload_mb.saturating_mul(1024 * 1024));
    if let Some(url) = args.status_url {
        builder = builder.status_url(url);
    }
    let config = builder.build().context("Invalid configuration")?;

    serve(config).await.context("Proxy server failed")
}

async fn run_submit(args: SubmitArgs, show_progress: bool, quiet: bool) -> Result<()> {
    let spinner = show_progress.then(CliProgressCallback::new);

    let mut builder = SubmitConfig::builder()
        .server_url(args.server)
        .poll_interval_ms(args.poll_interval_ms)
        .stage_interval_ms(args.stage_interval_ms)
        .max_poll_attempts(args.max_poll_attempts)
        .request_timeout_secs(args.request_timeout);
    if let Some(ref cb) = spinner {
        builder = builder.progress_callback(cb.clone() as ProgressCallback);
    }

    let result = match builder.build() {
        Ok(config) => submit_file(&args.file, &config)
            .await
            .with_context(|| format!("Submission of {} failed", args.file.display())),
        Err(e) => Err(e).context("Invalid configuration"),
    };
    // The spinner must be gone before anyhow prints the error chain.
    if let Some(ref cb) = spinner {
        cb.bar.finish_and_clear();
    }
    let outcome = result?;

    if args.json {
        println!(
            "{}",
            serde_json::to_string_pretty(&outcome).context("Failed to serialise outcome")?
        );
        return Ok(());
    }

    match outcome {
        SubmitOutcome::Completed { link, file_name } => {
            println!("{link}");
            if !quiet && !show_progress {
                eprintln!("{} {}", green("✔"), dim(&file_name));
            }
        }
        SubmitOutcome::StillProcessing { message, .. } => {
            if !quiet && !show_progress {
                eprintln!("{} {}", cyan("⚠"), message);
            }
        }
    }
    Ok(())
}
