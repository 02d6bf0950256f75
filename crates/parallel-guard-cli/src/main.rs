//! parallel-guard - payload validation, beta linting and webhook verification for Parallel API integrations.

use clap::{Parser, Subcommand};
use parallel_guard_rules::PayloadKind;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

mod commands;
mod config;
mod errors;
mod output;

use commands::{lint_betas, rules, sign, validate, verify};
use config::GuardConfig;
use errors::{CliError, EXIT_FAILURE};

#[derive(Parser)]
#[command(name = "parallel-guard")]
#[command(about = "Validate Parallel API request payloads and verify webhook signatures")]
#[command(version)]
struct Cli {
    /// TOML config file ([limits], [webhook], [beta])
    #[arg(long, global = true, env = "PARALLEL_GUARD_CONFIG")]
    config: Option<PathBuf>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate a request payload and lint its beta tokens
    Validate {
        /// Request kind: search, extract or task-run
        kind: PayloadKind,
        /// Input JSON file (or stdin if omitted or '-')
        input: Option<String>,
        /// parallel-beta token(s) the request will send; repeatable, comma lists allowed
        #[arg(long = "beta", value_name = "TOKEN")]
        betas: Vec<String>,
        /// Require the exact current beta token instead of its stable prefix
        #[arg(long)]
        exact_betas: bool,
        /// Treat warnings as failures
        #[arg(long)]
        strict: bool,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Check only that gated features have matching beta tokens
    LintBetas {
        /// Request kind: search, extract or task-run
        kind: PayloadKind,
        /// Input JSON file (or stdin if omitted or '-')
        input: Option<String>,
        /// parallel-beta token(s) the request will send; repeatable, comma lists allowed
        #[arg(long = "beta", value_name = "TOKEN")]
        betas: Vec<String>,
        /// Require the exact current beta token instead of its stable prefix
        #[arg(long)]
        exact_betas: bool,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Print the active rule table for a request kind
    Rules {
        /// Request kind: search, extract or task-run
        kind: PayloadKind,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Verify a webhook delivery's signature and timestamp
    Verify {
        /// Webhook signing secret
        #[arg(long, env = "PARALLEL_WEBHOOK_SECRET", hide_env_values = true)]
        secret: String,
        /// webhook-id header value
        #[arg(long)]
        webhook_id: String,
        /// webhook-timestamp header value (unix seconds)
        #[arg(long)]
        timestamp: String,
        /// webhook-signature header value or token; repeatable
        #[arg(long = "signature", value_name = "SIGNATURE", required = true)]
        signatures: Vec<String>,
        /// Raw body file (or stdin if omitted or '-')
        #[arg(long)]
        body_file: Option<String>,
        /// Replay window in seconds (overrides config)
        #[arg(long)]
        tolerance_seconds: Option<u64>,
        /// Override the current unix time
        #[arg(long, allow_hyphen_values = true)]
        now: Option<i64>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Print the v1 signature header for a body (test fixtures)
    Sign {
        /// Webhook signing secret
        #[arg(long, env = "PARALLEL_WEBHOOK_SECRET", hide_env_values = true)]
        secret: String,
        /// webhook-id header value
        #[arg(long)]
        webhook_id: String,
        /// webhook-timestamp header value (unix seconds)
        #[arg(long)]
        timestamp: String,
        /// Raw body file (or stdin if omitted or '-')
        #[arg(long)]
        body_file: Option<String>,
    },
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let result = GuardConfig::load(cli.config.as_deref()).and_then(|config| dispatch(cli.command, &config));

    match result {
        Ok(true) => {}
        Ok(false) => std::process::exit(EXIT_FAILURE),
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(e.exit_code());
        }
    }
}

fn dispatch(command: Commands, config: &GuardConfig) -> Result<bool, CliError> {
    match command {
        Commands::Validate {
            kind,
            input,
            betas,
            exact_betas,
            strict,
            json,
        } => validate::run(
            validate::ValidateArgs {
                kind,
                input,
                betas,
                exact_betas,
                strict,
                json,
            },
            config,
        ),
        Commands::LintBetas {
            kind,
            input,
            betas,
            exact_betas,
            json,
        } => lint_betas::run(
            lint_betas::LintArgs {
                kind,
                input,
                betas,
                exact_betas,
                json,
            },
            config,
        ),
        Commands::Rules { kind, json } => rules::run(kind, json, config),
        Commands::Verify {
            secret,
            webhook_id,
            timestamp,
            signatures,
            body_file,
            tolerance_seconds,
            now,
            json,
        } => verify::run(
            verify::VerifyArgs {
                secret,
                webhook_id,
                timestamp,
                signatures,
                body_file,
                tolerance_seconds,
                now,
                json,
            },
            config,
        ),
        Commands::Sign {
            secret,
            webhook_id,
            timestamp,
            body_file,
        } => sign::run(secret, webhook_id, timestamp, body_file),
    }
}
