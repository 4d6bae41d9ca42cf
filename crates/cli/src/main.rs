// FinCore CLI - headless invoice extraction review

mod dashboard;
mod exit_codes;
mod export;
mod submit;
mod theme;
mod util;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};

use fincore_api_client::{ApiClient, ApiError};
use fincore_config::{settings_file_path, Settings};
use fincore_protocol::InvoiceQuery;
use fincore_review::DEFAULT_MAX_POLL_ATTEMPTS;

use exit_codes::{EXIT_ERROR, EXIT_SUCCESS, EXIT_USAGE};

#[derive(Parser)]
#[command(name = "fincore")]
#[command(about = "Review AI-extracted invoice data (headless client)")]
#[command(version)]
struct Cli {
    /// Backend API base URL (overrides FINCORE_API_URL and settings)
    #[arg(long, global = true, value_name = "URL")]
    api_url: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Upload an invoice, wait for extraction, print the result
    #[command(after_help = "\
Examples:
  fincore submit invoice.pdf
  fincore submit invoice.pdf --json
  fincore submit invoice.pdf --verify date --verify total_amount --approve")]
    Submit {
        /// Invoice file (PDF or image)
        file: PathBuf,

        /// Approve and submit after extraction (requires --verify)
        #[arg(long)]
        approve: bool,

        /// Acknowledge a field (repeatable). Approval requires
        /// 'date' and 'total_amount'.
        #[arg(long, value_name = "FIELD")]
        verify: Vec<String>,

        /// Seconds between status polls
        #[arg(long, default_value_t = 2)]
        interval_secs: u64,

        /// Poll attempts before giving up
        #[arg(long, default_value_t = DEFAULT_MAX_POLL_ATTEMPTS)]
        max_attempts: u32,

        /// Print the extracted invoice as JSON
        #[arg(long)]
        json: bool,
    },

    /// Dashboard reads
    Dashboard {
        #[command(subcommand)]
        command: DashboardCommands,
    },

    /// Download the invoice spreadsheet export
    Export {
        /// Filter by vendor (substring match, backend-side)
        #[arg(long)]
        vendor: Option<String>,

        /// Start date filter (YYYY-MM-DD)
        #[arg(long, value_name = "DATE")]
        from: Option<String>,

        /// End date filter (YYYY-MM-DD)
        #[arg(long, value_name = "DATE")]
        to: Option<String>,

        /// Output file
        #[arg(long, short = 'o')]
        output: PathBuf,
    },

    /// Show or set the display theme (white or night)
    Theme {
        /// New theme; omit to print the current one
        theme: Option<String>,
    },
}

#[derive(Subcommand)]
enum DashboardCommands {
    /// Headline totals
    Stats {
        #[arg(long)]
        json: bool,
    },
    /// Recent invoices
    Invoices {
        #[arg(long)]
        vendor: Option<String>,
        #[arg(long, value_name = "DATE")]
        from: Option<String>,
        #[arg(long, value_name = "DATE")]
        to: Option<String>,
        #[arg(long)]
        json: bool,
    },
    /// Monthly spend series
    Chart {
        #[arg(long)]
        json: bool,
    },
    /// Invoice status distribution
    Status {
        #[arg(long)]
        json: bool,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let settings = match load_settings() {
        Ok(settings) => settings,
        Err(err) => {
            eprintln!("error: {}", err.message);
            return ExitCode::from(err.code);
        }
    };

    let api_base = util::resolve_api_base(
        cli.api_url.as_deref(),
        util::api_base_from_env().as_deref(),
        settings.api_base.as_deref(),
    );
    let client = ApiClient::new(api_base);

    let result = match cli.command {
        Commands::Submit {
            file,
            approve,
            verify,
            interval_secs,
            max_attempts,
            json,
        } => submit::cmd_submit(client, file, approve, verify, interval_secs, max_attempts, json),
        Commands::Dashboard { command } => match command {
            DashboardCommands::Stats { json } => dashboard::cmd_stats(&client, json),
            DashboardCommands::Invoices {
                vendor,
                from,
                to,
                json,
            } => dashboard::cmd_invoices(&client, query(vendor, from, to), json),
            DashboardCommands::Chart { json } => dashboard::cmd_chart(&client, json),
            DashboardCommands::Status { json } => dashboard::cmd_status(&client, json),
        },
        Commands::Export {
            vendor,
            from,
            to,
            output,
        } => export::cmd_export(&client, query(vendor, from, to), output),
        Commands::Theme { theme } => theme::cmd_theme(theme),
    };

    match result {
        Ok(()) => ExitCode::from(EXIT_SUCCESS),
        Err(CliError {
            code,
            message,
            hint,
        }) => {
            if !message.is_empty() {
                eprintln!("error: {}", message);
            }
            if let Some(hint) = hint {
                eprintln!("hint:  {}", hint);
            }
            ExitCode::from(code)
        }
    }
}

fn query(vendor: Option<String>, from: Option<String>, to: Option<String>) -> InvoiceQuery {
    InvoiceQuery {
        vendor,
        start_date: from,
        end_date: to,
    }
}

fn load_settings() -> Result<Settings, CliError> {
    match settings_file_path() {
        Some(path) => Settings::load_from(&path).map_err(|e| CliError::error(e.to_string())),
        None => Ok(Settings::default()),
    }
}

pub struct CliError {
    pub code: u8,
    pub message: String,
    pub hint: Option<String>,
}

impl CliError {
    pub fn error(msg: impl Into<String>) -> Self {
        Self {
            code: EXIT_ERROR,
            message: msg.into(),
            hint: None,
        }
    }

    pub fn usage(msg: impl Into<String>) -> Self {
        Self {
            code: EXIT_USAGE,
            message: msg.into(),
            hint: None,
        }
    }

    pub fn api(err: ApiError) -> Self {
        Self {
            code: EXIT_ERROR,
            message: err.to_string(),
            hint: match err {
                ApiError::Network(_) => {
                    Some("is the backend running? set --api-url or FINCORE_API_URL".to_string())
                }
                _ => None,
            },
        }
    }
}
