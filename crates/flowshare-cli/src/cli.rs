//! CLI definition using clap

use std::path::PathBuf;

use chrono::{DateTime, NaiveDate, Utc};
use clap::{Parser, Subcommand, ValueEnum};

use flowshare_domain::model::{ProductionEntryStatus, ReconciliationStatus, UserRole};
use flowshare_domain::service::parse_measurement_date;
use flowshare_types::OutputFormat;

#[derive(Parser)]
#[command(name = "flowshare")]
#[command(author = "flowshare")]
#[command(version)]
#[command(about = "Production data validation, auditing and back-allocation for joint ventures")]
#[command(long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Output format (json, table). Uses config value if not specified.
    #[arg(long, short = 'f', global = true)]
    pub format: Option<OutputFormat>,

    /// Data directory for the entry and reconciliation stores
    #[arg(long, global = true)]
    pub data_dir: Option<PathBuf>,

    /// Verbose output (debug logging)
    #[arg(long, short = 'v', global = true)]
    pub verbose: bool,
}

/// Form field checked by `validate`
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum ValidateField {
    Email,
    Name,
    Phone,
    Password,
}

impl ValidateField {
    pub fn as_str(&self) -> &'static str {
        match self {
            ValidateField::Email => "email",
            ValidateField::Name => "name",
            ValidateField::Phone => "phone",
            ValidateField::Password => "password",
        }
    }
}

#[derive(Subcommand)]
pub enum Commands {
    /// Validate a form field value
    Validate {
        field: ValidateField,
        value: String,
    },

    /// Score a password (0-3)
    Strength { password: String },

    /// Turn a production CSV into chart points sorted by date
    Chart { csv: PathBuf },

    /// Import production measurements from CSV as pending entries
    Import {
        csv: PathBuf,

        /// Tenant id. Uses the logged-in tenant if not specified.
        #[arg(long)]
        tenant: Option<String>,

        /// Submitting user. Uses the logged-in email if not specified.
        #[arg(long)]
        submitted_by: Option<String>,
    },

    /// Anomaly-check pending entries
    Audit {
        #[arg(long)]
        tenant: Option<String>,
    },

    /// List production entries, newest first
    Entries {
        #[arg(long)]
        tenant: Option<String>,

        /// Only entries with this status (pending, validated, flagged)
        #[arg(long, value_parser = parse_status)]
        status: Option<ProductionEntryStatus>,

        /// Maximum number of entries to show
        #[arg(long, short = 'n', default_value = "20")]
        limit: usize,
    },

    /// Production totals for a tenant or one partner
    Summary {
        #[arg(long)]
        tenant: Option<String>,

        #[arg(long)]
        partner: Option<String>,
    },

    /// Daily per-partner trends
    Trends {
        #[arg(long)]
        tenant: Option<String>,

        #[arg(long)]
        partner: Option<String>,

        /// Only the last N days
        #[arg(long)]
        days: Option<u32>,
    },

    /// Allocate a terminal volume across validated entries of a period
    Reconcile {
        #[arg(long)]
        tenant: Option<String>,

        /// Period start (YYYY-MM-DD or RFC 3339)
        #[arg(long, value_parser = parse_period_start)]
        start: DateTime<Utc>,

        /// Period end, inclusive (YYYY-MM-DD covers the whole day)
        #[arg(long, value_parser = parse_period_end)]
        end: DateTime<Utc>,

        /// Final terminal volume in barrels
        #[arg(long)]
        terminal_volume: f64,

        /// Also write the result to an Excel file
        #[arg(long)]
        export: Option<PathBuf>,
    },

    /// List stored reconciliation runs, newest first
    Reconciliations {
        #[arg(long)]
        tenant: Option<String>,

        /// Only runs with this status (pending, processing, completed, failed)
        #[arg(long, value_parser = parse_run_status)]
        status: Option<ReconciliationStatus>,

        #[arg(long, short = 'n', default_value = "20")]
        limit: usize,
    },

    /// Show one stored reconciliation run
    Reconciliation {
        id: String,

        /// Also write the result to an Excel file
        #[arg(long)]
        export: Option<PathBuf>,
    },

    /// Validate a coordinator registration, or an invitee's with --invitation-id
    Register {
        #[arg(long)]
        full_name: String,

        /// Organization name (coordinators only)
        #[arg(long, required_unless_present = "invitation_id")]
        tenant_name: Option<String>,

        #[arg(long)]
        phone: String,

        /// Join an existing tenant as a partner
        #[arg(long, conflicts_with = "tenant_name")]
        invitation_id: Option<String>,

        /// Checked against the password rules
        #[arg(long)]
        password: Option<String>,

        #[arg(long, default_value = "coordinator")]
        role: String,

        #[arg(long, default_value = "starter")]
        plan: String,
    },

    /// Store the signed-in user locally
    Login {
        email: String,

        #[arg(long)]
        tenant: String,

        #[arg(long, default_value = "coordinator", value_parser = parse_role)]
        role: UserRole,
    },

    /// Clear the stored session
    Logout,

    /// Show the signed-in user
    Whoami,

    /// Manage configuration
    Config {
        /// Show current configuration
        #[arg(long)]
        show: bool,

        /// Set default output format
        #[arg(long)]
        set_output: Option<OutputFormat>,

        /// Set data directory
        #[arg(long)]
        set_data_dir: Option<PathBuf>,

        /// Set default log level (error, warn, info, debug, trace)
        #[arg(long)]
        set_log_level: Option<String>,

        /// Set tenant settings TOML file
        #[arg(long)]
        set_tenant_settings: Option<PathBuf>,

        /// Set anomaly z-score threshold
        #[arg(long)]
        set_z_threshold: Option<f64>,

        /// Set number of historical entries used by the audit
        #[arg(long)]
        set_history_window: Option<usize>,

        /// Reset to defaults
        #[arg(long)]
        reset: bool,
    },
}

fn parse_status(value: &str) -> Result<ProductionEntryStatus, String> {
    value.parse()
}

fn parse_run_status(value: &str) -> Result<ReconciliationStatus, String> {
    value.parse()
}

fn parse_role(value: &str) -> Result<UserRole, String> {
    UserRole::parse(value.trim()).ok_or_else(|| {
        let roles: Vec<&str> = UserRole::ALL.iter().map(|r| r.as_str()).collect();
        format!("invalid role '{}', expected one of: {}", value, roles.join(", "))
    })
}

fn parse_period_start(value: &str) -> Result<DateTime<Utc>, String> {
    parse_measurement_date(value).ok_or_else(|| format!("invalid date '{}'", value))
}

/// A bare date means the last instant of that day
fn parse_period_end(value: &str) -> Result<DateTime<Utc>, String> {
    if let Ok(date) = NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d") {
        return date
            .and_hms_nano_opt(23, 59, 59, 999_999_999)
            .map(|naive| naive.and_utc())
            .ok_or_else(|| format!("invalid date '{}'", value));
    }
    parse_period_start(value)
}
