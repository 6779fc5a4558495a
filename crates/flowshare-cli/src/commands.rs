//! Command handlers

use std::path::PathBuf;

use chrono::{DateTime, Utc};
use tracing::debug;

use crate::cli::{Cli, Commands, ValidateField};
use crate::output;
use flowshare_app::app::{
    audit_pending_entries, get_reconciliation, import_production_csv, list_entries,
    list_reconciliations, run_reconciliation, tenant_summary, tenant_trends, ReconcileRequest,
};
use flowshare_app::config::Config;
use flowshare_app::export::export_reconciliation;
use flowshare_app::logging::init_logging;
use flowshare_app::repository::{load_tenant_settings, open_entry_repo, open_reconciliation_repo};
use flowshare_app::session::Session;
use flowshare_domain::model::{
    InviteeRegisterRequest, ProductionEntryStatus, RegisterRequest, UserRole,
};
use flowshare_domain::service::{
    password_strength, to_chart_points, validate, AnomalyDetector, EMAIL_RULES, NAME_RULES,
    PASSWORD_RULES, PHONE_RULES,
};
use flowshare_infra::load_production_records;
use flowshare_types::{ConfigError, Error, OutputFormat, Result};

const LOG_LEVELS: [&str; 5] = ["error", "warn", "info", "debug", "trace"];

/// Execute the CLI command
///
/// A broken config file only blocks the commands that depend on it. The pure
/// commands and `config --reset` run with defaults so the file can be repaired.
pub fn execute(cli: Cli) -> Result<()> {
    let loaded = Config::load();
    let fallback = Config::default();
    let settings = loaded.as_ref().unwrap_or(&fallback);
    init_logging(cli.verbose, &settings.log_level);
    let output_format = cli.format.unwrap_or(settings.output_format);
    if let Err(e) = &loaded {
        debug!(error = %e, "config not loaded");
    }

    match cli.command {
        Commands::Validate { field, value } => cmd_validate(field, &value, output_format),
        Commands::Strength { password } => {
            output::output_strength(output_format, &password_strength(&password))
        }
        Commands::Chart { csv } => cmd_chart(csv, output_format),
        Commands::Register {
            full_name,
            tenant_name,
            phone,
            invitation_id,
            password,
            role,
            plan,
        } => {
            let outcome = match invitation_id {
                Some(invitation_id) => InviteeRegisterRequest {
                    full_name,
                    phone_number: phone,
                    invitation_id,
                    password,
                }
                .validate(),
                None => RegisterRequest {
                    full_name,
                    tenant_name: tenant_name.unwrap_or_default(),
                    phone_number: phone,
                    role,
                    subscription_plan: plan,
                    password,
                }
                .validate(),
            };
            output::output_registration(output_format, &outcome)
        }
        Commands::Config { reset: true, .. } => {
            let config = Config::default();
            config.save()?;
            println!("Configuration reset to defaults");
            println!("\n{}", config);
            Ok(())
        }
        command => {
            let mut config = loaded?;
            // an override for this run must not leak into a saved config
            if !matches!(command, Commands::Config { .. }) {
                if let Some(dir) = cli.data_dir {
                    config.data_dir = Some(dir);
                }
            }
            run_with_config(command, config, output_format)
        }
    }
}

fn run_with_config(command: Commands, config: Config, output_format: OutputFormat) -> Result<()> {
    match command {
        Commands::Import {
            csv,
            tenant,
            submitted_by,
        } => cmd_import(&config, csv, tenant, submitted_by, output_format),
        Commands::Audit { tenant } => cmd_audit(&config, tenant, output_format),
        Commands::Entries {
            tenant,
            status,
            limit,
        } => cmd_entries(&config, tenant, status, limit, output_format),
        Commands::Summary { tenant, partner } => {
            let tenant = resolve_tenant(tenant)?;
            let repo = open_entry_repo(&config)?;
            let summary = tenant_summary(&repo, &tenant, partner.as_deref())?;
            output::output_summary(output_format, &tenant, partner.as_deref(), &summary)
        }
        Commands::Trends {
            tenant,
            partner,
            days,
        } => {
            let tenant = resolve_tenant(tenant)?;
            let repo = open_entry_repo(&config)?;
            let trends = tenant_trends(&repo, &tenant, partner.as_deref(), days, Utc::now())?;
            output::output_trends(output_format, &trends)
        }
        Commands::Reconcile {
            tenant,
            start,
            end,
            terminal_volume,
            export,
        } => cmd_reconcile(
            &config,
            tenant,
            (start, end),
            terminal_volume,
            export,
            output_format,
        ),
        Commands::Reconciliations {
            tenant,
            status,
            limit,
        } => {
            let tenant = resolve_tenant(tenant)?;
            let runs = open_reconciliation_repo(&config)?;
            let found = list_reconciliations(&runs, &tenant, status, Some(limit))?;
            output::output_reconciliations(output_format, &found)
        }
        Commands::Reconciliation { id, export } => {
            let runs = open_reconciliation_repo(&config)?;
            let reconciliation = get_reconciliation(&runs, &id)?;
            if let Some(path) = export {
                export_reconciliation(&reconciliation, &path)?;
                eprintln!("Exported to {}", path.display());
            }
            output::output_reconciliation(output_format, &reconciliation)
        }
        Commands::Login {
            email,
            tenant,
            role,
        } => cmd_login(&email, &tenant, role, output_format),
        Commands::Logout => {
            let mut session = Session::hydrate(Session::default_path()?)?;
            if !session.is_authenticated() {
                println!("Not logged in");
                return Ok(());
            }
            session.logout()?;
            println!("Logged out");
            Ok(())
        }
        Commands::Whoami => {
            let session = Session::hydrate(Session::default_path()?)?;
            output::output_session(output_format, session.user())
        }
        Commands::Config {
            show,
            set_output,
            set_data_dir,
            set_log_level,
            set_tenant_settings,
            set_z_threshold,
            set_history_window,
            ..
        } => cmd_config(
            config,
            show,
            set_output,
            set_data_dir,
            set_log_level,
            set_tenant_settings,
            set_z_threshold,
            set_history_window,
        ),
        // handled before the config is needed
        Commands::Validate { .. }
        | Commands::Strength { .. }
        | Commands::Chart { .. }
        | Commands::Register { .. } => Ok(()),
    }
}

/// Use the explicit tenant, falling back to the signed-in one
fn resolve_tenant(tenant: Option<String>) -> Result<String> {
    if let Some(tenant) = tenant.filter(|t| !t.trim().is_empty()) {
        return Ok(tenant.trim().to_string());
    }
    let session = Session::hydrate(Session::default_path()?)?;
    session
        .user()
        .map(|u| u.tenant_id.clone())
        .ok_or_else(|| {
            Error::Session(
                "no tenant given and not logged in (use --tenant or `flowshare login`)".to_string(),
            )
        })
}

fn cmd_validate(field: ValidateField, value: &str, output_format: OutputFormat) -> Result<()> {
    let rules = match field {
        ValidateField::Email => EMAIL_RULES,
        ValidateField::Name => NAME_RULES,
        ValidateField::Phone => PHONE_RULES,
        ValidateField::Password => PASSWORD_RULES,
    };
    let errors = validate(value, rules);
    output::output_validation(output_format, field.as_str(), value, &errors)
}

fn cmd_chart(csv: PathBuf, output_format: OutputFormat) -> Result<()> {
    let records = load_production_records(&csv)?;
    let points: Vec<_> = to_chart_points(&records).collect();
    debug!(records = records.len(), points = points.len(), "chart points built");
    output::output_chart_points(output_format, &points)
}

fn cmd_import(
    config: &Config,
    csv: PathBuf,
    tenant: Option<String>,
    submitted_by: Option<String>,
    output_format: OutputFormat,
) -> Result<()> {
    let tenant = resolve_tenant(tenant)?;
    let submitted_by = match submitted_by {
        Some(user) => user,
        None => Session::hydrate(Session::default_path()?)?
            .user()
            .map(|u| u.email.clone())
            .ok_or_else(|| Error::Session("use --submitted-by or `flowshare login`".to_string()))?,
    };

    let repo = open_entry_repo(config)?;
    let imported = import_production_csv(&repo, &csv, &tenant, &submitted_by, Utc::now())?;
    output::output_import(output_format, &imported)
}

fn cmd_audit(config: &Config, tenant: Option<String>, output_format: OutputFormat) -> Result<()> {
    let tenant = resolve_tenant(tenant)?;
    let repo = open_entry_repo(config)?;
    let detector = AnomalyDetector::new(config.anomaly_z_threshold, config.anomaly_history_window);
    let summary = audit_pending_entries(&repo, &tenant, &detector, Utc::now())?;
    output::output_audit(output_format, &summary)
}

fn cmd_entries(
    config: &Config,
    tenant: Option<String>,
    status: Option<ProductionEntryStatus>,
    limit: usize,
    output_format: OutputFormat,
) -> Result<()> {
    let tenant = resolve_tenant(tenant)?;
    let repo = open_entry_repo(config)?;
    let entries = list_entries(&repo, &tenant, status, Some(limit))?;
    output::output_entries(output_format, &entries)
}

fn cmd_reconcile(
    config: &Config,
    tenant: Option<String>,
    (period_start, period_end): (DateTime<Utc>, DateTime<Utc>),
    terminal_volume: f64,
    export: Option<PathBuf>,
    output_format: OutputFormat,
) -> Result<()> {
    let tenant = resolve_tenant(tenant)?;
    let triggered_by = Session::hydrate(Session::default_path()?)?
        .user()
        .map(|u| u.email.clone())
        .unwrap_or_else(|| "cli".to_string());

    let settings = load_tenant_settings(config, &tenant)?;
    let entries = open_entry_repo(config)?;
    let runs = open_reconciliation_repo(config)?;
    let request = ReconcileRequest {
        tenant_id: tenant,
        triggered_by,
        period_start,
        period_end,
        terminal_volume,
    };
    let reconciliation = run_reconciliation(&entries, &runs, &settings, &request, Utc::now())?;

    if let Some(path) = export {
        export_reconciliation(&reconciliation, &path)?;
        eprintln!("Exported to {}", path.display());
    }

    output::output_reconciliation(output_format, &reconciliation)
}

fn cmd_login(email: &str, tenant: &str, role: UserRole, output_format: OutputFormat) -> Result<()> {
    let mut session = Session::hydrate(Session::default_path()?)?;
    session.login(email, tenant, role, Utc::now())?;
    output::output_session(output_format, session.user())
}

#[allow(clippy::too_many_arguments)]
fn cmd_config(
    mut config: Config,
    show: bool,
    set_output: Option<OutputFormat>,
    set_data_dir: Option<PathBuf>,
    set_log_level: Option<String>,
    set_tenant_settings: Option<PathBuf>,
    set_z_threshold: Option<f64>,
    set_history_window: Option<usize>,
) -> Result<()> {
    let mut modified = false;

    if let Some(output_format) = set_output {
        config.output_format = output_format;
        modified = true;
    }

    if let Some(dir) = set_data_dir {
        config.data_dir = Some(dir);
        modified = true;
    }

    if let Some(level) = set_log_level {
        let level = level.trim().to_lowercase();
        if !LOG_LEVELS.contains(&level.as_str()) {
            return Err(ConfigError::ParseError(format!(
                "invalid log level '{}', expected one of: {}",
                level,
                LOG_LEVELS.join(", ")
            ))
            .into());
        }
        config.log_level = level;
        modified = true;
    }

    if let Some(path) = set_tenant_settings {
        config.tenant_settings_path = Some(path);
        modified = true;
    }

    if let Some(threshold) = set_z_threshold {
        if !(threshold.is_finite() && threshold > 0.0) {
            return Err(ConfigError::ParseError(
                "z-score threshold must be a positive number".to_string(),
            )
            .into());
        }
        config.anomaly_z_threshold = threshold;
        modified = true;
    }

    if let Some(window) = set_history_window {
        if window == 0 {
            return Err(ConfigError::ParseError(
                "history window must be at least 1".to_string(),
            )
            .into());
        }
        config.anomaly_history_window = window;
        modified = true;
    }

    if modified {
        config.save()?;
        println!("Configuration updated");
    }

    if show || !modified {
        println!("{}", config);
    }

    Ok(())
}
