//! Output formatting module

use serde::Serialize;
use serde_json::json;

use flowshare_app::app::AuditSummary;
use flowshare_app::session::SessionUser;
use flowshare_domain::model::{ChartPoint, ProductionEntry, Reconciliation, ValidatedRegistration};
use flowshare_domain::service::{
    generate_reconciliation_report, DailyTrend, PasswordStrength, ProductionSummary,
};
use flowshare_types::{OutputFormat, Result};

fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn opt(value: Option<f64>, precision: usize) -> String {
    value
        .map(|v| format!("{:.*}", precision, v))
        .unwrap_or_else(|| "-".to_string())
}

fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() > max_len {
        let truncated: String = s.chars().take(max_len.saturating_sub(2)).collect();
        format!("{}..", truncated)
    } else {
        s.to_string()
    }
}

pub fn output_validation(
    output_format: OutputFormat,
    field: &str,
    value: &str,
    errors: &[&str],
) -> Result<()> {
    if output_format == OutputFormat::Json {
        return print_json(&json!({
            "field": field,
            "value": value,
            "valid": errors.is_empty(),
            "errors": errors,
        }));
    }

    if errors.is_empty() {
        println!("✓ valid {}", field);
    } else {
        println!("✗ invalid {}", field);
        for message in errors {
            println!("  - {}", message);
        }
    }
    Ok(())
}

pub fn output_strength(output_format: OutputFormat, strength: &PasswordStrength) -> Result<()> {
    if output_format == OutputFormat::Json {
        return print_json(strength);
    }

    let bar: String = (0..3)
        .map(|i| if i < strength.score { '█' } else { '░' })
        .collect();
    println!("Strength: {} {} ({}/3)", bar, strength.label, strength.score);
    println!("Color:    {}", strength.color);
    Ok(())
}

pub fn output_chart_points(output_format: OutputFormat, points: &[ChartPoint]) -> Result<()> {
    if output_format == OutputFormat::Json {
        return print_json(points);
    }

    println!(
        "{:<20} {:>12} {:>7} {:>8} {:>8} {:>12}",
        "Date", "Gross", "BSW%", "MF", "Temp", "Net"
    );
    println!("{}", "-".repeat(72));
    for p in points {
        println!(
            "{:<20} {:>12} {:>7} {:>8} {:>8} {:>12}",
            p.measurement_date.format("%Y-%m-%d %H:%M"),
            opt(p.gross_volume, 2),
            opt(p.bsw_percent, 2),
            opt(p.meter_factor, 4),
            opt(p.temperature, 1),
            opt(p.net_volume, 2),
        );
    }
    println!();
    println!("{} points", points.len());
    Ok(())
}

pub fn output_entries(output_format: OutputFormat, entries: &[ProductionEntry]) -> Result<()> {
    if output_format == OutputFormat::Json {
        return print_json(entries);
    }

    if entries.is_empty() {
        println!("No entries found.");
        return Ok(());
    }

    println!(
        "{:<10} {:<18} {:>10} {:>6} {:>6} {:>6} {:<9} {:>5}",
        "Date", "Partner", "Gross", "BSW%", "Temp", "API", "Status", "Score"
    );
    println!("{}", "-".repeat(78));
    for e in entries {
        println!(
            "{:<10} {:<18} {:>10.2} {:>6.2} {:>6.1} {:>6.1} {:<9} {:>5}",
            e.measurement_date.format("%Y-%m-%d"),
            truncate(&e.partner_id, 18),
            e.gross_volume,
            e.bsw_percent,
            e.temperature,
            e.api_gravity,
            e.status.label(),
            opt(e.anomaly_score, 2),
        );
    }
    Ok(())
}

pub fn output_import(output_format: OutputFormat, entries: &[ProductionEntry]) -> Result<()> {
    if output_format == OutputFormat::Json {
        return print_json(entries);
    }

    println!("Imported {} entries (pending audit)", entries.len());
    let total: f64 = entries.iter().map(|e| e.gross_volume).sum();
    println!("Total gross volume: {:.2} bbl", total);
    Ok(())
}

pub fn output_audit(output_format: OutputFormat, summary: &AuditSummary) -> Result<()> {
    if output_format == OutputFormat::Json {
        return print_json(summary);
    }

    println!("Audit Result");
    println!("============");
    println!("Checked:   {}", summary.checked);
    println!("Validated: {}", summary.validated);
    println!("Flagged:   {}", summary.flagged);

    let flagged: Vec<_> = summary.checks.iter().filter(|c| c.is_anomaly).collect();
    if !flagged.is_empty() {
        println!();
        println!(
            "{:<38} {:<18} {:>10} {:>10} {:>6}",
            "Entry", "Partner", "Gross", "Mean", "z"
        );
        println!("{}", "-".repeat(86));
        for c in flagged {
            println!(
                "{:<38} {:<18} {:>10.2} {:>10} {:>6}",
                c.entry_id,
                truncate(&c.partner_id, 18),
                c.gross_volume,
                opt(c.history_mean, 2),
                opt(c.z_score, 2),
            );
        }
    }
    Ok(())
}

pub fn output_summary(
    output_format: OutputFormat,
    tenant_id: &str,
    partner_id: Option<&str>,
    summary: &ProductionSummary,
) -> Result<()> {
    if output_format == OutputFormat::Json {
        return print_json(summary);
    }

    println!("Production Summary");
    println!("==================");
    println!("Tenant:           {}", tenant_id);
    if let Some(partner) = partner_id {
        println!("Partner:          {}", partner);
    }
    println!("Partners:         {}", summary.total_partners);
    println!("Entries:          {}", summary.total_entries);
    println!("Total production: {:.2} bbl", summary.total_production);
    println!("Average BSW:      {:.2}%", summary.avg_bsw);
    Ok(())
}

pub fn output_trends(output_format: OutputFormat, trends: &[DailyTrend]) -> Result<()> {
    if output_format == OutputFormat::Json {
        return print_json(trends);
    }

    if trends.is_empty() {
        println!("No production in range.");
        return Ok(());
    }

    println!(
        "{:<10} {:<20} {:>12} {:>7} {:>7}",
        "Date", "Partner", "Gross", "BSW%", "API"
    );
    println!("{}", "-".repeat(60));
    for t in trends {
        println!(
            "{:<10} {:<20} {:>12.2} {:>7.2} {:>7.2}",
            t.date.format("%Y-%m-%d"),
            truncate(&t.partner_id, 20),
            t.total_gross_volume,
            t.avg_bsw,
            t.avg_api_gravity,
        );
    }
    Ok(())
}

pub fn output_reconciliation(
    output_format: OutputFormat,
    reconciliation: &Reconciliation,
) -> Result<()> {
    if output_format == OutputFormat::Json {
        return print_json(reconciliation);
    }
    print!("{}", generate_reconciliation_report(reconciliation));
    Ok(())
}

pub fn output_reconciliations(
    output_format: OutputFormat,
    reconciliations: &[Reconciliation],
) -> Result<()> {
    if output_format == OutputFormat::Json {
        return print_json(reconciliations);
    }

    if reconciliations.is_empty() {
        println!("No reconciliations found.");
        return Ok(());
    }

    println!(
        "{:<36} {:<23} {:<10} {:>12} {:>12}",
        "ID", "Period", "Status", "Terminal", "Allocated"
    );
    println!("{}", "-".repeat(97));
    for r in reconciliations {
        let allocated = r.result.as_ref().map(|res| res.total_allocated_volume);
        println!(
            "{:<36} {:<23} {:<10} {:>12.2} {:>12}",
            r.id,
            format!(
                "{} .. {}",
                r.period_start.format("%Y-%m-%d"),
                r.period_end.format("%Y-%m-%d")
            ),
            r.status.label(),
            r.terminal_volume,
            opt(allocated, 2),
        );
        if let Some(ref message) = r.error_message {
            println!("  {}", truncate(message, 90));
        }
    }
    Ok(())
}

pub fn output_registration(
    output_format: OutputFormat,
    outcome: &std::result::Result<ValidatedRegistration, Vec<String>>,
) -> Result<()> {
    if output_format == OutputFormat::Json {
        return match outcome {
            Ok(registration) => print_json(&json!({ "valid": true, "registration": registration })),
            Err(errors) => print_json(&json!({ "valid": false, "errors": errors })),
        };
    }

    match outcome {
        Ok(r) => {
            println!("✓ registration is valid");
            println!("Full name:    {}", r.full_name);
            if let Some(ref tenant) = r.tenant_name {
                println!("Organization: {}", tenant);
            }
            println!("Phone:        {}", r.phone_number);
            println!("Role:         {}", r.role);
            println!("Plan:         {}", r.subscription_plan);
            if let Some(ref invitation) = r.invitation_id {
                println!("Invitation:   {}", invitation);
            }
        }
        Err(errors) => {
            println!("✗ registration is invalid");
            for message in errors {
                println!("  - {}", message);
            }
        }
    }
    Ok(())
}

pub fn output_session(output_format: OutputFormat, user: Option<&SessionUser>) -> Result<()> {
    if output_format == OutputFormat::Json {
        return print_json(&json!({ "authenticated": user.is_some(), "user": user }));
    }

    match user {
        Some(u) => {
            println!("Email:     {}", u.email);
            println!("Tenant:    {}", u.tenant_id);
            println!("Role:      {}", u.role);
            println!("Signed in: {}", u.logged_in_at.format("%Y-%m-%d %H:%M UTC"));
        }
        None => println!("Not logged in."),
    }
    Ok(())
}
