//! Excel export of reconciliation results

use std::path::Path;

use rust_xlsxwriter::{Format, Workbook, Worksheet, XlsxError};
use tracing::info;

use flowshare_domain::model::{Reconciliation, ReconciliationResult};
use flowshare_types::{Error, Result};

fn excel_error(e: XlsxError) -> Error {
    Error::Excel(e.to_string())
}

/// Write a completed reconciliation to a workbook with "Summary" and
/// "Partner Allocations" sheets
pub fn export_reconciliation(reconciliation: &Reconciliation, output_path: &Path) -> Result<()> {
    let result = reconciliation.result.as_ref().ok_or_else(|| {
        Error::Reconciliation(format!(
            "reconciliation {} has no result to export",
            reconciliation.id
        ))
    })?;

    let mut workbook = Workbook::new();

    let summary_sheet = workbook.add_worksheet();
    write_summary_sheet(summary_sheet, reconciliation, result)?;

    let allocations_sheet = workbook.add_worksheet();
    write_allocations_sheet(allocations_sheet, result)?;

    workbook.save(output_path).map_err(excel_error)?;
    info!(path = %output_path.display(), "reconciliation exported");

    Ok(())
}

fn write_summary_sheet(
    sheet: &mut Worksheet,
    reconciliation: &Reconciliation,
    result: &ReconciliationResult,
) -> Result<()> {
    sheet.set_name("Summary").map_err(excel_error)?;

    let header_format = Format::new().set_bold();
    let volume_format = Format::new().set_num_format("#,##0.00");

    sheet
        .write_string_with_format(0, 0, "FlowShare Reconciliation Report", &header_format)
        .map_err(excel_error)?;

    let text_rows = [
        ("Reconciliation ID:", reconciliation.id.clone()),
        ("Tenant:", reconciliation.tenant_id.clone()),
        (
            "Period:",
            format!(
                "{} to {}",
                reconciliation.period_start.format("%Y-%m-%d"),
                reconciliation.period_end.format("%Y-%m-%d")
            ),
        ),
        ("Status:", reconciliation.status.label().to_string()),
        ("Allocation Model:", result.allocation_model_used.clone()),
    ];
    let mut row = 2;
    for (label, value) in &text_rows {
        sheet.write_string(row, 0, *label).map_err(excel_error)?;
        sheet.write_string(row, 1, value).map_err(excel_error)?;
        row += 1;
    }

    row += 1;
    sheet
        .write_string_with_format(row, 0, "Key Metrics", &header_format)
        .map_err(excel_error)?;
    row += 1;

    let metrics = [
        ("Terminal Volume (bbl)", reconciliation.terminal_volume),
        ("Total Gross Volume (bbl)", result.total_gross_volume),
        ("Total Net Standard Volume (bbl)", result.total_net_volume_standard),
        ("Total Allocated Volume (bbl)", result.total_allocated_volume),
        ("Shrinkage Volume (bbl)", result.shrinkage_volume),
        ("Shrinkage (%)", result.shrinkage_percent),
        ("Volume Loss/Gain (bbl)", result.volume_loss_gain),
    ];
    for (label, value) in metrics {
        sheet.write_string(row, 0, label).map_err(excel_error)?;
        sheet
            .write_number_with_format(row, 1, value, &volume_format)
            .map_err(excel_error)?;
        row += 1;
    }

    sheet.set_column_width(0, 32).map_err(excel_error)?;
    sheet.set_column_width(1, 40).map_err(excel_error)?;

    Ok(())
}

fn write_allocations_sheet(sheet: &mut Worksheet, result: &ReconciliationResult) -> Result<()> {
    sheet.set_name("Partner Allocations").map_err(excel_error)?;

    let header_format = Format::new().set_bold();
    let number_format = Format::new().set_num_format("#,##0.00");
    let factor_format = Format::new().set_num_format("0.000000");
    let total_format = Format::new().set_bold().set_num_format("#,##0.00");

    let headers = [
        "Partner",
        "Gross Volume (bbl)",
        "BSW %",
        "Water Cut Factor",
        "Net Observed (bbl)",
        "Temp (°F)",
        "CTL",
        "API Gravity",
        "CPL",
        "Net Standard (bbl)",
        "Ownership %",
        "Allocated (bbl)",
    ];
    for (col, header) in headers.iter().enumerate() {
        sheet
            .write_string_with_format(0, col as u16, *header, &header_format)
            .map_err(excel_error)?;
    }

    for (idx, a) in result.partner_allocations.iter().enumerate() {
        let row = (idx + 1) as u32;
        sheet.write_string(row, 0, &a.partner_name).map_err(excel_error)?;

        let cells = [
            (1, a.gross_volume, &number_format),
            (2, a.bsw_percent, &number_format),
            (3, a.water_cut_factor, &factor_format),
            (4, a.net_volume_observed, &number_format),
            (5, a.observed_temperature, &number_format),
            (6, a.temperature_correction_factor, &factor_format),
            (7, a.api_gravity, &number_format),
            (8, a.api_correction_factor, &factor_format),
            (9, a.net_volume_standard, &number_format),
            (10, a.ownership_percent, &number_format),
            (11, a.allocated_volume, &number_format),
        ];
        for (col, value, format) in cells {
            sheet
                .write_number_with_format(row, col, value, format)
                .map_err(excel_error)?;
        }
    }

    let total_row = (result.partner_allocations.len() + 1) as u32;
    sheet
        .write_string_with_format(total_row, 0, "TOTAL", &header_format)
        .map_err(excel_error)?;
    let ownership_total: f64 = result
        .partner_allocations
        .iter()
        .map(|a| a.ownership_percent)
        .sum();
    let totals = [
        (1, result.total_gross_volume),
        (9, result.total_net_volume_standard),
        (10, ownership_total),
        (11, result.total_allocated_volume),
    ];
    for (col, value) in totals {
        sheet
            .write_number_with_format(total_row, col, value, &total_format)
            .map_err(excel_error)?;
    }

    sheet.set_column_width(0, 24).map_err(excel_error)?;
    for col in 1..headers.len() as u16 {
        sheet.set_column_width(col, 16).map_err(excel_error)?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    #[test]
    fn test_export_requires_result() {
        let dir = tempfile::tempdir().unwrap();
        let t = Utc.with_ymd_and_hms(2025, 8, 1, 0, 0, 0).unwrap();
        let recon = Reconciliation::new("t", "u", t, t, 10.0, t);
        let err = export_reconciliation(&recon, &dir.path().join("out.xlsx")).unwrap_err();
        assert!(matches!(err, Error::Reconciliation(_)));
        assert!(!dir.path().join("out.xlsx").exists());
    }
}
