use postal_sheet::RawRow;

use crate::reference::ReferenceMaps;
use crate::resolver::{process_row, RowOutcome};
use crate::types::ResolvedOffice;

/// Row 1 of the sheet is the header; the first data row is numbered 2.
pub const FIRST_DATA_ROW: usize = 2;

/// At most this many row errors appear verbatim in the failure report.
const MAX_REPORTED_ERRORS: usize = 10;

/// Accumulated result of resolving every row of one import, before any
/// persistence happens. Warnings and errors are disjoint: a row
/// contributes warnings or exactly one fatal error, never both.
#[derive(Debug, Default)]
pub struct BatchResult {
    pub offices: Vec<ResolvedOffice>,
    pub warnings: Vec<String>,
    pub errors: Vec<String>,
}

/// Resolves rows in file order, routing each outcome to the prepared
/// list or the fatal-error list. Row errors never abort the loop.
pub fn resolve_batch(rows: &[RawRow], maps: &ReferenceMaps) -> BatchResult {
    let mut result = BatchResult::default();

    for (index, raw) in rows.iter().enumerate() {
        let row_number = index + FIRST_DATA_ROW;
        match process_row(raw, maps, row_number) {
            RowOutcome::Prepared { office, warnings } => {
                result.offices.push(office);
                result.warnings.extend(warnings);
            }
            RowOutcome::Failed { error } => result.errors.push(error),
        }
    }

    result
}

/// Composite failure report: error count, the count of records that were
/// prepared, and the first ten error strings verbatim.
pub fn failure_message(errors: &[String], prepared: usize) -> String {
    let mut message = format!(
        "Import failed with {} errors. {} records were imported successfully.\n\nErrors:\n{}",
        errors.len(),
        prepared,
        errors
            .iter()
            .take(MAX_REPORTED_ERRORS)
            .cloned()
            .collect::<Vec<_>>()
            .join("\n"),
    );

    if errors.len() > MAX_REPORTED_ERRORS {
        message.push_str(&format!(
            "\n... and {} more errors",
            errors.len() - MAX_REPORTED_ERRORS
        ));
    }

    message
}

#[cfg(test)]
mod tests {
    use postal_sheet::Data;

    use super::*;
    use crate::types::Area;

    fn maps() -> ReferenceMaps {
        ReferenceMaps::new(
            vec![Area {
                id: 1,
                name: "Area 1".into(),
            }],
            vec![],
            vec![],
        )
    }

    fn text_row(area: &str, name: &str) -> RawRow {
        RawRow::new([
            Data::String(area.into()),
            Data::String(name.into()),
            Data::Empty,
            Data::Empty,
            Data::Empty,
            Data::Empty,
            Data::Empty,
        ])
    }

    fn error_row() -> RawRow {
        RawRow::new([
            Data::Error(postal_sheet::CellErrorType::NA),
            Data::Empty,
            Data::Empty,
            Data::Empty,
            Data::Empty,
            Data::Empty,
            Data::Empty,
        ])
    }

    #[test]
    fn rows_are_numbered_from_two() {
        let rows = vec![RawRow::empty(), text_row("AREA-1", "Pasig Post Office")];
        let batch = resolve_batch(&rows, &maps());
        assert_eq!(batch.offices.len(), 2);
        assert_eq!(
            batch.warnings,
            vec![
                "Row 2: Missing AREA".to_string(),
                "Row 2: Missing POST OFFICE NAME".to_string(),
            ]
        );
        assert!(batch.errors.is_empty());
    }

    #[test]
    fn failed_rows_are_excluded_but_processing_continues() {
        let rows = vec![
            error_row(),
            text_row("AREA-1", "Taguig Post Office"),
        ];
        let batch = resolve_batch(&rows, &maps());
        assert_eq!(batch.offices.len(), 1);
        assert_eq!(batch.errors.len(), 1);
        assert!(batch.errors[0].starts_with("Row 2: Unexpected error - "));
        assert!(batch.warnings.is_empty());
    }

    #[test]
    fn failure_message_reports_counts_and_verbatim_errors() {
        let errors: Vec<String> = (0..3).map(|i| format!("Row {}: boom", i + 2)).collect();
        let message = failure_message(&errors, 7);
        assert!(message.starts_with(
            "Import failed with 3 errors. 7 records were imported successfully.\n\nErrors:\n"
        ));
        for error in &errors {
            assert!(message.contains(error.as_str()));
        }
        assert!(!message.contains("more errors"));
    }

    #[test]
    fn failure_message_truncates_after_ten_errors() {
        let errors: Vec<String> = (0..14).map(|i| format!("Row {}: boom", i + 2)).collect();
        let message = failure_message(&errors, 0);
        assert!(message.contains("Import failed with 14 errors."));
        assert!(message.contains("Row 11: boom"));
        assert!(!message.contains("Row 12: boom"));
        assert!(message.ends_with("... and 4 more errors"));
    }
}
