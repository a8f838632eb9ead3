use postal_sheet::{normalize, NormalizedRow, RawRow};

use crate::reference::ReferenceMaps;
use crate::types::ResolvedOffice;

/// Connectivity text values recognized as "connected". A closed set:
/// anything else silently maps to false.
const CONNECTED_VALUES: [&str; 5] = ["connected", "yes", "true", "1", "active"];

/// Per-row outcome: either a record ready for the batch together with
/// its soft issues, or a fatal condition that excludes the row.
#[derive(Debug)]
pub enum RowOutcome {
    Prepared {
        office: ResolvedOffice,
        warnings: Vec<String>,
    },
    Failed {
        error: String,
    },
}

/// Drives one raw row through normalization and resolution. A cell
/// carrying a spreadsheet error value is the malformed-cell case: the
/// row is abandoned with a fatal error and no partial record is emitted.
pub fn process_row(raw: &RawRow, maps: &ReferenceMaps, row_number: usize) -> RowOutcome {
    if let Some((column, err)) = raw.error_cell() {
        return RowOutcome::Failed {
            error: format!(
                "Row {row_number}: Unexpected error - {column} cell holds spreadsheet error value {err}"
            ),
        };
    }

    let row = normalize(raw);
    let (office, warnings) = resolve(&row, maps, row_number);
    RowOutcome::Prepared { office, warnings }
}

/// Resolves a normalized row against the loaded lookup tables. Always
/// produces a record: missing business data is surfaced as warnings, and
/// an unresolvable area never aborts the row.
pub fn resolve(
    row: &NormalizedRow,
    maps: &ReferenceMaps,
    row_number: usize,
) -> (ResolvedOffice, Vec<String>) {
    let mut warnings = Vec::new();

    let area_id = match row.area.as_deref() {
        None => {
            warnings.push(format!("Row {row_number}: Missing AREA"));
            None
        }
        Some(text) => match maps.area(&normalize_area_key(text)) {
            Some(area) => Some(area.id),
            None => {
                warnings.push(format!("Row {row_number}: Area not found: {text}"));
                None
            }
        },
    };

    if row.office_name.is_none() {
        warnings.push(format!("Row {row_number}: Missing POST OFFICE NAME"));
    }

    let longitude = row
        .longitude
        .and_then(|value| validate_longitude(value, row_number, &mut warnings));
    let latitude = row
        .latitude
        .and_then(|value| validate_latitude(value, row_number, &mut warnings));

    // Zip code is optional and both lookup misses are silent, so the
    // whole chain collapses to absent without a warning.
    let chain = row
        .zip_code
        .as_deref()
        .and_then(|zip| maps.barangay_name_for_zip(zip))
        .and_then(|name| maps.barangay(name));

    let office = ResolvedOffice {
        name: row.office_name.clone(),
        area_id,
        region_id: chain.and_then(|c| c.region_id),
        province_id: chain.and_then(|c| c.province_id),
        city_municipality_id: chain.and_then(|c| c.city_municipality_id),
        barangay_id: chain.map(|c| c.barangay_id),
        zip_code: row.zip_code.clone(),
        address: row.address.clone(),
        longitude,
        latitude,
        connected: convert_connectivity(row.connectivity.as_deref()),
    };

    (office, warnings)
}

/// Spreadsheets write `AREA-1` where the reference table says `Area 1`.
pub fn normalize_area_key(text: &str) -> String {
    text.replace("AREA-", "Area ")
}

fn validate_longitude(value: f64, row_number: usize, warnings: &mut Vec<String>) -> Option<f64> {
    if value < -180.0 || value > 180.0 {
        warnings.push(format!(
            "Row {row_number}: Invalid LONGITUDE {value} (must be between -180 and 180) - setting to null"
        ));
        return None;
    }
    Some(value)
}

fn validate_latitude(value: f64, row_number: usize, warnings: &mut Vec<String>) -> Option<f64> {
    if value < -90.0 || value > 90.0 {
        warnings.push(format!(
            "Row {row_number}: Invalid LATITUDE {value} (must be between -90 and 90) - setting to null"
        ));
        return None;
    }
    Some(value)
}

/// Absent or unrecognized text defaults to "not connected".
pub fn convert_connectivity(status: Option<&str>) -> bool {
    match status {
        None => false,
        Some(text) => {
            let lowered = text.trim().to_lowercase();
            CONNECTED_VALUES.contains(&lowered.as_str())
        }
    }
}
