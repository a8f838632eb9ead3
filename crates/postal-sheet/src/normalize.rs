use calamine::Data;

use crate::model::RawRow;

/// Typed projection of a raw sheet row. Blank cells map to `None`, never
/// to the empty string.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct NormalizedRow {
    pub area: Option<String>,
    pub office_name: Option<String>,
    pub longitude: Option<f64>,
    pub latitude: Option<f64>,
    pub zip_code: Option<String>,
    pub address: Option<String>,
    pub connectivity: Option<String>,
}

/// Converts a raw row into its typed form. Total: every cell either
/// yields a value or the absent state.
pub fn normalize(raw: &RawRow) -> NormalizedRow {
    NormalizedRow {
        area: text_cell(raw.area()),
        office_name: text_cell(raw.office_name()),
        longitude: numeric_cell(raw.longitude()),
        latitude: numeric_cell(raw.latitude()),
        zip_code: text_cell(raw.zip_code()),
        address: text_cell(raw.address()),
        connectivity: text_cell(raw.connectivity()),
    }
}

/// Text reading of a cell. A numeric cell in a text position becomes its
/// truncated integer representation; downstream area and zip matching is
/// by exact string equality, so the coercion must stay integral.
fn text_cell(cell: &Data) -> Option<String> {
    match cell {
        Data::String(value) => {
            let trimmed = value.trim();
            if trimmed.is_empty() {
                None
            } else {
                Some(trimmed.to_string())
            }
        }
        Data::Float(value) => Some((value.trunc() as i64).to_string()),
        Data::Int(value) => Some(value.to_string()),
        _ => None,
    }
}

/// Numeric reading of a cell. Only cells already stored as numbers
/// produce a value; numeric-looking text is not coerced.
fn numeric_cell(cell: &Data) -> Option<f64> {
    match cell {
        Data::Float(value) => Some(*value),
        Data::Int(value) => Some(*value as f64),
        _ => None,
    }
}
