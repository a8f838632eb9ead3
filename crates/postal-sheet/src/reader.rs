use std::io::Cursor;

use calamine::{open_workbook_auto_from_rs, Data, Range, Reader};

use crate::errors::SheetError;
use crate::model::{RawRow, COLUMN_COUNT};

/// Reads the first worksheet of a binary spreadsheet document into raw
/// rows. Row 0 is the header and is never returned; columns are bound by
/// index, not by header name.
pub fn read_rows(contents: &[u8]) -> Result<Vec<RawRow>, SheetError> {
    let cursor = Cursor::new(contents);
    let mut workbook = open_workbook_auto_from_rs(cursor)?;

    let range = match workbook.worksheet_range_at(0) {
        Some(range) => range?,
        None => return Err(SheetError::NoWorksheet),
    };

    Ok(rows_from_range(&range))
}

/// Extracts data rows from a worksheet range. Cells are addressed by
/// absolute position so a fully blank row inside the used range still
/// yields a `RawRow` of empty cells, keeping row numbering aligned with
/// the sheet.
pub fn rows_from_range(range: &Range<Data>) -> Vec<RawRow> {
    let Some((end_row, _)) = range.end() else {
        return Vec::new();
    };

    let mut rows = Vec::with_capacity(end_row as usize);
    for row in 1..=end_row {
        let cells: [Data; COLUMN_COUNT] = std::array::from_fn(|col| {
            range
                .get_value((row, col as u32))
                .cloned()
                .unwrap_or(Data::Empty)
        });
        rows.push(RawRow::new(cells));
    }
    rows
}
