use calamine::{CellErrorType, Data};

/// Number of positionally-bound columns in an import sheet.
pub const COLUMN_COUNT: usize = 7;

/// Column labels in sheet order, used when reporting malformed cells.
pub const COLUMN_NAMES: [&str; COLUMN_COUNT] = [
    "AREA",
    "POST OFFICE NAME",
    "LONGITUDE",
    "LATITUDE",
    "ZIP CODE",
    "ADDRESS LINE1",
    "CONNECTIVITY STATUS",
];

/// One data row exactly as it appears in the worksheet: seven cells
/// addressed by index, missing cells filled with `Data::Empty`.
#[derive(Debug, Clone, PartialEq)]
pub struct RawRow {
    cells: [Data; COLUMN_COUNT],
}

impl RawRow {
    pub fn new(cells: [Data; COLUMN_COUNT]) -> Self {
        Self { cells }
    }

    /// A row with every cell blank.
    pub fn empty() -> Self {
        Self {
            cells: std::array::from_fn(|_| Data::Empty),
        }
    }

    pub fn cell(&self, index: usize) -> &Data {
        &self.cells[index]
    }

    pub fn area(&self) -> &Data {
        &self.cells[0]
    }

    pub fn office_name(&self) -> &Data {
        &self.cells[1]
    }

    pub fn longitude(&self) -> &Data {
        &self.cells[2]
    }

    pub fn latitude(&self) -> &Data {
        &self.cells[3]
    }

    pub fn zip_code(&self) -> &Data {
        &self.cells[4]
    }

    pub fn address(&self) -> &Data {
        &self.cells[5]
    }

    pub fn connectivity(&self) -> &Data {
        &self.cells[6]
    }

    /// Returns the first cell carrying a spreadsheet error value
    /// (`#DIV/0!`, `#N/A`, ...) together with its column label.
    pub fn error_cell(&self) -> Option<(&'static str, &CellErrorType)> {
        self.cells.iter().enumerate().find_map(|(idx, cell)| {
            if let Data::Error(err) = cell {
                Some((COLUMN_NAMES[idx], err))
            } else {
                None
            }
        })
    }
}
