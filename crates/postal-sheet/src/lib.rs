pub mod errors;
pub mod model;
pub mod normalize;
pub mod reader;

pub use calamine::{CellErrorType, Data};
pub use errors::SheetError;
pub use model::{RawRow, COLUMN_COUNT, COLUMN_NAMES};
pub use normalize::{normalize, NormalizedRow};
pub use reader::{read_rows, rows_from_range};
