//! Data model for the change feed and the derived dimension history.

mod change_record;
mod row;
mod scd2_row;
mod state;
mod value;

pub use change_record::{ChangeRecord, ChangeType};
pub use row::AttributeRow;
pub use scd2_row::Scd2Row;
pub use state::{DimensionState, SourceRow};
pub use value::AttributeValue;
