use thiserror::Error;

use super::fields::ColumnRole;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ExtractError {
    /// Header row without an `Actions` column. Callers skip the table.
    #[error("unrecognized table shape, headers: {headers:?}")]
    ShapeMismatch { headers: Vec<String> },

    #[error("required column missing: {}", .column.header())]
    FieldMissing { column: ColumnRole },

    /// Action cell empty after stitching; there is no key to aggregate under.
    #[error("row has an empty action name")]
    ActionMissing,

    #[error("service page has no prefix element (div#main-col-body code)")]
    PrefixMissing,
}
