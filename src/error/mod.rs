mod quotebook;

pub use quotebook::{ApiErrorBody, QuotebookError};

pub type Result<T, E = QuotebookError> = std::result::Result<T, E>;
