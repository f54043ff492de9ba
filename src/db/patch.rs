use serde::{Deserialize, Serialize};

// Re-export patch payloads from the neutral crate-private module.
// This keeps `quotebook::db::{AuthorPatch, QuotePatch}` stable.
pub use crate::patches::{AuthorPatch, QuotePatch};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthorCreate {
    pub name: String,
    pub surname: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuoteCreate {
    pub text: String,
    /// Already normalized to 1..=5 by the validation layer.
    pub rating: i64,
}
