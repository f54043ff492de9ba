pub mod extract;
pub mod router;
pub mod routes;

pub use router::{QuotebookState, quotebook_router};
