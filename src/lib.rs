pub mod config;
pub mod db;
pub mod error;
pub mod server;
pub mod service;
pub mod store;
pub mod utils;
pub mod validation;

mod patches;

pub use error::QuotebookError;
pub use service::RecordService;
