pub mod config;
pub mod error;
pub mod logging;
pub mod models;
pub mod processor;
pub mod report;
pub mod storage;

pub use error::PipelineError;
