pub mod aggregator;
pub mod cleaner;
pub mod joiner;
pub mod pipeline;
pub mod ranker;
pub mod rounding;
pub mod schema_validator;

pub use aggregator::*;
pub use cleaner::*;
pub use joiner::*;
pub use pipeline::*;
pub use ranker::*;
pub use rounding::*;
pub use schema_validator::*;
