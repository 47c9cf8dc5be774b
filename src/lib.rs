pub mod config;
pub mod error;
pub mod pipeline;
pub mod table;

pub use config::PipelineConfig;
pub use error::PipelineError;
pub use table::{IncidentTable, SemanticType};
