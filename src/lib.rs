pub mod config;
pub mod document;
pub mod error;
pub mod providers;
pub mod qa;

// Re-export commonly used items
pub use document::{Document, ExtractionCache, MediaType, TextExtractor};
pub use error::{LlmError, PipelineError};
pub use qa::{Answer, AnswerSet, Orchestrator, QaMode, QaOptions, QuestionOutcome};
