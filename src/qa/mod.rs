pub mod chunker;
pub mod generator;
pub mod keywords;
pub mod orchestrator;
pub mod relevance;
pub mod report;

pub use orchestrator::{
    parse_questions, Answer, AnswerSet, Orchestrator, QaMode, QaOptions, QuestionOutcome,
};
