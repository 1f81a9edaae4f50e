//! Answer generation from retrieved context

pub mod prompt;
pub mod synthesizer;

pub use prompt::PromptBuilder;
pub use synthesizer::AnswerSynthesizer;
