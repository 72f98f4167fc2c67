mod client;
mod prompts;
mod service;

pub use crate::error::GenerationError;
pub use client::{ChatCompletionsBackend, GenerationBackend};
pub use service::ContentGenerationService;
