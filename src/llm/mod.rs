// Language-model boundary
//
// Provides:
// - The synchronous chat-completion trait and an Ollama client
// - Best-effort parsing of planner replies

pub mod client;
pub mod parse;

pub use client::{ChatCompletion, LlmError, OllamaClient};
pub use parse::parse_path;
