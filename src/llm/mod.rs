pub mod provider;
pub mod openai;
pub mod prompts;
pub mod parser;

pub use provider::{ChatMessage, CompletionProvider};
pub use openai::OpenAIProvider;
pub use prompts::ReviewPrompt;
pub use parser::interpret_response;
