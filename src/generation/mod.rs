pub mod articles;
pub mod extract;
pub mod images;
pub mod llm;
pub mod prompts;
pub mod text;

pub use articles::ArticleGenerator;
pub use extract::{MalformedResponse, extract_json_payload};
pub use images::ImageRegenerator;
pub use llm::{LlmClient, LlmError};
pub use prompts::{Picker, UniformPicker};
