// Public modules
pub mod message;
pub mod model;
pub mod stream;

// Re-exports
pub use message::{ChatMessage, MessageRole};
pub use model::Model;
pub use stream::{ChatCompletionChunk, ChatCompletionRequest, ChunkChoice, ChunkDelta};
