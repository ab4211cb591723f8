use serde::{Deserialize, Serialize};

use crate::types::{ChatMessage, Model};

/// Request body for the chat-completions endpoint.
///
/// The full conversation history, including the system message, is sent on
/// every call.
#[derive(Debug, Clone, Serialize)]
pub struct ChatCompletionRequest {
    /// The model to complete with.
    pub model: Model,

    /// The ordered conversation history.
    pub messages: Vec<ChatMessage>,

    /// Whether to stream the response as server-sent events.
    pub stream: bool,
}

impl ChatCompletionRequest {
    /// Create a new streaming request.
    pub fn streaming(model: Model, messages: Vec<ChatMessage>) -> Self {
        Self {
            model,
            messages,
            stream: true,
        }
    }
}

/// One server-sent chunk of a streamed chat completion.
#[derive(Debug, Clone, Deserialize)]
pub struct ChatCompletionChunk {
    /// The choices for this chunk; streaming responses carry one.
    pub choices: Vec<ChunkChoice>,
}

/// A single choice within a streamed chunk.
#[derive(Debug, Clone, Deserialize)]
pub struct ChunkChoice {
    /// The incremental delta for this choice.
    pub delta: ChunkDelta,

    /// Why the stream finished, present only on the final chunk.
    #[serde(default)]
    pub finish_reason: Option<String>,
}

/// The incremental payload of a streamed choice.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ChunkDelta {
    /// The role, present only on the first chunk.
    #[serde(default)]
    pub role: Option<String>,

    /// The next fragment of completion text, if any.
    #[serde(default)]
    pub content: Option<String>,
}

impl ChatCompletionChunk {
    /// Returns the text fragment carried by this chunk, if any.
    pub fn fragment(&self) -> Option<&str> {
        self.choices
            .first()
            .and_then(|choice| choice.delta.content.as_deref())
            .filter(|content| !content.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::MessageRole;
    use serde_json::{json, to_value};

    #[test]
    fn request_serialization() {
        let request = ChatCompletionRequest::streaming(
            Model::Gpt4o,
            vec![
                ChatMessage::system("You are helpful."),
                ChatMessage::user("hello"),
            ],
        );
        let json = to_value(&request).unwrap();

        assert_eq!(
            json,
            json!({
                "model": "gpt-4o",
                "messages": [
                    {"role": "system", "content": "You are helpful."},
                    {"role": "user", "content": "hello"}
                ],
                "stream": true
            })
        );
    }

    #[test]
    fn chunk_fragment() {
        let chunk: ChatCompletionChunk = serde_json::from_value(json!({
            "choices": [{"delta": {"content": "Hi"}}]
        }))
        .unwrap();
        assert_eq!(chunk.fragment(), Some("Hi"));
    }

    #[test]
    fn chunk_without_content() {
        // The first chunk of a stream carries only the role.
        let chunk: ChatCompletionChunk = serde_json::from_value(json!({
            "choices": [{"delta": {"role": "assistant"}}]
        }))
        .unwrap();
        assert_eq!(chunk.fragment(), None);
    }

    #[test]
    fn final_chunk_has_finish_reason() {
        let chunk: ChatCompletionChunk = serde_json::from_value(json!({
            "choices": [{"delta": {}, "finish_reason": "stop"}]
        }))
        .unwrap();
        assert_eq!(chunk.fragment(), None);
        assert_eq!(chunk.choices[0].finish_reason.as_deref(), Some("stop"));
    }

    #[test]
    fn empty_choices() {
        let chunk: ChatCompletionChunk =
            serde_json::from_value(json!({"choices": []})).unwrap();
        assert_eq!(chunk.fragment(), None);
    }

    #[test]
    fn message_roles_round_trip_on_the_wire() {
        let message = ChatMessage::new(MessageRole::Assistant, "done");
        let json = to_value(&message).unwrap();
        let back: ChatMessage = serde_json::from_value(json).unwrap();
        assert_eq!(back, message);
    }
}
