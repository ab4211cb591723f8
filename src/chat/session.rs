//! Core chat session management.
//!
//! This module provides the `ChatSession` struct which owns conversation
//! state and drives streaming completion turns through the
//! [`CompletionTransport`] seam.

use std::pin::Pin;
use std::sync::atomic::{AtomicBool, Ordering};

use futures::Stream;
use futures::stream::StreamExt;
use time::OffsetDateTime;
use time::macros::format_description;

use crate::chat::config::ChatConfig;
use crate::chat::render::Renderer;
use crate::client::OpenAi;
use crate::error::Result;
use crate::observability::{CHAT_INTERRUPTS, CHAT_TURNS};
use crate::types::{ChatCompletionRequest, ChatMessage, Model};

/// A stream of incremental completion text fragments.
pub type FragmentStream = Pin<Box<dyn Stream<Item = Result<String>> + Send>>;

/// The seam between the chat session and a completion API.
///
/// The session passes the full conversation history, system message included,
/// on every call. Tests substitute a scripted implementation.
#[async_trait::async_trait]
pub trait CompletionTransport: Send + Sync {
    /// Open a streamed completion for the given model and history.
    async fn fragments(&self, model: Model, messages: &[ChatMessage]) -> Result<FragmentStream>;
}

#[async_trait::async_trait]
impl CompletionTransport for OpenAi {
    async fn fragments(&self, model: Model, messages: &[ChatMessage]) -> Result<FragmentStream> {
        let request = ChatCompletionRequest::streaming(model, messages.to_vec());
        let chunks = self.stream_chat(request).await?;
        Ok(Box::pin(chunks.filter_map(|chunk| async move {
            match chunk {
                Ok(chunk) => chunk.fragment().map(|fragment| Ok(fragment.to_string())),
                Err(err) => Some(Err(err)),
            }
        })))
    }
}

/// A chat session that manages conversation state and API interactions.
///
/// The session maintains message history and handles streaming responses.
/// Invariant: the first history entry is always the system message, so the
/// history is never empty.
pub struct ChatSession<T: CompletionTransport> {
    transport: T,
    config: ChatConfig,
    history: Vec<ChatMessage>,
}

impl<T: CompletionTransport> ChatSession<T> {
    /// Creates a new chat session with the given transport and configuration.
    pub fn new(transport: T, config: ChatConfig) -> Self {
        let mut session = Self {
            transport,
            config,
            history: Vec::new(),
        };
        session.reset();
        session
    }

    /// Discards the conversation and reinitializes it to just the system
    /// prompt.
    pub fn reset(&mut self) {
        self.history.clear();
        self.history.push(ChatMessage::system(system_prompt()));
    }

    /// Returns the current model.
    pub fn model(&self) -> Model {
        self.config.model
    }

    /// Advances to the next model in the allow-list, wrapping around, and
    /// returns the newly selected model.
    pub fn cycle_model(&mut self) -> Model {
        self.config.model = self.config.model.next();
        self.config.model
    }

    /// Returns the conversation history in chronological order.
    pub fn history(&self) -> &[ChatMessage] {
        &self.history
    }

    /// Returns the most recent conversation message.
    ///
    /// Immediately after construction or reset this is the system message;
    /// the copy commands operate on it regardless of role.
    pub fn last_message(&self) -> &ChatMessage {
        self.history
            .last()
            .expect("history always holds the system message")
    }

    /// Sends a user message and streams the response.
    ///
    /// This method:
    /// 1. Adds the user message to history
    /// 2. Opens a fragment stream through the transport
    /// 3. Renders fragments as they arrive, accumulating them in a buffer
    /// 4. Adds the complete assistant response to history
    ///
    /// The `interrupted` flag is polled between fragments; when it is set the
    /// turn is abandoned, and the partially accumulated buffer is kept as an
    /// assistant message only if the configuration says so.
    ///
    /// # Errors
    ///
    /// Returns an error if the transport fails; the user message stays in
    /// history and no partial assistant message is appended.
    pub async fn send_streaming(
        &mut self,
        user_input: &str,
        renderer: &mut dyn Renderer,
        interrupted: &AtomicBool,
    ) -> Result<()> {
        CHAT_TURNS.click();
        self.history.push(ChatMessage::user(user_input));

        let mut stream = self
            .transport
            .fragments(self.config.model, &self.history)
            .await?;

        let mut buffer = String::new();
        loop {
            if interrupted.load(Ordering::Relaxed) {
                CHAT_INTERRUPTS.click();
                // Dropping the stream closes the underlying transport.
                drop(stream);
                renderer.print_interrupted();
                if self.config.keep_partial_on_interrupt && !buffer.is_empty() {
                    self.history.push(ChatMessage::assistant(buffer));
                }
                return Ok(());
            }

            match stream.next().await {
                Some(Ok(fragment)) => {
                    renderer.print_text(&fragment);
                    buffer.push_str(&fragment);
                }
                Some(Err(err)) => return Err(err),
                None => break,
            }
        }

        self.history.push(ChatMessage::assistant(buffer));
        renderer.finish_response();
        Ok(())
    }

    #[cfg(test)]
    pub(crate) fn push_message(&mut self, message: ChatMessage) {
        self.history.push(message);
    }
}

/// The fixed system prompt, stamped with the session start date.
fn system_prompt() -> String {
    let date_format = format_description!("[year]-[month]-[day]");
    let today = OffsetDateTime::now_utc()
        .date()
        .format(&date_format)
        .unwrap_or_else(|_| "unknown".to_string());
    format!(
        "You are an AI assistant called purrl, you use semi-formal language \
         and are generally quite concise. Your user is an experienced \
         computer programmer.\n\nThe current date is: {today}"
    )
}

#[cfg(test)]
pub(crate) mod testing {
    //! Scripted fakes shared by the chat test suites.

    use std::sync::Arc;
    use std::sync::atomic::{AtomicBool, Ordering};

    use futures::stream::{self, StreamExt};

    use super::{CompletionTransport, FragmentStream};
    use crate::chat::clipboard::Clipboard;
    use crate::chat::render::Renderer;
    use crate::error::{Error, Result};
    use crate::types::{ChatMessage, Model};

    /// Transport that replays a fixed script of fragments.
    pub(crate) struct ScriptedTransport {
        script: Vec<Result<String>>,
    }

    impl ScriptedTransport {
        pub(crate) fn new(script: Vec<Result<String>>) -> Self {
            Self { script }
        }

        pub(crate) fn fragments(fragments: &[&str]) -> Self {
            Self::new(fragments.iter().map(|f| Ok(f.to_string())).collect())
        }

        pub(crate) fn empty() -> Self {
            Self::new(Vec::new())
        }

        pub(crate) fn failing_after(fragments: &[&str], error: Error) -> Self {
            let mut script: Vec<Result<String>> =
                fragments.iter().map(|f| Ok(f.to_string())).collect();
            script.push(Err(error));
            Self::new(script)
        }
    }

    #[async_trait::async_trait]
    impl CompletionTransport for ScriptedTransport {
        async fn fragments(
            &self,
            _model: Model,
            _messages: &[ChatMessage],
        ) -> Result<FragmentStream> {
            Ok(Box::pin(stream::iter(self.script.clone())))
        }
    }

    /// Transport whose stream raises the interrupt flag after each yielded
    /// fragment, simulating ctrl-C arriving mid-stream.
    pub(crate) struct InterruptingTransport {
        pub(crate) flag: Arc<AtomicBool>,
        pub(crate) script: Vec<&'static str>,
    }

    #[async_trait::async_trait]
    impl CompletionTransport for InterruptingTransport {
        async fn fragments(
            &self,
            _model: Model,
            _messages: &[ChatMessage],
        ) -> Result<FragmentStream> {
            let flag = Arc::clone(&self.flag);
            let fragments: Vec<Result<String>> =
                self.script.iter().map(|f| Ok(f.to_string())).collect();
            Ok(Box::pin(stream::iter(fragments).inspect(move |_| {
                flag.store(true, Ordering::Relaxed);
            })))
        }
    }

    /// Renderer that records everything it is asked to print.
    #[derive(Default)]
    pub(crate) struct RecordingRenderer {
        pub(crate) text: String,
        pub(crate) infos: Vec<String>,
        pub(crate) errors: Vec<String>,
        pub(crate) rules: Vec<String>,
        pub(crate) interrupted: bool,
        pub(crate) finished: bool,
    }

    impl Renderer for RecordingRenderer {
        fn print_text(&mut self, text: &str) {
            self.text.push_str(text);
        }

        fn print_info(&mut self, info: &str) {
            self.infos.push(info.to_string());
        }

        fn print_error(&mut self, error: &str) {
            self.errors.push(error.to_string());
        }

        fn rule(&mut self, title: &str) {
            self.rules.push(title.to_string());
        }

        fn finish_response(&mut self) {
            self.finished = true;
        }

        fn print_interrupted(&mut self) {
            self.interrupted = true;
        }
    }

    /// In-memory clipboard for tests.
    #[derive(Default)]
    pub(crate) struct FakeClipboard {
        pub(crate) contents: Option<String>,
        pub(crate) fail: bool,
    }

    impl Clipboard for FakeClipboard {
        fn set_text(&mut self, text: &str) -> Result<()> {
            if self.fail {
                return Err(Error::clipboard("clipboard unavailable"));
            }
            self.contents = Some(text.to_string());
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::sync::atomic::AtomicBool;

    use super::testing::{
        InterruptingTransport, RecordingRenderer, ScriptedTransport,
    };
    use super::*;
    use crate::error::Error;
    use crate::types::MessageRole;

    fn session(transport: ScriptedTransport) -> ChatSession<ScriptedTransport> {
        ChatSession::new(transport, ChatConfig::default())
    }

    #[test]
    fn new_session_holds_only_the_system_prompt() {
        let session = session(ScriptedTransport::empty());
        assert_eq!(session.history().len(), 1);
        assert_eq!(session.history()[0].role, MessageRole::System);
        assert!(!session.history()[0].content.is_empty());
    }

    #[test]
    fn last_message_before_any_turn_is_the_system_prompt() {
        let session = session(ScriptedTransport::empty());
        assert_eq!(session.last_message().role, MessageRole::System);
    }

    #[test]
    fn reset_is_idempotent_in_structure() {
        let mut session = session(ScriptedTransport::empty());
        session.push_message(ChatMessage::user("hello"));
        session.push_message(ChatMessage::assistant("hi"));
        assert_eq!(session.history().len(), 3);

        for _ in 0..3 {
            session.reset();
            assert_eq!(session.history().len(), 1);
            assert_eq!(session.history()[0].role, MessageRole::System);
        }
    }

    #[test]
    fn cycle_model_wraps_around() {
        let mut session = session(ScriptedTransport::empty());
        let start = session.model();
        for _ in 0..Model::ALL.len() {
            session.cycle_model();
        }
        assert_eq!(session.model(), start);
    }

    #[tokio::test]
    async fn streamed_turn_appends_user_and_assistant_messages() {
        let mut session = session(ScriptedTransport::fragments(&["Hi", " there"]));
        let mut renderer = RecordingRenderer::default();
        let interrupted = AtomicBool::new(false);

        session
            .send_streaming("hello", &mut renderer, &interrupted)
            .await
            .unwrap();

        let history = session.history();
        assert_eq!(history.len(), 3);
        assert_eq!(history[1].role, MessageRole::User);
        assert_eq!(history[1].content, "hello");
        assert_eq!(history[2].role, MessageRole::Assistant);
        assert_eq!(history[2].content, "Hi there");
        assert_eq!(renderer.text, "Hi there");
        assert!(renderer.finished);
    }

    #[tokio::test]
    async fn empty_stream_appends_empty_assistant_message() {
        let mut session = session(ScriptedTransport::empty());
        let mut renderer = RecordingRenderer::default();
        let interrupted = AtomicBool::new(false);

        session
            .send_streaming("hello", &mut renderer, &interrupted)
            .await
            .unwrap();

        assert_eq!(session.history().len(), 3);
        assert_eq!(session.last_message().content, "");
    }

    #[tokio::test]
    async fn interrupt_discards_partial_response_by_default() {
        let flag = Arc::new(AtomicBool::new(false));
        let transport = InterruptingTransport {
            flag: Arc::clone(&flag),
            script: vec!["Hi", " there"],
        };
        let mut session = ChatSession::new(transport, ChatConfig::default());
        let mut renderer = RecordingRenderer::default();

        session
            .send_streaming("hello", &mut renderer, &flag)
            .await
            .unwrap();

        assert!(renderer.interrupted);
        // Only system + user survive the interrupted turn.
        assert_eq!(session.history().len(), 2);
        assert_eq!(session.last_message().role, MessageRole::User);
    }

    #[tokio::test]
    async fn interrupt_keeps_partial_response_when_configured() {
        let flag = Arc::new(AtomicBool::new(false));
        let transport = InterruptingTransport {
            flag: Arc::clone(&flag),
            script: vec!["Hi", " there"],
        };
        let config = ChatConfig::default().with_keep_partial(true);
        let mut session = ChatSession::new(transport, config);
        let mut renderer = RecordingRenderer::default();

        session
            .send_streaming("hello", &mut renderer, &flag)
            .await
            .unwrap();

        assert!(renderer.interrupted);
        let last = session.last_message();
        assert_eq!(last.role, MessageRole::Assistant);
        assert_eq!(last.content, "Hi");
    }

    #[tokio::test]
    async fn interrupt_before_first_fragment_appends_nothing() {
        let mut session = ChatSession::new(
            ScriptedTransport::fragments(&["Hi"]),
            ChatConfig::default().with_keep_partial(true),
        );
        let mut renderer = RecordingRenderer::default();
        let interrupted = AtomicBool::new(true);

        session
            .send_streaming("hello", &mut renderer, &interrupted)
            .await
            .unwrap();

        assert!(renderer.interrupted);
        assert_eq!(session.last_message().role, MessageRole::User);
    }

    #[tokio::test]
    async fn transport_error_preserves_history_without_partial() {
        let transport = ScriptedTransport::failing_after(
            &["Hi"],
            Error::streaming("connection reset", None),
        );
        let mut session = ChatSession::new(transport, ChatConfig::default());
        let mut renderer = RecordingRenderer::default();
        let interrupted = AtomicBool::new(false);

        let err = session
            .send_streaming("hello", &mut renderer, &interrupted)
            .await
            .unwrap_err();

        assert!(err.is_streaming());
        assert_eq!(session.history().len(), 2);
        assert_eq!(session.last_message().role, MessageRole::User);
    }

    #[test]
    fn system_prompt_embeds_a_date() {
        let prompt = system_prompt();
        assert!(prompt.contains("The current date is: "));
    }
}
