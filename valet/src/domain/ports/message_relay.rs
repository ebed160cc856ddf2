//! Port abstraction for relaying chat requests to a hosted model endpoint.

use crate::domain::chat::ChatRequest;

/// Errors raised when building or using a message relay.
///
/// Transport failures and unparsable replies are distinct variants of one
/// error type: callers with no differentiated handling treat them uniformly,
/// while the failure class stays visible in logs and messages.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MessageRelayError {
    /// The relay transport could not be constructed from configuration.
    #[error("relay configuration failed: {message}")]
    Configuration {
        /// Description of the configuration problem.
        message: String,
    },
    /// The remote call failed in transit: network, auth, throttling, or a
    /// request the provider rejected.
    #[error("relay transport failed: {message}")]
    Transport {
        /// Description of the transport failure.
        message: String,
    },
    /// The reply arrived but did not carry the expected content-block shape.
    #[error("relay response unparsable: {message}")]
    Response {
        /// Description of the parse failure.
        message: String,
    },
}

impl MessageRelayError {
    /// Build a [`MessageRelayError::Configuration`].
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    /// Build a [`MessageRelayError::Transport`].
    pub fn transport(message: impl Into<String>) -> Self {
        Self::Transport {
            message: message.into(),
        }
    }

    /// Build a [`MessageRelayError::Response`].
    pub fn response(message: impl Into<String>) -> Self {
        Self::Response {
            message: message.into(),
        }
    }
}

/// Port for submitting a chat exchange and receiving the reply text.
///
/// Each `send` is one fully completed round trip; implementations do not
/// retry, stream, or queue.
#[cfg_attr(test, mockall::automock)]
pub trait MessageRelay: Send + Sync {
    /// Submit the request and block until the reply text is available.
    fn send(&self, request: &ChatRequest) -> Result<String, MessageRelayError>;

    /// Convenience form wrapping `user_text` into a single-turn request.
    fn chat<'a>(&self, user_text: &str, system: Option<&'a str>) -> Result<String, MessageRelayError> {
        let mut request = ChatRequest::from_user(user_text);
        if let Some(system) = system {
            request = request.with_system(system);
        }
        self.send(&request)
    }
}

/// Fixture implementation returning a fixed reply.
#[derive(Debug, Clone)]
pub struct FixtureMessageRelay {
    reply: String,
}

impl FixtureMessageRelay {
    /// Build a fixture that answers every request with `reply`.
    pub fn new(reply: impl Into<String>) -> Self {
        Self {
            reply: reply.into(),
        }
    }
}

impl MessageRelay for FixtureMessageRelay {
    fn send(&self, _request: &ChatRequest) -> Result<String, MessageRelayError> {
        Ok(self.reply.clone())
    }
}

#[cfg(test)]
mod tests {
    //! Unit tests for the relay port surface.

    use std::sync::Mutex;

    use super::*;
    use rstest::rstest;

    /// Records the last submitted request so provided methods can be checked.
    #[derive(Default)]
    struct RecordingRelay {
        last: Mutex<Option<ChatRequest>>,
    }

    impl MessageRelay for RecordingRelay {
        fn send(&self, request: &ChatRequest) -> Result<String, MessageRelayError> {
            *self.last.lock().expect("lock should not be poisoned") = Some(request.clone());
            Ok("recorded".to_owned())
        }
    }

    #[rstest]
    fn chat_wraps_text_into_a_single_user_turn() {
        let relay = RecordingRelay::default();
        let reply = relay
            .chat("ping", Some("Reply with OK"))
            .expect("chat should succeed");
        assert_eq!(reply, "recorded");

        let recorded = relay
            .last
            .lock()
            .expect("lock should not be poisoned")
            .clone()
            .expect("request should be recorded");
        assert_eq!(recorded.messages().len(), 1);
        assert_eq!(recorded.messages()[0].content, "ping");
        assert_eq!(recorded.system(), Some("Reply with OK"));
    }

    #[rstest]
    fn chat_without_system_leaves_instruction_unset() {
        let relay = RecordingRelay::default();
        relay.chat("ping", None).expect("chat should succeed");

        let recorded = relay
            .last
            .lock()
            .expect("lock should not be poisoned")
            .clone()
            .expect("request should be recorded");
        assert!(recorded.system().is_none());
    }

    #[rstest]
    fn fixture_returns_the_canned_reply() {
        let relay = FixtureMessageRelay::new("canned");
        let reply = relay
            .send(&ChatRequest::from_user("anything"))
            .expect("fixture should never fail");
        assert_eq!(reply, "canned");
    }

    #[rstest]
    #[case(MessageRelayError::configuration("bad url"), "relay configuration failed: bad url")]
    #[case(MessageRelayError::transport("timed out"), "relay transport failed: timed out")]
    #[case(MessageRelayError::response("no text"), "relay response unparsable: no text")]
    fn errors_render_their_failure_class(
        #[case] error: MessageRelayError,
        #[case] rendered: &str,
    ) {
        assert_eq!(error.to_string(), rendered);
    }
}
