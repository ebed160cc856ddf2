//! Invoke-model relay adapter speaking the Bedrock-style wire contract.

use ortho_config::OrthoConfig;
use serde::{Deserialize, Serialize};
use tracing::debug;
use url::Url;

use crate::config::RelaySettings;
use crate::domain::ports::{MessageRelay, MessageRelayError};
use crate::domain::{ChatMessage, ChatRequest};

/// Protocol version tag carried in every request envelope.
const ANTHROPIC_VERSION: &str = "bedrock-2023-05-31";

/// Relay adapter that submits chat requests to a hosted invoke-model
/// endpoint and extracts the reply text.
///
/// The invoke URL is fixed at construction from the configured region (or an
/// explicit endpoint override) and model identifier. Construction does not
/// validate reachability; the first `send` does.
#[derive(Debug, Clone)]
pub struct BedrockMessageRelay {
    http: reqwest::blocking::Client,
    invoke_url: Url,
    api_key: Option<String>,
}

impl BedrockMessageRelay {
    /// Build the relay transport from settings.
    ///
    /// Only transport-construction problems (a malformed endpoint or model
    /// routing) yield [`MessageRelayError::Configuration`].
    pub fn new(settings: &RelaySettings) -> Result<Self, MessageRelayError> {
        let endpoint = settings.endpoint.clone().unwrap_or_else(|| {
            format!("https://bedrock-runtime.{}.amazonaws.com", settings.region())
        });
        let invoke_url = Url::parse(&format!(
            "{}/model/{}/invoke",
            endpoint.trim_end_matches('/'),
            settings.model_id()
        ))
        .map_err(|error| {
            MessageRelayError::configuration(format!("invalid relay endpoint: {error}"))
        })?;

        let http = reqwest::blocking::Client::builder().build().map_err(|error| {
            MessageRelayError::configuration(format!("build relay transport: {error}"))
        })?;

        Ok(Self {
            http,
            invoke_url,
            api_key: settings.api_key.clone(),
        })
    }

    /// Build the relay with settings read from the process environment.
    pub fn from_env() -> Result<Self, MessageRelayError> {
        let settings = RelaySettings::load_from_iter([std::ffi::OsString::from("valet")])
            .map_err(|error| {
                MessageRelayError::configuration(format!("load relay settings: {error}"))
            })?;
        Self::new(&settings)
    }

    /// The resolved invoke URL.
    pub fn invoke_url(&self) -> &Url {
        &self.invoke_url
    }
}

impl MessageRelay for BedrockMessageRelay {
    fn send(&self, request: &ChatRequest) -> Result<String, MessageRelayError> {
        let envelope = InvokeRequest::from_chat(request);

        debug!(url = %self.invoke_url, turns = request.messages().len(), "relay request");
        let mut call = self.http.post(self.invoke_url.clone()).json(&envelope);
        if let Some(api_key) = &self.api_key {
            call = call.bearer_auth(api_key);
        }

        let response = call
            .send()
            .map_err(|error| MessageRelayError::transport(error.to_string()))?;
        let status = response.status();
        let body = response
            .text()
            .map_err(|error| MessageRelayError::transport(error.to_string()))?;

        if !status.is_success() {
            return Err(MessageRelayError::transport(format!(
                "relay returned {status}: {}",
                snippet(&body)
            )));
        }

        extract_reply(&body)
    }
}

/// Request envelope for the invoke-model wire contract.
#[derive(Debug, Serialize)]
struct InvokeRequest<'a> {
    anthropic_version: &'static str,
    max_tokens: u32,
    messages: &'a [ChatMessage],
    #[serde(skip_serializing_if = "Option::is_none")]
    system: Option<&'a str>,
}

impl<'a> InvokeRequest<'a> {
    fn from_chat(request: &'a ChatRequest) -> Self {
        Self {
            anthropic_version: ANTHROPIC_VERSION,
            max_tokens: request.max_tokens(),
            messages: request.messages(),
            system: request.system(),
        }
    }
}

/// Reply body; only the content blocks are modelled.
#[derive(Debug, Deserialize)]
struct InvokeResponse {
    #[serde(default)]
    content: Vec<ContentBlock>,
}

#[derive(Debug, Deserialize)]
struct ContentBlock {
    #[serde(default)]
    text: Option<String>,
}

/// Extract the first content block's text from a reply body.
fn extract_reply(body: &str) -> Result<String, MessageRelayError> {
    let parsed: InvokeResponse = serde_json::from_str(body)
        .map_err(|error| MessageRelayError::response(format!("decode response body: {error}")))?;

    let Some(block) = parsed.content.into_iter().next() else {
        return Err(MessageRelayError::response(
            "response contained no content blocks",
        ));
    };
    block
        .text
        .ok_or_else(|| MessageRelayError::response("first content block carries no text"))
}

/// Bound a body for inclusion in an error message.
fn snippet(body: &str) -> String {
    body.chars().take(200).collect()
}
