//! The assistant service: routes operator turns through the message relay
//! and drives the store/relay health probes used by the one-shot CLI mode.

use std::io::{self, BufRead, Write};

use serde_json::Value;
use tracing::{info, warn};

use crate::config::StoreSettings;
use crate::domain::chat::ChatRequest;
use crate::domain::ports::{MessageRelay, MessageRelayError};
use crate::outbound::persistence::{TenantStore, TenantStoreError};

/// System instruction fixed for every relayed turn.
pub const SYSTEM_PROMPT: &str = "You are Valet, a helpful personal assistant.\n\n\
You help with:\n\
- Email summarisation and management\n\
- Calendar organisation\n\
- Daily briefings\n\
- Task prioritisation\n\n\
Be concise, professional, and proactive.";

/// Prompt used to probe the relay during a health check.
const RELAY_PROBE_PROMPT: &str = "Say 'Valet online' in three words or fewer";

/// A personal assistant bound to one tenant and one relay handle.
pub struct Assistant<R> {
    relay: R,
    tenant_id: String,
}

impl<R: MessageRelay> Assistant<R> {
    /// Build an assistant for the given tenant.
    pub fn new(relay: R, tenant_id: impl Into<String>) -> Self {
        Self {
            relay,
            tenant_id: tenant_id.into(),
        }
    }

    /// The tenant this assistant opens store sessions as.
    pub fn tenant_id(&self) -> &str {
        &self.tenant_id
    }

    /// Relay one operator turn and return the reply text.
    pub fn respond(&self, user_text: &str) -> Result<String, MessageRelayError> {
        let request = ChatRequest::from_user(user_text).with_system(SYSTEM_PROMPT);
        self.relay.send(&request)
    }

    /// Probe the store and the relay, reporting each result to `output`.
    ///
    /// Returns whether both probes passed. Probe failures are reported, not
    /// propagated; I/O errors writing the report itself are.
    pub fn health_check(
        &self,
        store_settings: &StoreSettings,
        output: &mut impl Write,
    ) -> io::Result<bool> {
        writeln!(output, "running health check...")?;

        let store_ok = match self.probe_store(store_settings) {
            Ok(version) => {
                info!(%version, "store probe succeeded");
                writeln!(output, "store: ok ({version})")?;
                true
            }
            Err(error) => {
                warn!(%error, "store probe failed");
                writeln!(output, "store: FAILED: {error}")?;
                false
            }
        };

        let relay_ok = match self.probe_relay() {
            Ok(reply) => {
                info!(%reply, "relay probe succeeded");
                writeln!(output, "relay: ok ({reply})")?;
                true
            }
            Err(error) => {
                warn!(%error, "relay probe failed");
                writeln!(output, "relay: FAILED: {error}")?;
                false
            }
        };

        if store_ok && relay_ok {
            writeln!(output, "all systems operational")?;
        }
        Ok(store_ok && relay_ok)
    }

    fn probe_store(&self, settings: &StoreSettings) -> Result<String, TenantStoreError> {
        let mut store = TenantStore::open(settings, Some(&self.tenant_id))?;
        let rows = store.execute("SELECT version()", &[])?;
        let version = rows
            .first()
            .and_then(|row| row.get("version"))
            .and_then(Value::as_str)
            .unwrap_or("unknown")
            .to_owned();
        store.close();
        Ok(version)
    }

    fn probe_relay(&self) -> Result<String, MessageRelayError> {
        let request = ChatRequest::from_user(RELAY_PROBE_PROMPT).with_system(SYSTEM_PROMPT);
        self.relay.send(&request)
    }
}

/// Drive the interactive operator loop until `quit` or end of input.
///
/// Relay failures abort only the current turn; the loop continues to the
/// next prompt. Every turn is a fully completed round trip before the next
/// prompt is shown.
pub fn run_interactive<R: MessageRelay>(
    assistant: &Assistant<R>,
    input: &mut impl BufRead,
    output: &mut impl Write,
) -> io::Result<()> {
    writeln!(output, "Valet agent (interactive mode)")?;
    writeln!(output, "Type 'quit' to exit")?;

    loop {
        write!(output, "you: ")?;
        output.flush()?;

        let mut line = String::new();
        if input.read_line(&mut line)? == 0 {
            break;
        }
        let turn = line.trim();
        if turn.is_empty() {
            continue;
        }
        if matches!(turn.to_lowercase().as_str(), "quit" | "exit" | "q") {
            writeln!(output, "goodbye")?;
            break;
        }

        match assistant.respond(turn) {
            Ok(reply) => writeln!(output, "\nvalet: {reply}\n")?,
            Err(error) => writeln!(output, "error: {error}")?,
        }
    }

    Ok(())
}
