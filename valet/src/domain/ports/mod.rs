//! Domain ports for the access-layer boundary.

mod message_relay;

#[cfg(test)]
pub use message_relay::MockMessageRelay;
pub use message_relay::{FixtureMessageRelay, MessageRelay, MessageRelayError};
