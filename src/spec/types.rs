use serde_json::Value;

/// Which way messages flow through a channel, seen from the service.
///
/// AsyncAPI defines operations from the external actor's perspective: a
/// `publish` operation means *others* publish to the channel, so the
/// generated service consumes it. That inversion is intentional and is
/// preserved exactly — `publish` maps to [`Direction::Inbound`],
/// `subscribe` to [`Direction::Outbound`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    /// The service consumes messages from this channel (spec `publish`).
    Inbound,
    /// The service produces messages to this channel (spec `subscribe`).
    Outbound,
}

impl Direction {
    pub fn is_inbound(&self) -> bool {
        matches!(self, Direction::Inbound)
    }
}

/// A fully resolved specification: the loader's output.
#[derive(Debug, Clone)]
pub struct ServiceSpec {
    pub title: String,
    pub description: Option<String>,
    /// Connection URL of the first declared server.
    pub server_url: String,
    /// Channels in document order; a channel declaring both operations
    /// appears once per direction.
    pub channels: Vec<ChannelSpec>,
}

/// One channel operation, named and with its raw transport metadata.
///
/// The raw channel name and its parsed descriptor travel together as named
/// fields rather than a positional pair.
#[derive(Debug, Clone)]
pub struct ChannelSpec {
    /// The raw channel name, used verbatim as the transport subject.
    pub name: String,
    pub direction: Direction,
    pub operation_id: Option<String>,
    /// NATS queue-group name from the operation bindings, if any.
    pub queue: Option<String>,
    /// NATS stream name from the operation bindings, if any.
    pub stream: Option<String>,
    /// Messages in first-appearance order.
    pub messages: Vec<MessageSpec>,
}

/// One message shape carried by a channel operation.
#[derive(Debug, Clone)]
pub struct MessageSpec {
    pub name: Option<String>,
    /// The resolved payload schema; `None` means a unit (no-payload) message.
    pub payload: Option<Value>,
}
