/// Transport-delivery mode of a channel's operation.
///
/// Mutually exclusive by construction: classification happens once, in
/// [`Binding::classify`], and rendering logic only ever matches on the
/// variant instead of re-checking raw binding metadata.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Binding {
    /// Direct subject subscription.
    Plain,
    /// Queue-group subscription; load-balanced across group members.
    Queue { group: String },
    /// Durable JetStream consumer.
    Stream { stream: String },
}

impl Binding {
    /// Classify operation-level NATS binding metadata.
    ///
    /// A queue-group name wins over a stream name when both are present;
    /// a stream name alone selects a durable consumer; otherwise the
    /// channel is a plain subject.
    pub fn classify(queue: Option<&str>, stream: Option<&str>) -> Self {
        match (queue, stream) {
            (Some(group), _) => Binding::Queue {
                group: group.to_string(),
            },
            (None, Some(stream)) => Binding::Stream {
                stream: stream.to_string(),
            },
            (None, None) => Binding::Plain,
        }
    }

    pub fn is_stream(&self) -> bool {
        matches!(self, Binding::Stream { .. })
    }

    pub fn is_queue(&self) -> bool {
        matches!(self, Binding::Queue { .. })
    }
}
