//! Message envelopes for inbound and outbound queues.

use crate::id::NodeId;

/// A message as seen by its recipient: the payload plus the sender id.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Envelope<M> {
    /// The node that sent the message.
    pub from: NodeId,
    /// Algorithm-defined payload.
    pub payload: M,
}

impl<M> Envelope<M> {
    /// Create an envelope from `from` carrying `payload`.
    pub fn new(from: NodeId, payload: M) -> Self {
        Self { from, payload }
    }
}

/// A message waiting in its sender's outbox: the payload plus the target id.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Outgoing<M> {
    /// The destination node.
    pub to: NodeId,
    /// Algorithm-defined payload.
    pub payload: M,
}

impl<M> Outgoing<M> {
    /// Create an outbound message addressed to `to`.
    pub fn new(to: NodeId, payload: M) -> Self {
        Self { to, payload }
    }

    /// Convert into the envelope the recipient will observe.
    pub fn into_envelope(self, from: NodeId) -> Envelope<M> {
        Envelope {
            from,
            payload: self.payload,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn outgoing_becomes_envelope_with_sender() {
        let out = Outgoing::new(NodeId(4), "hello");
        let env = out.into_envelope(NodeId(1));
        assert_eq!(env, Envelope::new(NodeId(1), "hello"));
    }
}
