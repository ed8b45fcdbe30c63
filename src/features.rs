//! Capability negotiation for the `qSupported` exchange.
//!
//! The stub advertises a static capability table, decided once at session
//! construction: `PacketSize` first, then each feature rendered per its
//! type, `;`-separated, in table order:
//!
//! ```text
//! PacketSize=1000;multiprocess-;swbreak+;...;xmlRegisters=i386
//! ```
//!
//! The client's own `qSupported` arguments are parsed into the same shape
//! and recorded on the session. The negotiator does not reconcile the two
//! sets — which requested features to honor is the backend's policy.

use crate::protocol::wire;

/// Value of one capability table entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FeatureValue {
    /// Rendered as `name+`.
    Enabled,
    /// Rendered as `name-`.
    Disabled,
    /// Rendered as `name=value`.
    Value(String),
}

/// Ordered capability table plus the advertised maximum frame payload.
#[derive(Debug, Clone)]
pub struct FeatureSet {
    entries: Vec<(String, FeatureValue)>,
    packet_size: usize,
}

impl FeatureSet {
    /// Create an empty table with the default packet size.
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
            packet_size: wire::PACKET_SIZE,
        }
    }

    /// The capability table a plain stub offers: software breakpoints,
    /// `vCont`, no-ack mode, and memory-map transfer.
    pub fn stock() -> Self {
        let mut features = Self::new();
        features.insert("multiprocess", FeatureValue::Disabled);
        features.insert("swbreak", FeatureValue::Enabled);
        features.insert("hwbreak", FeatureValue::Disabled);
        features.insert("qRelocInsn", FeatureValue::Disabled);
        features.insert("fork-events", FeatureValue::Disabled);
        features.insert("vfork-events", FeatureValue::Disabled);
        features.insert("exec-events", FeatureValue::Disabled);
        features.insert("vContSupported", FeatureValue::Enabled);
        features.insert("QThreadEvents", FeatureValue::Disabled);
        features.insert("QStartNoAckMode", FeatureValue::Enabled);
        features.insert("no-resumed", FeatureValue::Disabled);
        features.insert("xmlRegisters", FeatureValue::Disabled);
        features.insert("qXfer:memory-map:read", FeatureValue::Enabled);
        features
    }

    /// Set a feature, replacing the value in place if the name is already
    /// present (table order is part of the wire contract).
    pub fn insert(&mut self, name: &str, value: FeatureValue) {
        match self.entries.iter_mut().find(|(n, _)| n == name) {
            Some(entry) => entry.1 = value,
            None => self.entries.push((name.to_string(), value)),
        }
    }

    /// Look up a feature by name.
    pub fn get(&self, name: &str) -> Option<&FeatureValue> {
        self.entries
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, value)| value)
    }

    /// Maximum frame payload advertised as `PacketSize`.
    #[inline]
    pub fn packet_size(&self) -> usize {
        self.packet_size
    }

    /// Override the advertised packet size.
    pub fn set_packet_size(&mut self, bytes: usize) {
        self.packet_size = bytes;
    }

    /// Build the `qSupported` reply payload: `PacketSize=<hex>` followed by
    /// the table entries in order.
    pub fn supported_reply(&self) -> Vec<u8> {
        let mut reply = format!("PacketSize={:x}", self.packet_size).into_bytes();
        for (name, value) in &self.entries {
            reply.push(b';');
            reply.extend_from_slice(name.as_bytes());
            match value {
                FeatureValue::Enabled => reply.push(b'+'),
                FeatureValue::Disabled => reply.push(b'-'),
                FeatureValue::Value(value) => {
                    reply.push(b'=');
                    reply.extend_from_slice(value.as_bytes());
                }
            }
        }
        reply
    }

    /// Parse the features a client announced in its `qSupported` query.
    ///
    /// `payload` is the query arguments as dispatched (e.g.
    /// `Supported:multiprocess+;xmlRegisters=i386`): the keyword is trimmed
    /// at the first `:` and the remainder split on `;`. A bare name counts
    /// as enabled. The result is recorded, not acted upon.
    pub fn parse_requested(payload: &[u8]) -> Vec<(String, FeatureValue)> {
        let Some(colon) = payload.iter().position(|&b| b == b':') else {
            return Vec::new();
        };
        let mut requested = Vec::new();
        for item in payload[colon + 1..].split(|&b| b == b';') {
            if item.is_empty() {
                continue;
            }
            let (name, value) = match item {
                [name @ .., b'+'] => (name, FeatureValue::Enabled),
                [name @ .., b'-'] => (name, FeatureValue::Disabled),
                _ => match item.iter().position(|&b| b == b'=') {
                    Some(eq) => (
                        &item[..eq],
                        FeatureValue::Value(lossy(&item[eq + 1..]).into_owned()),
                    ),
                    None => (item, FeatureValue::Enabled),
                },
            };
            requested.push((lossy(name).into_owned(), value));
        }
        requested
    }
}

impl Default for FeatureSet {
    fn default() -> Self {
        Self::new()
    }
}

fn lossy(bytes: &[u8]) -> std::borrow::Cow<'_, str> {
    String::from_utf8_lossy(bytes)
}
