//! Record and header model
//!
//! The immutable unit passed through the verification pipeline: a consumed
//! record with topic, partition, offset, optional key, value, broker
//! timestamp, and a multi-valued header map.

/// Ordered multi-valued header map
///
/// A header name may appear multiple times; lookups return the
/// most-recently-added value for a name (last value wins).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Headers {
    entries: Vec<(String, Vec<u8>)>,
}

impl Headers {
    pub fn new() -> Self {
        Headers {
            entries: Vec::new(),
        }
    }

    /// Append a header value. Existing values for the same name are kept.
    pub fn push(&mut self, name: impl Into<String>, value: impl Into<Vec<u8>>) {
        self.entries.push((name.into(), value.into()));
    }

    /// Last value added for `name`, if any
    pub fn last(&self, name: &str) -> Option<&[u8]> {
        self.entries
            .iter()
            .rev()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_slice())
    }

    /// Last value added for `name`, decoded as UTF-8
    ///
    /// Returns `None` if the header is absent or its bytes are not valid
    /// UTF-8.
    pub fn last_str(&self, name: &str) -> Option<&str> {
        self.last(name).and_then(|v| std::str::from_utf8(v).ok())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[u8])> {
        self.entries
            .iter()
            .map(|(n, v)| (n.as_str(), v.as_slice()))
    }
}

/// A consumed record, immutable once constructed
///
/// Offsets are monotonic per partition by the transport contract, but the
/// pipeline does not trust that contract and re-verifies it.
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    topic: String,
    partition: i32,
    offset: i64,
    key: Option<String>,
    value: String,
    timestamp: i64,
    headers: Headers,
}

impl Record {
    pub fn new(topic: impl Into<String>, partition: i32, offset: i64) -> Self {
        Record {
            topic: topic.into(),
            partition,
            offset,
            key: None,
            value: String::new(),
            timestamp: -1,
            headers: Headers::new(),
        }
    }

    pub fn with_key(mut self, key: impl Into<String>) -> Self {
        self.key = Some(key.into());
        self
    }

    pub fn with_value(mut self, value: impl Into<String>) -> Self {
        self.value = value.into();
        self
    }

    pub fn with_timestamp(mut self, timestamp: i64) -> Self {
        self.timestamp = timestamp;
        self
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<Vec<u8>>) -> Self {
        self.headers.push(name, value);
        self
    }

    pub fn topic(&self) -> &str {
        &self.topic
    }

    pub fn partition(&self) -> i32 {
        self.partition
    }

    pub fn offset(&self) -> i64 {
        self.offset
    }

    pub fn key(&self) -> Option<&str> {
        self.key.as_deref()
    }

    pub fn value(&self) -> &str {
        &self.value
    }

    /// Broker append timestamp in epoch millis (-1 when unset)
    pub fn timestamp(&self) -> i64 {
        self.timestamp
    }

    pub fn headers(&self) -> &Headers {
        &self.headers
    }
}

/// Header names the pipeline recognizes (case-sensitive)
pub mod header_names {
    /// Opaque sender identifier
    pub const SENDER: &str = "sender";
    /// Sender-supplied timestamp, epoch millis as a decimal string
    pub const SENDER_TIMESTAMP: &str = "sender-timestamp";
    /// Message ID, canonical UUID text
    pub const MESSAGE_ID: &str = "message_id";
}
