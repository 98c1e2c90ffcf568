//! Delivery identity for one broadcast instance of a signal.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Identifier assigned by the remote peer to one broadcast instance of a
/// signal.
///
/// The peer may tag broadcasts with either a string or an integer; both are
/// opaque to the bus and only compared for equality by the
/// [`DedupGuard`](super::DedupGuard). Locally-originated dispatches carry no
/// delivery id at all (`Option::None` at the dispatch seam).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum DeliveryId {
    /// String-form delivery id.
    Text(String),
    /// Integer-form delivery id.
    Number(i64),
}

impl fmt::Display for DeliveryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text(s) => write!(f, "{s}"),
            Self::Number(n) => write!(f, "{n}"),
        }
    }
}

impl From<&str> for DeliveryId {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for DeliveryId {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<i64> for DeliveryId {
    fn from(value: i64) -> Self {
        Self::Number(value)
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;

    #[test]
    fn deserializes_both_wire_forms() {
        let Ok(text) = serde_json::from_str::<DeliveryId>("\"s42\"") else {
            panic!("string id should parse");
        };
        assert_eq!(text, DeliveryId::from("s42"));

        let Ok(number) = serde_json::from_str::<DeliveryId>("42") else {
            panic!("integer id should parse");
        };
        assert_eq!(number, DeliveryId::from(42));
    }

    #[test]
    fn string_and_number_ids_are_distinct() {
        assert_ne!(DeliveryId::from("42"), DeliveryId::from(42));
    }
}
