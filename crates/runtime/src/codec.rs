//! Metadata wire format.
//!
//! A session's state lives under three namespaced keys of the room mapping:
//!
//! | key                     | value                                   |
//! |-------------------------|-----------------------------------------|
//! | `<ns>/turnOrder`        | array of entry records                  |
//! | `<ns>/currentTurnIndex` | integer, `-1` for no active turn        |
//! | `<ns>/lastUpdate`       | stamp object, or bare milliseconds      |
//!
//! Bare-millisecond stamps and a missing `lastUpdate` come from clients that
//! predate stamped writes.

use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value;
use thiserror::Error;
use tracker_core::{RemoteSnapshot, Stamp, TurnEntry, TurnSnapshot};

use crate::host::Metadata;

#[derive(Debug, Error)]
pub enum CodecError {
    #[error("malformed {key}")]
    Malformed {
        key: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to encode turn state")]
    Encode(#[source] serde_json::Error),
}

/// Accepts both stamp generations.
#[derive(Deserialize)]
#[serde(untagged)]
enum StoredStamp {
    Millis(u64),
    Hybrid(Stamp),
}

impl From<StoredStamp> for Stamp {
    fn from(stored: StoredStamp) -> Self {
        match stored {
            StoredStamp::Millis(millis) => Stamp::from_millis(millis),
            StoredStamp::Hybrid(stamp) => stamp,
        }
    }
}

/// Maps turn state to and from namespaced metadata keys.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MetadataCodec {
    order_key: String,
    current_key: String,
    stamp_key: String,
}

impl MetadataCodec {
    pub fn new(namespace: &str) -> Self {
        Self {
            order_key: format!("{namespace}/turnOrder"),
            current_key: format!("{namespace}/currentTurnIndex"),
            stamp_key: format!("{namespace}/lastUpdate"),
        }
    }

    pub fn order_key(&self) -> &str {
        &self.order_key
    }

    /// Patch carrying all three keys.
    pub fn encode(&self, snapshot: &TurnSnapshot) -> Result<Metadata, CodecError> {
        let order = serde_json::to_value(&snapshot.order).map_err(CodecError::Encode)?;
        let stamp = serde_json::to_value(snapshot.stamp).map_err(CodecError::Encode)?;
        let current = snapshot
            .current
            .and_then(|index| i64::try_from(index).ok())
            .unwrap_or(-1);

        let mut patch = Metadata::new();
        patch.insert(self.order_key.clone(), order);
        patch.insert(self.current_key.clone(), Value::from(current));
        patch.insert(self.stamp_key.clone(), stamp);
        Ok(patch)
    }

    /// Reads turn state out of a full mapping.
    ///
    /// Returns `Ok(None)` when the mapping carries neither the order nor the
    /// pointer. A missing order reads as empty, a missing pointer as no
    /// active turn.
    pub fn decode(&self, metadata: &Metadata) -> Result<Option<RemoteSnapshot>, CodecError> {
        let order = metadata.get(&self.order_key);
        let current = metadata.get(&self.current_key);
        if order.is_none() && current.is_none() {
            return Ok(None);
        }

        let order: Vec<TurnEntry> = Self::field(&self.order_key, order)?.unwrap_or_default();
        let current: i64 = Self::field(&self.current_key, current)?.unwrap_or(-1);
        let stamp = Self::field::<StoredStamp>(&self.stamp_key, metadata.get(&self.stamp_key))?
            .map_or(Stamp::ZERO, Stamp::from);

        Ok(Some(RemoteSnapshot::new(order, current, stamp)))
    }

    fn field<T: DeserializeOwned>(key: &str, value: Option<&Value>) -> Result<Option<T>, CodecError> {
        match value {
            None | Some(Value::Null) => Ok(None),
            Some(value) => T::deserialize(value)
                .map(Some)
                .map_err(|source| CodecError::Malformed {
                    key: key.to_owned(),
                    source,
                }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tracker_core::{ClientId, Initiative, ItemId};

    const NS: &str = "com.heolia.turn-system";

    fn mapping(value: serde_json::Value) -> Metadata {
        match value {
            Value::Object(map) => map,
            other => panic!("expected object, got {other}"),
        }
    }

    #[test]
    fn encode_writes_every_key() {
        let codec = MetadataCodec::new(NS);
        let snapshot = TurnSnapshot {
            order: vec![TurnEntry::linked(ItemId::new("a"), "A", Initiative(12))],
            current: None,
            stamp: Stamp::new(1_000, 1, ClientId(3)),
        };

        let patch = codec.encode(&snapshot).unwrap();

        assert_eq!(
            Value::Object(patch),
            json!({
                "com.heolia.turn-system/turnOrder": [
                    { "id": "a", "name": "A", "initiative": 12, "isInvocation": false }
                ],
                "com.heolia.turn-system/currentTurnIndex": -1,
                "com.heolia.turn-system/lastUpdate": { "millis": 1000, "counter": 1, "client": 3 },
            })
        );
    }

    #[test]
    fn decode_inverts_encode() {
        let codec = MetadataCodec::new(NS);
        let snapshot = TurnSnapshot {
            order: vec![
                TurnEntry::linked(ItemId::new("a"), "A", Initiative(12)),
                TurnEntry::invocation("Spirit", Initiative(12)),
            ],
            current: Some(1),
            stamp: Stamp::new(7, 0, ClientId(9)),
        };

        let remote = codec.decode(&codec.encode(&snapshot).unwrap()).unwrap().unwrap();

        assert_eq!(remote.order, snapshot.order);
        assert_eq!(remote.current_index(), Some(1));
        assert_eq!(remote.stamp, snapshot.stamp);
    }

    #[test]
    fn foreign_keys_are_ignored() {
        let codec = MetadataCodec::new(NS);
        let metadata = mapping(json!({ "other.extension/state": 1 }));
        assert!(codec.decode(&metadata).unwrap().is_none());
    }

    #[test]
    fn first_generation_mapping_decodes() {
        let codec = MetadataCodec::new(NS);
        let metadata = mapping(json!({
            "com.heolia.turn-system/turnOrder": [{ "id": "a", "name": "A", "initiative": 3 }],
        }));

        let remote = codec.decode(&metadata).unwrap().unwrap();
        assert_eq!(remote.order.len(), 1);
        assert_eq!(remote.current, -1);
        assert_eq!(remote.stamp, Stamp::ZERO);

        let metadata = mapping(json!({
            "com.heolia.turn-system/currentTurnIndex": 0,
            "com.heolia.turn-system/lastUpdate": 1_700_000_000_000u64,
        }));
        let remote = codec.decode(&metadata).unwrap().unwrap();
        assert!(remote.order.is_empty());
        assert_eq!(remote.stamp, Stamp::from_millis(1_700_000_000_000));
    }

    #[test]
    fn malformed_payload_names_the_key() {
        let codec = MetadataCodec::new(NS);
        let metadata = mapping(json!({ "com.heolia.turn-system/turnOrder": "nope" }));

        let err = codec.decode(&metadata).unwrap_err();
        assert!(matches!(err, CodecError::Malformed { ref key, .. } if key == codec.order_key()));
    }
}
