//! Strongly-typed identifiers for persisted entities.
//!
//! Identifiers are ULIDs: 128 bits, of which 80 are random, generated
//! locally without coordination. Two concurrent creations never need to
//! consult storage to obtain distinct identifiers.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;
use ulid::Ulid;

/// Error returned when parsing an ID from a string fails.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseIdError {
    /// The type of ID that failed to parse.
    pub id_type: &'static str,
    /// The reason for the parse failure.
    pub reason: String,
}

impl fmt::Display for ParseIdError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "failed to parse {}: {}", self.id_type, self.reason)
    }
}

impl std::error::Error for ParseIdError {}

/// Unique identifier for a connector.
///
/// Displayed and serialized as `conn_<ULID>`. Parsing also accepts a bare
/// ULID.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ConnectorId(Ulid);

impl ConnectorId {
    const PREFIX: &'static str = "conn";

    /// Creates a new ID with a randomly generated ULID.
    #[must_use]
    pub fn new() -> Self {
        Self(Ulid::new())
    }

    /// Creates an ID from a ULID.
    #[must_use]
    pub const fn from_ulid(ulid: Ulid) -> Self {
        Self(ulid)
    }

    /// Returns the underlying ULID.
    #[must_use]
    pub const fn as_ulid(&self) -> Ulid {
        self.0
    }

    /// Returns the prefix used for display formatting.
    #[must_use]
    pub const fn prefix() -> &'static str {
        Self::PREFIX
    }
}

impl Default for ConnectorId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ConnectorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}_{}", Self::PREFIX, self.0)
    }
}

impl FromStr for ConnectorId {
    type Err = ParseIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let ulid_str = s
            .strip_prefix(Self::PREFIX)
            .and_then(|rest| rest.strip_prefix('_'))
            .unwrap_or(s);

        Ulid::from_str(ulid_str)
            .map(Self)
            .map_err(|e| ParseIdError {
                id_type: "ConnectorId",
                reason: e.to_string(),
            })
    }
}

impl From<Ulid> for ConnectorId {
    fn from(ulid: Ulid) -> Self {
        Self(ulid)
    }
}

impl Serialize for ConnectorId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for ConnectorId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_carries_prefix() {
        let id = ConnectorId::new();
        assert!(id.to_string().starts_with("conn_"));
    }

    #[test]
    fn parse_with_prefix() {
        let id = ConnectorId::new();
        let parsed: ConnectorId = id.to_string().parse().expect("should parse");
        assert_eq!(id, parsed);
    }

    #[test]
    fn parse_without_prefix() {
        let ulid = Ulid::new();
        let id: ConnectorId = ulid.to_string().parse().expect("should parse");
        assert_eq!(id.as_ulid(), ulid);
    }

    #[test]
    fn parse_rejects_garbage_and_empty() {
        let err = "not-a-connector".parse::<ConnectorId>().unwrap_err();
        assert_eq!(err.id_type, "ConnectorId");
        assert!("".parse::<ConnectorId>().is_err());
        assert!("conn_".parse::<ConnectorId>().is_err());
    }

    #[test]
    fn fresh_ids_are_distinct() {
        use std::collections::HashSet;

        let ids: HashSet<ConnectorId> = (0..1000).map(|_| ConnectorId::new()).collect();
        assert_eq!(ids.len(), 1000);
    }

    #[test]
    fn serializes_as_display_string() {
        let id = ConnectorId::new();
        let json = serde_json::to_string(&id).expect("serialize");
        assert_eq!(json, format!("\"{id}\""));
        let parsed: ConnectorId = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(id, parsed);
    }
}
