//! Opaque pagination cursors.
//!
//! A cursor is the `(sort value, identifier)` tuple of the last hit on a
//! page, fed back to the index as `search_after`. The encoded token is
//! opaque to API consumers and must round-trip exactly; it is never
//! persisted.

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use serde_json::{Value, json};

use super::options::coerce_i64;

/// A `search_after` sort tuple: primary sort value plus identifier
/// tie-break.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Cursor {
    /// Primary sort value (creation timestamp in the default sort).
    pub sort_value: i64,

    /// Identifier tie-break (`uid`).
    pub uid: String,
}

impl Cursor {
    /// Create a cursor from its parts.
    #[must_use]
    pub fn new(sort_value: i64, uid: impl Into<String>) -> Self {
        Self { sort_value, uid: uid.into() }
    }

    /// Encode into an opaque token for the API boundary.
    #[must_use]
    pub fn encode(&self) -> String {
        URL_SAFE_NO_PAD.encode(format!("{},{}", self.sort_value, self.uid))
    }

    /// Decode an opaque token.
    ///
    /// Malformed input degrades to the start-of-results cursor `(0, "")`
    /// instead of failing the request. A raw `"<n>,<uid>"` pair is also
    /// accepted for callers that pass the decoded form through.
    #[must_use]
    pub fn decode(token: &str) -> Self {
        match URL_SAFE_NO_PAD.decode(token) {
            Ok(bytes) => match String::from_utf8(bytes) {
                Ok(decoded) => Self::from_pair_string(&decoded),
                Err(_) => Self::default(),
            },
            // not base64: treat as a bare comma-joined pair
            Err(_) => Self::from_pair_string(token),
        }
    }

    /// Parse a `"<sort value>,<uid>"` pair, coercing leniently.
    #[must_use]
    pub fn from_pair_string(pair: &str) -> Self {
        let mut parts = pair.splitn(2, ',');
        let sort_value = parts.next().map(coerce_i64).unwrap_or(0);
        let uid = parts.next().unwrap_or("").to_string();
        Self { sort_value, uid }
    }

    /// Build a cursor from a hit's raw `sort` tuple.
    #[must_use]
    pub fn from_sort(sort: &[Value]) -> Self {
        let sort_value = sort.first().map_or(0, |v| match v {
            Value::Number(n) => n.as_i64().unwrap_or(0),
            Value::String(s) => coerce_i64(s),
            _ => 0,
        });
        let uid = sort.get(1).and_then(Value::as_str).unwrap_or("").to_string();
        Self { sort_value, uid }
    }

    /// The `search_after` representation sent to the index.
    #[must_use]
    pub fn to_search_after(&self) -> Value {
        json!([self.sort_value, self.uid])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_trip() {
        let cursor = Cursor::new(1234, "10.1/xyz");
        assert_eq!(Cursor::decode(&cursor.encode()), cursor);
    }

    #[test]
    fn test_decode_bare_pair() {
        // "1234,10.5061/dryad.8515" is not valid base64 (dots, slash)
        let cursor = Cursor::decode("1234,10.5061/dryad.8515");
        assert_eq!(cursor, Cursor::new(1234, "10.5061/dryad.8515"));
    }

    #[test]
    fn test_decode_malformed_degrades_to_start() {
        assert_eq!(Cursor::decode("!!!"), Cursor::default());
        assert_eq!(Cursor::decode(""), Cursor::default());
    }

    #[test]
    fn test_from_sort() {
        let cursor = Cursor::from_sort(&[json!(1_594_897_200_000_i64), json!("10.1/abc")]);
        assert_eq!(cursor, Cursor::new(1_594_897_200_000, "10.1/abc"));

        assert_eq!(Cursor::from_sort(&[]), Cursor::default());
    }

    #[test]
    fn test_search_after_shape() {
        assert_eq!(Cursor::new(7, "10.1/a").to_search_after(), json!([7, "10.1/a"]));
    }
}
