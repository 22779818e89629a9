use crate::fingerprint::Fingerprint;
use serde_json::Value;
use tracing::{debug, warn};

/// Server-issued list of registered device fingerprints.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct AllowList {
    devices: Vec<String>,
}

impl AllowList {
    #[must_use]
    pub fn new(devices: Vec<String>) -> Self {
        Self { devices }
    }

    /// Decodes the `deviceIds` parameter: percent-decode, then parse a JSON array.
    ///
    /// Anything unparseable yields an empty list, which matches no device. A `%`
    /// not followed by two hex digits counts as unparseable.
    /// Non-string array entries are dropped.
    #[must_use]
    pub fn decode(raw: Option<&str>) -> Self {
        let Some(raw) = raw else {
            return Self::default();
        };

        if !has_valid_escapes(raw) {
            warn!("Error decoding deviceIds: malformed percent-escape");
            return Self::default();
        }

        let decoded = match urlencoding::decode(raw) {
            Ok(decoded) => decoded,
            Err(err) => {
                warn!("Error decoding deviceIds: {err}");
                return Self::default();
            }
        };

        let entries = match serde_json::from_str::<Value>(&decoded) {
            Ok(Value::Array(entries)) => entries,
            Ok(other) => {
                warn!("Error parsing deviceIds: expected a JSON array, got {other}");
                return Self::default();
            }
            Err(err) => {
                warn!("Error parsing deviceIds: {err}");
                return Self::default();
            }
        };

        let total = entries.len();
        let devices: Vec<String> = entries
            .into_iter()
            .filter_map(|entry| match entry {
                Value::String(device) => Some(device),
                _ => None,
            })
            .collect();

        if devices.len() != total {
            debug!(
                dropped = total - devices.len(),
                "ignored non-string deviceIds entries"
            );
        }

        Self { devices }
    }

    #[must_use]
    pub fn contains(&self, fingerprint: &Fingerprint) -> bool {
        self.devices
            .iter()
            .any(|device| device == fingerprint.as_str())
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.devices.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.devices.is_empty()
    }
}

/// Every `%` must start a `%XX` escape.
fn has_valid_escapes(raw: &str) -> bool {
    let bytes = raw.as_bytes();
    let mut index = 0;
    while index < bytes.len() {
        if bytes[index] == b'%' {
            let escape = bytes.get(index + 1..index + 3);
            if !escape.is_some_and(|hex| hex.iter().all(u8::is_ascii_hexdigit)) {
                return false;
            }
            index += 3;
        } else {
            index += 1;
        }
    }
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fp(value: &str) -> Fingerprint {
        Fingerprint::new(value).unwrap()
    }

    #[test]
    fn missing_parameter_is_empty() {
        let list = AllowList::decode(None);
        assert!(list.is_empty());
        assert!(!list.contains(&fp("fp-123")));
    }

    #[test]
    fn decodes_percent_encoded_json() {
        let list = AllowList::decode(Some("%5B%22fp-123%22%2C%22fp-456%22%5D"));
        assert_eq!(list.len(), 2);
        assert!(list.contains(&fp("fp-123")));
        assert!(list.contains(&fp("fp-456")));
        assert!(!list.contains(&fp("fp-999")));
    }

    #[test]
    fn accepts_already_decoded_json() {
        let list = AllowList::decode(Some(r#"["fp-123"]"#));
        assert!(list.contains(&fp("fp-123")));
    }

    #[test]
    fn malformed_json_is_empty() {
        assert!(AllowList::decode(Some("%5Bnotjson%5D")).is_empty());
        assert!(AllowList::decode(Some("")).is_empty());
        assert!(AllowList::decode(Some("%FF%FE")).is_empty());
        assert!(AllowList::decode(Some("%ZZ")).is_empty());
    }

    #[test]
    fn malformed_escapes_are_empty() {
        let list = AllowList::decode(Some(r#"["%ZZ"]"#));
        assert!(list.is_empty());
        assert!(!list.contains(&fp("%ZZ")));
        assert!(AllowList::decode(Some("%5B%22fp-123%22%5D%")).is_empty());
        assert!(AllowList::decode(Some("%5B%22fp-123%22%5D%4")).is_empty());
        assert!(AllowList::decode(Some(r#"["fp-123", "100%"]"#)).is_empty());
    }

    #[test]
    fn lowercase_escapes_are_accepted() {
        let list = AllowList::decode(Some("%5b%22fp-123%22%5d"));
        assert!(list.contains(&fp("fp-123")));
    }

    #[test]
    fn non_array_json_is_empty() {
        // a bare string must not turn into a substring match
        let list = AllowList::decode(Some(r#""fp-123-and-more""#));
        assert!(list.is_empty());
        assert!(!list.contains(&fp("fp-123")));
        assert!(AllowList::decode(Some(r#"{"fp-123":true}"#)).is_empty());
    }

    #[test]
    fn membership_is_exact() {
        let list = AllowList::new(vec!["fp-123".to_string()]);
        assert!(!list.contains(&fp("fp-12")));
        assert!(!list.contains(&fp("FP-123")));
    }

    #[test]
    fn non_string_entries_are_dropped() {
        let list = AllowList::decode(Some(r#"["fp-123", 42, null]"#));
        assert_eq!(list, AllowList::new(vec!["fp-123".to_string()]));
    }
}
