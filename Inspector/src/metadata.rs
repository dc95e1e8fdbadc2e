use std::collections::HashMap;

use indexmap::IndexMap;
use serde::Serialize;

/// Keys reported from an event's message data, in reporting order.
pub const REPORTED_KEYS: [&str; 13] = [
    "p.id", "f.id", "c.up", "f.eid", "p.a1.id", "p.a2.id", "p.dur",
    "p.eid", "p.ev", "p.pr", "p.rst", "p.st", "p.tz",
];

/// The reported subset of a `key=value,key=value` message, ordered like [`REPORTED_KEYS`].
/// Keys missing from the message are left out.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct FilteredMetadata(IndexMap<&'static str, String>);

impl FilteredMetadata {
    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&'static str, &str)> {
        self.0.iter().map(|(key, value)| (*key, value.as_str()))
    }
}

/// Projects the reported keys out of raw `emsg` message data.
///
/// Bytes that are not UTF-8 yield an empty result. Tokens are split on the first `=`,
/// tokens without one are skipped and a repeated key keeps its last value.
pub fn filter_message_data(raw: &[u8]) -> FilteredMetadata {
    let text = std::str::from_utf8(raw).unwrap_or_default();
    let text = text.trim_end_matches('\0');

    let fields: HashMap<&str, &str> = text
        .split(',')
        .filter_map(|token| token.split_once('='))
        .collect();

    let selected = REPORTED_KEYS
        .iter()
        .filter_map(|key| fields.get(key).map(|value| (*key, value.to_string())))
        .collect();

    FilteredMetadata(selected)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keeps_only_reported_keys() {
        let metadata = filter_message_data(b"p.id=42,p.ev=splice,x.unknown=9");
        assert_eq!(metadata.len(), 2);
        assert_eq!(metadata.get("p.id"), Some("42"));
        assert_eq!(metadata.get("p.ev"), Some("splice"));
        assert_eq!(metadata.get("x.unknown"), None);
    }

    #[test]
    fn follows_reporting_order() {
        let metadata = filter_message_data(b"p.tz=UTC,c.up=1,p.id=7,f.id=3");
        let keys: Vec<_> = metadata.iter().map(|(key, _)| key).collect();
        assert_eq!(keys, vec!["p.id", "f.id", "c.up", "p.tz"]);
        assert_eq!(
            serde_json::to_string(&metadata).unwrap(),
            r#"{"p.id":"7","f.id":"3","c.up":"1","p.tz":"UTC"}"#
        );
    }

    #[test]
    fn splits_on_first_equals_only() {
        let metadata = filter_message_data(b"p.pr=a=b=c,p.st=");
        assert_eq!(metadata.get("p.pr"), Some("a=b=c"));
        assert_eq!(metadata.get("p.st"), Some(""));
    }

    #[test]
    fn drops_tokens_without_equals() {
        let metadata = filter_message_data(b"p.id,p.ev=start,,garbage");
        assert_eq!(metadata.len(), 1);
        assert_eq!(metadata.get("p.ev"), Some("start"));
    }

    #[test]
    fn last_duplicate_wins() {
        let metadata = filter_message_data(b"p.id=1,p.id=2");
        assert_eq!(metadata.get("p.id"), Some("2"));
    }

    #[test]
    fn invalid_utf8_is_empty() {
        assert!(filter_message_data(&[0x70, 0x2e, 0x69, 0x64, 0x3d, 0xff, 0xfe]).is_empty());
        assert!(filter_message_data(b"").is_empty());
    }

    #[test]
    fn trailing_nul_is_ignored() {
        let metadata = filter_message_data(b"p.dur=30\0\0");
        assert_eq!(metadata.get("p.dur"), Some("30"));
    }

    #[test]
    fn filtering_is_idempotent() {
        let first = filter_message_data(b"x=1,p.eid=9,p.id=5,p.rst=0,junk");
        let rendered = first
            .iter()
            .map(|(key, value)| format!("{}={}", key, value))
            .collect::<Vec<_>>()
            .join(",");
        let second = filter_message_data(rendered.as_bytes());
        assert_eq!(first, second);
    }
}
