//! JSON encoding of [`MappingRecord`]s for key-value backends.
//!
//! A record is stored as a single JSON object:
//!
//! ```text
//! {"key":"abcxyz","url":"https://example.com/path","createdAt":"2026-10-17T08:00:00Z"}
//! ```
//!
//! Decoding is strict: the blob must be a JSON object with exactly these
//! fields, the key must be a valid [`ShortKey`], the URL must parse and the
//! timestamp must be RFC 3339.

use crate::error::CodecError;
use crate::key::ShortKey;
use crate::record::{parse_absolute_url, MappingRecord};
use jiff::Timestamp;
use serde::Deserialize;
use serde_json::json;

#[derive(Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
struct DecodedRecord {
    key: String,
    url: String,
    created_at: Timestamp,
}

/// Serializes a record to its stored string form.
pub fn encode(record: &MappingRecord) -> String {
    json!({
        "key": record.key.as_str(),
        "url": record.url,
        "createdAt": record.created_at.to_string(),
    })
    .to_string()
}

/// Parses a stored string back into a record.
pub fn decode(blob: &str) -> Result<MappingRecord, CodecError> {
    let decoded: DecodedRecord =
        serde_json::from_str(blob).map_err(|e| CodecError::Malformed(e.to_string()))?;

    let key = ShortKey::parse(decoded.key)?;
    parse_absolute_url(&decoded.url).map_err(CodecError::InvalidUrl)?;

    Ok(MappingRecord {
        key,
        url: decoded.url,
        created_at: decoded.created_at,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::KeyError;
    use proptest::prelude::*;

    fn record(key: &str, url: &str) -> MappingRecord {
        MappingRecord {
            key: ShortKey::parse(key).unwrap(),
            url: url.to_string(),
            created_at: "2026-10-17T08:30:15.123456789Z".parse().unwrap(),
        }
    }

    #[test]
    fn round_trip_is_exact() {
        for r in [
            record("abcxyz", "https://example.com/path"),
            record("a1", "http://localhost:8080/?q=\"quoted\"&x=%20"),
            record("z9z9", "https://例え.jp/パス#frag"),
        ] {
            assert_eq!(decode(&encode(&r)).unwrap(), r);
        }
    }

    fn arb_record() -> impl Strategy<Value = MappingRecord> {
        let nanos = Timestamp::MIN.as_nanosecond()..=Timestamp::MAX.as_nanosecond();
        (
            "[a-z0-9]{1,64}",
            "[a-z][a-z0-9]{0,20}\\.[a-z]{2,6}",
            // Quotes, backslashes and non-ASCII survive JSON escaping.
            "[\\PC\"\\\\%例え]{0,48}",
            nanos,
        )
            .prop_map(|(key, host, rest, nanos)| MappingRecord {
                key: ShortKey::parse(key).unwrap(),
                url: format!("https://{host}/{rest}"),
                created_at: Timestamp::from_nanosecond(nanos).unwrap(),
            })
    }

    proptest! {
        #[test]
        fn round_trip_holds_for_any_valid_record(r in arb_record()) {
            prop_assert_eq!(decode(&encode(&r)).unwrap(), r);
        }
    }

    #[test]
    fn encoded_shape() {
        let blob = encode(&record("abcxyz", "https://example.com/path"));
        let value: serde_json::Value = serde_json::from_str(&blob).unwrap();

        assert_eq!(value["key"], "abcxyz");
        assert_eq!(value["url"], "https://example.com/path");
        assert_eq!(value["createdAt"], "2026-10-17T08:30:15.123456789Z");
    }

    #[test]
    fn decodes_blob_written_by_hand() {
        let r = decode(
            r#"{"key":"abc123","url":"https://example.com","createdAt":"2024-01-02T03:04:05Z"}"#,
        )
        .unwrap();

        assert_eq!(r.key.as_str(), "abc123");
        assert_eq!(r.url, "https://example.com");
        assert_eq!(r.created_at.as_second(), 1_704_164_645);
    }

    #[test]
    fn malformed_json() {
        for blob in [
            "",
            "not json",
            "[]",
            r#"{"key":"abc"}"#,
            r#"{"key":"abc","url":"https://example.com","createdAt":"yesterday"}"#,
            r#"{"key":"abc","url":42,"createdAt":"2024-01-02T03:04:05Z"}"#,
            r#"{"key":"abc","url":"https://example.com","createdAt":"2024-01-02T03:04:05Z","extra":1}"#,
        ] {
            assert!(
                matches!(decode(blob), Err(CodecError::Malformed(_))),
                "{blob:?} should be malformed"
            );
        }
    }

    #[test]
    fn invalid_key() {
        let err = decode(
            r#"{"key":"ABC","url":"https://example.com","createdAt":"2024-01-02T03:04:05Z"}"#,
        )
        .unwrap_err();
        assert!(matches!(
            err,
            CodecError::InvalidKey(KeyError::InvalidCharacter(_))
        ));
    }

    #[test]
    fn invalid_url() {
        let err = decode(r#"{"key":"abc","url":"nope","createdAt":"2024-01-02T03:04:05Z"}"#)
            .unwrap_err();
        assert!(matches!(err, CodecError::InvalidUrl(_)));
    }
}
