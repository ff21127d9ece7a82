//! Opaque session-id generation.
//!
//! Ids are the md5 hex digest of a fractional-seconds timestamp
//! concatenated with a random UUIDv4 token. The digest is for opacity and
//! fixed length only; collision probability is treated as negligible.

use chrono::Utc;
use uuid::Uuid;

/// Digest of `timestamp + token`. Deterministic for fixed inputs; always
/// 32 lowercase hex characters.
pub fn session_id_from_parts(timestamp: &str, token: &str) -> String {
    format!("{:x}", md5::compute(format!("{timestamp}{token}")))
}

/// Fresh opaque session id from the current time and a random token.
pub fn generate_session_id() -> String {
    let now = Utc::now();
    let timestamp = format!("{}.{:06}", now.timestamp(), now.timestamp_subsec_micros());
    session_id_from_parts(&timestamp, &Uuid::new_v4().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn id_from_parts_is_deterministic() {
        let a = session_id_from_parts("1234567890.123456", "random_string");
        let b = session_id_from_parts("1234567890.123456", "random_string");
        assert_eq!(a, b);
        // md5("1234567890.123456random_string")
        assert_eq!(a, format!("{:x}", md5::compute("1234567890.123456random_string")));
    }

    #[test]
    fn id_is_32_hex_chars() {
        let id = generate_session_id();
        assert_eq!(id.len(), 32);
        assert!(id.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn distinct_tokens_give_distinct_ids() {
        let a = session_id_from_parts("1.0", "token-a");
        let b = session_id_from_parts("1.0", "token-b");
        assert_ne!(a, b);
    }
}
