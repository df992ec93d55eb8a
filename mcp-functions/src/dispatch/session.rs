// Session ids
//
// Session ids are opaque bookkeeping: issued on `initialize`, echoed by the
// client, never stored server-side.

use rand::rngs::OsRng;
use rand::RngCore;

const SESSION_ID_BYTES: usize = 32;

/// Generate a fresh session id from the OS random source (hex encoded)
pub fn generate_session_id() -> String {
    let mut bytes = [0u8; SESSION_ID_BYTES];
    OsRng.fill_bytes(&mut bytes);
    hex::encode(bytes)
}

/// Session ids must be non-empty and made only of visible ASCII (0x21-0x7E)
pub fn is_valid_session_id(id: &str) -> bool {
    !id.is_empty() && id.bytes().all(|b| (0x21..=0x7E).contains(&b))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generated_ids_are_valid_and_unique() {
        let a = generate_session_id();
        let b = generate_session_id();
        assert!(is_valid_session_id(&a));
        assert_eq!(a.len(), SESSION_ID_BYTES * 2);
        assert_ne!(a, b);
    }

    #[test]
    fn rejects_spaces_controls_and_non_ascii() {
        assert!(!is_valid_session_id(""));
        assert!(!is_valid_session_id("has space"));
        assert!(!is_valid_session_id("tab\there"));
        assert!(!is_valid_session_id("caf\u{e9}"));
        assert!(is_valid_session_id("~!abc-123_{}"));
    }
}
