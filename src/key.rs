use sha2::{Digest, Sha256};

const KEY_DELIMITER: &str = "__";
const DIGEST_HEX_LEN: usize = 64;

/// Derive the routing key of a node from its name.
///
/// The key is the SHA-256 of the name in lowercase hex, wrapped in `__` so it
/// can be told apart from payloads coming from anywhere else.
pub fn derive_key(name: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(name.as_bytes());
    format!("{KEY_DELIMITER}{:x}{KEY_DELIMITER}", hasher.finalize())
}

/// True when `payload` has the shape of a derived node key.
pub fn is_node_key(payload: &str) -> bool {
    payload
        .strip_prefix(KEY_DELIMITER)
        .and_then(|rest| rest.strip_suffix(KEY_DELIMITER))
        .is_some_and(|hex| {
            hex.len() == DIGEST_HEX_LEN
                && hex.bytes().all(|b| b.is_ascii_digit() || (b'a'..=b'f').contains(&b))
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_key_is_deterministic() {
        assert_eq!(derive_key("welcome"), derive_key("welcome"));
        assert_eq!(derive_key(""), derive_key(""));
    }

    #[test]
    fn test_known_digest() {
        assert_eq!(
            derive_key("abc"),
            "__ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad__"
        );
    }

    #[test]
    fn test_distinct_names_give_distinct_keys() {
        let names = ["A", "a", "B", "A ", " A", "welcome", "Welcome", "ß", "ss", ""];
        let keys: HashSet<String> = names.iter().map(|n| derive_key(n)).collect();
        assert_eq!(keys.len(), names.len());
    }

    #[test]
    fn test_key_shape() {
        let key = derive_key("menu");
        assert!(key.starts_with("__"));
        assert!(key.ends_with("__"));
        assert_eq!(key.len(), DIGEST_HEX_LEN + 4);
        assert!(is_node_key(&key));
    }

    #[test]
    fn test_foreign_payloads_are_not_keys() {
        assert!(!is_node_key("__ALREADY_GOT_STARTED__"));
        assert!(!is_node_key("BUY_NOW"));
        assert!(!is_node_key(""));
        assert!(!is_node_key(&derive_key("x").to_uppercase()));
    }
}
