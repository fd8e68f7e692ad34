//! Correlation key generation
//!
//! Request kinds without a natural caller-supplied identity correlate on a
//! short random token. Five characters from a 36-symbol alphabet; no
//! uniqueness check against in-flight keys, the collision odds are accepted.

use rand::Rng;

const KEY_ALPHABET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";
const KEY_LEN: usize = 5;

/// Generate a fresh 5-character correlation key
pub fn random_key() -> String {
    let mut rng = rand::thread_rng();
    (0..KEY_LEN)
        .map(|_| KEY_ALPHABET[rng.gen_range(0..KEY_ALPHABET.len())] as char)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keys_have_fixed_length_and_alphabet() {
        for _ in 0..200 {
            let key = random_key();
            assert_eq!(key.len(), 5);
            assert!(key
                .bytes()
                .all(|b| b.is_ascii_uppercase() || b.is_ascii_digit()));
        }
    }

    #[test]
    fn keys_vary() {
        let keys: std::collections::HashSet<_> = (0..50).map(|_| random_key()).collect();
        // 36^5 possibilities; 50 draws colliding down to one value would
        // mean the generator is broken.
        assert!(keys.len() > 1);
    }
}
