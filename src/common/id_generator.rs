// src/common/id_generator.rs
//! Crockford Base32 ID Generator
//!
//! Generates human-readable, prefixed IDs using Crockford Base32 encoding.
//! Format: PREFIX_XXXXXXXX (e.g., EV_K7NP3X2Q for events)

use rand::Rng;

/// Crockford Base32 alphabet (excludes I, L, O, U to avoid confusion)
const CROCKFORD_ALPHABET: &[u8; 32] = b"0123456789ABCDEFGHJKMNPQRSTVWXYZ";

/// Entity type prefixes for ID generation
#[derive(Debug, Clone, Copy)]
pub enum EntityPrefix {
    /// Identity (U_)
    Identity,
    /// Church event (EV_)
    Event,
    /// Video (V_)
    Video,
    /// Contact message (M_)
    Message,
    /// Service time (ST_)
    ServiceTime,
    /// Gallery album (AL_)
    Album,
    /// Gallery image (IM_)
    Image,
}

impl EntityPrefix {
    /// Get the string prefix for this entity type
    pub fn as_str(&self) -> &'static str {
        match self {
            EntityPrefix::Identity => "U",
            EntityPrefix::Event => "EV",
            EntityPrefix::Video => "V",
            EntityPrefix::Message => "M",
            EntityPrefix::ServiceTime => "ST",
            EntityPrefix::Album => "AL",
            EntityPrefix::Image => "IM",
        }
    }
}

/// Generate a random Crockford Base32 string of specified length
fn generate_crockford_string(length: usize) -> String {
    let mut rng = rand::thread_rng();
    (0..length)
        .map(|_| {
            let idx = rng.gen_range(0..32);
            CROCKFORD_ALPHABET[idx] as char
        })
        .collect()
}

/// Generate a prefixed ID, e.g. `"AL_8MWQT2K4"`
///
/// Eight random characters keep collisions negligible for a single
/// congregation's content.
pub fn generate_id(prefix: EntityPrefix) -> String {
    format!("{}_{}", prefix.as_str(), generate_crockford_string(8))
}

/// Generate a raw Crockford Base32 string without prefix.
/// Used for stored filenames.
pub fn generate_raw_id(length: usize) -> String {
    generate_crockford_string(length)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_generate_id_format() {
        let event_id = generate_id(EntityPrefix::Event);
        assert!(event_id.starts_with("EV_"));
        assert_eq!(event_id.len(), 11);

        let identity_id = generate_id(EntityPrefix::Identity);
        assert!(identity_id.starts_with("U_"));
        assert_eq!(identity_id.len(), 10);
    }

    #[test]
    fn test_crockford_alphabet_only() {
        let id = generate_id(EntityPrefix::Album);
        let random_part = &id[3..];

        for c in random_part.chars() {
            assert!(
                CROCKFORD_ALPHABET.contains(&(c as u8)),
                "Character '{}' not in Crockford alphabet",
                c
            );
        }
        assert!(!random_part.contains('I'));
        assert!(!random_part.contains('L'));
        assert!(!random_part.contains('O'));
        assert!(!random_part.contains('U'));
    }

    #[test]
    fn test_uniqueness() {
        let mut ids = HashSet::new();
        for _ in 0..1000 {
            assert!(ids.insert(generate_id(EntityPrefix::Image)), "Duplicate ID generated");
        }
    }

    #[test]
    fn test_raw_id() {
        let raw = generate_raw_id(12);
        assert_eq!(raw.len(), 12);
        assert!(!raw.contains('_'));
    }
}
