//! Twelve-byte identifiers rendered as 24 lowercase hex characters.
//!
//! Layout: four bytes of big-endian Unix seconds, five bytes chosen once per
//! process, then a three-byte big-endian counter seeded randomly. Identifiers
//! generated in one process are unique until the counter wraps within a
//! single second.

use std::fmt;
use std::str::FromStr;
use std::sync::OnceLock;
use std::sync::atomic::{AtomicU32, Ordering};

use chrono::{DateTime, Utc};
use rand::{Rng, RngCore};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use thiserror::Error;

const ID_LEN: usize = 12;
const COUNTER_MASK: u32 = 0x00FF_FFFF;

static PROCESS_UNIQUE: OnceLock<[u8; 5]> = OnceLock::new();
static COUNTER: OnceLock<AtomicU32> = OnceLock::new();

/// Validation errors raised when parsing an [`ObjectId`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ObjectIdError {
    /// The text was not exactly 24 characters long.
    #[error("identifier must be 24 hex characters, got {length}")]
    InvalidLength {
        /// Observed length in characters.
        length: usize,
    },
    /// The text contained a non-hex character.
    #[error("identifier contains a non-hex character")]
    InvalidCharacter,
}

/// Identifier of a stored news item or user.
///
/// # Examples
/// ```
/// use sportnews::domain::ObjectId;
///
/// let id = ObjectId::generate();
/// let text = id.to_string();
/// assert_eq!(text.len(), 24);
/// assert_eq!(text.parse::<ObjectId>().expect("round trip"), id);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ObjectId([u8; ID_LEN]);

impl ObjectId {
    /// Generate an identifier stamped with the current time.
    #[must_use]
    pub fn generate() -> Self {
        Self::generate_at(Utc::now())
    }

    /// Generate an identifier stamped with `now`.
    #[must_use]
    pub fn generate_at(now: DateTime<Utc>) -> Self {
        let mut bytes = [0_u8; ID_LEN];
        // Seconds past 2106 wrap; truncation is the documented layout.
        let seconds = now.timestamp() as u32;
        bytes[..4].copy_from_slice(&seconds.to_be_bytes());
        bytes[4..9].copy_from_slice(process_unique());
        let counter = next_counter();
        bytes[9..].copy_from_slice(&counter.to_be_bytes()[1..]);
        Self(bytes)
    }

    /// Seconds component of the identifier.
    #[must_use]
    pub fn timestamp_seconds(&self) -> u32 {
        u32::from_be_bytes([self.0[0], self.0[1], self.0[2], self.0[3]])
    }
}

fn process_unique() -> &'static [u8; 5] {
    PROCESS_UNIQUE.get_or_init(|| {
        let mut bytes = [0_u8; 5];
        rand::thread_rng().fill_bytes(&mut bytes);
        bytes
    })
}

fn next_counter() -> u32 {
    let counter =
        COUNTER.get_or_init(|| AtomicU32::new(rand::thread_rng().gen_range(0..=COUNTER_MASK)));
    counter.fetch_add(1, Ordering::Relaxed) & COUNTER_MASK
}

impl fmt::Display for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for byte in self.0 {
            write!(f, "{byte:02x}")?;
        }
        Ok(())
    }
}

impl FromStr for ObjectId {
    type Err = ObjectIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let text = s.as_bytes();
        if text.len() != ID_LEN * 2 {
            return Err(ObjectIdError::InvalidLength {
                length: s.chars().count(),
            });
        }
        let mut bytes = [0_u8; ID_LEN];
        for (slot, pair) in bytes.iter_mut().zip(text.chunks_exact(2)) {
            let high = hex_value(pair[0])?;
            let low = hex_value(pair[1])?;
            *slot = (high << 4) | low;
        }
        Ok(Self(bytes))
    }
}

fn hex_value(digit: u8) -> Result<u8, ObjectIdError> {
    match digit {
        b'0'..=b'9' => Ok(digit - b'0'),
        b'a'..=b'f' => Ok(digit - b'a' + 10),
        b'A'..=b'F' => Ok(digit - b'A' + 10),
        _ => Err(ObjectIdError::InvalidCharacter),
    }
}

impl Serialize for ObjectId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for ObjectId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let text = String::deserialize(deserializer)?;
        text.parse().map_err(serde::de::Error::custom)
    }
}
