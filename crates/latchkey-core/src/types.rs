use crate::{Result, constants::UID_SLOT_LEN, error::Error};
use serde::{Deserialize, Serialize};
use std::fmt;
use subtle::ConstantTimeEq;

/// Canonical card identifier (1-12 uppercase hexadecimal characters)
///
/// All storage and comparison happens on this canonical textual form. It is
/// derived from the raw bytes a reader returns by rendering each byte as
/// uppercase hexadecimal **without per-byte zero padding** (`0x0A` becomes
/// `"A"`, not `"0A"`) and concatenating in reader order.
///
/// The no-padding rendering means distinct raw sequences can collide
/// (`[0x01, 0x23]` and `[0x12, 0x03]` both encode to `"123"`). This matches
/// the deployed reader firmware and every identifier already provisioned in
/// the field; changing it would invalidate all stored cards, so the behavior
/// is kept and documented here instead.
///
/// # Security
/// This type implements constant-time comparison to prevent timing attacks
/// when comparing card identifiers during authorization.
#[derive(Debug, Clone, Eq, Serialize, Deserialize)]
pub struct CardUid(String);

impl CardUid {
    /// Encode the raw bytes of a card read into a canonical identifier.
    ///
    /// # Errors
    /// Returns `Error::EmptyUid` for empty input and `Error::UidTooLong`
    /// when the rendering exceeds the 12-character slot width. Overlong
    /// encodings are rejected, never truncated: a truncated identifier
    /// would silently collide with a different card.
    ///
    /// # Examples
    ///
    /// ```
    /// use latchkey_core::CardUid;
    ///
    /// let uid = CardUid::from_raw(&[0x4A, 0x9F, 0x4D, 0x99]).unwrap();
    /// assert_eq!(uid.as_str(), "4A9F4D99");
    ///
    /// // No per-byte zero padding
    /// let uid = CardUid::from_raw(&[0x0A, 0x01, 0x02, 0x03]).unwrap();
    /// assert_eq!(uid.as_str(), "A123");
    /// ```
    pub fn from_raw(bytes: &[u8]) -> Result<Self> {
        if bytes.is_empty() {
            return Err(Error::EmptyUid);
        }
        let mut rendered = String::with_capacity(bytes.len() * 2);
        for byte in bytes {
            rendered.push_str(&format!("{byte:X}"));
        }
        Self::validate(rendered)
    }

    /// Parse an identifier from its canonical textual form.
    ///
    /// The input is normalized (trimmed and converted to uppercase) before
    /// validation, so operator input like `" d3ec2b28 "` is accepted.
    ///
    /// # Errors
    /// Returns `Error::EmptyUid`, `Error::UidTooLong` or
    /// `Error::InvalidUidChar` when the input is not a 1-12 character
    /// hexadecimal string.
    pub fn parse(s: &str) -> Result<Self> {
        Self::validate(s.trim().to_uppercase())
    }

    fn validate(uid: String) -> Result<Self> {
        if uid.is_empty() {
            return Err(Error::EmptyUid);
        }
        if uid.len() > UID_SLOT_LEN {
            let len = uid.len();
            return Err(Error::UidTooLong {
                uid,
                len,
                max: UID_SLOT_LEN,
            });
        }
        if let Some(found) = uid.chars().find(|c| !matches!(c, '0'..='9' | 'A'..='F')) {
            return Err(Error::InvalidUidChar { found });
        }
        Ok(CardUid(uid))
    }

    /// Get the canonical identifier as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CardUid {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for CardUid {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        CardUid::parse(s)
    }
}

/// Constant-time comparison implementation for CardUid
///
/// This prevents timing attacks by ensuring comparison takes the same time
/// regardless of where the strings differ.
impl PartialEq for CardUid {
    fn eq(&self, other: &Self) -> bool {
        self.0.as_bytes().ct_eq(other.0.as_bytes()).into()
    }
}

/// Hash implementation for CardUid
///
/// Implements standard hashing for use in hash-based collections.
impl std::hash::Hash for CardUid {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.0.hash(state);
    }
}
