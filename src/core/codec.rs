use std::fmt;

use rand::{CryptoRng, Rng};
use serde::Serialize;

use crate::BatchError;

/// Prefix carried by every identifier issued with the default codec.
pub const PREFIX: &str = "ACME";

/// Default width of the random payload. Allows for 100 million distinct payloads.
pub const DIGIT_COUNT: u32 = 8;

/// Widest payload whose value space still fits in a `u64`.
pub const MAX_DIGIT_COUNT: u32 = 18;

/// Computes the Luhn check digit of a string of decimal digits.
///
/// Starting from the rightmost digit, every second digit is doubled (subtracting 9
/// when the result exceeds 9), all digits are summed, and the check digit is the
/// value that brings the sum to a multiple of 10.
///
/// Returns `None` when `digits` is empty or contains anything but `0-9`.
///
/// # Examples
///
/// ```
/// use specimen_id::core::codec::luhn_check_digit;
///
/// assert_eq!(luhn_check_digit("12345678"), Some(2));
/// assert_eq!(luhn_check_digit("7992739871"), Some(3));
/// assert_eq!(luhn_check_digit("12a4"), None);
/// ```
pub fn luhn_check_digit(digits: &str) -> Option<u8> {
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }

    let sum: u32 = digits
        .bytes()
        .rev()
        .enumerate()
        .map(|(position, byte)| {
            let digit = u32::from(byte - b'0');
            if position % 2 == 0 {
                let doubled = digit * 2;
                if doubled > 9 { doubled - 9 } else { doubled }
            } else {
                digit
            }
        })
        .sum();

    Some(((10 - sum % 10) % 10) as u8)
}

/// An identifier that passed format and check-digit validation.
///
/// Values are only ever built by [`IdCodec::encode`] or [`IdCodec::parse`], so holding
/// a `SpecimenId` means the check digit matches the payload.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct SpecimenId(String);

impl SpecimenId {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The random digit body, without prefix and check digit.
    pub fn payload(&self) -> &str {
        let digits = self.digits();
        &digits[..digits.len() - 1]
    }

    pub fn check_digit(&self) -> u8 {
        let digits = self.digits().as_bytes();
        digits[digits.len() - 1] - b'0'
    }

    // Prefixes never contain digits, so the first digit starts the payload.
    fn digits(&self) -> &str {
        self.0.trim_start_matches(|c: char| !c.is_ascii_digit())
    }
}

impl fmt::Display for SpecimenId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for SpecimenId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl From<SpecimenId> for String {
    fn from(id: SpecimenId) -> Self {
        id.0
    }
}

/// Encodes and validates identifiers of the form `PREFIX | payload | check_digit`.
///
/// The codec is stateless apart from its format parameters and can be shared freely.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IdCodec {
    prefix: String,
    digit_count: u32,
}

impl Default for IdCodec {
    fn default() -> Self {
        Self {
            prefix: PREFIX.to_owned(),
            digit_count: DIGIT_COUNT,
        }
    }
}

impl IdCodec {
    /// Creates a codec for a custom prefix and payload width.
    ///
    /// The prefix must be non-empty and made of ASCII uppercase letters, which keeps the
    /// boundary between prefix and payload unambiguous. The width must lie in
    /// `1..=MAX_DIGIT_COUNT`.
    ///
    /// # Errors
    ///
    /// Returns [`BatchError::InvalidConfiguration`] when either parameter is rejected.
    pub fn new(prefix: &str, digit_count: u32) -> Result<Self, BatchError> {
        if prefix.is_empty() || !prefix.bytes().all(|b| b.is_ascii_uppercase()) {
            return Err(BatchError::InvalidConfiguration(format!(
                "prefix must be non-empty ASCII uppercase letters, got {:?}",
                prefix
            )));
        }
        if digit_count == 0 || digit_count > MAX_DIGIT_COUNT {
            return Err(BatchError::InvalidConfiguration(format!(
                "digit count must be between 1 and {}, got {}",
                MAX_DIGIT_COUNT, digit_count
            )));
        }

        Ok(Self {
            prefix: prefix.to_owned(),
            digit_count,
        })
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    pub fn digit_count(&self) -> u32 {
        self.digit_count
    }

    /// Total length of every identifier produced by this codec.
    pub fn id_len(&self) -> usize {
        self.prefix.len() + self.digit_count as usize + 1
    }

    /// Number of distinct payloads, `10^digit_count`.
    pub fn payload_space(&self) -> u64 {
        10u64.pow(self.digit_count)
    }

    /// Draws a zero-padded payload from the thread-local CSPRNG.
    pub fn generate_payload(&self) -> String {
        self.generate_payload_with(&mut rand::rng())
    }

    /// Draws a zero-padded payload uniformly from `[0, 10^digit_count)`.
    pub fn generate_payload_with<R>(&self, rng: &mut R) -> String
    where
        R: Rng + CryptoRng,
    {
        let value = rng.random_range(0..self.payload_space());
        format!("{:0width$}", value, width = self.digit_count as usize)
    }

    /// Luhn check digit of `payload`, `None` if it is not a string of decimal digits.
    pub fn checksum(&self, payload: &str) -> Option<u8> {
        luhn_check_digit(payload)
    }

    /// Appends prefix and check digit to a payload.
    ///
    /// # Errors
    ///
    /// Returns [`BatchError::MalformedIdentifier`] when the payload is not exactly
    /// `digit_count` decimal digits.
    pub fn encode(&self, payload: &str) -> Result<SpecimenId, BatchError> {
        if payload.len() != self.digit_count as usize {
            return Err(BatchError::MalformedIdentifier(format!(
                "payload must have {} digits, got {:?}",
                self.digit_count, payload
            )));
        }
        let check = self.checksum(payload).ok_or_else(|| {
            BatchError::MalformedIdentifier(format!("payload is not numeric: {:?}", payload))
        })?;

        Ok(SpecimenId(format!("{}{}{}", self.prefix, payload, check)))
    }

    /// Generates a fresh candidate identifier.
    pub fn generate(&self) -> SpecimenId {
        self.generate_with(&mut rand::rng())
    }

    pub fn generate_with<R>(&self, rng: &mut R) -> SpecimenId
    where
        R: Rng + CryptoRng,
    {
        let payload = self.generate_payload_with(rng);
        let check = luhn_check_digit(&payload).unwrap_or_default();
        SpecimenId(format!("{}{}{}", self.prefix, payload, check))
    }

    /// Checks prefix, total length, digit positions and the check digit.
    ///
    /// This is the validator downstream consumers run on keyed-in identifiers before
    /// looking them up, so a smudged label is caught without a store round trip.
    pub fn is_well_formed(&self, identifier: &str) -> bool {
        if identifier.len() != self.id_len() || !identifier.starts_with(&self.prefix) {
            return false;
        }

        let digits = &identifier[self.prefix.len()..];
        if !digits.bytes().all(|b| b.is_ascii_digit()) {
            return false;
        }

        let (payload, check) = digits.split_at(self.digit_count as usize);
        luhn_check_digit(payload) == Some(check.as_bytes()[0] - b'0')
    }

    /// Validates `identifier` and wraps it.
    ///
    /// # Errors
    ///
    /// Returns [`BatchError::MalformedIdentifier`] when [`is_well_formed`](Self::is_well_formed)
    /// rejects the input.
    pub fn parse(&self, identifier: &str) -> Result<SpecimenId, BatchError> {
        if self.is_well_formed(identifier) {
            Ok(SpecimenId(identifier.to_owned()))
        } else {
            Err(BatchError::MalformedIdentifier(identifier.to_owned()))
        }
    }
}
