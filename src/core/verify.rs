use super::{
    codec::{IdCodec, SpecimenId},
    store::{IdStore, StoreResult},
};

/// What a keyed-in identifier turned out to be.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verification {
    /// Wrong shape or wrong check digit, most likely a transcription error.
    Malformed,
    /// Well formed, but never issued.
    Unknown(SpecimenId),
    /// Well formed and present in the store.
    Issued(SpecimenId),
}

/// Checks an identifier read off a label before results are attached to it.
///
/// Surrounding whitespace is ignored and letters are upper-cased. The check digit is
/// verified first, so a typo never reaches the store.
///
/// # Errors
///
/// Propagates the store's error if the existence lookup fails.
pub fn verify(codec: &IdCodec, store: &dyn IdStore, raw: &str) -> StoreResult<Verification> {
    let normalized = raw.trim().to_ascii_uppercase();

    let Ok(id) = codec.parse(&normalized) else {
        return Ok(Verification::Malformed);
    };

    if store.exists(&id)? {
        Ok(Verification::Issued(id))
    } else {
        Ok(Verification::Unknown(id))
    }
}
