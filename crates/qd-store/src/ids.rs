//! Store-assigned document ids.

use crate::error::StoreError;

const ALPHABET: &[u8; 62] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789";
pub const ID_LEN: usize = 20;

// Largest multiple of 62 that fits in a byte; bytes at or above it are
// rejected so every character is equally likely.
const REJECT_FROM: u8 = 248;

/// Generate a 20-character alphanumeric document id.
///
/// # Errors
///
/// Returns `StoreError::IdGeneration` if the OS random source fails.
pub fn generate_id() -> Result<String, StoreError> {
    let mut id = String::with_capacity(ID_LEN);
    let mut buf = [0u8; 32];
    while id.len() < ID_LEN {
        getrandom::fill(&mut buf).map_err(|e| StoreError::IdGeneration(e.to_string()))?;
        for byte in buf {
            if byte < REJECT_FROM {
                id.push(char::from(ALPHABET[usize::from(byte % 62)]));
                if id.len() == ID_LEN {
                    break;
                }
            }
        }
    }
    Ok(id)
}
