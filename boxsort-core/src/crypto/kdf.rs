use argon2::Argon2;

use crate::crypto::aead::SealKey;
use crate::error::{BoxSortError, Result};

/// Stretch a passphrase into a seal key with Argon2id (default cost).
pub fn derive_key(passphrase: &str, salt: &[u8; 32]) -> Result<SealKey> {
    let mut out = [0u8; 32];
    Argon2::default()
        .hash_password_into(passphrase.as_bytes(), salt, &mut out)
        .map_err(|e| BoxSortError::Crypto(format!("kdf: {e}")))?;
    Ok(SealKey(out))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deterministic_per_salt() {
        let a = derive_key("hunter2", &[0u8; 32]).unwrap();
        let b = derive_key("hunter2", &[0u8; 32]).unwrap();
        let c = derive_key("hunter2", &[1u8; 32]).unwrap();
        assert_eq!(a.0, b.0);
        assert_ne!(a.0, c.0);
    }
}
