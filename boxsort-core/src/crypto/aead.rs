use chacha20poly1305::{
    Key, XChaCha20Poly1305, XNonce,
    aead::{Aead, KeyInit, Payload},
};

use crate::error::{BoxSortError, Result};

pub const NONCE_LEN: usize = 24;
pub const TAG_LEN: usize = 16;

/// Raw 32-byte key, either supplied directly or stretched from a passphrase.
#[derive(Clone)]
pub struct SealKey(pub [u8; 32]);

impl std::fmt::Debug for SealKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("SealKey(..)")
    }
}

/// Fresh random nonce. Sealed files can be rewritten under the same handle,
/// so nonces are never derived from the handle alone.
pub fn random_nonce() -> Result<[u8; NONCE_LEN]> {
    let mut n = [0u8; NONCE_LEN];
    getrandom::getrandom(&mut n).map_err(|e| BoxSortError::Crypto(format!("rng: {e}")))?;
    Ok(n)
}

/// Returns `nonce || ciphertext`.
pub fn seal(key: &SealKey, ad: &[u8], plaintext: &[u8]) -> Result<Vec<u8>> {
    let nonce = random_nonce()?;
    let aead = XChaCha20Poly1305::new(Key::from_slice(&key.0));
    let ct = aead
        .encrypt(
            XNonce::from_slice(&nonce),
            Payload {
                msg: plaintext,
                aad: ad,
            },
        )
        .map_err(|_| BoxSortError::Crypto("aead encrypt".into()))?;
    let mut out = Vec::with_capacity(NONCE_LEN + ct.len());
    out.extend_from_slice(&nonce);
    out.extend_from_slice(&ct);
    Ok(out)
}

/// Inverse of [`seal`]; fails on a wrong key, wrong associated data or
/// tampered bytes.
pub fn open(key: &SealKey, ad: &[u8], sealed: &[u8]) -> Result<Vec<u8>> {
    if sealed.len() < NONCE_LEN + TAG_LEN {
        return Err(BoxSortError::Crypto("sealed blob too short".into()));
    }
    let (nonce, ct) = sealed.split_at(NONCE_LEN);
    let aead = XChaCha20Poly1305::new(Key::from_slice(&key.0));
    aead.decrypt(XNonce::from_slice(nonce), Payload { msg: ct, aad: ad })
        .map_err(|_| BoxSortError::Crypto("aead decrypt failed".into()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn seal_open() {
        let k = SealKey([7u8; 32]);
        let sealed = seal(&k, b"handle-1", b"jpeg bytes").unwrap();
        assert_eq!(sealed.len(), NONCE_LEN + 10 + TAG_LEN);
        assert_eq!(open(&k, b"handle-1", &sealed).unwrap(), b"jpeg bytes");
    }

    #[test]
    fn wrong_ad_or_key_fails() {
        let k = SealKey([7u8; 32]);
        let sealed = seal(&k, b"handle-1", b"jpeg bytes").unwrap();
        assert!(open(&k, b"handle-2", &sealed).is_err());
        assert!(open(&SealKey([8u8; 32]), b"handle-1", &sealed).is_err());
    }

    #[test]
    fn nonces_differ_between_seals() {
        let k = SealKey([1u8; 32]);
        let a = seal(&k, b"h", b"same").unwrap();
        let b = seal(&k, b"h", b"same").unwrap();
        assert_ne!(a, b);
    }
}
