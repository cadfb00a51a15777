use std::io::Write;

use crate::error::DecodeError;

pub const MAGIC: &[u8; 8] = b"BOXSORT\0";
pub const HEADER_LEN: usize = 24;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Header {
    pub version: u16,
    /// Byte length of the CBOR payload following the header
    pub payload_len: u32,
    /// Leading bytes of the blake3 digest of the payload
    pub digest: [u8; 8],
}

impl Header {
    pub fn for_payload(version: u16, payload: &[u8]) -> Self {
        Self {
            version,
            payload_len: payload.len() as u32,
            digest: digest8(payload),
        }
    }

    pub fn write_to(&self, mut w: impl Write) -> std::io::Result<()> {
        w.write_all(MAGIC)?;
        w.write_all(&self.version.to_le_bytes())?;
        w.write_all(&0u16.to_le_bytes())?; // reserved
        w.write_all(&self.payload_len.to_le_bytes())?;
        w.write_all(&self.digest)?;
        Ok(())
    }

    /// Parse the fixed header at the start of `bytes`.
    pub fn parse(bytes: &[u8]) -> Result<Self, DecodeError> {
        if bytes.is_empty() {
            return Err(DecodeError::Empty);
        }
        let n = bytes.len().min(MAGIC.len());
        if bytes[..n] != MAGIC[..n] {
            return Err(DecodeError::BadMagic);
        }
        if bytes.len() < HEADER_LEN {
            return Err(DecodeError::Truncated);
        }
        let version = u16::from_le_bytes([bytes[8], bytes[9]]);
        let payload_len = u32::from_le_bytes([bytes[12], bytes[13], bytes[14], bytes[15]]);
        let mut digest = [0u8; 8];
        digest.copy_from_slice(&bytes[16..24]);
        Ok(Self {
            version,
            payload_len,
            digest,
        })
    }

    /// The payload slice, once its length and digest check out.
    pub fn payload<'a>(&self, bytes: &'a [u8]) -> Result<&'a [u8], DecodeError> {
        let body = &bytes[HEADER_LEN..];
        let want = self.payload_len as usize;
        if body.len() < want {
            return Err(DecodeError::Truncated);
        }
        if body.len() > want {
            return Err(DecodeError::Schema(format!(
                "{} trailing bytes after payload",
                body.len() - want
            )));
        }
        if digest8(body) != self.digest {
            return Err(DecodeError::Checksum);
        }
        Ok(body)
    }
}

fn digest8(payload: &[u8]) -> [u8; 8] {
    let h = blake3::hash(payload);
    let mut out = [0u8; 8];
    out.copy_from_slice(&h.as_bytes()[..8]);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn framed(payload: &[u8]) -> Vec<u8> {
        let mut out = Vec::new();
        Header::for_payload(2, payload).write_to(&mut out).unwrap();
        out.extend_from_slice(payload);
        out
    }

    #[test]
    fn header_is_fixed_size() {
        let bytes = framed(b"abc");
        assert_eq!(bytes.len(), HEADER_LEN + 3);
        let h = Header::parse(&bytes).unwrap();
        assert_eq!(h.version, 2);
        assert_eq!(h.payload(&bytes).unwrap(), b"abc");
    }

    #[test]
    fn classifies_damage() {
        let bytes = framed(b"payload");
        assert_eq!(Header::parse(&[]), Err(DecodeError::Empty));
        assert_eq!(Header::parse(b"BOX"), Err(DecodeError::Truncated));
        assert_eq!(Header::parse(b"<plist>"), Err(DecodeError::BadMagic));

        let cut = &bytes[..bytes.len() - 2];
        let h = Header::parse(cut).unwrap();
        assert_eq!(h.payload(cut), Err(DecodeError::Truncated));

        let mut flipped = bytes.clone();
        let last = flipped.len() - 1;
        flipped[last] ^= 0x01;
        let h = Header::parse(&flipped).unwrap();
        assert_eq!(h.payload(&flipped), Err(DecodeError::Checksum));
    }
}
