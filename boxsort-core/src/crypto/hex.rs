use crate::error::{BoxSortError, Result};

/// Parse exactly `N` bytes of hex, e.g. a 32-byte seal key.
pub fn parse_hex_array<const N: usize>(hex_str: &str) -> Result<[u8; N]> {
    let mut out = [0u8; N];
    let bytes = hex::decode(hex_str.trim())
        .map_err(|e| BoxSortError::Format(format!("invalid hex: {e}")))?;
    if bytes.len() != N {
        return Err(BoxSortError::Format(format!(
            "expected {N} bytes ({} hex chars), got {}",
            N * 2,
            bytes.len()
        )));
    }
    out.copy_from_slice(&bytes);
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_and_rejects_lengths() {
        assert_eq!(parse_hex_array::<2>(" beef ").unwrap(), [0xbe, 0xef]);
        assert!(parse_hex_array::<2>("be").is_err());
        assert!(parse_hex_array::<2>("zzzz").is_err());
    }
}
