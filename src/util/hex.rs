//! # Hex Formatting Utilities
//!
//! Small helpers around the `hex` crate used for frame tracing and test
//! data. `pretty_hex` renders bytes the way the meter vendor's service
//! tools print them: uppercase pairs separated by spaces ("00 A6 B7 20").

/// Render bytes as uppercase hex pairs separated by spaces.
pub fn pretty_hex(data: &[u8]) -> String {
    data.iter()
        .map(|b| format!("{b:02X}"))
        .collect::<Vec<_>>()
        .join(" ")
}

/// Build bytes from a contiguous hex string.
///
/// Panics on invalid hex; intended for test data.
pub fn hex_to_bytes(s: &str) -> Vec<u8> {
    hex::decode(s).expect("invalid hex in test data")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pretty_hex() {
        assert_eq!(pretty_hex(&[0x00, 0xA1, 0xB2]), "00 A1 B2");
        assert_eq!(pretty_hex(&[1, 2, 3, 5, 8, 13]), "01 02 03 05 08 0D");
        assert_eq!(pretty_hex(&[]), "");
    }

    #[test]
    fn test_hex_to_bytes() {
        assert_eq!(hex_to_bytes("00A6B720"), vec![0x00, 0xA6, 0xB7, 0x20]);
    }
}
