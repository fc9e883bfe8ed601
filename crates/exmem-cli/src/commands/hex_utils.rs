//! Hex address parsing and formatting utilities.

use anyhow::Result;

/// Parse a hex address string (with or without 0x prefix). Underscores are
/// accepted as digit separators.
///
/// # Examples
///
/// ```ignore
/// assert_eq!(parse_hex_address("0x1000").unwrap(), 0x1000);
/// assert_eq!(parse_hex_address("7FF6_0000").unwrap(), 0x7FF60000);
/// ```
pub fn parse_hex_address(s: &str) -> Result<u64> {
    let digits: String = s
        .trim()
        .trim_start_matches("0x")
        .trim_start_matches("0X")
        .chars()
        .filter(|c| *c != '_')
        .collect();
    u64::from_str_radix(&digits, 16).map_err(|e| anyhow::anyhow!("Invalid hex address {:?}: {}", s, e))
}

/// Format an address as a hex string with 0x prefix.
pub fn format_hex_address(addr: u64) -> String {
    format!("0x{:X}", addr)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_hex_address_prefixes() {
        assert_eq!(parse_hex_address("0x1000").unwrap(), 0x1000);
        assert_eq!(parse_hex_address("0X1000").unwrap(), 0x1000);
        assert_eq!(parse_hex_address("beef").unwrap(), 0xBEEF);
    }

    #[test]
    fn test_parse_hex_address_separators() {
        assert_eq!(parse_hex_address("0x7FF6_1234_0000").unwrap(), 0x7FF6_1234_0000);
        assert_eq!(parse_hex_address(" 0x10 ").unwrap(), 0x10);
    }

    #[test]
    fn test_parse_hex_address_invalid() {
        assert!(parse_hex_address("").is_err());
        assert!(parse_hex_address("0xZZZ").is_err());
        assert!(parse_hex_address("0x1_0000_0000_0000_0000").is_err());
    }

    #[test]
    fn test_format_hex_address() {
        assert_eq!(format_hex_address(0x2000), "0x2000");
        assert_eq!(format_hex_address(0), "0x0");
    }
}
