use encoding_rs::UTF_16LE;
use serde::{Deserialize, Serialize};

/// Character width of a remote string
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StringEncoding {
    /// Single-byte characters (ASCII / UTF-8)
    #[default]
    Narrow,
    /// UTF-16LE code units
    Wide,
}

/// Decode a string, stopping at the first NUL terminator.
///
/// Bytes past the terminator are never looked at, so a buffer that was
/// fetched with a generous upper bound decodes to just the string.
pub fn decode_string(bytes: &[u8], encoding: StringEncoding) -> String {
    match encoding {
        StringEncoding::Narrow => {
            let len = memchr::memchr(0, bytes).unwrap_or(bytes.len());
            String::from_utf8_lossy(&bytes[..len]).into_owned()
        }
        StringEncoding::Wide => {
            let len = bytes
                .chunks_exact(2)
                .position(|unit| unit == [0, 0])
                .map(|units| units * 2)
                .unwrap_or(bytes.len() & !1);
            let (decoded, _) = UTF_16LE.decode_without_bom_handling(&bytes[..len]);
            decoded.into_owned()
        }
    }
}
