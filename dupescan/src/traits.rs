//! Traits shared by the JSON document readers in dupescan.

use std::{
    fs::File,
    io::{BufReader, Cursor, Read},
    path::Path,
};

use crate::error::Error;

/// A trait for parsing one JSON document (a registry dump or a language file)
/// from a file, an archive member or memory.
///
/// # Example
///
/// ```rust,no_run
/// use dupescan::traits::Parser;
/// let lang = dupescan::localization::LangFile::read_from("assets/example/lang/en_us.json")?;
/// println!("{} keys", lang.len());
/// Ok::<(), Box<dyn std::error::Error>>(())
/// ```
pub trait Parser {
    /// Parse from any reader.
    fn from_reader<R: Read>(reader: R) -> Result<Self, Error>
    where
        Self: Sized;

    /// Parse from file path.
    fn read_from<P: AsRef<Path>>(path: P) -> Result<Self, Error>
    where
        Self: Sized,
    {
        let file = File::open(path).map_err(Error::Io)?;
        Self::from_reader(BufReader::new(file))
    }

    /// Parse from a string.
    fn from_str(s: &str) -> Result<Self, Error>
    where
        Self: Sized,
    {
        Self::from_reader(Cursor::new(s))
    }

    /// Parse from bytes.
    fn from_bytes(bytes: &[u8]) -> Result<Self, Error>
    where
        Self: Sized,
    {
        Self::from_reader(Cursor::new(bytes))
    }
}

/// Reads the whole stream as text, honouring (and stripping) a byte order mark.
///
/// Mod jars routinely ship language files saved with a UTF-8 BOM, which
/// `serde_json` rejects on its own.
pub(crate) fn decode_to_string<R: Read>(reader: R) -> Result<String, Error> {
    let mut decoder = encoding_rs_io::DecodeReaderBytesBuilder::new()
        .bom_override(true)
        .build(reader);

    let mut decoded = String::new();
    decoder.read_to_string(&mut decoded).map_err(Error::Io)?;
    Ok(decoded)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_strips_utf8_bom() {
        let bytes = b"\xEF\xBB\xBF{\"a\": \"b\"}";
        let decoded = decode_to_string(Cursor::new(&bytes[..])).unwrap();
        assert_eq!(decoded, "{\"a\": \"b\"}");
    }

    #[test]
    fn test_decode_passes_plain_utf8_through() {
        let decoded = decode_to_string(Cursor::new("Café")).unwrap();
        assert_eq!(decoded, "Café");
    }

    #[test]
    fn test_decode_rejects_invalid_utf8() {
        let bytes: &[u8] = &[0x7B, 0xFF, 0xFE, 0x7D, 0x80];
        // Starts with `{`, so there is no BOM and the bytes pass through unvalidated
        // until `read_to_string` checks them.
        assert!(decode_to_string(Cursor::new(bytes)).is_err());
    }
}
