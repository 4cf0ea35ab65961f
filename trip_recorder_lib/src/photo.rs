use base64::{engine::general_purpose::STANDARD, Engine as _};

/// Stored photo form, ready for an <img> tag or a decode back to bytes.
pub const DATA_URI_PREFIX: &str = "data:image/jpeg;base64,";

/// Wrap captured JPEG bytes as a data URI string for storage. Scaling and
/// compression happen before the bytes reach this point.
pub fn encode_photo(jpeg_bytes: &[u8]) -> String {
    format!("{}{}", DATA_URI_PREFIX, STANDARD.encode(jpeg_bytes))
}

/// Decode a stored data URI back to JPEG bytes. Anything that is not a
/// well-formed JPEG data URI yields None, and display code falls back to
/// its placeholder.
pub fn decode_photo(data_uri: &str) -> Option<Vec<u8>> {
    let encoded = data_uri.strip_prefix(DATA_URI_PREFIX)?;
    STANDARD.decode(encoded).ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encode_then_decode_round_trips() {
        let bytes = b"\xff\xd8\xff\xe0 not a real jpeg";
        let encoded = encode_photo(bytes);

        assert!(encoded.starts_with(DATA_URI_PREFIX));
        assert_eq!(decode_photo(&encoded).as_deref(), Some(bytes.as_slice()));
    }

    #[test]
    fn malformed_input_decodes_to_none() {
        assert_eq!(decode_photo("file:///photo.jpg"), None);
        assert_eq!(decode_photo("data:image/jpeg;base64,???"), None);
        assert_eq!(decode_photo(""), None);
    }
}
