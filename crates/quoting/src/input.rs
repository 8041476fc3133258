// ABOUTME: Charset-aware decoding of raw message body bytes.
// ABOUTME: Uses an explicit charset label when given, chardetng detection otherwise.

/// Decodes `body` to UTF-8.
///
/// An unknown `charset` label falls back to detection.
pub fn decode_input(body: &[u8], charset: Option<&str>) -> String {
    if let Some(label) = charset {
        match encoding_rs::Encoding::for_label(label.trim().as_bytes()) {
            Some(encoding) => {
                let (decoded, _, _) = encoding.decode(body);
                return decoded.into_owned();
            }
            None => log::warn!("unknown charset {:?}, detecting instead", label),
        }
    }

    let mut detector = chardetng::EncodingDetector::new();
    detector.feed(body, true);
    let encoding = detector.guess(None, true);
    let (decoded, _, _) = encoding.decode(body);
    decoded.into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_utf8_passthrough() {
        assert_eq!(decode_input("héllo".as_bytes(), None), "héllo");
    }

    #[test]
    fn test_explicit_latin1() {
        let bytes: &[u8] = &[0x63, 0x61, 0x66, 0xe9];
        assert_eq!(decode_input(bytes, Some("iso-8859-1")), "café");
    }

    #[test]
    fn test_unknown_label_falls_back() {
        assert_eq!(decode_input(b"plain", Some("no-such-charset")), "plain");
    }
}
