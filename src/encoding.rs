use std::borrow::Cow;

use encoding_rs::{Encoding, UTF_8};

/// Character encoding a loaded engine instance works in.
///
/// Resolved once at initialization from the configured or discovered
/// charset label. Conversion never fails: unmappable input is replaced,
/// matching how the engines themselves behave on stray bytes.
#[derive(Clone, Copy)]
pub(crate) struct EngineEncoding {
    encoding: &'static Encoding,
}

impl EngineEncoding {
    /// Looks up a charset label ("EUC-JP", "utf8", "Shift_JIS", ...).
    pub(crate) fn resolve(label: &str) -> Option<Self> {
        Encoding::for_label(label.as_bytes()).map(|encoding| Self { encoding })
    }

    pub(crate) fn utf8() -> Self {
        Self { encoding: UTF_8 }
    }

    pub(crate) fn is_utf8(&self) -> bool {
        self.encoding == UTF_8
    }

    /// Canonical name of the resolved encoding.
    pub(crate) fn name(&self) -> &'static str {
        self.encoding.name()
    }

    /// UTF-8 text to engine bytes. Borrows when the engine runs UTF-8.
    pub(crate) fn encode<'a>(&self, text: &'a str) -> Cow<'a, [u8]> {
        let (bytes, _, _) = self.encoding.encode(text);
        bytes
    }

    /// Engine bytes to UTF-8 text. Borrows when already valid UTF-8.
    pub(crate) fn decode<'a>(&self, bytes: &'a [u8]) -> Cow<'a, str> {
        let (text, _) = self.encoding.decode_without_bom_handling(bytes);
        text
    }
}

impl std::fmt::Debug for EngineEncoding {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("EngineEncoding").field(&self.name()).finish()
    }
}

#[cfg(test)]
mod encoding_tests {
    use super::EngineEncoding;
    use std::borrow::Cow;

    #[test]
    fn resolves_common_labels() {
        assert_eq!(EngineEncoding::resolve("UTF-8").unwrap().name(), "UTF-8");
        assert_eq!(EngineEncoding::resolve("utf8").unwrap().name(), "UTF-8");
        assert_eq!(EngineEncoding::resolve("EUC-JP").unwrap().name(), "EUC-JP");
        assert_eq!(
            EngineEncoding::resolve("Shift_JIS").unwrap().name(),
            "Shift_JIS"
        );
        assert!(EngineEncoding::resolve("no-such-charset").is_none());
    }

    #[test]
    fn utf8_paths_borrow_instead_of_copying() {
        let encoding = EngineEncoding::utf8();
        assert!(encoding.is_utf8());
        assert!(matches!(encoding.encode("誤解"), Cow::Borrowed(_)));
        assert!(matches!(
            encoding.decode("誤解".as_bytes()),
            Cow::Borrowed(_)
        ));
    }

    #[test]
    fn euc_jp_round_trips_cjk_text() {
        let encoding = EngineEncoding::resolve("EUC-JP").unwrap();
        assert!(!encoding.is_utf8());
        let encoded = encoding.encode("誤解");
        assert_eq!(encoded.len(), 4);
        assert_eq!(encoding.decode(&encoded), "誤解");
    }

    #[test]
    fn invalid_bytes_decode_to_replacement_not_panic() {
        let encoding = EngineEncoding::utf8();
        let decoded = encoding.decode(&[0xff, 0xfe, 0x41]);
        assert!(decoded.contains('A'));
        assert!(decoded.contains('\u{fffd}'));
    }
}
