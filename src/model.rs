use crate::features::{TokenModifiers, TokenType};
use crate::native::{cstr_to_string, MecabDictionaryInfoRaw};

/// 0-based position in editor coordinates.
///
/// `character` counts UTF-16 code units from the start of the line, the
/// unit editor protocols expect; codepoints outside the BMP count as two.
#[derive(Debug, Clone, Copy)]
pub struct Position {
    /// 0-based line index.
    pub line: u32,
    /// 0-based UTF-16 column.
    pub character: u32,
}

/// One analyzed token, positioned in the original input text.
#[derive(Debug, Clone)]
pub struct TokenData {
    /// Surface form, always UTF-8 regardless of the engine charset.
    pub surface: String,
    /// 0-based line the token starts on.
    pub line: u32,
    /// Start column in UTF-16 units.
    pub start_char: u32,
    /// End column in UTF-16 units; always `start_char` plus the UTF-16
    /// length of `surface`.
    pub end_char: u32,
    /// Raw feature record as reported by the engine, decoded to UTF-8.
    pub feature: String,
    /// Dictionary base form, empty when the engine does not know one.
    pub base_form: String,
    /// Reading (katakana), empty when unavailable.
    pub reading: String,
    /// Pronunciation, empty when unavailable.
    pub pronunciation: String,
    /// Coarse grammatical classification.
    pub token_type: TokenType,
    /// Additional classification flags.
    pub modifiers: TokenModifiers,
}

/// One bunsetsu chunk from a dependency parse.
#[derive(Debug, Clone)]
pub struct ChunkRecord {
    /// Index of this chunk in emission order.
    pub chunk_id: u32,
    /// Index of the chunk this one depends on;
    /// [`crate::ROOT_CHUNK_LINK`] marks the tree root.
    pub head_chunk_id: i32,
    /// Dependency score reported by the parser.
    pub score: f32,
    /// Concatenated surface text of the chunk's tokens, in UTF-8.
    pub text: String,
}

/// Begin/end boundary of one sentence, in byte offsets of the input text.
#[derive(Debug, Clone, Copy)]
pub struct SentenceBoundary {
    /// Inclusive begin offset.
    pub begin: usize,
    /// Exclusive end offset.
    pub end: usize,
}

/// Metadata of one dictionary the engine has loaded.
#[derive(Debug, Clone)]
pub struct DictionaryInfo {
    /// Path of the dictionary file.
    pub filename: String,
    /// Charset the dictionary was compiled with.
    pub charset: String,
    /// Number of entries.
    pub size: u32,
    /// Dictionary kind; one of [`crate::MECAB_SYS_DIC`],
    /// [`crate::MECAB_USR_DIC`], [`crate::MECAB_UNK_DIC`].
    pub kind: i32,
    /// Dictionary format version.
    pub version: u16,
}

impl DictionaryInfo {
    pub(crate) fn from_raw(raw: &MecabDictionaryInfoRaw) -> Self {
        Self {
            filename: cstr_to_string(raw.filename),
            charset: cstr_to_string(raw.charset),
            size: raw.size,
            kind: raw.kind,
            version: raw.version,
        }
    }
}
