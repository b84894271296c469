//! Decoding of engine feature records into grammatical attributes.
//!
//! IPADIC-style dictionaries report one comma-delimited record per token:
//! `品詞,細分類1,細分類2,細分類3,活用型,活用形,原形,読み,発音`. Unknown
//! words may carry fewer fields, and `*` marks an absent value. Decoding
//! is best-effort and never fails; anything unrecognized collapses to
//! empty fields and [`TokenType::Other`].

use bitflags::bitflags;

const SUBCLASS_FIELD_COUNT: usize = 3;
const CONJUGATION_FORM_FIELD: usize = 5;
const BASE_FORM_FIELD: usize = 6;
const READING_FIELD: usize = 7;
const PRONUNCIATION_FIELD: usize = 8;

/// Coarse grammatical classification of a token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum TokenType {
    /// 名詞 (excluding numerals).
    Noun,
    /// 名詞・数.
    Number,
    /// 動詞.
    Verb,
    /// 形容詞.
    Adjective,
    /// 副詞.
    Adverb,
    /// 助詞.
    Particle,
    /// 助動詞.
    Auxiliary,
    /// 接続詞.
    Conjunction,
    /// 連体詞.
    Adnominal,
    /// 感動詞.
    Interjection,
    /// 接頭詞.
    Prefix,
    /// 記号.
    Symbol,
    /// フィラー.
    Filler,
    /// Anything the dictionary schema does not cover.
    #[default]
    Other,
}

/// All token types in legend registration order.
pub const TOKEN_TYPES: &[TokenType] = &[
    TokenType::Noun,
    TokenType::Number,
    TokenType::Verb,
    TokenType::Adjective,
    TokenType::Adverb,
    TokenType::Particle,
    TokenType::Auxiliary,
    TokenType::Conjunction,
    TokenType::Adnominal,
    TokenType::Interjection,
    TokenType::Prefix,
    TokenType::Symbol,
    TokenType::Filler,
    TokenType::Other,
];

impl TokenType {
    /// Maps this classification onto a standard LSP semantic token type.
    ///
    /// Editors have no native palette for Japanese parts of speech, so
    /// each class borrows the closest programming-language concept:
    /// content words act as identifiers, function words as operators and
    /// keywords, fillers as comments. Clients restyle per token type, so
    /// what matters is that the borrowed name is standard and stable.
    pub fn as_semantic_type(self) -> &'static str {
        match self {
            TokenType::Noun => "variable",
            TokenType::Number => "number",
            TokenType::Verb => "function",
            TokenType::Adjective => "property",
            TokenType::Adverb => "modifier",
            TokenType::Particle => "operator",
            TokenType::Auxiliary => "keyword",
            TokenType::Conjunction => "keyword",
            TokenType::Adnominal => "decorator",
            TokenType::Interjection => "comment",
            TokenType::Prefix => "macro",
            TokenType::Symbol => "operator",
            TokenType::Filler => "comment",
            TokenType::Other => "string",
        }
    }
}

bitflags! {
    /// Additional classification flags attached to a token.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct TokenModifiers: u32 {
        /// A subclass field says 固有名詞.
        const PROPER_NOUN = 1 << 0;
        /// The surface is conjugated away from its base form.
        const INFLECTED = 1 << 1;
        /// The token opens the text or follows a sentence boundary.
        const SENTENCE_HEAD = 1 << 2;
    }
}

/// Grammatical attributes decoded from one feature record.
#[derive(Debug, Clone, Default)]
pub struct DecodedFeature {
    /// Dictionary base form (原形), empty when absent.
    pub base_form: String,
    /// Reading (読み), empty when absent.
    pub reading: String,
    /// Pronunciation (発音), empty when absent.
    pub pronunciation: String,
    /// Classification derived from the leading fields.
    pub token_type: TokenType,
}

/// Decodes a feature record. Malformed or truncated records yield empty
/// fields and [`TokenType::Other`]; this never fails.
pub fn decode_feature(feature: &str) -> DecodedFeature {
    if feature.is_empty() {
        return DecodedFeature::default();
    }
    let parts: Vec<&str> = feature.split(',').collect();
    DecodedFeature {
        base_form: field(&parts, BASE_FORM_FIELD),
        reading: field(&parts, READING_FIELD),
        pronunciation: field(&parts, PRONUNCIATION_FIELD),
        token_type: token_type_of(&parts),
    }
}

/// Derives modifier flags from a feature record plus the token's context
/// in the input text. `byte_offset` is where the token's surface starts.
pub fn token_modifiers(feature: &str, text: &str, byte_offset: usize) -> TokenModifiers {
    let mut modifiers = TokenModifiers::empty();
    let parts: Vec<&str> = feature.split(',').collect();
    if parts
        .iter()
        .skip(1)
        .take(SUBCLASS_FIELD_COUNT)
        .any(|&part| part == "固有名詞")
    {
        modifiers |= TokenModifiers::PROPER_NOUN;
    }
    let conjugation = field(&parts, CONJUGATION_FORM_FIELD);
    if !conjugation.is_empty() && conjugation != "基本形" {
        modifiers |= TokenModifiers::INFLECTED;
    }
    if at_sentence_head(text, byte_offset) {
        modifiers |= TokenModifiers::SENTENCE_HEAD;
    }
    modifiers
}

fn field(parts: &[&str], index: usize) -> String {
    let value = parts.get(index).copied().unwrap_or("");
    if value == "*" {
        String::new()
    } else {
        value.to_string()
    }
}

fn token_type_of(parts: &[&str]) -> TokenType {
    let class = parts.first().copied().unwrap_or("");
    let subclass = parts.get(1).copied().unwrap_or("");
    match class {
        "名詞" if subclass == "数" => TokenType::Number,
        "名詞" => TokenType::Noun,
        "動詞" => TokenType::Verb,
        "形容詞" => TokenType::Adjective,
        "副詞" => TokenType::Adverb,
        "助詞" => TokenType::Particle,
        "助動詞" => TokenType::Auxiliary,
        "接続詞" => TokenType::Conjunction,
        "連体詞" => TokenType::Adnominal,
        "感動詞" => TokenType::Interjection,
        "接頭詞" => TokenType::Prefix,
        "記号" => TokenType::Symbol,
        "フィラー" => TokenType::Filler,
        _ => TokenType::Other,
    }
}

/// A token is at a sentence head when only whitespace, closing brackets,
/// and a terminator (or the start of the text) precede it.
fn at_sentence_head(text: &str, byte_offset: usize) -> bool {
    let offset = byte_offset.min(text.len());
    let before = match text.get(..offset) {
        Some(before) => before,
        None => return false,
    };
    for ch in before.chars().rev() {
        match ch {
            ' ' | '\t' | '\r' | '\u{3000}' => continue,
            '」' | '』' | '）' | ')' | '”' | '"' => continue,
            '\n' | '。' | '．' | '！' | '？' | '!' | '?' | '…' => return true,
            _ => return false,
        }
    }
    true
}
