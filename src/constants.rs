//! Constants mirrored from MeCab and CaboCha C API values.

/// Node stat: a normal dictionary word.
pub const MECAB_NOR_NODE: u8 = 0;
/// Node stat: an unknown word guessed by the character category model.
pub const MECAB_UNK_NODE: u8 = 1;
/// Node stat: the beginning-of-sentence sentinel.
pub const MECAB_BOS_NODE: u8 = 2;
/// Node stat: the end-of-sentence sentinel.
pub const MECAB_EOS_NODE: u8 = 3;
/// Node stat: the end-of-n-best sentinel.
pub const MECAB_EON_NODE: u8 = 4;

/// Dictionary kind: the system dictionary.
pub const MECAB_SYS_DIC: i32 = 0;
/// Dictionary kind: a user dictionary.
pub const MECAB_USR_DIC: i32 = 1;
/// Dictionary kind: the unknown-word dictionary.
pub const MECAB_UNK_DIC: i32 = 2;

/// `head_chunk_id` value marking the root of a dependency tree.
pub const ROOT_CHUNK_LINK: i32 = -1;

/// Charset assumed when nothing else is declared or observed.
pub const DEFAULT_CHARSET: &str = "UTF-8";

/// Text parsed to verify an engine's runtime charset empirically.
///
/// Two CJK characters, six bytes in UTF-8 (four in EUC-JP, so a mismatch
/// is visible in the surface length alone).
pub const CHARSET_PROBE_TEXT: &str = "誤解";

/// Byte length of [`CHARSET_PROBE_TEXT`] under UTF-8.
pub const CHARSET_PROBE_UTF8_LEN: usize = 6;

/// Name of the helper command that reports the system dictionary directory.
pub const MECAB_CONFIG_COMMAND: &str = "mecab-config";

/// Dictionary subdirectory and charset key consulted inside it.
pub(crate) const DICRC_FILE_NAME: &str = "dicrc";
pub(crate) const IPADIC_SUBDIR: &str = "ipadic";
