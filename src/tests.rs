use crate::test_support::{with_env_var, with_env_vars};
use crate::{
    decode_feature, split_into_sentences, AnalyzerConfig, TokenModifiers, TokenType,
    CHARSET_PROBE_TEXT, CHARSET_PROBE_UTF8_LEN, DEFAULT_CHARSET, ROOT_CHUNK_LINK,
};
use std::path::PathBuf;

#[test]
fn analyzer_config_default_is_reasonable() {
    with_env_vars(
        &[
            ("WAKACHI_LIBRARY_PATH", None),
            ("WAKACHI_DIC_PATH", None),
            ("WAKACHI_CABOCHA_LIBRARY_PATH", None),
            ("WAKACHI_DEBUG", None),
        ],
        || {
            let config = AnalyzerConfig::default();
            assert!(config.library_path.is_none());
            assert!(config.dictionary_path.is_none());
            assert!(config.charset.is_none());
            assert!(config.cabocha_library_path.is_none());
            assert!(config.grammar_check);
            assert!(config.dependency_parsing);
            assert!(!config.debug);
        },
    );
}

#[test]
fn analyzer_config_default_respects_wakachi_library_path() {
    with_env_var("WAKACHI_LIBRARY_PATH", "/tmp/libmecab-test.so.2", || {
        let config = AnalyzerConfig::default();
        assert_eq!(
            config.library_path,
            Some(PathBuf::from("/tmp/libmecab-test.so.2"))
        );
    });
}

#[test]
fn analyzer_config_default_respects_wakachi_dic_path() {
    with_env_var("WAKACHI_DIC_PATH", "/var/lib/mecab/dic/ipadic-utf8", || {
        let config = AnalyzerConfig::default();
        assert_eq!(
            config.dictionary_path,
            Some(PathBuf::from("/var/lib/mecab/dic/ipadic-utf8"))
        );
    });
}

#[test]
fn analyzer_config_default_respects_cabocha_library_path() {
    with_env_var(
        "WAKACHI_CABOCHA_LIBRARY_PATH",
        "/tmp/libcabocha-test.so.5",
        || {
            let config = AnalyzerConfig::default();
            assert_eq!(
                config.cabocha_library_path,
                Some(PathBuf::from("/tmp/libcabocha-test.so.5"))
            );
        },
    );
}

#[test]
fn analyzer_config_debug_follows_env_presence() {
    with_env_var("WAKACHI_DEBUG", "1", || {
        assert!(AnalyzerConfig::default().debug);
    });
    // Presence is what matters, not the value.
    with_env_var("WAKACHI_DEBUG", "", || {
        assert!(AnalyzerConfig::default().debug);
    });
    with_env_vars(&[("WAKACHI_DEBUG", None)], || {
        assert!(!AnalyzerConfig::default().debug);
    });
}

#[test]
fn analyzer_config_builders_chain() {
    let config = AnalyzerConfig::default()
        .with_library_path("/opt/mecab/lib/libmecab.so")
        .with_dictionary_path("/opt/mecab/dic/ipadic")
        .with_charset("EUC-JP")
        .with_grammar_check(false)
        .with_dependency_parsing(false)
        .with_cabocha_library_path("/opt/cabocha/lib/libcabocha.so")
        .with_debug(true);
    assert_eq!(
        config.library_path,
        Some(PathBuf::from("/opt/mecab/lib/libmecab.so"))
    );
    assert_eq!(
        config.dictionary_path,
        Some(PathBuf::from("/opt/mecab/dic/ipadic"))
    );
    assert_eq!(config.charset.as_deref(), Some("EUC-JP"));
    assert!(!config.grammar_check);
    assert!(!config.dependency_parsing);
    assert_eq!(
        config.cabocha_library_path,
        Some(PathBuf::from("/opt/cabocha/lib/libcabocha.so"))
    );
    assert!(config.debug);
}

#[test]
fn charset_probe_text_matches_advertised_length() {
    assert_eq!(CHARSET_PROBE_TEXT.len(), CHARSET_PROBE_UTF8_LEN);
    assert_eq!(CHARSET_PROBE_TEXT.chars().count(), 2);
    assert_eq!(DEFAULT_CHARSET, "UTF-8");
}

#[test]
fn crate_root_reexports_cover_the_analysis_vocabulary() {
    let decoded = decode_feature("名詞,固有名詞,組織,*,*,*,ワカチ,ワカチ,ワカチ");
    assert_eq!(decoded.token_type, TokenType::Noun);
    assert_eq!(decoded.reading, "ワカチ");
    assert_eq!(TokenType::Verb.as_semantic_type(), "function");

    let text = "短い文。次の文";
    let boundaries = split_into_sentences(text);
    assert_eq!(boundaries.len(), 2);
    assert_eq!(&text[boundaries[0].begin..boundaries[0].end], "短い文。");

    let modifiers = TokenModifiers::PROPER_NOUN | TokenModifiers::SENTENCE_HEAD;
    assert!(modifiers.contains(TokenModifiers::PROPER_NOUN));
    assert!(!modifiers.contains(TokenModifiers::INFLECTED));

    assert_eq!(ROOT_CHUNK_LINK, -1);
    assert!(!crate::Analyzer::new().is_ready());
}
