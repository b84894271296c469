//! Behavior when no engine can be loaded. These tests are fully
//! deterministic: they point the analyzer at paths that cannot exist and
//! verify the degradation contract instead of panicking or erroring.

use std::path::{Path, PathBuf};

use wakachi::{
    detect_system_dictionary, Analyzer, AnalyzerConfig, DicdirSource, MecabLibrary,
    DEFAULT_CHARSET,
};

fn bad_config() -> AnalyzerConfig {
    AnalyzerConfig::default()
        .with_library_path("/nonexistent/wakachi/libmecab.so.2")
        .with_cabocha_library_path("/nonexistent/wakachi/libcabocha.so.5")
}

#[test]
fn initialize_reports_false_and_degrades_to_empty_results() {
    let mut analyzer = Analyzer::new();
    assert!(!analyzer.initialize(bad_config()));

    assert!(!analyzer.is_ready());
    assert!(!analyzer.has_dependency_capability());
    assert_eq!(analyzer.charset(), DEFAULT_CHARSET);
    assert!(analyzer.analyze("解析できないはずの文です。").is_empty());
    assert!(analyzer.analyze_dependencies("係り受けもなし。").is_empty());
    assert!(analyzer.tagger().is_none());
    assert!(analyzer.dependency_parser().is_none());
}

#[test]
fn failed_state_persists_until_the_next_initialize() {
    let mut analyzer = Analyzer::new();
    assert!(!analyzer.initialize(bad_config()));
    assert!(analyzer.analyze("一回目").is_empty());

    // A second failing initialize replaces the failed state with a new
    // failed state, never with a stale engine.
    assert!(!analyzer.initialize(bad_config()));
    assert!(!analyzer.is_ready());
    assert!(analyzer.analyze("二回目").is_empty());
}

#[test]
fn repeated_lifecycle_is_safe_without_an_engine() {
    // Construction and teardown must not touch native handles that were
    // never created.
    for _ in 0..8 {
        let mut analyzer = Analyzer::new();
        let _ = analyzer.initialize(bad_config());
        assert!(analyzer.analyze("テスト").is_empty());
        drop(analyzer);
    }
}

#[test]
fn explicit_library_load_failure_is_an_error_not_a_panic() {
    let error = MecabLibrary::load("/nonexistent/wakachi/libmecab.so.2")
        .expect_err("loading a nonexistent library must fail");
    let message = error.to_string();
    assert!(message.contains("failed to load library"), "got: {message}");
}

struct CannedSource(Option<String>);

impl DicdirSource for CannedSource {
    fn dicdir(&self) -> Option<String> {
        self.0.clone()
    }
}

#[test]
fn custom_dicdir_source_drives_detection() {
    let missing = detect_system_dictionary(&CannedSource(None));
    assert!(!missing.is_available);
    assert!(missing.dictionary_path.as_os_str().is_empty());
    assert_eq!(missing.charset, DEFAULT_CHARSET);

    let reported = detect_system_dictionary(&CannedSource(Some(
        "/nonexistent/wakachi/dic".to_string(),
    )));
    assert!(reported.is_available);
    assert_eq!(
        reported.dictionary_path,
        PathBuf::from("/nonexistent/wakachi/dic")
    );
    // No dicrc on this machine, so the declared charset is the default.
    assert_eq!(reported.charset, DEFAULT_CHARSET);
    assert_eq!(
        reported.engine_dictionary(),
        Path::new("/nonexistent/wakachi/dic").join("ipadic")
    );
}

#[test]
fn injected_source_feeds_initialization() {
    // Discovery runs, finds nothing, and the analyzer then fails on the
    // unavailable library rather than on the missing dictionary.
    let mut analyzer = Analyzer::with_dicdir_source(CannedSource(None));
    assert!(!analyzer.initialize(bad_config()));
    assert!(!analyzer.is_ready());
}
