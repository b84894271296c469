use std::env;
use std::path::{Path, PathBuf};

/// Configuration consumed by [`crate::Analyzer::initialize`].
///
/// `Default` consults the `WAKACHI_*` environment variables, so a plain
/// `AnalyzerConfig::default()` picks up a deployment's explicit paths
/// without code changes. Every field can also be set through a `with_*`
/// builder method.
#[derive(Debug, Clone)]
pub struct AnalyzerConfig {
    /// Explicit path of the MeCab shared library. `None` falls back to the
    /// platform candidate list.
    pub library_path: Option<PathBuf>,
    /// Explicit dictionary directory handed to the engine as-is. `None`
    /// runs system discovery instead.
    pub dictionary_path: Option<PathBuf>,
    /// Explicit charset override; beats discovery. The runtime probe can
    /// still correct it when the engine demonstrably works in UTF-8.
    pub charset: Option<String>,
    /// Whether downstream grammar checking is enabled. Carried and
    /// reported by the analyzer; token analysis itself ignores it.
    pub grammar_check: bool,
    /// Whether to attempt loading the dependency parser at all.
    pub dependency_parsing: bool,
    /// Explicit path of the CaboCha shared library. `None` falls back to
    /// the platform candidate list.
    pub cabocha_library_path: Option<PathBuf>,
    /// Emit verbose per-token diagnostics through the `log` facade.
    pub debug: bool,
}

impl Default for AnalyzerConfig {
    fn default() -> Self {
        Self {
            library_path: env::var_os("WAKACHI_LIBRARY_PATH").map(PathBuf::from),
            dictionary_path: env::var_os("WAKACHI_DIC_PATH").map(PathBuf::from),
            charset: None,
            grammar_check: true,
            dependency_parsing: true,
            cabocha_library_path: env::var_os("WAKACHI_CABOCHA_LIBRARY_PATH").map(PathBuf::from),
            debug: env::var_os("WAKACHI_DEBUG").is_some(),
        }
    }
}

impl AnalyzerConfig {
    /// Sets the MeCab shared library path.
    pub fn with_library_path(mut self, library_path: impl AsRef<Path>) -> Self {
        self.library_path = Some(library_path.as_ref().to_path_buf());
        self
    }

    /// Sets the dictionary directory, bypassing system discovery.
    pub fn with_dictionary_path(mut self, dictionary_path: impl AsRef<Path>) -> Self {
        self.dictionary_path = Some(dictionary_path.as_ref().to_path_buf());
        self
    }

    /// Sets the charset the engine is assumed to work in.
    pub fn with_charset(mut self, charset: impl Into<String>) -> Self {
        self.charset = Some(charset.into());
        self
    }

    /// Enables or disables downstream grammar checking.
    pub fn with_grammar_check(mut self, grammar_check: bool) -> Self {
        self.grammar_check = grammar_check;
        self
    }

    /// Enables or disables the dependency-parsing capability.
    pub fn with_dependency_parsing(mut self, dependency_parsing: bool) -> Self {
        self.dependency_parsing = dependency_parsing;
        self
    }

    /// Sets the CaboCha shared library path.
    pub fn with_cabocha_library_path(mut self, cabocha_library_path: impl AsRef<Path>) -> Self {
        self.cabocha_library_path = Some(cabocha_library_path.as_ref().to_path_buf());
        self
    }

    /// Enables or disables verbose per-token diagnostics.
    pub fn with_debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }
}
