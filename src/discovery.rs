use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;

use log::debug;

use crate::constants::{DEFAULT_CHARSET, DICRC_FILE_NAME, IPADIC_SUBDIR, MECAB_CONFIG_COMMAND};

pub(crate) fn default_mecab_library_candidates() -> &'static [&'static str] {
    #[cfg(target_os = "windows")]
    {
        &["libmecab.dll", "mecab.dll"]
    }
    #[cfg(target_os = "macos")]
    {
        &[
            "libmecab.dylib",
            "mecab.dylib",
            "/usr/local/lib/libmecab.dylib",
            "/opt/homebrew/lib/libmecab.dylib",
        ]
    }
    #[cfg(all(unix, not(target_os = "macos")))]
    {
        &[
            "libmecab.so.2",
            "libmecab.so",
            "/usr/lib/libmecab.so.2",
            "/usr/local/lib/libmecab.so",
            "/usr/lib/x86_64-linux-gnu/libmecab.so.2",
        ]
    }
}

pub(crate) fn default_cabocha_library_candidates() -> &'static [&'static str] {
    #[cfg(target_os = "windows")]
    {
        &["libcabocha.dll", "cabocha.dll"]
    }
    #[cfg(target_os = "macos")]
    {
        &[
            "libcabocha.dylib",
            "cabocha.dylib",
            "/usr/local/lib/libcabocha.dylib",
            "/opt/homebrew/lib/libcabocha.dylib",
        ]
    }
    #[cfg(all(unix, not(target_os = "macos")))]
    {
        &[
            "libcabocha.so.5",
            "libcabocha.so",
            "/usr/local/lib/libcabocha.so",
            "/usr/lib/x86_64-linux-gnu/libcabocha.so.5",
        ]
    }
}

pub(crate) fn discover_default_mecab_library_path() -> Option<PathBuf> {
    #[cfg(target_os = "windows")]
    let well_known = [
        PathBuf::from("C:\\Program Files\\MeCab\\bin\\libmecab.dll"),
        PathBuf::from("C:\\Program Files (x86)\\MeCab\\bin\\libmecab.dll"),
    ];
    #[cfg(target_os = "macos")]
    let well_known = [
        PathBuf::from("/usr/local/lib/libmecab.dylib"),
        PathBuf::from("/opt/homebrew/lib/libmecab.dylib"),
    ];
    #[cfg(all(unix, not(target_os = "macos")))]
    let well_known = [
        PathBuf::from("/usr/lib/libmecab.so.2"),
        PathBuf::from("/usr/lib/x86_64-linux-gnu/libmecab.so.2"),
        PathBuf::from("/usr/local/lib/libmecab.so"),
    ];

    well_known.into_iter().find(|path| path.exists())
}

pub(crate) fn discover_default_cabocha_library_path() -> Option<PathBuf> {
    #[cfg(target_os = "windows")]
    let well_known = [
        PathBuf::from("C:\\Program Files\\CaboCha\\bin\\libcabocha.dll"),
        PathBuf::from("C:\\Program Files (x86)\\CaboCha\\bin\\libcabocha.dll"),
    ];
    #[cfg(target_os = "macos")]
    let well_known = [
        PathBuf::from("/usr/local/lib/libcabocha.dylib"),
        PathBuf::from("/opt/homebrew/lib/libcabocha.dylib"),
    ];
    #[cfg(all(unix, not(target_os = "macos")))]
    let well_known = [
        PathBuf::from("/usr/lib/libcabocha.so.5"),
        PathBuf::from("/usr/lib/x86_64-linux-gnu/libcabocha.so.5"),
        PathBuf::from("/usr/local/lib/libcabocha.so"),
    ];

    well_known.into_iter().find(|path| path.exists())
}

/// Source of the engine's dictionary parent directory.
///
/// The production implementation asks the system `mecab-config` helper;
/// tests substitute canned values so discovery logic runs without
/// spawning processes.
pub trait DicdirSource {
    /// Returns the dictionary parent directory, or `None` when it cannot
    /// be determined.
    fn dicdir(&self) -> Option<String>;
}

/// [`DicdirSource`] backed by `mecab-config --dicdir`.
#[derive(Debug, Clone, Copy, Default)]
pub struct MecabConfigCommand;

impl DicdirSource for MecabConfigCommand {
    fn dicdir(&self) -> Option<String> {
        let output = Command::new(MECAB_CONFIG_COMMAND)
            .arg("--dicdir")
            .output()
            .ok()?;
        if !output.status.success() {
            return None;
        }
        first_stdout_line(&output.stdout)
    }
}

/// Only the first line counts; the helper prints exactly one path.
fn first_stdout_line(stdout: &[u8]) -> Option<String> {
    let text = String::from_utf8_lossy(stdout);
    let line = text.lines().next()?;
    if line.is_empty() {
        None
    } else {
        Some(line.to_string())
    }
}

/// What system discovery learned about the engine installation.
#[derive(Debug, Clone)]
pub struct SystemLibInfo {
    /// Whether a system dictionary directory was found at all.
    pub is_available: bool,
    /// Dictionary parent directory reported by the helper; empty when
    /// unavailable.
    pub dictionary_path: PathBuf,
    /// Declared charset, or [`crate::DEFAULT_CHARSET`] when nothing is
    /// declared.
    pub charset: String,
}

impl SystemLibInfo {
    pub(crate) fn unavailable() -> Self {
        Self {
            is_available: false,
            dictionary_path: PathBuf::new(),
            charset: DEFAULT_CHARSET.to_string(),
        }
    }

    /// Directory actually handed to the engine: the `ipadic` dictionary
    /// under the discovered parent.
    pub fn engine_dictionary(&self) -> PathBuf {
        self.dictionary_path.join(IPADIC_SUBDIR)
    }
}

/// Detects the system dictionary and its declared charset.
///
/// Never fails: a missing helper command, an unreadable dicrc, or an
/// absent charset key all degrade to defaults. The charset reported here
/// is declared metadata only; [`crate::detect_with_library`] additionally
/// verifies it against a running engine.
pub fn detect_system_dictionary(source: &dyn DicdirSource) -> SystemLibInfo {
    let dicdir = match source.dicdir() {
        Some(dicdir) if !dicdir.is_empty() => dicdir,
        _ => {
            debug!("discovery: helper reported no dictionary directory");
            return SystemLibInfo::unavailable();
        }
    };
    let dictionary_path = PathBuf::from(&dicdir);
    let dicrc = dictionary_path.join(IPADIC_SUBDIR).join(DICRC_FILE_NAME);
    let charset =
        charset_from_dicrc(&dicrc).unwrap_or_else(|| DEFAULT_CHARSET.to_string());
    debug!("discovery: dicdir={dicdir} declared charset={charset}");
    SystemLibInfo {
        is_available: true,
        dictionary_path,
        charset,
    }
}

pub(crate) fn charset_from_dicrc(path: &Path) -> Option<String> {
    let content = fs::read_to_string(path).ok()?;
    parse_dicrc_charset(&content)
}

/// Scans `key = value` lines for a charset-named key. Keys and values are
/// trimmed of spaces and tabs; the first matching key wins.
fn parse_dicrc_charset(content: &str) -> Option<String> {
    for line in content.lines() {
        let (key, value) = match line.split_once('=') {
            Some(pair) => pair,
            None => continue,
        };
        let key = key.trim_matches(|c: char| c == ' ' || c == '\t');
        if key != "config-charset" && key != "charset" {
            continue;
        }
        let value = value.trim_matches(|c: char| c == ' ' || c == '\t');
        if value.is_empty() {
            return None;
        }
        return Some(value.to_string());
    }
    None
}

#[cfg(test)]
mod discovery_tests {
    use super::{
        default_cabocha_library_candidates, default_mecab_library_candidates,
        detect_system_dictionary, parse_dicrc_charset, DicdirSource, MecabConfigCommand,
        SystemLibInfo,
    };
    use std::fs;
    use std::path::{Path, PathBuf};
    use std::time::{SystemTime, UNIX_EPOCH};

    struct CannedDicdir(Option<&'static str>);

    impl DicdirSource for CannedDicdir {
        fn dicdir(&self) -> Option<String> {
            self.0.map(str::to_string)
        }
    }

    fn make_temp_dir(name: &str) -> PathBuf {
        let suffix = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("clock should be monotonic")
            .as_nanos();
        let path = std::env::temp_dir().join(format!("wakachi-{name}-{suffix}"));
        fs::create_dir_all(&path).expect("failed to create temp dir");
        path
    }

    fn remove_tree(path: &Path) {
        let _ = fs::remove_dir_all(path);
    }

    #[test]
    fn library_candidates_match_platform() {
        let mecab = default_mecab_library_candidates();
        let cabocha = default_cabocha_library_candidates();
        assert!(!mecab.is_empty());
        assert!(!cabocha.is_empty());

        #[cfg(target_os = "windows")]
        assert!(mecab.iter().all(|candidate| candidate.ends_with(".dll")));
        #[cfg(target_os = "macos")]
        assert!(mecab.iter().any(|candidate| candidate.ends_with(".dylib")));
        #[cfg(all(unix, not(target_os = "macos")))]
        assert!(mecab.iter().any(|candidate| candidate.contains(".so")));
    }

    #[test]
    fn dicrc_charset_key_is_parsed_with_whitespace() {
        assert_eq!(
            parse_dicrc_charset("config-charset = EUC-JP\n"),
            Some("EUC-JP".to_string())
        );
        assert_eq!(
            parse_dicrc_charset("config-charset=UTF-8"),
            Some("UTF-8".to_string())
        );
        assert_eq!(
            parse_dicrc_charset("\tcharset\t=\tSHIFT-JIS\t"),
            Some("SHIFT-JIS".to_string())
        );
    }

    #[test]
    fn dicrc_unrelated_keys_are_ignored() {
        let content = "\
cost-factor = 800
bos-feature = BOS/EOS,*,*,*,*,*,*,*,*
config-charset = EUC-JP
eval-size = 8
";
        assert_eq!(parse_dicrc_charset(content), Some("EUC-JP".to_string()));
        assert_eq!(parse_dicrc_charset("cost-factor = 800"), None);
        assert_eq!(parse_dicrc_charset(""), None);
        assert_eq!(parse_dicrc_charset("config-charset ="), None);
    }

    #[test]
    fn detect_degrades_when_helper_reports_nothing() {
        let info = detect_system_dictionary(&CannedDicdir(None));
        assert!(!info.is_available);
        assert!(info.dictionary_path.as_os_str().is_empty());
        assert_eq!(info.charset, "UTF-8");

        let info = detect_system_dictionary(&CannedDicdir(Some("")));
        assert!(!info.is_available);
    }

    #[test]
    fn detect_reads_charset_from_dicrc_under_ipadic() {
        let dicdir = make_temp_dir("detect-dicrc");
        let ipadic = dicdir.join("ipadic");
        fs::create_dir_all(&ipadic).expect("failed to prepare ipadic dir");
        fs::write(ipadic.join("dicrc"), "config-charset = EUC-JP\n")
            .expect("failed to write dicrc");

        struct TempDicdir(PathBuf);
        impl DicdirSource for TempDicdir {
            fn dicdir(&self) -> Option<String> {
                Some(self.0.to_string_lossy().to_string())
            }
        }

        let info = detect_system_dictionary(&TempDicdir(dicdir.clone()));
        assert!(info.is_available);
        assert_eq!(info.dictionary_path, dicdir);
        assert_eq!(info.charset, "EUC-JP");
        assert_eq!(info.engine_dictionary(), dicdir.join("ipadic"));

        remove_tree(&dicdir);
    }

    #[test]
    fn detect_defaults_charset_when_dicrc_is_missing() {
        let dicdir = make_temp_dir("detect-no-dicrc");

        struct TempDicdir(PathBuf);
        impl DicdirSource for TempDicdir {
            fn dicdir(&self) -> Option<String> {
                Some(self.0.to_string_lossy().to_string())
            }
        }

        let info = detect_system_dictionary(&TempDicdir(dicdir.clone()));
        assert!(info.is_available);
        assert_eq!(info.charset, "UTF-8");

        remove_tree(&dicdir);
    }

    #[test]
    fn unavailable_info_has_utf8_default() {
        let info = SystemLibInfo::unavailable();
        assert!(!info.is_available);
        assert_eq!(info.charset, "UTF-8");
    }

    #[test]
    fn mecab_config_command_never_panics() {
        // Works whether or not mecab-config is installed.
        let _ = MecabConfigCommand.dicdir();
    }
}
