#![deny(missing_docs)]

//! Japanese morphological analysis with editor-grade positions, built on
//! runtime bindings to the MeCab C API (and CaboCha for dependency
//! structure).
//!
//! The crate loads the engine libraries with `dlopen` at runtime, so there
//! is nothing to link against at build time. Analysis entry points are
//! deliberately infallible: a missing engine, a failed parse, or text the
//! engine mangles all degrade to empty results, never to errors, because
//! the callers this crate is written for (language services, linters)
//! must keep serving regardless.
//!
//! ## Quick Start
//! ```no_run
//! use wakachi::{Analyzer, AnalyzerConfig};
//!
//! fn main() {
//!     let mut analyzer = Analyzer::new();
//!     if !analyzer.initialize(AnalyzerConfig::default()) {
//!         eprintln!("morphological engine unavailable");
//!         return;
//!     }
//!     for token in analyzer.analyze("今日は晴れです。") {
//!         println!(
//!             "{}\t{}:{}..{}\t{}",
//!             token.surface, token.line, token.start_char, token.end_char, token.feature
//!         );
//!     }
//! }
//! ```
//!
//! ## Initialization Paths
//! `wakachi` supports two common initialization modes:
//!
//! 1. Automatic discovery via [`Analyzer::new`] + [`AnalyzerConfig::default`]
//!   - Finds the library through platform soname candidates and
//!     well-known install locations.
//!   - Finds the system dictionary through the `mecab-config` helper and
//!     reads its declared charset, then verifies the charset empirically
//!     against the running engine.
//! 2. Explicit setup for controlled deployments:
//!
//! ```no_run
//! use wakachi::{Analyzer, AnalyzerConfig};
//!
//! let config = AnalyzerConfig::default()
//!     .with_library_path("/usr/lib/libmecab.so.2")
//!     .with_dictionary_path("/var/lib/mecab/dic/ipadic-utf8")
//!     .with_dependency_parsing(false);
//! let mut analyzer = Analyzer::new();
//! let ready = analyzer.initialize(config);
//! assert!(ready || !analyzer.is_ready());
//! ```
//!
//! ## Offset And Unit Rules
//! - [`TokenData`] positions are zero-based: `line` counts `\n`-separated
//!   lines, `start_char`/`end_char` count UTF-16 code units from the line
//!   start (a supplementary-plane character counts as two units).
//! - Tokens are aligned against the exact input string, so positions stay
//!   valid even when the engine normalizes or drops whitespace.
//! - [`SentenceBoundary`] and [`MorphemeNode::offset`] use UTF-8 byte
//!   offsets into the input.
//!
//! ## Environment Variables
//! - `WAKACHI_LIBRARY_PATH`: explicit MeCab dynamic library path.
//! - `WAKACHI_DIC_PATH`: explicit dictionary directory path.
//! - `WAKACHI_CABOCHA_LIBRARY_PATH`: explicit CaboCha dynamic library path.
//! - `WAKACHI_DEBUG`: when set (any value), per-token trace logging.

mod align;
mod config;
mod constants;
mod discovery;
mod encoding;
mod error;
mod features;
mod model;
mod native;
mod runtime;
mod segment;
mod types;

pub use constants::*;
pub use discovery::{detect_system_dictionary, DicdirSource, MecabConfigCommand, SystemLibInfo};
pub use error::{Result, WakachiError};
pub use features::{
    decode_feature, token_modifiers, DecodedFeature, TokenModifiers, TokenType, TOKEN_TYPES,
};
pub use model::{ChunkRecord, DictionaryInfo, Position, SentenceBoundary, TokenData};
pub use runtime::{
    detect_with_library, Analyzer, CabochaLibrary, DependencyParser, DependencyTree, MecabLibrary,
    MorphemeNode, MorphemeNodeIter, MorphemeNodes, Tagger,
};
pub use segment::split_into_sentences;
pub use types::AnalyzerConfig;

#[cfg(test)]
mod test_support;
#[cfg(test)]
mod tests;
