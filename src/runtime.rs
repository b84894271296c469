//! Engine runtime: library loading, tagger and parser handles, the
//! charset probe, and the [`Analyzer`] that turns text into positioned
//! tokens.

use std::ffi::{CStr, CString};
use std::marker::PhantomData;
use std::path::Path;
use std::ptr;
use std::sync::Arc;

use log::{debug, trace, warn};

use crate::align::{line_starts, position_at, utf16_len, AlignmentCursor};
use crate::config::{CabochaHandle, CabochaTreeHandle, MecabHandle};
use crate::constants::{
    CHARSET_PROBE_TEXT, CHARSET_PROBE_UTF8_LEN, DEFAULT_CHARSET, MECAB_BOS_NODE, MECAB_EON_NODE,
    MECAB_EOS_NODE,
};
use crate::discovery::{
    default_cabocha_library_candidates, default_mecab_library_candidates,
    detect_system_dictionary, discover_default_cabocha_library_path,
    discover_default_mecab_library_path, DicdirSource, MecabConfigCommand, SystemLibInfo,
};
use crate::encoding::EngineEncoding;
use crate::error::{Result, WakachiError};
use crate::features::{decode_feature, token_modifiers};
use crate::model::{ChunkRecord, DictionaryInfo, TokenData};
use crate::native::{
    cabocha_error, cstr_to_bytes, cstr_to_string, mecab_error, CabochaApi, CabochaChunkRaw,
    CabochaTokenRaw, DynamicLibrary, LoadedCabochaLibrary, LoadedMecabLibrary, MecabApi,
    MecabNodeRaw,
};
use crate::types::AnalyzerConfig;

/// Handle to a loaded MeCab dynamic library plus resolved function table.
///
/// Cheap to clone; every tagger created from it keeps the library open
/// for as long as the tagger lives.
#[derive(Clone, Debug)]
pub struct MecabLibrary {
    inner: Arc<LoadedMecabLibrary>,
}

impl MecabLibrary {
    /// Loads a MeCab dynamic library from an explicit path.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if path.as_os_str().is_empty() {
            return Err(WakachiError::InvalidArgument(
                "library path is empty".to_string(),
            ));
        }
        let library = DynamicLibrary::open(path)?;
        let api = unsafe { MecabApi::load(&library)? };
        Ok(Self {
            inner: Arc::new(LoadedMecabLibrary {
                _library: library,
                api,
            }),
        })
    }

    /// Loads MeCab from common platform-specific locations.
    pub fn load_default() -> Result<Self> {
        let mut errors = Vec::new();

        for candidate in default_mecab_library_candidates() {
            match Self::load(candidate) {
                Ok(loaded) => return Ok(loaded),
                Err(error) => errors.push(format!("{candidate}: {error}")),
            }
        }

        if let Some(path) = discover_default_mecab_library_path() {
            match Self::load(&path) {
                Ok(loaded) => return Ok(loaded),
                Err(error) => errors.push(format!("{}: {}", path.display(), error)),
            }
        }

        Err(WakachiError::LibraryLoad(format!(
            "set WAKACHI_LIBRARY_PATH to the MeCab library path. tried: {}",
            errors.join(" | ")
        )))
    }

    /// Engine version string.
    pub fn version(&self) -> String {
        cstr_to_string(unsafe { (self.inner.api.mecab_version)() })
    }

    pub(crate) fn api(&self) -> &MecabApi {
        &self.inner.api
    }

    pub(crate) fn loaded(&self) -> Arc<LoadedMecabLibrary> {
        Arc::clone(&self.inner)
    }
}

/// Handle to a loaded CaboCha dynamic library plus resolved function
/// table.
#[derive(Clone)]
pub struct CabochaLibrary {
    inner: Arc<LoadedCabochaLibrary>,
}

impl CabochaLibrary {
    /// Loads a CaboCha dynamic library from an explicit path.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if path.as_os_str().is_empty() {
            return Err(WakachiError::InvalidArgument(
                "library path is empty".to_string(),
            ));
        }
        let library = DynamicLibrary::open(path)?;
        let api = unsafe { CabochaApi::load(&library)? };
        Ok(Self {
            inner: Arc::new(LoadedCabochaLibrary {
                _library: library,
                api,
            }),
        })
    }

    /// Loads CaboCha from common platform-specific locations.
    pub fn load_default() -> Result<Self> {
        let mut errors = Vec::new();

        for candidate in default_cabocha_library_candidates() {
            match Self::load(candidate) {
                Ok(loaded) => return Ok(loaded),
                Err(error) => errors.push(format!("{candidate}: {error}")),
            }
        }

        if let Some(path) = discover_default_cabocha_library_path() {
            match Self::load(&path) {
                Ok(loaded) => return Ok(loaded),
                Err(error) => errors.push(format!("{}: {}", path.display(), error)),
            }
        }

        Err(WakachiError::LibraryLoad(format!(
            "set WAKACHI_CABOCHA_LIBRARY_PATH to the CaboCha library path. tried: {}",
            errors.join(" | ")
        )))
    }

    /// Engine version string, when the library exports it.
    pub fn version(&self) -> Option<String> {
        self.inner
            .api
            .cabocha_version
            .map(|version| cstr_to_string(unsafe { version() }))
    }

    pub(crate) fn loaded(&self) -> Arc<LoadedCabochaLibrary> {
        Arc::clone(&self.inner)
    }
}

/// One MeCab tagger instance owning its native handle.
///
/// The handle is released on drop. Raw-pointer fields keep the type
/// `!Send` and `!Sync`, which matches the engine's threading rules.
pub struct Tagger {
    library: Arc<LoadedMecabLibrary>,
    handle: MecabHandle,
}

impl Tagger {
    /// Constructs a tagger with raw engine arguments (such as
    /// `-d <dictionary>`). Empty arguments let the engine resolve its
    /// own default dictionary.
    pub fn new(library: &MecabLibrary, args: &str) -> Result<Self> {
        let api = *library.api();
        let args_c = CString::new(args)?;
        let handle = unsafe { (api.mecab_new2)(args_c.as_ptr()) };
        if handle.is_null() {
            return Err(mecab_error(
                &api,
                ptr::null_mut(),
                "tagger construction failed",
            ));
        }
        Ok(Self {
            library: library.loaded(),
            handle,
        })
    }

    /// Parses engine-charset bytes into this call's node list.
    ///
    /// The returned view borrows the tagger mutably: the engine reuses
    /// its lattice on the next parse, so holding nodes across a second
    /// `parse` call does not compile.
    pub fn parse(&mut self, input: &[u8]) -> Result<MorphemeNodes<'_>> {
        let input_c = CString::new(input.to_vec())?;
        let api = self.library.api;
        let head = unsafe { (api.mecab_sparse_tonode)(self.handle, input_c.as_ptr()) };
        if head.is_null() {
            return Err(mecab_error(&api, self.handle, "parse failed"));
        }
        Ok(MorphemeNodes {
            input: input_c,
            head,
            _tagger: PhantomData,
        })
    }

    /// Dictionaries this tagger has loaded, when the engine exports the
    /// introspection symbol; empty otherwise.
    pub fn dictionary_info(&self) -> Vec<DictionaryInfo> {
        let api = self.library.api;
        let dictionary_info = match api.mecab_dictionary_info {
            Some(dictionary_info) => dictionary_info,
            None => return Vec::new(),
        };
        let mut infos = Vec::new();
        let mut raw = unsafe { dictionary_info(self.handle) };
        while let Some(value) = unsafe { raw.as_ref() } {
            infos.push(DictionaryInfo::from_raw(value));
            raw = value.next;
        }
        infos
    }
}

impl Drop for Tagger {
    fn drop(&mut self) {
        if self.handle.is_null() {
            return;
        }
        unsafe {
            (self.library.api.mecab_destroy)(self.handle);
        }
        self.handle = ptr::null_mut();
    }
}

/// Borrowed view over the nodes of one parse call.
///
/// Owns the input buffer the engine's surface pointers reference, so
/// surface bytes stay valid exactly as long as the view.
pub struct MorphemeNodes<'a> {
    input: CString,
    head: *const MecabNodeRaw,
    _tagger: PhantomData<&'a mut Tagger>,
}

impl MorphemeNodes<'_> {
    /// Iterates the nodes in input order, sentinels included.
    pub fn iter(&self) -> MorphemeNodeIter<'_> {
        MorphemeNodeIter {
            cursor: self.head,
            input: &self.input,
        }
    }
}

/// Iterator over the nodes of one parse.
pub struct MorphemeNodeIter<'n> {
    cursor: *const MecabNodeRaw,
    input: &'n CString,
}

impl<'n> Iterator for MorphemeNodeIter<'n> {
    type Item = MorphemeNode<'n>;

    fn next(&mut self) -> Option<Self::Item> {
        let raw = unsafe { self.cursor.as_ref() }?;
        self.cursor = raw.next;
        Some(node_from_raw(raw, self.input))
    }
}

/// One lattice node. Byte fields are in the engine charset, borrowed
/// from the parse they came from.
#[derive(Debug, Clone, Copy)]
pub struct MorphemeNode<'n> {
    /// Surface bytes. Unlike the feature record these are not
    /// NUL-terminated by the engine, hence a length-bounded slice.
    pub surface: &'n [u8],
    /// Feature record bytes.
    pub feature: &'n [u8],
    /// Byte offset of the surface inside the parsed input, when the
    /// engine's surface pointer falls within that buffer.
    pub offset: Option<usize>,
    /// Node stat; see the `MECAB_*_NODE` constants.
    pub stat: u8,
    /// Surface byte length.
    pub length: u16,
    /// Surface byte length plus any whitespace preceding it.
    pub rlength: u16,
}

impl MorphemeNode<'_> {
    /// Whether this is a BOS/EOS/EON sentinel rather than a content
    /// node.
    pub fn is_sentinel(&self) -> bool {
        matches!(self.stat, MECAB_BOS_NODE | MECAB_EOS_NODE | MECAB_EON_NODE)
    }
}

fn node_from_raw<'n>(raw: &'n MecabNodeRaw, input: &'n CString) -> MorphemeNode<'n> {
    let surface = if raw.surface.is_null() {
        &[][..]
    } else {
        unsafe { std::slice::from_raw_parts(raw.surface as *const u8, raw.length as usize) }
    };
    let feature = if raw.feature.is_null() {
        &[][..]
    } else {
        unsafe { CStr::from_ptr(raw.feature) }.to_bytes()
    };
    MorphemeNode {
        surface,
        feature,
        offset: surface_offset(raw, input),
        stat: raw.stat,
        length: raw.length,
        rlength: raw.rlength,
    }
}

fn surface_offset(raw: &MecabNodeRaw, input: &CString) -> Option<usize> {
    if raw.surface.is_null() {
        return None;
    }
    let offset = (raw.surface as usize).checked_sub(input.as_ptr() as usize)?;
    if offset + raw.length as usize <= input.as_bytes().len() {
        Some(offset)
    } else {
        None
    }
}

/// One CaboCha parser instance owning its native handle.
pub struct DependencyParser {
    library: Arc<LoadedCabochaLibrary>,
    handle: CabochaHandle,
}

impl DependencyParser {
    /// Constructs a parser with raw engine arguments; empty arguments
    /// use the engine defaults.
    pub fn new(library: &CabochaLibrary, args: &str) -> Result<Self> {
        let api = library.loaded().api;
        let args_c = CString::new(args)?;
        let handle = unsafe { (api.cabocha_new2)(args_c.as_ptr()) };
        if handle.is_null() {
            return Err(cabocha_error(
                &api,
                ptr::null_mut(),
                "parser construction failed",
            ));
        }
        Ok(Self {
            library: library.loaded(),
            handle,
        })
    }

    /// Parses engine-charset bytes into a dependency tree view.
    ///
    /// Same exclusivity rule as [`Tagger::parse`]: the engine reuses the
    /// tree on the next parse, so the view borrows the parser mutably.
    pub fn parse_tree(&mut self, input: &[u8]) -> Result<DependencyTree<'_>> {
        let input_c = CString::new(input.to_vec())?;
        let api = self.library.api;
        let tree = unsafe { (api.cabocha_sparse_totree)(self.handle, input_c.as_ptr()) };
        if tree.is_null() {
            return Err(cabocha_error(&api, self.handle, "dependency parse failed"));
        }
        Ok(DependencyTree {
            _input: input_c,
            api,
            tree,
            _parser: PhantomData,
        })
    }
}

impl Drop for DependencyParser {
    fn drop(&mut self) {
        if self.handle.is_null() {
            return;
        }
        unsafe {
            (self.library.api.cabocha_destroy)(self.handle);
        }
        self.handle = ptr::null_mut();
    }
}

/// Borrowed view of one dependency parse. The tree itself is owned and
/// reused by the parser; only the view borrows it.
pub struct DependencyTree<'a> {
    _input: CString,
    api: CabochaApi,
    tree: CabochaTreeHandle,
    _parser: PhantomData<&'a mut DependencyParser>,
}

impl DependencyTree<'_> {
    /// Number of chunks in the tree.
    pub fn chunk_count(&self) -> usize {
        unsafe { (self.api.cabocha_tree_chunk_size)(self.tree) }
    }

    /// Number of tokens in the tree.
    pub fn token_count(&self) -> usize {
        unsafe { (self.api.cabocha_tree_token_size)(self.tree) }
    }

    pub(crate) fn chunk(&self, index: usize) -> Option<&CabochaChunkRaw> {
        if index >= self.chunk_count() {
            return None;
        }
        unsafe { (self.api.cabocha_tree_chunk)(self.tree, index).as_ref() }
    }

    pub(crate) fn token(&self, index: usize) -> Option<&CabochaTokenRaw> {
        if index >= self.token_count() {
            return None;
        }
        unsafe { (self.api.cabocha_tree_token)(self.tree, index).as_ref() }
    }

    /// Flattens the tree into chunk records, decoding surfaces from the
    /// engine charset. Token ranges are clamped to the tree's own size.
    pub(crate) fn chunk_records(&self, encoding: &EngineEncoding) -> Vec<ChunkRecord> {
        let token_count = self.token_count();
        let chunk_count = self.chunk_count();
        let mut records = Vec::with_capacity(chunk_count);
        for index in 0..chunk_count {
            let chunk = match self.chunk(index) {
                Some(chunk) => *chunk,
                None => continue,
            };
            let begin = chunk.token_pos.min(token_count);
            let end = chunk
                .token_pos
                .saturating_add(chunk.token_size)
                .min(token_count);
            let mut text = String::new();
            for token_index in begin..end {
                if let Some(token) = self.token(token_index) {
                    let bytes = cstr_to_bytes(token.surface);
                    text.push_str(&encoding.decode(&bytes));
                }
            }
            records.push(ChunkRecord {
                chunk_id: index as u32,
                head_chunk_id: chunk.link,
                score: chunk.score,
                text,
            });
        }
        records
    }
}

/// Runs system discovery including the empirical charset probe.
///
/// On top of [`detect_system_dictionary`]: when the declared charset is
/// not UTF-8, a throwaway default tagger parses [`CHARSET_PROBE_TEXT`];
/// if some non-sentinel surface comes back as exactly the probe's UTF-8
/// bytes, the declared charset is overridden, because observed behavior
/// beats metadata. Probe failures leave the declared value untouched;
/// this never fails.
pub fn detect_with_library(source: &dyn DicdirSource, library: &MecabLibrary) -> SystemLibInfo {
    let mut info = detect_system_dictionary(source);
    if info.charset != DEFAULT_CHARSET {
        match Tagger::new(library, "") {
            Ok(mut tagger) => {
                if tagger_round_trips_utf8(&mut tagger) {
                    debug!(
                        "charset probe: engine round-trips UTF-8, overriding declared {}",
                        info.charset
                    );
                    info.charset = DEFAULT_CHARSET.to_string();
                }
            }
            Err(error) => debug!("charset probe skipped: {error}"),
        }
    }
    info
}

/// Charset the given tagger empirically works in; `declared` when the
/// probe cannot prove UTF-8.
pub(crate) fn confirm_charset(tagger: &mut Tagger, declared: &str) -> String {
    if declared == DEFAULT_CHARSET {
        return declared.to_string();
    }
    if tagger_round_trips_utf8(tagger) {
        debug!("charset probe: overriding declared {declared} with {DEFAULT_CHARSET}");
        DEFAULT_CHARSET.to_string()
    } else {
        declared.to_string()
    }
}

fn tagger_round_trips_utf8(tagger: &mut Tagger) -> bool {
    let probe = CHARSET_PROBE_TEXT.as_bytes();
    let nodes = match tagger.parse(probe) {
        Ok(nodes) => nodes,
        Err(_) => return false,
    };
    nodes.iter().any(|node| {
        !node.is_sentinel() && node.surface.len() == CHARSET_PROBE_UTF8_LEN && node.surface == probe
    })
}

enum EngineState {
    Uninitialized,
    Probing,
    Ready(Box<ReadyEngine>),
    Failed,
}

struct ReadyEngine {
    tagger: Tagger,
    dependency: Option<DependencyParser>,
    encoding: EngineEncoding,
    grammar_check: bool,
    debug: bool,
}

/// Morphological analyzer with a managed engine lifecycle.
///
/// The analyzer moves through uninitialized, probing, ready, and failed
/// states; [`Analyzer::initialize`] fully replaces any previous engine,
/// releasing its handles first. Analysis entry points never error:
/// whenever the engine cannot serve, they return empty results.
pub struct Analyzer {
    state: EngineState,
    dicdir_source: Box<dyn DicdirSource>,
}

impl Analyzer {
    /// Creates an analyzer that discovers dictionaries through the
    /// system helper command. Construction performs no I/O.
    pub fn new() -> Self {
        Self::with_dicdir_source(MecabConfigCommand)
    }

    /// Creates an analyzer with a custom dictionary-directory source.
    pub fn with_dicdir_source(source: impl DicdirSource + 'static) -> Self {
        Self {
            state: EngineState::Uninitialized,
            dicdir_source: Box::new(source),
        }
    }

    /// Initializes (or fully re-initializes) the engine from `config`,
    /// returning whether the analyzer reached the ready state.
    ///
    /// A failed attempt leaves a terminal failed state that only another
    /// `initialize` call can leave. The failure cause is logged, not
    /// returned.
    pub fn initialize(&mut self, config: AnalyzerConfig) -> bool {
        // Old handles must be released before the new engine exists,
        // whichever way construction ends.
        self.state = EngineState::Probing;
        match self.build_engine(&config) {
            Ok(engine) => {
                debug!(
                    "analyzer ready: charset={} dependency={}",
                    engine.encoding.name(),
                    engine.dependency.is_some()
                );
                self.state = EngineState::Ready(Box::new(engine));
                true
            }
            Err(error) => {
                warn!("engine initialization failed: {error}");
                self.state = EngineState::Failed;
                false
            }
        }
    }

    /// Whether the engine is initialized and ready to analyze.
    pub fn is_ready(&self) -> bool {
        matches!(self.state, EngineState::Ready(_))
    }

    /// Charset of the active engine; the default before initialization.
    pub fn charset(&self) -> &str {
        match &self.state {
            EngineState::Ready(engine) => engine.encoding.name(),
            _ => DEFAULT_CHARSET,
        }
    }

    /// Whether dependency extraction is available on this instance.
    pub fn has_dependency_capability(&self) -> bool {
        matches!(&self.state, EngineState::Ready(engine) if engine.dependency.is_some())
    }

    /// Whether the active configuration asked for downstream grammar
    /// checking.
    pub fn grammar_check_enabled(&self) -> bool {
        matches!(&self.state, EngineState::Ready(engine) if engine.grammar_check)
    }

    /// Mutable access to the underlying tagger, when ready.
    pub fn tagger(&mut self) -> Option<&mut Tagger> {
        match &mut self.state {
            EngineState::Ready(engine) => Some(&mut engine.tagger),
            _ => None,
        }
    }

    /// Mutable access to the underlying dependency parser, when present.
    pub fn dependency_parser(&mut self) -> Option<&mut DependencyParser> {
        match &mut self.state {
            EngineState::Ready(engine) => engine.dependency.as_mut(),
            _ => None,
        }
    }

    /// Analyzes text into positioned tokens.
    ///
    /// Infallible by contract: empty input, a not-ready engine, and any
    /// internal parse failure all produce an empty list.
    pub fn analyze(&mut self, text: &str) -> Vec<TokenData> {
        if text.is_empty() {
            return Vec::new();
        }
        let engine = match &mut self.state {
            EngineState::Ready(engine) => engine,
            _ => {
                debug!("analyze called before the engine is ready");
                return Vec::new();
            }
        };
        match analyze_tokens(engine, text) {
            Ok(tokens) => tokens,
            Err(error) => {
                warn!("analysis failed: {error}");
                Vec::new()
            }
        }
    }

    /// Extracts dependency chunks for the text.
    ///
    /// Empty when the instance has no dependency capability; that is a
    /// normal outcome, not an error.
    pub fn analyze_dependencies(&mut self, text: &str) -> Vec<ChunkRecord> {
        if text.is_empty() {
            return Vec::new();
        }
        let engine = match &mut self.state {
            EngineState::Ready(engine) => engine,
            _ => return Vec::new(),
        };
        let encoding = engine.encoding;
        let parser = match engine.dependency.as_mut() {
            Some(parser) => parser,
            None => {
                debug!("dependency parsing not available on this instance");
                return Vec::new();
            }
        };
        let input = encoding.encode(text);
        match parser.parse_tree(&input) {
            Ok(tree) => tree.chunk_records(&encoding),
            Err(error) => {
                warn!("dependency analysis failed: {error}");
                Vec::new()
            }
        }
    }

    fn build_engine(&self, config: &AnalyzerConfig) -> Result<ReadyEngine> {
        let library = match &config.library_path {
            Some(path) => MecabLibrary::load(path)?,
            None => MecabLibrary::load_default()?,
        };
        debug!("loaded MeCab {}", library.version());

        let (dictionary, discovered_charset) = match &config.dictionary_path {
            Some(path) => (Some(path.clone()), None),
            None => {
                let info = detect_system_dictionary(self.dicdir_source.as_ref());
                if info.is_available {
                    (Some(info.engine_dictionary()), Some(info.charset))
                } else {
                    (None, None)
                }
            }
        };

        let mut tagger = construct_tagger(&library, dictionary.as_deref())?;

        let declared = config
            .charset
            .clone()
            .or(discovered_charset)
            .unwrap_or_else(|| DEFAULT_CHARSET.to_string());
        // The probe runs against the instance that will actually serve;
        // a fallback construction may have loaded a different dictionary
        // than discovery looked at.
        let active = confirm_charset(&mut tagger, &declared);
        let encoding = match EngineEncoding::resolve(&active) {
            Some(encoding) => encoding,
            None => {
                warn!("unknown charset label {active:?}, assuming {DEFAULT_CHARSET}");
                EngineEncoding::utf8()
            }
        };

        if config.debug {
            for info in tagger.dictionary_info() {
                debug!(
                    "dictionary: {} charset={} entries={}",
                    info.filename, info.charset, info.size
                );
            }
        }

        let dependency = if config.dependency_parsing {
            match load_dependency_parser(config) {
                Ok(parser) => Some(parser),
                Err(error) => {
                    debug!("dependency parsing unavailable: {error}");
                    None
                }
            }
        } else {
            None
        };

        Ok(ReadyEngine {
            tagger,
            dependency,
            encoding,
            grammar_check: config.grammar_check,
            debug: config.debug,
        })
    }
}

impl Default for Analyzer {
    fn default() -> Self {
        Self::new()
    }
}

/// Builds the tagger with an explicit dictionary argument, retrying once
/// with empty arguments so the engine can fall back to its own default
/// dictionary resolution.
fn construct_tagger(library: &MecabLibrary, dictionary: Option<&Path>) -> Result<Tagger> {
    let args = match dictionary {
        Some(path) => format!("-d {}", path.display()),
        None => String::new(),
    };
    match Tagger::new(library, &args) {
        Ok(tagger) => Ok(tagger),
        Err(error) if !args.is_empty() => {
            warn!("tagger construction with {args:?} failed ({error}), retrying bare");
            Tagger::new(library, "")
        }
        Err(error) => Err(error),
    }
}

fn load_dependency_parser(config: &AnalyzerConfig) -> Result<DependencyParser> {
    let library = match &config.cabocha_library_path {
        Some(path) => CabochaLibrary::load(path)?,
        None => CabochaLibrary::load_default()?,
    };
    if let Some(version) = library.version() {
        debug!("loaded CaboCha {version}");
    }
    DependencyParser::new(&library, "")
}

fn analyze_tokens(engine: &mut ReadyEngine, text: &str) -> Result<Vec<TokenData>> {
    let encoding = engine.encoding;
    let verbose = engine.debug;
    let input = encoding.encode(text);
    let nodes = engine.tagger.parse(&input)?;

    let starts = line_starts(text);
    let mut cursor = AlignmentCursor::new();
    let mut tokens = Vec::new();
    for node in nodes.iter() {
        if node.is_sentinel() {
            continue;
        }
        let surface = encoding.decode(node.surface);
        if surface.is_empty() {
            continue;
        }
        // Native offsets only mean something when the engine buffer and
        // the input text share a byte space.
        let native_hint = if encoding.is_utf8() { node.offset } else { None };
        let start = cursor.locate(text, &surface, native_hint);
        let position = position_at(text, &starts, start);
        let end_char = position.character + utf16_len(&surface) as u32;

        let feature = encoding.decode(node.feature).into_owned();
        let decoded = decode_feature(&feature);
        let modifiers = token_modifiers(&feature, text, start);
        if verbose {
            trace!(
                "token {:?} line={} chars={}..{} type={:?} modifiers={:?}",
                surface,
                position.line,
                position.character,
                end_char,
                decoded.token_type,
                modifiers
            );
        }
        tokens.push(TokenData {
            surface: surface.into_owned(),
            line: position.line,
            start_char: position.character,
            end_char,
            feature,
            base_form: decoded.base_form,
            reading: decoded.reading,
            pronunciation: decoded.pronunciation,
            token_type: decoded.token_type,
            modifiers,
        });
    }
    Ok(tokens)
}
