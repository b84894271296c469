use std::ffi::{CStr, CString};
use std::os::raw::{c_char, c_float, c_int, c_long, c_uint, c_ushort, c_void};
use std::path::Path;
use std::ptr;

use crate::config::{CabochaHandle, CabochaTreeHandle, MecabHandle};
use crate::error::{Result, WakachiError};

type FnMecabNew2 = unsafe extern "C" fn(*const c_char) -> MecabHandle;
type FnMecabDestroy = unsafe extern "C" fn(MecabHandle);
type FnMecabStrerror = unsafe extern "C" fn(MecabHandle) -> *const c_char;
type FnMecabSparseTonode = unsafe extern "C" fn(MecabHandle, *const c_char) -> *const MecabNodeRaw;
type FnMecabVersion = unsafe extern "C" fn() -> *const c_char;
type FnMecabDictionaryInfo =
    unsafe extern "C" fn(MecabHandle) -> *const MecabDictionaryInfoRaw;

type FnCabochaNew2 = unsafe extern "C" fn(*const c_char) -> CabochaHandle;
type FnCabochaDestroy = unsafe extern "C" fn(CabochaHandle);
type FnCabochaStrerror = unsafe extern "C" fn(CabochaHandle) -> *const c_char;
type FnCabochaSparseTotree =
    unsafe extern "C" fn(CabochaHandle, *const c_char) -> CabochaTreeHandle;
type FnCabochaVersion = unsafe extern "C" fn() -> *const c_char;
type FnCabochaTreeChunkSize = unsafe extern "C" fn(CabochaTreeHandle) -> usize;
type FnCabochaTreeTokenSize = unsafe extern "C" fn(CabochaTreeHandle) -> usize;
type FnCabochaTreeChunk =
    unsafe extern "C" fn(CabochaTreeHandle, usize) -> *const CabochaChunkRaw;
type FnCabochaTreeToken =
    unsafe extern "C" fn(CabochaTreeHandle, usize) -> *const CabochaTokenRaw;

/// Lattice node as laid out by `mecab.h` (`mecab_node_t`).
///
/// `surface` is not NUL-terminated; its extent is `length`. `rlength` is
/// `length` plus any whitespace that precedes the surface in the input.
#[repr(C)]
#[derive(Clone, Copy, Debug)]
pub(crate) struct MecabNodeRaw {
    pub(crate) prev: *mut MecabNodeRaw,
    pub(crate) next: *mut MecabNodeRaw,
    pub(crate) enext: *mut MecabNodeRaw,
    pub(crate) bnext: *mut MecabNodeRaw,
    pub(crate) rpath: *mut c_void,
    pub(crate) lpath: *mut c_void,
    pub(crate) surface: *const c_char,
    pub(crate) feature: *const c_char,
    pub(crate) id: c_uint,
    pub(crate) length: u16,
    pub(crate) rlength: u16,
    pub(crate) rc_attr: u16,
    pub(crate) lc_attr: u16,
    pub(crate) posid: u16,
    pub(crate) char_type: u8,
    pub(crate) stat: u8,
    pub(crate) isbest: u8,
    pub(crate) alpha: c_float,
    pub(crate) beta: c_float,
    pub(crate) prob: c_float,
    pub(crate) wcost: i16,
    pub(crate) cost: c_long,
}

/// Dictionary descriptor from `mecab.h` (`mecab_dictionary_info_t`),
/// a singly-linked list.
#[repr(C)]
#[derive(Clone, Copy, Debug)]
pub(crate) struct MecabDictionaryInfoRaw {
    pub(crate) filename: *const c_char,
    pub(crate) charset: *const c_char,
    pub(crate) size: c_uint,
    pub(crate) kind: c_int,
    pub(crate) lsize: c_uint,
    pub(crate) rsize: c_uint,
    pub(crate) version: c_ushort,
    pub(crate) next: *mut MecabDictionaryInfoRaw,
}

/// Bunsetsu chunk as laid out by `cabocha.h` (`cabocha_chunk_t`).
#[repr(C)]
#[derive(Clone, Copy, Debug)]
pub(crate) struct CabochaChunkRaw {
    pub(crate) link: c_int,
    pub(crate) head_pos: usize,
    pub(crate) func_pos: usize,
    pub(crate) token_size: usize,
    pub(crate) token_pos: usize,
    pub(crate) score: c_float,
    pub(crate) feature_list: *const *const c_char,
    pub(crate) additional_info: *const c_char,
    pub(crate) feature_list_size: c_ushort,
}

/// Token as laid out by `cabocha.h` (`cabocha_token_t`). Surfaces here are
/// NUL-terminated, unlike MeCab's.
#[repr(C)]
#[derive(Clone, Copy, Debug)]
pub(crate) struct CabochaTokenRaw {
    pub(crate) surface: *const c_char,
    pub(crate) normalized_surface: *const c_char,
    pub(crate) feature: *const c_char,
    pub(crate) feature_list: *const *const c_char,
    pub(crate) feature_list_size: c_ushort,
    pub(crate) ne: *const c_char,
    pub(crate) chunk: *mut CabochaChunkRaw,
}

#[derive(Clone, Copy, Debug)]
pub(crate) struct MecabApi {
    pub(crate) mecab_new2: FnMecabNew2,
    pub(crate) mecab_destroy: FnMecabDestroy,
    pub(crate) mecab_strerror: FnMecabStrerror,
    pub(crate) mecab_sparse_tonode: FnMecabSparseTonode,
    pub(crate) mecab_version: FnMecabVersion,
    pub(crate) mecab_dictionary_info: Option<FnMecabDictionaryInfo>,
}

impl MecabApi {
    pub(crate) unsafe fn load(library: &DynamicLibrary) -> Result<Self> {
        Ok(Self {
            mecab_new2: library.load_symbol("mecab_new2")?,
            mecab_destroy: library.load_symbol("mecab_destroy")?,
            mecab_strerror: library.load_symbol("mecab_strerror")?,
            mecab_sparse_tonode: library.load_symbol("mecab_sparse_tonode")?,
            mecab_version: library.load_symbol("mecab_version")?,
            mecab_dictionary_info: library.load_symbol_optional("mecab_dictionary_info")?,
        })
    }
}

#[derive(Clone, Copy)]
pub(crate) struct CabochaApi {
    pub(crate) cabocha_new2: FnCabochaNew2,
    pub(crate) cabocha_destroy: FnCabochaDestroy,
    pub(crate) cabocha_strerror: FnCabochaStrerror,
    pub(crate) cabocha_sparse_totree: FnCabochaSparseTotree,
    pub(crate) cabocha_version: Option<FnCabochaVersion>,
    pub(crate) cabocha_tree_chunk_size: FnCabochaTreeChunkSize,
    pub(crate) cabocha_tree_token_size: FnCabochaTreeTokenSize,
    pub(crate) cabocha_tree_chunk: FnCabochaTreeChunk,
    pub(crate) cabocha_tree_token: FnCabochaTreeToken,
}

impl CabochaApi {
    pub(crate) unsafe fn load(library: &DynamicLibrary) -> Result<Self> {
        Ok(Self {
            cabocha_new2: library.load_symbol("cabocha_new2")?,
            cabocha_destroy: library.load_symbol("cabocha_destroy")?,
            cabocha_strerror: library.load_symbol("cabocha_strerror")?,
            cabocha_sparse_totree: library.load_symbol("cabocha_sparse_totree")?,
            cabocha_version: library.load_symbol_optional("cabocha_version")?,
            cabocha_tree_chunk_size: library.load_symbol("cabocha_tree_chunk_size")?,
            cabocha_tree_token_size: library.load_symbol("cabocha_tree_token_size")?,
            cabocha_tree_chunk: library.load_symbol("cabocha_tree_chunk")?,
            cabocha_tree_token: library.load_symbol("cabocha_tree_token")?,
        })
    }
}

#[derive(Debug)]
pub(crate) struct LoadedMecabLibrary {
    pub(crate) _library: DynamicLibrary,
    pub(crate) api: MecabApi,
}

pub(crate) struct LoadedCabochaLibrary {
    pub(crate) _library: DynamicLibrary,
    pub(crate) api: CabochaApi,
}

#[derive(Debug)]
pub(crate) struct DynamicLibrary {
    handle: *mut c_void,
}

impl DynamicLibrary {
    pub(crate) fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path_string = path.as_ref().to_string_lossy().to_string();
        let path_c = CString::new(path_string.clone())?;
        let handle = unsafe { platform_open(path_c.as_ptr()) };
        if handle.is_null() {
            return Err(WakachiError::LibraryLoad(format!(
                "{} ({})",
                path_string,
                platform_last_error()
            )));
        }
        Ok(Self { handle })
    }

    pub(crate) unsafe fn load_symbol<T: Copy>(&self, symbol_name: &str) -> Result<T> {
        let symbol_c = CString::new(symbol_name)?;
        let symbol_ptr = platform_symbol(self.handle, symbol_c.as_ptr());
        if symbol_ptr.is_null() {
            return Err(WakachiError::SymbolLoad(format!(
                "{} ({})",
                symbol_name,
                platform_last_error()
            )));
        }
        Ok(std::mem::transmute_copy::<*mut c_void, T>(&symbol_ptr))
    }

    pub(crate) unsafe fn load_symbol_optional<T: Copy>(
        &self,
        symbol_name: &str,
    ) -> Result<Option<T>> {
        let symbol_c = CString::new(symbol_name)?;
        let symbol_ptr = platform_symbol(self.handle, symbol_c.as_ptr());
        if symbol_ptr.is_null() {
            return Ok(None);
        }
        Ok(Some(std::mem::transmute_copy::<*mut c_void, T>(
            &symbol_ptr,
        )))
    }
}

impl Drop for DynamicLibrary {
    fn drop(&mut self) {
        if self.handle.is_null() {
            return;
        }
        unsafe {
            platform_close(self.handle);
        }
        self.handle = ptr::null_mut();
    }
}

/// Reads the tagger-scoped error string; a null `handle` reads the
/// process-global error left behind by a failed `mecab_new2`.
pub(crate) fn read_mecab_error(api: &MecabApi, handle: MecabHandle) -> Option<String> {
    let message_ptr = unsafe { (api.mecab_strerror)(handle) };
    non_empty_message(message_ptr)
}

pub(crate) fn mecab_error(api: &MecabApi, handle: MecabHandle, fallback: &str) -> WakachiError {
    match read_mecab_error(api, handle) {
        Some(message) => WakachiError::Api(message),
        None => WakachiError::Api(fallback.to_string()),
    }
}

pub(crate) fn read_cabocha_error(api: &CabochaApi, handle: CabochaHandle) -> Option<String> {
    let message_ptr = unsafe { (api.cabocha_strerror)(handle) };
    non_empty_message(message_ptr)
}

pub(crate) fn cabocha_error(
    api: &CabochaApi,
    handle: CabochaHandle,
    fallback: &str,
) -> WakachiError {
    match read_cabocha_error(api, handle) {
        Some(message) => WakachiError::Api(message),
        None => WakachiError::Api(fallback.to_string()),
    }
}

fn non_empty_message(message_ptr: *const c_char) -> Option<String> {
    if message_ptr.is_null() {
        return None;
    }
    let message = unsafe { CStr::from_ptr(message_ptr) }
        .to_string_lossy()
        .trim()
        .to_string();
    if message.is_empty() {
        None
    } else {
        Some(message)
    }
}

pub(crate) fn cstr_to_string(pointer: *const c_char) -> String {
    if pointer.is_null() {
        return String::new();
    }
    unsafe { CStr::from_ptr(pointer) }
        .to_string_lossy()
        .to_string()
}

/// Copies a NUL-terminated C string without assuming any encoding.
pub(crate) fn cstr_to_bytes(pointer: *const c_char) -> Vec<u8> {
    if pointer.is_null() {
        return Vec::new();
    }
    unsafe { CStr::from_ptr(pointer) }.to_bytes().to_vec()
}

#[cfg(target_os = "windows")]
#[link(name = "kernel32")]
extern "system" {
    fn LoadLibraryA(lp_lib_file_name: *const c_char) -> *mut c_void;
    fn GetProcAddress(h_module: *mut c_void, lp_proc_name: *const c_char) -> *mut c_void;
    fn FreeLibrary(h_lib_module: *mut c_void) -> i32;
    fn GetLastError() -> u32;
}

#[cfg(target_os = "windows")]
unsafe fn platform_open(path: *const c_char) -> *mut c_void {
    LoadLibraryA(path)
}

#[cfg(target_os = "windows")]
unsafe fn platform_symbol(handle: *mut c_void, symbol: *const c_char) -> *mut c_void {
    GetProcAddress(handle, symbol)
}

#[cfg(target_os = "windows")]
unsafe fn platform_close(handle: *mut c_void) {
    let _ = FreeLibrary(handle);
}

#[cfg(target_os = "windows")]
fn platform_last_error() -> String {
    format!("GetLastError={}", unsafe { GetLastError() })
}

#[cfg(target_os = "linux")]
#[link(name = "dl")]
extern "C" {
    fn dlopen(filename: *const c_char, flags: c_int) -> *mut c_void;
    fn dlsym(handle: *mut c_void, symbol: *const c_char) -> *mut c_void;
    fn dlclose(handle: *mut c_void) -> c_int;
    fn dlerror() -> *const c_char;
}

#[cfg(target_os = "macos")]
extern "C" {
    fn dlopen(filename: *const c_char, flags: c_int) -> *mut c_void;
    fn dlsym(handle: *mut c_void, symbol: *const c_char) -> *mut c_void;
    fn dlclose(handle: *mut c_void) -> c_int;
    fn dlerror() -> *const c_char;
}

#[cfg(unix)]
unsafe fn platform_open(path: *const c_char) -> *mut c_void {
    const RTLD_NOW: c_int = 2;
    const RTLD_LOCAL: c_int = 0;
    dlopen(path, RTLD_NOW | RTLD_LOCAL)
}

#[cfg(unix)]
unsafe fn platform_symbol(handle: *mut c_void, symbol: *const c_char) -> *mut c_void {
    dlsym(handle, symbol)
}

#[cfg(unix)]
unsafe fn platform_close(handle: *mut c_void) {
    let _ = dlclose(handle);
}

#[cfg(unix)]
fn platform_last_error() -> String {
    let pointer = unsafe { dlerror() };
    if pointer.is_null() {
        "unknown error".to_string()
    } else {
        let full = unsafe { CStr::from_ptr(pointer) }
            .to_string_lossy()
            .to_string();
        full.split(": tried:").next().unwrap_or(&full).to_string()
    }
}
