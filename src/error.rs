use std::fmt;

/// Error type returned by wakachi public APIs.
#[derive(Debug)]
pub enum WakachiError {
    /// Dynamic library could not be loaded.
    LibraryLoad(String),
    /// Required symbol could not be resolved from the library.
    SymbolLoad(String),
    /// Rust string contained an interior `NUL` byte for C interop.
    NulByte(std::ffi::NulError),
    /// User-provided arguments were invalid.
    InvalidArgument(String),
    /// Error reported by the MeCab or CaboCha C API.
    Api(String),
}

impl fmt::Display for WakachiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WakachiError::LibraryLoad(message) => write!(f, "failed to load library: {message}"),
            WakachiError::SymbolLoad(message) => write!(f, "failed to load symbol: {message}"),
            WakachiError::NulByte(error) => write!(f, "string contains NUL byte: {error}"),
            WakachiError::InvalidArgument(message) => write!(f, "invalid argument: {message}"),
            WakachiError::Api(message) => write!(f, "engine api error: {message}"),
        }
    }
}

impl std::error::Error for WakachiError {}

impl From<std::ffi::NulError> for WakachiError {
    fn from(value: std::ffi::NulError) -> Self {
        WakachiError::NulByte(value)
    }
}

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, WakachiError>;
