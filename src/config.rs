// src/config.rs
// Reader configuration

/// Number of leading bytes scanned for the textual header.
pub const DEFAULT_HEADER_WINDOW: usize = 1024;

/// What to do when a header field name appears more than once.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DuplicateFields {
    /// Keep the last occurrence.
    #[default]
    Overwrite,
    /// Fail with `IsfError::MalformedHeader`.
    Reject,
}

/// Options for a single decoding pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReaderConfig {
    /// Bytes read from the start of the file before the header is parsed.
    /// The whole textual header, including the CURVE length digits, must
    /// fit inside this window.
    pub header_window: usize,
    pub duplicate_fields: DuplicateFields,
}

impl Default for ReaderConfig {
    fn default() -> Self {
        ReaderConfig {
            header_window: DEFAULT_HEADER_WINDOW,
            duplicate_fields: DuplicateFields::default(),
        }
    }
}

impl ReaderConfig {
    pub fn new() -> Self {
        ReaderConfig::default()
    }

    pub fn with_header_window(mut self, header_window: usize) -> Self {
        self.header_window = header_window;
        self
    }

    pub fn with_duplicate_fields(mut self, policy: DuplicateFields) -> Self {
        self.duplicate_fields = policy;
        self
    }
}
