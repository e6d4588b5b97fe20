//! Output configuration types

/// Configuration for report formatting.
#[derive(Debug, Clone)]
pub struct OutputConfig {
    pub use_color: bool,
    /// Show the exact byte count next to the human-readable size
    pub show_bytes: bool,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            use_color: true,
            show_bytes: true,
        }
    }
}
