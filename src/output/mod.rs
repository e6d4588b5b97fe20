//! Report formatting and display
//!
//! - `config` - Output configuration types
//! - `utils` - Size and percentage formatting
//! - `table` - Colored table and listing formatter
//! - `json` - JSON output

mod config;
mod json;
mod table;
mod utils;

pub use config::OutputConfig;
pub use json::print_json;
pub use table::UsageFormatter;
pub use utils::{format_percent, format_size};
