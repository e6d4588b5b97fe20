//! Flat listings: the record type, the tab-separated file format, and a
//! local directory lister that produces it.

mod reader;
mod record;
mod walker;

pub use reader::{parse_line, parse_listing, read_listing, write_listing};
pub use record::Record;
pub use walker::{ListerConfig, list_local};
