//! Listing statistics collection and display
//!
//! Counts the records a listing contributed while the tree is built:
//! total entries, files, directories and the summed file size.

use serde::{Deserialize, Serialize};
use std::io::{self, Write};
use termcolor::{ColorChoice, ColorSpec, StandardStream, WriteColor};

use crate::output::format_size;

/// Collected statistics about a listing.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListingStats {
    /// Total number of records applied
    pub records: usize,
    /// Number of file records
    pub files: usize,
    /// Number of directory records
    pub directories: usize,
    /// Sum of all file record sizes, saturating at `u64::MAX`. A path
    /// listed twice is counted twice.
    pub total_bytes: u64,
}

/// Statistics collector that accumulates data during tree construction.
#[derive(Debug, Default)]
pub struct StatsCollector {
    stats: ListingStats,
}

impl StatsCollector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a file in the statistics.
    pub fn record_file(&mut self, size: u64) {
        self.stats.total_bytes = self.stats.total_bytes.saturating_add(size);
        self.stats.records += 1;
        self.stats.files += 1;
    }

    /// Record a directory in the statistics.
    pub fn record_directory(&mut self) {
        self.stats.records += 1;
        self.stats.directories += 1;
    }

    pub fn finalize(self) -> ListingStats {
        self.stats
    }
}

/// Print statistics to stdout with optional color.
pub fn print_stats(stats: &ListingStats, use_color: bool) -> io::Result<()> {
    let color_choice = if use_color {
        ColorChoice::Auto
    } else {
        ColorChoice::Never
    };
    let mut stdout = StandardStream::stdout(color_choice);

    let mut bold = ColorSpec::new();
    bold.set_bold(true);
    stdout.set_color(&bold)?;
    writeln!(stdout, "Listing Statistics")?;
    stdout.reset()?;
    writeln!(stdout, "──────────────────")?;

    writeln!(stdout, "Items:        {}", format_number(stats.records))?;
    writeln!(stdout, "Files:        {}", format_number(stats.files))?;
    writeln!(stdout, "Directories:  {}", format_number(stats.directories))?;
    writeln!(stdout, "Total size:   {}", format_size(stats.total_bytes))?;
    writeln!(stdout)?;

    Ok(())
}

/// Format a number with thousand separators.
fn format_number(n: usize) -> String {
    let s = n.to_string();
    let mut result = String::with_capacity(s.len() + s.len() / 3);

    for (i, c) in s.chars().enumerate() {
        if i > 0 && (s.len() - i) % 3 == 0 {
            result.push(',');
        }
        result.push(c);
    }

    result
}
