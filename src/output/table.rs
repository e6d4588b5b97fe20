//! Table formatter for disk usage reports

use std::io;

use termcolor::{Buffer, Color, ColorChoice, ColorSpec, StandardStream, WriteColor};

use crate::query::{DiskUsage, ListEntry};

use super::config::OutputConfig;
use super::utils::{format_percent, format_size};

/// Formatter for disk usage tables and size listings.
pub struct UsageFormatter {
    config: OutputConfig,
}

impl UsageFormatter {
    pub fn new(config: OutputConfig) -> Self {
        Self { config }
    }

    /// Render a report without color, mainly for tests.
    pub fn format(&self, usage: &DiskUsage) -> String {
        let mut buffer = Buffer::no_color();
        // Writing into an in-memory buffer cannot fail
        let _ = self.write_usage(&mut buffer, usage);
        String::from_utf8_lossy(buffer.as_slice()).into_owned()
    }

    pub fn print(&self, usage: &DiskUsage) -> io::Result<()> {
        let mut stdout = StandardStream::stdout(self.color_choice());
        self.write_usage(&mut stdout, usage)
    }

    pub fn print_list(&self, entries: &[ListEntry]) -> io::Result<()> {
        let mut stdout = StandardStream::stdout(self.color_choice());
        self.write_list(&mut stdout, entries)
    }

    pub fn write_usage<W: WriteColor>(&self, out: &mut W, usage: &DiskUsage) -> io::Result<()> {
        let mut bold = ColorSpec::new();
        bold.set_bold(true);

        out.set_color(&bold)?;
        write!(out, "Disk usage for:")?;
        out.reset()?;
        writeln!(out, " {}", usage.path)?;
        out.set_color(&bold)?;
        write!(out, "Total size:")?;
        out.reset()?;
        writeln!(out, " {}", format_size(usage.total_size))?;

        if usage.rows.is_empty() {
            return Ok(());
        }

        writeln!(out)?;
        if self.config.show_bytes {
            writeln!(out, "{:>10}  {:>10}  {:>20}  name", "share", "size", "bytes")?;
        } else {
            writeln!(out, "{:>10}  {:>10}  name", "share", "size")?;
        }

        for row in &usage.rows {
            write!(
                out,
                "{:>10}  {:>10}  ",
                format_percent(row.percentage),
                format_size(row.size)
            )?;
            if self.config.show_bytes {
                write!(out, "{:>20}  ", row.size)?;
            }
            self.write_name(out, &row.name, row.is_dir)?;
            writeln!(out)?;
        }
        Ok(())
    }

    pub fn write_list<W: WriteColor>(&self, out: &mut W, entries: &[ListEntry]) -> io::Result<()> {
        for entry in entries {
            write!(out, "{}\t", format_size(entry.size))?;
            self.write_name(out, &entry.path, entry.is_dir)?;
            writeln!(out)?;
        }
        Ok(())
    }

    fn write_name<W: WriteColor>(&self, out: &mut W, name: &str, is_dir: bool) -> io::Result<()> {
        if is_dir {
            out.set_color(ColorSpec::new().set_fg(Some(Color::Blue)).set_bold(true))?;
            write!(out, "{}/", name)?;
            out.reset()
        } else {
            write!(out, "{}", name)
        }
    }

    fn color_choice(&self) -> ColorChoice {
        if self.config.use_color {
            ColorChoice::Auto
        } else {
            ColorChoice::Never
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::query::UsageRow;

    use super::*;

    fn usage() -> DiskUsage {
        DiskUsage {
            path: "/".to_string(),
            is_dir: true,
            total_size: 1000,
            rows: vec![
                UsageRow {
                    name: "c".to_string(),
                    is_dir: true,
                    size: 600,
                    percentage: 60.0,
                },
                UsageRow {
                    name: "a".to_string(),
                    is_dir: false,
                    size: 400,
                    percentage: 40.0,
                },
            ],
        }
    }

    #[test]
    fn test_format_header_and_rows() {
        let output = UsageFormatter::new(OutputConfig::default()).format(&usage());
        let lines: Vec<&str> = output.lines().collect();

        assert_eq!(lines[0], "Disk usage for: /");
        assert_eq!(lines[1], "Total size: 1000.0B");
        assert!(lines[3].ends_with("name"));
        assert!(lines[4].contains("60.00 %"));
        assert!(lines[4].contains("600.0B"));
        assert!(lines[4].ends_with("c/"), "directories get a slash: {}", lines[4]);
        assert!(lines[5].ends_with("a"));
    }

    #[test]
    fn test_format_without_bytes_column() {
        let config = OutputConfig {
            use_color: false,
            show_bytes: false,
        };
        let output = UsageFormatter::new(config).format(&usage());
        assert!(!output.contains("bytes"));
        assert!(!output.contains("   600  "));
    }

    #[test]
    fn test_format_empty_report() {
        let report = DiskUsage {
            path: "/empty".to_string(),
            is_dir: true,
            total_size: 0,
            rows: Vec::new(),
        };
        let output = UsageFormatter::new(OutputConfig::default()).format(&report);
        assert_eq!(output, "Disk usage for: /empty\nTotal size: 0.0B\n");
    }

    #[test]
    fn test_write_list() {
        let entries = vec![
            ListEntry {
                path: "/c".to_string(),
                is_dir: true,
                size: 2048,
            },
            ListEntry {
                path: "/c/d".to_string(),
                is_dir: false,
                size: 5,
            },
        ];
        let mut buffer = Buffer::no_color();
        UsageFormatter::new(OutputConfig::default())
            .write_list(&mut buffer, &entries)
            .unwrap();
        let output = String::from_utf8(buffer.into_inner()).unwrap();
        assert_eq!(output, "2.0KiB\t/c/\n5.0B\t/c/d\n");
    }
}
