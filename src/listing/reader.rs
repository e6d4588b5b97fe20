//! Reading and writing the tab-separated listing format
//!
//! One entry per line: `size<TAB>path`. An empty size marks a directory.

use std::fs::File;
use std::io::{self, BufRead, BufReader, Write};
use std::path::Path;

use tracing::debug;

use crate::error::{Error, Result};

use super::record::Record;

/// Read a whole listing file.
pub fn read_listing(path: &Path) -> Result<Vec<Record>> {
    let file = File::open(path).map_err(|e| Error::io(path, e))?;
    let records = parse_listing(BufReader::new(file), path)?;
    debug!(path = %path.display(), records = records.len(), "listing read");
    Ok(records)
}

/// Parse listing lines from any reader. `source` only labels I/O errors.
pub fn parse_listing<R: BufRead>(reader: R, source: &Path) -> Result<Vec<Record>> {
    let mut records = Vec::new();
    for (index, line) in reader.lines().enumerate() {
        let line = line.map_err(|e| match e.kind() {
            io::ErrorKind::InvalidData => Error::malformed(Some(index + 1), "line is not valid UTF-8"),
            _ => Error::io(source, e),
        })?;
        if let Some(record) = parse_line(&line, index + 1)? {
            records.push(record);
        }
    }
    Ok(records)
}

/// Parse one listing line. Blank lines yield `None`.
pub fn parse_line(line: &str, line_no: usize) -> Result<Option<Record>> {
    let line = line.strip_suffix('\r').unwrap_or(line);
    if line.trim().is_empty() {
        return Ok(None);
    }

    let Some((size, path)) = line.split_once('\t') else {
        return Err(Error::malformed(Some(line_no), "expected 'size<TAB>path'"));
    };
    if path.is_empty() {
        return Err(Error::malformed(Some(line_no), "missing path"));
    }

    let size = size.trim();
    let record = if size.is_empty() {
        Record::directory(path)
    } else {
        Record::file(path, parse_size(size, line_no)?)
    };
    Ok(Some(record.at_line(line_no)))
}

/// Sizes are byte counts. Whole floats (`123.0`) are accepted since
/// tabular exports often write integer columns that way. Values at or
/// above 2^64 are rejected in either form.
fn parse_size(size: &str, line_no: usize) -> Result<u64> {
    let invalid = || Error::malformed(Some(line_no), format!("invalid size '{}'", size));

    if !size.contains(['.', 'e', 'E']) {
        return size.parse::<u64>().map_err(|_| invalid());
    }
    match size.parse::<f64>() {
        // u64::MAX as f64 rounds up to 2^64, so the bound must be strict
        Ok(value) if value.is_finite() && value >= 0.0 && value.fract() == 0.0 && value < u64::MAX as f64 => {
            Ok(value as u64)
        }
        _ => Err(invalid()),
    }
}

/// Write records in the listing format.
pub fn write_listing<'a, W, I>(records: I, writer: &mut W) -> io::Result<()>
where
    W: Write,
    I: IntoIterator<Item = &'a Record>,
{
    for record in records {
        match record.size {
            Some(size) if !record.is_dir => writeln!(writer, "{}\t{}", size, record.path)?,
            _ => writeln!(writer, "\t{}", record.path)?,
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;
    use std::path::PathBuf;

    use super::*;

    #[test]
    fn test_parse_line_file_and_directory() {
        let file = parse_line("1024\t/Photos/IMG_1.jpg", 1).unwrap().unwrap();
        assert_eq!(file.path, "/Photos/IMG_1.jpg");
        assert_eq!(file.size, Some(1024));
        assert!(!file.is_dir);
        assert_eq!(file.line, Some(1));

        let dir = parse_line("\t/Photos", 2).unwrap().unwrap();
        assert!(dir.is_dir);
        assert_eq!(dir.size, None);
    }

    #[test]
    fn test_parse_line_blank_and_crlf() {
        assert!(parse_line("", 1).unwrap().is_none());
        assert!(parse_line("   ", 1).unwrap().is_none());
        let record = parse_line("5\t/a b.txt\r", 1).unwrap().unwrap();
        assert_eq!(record.path, "/a b.txt");
    }

    #[test]
    fn test_parse_line_float_sizes() {
        let record = parse_line("300.0\t/a", 1).unwrap().unwrap();
        assert_eq!(record.size, Some(300));
        assert!(matches!(
            parse_line("nan\t/a", 4),
            Err(Error::MalformedRecord { line: Some(4), .. })
        ));
        assert!(parse_line("1.5\t/a", 1).is_err());
        assert!(parse_line("-3\t/a", 1).is_err());
    }

    #[test]
    fn test_parse_line_size_range() {
        let max = parse_line("18446744073709551615\t/a", 1).unwrap().unwrap();
        assert_eq!(max.size, Some(u64::MAX));

        for size in ["18446744073709551616", "18446744073709551616.0", "1e20"] {
            let line = format!("{}\t/a", size);
            assert!(
                matches!(parse_line(&line, 2), Err(Error::MalformedRecord { line: Some(2), .. })),
                "{} should be out of range",
                size
            );
        }
        let large = parse_line("9007199254740992.0\t/a", 1).unwrap().unwrap();
        assert_eq!(large.size, Some(1 << 53));
    }

    #[test]
    fn test_parse_listing_invalid_utf8_is_malformed() {
        let input: &[u8] = b"\t/a\n10\t/a/\xff\xfe\n";
        let err = parse_listing(Cursor::new(input), Path::new("x.ls")).unwrap_err();
        assert!(
            matches!(err, Error::MalformedRecord { line: Some(2), .. }),
            "{:?}",
            err
        );
    }

    #[test]
    fn test_parse_line_rejects_missing_columns() {
        assert!(parse_line("/no/tab/here", 1).is_err());
        assert!(parse_line("12\t", 1).is_err());
    }

    #[test]
    fn test_parse_listing_reports_line_numbers() {
        let input = "\t/a\n\n10\t/a/b\nbogus\t/a/c\n";
        let err = parse_listing(Cursor::new(input), &PathBuf::from("x.ls")).unwrap_err();
        assert!(matches!(err, Error::MalformedRecord { line: Some(4), .. }));
    }

    #[test]
    fn test_write_listing_format() {
        let records = vec![Record::directory("/d"), Record::file("/d/f", 7)];
        let mut out = Vec::new();
        write_listing(&records, &mut out).unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "\t/d\n7\t/d/f\n");

        let parsed = parse_listing(Cursor::new("\t/d\n7\t/d/f\n"), Path::new("-")).unwrap();
        assert_eq!(parsed.len(), 2);
        assert_eq!(parsed[1].size, Some(7));
    }
}
