//! Shared formatting helpers

const UNITS: [&str; 7] = ["", "Ki", "Mi", "Gi", "Ti", "Pi", "Ei"];

/// Human-readable size with binary prefixes and one decimal, e.g. `1.5MiB`.
pub fn format_size(bytes: u64) -> String {
    let mut value = bytes as f64;
    for unit in &UNITS[..UNITS.len() - 1] {
        if value < 1024.0 {
            return format!("{:.1}{}B", value, unit);
        }
        value /= 1024.0;
    }
    format!("{:.1}{}B", value, UNITS[UNITS.len() - 1])
}

/// Percentage with two decimals, e.g. `66.67 %`.
pub fn format_percent(percentage: f64) -> String {
    format!("{:.2} %", percentage)
}
