//! Human-readable byte counts

const UNITS: [(u64, &str); 6] = [
    (1 << 60, "EB"),
    (1 << 50, "PB"),
    (1 << 40, "TB"),
    (1 << 30, "GB"),
    (1 << 20, "MB"),
    (1 << 10, "KB"),
];

/// Format a byte count with the largest whole unit, truncating the rest.
///
/// `1536` is displayed as `1 KB`, `999` as `999 bytes`.
pub fn display_size(bytes: u64) -> String {
    for (scale, unit) in UNITS {
        if bytes / scale > 0 {
            return format!("{} {}", bytes / scale, unit);
        }
    }
    format!("{} bytes", bytes)
}
