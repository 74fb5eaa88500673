//! Byte size formatting and conversion.

const KIB: u64 = 1024;
const MIB: u64 = 1024 * 1024;

/// Format a byte count using binary units, matching how size limits are given.
pub fn format_size(bytes: u64) -> String {
    if bytes >= MIB {
        format!("{:.2} MiB", bytes as f64 / MIB as f64)
    } else if bytes >= KIB {
        format!("{:.1} KiB", bytes as f64 / KIB as f64)
    } else {
        format!("{} B", bytes)
    }
}

/// Convert a size limit in megabytes (1 MB = 1024 * 1024 bytes) to whole bytes.
///
/// Fractional bytes are truncated. Non-finite or negative input yields 0.
pub fn mb_to_bytes(mb: f64) -> u64 {
    if !mb.is_finite() || mb <= 0.0 {
        return 0;
    }
    (mb * MIB as f64) as u64
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_size() {
        assert_eq!(format_size(0), "0 B");
        assert_eq!(format_size(1023), "1023 B");
        assert_eq!(format_size(1536), "1.5 KiB");
        assert_eq!(format_size(2 * MIB), "2.00 MiB");
    }

    #[test]
    fn test_mb_to_bytes() {
        assert_eq!(mb_to_bytes(2.0), 2_097_152);
        assert_eq!(mb_to_bytes(0.5), 524_288);
        assert_eq!(mb_to_bytes(0.0000001), 0);
        assert_eq!(mb_to_bytes(-1.0), 0);
        assert_eq!(mb_to_bytes(f64::NAN), 0);
    }
}
