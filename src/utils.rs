use std::time::Duration;

const KIB: f64 = 1024.0;

/// `450ms`, `2.3s` or `1m 5s`
pub fn format_duration(duration: Duration) -> String {
    match duration.as_millis() {
        ms if ms < 1_000 => format!("{ms}ms"),
        ms if ms < 60_000 => format!("{:.1}s", duration.as_secs_f64()),
        _ => {
            let secs = duration.as_secs();
            format!("{}m {}s", secs / 60, secs % 60)
        }
    }
}

pub fn format_bytes(bytes: u64) -> String {
    let size = bytes as f64;
    if size < KIB {
        format!("{bytes} B")
    } else if size < KIB * KIB {
        format!("{:.2} KB", size / KIB)
    } else {
        format!("{:.2} MB", size / (KIB * KIB))
    }
}

/// Pixel size and encoded size of a capture, e.g. `1600x2400 px, 1.20 MB`.
pub fn format_capture((width, height): (u32, u32), bytes: u64) -> String {
    format!("{width}x{height} px, {}", format_bytes(bytes))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_duration() {
        assert_eq!(format_duration(Duration::from_millis(500)), "500ms");
        assert_eq!(format_duration(Duration::from_millis(2300)), "2.3s");
        assert_eq!(format_duration(Duration::from_secs(65)), "1m 5s");
    }

    #[test]
    fn test_format_bytes() {
        assert_eq!(format_bytes(512), "512 B");
        assert_eq!(format_bytes(1536), "1.50 KB");
        assert_eq!(format_bytes(1048576), "1.00 MB");
        assert_eq!(format_bytes(3 * 1024 * 1024 * 1024), "3072.00 MB");
    }

    #[test]
    fn test_format_capture() {
        assert_eq!(format_capture((1600, 2400), 1258291), "1600x2400 px, 1.20 MB");
        assert_eq!(format_capture((1, 1), 67), "1x1 px, 67 B");
    }
}
