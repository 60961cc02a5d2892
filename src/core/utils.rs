/// Formats a duration in whole seconds as `M:SS` (or `H:MM:SS` past an
/// hour), the way video players label track length.
///
/// A zero duration yields an empty string; callers use that to drop the
/// suffix entirely instead of showing "0:00" for livestreams and images.
///
/// # Example
///
/// ```
/// use vidgrab::core::utils::format_duration;
///
/// assert_eq!(format_duration(125), "2:05");
/// assert_eq!(format_duration(3725), "1:02:05");
/// assert_eq!(format_duration(0), "");
/// ```
pub fn format_duration(total_secs: u64) -> String {
    if total_secs == 0 {
        return String::new();
    }

    let hours = total_secs / 3600;
    let minutes = (total_secs % 3600) / 60;
    let seconds = total_secs % 60;

    if hours > 0 {
        format!("{}:{:02}:{:02}", hours, minutes, seconds)
    } else {
        format!("{}:{:02}", minutes, seconds)
    }
}

/// Formats a byte count as megabytes with one decimal, e.g. `12.3MB`.
/// `None` (size unknown before download) renders as `Unknown`.
pub fn format_size_mb(bytes: Option<u64>) -> String {
    match bytes {
        Some(b) if b > 0 => format!("{:.1}MB", b as f64 / (1024.0 * 1024.0)),
        _ => "Unknown".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::{format_duration, format_size_mb};

    #[test]
    fn test_format_duration() {
        assert_eq!(format_duration(0), "");
        assert_eq!(format_duration(5), "0:05");
        assert_eq!(format_duration(59), "0:59");
        assert_eq!(format_duration(60), "1:00");
        assert_eq!(format_duration(125), "2:05");
        assert_eq!(format_duration(600), "10:00");
        assert_eq!(format_duration(3599), "59:59");
        assert_eq!(format_duration(3600), "1:00:00");
        assert_eq!(format_duration(3725), "1:02:05");
    }

    #[test]
    fn test_format_size_mb() {
        assert_eq!(format_size_mb(None), "Unknown");
        assert_eq!(format_size_mb(Some(0)), "Unknown");
        assert_eq!(format_size_mb(Some(1024 * 1024)), "1.0MB");
        assert_eq!(format_size_mb(Some(52_428_800)), "50.0MB");
        assert_eq!(format_size_mb(Some(12_897_485)), "12.3MB");
    }
}
