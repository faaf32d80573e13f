//! Compact display formatting for peer statistics.

/// Format a byte count to a human readable string.
pub fn format_bytes(bytes: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = 1024 * 1024;
    const GB: u64 = 1024 * 1024 * 1024;

    if bytes < KB {
        format!("{}B", bytes)
    } else if bytes < MB {
        format!("{:.1}KB", bytes as f64 / KB as f64)
    } else if bytes < GB {
        format!("{:.1}MB", bytes as f64 / MB as f64)
    } else {
        format!("{:.2}GB", bytes as f64 / GB as f64)
    }
}

/// Format a duration as its two most significant non-zero units,
/// without spaces: "3d4h", "5m12s", "47s".
pub fn format_duration_compact(total_secs: u64) -> String {
    let days = total_secs / 86400;
    let hours = (total_secs % 86400) / 3600;
    let minutes = (total_secs % 3600) / 60;
    let seconds = total_secs % 60;

    if days > 0 {
        if hours > 0 {
            format!("{}d{}h", days, hours)
        } else if minutes > 0 {
            format!("{}d{}m", days, minutes)
        } else if seconds > 0 {
            format!("{}d{}s", days, seconds)
        } else {
            format!("{}d", days)
        }
    } else if hours > 0 {
        if minutes > 0 {
            format!("{}h{}m", hours, minutes)
        } else if seconds > 0 {
            format!("{}h{}s", hours, seconds)
        } else {
            format!("{}h", hours)
        }
    } else if minutes > 0 {
        if seconds > 0 {
            format!("{}m{}s", minutes, seconds)
        } else {
            format!("{}m", minutes)
        }
    } else {
        format!("{}s", seconds)
    }
}

/// Abbreviate a Bitcoin Core connection type for compact display.
pub fn abbrev_connection_type(conn_type: &str) -> String {
    match conn_type {
        "outbound-full-relay" => "OFR".to_string(),
        "block-relay-only" => "BLO".to_string(),
        "inbound" => "INB".to_string(),
        "manual" => "MAN".to_string(),
        "addr-fetch" => "FET".to_string(),
        "feeler" => "FEL".to_string(),
        "" => "-".to_string(),
        other => other.chars().take(3).collect::<String>().to_uppercase(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_bytes() {
        assert_eq!(format_bytes(0), "0B");
        assert_eq!(format_bytes(512), "512B");
        assert_eq!(format_bytes(2048), "2.0KB");
        assert_eq!(format_bytes(5 * 1024 * 1024), "5.0MB");
        assert_eq!(format_bytes(3 * 1024 * 1024 * 1024 / 2), "1.50GB");
    }

    #[test]
    fn test_format_duration_two_units() {
        assert_eq!(format_duration_compact(0), "0s");
        assert_eq!(format_duration_compact(47), "47s");
        assert_eq!(format_duration_compact(312), "5m12s");
        assert_eq!(format_duration_compact(300), "5m");
        assert_eq!(format_duration_compact(3600 + 120), "1h2m");
        assert_eq!(format_duration_compact(3600 + 7), "1h7s");
        assert_eq!(format_duration_compact(86400 * 3 + 3600 * 4), "3d4h");
        assert_eq!(format_duration_compact(86400 * 3 + 42), "3d42s");
        assert_eq!(format_duration_compact(86400 * 2), "2d");
    }

    #[test]
    fn test_abbrev_connection_type() {
        assert_eq!(abbrev_connection_type("outbound-full-relay"), "OFR");
        assert_eq!(abbrev_connection_type("block-relay-only"), "BLO");
        assert_eq!(abbrev_connection_type("feeler"), "FEL");
        assert_eq!(abbrev_connection_type(""), "-");
        assert_eq!(abbrev_connection_type("mystery"), "MYS");
    }
}
