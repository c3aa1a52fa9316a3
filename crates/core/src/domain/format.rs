const SIZE_UNITS: [&str; 9] = ["Bytes", "KB", "MB", "GB", "TB", "PB", "EB", "ZB", "YB"];

/// Nanoseconds rendered as whole milliseconds, rounded half up: `12000000` -> `"12ms"`.
pub fn format_duration_ms(nanos: u64) -> String {
    format!("{}ms", nanos.saturating_add(500_000) / 1_000_000)
}

/// Bytes rendered as whole kibibytes, rounded half up: `204800` -> `"200KB"`.
pub fn format_memory_kb(bytes: u64) -> String {
    format!("{}KB", bytes.saturating_add(512) / 1024)
}

/// Bytes rendered with the largest binary unit that keeps the value >= 1,
/// at most two decimals and no trailing zeros: `1536` -> `"1.5 KB"`.
pub fn format_file_size(bytes: u64) -> String {
    if bytes == 0 {
        return "0 Bytes".to_string();
    }

    let mut value = bytes as f64;
    let mut unit = 0;
    while value >= 1024.0 && unit < SIZE_UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }

    let fixed = format!("{value:.2}");
    let trimmed = fixed.trim_end_matches('0').trim_end_matches('.');
    format!("{trimmed} {}", SIZE_UNITS[unit])
}
