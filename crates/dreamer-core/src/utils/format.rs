/// Format a counter compactly for display: 1234 -> "1.2K", 3_800_000 -> "3.8M"
pub fn compact_count(count: u64) -> String {
    const UNITS: [(f64, &str); 3] = [(1e9, "B"), (1e6, "M"), (1e3, "K")];

    let value = count as f64;
    for (i, (scale, suffix)) in UNITS.iter().enumerate() {
        if value < *scale {
            continue;
        }
        let scaled = (value / scale * 10.0).round() / 10.0;
        // 999_950 rounds to 1000.0K; bump it into the next unit up
        if scaled >= 1000.0 && i > 0 {
            let (bigger, bigger_suffix) = UNITS[i - 1];
            return format!("{}{}", trim_decimal(value / bigger), bigger_suffix);
        }
        return format!("{}{}", trim_decimal(scaled), suffix);
    }

    count.to_string()
}

fn trim_decimal(value: f64) -> String {
    let rounded = (value * 10.0).round() / 10.0;
    if rounded.fract() == 0.0 {
        format!("{}", rounded as u64)
    } else {
        format!("{:.1}", rounded)
    }
}

/// Truncate a string to a maximum length, adding ellipsis if needed
pub fn truncate_string(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else if max_len <= 3 {
        s.chars().take(max_len).collect()
    } else {
        let truncated: String = s.chars().take(max_len - 3).collect();
        format!("{}...", truncated)
    }
}
