/// Collapses literal `\n`, `\r` and `\t` escape sequences and runs of real
/// whitespace into single spaces, trimming both ends.
pub fn normalize_abstract(text: &str) -> String {
    let unescaped = text
        .replace("\\r\\n", " ")
        .replace("\\n", " ")
        .replace("\\r", " ")
        .replace("\\t", " ");

    unescaped.split_whitespace().collect::<Vec<_>>().join(" ")
}

pub fn truncate_label(label: &str, max_chars: usize) -> String {
    if label.chars().count() <= max_chars {
        return label.to_owned();
    }

    let mut short = label
        .chars()
        .take(max_chars.saturating_sub(1))
        .collect::<String>()
        .trim_end()
        .to_owned();
    short.push('…');
    short
}

pub fn format_count(count: u64) -> String {
    const UNITS: [&str; 4] = ["", "k", "M", "B"];

    let mut value = count as f64;
    let mut unit = 0usize;
    while value >= 1000.0 && unit < UNITS.len() - 1 {
        value /= 1000.0;
        unit += 1;
    }

    if unit == 0 {
        count.to_string()
    } else {
        format!("{value:.1}{}", UNITS[unit])
    }
}
