use unicode_width::UnicodeWidthStr;

pub fn display_width(s: &str) -> usize {
    UnicodeWidthStr::width(s)
}

/// Greedy word wrap by display width. A single word wider than
/// `max_columns` gets a line of its own rather than being split.
pub fn wrap_label(label: &str, max_columns: usize) -> Vec<String> {
    let mut lines: Vec<String> = Vec::new();
    let mut current = String::new();

    for word in label.split_whitespace() {
        if current.is_empty() {
            current.push_str(word);
        } else if display_width(&current) + 1 + display_width(word) <= max_columns {
            current.push(' ');
            current.push_str(word);
        } else {
            lines.push(std::mem::take(&mut current));
            current.push_str(word);
        }
    }
    if !current.is_empty() {
        lines.push(current);
    }
    lines
}

/// Widest wrapped line, in columns.
pub fn wrapped_width(label: &str, max_columns: usize) -> usize {
    wrap_label(label, max_columns)
        .iter()
        .map(|line| display_width(line))
        .max()
        .unwrap_or(0)
}
