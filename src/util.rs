use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

/// Clock display used in the header and summaries: one decimal place
pub fn format_secs(secs: f64) -> String {
    format!("{:.1}s", secs)
}

/// Greedy word wrap by display width. Words wider than `width` are split.
pub fn wrap_to_width(text: &str, width: usize) -> Vec<String> {
    let width = width.max(1);
    let mut lines = Vec::new();
    let mut current = String::new();

    for word in text.split_whitespace() {
        let needed = if current.is_empty() {
            word.width()
        } else {
            current.width() + 1 + word.width()
        };

        if needed <= width {
            if !current.is_empty() {
                current.push(' ');
            }
            current.push_str(word);
            continue;
        }

        if !current.is_empty() {
            lines.push(std::mem::take(&mut current));
        }

        for c in word.chars() {
            let cw = c.width().unwrap_or(0);
            if current.width() + cw > width && !current.is_empty() {
                lines.push(std::mem::take(&mut current));
            }
            current.push(c);
        }
    }

    if !current.is_empty() || lines.is_empty() {
        lines.push(current);
    }
    lines
}
