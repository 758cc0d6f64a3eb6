use unicode_width::UnicodeWidthChar;

/// Truncate a string to a maximum display width, keeping color codes intact.
pub(crate) fn truncate_display(s: &str, max_width: usize) -> String {
    if max_width == 0 {
        return String::new();
    }

    let mut result = String::new();
    let mut width: usize = 0;
    let mut in_escape = false;
    let mut escape_seq = String::new();

    for ch in s.chars() {
        if ch == '\x1b' {
            in_escape = true;
            escape_seq.push(ch);
        } else if in_escape {
            escape_seq.push(ch);
            if ch == 'm' {
                result.push_str(&escape_seq);
                escape_seq.clear();
                in_escape = false;
            }
        } else {
            let ch_width = UnicodeWidthChar::width(ch).unwrap_or(0);
            if width.saturating_add(ch_width) > max_width {
                break;
            }
            result.push(ch);
            width = width.saturating_add(ch_width);
        }
    }

    if result.contains("\x1b[") && !result.ends_with("\x1b[0m") {
        result.push_str("\x1b[0m");
    }

    result
}

/// Make untrusted text (paths, argv) safe to print on the status row.
pub(crate) fn sanitize_status(text: &str) -> String {
    let spaced: String = text
        .chars()
        .map(|ch| if ch.is_control() && ch != '\x1b' { ' ' } else { ch })
        .collect();
    let stripped = strip_ansi_escapes::strip(spaced);
    String::from_utf8_lossy(&stripped)
        .chars()
        .filter(|ch| !ch.is_control())
        .collect()
}
