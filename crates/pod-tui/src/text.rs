//! Text helpers for card rendering.

use scraper::Html;
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

/// Visible text of an HTML fragment with whitespace runs collapsed.
pub fn plain_text(html: &str) -> String {
    let fragment = Html::parse_fragment(html);
    let raw: String = fragment.root_element().text().collect::<Vec<_>>().join(" ");
    raw.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Cut `s` to at most `max` terminal columns, ending in "…" when cut.
pub fn truncate(s: &str, max: usize) -> String {
    if s.width() <= max {
        return s.to_string();
    }
    if max == 0 {
        return String::new();
    }
    let mut out = String::new();
    let mut used = 0;
    for c in s.chars() {
        let w = c.width().unwrap_or(0);
        if used + w + 1 > max {
            break;
        }
        used += w;
        out.push(c);
    }
    out.push('…');
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_text_strips_markup() {
        let html = "<p>Part <b>one</b> of\n\n the <a href=\"x\">story</a>.</p><p>Next</p>";
        assert_eq!(plain_text(html), "Part one of the story . Next");
    }

    #[test]
    fn test_plain_text_passes_plain_strings() {
        assert_eq!(plain_text("  just   text "), "just text");
        assert_eq!(plain_text(""), "");
    }

    #[test]
    fn test_truncate_by_columns() {
        assert_eq!(truncate("Serial", 10), "Serial");
        assert_eq!(truncate("Serial", 4), "Ser…");
        assert_eq!(truncate("日本語です", 5), "日本…");
        assert_eq!(truncate("abc", 0), "");
    }
}
