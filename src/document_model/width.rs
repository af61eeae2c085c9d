use unicode_width::UnicodeWidthChar;

/// Rendered width of one character at display column `x`.
fn char_width(ch: char, x: usize, tab_width: usize) -> usize {
    if ch == '\t' {
        let tab_width = tab_width.max(1);
        tab_width - (x % tab_width)
    } else {
        ch.width().unwrap_or(0)
    }
}

/// Rendered width of `chars`, with tabs expanded to the next tab stop.
pub fn display_width(chars: &[char], tab_width: usize) -> usize {
    chars
        .iter()
        .fold(0, |x, &ch| x + char_width(ch, x, tab_width))
}

/// Number of leading characters that fit in `width` display columns.
pub fn chars_within(chars: &[char], width: usize, tab_width: usize) -> usize {
    let mut x = 0;
    for (i, &ch) in chars.iter().enumerate() {
        x += char_width(ch, x, tab_width);
        if x > width {
            return i;
        }
    }
    chars.len()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chars(s: &str) -> Vec<char> {
        s.chars().collect()
    }

    #[test]
    fn test_tabs_expand_to_stops() {
        assert_eq!(display_width(&chars("\tx"), 4), 5);
        assert_eq!(display_width(&chars("ab\tx"), 4), 5);
        assert_eq!(display_width(&chars("abcd\t"), 4), 8);
    }

    #[test]
    fn test_wide_chars() {
        assert_eq!(display_width(&chars("日本"), 8), 4);
        assert_eq!(chars_within(&chars("日本語"), 4, 8), 2);
        assert_eq!(chars_within(&chars("abc"), 10, 8), 3);
    }
}
