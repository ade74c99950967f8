// Copyright (c) 2024-2026 Martin Schröder <info@swedishembedded.com>
//
// SPDX-License-Identifier: MIT
//! Display-column wrapping for the transcript and the draft box.
//!
//! Widths are measured with `unicode_width`, so wide (CJK / emoji)
//! characters take two columns and combining marks take none.

use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

fn char_width(ch: char) -> usize {
    UnicodeWidthChar::width(ch).unwrap_or(1)
}

/// Draft text laid out for the input box.
#[derive(Debug, PartialEq, Eq)]
pub struct WrapState {
    /// Always holds at least one (possibly empty) line.
    pub lines: Vec<String>,
    pub cursor_row: usize,
    pub cursor_col: usize,
}

/// Hard-wrap `content` at `width` columns and locate `cursor_byte` in the
/// result.
///
/// `'\n'` always starts a new line.  A character that would overflow the
/// width starts a new line instead.  `width == 0` disables soft wrapping.
/// A cursor at the end of an exactly full line moves to the start of the
/// next one, the way terminals place it.
pub fn wrap_content(content: &str, width: usize, cursor_byte: usize) -> WrapState {
    let cursor_byte = cursor_byte.min(content.len());

    let mut lines: Vec<String> = Vec::new();
    let mut line = String::new();
    let mut col = 0usize;
    let mut cursor: Option<(usize, usize)> = None;

    for (at, ch) in content.char_indices() {
        let w = if ch == '\n' { 0 } else { char_width(ch) };
        if width > 0 && ch != '\n' && w > 0 && col + w > width {
            lines.push(std::mem::take(&mut line));
            col = 0;
        }
        if cursor.is_none() && at == cursor_byte {
            cursor = Some((lines.len(), col));
        }
        if ch == '\n' {
            lines.push(std::mem::take(&mut line));
            col = 0;
        } else {
            line.push(ch);
            col += w;
        }
    }

    let (mut row, mut ccol) = cursor.unwrap_or((lines.len(), col));
    if cursor.is_none() && width > 0 && ccol >= width {
        row += 1;
        ccol = 0;
    }
    lines.push(line);
    while row >= lines.len() {
        lines.push(String::new());
    }

    WrapState { lines, cursor_row: row, cursor_col: ccol }
}

/// Word-wrap one paragraph of transcript text.
///
/// Breaks after the last space that fits.  Words longer than `width` are
/// split wherever they overflow.  Explicit newlines are preserved; an empty
/// input yields one empty line.
pub fn wrap_words(text: &str, width: usize) -> Vec<String> {
    if width == 0 {
        return text.split('\n').map(str::to_string).collect();
    }
    let mut out = Vec::new();
    for para in text.split('\n') {
        if para.width() <= width {
            out.push(para.to_string());
            continue;
        }
        let mut line = String::new();
        let mut col = 0usize;
        // Byte offset in `line` just past the last space, and the width up to it.
        let mut brk: Option<(usize, usize)> = None;
        for ch in para.chars() {
            let w = char_width(ch);
            if col + w > width && !line.is_empty() {
                match brk {
                    Some((at, at_col)) => {
                        let rest = line.split_off(at);
                        out.push(line.trim_end().to_string());
                        line = rest;
                        col -= at_col;
                    }
                    None => {
                        out.push(std::mem::take(&mut line));
                        col = 0;
                    }
                }
                brk = None;
                if ch == ' ' && line.is_empty() {
                    continue;
                }
            }
            line.push(ch);
            col += w;
            if ch == ' ' {
                brk = Some((line.len(), col));
            }
        }
        out.push(line);
    }
    out
}

/// Move `scroll_offset` just enough that `cursor_row` is visible.
pub fn adjust_scroll(cursor_row: usize, visible_height: usize, scroll_offset: &mut usize) {
    if visible_height == 0 {
        return;
    }
    if cursor_row < *scroll_offset {
        *scroll_offset = cursor_row;
    } else if cursor_row >= *scroll_offset + visible_height {
        *scroll_offset = cursor_row + 1 - visible_height;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // ── wrap_content ──────────────────────────────────────────────────────────

    #[test]
    fn empty_draft_has_one_line_and_cursor_at_origin() {
        let s = wrap_content("", 10, 0);
        assert_eq!(s.lines, vec![String::new()]);
        assert_eq!((s.cursor_row, s.cursor_col), (0, 0));
    }

    #[test]
    fn newline_starts_a_new_row() {
        let s = wrap_content("ab\ncd", 10, 5);
        assert_eq!(s.lines, vec!["ab", "cd"]);
        assert_eq!((s.cursor_row, s.cursor_col), (1, 2));
    }

    #[test]
    fn trailing_newline_puts_cursor_on_empty_row() {
        let s = wrap_content("ab\n", 10, 3);
        assert_eq!(s.lines, vec!["ab", ""]);
        assert_eq!((s.cursor_row, s.cursor_col), (1, 0));
    }

    #[test]
    fn soft_wrap_at_width() {
        let s = wrap_content("abcdef", 4, 5);
        assert_eq!(s.lines, vec!["abcd", "ef"]);
        assert_eq!((s.cursor_row, s.cursor_col), (1, 1));
    }

    #[test]
    fn cursor_after_exactly_full_line_moves_down() {
        let s = wrap_content("abcd", 4, 4);
        assert_eq!((s.cursor_row, s.cursor_col), (1, 0));
        assert_eq!(s.lines.len(), 2);
    }

    #[test]
    fn wide_chars_take_two_columns() {
        let s = wrap_content("日本語", 4, "日本".len());
        assert_eq!(s.lines, vec!["日本", "語"]);
        assert_eq!((s.cursor_row, s.cursor_col), (1, 0));
    }

    #[test]
    fn cursor_past_end_is_clamped() {
        let s = wrap_content("ab", 10, 99);
        assert_eq!((s.cursor_row, s.cursor_col), (0, 2));
    }

    // ── wrap_words ────────────────────────────────────────────────────────────

    #[test]
    fn short_text_is_untouched() {
        assert_eq!(wrap_words("hello world", 20), vec!["hello world"]);
    }

    #[test]
    fn breaks_at_spaces() {
        assert_eq!(
            wrap_words("the quick brown fox", 10),
            vec!["the quick", "brown fox"]
        );
    }

    #[test]
    fn long_word_is_split() {
        assert_eq!(wrap_words("abcdefghij", 4), vec!["abcd", "efgh", "ij"]);
    }

    #[test]
    fn explicit_newlines_preserved() {
        assert_eq!(wrap_words("a\n\nb", 10), vec!["a", "", "b"]);
    }

    #[test]
    fn zero_width_disables_wrapping() {
        assert_eq!(wrap_words("a b c", 0), vec!["a b c"]);
    }

    #[test]
    fn no_line_exceeds_width() {
        let text = "Retrieval augmented generation combines search with a language model.";
        for line in wrap_words(text, 12) {
            assert!(line.width() <= 12, "{line:?}");
        }
    }

    // ── adjust_scroll ─────────────────────────────────────────────────────────

    #[test]
    fn scroll_follows_cursor_down_and_up() {
        let mut off = 0;
        adjust_scroll(5, 3, &mut off);
        assert_eq!(off, 3);
        adjust_scroll(1, 3, &mut off);
        assert_eq!(off, 1);
        adjust_scroll(2, 3, &mut off);
        assert_eq!(off, 1);
    }

    #[test]
    fn zero_height_is_noop() {
        let mut off = 4;
        adjust_scroll(0, 0, &mut off);
        assert_eq!(off, 4);
    }
}
