//! ANSI escape sequence recognition.
//!
//! Recognition only: sequences are measured and skipped, never interpreted.

/// Length in bytes of the escape sequence starting at `pos`, if one starts there.
///
/// Handles CSI (`ESC [`), string-terminated OSC/APC/DCS (`ESC ]`, `ESC _`, `ESC P`, ended by BEL
/// or `ESC \`) and SS3 (`ESC O x`). Unterminated sequences are not recognised.
pub fn escape_len(input: &str, pos: usize) -> Option<usize> {
    let bytes = input.as_bytes();
    if bytes.get(pos) != Some(&0x1b) {
        return None;
    }

    match *bytes.get(pos + 1)? {
        b'[' => bytes[pos + 2..]
            .iter()
            .position(|b| (0x40..=0x7e).contains(b))
            .map(|idx| idx + 3),
        b']' | b'_' | b'P' => {
            let body = &bytes[pos + 2..];
            let mut idx = 0;
            while idx < body.len() {
                match body[idx] {
                    0x07 => return Some(idx + 3),
                    0x1b if body.get(idx + 1) == Some(&b'\\') => return Some(idx + 4),
                    _ => idx += 1,
                }
            }
            None
        }
        b'O' if pos + 2 < bytes.len() && input.is_char_boundary(pos + 3) => Some(3),
        _ => None,
    }
}

/// Removes every recognised escape sequence from `input`.
pub fn strip_ansi(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let mut idx = 0;
    while idx < input.len() {
        if let Some(len) = escape_len(input, idx) {
            idx += len;
            continue;
        }
        let Some(ch) = input[idx..].chars().next() else {
            break;
        };
        out.push(ch);
        idx += ch.len_utf8();
    }
    out
}

/// Whether the visible text of `content` ends with a line terminator.
///
/// Trailing styling (e.g. a reset after the newline) does not hide the terminator.
pub fn ends_with_eol(content: &str) -> bool {
    if content.ends_with('\n') {
        return true;
    }
    if !content.contains('\x1b') {
        return false;
    }
    strip_ansi(content).ends_with('\n')
}

#[cfg(test)]
mod tests {
    use super::{ends_with_eol, escape_len, strip_ansi};

    #[test]
    fn csi_and_osc_lengths() {
        assert_eq!(escape_len("\x1b[31mX", 0), Some(5));
        assert_eq!(escape_len("\x1b]8;;https://x\x07link", 0), Some(15));
        assert_eq!(escape_len("\x1b]0;t\x1b\\", 0), Some(7));
        assert_eq!(escape_len("\x1b[", 0), None);
        assert_eq!(escape_len("plain", 0), None);
    }

    #[test]
    fn strips_sgr_and_hyperlinks() {
        let input = "\x1b[1mbold\x1b[0m \x1b]8;;https://example.com\x07link\x1b]8;;\x07";
        assert_eq!(strip_ansi(input), "bold link");
    }

    #[test]
    fn eol_detection_ignores_trailing_styles() {
        assert!(ends_with_eol("done\n"));
        assert!(ends_with_eol("\x1b[32mdone\n\x1b[0m"));
        assert!(ends_with_eol("crlf\r\n"));
        assert!(!ends_with_eol("\x1b[32mdone\x1b[0m"));
        assert!(!ends_with_eol(""));
    }
}
