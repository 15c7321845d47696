//! Relaxed-JSON preprocessor: strips `//` and `/* */` comments so the standard
//! parser accepts the document. Comment markers inside string literals are
//! left alone.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ScanState {
    Normal,
    InString,
    InStringEscape,
    LineComment,
    BlockComment,
}

/// Removes comments from JSON text. Does not validate JSON syntax; newlines
/// are preserved so parse errors downstream keep their line numbers.
pub fn strip_comments(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut state = ScanState::Normal;
    let mut chars = text.chars().peekable();

    while let Some(c) = chars.next() {
        state = match state {
            ScanState::Normal => match c {
                '"' => {
                    out.push(c);
                    ScanState::InString
                }
                '/' => match chars.peek() {
                    Some('/') => {
                        chars.next();
                        ScanState::LineComment
                    }
                    Some('*') => {
                        chars.next();
                        ScanState::BlockComment
                    }
                    _ => {
                        out.push(c);
                        ScanState::Normal
                    }
                },
                _ => {
                    out.push(c);
                    ScanState::Normal
                }
            },
            ScanState::InString => match c {
                '\\' => {
                    out.push(c);
                    ScanState::InStringEscape
                }
                '"' => {
                    out.push(c);
                    ScanState::Normal
                }
                _ => {
                    out.push(c);
                    ScanState::InString
                }
            },
            ScanState::InStringEscape => {
                // The escaped character is copied verbatim, so \" does not
                // close the string.
                out.push(c);
                ScanState::InString
            }
            ScanState::LineComment => {
                if c == '\n' {
                    out.push(c);
                    ScanState::Normal
                } else {
                    ScanState::LineComment
                }
            }
            ScanState::BlockComment => match c {
                '*' if chars.peek() == Some(&'/') => {
                    chars.next();
                    ScanState::Normal
                }
                '\n' => {
                    out.push(c);
                    ScanState::BlockComment
                }
                _ => ScanState::BlockComment,
            },
        };
    }

    out
}
