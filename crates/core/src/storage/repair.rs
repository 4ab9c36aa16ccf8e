//! Lenient parsing of almost-JSON holdings files.
//!
//! Spreadsheet exports and hand-edited files commonly contain comment lines,
//! trailing commas, bare `NaN` values and stray control characters. JSON5
//! already covers `//` and `/* */` comments, trailing commas, single quotes
//! and `NaN`/`Infinity` (which `serde_json::Value` stores as `null`). A small
//! pre-pass handles what JSON5 does not: a byte order mark, `#` comments,
//! control characters and `undefined`. String contents are left alone, except
//! that control characters inside strings become spaces.

use serde_json::Value;

/// Clean `input` and parse it as JSON5.
pub fn parse_lenient(input: &str) -> Result<Value, json5::Error> {
    json5::from_str(&clean(input))
}

/// Drop what JSON5 rejects but exporters emit.
fn clean(input: &str) -> String {
    let input = input.strip_prefix('\u{feff}').unwrap_or(input);
    let chars: Vec<char> = input.chars().collect();
    let mut out = String::with_capacity(input.len());
    let mut quote: Option<char> = None;
    let mut escaped = false;
    let mut i = 0;

    while i < chars.len() {
        let c = chars[i];

        if let Some(q) = quote {
            if escaped {
                escaped = false;
                out.push(c);
            } else if c == '\\' {
                escaped = true;
                out.push(c);
            } else if c == q {
                quote = None;
                out.push(c);
            } else if c.is_control() {
                out.push(' ');
            } else {
                out.push(c);
            }
            i += 1;
            continue;
        }

        match c {
            '"' | '\'' => {
                quote = Some(c);
                out.push(c);
                i += 1;
            }
            // JSON5 comments pass through untouched so quotes inside them
            // are not mistaken for strings.
            '/' if chars.get(i + 1) == Some(&'/') => {
                let end = line_end(&chars, i);
                out.extend(&chars[i..end]);
                i = end;
            }
            '/' if chars.get(i + 1) == Some(&'*') => {
                let end = block_comment_end(&chars, i + 2);
                out.extend(&chars[i..end]);
                i = end;
            }
            '#' => {
                i = line_end(&chars, i);
            }
            '\n' | '\r' | '\t' => {
                out.push(c);
                i += 1;
            }
            c if c.is_control() => {
                i += 1;
            }
            'u' if is_word_at(&chars, i, "undefined") => {
                out.push_str("null");
                i += "undefined".len();
            }
            _ => {
                out.push(c);
                i += 1;
            }
        }
    }

    out
}

/// Whether `word` starts at `at` and is not part of a longer identifier.
fn is_word_at(chars: &[char], at: usize, word: &str) -> bool {
    let ident = |c: &char| c.is_alphanumeric() || *c == '_' || *c == '$';
    let len = word.chars().count();
    chars.len() >= at + len
        && chars[at..at + len].iter().copied().eq(word.chars())
        && !(at > 0 && ident(&chars[at - 1]))
        && !chars.get(at + len).is_some_and(ident)
}

/// Index of the newline ending the current line (the newline is kept).
fn line_end(chars: &[char], from: usize) -> usize {
    chars[from..]
        .iter()
        .position(|&c| c == '\n')
        .map_or(chars.len(), |p| from + p)
}

/// Index just past the closing `*/`, or the end of input if unterminated.
fn block_comment_end(chars: &[char], from: usize) -> usize {
    let mut i = from;
    while i + 1 < chars.len() {
        if chars[i] == '*' && chars[i + 1] == '/' {
            return i + 2;
        }
        i += 1;
    }
    chars.len()
}
