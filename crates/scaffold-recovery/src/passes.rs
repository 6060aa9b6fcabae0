//! Individual repair passes
//!
//! Every pass is a total `&str -> String` function that fixes one class of
//! defect and leaves valid JSON untouched. Passes that look at structure
//! track string literals so that braces, commas and quotes inside string
//! content are never treated as syntax.

/// Tracks whether a scan position is inside a string literal
#[derive(Debug, Default, Clone, Copy)]
struct StringState {
    in_string: bool,
    escaped: bool,
}

impl StringState {
    /// Advance over `ch`. Returns true if `ch` was part of a string
    /// literal, including its opening and closing quotes.
    fn step(&mut self, ch: char) -> bool {
        if self.in_string {
            if self.escaped {
                self.escaped = false;
            } else if ch == '\\' {
                self.escaped = true;
            } else if ch == '"' {
                self.in_string = false;
            }
            true
        } else if ch == '"' {
            self.in_string = true;
            true
        } else {
            false
        }
    }
}

/// Unwrap a fenced block and surrounding prose
///
/// Text that already starts with `{` is only trimmed. Otherwise the first
/// fence whose body begins with `{` is opened, and the last fence after it
/// closes the block, provided the enclosed text ends with `}`. Fences that
/// appear inside generated file content are left alone because they are
/// not followed by an object.
#[must_use]
pub fn strip_fences(input: &str) -> String {
    let trimmed = input.trim();
    if trimmed.starts_with('{') {
        return trimmed.to_string();
    }

    let Some(body_start) = find_opening_fence(trimmed) else {
        return trimmed.to_string();
    };
    let body = &trimmed[body_start..];

    if let Some(close) = body.rfind("```") {
        let enclosed = body[..close].trim();
        if enclosed.ends_with('}') {
            return enclosed.to_string();
        }
    }
    body.trim().to_string()
}

fn find_opening_fence(text: &str) -> Option<usize> {
    let mut search = 0;
    while let Some(rel) = text[search..].find("```") {
        let fence = search + rel;
        let after = &text[fence + 3..];
        let tag_len = after
            .find(|c: char| !(c.is_ascii_alphanumeric() || c == '-' || c == '_'))
            .unwrap_or(after.len());
        if after[tag_len..].trim_start().starts_with('{') {
            return Some(fence + 3 + tag_len);
        }
        search = fence + 3;
    }
    None
}

/// Keep only the outermost balanced object
///
/// Scans from the first `{` to its matching `}`. If the braces never
/// balance, falls back to the last `}` in the text. Text without any `{`
/// is returned unchanged.
#[must_use]
pub fn extract_outermost_object(input: &str) -> String {
    let Some(start) = input.find('{') else {
        return input.to_string();
    };

    let mut state = StringState::default();
    let mut depth = 0usize;
    for (offset, ch) in input[start..].char_indices() {
        if state.step(ch) {
            continue;
        }
        match ch {
            '{' => depth += 1,
            '}' => {
                depth = depth.saturating_sub(1);
                if depth == 0 {
                    return input[start..=start + offset].to_string();
                }
            }
            _ => {}
        }
    }

    match input.rfind('}') {
        Some(end) if end > start => input[start..=end].to_string(),
        _ => input[start..].to_string(),
    }
}

/// Drop commas that directly precede `}` or `]`
#[must_use]
pub fn remove_trailing_commas(input: &str) -> String {
    let chars: Vec<char> = input.chars().collect();
    let mut out = String::with_capacity(input.len());
    let mut state = StringState::default();

    for (i, &ch) in chars.iter().enumerate() {
        if state.step(ch) {
            out.push(ch);
            continue;
        }
        if ch == ',' {
            let next = chars[i + 1..].iter().find(|c| !c.is_whitespace());
            if matches!(next, Some('}' | ']')) {
                continue;
            }
        }
        out.push(ch);
    }
    out
}

/// Insert the comma a model forgot between list items on separate lines
///
/// Applies when a closing quote, `}` or `]` is followed by whitespace that
/// contains a newline and then by `"` or `{`. That sequence is never legal
/// JSON, so valid input is unaffected.
#[must_use]
pub fn insert_missing_separators(input: &str) -> String {
    let chars: Vec<char> = input.chars().collect();
    let mut out = String::with_capacity(input.len());
    let mut state = StringState::default();

    for (i, &ch) in chars.iter().enumerate() {
        let was_in_string = state.in_string;
        let in_literal = state.step(ch);
        out.push(ch);

        let closes_value = if in_literal {
            was_in_string && !state.in_string
        } else {
            ch == '}' || ch == ']'
        };
        if !closes_value {
            continue;
        }

        let rest = &chars[i + 1..];
        let gap = rest.iter().take_while(|c| c.is_whitespace()).count();
        let crosses_line = rest[..gap].contains(&'\n');
        if crosses_line && matches!(rest.get(gap), Some('"' | '{')) {
            out.push(',');
        }
    }
    out
}

/// Make every string literal legal
///
/// Inside strings, a backslash that starts a valid JSON escape is kept,
/// and any other backslash is doubled. That decision is made before raw
/// control characters are replaced, so escapes this pass introduces are
/// never escaped again.
#[must_use]
pub fn escape_control_characters(input: &str) -> String {
    let chars: Vec<char> = input.chars().collect();
    let mut out = String::with_capacity(input.len());
    let mut in_string = false;
    let mut i = 0;

    while i < chars.len() {
        let ch = chars[i];
        if !in_string {
            if ch == '"' {
                in_string = true;
            }
            out.push(ch);
            i += 1;
            continue;
        }

        match ch {
            '\\' => {
                let escape_len = valid_escape_len(&chars[i + 1..]);
                if escape_len == 0 {
                    out.push_str("\\\\");
                    i += 1;
                } else {
                    out.extend(&chars[i..=i + escape_len]);
                    i += escape_len + 1;
                }
            }
            '"' => {
                in_string = false;
                out.push(ch);
                i += 1;
            }
            c if (c as u32) < 0x20 => {
                match c {
                    '\n' => out.push_str("\\n"),
                    '\r' => out.push_str("\\r"),
                    '\t' => out.push_str("\\t"),
                    '\u{08}' => out.push_str("\\b"),
                    '\u{0c}' => out.push_str("\\f"),
                    other => out.push_str(&format!("\\u{:04x}", other as u32)),
                }
                i += 1;
            }
            c => {
                out.push(c);
                i += 1;
            }
        }
    }
    out
}

/// Length of the escape body following a backslash, 0 if invalid
fn valid_escape_len(rest: &[char]) -> usize {
    match rest.first() {
        Some('"' | '\\' | '/' | 'b' | 'f' | 'n' | 'r' | 't') => 1,
        Some('u') if rest.len() >= 5 && rest[1..5].iter().all(char::is_ascii_hexdigit) => 5,
        _ => 0,
    }
}
