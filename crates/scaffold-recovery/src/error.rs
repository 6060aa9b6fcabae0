//! Error types for structured-output recovery

/// Recovered text still failed to parse
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RecoveryError {
    /// Nothing resembling an object was found
    #[error("no structured object found in model output ({len} chars)")]
    NoObject { len: usize },

    /// Text is not syntactically valid after repair
    #[error("unparseable output at line {line}, column {column}: {message} (near `{excerpt}`)")]
    Syntax {
        line: usize,
        column: usize,
        message: String,
        excerpt: String,
    },

    /// Valid JSON, but missing keys or carrying wrong types
    #[error("output does not match the expected shape: {message}")]
    Shape { message: String },
}

impl RecoveryError {
    /// Classify a serde_json failure against the text that was parsed
    pub(crate) fn from_json(err: &serde_json::Error, text: &str) -> Self {
        use serde_json::error::Category;

        match err.classify() {
            Category::Data => Self::Shape {
                message: err.to_string(),
            },
            Category::Syntax | Category::Eof | Category::Io => Self::Syntax {
                line: err.line(),
                column: err.column(),
                message: err.to_string(),
                excerpt: excerpt_at(text, err.line(), err.column()),
            },
        }
    }
}

const EXCERPT_RADIUS: usize = 30;

fn excerpt_at(text: &str, line: usize, column: usize) -> String {
    let Some(source_line) = text.lines().nth(line.saturating_sub(1)) else {
        return String::new();
    };
    let chars: Vec<char> = source_line.chars().collect();
    let center = column.saturating_sub(1).min(chars.len());
    let from = center.saturating_sub(EXCERPT_RADIUS);
    let to = (center + EXCERPT_RADIUS).min(chars.len());
    chars[from..to].iter().collect()
}
