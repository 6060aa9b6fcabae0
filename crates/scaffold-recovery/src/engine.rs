//! Pass composition and typed parsing

use crate::error::RecoveryError;
use crate::passes;
use serde::de::DeserializeOwned;

/// A named, total text transform
#[derive(Debug, Clone, Copy)]
pub struct RepairPass {
    name: &'static str,
    apply: fn(&str) -> String,
}

impl RepairPass {
    #[inline]
    #[must_use]
    pub const fn new(name: &'static str, apply: fn(&str) -> String) -> Self {
        Self { name, apply }
    }

    #[inline]
    #[must_use]
    pub fn name(&self) -> &'static str {
        self.name
    }

    #[inline]
    #[must_use]
    pub fn apply(&self, input: &str) -> String {
        (self.apply)(input)
    }
}

/// The standard pass order
pub const STANDARD_PASSES: [RepairPass; 5] = [
    RepairPass::new("strip_fences", passes::strip_fences),
    RepairPass::new("extract_outermost_object", passes::extract_outermost_object),
    RepairPass::new("remove_trailing_commas", passes::remove_trailing_commas),
    RepairPass::new("insert_missing_separators", passes::insert_missing_separators),
    RepairPass::new("escape_control_characters", passes::escape_control_characters),
];

/// Output of [`RecoveryEngine::recover`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Recovered {
    /// Repaired text
    pub text: String,
    /// Names of passes that changed the text, in order
    pub applied: Vec<&'static str>,
}

impl Recovered {
    /// Whether any pass changed the input
    #[inline]
    #[must_use]
    pub fn was_repaired(&self) -> bool {
        !self.applied.is_empty()
    }
}

/// Ordered list of repair passes applied left to right
///
/// Stateless; one engine can serve any number of concurrent pipelines.
#[derive(Debug, Clone)]
pub struct RecoveryEngine {
    passes: Vec<RepairPass>,
}

impl Default for RecoveryEngine {
    fn default() -> Self {
        Self::new(STANDARD_PASSES.to_vec())
    }
}

impl RecoveryEngine {
    /// Engine with a custom pass list
    #[must_use]
    pub fn new(passes: Vec<RepairPass>) -> Self {
        Self { passes }
    }

    /// Pass names in application order
    #[must_use]
    pub fn pass_names(&self) -> Vec<&'static str> {
        self.passes.iter().map(RepairPass::name).collect()
    }

    /// Run every pass over `raw`
    #[must_use]
    pub fn recover(&self, raw: &str) -> Recovered {
        let mut text = raw.to_string();
        let mut applied = Vec::new();
        for pass in &self.passes {
            let next = pass.apply(&text);
            if next != text {
                tracing::debug!(
                    pass = pass.name(),
                    before = text.len(),
                    after = next.len(),
                    "repair pass modified output"
                );
                applied.push(pass.name());
                text = next;
            }
        }
        Recovered { text, applied }
    }

    /// Recover, then deserialize into `T`
    ///
    /// # Errors
    /// [`RecoveryError::NoObject`] when the output contains no `{`,
    /// [`RecoveryError::Syntax`] when the repaired text is still not JSON,
    /// [`RecoveryError::Shape`] when it is JSON of the wrong shape.
    pub fn parse<T: DeserializeOwned>(&self, raw: &str) -> Result<T, RecoveryError> {
        let recovered = self.recover(raw);
        if !recovered.text.contains('{') {
            return Err(RecoveryError::NoObject { len: raw.len() });
        }
        serde_json::from_str(&recovered.text).map_err(|e| {
            let err = RecoveryError::from_json(&e, &recovered.text);
            tracing::warn!(
                applied = ?recovered.applied,
                error = %err,
                "structured output unrecoverable"
            );
            err
        })
    }

    /// Recover into an untyped JSON value
    ///
    /// # Errors
    /// Same as [`RecoveryEngine::parse`].
    pub fn parse_value(&self, raw: &str) -> Result<serde_json::Value, RecoveryError> {
        self.parse(raw)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Debug, Deserialize, PartialEq)]
    struct Bundle {
        files: Vec<File>,
    }

    #[derive(Debug, Deserialize, PartialEq)]
    struct File {
        path: String,
        content: String,
    }

    #[test]
    fn standard_pass_order() {
        assert_eq!(
            RecoveryEngine::default().pass_names(),
            [
                "strip_fences",
                "extract_outermost_object",
                "remove_trailing_commas",
                "insert_missing_separators",
                "escape_control_characters",
            ]
        );
    }

    #[test]
    fn recovers_commentary_fence_comma_and_newline() {
        let raw = "Here are the files you asked for.\n\
                   ```json\n\
                   {\"files\": [{\"path\": \"src/app.js\", \"content\": \"line one\nline two\"},]}\n\
                   ```\n\
                   Hope this helps!";
        let engine = RecoveryEngine::default();
        let recovered = engine.recover(raw);

        assert!(recovered.text.contains("line one\\nline two"));
        assert!(!recovered.text.contains("one\nline"));
        assert!(recovered.applied.contains(&"remove_trailing_commas"));

        let bundle: Bundle = engine.parse(raw).unwrap();
        assert_eq!(bundle.files[0].content, "line one\nline two");
    }

    #[test]
    fn valid_input_is_untouched() {
        let raw = r#"{"files":[{"path":"a.js","content":"x"}]}"#;
        let recovered = RecoveryEngine::default().recover(raw);
        assert_eq!(recovered.text, raw);
        assert!(!recovered.was_repaired());
    }

    #[test]
    fn prose_only_is_no_object() {
        let err = RecoveryEngine::default()
            .parse::<Bundle>("I cannot help with that.")
            .unwrap_err();
        assert!(matches!(err, RecoveryError::NoObject { .. }));
    }

    #[test]
    fn wrong_shape_is_reported() {
        let err = RecoveryEngine::default()
            .parse::<Bundle>(r#"{"documents": []}"#)
            .unwrap_err();
        assert!(matches!(err, RecoveryError::Shape { .. }));
    }

    #[test]
    fn broken_syntax_still_fails() {
        let err = RecoveryEngine::default()
            .parse::<Bundle>(r#"{"files": [{"path": "a.js" "content": "x"}]}"#)
            .unwrap_err();
        assert!(matches!(err, RecoveryError::Syntax { .. }));
    }

    #[test]
    fn custom_pass_list() {
        let engine = RecoveryEngine::new(vec![STANDARD_PASSES[2]]);
        let recovered = engine.recover("{\"a\": 1,}");
        assert_eq!(recovered.text, "{\"a\": 1}");
        assert_eq!(recovered.applied, ["remove_trailing_commas"]);
    }
}
