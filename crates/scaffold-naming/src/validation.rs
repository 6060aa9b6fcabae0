//! Cross-file consistency checks
//!
//! Provides validators for the two invariants every generated bundle must
//! hold:
//! - **Naming propagation**: a stage emits exactly the manifest files of its
//!   categories, nothing more and nothing less
//! - **Import consistency**: an import of a module another stage produced is
//!   byte-identical to the statement the plan fixed for it

use crate::plan::FileManifest;
use once_cell::sync::Lazy;
use regex::Regex;
use scaffold_artifact::{ArtifactBundle, ArtifactCategory, ArtifactPath, FileArtifact};
use std::collections::HashSet;

/// Module specifier of `require('x')`, `from 'x'` and bare `import 'x'`
static SPECIFIER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?:\brequire\s*\(\s*|\bfrom\s+|^\s*import\s+)["']([^"']+)["']"#)
        .expect("specifier regex is valid")
});

const SCRIPT_EXTENSIONS: [&str; 6] = [".js", ".ts", ".mjs", ".cjs", ".jsx", ".tsx"];

/// Naming propagation check
///
/// Ensures a bundle covers exactly the manifest entries of the categories
/// its stage owns.
#[derive(Debug, Clone, Copy)]
pub struct ManifestValidator<'a> {
    manifest: &'a FileManifest,
}

impl<'a> ManifestValidator<'a> {
    #[inline]
    #[must_use]
    pub fn new(manifest: &'a FileManifest) -> Self {
        Self { manifest }
    }

    /// Validate a stage bundle against the manifest
    ///
    /// # Errors
    /// - [`ValidationError::DuplicateFile`] if a path is emitted twice
    /// - [`ValidationError::UnexpectedFile`] if a path is outside `categories`
    /// - [`ValidationError::MissingFiles`] if manifest entries are absent
    pub fn check_bundle(
        &self,
        categories: &[ArtifactCategory],
        bundle: &ArtifactBundle,
    ) -> Result<(), ValidationError> {
        let mut emitted = HashSet::new();
        for path in bundle.paths() {
            if !emitted.insert(path) {
                return Err(ValidationError::DuplicateFile(path.clone()));
            }
            if !categories.iter().any(|c| self.manifest.contains(*c, path)) {
                return Err(ValidationError::UnexpectedFile {
                    path: path.clone(),
                    allowed: join(categories.iter()),
                });
            }
        }

        let missing: Vec<ArtifactPath> = categories
            .iter()
            .flat_map(|c| self.manifest.files(*c))
            .filter(|p| !emitted.contains(p))
            .cloned()
            .collect();
        if missing.is_empty() {
            Ok(())
        } else {
            Err(ValidationError::MissingFiles { missing })
        }
    }
}

/// A statement other files must reuse verbatim, keyed by what it imports
#[derive(Debug, Clone, PartialEq, Eq)]
struct ExpectedImport {
    specifier: String,
    statement: String,
}

/// Import consistency check
///
/// Holds the statements fixed by the plan and earlier stages. Any
/// import-like line in a checked file whose module specifier matches one of
/// them must equal that statement exactly (surrounding whitespace aside).
/// Imports of unrelated modules are not checked.
#[derive(Debug, Clone, Default)]
pub struct ImportValidator {
    expected: Vec<ExpectedImport>,
}

impl ImportValidator {
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a canonical statement
    ///
    /// Statements without a recognizable module specifier cannot be
    /// matched against and are ignored.
    #[must_use]
    pub fn with_statement(mut self, statement: &str) -> Self {
        if let Some(specifier) = import_specifier(statement) {
            self.expected.push(ExpectedImport {
                specifier: canonical_specifier(specifier).to_string(),
                statement: statement.trim().to_string(),
            });
        }
        self
    }

    /// Registered statements in registration order
    pub fn statements(&self) -> impl Iterator<Item = &str> {
        self.expected.iter().map(|e| e.statement.as_str())
    }

    /// Check one file's import statements
    ///
    /// A statement spread over several lines is joined into one
    /// (lines separated by a single space) before comparison, so it never
    /// equals a single-line canonical statement.
    ///
    /// # Errors
    /// [`ValidationError::ImportMismatch`] for the first deviating statement.
    pub fn check_file(&self, file: &FileArtifact) -> Result<(), ValidationError> {
        for (line, statement) in import_statements(file.content()) {
            let Some(specifier) = import_specifier(&statement) else {
                continue;
            };
            let specifier = canonical_specifier(specifier);
            let candidates: Vec<&ExpectedImport> = self
                .expected
                .iter()
                .filter(|e| e.specifier == specifier)
                .collect();
            if candidates.is_empty() || candidates.iter().any(|e| e.statement == statement) {
                continue;
            }
            return Err(ValidationError::ImportMismatch {
                path: file.path().clone(),
                line,
                expected: candidates[0].statement.clone(),
                found: statement,
            });
        }
        Ok(())
    }

    /// Check every file of a bundle
    ///
    /// # Errors
    /// The first [`ValidationError::ImportMismatch`] found.
    pub fn check_bundle(&self, bundle: &ArtifactBundle) -> Result<(), ValidationError> {
        bundle.files().iter().try_for_each(|f| self.check_file(f))
    }
}

/// Import statements of a file with their 1-based starting line
///
/// An import or destructuring `require` whose first line names no module
/// yet is continued until a line supplies the specifier. A `;` before
/// that abandons it.
fn import_statements(content: &str) -> Vec<(usize, String)> {
    let mut statements = Vec::new();
    let mut pending: Option<(usize, String)> = None;
    for (index, line) in content.lines().enumerate() {
        let trimmed = line.trim();
        if let Some((start, mut text)) = pending.take() {
            if !trimmed.is_empty() {
                text.push(' ');
                text.push_str(trimmed);
            }
            if import_specifier(&text).is_some() {
                statements.push((start, text));
            } else if !trimmed.ends_with(';') {
                pending = Some((start, text));
            }
            continue;
        }
        if is_import_line(trimmed) && import_specifier(trimmed).is_some() {
            statements.push((index + 1, trimmed.to_string()));
        } else if opens_import(trimmed) {
            pending = Some((index + 1, trimmed.to_string()));
        }
    }
    statements
}

/// First line of an `import {` or `const {` statement broken across lines
fn opens_import(line: &str) -> bool {
    if line.ends_with(';') {
        return false;
    }
    line.starts_with("import ")
        || (["const {", "let {", "var {"].iter().any(|p| line.starts_with(p)) && !line.contains('}'))
}

/// Whether a trimmed line looks like an import
#[must_use]
pub fn is_import_line(line: &str) -> bool {
    line.starts_with("import ") || line.contains("require(")
}

/// Module specifier an import line refers to
#[must_use]
pub fn import_specifier(line: &str) -> Option<&str> {
    SPECIFIER
        .captures(line)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str())
}

/// `../models/user.js` and `../models/user` name the same module
fn canonical_specifier(specifier: &str) -> &str {
    SCRIPT_EXTENSIONS
        .iter()
        .find_map(|ext| specifier.strip_suffix(ext))
        .unwrap_or(specifier)
}

/// Require that a file contains a statement verbatim
///
/// # Errors
/// [`ValidationError::MissingImport`] if no line equals `statement`.
pub fn require_statement(file: &FileArtifact, statement: &str) -> Result<(), ValidationError> {
    let statement = statement.trim();
    if file.content().lines().any(|l| l.trim() == statement) {
        Ok(())
    } else {
        Err(ValidationError::MissingImport {
            path: file.path().clone(),
            expected: statement.to_string(),
        })
    }
}

/// Require that a file mentions an identifier as a whole word
///
/// # Errors
/// [`ValidationError::MissingSymbol`] otherwise.
pub fn require_symbol(file: &FileArtifact, symbol: &str) -> Result<(), ValidationError> {
    if mentions_identifier(file.content(), symbol) {
        Ok(())
    } else {
        Err(ValidationError::MissingSymbol {
            path: file.path().clone(),
            symbol: symbol.to_string(),
        })
    }
}

/// Whether `ident` occurs in `text` not surrounded by identifier characters
#[must_use]
pub fn mentions_identifier(text: &str, ident: &str) -> bool {
    if ident.is_empty() {
        return false;
    }
    let is_ident = |c: char| c.is_alphanumeric() || c == '_' || c == '$';
    text.match_indices(ident).any(|(start, _)| {
        let before = text[..start].chars().next_back();
        let after = text[start + ident.len()..].chars().next();
        !before.is_some_and(is_ident) && !after.is_some_and(is_ident)
    })
}

fn join<T: std::fmt::Display>(items: impl Iterator<Item = T>) -> String {
    items.map(|i| i.to_string()).collect::<Vec<_>>().join(", ")
}

fn join_paths(paths: &[ArtifactPath]) -> String {
    join(paths.iter())
}

/// Bundle consistency violations
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("{path} is not listed in the manifest under {allowed}")]
    UnexpectedFile { path: ArtifactPath, allowed: String },

    #[error("{0} emitted more than once")]
    DuplicateFile(ArtifactPath),

    #[error("bundle omits manifest files: {}", join_paths(.missing))]
    MissingFiles { missing: Vec<ArtifactPath> },

    #[error("{path}:{line}: import `{found}` differs from `{expected}`")]
    ImportMismatch {
        path: ArtifactPath,
        line: usize,
        expected: String,
        found: String,
    },

    #[error("{path} does not contain `{expected}`")]
    MissingImport { path: ArtifactPath, expected: String },

    #[error("{path} never mentions `{symbol}`")]
    MissingSymbol { path: ArtifactPath, symbol: String },
}
