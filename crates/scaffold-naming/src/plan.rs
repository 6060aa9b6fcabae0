//! The naming plan
//!
//! Produced once by the planning stage and read-only afterwards. Every later
//! stage takes its file names, symbol names and import statements from here
//! instead of inventing them.

use crate::casing::CasingRule;
use scaffold_artifact::{ArtifactCategory, ArtifactPath};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};

/// Placeholder for the imported symbol in import templates
pub const NAME_PLACEHOLDER: &str = "{name}";
/// Placeholder for the imported file's stem in import templates
pub const MODULE_PLACEHOLDER: &str = "{module}";

/// Authoritative naming and layout contract
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NamingPlan {
    /// Kebab-case project identifier
    pub project_slug: String,
    /// Root directory of generated sources
    pub base_dir: String,
    /// File that boots the application; listed under `config`
    pub entry_point: ArtifactPath,
    /// File that exports the shared data connection; listed under `config`
    pub database_file: ArtifactPath,
    /// Exported name of the shared data connection
    pub database_export: String,
    pub conventions: NamingConventions,
    pub file_structure: FileManifest,
    pub imports: ImportTemplates,
}

/// Casing decisions the planner committed to
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NamingConventions {
    /// Casing of model class names
    pub model_name: CasingRule,
    /// Casing of table / collection names
    pub table_name: CasingRule,
    /// Suffix appended to a model name to name its service
    pub service_suffix: String,
    /// Default file name casing
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_name: Option<CasingRule>,
    /// File name casing per category; overrides `file_name`
    #[serde(default)]
    pub file_naming: BTreeMap<ArtifactCategory, CasingRule>,
}

/// Every file later stages are allowed to emit, by category
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileManifest {
    pub models: Vec<ArtifactPath>,
    pub services: Vec<ArtifactPath>,
    pub routes: Vec<ArtifactPath>,
    pub config: Vec<ArtifactPath>,
    #[serde(default)]
    pub middleware: Vec<ArtifactPath>,
}

impl FileManifest {
    /// Files listed under one category
    #[must_use]
    pub fn files(&self, category: ArtifactCategory) -> &[ArtifactPath] {
        match category {
            ArtifactCategory::Models => &self.models,
            ArtifactCategory::Services => &self.services,
            ArtifactCategory::Routes => &self.routes,
            ArtifactCategory::Config => &self.config,
            ArtifactCategory::Middleware => &self.middleware,
        }
    }

    /// Whether `path` is listed under `category`
    #[must_use]
    pub fn contains(&self, category: ArtifactCategory, path: &ArtifactPath) -> bool {
        self.files(category).contains(path)
    }

    /// Category `path` is listed under, if any
    #[must_use]
    pub fn category_of(&self, path: &ArtifactPath) -> Option<ArtifactCategory> {
        ArtifactCategory::ALL
            .into_iter()
            .find(|c| self.contains(*c, path))
    }

    /// All entries in manifest order
    pub fn entries(&self) -> impl Iterator<Item = (ArtifactCategory, &ArtifactPath)> {
        ArtifactCategory::ALL
            .into_iter()
            .flat_map(move |c| self.files(c).iter().map(move |p| (c, p)))
    }

    /// Number of listed files
    #[must_use]
    pub fn len(&self) -> usize {
        ArtifactCategory::ALL.iter().map(|c| self.files(*c).len()).sum()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Literal import snippets later stages must reuse verbatim
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImportTemplates {
    /// Literal statement importing the shared data connection
    pub database: String,
    /// Template importing a model; uses `{name}` and `{module}`
    pub model: String,
    /// Template importing a service instance; uses `{name}` and `{module}`
    pub service: String,
    /// Optional template importing a middleware
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub middleware: Option<String>,
}

impl ImportTemplates {
    /// Fill a template's placeholders
    #[must_use]
    pub fn render(template: &str, name: &str, module: &str) -> String {
        template
            .replace(NAME_PLACEHOLDER, name)
            .replace(MODULE_PLACEHOLDER, module)
    }
}

impl NamingPlan {
    /// Check the plan's internal consistency
    ///
    /// # Errors
    /// The first [`PlanError`] found.
    pub fn validate(&self) -> Result<(), PlanError> {
        if self.project_slug.trim().is_empty() {
            return Err(PlanError::EmptyField("project_slug"));
        }
        if self.base_dir.trim().is_empty() {
            return Err(PlanError::EmptyField("base_dir"));
        }
        if self.database_export.trim().is_empty() {
            return Err(PlanError::EmptyField("database_export"));
        }
        if self.conventions.service_suffix.trim().is_empty() {
            return Err(PlanError::EmptyField("conventions.service_suffix"));
        }

        let mut seen = HashSet::new();
        for (_, path) in self.file_structure.entries() {
            if !seen.insert(path) {
                return Err(PlanError::DuplicatePath(path.clone()));
            }
        }

        for (field, path) in [
            ("entry_point", &self.entry_point),
            ("database_file", &self.database_file),
        ] {
            if !self.file_structure.contains(ArtifactCategory::Config, path) {
                return Err(PlanError::NotInManifest {
                    field,
                    path: path.clone(),
                    category: ArtifactCategory::Config,
                });
            }
        }

        for (template, text) in [
            ("model", &self.imports.model),
            ("service", &self.imports.service),
        ] {
            for placeholder in [NAME_PLACEHOLDER, MODULE_PLACEHOLDER] {
                if !text.contains(placeholder) {
                    return Err(PlanError::MissingPlaceholder {
                        template,
                        placeholder,
                    });
                }
            }
        }

        if !self.imports.database.contains(self.database_export.as_str()) {
            return Err(PlanError::DatabaseExportNotImported {
                export: self.database_export.clone(),
                statement: self.imports.database.clone(),
            });
        }

        Ok(())
    }

    /// File name casing for a category, if the planner declared one
    #[must_use]
    pub fn file_casing(&self, category: ArtifactCategory) -> Option<CasingRule> {
        self.conventions
            .file_naming
            .get(&category)
            .copied()
            .or(self.conventions.file_name)
    }
}

/// Naming plan violations
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PlanError {
    #[error("naming plan field `{0}` is empty")]
    EmptyField(&'static str),

    #[error("path listed more than once in the manifest: {0}")]
    DuplicatePath(ArtifactPath),

    #[error("`{field}` = {path} is not listed under `{category}`")]
    NotInManifest {
        field: &'static str,
        path: ArtifactPath,
        category: ArtifactCategory,
    },

    #[error("import template `{template}` lacks the {placeholder} placeholder")]
    MissingPlaceholder {
        template: &'static str,
        placeholder: &'static str,
    },

    #[error("database import `{statement}` does not mention export `{export}`")]
    DatabaseExportNotImported { export: String, statement: String },

    #[error("manifest lists {actual} {category} files for {expected} tables")]
    CountMismatch {
        category: ArtifactCategory,
        expected: usize,
        actual: usize,
    },

    #[error("no {category} file matches {kind} `{name}`")]
    Unresolved {
        category: ArtifactCategory,
        kind: &'static str,
        name: String,
    },

    #[error("{category} file {path} matches both `{first}` and `{second}`")]
    Ambiguous {
        category: ArtifactCategory,
        path: ArtifactPath,
        first: String,
        second: String,
    },
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    pub(crate) const BLOG_PLAN: &str = r#"{
        "project_slug": "blog-api",
        "base_dir": "src",
        "entry_point": "src/app.js",
        "database_file": "src/config/database.js",
        "database_export": "sequelize",
        "conventions": {
            "model_name": "PascalCase",
            "table_name": "snake_case",
            "service_suffix": "Service",
            "file_naming": {"models": "camelCase", "services": "camelCase", "routes": "camelCase"}
        },
        "file_structure": {
            "models": ["src/models/user.js", "src/models/post.js"],
            "services": ["src/services/userService.js", "src/services/postService.js"],
            "routes": ["src/routes/posts.js"],
            "config": ["src/config/database.js", "src/app.js"],
            "middleware": ["src/middleware/errorHandler.js"]
        },
        "imports": {
            "database": "const sequelize = require('../config/database');",
            "model": "const {name} = require('../models/{module}');",
            "service": "const {name} = require('../services/{module}');"
        }
    }"#;

    pub(crate) fn blog_plan() -> NamingPlan {
        serde_json::from_str(BLOG_PLAN).unwrap()
    }

    #[test]
    fn parses_and_validates() {
        let plan = blog_plan();
        assert!(plan.validate().is_ok());
        assert_eq!(plan.file_structure.len(), 8);
        assert_eq!(plan.file_casing(ArtifactCategory::Models), Some(CasingRule::Camel));
        assert_eq!(plan.file_casing(ArtifactCategory::Config), None);
    }

    #[test]
    fn manifest_lookup() {
        let plan = blog_plan();
        let post = ArtifactPath::parse("src/models/post.js").unwrap();
        assert_eq!(plan.file_structure.category_of(&post), Some(ArtifactCategory::Models));
        assert!(!plan.file_structure.contains(ArtifactCategory::Services, &post));
        let order: Vec<_> = plan.file_structure.entries().map(|(c, _)| c).collect();
        assert_eq!(order.first(), Some(&ArtifactCategory::Models));
        assert_eq!(order.last(), Some(&ArtifactCategory::Middleware));
    }

    #[test]
    fn render_fills_placeholders() {
        let plan = blog_plan();
        assert_eq!(
            ImportTemplates::render(&plan.imports.model, "User", "user"),
            "const User = require('../models/user');"
        );
    }

    #[test]
    fn duplicate_path_rejected() {
        let mut plan = blog_plan();
        plan.file_structure
            .routes
            .push(ArtifactPath::parse("src/models/user.js").unwrap());
        assert!(matches!(plan.validate(), Err(PlanError::DuplicatePath(_))));
    }

    #[test]
    fn entry_point_must_be_config() {
        let mut plan = blog_plan();
        plan.entry_point = ArtifactPath::parse("src/server.js").unwrap();
        assert!(matches!(
            plan.validate(),
            Err(PlanError::NotInManifest { field: "entry_point", .. })
        ));
    }

    #[test]
    fn templates_need_placeholders() {
        let mut plan = blog_plan();
        plan.imports.service = "const svc = require('../services');".to_string();
        assert_eq!(
            plan.validate(),
            Err(PlanError::MissingPlaceholder {
                template: "service",
                placeholder: NAME_PLACEHOLDER
            })
        );
    }

    #[test]
    fn database_import_must_name_export() {
        let mut plan = blog_plan();
        plan.database_export = "db".to_string();
        assert!(matches!(
            plan.validate(),
            Err(PlanError::DatabaseExportNotImported { .. })
        ));
    }

    #[test]
    fn missing_required_key_fails_to_parse() {
        let mut value: serde_json::Value = serde_json::from_str(BLOG_PLAN).unwrap();
        value.as_object_mut().unwrap().remove("imports");
        assert!(serde_json::from_value::<NamingPlan>(value).is_err());
    }
}
