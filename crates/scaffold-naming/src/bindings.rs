//! Deterministic names derived from the plan
//!
//! Model class names, service names, file assignments and import
//! statements are computed here from table and endpoint-group names. Later
//! stages receive these literally; nothing is re-derived by the model.

use crate::casing::{normalize, singularize, CasingRule};
use crate::plan::{ImportTemplates, NamingPlan, PlanError};
use scaffold_artifact::{ArtifactCategory, ArtifactPath};
use serde::Serialize;

/// A table's model class and file
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ModelBinding {
    pub table: String,
    pub class_name: String,
    pub path: ArtifactPath,
    /// Statement other files use to import this model
    pub import: String,
}

/// A table's service class, instance and file
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ServiceBinding {
    pub table: String,
    pub model_class: String,
    pub class_name: String,
    pub instance_name: String,
    pub path: ArtifactPath,
    /// Statement route files use to import this service instance
    pub import: String,
}

/// An endpoint group's route file
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RouteBinding {
    pub group: String,
    pub path: ArtifactPath,
}

/// All bindings for one project
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Bindings {
    pub models: Vec<ModelBinding>,
    pub services: Vec<ServiceBinding>,
    pub routes: Vec<RouteBinding>,
}

impl Bindings {
    /// Model binding for a table
    #[must_use]
    pub fn model_for(&self, table: &str) -> Option<&ModelBinding> {
        self.models.iter().find(|m| m.table == table)
    }

    /// Service binding for a table
    #[must_use]
    pub fn service_for(&self, table: &str) -> Option<&ServiceBinding> {
        self.services.iter().find(|s| s.table == table)
    }

    /// Route bindings for a file
    pub fn groups_in<'a>(&'a self, path: &'a ArtifactPath) -> impl Iterator<Item = &'a RouteBinding> {
        self.routes.iter().filter(move |r| &r.path == path)
    }
}

impl NamingPlan {
    /// Model class name for a table, per the plan's model casing
    #[must_use]
    pub fn model_class_name(&self, table: &str) -> String {
        self.conventions.model_name.apply(&singularize(table))
    }

    /// Service class name for a model class
    #[must_use]
    pub fn service_class_name(&self, model_class: &str) -> String {
        format!("{model_class}{}", self.conventions.service_suffix.trim())
    }

    /// Bind tables and endpoint groups to manifest files
    ///
    /// Files are matched by spelling-insensitive stem, so `userService.js`,
    /// `user.service.js` and `user_service.js` all resolve to table `users`.
    ///
    /// # Errors
    /// [`PlanError::CountMismatch`] unless there is exactly one model and
    /// one service file per table, [`PlanError::Unresolved`] when a table
    /// or group has no file, [`PlanError::Ambiguous`] when two tables claim
    /// the same file.
    pub fn bind(&self, tables: &[&str], groups: &[&str]) -> Result<Bindings, PlanError> {
        let manifest = &self.file_structure;
        for category in [ArtifactCategory::Models, ArtifactCategory::Services] {
            let actual = manifest.files(category).len();
            if actual != tables.len() {
                return Err(PlanError::CountMismatch {
                    category,
                    expected: tables.len(),
                    actual,
                });
            }
        }

        let mut bindings = Bindings::default();
        for &table in tables {
            let singular = singularize(table);
            let class_name = self.model_class_name(table);
            let model_keys = [normalize(&class_name), normalize(table), normalize(&singular)];
            let path = resolve_unique(manifest.files(ArtifactCategory::Models), &model_keys)
                .ok_or_else(|| PlanError::Unresolved {
                    category: ArtifactCategory::Models,
                    kind: "table",
                    name: table.to_string(),
                })?;
            claim(&bindings.models, ArtifactCategory::Models, path, table, |m| (&m.path, &m.table))?;
            let import = ImportTemplates::render(&self.imports.model, &class_name, path.stem());
            bindings.models.push(ModelBinding {
                table: table.to_string(),
                class_name: class_name.clone(),
                path: path.clone(),
                import,
            });

            let service_class = self.service_class_name(&class_name);
            let instance_name = CasingRule::Camel.apply(&service_class);
            let suffix = normalize(&self.conventions.service_suffix);
            let service_keys = [
                normalize(&service_class),
                format!("{}{suffix}", normalize(table)),
                format!("{}{suffix}", normalize(&singular)),
                normalize(&class_name),
                normalize(table),
                normalize(&singular),
            ];
            let path = resolve_unique(manifest.files(ArtifactCategory::Services), &service_keys)
                .ok_or_else(|| PlanError::Unresolved {
                    category: ArtifactCategory::Services,
                    kind: "table",
                    name: table.to_string(),
                })?;
            claim(&bindings.services, ArtifactCategory::Services, path, table, |s| (&s.path, &s.table))?;
            let import = ImportTemplates::render(&self.imports.service, &instance_name, path.stem());
            bindings.services.push(ServiceBinding {
                table: table.to_string(),
                model_class: class_name,
                class_name: service_class,
                instance_name,
                path: path.clone(),
                import,
            });
        }

        let route_files = manifest.files(ArtifactCategory::Routes);
        for &group in groups {
            let path = resolve_route(route_files, group).ok_or_else(|| PlanError::Unresolved {
                category: ArtifactCategory::Routes,
                kind: "endpoint group",
                name: group.to_string(),
            })?;
            bindings.routes.push(RouteBinding {
                group: group.to_string(),
                path: path.clone(),
            });
        }

        Ok(bindings)
    }
}

/// First file whose normalized stem equals one of `keys`, tried in key order
fn resolve_unique<'a>(files: &'a [ArtifactPath], keys: &[String]) -> Option<&'a ArtifactPath> {
    keys.iter()
        .find_map(|key| files.iter().find(|f| normalize(f.stem()) == *key))
}

fn claim<T>(
    existing: &[T],
    category: ArtifactCategory,
    path: &ArtifactPath,
    table: &str,
    key: impl Fn(&T) -> (&ArtifactPath, &String),
) -> Result<(), PlanError> {
    match existing.iter().map(key).find(|(p, _)| *p == path) {
        Some((_, other)) => Err(PlanError::Ambiguous {
            category,
            path: path.clone(),
            first: other.clone(),
            second: table.to_string(),
        }),
        None => Ok(()),
    }
}

/// Best route file for an endpoint group
///
/// Exact stem match beats `<group>routes`/`<group>router`, which beats a
/// plain prefix match. A manifest with a single route file serves every
/// group.
fn resolve_route<'a>(files: &'a [ArtifactPath], group: &str) -> Option<&'a ArtifactPath> {
    let full = normalize(group);
    let singular = normalize(&singularize(group));
    let score = |file: &ArtifactPath| -> u8 {
        let stem = normalize(file.stem());
        if stem == full || stem == singular {
            3
        } else if ["routes", "route", "router", "controller"]
            .iter()
            .any(|s| stem == format!("{full}{s}") || stem == format!("{singular}{s}"))
        {
            2
        } else if !singular.is_empty() && stem.starts_with(&singular) {
            1
        } else {
            0
        }
    };

    let best = files
        .iter()
        .map(|f| (score(f), f))
        .filter(|(s, _)| *s > 0)
        .fold(None::<(u8, &ArtifactPath)>, |acc, cur| match acc {
            Some(prev) if prev.0 >= cur.0 => Some(prev),
            _ => Some(cur),
        })
        .map(|(_, f)| f);

    best.or_else(|| match files {
        [only] => Some(only),
        _ => None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::plan::tests::blog_plan;
    use pretty_assertions::assert_eq;

    #[test]
    fn binds_blog_tables() {
        let plan = blog_plan();
        let bindings = plan.bind(&["users", "posts"], &["Posts"]).unwrap();

        let user = bindings.model_for("users").unwrap();
        assert_eq!(user.class_name, "User");
        assert_eq!(user.path.to_string(), "src/models/user.js");
        assert_eq!(user.import, "const User = require('../models/user');");

        let post_service = bindings.service_for("posts").unwrap();
        assert_eq!(post_service.class_name, "PostService");
        assert_eq!(post_service.instance_name, "postService");
        assert_eq!(post_service.path.to_string(), "src/services/postService.js");
        assert_eq!(
            post_service.import,
            "const postService = require('../services/postService');"
        );

        assert_eq!(bindings.routes.len(), 1);
        assert_eq!(bindings.routes[0].path.to_string(), "src/routes/posts.js");
    }

    #[test]
    fn alternative_service_spellings_resolve() {
        let mut plan = blog_plan();
        plan.file_structure.services = vec![
            ArtifactPath::parse("src/services/user.service.js").unwrap(),
            ArtifactPath::parse("src/services/posts_service.js").unwrap(),
        ];
        let bindings = plan.bind(&["users", "posts"], &[]).unwrap();
        assert_eq!(
            bindings.service_for("users").unwrap().path.to_string(),
            "src/services/user.service.js"
        );
        assert_eq!(
            bindings.service_for("posts").unwrap().path.to_string(),
            "src/services/posts_service.js"
        );
    }

    #[test]
    fn count_mismatch_rejected() {
        let plan = blog_plan();
        let err = plan.bind(&["users", "posts", "comments"], &[]).unwrap_err();
        assert_eq!(
            err,
            PlanError::CountMismatch {
                category: ArtifactCategory::Models,
                expected: 3,
                actual: 2
            }
        );
    }

    #[test]
    fn unknown_table_unresolved() {
        let plan = blog_plan();
        let err = plan.bind(&["users", "comments"], &[]).unwrap_err();
        assert!(matches!(
            err,
            PlanError::Unresolved { category: ArtifactCategory::Models, .. }
        ));
    }

    #[test]
    fn same_file_for_two_tables_is_ambiguous() {
        let plan = blog_plan();
        let err = plan.bind(&["users", "user"], &[]).unwrap_err();
        assert!(matches!(err, PlanError::Ambiguous { .. }));
    }

    #[test]
    fn route_resolution_prefers_closest_stem() {
        let files: Vec<ArtifactPath> = ["src/routes/postComments.js", "src/routes/postRoutes.js"]
            .iter()
            .map(|p| ArtifactPath::parse(p).unwrap())
            .collect();
        assert_eq!(
            resolve_route(&files, "Posts").unwrap().to_string(),
            "src/routes/postRoutes.js"
        );
        assert_eq!(
            resolve_route(&files, "Post Comments").unwrap().to_string(),
            "src/routes/postComments.js"
        );
        assert!(resolve_route(&files, "Users").is_none());
    }

    #[test]
    fn single_route_file_serves_all_groups() {
        let files = vec![ArtifactPath::parse("src/routes/index.js").unwrap()];
        assert_eq!(resolve_route(&files, "Users").unwrap(), &files[0]);
    }
}
