//! Context serializer
//!
//! Turns a [`ProjectSpec`] into the text blocks embedded in every stage
//! prompt. Pure and order-preserving: the same spec always yields
//! byte-identical text, so the model is the only source of variation
//! between runs.

use crate::types::{EndpointGroup, Field, ProjectSpec, Table};
use serde::Serialize;

/// Rendered when a spec declares no endpoint groups
pub const NO_ENDPOINTS: &str = "(no endpoints declared)";

/// Serialized project description
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProjectContext {
    /// Name, description and storage engine
    pub overview: String,
    /// One line per table
    pub tables: String,
    /// One block per endpoint group
    pub endpoints: String,
}

impl ProjectContext {
    /// Serialize a spec
    #[must_use]
    pub fn from_spec(spec: &ProjectSpec) -> Self {
        Self {
            overview: overview(spec),
            tables: spec.tables.iter().map(table_line).collect::<Vec<_>>().join("\n"),
            endpoints: endpoints_text(&spec.endpoints),
        }
    }

    /// All three blocks under headings
    #[must_use]
    pub fn render(&self) -> String {
        format!(
            "{}\n\nTables:\n{}\n\nEndpoints:\n{}",
            self.overview, self.tables, self.endpoints
        )
    }
}

fn overview(spec: &ProjectSpec) -> String {
    let mut lines = vec![format!("Project: {}", spec.name.trim())];
    let description = spec.description.trim();
    if !description.is_empty() {
        lines.push(format!("Description: {description}"));
    }
    lines.push(format!(
        "Storage engine: {} (via {})",
        spec.storage.display_name(),
        spec.storage.data_library()
    ));
    lines.join("\n")
}

fn table_line(table: &Table) -> String {
    let fields = table.fields.iter().map(field_text).collect::<Vec<_>>().join(", ");
    format!("- {}: {fields}", table.name.trim())
}

fn field_text(field: &Field) -> String {
    let mut parts = vec![field.field_type.as_str().to_string()];
    if field.flags.primary {
        parts.push("primary".to_string());
    }
    if field.flags.unique {
        parts.push("unique".to_string());
    }
    if field.flags.required {
        parts.push("required".to_string());
    }
    if field.flags.foreign {
        parts.push(match &field.references {
            Some(target) => format!("foreign -> {}", target.trim()),
            None => "foreign".to_string(),
        });
    }
    format!("{} ({})", field.name.trim(), parts.join(", "))
}

fn endpoints_text(groups: &[EndpointGroup]) -> String {
    if groups.is_empty() {
        return NO_ENDPOINTS.to_string();
    }
    let mut lines = Vec::new();
    for group in groups {
        lines.push(format!("- {}", group.name.trim()));
        for endpoint in &group.endpoints {
            let description = endpoint.description.trim();
            if description.is_empty() {
                lines.push(format!("  {} {}", endpoint.method(), endpoint.path));
            } else {
                lines.push(format!("  {} {}: {description}", endpoint.method(), endpoint.path));
            }
        }
    }
    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Endpoint, FieldType, StorageEngine};
    use pretty_assertions::assert_eq;

    fn spec() -> ProjectSpec {
        ProjectSpec {
            name: "Blog API".to_string(),
            description: "A small blog".to_string(),
            tables: vec![
                Table {
                    name: "users".to_string(),
                    fields: vec![
                        Field::new("id", FieldType::Integer).primary(),
                        Field::new("email", FieldType::String).unique().required(),
                    ],
                },
                Table {
                    name: "posts".to_string(),
                    fields: vec![
                        Field::new("id", FieldType::Integer).primary(),
                        Field::new("user_id", FieldType::Integer).foreign("users.id"),
                    ],
                },
            ],
            endpoints: vec![EndpointGroup {
                name: "Posts".to_string(),
                endpoints: vec![
                    Endpoint::new("get", "/posts", "List posts"),
                    Endpoint::new("POST", "/posts", ""),
                ],
            }],
            storage: StorageEngine::Postgres,
        }
    }

    #[test]
    fn renders_tables_in_order() {
        let context = ProjectContext::from_spec(&spec());
        assert_eq!(
            context.tables,
            "- users: id (integer, primary), email (string, unique, required)\n\
             - posts: id (integer, primary), user_id (integer, foreign -> users.id)"
        );
    }

    #[test]
    fn renders_endpoint_blocks() {
        let context = ProjectContext::from_spec(&spec());
        assert_eq!(context.endpoints, "- Posts\n  GET /posts: List posts\n  POST /posts");
    }

    #[test]
    fn empty_endpoint_list() {
        let mut spec = spec();
        spec.endpoints.clear();
        assert_eq!(ProjectContext::from_spec(&spec).endpoints, NO_ENDPOINTS);
    }

    #[test]
    fn overview_names_engine() {
        let context = ProjectContext::from_spec(&spec());
        assert_eq!(
            context.overview,
            "Project: Blog API\nDescription: A small blog\nStorage engine: PostgreSQL (via Sequelize)"
        );
        assert!(context.render().contains("\n\nTables:\n- users"));
    }
}
