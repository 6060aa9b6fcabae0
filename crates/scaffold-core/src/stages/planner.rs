//! Planning stage: commit to one naming plan
//!
//! The only stage whose output is not a file bundle. There is no fallback
//! plan: if this stage fails, the run fails.

use crate::config::GenerationOptions;
use crate::context::ProjectContext;
use crate::error::StageError;
use crate::stages::options_block;
use crate::types::ProjectSpec;
use scaffold_naming::{Bindings, NamingPlan};
use scaffold_recovery::RecoveryEngine;

pub(crate) const SYSTEM: &str = r#"You are the naming authority for a generated backend project. Every later generation step copies your decisions verbatim, so be explicit and consistent.

Decide, once:
- a casing convention for model class names, table names and file names per category (one of "PascalCase", "camelCase", "snake_case", "kebab-case"), and a suffix that turns a model name into a service name;
- the complete list of files the project will contain, grouped into models, services, routes, config and middleware. List exactly one model file and one service file per table, each named after its table, and one routes file per endpoint group. List the application entry point and the file exporting the shared database connection under config;
- literal import statements: the exact statement every model uses to import the shared database connection, and templates for importing a model and a service where {name} is the imported symbol and {module} is the file name without extension.

Respond with one JSON object and nothing else, in exactly this shape:
{
  "project_slug": "kebab-case-name",
  "base_dir": "src",
  "entry_point": "src/app.js",
  "database_file": "src/config/database.js",
  "database_export": "sequelize",
  "conventions": {
    "model_name": "PascalCase",
    "table_name": "snake_case",
    "file_name": "camelCase",
    "service_suffix": "Service",
    "file_naming": {"models": "camelCase", "services": "camelCase", "routes": "camelCase", "config": "camelCase", "middleware": "camelCase"}
  },
  "file_structure": {
    "models": ["src/models/user.js"],
    "services": ["src/services/userService.js"],
    "routes": ["src/routes/users.js"],
    "config": ["src/config/database.js", "src/app.js"],
    "middleware": ["src/middleware/errorHandler.js"]
  },
  "imports": {
    "database": "const sequelize = require('../config/database');",
    "model": "const {name} = require('../models/{module}');",
    "service": "const {name} = require('../services/{module}');"
  }
}

All paths are relative, use forward slashes and live under base_dir. The database import must name database_export."#;

/// Context for the planner call
pub(crate) fn user_prompt(
    spec: &ProjectSpec,
    context: &ProjectContext,
    options: &GenerationOptions,
) -> String {
    let mut sections = vec![
        context.render(),
        format!("## Options\n{}", options_block(options)),
        format!(
            "## Required files\nTables ({}): {}\nEndpoint groups ({}): {}\nUse the .{} extension for every source file.",
            spec.tables.len(),
            spec.table_names().join(", "),
            spec.endpoints.len(),
            if spec.endpoints.is_empty() {
                "none".to_string()
            } else {
                spec.group_names().join(", ")
            },
            options.language.extension(),
        ),
    ];
    if options.include_auth {
        sections.push(
            "## Authentication\nList an authentication middleware file under middleware and a JWT secret loader under config."
                .to_string(),
        );
    }
    if options.include_tests {
        sections.push(
            "## Tests\nThe entry point must export the application object without starting the server when required by a test runner."
                .to_string(),
        );
    }
    sections.join("\n\n")
}

/// Parse the planner output and bind it to the project spec
pub(crate) fn accept(
    engine: &RecoveryEngine,
    raw: &str,
    spec: &ProjectSpec,
) -> Result<(NamingPlan, Bindings), StageError> {
    let plan: NamingPlan = engine.parse(raw)?;
    plan.validate()?;
    let bindings = plan.bind(&spec.table_names(), &spec.group_names())?;
    Ok((plan, bindings))
}
