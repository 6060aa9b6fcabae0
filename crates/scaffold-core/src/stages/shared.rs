//! Shared stage: configuration, entry point and middleware

use crate::error::{StageError, StageId};
use crate::stages::{
    file_naming_lines, import_lines, manifest_lines, middleware_imports, options_block,
    plan_block, ArtifactStage, StageInput,
};
use scaffold_artifact::{ArtifactBundle, ArtifactCategory};
use scaffold_naming::require_symbol;

pub(crate) struct SharedStage;

const CATEGORIES: &[ArtifactCategory] = &[ArtifactCategory::Config, ArtifactCategory::Middleware];

const INSTRUCTIONS: &str = "You generate the shared configuration, application entry point and middleware of a backend project, following a naming plan you must not deviate from.

- The database file creates the single shared database connection from the DATABASE_URL environment variable and exports it under the plan's database_export name.
- The entry point loads environment variables, enables JSON bodies and CORS, mounts every routes file of the plan, installs the error-handling middleware last and listens on PORT.
- Middleware files are generic and reusable.";

impl ArtifactStage for SharedStage {
    fn id(&self) -> StageId {
        StageId::Shared
    }

    fn categories(&self) -> &'static [ArtifactCategory] {
        CATEGORIES
    }

    fn instructions(&self) -> &'static str {
        INSTRUCTIONS
    }

    fn user_prompt(&self, input: &StageInput<'_>) -> String {
        let plan = input.plan;
        let routes = input
            .bindings
            .routes
            .iter()
            .map(|r| format!("- {} serves endpoint group {}", r.path, r.group))
            .collect::<Vec<_>>();
        let routes = if routes.is_empty() {
            "(no routes files)".to_string()
        } else {
            routes.join("\n")
        };

        let mut sections = vec![
            input.context.render(),
            format!("## Options\n{}", options_block(input.options)),
            format!("## Naming plan\n{}", plan_block(plan)),
            format!("## Your files\n{}", manifest_lines(plan, CATEGORIES)),
            format!(
                "## Database connection\n{} must export `{}`. Every other file imports it with exactly:\n{}",
                plan.database_file, plan.database_export, plan.imports.database
            ),
            format!("## Entry point\n{} mounts these routes files:\n{routes}", plan.entry_point),
            format!(
                "## Canonical imports\nIf a middleware needs a model or service, import it with exactly these statements:\n{}",
                import_lines(input.bindings)
            ),
        ];
        let middleware = middleware_imports(plan);
        if !middleware.is_empty() {
            sections.push(format!(
                "## Middleware imports\nA file importing middleware through these module paths uses exactly:\n{}",
                middleware.join("\n")
            ));
        }
        if let Some(naming) = file_naming_lines(plan, CATEGORIES) {
            sections.push(format!("## File naming\n{naming}"));
        }
        if input.options.include_auth {
            sections.push(
                "## Authentication\nImplement JWT verification middleware reading JWT_SECRET; it rejects requests without a valid bearer token with 401."
                    .to_string(),
            );
        }
        if input.options.include_tests {
            sections.push(
                "## Tests\nExport the application object from the entry point and only call listen when the file is run directly."
                    .to_string(),
            );
        }
        sections.join("\n\n")
    }

    fn check(&self, input: &StageInput<'_>, bundle: &ArtifactBundle) -> Result<(), StageError> {
        if let Some(database) = bundle.get(&input.plan.database_file) {
            require_symbol(database, &input.plan.database_export)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stages::tests::{file, with_input};
    use scaffold_naming::ValidationError;

    fn bundle(database: &str) -> ArtifactBundle {
        ArtifactBundle::new(vec![
            file("src/config/database.js", database),
            file("src/app.js", "const express = require('express');\napp.use('/posts', require('./routes/posts'));"),
            file("src/middleware/errorHandler.js", "module.exports = (err, req, res, next) => {};"),
        ])
    }

    #[test]
    fn accepts_complete_bundle() {
        let ok = bundle("const sequelize = new Sequelize(process.env.DATABASE_URL);\nmodule.exports = sequelize;");
        with_input(&[], |input| assert!(SharedStage.accept(input, &ok).is_ok()));
    }

    #[test]
    fn database_file_must_export_connection() {
        let bad = bundle("const db = new Sequelize(process.env.DATABASE_URL);\nmodule.exports = db;");
        with_input(&[], |input| {
            let err = SharedStage.accept(input, &bad).unwrap_err();
            assert!(matches!(
                err,
                StageError::Validation(ValidationError::MissingSymbol { .. })
            ));
        });
    }

    #[test]
    fn missing_middleware_rejected() {
        let partial = ArtifactBundle::new(vec![
            file("src/config/database.js", "module.exports = sequelize;"),
            file("src/app.js", ""),
        ]);
        with_input(&[], |input| {
            assert!(matches!(
                SharedStage.accept(input, &partial),
                Err(StageError::Validation(ValidationError::MissingFiles { .. }))
            ));
        });
    }

    #[test]
    fn prompt_names_connection_and_routes() {
        with_input(&[], |input| {
            let prompt = SharedStage.user_prompt(input);
            assert!(prompt.contains("src/config/database.js must export `sequelize`"));
            assert!(prompt.contains("- src/routes/posts.js serves endpoint group Posts"));
            assert!(prompt.contains("- src/middleware/errorHandler.js (middleware)"));
        });
    }
}
