//! Models stage: one data model per table

use crate::error::{StageError, StageId};
use crate::stages::{manifest_lines, options_block, plan_block, ArtifactStage, StageInput};
use scaffold_artifact::{ArtifactBundle, ArtifactCategory};
use scaffold_naming::{require_statement, require_symbol};

pub(crate) struct ModelsStage;

const CATEGORIES: &[ArtifactCategory] = &[ArtifactCategory::Models];

const INSTRUCTIONS: &str = "You generate the data model files of a backend project, following a naming plan you must not deviate from.

- One file per table. Each file defines and exports exactly the model class it is assigned, with every field of its table, the declared types and constraints.
- Each file imports the shared database connection with the exact statement given, and uses that connection to define the model.
- Express foreign keys as associations or references to the target model's class name.";

impl ArtifactStage for ModelsStage {
    fn id(&self) -> StageId {
        StageId::Models
    }

    fn categories(&self) -> &'static [ArtifactCategory] {
        CATEGORIES
    }

    fn instructions(&self) -> &'static str {
        INSTRUCTIONS
    }

    fn user_prompt(&self, input: &StageInput<'_>) -> String {
        let assignments = input
            .bindings
            .models
            .iter()
            .map(|m| format!("- {}: table `{}`, class `{}`", m.path, m.table, m.class_name))
            .collect::<Vec<_>>()
            .join("\n");
        let library = input.spec.storage.data_library();

        [
            format!("{}\n\nTables:\n{}", input.context.overview, input.context.tables),
            format!("## Options\n{}\nData library: {library}", options_block(input.options)),
            format!("## Naming plan\n{}", plan_block(input.plan)),
            format!("## Your files\n{}", manifest_lines(input.plan, CATEGORIES)),
            format!("## Assignments\n{assignments}"),
            format!(
                "## Database import\nEvery model file contains this line verbatim:\n{}",
                input.plan.imports.database
            ),
        ]
        .join("\n\n")
    }

    fn check(&self, input: &StageInput<'_>, bundle: &ArtifactBundle) -> Result<(), StageError> {
        for model in &input.bindings.models {
            if let Some(file) = bundle.get(&model.path) {
                require_statement(file, &input.plan.imports.database)?;
                require_symbol(file, &model.class_name)?;
            }
        }
        Ok(())
    }
}
