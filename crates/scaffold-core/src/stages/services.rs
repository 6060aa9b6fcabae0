//! Services stage: business logic over the generated models

use crate::error::{StageError, StageId};
use crate::stages::{
    bundle_block, manifest_lines, options_block, plan_block, ArtifactStage, StageInput,
};
use scaffold_artifact::{ArtifactBundle, ArtifactCategory};
use scaffold_naming::{require_statement, require_symbol};

pub(crate) struct ServicesStage;

const CATEGORIES: &[ArtifactCategory] = &[ArtifactCategory::Services];

const INSTRUCTIONS: &str = "You generate the service layer of a backend project, following a naming plan you must not deviate from.

- One file per model. Each file imports its model with the exact statement given, defines the assigned service class with create, find-all, find-by-id, update and delete operations, and exports a single instance under the assigned instance name.
- Services contain no HTTP concerns. They throw errors with a status property for not-found and validation failures.
- Refer to the generated models exactly as they are written below.";

impl ArtifactStage for ServicesStage {
    fn id(&self) -> StageId {
        StageId::Services
    }

    fn categories(&self) -> &'static [ArtifactCategory] {
        CATEGORIES
    }

    fn instructions(&self) -> &'static str {
        INSTRUCTIONS
    }

    fn user_prompt(&self, input: &StageInput<'_>) -> String {
        let bindings = input.bindings;
        let assignments = bindings
            .services
            .iter()
            .map(|s| {
                let import = bindings
                    .model_for(&s.table)
                    .map_or("", |m| m.import.as_str());
                format!(
                    "- {}: class `{}`, exported instance `{}`, model `{}` imported with:\n  {import}",
                    s.path, s.class_name, s.instance_name, s.model_class
                )
            })
            .collect::<Vec<_>>()
            .join("\n");
        let models = input
            .output_of(StageId::Models)
            .map_or_else(|| "(none)".to_string(), bundle_block);

        [
            format!("{}\n\nTables:\n{}", input.context.overview, input.context.tables),
            format!("## Options\n{}", options_block(input.options)),
            format!("## Naming plan\n{}", plan_block(input.plan)),
            format!("## Your files\n{}", manifest_lines(input.plan, CATEGORIES)),
            format!("## Assignments\n{assignments}"),
            format!("## Generated models\n{models}"),
        ]
        .join("\n\n")
    }

    fn check(&self, input: &StageInput<'_>, bundle: &ArtifactBundle) -> Result<(), StageError> {
        for service in &input.bindings.services {
            let (Some(file), Some(model)) = (
                bundle.get(&service.path),
                input.bindings.model_for(&service.table),
            ) else {
                continue;
            };
            require_statement(file, &model.import)?;
            require_symbol(file, &service.class_name)?;
        }
        Ok(())
    }
}
