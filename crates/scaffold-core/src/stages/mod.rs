//! Generation stages
//!
//! The planner produces the [`NamingPlan`]; the four artifact stages each
//! produce one [`ArtifactBundle`]. Artifact stages share one contract:
//! their prompt embeds the plan, the names derived from it and the literal
//! output of the stages they depend on, and their output is accepted only
//! if it covers exactly their manifest categories with consistent imports.

pub(crate) mod models;
pub(crate) mod planner;
pub(crate) mod routes;
pub(crate) mod services;
pub(crate) mod shared;

use crate::config::GenerationOptions;
use crate::context::ProjectContext;
use crate::error::{StageError, StageId};
use crate::result::StageOutput;
use crate::types::ProjectSpec;
use scaffold_artifact::{ArtifactBundle, ArtifactCategory};
use scaffold_naming::{
    Bindings, CasingRule, ImportTemplates, ImportValidator, ManifestValidator, NamingPlan,
};

/// Output contract appended to every artifact stage's instructions
pub(crate) const BUNDLE_CONTRACT: &str = r#"Respond with one JSON object and nothing else, in exactly this shape:
{"files": [{"path": "<path from your file list>", "content": "<complete file content>", "description": "<one line>"}]}

Rules:
- Emit every file in your file list exactly once, using the path verbatim. Emit no other files.
- Every file is complete and self-contained. Never emit partial diffs, ellipses or placeholders.
- Copy the import statements you are given character for character. Never rename an imported symbol or rewrite a module path.
- Use only the class, instance and file names you are given. Never derive a name yourself.
- Escape newlines, tabs and double quotes inside JSON strings."#;

/// Everything an artifact stage sees
pub(crate) struct StageInput<'a> {
    pub(crate) spec: &'a ProjectSpec,
    pub(crate) context: &'a ProjectContext,
    pub(crate) options: &'a GenerationOptions,
    pub(crate) plan: &'a NamingPlan,
    pub(crate) bindings: &'a Bindings,
    /// Bundles of the stages that already ran, in order
    pub(crate) outputs: &'a [StageOutput],
}

impl StageInput<'_> {
    /// Bundle a prior stage produced
    pub(crate) fn output_of(&self, stage: StageId) -> Option<&ArtifactBundle> {
        self.outputs
            .iter()
            .find(|o| o.stage == stage)
            .map(|o| &o.bundle)
    }
}

/// One artifact-producing stage
pub(crate) trait ArtifactStage: Send + Sync {
    fn id(&self) -> StageId;

    /// Manifest categories this stage owns
    fn categories(&self) -> &'static [ArtifactCategory];

    /// Stage-specific instructions, without the output contract
    fn instructions(&self) -> &'static str;

    fn user_prompt(&self, input: &StageInput<'_>) -> String;

    /// Stage-specific acceptance on top of the manifest and import checks
    fn check(&self, input: &StageInput<'_>, bundle: &ArtifactBundle) -> Result<(), StageError>;

    /// Full instruction text sent as the system message
    fn system_prompt(&self) -> String {
        format!("{}\n\n{BUNDLE_CONTRACT}", self.instructions())
    }

    /// Naming propagation, import consistency, then stage rules
    fn accept(&self, input: &StageInput<'_>, bundle: &ArtifactBundle) -> Result<(), StageError> {
        ManifestValidator::new(&input.plan.file_structure).check_bundle(self.categories(), bundle)?;
        canonical_imports(input.plan, input.bindings).check_bundle(bundle)?;
        self.check(input, bundle)
    }
}

/// The four artifact stages in execution order
pub(crate) fn artifact_stages() -> [&'static dyn ArtifactStage; 4] {
    [
        &shared::SharedStage,
        &models::ModelsStage,
        &services::ServicesStage,
        &routes::RoutesStage,
    ]
}

/// Every statement a generated file must reuse verbatim
pub(crate) fn canonical_imports(plan: &NamingPlan, bindings: &Bindings) -> ImportValidator {
    let validator = ImportValidator::new().with_statement(&plan.imports.database);
    let validator = bindings
        .models
        .iter()
        .fold(validator, |v, m| v.with_statement(&m.import));
    let validator = bindings
        .services
        .iter()
        .fold(validator, |v, s| v.with_statement(&s.import));
    middleware_imports(plan)
        .iter()
        .fold(validator, |v, statement| v.with_statement(statement))
}

/// Middleware imports rendered from the plan's optional template
///
/// The symbol is the camelCase file stem, the module the stem itself.
pub(crate) fn middleware_imports(plan: &NamingPlan) -> Vec<String> {
    let Some(template) = &plan.imports.middleware else {
        return Vec::new();
    };
    plan.file_structure
        .files(ArtifactCategory::Middleware)
        .iter()
        .map(|path| {
            let stem = path.stem();
            ImportTemplates::render(template, &CasingRule::Camel.apply(stem), stem)
        })
        .collect()
}

/// Declared file-name casing of some categories, if the plan has any
pub(crate) fn file_naming_lines(plan: &NamingPlan, categories: &[ArtifactCategory]) -> Option<String> {
    let lines: Vec<String> = categories
        .iter()
        .filter_map(|c| plan.file_casing(*c).map(|rule| format!("- {c}: {rule}")))
        .collect();
    (!lines.is_empty()).then(|| lines.join("\n"))
}

/// Plan as pretty JSON for embedding in prompts
pub(crate) fn plan_block(plan: &NamingPlan) -> String {
    serde_json::to_string_pretty(plan).unwrap_or_else(|_| format!("{plan:?}"))
}

/// Literal files of a prior stage
pub(crate) fn bundle_block(bundle: &ArtifactBundle) -> String {
    bundle
        .files()
        .iter()
        .map(|f| format!("--- {} ---\n{}", f.path(), f.content().trim_end()))
        .collect::<Vec<_>>()
        .join("\n\n")
}

/// Framework, language and toggles
pub(crate) fn options_block(options: &GenerationOptions) -> String {
    let yes_no = |b: bool| if b { "yes" } else { "no" };
    format!(
        "Framework: {}\nLanguage: {} (.{} files)\nAuthentication: {}\nTests: {}",
        options.framework_package(),
        options.language,
        options.language.extension(),
        yes_no(options.include_auth),
        yes_no(options.include_tests),
    )
}

/// Manifest entries of some categories, one per line
pub(crate) fn manifest_lines(plan: &NamingPlan, categories: &[ArtifactCategory]) -> String {
    categories
        .iter()
        .flat_map(|c| plan.file_structure.files(*c).iter().map(move |p| format!("- {p} ({c})")))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Canonical import lines for models and services
pub(crate) fn import_lines(bindings: &Bindings) -> String {
    let models = bindings
        .models
        .iter()
        .map(|m| format!("- model {}: {}", m.class_name, m.import));
    let services = bindings
        .services
        .iter()
        .map(|s| format!("- service {}: {}", s.instance_name, s.import));
    models.chain(services).collect::<Vec<_>>().join("\n")
}
