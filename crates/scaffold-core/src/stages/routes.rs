//! Routes stage: HTTP endpoints over the generated services

use crate::error::{StageError, StageId};
use crate::stages::{
    bundle_block, manifest_lines, middleware_imports, options_block, plan_block, ArtifactStage,
    StageInput,
};
use crate::types::Endpoint;
use scaffold_artifact::{ArtifactBundle, ArtifactCategory};
use regex::Regex;

pub(crate) struct RoutesStage;

const CATEGORIES: &[ArtifactCategory] = &[ArtifactCategory::Routes];

const INSTRUCTIONS: &str = "You generate the route files of a backend project, following a naming plan you must not deviate from.

- Each routes file implements every endpoint of the groups assigned to it, with exactly the declared method and path, and nothing else.
- Put a comment of the form `// METHOD /path` directly above each handler, using the full declared path.
- Handlers delegate to the service instances, imported with the exact statements given, translate service errors into HTTP status codes and never touch models directly.
- Each file exports its router.";

impl ArtifactStage for RoutesStage {
    fn id(&self) -> StageId {
        StageId::Routes
    }

    fn categories(&self) -> &'static [ArtifactCategory] {
        CATEGORIES
    }

    fn instructions(&self) -> &'static str {
        INSTRUCTIONS
    }

    fn user_prompt(&self, input: &StageInput<'_>) -> String {
        let services = input
            .bindings
            .services
            .iter()
            .map(|s| format!("- `{}` from {}: {}", s.instance_name, s.path, s.import))
            .collect::<Vec<_>>()
            .join("\n");
        let assignments = input
            .bindings
            .routes
            .iter()
            .map(|r| {
                let endpoints = input
                    .spec
                    .endpoints
                    .iter()
                    .filter(|g| g.name == r.group)
                    .flat_map(|g| &g.endpoints)
                    .map(|e| format!("  {} {}", e.method(), e.path))
                    .collect::<Vec<_>>()
                    .join("\n");
                format!("- {}: group {}\n{endpoints}", r.path, r.group)
            })
            .collect::<Vec<_>>()
            .join("\n");
        let generated = input
            .output_of(StageId::Services)
            .map_or_else(|| "(none)".to_string(), bundle_block);

        let mut sections = vec![
            format!("{}\n\nEndpoints:\n{}", input.context.overview, input.context.endpoints),
            format!("## Options\n{}", options_block(input.options)),
            format!("## Naming plan\n{}", plan_block(input.plan)),
            format!("## Your files\n{}", manifest_lines(input.plan, CATEGORIES)),
            format!("## Assignments\n{assignments}"),
            format!("## Service instances\n{services}"),
            format!("## Generated services\n{generated}"),
        ];
        let middleware = middleware_imports(input.plan);
        if !middleware.is_empty() {
            sections.push(format!(
                "## Middleware imports\nImport middleware with exactly:\n{}",
                middleware.join("\n")
            ));
        }
        if input.options.include_auth {
            sections.push(
                "## Authentication\nProtect every POST, PUT, PATCH and DELETE handler with the authentication middleware from the plan."
                    .to_string(),
            );
        }
        sections.join("\n\n")
    }

    fn check(&self, input: &StageInput<'_>, bundle: &ArtifactBundle) -> Result<(), StageError> {
        for (group, endpoint) in input.spec.all_endpoints() {
            let content = input
                .bindings
                .routes
                .iter()
                .find(|r| r.group == group.name)
                .and_then(|r| bundle.get(&r.path))
                .map(|f| f.content());
            if !content.is_some_and(|c| mentions_endpoint(c, endpoint)) {
                return Err(StageError::MissingEndpoint {
                    method: endpoint.method(),
                    path: endpoint.path.clone(),
                });
            }
        }
        Ok(())
    }
}

/// `GET /posts` annotation, or a `.get('/posts'` style call, with the path
/// ending where the declared one does
fn mentions_endpoint(content: &str, endpoint: &Endpoint) -> bool {
    let method = regex::escape(&endpoint.method());
    let path = regex::escape(endpoint.path.trim());
    let annotation = format!(r"(?m)(?:^|[^A-Za-z]){method}[ \t]+{path}(?:$|[^\w/:.-])");
    let call = format!(
        r#"(?i)\.{method}\s*\(\s*(?:'{path}'|"{path}"|`{path}`)"#,
        method = method.to_ascii_lowercase()
    );
    [annotation, call]
        .iter()
        .any(|pattern| Regex::new(pattern).is_ok_and(|re| re.is_match(content)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stages::tests::{blog_spec, file, with_input, with_spec_input};
    use scaffold_naming::ValidationError;

    const IMPORT: &str = "const postService = require('../services/postService');";

    #[test]
    fn accepts_annotated_routes() {
        let bundle = ArtifactBundle::new(vec![file(
            "src/routes/posts.js",
            &format!("{IMPORT}\n// GET /posts\nrouter.get('/', list);\n// POST /posts\nrouter.post('/', create);"),
        )]);
        with_input(&[], |input| assert!(RoutesStage.accept(input, &bundle).is_ok()));
    }

    #[test]
    fn accepts_full_paths_without_annotations() {
        let bundle = ArtifactBundle::new(vec![file(
            "src/routes/posts.js",
            &format!("{IMPORT}\nrouter.get('/posts', list);\nrouter.post('/posts', create);"),
        )]);
        with_input(&[], |input| assert!(RoutesStage.accept(input, &bundle).is_ok()));
    }

    #[test]
    fn missing_endpoint_rejected() {
        let bundle = ArtifactBundle::new(vec![file(
            "src/routes/posts.js",
            &format!("{IMPORT}\n// GET /posts\nrouter.get('/', list);"),
        )]);
        with_input(&[], |input| {
            let err = RoutesStage.accept(input, &bundle).unwrap_err();
            assert_eq!(err.to_string(), "routes never mention POST /posts");
        });
    }

    #[test]
    fn longer_path_does_not_stand_in_for_its_prefix() {
        let mut spec = blog_spec();
        spec.endpoints[0].endpoints = vec![
            Endpoint::new("GET", "/posts", "List posts"),
            Endpoint::new("GET", "/posts/:id", "Show a post"),
        ];
        let bundle = ArtifactBundle::new(vec![file(
            "src/routes/posts.js",
            &format!("{IMPORT}\n// GET /posts/:id\nrouter.get('/:id', show);"),
        )]);
        with_spec_input(&spec, &[], |input| {
            let err = RoutesStage.accept(input, &bundle).unwrap_err();
            assert_eq!(err.to_string(), "routes never mention GET /posts");
        });
    }

    #[test]
    fn endpoint_mentions_respect_path_boundaries() {
        let list = Endpoint::new("GET", "/posts", "");
        assert!(mentions_endpoint("// GET /posts\n", &list));
        assert!(mentions_endpoint("// GET /posts - list all", &list));
        assert!(mentions_endpoint("router.get( \"/posts\", list)", &list));
        assert!(!mentions_endpoint("// GET /posts/:id", &list));
        assert!(!mentions_endpoint("// GET /postsearch", &list));
        assert!(!mentions_endpoint("router.get('/posts/:id', show)", &list));
        assert!(!mentions_endpoint("router.get('/:id', show); // /posts", &list));
        assert!(!mentions_endpoint("// POST /posts", &list));

        let show = Endpoint::new("get", "/posts/:id", "");
        assert!(mentions_endpoint("app.get('/posts/:id', show)", &show));
    }

    #[test]
    fn renamed_service_import_rejected() {
        let bundle = ArtifactBundle::new(vec![file(
            "src/routes/posts.js",
            "const PostService = require('../services/postService');\n// GET /posts\n// POST /posts",
        )]);
        with_input(&[], |input| {
            assert!(matches!(
                RoutesStage.accept(input, &bundle),
                Err(StageError::Validation(ValidationError::ImportMismatch { .. }))
            ));
        });
    }

    #[test]
    fn prompt_assigns_endpoints() {
        with_input(&[], |input| {
            let prompt = RoutesStage.user_prompt(input);
            assert!(prompt.contains("- src/routes/posts.js: group Posts\n  GET /posts\n  POST /posts"));
            assert!(prompt.contains(&format!("- `postService` from src/services/postService.js: {IMPORT}")));
        });
    }
}
