//! Final assembly: dependency list and setup instructions
//!
//! Both are derived from static templates, the storage engine choice and
//! the plan's manifest. No model call is involved.

use crate::config::{GenerationOptions, Language};
use crate::types::{ProjectSpec, StorageEngine};
use indexmap::IndexSet;
use scaffold_artifact::ArtifactCategory;
use scaffold_naming::NamingPlan;

const BASELINE: [&str; 2] = ["dotenv", "cors"];
const TYPESCRIPT: [&str; 3] = ["typescript", "ts-node", "@types/node"];
const AUTH: [&str; 2] = ["jsonwebtoken", "bcryptjs"];
const TESTS: [&str; 2] = ["jest", "supertest"];

/// Flat, ordered, duplicate-free package list
///
/// Framework first, then storage drivers, language support and the
/// optional auth / test packages.
#[must_use]
pub fn dependencies(storage: StorageEngine, options: &GenerationOptions) -> Vec<String> {
    let mut packages: IndexSet<String> = IndexSet::new();
    packages.insert(options.framework_package());
    packages.extend(storage.driver_packages().iter().map(|p| (*p).to_string()));
    packages.extend(BASELINE.iter().map(|p| (*p).to_string()));
    if options.language == Language::Typescript {
        packages.extend(TYPESCRIPT.iter().map(|p| (*p).to_string()));
    }
    if options.include_auth {
        packages.extend(AUTH.iter().map(|p| (*p).to_string()));
    }
    if options.include_tests {
        packages.extend(TESTS.iter().map(|p| (*p).to_string()));
    }
    packages.into_iter().collect()
}

/// Markdown setup guide for the generated project
#[must_use]
pub fn instructions(spec: &ProjectSpec, plan: &NamingPlan, options: &GenerationOptions) -> String {
    let packages = dependencies(spec.storage, options);
    let mut sections = vec![format!("# {}", spec.name.trim())];
    let description = spec.description.trim();
    if !description.is_empty() {
        sections.push(description.to_string());
    }

    sections.push(format!(
        "## Install\n\n```bash\nnpm init -y\nnpm install {}\n```",
        packages.join(" ")
    ));
    sections.push(format!("## Storage\n\n{}", storage_notes(spec.storage)));

    let mut env = vec![
        "PORT=3000".to_string(),
        format!("DATABASE_URL={}", spec.storage.database_url_example()),
    ];
    if options.include_auth {
        env.push("JWT_SECRET=change-me".to_string());
    }
    sections.push(format!(
        "## Environment\n\nCreate a `.env` file in the project root:\n\n```\n{}\n```",
        env.join("\n")
    ));

    let mut structure = vec!["## File structure".to_string()];
    for category in ArtifactCategory::ALL {
        let files = plan.file_structure.files(category);
        if files.is_empty() {
            continue;
        }
        let list = files.iter().map(|f| format!("- `{f}`")).collect::<Vec<_>>();
        structure.push(format!("### {category}\n\n{}", list.join("\n")));
    }
    sections.push(structure.join("\n\n"));

    let run = match options.language {
        Language::Javascript => format!("node {}", plan.entry_point),
        Language::Typescript => format!("npx ts-node {}", plan.entry_point),
    };
    sections.push(format!("## Run\n\n```bash\n{run}\n```"));

    if options.include_tests {
        sections.push("## Test\n\n```bash\nnpx jest\n```".to_string());
    }

    let mut text = sections.join("\n\n");
    text.push('\n');
    text
}

fn storage_notes(storage: StorageEngine) -> String {
    match storage {
        StorageEngine::Sqlite => format!(
            "{} stores data in a local file; no server is needed. Models use {}.",
            storage.display_name(),
            storage.data_library()
        ),
        _ => format!(
            "Start a {} server and create a database for the project, then point `DATABASE_URL` at it. Models use {}.",
            storage.display_name(),
            storage.data_library()
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stages::tests::{blog_plan, blog_spec};
    use pretty_assertions::assert_eq;

    #[test]
    fn postgres_javascript_baseline() {
        assert_eq!(
            dependencies(StorageEngine::Postgres, &GenerationOptions::default()),
            ["express", "sequelize", "pg", "pg-hstore", "dotenv", "cors"]
        );
    }

    #[test]
    fn toggles_append_in_order() {
        let options = GenerationOptions::default()
            .with_language(Language::Typescript)
            .with_auth(true)
            .with_tests(true);
        assert_eq!(
            dependencies(StorageEngine::Mongodb, &options),
            [
                "express",
                "mongoose",
                "dotenv",
                "cors",
                "typescript",
                "ts-node",
                "@types/node",
                "jsonwebtoken",
                "bcryptjs",
                "jest",
                "supertest"
            ]
        );
    }

    #[test]
    fn duplicates_collapse() {
        let options = GenerationOptions::default().with_framework("cors");
        let deps = dependencies(StorageEngine::Sqlite, &options);
        assert_eq!(deps, ["cors", "sequelize", "sqlite3", "dotenv"]);
    }

    #[test]
    fn instructions_cover_setup() {
        let options = GenerationOptions::default().with_auth(true);
        let text = instructions(&blog_spec(), &blog_plan(), &options);
        assert!(text.starts_with("# Blog API\n"));
        assert!(text.contains("npm install express sequelize pg pg-hstore dotenv cors jsonwebtoken bcryptjs"));
        assert!(text.contains("DATABASE_URL=postgres://"));
        assert!(text.contains("JWT_SECRET=change-me"));
        assert!(text.contains("### models\n\n- `src/models/user.js`\n- `src/models/post.js`"));
        assert!(text.contains("node src/app.js"));
        assert!(!text.contains("## Test"));
    }

    #[test]
    fn typescript_run_and_tests() {
        let options = GenerationOptions::default()
            .with_language(Language::Typescript)
            .with_tests(true);
        let text = instructions(&blog_spec(), &blog_plan(), &options);
        assert!(text.contains("npx ts-node src/app.js"));
        assert!(text.contains("## Test\n\n```bash\nnpx jest\n```"));
        assert!(!text.contains("JWT_SECRET"));
    }
}
