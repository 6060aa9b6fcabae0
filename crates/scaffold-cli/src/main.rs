//! `scaffold` binary

use anyhow::Context;
use clap::{value_parser, Arg, ArgAction, ArgMatches, Command};
use scaffold_cli::{init_tracing, Settings};
use scaffold_core::{GenerationOptions, Language};
use scaffold_llm::ChatClient;
use std::path::PathBuf;
use std::process::ExitCode;

fn cli() -> Command {
    Command::new("scaffold")
        .version(scaffold_cli::VERSION)
        .about("Generate a backend project from a structured spec through a staged model pipeline")
        .subcommand_required(true)
        .arg_required_else_help(true)
        .arg(
            Arg::new("verbose")
                .long("verbose")
                .short('v')
                .global(true)
                .action(ArgAction::SetTrue)
                .help("Log at debug level unless RUST_LOG is set"),
        )
        .subcommand(
            Command::new("generate")
                .about("Run every stage and write the project to disk")
                .arg(
                    Arg::new("spec")
                        .long("spec")
                        .required(true)
                        .value_parser(value_parser!(PathBuf))
                        .help("Project spec (.json, .yaml or .yml)"),
                )
                .arg(
                    Arg::new("out")
                        .long("out")
                        .required(true)
                        .value_parser(value_parser!(PathBuf))
                        .help("Directory to write the generated project into"),
                )
                .arg(
                    Arg::new("config")
                        .long("config")
                        .value_parser(value_parser!(PathBuf))
                        .help("Settings TOML with [model], [generation] and [options] tables"),
                )
                .arg(
                    Arg::new("framework")
                        .long("framework")
                        .help("Web framework package (default: express)"),
                )
                .arg(
                    Arg::new("language")
                        .long("language")
                        .value_parser(["javascript", "typescript", "js", "ts"])
                        .help("Source language of the generated project"),
                )
                .arg(
                    Arg::new("auth")
                        .long("auth")
                        .action(ArgAction::SetTrue)
                        .help("Include token authentication"),
                )
                .arg(
                    Arg::new("tests")
                        .long("tests")
                        .action(ArgAction::SetTrue)
                        .help("Prepare the project for a test runner"),
                )
                .arg(
                    Arg::new("model")
                        .long("model")
                        .help("Model identifier for every stage"),
                )
                .arg(
                    Arg::new("temperature")
                        .long("temperature")
                        .value_parser(value_parser!(f32))
                        .help("Sampling temperature"),
                )
                .arg(
                    Arg::new("max-tokens")
                        .long("max-tokens")
                        .value_parser(value_parser!(u32))
                        .help("Completion token limit per stage"),
                ),
        )
        .subcommand(
            Command::new("context")
                .about("Print the serialized context for a spec")
                .arg(
                    Arg::new("spec")
                        .long("spec")
                        .required(true)
                        .value_parser(value_parser!(PathBuf)),
                ),
        )
        .subcommand(
            Command::new("recover")
                .about("Run the recovery passes over a raw model response")
                .arg(
                    Arg::new("file")
                        .required(true)
                        .value_parser(value_parser!(PathBuf))
                        .help("File holding the raw response"),
                ),
        )
}

fn path_arg<'a>(args: &'a ArgMatches, name: &str) -> anyhow::Result<&'a PathBuf> {
    args.get_one::<PathBuf>(name)
        .with_context(|| format!("missing --{name}"))
}

/// Settings-file options with command-line flags layered on top
fn options_from(args: &ArgMatches, mut options: GenerationOptions) -> GenerationOptions {
    if let Some(framework) = args.get_one::<String>("framework") {
        options.framework.clone_from(framework);
    }
    if let Some(language) = args.get_one::<String>("language") {
        options.language = match language.as_str() {
            "typescript" | "ts" => Language::Typescript,
            _ => Language::Javascript,
        };
    }
    if args.get_flag("auth") {
        options.include_auth = true;
    }
    if args.get_flag("tests") {
        options.include_tests = true;
    }
    if let Some(model) = args.get_one::<String>("model") {
        options.model = Some(model.clone());
    }
    if let Some(temperature) = args.get_one::<f32>("temperature") {
        options.temperature = Some(*temperature);
    }
    if let Some(max_tokens) = args.get_one::<u32>("max-tokens") {
        options.max_tokens = Some(*max_tokens);
    }
    options
}

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    let matches = cli().get_matches();
    init_tracing(matches.get_flag("verbose"));

    match matches.subcommand() {
        Some(("generate", args)) => {
            let settings = Settings::load(args.get_one::<PathBuf>("config").map(PathBuf::as_path))?;
            let options = options_from(args, settings.options.clone());
            let client = ChatClient::new(settings.model.clone()).context("configuring model client")?;
            tracing::info!(
                base_url = %settings.model.base_url,
                model = options.model.as_deref().unwrap_or(&settings.model.model),
                language = %options.language,
                "starting generation"
            );

            let generated = scaffold_cli::generate(
                client,
                settings.generation,
                path_arg(args, "spec")?,
                path_arg(args, "out")?,
                &options,
            )
            .await?;

            println!("{generated}");
            Ok(if generated.result.success {
                ExitCode::SUCCESS
            } else {
                ExitCode::FAILURE
            })
        }
        Some(("context", args)) => {
            println!("{}", scaffold_cli::context(path_arg(args, "spec")?)?);
            Ok(ExitCode::SUCCESS)
        }
        Some(("recover", args)) => {
            let path = path_arg(args, "file")?;
            let raw = std::fs::read_to_string(path)
                .with_context(|| format!("reading {}", path.display()))?;
            let report = scaffold_cli::recover(&raw);
            println!("{report}");
            Ok(if report.parses() {
                ExitCode::SUCCESS
            } else {
                ExitCode::FAILURE
            })
        }
        _ => {
            cli().print_help()?;
            Ok(ExitCode::FAILURE)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn command_definition_is_consistent() {
        cli().debug_assert();
    }

    #[test]
    fn flags_override_settings_options() {
        let matches = cli().get_matches_from([
            "scaffold", "generate", "--spec", "s.yaml", "--out", "out", "--language", "ts",
            "--auth", "--max-tokens", "2048", "--framework", "fastify",
        ]);
        let (_, args) = matches.subcommand().unwrap();
        let base = GenerationOptions::default().with_tests(true);
        let options = options_from(args, base);

        assert_eq!(options.language, Language::Typescript);
        assert!(options.include_auth);
        assert!(options.include_tests);
        assert_eq!(options.max_tokens, Some(2048));
        assert_eq!(options.framework, "fastify");
        assert_eq!(options.model, None);
    }
}
