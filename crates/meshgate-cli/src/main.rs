//! meshgate CLI - integrity checker for glTF assets
//!
//! Verifies references, byte layout and ingest policy of `.gltf`/`.glb`
//! files and can correct stale buffer size declarations.

use clap::Parser;
use std::process::ExitCode;

use meshgate_cli::{commands, logging};

mod cli_args;

use cli_args::{Cli, Commands};

fn main() -> ExitCode {
    let cli = Cli::parse();
    logging::init(cli.verbose);

    let result = match cli.command {
        Commands::Check {
            paths,
            fix,
            json,
            config,
            disable_passes,
            only_passes,
            no_uv_policy,
        } => commands::check::run(
            &paths,
            &commands::check::CheckOptions {
                fix,
                json,
                config,
                disable_passes,
                only_passes,
                no_uv_policy,
            },
        ),
        Commands::Passes { json } => commands::passes::run(json),
    };

    match result {
        Ok(code) => code,
        Err(e) => {
            eprintln!("{}: {:#}", colored::Colorize::red("error"), e);
            ExitCode::from(commands::EXIT_LOAD_FAILURE)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parses_check() {
        let cli = Cli::try_parse_from([
            "meshgate",
            "check",
            "scene.gltf",
            "assets/",
            "--fix",
            "--json",
            "--disable-pass",
            "buffer-size",
            "--disable-pass",
            "layout",
            "--only-pass",
            "reference,policy",
        ])
        .unwrap();
        match cli.command {
            Commands::Check {
                paths,
                fix,
                json,
                disable_passes,
                only_passes,
                no_uv_policy,
                config,
            } => {
                assert_eq!(paths, vec!["scene.gltf", "assets/"]);
                assert!(fix);
                assert!(json);
                assert_eq!(disable_passes, vec!["buffer-size", "layout"]);
                assert_eq!(only_passes.as_deref(), Some("reference,policy"));
                assert!(!no_uv_policy);
                assert!(config.is_none());
            }
            _ => panic!("expected check command"),
        }
    }

    #[test]
    fn test_cli_check_requires_paths() {
        assert!(Cli::try_parse_from(["meshgate", "check"]).is_err());
    }

    #[test]
    fn test_cli_verbose_is_global() {
        let cli = Cli::try_parse_from(["meshgate", "passes", "-vv"]).unwrap();
        assert_eq!(cli.verbose, 2);
        assert!(matches!(cli.command, Commands::Passes { json: false }));
    }
}
