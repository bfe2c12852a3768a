//! Unit tests for CLI commands

use crate::cli::{Cli, Commands};
use clap::Parser;

#[test]
fn test_generate_command_parses() {
    let cli = Cli::try_parse_from([
        "busgen",
        "generate",
        "--spec",
        "asyncapi.yaml",
        "--output",
        "out",
        "--force",
    ])
    .unwrap();

    match cli.command {
        Commands::Generate {
            spec,
            output,
            force,
        } => {
            assert_eq!(spec.to_string_lossy(), "asyncapi.yaml");
            assert_eq!(output.to_string_lossy(), "out");
            assert!(force);
        }
        _ => panic!("Expected Generate command"),
    }
}

#[test]
fn test_force_defaults_to_false() {
    let cli = Cli::try_parse_from([
        "busgen",
        "generate",
        "--spec",
        "asyncapi.yaml",
        "--output",
        "out",
    ])
    .unwrap();

    match cli.command {
        Commands::Generate { force, .. } => assert!(!force),
        _ => panic!("Expected Generate command"),
    }
}

#[test]
fn test_all_commands_parse() {
    let commands = vec![
        vec![
            "busgen",
            "generate",
            "--spec",
            "asyncapi.yaml",
            "--output",
            "out",
        ],
        vec!["busgen", "check", "--spec", "asyncapi.yaml"],
    ];

    for args in commands {
        let cli = Cli::try_parse_from(&args);
        assert!(cli.is_ok(), "Failed to parse command: {:?}", args);
    }
}

#[test]
fn test_generate_requires_output() {
    let cli = Cli::try_parse_from(["busgen", "generate", "--spec", "asyncapi.yaml"]);
    assert!(cli.is_err());
}
