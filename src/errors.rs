//! Typed errors for the generation pipeline.
//!
//! Each pipeline stage fails with its own error kind so callers can tell a
//! broken input spec ([`SpecError`]), an unsupported payload shape
//! ([`ModelError`]) and an internal cross-file inconsistency
//! ([`ConsistencyError`]) apart. All three abort the run before any file is
//! written; generation is all-or-nothing.

use thiserror::Error;

/// Errors raised while loading and normalizing the raw specification.
#[derive(Debug, Error)]
pub enum SpecError {
    #[error("failed to read spec file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("spec file {path} has an unsupported extension (expected .yaml, .yml or .json)")]
    UnsupportedExtension { path: String },
    #[error("failed to parse spec file {path}: {message}")]
    Parse { path: String, message: String },
    #[error("unresolvable reference `{reference}`")]
    UnresolvedRef { reference: String },
    #[error("spec declares no servers; a server connection URL is required")]
    MissingServer,
    #[error("server URL `{url}` is not a valid URL: {message}")]
    InvalidServerUrl { url: String, message: String },
    #[error("spec declares no channels")]
    NoChannels,
    #[error("channel `{channel}` has an operation without a resolvable message")]
    MissingMessage { channel: String },
}

/// Errors raised while simplifying message schemas into payload models.
///
/// Always carries the offending channel and message so the source spec can
/// be fixed.
#[derive(Debug, Error)]
pub enum ModelError {
    #[error("channel `{channel}`, message `{message}`: unsupported payload shape: {detail}")]
    UnsupportedShape {
        channel: String,
        message: String,
        detail: String,
    },
    #[error("channel `{channel}`, message `{message}`: circular schema reference through `{through}`")]
    CircularSchema {
        channel: String,
        message: String,
        through: String,
    },
    #[error("channel `{channel}`, message `{message}`: array items declare no type")]
    UntypedArrayItems { channel: String, message: String },
}

/// Errors raised by the file tree assembler's post-render cross-checks.
///
/// These indicate a generator bug rather than a bad input spec.
#[derive(Debug, Error)]
pub enum ConsistencyError {
    #[error("rendered file `{file}` reads env var `{var}` which is missing from the .env template")]
    DanglingEnvReference { file: String, var: String },
    #[error("rendered file `{file}` validates against `{schema}` which is not part of the rendered tree")]
    MissingSchemaFile { file: String, schema: String },
    #[error("output directory `{path}` already exists (pass --force to replace it)")]
    OutputExists { path: String },
}
