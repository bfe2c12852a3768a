use std::fs;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use anyhow::Context;
use regex::Regex;

use super::templates::{render_project, RenderedTree};
use crate::errors::ConsistencyError;
use crate::model::ServiceModel;

/// Where and how to write the generated project.
#[derive(Debug, Clone)]
pub struct GenerateOptions {
    pub output_root: PathBuf,
    /// Replace an existing output directory instead of refusing to write.
    pub force: bool,
}

fn env_key_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?m)^([A-Z][A-Z0-9_]*)\s*=").unwrap())
}

fn env_ref_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r#"\b(?:require|get)\("([A-Z][A-Z0-9_]*)"\)"#).unwrap())
}

fn schema_ref_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"schemas/([A-Za-z0-9_]+\.json)").unwrap())
}

/// Cross-check the rendered tree before anything touches the filesystem.
///
/// Every env var the generated code reads must be declared in the rendered
/// `.env`, and every schema path it references must be among the rendered
/// schema files.
pub fn check_consistency(tree: &RenderedTree) -> Result<(), ConsistencyError> {
    let env_keys: Vec<&str> = tree
        .get(".env")
        .map(|env| {
            env_key_re()
                .captures_iter(env)
                .filter_map(|c| c.get(1).map(|m| m.as_str()))
                .collect()
        })
        .unwrap_or_default();

    for (file, contents) in tree {
        if !file.ends_with(".rs") {
            continue;
        }
        for capture in env_ref_re().captures_iter(contents) {
            let var = &capture[1];
            if !env_keys.contains(&var) {
                return Err(ConsistencyError::DanglingEnvReference {
                    file: file.clone(),
                    var: var.to_string(),
                });
            }
        }
        for capture in schema_ref_re().captures_iter(contents) {
            let schema = &capture[1];
            if !tree.contains_key(&format!("schemas/{schema}")) {
                return Err(ConsistencyError::MissingSchemaFile {
                    file: file.clone(),
                    schema: schema.to_string(),
                });
            }
        }
    }
    Ok(())
}

/// Render, check and write the complete project.
///
/// All-or-nothing: rendering and consistency checks run to completion
/// before the first file is created. Returns the written paths in
/// deterministic order.
pub fn generate_project(
    model: &ServiceModel,
    opts: &GenerateOptions,
) -> anyhow::Result<Vec<PathBuf>> {
    let tree = render_project(model)?;
    check_consistency(&tree)?;

    if opts.output_root.exists() {
        if !opts.force {
            return Err(ConsistencyError::OutputExists {
                path: opts.output_root.display().to_string(),
            }
            .into());
        }
        tracing::warn!(path = %opts.output_root.display(), "replacing existing output");
        fs::remove_dir_all(&opts.output_root)
            .with_context(|| format!("removing {}", opts.output_root.display()))?;
    }

    let mut written = Vec::with_capacity(tree.len());
    for (rel, contents) in &tree {
        let path = opts.output_root.join(rel);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("creating {}", parent.display()))?;
        }
        fs::write(&path, contents).with_context(|| format!("writing {}", path.display()))?;
        written.push(path);
    }
    tracing::info!(
        files = written.len(),
        path = %opts.output_root.display(),
        "project generated"
    );
    Ok(written)
}

/// Full pipeline: load the document, build the model, emit the project.
pub fn generate_project_from_spec(
    spec_path: &Path,
    opts: &GenerateOptions,
) -> anyhow::Result<Vec<PathBuf>> {
    let spec = crate::spec::load_spec(spec_path)
        .with_context(|| format!("loading {}", spec_path.display()))?;
    tracing::debug!(title = %spec.title, channels = spec.channels.len(), "document loaded");
    let model = crate::model::build_model(&spec)?;
    generate_project(&model, opts)
}
