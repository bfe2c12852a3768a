use std::path::Path;

use serde_json::Value;

use super::build::{build_service_spec, resolve_refs};
use super::types::ServiceSpec;
use crate::errors::SpecError;

/// Load and normalize a specification file.
///
/// Parses YAML or JSON by file extension, inlines all internal references
/// and builds the typed [`ServiceSpec`]. Any failure aborts the run before
/// output exists.
pub fn load_spec(path: &Path) -> Result<ServiceSpec, SpecError> {
    let display = path.display().to_string();
    let extension = path.extension().and_then(|e| e.to_str());
    if !matches!(extension, Some("yaml") | Some("yml") | Some("json")) {
        return Err(SpecError::UnsupportedExtension { path: display });
    }

    let content = std::fs::read_to_string(path).map_err(|source| SpecError::Io {
        path: display.clone(),
        source,
    })?;

    let raw: Value = if extension == Some("json") {
        serde_json::from_str(&content).map_err(|e| SpecError::Parse {
            path: display.clone(),
            message: e.to_string(),
        })?
    } else {
        serde_yaml::from_str(&content).map_err(|e| SpecError::Parse {
            path: display.clone(),
            message: e.to_string(),
        })?
    };

    load_spec_from_value(raw)
}

/// Build a [`ServiceSpec`] from an already parsed document.
pub fn load_spec_from_value(raw: Value) -> Result<ServiceSpec, SpecError> {
    let resolved = resolve_refs(raw)?;
    let spec = build_service_spec(&resolved)?;
    tracing::info!(
        title = %spec.title,
        channels = spec.channels.len(),
        "specification parsed"
    );
    Ok(spec)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn yaml_and_json_parse_to_the_same_spec() {
        let doc = json!({
            "info": { "title": "Demo Service" },
            "servers": { "production": { "url": "nats://demo:4222", "protocol": "nats" } },
            "channels": {
                "demo/topic": {
                    "publish": {
                        "message": { "name": "Ping", "payload": { "type": "object", "properties": {} } }
                    }
                }
            }
        });
        let spec = load_spec_from_value(doc).unwrap();
        assert_eq!(spec.title, "Demo Service");
        assert_eq!(spec.server_url, "nats://demo:4222");
        assert_eq!(spec.channels.len(), 1);
    }

    #[test]
    fn unknown_extension_is_rejected() {
        let err = load_spec(Path::new("spec.toml")).unwrap_err();
        assert!(matches!(err, SpecError::UnsupportedExtension { .. }));
    }
}
