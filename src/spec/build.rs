use serde_json::{json, Value};
use url::Url;

use super::types::{ChannelSpec, Direction, MessageSpec, ServiceSpec};
use crate::errors::SpecError;

/// Recursively inline every internal `$ref` in the document.
///
/// Resolved objects are annotated with `x-ref-name` so the schema
/// simplifier can name the type after the referenced component. A reference
/// re-entered during its own expansion is replaced with an
/// `x-circular-ref` marker; the model builder reports it as a circular
/// schema with full channel/message context.
pub fn resolve_refs(root: Value) -> Result<Value, SpecError> {
    let source = root.clone();
    let mut resolved = root;
    let mut stack = Vec::new();
    inline_refs(&mut resolved, &source, &mut stack)?;
    Ok(resolved)
}

fn inline_refs(value: &mut Value, root: &Value, stack: &mut Vec<String>) -> Result<(), SpecError> {
    match value {
        Value::Object(obj) => {
            if let Some(reference) = obj.get("$ref").and_then(|v| v.as_str()).map(String::from) {
                if stack.contains(&reference) {
                    *value = json!({ "x-circular-ref": reference });
                    return Ok(());
                }
                let target =
                    lookup_pointer(root, &reference).ok_or_else(|| SpecError::UnresolvedRef {
                        reference: reference.clone(),
                    })?;
                let mut expanded = target.clone();
                if let Value::Object(o) = &mut expanded {
                    if let Some(name) = reference.rsplit('/').next() {
                        o.entry("x-ref-name")
                            .or_insert_with(|| Value::String(name.to_string()));
                    }
                }
                stack.push(reference);
                inline_refs(&mut expanded, root, stack)?;
                stack.pop();
                *value = expanded;
                return Ok(());
            }
            for v in obj.values_mut() {
                inline_refs(v, root, stack)?;
            }
        }
        Value::Array(items) => {
            for v in items.iter_mut() {
                inline_refs(v, root, stack)?;
            }
        }
        _ => {}
    }
    Ok(())
}

fn lookup_pointer<'a>(root: &'a Value, reference: &str) -> Option<&'a Value> {
    let pointer = reference.strip_prefix('#')?;
    root.pointer(pointer)
}

/// Build the typed [`ServiceSpec`] from a fully resolved document.
pub fn build_service_spec(doc: &Value) -> Result<ServiceSpec, SpecError> {
    let info = doc.get("info");
    let title = info
        .and_then(|i| i.get("title"))
        .and_then(|t| t.as_str())
        .unwrap_or("service")
        .to_string();
    let description = info
        .and_then(|i| i.get("description"))
        .and_then(|d| d.as_str())
        .map(String::from);
    let server_url = server_connection_url(doc)?;

    let channel_map = doc
        .get("channels")
        .and_then(|c| c.as_object())
        .filter(|m| !m.is_empty())
        .ok_or(SpecError::NoChannels)?;

    // Document order is preserved; a channel declaring both operations
    // contributes one entry per direction.
    let mut channels = Vec::new();
    for (name, channel) in channel_map {
        if let Some(op) = channel.get("publish") {
            channels.push(build_channel(name, Direction::Inbound, op)?);
        }
        if let Some(op) = channel.get("subscribe") {
            channels.push(build_channel(name, Direction::Outbound, op)?);
        }
    }
    if channels.is_empty() {
        return Err(SpecError::NoChannels);
    }

    Ok(ServiceSpec {
        title,
        description,
        server_url,
        channels,
    })
}

/// Compute the connection string from the first declared server.
///
/// Bare `host:port` server URLs are normalized to `nats://host:port`.
fn server_connection_url(doc: &Value) -> Result<String, SpecError> {
    let servers = doc
        .get("servers")
        .and_then(|s| s.as_object())
        .filter(|m| !m.is_empty())
        .ok_or(SpecError::MissingServer)?;
    let url = servers
        .values()
        .next()
        .and_then(|s| s.get("url"))
        .and_then(|u| u.as_str())
        .ok_or(SpecError::MissingServer)?;

    // `host:port` alone parses as a scheme-only URL, so require a host
    // before accepting the string as-is.
    if Url::parse(url).map(|u| u.has_host()).unwrap_or(false) {
        return Ok(url.to_string());
    }
    let prefixed = format!("nats://{url}");
    Url::parse(&prefixed).map_err(|e| SpecError::InvalidServerUrl {
        url: url.to_string(),
        message: e.to_string(),
    })?;
    Ok(prefixed)
}

fn build_channel(name: &str, direction: Direction, op: &Value) -> Result<ChannelSpec, SpecError> {
    let operation_id = op
        .get("operationId")
        .and_then(|v| v.as_str())
        .map(String::from);
    let nats = op.pointer("/bindings/nats");
    let queue = nats
        .and_then(|n| n.get("queue"))
        .and_then(|v| v.as_str())
        .map(String::from);
    let stream = nats
        .and_then(|n| n.get("streamname"))
        .and_then(|v| v.as_str())
        .map(String::from);

    Ok(ChannelSpec {
        name: name.to_string(),
        direction,
        operation_id,
        queue,
        stream,
        messages: build_messages(name, op)?,
    })
}

fn build_messages(channel: &str, op: &Value) -> Result<Vec<MessageSpec>, SpecError> {
    let message = op.get("message").ok_or_else(|| SpecError::MissingMessage {
        channel: channel.to_string(),
    })?;

    let raw_messages: Vec<&Value> = match message.get("oneOf").and_then(|v| v.as_array()) {
        Some(alternatives) => alternatives.iter().collect(),
        None => vec![message],
    };
    if raw_messages.is_empty() {
        return Err(SpecError::MissingMessage {
            channel: channel.to_string(),
        });
    }

    Ok(raw_messages
        .into_iter()
        .map(|m| MessageSpec {
            name: m
                .get("name")
                .or_else(|| m.get("title"))
                .and_then(|v| v.as_str())
                .map(String::from),
            payload: m.get("payload").cloned(),
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolves_component_refs_and_annotates_name() {
        let doc = json!({
            "channels": {
                "a": { "publish": { "message": { "$ref": "#/components/messages/Ping" } } }
            },
            "components": {
                "messages": { "Ping": { "name": "Ping", "payload": { "type": "object" } } }
            }
        });
        let resolved = resolve_refs(doc).unwrap();
        let msg = resolved.pointer("/channels/a/publish/message").unwrap();
        assert_eq!(msg["name"], "Ping");
        assert_eq!(msg["x-ref-name"], "Ping");
    }

    #[test]
    fn unresolved_ref_fails() {
        let doc = json!({
            "channels": { "a": { "publish": { "message": { "$ref": "#/components/messages/Gone" } } } }
        });
        let err = resolve_refs(doc).unwrap_err();
        assert!(matches!(err, SpecError::UnresolvedRef { .. }));
    }

    #[test]
    fn circular_ref_becomes_marker() {
        let doc = json!({
            "components": {
                "schemas": {
                    "Node": {
                        "type": "object",
                        "properties": { "next": { "$ref": "#/components/schemas/Node" } }
                    }
                }
            }
        });
        let resolved = resolve_refs(doc).unwrap();
        // The first hop is expanded; the cycle is cut one level in.
        let next = resolved
            .pointer("/components/schemas/Node/properties/next")
            .unwrap();
        assert_eq!(next["type"], "object");
        let marker = resolved
            .pointer("/components/schemas/Node/properties/next/properties/next/x-circular-ref")
            .unwrap();
        assert_eq!(marker, "#/components/schemas/Node");
    }

    #[test]
    fn partitions_channels_by_direction() {
        let doc = json!({
            "info": { "title": "t" },
            "servers": { "prod": { "url": "nats://h:4222" } },
            "channels": {
                "in.ch": { "publish": { "message": { "payload": { "type": "object" } } } },
                "out.ch": { "subscribe": { "message": { "payload": { "type": "object" } } } },
                "both.ch": {
                    "publish": { "message": { "payload": { "type": "object" } } },
                    "subscribe": { "message": { "payload": { "type": "object" } } }
                }
            }
        });
        let spec = build_service_spec(&doc).unwrap();
        let inbound: Vec<_> = spec
            .channels
            .iter()
            .filter(|c| c.direction.is_inbound())
            .map(|c| c.name.as_str())
            .collect();
        let outbound: Vec<_> = spec
            .channels
            .iter()
            .filter(|c| !c.direction.is_inbound())
            .map(|c| c.name.as_str())
            .collect();
        assert_eq!(inbound, ["in.ch", "both.ch"]);
        assert_eq!(outbound, ["out.ch", "both.ch"]);
    }

    #[test]
    fn operation_without_message_fails() {
        let doc = json!({
            "info": { "title": "t" },
            "servers": { "prod": { "url": "nats://h:4222" } },
            "channels": { "bad": { "publish": {} } }
        });
        let err = build_service_spec(&doc).unwrap_err();
        assert!(matches!(err, SpecError::MissingMessage { .. }));
    }

    #[test]
    fn bare_host_is_normalized_to_nats_scheme() {
        let doc = json!({ "servers": { "p": { "url": "localhost:4222" } } });
        assert_eq!(server_connection_url(&doc).unwrap(), "nats://localhost:4222");
    }

    #[test]
    fn missing_servers_fail() {
        let doc = json!({ "channels": {} });
        assert!(matches!(
            server_connection_url(&doc).unwrap_err(),
            SpecError::MissingServer
        ));
    }
}
