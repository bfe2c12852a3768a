use serde_json::Value;

use super::binding::Binding;
use super::schema::{simplify_record, SchemaContext};
use super::types::{
    ChannelModel, ChannelPayload, EnumModel, EnumVariantModel, MessageModel, PayloadModel,
    SchemaFile, ServiceModel, TypeDecl,
};
use crate::errors::ModelError;
use crate::registry::{camel_ident, snake_ident, EntityKind, Identifier, IdentifierRegistry};
use crate::spec::{ChannelSpec, Direction, MessageSpec, ServiceSpec};

/// Build the complete service model from a loaded spec.
///
/// This is the single pass that reserves every generated name; the model is
/// immutable afterwards and templates only read from it.
pub fn build_model(spec: &ServiceSpec) -> Result<ServiceModel, ModelError> {
    let mut registry = IdentifierRegistry::new();
    // File stems are a separate namespace: a schema file may share its
    // lowercase name with a channel or type identifier.
    let mut schema_names = IdentifierRegistry::new();
    let mut types: Vec<TypeDecl> = Vec::new();
    let mut schemas: Vec<SchemaFile> = Vec::new();

    let mut channels = Vec::new();
    for channel in &spec.channels {
        channels.push(build_channel(
            channel,
            &mut registry,
            &mut schema_names,
            &mut types,
            &mut schemas,
        )?);
    }

    Ok(ServiceModel {
        title: spec.title.clone(),
        slug: slugify(&spec.title),
        description: spec.description.clone(),
        server_url: spec.server_url.clone(),
        channels,
        types,
        schemas,
    })
}

fn build_channel(
    channel: &ChannelSpec,
    registry: &mut IdentifierRegistry,
    schema_names: &mut IdentifierRegistry,
    types: &mut Vec<TypeDecl>,
    schemas: &mut Vec<SchemaFile>,
) -> Result<ChannelModel, ModelError> {
    let dir_tag = match channel.direction {
        Direction::Inbound => "in",
        Direction::Outbound => "out",
    };
    let logical = format!("{}:{dir_tag}", channel.name);
    let ident = registry.reserve(
        EntityKind::Channel,
        &logical,
        &snake_ident(&channel_candidate(channel)),
    );
    let binding = Binding::classify(channel.queue.as_deref(), channel.stream.as_deref());

    let mut messages = Vec::new();
    for (index, message) in channel.messages.iter().enumerate() {
        messages.push(build_message(
            channel,
            &ident,
            index,
            message,
            registry,
            schema_names,
            types,
            schemas,
        )?);
    }
    let payload = channel_payload(&logical, &ident, &messages, registry, types);

    Ok(ChannelModel {
        name: channel.name.clone(),
        ident,
        direction: channel.direction,
        binding,
        messages,
        payload,
    })
}

/// Preferred channel name: the operation id when given, else the name of
/// the single message it carries, else the channel name itself.
fn channel_candidate(channel: &ChannelSpec) -> String {
    if let Some(op_id) = &channel.operation_id {
        return op_id.clone();
    }
    if channel.messages.len() == 1 {
        if let Some(name) = &channel.messages[0].name {
            return name.clone();
        }
    }
    channel.name.clone()
}

#[allow(clippy::too_many_arguments)]
fn build_message(
    channel: &ChannelSpec,
    channel_ident: &Identifier,
    index: usize,
    message: &MessageSpec,
    registry: &mut IdentifierRegistry,
    schema_names: &mut IdentifierRegistry,
    types: &mut Vec<TypeDecl>,
    schemas: &mut Vec<SchemaFile>,
) -> Result<MessageModel, ModelError> {
    let message_name = message.name.clone().unwrap_or_else(|| {
        format!(
            "{} message {}",
            camel_from_snake(channel_ident.as_str()),
            index + 1
        )
    });

    let Some(payload_schema) = &message.payload else {
        // Unit marker: a declared message without a payload.
        let ident = registry.reserve(
            EntityKind::Message,
            &format!("{}:{index}:unit", channel.name),
            &camel_ident(&message_name),
        );
        return Ok(MessageModel {
            ident,
            payload: None,
            schema_file: None,
        });
    };

    let ctx = SchemaContext {
        channel: &channel.name,
        message: &message_name,
    };
    let logical = match payload_schema.get("x-ref-name").and_then(|v| v.as_str()) {
        Some(ref_name) => format!("component:{ref_name}"),
        None => format!("{}:{}:{index}", channel.name, message_name),
    };
    let ident = simplify_record(
        payload_schema,
        &camel_ident(&message_name),
        &logical,
        &ctx,
        registry,
        types,
    )?;

    // Stems are claimed per logical payload: distinct payloads whose
    // identifiers collapse under lowercasing still get distinct files,
    // while a shared component keeps a single file.
    let stem = schema_names.reserve(EntityKind::Schema, &logical, &ident.to_lower());
    let file_name = format!("{stem}_payload_schema.json");
    if !schemas.iter().any(|s| s.file_name == file_name) {
        let mut raw = payload_schema.clone();
        strip_annotations(&mut raw);
        schemas.push(SchemaFile {
            file_name: file_name.clone(),
            contents: serde_json::to_string_pretty(&raw).unwrap_or_default() + "\n",
        });
    }

    let payload = types
        .iter()
        .find(|t| t.ident() == &ident)
        .map(|decl| match decl {
            TypeDecl::Record(r) => PayloadModel::Record(r.clone()),
            TypeDecl::Enum(e) => PayloadModel::Enum(e.clone()),
        });

    Ok(MessageModel {
        ident,
        payload,
        schema_file: Some(file_name),
    })
}

/// Decide what the channel's handler/producer works with: nothing (unit),
/// the single record, or a synthesized enum over all alternative shapes.
fn channel_payload(
    logical: &str,
    channel_ident: &Identifier,
    messages: &[MessageModel],
    registry: &mut IdentifierRegistry,
    types: &mut Vec<TypeDecl>,
) -> Option<ChannelPayload> {
    let carrying: Vec<&MessageModel> = messages.iter().filter(|m| m.payload.is_some()).collect();
    match carrying.as_slice() {
        [] => None,
        [single] => Some(ChannelPayload {
            type_ident: single.ident.clone(),
            variants: Vec::new(),
            schema_file: single.schema_file.clone(),
        }),
        many => {
            let candidate = format!("{}Message", camel_from_snake(channel_ident.as_str()));
            let enum_ident =
                registry.reserve(EntityKind::Enum, &format!("enum:{logical}"), &candidate);
            let variants: Vec<EnumVariantModel> = many
                .iter()
                .map(|m| EnumVariantModel {
                    discriminant: m.ident.clone(),
                    inner: m.ident.clone(),
                })
                .collect();
            if !types.iter().any(|t| t.ident() == &enum_ident) {
                types.push(TypeDecl::Enum(EnumModel {
                    ident: enum_ident.clone(),
                    variants: variants.clone(),
                }));
            }
            Some(ChannelPayload {
                type_ident: enum_ident,
                variants: variants.into_iter().map(|v| v.discriminant).collect(),
                // Alternative shapes validate per-variant schemas poorly;
                // the handler relies on typed deserialization instead.
                schema_file: None,
            })
        }
    }
}

/// Package-name slug from the spec title, e.g. `Order Service` →
/// `order_service`.
pub fn slugify(title: &str) -> String {
    title
        .to_lowercase()
        .replace(|c: char| !c.is_ascii_alphanumeric(), "_")
        .trim_matches('_')
        .to_string()
}

fn camel_from_snake(s: &str) -> String {
    s.split('_')
        .map(|w| {
            let mut chars = w.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
                None => String::new(),
            }
        })
        .collect()
}

/// Drop generator-internal annotations before emitting a raw schema file.
fn strip_annotations(value: &mut Value) {
    match value {
        Value::Object(obj) => {
            obj.remove("x-ref-name");
            for v in obj.values_mut() {
                strip_annotations(v);
            }
        }
        Value::Array(items) => {
            for v in items.iter_mut() {
                strip_annotations(v);
            }
        }
        _ => {}
    }
}
