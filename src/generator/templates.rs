use askama::Template;
use std::collections::BTreeMap;

use crate::model::{Binding, ChannelModel, ServiceModel, TypeDecl};

/// Rendered project: relative path → file contents, in sorted order.
pub type RenderedTree = BTreeMap<String, String>;

/// Everything a template needs to know about one channel, precomputed so
/// templates stay branching-only. All names come verbatim from the
/// registry-assigned identifiers carried in the model.
#[derive(Debug, Clone)]
pub struct ChannelCtx {
    /// Channel identifier, e.g. `ordercreated`.
    pub ident: String,
    /// Env-var prefix, e.g. `ORDERCREATED`.
    pub prefix: String,
    /// Raw subject the channel maps to, e.g. `orders.created`.
    pub subject: String,
    /// Human-readable binding description for doc comments.
    pub mode: String,
    pub is_inbound: bool,
    pub is_plain: bool,
    pub is_queue: bool,
    pub is_stream: bool,
    pub queue: String,
    pub stream: String,
    pub has_payload: bool,
    /// Payload type name, empty for unit channels.
    pub payload_type: String,
    /// Payload type as referenced from `main.rs`, `()` for unit channels.
    pub payload_rust: String,
    pub is_enum: bool,
    /// Enum discriminants for dispatch arms.
    pub variants: Vec<String>,
    pub has_schema: bool,
    pub schema_file: String,
    pub handler_fn: String,
    pub producer_fn: String,
    pub task_fn: String,
    /// Message identifiers, for doc comments.
    pub messages: Vec<String>,
}

impl ChannelCtx {
    fn from_model(channel: &ChannelModel) -> Self {
        let ident = channel.ident.as_str().to_string();
        let (is_queue, is_stream, queue, stream) = match &channel.binding {
            Binding::Plain => (false, false, String::new(), String::new()),
            Binding::Queue { group } => (true, false, group.clone(), String::new()),
            Binding::Stream { stream } => (false, true, String::new(), stream.clone()),
        };
        let mode = match &channel.binding {
            Binding::Plain => "plain subject".to_string(),
            Binding::Queue { group } => format!("queue group \"{group}\""),
            Binding::Stream { stream } => format!("durable stream \"{stream}\""),
        };
        let payload = channel.payload.as_ref();
        let payload_type = payload
            .map(|p| p.type_ident.as_str().to_string())
            .unwrap_or_default();
        let payload_rust = payload
            .map(|p| format!("model::{}", p.type_ident))
            .unwrap_or_else(|| "()".to_string());
        let schema_file = payload
            .and_then(|p| p.schema_file.clone())
            .unwrap_or_default();
        let (handler_fn, producer_fn, task_fn) = if is_stream {
            (
                format!("stream_handler_{ident}"),
                format!("stream_producer_{ident}"),
                format!("stream_producer_task_{ident}"),
            )
        } else {
            (
                format!("handler_{ident}"),
                format!("producer_{ident}"),
                format!("producer_task_{ident}"),
            )
        };

        ChannelCtx {
            prefix: channel.env_prefix(),
            subject: channel.name.clone(),
            mode,
            is_inbound: channel.direction.is_inbound(),
            is_plain: !is_queue && !is_stream,
            is_queue,
            is_stream,
            queue,
            stream,
            has_payload: payload.is_some(),
            payload_type,
            payload_rust,
            is_enum: payload.map(|p| p.is_enum()).unwrap_or(false),
            variants: payload
                .map(|p| p.variants.iter().map(|v| v.as_str().to_string()).collect())
                .unwrap_or_default(),
            has_schema: !schema_file.is_empty(),
            schema_file,
            handler_fn,
            producer_fn,
            task_fn,
            messages: channel
                .messages
                .iter()
                .map(|m| m.ident.as_str().to_string())
                .collect(),
            ident,
        }
    }
}

/// One type declaration as the model template sees it.
#[derive(Debug, Clone)]
pub struct TypeCtx {
    pub is_enum: bool,
    pub name: String,
    pub fields: Vec<FieldCtx>,
    pub variants: Vec<VariantCtx>,
}

#[derive(Debug, Clone)]
pub struct FieldCtx {
    pub name: String,
    pub original_name: String,
    pub needs_rename: bool,
    pub ty: String,
    pub optional: bool,
}

#[derive(Debug, Clone)]
pub struct VariantCtx {
    pub discriminant: String,
    pub inner: String,
}

impl TypeCtx {
    fn from_decl(decl: &TypeDecl) -> Self {
        match decl {
            TypeDecl::Record(record) => TypeCtx {
                is_enum: false,
                name: record.ident.as_str().to_string(),
                fields: record
                    .fields
                    .iter()
                    .map(|f| FieldCtx {
                        name: f.name.clone(),
                        original_name: f.original_name.clone(),
                        needs_rename: f.needs_rename(),
                        ty: f.ty.to_string(),
                        optional: f.optional,
                    })
                    .collect(),
                variants: Vec::new(),
            },
            TypeDecl::Enum(e) => TypeCtx {
                is_enum: true,
                name: e.ident.as_str().to_string(),
                fields: Vec::new(),
                variants: e
                    .variants
                    .iter()
                    .map(|v| VariantCtx {
                        discriminant: v.discriminant.as_str().to_string(),
                        inner: v.inner.as_str().to_string(),
                    })
                    .collect(),
            },
        }
    }
}

/// Template data for the generated service's Cargo.toml
#[derive(Template)]
#[template(path = "Cargo.toml.txt")]
struct CargoTomlTemplateData {
    name: String,
    has_description: bool,
    description: String,
}

/// Template data for the generated .env file
#[derive(Template)]
#[template(path = "env.txt")]
struct EnvTemplateData {
    title: String,
    server_url: String,
    channels: Vec<ChannelCtx>,
}

/// Template data for the generated main.rs entry point
#[derive(Template)]
#[template(path = "main.rs.txt")]
struct MainTemplateData {
    title: String,
    inbound: Vec<ChannelCtx>,
    outbound: Vec<ChannelCtx>,
    has_stream: bool,
}

/// Template data for one inbound channel's handler module
#[derive(Template)]
#[template(path = "handler.rs.txt")]
struct HandlerTemplateData {
    channel: ChannelCtx,
}

/// Template data for one outbound channel's producer module
#[derive(Template)]
#[template(path = "producer.rs.txt")]
struct ProducerTemplateData {
    channel: ChannelCtx,
}

/// Template data for the handler directory's mod.rs
#[derive(Template)]
#[template(path = "handler_mod.rs.txt")]
struct ModRsTemplateData {
    modules: Vec<String>,
}

/// Template data for the generated model module (all payload types)
#[derive(Template)]
#[template(path = "model.rs.txt")]
struct ModelTemplateData {
    types: Vec<TypeCtx>,
}

/// Template data for the generated usage guide
#[derive(Template)]
#[template(path = "readme.md.txt")]
struct ReadmeTemplateData {
    title: String,
    has_description: bool,
    description: String,
    channels: Vec<ChannelCtx>,
}

#[derive(Template)]
#[template(path = "config.rs.txt")]
struct ConfigRsTemplate;

#[derive(Template)]
#[template(path = "logger.rs.txt")]
struct LoggerRsTemplate;

#[derive(Template)]
#[template(path = "tracing.rs.txt")]
struct TracingRsTemplate {
    slug: String,
}

#[derive(Template)]
#[template(path = "policy.rs.txt")]
struct PolicyRsTemplate;

#[derive(Template)]
#[template(path = "utils_mod.rs.txt")]
struct UtilsModRsTemplate;

#[derive(Template)]
#[template(path = "utils_common.rs.txt")]
struct UtilsCommonRsTemplate;

#[derive(Template)]
#[template(path = "utils_streams.rs.txt")]
struct UtilsStreamsRsTemplate;

#[derive(Template)]
#[template(path = "utils_validator.rs.txt")]
struct UtilsValidatorRsTemplate;

#[derive(Template)]
#[template(path = "cli.rs.txt")]
struct CliRsTemplate;

/// Render the complete project tree for a service model.
///
/// Pure: no filesystem access, no mutation of the model. Calling it twice
/// with the same model yields byte-identical output.
pub fn render_project(model: &ServiceModel) -> anyhow::Result<RenderedTree> {
    let inbound: Vec<ChannelCtx> = model.inbound().map(ChannelCtx::from_model).collect();
    let outbound: Vec<ChannelCtx> = model.outbound().map(ChannelCtx::from_model).collect();
    let all: Vec<ChannelCtx> = model.channels.iter().map(ChannelCtx::from_model).collect();
    let has_stream = all.iter().any(|c| c.is_stream);

    let mut tree = RenderedTree::new();
    tree.insert(
        "Cargo.toml".to_string(),
        rendered(&CargoTomlTemplateData {
            name: model.slug.clone(),
            has_description: model.description.is_some(),
            description: model.description.clone().unwrap_or_default(),
        })?,
    );
    tree.insert(
        ".env".to_string(),
        rendered(&EnvTemplateData {
            title: model.title.clone(),
            server_url: model.server_url.clone(),
            channels: all.clone(),
        })?,
    );
    tree.insert(
        "README.md".to_string(),
        rendered(&ReadmeTemplateData {
            title: model.title.clone(),
            has_description: model.description.is_some(),
            description: model.description.clone().unwrap_or_default(),
            channels: all,
        })?,
    );
    tree.insert(
        "src/main.rs".to_string(),
        rendered(&MainTemplateData {
            title: model.title.clone(),
            inbound: inbound.clone(),
            outbound: outbound.clone(),
            has_stream,
        })?,
    );
    tree.insert(
        "src/model.rs".to_string(),
        rendered(&ModelTemplateData {
            types: model.types.iter().map(TypeCtx::from_decl).collect(),
        })?,
    );

    let mut modules = Vec::new();
    for channel in inbound {
        modules.push(channel.ident.clone());
        tree.insert(
            format!("src/handler/{}.rs", channel.ident),
            rendered(&HandlerTemplateData { channel })?,
        );
    }
    for channel in outbound {
        modules.push(channel.ident.clone());
        tree.insert(
            format!("src/handler/{}.rs", channel.ident),
            rendered(&ProducerTemplateData { channel })?,
        );
    }
    tree.insert(
        "src/handler/mod.rs".to_string(),
        rendered(&ModRsTemplateData { modules })?,
    );

    tree.insert("src/config.rs".to_string(), rendered(&ConfigRsTemplate)?);
    tree.insert("src/logger.rs".to_string(), rendered(&LoggerRsTemplate)?);
    tree.insert(
        "src/tracing.rs".to_string(),
        rendered(&TracingRsTemplate {
            slug: model.slug.clone(),
        })?,
    );
    tree.insert("src/policy.rs".to_string(), rendered(&PolicyRsTemplate)?);
    tree.insert("src/cli.rs".to_string(), rendered(&CliRsTemplate)?);
    tree.insert("src/utils/mod.rs".to_string(), rendered(&UtilsModRsTemplate)?);
    tree.insert(
        "src/utils/common.rs".to_string(),
        rendered(&UtilsCommonRsTemplate)?,
    );
    tree.insert(
        "src/utils/streams.rs".to_string(),
        rendered(&UtilsStreamsRsTemplate)?,
    );
    tree.insert(
        "src/utils/validator.rs".to_string(),
        rendered(&UtilsValidatorRsTemplate)?,
    );

    for schema in &model.schemas {
        tree.insert(
            format!("schemas/{}", schema.file_name),
            schema.contents.clone(),
        );
    }

    Ok(tree)
}

fn rendered<T: Template>(template: &T) -> anyhow::Result<String> {
    Ok(strip_blank_runs(&template.render()?))
}

/// Collapse the blank-line runs that conditional template blocks leave
/// behind, and trim trailing whitespace per line.
fn strip_blank_runs(rendered: &str) -> String {
    let mut out = String::with_capacity(rendered.len());
    let mut last_blank = false;
    for line in rendered.lines() {
        let blank = line.trim().is_empty();
        if blank && last_blank {
            continue;
        }
        last_blank = blank;
        out.push_str(line.trim_end());
        out.push('\n');
    }
    out
}
