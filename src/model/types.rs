use std::fmt;

use super::Binding;
use crate::registry::Identifier;
use crate::spec::Direction;

/// A Rust type reference used in generated field declarations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RustType {
    String,
    I32,
    I64,
    F32,
    F64,
    Bool,
    Vec(Box<RustType>),
    /// A generated record type, referenced by its registry identifier.
    Named(Identifier),
}

impl fmt::Display for RustType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RustType::String => f.write_str("String"),
            RustType::I32 => f.write_str("i32"),
            RustType::I64 => f.write_str("i64"),
            RustType::F32 => f.write_str("f32"),
            RustType::F64 => f.write_str("f64"),
            RustType::Bool => f.write_str("bool"),
            RustType::Vec(inner) => write!(f, "Vec<{inner}>"),
            RustType::Named(ident) => write!(f, "{ident}"),
        }
    }
}

/// One field of a generated record.
#[derive(Debug, Clone)]
pub struct FieldModel {
    /// Sanitized Rust field name.
    pub name: String,
    /// Property key as written in the spec, for serde renaming.
    pub original_name: String,
    pub ty: RustType,
    /// Optional fields render as `Option<T>`.
    pub optional: bool,
}

impl FieldModel {
    /// Whether the serialized name differs from the Rust field name.
    pub fn needs_rename(&self) -> bool {
        self.name != self.original_name
    }
}

/// A generated struct: one message payload or one nested object.
#[derive(Debug, Clone)]
pub struct RecordModel {
    pub ident: Identifier,
    pub fields: Vec<FieldModel>,
}

/// One member of a discriminated-union payload.
#[derive(Debug, Clone)]
pub struct EnumVariantModel {
    /// Variant name; distinct across the enum by registry construction.
    pub discriminant: Identifier,
    /// The record type this variant wraps.
    pub inner: Identifier,
}

/// A discriminated union over the alternative message shapes of one channel.
#[derive(Debug, Clone)]
pub struct EnumModel {
    pub ident: Identifier,
    /// Variants ordered by first appearance in the spec.
    pub variants: Vec<EnumVariantModel>,
}

/// The payload model of a single message: record or discriminated union.
#[derive(Debug, Clone)]
pub enum PayloadModel {
    Record(RecordModel),
    Enum(EnumModel),
}

impl PayloadModel {
    pub fn ident(&self) -> &Identifier {
        match self {
            PayloadModel::Record(r) => &r.ident,
            PayloadModel::Enum(e) => &e.ident,
        }
    }
}

/// One type declaration in the generated model module.
#[derive(Debug, Clone)]
pub enum TypeDecl {
    Record(RecordModel),
    Enum(EnumModel),
}

impl TypeDecl {
    pub fn ident(&self) -> &Identifier {
        match self {
            TypeDecl::Record(r) => &r.ident,
            TypeDecl::Enum(e) => &e.ident,
        }
    }
}

/// One message carried by a channel.
#[derive(Debug, Clone)]
pub struct MessageModel {
    pub ident: Identifier,
    /// `None` is the unit marker: a declared message without a payload.
    pub payload: Option<PayloadModel>,
    /// File name of the emitted raw-schema file, when the message declares
    /// a payload schema.
    pub schema_file: Option<String>,
}

/// What a handler deserializes or a producer accepts for one channel.
#[derive(Debug, Clone)]
pub struct ChannelPayload {
    /// The single type every template refers to for this channel.
    pub type_ident: Identifier,
    /// Enum discriminants for dispatch; empty for plain records.
    pub variants: Vec<Identifier>,
    /// Schema file validated before deserializing, when exactly one
    /// message shape declares one.
    pub schema_file: Option<String>,
}

impl ChannelPayload {
    pub fn is_enum(&self) -> bool {
        !self.variants.is_empty()
    }
}

/// A fully built channel: name, direction, binding and payload model.
#[derive(Debug, Clone)]
pub struct ChannelModel {
    /// Raw channel name, used verbatim as the transport subject.
    pub name: String,
    /// Registry identifier; every generated name for this channel
    /// (handler fn, env prefix, module file) derives from it verbatim.
    pub ident: Identifier,
    pub direction: Direction,
    pub binding: Binding,
    pub messages: Vec<MessageModel>,
    /// `None` means a unit channel: messages carry no payload.
    pub payload: Option<ChannelPayload>,
}

impl ChannelModel {
    /// Env-var prefix, e.g. `ordercreated` → `ORDERCREATED`.
    pub fn env_prefix(&self) -> String {
        self.ident.to_screaming()
    }
}

/// One emitted JSON Schema file.
#[derive(Debug, Clone)]
pub struct SchemaFile {
    pub file_name: String,
    pub contents: String,
}

/// The complete intermediate model: everything the templates consume.
#[derive(Debug, Clone)]
pub struct ServiceModel {
    pub title: String,
    /// Package-name slug derived from the title.
    pub slug: String,
    pub description: Option<String>,
    pub server_url: String,
    /// All channels in document order.
    pub channels: Vec<ChannelModel>,
    /// All payload type declarations, deduplicated, in first-seen order.
    pub types: Vec<TypeDecl>,
    /// Raw-schema files keyed by payload identifier.
    pub schemas: Vec<SchemaFile>,
}

impl ServiceModel {
    pub fn inbound(&self) -> impl Iterator<Item = &ChannelModel> {
        self.channels.iter().filter(|c| c.direction.is_inbound())
    }

    pub fn outbound(&self) -> impl Iterator<Item = &ChannelModel> {
        self.channels.iter().filter(|c| !c.direction.is_inbound())
    }
}
