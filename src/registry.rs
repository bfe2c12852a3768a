//! Identifier registry: the single source of truth for generated names.
//!
//! Every name that appears in more than one rendered file (handler function,
//! payload type, enum variant, env-var prefix) is reserved here exactly once
//! and looked up everywhere else. Templates never derive names locally, so
//! two files can never disagree about what an entity is called.

use std::collections::{HashMap, HashSet};
use std::fmt;

/// A unique generated name bound to exactly one logical entity for the
/// lifetime of a generation run.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Identifier(String);

impl Identifier {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Env-var prefix form, e.g. `ordercreated` → `ORDERCREATED`.
    pub fn to_screaming(&self) -> String {
        self.0.to_uppercase()
    }

    /// File-name form, e.g. `OrderCreated` → `ordercreated`.
    pub fn to_lower(&self) -> String {
        self.0.to_lowercase()
    }
}

impl fmt::Display for Identifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// The kind of logical entity an identifier names.
///
/// Part of the registry key: a channel and a message may share a candidate
/// name without being the same entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityKind {
    Channel,
    Message,
    Enum,
    /// Emitted schema file stem; lives in its own registry instance so
    /// file names never collide with code identifiers.
    Schema,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct EntityKey {
    kind: EntityKind,
    logical: String,
}

/// Assigns globally unique, stable names to every generated entity.
///
/// Guarantees:
/// - no two distinct entities ever receive the same identifier within a run,
/// - re-reserving for the same logical entity returns the identifier that
///   was assigned first (referential stability across files),
/// - collisions are resolved deterministically by appending a numeric
///   suffix in first-seen order (`foo`, `foo_1`, `foo_2`, ...).
#[derive(Debug, Default)]
pub struct IdentifierRegistry {
    assigned: HashMap<EntityKey, Identifier>,
    taken: HashSet<String>,
}

impl IdentifierRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reserve a name for the entity identified by `(kind, logical)`.
    ///
    /// `logical` is the entity's spec-level identity (e.g. the channel name
    /// together with its direction); `candidate` is the sanitized name the
    /// caller would like to use.
    pub fn reserve(&mut self, kind: EntityKind, logical: &str, candidate: &str) -> Identifier {
        let key = EntityKey {
            kind,
            logical: logical.to_string(),
        };
        if let Some(existing) = self.assigned.get(&key) {
            return existing.clone();
        }
        let name = self.claim(candidate);
        let ident = Identifier(name);
        self.assigned.insert(key, ident.clone());
        ident
    }

    fn claim(&mut self, candidate: &str) -> String {
        if !self.taken.contains(candidate) {
            self.taken.insert(candidate.to_string());
            return candidate.to_string();
        }
        let mut counter = 1;
        loop {
            let suffixed = format!("{candidate}_{counter}");
            if !self.taken.contains(&suffixed) {
                tracing::debug!(candidate, suffixed, "identifier collision, suffixing");
                self.taken.insert(suffixed.clone());
                return suffixed;
            }
            counter += 1;
        }
    }
}

/// Sanitize an arbitrary spec string into a lowercase snake-ish identifier,
/// e.g. `orders.created` → `orderscreated`, `User Signup` → `user_signup`.
pub fn snake_ident(raw: &str) -> String {
    let cleaned = strip_invalid(raw);
    cleaned
        .split_whitespace()
        .collect::<Vec<_>>()
        .join("_")
        .to_lowercase()
}

/// Sanitize an arbitrary spec string into a CamelCase type name,
/// e.g. `user signup` → `UserSignup`, `OrderCreated` → `OrderCreated`.
pub fn camel_ident(raw: &str) -> String {
    let cleaned = strip_invalid(raw);
    cleaned
        .split_whitespace()
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
                None => String::new(),
            }
        })
        .collect()
}

/// Sanitize a schema property key into a valid Rust field name.
pub fn field_ident(raw: &str) -> String {
    let mut s: String = raw
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect::<String>()
        .to_lowercase();
    if s.is_empty() {
        s = "_".to_string();
    }
    if s.chars().next().is_some_and(|c| c.is_ascii_digit()) {
        s.insert(0, '_');
    }
    if RUST_KEYWORDS.contains(&s.as_str()) {
        s = format!("r#{s}");
    }
    s
}

fn strip_invalid(raw: &str) -> String {
    raw.chars()
        .filter(|c| c.is_ascii_alphanumeric() || c.is_whitespace() || *c == '_')
        .collect()
}

const RUST_KEYWORDS: &[&str] = &[
    "as", "break", "const", "continue", "crate", "else", "enum", "extern", "false", "fn", "for",
    "if", "impl", "in", "let", "loop", "match", "mod", "move", "mut", "pub", "ref", "return",
    "self", "static", "struct", "super", "trait", "true", "type", "unsafe", "use", "where",
    "while", "async", "await", "dyn",
];
