//! Semantic column type resolution.
//!
//! A column's `type` is whatever the author typed ("decimal(10,2)",
//! "Timestamp with TZ", "money"). It is matched case-insensitively by
//! substring against an ordered rule list; the first rule whose needle
//! appears wins, so specific needles ("bigint", "jsonb", "timestamp") sit
//! before the generic ones they contain ("int", "json", "time").
//!
//! Resolution never fails. An unmatched type falls back to a bounded string
//! and the caller is told so through [`TypeResolution::is_fallback`].

use crate::domain::value_objects::DatabaseEngine;
use serde::Serialize;
use std::fmt;

use DisplayType as D;
use NativeHint as N;
use Scalar as S;
use TransportType as T;

/// Prisma scalar type of a field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Scalar {
    DateTime,
    BigInt,
    Int,
    Decimal,
    Float,
    Boolean,
    Json,
    String,
    Bytes,
}

impl Scalar {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::DateTime => "DateTime",
            Self::BigInt => "BigInt",
            Self::Int => "Int",
            Self::Decimal => "Decimal",
            Self::Float => "Float",
            Self::Boolean => "Boolean",
            Self::Json => "Json",
            Self::String => "String",
            Self::Bytes => "Bytes",
        }
    }

    pub const fn is_integer(&self) -> bool {
        matches!(self, Self::Int | Self::BigInt)
    }
}

/// `@db.*` native type attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum NativeHint {
    Date,
    Time,
    Decimal,
    JsonB,
    Uuid,
    VarChar,
    Text,
}

impl NativeHint {
    /// Attribute text for `engine`, or `None` when the engine has no
    /// equivalent.
    pub fn render(&self, engine: &DatabaseEngine) -> Option<&'static str> {
        if !engine.supports_native_types() {
            return None;
        }
        let mysql = matches!(engine, DatabaseEngine::MySql);
        match self {
            Self::Date => Some("@db.Date"),
            Self::Time => Some("@db.Time"),
            Self::Decimal => Some("@db.Decimal(12, 2)"),
            Self::JsonB if mysql => None,
            Self::JsonB => Some("@db.JsonB"),
            Self::Uuid if mysql => Some("@db.Char(36)"),
            Self::Uuid => Some("@db.Uuid"),
            Self::VarChar => Some("@db.VarChar(255)"),
            Self::Text => Some("@db.Text"),
        }
    }
}

/// Persistence-layer representation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct StorageType {
    pub scalar: Scalar,
    pub native: Option<NativeHint>,
}

impl StorageType {
    const fn new(scalar: Scalar, native: Option<NativeHint>) -> Self {
        Self { scalar, native }
    }

    /// `Decimal @db.Decimal(12, 2)`, `Int`, ...
    pub fn render(&self, engine: &DatabaseEngine) -> String {
        match self.native.and_then(|hint| hint.render(engine)) {
            Some(hint) => format!("{} {}", self.scalar.as_str(), hint),
            None => self.scalar.as_str().to_string(),
        }
    }

    pub const fn is_uuid(&self) -> bool {
        matches!(self.native, Some(NativeHint::Uuid))
    }
}

/// TypeScript type used on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum TransportType {
    String,
    Number,
    Boolean,
    Unknown,
}

impl TransportType {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::String => "string",
            Self::Number => "number",
            Self::Boolean => "boolean",
            Self::Unknown => "unknown",
        }
    }
}

/// HTML input type used by generated forms.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum DisplayType {
    Text,
    Number,
    Email,
    Checkbox,
    Date,
    Time,
    DateTimeLocal,
    TextArea,
}

impl DisplayType {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Text => "text",
            Self::Number => "number",
            Self::Email => "email",
            Self::Checkbox => "checkbox",
            Self::Date => "date",
            Self::Time => "time",
            Self::DateTimeLocal => "datetime-local",
            Self::TextArea => "textarea",
        }
    }
}

/// The triple every layer consumes for one column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct TypeMapping {
    pub storage: StorageType,
    pub transport: TransportType,
    pub display: DisplayType,
}

impl TypeMapping {
    const fn new(storage: StorageType, transport: TransportType, display: DisplayType) -> Self {
        Self {
            storage,
            transport,
            display,
        }
    }
}

/// One entry of the ordered rule list.
#[derive(Debug, PartialEq, Eq)]
pub struct TypeRule {
    /// 1-based position in [`RULES`].
    pub number: usize,
    pub needles: &'static [&'static str],
    pub mapping: TypeMapping,
}

/// Which rule matched, and on which needle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RuleMatch {
    pub rule: &'static TypeRule,
    pub needle: &'static str,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TypeResolution {
    pub mapping: TypeMapping,
    pub rule: Option<RuleMatch>,
}

impl TypeResolution {
    pub const fn is_fallback(&self) -> bool {
        self.rule.is_none()
    }
}

impl fmt::Display for TypeResolution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.rule {
            Some(hit) => write!(f, "rule {} ({})", hit.rule.number, hit.needle),
            None => f.write_str("default"),
        }
    }
}

const fn rule(
    number: usize,
    needles: &'static [&'static str],
    scalar: Scalar,
    native: Option<NativeHint>,
    transport: TransportType,
    display: DisplayType,
) -> TypeRule {
    TypeRule {
        number,
        needles,
        mapping: TypeMapping::new(StorageType::new(scalar, native), transport, display),
    }
}

/// Ordered, most specific first.
pub static RULES: [TypeRule; 15] = [
    rule(1, &["timestamp", "datetime"], S::DateTime, None, T::String, D::DateTimeLocal),
    rule(2, &["date"], S::DateTime, Some(N::Date), T::String, D::Date),
    rule(3, &["time"], S::DateTime, Some(N::Time), T::String, D::Time),
    rule(4, &["bigint", "bigserial"], S::BigInt, None, T::String, D::Number),
    rule(5, &["int", "serial"], S::Int, None, T::Number, D::Number),
    rule(6, &["decimal", "numeric", "money"], S::Decimal, Some(N::Decimal), T::String, D::Number),
    rule(7, &["float", "double", "real"], S::Float, None, T::Number, D::Number),
    rule(8, &["bool"], S::Boolean, None, T::Boolean, D::Checkbox),
    rule(9, &["jsonb"], S::Json, Some(N::JsonB), T::Unknown, D::TextArea),
    rule(10, &["json"], S::Json, None, T::Unknown, D::TextArea),
    rule(11, &["uuid", "guid"], S::String, Some(N::Uuid), T::String, D::Text),
    rule(12, &["email"], S::String, Some(N::VarChar), T::String, D::Email),
    rule(13, &["text"], S::String, Some(N::Text), T::String, D::TextArea),
    rule(14, &["bytes", "blob", "binary"], S::Bytes, None, T::String, D::Text),
    rule(15, &["char", "string"], S::String, Some(N::VarChar), T::String, D::Text),
];

/// Returned when no rule matches.
pub const DEFAULT_MAPPING: TypeMapping = TypeMapping::new(
    StorageType::new(S::String, Some(N::VarChar)),
    T::String,
    D::Text,
);

/// Stateless resolver over [`RULES`].
#[derive(Debug, Clone, Copy, Default)]
pub struct TypeMapper;

impl TypeMapper {
    pub fn resolve(semantic: &str) -> TypeResolution {
        let lowered = semantic.to_ascii_lowercase();

        for rule in &RULES {
            if let Some(needle) = rule.needles.iter().copied().find(|n| lowered.contains(n)) {
                return TypeResolution {
                    mapping: rule.mapping,
                    rule: Some(RuleMatch { rule, needle }),
                };
            }
        }

        TypeResolution {
            mapping: DEFAULT_MAPPING,
            rule: None,
        }
    }

    pub fn map(semantic: &str) -> TypeMapping {
        Self::resolve(semantic).mapping
    }
}
