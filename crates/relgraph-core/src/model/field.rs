use derive_more::{Display, FromStr};
use relgraph_primitives::ScalarKind;
use serde::Serialize;
use serde_json::Value as JsonValue;

///
/// EnumModel
///
/// A closed set of string variants. Declared as a `static` so field kinds can
/// share it by reference.
///

#[derive(Debug, Eq, PartialEq, Serialize)]
pub struct EnumModel {
    pub name: &'static str,
    pub variants: &'static [&'static str],
}

impl EnumModel {
    #[must_use]
    pub const fn new(name: &'static str, variants: &'static [&'static str]) -> Self {
        Self { name, variants }
    }

    #[must_use]
    pub fn contains(&self, value: &str) -> bool {
        self.variants.contains(&value)
    }
}

///
/// FieldKind
///

#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize)]
pub enum FieldKind {
    Bool,
    Enum(&'static EnumModel),
    Float,
    Int,
    Json,
    Text,
    TextList,
    Timestamp,
}

impl FieldKind {
    #[must_use]
    pub const fn scalar(self) -> ScalarKind {
        match self {
            Self::Bool => ScalarKind::Bool,
            Self::Enum(_) => ScalarKind::Enum,
            Self::Float => ScalarKind::Float,
            Self::Int => ScalarKind::Int,
            Self::Json => ScalarKind::Json,
            Self::Text => ScalarKind::Text,
            Self::TextList => ScalarKind::TextList,
            Self::Timestamp => ScalarKind::Timestamp,
        }
    }

    #[must_use]
    pub const fn is_json(self) -> bool {
        matches!(self, Self::Json)
    }
}

///
/// Generator
///
/// Value produced by the store when the field is omitted on create.
///

#[derive(Clone, Copy, Debug, Display, Eq, FromStr, PartialEq, Serialize)]
#[remain::sorted]
pub enum Generator {
    Autoincrement,
    Cuid,
    Now,
    UpdatedAt,
    Uuid,
}

///
/// FieldDefault
///

#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
pub enum FieldDefault {
    Generated(Generator),
    Literal(JsonValue),
}

///
/// FieldModel
///

#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
pub struct FieldModel {
    pub name: &'static str,
    pub kind: FieldKind,
    pub nullable: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<FieldDefault>,

    pub unique: bool,
    pub id: bool,
}

impl FieldModel {
    #[must_use]
    pub const fn new(name: &'static str, kind: FieldKind) -> Self {
        Self {
            name,
            kind,
            nullable: false,
            default: None,
            unique: false,
            id: false,
        }
    }

    /// Mark as the identifier. Identifiers are always unique.
    #[must_use]
    pub const fn id(mut self) -> Self {
        self.id = true;
        self.unique = true;
        self
    }

    #[must_use]
    pub const fn unique(mut self) -> Self {
        self.unique = true;
        self
    }

    #[must_use]
    pub const fn nullable(mut self) -> Self {
        self.nullable = true;
        self
    }

    #[must_use]
    pub fn default_value(mut self, value: JsonValue) -> Self {
        self.default = Some(FieldDefault::Literal(value));
        self
    }

    #[must_use]
    pub fn generated(mut self, generator: Generator) -> Self {
        self.default = Some(FieldDefault::Generated(generator));
        self
    }

    #[must_use]
    pub const fn scalar(&self) -> ScalarKind {
        self.kind.scalar()
    }

    #[must_use]
    pub const fn is_generated(&self) -> bool {
        matches!(self.default, Some(FieldDefault::Generated(_)))
    }

    /// Return the literal default, if any.
    #[must_use]
    pub const fn literal_default(&self) -> Option<&JsonValue> {
        match &self.default {
            Some(FieldDefault::Literal(value)) => Some(value),
            _ => None,
        }
    }

    /// Required on create: no default, not nullable.
    #[must_use]
    pub const fn is_required(&self) -> bool {
        !self.nullable && self.default.is_none()
    }
}
