//! Schema building blocks.

use regex::Regex;
use serde_json::Value;
use std::fmt;

/// JSON type a field must have.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FieldType {
    String,
    Number,
    Boolean,
    Object,
    Array,
}

impl FieldType {
    pub fn as_str(&self) -> &'static str {
        match self {
            FieldType::String => "string",
            FieldType::Number => "number",
            FieldType::Boolean => "boolean",
            FieldType::Object => "object",
            FieldType::Array => "array",
        }
    }

    /// Name with an indefinite article, for item-level messages.
    pub fn with_article(&self) -> &'static str {
        match self {
            FieldType::String => "a string",
            FieldType::Number => "a number",
            FieldType::Boolean => "a boolean",
            FieldType::Object => "an object",
            FieldType::Array => "an array",
        }
    }

    /// True if `value` has this JSON type. Arrays are not objects.
    pub fn matches(&self, value: &Value) -> bool {
        match self {
            FieldType::String => value.is_string(),
            FieldType::Number => value.as_f64().is_some_and(|n| !n.is_nan()),
            FieldType::Boolean => value.is_boolean(),
            FieldType::Object => value.is_object(),
            FieldType::Array => value.is_array(),
        }
    }
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Constraints on one field.
#[derive(Debug, Clone)]
pub struct FieldSpec {
    pub(crate) field_type: FieldType,
    pub(crate) required: bool,
    pub(crate) min_length: Option<usize>,
    pub(crate) max_length: Option<usize>,
    pub(crate) pattern: Option<Regex>,
    pub(crate) integer: bool,
    pub(crate) min: Option<f64>,
    pub(crate) max: Option<f64>,
    pub(crate) min_items: Option<usize>,
    pub(crate) max_items: Option<usize>,
    pub(crate) items: Option<Box<FieldSpec>>,
    pub(crate) properties: Vec<(&'static str, FieldSpec)>,
}

impl FieldSpec {
    pub fn of(field_type: FieldType) -> Self {
        Self {
            field_type,
            required: false,
            min_length: None,
            max_length: None,
            pattern: None,
            integer: false,
            min: None,
            max: None,
            min_items: None,
            max_items: None,
            items: None,
            properties: Vec::new(),
        }
    }

    pub fn string() -> Self {
        Self::of(FieldType::String)
    }

    pub fn number() -> Self {
        Self::of(FieldType::Number)
    }

    pub fn boolean() -> Self {
        Self::of(FieldType::Boolean)
    }

    pub fn object() -> Self {
        Self::of(FieldType::Object)
    }

    pub fn array() -> Self {
        Self::of(FieldType::Array)
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    pub fn min_length(mut self, n: usize) -> Self {
        self.min_length = Some(n);
        self
    }

    pub fn max_length(mut self, n: usize) -> Self {
        self.max_length = Some(n);
        self
    }

    pub fn pattern(mut self, pattern: Regex) -> Self {
        self.pattern = Some(pattern);
        self
    }

    /// Numbers must have no fractional part (`3.0` is accepted).
    pub fn integer(mut self) -> Self {
        self.integer = true;
        self
    }

    pub fn min(mut self, n: f64) -> Self {
        self.min = Some(n);
        self
    }

    pub fn max(mut self, n: f64) -> Self {
        self.max = Some(n);
        self
    }

    pub fn min_items(mut self, n: usize) -> Self {
        self.min_items = Some(n);
        self
    }

    pub fn max_items(mut self, n: usize) -> Self {
        self.max_items = Some(n);
        self
    }

    /// Every array element must satisfy `item`.
    pub fn items(mut self, item: FieldSpec) -> Self {
        self.items = Some(Box::new(item));
        self
    }

    /// Declares a nested property. Only its type is checked.
    pub fn property(mut self, name: &'static str, spec: FieldSpec) -> Self {
        self.properties.push((name, spec));
        self
    }

    pub fn field_type(&self) -> FieldType {
        self.field_type
    }

    pub fn is_required(&self) -> bool {
        self.required
    }
}

/// A whole message schema: the required list plus declared fields in order.
#[derive(Debug, Clone)]
pub struct Schema {
    pub(crate) required: Vec<&'static str>,
    pub(crate) fields: Vec<(&'static str, FieldSpec)>,
}

impl Schema {
    pub fn new(required: &[&'static str]) -> Self {
        Self {
            required: required.to_vec(),
            fields: Vec::new(),
        }
    }

    pub fn field(mut self, name: &'static str, spec: FieldSpec) -> Self {
        self.fields.push((name, spec));
        self
    }

    pub fn required_fields(&self) -> &[&'static str] {
        &self.required
    }

    pub fn field_spec(&self, name: &str) -> Option<&FieldSpec> {
        self.fields
            .iter()
            .find(|(field, _)| *field == name)
            .map(|(_, spec)| spec)
    }
}
