//! The contract validation engine.

use serde_json::{Map, Value};

use super::result::{FieldError, ValidationResult};
use super::schema::{FieldSpec, Schema};
use super::schemas::SchemaKind;

/// Validates `payload` against the schema for `kind`.
///
/// Never fails: every violation becomes an entry in the result.
pub fn validate(payload: &Value, kind: SchemaKind) -> ValidationResult {
    validate_against(payload, kind.schema())
}

pub(crate) fn validate_against(payload: &Value, schema: &Schema) -> ValidationResult {
    let Some(object) = payload.as_object() else {
        return ValidationResult::from_errors(vec![FieldError::new(
            "payload",
            "Payload must be an object",
        )]);
    };

    let mut errors = Vec::new();
    let mut failed_required: Vec<&str> = Vec::new();

    for field in &schema.required {
        if is_missing(object.get(*field)) {
            errors.push(FieldError::new(*field, format!("{} is required", field)));
            failed_required.push(*field);
        }
    }

    for (field, spec) in &schema.fields {
        if failed_required.contains(field) {
            continue;
        }
        check_field(field, object.get(*field), spec, &mut errors);
    }

    ValidationResult::from_errors(errors)
}

/// Absent, null, or a string that is blank after trimming.
fn is_missing(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) => true,
        Some(Value::String(s)) => s.trim().is_empty(),
        Some(_) => false,
    }
}

fn check_field(field: &str, value: Option<&Value>, spec: &FieldSpec, errors: &mut Vec<FieldError>) {
    let value = match value {
        None | Some(Value::Null) => {
            if spec.required {
                errors.push(FieldError::new(field, format!("{} is required", field)));
            }
            return;
        }
        Some(v) => v,
    };

    if !spec.field_type.matches(value) {
        errors.push(FieldError::new(
            field,
            format!("{} must be of type {}", field, spec.field_type),
        ));
        return;
    }

    match value {
        Value::String(s) => check_string(field, s, spec, errors),
        Value::Number(n) => check_number(field, n.as_f64().unwrap_or_default(), spec, errors),
        Value::Array(items) => check_array(field, items, spec, errors),
        Value::Object(props) => check_properties(field, props, spec, errors),
        _ => {}
    }
}

fn check_string(field: &str, s: &str, spec: &FieldSpec, errors: &mut Vec<FieldError>) {
    let len = s.chars().count();

    if let Some(min) = spec.min_length.filter(|m| *m > 0) {
        if len < min {
            errors.push(FieldError::new(
                field,
                format!("{} must be at least {} characters", field, min),
            ));
        }
    }
    if let Some(max) = spec.max_length.filter(|m| *m > 0) {
        if len > max {
            errors.push(FieldError::new(
                field,
                format!("{} must not exceed {} characters", field, max),
            ));
        }
    }
    if let Some(pattern) = &spec.pattern {
        if !pattern.is_match(s) {
            errors.push(FieldError::new(
                field,
                format!("{} does not match required pattern", field),
            ));
        }
    }
}

fn check_number(field: &str, n: f64, spec: &FieldSpec, errors: &mut Vec<FieldError>) {
    if spec.integer && n.fract() != 0.0 {
        errors.push(FieldError::new(field, format!("{} must be a whole number", field)));
    }
    if let Some(min) = spec.min {
        if n < min {
            errors.push(FieldError::new(field, format!("{} must be at least {}", field, min)));
        }
    }
    if let Some(max) = spec.max {
        if n > max {
            errors.push(FieldError::new(field, format!("{} must not exceed {}", field, max)));
        }
    }
}

fn check_array(field: &str, items: &[Value], spec: &FieldSpec, errors: &mut Vec<FieldError>) {
    if let Some(min) = spec.min_items {
        if items.len() < min {
            errors.push(FieldError::new(
                field,
                format!("{} must have at least {} items", field, min),
            ));
        }
    }
    if let Some(max) = spec.max_items {
        if items.len() > max {
            errors.push(FieldError::new(
                field,
                format!("{} must not have more than {} items", field, max),
            ));
        }
    }

    if let Some(item_spec) = &spec.items {
        for (i, item) in items.iter().enumerate() {
            check_item(&format!("{}[{}]", field, i), item, item_spec, errors);
        }
    }
}

/// Array elements report type mismatches as "must be a string" rather than
/// "must be of type string".
fn check_item(path: &str, item: &Value, spec: &FieldSpec, errors: &mut Vec<FieldError>) {
    if item.is_null() {
        if spec.required {
            errors.push(FieldError::new(path, format!("{} is required", path)));
        }
        return;
    }
    if !spec.field_type.matches(item) {
        errors.push(FieldError::new(
            path,
            format!("{} must be {}", path, spec.field_type.with_article()),
        ));
        return;
    }
    if let Value::String(s) = item {
        check_string(path, s, spec, errors);
    }
    if let Value::Number(n) = item {
        check_number(path, n.as_f64().unwrap_or_default(), spec, errors);
    }
}

/// One level deep, type-only.
fn check_properties(
    field: &str,
    props: &Map<String, Value>,
    spec: &FieldSpec,
    errors: &mut Vec<FieldError>,
) {
    for (name, prop_spec) in &spec.properties {
        let path = format!("{}.{}", field, name);
        match props.get(*name) {
            None | Some(Value::Null) => {
                if prop_spec.required {
                    errors.push(FieldError::new(&path, format!("{} is required", path)));
                }
            }
            Some(value) if !prop_spec.field_type.matches(value) => {
                errors.push(FieldError::new(
                    &path,
                    format!("{} must be of type {}", path, prop_spec.field_type),
                ));
            }
            Some(_) => {}
        }
    }
}
