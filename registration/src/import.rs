//! Import and export of whole registration documents.
//!
//! The exchange format wraps a [`FormConfig`]:
//!
//! ```json
//! { "registrationConfig": { "fields": [ ... ], "enabled": true } }
//! ```

use crate::error::SchemaError;
use crate::types::{FieldId, FormConfig};
use composable_forms_core::environment::IdGenerator;
use serde::Serialize;
use serde_json::Value;

/// Parse an externally authored document into a complete replacement config
///
/// Fields without an `id` get a fresh one from `ids`.
///
/// # Errors
///
/// - [`SchemaError::Parse`] when `raw` is not JSON
/// - [`SchemaError::MalformedImport`] when the JSON lacks
///   `registrationConfig.fields` as an array, a field does not decode, or two
///   fields share an id
pub fn parse_document(raw: &str, ids: &dyn IdGenerator) -> Result<FormConfig, SchemaError> {
    let mut document: Value =
        serde_json::from_str(raw).map_err(|e| SchemaError::Parse(e.to_string()))?;

    let config = document
        .get_mut("registrationConfig")
        .filter(|c| c.is_object())
        .ok_or_else(|| {
            SchemaError::MalformedImport("missing registrationConfig object".to_string())
        })?;

    let fields = config
        .get_mut("fields")
        .and_then(Value::as_array_mut)
        .ok_or_else(|| {
            SchemaError::MalformedImport("registrationConfig.fields must be an array".to_string())
        })?;

    for (position, field) in fields.iter_mut().enumerate() {
        let Some(field) = field.as_object_mut() else {
            return Err(SchemaError::MalformedImport(format!(
                "field {position} is not an object"
            )));
        };
        if field.get("id").is_none_or(Value::is_null) {
            let id = FieldId::from_uuid(ids.next_id());
            field.insert("id".to_string(), Value::String(id.to_string()));
        }
    }

    let config: FormConfig = serde_json::from_value(config.take())
        .map_err(|e| SchemaError::MalformedImport(e.to_string()))?;

    if let Some(duplicate) = config.duplicate_field_id() {
        return Err(SchemaError::MalformedImport(format!(
            "field id {duplicate} appears more than once"
        )));
    }

    tracing::debug!(fields = config.fields.len(), "Parsed registration document");
    Ok(config)
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct DocumentRef<'a> {
    registration_config: &'a FormConfig,
}

/// Render a config in the exchange format accepted by [`parse_document`]
///
/// # Errors
///
/// Returns the serializer's error, which does not happen for well-formed configs.
pub fn export_document(config: &FormConfig) -> serde_json::Result<String> {
    serde_json::to_string_pretty(&DocumentRef {
        registration_config: config,
    })
}
