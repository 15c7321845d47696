//! Schema validation for the milestones configuration. The `jsonschema` crate
//! supplies the validation algorithm; this module owns only the schema
//! document and the translation of its errors.

use crate::utils::error::{Result, SyncError};
use jsonschema::JSONSchema;
use serde_json::Value;

/// Schema for milestones.json. `name`/`referenceMilestoneUrl` presence is not
/// enforced here: a spec with neither is a per-pair resolution failure, not a
/// fatal config error.
const MILESTONES_SCHEMA: &str = r##"{
  "$schema": "http://json-schema.org/draft-07/schema#",
  "title": "Milestones configuration",
  "type": "object",
  "required": ["repos", "milestones"],
  "additionalProperties": false,
  "properties": {
    "repos": {
      "type": "array",
      "minItems": 1,
      "items": {
        "type": "string",
        "pattern": "^[^/]+/[^/]+$"
      }
    },
    "milestones": {
      "type": "array",
      "minItems": 1,
      "items": {
        "type": "object",
        "additionalProperties": false,
        "properties": {
          "name": { "type": "string", "minLength": 1 },
          "referenceMilestoneUrl": { "type": "string" },
          "existingNameToRename": { "type": "string", "minLength": 1 },
          "description": { "type": ["string", "null"] },
          "dueDate": { "type": ["string", "null"] }
        }
      }
    }
  }
}"##;

pub fn validate(instance: &Value) -> Result<()> {
    let schema: Value = serde_json::from_str(MILESTONES_SCHEMA)?;
    let compiled = JSONSchema::compile(&schema).map_err(|e| SyncError::SchemaValidationError {
        message: format!("schema does not compile: {}", e),
    })?;

    if let Err(errors) = compiled.validate(instance) {
        let message = errors
            .map(|e| format!("{} (at {})", e, e.instance_path))
            .collect::<Vec<_>>()
            .join("; ");
        return Err(SyncError::SchemaValidationError { message });
    }

    Ok(())
}
