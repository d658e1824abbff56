// Copyright 2025 Google LLC
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     https://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Validator for OpenC2 messages.

use std::io::Read;

use serde_json::Value;
use thiserror::Error;

use crate::problem::Problem;

mod schema;
pub use schema::{Schema, SchemaError};

/// The reasons a document can't be validated at all.
#[derive(Debug, Error)]
pub enum DocumentError {
    #[error("Failed to read document: {0}")]
    Io(#[from] std::io::Error),
    #[error("Malformed JSON document: {0}")]
    Malformed(#[from] serde_json::Error),
}

/// Something that checks a JSON document and reports its [Problem]s.
pub trait Validate {
    /// Reads a whole JSON document from `document` and validates it. An empty
    /// result means the document is valid.
    fn validate<R: Read>(&self, document: R) -> Result<Vec<Problem>, DocumentError>;
}

/// Validates a JSON instance against a JSON schema.
///
/// ```
/// # use serde_json::json;
/// # use openc2_validate::validator::validate_json;
/// let problems = validate_json(&json!({"required": ["action"]}), &json!({})).unwrap();
/// assert_eq!(problems.len(), 1);
/// ```
pub fn validate_json(schema: &Value, instance: &Value) -> Result<Vec<Problem>, SchemaError> {
    Ok(Schema::from_json(schema)?.problems(instance))
}

/// The schemas bundled with this crate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuiltinSchema {
    /// OpenC2 command messages.
    Command,
    /// OpenC2 response messages.
    Response,
}

impl BuiltinSchema {
    pub fn name(self) -> &'static str {
        match self {
            BuiltinSchema::Command => "command",
            BuiltinSchema::Response => "response",
        }
    }

    /// Source text of the schema.
    pub fn source(self) -> &'static str {
        match self {
            BuiltinSchema::Command => include_str!("../schemas/command.json"),
            BuiltinSchema::Response => include_str!("../schemas/response.json"),
        }
    }
}
