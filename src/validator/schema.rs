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

//! A compiled JSON Schema. Keyword evaluation is done by the `jsonschema`
//! crate; this module turns its errors into [Problem] trees, expanding failed
//! `anyOf`/`oneOf` keywords into one branch-group per alternative.

use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;
use std::sync::Arc;

use branches::{Alternatives, RootRetriever};
use jsonschema::error::ValidationErrorKind;
use jsonschema::{ValidationError, Validator};
use pointer::KeywordLocator;
use serde_json::Value;
use thiserror::Error;

use super::{BuiltinSchema, DocumentError, Validate};
use crate::problem::Problem;

mod branches;
mod pointer;

#[derive(Debug, Error)]
pub enum SchemaError {
    #[error("Failed to read schema: {0}")]
    Io(#[from] std::io::Error),
    #[error("Malformed JSON schema: {0}")]
    Malformed(#[from] serde_json::Error),
    #[error("Invalid JSON schema: {0}")]
    Invalid(String),
}

/// Represents a schema file.
pub struct Schema {
    root_value: Arc<Value>,
    validator: Validator,
    alternatives: Alternatives,
}

impl Schema {
    /// Compiles a [Schema] from a root [Value]. The result can be later used to
    /// validate JSON instances against this schema.
    ///
    /// ```
    /// # use serde_json::json;
    /// # use openc2_validate::validator::Schema;
    /// let s = Schema::from_json(&json!({"type": "object"})).unwrap();
    /// assert!(s.problems(&json!({})).is_empty());
    /// assert_eq!(s.problems(&json!(42)).len(), 1);
    /// ```
    pub fn from_json(input: &Value) -> Result<Self, SchemaError> {
        let root_value = Arc::new(input.clone());
        let alternatives = Alternatives::new(Arc::clone(&root_value));
        let retriever = RootRetriever::new(Arc::clone(&root_value), alternatives.uris().to_vec());
        let validator = jsonschema::options()
            .with_retriever(retriever)
            .build(&root_value)
            .map_err(|e| SchemaError::Invalid(e.to_string()))?;

        Ok(Schema { root_value, validator, alternatives })
    }

    /// Reads and compiles a schema document.
    pub fn from_reader<R: Read>(reader: R) -> Result<Self, SchemaError> {
        Self::from_json(&serde_json::from_reader(reader)?)
    }

    /// Reads and compiles the schema file at `path`.
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self, SchemaError> {
        Self::from_reader(BufReader::new(File::open(path)?))
    }

    /// Compiles one of the schemas bundled with this crate.
    pub fn builtin(schema: BuiltinSchema) -> Result<Self, SchemaError> {
        Self::from_json(&serde_json::from_str(schema.source())?)
    }

    /// Validates a JSON [Value] against this [Schema] and returns every
    /// top-level [Problem], in the order they were found.
    pub fn problems(&self, instance: &Value) -> Vec<Problem> {
        self.collect(&self.validator, &self.root_value, instance, "")
    }

    /// `base` is the schema document `validator` was compiled from, which is
    /// where the schema paths of its errors start. `location` is the location
    /// of `instance` in the whole document.
    fn collect(
        &self,
        validator: &Validator,
        base: &Value,
        instance: &Value,
        location: &str,
    ) -> Vec<Problem> {
        validator.iter_errors(instance).map(|e| self.problem(e, base, location)).collect()
    }

    fn problem(&self, error: ValidationError<'_>, base: &Value, location: &str) -> Problem {
        let location = format!("{location}{}", error.instance_path);
        let message = error.to_string();
        let context =
            format!("[{}] {message}", if location.is_empty() { "/" } else { location.as_str() });
        match error.kind {
            ValidationErrorKind::AnyOf { .. } | ValidationErrorKind::OneOfNotValid { .. } => {
                let branches = self
                    .branches(base, &error.schema_path.to_string(), &error.instance, &location)
                    .unwrap_or_default();
                Problem::branching(message, context, branches)
            }
            _ => Problem::leaf(message, context),
        }
    }

    /// Validates `instance` against every alternative of the combinator at
    /// `schema_path`. Returns `None` if the combinator can't be found in the
    /// root document or one of its alternatives can't be compiled.
    fn branches(
        &self,
        base: &Value,
        schema_path: &str,
        instance: &Value,
        location: &str,
    ) -> Option<Vec<Vec<Problem>>> {
        let locator = KeywordLocator::new(&self.root_value, self.alternatives.uris());
        let pointer = locator.locate(base, schema_path)?;
        let count = locator.resolve(&pointer)?.as_array()?.len();
        (0..count)
            .map(|i| {
                let alternative = self.alternatives.get(&format!("{pointer}/{i}"))?;
                Some(self.collect(
                    &alternative.validator,
                    &alternative.wrapper,
                    instance,
                    location,
                ))
            })
            .collect()
    }
}

impl Validate for Schema {
    fn validate<R: Read>(&self, document: R) -> Result<Vec<Problem>, DocumentError> {
        let instance: Value = serde_json::from_reader(document)?;
        Ok(self.problems(&instance))
    }
}
