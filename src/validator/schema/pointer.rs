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

use serde_json::Value;

/// Finds where a schema path reported by the validator ends up inside the
/// root schema document. Schema paths go through `$ref` keywords, so only
/// references that point back into the root document can be followed.
pub struct KeywordLocator<'a> {
    root_value: &'a Value,
    root_uris: &'a [String],
}

impl<'a> KeywordLocator<'a> {
    /// `root_uris` are the URIs the root document is known under, used to
    /// accept absolute references such as `urn:x#/definitions/a`.
    pub fn new(root_value: &'a Value, root_uris: &'a [String]) -> Self {
        Self { root_value, root_uris }
    }

    /// Walks `schema_path` (a JSON pointer such as `/properties/a/$ref/anyOf`)
    /// starting at `start` and returns the JSON pointer of the final location
    /// relative to the root document. Returns `None` if the path leaves the
    /// root document or doesn't exist.
    pub fn locate<'s>(&self, start: &'s Value, schema_path: &str) -> Option<String>
    where
        'a: 's,
    {
        let mut node = start;
        let mut pointer = String::new();
        for segment in schema_path.split('/').skip(1) {
            if segment == "$ref" {
                // A property literally named "$ref" holds a subschema, not a string.
                if let Some(reference) = node.get("$ref").and_then(Value::as_str) {
                    let fragment = self.fragment(reference)?;
                    node = self.root_value.pointer(fragment)?;
                    pointer = fragment.to_owned();
                    continue;
                }
            }
            node = node.pointer(&format!("/{segment}"))?;
            pointer.push('/');
            pointer.push_str(segment);
        }
        Some(pointer)
    }

    /// Returns the root document node at `pointer`.
    pub fn resolve(&self, pointer: &str) -> Option<&'a Value> {
        self.root_value.pointer(pointer)
    }

    fn fragment<'r>(&self, reference: &'r str) -> Option<&'r str> {
        let (uri, fragment) = reference.split_once('#')?;
        let local = uri.is_empty() || self.root_uris.iter().any(|u| u == uri);
        (local && (fragment.is_empty() || fragment.starts_with('/'))).then_some(fragment)
    }
}
