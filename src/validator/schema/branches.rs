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

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;
use std::sync::Arc;

use jsonschema::{Retrieve, Uri, Validator};
use serde_json::{json, Value};
use tracing::warn;

/// The URI the root schema is always known under.
pub const ROOT_URI: &str = "urn:openc2-validate:root";

/// Serves the root schema document for references to any of its URIs. Every
/// other URI is refused, so compiling a schema never touches the network.
pub struct RootRetriever {
    root_value: Arc<Value>,
    uris: Vec<String>,
}

impl RootRetriever {
    pub fn new(root_value: Arc<Value>, uris: Vec<String>) -> Self {
        Self { root_value, uris }
    }
}

impl Retrieve for RootRetriever {
    fn retrieve(
        &self,
        uri: &Uri<&str>,
    ) -> Result<Value, Box<dyn std::error::Error + Send + Sync>> {
        let uri = normalize(uri.as_str());
        if self.uris.iter().any(|u| normalize(u) == uri) {
            Ok(self.root_value.as_ref().clone())
        } else {
            Err(format!("schema not found for URI: {uri}").into())
        }
    }
}

fn normalize(uri: &str) -> &str {
    uri.trim_end_matches('#').trim_end_matches('/')
}

/// Returns the URIs a root schema document is known under: [ROOT_URI] and
/// its own `$id` (or draft 4 `id`) when present.
pub fn root_uris(root_value: &Value) -> Vec<String> {
    let mut uris = vec![ROOT_URI.to_owned()];
    let id = root_value.get("$id").or_else(|| root_value.get("id")).and_then(Value::as_str);
    if let Some(id) = id {
        uris.push(id.trim_end_matches('#').to_owned());
    }
    uris
}

/// A validator for a single alternative of a combinator keyword. `wrapper` is
/// the schema it was compiled from: a `$ref` to the alternative inside the
/// root document. Schema paths of its errors start at `wrapper`.
pub struct Alternative {
    pub wrapper: Value,
    pub validator: Validator,
}

/// Compiles and caches [Alternative]s by their location in the root document.
pub struct Alternatives {
    root_value: Arc<Value>,
    uris: Vec<String>,
    cache: RefCell<HashMap<String, Option<Rc<Alternative>>>>,
}

impl Alternatives {
    pub fn new(root_value: Arc<Value>) -> Self {
        let uris = root_uris(&root_value);
        Self { root_value, uris, cache: RefCell::new(HashMap::new()) }
    }

    pub fn uris(&self) -> &[String] {
        &self.uris
    }

    /// Returns the validator for the subschema at JSON pointer `pointer` of
    /// the root document. The result, including a failure to compile, is
    /// cached and reused in subsequent calls.
    pub fn get(&self, pointer: &str) -> Option<Rc<Alternative>> {
        if let Some(entry) = self.cache.borrow().get(pointer) {
            return entry.clone();
        }
        let entry = self.compile(pointer).map(Rc::new);
        self.cache.borrow_mut().insert(pointer.to_owned(), entry.clone());
        entry
    }

    fn compile(&self, pointer: &str) -> Option<Alternative> {
        let mut wrapper = json!({ "$ref": format!("{ROOT_URI}#{pointer}") });
        if let Some(draft) = self.root_value.get("$schema") {
            wrapper["$schema"] = draft.clone();
        }
        let retriever = RootRetriever::new(Arc::clone(&self.root_value), self.uris.clone());
        match jsonschema::options().with_retriever(retriever).build(&wrapper) {
            Ok(validator) => Some(Alternative { wrapper, validator }),
            Err(e) => {
                warn!(pointer, error = %e, "failed to compile combinator alternative");
                None
            }
        }
    }
}
