// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Canonical single-line JSON rendering of decoded messages.
//!
//! Subtrees without `google.protobuf.Any` go straight through
//! `prost_reflect`'s serializer. Subtrees holding an `Any` are walked here so
//! that an embedded type which cannot be resolved or decoded degrades to raw
//! bytes instead of failing the whole message.

use crate::decode::{DynamicDecoder, DEFAULT_MAX_DEPTH};
use crate::index::TypeIndex;
use crate::logging::Diagnostics;
use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use prost_reflect::{
    DynamicMessage, FieldDescriptor, Kind, MapKey, MessageDescriptor, ReflectMessage, SerializeOptions, Value,
};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value as JsonValue};

const ANY_TYPE_NAME: &str = "google.protobuf.Any";

/// Rendering switches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RenderOptions {
    /// Key objects by JSON name instead of declared field name.
    pub json_names: bool,
    /// Print every field that has no explicit presence, with its default
    /// when unset.
    pub emit_implicit_defaults: bool,
}

/// One `Any` value that could not be expanded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderFallback {
    /// Dotted path of the field inside the rendered message, e.g. `events[1].payload`.
    pub path: String,
    pub type_url: String,
    pub reason: String,
}

/// Rendered output. `json` never contains a line break.
#[derive(Debug, Clone, PartialEq)]
pub struct Rendered {
    pub json: String,
    pub fallbacks: Vec<RenderFallback>,
}

/// Converts a [`DynamicMessage`] into JSON, expanding `Any` values through
/// the type index.
#[derive(Debug, Clone, Copy)]
pub struct CanonicalJsonRenderer<'a> {
    index: &'a TypeIndex,
    diagnostics: &'a Diagnostics,
    options: RenderOptions,
    max_depth: usize,
}

impl<'a> CanonicalJsonRenderer<'a> {
    pub fn new(index: &'a TypeIndex, diagnostics: &'a Diagnostics) -> Self {
        Self {
            index,
            diagnostics,
            options: RenderOptions::default(),
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }

    pub fn with_options(mut self, options: RenderOptions) -> Self {
        self.options = options;
        self
    }

    /// Nesting limit used when decoding embedded `Any` payloads.
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    /// Render as compact JSON text.
    pub fn render(&self, message: &DynamicMessage) -> Rendered {
        let (value, fallbacks) = self.render_value(message);
        Rendered {
            json: value.to_string(),
            fallbacks,
        }
    }

    /// Render into a `serde_json` tree.
    pub fn render_value(&self, message: &DynamicMessage) -> (JsonValue, Vec<RenderFallback>) {
        let mut fallbacks = Vec::new();
        let value = self.message(message, "", 0, &mut fallbacks);
        (value, fallbacks)
    }

    fn serialize_options(&self) -> SerializeOptions {
        SerializeOptions::new()
            .use_proto_field_name(!self.options.json_names)
            .skip_default_fields(!self.options.emit_implicit_defaults)
    }

    fn key(&self, field: &FieldDescriptor) -> String {
        if self.options.json_names {
            field.json_name().to_string()
        } else {
            field.name().to_string()
        }
    }

    fn message(
        &self,
        message: &DynamicMessage,
        path: &str,
        depth: usize,
        fallbacks: &mut Vec<RenderFallback>,
    ) -> JsonValue {
        if is_any(&message.descriptor()) {
            return self.any(message, path, depth, fallbacks);
        }
        if !contains_any(message) {
            if let Some(json) = self.serialize(message) {
                return json;
            }
        }
        self.walk(message, path, depth, fallbacks)
    }

    fn serialize(&self, message: &DynamicMessage) -> Option<JsonValue> {
        let mut json = message
            .serialize_with_options(serde_json::value::Serializer, &self.serialize_options())
            .ok()?;
        self.sort_map_keys(&message.descriptor(), &mut json);
        Some(json)
    }

    /// Field-number order. Fields holding an `Any` are rendered here, the
    /// rest come from serializing a copy without them.
    fn walk(
        &self,
        message: &DynamicMessage,
        path: &str,
        depth: usize,
        fallbacks: &mut Vec<RenderFallback>,
    ) -> JsonValue {
        let descriptor = message.descriptor();
        let mut fields: Vec<FieldDescriptor> = descriptor.fields().collect();
        fields.sort_by_key(FieldDescriptor::number);

        let mut clean = message.clone();
        let mut walked = Vec::new();
        for field in &fields {
            if message.has_field(field) && value_contains_any(&message.get_field(field)) {
                clean.clear_field(field);
                walked.push(field.number());
            }
        }
        let mut serialized = match self.serialize(&clean) {
            Some(JsonValue::Object(object)) => object,
            _ => Map::new(),
        };

        let mut object = Map::new();
        for field in &fields {
            let key = self.key(field);
            if walked.contains(&field.number()) {
                let field_path = join(path, &key);
                let value = self.value(&message.get_field(field), &field_path, depth, fallbacks);
                object.insert(key, value);
            } else if let Some(value) = serialized.remove(&key) {
                object.insert(key, value);
            }
        }
        JsonValue::Object(object)
    }

    /// A field value below a walked message. Only message-bearing values
    /// are walked, so scalars never reach here.
    fn value(
        &self,
        value: &Value,
        path: &str,
        depth: usize,
        fallbacks: &mut Vec<RenderFallback>,
    ) -> JsonValue {
        match value {
            Value::Message(nested) => self.message(nested, path, depth + 1, fallbacks),
            Value::List(items) => JsonValue::Array(
                items
                    .iter()
                    .enumerate()
                    .map(|(i, item)| self.value(item, &format!("{path}[{i}]"), depth, fallbacks))
                    .collect(),
            ),
            Value::Map(entries) => {
                let mut entries: Vec<(String, &Value)> =
                    entries.iter().map(|(k, v)| (map_key(k), v)).collect();
                entries.sort_by(|a, b| a.0.cmp(&b.0));
                let mut object = Map::new();
                for (key, entry) in entries {
                    let rendered = self.value(entry, &format!("{path}[{key}]"), depth, fallbacks);
                    object.insert(key, rendered);
                }
                JsonValue::Object(object)
            }
            _ => JsonValue::Null,
        }
    }

    /// `{"@type": url, ...embedded fields}`, or `{"@type": url, "value": base64}`
    /// when the embedded type cannot be decoded.
    fn any(
        &self,
        message: &DynamicMessage,
        path: &str,
        depth: usize,
        fallbacks: &mut Vec<RenderFallback>,
    ) -> JsonValue {
        let type_url = message
            .get_field_by_name("type_url")
            .and_then(|v| v.as_str().map(str::to_string))
            .unwrap_or_default();
        let bytes = message
            .get_field_by_name("value")
            .and_then(|v| v.as_bytes().map(|b| b.to_vec()))
            .unwrap_or_default();
        if type_url.is_empty() && bytes.is_empty() {
            return JsonValue::Object(Map::new());
        }

        let mut object = Map::new();
        object.insert("@type".to_string(), JsonValue::String(type_url.clone()));
        match self.embedded(&type_url, &bytes, depth) {
            Ok(inner) if is_any(&inner.descriptor()) => {
                let nested = self.any(&inner, path, depth + 1, fallbacks);
                object.insert("value".to_string(), nested);
            }
            Ok(inner) => {
                let rendered = self.message(&inner, path, depth + 1, fallbacks);
                if let JsonValue::Object(fields) = rendered {
                    object.extend(fields);
                }
            }
            Err(reason) => {
                self.diagnostics.warn(format_args!(
                    "{}: rendering Any {} as raw bytes: {}",
                    if path.is_empty() { "<root>" } else { path },
                    type_url,
                    reason
                ));
                fallbacks.push(RenderFallback {
                    path: path.to_string(),
                    type_url,
                    reason,
                });
                object.insert("value".to_string(), JsonValue::String(STANDARD.encode(&bytes)));
            }
        }
        JsonValue::Object(object)
    }

    fn embedded(
        &self,
        type_url: &str,
        bytes: &[u8],
        depth: usize,
    ) -> Result<DynamicMessage, String> {
        let type_name = type_url.rsplit('/').next().unwrap_or(type_url);
        let descriptor = self
            .index
            .message(type_name)
            .ok_or_else(|| format!("type {type_name} is not defined in the bundle"))?;
        DynamicDecoder::new(self.diagnostics)
            .with_max_depth(self.max_depth)
            .decode_at_depth(&descriptor, bytes, depth + 1)
            .map_err(|e| e.to_string())
    }

    /// Map fields serialize in hash order; sort their keys by text.
    fn sort_map_keys(&self, descriptor: &MessageDescriptor, json: &mut JsonValue) {
        let JsonValue::Object(object) = json else {
            return;
        };
        for field in descriptor.fields() {
            let Kind::Message(nested) = field.kind() else {
                continue;
            };
            let Some(value) = object.get_mut(&self.key(&field)) else {
                continue;
            };
            if field.is_map() {
                let JsonValue::Object(entries) = value else {
                    continue;
                };
                let mut sorted: Vec<(String, JsonValue)> =
                    std::mem::take(entries).into_iter().collect();
                sorted.sort_by(|a, b| a.0.cmp(&b.0));
                if let Kind::Message(value_type) = nested.map_entry_value_field().kind() {
                    for (_, entry) in &mut sorted {
                        self.sort_map_keys(&value_type, entry);
                    }
                }
                entries.extend(sorted);
            } else if let JsonValue::Array(items) = value {
                for item in items {
                    self.sort_map_keys(&nested, item);
                }
            } else {
                self.sort_map_keys(&nested, value);
            }
        }
    }
}

fn is_any(descriptor: &MessageDescriptor) -> bool {
    descriptor.full_name() == ANY_TYPE_NAME
}

fn contains_any(message: &DynamicMessage) -> bool {
    is_any(&message.descriptor()) || message.fields().any(|(_, v)| value_contains_any(v))
}

fn value_contains_any(value: &Value) -> bool {
    match value {
        Value::Message(nested) => contains_any(nested),
        Value::List(items) => items.iter().any(value_contains_any),
        Value::Map(entries) => entries.values().any(value_contains_any),
        _ => false,
    }
}

fn join(path: &str, key: &str) -> String {
    if path.is_empty() {
        key.to_string()
    } else {
        format!("{path}.{key}")
    }
}

fn map_key(key: &MapKey) -> String {
    match key {
        MapKey::Bool(v) => v.to_string(),
        MapKey::I32(v) => v.to_string(),
        MapKey::I64(v) => v.to_string(),
        MapKey::U32(v) => v.to_string(),
        MapKey::U64(v) => v.to_string(),
        MapKey::String(v) => v.clone(),
    }
}
