// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Descriptor-driven decoding of Protobuf payloads.

use crate::logging::Diagnostics;
use prost::encoding::{decode_key, skip_field, DecodeContext};
use prost_reflect::{Cardinality, DynamicMessage, MessageDescriptor, ReflectMessage, Value};
use thiserror::Error;

/// Conventional Protobuf recursion limit.
pub const DEFAULT_MAX_DEPTH: usize = 100;

/// Errors for dynamic decoding.
///
/// `offset` is the start of the top-level record at fault, or the payload
/// length when the top-level message itself is incomplete.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeError {
    #[error("malformed {message} payload in the record at offset {offset}: {reason}")]
    Malformed {
        offset: usize,
        message: String,
        reason: String,
    },

    #[error("message nesting exceeds the depth limit of {limit} in the record at offset {offset}")]
    RecursionLimit { offset: usize, limit: usize },

    #[error("required field {message}.{field} is missing (offset {offset})")]
    MissingRequired {
        offset: usize,
        message: String,
        field: String,
    },
}

impl DecodeError {
    /// Byte offset where decoding failed.
    pub fn offset(&self) -> usize {
        match self {
            Self::Malformed { offset, .. }
            | Self::RecursionLimit { offset, .. }
            | Self::MissingRequired { offset, .. } => *offset,
        }
    }
}

/// Decodes raw bytes into a [`DynamicMessage`].
///
/// Holds no state beyond its settings and may be shared across threads.
#[derive(Debug, Clone, Copy)]
pub struct DynamicDecoder<'a> {
    diagnostics: &'a Diagnostics,
    max_depth: usize,
}

impl<'a> DynamicDecoder<'a> {
    pub fn new(diagnostics: &'a Diagnostics) -> Self {
        Self {
            diagnostics,
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }

    /// Override the nesting limit for messages and groups.
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    pub fn max_depth(&self) -> usize {
        self.max_depth
    }

    /// Decode `bytes` as one `descriptor` message. All-or-nothing.
    ///
    /// Unknown fields are logged at debug and dropped from the result.
    pub fn decode(
        &self,
        descriptor: &MessageDescriptor,
        bytes: &[u8],
    ) -> Result<DynamicMessage, DecodeError> {
        let mut message = self.decode_at_depth(descriptor, bytes, 0)?;
        self.discard_unknown(&mut message);
        Ok(message)
    }

    /// Decode an embedded payload that already sits `depth` levels deep.
    /// Unknown fields are kept and not logged.
    pub(crate) fn decode_at_depth(
        &self,
        descriptor: &MessageDescriptor,
        bytes: &[u8],
        depth: usize,
    ) -> Result<DynamicMessage, DecodeError> {
        if depth > self.max_depth {
            return Err(DecodeError::RecursionLimit {
                offset: 0,
                limit: self.max_depth,
            });
        }
        let message = DynamicMessage::decode(descriptor.clone(), bytes).map_err(|err| {
            DecodeError::Malformed {
                offset: failing_record(descriptor, bytes),
                message: descriptor.full_name().to_string(),
                reason: err.to_string(),
            }
        })?;

        if let Some(number) = message
            .fields()
            .find(|(_, value)| depth + nesting(value) > self.max_depth)
            .map(|(field, _)| field.number())
        {
            return Err(DecodeError::RecursionLimit {
                offset: first_record(bytes, number),
                limit: self.max_depth,
            });
        }

        if let Some(field) = unset_required(&message) {
            return Err(DecodeError::MissingRequired {
                offset: bytes.len(),
                message: descriptor.full_name().to_string(),
                field,
            });
        }
        for (field, value) in message.fields() {
            if let Some((inner, missing)) = nested_unset_required(value) {
                return Err(DecodeError::MissingRequired {
                    offset: first_record(bytes, field.number()),
                    message: inner,
                    field: missing,
                });
            }
        }

        Ok(message)
    }

    fn discard_unknown(&self, message: &mut DynamicMessage) {
        let name = message.descriptor().full_name().to_string();
        for unknown in message.take_unknown_fields() {
            self.diagnostics.debug(format_args!(
                "{}: skipping unknown field {}",
                name,
                unknown.number()
            ));
        }
        for (_, value) in message.fields_mut() {
            self.discard_unknown_in(value);
        }
    }

    fn discard_unknown_in(&self, value: &mut Value) {
        match value {
            Value::Message(nested) => self.discard_unknown(nested),
            Value::List(items) => items.iter_mut().for_each(|v| self.discard_unknown_in(v)),
            Value::Map(entries) => entries.values_mut().for_each(|v| self.discard_unknown_in(v)),
            _ => {}
        }
    }
}

/// Levels of message nesting below a field value.
fn nesting(value: &Value) -> usize {
    match value {
        Value::Message(nested) => {
            1 + nested
                .fields()
                .map(|(_, v)| nesting(v))
                .max()
                .unwrap_or(0)
        }
        Value::List(items) => items.iter().map(nesting).max().unwrap_or(0),
        Value::Map(entries) => entries.values().map(nesting).max().unwrap_or(0),
        _ => 0,
    }
}

fn unset_required(message: &DynamicMessage) -> Option<String> {
    message
        .descriptor()
        .fields()
        .find(|f| f.cardinality() == Cardinality::Required && !message.has_field(f))
        .map(|f| f.name().to_string())
}

/// First unset required field below `value`, as (message, field).
fn nested_unset_required(value: &Value) -> Option<(String, String)> {
    match value {
        Value::Message(nested) => unset_required(nested)
            .map(|field| (nested.descriptor().full_name().to_string(), field))
            .or_else(|| nested.fields().find_map(|(_, v)| nested_unset_required(v))),
        Value::List(items) => items.iter().find_map(nested_unset_required),
        Value::Map(entries) => entries.values().find_map(nested_unset_required),
        _ => None,
    }
}

/// A top-level wire record: field number and byte span.
struct Record {
    number: u32,
    start: usize,
    end: usize,
}

/// Split `bytes` into top-level records. The second value is the offset of
/// the first record that cannot be framed.
fn records(bytes: &[u8]) -> (Vec<Record>, Option<usize>) {
    let mut buf = bytes;
    let mut out = Vec::new();
    while !buf.is_empty() {
        let start = bytes.len() - buf.len();
        let framed = decode_key(&mut buf)
            .and_then(|(number, wire_type)| {
                skip_field(wire_type, number, &mut buf, DecodeContext::default()).map(|()| number)
            });
        match framed {
            Ok(number) => out.push(Record {
                number,
                start,
                end: bytes.len() - buf.len(),
            }),
            Err(_) => return (out, Some(start)),
        }
    }
    (out, None)
}

/// Start of the first top-level record whose inclusion makes `bytes` fail.
fn failing_record(descriptor: &MessageDescriptor, bytes: &[u8]) -> usize {
    let (records, broken) = records(bytes);
    records
        .iter()
        .find(|r| DynamicMessage::decode(descriptor.clone(), &bytes[..r.end]).is_err())
        .map(|r| r.start)
        .or(broken)
        .unwrap_or(0)
}

fn first_record(bytes: &[u8], number: u32) -> usize {
    records(bytes)
        .0
        .iter()
        .find(|r| r.number == number)
        .map_or(0, |r| r.start)
}
