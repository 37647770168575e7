// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Name-keyed lookup over every message type of a loaded bundle.
//!
//! Fully-qualified names are unique in a linked bundle, so that lookup is
//! exact. Simple names are not: two files may both declare `Event`. Which
//! one a simple-name lookup returns is governed by [`SimpleNamePolicy`],
//! applied over the flattening order (bundle order, then declaration order,
//! outer types before their nested types).
//!
//! Synthesized map-entry types are reachable by full name only.

use crate::bundle::declared_messages;
use prost_reflect::{DescriptorPool, EnumDescriptor, MessageDescriptor};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// How a simple-name lookup resolves a name declared more than once.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SimpleNamePolicy {
    /// The first declaration in flattening order wins.
    #[default]
    FirstWins,
    /// The last declaration in flattening order wins.
    LastWins,
    /// Ambiguous names are rejected.
    Reject,
}

/// Outcome of a simple-name lookup.
#[derive(Debug, Clone, PartialEq)]
pub enum Lookup {
    Found(MessageDescriptor),
    NotFound,
    /// Only under [`SimpleNamePolicy::Reject`]: every candidate's full name.
    Ambiguous(Vec<String>),
}

/// Immutable type lookup tables over a linked [`DescriptorPool`].
#[derive(Debug, Clone)]
pub struct TypeIndex {
    pool: DescriptorPool,
    /// Message types in flattening order, map entries excluded.
    order: Vec<MessageDescriptor>,
    /// Simple name -> positions in `order`.
    simple: HashMap<String, Vec<usize>>,
    policy: SimpleNamePolicy,
}

impl TypeIndex {
    /// Index every message of `pool`, files in the order they were added.
    pub fn new(pool: DescriptorPool, policy: SimpleNamePolicy) -> Self {
        let order: Vec<MessageDescriptor> = pool
            .files()
            .flat_map(|file| declared_messages(&file))
            .filter(|m| !m.is_map_entry())
            .collect();
        let mut simple: HashMap<String, Vec<usize>> = HashMap::new();
        for (position, message) in order.iter().enumerate() {
            simple
                .entry(message.name().to_string())
                .or_default()
                .push(position);
        }
        TypeIndex {
            pool,
            order,
            simple,
            policy,
        }
    }

    pub fn pool(&self) -> &DescriptorPool {
        &self.pool
    }

    pub fn policy(&self) -> SimpleNamePolicy {
        self.policy
    }

    /// Exact fully-qualified message lookup; a leading dot is accepted.
    pub fn message(&self, full_name: &str) -> Option<MessageDescriptor> {
        self.pool
            .get_message_by_name(full_name.strip_prefix('.').unwrap_or(full_name))
    }

    /// Exact fully-qualified enum lookup; a leading dot is accepted.
    pub fn enumeration(&self, full_name: &str) -> Option<EnumDescriptor> {
        self.pool
            .get_enum_by_name(full_name.strip_prefix('.').unwrap_or(full_name))
    }

    /// Simple-name lookup under the index policy.
    pub fn by_simple_name(&self, name: &str) -> Lookup {
        let Some(positions) = self.simple.get(name) else {
            return Lookup::NotFound;
        };
        let chosen = match self.policy {
            SimpleNamePolicy::FirstWins => positions.first(),
            SimpleNamePolicy::LastWins => positions.last(),
            SimpleNamePolicy::Reject if positions.len() > 1 => {
                return Lookup::Ambiguous(self.candidates(name));
            }
            SimpleNamePolicy::Reject => positions.first(),
        };
        match chosen.and_then(|&p| self.order.get(p)) {
            Some(descriptor) => Lookup::Found(descriptor.clone()),
            None => Lookup::NotFound,
        }
    }

    /// User-facing type selection: an exact fully-qualified match when the
    /// name is dotted, otherwise the simple-name policy.
    pub fn select(&self, name: &str) -> Lookup {
        if name.contains('.') {
            if let Some(descriptor) = self.message(name) {
                return Lookup::Found(descriptor);
            }
        }
        self.by_simple_name(name)
    }

    /// Full names of the types sharing a simple name, in flattening order.
    pub fn candidates(&self, name: &str) -> Vec<String> {
        self.simple
            .get(name)
            .into_iter()
            .flatten()
            .filter_map(|&p| self.order.get(p))
            .map(|m| m.full_name().to_string())
            .collect()
    }

    /// Simple names of every message type, in flattening order.
    pub fn message_types(&self) -> Vec<&str> {
        self.order.iter().map(MessageDescriptor::name).collect()
    }

    /// Descriptors in flattening order.
    pub fn messages(&self) -> impl Iterator<Item = &MessageDescriptor> {
        self.order.iter()
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    pub fn enum_count(&self) -> usize {
        self.pool.all_enums().count()
    }
}
