// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Bundle container: a serialized `google.protobuf.FileDescriptorSet`.

use prost::Message;
use prost_types::FileDescriptorSet;

/// Parse the container. File entries keep their stored order.
pub(crate) fn parse(bytes: &[u8]) -> Result<FileDescriptorSet, prost::DecodeError> {
    FileDescriptorSet::decode(bytes)
}
