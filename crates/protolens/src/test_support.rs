// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Helpers for building bundles and payloads in unit tests.

pub(crate) mod schema {
    use prost_types::field_descriptor_proto::{Label, Type};
    use prost_reflect::DescriptorPool;
    use prost_types::{
        DescriptorProto, EnumDescriptorProto, EnumValueDescriptorProto, FieldDescriptorProto,
        FileDescriptorProto, FileDescriptorSet, MessageOptions,
    };

    pub fn file(
        name: &str,
        package: &str,
        deps: &[&str],
        messages: Vec<DescriptorProto>,
    ) -> FileDescriptorProto {
        FileDescriptorProto {
            name: Some(name.to_string()),
            package: (!package.is_empty()).then(|| package.to_string()),
            dependency: deps.iter().map(|d| d.to_string()).collect(),
            message_type: messages,
            syntax: Some("proto3".to_string()),
            ..Default::default()
        }
    }

    pub fn message(name: &str, fields: Vec<FieldDescriptorProto>) -> DescriptorProto {
        DescriptorProto {
            name: Some(name.to_string()),
            field: fields,
            ..Default::default()
        }
    }

    pub fn field(name: &str, number: i32, ty: Type) -> FieldDescriptorProto {
        FieldDescriptorProto {
            name: Some(name.to_string()),
            number: Some(number),
            label: Some(Label::Optional as i32),
            r#type: Some(ty as i32),
            ..Default::default()
        }
    }

    pub fn repeated(name: &str, number: i32, ty: Type) -> FieldDescriptorProto {
        FieldDescriptorProto {
            label: Some(Label::Repeated as i32),
            ..field(name, number, ty)
        }
    }

    pub fn typed(name: &str, number: i32, ty: Type, type_name: &str) -> FieldDescriptorProto {
        FieldDescriptorProto {
            type_name: Some(type_name.to_string()),
            ..field(name, number, ty)
        }
    }

    /// Synthesized `map<K, V>` entry type.
    pub fn map_entry(name: &str, key: Type, value: Type) -> DescriptorProto {
        DescriptorProto {
            options: Some(MessageOptions {
                map_entry: Some(true),
                ..Default::default()
            }),
            ..message(name, vec![field("key", 1, key), field("value", 2, value)])
        }
    }

    pub fn enumeration(name: &str, values: &[(&str, i32)]) -> EnumDescriptorProto {
        EnumDescriptorProto {
            name: Some(name.to_string()),
            value: values
                .iter()
                .map(|(n, v)| EnumValueDescriptorProto {
                    name: Some(n.to_string()),
                    number: Some(*v),
                    ..Default::default()
                })
                .collect(),
            ..Default::default()
        }
    }

    pub fn set(files: Vec<FileDescriptorProto>) -> FileDescriptorSet {
        FileDescriptorSet { file: files }
    }

    pub fn pool(files: Vec<FileDescriptorProto>) -> DescriptorPool {
        let mut pool = DescriptorPool::new();
        for f in files {
            pool.add_file_descriptor_proto(f).unwrap();
        }
        pool
    }

    /// `google/protobuf/any.proto`.
    pub fn any_file() -> FileDescriptorProto {
        file(
            "google/protobuf/any.proto",
            "google.protobuf",
            &[],
            vec![message(
                "Any",
                vec![field("type_url", 1, Type::String), field("value", 2, Type::Bytes)],
            )],
        )
    }

    /// `shop.proto`: `Order { int64 id = 1; string customer = 2; repeated int32 items = 3; }`.
    pub fn order_file() -> FileDescriptorProto {
        file(
            "shop.proto",
            "shop",
            &[],
            vec![message(
                "Order",
                vec![
                    field("id", 1, Type::Int64),
                    field("customer", 2, Type::String),
                    repeated("items", 3, Type::Int32),
                ],
            )],
        )
    }
}

pub(crate) mod payload {
    use prost::encoding::{encode_key, encode_varint, WireType};

    pub fn key(number: u32, wire_type: WireType, buf: &mut Vec<u8>) {
        encode_key(number, wire_type, buf);
    }

    pub fn int32(number: u32, value: i32, buf: &mut Vec<u8>) {
        key(number, WireType::Varint, buf);
        encode_varint(i64::from(value) as u64, buf);
    }

    pub fn int64(number: u32, value: i64, buf: &mut Vec<u8>) {
        key(number, WireType::Varint, buf);
        encode_varint(value as u64, buf);
    }

    pub fn uint32(number: u32, value: u32, buf: &mut Vec<u8>) {
        key(number, WireType::Varint, buf);
        encode_varint(u64::from(value), buf);
    }

    pub fn uint64(number: u32, value: u64, buf: &mut Vec<u8>) {
        key(number, WireType::Varint, buf);
        encode_varint(value, buf);
    }

    pub fn sint32(number: u32, value: i32, buf: &mut Vec<u8>) {
        key(number, WireType::Varint, buf);
        encode_varint(u64::from(((value << 1) ^ (value >> 31)) as u32), buf);
    }

    pub fn boolean(number: u32, value: bool, buf: &mut Vec<u8>) {
        key(number, WireType::Varint, buf);
        encode_varint(u64::from(value), buf);
    }

    pub fn fixed32(number: u32, value: u32, buf: &mut Vec<u8>) {
        key(number, WireType::ThirtyTwoBit, buf);
        buf.extend_from_slice(&value.to_le_bytes());
    }

    pub fn float(number: u32, value: f32, buf: &mut Vec<u8>) {
        key(number, WireType::ThirtyTwoBit, buf);
        buf.extend_from_slice(&value.to_le_bytes());
    }

    pub fn double(number: u32, value: f64, buf: &mut Vec<u8>) {
        key(number, WireType::SixtyFourBit, buf);
        buf.extend_from_slice(&value.to_le_bytes());
    }

    pub fn bytes(number: u32, value: &[u8], buf: &mut Vec<u8>) {
        key(number, WireType::LengthDelimited, buf);
        encode_varint(value.len() as u64, buf);
        buf.extend_from_slice(value);
    }

    pub fn string(number: u32, value: &str, buf: &mut Vec<u8>) {
        bytes(number, value.as_bytes(), buf);
    }

    pub fn packed_varints(number: u32, values: &[i64], buf: &mut Vec<u8>) {
        let mut block = Vec::new();
        for v in values {
            encode_varint(*v as u64, &mut block);
        }
        bytes(number, &block, buf);
    }
}
