// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Dependency-ordered linking of file schemas.
//!
//! Files are added strictly in bundle order to a growing
//! [`DescriptorPool`]. A file may only import names already in the pool, so
//! forward references fail before the pool sees the file. Name resolution,
//! symbol uniqueness and field validation are left to the pool.

use crate::bundle::ResolvedFileSchema;
use prost_reflect::{DescriptorError, DescriptorPool, FileDescriptor, MessageDescriptor};
use prost_types::{FileDescriptorProto, FileDescriptorSet};
use std::collections::HashSet;
use thiserror::Error;

/// Structural problems found while linking a bundle.
#[derive(Debug, Error)]
pub enum SchemaError {
    #[error("file entry #{position} has no name")]
    MissingFileName { position: usize },

    #[error("file {file} appears twice in the bundle")]
    DuplicateFile { file: String },

    #[error("file {file} imports {import}, which is not defined earlier in the bundle")]
    UnresolvedImport { file: String, import: String },

    #[error("file {file} has public import index {index} out of range")]
    InvalidPublicImport { file: String, index: i32 },

    #[error("invalid file {file}: {source}")]
    Descriptor {
        file: String,
        #[source]
        source: DescriptorError,
    },
}

/// Output of a successful link.
#[derive(Debug)]
pub(crate) struct Linked {
    pub files: Vec<ResolvedFileSchema>,
    pub pool: DescriptorPool,
}

pub(crate) fn link(set: FileDescriptorSet) -> Result<Linked, SchemaError> {
    let mut pool = DescriptorPool::new();
    let mut seen = HashSet::new();
    let mut files = Vec::with_capacity(set.file.len());

    for (position, proto) in set.file.into_iter().enumerate() {
        let name = check_file(position, &proto, &seen)?;
        let public_imports = public_imports(&name, &proto)?;
        pool.add_file_descriptor_proto(proto)
            .map_err(|source| SchemaError::Descriptor {
                file: name.clone(),
                source,
            })?;
        let Some(file) = pool.get_file_by_name(&name) else {
            return Err(SchemaError::MissingFileName { position });
        };
        files.push(resolved(&file, public_imports));
        seen.insert(name);
    }

    Ok(Linked { files, pool })
}

/// Checks that run before the pool sees the file. Returns the file name.
fn check_file(
    position: usize,
    proto: &FileDescriptorProto,
    seen: &HashSet<String>,
) -> Result<String, SchemaError> {
    let name = match proto.name.as_deref() {
        Some(name) if !name.is_empty() => name.to_string(),
        _ => return Err(SchemaError::MissingFileName { position }),
    };
    if seen.contains(&name) {
        return Err(SchemaError::DuplicateFile { file: name });
    }
    if let Some(import) = proto.dependency.iter().find(|d| !seen.contains(*d)) {
        return Err(SchemaError::UnresolvedImport {
            file: name,
            import: import.clone(),
        });
    }
    Ok(name)
}

fn public_imports(file: &str, proto: &FileDescriptorProto) -> Result<Vec<String>, SchemaError> {
    proto
        .public_dependency
        .iter()
        .map(|&index| {
            usize::try_from(index)
                .ok()
                .and_then(|i| proto.dependency.get(i))
                .cloned()
                .ok_or_else(|| SchemaError::InvalidPublicImport {
                    file: file.to_string(),
                    index,
                })
        })
        .collect()
}

fn resolved(file: &FileDescriptor, public_imports: Vec<String>) -> ResolvedFileSchema {
    let messages = declared_messages(file);
    let mut enums: Vec<String> = file.enums().map(|e| e.full_name().to_string()).collect();
    for message in &messages {
        enums.extend(message.child_enums().map(|e| e.full_name().to_string()));
    }
    ResolvedFileSchema {
        name: file.name().to_string(),
        package: file.package_name().to_string(),
        syntax: file.syntax(),
        imports: file.dependencies().map(|d| d.name().to_string()).collect(),
        public_imports,
        messages: messages.iter().map(|m| m.full_name().to_string()).collect(),
        enums,
    }
}

/// Every message declared in `file`, each outer type before its nested ones.
pub(crate) fn declared_messages(file: &FileDescriptor) -> Vec<MessageDescriptor> {
    fn visit(message: MessageDescriptor, out: &mut Vec<MessageDescriptor>) {
        let children: Vec<_> = message.child_messages().collect();
        out.push(message);
        for child in children {
            visit(child, out);
        }
    }

    let mut out = Vec::new();
    for message in file.messages() {
        visit(message, &mut out);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::schema::{enumeration, field, file, message, order_file, set, typed};
    use prost_reflect::{Kind, Syntax};
    use prost_types::field_descriptor_proto::{Label, Type};
    use prost_types::{DescriptorProto, FieldDescriptorProto};

    fn link_files(files: Vec<FileDescriptorProto>) -> Result<Linked, SchemaError> {
        link(set(files))
    }

    fn common_file() -> FileDescriptorProto {
        FileDescriptorProto {
            enum_type: vec![enumeration("Currency", &[("EUR", 0), ("USD", 1)])],
            ..file(
                "common.proto",
                "common",
                &[],
                vec![message("Money", vec![field("units", 1, Type::Int64)])],
            )
        }
    }

    fn invoice_file() -> FileDescriptorProto {
        file(
            "invoice.proto",
            "billing",
            &["common.proto"],
            vec![message(
                "Invoice",
                vec![
                    typed("total", 1, Type::Message, ".common.Money"),
                    typed("currency", 2, Type::Enum, ".common.Currency"),
                ],
            )],
        )
    }

    #[test]
    fn test_links_in_bundle_order() {
        let linked = link_files(vec![common_file(), invoice_file()]).unwrap();
        let names: Vec<&str> = linked.files.iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, vec!["common.proto", "invoice.proto"]);
        assert_eq!(linked.files[1].imports, vec!["common.proto".to_string()]);
        assert_eq!(linked.files[0].enums, vec!["common.Currency".to_string()]);
        assert_eq!(linked.files[0].syntax, Syntax::Proto3);

        let invoice = linked.pool.get_message_by_name("billing.Invoice").unwrap();
        match invoice.get_field_by_name("total").unwrap().kind() {
            Kind::Message(money) => assert_eq!(money.full_name(), "common.Money"),
            other => panic!("unexpected kind {other:?}"),
        }
        match invoice.get_field_by_name("currency").unwrap().kind() {
            Kind::Enum(currency) => assert_eq!(currency.full_name(), "common.Currency"),
            other => panic!("unexpected kind {other:?}"),
        }
    }

    #[test]
    fn test_forward_import_is_rejected() {
        let err = link_files(vec![invoice_file(), common_file()]).unwrap_err();
        assert!(matches!(
            err,
            SchemaError::UnresolvedImport { ref file, ref import }
                if file == "invoice.proto" && import == "common.proto"
        ));
    }

    #[test]
    fn test_duplicate_file_and_nameless_file() {
        let err = link_files(vec![order_file(), order_file()]).unwrap_err();
        assert!(matches!(err, SchemaError::DuplicateFile { .. }));

        let nameless = FileDescriptorProto::default();
        assert!(matches!(
            link_files(vec![nameless]).unwrap_err(),
            SchemaError::MissingFileName { position: 0 }
        ));
    }

    #[test]
    fn test_duplicate_symbol_is_rejected() {
        let a = file("a.proto", "shop", &[], vec![message("Cart", Vec::new())]);
        let b = file("b.proto", "shop", &[], vec![message("Basket", Vec::new())]);
        assert!(link_files(vec![a.clone(), b]).is_ok());

        let clash = file("c.proto", "shop", &[], vec![message("Cart", Vec::new())]);
        let err = link_files(vec![a, clash]).unwrap_err();
        assert!(matches!(err, SchemaError::Descriptor { ref file, .. } if file == "c.proto"));
    }

    #[test]
    fn test_unresolved_type_is_rejected() {
        let broken = file(
            "broken.proto",
            "shop",
            &[],
            vec![message(
                "Order",
                vec![typed("line", 1, Type::Message, ".shop.Line")],
            )],
        );
        let err = link_files(vec![broken]).unwrap_err();
        assert!(matches!(err, SchemaError::Descriptor { .. }));
        assert!(err.to_string().contains("broken.proto"));
    }

    #[test]
    fn test_nested_types_are_listed_outer_first() {
        let line = message("Line", vec![field("sku", 1, Type::String)]);
        let order = DescriptorProto {
            nested_type: vec![line],
            enum_type: vec![enumeration("State", &[("OPEN", 0)])],
            ..message(
                "Order",
                vec![FieldDescriptorProto {
                    label: Some(Label::Repeated as i32),
                    ..typed("lines", 1, Type::Message, ".shop.Order.Line")
                }],
            )
        };
        let top_level_line = message("Line", vec![field("text", 1, Type::String)]);
        let shop = file("shop.proto", "shop", &[], vec![order, top_level_line]);
        let linked = link_files(vec![shop]).unwrap();

        assert_eq!(
            linked.files[0].messages,
            vec!["shop.Order", "shop.Order.Line", "shop.Line"]
        );
        assert_eq!(linked.files[0].enums, vec!["shop.Order.State"]);

        let lines = linked
            .pool
            .get_message_by_name("shop.Order")
            .and_then(|m| m.get_field_by_name("lines"))
            .unwrap();
        assert!(lines.is_list());
        match lines.kind() {
            Kind::Message(line) => assert_eq!(line.full_name(), "shop.Order.Line"),
            other => panic!("unexpected kind {other:?}"),
        }
    }

    #[test]
    fn test_public_imports() {
        let facade = FileDescriptorProto {
            public_dependency: vec![0],
            ..file("facade.proto", "", &["common.proto"], Vec::new())
        };
        let user = file(
            "user.proto",
            "app",
            &["facade.proto"],
            vec![message(
                "Wallet",
                vec![typed("cash", 1, Type::Message, ".common.Money")],
            )],
        );
        let linked = link_files(vec![common_file(), facade.clone(), user]).unwrap();
        assert_eq!(linked.files[1].public_imports, vec!["common.proto".to_string()]);
        assert!(linked.files[2].public_imports.is_empty());

        let bad_index = FileDescriptorProto {
            public_dependency: vec![3],
            ..facade
        };
        assert!(matches!(
            link_files(vec![common_file(), bad_index]).unwrap_err(),
            SchemaError::InvalidPublicImport { index: 3, .. }
        ));
    }
}
