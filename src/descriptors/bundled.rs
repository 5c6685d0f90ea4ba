//! Well-known descriptor files served without running protoc.

use prost_types::field_descriptor_proto::{Label, Type};
use prost_types::{DescriptorProto, FieldDescriptorProto, FileDescriptorProto, FileOptions};

pub const EMPTY: &str = "google/protobuf/empty.proto";
pub const TIMESTAMP: &str = "google/protobuf/timestamp.proto";
pub const DURATION: &str = "google/protobuf/duration.proto";

/// Names served by [`file`].
pub const BUNDLED: &[&str] = &[EMPTY, TIMESTAMP, DURATION];

pub fn is_bundled(name: &str) -> bool {
    BUNDLED.contains(&name)
}

/// The descriptor of a bundled file.
pub fn file(name: &str) -> Option<FileDescriptorProto> {
    match name {
        EMPTY => Some(well_known(EMPTY, "Empty", "emptypb", "EmptyProto", Vec::new())),
        TIMESTAMP => Some(well_known(TIMESTAMP, "Timestamp", "timestamppb", "TimestampProto", seconds_nanos())),
        DURATION => Some(well_known(DURATION, "Duration", "durationpb", "DurationProto", seconds_nanos())),
        _ => None,
    }
}

fn well_known(
    name: &str,
    message: &str,
    go_package: &str,
    outer_class: &str,
    fields: Vec<FieldDescriptorProto>,
) -> FileDescriptorProto {
    FileDescriptorProto {
        name: Some(name.to_string()),
        package: Some("google.protobuf".to_string()),
        message_type: vec![DescriptorProto {
            name: Some(message.to_string()),
            field: fields,
            ..DescriptorProto::default()
        }],
        options: Some(FileOptions {
            java_package: Some("com.google.protobuf".to_string()),
            java_outer_classname: Some(outer_class.to_string()),
            java_multiple_files: Some(true),
            go_package: Some(format!("google.golang.org/protobuf/types/known/{go_package}")),
            cc_enable_arenas: Some(true),
            objc_class_prefix: Some("GPB".to_string()),
            csharp_namespace: Some("Google.Protobuf.WellKnownTypes".to_string()),
            ..FileOptions::default()
        }),
        syntax: Some("proto3".to_string()),
        ..FileDescriptorProto::default()
    }
}

fn seconds_nanos() -> Vec<FieldDescriptorProto> {
    vec![
        scalar_field("seconds", 1, Type::Int64),
        scalar_field("nanos", 2, Type::Int32),
    ]
}

fn scalar_field(name: &str, number: i32, ty: Type) -> FieldDescriptorProto {
    FieldDescriptorProto {
        name: Some(name.to_string()),
        number: Some(number),
        label: Some(Label::Optional as i32),
        r#type: Some(ty as i32),
        json_name: Some(name.to_string()),
        ..FieldDescriptorProto::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_bundled_name_has_a_file() {
        for name in BUNDLED {
            let file = file(name).unwrap();
            assert_eq!(file.name(), *name);
            assert_eq!(file.package(), "google.protobuf");
            assert_eq!(file.syntax(), "proto3");
            assert!(file.dependency.is_empty());
        }
        assert!(file("google/api/annotations.proto").is_none());
    }

    #[test]
    fn timestamp_layout() {
        let file = file(TIMESTAMP).unwrap();
        let message = &file.message_type[0];
        assert_eq!(message.name(), "Timestamp");
        let fields: Vec<(&str, i32)> = message.field.iter().map(|f| (f.name(), f.number())).collect();
        assert_eq!(fields, vec![("seconds", 1), ("nanos", 2)]);
        assert_eq!(message.field[0].r#type(), Type::Int64);
    }
}
