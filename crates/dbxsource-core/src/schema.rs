//! Graph schema contribution
//!
//! When folder nodes are enabled, consumers need the typed file nodes to be
//! reachable from their folder. Each folder type lists its children through
//! a link from the folder's `folderPath` to the file's `directory`.

use std::fmt;

use crate::config::SourceConfig;
use crate::domain::NodeKind;

/// A field of a node type
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldDefinition {
    pub name: String,
    pub type_ref: String,
    /// Directive appended to the field, e.g. `@link(...)`
    pub directive: Option<String>,
}

impl FieldDefinition {
    fn scalar(name: &str) -> Self {
        Self {
            name: name.to_string(),
            type_ref: "String".to_string(),
            directive: None,
        }
    }

    fn children(kind: NodeKind) -> Self {
        let type_name = kind.type_name();
        Self {
            name: type_name.to_string(),
            type_ref: format!("[{type_name}]"),
            directive: Some(r#"@link(from: "folderPath", by: "directory")"#.to_string()),
        }
    }
}

/// A node type contributed to the host schema
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeDefinition {
    pub name: String,
    pub fields: Vec<FieldDefinition>,
}

impl TypeDefinition {
    fn file(kind: NodeKind) -> Self {
        Self {
            name: kind.type_name().to_string(),
            fields: ["dbxPath", "path", "directory", "name", "lastModified"]
                .into_iter()
                .map(FieldDefinition::scalar)
                .collect(),
        }
    }

    fn folder() -> Self {
        let mut fields: Vec<FieldDefinition> = ["dbxPath", "path", "directory", "folderPath", "name"]
            .into_iter()
            .map(FieldDefinition::scalar)
            .collect();
        fields.extend(
            [NodeKind::ImageFile, NodeKind::MarkdownFile, NodeKind::DefaultFile]
                .into_iter()
                .map(FieldDefinition::children),
        );
        Self {
            name: NodeKind::Folder.type_name().to_string(),
            fields,
        }
    }
}

impl fmt::Display for TypeDefinition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "type {} implements Node {{", self.name)?;
        for field in &self.fields {
            match &field.directive {
                Some(directive) => {
                    writeln!(f, "  {}: {} {}", field.name, field.type_ref, directive)?
                }
                None => writeln!(f, "  {}: {}", field.name, field.type_ref)?,
            }
        }
        write!(f, "}}")
    }
}

/// Type definitions to register, empty unless folder nodes are enabled
pub fn type_definitions(config: &SourceConfig) -> Vec<TypeDefinition> {
    if !config.create_folder_nodes {
        return Vec::new();
    }
    vec![
        TypeDefinition::file(NodeKind::ImageFile),
        TypeDefinition::file(NodeKind::MarkdownFile),
        TypeDefinition::file(NodeKind::DefaultFile),
        TypeDefinition::folder(),
    ]
}

/// Renders definitions as SDL, separated by blank lines
pub fn render_sdl(definitions: &[TypeDefinition]) -> String {
    definitions
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("\n\n")
}
