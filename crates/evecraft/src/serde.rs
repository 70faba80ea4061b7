//! JSON-deserializable command tables.
//!
//! These types mirror [CommandDef] and [Field] with plain strings for names and types,
//! so custom or extended command sets can ship as JSON files and be compiled with
//! [SchemaDef::compile]. Field types are registry names from [crate::types], plus
//! `DataBlock` with an optional `length` naming the governing field.

use serde::{Deserialize, Serialize};

use crate::{
    command::{CommandDef, CommandKind},
    errors::SchemaError,
    field::Field,
    schema::Schema,
    tables,
    transform::Transform,
    types::{self, TypeDef},
};

/// Top-level table definition.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct SchemaDef {
    pub commands: Vec<CommandEntryDef>,
}

/// Command family and documentation tag.
#[derive(Debug, Deserialize, Serialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum CommandKindDef {
    DisplayList,
    Coprocessor,
    Widget,
}

/// Description of one command.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct CommandEntryDef {
    /// Opcode as listed in the tables.
    pub code: u8,
    pub name: String,
    pub kind: CommandKindDef,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Fields in declaration order.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub fields: Vec<FieldDef>,
}

/// Description of one field.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct FieldDef {
    pub name: String,
    /// Type registry name, or `DataBlock`.
    #[serde(rename = "type")]
    pub ty: String,
    /// Stored width override in bits.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stored_bits: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// For `DataBlock` fields: the field holding the block length.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub length: Option<String>,
}

const DATA_BLOCK: &str = "DataBlock";

impl SchemaDef {
    /// Definitions of the built-in tables.
    pub fn builtin() -> Self {
        Self::from_defs(&tables::all_commands())
    }

    pub fn from_defs(defs: &[CommandDef]) -> Self {
        SchemaDef {
            commands: defs.iter().map(CommandEntryDef::from).collect(),
        }
    }

    /// Converts every entry into a [CommandDef].
    pub fn to_defs(&self) -> Result<Vec<CommandDef>, SchemaError> {
        self.commands.iter().map(CommandDef::try_from).collect()
    }

    /// Converts and compiles the definitions.
    pub fn compile(&self) -> Result<Schema, SchemaError> {
        Schema::compile(&self.to_defs()?)
    }
}

impl From<CommandKind> for CommandKindDef {
    fn from(kind: CommandKind) -> Self {
        match kind {
            CommandKind::DisplayList => CommandKindDef::DisplayList,
            CommandKind::Coprocessor => CommandKindDef::Coprocessor,
            CommandKind::Widget => CommandKindDef::Widget,
        }
    }
}

impl From<CommandKindDef> for CommandKind {
    fn from(kind: CommandKindDef) -> Self {
        match kind {
            CommandKindDef::DisplayList => CommandKind::DisplayList,
            CommandKindDef::Coprocessor => CommandKind::Coprocessor,
            CommandKindDef::Widget => CommandKind::Widget,
        }
    }
}

impl From<&CommandDef> for CommandEntryDef {
    fn from(def: &CommandDef) -> Self {
        CommandEntryDef {
            code: def.code,
            name: def.name.to_string(),
            kind: def.kind.into(),
            description: def.description.as_ref().map(|text| text.to_string()),
            fields: def.fields.iter().map(FieldDef::from).collect(),
        }
    }
}

impl TryFrom<&CommandEntryDef> for CommandDef {
    type Error = SchemaError;

    fn try_from(def: &CommandEntryDef) -> Result<Self, Self::Error> {
        let fields = def
            .fields
            .iter()
            .map(Field::try_from)
            .collect::<Result<Vec<_>, _>>()?;

        Ok(CommandDef {
            code: def.code,
            name: def.name.clone().into(),
            description: def.description.clone().map(Into::into),
            kind: def.kind.into(),
            fields,
        })
    }
}

impl From<&Field> for FieldDef {
    fn from(field: &Field) -> Self {
        let length = match &field.ty.transform {
            Transform::Block { length_field } => length_field.as_ref().map(|name| name.to_string()),
            _ => None,
        };

        FieldDef {
            name: field.name.to_string(),
            ty: field.ty.name.to_string(),
            stored_bits: field.stored_bits,
            description: field.description.as_ref().map(|text| text.to_string()),
            length,
        }
    }
}

impl TryFrom<&FieldDef> for Field {
    type Error = SchemaError;

    fn try_from(def: &FieldDef) -> Result<Self, Self::Error> {
        let ty = if def.ty == DATA_BLOCK {
            TypeDef::block(def.length.as_deref())
        } else {
            types::lookup(&def.ty)
                .cloned()
                .ok_or_else(|| SchemaError::UnknownType(def.ty.clone()))?
        };

        Ok(Field {
            name: def.name.clone().into(),
            ty,
            stored_bits: def.stored_bits,
            description: def.description.clone().map(Into::into),
            offset: None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::builtin;

    #[test]
    fn test_builtin_round_trip() {
        let json = serde_json::to_string_pretty(&SchemaDef::builtin()).unwrap();
        let def: SchemaDef = serde_json::from_str(&json).unwrap();
        let schema = def.compile().unwrap();
        assert_eq!(schema.commands(), builtin().commands());
    }

    #[test]
    fn test_parse_custom_table() {
        let json = r#"{
            "commands": [
                {
                    "code": 3,
                    "name": "TAG",
                    "kind": "display_list",
                    "description": "Set the tag",
                    "fields": [{ "name": "tag", "type": "Tag" }]
                },
                {
                    "code": 26,
                    "name": "MEMWRITE",
                    "kind": "coprocessor",
                    "description": "Write data",
                    "fields": [
                        { "name": "ptr", "type": "Address" },
                        { "name": "num", "type": "uint32_t" },
                        { "name": "data", "type": "DataBlock", "length": "num" }
                    ]
                }
            ]
        }"#;
        let def: SchemaDef = serde_json::from_str(json).unwrap();
        let schema = def.compile().unwrap();
        assert_eq!(schema.len(), 2);
        assert_eq!(
            schema.encode("TAG", &[200.into()]).unwrap(),
            vec![0xc8, 0x00, 0x00, 0x03]
        );
    }

    #[test]
    fn test_unknown_type() {
        let json = r#"{
            "commands": [{
                "code": 1, "name": "X", "kind": "widget", "description": "X",
                "fields": [{ "name": "a", "type": "float" }]
            }]
        }"#;
        let def: SchemaDef = serde_json::from_str(json).unwrap();
        assert_eq!(
            def.compile().unwrap_err(),
            SchemaError::UnknownType("float".to_string())
        );
    }

    #[test]
    fn test_missing_description_survives() {
        let json = r#"{ "commands": [{ "code": 1, "name": "SWAP", "kind": "coprocessor" }] }"#;
        let def: SchemaDef = serde_json::from_str(json).unwrap();
        assert!(matches!(
            def.compile(),
            Err(SchemaError::MissingDescription { .. })
        ));
    }
}
