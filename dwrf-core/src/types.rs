//! Column type tree.
//!
//! A schema is flattened into nodes numbered in pre-order: the root struct is
//! id 0, and every node's children carry larger ids than the node itself. The
//! top-level columns of a file are the children of the root.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{DwrfError, Result};

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TypeKind {
    Boolean,
    Byte,
    Short,
    Int,
    Long,
    Float,
    Double,
    String,
    Binary,
    List,
    Map,
    Struct,
}

impl TypeKind {
    pub fn is_compound(self) -> bool {
        matches!(self, TypeKind::List | TypeKind::Map | TypeKind::Struct)
    }

    fn name(self) -> &'static str {
        match self {
            TypeKind::Boolean => "boolean",
            TypeKind::Byte => "tinyint",
            TypeKind::Short => "smallint",
            TypeKind::Int => "int",
            TypeKind::Long => "bigint",
            TypeKind::Float => "float",
            TypeKind::Double => "double",
            TypeKind::String => "string",
            TypeKind::Binary => "binary",
            TypeKind::List => "array",
            TypeKind::Map => "map",
            TypeKind::Struct => "struct",
        }
    }
}

/// Logical type used to describe a schema before it is flattened.
#[derive(Clone, Debug, PartialEq)]
pub enum DataType {
    Boolean,
    Byte,
    Short,
    Int,
    Long,
    Float,
    Double,
    String,
    Binary,
    List(Box<DataType>),
    Map(Box<DataType>, Box<DataType>),
    Struct(Vec<Field>),
}

#[derive(Clone, Debug, PartialEq)]
pub struct Field {
    pub name: String,
    pub data_type: DataType,
}

impl Field {
    pub fn new(name: impl Into<String>, data_type: DataType) -> Self {
        Self {
            name: name.into(),
            data_type,
        }
    }
}

impl DataType {
    pub fn list(item: DataType) -> Self {
        DataType::List(Box::new(item))
    }

    pub fn map(key: DataType, value: DataType) -> Self {
        DataType::Map(Box::new(key), Box::new(value))
    }

    fn kind(&self) -> TypeKind {
        match self {
            DataType::Boolean => TypeKind::Boolean,
            DataType::Byte => TypeKind::Byte,
            DataType::Short => TypeKind::Short,
            DataType::Int => TypeKind::Int,
            DataType::Long => TypeKind::Long,
            DataType::Float => TypeKind::Float,
            DataType::Double => TypeKind::Double,
            DataType::String => TypeKind::String,
            DataType::Binary => TypeKind::Binary,
            DataType::List(_) => TypeKind::List,
            DataType::Map(_, _) => TypeKind::Map,
            DataType::Struct(_) => TypeKind::Struct,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypeNode {
    pub id: u32,
    pub kind: TypeKind,
    pub children: Vec<u32>,
    /// Field names, parallel to `children`; only populated for structs.
    #[serde(default)]
    pub field_names: Vec<String>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypeTree {
    nodes: Vec<TypeNode>,
}

impl TypeTree {
    /// Flatten the top-level `fields` of a file into a tree rooted at a struct.
    pub fn from_fields(fields: &[Field]) -> Self {
        let mut nodes = Vec::new();
        push_type(&mut nodes, &DataType::Struct(fields.to_vec()));
        Self { nodes }
    }

    /// Adopt nodes produced elsewhere (e.g. decoded from a footer), checking
    /// that they form a well-shaped pre-order tree.
    pub fn from_nodes(nodes: Vec<TypeNode>) -> Result<Self> {
        let tree = Self { nodes };
        tree.validate()?;
        Ok(tree)
    }

    pub fn validate(&self) -> Result<()> {
        let root = self
            .nodes
            .first()
            .ok_or_else(|| DwrfError::Format("type tree is empty".into()))?;
        if root.kind != TypeKind::Struct {
            return Err(DwrfError::Format(format!(
                "root type must be a struct, found {}",
                root.kind.name()
            )));
        }
        let n = self.nodes.len() as u64;
        for (i, node) in self.nodes.iter().enumerate() {
            if node.id as usize != i {
                return Err(DwrfError::Format(format!(
                    "type[{i}] carries id {}",
                    node.id
                )));
            }
            for &child in &node.children {
                if child as u64 >= n || child <= node.id {
                    return Err(DwrfError::Format(format!(
                        "type[{i}] has out of range child {child}"
                    )));
                }
            }
            let arity_ok = match node.kind {
                TypeKind::List => node.children.len() == 1,
                TypeKind::Map => node.children.len() == 2,
                TypeKind::Struct => node.children.len() == node.field_names.len(),
                _ => node.children.is_empty(),
            };
            if !arity_ok {
                return Err(DwrfError::Format(format!(
                    "type[{i}] ({}) has {} children",
                    node.kind.name(),
                    node.children.len()
                )));
            }
        }
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn root(&self) -> &TypeNode {
        &self.nodes[0]
    }

    pub fn get(&self, id: u32) -> Option<&TypeNode> {
        self.nodes.get(id as usize)
    }

    pub fn nodes(&self) -> &[TypeNode] {
        &self.nodes
    }

    /// Type ids of the top-level columns, in column order.
    pub fn columns(&self) -> &[u32] {
        &self.root().children
    }

    pub fn column_names(&self) -> &[String] {
        &self.root().field_names
    }

    fn write_type(&self, id: u32, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let node = &self.nodes[id as usize];
        f.write_str(node.kind.name())?;
        if !node.kind.is_compound() {
            return Ok(());
        }
        f.write_str("<")?;
        for (i, &child) in node.children.iter().enumerate() {
            if i > 0 {
                f.write_str(",")?;
            }
            if let Some(name) = node.field_names.get(i) {
                write!(f, "{name}:")?;
            }
            self.write_type(child, f)?;
        }
        f.write_str(">")
    }
}

/// Renders the Hive type string, e.g. `struct<a:int,b:array<string>>`.
impl fmt::Display for TypeTree {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.nodes.is_empty() {
            return f.write_str("struct<>");
        }
        self.write_type(0, f)
    }
}

fn push_type(nodes: &mut Vec<TypeNode>, data_type: &DataType) -> u32 {
    let id = nodes.len() as u32;
    nodes.push(TypeNode {
        id,
        kind: data_type.kind(),
        children: Vec::new(),
        field_names: Vec::new(),
    });
    let (children, names): (Vec<u32>, Vec<String>) = match data_type {
        DataType::List(item) => (vec![push_type(nodes, item)], Vec::new()),
        DataType::Map(key, value) => {
            let k = push_type(nodes, key);
            let v = push_type(nodes, value);
            (vec![k, v], Vec::new())
        }
        DataType::Struct(fields) => fields
            .iter()
            .map(|f| (push_type(nodes, &f.data_type), f.name.clone()))
            .unzip(),
        _ => (Vec::new(), Vec::new()),
    };
    nodes[id as usize].children = children;
    nodes[id as usize].field_names = names;
    id
}
