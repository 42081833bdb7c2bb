//! Structural schema inference
//!
//! Builds a schema tree from a merged settings document. Nodes live in an
//! arena; parent links are plain indices (back-references, not ownership) so
//! naming policies can inspect ancestor bindings.

use serde_json::{Map, Value};

use crate::settings::deep_merge;

/// Index of a node within its [`Schema`] arena
pub type NodeId = usize;

/// Structural kind of a schema node
#[derive(Debug, Clone, PartialEq)]
pub enum SchemaKind {
    /// Object with named properties in document order
    Object { properties: Vec<(String, NodeId)> },
    /// Array with a single inferred item schema
    Array { item: NodeId },
    String,
    Integer,
    Number,
    Boolean,
    Null,
}

/// A single inferred schema node
#[derive(Debug, Clone)]
pub struct SchemaNode {
    /// Structural kind
    pub kind: SchemaKind,

    /// Property name this node is bound to (None for the root and array items)
    pub name: Option<String>,

    /// Enclosing node (None for the root)
    pub parent: Option<NodeId>,

    /// Whether keys beyond the inferred properties are tolerated.
    /// Inference leaves this open; the type namer closes it.
    pub allow_additional_properties: bool,

    /// Schema for additional properties, if any
    pub additional_properties: Option<NodeId>,
}

/// An inferred schema tree
#[derive(Debug, Clone)]
pub struct Schema {
    nodes: Vec<SchemaNode>,
    root: NodeId,

    /// Name hint for the root type
    pub title: String,
}

impl Schema {
    /// Infer a schema from a JSON document.
    ///
    /// Objects become object nodes with one property per key, in document
    /// order. Arrays infer a single item schema: object elements contribute a
    /// union of their properties (a deep-merged representative), uniform
    /// scalar elements keep their kind, mixed scalars widen to string, and an
    /// empty array gets a null item.
    pub fn infer(document: &Value, title: &str) -> Self {
        let mut schema = Self {
            nodes: Vec::new(),
            root: 0,
            title: title.to_string(),
        };
        schema.root = schema.infer_node(document, None, None);
        schema
    }

    /// Root node id
    pub fn root(&self) -> NodeId {
        self.root
    }

    /// All node ids, in inference order
    pub fn node_ids(&self) -> impl Iterator<Item = NodeId> {
        0..self.nodes.len()
    }

    /// Borrow a node
    pub fn node(&self, id: NodeId) -> &SchemaNode {
        &self.nodes[id]
    }

    /// Mutably borrow a node
    pub fn node_mut(&mut self, id: NodeId) -> &mut SchemaNode {
        &mut self.nodes[id]
    }

    /// The property name the node's parent is bound to, if any
    pub fn parent_name(&self, id: NodeId) -> Option<&str> {
        let parent = self.nodes[id].parent?;
        self.nodes[parent].name.as_deref()
    }

    fn infer_node(&mut self, value: &Value, name: Option<String>, parent: Option<NodeId>) -> NodeId {
        let id = self.nodes.len();
        self.nodes.push(SchemaNode {
            kind: SchemaKind::Null,
            name,
            parent,
            allow_additional_properties: true,
            additional_properties: None,
        });

        let kind = match value {
            Value::Object(map) => {
                let mut properties = Vec::with_capacity(map.len());
                for (key, child_value) in map {
                    let child = self.infer_node(child_value, Some(key.clone()), Some(id));
                    properties.push((key.clone(), child));
                }
                SchemaKind::Object { properties }
            }
            Value::Array(items) => SchemaKind::Array {
                item: self.infer_item(items, id),
            },
            Value::String(_) => SchemaKind::String,
            Value::Number(n) if n.is_i64() || n.is_u64() => SchemaKind::Integer,
            Value::Number(_) => SchemaKind::Number,
            Value::Bool(_) => SchemaKind::Boolean,
            Value::Null => SchemaKind::Null,
        };

        self.nodes[id].kind = kind;
        id
    }

    fn infer_item(&mut self, items: &[Value], array_id: NodeId) -> NodeId {
        if items.is_empty() {
            return self.infer_node(&Value::Null, None, Some(array_id));
        }

        if items.iter().all(Value::is_object) {
            // Union of element shapes; later elements win on conflicting keys
            let representative = items
                .iter()
                .cloned()
                .fold(Value::Object(Map::new()), deep_merge);
            return self.infer_node(&representative, None, Some(array_id));
        }

        if items.iter().all(Value::is_array) {
            return self.infer_node(&items[0], None, Some(array_id));
        }

        let uniform = items
            .windows(2)
            .all(|pair| scalar_kind(&pair[0]) == scalar_kind(&pair[1]));
        if uniform {
            self.infer_node(&items[0], None, Some(array_id))
        } else {
            self.infer_node(&Value::String(String::new()), None, Some(array_id))
        }
    }
}

/// Scalar discriminant used to detect uniform arrays
fn scalar_kind(value: &Value) -> u8 {
    match value {
        Value::Null => 0,
        Value::Bool(_) => 1,
        Value::Number(n) if n.is_i64() || n.is_u64() => 2,
        Value::Number(_) => 3,
        Value::String(_) => 4,
        Value::Array(_) => 5,
        Value::Object(_) => 6,
    }
}
