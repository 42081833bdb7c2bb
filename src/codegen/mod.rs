//! C# source emission
//!
//! Walks an inferred schema and emits one closed POCO class per object node,
//! bound to System.Text.Json. Class names are chosen by a pluggable
//! [`TypeNamer`]; the generator itself only adds a numeric suffix when a
//! chosen name is already taken in the scope.

mod namer;

pub use namer::{OptionTypeNamer, TypeNamer};

use std::collections::{BTreeSet, HashMap, VecDeque};
use std::fmt::Write;

use crate::schema::{NodeId, Schema, SchemaKind};

/// Generation settings for the C# emitter
#[derive(Debug, Clone)]
pub struct CSharpGeneratorSettings {
    /// Namespace for the generated file
    pub namespace: String,
}

/// Emits C# option classes from a schema
pub struct CSharpGenerator<'a> {
    settings: CSharpGeneratorSettings,
    namer: &'a dyn TypeNamer,
}

impl<'a> CSharpGenerator<'a> {
    pub fn new(settings: CSharpGeneratorSettings, namer: &'a dyn TypeNamer) -> Self {
        Self { settings, namer }
    }

    /// Generate the full source file text.
    ///
    /// The root object becomes a class named after the schema title; nested
    /// object nodes (including object items of arrays) each get their own
    /// class, named by the [`TypeNamer`] from the property they are bound to.
    pub fn generate_file(&self, schema: &mut Schema) -> String {
        let classes = self.assign_names(schema);
        let names: HashMap<NodeId, String> = classes.iter().cloned().collect();

        let mut out = String::new();

        out.push_str("//------------------------------------------------------------------------------\n");
        out.push_str("// <auto-generated>\n");
        out.push_str("//     Generated by optionsgen from the merged appsettings documents.\n");
        out.push_str("//     Changes to this file will be lost if it is regenerated.\n");
        out.push_str("// </auto-generated>\n");
        out.push_str("//------------------------------------------------------------------------------\n");
        out.push('\n');
        out.push_str("using System.Collections.Generic;\n");
        out.push_str("using System.Text.Json.Serialization;\n");
        out.push('\n');
        let _ = writeln!(out, "namespace {};", self.settings.namespace);

        for (node, class_name) in &classes {
            out.push('\n');
            self.emit_class(schema, *node, class_name, &names, &mut out);
        }

        out
    }

    /// Assign a class name to every object node, breadth-first from the root.
    ///
    /// The namer sees each node exactly once with the set of names already
    /// reserved in the scope; a residual collision (the namer's rules are
    /// deliberately narrow) gets a numeric suffix.
    fn assign_names(&self, schema: &mut Schema) -> Vec<(NodeId, String)> {
        let mut reserved = BTreeSet::new();
        let mut classes = Vec::new();

        let mut queue: VecDeque<(NodeId, String)> = VecDeque::new();
        if let Some(root) = class_node(schema, schema.root()) {
            queue.push_back((root, schema.title.clone()));
        }

        while let Some((node, hint)) = queue.pop_front() {
            let chosen = self.namer.type_name(schema, node, &hint, &reserved);
            let unique = reserve(chosen, &mut reserved);
            classes.push((node, unique));

            let properties = match &schema.node(node).kind {
                SchemaKind::Object { properties } => properties.clone(),
                _ => continue,
            };
            for (key, child) in properties {
                if let Some(target) = class_node(schema, child) {
                    queue.push_back((target, pascal_identifier(&key)));
                }
            }
        }

        classes
    }

    fn emit_class(
        &self,
        schema: &Schema,
        node: NodeId,
        class_name: &str,
        names: &HashMap<NodeId, String>,
        out: &mut String,
    ) {
        let _ = writeln!(out, "public class {}", class_name);
        out.push_str("{\n");

        let properties = match &schema.node(node).kind {
            SchemaKind::Object { properties } => properties,
            _ => return,
        };

        let mut first = true;
        for (key, child) in properties {
            if !first {
                out.push('\n');
            }
            first = false;

            let ty = self.csharp_type(schema, *child, names);
            let _ = writeln!(out, "    [JsonPropertyName(\"{}\")]", key);
            let _ = writeln!(
                out,
                "    public {} {} {{ get; set; }}",
                ty,
                pascal_identifier(key)
            );
        }

        out.push_str("}\n");
    }

    fn csharp_type(&self, schema: &Schema, node: NodeId, names: &HashMap<NodeId, String>) -> String {
        match &schema.node(node).kind {
            SchemaKind::Object { .. } => names
                .get(&node)
                .cloned()
                .unwrap_or_else(|| "object".to_string()),
            SchemaKind::Array { item } => {
                format!("ICollection<{}>", self.csharp_type(schema, *item, names))
            }
            SchemaKind::String => "string".to_string(),
            SchemaKind::Integer => "long".to_string(),
            SchemaKind::Number => "double".to_string(),
            SchemaKind::Boolean => "bool".to_string(),
            SchemaKind::Null => "object".to_string(),
        }
    }
}

/// The object node a property value contributes a class for, if any.
///
/// Follows array nesting down to an object item, so `"Xs": [[{...}]]` still
/// yields a class for the innermost element shape.
fn class_node(schema: &Schema, node: NodeId) -> Option<NodeId> {
    match schema.node(node).kind {
        SchemaKind::Object { .. } => Some(node),
        SchemaKind::Array { item } => class_node(schema, item),
        _ => None,
    }
}

/// PascalCase a raw JSON key into a valid C# identifier.
///
/// Separator characters (anything outside `[A-Za-z0-9_]`) are dropped and
/// the following character is uppercased; a leading digit gets an underscore
/// prefix. Already-Pascal keys pass through unchanged; the raw key itself
/// always survives in `[JsonPropertyName]`.
fn pascal_identifier(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut upper_next = true;

    for c in raw.chars() {
        if c.is_ascii_alphanumeric() || c == '_' {
            if upper_next {
                out.extend(c.to_uppercase());
                upper_next = false;
            } else {
                out.push(c);
            }
        } else {
            upper_next = true;
        }
    }

    if out.is_empty() || out.starts_with(|c: char| c.is_ascii_digit()) {
        out.insert(0, '_');
    }

    out
}

/// Reserve `name` in the scope, suffixing with a counter on collision
fn reserve(name: String, reserved: &mut BTreeSet<String>) -> String {
    if reserved.insert(name.clone()) {
        return name;
    }

    let mut n = 2;
    loop {
        let candidate = format!("{}{}", name, n);
        if reserved.insert(candidate.clone()) {
            return candidate;
        }
        n += 1;
    }
}
