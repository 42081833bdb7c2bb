//! Type naming policy
//!
//! The generator asks a [`TypeNamer`] for every schema node that needs a
//! class name. [`OptionTypeNamer`] is the policy used for generated option
//! classes: it closes every visited node to additional properties and
//! disambiguates the `StoredProcedures` sections nested under named database
//! entries, which would otherwise collide within one generation scope.

use std::collections::BTreeSet;

use crate::schema::{NodeId, Schema};

/// Naming policy invoked once per schema node needing a type name
pub trait TypeNamer {
    /// Choose a type name for `node` given the proposed `hint` and the
    /// names already assigned within the enclosing scope.
    fn type_name(
        &self,
        schema: &mut Schema,
        node: NodeId,
        hint: &str,
        reserved: &BTreeSet<String>,
    ) -> String;
}

/// Naming policy for generated option classes.
///
/// Three rules, applied after unconditionally closing the node to additional
/// properties:
/// 1. Outside a `Databases` scope (neither reserved nor hinted), the hint is
///    returned unchanged.
/// 2. A `StoredProcedures` hint whose node sits under a named property is
///    renamed `<parent name>StoredProcedures`.
/// 3. Everything else keeps its hint.
#[derive(Debug, Default)]
pub struct OptionTypeNamer;

impl TypeNamer for OptionTypeNamer {
    fn type_name(
        &self,
        schema: &mut Schema,
        node: NodeId,
        hint: &str,
        reserved: &BTreeSet<String>,
    ) -> String {
        // Generated option classes are closed POCOs: unexpected keys must not
        // pass through as an open-ended bag.
        let visited = schema.node_mut(node);
        visited.allow_additional_properties = false;
        visited.additional_properties = None;

        if !reserved.contains("Databases") && hint != "Databases" {
            return hint.to_string();
        }

        if hint == "StoredProcedures" {
            if let Some(parent) = schema.parent_name(node).filter(|name| !name.is_empty()) {
                return format!("{}StoredProcedures", parent);
            }
        }

        hint.to_string()
    }
}
