//! TypeScript type-definition text from a schema-definition table.
//!
//! Every table entry is emitted, referenced or not. Entries refer to each other by name: through
//! graph identity for resolved documents, or through the `$ref` string for raw reads.

use crate::error::TypeSynthesisError;
use crate::graph::{NodeId, NodeRef};
use heck::ToUpperCamelCase;
use std::collections::{HashMap, HashSet};
use std::fmt::Write as _;

pub const NO_TABLE_COMMENT: &str = "// No schema definitions found in this document.";

type Result<T> = std::result::Result<T, TypeSynthesisError>;

/// Render every definition of `table`.
///
/// # Errors
///
/// Returns [`TypeSynthesisError`] if the table is not an object or an entry is not a schema.
pub fn synthesize_types(table: Option<NodeRef<'_>>) -> Result<String> {
    let Some(table) = table else {
        return Ok(format!("{NO_TABLE_COMMENT}\n"));
    };
    if !table.is_object() {
        return Err(TypeSynthesisError::NotATable {
            found: table.kind_name(),
        });
    }

    let mut entries = Vec::new();
    for (key, schema) in table.entries() {
        if !schema.is_object() && schema.as_bool().is_none() {
            return Err(TypeSynthesisError::InvalidDefinition {
                name: key.to_string(),
                found: schema.kind_name(),
            });
        }
        entries.push((key, schema));
    }
    if entries.is_empty() {
        return Ok(format!("{NO_TABLE_COMMENT}\n"));
    }

    let names = NameTable::build(&entries);
    let mut out = String::new();
    for (i, (key, schema)) in entries.iter().enumerate() {
        if i > 0 {
            out.push('\n');
        }
        let name = names.by_key.get(*key).map_or("Unnamed", String::as_str);
        Renderer { names: &names }.declaration(name, *schema, &mut out);
    }
    Ok(out)
}

/// Identifier assignment for table entries.
struct NameTable {
    by_key: HashMap<String, String>,
    by_id: HashMap<NodeId, String>,
}

impl NameTable {
    fn build(entries: &[(&str, NodeRef<'_>)]) -> Self {
        let mut used: HashSet<String> = HashSet::new();
        let mut by_key = HashMap::new();
        let mut by_id = HashMap::new();
        for (key, schema) in entries {
            let base = type_identifier(key);
            let mut name = base.clone();
            let mut n = 2;
            while !used.insert(name.clone()) {
                name = format!("{base}{n}");
                n += 1;
            }
            by_id.entry(schema.id()).or_insert_with(|| name.clone());
            by_key.insert((*key).to_string(), name);
        }
        Self { by_key, by_id }
    }

    /// Name for `#/definitions/X` or `#/components/schemas/X` style references.
    fn for_reference(&self, reference: &str) -> Option<&str> {
        let last = reference.rsplit('/').next()?;
        let key = last.replace("~1", "/").replace("~0", "~");
        self.by_key.get(&key).map(String::as_str)
    }
}

/// `pet-store.v2` -> `PetStoreV2`; never empty and never starts with a digit.
fn type_identifier(key: &str) -> String {
    let camel: String = key
        .to_upper_camel_case()
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || *c == '_' || *c == '$')
        .collect();
    match camel.chars().next() {
        None => "Schema".to_string(),
        Some(c) if c.is_ascii_digit() => format!("T{camel}"),
        Some(_) => camel,
    }
}

fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    chars
        .next()
        .is_some_and(|c| c.is_ascii_alphabetic() || c == '_' || c == '$')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '$')
}

fn property_key(name: &str) -> String {
    if is_identifier(name) {
        name.to_string()
    } else {
        serde_json::Value::String(name.to_string()).to_string()
    }
}

fn doc_comment(schema: NodeRef<'_>, indent: &str, out: &mut String) {
    let Some(description) = schema.str_field("description").map(str::trim) else {
        return;
    };
    if description.is_empty() {
        return;
    }
    let description = description.replace("*/", "*\\/");
    let lines: Vec<&str> = description.lines().collect();
    if let [line] = lines.as_slice() {
        let _ = writeln!(out, "{indent}/** {line} */");
        return;
    }
    let _ = writeln!(out, "{indent}/**");
    for line in lines {
        let _ = writeln!(out, "{indent} * {}", line.trim_end());
    }
    let _ = writeln!(out, "{indent} */");
}

struct Renderer<'n> {
    names: &'n NameTable,
}

impl Renderer<'_> {
    fn declaration(&self, name: &str, schema: NodeRef<'_>, out: &mut String) {
        doc_comment(schema, "", out);
        let mut on_path = HashSet::new();

        if is_plain_object(schema) {
            on_path.insert(schema.id());
            let _ = writeln!(out, "export interface {name} {{");
            self.members(schema, "  ", &mut on_path, out);
            out.push_str("}\n");
            return;
        }

        // The entry itself is expanded; nested occurrences refer back to it by name.
        let expr = match schema.reference() {
            Some(reference) => self.reference_name(reference),
            None if schema.is_object() => {
                on_path.insert(schema.id());
                self.expr_body(schema, &mut on_path, "")
            }
            None => "unknown".to_string(),
        };
        let _ = writeln!(out, "export type {name} = {expr};");
    }

    fn members(
        &self,
        schema: NodeRef<'_>,
        indent: &str,
        on_path: &mut HashSet<NodeId>,
        out: &mut String,
    ) {
        let required: HashSet<String> = schema.string_list("required").into_iter().collect();
        if let Some(props) = schema.get("properties") {
            for (prop, prop_schema) in props.entries() {
                doc_comment(prop_schema, indent, out);
                let optional = if required.contains(prop) { "" } else { "?" };
                let ty = self.expr(prop_schema, on_path, indent);
                let _ = writeln!(out, "{indent}{}{optional}: {ty};", property_key(prop));
            }
        }
        if let Some(extra) = schema.get("additionalProperties").filter(|a| a.is_object()) {
            let ty = self.expr(extra, on_path, indent);
            let _ = writeln!(out, "{indent}[key: string]: {ty};");
        }
    }

    fn expr(&self, schema: NodeRef<'_>, on_path: &mut HashSet<NodeId>, indent: &str) -> String {
        if let Some(name) = self.names.by_id.get(&schema.id()) {
            return name.clone();
        }
        if let Some(reference) = schema.reference() {
            return self.reference_name(reference);
        }
        if !schema.is_object() || !on_path.insert(schema.id()) {
            return "unknown".to_string();
        }
        let ty = self.expr_body(schema, on_path, indent);
        on_path.remove(&schema.id());
        ty
    }

    fn reference_name(&self, reference: &str) -> String {
        self.names
            .for_reference(reference)
            .unwrap_or("unknown")
            .to_string()
    }

    fn expr_body(
        &self,
        schema: NodeRef<'_>,
        on_path: &mut HashSet<NodeId>,
        indent: &str,
    ) -> String {
        let ty = self.expr_inner(schema, on_path, indent);
        if schema.bool_field("nullable") == Some(true) && ty != "null" {
            format!("{ty} | null")
        } else {
            ty
        }
    }

    fn expr_inner(
        &self,
        schema: NodeRef<'_>,
        on_path: &mut HashSet<NodeId>,
        indent: &str,
    ) -> String {
        if let Some(values) = schema.get("enum") {
            let literals: Vec<String> = values.items().map(|v| v.to_value().to_string()).collect();
            if !literals.is_empty() {
                return literals.join(" | ");
            }
        }
        if let Some(parts) = schema.get("allOf") {
            return self.combine(parts, " & ", on_path, indent);
        }
        for key in ["oneOf", "anyOf"] {
            if let Some(parts) = schema.get(key) {
                return self.combine(parts, " | ", on_path, indent);
            }
        }

        match schema.get("type") {
            Some(t) if t.as_str().is_some() => {
                self.typed(t.as_str().unwrap_or_default(), schema, on_path, indent)
            }
            Some(t) => {
                let parts: Vec<String> = t
                    .items()
                    .filter_map(NodeRef::as_str)
                    .map(|name| self.typed(name, schema, on_path, indent))
                    .collect();
                if parts.is_empty() {
                    "unknown".to_string()
                } else {
                    parts.join(" | ")
                }
            }
            None if schema.get("properties").is_some() => {
                self.typed("object", schema, on_path, indent)
            }
            None if schema.get("items").is_some() => self.typed("array", schema, on_path, indent),
            None => "unknown".to_string(),
        }
    }

    fn typed(
        &self,
        type_name: &str,
        schema: NodeRef<'_>,
        on_path: &mut HashSet<NodeId>,
        indent: &str,
    ) -> String {
        match type_name {
            "string" => "string".to_string(),
            "integer" | "number" => "number".to_string(),
            "boolean" => "boolean".to_string(),
            "null" => "null".to_string(),
            "array" => {
                let item = schema
                    .get("items")
                    .map_or_else(|| "unknown".to_string(), |i| self.expr(i, on_path, indent));
                format!("Array<{item}>")
            }
            "object" => self.inline_object(schema, on_path, indent),
            _ => "unknown".to_string(),
        }
    }

    fn inline_object(
        &self,
        schema: NodeRef<'_>,
        on_path: &mut HashSet<NodeId>,
        indent: &str,
    ) -> String {
        let has_props = schema
            .get("properties")
            .is_some_and(|p| p.entries().next().is_some());
        if !has_props {
            return match schema.get("additionalProperties").filter(|a| a.is_object()) {
                Some(extra) => format!("Record<string, {}>", self.expr(extra, on_path, indent)),
                None => "Record<string, unknown>".to_string(),
            };
        }

        let inner = format!("{indent}  ");
        let mut body = String::from("{\n");
        self.members(schema, &inner, on_path, &mut body);
        body.push_str(indent);
        body.push('}');
        body
    }

    fn combine(
        &self,
        parts: NodeRef<'_>,
        separator: &str,
        on_path: &mut HashSet<NodeId>,
        indent: &str,
    ) -> String {
        let rendered: Vec<String> = parts
            .items()
            .map(|p| {
                let ty = self.expr(p, on_path, indent);
                if ty.contains(" | ") || ty.contains(" & ") {
                    format!("({ty})")
                } else {
                    ty
                }
            })
            .collect();
        if rendered.is_empty() {
            "unknown".to_string()
        } else {
            rendered.join(separator)
        }
    }
}

fn is_plain_object(schema: NodeRef<'_>) -> bool {
    let typed_object = match schema.get("type") {
        Some(t) => t.as_str() == Some("object"),
        None => true,
    };
    typed_object
        && schema
            .get("properties")
            .is_some_and(|p| p.entries().next().is_some())
        && ["allOf", "oneOf", "anyOf", "enum"]
            .iter()
            .all(|k| schema.get(k).is_none())
        && schema.bool_field("nullable") != Some(true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::DocumentGraph;
    use serde_json::json;

    fn types_for(table: &serde_json::Value) -> Result<String> {
        let graph = DocumentGraph::from_value(table);
        synthesize_types(Some(graph.root()))
    }

    #[test]
    fn interface_with_required_and_optional_members() {
        let out = types_for(&json!({
            "Pet": {
                "type": "object",
                "description": "A pet in the store",
                "required": ["id"],
                "properties": {
                    "id": { "type": "integer" },
                    "name": { "type": "string", "description": "Display name" },
                    "tags": { "type": "array", "items": { "type": "string" } },
                    "owner-id": { "type": "string", "nullable": true }
                }
            }
        }))
        .unwrap();
        assert_eq!(
            out,
            "/** A pet in the store */\n\
             export interface Pet {\n  \
             id: number;\n  \
             /** Display name */\n  \
             name?: string;\n  \
             tags?: Array<string>;\n  \
             \"owner-id\"?: string | null;\n\
             }\n"
        );
    }

    #[test]
    fn unreferenced_definitions_are_all_emitted() {
        let out = types_for(&json!({
            "order_status": { "type": "string", "enum": ["placed", "delivered"] },
            "Id": { "type": "integer" },
            "Error": { "type": "object", "properties": { "code": { "type": "integer" } } }
        }))
        .unwrap();
        assert!(out.contains("export type OrderStatus = \"placed\" | \"delivered\";"));
        assert!(out.contains("export type Id = number;"));
        assert!(out.contains("export interface Error {"));
    }

    #[test]
    fn raw_refs_use_table_names() {
        let out = types_for(&json!({
            "Pet": { "type": "object", "properties": {
                "category": { "$ref": "#/components/schemas/Category" },
                "missing": { "$ref": "#/components/schemas/Nope" }
            } },
            "Category": { "type": "string" }
        }))
        .unwrap();
        assert!(out.contains("category?: Category;"));
        assert!(out.contains("missing?: unknown;"));
    }

    #[test]
    fn composition_keywords() {
        let out = types_for(&json!({
            "A": { "type": "object", "properties": { "a": { "type": "string" } } },
            "B": { "allOf": [
                { "$ref": "#/definitions/A" },
                { "type": "object", "properties": { "b": { "type": "boolean" } } }
            ] },
            "C": { "oneOf": [{ "type": "string" }, { "type": "integer" }] }
        }))
        .unwrap();
        assert!(out.contains("export type B = A & {\n  b?: boolean;\n};"));
        assert!(out.contains("export type C = string | number;"));
    }

    #[test]
    fn self_reference_uses_the_entry_name() {
        let out = types_for(&json!({
            "TreeNode": { "type": "object", "properties": {
                "children": { "type": "array", "items": { "$ref": "#/definitions/TreeNode" } }
            } }
        }))
        .unwrap();
        assert!(out.contains("children?: Array<TreeNode>;"));
    }

    #[test]
    fn names_are_deduplicated() {
        let out = types_for(&json!({
            "pet": { "type": "string" },
            "Pet": { "type": "integer" },
            "1st": { "type": "boolean" }
        }))
        .unwrap();
        assert!(out.contains("export type Pet = string;"));
        assert!(out.contains("export type Pet2 = number;"));
        assert!(out.contains("export type T1st = boolean;"));
    }

    #[test]
    fn missing_table_is_a_comment() {
        assert_eq!(synthesize_types(None).unwrap(), format!("{NO_TABLE_COMMENT}\n"));
    }

    #[test]
    fn malformed_tables_fail() {
        let err = types_for(&json!(["not", "a", "table"])).unwrap_err();
        assert_eq!(err, TypeSynthesisError::NotATable { found: "an array" });

        let err = types_for(&json!({ "Pet": "oops" })).unwrap_err();
        assert_eq!(
            err,
            TypeSynthesisError::InvalidDefinition {
                name: "Pet".into(),
                found: "a string"
            }
        );
        assert!(err.to_string().contains("'Pet'"));
    }
}
