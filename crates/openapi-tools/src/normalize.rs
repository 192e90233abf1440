//! Reduced projection of operations for `read-api` output.
//!
//! Only the fields useful to an API consumer are kept. Schemas are emitted as graph handles and
//! are bounded later by the sanitizer.

use crate::document::{
    BodyContent, Operation, Parameter, ParameterSpec, RequestBody, Response, ResponseBody,
    ValueSchema,
};
use crate::sanitize::Shape;
use indexmap::IndexMap;
use serde_json::{Value, json};

/// Project one operation into `{summary, description, operationId, tags, parameters,
/// requestBody?, responses}`. Missing text fields become empty strings.
#[must_use]
pub fn project_operation(op: &Operation<'_>) -> IndexMap<String, Shape> {
    let mut out = Shape::object();
    out.insert("summary".into(), text(op.summary.as_deref()));
    out.insert("description".into(), text(op.description.as_deref()));
    out.insert("operationId".into(), text(op.operation_id.as_deref()));
    out.insert("tags".into(), Shape::Value(json!(op.tags)));
    out.insert(
        "parameters".into(),
        Shape::Array(op.parameters.iter().map(project_parameter).collect()),
    );
    if let Some(body) = &op.request_body {
        out.insert("requestBody".into(), project_request_body(body));
    }
    let responses = op
        .responses
        .iter()
        .map(|r| (r.status.clone(), project_response(r)))
        .collect();
    out.insert("responses".into(), Shape::Object(responses));
    out
}

fn text(value: Option<&str>) -> Shape {
    Shape::string(value.unwrap_or_default())
}

fn reference(target: &str) -> Shape {
    Shape::Value(json!({ "$ref": target }))
}

fn project_parameter(param: &Parameter<'_>) -> Shape {
    match param {
        Parameter::Reference(target) => reference(target),
        Parameter::Defined(spec) => project_parameter_spec(spec),
    }
}

fn project_parameter_spec(spec: &ParameterSpec<'_>) -> Shape {
    let mut out = Shape::object();
    out.insert("name".into(), Shape::string(spec.name.as_str()));
    out.insert("in".into(), Shape::string(spec.location.as_str()));
    out.insert("required".into(), Shape::Value(Value::Bool(spec.required)));
    out.insert("description".into(), text(spec.description.as_deref()));
    if let Some(schema) = &spec.schema {
        out.insert("schema".into(), project_value_schema(schema));
    }
    Shape::Object(out)
}

/// Explicit schemas pass through; flat ones become `{type, format?, items?, enum?, default?}`.
#[must_use]
pub fn project_value_schema(schema: &ValueSchema<'_>) -> Shape {
    match schema {
        ValueSchema::Explicit(node) => Shape::Node(node.id()),
        ValueSchema::Flat(flat) => {
            let mut out = Shape::object();
            out.insert("type".into(), Shape::string(flat.type_name.as_str()));
            if let Some(format) = &flat.format {
                out.insert("format".into(), Shape::string(format.as_str()));
            }
            if let Some(items) = flat.items {
                out.insert("items".into(), Shape::Node(items.id()));
            }
            if let Some(values) = flat.enum_values {
                out.insert("enum".into(), Shape::Node(values.id()));
            }
            if let Some(default) = flat.default {
                out.insert("default".into(), Shape::Node(default.id()));
            }
            Shape::Object(out)
        }
    }
}

fn project_request_body(body: &RequestBody<'_>) -> Shape {
    let mut out = Shape::object();
    out.insert("required".into(), Shape::Value(Value::Bool(body.required)));
    out.insert("description".into(), text(body.description.as_deref()));
    let content = match &body.content {
        BodyContent::Map(node) => Shape::Node(node.id()),
        BodyContent::Synthesized { media_type, schema } => {
            let mut media = Shape::object();
            if let Some(schema) = schema {
                media.insert("schema".into(), Shape::Node(schema.id()));
            }
            let mut map = Shape::object();
            map.insert(media_type.clone(), Shape::Object(media));
            Shape::Object(map)
        }
    };
    out.insert("content".into(), content);
    Shape::Object(out)
}

fn project_response(response: &Response<'_>) -> Shape {
    if let Some(target) = &response.reference {
        return reference(target);
    }
    let mut out = Shape::object();
    out.insert("description".into(), text(response.description.as_deref()));
    match response.body {
        ResponseBody::Content(node) => {
            out.insert("content".into(), Shape::Node(node.id()));
        }
        ResponseBody::Schema(node) => {
            out.insert("schema".into(), Shape::Node(node.id()));
        }
        ResponseBody::Empty => {}
    }
    Shape::Object(out)
}
