use pretty_assertions::assert_eq;
use serde_json::json;

use super::*;

struct Order;

impl Describe for Order {
    fn shape() -> Shape {
        Shape::object(
            ObjectShape::new()
                .field(FieldShape::of::<String>("customer_name").required())
                .field(FieldShape::of::<Option<i32>>("quantity").range(1, 100))
                .constructible(),
        )
    }
}

struct TreeNode;

impl Describe for TreeNode {
    fn shape() -> Shape {
        Shape::object(
            ObjectShape::new()
                .field(FieldShape::of::<String>("label"))
                .field(FieldShape::of::<Vec<TreeNode>>("children")),
        )
    }
}

fn schema_json(shape: &Shape) -> serde_json::Value {
    serde_json::to_value(generate_schema(shape)).unwrap()
}

#[test]
fn primitives_map_to_json_types() {
    assert_eq!(schema_json(&Shape::of::<String>()), json!({"type": "string"}));
    assert_eq!(schema_json(&Shape::of::<u8>()), json!({"type": "integer"}));
    assert_eq!(schema_json(&Shape::of::<i64>()), json!({"type": "integer"}));
    assert_eq!(schema_json(&Shape::of::<f32>()), json!({"type": "number"}));
    assert_eq!(schema_json(&Shape::of::<bool>()), json!({"type": "boolean"}));
}

#[test]
fn string_like_types_carry_formats() {
    assert_eq!(
        schema_json(&Shape::of::<chrono::NaiveDate>()),
        json!({"type": "string", "format": "date"})
    );
    assert_eq!(
        schema_json(&Shape::of::<chrono::DateTime<chrono::Utc>>()),
        json!({"type": "string", "format": "date-time"})
    );
    assert_eq!(
        schema_json(&Shape::of::<chrono::NaiveTime>()),
        json!({"type": "string", "format": "time"})
    );
    assert_eq!(
        schema_json(&Shape::of::<uuid::Uuid>()),
        json!({"type": "string", "format": "uuid"})
    );
    assert_eq!(schema_json(&Shape::Uri), json!({"type": "string", "format": "uri"}));
}

#[test]
fn enums_list_symbolic_names() {
    let shape = Shape::enumeration(["Small", "Medium", "Large"]);
    assert_eq!(
        schema_json(&shape),
        json!({"type": "string", "enum": ["Small", "Medium", "Large"]})
    );
}

#[test]
fn nullable_unwraps_to_inner_type() {
    assert_eq!(schema_json(&Shape::of::<Option<f64>>()), json!({"type": "number"}));
}

#[test]
fn maps_are_opaque_objects() {
    let schema = generate_schema(&Shape::of::<std::collections::HashMap<String, i32>>());
    assert_eq!(schema.schema_type, "object");
    assert!(schema.properties.is_none());
}

#[test]
fn arrays_recurse_into_items() {
    assert_eq!(
        schema_json(&Shape::of::<Vec<String>>()),
        json!({"type": "array", "items": {"type": "string"}})
    );
}

#[test]
fn array_nesting_is_capped() {
    let schema = schema_json(&Shape::of::<Vec<Vec<Vec<Vec<i32>>>>>());
    assert_eq!(
        schema,
        json!({
            "type": "array",
            "items": {
                "type": "array",
                "items": {
                    "type": "array",
                    "items": {
                        "type": "array",
                        "items": {"type": "object"}
                    }
                }
            }
        })
    );
}

#[test]
fn recursive_types_terminate() {
    let schema = generate_schema(&TreeNode::shape());
    let children = &schema.properties.as_ref().unwrap()["children"];
    assert_eq!(children.schema_type, "array");

    // walk down until the placeholder appears
    let mut current = children.items.as_deref().unwrap().clone();
    let mut levels = 0;
    while let Some(props) = current.properties.clone() {
        current = props["children"].items.as_deref().unwrap().clone();
        levels += 1;
        assert!(levels < 10, "schema did not terminate");
    }
    assert_eq!(current, PropertySchema::typed("object"));
}

#[test]
fn payload_object_schema_matches_wire_shape() {
    assert_eq!(
        schema_json(&Order::shape()),
        json!({
            "type": "object",
            "properties": {
                "customerName": {"type": "string"},
                "quantity": {"type": "integer", "minimum": 1, "maximum": 100}
            },
            "required": ["customerName"]
        })
    );
}

#[test]
fn non_nullable_reference_fields_are_implicitly_required() {
    let shape = Shape::object(
        ObjectShape::new()
            .field(FieldShape::of::<String>("title"))
            .field(FieldShape::of::<Vec<String>>("tags"))
            .field(FieldShape::of::<Option<String>>("subtitle"))
            .field(FieldShape::of::<i32>("count"))
            .field(FieldShape::of::<String>("mode").default_value("fast")),
    );
    let schema = generate_schema(&shape);
    assert_eq!(schema.required, Some(vec!["title".to_string(), "tags".to_string()]));
}

#[test]
fn explicit_and_implicit_required_are_deduplicated() {
    let shape = Shape::object(
        ObjectShape::new()
            .field(FieldShape::of::<String>("name").required())
            .field(FieldShape::of::<bool>("flag").required()),
    );
    let schema = generate_schema(&shape);
    assert_eq!(schema.required, Some(vec!["name".to_string(), "flag".to_string()]));
}

#[test]
fn object_without_required_fields_omits_the_list() {
    let shape = Shape::object(ObjectShape::new().field(FieldShape::of::<Option<String>>("note")));
    assert_eq!(
        schema_json(&shape),
        json!({"type": "object", "properties": {"note": {"type": "string"}}})
    );
}

#[test]
fn annotations_are_applied_additively() {
    let field = FieldShape::of::<String>("code")
        .description("Short code")
        .string_length(8, Some(2))
        .pattern("^[A-Z]+$")
        .default_value("AB");
    let schema = serde_json::to_value(field_schema(&field, 1)).unwrap();
    assert_eq!(
        schema,
        json!({
            "type": "string",
            "description": "Short code",
            "minLength": 2,
            "maxLength": 8,
            "pattern": "^[A-Z]+$",
            "default": "AB"
        })
    );
}

#[test]
fn only_one_length_bound_may_be_present() {
    let field = FieldShape::of::<String>("nickname").max_length(20);
    let schema = field_schema(&field, 1);
    assert_eq!(schema.max_length, Some(20));
    assert_eq!(schema.min_length, None);

    let field = FieldShape::of::<f64>("ratio").maximum(0.5);
    let schema = field_schema(&field, 1);
    assert_eq!(schema.minimum, None);
    assert_eq!(schema.maximum, Some(json!(0.5)));
}

#[test]
fn declared_allowed_values_win_over_validator_values() {
    let field = FieldShape::of::<i32>("level")
        .validator_allowed_values([json!("a"), json!("b")])
        .allowed_values([1, 2, 3]);
    let schema = field_schema(&field, 1);
    assert_eq!(
        schema.enum_values,
        Some(vec!["1".to_string(), "2".to_string(), "3".to_string()])
    );

    let field = FieldShape::of::<String>("color").validator_allowed_values(["red", "blue"]);
    let schema = field_schema(&field, 1);
    assert_eq!(schema.enum_values, Some(vec!["red".to_string(), "blue".to_string()]));
}

#[test]
fn semantic_format_wins_over_data_type() {
    let field = FieldShape::of::<String>("contact")
        .data_type(DataFormat::Phone)
        .email();
    assert_eq!(field_schema(&field, 1).format.as_deref(), Some("email"));

    let field = FieldShape::of::<String>("when").data_type(DataFormat::DateTime);
    assert_eq!(field_schema(&field, 1).format.as_deref(), Some("date-time"));

    let field = FieldShape::of::<String>("homepage").url();
    assert_eq!(field_schema(&field, 1).format.as_deref(), Some("uri"));
}

#[test]
fn payload_detection_requires_a_constructible_object() {
    assert!(is_object_type(&Order::shape()));
    assert!(!is_object_type(&TreeNode::shape()));
    assert!(!is_object_type(&Shape::of::<Option<String>>()));
    assert!(!is_object_type(&Shape::of::<String>()));
    assert!(!is_object_type(&Shape::of::<Vec<i32>>()));
    assert!(!is_object_type(&Shape::of::<serde_json::Value>()));
    assert!(!is_object_type(&Shape::of::<std::collections::HashMap<String, String>>()));
    assert!(!is_object_type(&Shape::nullable(Order::shape())));
}

#[test]
fn camel_case_conversion() {
    assert_eq!(to_camel_case("customer_name"), "customerName");
    assert_eq!(to_camel_case("Name"), "name");
    assert_eq!(to_camel_case("userId"), "userId");
    assert_eq!(to_camel_case("URLPath"), "urlPath");
    assert_eq!(to_camel_case("ID"), "id");
    assert_eq!(to_camel_case("_private_field"), "privateField");
}
