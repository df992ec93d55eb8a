// Data shape descriptors
//
// A `Shape` is the explicit, build-time description of a Rust type that the
// schema generator turns into JSON Schema. Child shapes of arrays, nullables
// and object fields are held as `ShapeRef`s so recursive types can be
// described without recursing at construction time.

use serde_json::Value;

use super::describe::Describe;

/// Function producing a shape, used to defer child shape construction
pub type ShapeFn = fn() -> Shape;

/// Reference to a child shape
#[derive(Debug, Clone)]
pub enum ShapeRef {
    /// A shape built inline
    Inline(Box<Shape>),
    /// A shape produced on demand (typically `<T as Describe>::shape`)
    Deferred(ShapeFn),
}

impl ShapeRef {
    /// Produce the shape this reference points at
    pub fn resolve(&self) -> Shape {
        match self {
            ShapeRef::Inline(shape) => (**shape).clone(),
            ShapeRef::Deferred(make) => make(),
        }
    }

    /// Deferred reference to a type's own shape
    pub fn of<T: Describe + ?Sized>() -> Self {
        ShapeRef::Deferred(T::shape)
    }
}

impl From<Shape> for ShapeRef {
    fn from(shape: Shape) -> Self {
        ShapeRef::Inline(Box::new(shape))
    }
}

/// Description of a data shape
#[derive(Debug, Clone)]
pub enum Shape {
    String,
    /// Any integer width
    Integer,
    /// Any floating point or decimal width
    Number,
    Boolean,
    Date,
    DateTime,
    Time,
    Uuid,
    Uri,
    /// Enumeration, carrying its symbolic member names
    Enum(Vec<String>),
    Array(ShapeRef),
    /// Map/dictionary; opaque to the schema
    Map,
    Nullable(ShapeRef),
    Object(ObjectShape),
    /// A raw JSON element, passed through untouched
    Any,
}

impl Shape {
    /// Shape of a type that implements `Describe`
    pub fn of<T: Describe + ?Sized>() -> Self {
        T::shape()
    }

    /// Array of `items`
    pub fn array(items: Shape) -> Self {
        Shape::Array(items.into())
    }

    /// Optional wrapper around `inner`
    pub fn nullable(inner: Shape) -> Self {
        Shape::Nullable(inner.into())
    }

    /// Enumeration over the given symbolic names
    pub fn enumeration<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Shape::Enum(names.into_iter().map(Into::into).collect())
    }

    /// Object with the given fields
    pub fn object(object: ObjectShape) -> Self {
        Shape::Object(object)
    }

    /// Whether the shape accepts `null`
    pub fn is_nullable(&self) -> bool {
        matches!(self, Shape::Nullable(_))
    }

    /// Strips any nullable wrappers
    pub fn unwrap_nullable(&self) -> Shape {
        match self {
            Shape::Nullable(inner) => inner.resolve().unwrap_nullable(),
            other => other.clone(),
        }
    }

    /// Whether values of this shape are reference-like rather than plain values.
    /// Reference-like shapes with no nullable wrapper are implicitly required.
    pub fn is_reference_type(&self) -> bool {
        matches!(
            self,
            Shape::String | Shape::Uri | Shape::Array(_) | Shape::Map | Shape::Object(_) | Shape::Any
        )
    }

    /// Zero value used when an argument of this shape is absent. `None` means
    /// the argument is bound as absent.
    pub fn zero_value(&self) -> Option<Value> {
        match self {
            Shape::Integer => Some(Value::from(0)),
            Shape::Number => Some(Value::from(0.0)),
            Shape::Boolean => Some(Value::Bool(false)),
            _ => None,
        }
    }
}

/// Class-like object description
#[derive(Debug, Clone, Default)]
pub struct ObjectShape {
    pub fields: Vec<FieldShape>,
    /// Whether an empty instance can be constructed when no arguments arrive
    pub constructible: bool,
}

impl ObjectShape {
    /// Empty object shape
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a field
    pub fn field(mut self, field: FieldShape) -> Self {
        self.fields.push(field);
        self
    }

    /// Marks the object as default-constructible, which makes it eligible for
    /// whole-object (payload) argument binding
    pub fn constructible(mut self) -> Self {
        self.constructible = true;
        self
    }
}

/// Semantic string formats
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataFormat {
    Date,
    DateTime,
    Time,
    Email,
    Url,
    Phone,
}

impl DataFormat {
    /// JSON schema `format` string
    pub fn as_str(&self) -> &'static str {
        match self {
            DataFormat::Date => "date",
            DataFormat::DateTime => "date-time",
            DataFormat::Time => "time",
            DataFormat::Email => "email",
            DataFormat::Url => "uri",
            DataFormat::Phone => "phone",
        }
    }
}

/// Validation metadata attached to a field or argument
#[derive(Debug, Clone, Default)]
pub struct Constraints {
    pub minimum: Option<Value>,
    pub maximum: Option<Value>,
    pub min_length: Option<u64>,
    pub max_length: Option<u64>,
    pub pattern: Option<String>,
    /// Allowed values declared on the field itself
    pub allowed_values: Option<Vec<Value>>,
    /// Allowed values coming from an attached validation rule; loses to `allowed_values`
    pub validator_allowed_values: Option<Vec<Value>>,
    /// Generic data type marker
    pub data_type: Option<DataFormat>,
    /// Semantic marker (email, url, phone); wins over `data_type`
    pub semantic_format: Option<DataFormat>,
}

/// A named property of an object shape
#[derive(Debug, Clone)]
pub struct FieldShape {
    pub name: String,
    pub shape: ShapeRef,
    pub description: Option<String>,
    /// Explicit required marker
    pub required: bool,
    pub default: Option<Value>,
    pub constraints: Constraints,
}

impl FieldShape {
    /// Field with an explicit shape
    pub fn new(name: impl Into<String>, shape: Shape) -> Self {
        Self::with_ref(name, shape.into())
    }

    /// Field whose shape comes from `T`
    pub fn of<T: Describe + ?Sized>(name: impl Into<String>) -> Self {
        Self::with_ref(name, ShapeRef::of::<T>())
    }

    fn with_ref(name: impl Into<String>, shape: ShapeRef) -> Self {
        Self {
            name: name.into(),
            shape,
            description: None,
            required: false,
            default: None,
            constraints: Constraints::default(),
        }
    }

    /// Human-readable description
    pub fn description(mut self, text: impl Into<String>) -> Self {
        self.description = Some(text.into());
        self
    }

    /// Mark the field as required
    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    /// Default value advertised in the schema
    pub fn default_value(mut self, value: impl Into<Value>) -> Self {
        self.default = Some(value.into());
        self
    }

    /// Inclusive numeric range
    pub fn range(mut self, min: impl Into<Value>, max: impl Into<Value>) -> Self {
        self.constraints.minimum = Some(min.into());
        self.constraints.maximum = Some(max.into());
        self
    }

    /// Inclusive lower bound
    pub fn minimum(mut self, min: impl Into<Value>) -> Self {
        self.constraints.minimum = Some(min.into());
        self
    }

    /// Inclusive upper bound
    pub fn maximum(mut self, max: impl Into<Value>) -> Self {
        self.constraints.maximum = Some(max.into());
        self
    }

    /// Minimum string length
    pub fn min_length(mut self, len: u64) -> Self {
        self.constraints.min_length = Some(len);
        self
    }

    /// Maximum string length
    pub fn max_length(mut self, len: u64) -> Self {
        self.constraints.max_length = Some(len);
        self
    }

    /// Combined string length rule: a maximum with an optional minimum
    pub fn string_length(mut self, max: u64, min: Option<u64>) -> Self {
        self.constraints.max_length = Some(max);
        if let Some(min) = min {
            self.constraints.min_length = Some(min);
        }
        self
    }

    /// Regular expression the value must match
    pub fn pattern(mut self, pattern: impl Into<String>) -> Self {
        self.constraints.pattern = Some(pattern.into());
        self
    }

    /// Allowed values declared on the field itself
    pub fn allowed_values<I, V>(mut self, values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        self.constraints.allowed_values = Some(values.into_iter().map(Into::into).collect());
        self
    }

    /// Allowed values coming from a validator rule
    pub fn validator_allowed_values<I, V>(mut self, values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        self.constraints.validator_allowed_values =
            Some(values.into_iter().map(Into::into).collect());
        self
    }

    /// Declared data format
    pub fn data_type(mut self, format: DataFormat) -> Self {
        self.constraints.data_type = Some(format);
        self
    }

    /// Mark the value as an email address
    pub fn email(mut self) -> Self {
        self.constraints.semantic_format = Some(DataFormat::Email);
        self
    }

    /// Mark the value as a URL
    pub fn url(mut self) -> Self {
        self.constraints.semantic_format = Some(DataFormat::Url);
        self
    }

    /// Mark the value as a phone number
    pub fn phone(mut self) -> Self {
        self.constraints.semantic_format = Some(DataFormat::Phone);
        self
    }

    /// Whether this field lands in the `required` list: explicitly marked, or
    /// a non-nullable reference-like shape with no default
    pub fn is_required(&self) -> bool {
        self.required || (self.default.is_none() && self.shape.resolve().is_reference_type())
    }
}
