// Shape descriptions for common types
//
// `Describe` is implemented here for primitives, collections and the
// uuid/chrono/serde_json types. Payload structs implement it by hand with
// `ObjectShape`.

use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet, VecDeque};
use std::rc::Rc;
use std::sync::Arc;

use super::shape::{Shape, ShapeRef};

/// Types that can describe their own data shape
pub trait Describe {
    fn shape() -> Shape;
}

macro_rules! describe_as {
    ($shape:expr => $($ty:ty),+ $(,)?) => {
        $(
            impl Describe for $ty {
                fn shape() -> Shape {
                    $shape
                }
            }
        )+
    };
}

describe_as!(Shape::String => String, str, char);
describe_as!(Shape::Integer => i8, i16, i32, i64, i128, isize, u8, u16, u32, u64, u128, usize);
describe_as!(Shape::Number => f32, f64);
describe_as!(Shape::Boolean => bool);
describe_as!(Shape::Uuid => uuid::Uuid);
describe_as!(Shape::Date => chrono::NaiveDate);
describe_as!(Shape::Time => chrono::NaiveTime);
describe_as!(Shape::DateTime => chrono::NaiveDateTime);
describe_as!(Shape::Any => serde_json::Value);
describe_as!(Shape::Map => serde_json::Map<String, serde_json::Value>);

impl<Tz: chrono::TimeZone> Describe for chrono::DateTime<Tz> {
    fn shape() -> Shape {
        Shape::DateTime
    }
}

impl<T: Describe> Describe for Option<T> {
    fn shape() -> Shape {
        Shape::Nullable(ShapeRef::of::<T>())
    }
}

impl<T: Describe + ?Sized> Describe for Box<T> {
    fn shape() -> Shape {
        T::shape()
    }
}

impl<T: Describe + ?Sized> Describe for Arc<T> {
    fn shape() -> Shape {
        T::shape()
    }
}

impl<T: Describe + ?Sized> Describe for Rc<T> {
    fn shape() -> Shape {
        T::shape()
    }
}

impl<T: Describe> Describe for [T] {
    fn shape() -> Shape {
        Shape::Array(ShapeRef::of::<T>())
    }
}

impl<T: Describe, const N: usize> Describe for [T; N] {
    fn shape() -> Shape {
        Shape::Array(ShapeRef::of::<T>())
    }
}

impl<T: Describe> Describe for Vec<T> {
    fn shape() -> Shape {
        Shape::Array(ShapeRef::of::<T>())
    }
}

impl<T: Describe> Describe for VecDeque<T> {
    fn shape() -> Shape {
        Shape::Array(ShapeRef::of::<T>())
    }
}

impl<T: Describe, S> Describe for HashSet<T, S> {
    fn shape() -> Shape {
        Shape::Array(ShapeRef::of::<T>())
    }
}

impl<T: Describe> Describe for BTreeSet<T> {
    fn shape() -> Shape {
        Shape::Array(ShapeRef::of::<T>())
    }
}

impl<K, V, S> Describe for HashMap<K, V, S> {
    fn shape() -> Shape {
        Shape::Map
    }
}

impl<K, V> Describe for BTreeMap<K, V> {
    fn shape() -> Shape {
        Shape::Map
    }
}
