//! Runtime values.
//!
//! Values are immutable and cheap to clone: strings and lists are shared
//! behind `Arc`, host objects are opaque `Arc<dyn Any>` handles.

use std::any::Any;
use std::fmt;
use std::sync::Arc;

use crate::{Name, Type};

/// A value produced or consumed by an expression.
#[derive(Clone)]
pub enum Value {
    Unit,
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(Arc<str>),
    List(ListValue),
    Object(ObjectRef),
}

/// A homogeneous list.
///
/// The element type is carried explicitly so that an empty list still
/// knows its type.
#[derive(Clone)]
pub struct ListValue {
    element: Type,
    items: Arc<[Value]>,
}

impl ListValue {
    pub fn new(element: Type, items: impl Into<Arc<[Value]>>) -> Self {
        ListValue {
            element,
            items: items.into(),
        }
    }

    pub fn element_type(&self) -> &Type {
        &self.element
    }

    pub fn items(&self) -> &[Value] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

/// Handle to host data of a declared object type.
#[derive(Clone)]
pub struct ObjectRef {
    type_name: Name,
    data: Arc<dyn Any + Send + Sync>,
}

impl ObjectRef {
    pub fn new<T: Any + Send + Sync>(type_name: impl Into<Name>, data: T) -> Self {
        ObjectRef {
            type_name: type_name.into(),
            data: Arc::new(data),
        }
    }

    pub fn type_name(&self) -> &Name {
        &self.type_name
    }

    /// Borrow the host data as `T`, if that is what it holds.
    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        self.data.downcast_ref::<T>()
    }
}

impl Value {
    /// Shorthand for a string value.
    pub fn string(text: impl AsRef<str>) -> Self {
        Value::Str(Arc::from(text.as_ref()))
    }

    /// List value with an explicit element type.
    pub fn list(element: Type, items: impl Into<Arc<[Value]>>) -> Self {
        Value::List(ListValue::new(element, items))
    }

    /// Host object value.
    pub fn object<T: Any + Send + Sync>(type_name: impl Into<Name>, data: T) -> Self {
        Value::Object(ObjectRef::new(type_name, data))
    }

    /// The runtime type of this value.
    pub fn ty(&self) -> Type {
        match self {
            Value::Unit => Type::Unit,
            Value::Bool(_) => Type::Bool,
            Value::Int(_) => Type::Int,
            Value::Float(_) => Type::Float,
            Value::Str(_) => Type::Str,
            Value::List(list) => Type::list_of(list.element.clone()),
            Value::Object(obj) => Type::Object(obj.type_name.clone()),
        }
    }

    /// Name of the value's type for messages.
    pub fn type_name(&self) -> String {
        self.ty().to_string()
    }

    /// Whether this value has exactly type `ty`.
    pub fn conforms_to(&self, ty: &Type) -> bool {
        match (self, ty) {
            (Value::Unit, Type::Unit)
            | (Value::Bool(_), Type::Bool)
            | (Value::Int(_), Type::Int)
            | (Value::Float(_), Type::Float)
            | (Value::Str(_), Type::Str) => true,
            (Value::List(list), Type::List(elem)) => list.element == **elem,
            (Value::Object(obj), Type::Object(name)) => obj.type_name == *name,
            _ => false,
        }
    }

    /// Convert to `ty` exactly or by `int -> float` widening.
    pub fn coerce_to(&self, ty: &Type) -> Option<Value> {
        if self.conforms_to(ty) {
            return Some(self.clone());
        }
        match (self, ty) {
            (Value::Int(n), Type::Float) => Some(Value::Float(widen_int(*n))),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            Value::Int(n) => Some(*n),
            _ => None,
        }
    }

    /// Float view of a numeric value; integers are widened.
    pub fn as_float(&self) -> Option<f64> {
        match self {
            Value::Float(x) => Some(*x),
            Value::Int(n) => Some(widen_int(*n)),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Str(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&ListValue> {
        match self {
            Value::List(list) => Some(list),
            _ => None,
        }
    }

    pub fn as_object(&self) -> Option<&ObjectRef> {
        match self {
            Value::Object(obj) => Some(obj),
            _ => None,
        }
    }
}

/// The `int -> float` widening conversion.
#[inline]
#[expect(
    clippy::cast_precision_loss,
    reason = "int -> float widening is lossy by definition"
)]
pub fn widen_int(n: i64) -> f64 {
    n as f64
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Unit, Value::Unit) => true,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Int(a), Value::Int(b)) => a == b,
            (Value::Float(a), Value::Float(b)) => a == b,
            (Value::Str(a), Value::Str(b)) => a == b,
            (Value::List(a), Value::List(b)) => a.element == b.element && a.items == b.items,
            (Value::Object(a), Value::Object(b)) => {
                a.type_name == b.type_name && Arc::ptr_eq(&a.data, &b.data)
            }
            _ => false,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Unit => f.write_str("()"),
            Value::Bool(b) => write!(f, "{b}"),
            Value::Int(n) => write!(f, "{n}"),
            // Keeps a fractional part so `1.0` never reads as the int `1`.
            Value::Float(x) => write!(f, "{x:?}"),
            Value::Str(s) => f.write_str(s),
            Value::List(list) => {
                f.write_str("[")?;
                for (i, item) in list.items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{item}")?;
                }
                f.write_str("]")
            }
            Value::Object(obj) => write!(f, "<{}>", obj.type_name),
        }
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Unit => f.write_str("Unit"),
            Value::Bool(b) => write!(f, "Bool({b})"),
            Value::Int(n) => write!(f, "Int({n})"),
            Value::Float(x) => write!(f, "Float({x:?})"),
            Value::Str(s) => write!(f, "Str({:?})", &**s),
            Value::List(list) => f.debug_list().entries(list.items.iter()).finish(),
            Value::Object(obj) => write!(f, "Object({})", obj.type_name),
        }
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Int(n)
    }
}

impl From<i32> for Value {
    fn from(n: i32) -> Self {
        Value::Int(i64::from(n))
    }
}

impl From<f64> for Value {
    fn from(x: f64) -> Self {
        Value::Float(x)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Str(Arc::from(s))
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Str(Arc::from(s))
    }
}

impl From<()> for Value {
    fn from((): ()) -> Self {
        Value::Unit
    }
}
