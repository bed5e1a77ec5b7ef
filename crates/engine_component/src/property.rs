//! Property reflection.
//!
//! Each component kind declares an ordered list of [`PropertyDescriptor`]s.
//! A descriptor knows the property's name, its semantic [`PropertyType`],
//! whether it is persisted in scene documents, and how to read and write the
//! value on a type-erased [`ComponentInstance`].
//!
//! Values cross the reflective boundary as [`serde_json::Value`]. Writes go
//! through [`PropertyType::coerce`] first, which performs the lenient
//! conversions scene files and the editor rely on (integral floats to ints,
//! numeric strings to numbers, `{x, y}` objects to vectors, ...). A value that
//! cannot be coerced yields [`ComponentError::Conversion`].

use std::fmt;
use std::sync::Arc;

use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::component::{ComponentInstance, ComponentKind};
use crate::error::ComponentError;

/// Name of the built-in, non-serializable owner property every kind exposes.
pub const ENTITY_ID_PROPERTY: &str = "entity_id";

/// The semantic type of a reflected property.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PropertyType {
    Int,
    Float,
    Bool,
    String,
    /// An enumeration persisted by variant name.
    Enum(&'static [&'static str]),
    /// A nested struct persisted as a JSON object.
    Struct(&'static str),
    /// A 2D vector persisted as `[x, y]`.
    Vec2,
    /// An RGBA color persisted as `{r, g, b, a}`.
    Color,
    /// A homogeneous list persisted as a JSON array.
    List,
}

impl PropertyType {
    /// Short name used in templates and diagnostics.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::Int => "int",
            Self::Float => "float",
            Self::Bool => "bool",
            Self::String => "string",
            Self::Enum(_) => "enum",
            Self::Struct(name) => name,
            Self::Vec2 => "vec2",
            Self::Color => "color",
            Self::List => "list",
        }
    }

    /// Convert `value` into the canonical JSON shape for this type.
    ///
    /// Returns `None` when the value does not convert cleanly.
    #[must_use]
    pub fn coerce(&self, value: &Value) -> Option<Value> {
        match self {
            Self::Int => coerce_int(value).map(Value::from),
            Self::Float => coerce_float(value).map(Value::from),
            Self::Bool => coerce_bool(value).map(Value::Bool),
            Self::String => match value {
                Value::String(s) => Some(Value::String(s.clone())),
                Value::Number(n) => Some(Value::String(n.to_string())),
                Value::Bool(b) => Some(Value::String(b.to_string())),
                _ => None,
            },
            Self::Enum(variants) => match value {
                Value::String(s) if variants.contains(&s.as_str()) => Some(value.clone()),
                other => {
                    let index = usize::try_from(coerce_int(other)?).ok()?;
                    variants.get(index).map(|v| Value::String((*v).to_string()))
                }
            },
            Self::Struct(_) | Self::Color => value.is_object().then(|| value.clone()),
            Self::Vec2 => match value {
                Value::Array(items) if items.len() == 2 => {
                    let x = coerce_float(&items[0])?;
                    let y = coerce_float(&items[1])?;
                    Some(Value::from(vec![x, y]))
                }
                Value::Object(map) => {
                    let x = coerce_float(map.get("x")?)?;
                    let y = coerce_float(map.get("y")?)?;
                    Some(Value::from(vec![x, y]))
                }
                _ => None,
            },
            Self::List => value.is_array().then(|| value.clone()),
        }
    }
}

impl fmt::Display for PropertyType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

fn coerce_int(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                Some(i)
            } else {
                let f = n.as_f64()?;
                (f.fract() == 0.0 && f >= i64::MIN as f64 && f <= i64::MAX as f64)
                    .then_some(f as i64)
            }
        }
        Value::Bool(b) => Some(i64::from(*b)),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn coerce_float(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn coerce_bool(value: &Value) -> Option<bool> {
    match value {
        Value::Bool(b) => Some(*b),
        Value::Number(n) => n.as_f64().map(|f| f != 0.0),
        Value::String(s) => match s.as_str() {
            "true" | "1" => Some(true),
            "false" | "0" => Some(false),
            _ => None,
        },
        _ => None,
    }
}

fn describe(value: &Value) -> String {
    match value {
        Value::Null => "null".to_string(),
        Value::Bool(b) => format!("bool {b}"),
        Value::Number(n) => format!("number {n}"),
        Value::String(s) => format!("string {s:?}"),
        Value::Array(a) => format!("array of {}", a.len()),
        Value::Object(_) => "object".to_string(),
    }
}

type Getter = Arc<dyn Fn(&ComponentInstance) -> Option<Value> + Send + Sync>;
type Setter = Arc<dyn Fn(&mut ComponentInstance, Value) -> Result<(), ComponentError> + Send + Sync>;
type ChangeCallback = Arc<dyn Fn(&mut ComponentInstance) + Send + Sync>;

/// Describes one reflected property of a component kind.
#[derive(Clone)]
pub struct PropertyDescriptor {
    /// Property name as it appears in documents and key paths.
    pub name: &'static str,
    /// Semantic type used to coerce incoming values.
    pub ty: PropertyType,
    /// Whether the property is written to scene documents.
    pub serializable: bool,
    getter: Getter,
    setter: Setter,
    on_change: Option<ChangeCallback>,
}

impl PropertyDescriptor {
    /// Describe a struct field of component `C` holding an `F`.
    ///
    /// `get` and `get_mut` project the field out of the component.
    #[must_use]
    pub fn field<C, F>(
        name: &'static str,
        ty: PropertyType,
        get: fn(&C) -> &F,
        get_mut: fn(&mut C) -> &mut F,
    ) -> Self
    where
        C: ComponentKind,
        F: Serialize + DeserializeOwned + 'static,
    {
        let getter: Getter = Arc::new(move |inst: &ComponentInstance| {
            let component = inst.downcast_ref::<C>()?;
            serde_json::to_value(get(component)).ok()
        });
        let setter: Setter = Arc::new(move |inst: &mut ComponentInstance, value: Value| {
            let found = describe(&value);
            let typed: F = serde_json::from_value(value).map_err(|_| ComponentError::Conversion {
                property: name.to_string(),
                expected: std::any::type_name::<F>().to_string(),
                found,
            })?;
            let component = inst
                .downcast_mut::<C>()
                .ok_or_else(|| ComponentError::NotFound(format!("{name} on {}", C::NAME)))?;
            *get_mut(component) = typed;
            Ok(())
        });
        Self {
            name,
            ty,
            serializable: true,
            getter,
            setter,
            on_change: None,
        }
    }

    /// The built-in owner back-reference. Never serialized and never written.
    #[must_use]
    pub fn entity_id() -> Self {
        Self {
            name: ENTITY_ID_PROPERTY,
            ty: PropertyType::Int,
            serializable: false,
            getter: Arc::new(|inst: &ComponentInstance| Some(Value::from(inst.entity().id()))),
            // Storage files components by owner; the header is never rewritten in place.
            setter: Arc::new(|_: &mut ComponentInstance, _: Value| {
                Err(ComponentError::InvalidKeyPath(format!("{ENTITY_ID_PROPERTY} is read-only")))
            }),
            on_change: None,
        }
    }

    /// Exclude this property from scene documents.
    #[must_use]
    pub fn transient(mut self) -> Self {
        self.serializable = false;
        self
    }

    /// Register a callback fired after an editor-driven write to this property.
    #[must_use]
    pub fn on_change<C: ComponentKind>(mut self, callback: fn(&mut C)) -> Self {
        self.on_change = Some(Arc::new(move |inst: &mut ComponentInstance| {
            if let Some(component) = inst.downcast_mut::<C>() {
                callback(component);
            }
        }));
        self
    }

    /// Read the current value.
    #[must_use]
    pub fn get(&self, inst: &ComponentInstance) -> Option<Value> {
        (self.getter)(inst)
    }

    /// Coerce `value` to this property's type and write it.
    ///
    /// # Errors
    ///
    /// Returns [`ComponentError::Conversion`] if the value does not convert.
    pub fn set(&self, inst: &mut ComponentInstance, value: &Value) -> Result<(), ComponentError> {
        let coerced = self.ty.coerce(value).ok_or_else(|| ComponentError::Conversion {
            property: self.name.to_string(),
            expected: self.ty.to_string(),
            found: describe(value),
        })?;
        (self.setter)(inst, coerced)
    }

    /// Write `value` at `path` below this property (nested struct fields or
    /// list elements), then store the updated property.
    ///
    /// # Errors
    ///
    /// Returns [`ComponentError::NotFound`] if the path does not exist and
    /// [`ComponentError::Conversion`] if the result no longer fits the type.
    pub fn set_nested(
        &self,
        inst: &mut ComponentInstance,
        path: &[PathSegment],
        value: Value,
    ) -> Result<(), ComponentError> {
        if path.is_empty() {
            return self.set(inst, &value);
        }
        let mut current = self
            .get(inst)
            .ok_or_else(|| ComponentError::NotFound(self.name.to_string()))?;
        write_path(&mut current, path, value)?;
        self.set(inst, &current)
    }

    /// Fire the change callback, if any.
    pub fn notify_changed(&self, inst: &mut ComponentInstance) {
        if let Some(callback) = &self.on_change {
            callback(inst);
        }
    }

    #[must_use]
    pub fn has_change_callback(&self) -> bool {
        self.on_change.is_some()
    }
}

impl fmt::Debug for PropertyDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PropertyDescriptor")
            .field("name", &self.name)
            .field("ty", &self.ty)
            .field("serializable", &self.serializable)
            .field("on_change", &self.on_change.is_some())
            .finish()
    }
}

/// One step of a key path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PathSegment {
    Key(String),
    Index(usize),
}

/// Parse a key path such as `"spawn.offsets[2].x"` or `"position.0"`.
///
/// # Errors
///
/// Returns [`ComponentError::InvalidKeyPath`] for empty paths, empty segments,
/// unterminated brackets or non-numeric indices.
pub fn parse_key_path(path: &str) -> Result<Vec<PathSegment>, ComponentError> {
    let invalid = || ComponentError::InvalidKeyPath(path.to_string());
    if path.trim().is_empty() {
        return Err(invalid());
    }

    let mut segments = Vec::new();
    for part in path.split('.') {
        let (head, mut rest) = match part.find('[') {
            Some(pos) => part.split_at(pos),
            None => (part, ""),
        };
        if head.is_empty() && segments.is_empty() {
            return Err(invalid());
        }
        if !head.is_empty() {
            segments.push(PathSegment::Key(head.to_string()));
        } else if rest.is_empty() {
            return Err(invalid());
        }
        while !rest.is_empty() {
            let inner = rest.strip_prefix('[').ok_or_else(invalid)?;
            let close = inner.find(']').ok_or_else(invalid)?;
            let index = inner[..close].trim().parse().map_err(|_| invalid())?;
            segments.push(PathSegment::Index(index));
            rest = &inner[close + 1..];
        }
    }
    Ok(segments)
}

/// Replace the value found by walking `path` from `root`.
///
/// A `Key` segment made of digits also indexes into arrays, so both
/// `points[1]` and `points.1` work.
///
/// # Errors
///
/// Returns [`ComponentError::NotFound`] if any step does not exist.
pub fn write_path(root: &mut Value, path: &[PathSegment], value: Value) -> Result<(), ComponentError> {
    let mut current = root;
    for segment in path {
        current = match (segment, current) {
            (PathSegment::Key(key), Value::Object(map)) => map
                .get_mut(key)
                .ok_or_else(|| ComponentError::NotFound(key.clone()))?,
            (PathSegment::Key(key), Value::Array(items)) => {
                let index: usize = key
                    .parse()
                    .map_err(|_| ComponentError::NotFound(key.clone()))?;
                items
                    .get_mut(index)
                    .ok_or_else(|| ComponentError::NotFound(key.clone()))?
            }
            (PathSegment::Index(index), Value::Array(items)) => items
                .get_mut(*index)
                .ok_or_else(|| ComponentError::NotFound(format!("[{index}]")))?,
            (segment, _) => return Err(ComponentError::NotFound(format!("{segment:?}"))),
        };
    }
    *current = value;
    Ok(())
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::component::Component;
    use crate::entity::Entity;

    #[derive(Debug, Default)]
    struct Probe {
        count: i32,
        speed: f32,
        label: String,
        offsets: Vec<f32>,
        touched: u32,
    }

    impl Component for Probe {}

    impl ComponentKind for Probe {
        const NAME: &'static str = "Probe";

        fn properties() -> Vec<PropertyDescriptor> {
            vec![
                PropertyDescriptor::field::<Self, i32>(
                    "count",
                    PropertyType::Int,
                    |c| &c.count,
                    |c| &mut c.count,
                ),
                PropertyDescriptor::field::<Self, f32>(
                    "speed",
                    PropertyType::Float,
                    |c| &c.speed,
                    |c| &mut c.speed,
                )
                .on_change::<Self>(|c| c.touched += 1),
                PropertyDescriptor::field::<Self, String>(
                    "label",
                    PropertyType::String,
                    |c| &c.label,
                    |c| &mut c.label,
                ),
                PropertyDescriptor::field::<Self, Vec<f32>>(
                    "offsets",
                    PropertyType::List,
                    |c| &c.offsets,
                    |c| &mut c.offsets,
                ),
            ]
        }
    }

    fn prop(name: &str) -> PropertyDescriptor {
        Probe::properties()
            .into_iter()
            .find(|p| p.name == name)
            .unwrap()
    }

    #[test]
    fn test_int_coercion() {
        assert_eq!(PropertyType::Int.coerce(&json!(3)), Some(json!(3)));
        assert_eq!(PropertyType::Int.coerce(&json!(3.0)), Some(json!(3)));
        assert_eq!(PropertyType::Int.coerce(&json!("12")), Some(json!(12)));
        assert_eq!(PropertyType::Int.coerce(&json!(3.5)), None);
        assert_eq!(PropertyType::Int.coerce(&json!({"a": 1})), None);
    }

    #[test]
    fn test_float_and_bool_coercion() {
        assert_eq!(PropertyType::Float.coerce(&json!("12.5")), Some(json!(12.5)));
        assert_eq!(PropertyType::Float.coerce(&json!(2)), Some(json!(2.0)));
        assert_eq!(PropertyType::Bool.coerce(&json!("1")), Some(json!(true)));
        assert_eq!(PropertyType::Bool.coerce(&json!(0)), Some(json!(false)));
        assert_eq!(PropertyType::Bool.coerce(&json!("maybe")), None);
    }

    #[test]
    fn test_enum_and_vec2_coercion() {
        let shape = PropertyType::Enum(&["None", "Rectangle", "Circle"]);
        assert_eq!(shape.coerce(&json!("Circle")), Some(json!("Circle")));
        assert_eq!(shape.coerce(&json!(1)), Some(json!("Rectangle")));
        assert_eq!(shape.coerce(&json!("Hexagon")), None);
        assert_eq!(shape.coerce(&json!(9)), None);

        assert_eq!(
            PropertyType::Vec2.coerce(&json!({"x": 1, "y": 2.5})),
            Some(json!([1.0, 2.5]))
        );
        assert_eq!(PropertyType::Vec2.coerce(&json!([1, 2, 3])), None);
    }

    #[test]
    fn test_field_get_and_set() {
        let mut inst = ComponentInstance::new(Entity(1), Probe::default());
        prop("count").set(&mut inst, &json!(42)).unwrap();
        prop("label").set(&mut inst, &json!("hello")).unwrap();
        assert_eq!(prop("count").get(&inst), Some(json!(42)));
        assert_eq!(prop("label").get(&inst), Some(json!("hello")));
    }

    #[test]
    fn test_set_rejects_unconvertible_value() {
        let mut inst = ComponentInstance::new(Entity(1), Probe::default());
        let err = prop("count").set(&mut inst, &json!("abc")).unwrap_err();
        assert!(matches!(err, ComponentError::Conversion { .. }));
        assert_eq!(inst.downcast_ref::<Probe>().unwrap().count, 0);
    }

    #[test]
    fn test_out_of_range_int_is_a_conversion_error() {
        let mut inst = ComponentInstance::new(Entity(1), Probe::default());
        let err = prop("count").set(&mut inst, &json!(10_000_000_000_i64)).unwrap_err();
        assert!(matches!(err, ComponentError::Conversion { .. }));
    }

    #[test]
    fn test_change_callback() {
        let mut inst = ComponentInstance::new(Entity(1), Probe::default());
        let speed = prop("speed");
        assert!(speed.has_change_callback());
        speed.set(&mut inst, &json!(2.0)).unwrap();
        speed.notify_changed(&mut inst);
        assert_eq!(inst.downcast_ref::<Probe>().unwrap().touched, 1);
    }

    #[test]
    fn test_entity_id_property_is_transient_and_read_only() {
        let mut inst = ComponentInstance::new(Entity(5), Probe::default());
        let owner = PropertyDescriptor::entity_id();
        assert!(!owner.serializable);
        assert_eq!(owner.get(&inst), Some(json!(5)));
        assert!(matches!(
            owner.set(&mut inst, &json!(9)),
            Err(ComponentError::InvalidKeyPath(_))
        ));
        assert_eq!(inst.entity(), Entity(5));
    }

    #[test]
    fn test_parse_key_path() {
        assert_eq!(
            parse_key_path("offsets[2]").unwrap(),
            vec![PathSegment::Key("offsets".into()), PathSegment::Index(2)]
        );
        assert_eq!(
            parse_key_path("a.b[0][1].c").unwrap(),
            vec![
                PathSegment::Key("a".into()),
                PathSegment::Key("b".into()),
                PathSegment::Index(0),
                PathSegment::Index(1),
                PathSegment::Key("c".into()),
            ]
        );
        assert!(parse_key_path("").is_err());
        assert!(parse_key_path("a..b").is_err());
        assert!(parse_key_path("a[x]").is_err());
        assert!(parse_key_path("a[1").is_err());
    }

    #[test]
    fn test_set_nested_list_element() {
        let mut inst = ComponentInstance::new(
            Entity(1),
            Probe {
                offsets: vec![1.0, 2.0, 3.0],
                ..Probe::default()
            },
        );
        let offsets = prop("offsets");
        offsets
            .set_nested(&mut inst, &[PathSegment::Index(1)], json!(9.5))
            .unwrap();
        assert_eq!(inst.downcast_ref::<Probe>().unwrap().offsets, vec![1.0, 9.5, 3.0]);

        let err = offsets
            .set_nested(&mut inst, &[PathSegment::Index(7)], json!(1.0))
            .unwrap_err();
        assert!(matches!(err, ComponentError::NotFound(_)));
    }

    #[test]
    fn test_write_path_numeric_key_indexes_arrays() {
        let mut value = json!({"points": [[0, 0], [1, 1]]});
        write_path(
            &mut value,
            &[
                PathSegment::Key("points".into()),
                PathSegment::Key("1".into()),
                PathSegment::Index(0),
            ],
            json!(5),
        )
        .unwrap();
        assert_eq!(value, json!({"points": [[0, 0], [5, 1]]}));
    }
}
