//! Component registry: the catalog of known component kinds.
//!
//! Each registered kind carries a constructor, its property descriptors and
//! its declared requirements. Lookups by name never panic: an unknown name
//! yields `None` or [`ComponentError::UnknownKind`], since scene files may
//! still reference kinds that have since been removed.

use std::collections::HashMap;

use serde_json::{Map, Value, json};
use tracing::{debug, warn};

use crate::component::{ComponentInstance, ComponentKind, ComponentTypeId, ErasedComponent};
use crate::entity::Entity;
use crate::error::ComponentError;
use crate::property::{ENTITY_ID_PROPERTY, PathSegment, PropertyDescriptor, parse_key_path};

/// Builds a default-valued instance of a kind.
pub type Constructor = fn() -> Box<dyn ErasedComponent>;

/// Everything the engine knows about one component kind.
#[derive(Debug, Clone)]
pub struct KindInfo {
    pub id: ComponentTypeId,
    pub name: &'static str,
    /// Kinds that must coexist on the same entity.
    pub requires: &'static [&'static str],
    /// Properties in declaration order, starting with the built-in `entity_id`.
    pub properties: Vec<PropertyDescriptor>,
    pub construct: Constructor,
}

impl KindInfo {
    /// Describe a kind from its parts. The built-in `entity_id` property is
    /// prepended unless `properties` already declares it.
    #[must_use]
    pub fn new(
        name: &'static str,
        requires: &'static [&'static str],
        mut properties: Vec<PropertyDescriptor>,
        construct: Constructor,
    ) -> Self {
        if !properties.iter().any(|p| p.name == ENTITY_ID_PROPERTY) {
            properties.insert(0, PropertyDescriptor::entity_id());
        }
        Self {
            id: ComponentTypeId::from_name(name),
            name,
            requires,
            properties,
            construct,
        }
    }

    /// Describe the Rust component kind `T`.
    #[must_use]
    pub fn of<T: ComponentKind>() -> Self {
        fn construct<T: ComponentKind>() -> Box<dyn ErasedComponent> {
            Box::new(T::default())
        }
        Self::new(T::NAME, T::REQUIRES, T::properties(), construct::<T>)
    }

    /// Construct a default-valued instance owned by `entity`.
    #[must_use]
    pub fn create(&self, entity: Entity) -> ComponentInstance {
        ComponentInstance::from_boxed(entity, (self.construct)())
    }

    #[must_use]
    pub fn property(&self, name: &str) -> Option<&PropertyDescriptor> {
        self.properties.iter().find(|p| p.name == name)
    }

    /// Properties that are persisted in scene documents.
    pub fn serializable_properties(&self) -> impl Iterator<Item = &PropertyDescriptor> {
        self.properties.iter().filter(|p| p.serializable)
    }

    /// Read every serializable property of `instance` into a JSON object.
    #[must_use]
    pub fn read_inputs(&self, instance: &ComponentInstance) -> Map<String, Value> {
        self.serializable_properties()
            .filter_map(|p| Some((p.name.to_string(), p.get(instance)?)))
            .collect()
    }

    /// Write the entries of `inputs` that name a serializable property.
    ///
    /// Unknown names and values that do not convert are skipped. Returns the
    /// number of properties written.
    pub fn write_inputs(&self, instance: &mut ComponentInstance, inputs: &Map<String, Value>) -> usize {
        let mut written = 0;
        for (name, value) in inputs {
            let Some(property) = self.property(name).filter(|p| p.serializable) else {
                debug!(kind = self.name, property = %name, "ignoring unknown property");
                continue;
            };
            match property.set(instance, value) {
                Ok(()) => written += 1,
                Err(e) => debug!(kind = self.name, property = %name, error = %e, "skipping property"),
            }
        }
        written
    }

    /// Write `value` at a key path such as `"size.x"` or `"points[2]"`, then
    /// fire the property's change callback.
    ///
    /// # Errors
    ///
    /// Returns [`ComponentError::InvalidKeyPath`] for unparsable paths,
    /// [`ComponentError::NotFound`] for unknown properties or missing nested
    /// keys, and [`ComponentError::Conversion`] for values that do not fit.
    pub fn set_path(
        &self,
        instance: &mut ComponentInstance,
        key_path: &str,
        value: Value,
    ) -> Result<(), ComponentError> {
        let segments = parse_key_path(key_path)?;
        let Some((PathSegment::Key(head), rest)) = segments.split_first() else {
            return Err(ComponentError::InvalidKeyPath(key_path.to_string()));
        };
        let property = self
            .property(head)
            .ok_or_else(|| ComponentError::NotFound(format!("{}.{head}", self.name)))?;
        property.set_nested(instance, rest, value)?;
        property.notify_changed(instance);
        Ok(())
    }

    /// The default-valued component document: `{"type": name, "inputs": {...}}`.
    #[must_use]
    pub fn template(&self) -> Value {
        let instance = self.create(Entity::INVALID);
        json!({
            "type": self.name,
            "inputs": Value::Object(self.read_inputs(&instance)),
        })
    }
}

/// Registry of every component kind known to the process.
#[derive(Debug, Default, Clone)]
pub struct Registry {
    kinds: HashMap<&'static str, KindInfo>,
}

impl Registry {
    /// Create a new empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self {
            kinds: HashMap::new(),
        }
    }

    /// Register the Rust component kind `T`.
    pub fn register<T: ComponentKind>(&mut self) -> &mut Self {
        self.register_kind(KindInfo::of::<T>())
    }

    /// Register a kind description. A kind with the same name is replaced.
    pub fn register_kind(&mut self, info: KindInfo) -> &mut Self {
        let name = info.name;
        if self.kinds.insert(name, info).is_some() {
            warn!(kind = name, "component kind registered twice, replacing");
        } else {
            debug!(kind = name, "registered component kind");
        }
        self
    }

    /// Returns information about a kind by name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&KindInfo> {
        self.kinds.get(name)
    }

    /// Look up a kind by name.
    ///
    /// # Errors
    ///
    /// Returns [`ComponentError::UnknownKind`] if no kind has that name.
    pub fn find(&self, name: &str) -> Result<&KindInfo, ComponentError> {
        self.get(name)
            .ok_or_else(|| ComponentError::UnknownKind(name.to_string()))
    }

    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.kinds.contains_key(name)
    }

    /// Construct a default instance with no owner.
    ///
    /// # Errors
    ///
    /// Returns [`ComponentError::UnknownKind`] if no kind has that name.
    pub fn create(&self, name: &str) -> Result<ComponentInstance, ComponentError> {
        self.create_for(name, Entity::INVALID)
    }

    /// Construct a default instance owned by `entity`.
    ///
    /// # Errors
    ///
    /// Returns [`ComponentError::UnknownKind`] if no kind has that name.
    pub fn create_for(&self, name: &str, entity: Entity) -> Result<ComponentInstance, ComponentError> {
        Ok(self.find(name)?.create(entity))
    }

    /// Ordered property list of a kind.
    ///
    /// # Errors
    ///
    /// Returns [`ComponentError::UnknownKind`] if no kind has that name.
    pub fn properties(&self, name: &str) -> Result<&[PropertyDescriptor], ComponentError> {
        Ok(&self.find(name)?.properties)
    }

    /// All registered kinds, sorted by name.
    #[must_use]
    pub fn kinds(&self) -> Vec<&KindInfo> {
        let mut kinds: Vec<_> = self.kinds.values().collect();
        kinds.sort_by_key(|k| k.name);
        kinds
    }

    /// Returns the number of registered kinds.
    #[must_use]
    pub fn len(&self) -> usize {
        self.kinds.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.kinds.is_empty()
    }

    /// The default-valued document of a kind.
    ///
    /// # Errors
    ///
    /// Returns [`ComponentError::UnknownKind`] if no kind has that name.
    pub fn template(&self, name: &str) -> Result<Value, ComponentError> {
        Ok(self.find(name)?.template())
    }
}
