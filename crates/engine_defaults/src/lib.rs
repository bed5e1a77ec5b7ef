//! Default component kinds.
//!
//! The set is closed and compiled in: [`register_defaults`] adds every kind
//! to a [`Registry`] at startup.

pub mod collider;
pub mod player;
pub mod transform;
pub mod zone;

pub use collider::{Collider, ColliderShape};
pub use player::PlayerInfo;
pub use transform::{Position, Scale, Speed, Tag, Velocity};
pub use zone::{Zone, ZoneManager};

use engine_component::Registry;

/// Register every default kind.
pub fn register_defaults(registry: &mut Registry) -> &mut Registry {
    registry
        .register::<Position>()
        .register::<Scale>()
        .register::<Velocity>()
        .register::<Speed>()
        .register::<Tag>()
        .register::<Collider>()
        .register::<Zone>()
        .register::<ZoneManager>()
        .register::<PlayerInfo>()
}

/// A registry holding exactly the default kinds.
#[must_use]
pub fn default_registry() -> Registry {
    let mut registry = Registry::new();
    register_defaults(&mut registry);
    registry
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_all_kinds_registered() {
        let registry = default_registry();
        let names: Vec<_> = registry.kinds().iter().map(|k| k.name).collect();
        assert_eq!(
            names,
            vec![
                "Collider",
                "PlayerInfo",
                "Position",
                "Scale",
                "Speed",
                "Tag",
                "Velocity",
                "Zone",
                "ZoneManager"
            ]
        );
    }

    #[test]
    fn test_requirements_are_declared() {
        let registry = default_registry();
        assert_eq!(registry.get("Collider").unwrap().requires, &["Scale"]);
        assert_eq!(registry.get("Zone").unwrap().requires, &["Collider"]);
    }
}
