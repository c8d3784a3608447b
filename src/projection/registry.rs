use super::{Projection, ProjectionId};
use crate::{MapError, Result};
use fxhash::FxHashMap;
use std::fmt;

/// Builds a fresh projection configured with its defaults
pub type ProjectionFactory = Box<dyn Fn() -> Projection + Send + Sync>;

/// Maps projection identifiers to factories, remembering registration order
#[derive(Default)]
pub struct ProjectionRegistry {
    factories: FxHashMap<ProjectionId, ProjectionFactory>,
    order: Vec<ProjectionId>,
}

impl ProjectionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry holding every built-in projection in menu order
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        for id in ProjectionId::ALL {
            registry.register(id, Box::new(move || id.default_projection()));
        }
        registry
    }

    /// Register a factory, replacing any previous one for the same id
    pub fn register(&mut self, id: ProjectionId, factory: ProjectionFactory) {
        if self.factories.insert(id, factory).is_none() {
            self.order.push(id);
        }
    }

    pub fn get(&self, id: ProjectionId) -> Result<&ProjectionFactory> {
        self.factories
            .get(&id)
            .ok_or_else(|| MapError::UnknownProjection(id.to_string()))
    }

    /// Build a projection from the registered factory
    pub fn create(&self, id: ProjectionId) -> Result<Projection> {
        self.get(id).map(|factory| factory())
    }

    pub fn list(&self) -> &[ProjectionId] {
        &self.order
    }

    pub fn contains(&self, id: ProjectionId) -> bool {
        self.factories.contains_key(&id)
    }
}

impl fmt::Debug for ProjectionRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProjectionRegistry")
            .field("order", &self.order)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::projection::RawProjection;

    #[test]
    fn test_defaults_are_listed_in_menu_order() {
        let registry = ProjectionRegistry::with_defaults();
        let labels: Vec<&str> = registry.list().iter().map(|id| id.label()).collect();
        assert_eq!(
            labels,
            vec![
                "Albers",
                "Azimuthal I",
                "Azimuthal II",
                "Conic I",
                "Conic II",
                "Conic III",
                "Rectangular",
                "Gnomonic",
                "Mercator I",
                "Mercator II",
                "Natural Earth",
                "Orthographic",
                "Stereographic",
            ]
        );
    }

    #[test]
    fn test_get_unknown_projection_fails() {
        let registry = ProjectionRegistry::new();
        assert!(matches!(
            registry.get(ProjectionId::Gnomonic),
            Err(MapError::UnknownProjection(name)) if name == "Gnomonic"
        ));
    }

    #[test]
    fn test_register_replaces_without_duplicating() {
        let mut registry = ProjectionRegistry::new();
        registry.register(
            ProjectionId::Mercator,
            Box::new(|| ProjectionId::Mercator.default_projection()),
        );
        registry.register(
            ProjectionId::Mercator,
            Box::new(|| Projection::new(ProjectionId::Mercator, RawProjection::Mercator, 10.0)),
        );

        assert_eq!(registry.list(), &[ProjectionId::Mercator]);
        assert_eq!(registry.create(ProjectionId::Mercator).unwrap().scale(), 10.0);
    }
}
