use std::collections::BTreeMap;
use std::sync::Arc;

use crate::descriptor::SceneDescriptor;

/// Scene descriptors keyed by id.
#[derive(Debug, Clone, Default)]
pub struct SceneRegistry {
    scenes: BTreeMap<String, Arc<SceneDescriptor>>,
}

impl SceneRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a descriptor. A later registration with the same id replaces the
    /// earlier one, which is returned.
    pub fn register(&mut self, descriptor: SceneDescriptor) -> Option<Arc<SceneDescriptor>> {
        let id = descriptor.id().to_owned();
        let previous = self.scenes.insert(id.clone(), Arc::new(descriptor));
        if previous.is_some() {
            log::warn!("scene {id} registered twice; keeping the later descriptor");
        }
        previous
    }

    pub fn get(&self, id: &str) -> Option<&Arc<SceneDescriptor>> {
        self.scenes.get(id)
    }

    pub fn len(&self) -> usize {
        self.scenes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.scenes.is_empty()
    }

    /// Descriptors in descending id order (newest scene first).
    pub fn iter_newest_first(&self) -> impl Iterator<Item = &Arc<SceneDescriptor>> {
        self.scenes.values().rev()
    }

    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.scenes.keys().map(String::as_str)
    }
}

impl FromIterator<SceneDescriptor> for SceneRegistry {
    fn from_iter<I: IntoIterator<Item = SceneDescriptor>>(iter: I) -> Self {
        let mut registry = Self::new();
        for descriptor in iter {
            registry.register(descriptor);
        }
        registry
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::descriptor::SceneMetadata;

    fn scene(id: &str) -> SceneDescriptor {
        SceneDescriptor::new(SceneMetadata::new(id, format!("Scene {id}")))
    }

    #[test]
    fn newest_first_is_descending_string_order() {
        let registry: SceneRegistry = ["002", "010", "9", "100"].into_iter().map(scene).collect();
        let order: Vec<&str> = registry.iter_newest_first().map(|d| d.id()).collect();
        assert_eq!(order, vec!["9", "100", "010", "002"]);
    }

    #[test]
    fn duplicate_ids_keep_the_later_descriptor() {
        let mut registry = SceneRegistry::new();
        registry.register(scene("001"));
        let replaced = registry.register(SceneDescriptor::new(SceneMetadata::new("001", "Second")));
        assert_eq!(replaced.map(|d| d.metadata().title.clone()), Some("Scene 001".to_string()));
        assert_eq!(registry.len(), 1);
        assert_eq!(registry.get("001").map(|d| d.metadata().title.as_str()), Some("Second"));
    }
}
