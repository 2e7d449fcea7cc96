//! Per-run class registry

use std::collections::HashMap;

use super::types::ClassDef;

/// Mapping from class id to class definition for one discovery run
///
/// Classes are kept in creation order. The registry only grows; nothing is
/// evicted or merged.
#[derive(Debug, Default)]
pub struct ClassRegistry {
    classes: Vec<ClassDef>,
    index: HashMap<String, usize>,
}

impl ClassRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a registry with classes from an earlier run
    pub fn from_classes(classes: impl IntoIterator<Item = ClassDef>) -> Self {
        let mut registry = Self::new();
        for class in classes {
            registry.put(class);
        }
        registry
    }

    pub fn get(&self, id: &str) -> Option<&ClassDef> {
        self.index.get(id).map(|&i| &self.classes[i])
    }

    pub fn get_mut(&mut self, id: &str) -> Option<&mut ClassDef> {
        match self.index.get(id) {
            Some(&i) => Some(&mut self.classes[i]),
            None => None,
        }
    }

    pub fn contains(&self, id: &str) -> bool {
        self.index.contains_key(id)
    }

    /// Insert a class, replacing any class with the same id in place
    pub fn put(&mut self, class: ClassDef) {
        match self.index.get(class.id()) {
            Some(&i) => self.classes[i] = class,
            None => {
                self.index.insert(class.id().to_string(), self.classes.len());
                self.classes.push(class);
            }
        }
    }

    pub fn values(&self) -> impl Iterator<Item = &ClassDef> {
        self.classes.iter()
    }

    pub fn len(&self) -> usize {
        self.classes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
    }

    /// Consume the registry, yielding classes in creation order
    pub fn into_classes(self) -> Vec<ClassDef> {
        self.classes
    }
}
