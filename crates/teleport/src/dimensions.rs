//! Dimension classification table.

use mirage_core::{DimensionClassifier, DimensionId};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// How the teleport core treats one dimension.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DimensionClass {
    /// Dimension being classified.
    pub id: DimensionId,
    /// Member of the mirage group: entering it remembers where the visitor came from.
    #[serde(default)]
    pub mirage: bool,
    /// Cave-like: landing searches start in the subterranean band.
    #[serde(default)]
    pub subterranean: bool,
}

/// Explicit registry of dimension classes, built from configuration.
///
/// Dimensions that were never registered classify as neither mirage nor
/// subterranean.
#[derive(Debug, Clone, Default)]
pub struct DimensionRegistry {
    classes: BTreeMap<DimensionId, DimensionClass>,
}

impl DimensionRegistry {
    /// Empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry holding the given classes; later duplicates win.
    pub fn from_classes<I: IntoIterator<Item = DimensionClass>>(classes: I) -> Self {
        let mut registry = Self::new();
        for class in classes {
            registry.register(class);
        }
        registry
    }

    /// Add or replace a class, returning the replaced one.
    pub fn register(&mut self, class: DimensionClass) -> Option<DimensionClass> {
        self.classes.insert(class.id.clone(), class)
    }

    /// Class of `dimension`, if registered.
    pub fn get(&self, dimension: &DimensionId) -> Option<&DimensionClass> {
        self.classes.get(dimension)
    }

    /// All registered classes in id order.
    pub fn iter(&self) -> impl Iterator<Item = &DimensionClass> {
        self.classes.values()
    }

    /// Ids of the mirage group in id order.
    pub fn mirage_dimensions(&self) -> impl Iterator<Item = &DimensionId> {
        self.classes
            .values()
            .filter(|class| class.mirage)
            .map(|class| &class.id)
    }
}

impl DimensionClassifier for DimensionRegistry {
    fn is_member_of_mirage_group(&self, dimension: &DimensionId) -> bool {
        self.get(dimension).is_some_and(|class| class.mirage)
    }

    fn is_subterranean_style(&self, dimension: &DimensionId) -> bool {
        self.get(dimension).is_some_and(|class| class.subterranean)
    }
}
