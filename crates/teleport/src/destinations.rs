//! Mirage book → destination mapping.
//!
//! Each book variant is a stable key mapped to a small data record. A
//! variant without a dimension still exists (old saves may hold it) but
//! cannot be used, is hidden from listings and never drops as loot.

use crate::error::TeleportError;
use mirage_core::{DimensionId, RegistryKey};
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Prefix of every book's translation key.
pub const TRANSLATION_PREFIX: &str = "item.mirage_book";

/// Destination record for one book variant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Destination {
    /// Dimension the book belongs to and returns from.
    pub dimension: Option<DimensionId>,
    /// Suffix of the book's translation key.
    pub display_key: String,
}

/// One `[[book]]` entry as written in configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookEntry {
    /// Book identifier.
    pub id: RegistryKey,
    /// Dimension the book belongs to.
    #[serde(default)]
    pub dimension: Option<DimensionId>,
    /// Suffix of the translation key.
    pub display_key: String,
}

/// Ordered table of book variants.
#[derive(Debug, Clone, Default)]
pub struct DestinationTable {
    entries: Vec<(RegistryKey, Destination)>,
    index: BTreeMap<RegistryKey, usize>,
}

impl DestinationTable {
    /// Empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Table built from configuration entries; later duplicates replace earlier ones.
    pub fn from_entries<I: IntoIterator<Item = BookEntry>>(entries: I) -> Self {
        let mut table = Self::new();
        for entry in entries {
            table.insert(
                entry.id,
                Destination {
                    dimension: entry.dimension,
                    display_key: entry.display_key,
                },
            );
        }
        table
    }

    /// The seven mirage worlds books, in their historical order.
    pub fn mirage_books() -> Self {
        const BOOKS: [(&str, &str); 7] = [
            ("caveland", "caveland"),
            ("cavenia", "cavenia"),
            ("frost_mountains", "frostMountains"),
            ("wide_desert", "wideDesert"),
            ("the_void", "theVoid"),
            ("dark_forest", "darkForest"),
            ("crown_cliffs", "crownCliffs"),
        ];

        Self::from_entries(BOOKS.iter().filter_map(|(path, display_key)| {
            let id = RegistryKey::parse(path).ok()?;
            Some(BookEntry {
                dimension: Some(DimensionId::new(id.clone())),
                id,
                display_key: display_key.to_string(),
            })
        }))
    }

    /// Add or replace a book, keeping its original position when replacing.
    pub fn insert(&mut self, book: RegistryKey, destination: Destination) -> Option<Destination> {
        match self.index.get(&book) {
            Some(&slot) => Some(std::mem::replace(&mut self.entries[slot].1, destination)),
            None => {
                self.index.insert(book.clone(), self.entries.len());
                self.entries.push((book, destination));
                None
            }
        }
    }

    /// Number of book variants, usable or not.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the table has no books.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Record for `book`.
    pub fn get(&self, book: &RegistryKey) -> Option<&Destination> {
        self.index.get(book).map(|&slot| &self.entries[slot].1)
    }

    /// Dimension `book` belongs to, or [`TeleportError::NoDestinationMapping`].
    pub fn resolve(&self, book: &RegistryKey) -> Result<&DimensionId, TeleportError> {
        self.get(book)
            .and_then(|destination| destination.dimension.as_ref())
            .ok_or_else(|| TeleportError::NoDestinationMapping(book.to_string()))
    }

    /// Book that belongs to `dimension`, if any.
    pub fn book_for_dimension(&self, dimension: &DimensionId) -> Option<&RegistryKey> {
        self.entries
            .iter()
            .find(|(_, destination)| destination.dimension.as_ref() == Some(dimension))
            .map(|(book, _)| book)
    }

    /// Full translation key, e.g. `item.mirage_book.frostMountains`.
    pub fn translation_key(&self, book: &RegistryKey) -> Option<String> {
        self.get(book)
            .map(|destination| format!("{TRANSLATION_PREFIX}.{}", destination.display_key))
    }

    /// Table contents as configuration entries, in table order.
    pub fn to_entries(&self) -> Vec<BookEntry> {
        self.entries
            .iter()
            .map(|(book, destination)| BookEntry {
                id: book.clone(),
                dimension: destination.dimension.clone(),
                display_key: destination.display_key.clone(),
            })
            .collect()
    }

    /// Usable books and their dimensions, in table order.
    pub fn obtainable(&self) -> impl Iterator<Item = (&RegistryKey, &DimensionId)> {
        self.entries
            .iter()
            .filter_map(|(book, destination)| destination.dimension.as_ref().map(|d| (book, d)))
    }

    /// Loot roll: uniform over every variant, nothing when the roll lands on
    /// one without a dimension.
    pub fn random_book<R: Rng + ?Sized>(&self, rng: &mut R) -> Option<&RegistryKey> {
        if self.entries.is_empty() {
            return None;
        }
        let (book, destination) = &self.entries[rng.gen_range(0..self.entries.len())];
        destination.dimension.as_ref().map(|_| book)
    }
}
