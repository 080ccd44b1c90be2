//! Origami catalogue and daily selection.

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

/// A single origami model.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Origami {
    pub id: u32,
    pub name: String,
    pub description: String,
    pub image_url: String,
    #[serde(default)]
    pub difficulty: Difficulty,
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    #[default]
    Easy,
    Intermediate,
    Advanced,
}

/// Errors that can occur while loading a catalogue file.
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("failed to read catalogue: {0}")]
    Read(#[from] std::io::Error),

    #[error("failed to parse catalogue: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("catalogue contains no origami")]
    Empty,
}

/// Picks the recommendation for a given day.
pub trait RecommendationSource: Send + Sync {
    /// Origami recommended on `day`, if any.
    fn origami_of_the_day(&self, day: NaiveDate) -> Option<Origami>;
}

/// Fixed list of origami, rotated one per day.
#[derive(Debug, Clone)]
pub struct Catalog {
    items: Vec<Origami>,
}

impl Catalog {
    /// Create a catalogue from a list of origami.
    pub fn new(items: Vec<Origami>) -> Self {
        Self { items }
    }

    /// Load a catalogue from a JSON array.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, CatalogError> {
        let contents = std::fs::read(path.as_ref())?;
        let items: Vec<Origami> = serde_json::from_slice(&contents)?;
        if items.is_empty() {
            return Err(CatalogError::Empty);
        }
        Ok(Self::new(items))
    }

    /// The built-in catalogue.
    pub fn builtin() -> Self {
        let item = |id, name: &str, description: &str, difficulty| Origami {
            id,
            name: name.to_string(),
            description: description.to_string(),
            image_url: format!("/static/images/origami/{:02}.png", id),
            difficulty,
        };

        Self::new(vec![
            item(1, "Traditional Crane", "The classic symbol of peace and longevity.", Difficulty::Easy),
            item(2, "Jumping Frog", "Press its back and watch it leap.", Difficulty::Easy),
            item(3, "Lotus Flower", "Eight petals folded from a single square.", Difficulty::Intermediate),
            item(4, "Kawasaki Rose", "A twisted rose built on a grid of creases.", Difficulty::Advanced),
            item(5, "Fox Mask", "A quick fold with a sharp, pointed face.", Difficulty::Easy),
            item(6, "Modular Star", "Eight units locked together without glue.", Difficulty::Intermediate),
            item(7, "Flapping Bird", "Pull the tail and the wings flap.", Difficulty::Easy),
        ])
    }

    /// Number of origami in the catalogue.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Whether the catalogue is empty.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

impl Default for Catalog {
    fn default() -> Self {
        Self::builtin()
    }
}

impl RecommendationSource for Catalog {
    fn origami_of_the_day(&self, day: NaiveDate) -> Option<Origami> {
        if self.items.is_empty() {
            return None;
        }
        let index = day.num_days_from_ce().rem_euclid(self.items.len() as i32) as usize;
        self.items.get(index).cloned()
    }
}
