use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use std::fmt;

/// Listing category a subscriber watches
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    #[default]
    Apartments,
    Offices,
    Parking,
}

impl Category {
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Apartments => "apartments",
            Category::Offices => "offices",
            Category::Parking => "parking",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One normalized listing parsed from a detail page
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Offer {
    pub link: String,
    pub title: String,
    /// Monthly rent in whole euros
    pub rent: u32,
    /// Square meters
    pub space: Option<f64>,
    pub rooms: Option<u32>,
    pub zipcode: Option<u32>,
    pub street: Option<String>,
    /// Availability date exactly as printed on the page
    pub date: Option<String>,
    pub description: Option<String>,
    /// Presentation weight assigned by the rating step, never by extraction
    pub rating: Option<u8>,
    pub scraped_at: DateTime<Utc>,
}

/// Category -> unique detail links for a single discovery pass.
///
/// Links keep the order they were first seen on the listing page so that
/// notifications go out in discovery order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LinkBuckets {
    buckets: BTreeMap<Category, Vec<String>>,
}

impl LinkBuckets {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds `link` to `category` unless it is already there
    pub fn insert(&mut self, category: Category, link: &str) {
        let bucket = self.buckets.entry(category).or_default();
        if !bucket.iter().any(|known| known == link) {
            bucket.push(link.to_string());
        }
    }

    pub fn get(&self, category: Category) -> &[String] {
        self.buckets
            .get(&category)
            .map(|links| links.as_slice())
            .unwrap_or(&[])
    }

    /// Every link across all buckets, each once, in first-seen bucket order
    pub fn all_links(&self) -> Vec<&str> {
        let mut seen = HashSet::new();
        self.buckets
            .values()
            .flatten()
            .map(String::as_str)
            .filter(|link| seen.insert(*link))
            .collect()
    }

    pub fn is_empty(&self) -> bool {
        self.buckets.values().all(Vec::is_empty)
    }

    pub fn len(&self) -> usize {
        self.all_links().len()
    }
}
