//! Field extraction from listing detail pages.
//!
//! Every extractor is independent and reports an [`Extraction`] instead of
//! failing, so the normalizer decides what a missing or garbled field means.

pub mod fields;
pub mod normalizer;

pub use normalizer::build_offer;

/// Outcome of pulling one field out of a page
#[derive(Debug, Clone, PartialEq)]
pub enum Extraction<T> {
    Present(T),
    /// The structural anchor for the field is not on the page
    Absent,
    /// The anchor exists but its text could not be parsed
    Malformed(String),
}

impl<T> Extraction<T> {
    pub fn present(self) -> Option<T> {
        match self {
            Extraction::Present(value) => Some(value),
            _ => None,
        }
    }
}

impl<T> From<Option<T>> for Extraction<T> {
    fn from(value: Option<T>) -> Self {
        value.map_or(Extraction::Absent, Extraction::Present)
    }
}

/// Collapse whitespace runs (newlines included) into single spaces and trim
pub fn normalize_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}
