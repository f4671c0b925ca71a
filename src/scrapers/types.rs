use crate::models::Category;
use serde::{Deserialize, Serialize};

/// Browser-like headers sent with every page request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RequestProfile {
    pub user_agent: String,
    pub accept: String,
    pub accept_language: String,
}

impl Default for RequestProfile {
    fn default() -> Self {
        Self {
            user_agent: "Mozilla/5.0 (Windows NT 10.0; Win64; x64; rv:106.0) Gecko/20100101 Firefox/106.0"
                .to_string(),
            accept: "text/html,application/xhtml+xml,application/xml;q=0.9,image/avif,image/webp,*/*;q=0.8"
                .to_string(),
            accept_language: "en-US,en;q=0.5".to_string(),
        }
    }
}

/// Assigns discovered links to a category by keyword.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CategoryRule {
    pub category: Category,
    /// Lowercase substrings matched against the link
    pub keywords: Vec<String>,
    /// Take every detail link regardless of keywords
    #[serde(default)]
    pub catch_all: bool,
}

impl CategoryRule {
    pub fn new(category: Category, keywords: &[&str]) -> Self {
        Self {
            category,
            keywords: keywords.iter().map(|k| k.to_lowercase()).collect(),
            catch_all: false,
        }
    }

    pub fn matches(&self, link: &str) -> bool {
        if self.catch_all {
            return true;
        }
        let link = link.to_lowercase();
        self.keywords
            .iter()
            .filter(|keyword| !keyword.is_empty())
            .any(|keyword| link.contains(keyword.as_str()))
    }
}

/// Structural anchors of the listing site's markup
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SiteLayout {
    /// Path segment that marks a detail page link
    pub detail_marker: String,
    pub rent_label: String,
    pub space_label: String,
    pub rooms_label: String,
    pub available_label: String,
    /// CSS selector of the styled blocks holding the address
    pub address_selector: String,
    pub title_selector: String,
    pub description_selector: String,
    /// Heading stripped from the description text
    pub description_heading: String,
    pub categories: Vec<CategoryRule>,
}

impl Default for SiteLayout {
    fn default() -> Self {
        Self {
            detail_marker: "/immobiliensuche/immo-detail/".to_string(),
            rent_label: "Gesamtmiete".to_string(),
            space_label: "Wohnfläche ca.".to_string(),
            rooms_label: "Zimmer".to_string(),
            available_label: "Verfügbar ab".to_string(),
            address_selector: "div.text-xl".to_string(),
            title_selector: "h1.py-5".to_string(),
            description_selector: ".wysiwyg".to_string(),
            description_heading: "Lagebeschreibung".to_string(),
            categories: vec![
                CategoryRule::new(Category::Apartments, &["wohnung", "apartment", "zimmer"]),
                CategoryRule::new(Category::Offices, &["buro", "büro", "gewerbe"]),
                CategoryRule::new(Category::Parking, &["stellplatz"]),
            ],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rule_matches_case_insensitive() {
        let rule = CategoryRule::new(Category::Apartments, &["wohnung"]);
        assert!(rule.matches("https://x/immo-detail/1/2-Zimmer-WOHNUNG-Altona"));
        assert!(!rule.matches("https://x/immo-detail/1/tiefgarage"));
    }

    #[test]
    fn test_empty_keyword_never_matches() {
        let rule = CategoryRule::new(Category::Parking, &["stellplatz", ""]);
        assert!(!rule.matches("https://x/immo-detail/1/wohnung"));
        assert!(rule.matches("https://x/immo-detail/2/stellplatz-in-tiefgarage"));
    }

    #[test]
    fn test_catch_all_is_explicit() {
        let mut rule = CategoryRule::new(Category::Parking, &[]);
        assert!(!rule.matches("https://x/immo-detail/1/wohnung"));
        rule.catch_all = true;
        assert!(rule.matches("https://x/immo-detail/1/wohnung"));
    }
}
