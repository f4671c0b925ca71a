use crate::extract::{normalize_whitespace, Extraction};
use crate::scrapers::types::SiteLayout;
use percent_encoding::percent_decode_str;
use regex::Regex;
use scraper::{ElementRef, Html, Selector};
use std::sync::OnceLock;

/// Zipcode and street as read from the address block
#[derive(Debug, Clone, PartialEq)]
pub struct Address {
    pub zipcode: u32,
    pub street: String,
}

fn zipcode_regex() -> &'static Regex {
    static ZIPCODE: OnceLock<Regex> = OnceLock::new();
    ZIPCODE.get_or_init(|| Regex::new(r"\d{5}").expect("static regex"))
}

fn selector(css: &str) -> Result<Selector, String> {
    Selector::parse(css).map_err(|e| format!("invalid selector {:?}: {}", css, e))
}

fn element_text(element: &ElementRef) -> String {
    normalize_whitespace(&element.text().collect::<String>())
}

/// Value cell following the table cell whose text equals `label`
pub fn labeled_value(document: &Html, label: &str) -> Option<String> {
    let cell_selector = Selector::parse("td").expect("static selector");
    let cells: Vec<ElementRef> = document.select(&cell_selector).collect();

    cells
        .iter()
        .position(|cell| element_text(cell) == label)
        .and_then(|idx| cells.get(idx + 1))
        .map(element_text)
}

/// "1.002,68 €" -> 1002
pub fn parse_rent(text: &str) -> Result<u32, String> {
    let cleaned: String = text
        .replace('€', "")
        .chars()
        .filter(|c| !c.is_whitespace())
        .collect();
    let whole = cleaned.split(',').next().unwrap_or("").replace('.', "");

    whole
        .parse::<u32>()
        .map_err(|e| format!("rent {:?}: {}", text, e))
}

/// "1.200,0 m²" -> 1200.0, anything after the decimal comma is dropped
pub fn parse_space(text: &str) -> Result<f64, String> {
    let cleaned: String = text
        .replace("m²", "")
        .chars()
        .filter(|c| !c.is_whitespace())
        .collect();
    let whole = cleaned.split(',').next().unwrap_or("").replace('.', "");

    whole
        .parse::<f64>()
        .map_err(|e| format!("space {:?}: {}", text, e))
}

/// "3" -> 3, "2 1/2" -> 2
pub fn parse_rooms(text: &str) -> Result<u32, String> {
    let text = text.trim();
    text.parse::<u32>().or_else(|_| {
        text.split_whitespace()
            .next()
            .unwrap_or("")
            .parse::<u32>()
            .map_err(|e| format!("rooms {:?}: {}", text, e))
    })
}

fn labeled<T>(
    document: &Html,
    label: &str,
    parse: impl Fn(&str) -> Result<T, String>,
) -> Extraction<T> {
    match labeled_value(document, label) {
        Some(text) => match parse(&text) {
            Ok(value) => Extraction::Present(value),
            Err(detail) => Extraction::Malformed(detail),
        },
        None => Extraction::Absent,
    }
}

pub fn extract_rent(document: &Html, layout: &SiteLayout) -> Extraction<u32> {
    labeled(document, &layout.rent_label, parse_rent)
}

pub fn extract_space(document: &Html, layout: &SiteLayout) -> Extraction<f64> {
    labeled(document, &layout.space_label, parse_space)
}

pub fn extract_rooms(document: &Html, layout: &SiteLayout) -> Extraction<u32> {
    labeled(document, &layout.rooms_label, parse_rooms)
}

pub fn extract_date(document: &Html, layout: &SiteLayout) -> Extraction<String> {
    labeled(document, &layout.available_label, |text| Ok(text.to_string()))
}

/// Split an address line into zipcode and street, if it holds a 5-digit run
pub fn parse_address(line: &str) -> Option<Address> {
    let zipcode = zipcode_regex().find(line)?.as_str().parse().ok()?;
    let street = line.split(',').next().unwrap_or("").trim().to_string();
    Some(Address { zipcode, street })
}

/// First address block containing a 5-digit run
pub fn extract_address(document: &Html, layout: &SiteLayout) -> Extraction<Address> {
    let address_selector = match selector(&layout.address_selector) {
        Ok(sel) => sel,
        Err(detail) => return Extraction::Malformed(detail),
    };

    document
        .select(&address_selector)
        .map(|block| element_text(&block))
        .find_map(|line| parse_address(&line))
        .into()
}

/// Page heading, or the last path segment of `link` with dashes as spaces
pub fn extract_title(document: &Html, layout: &SiteLayout, link: &str) -> String {
    let heading = selector(&layout.title_selector)
        .ok()
        .and_then(|sel| document.select(&sel).next().map(|h| element_text(&h)))
        .filter(|title| !title.is_empty());

    heading.unwrap_or_else(|| title_from_link(link))
}

/// Links are percent-encoded once joined, so the slug is decoded first
pub fn title_from_link(link: &str) -> String {
    let slug = link.trim_end_matches('/').rsplit('/').next().unwrap_or("");
    percent_decode_str(slug)
        .decode_utf8_lossy()
        .replace('-', " ")
}

pub fn extract_description(document: &Html, layout: &SiteLayout) -> Extraction<String> {
    let description_selector = match selector(&layout.description_selector) {
        Ok(sel) => sel,
        Err(detail) => return Extraction::Malformed(detail),
    };

    document
        .select(&description_selector)
        .next()
        .map(|block| {
            let text = block.text().collect::<String>();
            normalize_whitespace(&text.replace(layout.description_heading.as_str(), ""))
        })
        .filter(|text| !text.is_empty())
        .into()
}
