use crate::error::{Result, ScoutError};
use crate::extract::fields::{
    extract_address, extract_date, extract_description, extract_rent, extract_rooms,
    extract_space, extract_title,
};
use crate::extract::Extraction;
use crate::models::Offer;
use crate::scrapers::types::SiteLayout;
use chrono::Utc;
use scraper::Html;
use tracing::{debug, warn};

/// Optional fields turn into `None`; malformed ones are logged first
fn settle<T>(field: &str, link: &str, extraction: Extraction<T>) -> Option<T> {
    match extraction {
        Extraction::Present(value) => Some(value),
        Extraction::Absent => {
            debug!("No {} on {}", field, link);
            None
        }
        Extraction::Malformed(detail) => {
            warn!("Ignoring unreadable {} on {}: {}", field, link, detail);
            None
        }
    }
}

/// Build the canonical offer for one detail page.
///
/// Rent is the only field the offer cannot do without.
pub fn build_offer(html: &str, link: &str, layout: &SiteLayout) -> Result<Offer> {
    let document = Html::parse_document(html);

    let rent = match extract_rent(&document, layout) {
        Extraction::Present(rent) => rent,
        Extraction::Absent => {
            return Err(ScoutError::MissingRent {
                link: link.to_string(),
            })
        }
        Extraction::Malformed(detail) => {
            return Err(ScoutError::MalformedRent {
                link: link.to_string(),
                detail,
            })
        }
    };

    let address = settle("address", link, extract_address(&document, layout));
    if address.is_none() {
        warn!("Could not get address for link {}", link);
    }
    let (zipcode, street) = match address {
        Some(address) => (Some(address.zipcode), Some(address.street).filter(|s| !s.is_empty())),
        None => (None, None),
    };

    Ok(Offer {
        link: link.to_string(),
        title: extract_title(&document, layout, link),
        rent,
        space: settle("space", link, extract_space(&document, layout)),
        rooms: settle("rooms", link, extract_rooms(&document, layout)),
        zipcode,
        street,
        date: settle("availability date", link, extract_date(&document, layout)),
        description: settle("description", link, extract_description(&document, layout)),
        rating: None,
        scraped_at: Utc::now(),
    })
}
