//! Criteria evaluation: pass/reject per subscriber, then rating.

use crate::config::Criteria;
use crate::models::Offer;
use thiserror::Error;

/// Rating given to offers in a preferred zipcode
pub const PREFERRED_RATING: u8 = 3;

/// First rule an offer failed
#[derive(Error, Debug, Clone, PartialEq)]
pub enum Rejection {
    #[error("rent too high: {rent}, max={limit}")]
    TooExpensive { rent: u32, limit: u32 },

    #[error("not enough rooms: {rooms}, min={min}")]
    NotEnoughRooms { rooms: u32, min: u32 },

    #[error("not enough space: {space}, min={min}")]
    NotEnoughSpace { space: f64, min: f64 },

    #[error("zipcode {zipcode} not in whitelist")]
    OutsideWhitelist { zipcode: u32 },
}

/// Apply the rules in fixed order, stopping at the first failure.
///
/// An offer without a known zipcode passes the whitelist rule.
pub fn evaluate(offer: &Offer, criteria: &Criteria) -> Result<(), Rejection> {
    if offer.rent >= criteria.rent_until {
        return Err(Rejection::TooExpensive {
            rent: offer.rent,
            limit: criteria.rent_until,
        });
    }

    if let Some(min) = criteria.min_rooms {
        let rooms = offer.rooms.unwrap_or(0);
        if rooms < min {
            return Err(Rejection::NotEnoughRooms { rooms, min });
        }
    }

    if let Some(min) = criteria.min_space {
        let space = offer.space.unwrap_or(0.0);
        if space < min {
            return Err(Rejection::NotEnoughSpace { space, min });
        }
    }

    if !criteria.zipcode_whitelist.is_empty() {
        if let Some(zipcode) = offer.zipcode {
            if !criteria.zipcode_whitelist.contains(&zipcode) {
                return Err(Rejection::OutsideWhitelist { zipcode });
            }
        }
    }

    Ok(())
}

/// Rating for one offer: preferred zipcodes get [`PREFERRED_RATING`]
pub fn rating_for(offer: &Offer, criteria: &Criteria) -> Option<u8> {
    offer
        .zipcode
        .filter(|zipcode| criteria.zipcode_preflist.contains(zipcode))
        .map(|_| PREFERRED_RATING)
}

/// Rate matched offers in place. Never removes anything.
pub fn rate_offers(offers: &mut [Offer], criteria: &Criteria) {
    for offer in offers.iter_mut() {
        offer.rating = rating_for(offer, criteria);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Category;
    use chrono::Utc;
    use std::collections::BTreeSet;

    fn offer(rent: u32) -> Offer {
        Offer {
            link: "https://www.saga.hamburg/immobiliensuche/immo-detail/1/wohnung".to_string(),
            title: "Wohnung".to_string(),
            rent,
            space: Some(60.0),
            rooms: Some(2),
            zipcode: Some(22767),
            street: Some("Musterstraße 5".to_string()),
            date: Some("01.06.2024".to_string()),
            description: None,
            rating: None,
            scraped_at: Utc::now(),
        }
    }

    fn criteria(rent_until: u32) -> Criteria {
        Criteria {
            category: Category::Apartments,
            rent_until,
            min_rooms: None,
            min_space: None,
            zipcode_whitelist: BTreeSet::new(),
            zipcode_preflist: BTreeSet::new(),
        }
    }

    #[test]
    fn test_rent_ceiling_is_exclusive() {
        assert_eq!(
            evaluate(&offer(1000), &criteria(1000)),
            Err(Rejection::TooExpensive { rent: 1000, limit: 1000 })
        );
        assert_eq!(evaluate(&offer(999), &criteria(1000)), Ok(()));
    }

    #[test]
    fn test_min_rooms_defaults_missing_rooms_to_zero() {
        let mut rules = criteria(2000);
        rules.min_rooms = Some(3);
        assert_eq!(
            evaluate(&offer(800), &rules),
            Err(Rejection::NotEnoughRooms { rooms: 2, min: 3 })
        );

        let mut no_rooms = offer(800);
        no_rooms.rooms = None;
        rules.min_rooms = Some(1);
        assert_eq!(
            evaluate(&no_rooms, &rules),
            Err(Rejection::NotEnoughRooms { rooms: 0, min: 1 })
        );
    }

    #[test]
    fn test_min_space() {
        let mut rules = criteria(2000);
        rules.min_space = Some(60.0);
        assert_eq!(evaluate(&offer(800), &rules), Ok(()));

        rules.min_space = Some(60.5);
        assert!(matches!(
            evaluate(&offer(800), &rules),
            Err(Rejection::NotEnoughSpace { .. })
        ));
    }

    #[test]
    fn test_first_failing_rule_wins() {
        let mut rules = criteria(500);
        rules.min_rooms = Some(5);
        rules.min_space = Some(100.0);
        assert!(matches!(
            evaluate(&offer(800), &rules),
            Err(Rejection::TooExpensive { .. })
        ));
    }

    #[test]
    fn test_whitelist() {
        let mut rules = criteria(2000);
        rules.zipcode_whitelist = [20095].into_iter().collect();
        assert_eq!(
            evaluate(&offer(800), &rules),
            Err(Rejection::OutsideWhitelist { zipcode: 22767 })
        );

        rules.zipcode_whitelist.insert(22767);
        assert_eq!(evaluate(&offer(800), &rules), Ok(()));
    }

    #[test]
    fn test_unknown_zipcode_passes_whitelist() {
        let mut rules = criteria(2000);
        rules.zipcode_whitelist = [20095].into_iter().collect();
        let mut unknown = offer(800);
        unknown.zipcode = None;
        assert_eq!(evaluate(&unknown, &rules), Ok(()));
    }

    #[test]
    fn test_rating() {
        let mut rules = criteria(2000);
        rules.zipcode_preflist = [22767].into_iter().collect();

        let mut preferred = offer(800);
        let mut other = offer(800);
        other.zipcode = Some(20095);
        other.rating = Some(3);
        let mut unknown = offer(800);
        unknown.zipcode = None;

        let mut offers = vec![preferred.clone(), other, unknown];
        rate_offers(&mut offers, &rules);

        assert_eq!(offers.len(), 3);
        assert_eq!(offers[0].rating, Some(3));
        assert_eq!(offers[1].rating, None);
        assert_eq!(offers[2].rating, None);

        preferred.rating = rating_for(&preferred, &rules);
        assert_eq!(preferred.rating, Some(PREFERRED_RATING));
    }

    #[test]
    fn test_rejection_messages() {
        assert_eq!(
            Rejection::TooExpensive { rent: 1200, limit: 1000 }.to_string(),
            "rent too high: 1200, max=1000"
        );
        assert_eq!(
            Rejection::OutsideWhitelist { zipcode: 22767 }.to_string(),
            "zipcode 22767 not in whitelist"
        );
    }
}
