use crate::models::Offer;

const RATING_STAR: &str = "⭐️";
const DEFAULT_STAR: &str = "⭐";

/// Cut `text` to `max_len` characters, marking the cut with ".."
pub fn shorten(text: &str, max_len: usize) -> String {
    if text.chars().count() <= max_len {
        return text.to_string();
    }
    let kept: String = text.chars().take(max_len.saturating_sub(2)).collect();
    format!("{}..", kept)
}

/// One star per rating point, a single plain star when unrated
pub fn stars(rating: Option<u8>) -> String {
    match rating {
        Some(n) if n > 0 => RATING_STAR.repeat(n as usize),
        _ => DEFAULT_STAR.to_string(),
    }
}

/// Legacy Markdown reserves these outside and inside entities
const MARKDOWN_RESERVED: [char; 5] = ['_', '*', '`', '[', ']'];

/// Drop reserved characters; link text cannot carry escapes
pub fn strip_markdown(text: &str) -> String {
    text.chars().filter(|c| !MARKDOWN_RESERVED.contains(c)).collect()
}

/// Backslash-escape the characters that would open an entity
pub fn escape_markdown(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        if matches!(c, '_' | '*' | '`' | '[') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

fn or_unknown<T: ToString>(value: Option<T>) -> String {
    value.map_or_else(|| "?".to_string(), |v| v.to_string())
}

/// Markdown message for one offer
pub fn render_offer(
    offer: &Offer,
    neighborhoods: &[String],
    title_width: usize,
    source_label: &str,
) -> String {
    let mut text = format!(
        "{} {}: [{}]({})\n{} € | {} m² | {} Rs | {}",
        stars(offer.rating),
        source_label,
        shorten(&strip_markdown(&offer.title), title_width),
        offer.link,
        offer.rent,
        or_unknown(offer.space.map(|space| space.round() as i64)),
        or_unknown(offer.rooms),
        or_unknown(offer.date.as_deref().map(escape_markdown)),
    );

    if let Some(street) = &offer.street {
        text.push_str(&format!(" | {}", escape_markdown(street)));
    }
    if let Some(zipcode) = offer.zipcode {
        text.push_str(&format!(
            " | {} {}",
            zipcode,
            escape_markdown(&neighborhoods.join(", "))
        ));
    }

    text
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn offer() -> Offer {
        Offer {
            link: "https://www.saga.hamburg/immobiliensuche/immo-detail/1/a".to_string(),
            title: "2-Zimmer-Wohnung".to_string(),
            rent: 950,
            space: Some(54.0),
            rooms: Some(2),
            zipcode: Some(22767),
            street: Some("Musterstraße 5".to_string()),
            date: Some("01.06.2024".to_string()),
            description: None,
            rating: None,
            scraped_at: Utc::now(),
        }
    }

    #[test]
    fn test_shorten() {
        assert_eq!(shorten("short", 28), "short");
        let long = "Schöne 3-Zimmer-Wohnung mit Balkon in Ottensen";
        let short = shorten(long, 28);
        assert_eq!(short.chars().count(), 28);
        assert!(short.ends_with(".."));
        assert!(short.starts_with("Schöne 3-Zimmer"));
    }

    #[test]
    fn test_stars() {
        assert_eq!(stars(Some(3)), "⭐️⭐️⭐️");
        assert_eq!(stars(None), "⭐");
        assert_eq!(stars(Some(0)), "⭐");
    }

    #[test]
    fn test_render_full_offer() {
        let names = vec!["Altona-Altstadt".to_string(), "Ottensen".to_string()];
        let text = render_offer(&offer(), &names, 28, "SAGA");
        assert_eq!(
            text,
            "⭐ SAGA: [2-Zimmer-Wohnung](https://www.saga.hamburg/immobiliensuche/immo-detail/1/a)\n\
             950 € | 54 m² | 2 Rs | 01.06.2024 | Musterstraße 5 | 22767 Altona-Altstadt, Ottensen"
        );
    }

    #[test]
    fn test_render_neutralizes_markdown() {
        let mut marked = offer();
        marked.title = "*Neu* [Balkon] 2_Zi `top`".to_string();
        marked.street = Some("Am_Park 3".to_string());
        let names = vec!["St. Pauli *Kiez*".to_string()];

        let text = render_offer(&marked, &names, 40, "SAGA");
        assert_eq!(
            text,
            "⭐ SAGA: [Neu Balkon 2Zi top](https://www.saga.hamburg/immobiliensuche/immo-detail/1/a)\n\
             950 € | 54 m² | 2 Rs | 01.06.2024 | Am\\_Park 3 | 22767 St. Pauli \\*Kiez\\*"
        );
    }

    #[test]
    fn test_escape_markdown() {
        assert_eq!(escape_markdown("a_b*c`d[e]"), "a\\_b\\*c\\`d\\[e]");
        assert_eq!(escape_markdown("Musterstraße 5"), "Musterstraße 5");
        assert_eq!(strip_markdown("[x]_*`y"), "xy");
    }

    #[test]
    fn test_render_rated_offer_with_gaps() {
        let mut sparse = offer();
        sparse.rating = Some(3);
        sparse.space = None;
        sparse.rooms = None;
        sparse.date = None;
        sparse.street = None;
        sparse.zipcode = None;

        let text = render_offer(&sparse, &[], 28, "SAGA");
        assert!(text.starts_with("⭐️⭐️⭐️ SAGA: "));
        assert!(text.ends_with("950 € | ? m² | ? Rs | ?"));
    }
}
