use crate::error::{Result, ScoutError};
use crate::models::LinkBuckets;
use crate::scrapers::traits::PageFetcher;
use crate::scrapers::types::SiteLayout;
use scraper::{Html, Selector};
use std::collections::HashSet;
use tracing::{debug, info, warn};
use url::Url;

/// Fetch the listing page and sort its detail links into category buckets.
///
/// A failed fetch or an empty page is reported as
/// [`ScoutError::DiscoveryUnavailable`] so the caller can skip the cycle.
pub async fn discover_links<F>(
    fetcher: &F,
    listing_url: &str,
    base: &Url,
    layout: &SiteLayout,
) -> Result<LinkBuckets>
where
    F: PageFetcher + ?Sized,
{
    let html = fetcher
        .fetch(listing_url)
        .await
        .map_err(|e| ScoutError::DiscoveryUnavailable(e.to_string()))?;

    if html.trim().is_empty() {
        return Err(ScoutError::DiscoveryUnavailable(format!(
            "empty body from {}",
            listing_url
        )));
    }

    let buckets = parse_listing_page(&html, base, layout);
    info!("Discovered {} detail links", buckets.len());
    Ok(buckets)
}

/// Collect every anchor pointing at a detail page, resolve it against `base`
/// and assign it to zero or more buckets.
pub fn parse_listing_page(html: &str, base: &Url, layout: &SiteLayout) -> LinkBuckets {
    let document = Html::parse_document(html);
    let anchor_selector = Selector::parse("a[href]").expect("static selector");

    let mut seen = HashSet::new();
    let mut buckets = LinkBuckets::new();

    for anchor in document.select(&anchor_selector) {
        let href = anchor.value().attr("href").unwrap_or("");
        if !href.contains(&layout.detail_marker) {
            continue;
        }

        let link = match base.join(href) {
            Ok(link) => link.to_string(),
            Err(e) => {
                warn!("Skipping unresolvable link {}: {}", href, e);
                continue;
            }
        };

        if !seen.insert(link.clone()) {
            continue;
        }

        // keywords are matched on the raw href as well, since joining
        // percent-encodes umlauts
        let haystack = format!("{} {}", href, link);
        let mut assigned = false;
        for rule in &layout.categories {
            if rule.matches(&haystack) {
                buckets.insert(rule.category, &link);
                assigned = true;
            }
        }

        if !assigned {
            debug!("Link matches no category: {}", link);
        }
    }

    buckets
}
