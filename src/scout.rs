//! One polling cycle: discover -> extract -> filter -> notify -> record.

use crate::config::{AppConfig, Criteria, DedupScope};
use crate::error::{Result, ScoutError};
use crate::extract::build_offer;
use crate::ledger::KnownOffers;
use crate::matching::{evaluate, rate_offers};
use crate::models::{LinkBuckets, Offer};
use crate::notify::{render_offer, Notifier};
use crate::scrapers::{discover_links, PageFetcher, SiteLayout};
use chrono::Local;
use std::collections::BTreeMap;
use std::path::Path;
use tracing::{debug, error, info, warn};
use url::Url;

/// What happened during one cycle
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CycleReport {
    pub discovery_unavailable: bool,
    pub discovered: usize,
    /// chat id -> notifications delivered
    pub notified: BTreeMap<String, usize>,
}

pub struct Scout<F, N> {
    fetcher: F,
    notifier: N,
    ledger: KnownOffers,
    layout: SiteLayout,
    consecutive_failures: u32,
}

impl<F, N> Scout<F, N>
where
    F: PageFetcher,
    N: Notifier,
{
    pub fn new(fetcher: F, notifier: N, ledger: KnownOffers, layout: SiteLayout) -> Self {
        Self {
            fetcher,
            notifier,
            ledger,
            layout,
            consecutive_failures: 0,
        }
    }

    pub fn ledger(&self) -> &KnownOffers {
        &self.ledger
    }

    pub async fn discover(&self, config: &AppConfig) -> Result<LinkBuckets> {
        let base = Url::parse(&config.settings.base_url)
            .map_err(|e| ScoutError::Config(format!("base_url: {}", e)))?;
        discover_links(&self.fetcher, &config.settings.listing_url, &base, &self.layout).await
    }

    async fn fetch_offer(&self, link: &str) -> Option<Offer> {
        let html = match self.fetcher.fetch(link).await {
            Ok(html) => html,
            Err(e) => {
                warn!("Skipping {}: {}", link, e);
                return None;
            }
        };

        match build_offer(&html, link, &self.layout) {
            Ok(offer) => Some(offer),
            Err(e) => {
                warn!("Skipping offer: {}", e);
                None
            }
        }
    }

    /// Offers in the criteria's bucket that pass every rule, in discovery order.
    ///
    /// Links already in the ledger for `scope` are skipped unless
    /// `ignore_known` is set.
    pub async fn matching_offers(
        &self,
        buckets: &LinkBuckets,
        scope: Option<&str>,
        criteria: &Criteria,
        ignore_known: bool,
    ) -> Vec<Offer> {
        let mut matching = Vec::new();

        for link in buckets.get(criteria.category) {
            if !ignore_known && self.ledger.is_known(scope, link) {
                continue;
            }
            debug!("New offer {}", link);

            let Some(offer) = self.fetch_offer(link).await else {
                continue;
            };

            match evaluate(&offer, criteria) {
                Ok(()) => {
                    info!("Matching offer found {}", link);
                    matching.push(offer);
                }
                Err(rejection) => info!("Skipping {}: {}", link, rejection),
            }
        }

        matching
    }

    async fn deliver(&mut self, chat_id: &str, text: &str, max_failures: u32) -> Result<bool> {
        match self.notifier.send(chat_id, text).await {
            Ok(()) => {
                self.consecutive_failures = 0;
                Ok(true)
            }
            Err(e) => {
                self.consecutive_failures += 1;
                error!("{}; this was the message: {}", e, text);
                if self.consecutive_failures >= max_failures {
                    return Err(ScoutError::DeliveryHalted {
                        failures: self.consecutive_failures,
                    });
                }
                Ok(false)
            }
        }
    }

    pub async fn run_cycle(&mut self, config: &AppConfig) -> Result<CycleReport> {
        let settings = &config.settings;
        let mut report = CycleReport::default();

        let buckets = match self.discover(config).await {
            Ok(buckets) => buckets,
            Err(e) => {
                warn!("Could not read listings: {}", e);
                report.discovery_unavailable = true;
                return Ok(report);
            }
        };
        report.discovered = buckets.len();

        for (chat_id, chat) in &config.chats {
            let scope = settings.dedup_scope.scope_for(chat_id);
            let mut offers = self
                .matching_offers(&buckets, scope, &chat.criteria, false)
                .await;
            rate_offers(&mut offers, &chat.criteria);

            let mut delivered = 0;
            for offer in &offers {
                let neighborhoods = offer
                    .zipcode
                    .map(|zipcode| config.neighborhoods_for(zipcode))
                    .unwrap_or(&[]);
                let text = render_offer(
                    offer,
                    neighborhoods,
                    settings.title_width,
                    &settings.source_label,
                );
                if self
                    .deliver(chat_id, &text, settings.max_consecutive_delivery_failures)
                    .await?
                {
                    delivered += 1;
                }
            }
            report.notified.insert(chat_id.clone(), delivered);
        }

        // only after every chat had its look at this cycle's links
        let links = buckets.all_links();
        match settings.dedup_scope {
            DedupScope::Global => {
                for link in &links {
                    self.ledger.record(None, link);
                }
            }
            DedupScope::PerChat => {
                for chat_id in config.chats.keys() {
                    for link in &links {
                        self.ledger.record(Some(chat_id.as_str()), link);
                    }
                }
            }
        }
        self.ledger.compact();

        Ok(report)
    }

    /// Tell debug chats the bot is up. Failures are logged only.
    pub async fn announce_startup(&self, config: &AppConfig) {
        let text = format!(
            "{} Bot started at {}",
            config.settings.source_label,
            Local::now().format("%Y-%m-%d %H:%M:%S")
        );
        for chat_id in config.debug_chats() {
            if let Err(e) = self.notifier.send(chat_id, &text).await {
                warn!("Startup message to {} failed: {}", chat_id, e);
            }
        }
    }

    /// Evaluate current listings for debug chats ignoring the ledger.
    /// Nothing is sent or recorded.
    pub async fn diagnose(&self, config: &AppConfig) -> Result<usize> {
        let buckets = self.discover(config).await?;
        let mut total = 0;

        for (chat_id, chat) in config.chats.iter().filter(|(_, chat)| chat.debug_group) {
            let mut offers = self
                .matching_offers(&buckets, None, &chat.criteria, true)
                .await;
            rate_offers(&mut offers, &chat.criteria);
            info!("Chat {} would match {} offers", chat_id, offers.len());
            for offer in &offers {
                info!("  {} ({} €) {}", offer.title, offer.rent, offer.link);
            }
            total += offers.len();
        }

        Ok(total)
    }

    /// Poll until delivery halts. The config file is re-read each cycle; a
    /// failed re-read keeps the previous configuration.
    pub async fn run(&mut self, config_path: &Path, mut config: AppConfig, once: bool) -> Result<()> {
        loop {
            match AppConfig::load(config_path) {
                Ok(fresh) => config = fresh,
                Err(e) => warn!("Keeping previous configuration: {}", e),
            }

            info!("Checking for updates {}", Local::now().format("%Y-%m-%d %H:%M:%S"));
            match self.run_cycle(&config).await {
                Ok(report) => info!(
                    "Cycle done: {} links, {} notifications",
                    report.discovered,
                    report.notified.values().sum::<usize>()
                ),
                Err(e @ ScoutError::DeliveryHalted { .. }) => return Err(e),
                Err(e) => error!("Cycle failed: {}", e),
            }

            if once {
                return Ok(());
            }
            tokio::time::sleep(config.settings.poll_interval()).await;
        }
    }
}
