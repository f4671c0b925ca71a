pub mod discovery;
pub mod saga;
pub mod traits;
pub mod types;

pub use discovery::{discover_links, parse_listing_page};
pub use saga::SagaClient;
pub use traits::PageFetcher;
pub use types::{CategoryRule, RequestProfile, SiteLayout};
