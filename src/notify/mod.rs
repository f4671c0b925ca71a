pub mod message;
pub mod telegram;

pub use message::{render_offer, shorten, stars};
pub use telegram::TelegramNotifier;

use crate::error::Result;
use async_trait::async_trait;

/// Sink for text messages to a subscriber chat
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn send(&self, chat_id: &str, text: &str) -> Result<()>;
}
