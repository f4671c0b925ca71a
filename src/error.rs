use thiserror::Error;

#[derive(Error, Debug)]
pub enum ScoutError {
    #[error("HTTP client error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Unexpected status {status} from {url}")]
    Status { url: String, status: u16 },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Listing page unavailable: {0}")]
    DiscoveryUnavailable(String),

    #[error("No rent row on {link}")]
    MissingRent { link: String },

    #[error("Unreadable rent on {link}: {detail}")]
    MalformedRent { link: String, detail: String },

    #[error("Notification to chat {chat_id} failed: {reason}")]
    Delivery { chat_id: String, reason: String },

    #[error("Halting after {failures} consecutive delivery failures")]
    DeliveryHalted { failures: u32 },
}

pub type Result<T> = std::result::Result<T, ScoutError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_io_error_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err: ScoutError = io_err.into();
        assert!(matches!(err, ScoutError::Io(_)));
    }

    #[test]
    fn test_missing_rent_message() {
        let err = ScoutError::MissingRent {
            link: "https://www.saga.hamburg/immobiliensuche/immo-detail/1/x".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "No rent row on https://www.saga.hamburg/immobiliensuche/immo-detail/1/x"
        );
    }

    #[test]
    fn test_delivery_halted_message() {
        let err = ScoutError::DeliveryHalted { failures: 5 };
        assert_eq!(err.to_string(), "Halting after 5 consecutive delivery failures");
    }
}
