//! Reservation fetch failures

/// Why a reservation fetch produced no usable list
#[derive(Debug, thiserror::Error)]
pub enum ResolveError {
    /// The service answered with a non-2xx status
    #[error("HTTP {0}")]
    Status(u16),
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("invalid response body: {0}")]
    Decode(#[from] serde_json::Error),
}

impl ResolveError {
    /// Text shown on the display in place of the reservation card
    pub fn display_message(&self) -> String {
        format!("読み込みエラー: {}", self)
    }
}
