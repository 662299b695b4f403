pub mod client;

#[cfg(test)]
pub mod fake;

use async_trait::async_trait;
use reqwest::Method;
use thiserror::Error;

use crate::model::card::{Board, BoardList, Card, Label, NewCard};

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{method} {endpoint} failed: {source}")]
    Transport {
        method: Method,
        endpoint: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("{method} {endpoint} returned HTTP {status}")]
    Status {
        method: Method,
        endpoint: String,
        status: u16,
    },
    #[error("{method} {endpoint} returned an unexpected body: {source}")]
    Decode {
        method: Method,
        endpoint: String,
        #[source]
        source: serde_json::Error,
    },
}

impl ApiError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, ApiError::Status { status: 404, .. })
    }
}

pub type ApiResult<T> = std::result::Result<T, ApiError>;

/// A board's cards. Entries that failed to decode are kept apart so the rest still sync.
#[derive(Debug, Default)]
pub struct CardBatch {
    pub cards: Vec<Card>,
    pub rejected: Vec<ApiError>,
}

/// The slice of the Trello API the sync job touches.
#[async_trait]
pub trait BoardService: Send + Sync {
    /// Every board the credential can see.
    async fn list_boards(&self) -> ApiResult<Vec<Board>>;
    async fn board_labels(&self, board_id: &str) -> ApiResult<Vec<Label>>;
    async fn board_lists(&self, board_id: &str) -> ApiResult<Vec<BoardList>>;
    async fn board_cards(&self, board_id: &str) -> ApiResult<CardBatch>;
    async fn create_label(&self, board_id: &str, name: &str, color: &str) -> ApiResult<Label>;

    async fn get_card(&self, card_id: &str) -> ApiResult<Card>;
    async fn create_card(&self, card: &NewCard) -> ApiResult<Card>;
    async fn add_label(&self, card_id: &str, label_id: &str) -> ApiResult<()>;
    async fn add_member(&self, card_id: &str, member_id: &str) -> ApiResult<()>;
    async fn add_comment(&self, card_id: &str, text: &str) -> ApiResult<()>;
    async fn move_card(&self, card_id: &str, list_id: &str) -> ApiResult<()>;
    async fn delete_card(&self, card_id: &str) -> ApiResult<()>;
}
