use async_trait::async_trait;
use reqwest::Method;
use serde::de::DeserializeOwned;

use super::{ApiError, ApiResult, BoardService, CardBatch};
use crate::config::Credentials;
use crate::model::card::{Board, BoardList, Card, Label, NewCard};

pub const TRELLO_API: &str = "https://api.trello.com/1";

pub struct TrelloClient {
    base: String,
    api_key: String,
    token: String,
    client: reqwest::Client,
}

impl TrelloClient {
    pub fn new(credentials: &Credentials) -> Self {
        Self::with_base_url(TRELLO_API, credentials)
    }

    pub fn with_base_url(base: &str, credentials: &Credentials) -> Self {
        Self {
            base: base.trim_end_matches('/').to_string(),
            api_key: credentials.api_key.clone(),
            token: credentials.api_token.clone(),
            client: reqwest::Client::new(),
        }
    }

    fn auth_params(&self) -> [(&str, &str); 2] {
        [("key", &self.api_key), ("token", &self.token)]
    }

    /// Sends one request and returns the body of a successful response.
    async fn send(&self, method: Method, endpoint: &str, params: &[(&str, &str)]) -> ApiResult<String> {
        let transport = |source| ApiError::Transport {
            method: method.clone(),
            endpoint: endpoint.to_string(),
            source,
        };

        let resp = self
            .client
            .request(method.clone(), format!("{}/{endpoint}", self.base))
            .query(&self.auth_params())
            .query(params)
            .send()
            .await
            .map_err(transport)?;

        let status = resp.status();
        if !status.is_success() {
            return Err(ApiError::Status {
                method: method.clone(),
                endpoint: endpoint.to_string(),
                status: status.as_u16(),
            });
        }
        resp.text().await.map_err(transport)
    }

    async fn fetch<T: DeserializeOwned>(
        &self,
        method: Method,
        endpoint: &str,
        params: &[(&str, &str)],
    ) -> ApiResult<T> {
        let body = self.send(method.clone(), endpoint, params).await?;
        serde_json::from_str(&body).map_err(|source| ApiError::Decode {
            method,
            endpoint: endpoint.to_string(),
            source,
        })
    }

    async fn get<T: DeserializeOwned>(&self, endpoint: &str, params: &[(&str, &str)]) -> ApiResult<T> {
        self.fetch(Method::GET, endpoint, params).await
    }

    async fn post<T: DeserializeOwned>(&self, endpoint: &str, params: &[(&str, &str)]) -> ApiResult<T> {
        self.fetch(Method::POST, endpoint, params).await
    }

    async fn post_unit(&self, endpoint: &str, params: &[(&str, &str)]) -> ApiResult<()> {
        self.send(Method::POST, endpoint, params).await.map(|_| ())
    }

    async fn put(&self, endpoint: &str, params: &[(&str, &str)]) -> ApiResult<()> {
        self.send(Method::PUT, endpoint, params).await.map(|_| ())
    }

    async fn delete(&self, endpoint: &str) -> ApiResult<()> {
        self.send(Method::DELETE, endpoint, &[]).await.map(|_| ())
    }
}

#[async_trait]
impl BoardService for TrelloClient {
    async fn list_boards(&self) -> ApiResult<Vec<Board>> {
        self.get("members/me/boards", &[("fields", "name,id")]).await
    }

    async fn board_labels(&self, board_id: &str) -> ApiResult<Vec<Label>> {
        self.get(&format!("boards/{board_id}/labels"), &[]).await
    }

    async fn board_lists(&self, board_id: &str) -> ApiResult<Vec<BoardList>> {
        self.get(&format!("boards/{board_id}/lists"), &[("fields", "id,name")])
            .await
    }

    /// Cards are decoded one by one so a single malformed entry costs only itself.
    async fn board_cards(&self, board_id: &str) -> ApiResult<CardBatch> {
        let endpoint = format!("boards/{board_id}/cards");
        let raw: Vec<serde_json::Value> = self.get(&endpoint, &[("fields", "all")]).await?;

        let mut batch = CardBatch::default();
        for (idx, value) in raw.into_iter().enumerate() {
            match serde_json::from_value::<Card>(value) {
                Ok(card) => batch.cards.push(card),
                Err(source) => batch.rejected.push(ApiError::Decode {
                    method: Method::GET,
                    endpoint: format!("{endpoint}[{idx}]"),
                    source,
                }),
            }
        }
        Ok(batch)
    }

    async fn create_label(&self, board_id: &str, name: &str, color: &str) -> ApiResult<Label> {
        self.post(
            "labels",
            &[("name", name), ("color", color), ("idBoard", board_id)],
        )
        .await
    }

    async fn get_card(&self, card_id: &str) -> ApiResult<Card> {
        self.get(&format!("cards/{card_id}"), &[("fields", "all")])
            .await
    }

    async fn create_card(&self, card: &NewCard) -> ApiResult<Card> {
        let mut params = vec![
            ("idList", card.list_id.as_str()),
            ("name", card.name.as_str()),
            ("desc", card.desc.as_str()),
            ("pos", "top"),
        ];
        if let Some(due) = &card.due {
            params.push(("due", due.as_str()));
        }
        self.post("cards", &params).await
    }

    async fn add_label(&self, card_id: &str, label_id: &str) -> ApiResult<()> {
        self.post_unit(&format!("cards/{card_id}/idLabels"), &[("value", label_id)])
            .await
    }

    async fn add_member(&self, card_id: &str, member_id: &str) -> ApiResult<()> {
        self.post_unit(&format!("cards/{card_id}/idMembers"), &[("value", member_id)])
            .await
    }

    async fn add_comment(&self, card_id: &str, text: &str) -> ApiResult<()> {
        self.post_unit(&format!("cards/{card_id}/actions/comments"), &[("text", text)])
            .await
    }

    async fn move_card(&self, card_id: &str, list_id: &str) -> ApiResult<()> {
        self.put(&format!("cards/{card_id}"), &[("idList", list_id)])
            .await
    }

    async fn delete_card(&self, card_id: &str) -> ApiResult<()> {
        self.delete(&format!("cards/{card_id}")).await
    }
}
