//! In-memory Trello used by the sync tests. Records every mutation it receives.

use std::collections::HashSet;
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;
use reqwest::Method;

use super::{ApiError, ApiResult, BoardService, CardBatch};
use crate::model::card::{Board, BoardList, Card, Label, NewCard};

#[derive(Default)]
pub struct FakeState {
    pub boards: Vec<Board>,
    pub lists: Vec<(String, BoardList)>,
    pub labels: Vec<(String, Label)>,
    pub cards: Vec<Card>,
    pub comments: Vec<(String, String)>,
    pub created_cards: Vec<String>,
    pub created_labels: Vec<(String, String)>,
    pub deleted: Vec<String>,
    pub moves: Vec<(String, String)>,
    pub members_added: Vec<(String, String)>,
    /// Boards whose label/list/card reads fail.
    pub failing_boards: HashSet<String>,
    /// Cards whose lookups answer 503.
    pub failing_cards: HashSet<String>,
    /// Cards that come back from a board read as undecodable entries.
    pub malformed_cards: HashSet<String>,
    pub fail_card_creation: bool,
    pub fail_board_listing: bool,
    next_id: u32,
}

impl FakeState {
    fn next_id(&mut self, prefix: &str) -> String {
        self.next_id += 1;
        format!("{prefix}-{}", self.next_id)
    }

    fn card_mut(&mut self, card_id: &str) -> Option<&mut Card> {
        self.cards.iter_mut().find(|c| c.id == card_id)
    }
}

#[derive(Default)]
pub struct FakeTrello {
    state: Mutex<FakeState>,
}

fn not_found(method: Method, endpoint: String) -> ApiError {
    ApiError::Status {
        method,
        endpoint,
        status: 404,
    }
}

fn unavailable(method: Method, endpoint: String) -> ApiError {
    ApiError::Status {
        method,
        endpoint,
        status: 503,
    }
}

impl FakeTrello {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> MutexGuard<'_, FakeState> {
        self.state.lock().unwrap()
    }

    pub fn seed_board(&self, id: &str, name: &str) {
        self.state().boards.push(Board {
            id: id.into(),
            name: name.into(),
        });
    }

    pub fn seed_list(&self, board_id: &str, id: &str, name: &str) {
        self.state().lists.push((
            board_id.into(),
            BoardList {
                id: id.into(),
                name: name.into(),
            },
        ));
    }

    pub fn seed_label(&self, board_id: &str, name: &str, color: &str) -> String {
        let mut state = self.state();
        let id = state.next_id("label");
        state.labels.push((
            board_id.into(),
            Label {
                id: id.clone(),
                name: name.into(),
                color: Some(color.into()),
            },
        ));
        id
    }

    /// Adds a card carrying the named labels, creating them on the board when missing.
    pub fn seed_card(&self, board_id: &str, list_id: &str, id: &str, name: &str, labels: &[&str]) {
        let labels = labels
            .iter()
            .map(|name| {
                let existing = self
                    .state()
                    .labels
                    .iter()
                    .find(|(b, l)| b == board_id && l.name == *name)
                    .map(|(_, l)| l.clone());
                existing.unwrap_or_else(|| {
                    let id = self.seed_label(board_id, name, "orange");
                    Label {
                        id,
                        name: name.to_string(),
                        color: Some("orange".into()),
                    }
                })
            })
            .collect();
        self.state().cards.push(Card {
            id: id.into(),
            name: name.into(),
            desc: String::new(),
            due: None,
            id_list: list_id.into(),
            id_board: Some(board_id.into()),
            labels,
            id_members: Vec::new(),
            closed: false,
            short_url: Some(format!("https://trello.com/c/{id}")),
            url: None,
        });
    }

    pub fn update_card(&self, card_id: &str, f: impl FnOnce(&mut Card)) {
        let mut state = self.state();
        if let Some(card) = state.card_mut(card_id) {
            f(card);
        }
    }

    pub fn strip_label(&self, card_id: &str, label_name: &str) {
        self.update_card(card_id, |c| c.labels.retain(|l| l.name != label_name));
    }

    pub fn remove_card(&self, card_id: &str) {
        self.state().cards.retain(|c| c.id != card_id);
    }

    pub fn card(&self, card_id: &str) -> Option<Card> {
        self.state().cards.iter().find(|c| c.id == card_id).cloned()
    }

    pub fn cards_in_list(&self, list_id: &str) -> Vec<Card> {
        self.state()
            .cards
            .iter()
            .filter(|c| c.id_list == list_id)
            .cloned()
            .collect()
    }

    pub fn labels_named(&self, board_id: &str, name: &str) -> Vec<Label> {
        self.state()
            .labels
            .iter()
            .filter(|(b, l)| b == board_id && l.name == name)
            .map(|(_, l)| l.clone())
            .collect()
    }

    pub fn comments_on(&self, card_id: &str) -> Vec<String> {
        self.state()
            .comments
            .iter()
            .filter(|(c, _)| c == card_id)
            .map(|(_, text)| text.clone())
            .collect()
    }
}

#[async_trait]
impl BoardService for FakeTrello {
    async fn list_boards(&self) -> ApiResult<Vec<Board>> {
        let state = self.state();
        if state.fail_board_listing {
            return Err(unavailable(Method::GET, "members/me/boards".into()));
        }
        Ok(state.boards.clone())
    }

    async fn board_labels(&self, board_id: &str) -> ApiResult<Vec<Label>> {
        let state = self.state();
        if state.failing_boards.contains(board_id) {
            return Err(unavailable(Method::GET, format!("boards/{board_id}/labels")));
        }
        Ok(state
            .labels
            .iter()
            .filter(|(b, _)| b == board_id)
            .map(|(_, l)| l.clone())
            .collect())
    }

    async fn board_lists(&self, board_id: &str) -> ApiResult<Vec<BoardList>> {
        let state = self.state();
        if state.failing_boards.contains(board_id) {
            return Err(unavailable(Method::GET, format!("boards/{board_id}/lists")));
        }
        Ok(state
            .lists
            .iter()
            .filter(|(b, _)| b == board_id)
            .map(|(_, l)| l.clone())
            .collect())
    }

    async fn board_cards(&self, board_id: &str) -> ApiResult<CardBatch> {
        let state = self.state();
        if state.failing_boards.contains(board_id) {
            return Err(unavailable(Method::GET, format!("boards/{board_id}/cards")));
        }
        let mut batch = CardBatch::default();
        for (idx, card) in state
            .cards
            .iter()
            .filter(|c| c.id_board.as_deref() == Some(board_id))
            .enumerate()
        {
            if state.malformed_cards.contains(&card.id) {
                let source = serde_json::from_str::<Card>("{}").unwrap_err();
                batch.rejected.push(ApiError::Decode {
                    method: Method::GET,
                    endpoint: format!("boards/{board_id}/cards[{idx}]"),
                    source,
                });
            } else {
                batch.cards.push(card.clone());
            }
        }
        Ok(batch)
    }

    async fn create_label(&self, board_id: &str, name: &str, color: &str) -> ApiResult<Label> {
        let mut state = self.state();
        if state.failing_boards.contains(board_id) {
            return Err(unavailable(Method::POST, "labels".into()));
        }
        let label = Label {
            id: state.next_id("label"),
            name: name.into(),
            color: Some(color.into()),
        };
        state.labels.push((board_id.into(), label.clone()));
        state
            .created_labels
            .push((board_id.into(), color.to_string()));
        Ok(label)
    }

    async fn get_card(&self, card_id: &str) -> ApiResult<Card> {
        if self.state().failing_cards.contains(card_id) {
            return Err(unavailable(Method::GET, format!("cards/{card_id}")));
        }
        self.card(card_id)
            .ok_or_else(|| not_found(Method::GET, format!("cards/{card_id}")))
    }

    async fn create_card(&self, card: &NewCard) -> ApiResult<Card> {
        let mut state = self.state();
        if state.fail_card_creation {
            return Err(unavailable(Method::POST, "cards".into()));
        }
        let board_id = state
            .lists
            .iter()
            .find(|(_, l)| l.id == card.list_id)
            .map(|(b, _)| b.clone());
        let id = state.next_id("card");
        let created = Card {
            id: id.clone(),
            name: card.name.clone(),
            desc: card.desc.clone(),
            due: card.due.clone(),
            id_list: card.list_id.clone(),
            id_board: board_id,
            labels: Vec::new(),
            id_members: Vec::new(),
            closed: false,
            short_url: Some(format!("https://trello.com/c/{id}")),
            url: None,
        };
        // New cards go to the top of the list.
        state.cards.insert(0, created.clone());
        state.created_cards.push(id);
        Ok(created)
    }

    async fn add_label(&self, card_id: &str, label_id: &str) -> ApiResult<()> {
        let mut state = self.state();
        let label = state
            .labels
            .iter()
            .find(|(_, l)| l.id == label_id)
            .map(|(_, l)| l.clone())
            .ok_or_else(|| not_found(Method::POST, format!("cards/{card_id}/idLabels")))?;
        let card = state
            .card_mut(card_id)
            .ok_or_else(|| not_found(Method::POST, format!("cards/{card_id}/idLabels")))?;
        card.labels.push(label);
        Ok(())
    }

    async fn add_member(&self, card_id: &str, member_id: &str) -> ApiResult<()> {
        let mut state = self.state();
        let card = state
            .card_mut(card_id)
            .ok_or_else(|| not_found(Method::POST, format!("cards/{card_id}/idMembers")))?;
        card.id_members.push(member_id.into());
        state
            .members_added
            .push((card_id.into(), member_id.into()));
        Ok(())
    }

    async fn add_comment(&self, card_id: &str, text: &str) -> ApiResult<()> {
        let mut state = self.state();
        if state.card_mut(card_id).is_none() {
            return Err(not_found(Method::POST, format!("cards/{card_id}/actions/comments")));
        }
        state.comments.push((card_id.into(), text.into()));
        Ok(())
    }

    async fn move_card(&self, card_id: &str, list_id: &str) -> ApiResult<()> {
        let mut state = self.state();
        let card = state
            .card_mut(card_id)
            .ok_or_else(|| not_found(Method::PUT, format!("cards/{card_id}")))?;
        card.id_list = list_id.into();
        state.moves.push((card_id.into(), list_id.into()));
        Ok(())
    }

    async fn delete_card(&self, card_id: &str) -> ApiResult<()> {
        let mut state = self.state();
        let before = state.cards.len();
        state.cards.retain(|c| c.id != card_id);
        if state.cards.len() == before {
            return Err(not_found(Method::DELETE, format!("cards/{card_id}")));
        }
        state.deleted.push(card_id.into());
        Ok(())
    }
}
