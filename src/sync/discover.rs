use super::{Reconciler, RunContext};
use crate::model::card::{Board, Card};

/// Cards whose label set holds a label named exactly `label`.
pub(super) fn carrying_label(cards: Vec<Card>, label: &str) -> Vec<Card> {
    cards.into_iter().filter(|c| c.has_label(label)).collect()
}

impl Reconciler<'_> {
    /// Every accessible board except the weekly board itself.
    pub(super) async fn source_boards(&self, ctx: &mut RunContext) -> Vec<Board> {
        let boards = ctx
            .settle(self.service.list_boards().await)
            .unwrap_or_default();
        boards
            .into_iter()
            .filter(|b| b.id != self.config.weekly_board_id)
            .collect()
    }

    /// One bulk fetch per board; Trello's default page is all we look at.
    pub(super) async fn cards_with_label(
        &self,
        board_id: &str,
        label: &str,
        ctx: &mut RunContext,
    ) -> Vec<Card> {
        let batch = ctx
            .settle(self.service.board_cards(board_id).await)
            .unwrap_or_default();
        for e in &batch.rejected {
            ctx.record(e);
        }
        carrying_label(batch.cards, label)
    }
}
