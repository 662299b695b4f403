use anyhow::Result;
use tracing::{error, info};

use super::{Reconciler, RunContext};
use crate::config::ListRoles;
use crate::logging::section;
use crate::model::card::{Board, Card, NewCard};
use crate::model::mapping::Mapping;

pub(super) fn mirror_description(original: &Card) -> String {
    format!("**Original Card:** {}\n\n{}", original.link(), original.desc)
}

impl Reconciler<'_> {
    pub(super) async fn pull_cards(&self, lists: &ListRoles, ctx: &mut RunContext) -> Result<()> {
        section("PULLING CARDS TO WEEKLY BOARD (SCANNING ALL BOARDS)");

        let trigger = self.config.trigger_label.as_str();
        let boards = self.source_boards(ctx).await;
        info!("Found {} boards across all workspaces", boards.len());
        info!("Scanning for '{trigger}' label...");

        let mut boards_with_cards = 0;
        for board in &boards {
            info!("Scanning: {}", board.name);
            let cards = self.cards_with_label(&board.id, trigger, ctx).await;
            if cards.is_empty() {
                continue;
            }
            boards_with_cards += 1;
            info!("  Found {} card(s) with '{trigger}' label", cards.len());

            for card in &cards {
                self.mirror_card(card, board, lists, ctx).await?;
            }
        }

        info!("Scan complete: {boards_with_cards} boards had cards with '{trigger}' label");
        Ok(())
    }

    /// Copies one card onto the weekly board's this-week list and records the pair.
    /// Only a missing this-week list is fatal; request failures skip or degrade this card.
    pub(super) async fn mirror_card(
        &self,
        card: &Card,
        board: &Board,
        lists: &ListRoles,
        ctx: &mut RunContext,
    ) -> Result<()> {
        if ctx.table.find_by_original(&card.id).is_some() {
            info!("Card already on Weekly board: {}", card.name);
            return Ok(());
        }

        let new_card = NewCard {
            list_id: lists.this_week()?.to_string(),
            name: card.name.clone(),
            desc: mirror_description(card),
            due: card.due.clone().filter(|d| !d.is_empty()),
        };
        let Some(created) = ctx.settle(self.service.create_card(&new_card).await) else {
            error!("Failed to create card: {}", card.name);
            return Ok(());
        };
        info!("Created card on Weekly board: {}", card.name);

        if let Some(label_id) = self.provenance_label(&board.name, ctx).await {
            ctx.settle(self.service.add_label(&created.id, &label_id).await);
        }
        // The copy carries the trigger label too, so removing it on either side is noticed.
        if let Some(label_id) = self.weekly_trigger_label(ctx).await {
            ctx.settle(self.service.add_label(&created.id, &label_id).await);
        }
        for member_id in &card.id_members {
            ctx.settle(self.service.add_member(&created.id, member_id).await);
        }

        let comment = format!(
            "📅 This card has been added to the [Weekly Milestone board]({})",
            self.config.board_url()
        );
        ctx.settle(self.service.add_comment(&card.id, &comment).await);

        ctx.table.add(Mapping::new(
            &card.id,
            &created.id,
            &board.id,
            &card.id_list,
        ));
        ctx.stats.pulled += 1;
        Ok(())
    }
}
