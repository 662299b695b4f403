use anyhow::Result;
use tracing::{info, warn};

use super::{Reconciler, RunContext};
use crate::config::ListRoles;
use crate::logging::section;
use crate::model::mapping::Mapping;

pub(super) const COMPLETED_COMMENT: &str = "✅ Marked as completed on Weekly Milestone board";

impl Reconciler<'_> {
    pub(super) async fn sync_status_changes(
        &self,
        lists: &ListRoles,
        ctx: &mut RunContext,
    ) -> Result<()> {
        section("SYNCING STATUS CHANGES");
        let mappings = ctx.table.mappings.clone();
        for mapping in &mappings {
            self.sync_card_status(mapping, lists, ctx).await?;
        }
        Ok(())
    }

    /// Both directions are checked on every run, independently of each other.
    async fn sync_card_status(
        &self,
        mapping: &Mapping,
        lists: &ListRoles,
        ctx: &mut RunContext,
    ) -> Result<()> {
        let original = self.lookup_card(&mapping.original_card_id, ctx).await;
        let weekly = self.lookup_card(&mapping.weekly_card_id, ctx).await;
        let (Some(original), Some(weekly)) = (original.card(), weekly.card()) else {
            warn!(
                original = %mapping.original_card_id,
                weekly = %mapping.weekly_card_id,
                "Card not found for mapping"
            );
            return Ok(());
        };

        let completed = lists.completed()?;

        // Comment only: the original board may have no list that means "done".
        if weekly.id_list == completed && !original.closed {
            let commented = self.service.add_comment(&original.id, COMPLETED_COMMENT).await;
            if ctx.settle(commented).is_some() {
                info!("Synced completion: {}", original.name);
                ctx.stats.synced += 1;
            }
        }

        if original.closed && weekly.id_list != completed {
            let moved = self.service.move_card(&weekly.id, completed).await;
            if ctx.settle(moved).is_some() {
                info!("Moved to completed (original closed): {}", weekly.name);
                ctx.stats.synced += 1;
            }
        }

        Ok(())
    }
}
