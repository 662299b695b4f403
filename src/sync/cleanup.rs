use tracing::{info, warn};

use super::{CardLookup, Reconciler, RunContext};
use crate::logging::section;
use crate::model::mapping::Mapping;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) enum LabelSide {
    Original,
    Weekly,
}

impl LabelSide {
    fn describe(self) -> &'static str {
        match self {
            LabelSide::Original => "original card",
            LabelSide::Weekly => "Weekly board",
        }
    }
}

/// What to do with one mapping. Variants are listed in precedence order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) enum Teardown {
    OriginalGone { mirror_exists: bool },
    MirrorGone,
    LabelRemoved(LabelSide),
    Keep,
    /// A lookup failed for a reason other than 404; try again next run.
    Undecided,
}

pub(super) fn classify(original: &CardLookup, weekly: &CardLookup, trigger: &str) -> Teardown {
    match (original, weekly) {
        (CardLookup::Unavailable, _) | (_, CardLookup::Unavailable) => Teardown::Undecided,
        (CardLookup::Gone, weekly) => Teardown::OriginalGone {
            mirror_exists: weekly.card().is_some(),
        },
        (CardLookup::Found(_), CardLookup::Gone) => Teardown::MirrorGone,
        (CardLookup::Found(o), CardLookup::Found(w)) => {
            if !o.has_label(trigger) {
                Teardown::LabelRemoved(LabelSide::Original)
            } else if !w.has_label(trigger) {
                Teardown::LabelRemoved(LabelSide::Weekly)
            } else {
                Teardown::Keep
            }
        }
    }
}

impl Reconciler<'_> {
    pub(super) async fn cleanup_removed_labels(&self, ctx: &mut RunContext) {
        section("CLEANING UP REMOVED LABELS");
        let mappings = ctx.table.mappings.clone();
        for mapping in &mappings {
            self.cleanup_mapping(mapping, ctx).await;
        }
    }

    async fn cleanup_mapping(&self, mapping: &Mapping, ctx: &mut RunContext) {
        let original = self.lookup_card(&mapping.original_card_id, ctx).await;
        let weekly = self.lookup_card(&mapping.weekly_card_id, ctx).await;

        match classify(&original, &weekly, &self.config.trigger_label) {
            Teardown::OriginalGone { mirror_exists } => {
                info!("Original card deleted, removing from Weekly board");
                if mirror_exists {
                    ctx.settle(self.service.delete_card(&mapping.weekly_card_id).await);
                }
            }
            Teardown::MirrorGone => {
                info!("Weekly card deleted manually, cleaning up mapping");
                let comment = "🔄 Removed from Weekly Milestone board (card deleted)";
                ctx.settle(
                    self.service
                        .add_comment(&mapping.original_card_id, comment)
                        .await,
                );
            }
            Teardown::LabelRemoved(side) => {
                let name = original.card().map(|c| c.name.as_str()).unwrap_or_default();
                info!(
                    "'{}' label removed from {}: {name}",
                    self.config.trigger_label,
                    side.describe()
                );
                ctx.settle(self.service.delete_card(&mapping.weekly_card_id).await);
                let comment = format!(
                    "🔄 Removed from Weekly Milestone board (label removed from {})",
                    side.describe()
                );
                ctx.settle(
                    self.service
                        .add_comment(&mapping.original_card_id, &comment)
                        .await,
                );
            }
            Teardown::Keep => return,
            Teardown::Undecided => {
                warn!(
                    original = %mapping.original_card_id,
                    weekly = %mapping.weekly_card_id,
                    "Could not check mapping, leaving it for the next run"
                );
                return;
            }
        }

        ctx.table.remove_by_weekly(&mapping.weekly_card_id);
        ctx.stats.removed += 1;
    }
}
