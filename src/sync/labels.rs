use tracing::{info, warn};

use super::{Reconciler, RunContext};
use crate::config::TRIGGER_LABEL_COLOR;

/// Provenance label colors, handed out by how many labels the weekly board already has.
pub const PALETTE: [&str; 10] = [
    "blue", "green", "yellow", "orange", "red", "purple", "pink", "lime", "sky", "black",
];

pub fn palette_color(existing_labels: usize) -> &'static str {
    PALETTE[existing_labels % PALETTE.len()]
}

enum LabelColor {
    Fixed(&'static str),
    Palette,
}

impl Reconciler<'_> {
    /// Label on the weekly board naming the board a mirrored card came from.
    pub(super) async fn provenance_label(
        &self,
        board_name: &str,
        ctx: &mut RunContext,
    ) -> Option<String> {
        self.weekly_label(board_name, LabelColor::Palette, ctx).await
    }

    /// The trigger label as it exists on the weekly board.
    pub(super) async fn weekly_trigger_label(&self, ctx: &mut RunContext) -> Option<String> {
        let name = self.config.trigger_label.clone();
        self.weekly_label(&name, LabelColor::Fixed(TRIGGER_LABEL_COLOR), ctx)
            .await
    }

    /// Finds a weekly-board label by exact name or creates it. The answer is
    /// cached for the rest of the run, failures included.
    async fn weekly_label(
        &self,
        name: &str,
        color: LabelColor,
        ctx: &mut RunContext,
    ) -> Option<String> {
        if let Some(cached) = ctx.labels.get(name) {
            return cached.clone();
        }

        let board_id = &self.config.weekly_board_id;
        let resolved = match ctx.settle(self.service.board_labels(board_id).await) {
            Some(existing) => match existing.iter().find(|l| l.name == name) {
                Some(label) => Some(label.id.clone()),
                None => {
                    let color = match color {
                        LabelColor::Fixed(c) => c,
                        LabelColor::Palette => palette_color(existing.len()),
                    };
                    let created = self.service.create_label(board_id, name, color).await;
                    let id = ctx.settle(created).map(|l| l.id);
                    if id.is_some() {
                        info!("Created label '{name}' ({color}) on Weekly board");
                    }
                    id
                }
            },
            None => {
                warn!("Could not read Weekly board labels, not creating '{name}'");
                None
            }
        };

        ctx.labels.insert(name.to_string(), resolved.clone());
        resolved
    }
}
