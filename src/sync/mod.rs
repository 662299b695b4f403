//! One sync run: mirror labelled cards onto the weekly board, keep completion
//! in step on both sides, and tear down mirrors whose label went away.

mod cleanup;
mod discover;
mod labels;
mod mirror;
mod status;


use anyhow::Result;
use std::collections::HashMap;
use tracing::{error, info, warn};

use crate::config::{ListRoles, SyncConfig};
use crate::logging::section;
use crate::model::card::Card;
use crate::model::mapping::MappingTable;
use crate::store::MappingStore;
use crate::trello::{ApiError, ApiResult, BoardService};

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct SyncStats {
    pub pulled: usize,
    pub synced: usize,
    pub removed: usize,
    pub errors: usize,
}

/// Result of a single card lookup.
#[derive(Debug, Clone)]
pub enum CardLookup {
    Found(Card),
    /// Trello answered 404.
    Gone,
    /// Any other failure; the card's fate is unknown this run.
    Unavailable,
}

impl CardLookup {
    pub fn card(&self) -> Option<&Card> {
        match self {
            CardLookup::Found(card) => Some(card),
            _ => None,
        }
    }
}

/// Everything a run mutates. Steps borrow it in turn and the run hands it back at the end.
#[derive(Debug, Default)]
pub struct RunContext {
    pub table: MappingTable,
    pub stats: SyncStats,
    /// Weekly-board label ids by name, `None` when resolution failed this run.
    labels: HashMap<String, Option<String>>,
}

impl RunContext {
    pub fn new(table: MappingTable) -> Self {
        Self {
            table,
            ..Default::default()
        }
    }

    /// Logs and counts a failed request, handing back the value on success.
    pub fn settle<T>(&mut self, result: ApiResult<T>) -> Option<T> {
        match result {
            Ok(value) => Some(value),
            Err(e) => {
                self.record(&e);
                None
            }
        }
    }

    fn record(&mut self, e: &ApiError) {
        error!("API request failed: {e}");
        self.stats.errors += 1;
    }
}

pub struct SyncOutcome {
    pub stats: SyncStats,
    /// Set when a step aborted the run or the mapping file could not be written.
    pub failure: Option<anyhow::Error>,
}

impl SyncOutcome {
    pub fn succeeded(&self) -> bool {
        self.failure.is_none() && self.stats.errors == 0
    }
}

pub struct Reconciler<'a> {
    service: &'a dyn BoardService,
    config: &'a SyncConfig,
}

impl<'a> Reconciler<'a> {
    pub fn new(service: &'a dyn BoardService, config: &'a SyncConfig) -> Self {
        Self { service, config }
    }

    /// Runs every step and persists the mapping table, even after a step fails.
    pub async fn run(&self, store: &MappingStore) -> Result<SyncOutcome> {
        let table = store.load()?;
        info!(
            "WEEKLY MILESTONE SYNC STARTED {}",
            chrono::Local::now().format("%Y-%m-%d %H:%M:%S")
        );

        let mut ctx = RunContext::new(table);
        let mut failure = self.run_steps(&mut ctx).await.err();
        if let Some(e) = &failure {
            error!("Unexpected error: {e:?}");
        }

        let RunContext {
            mut table, stats, ..
        } = ctx;
        if let Err(e) = store.save(&mut table) {
            error!("Failed to save mapping: {e:#}");
            failure.get_or_insert(e);
        }

        log_summary(&stats, table.len());
        Ok(SyncOutcome { stats, failure })
    }

    async fn run_steps(&self, ctx: &mut RunContext) -> Result<()> {
        let lists = self.resolve_lists(ctx).await;
        self.pull_cards(&lists, ctx).await?;
        self.sync_status_changes(&lists, ctx).await?;
        self.cleanup_removed_labels(ctx).await;
        Ok(())
    }

    /// Configured roles win; otherwise they are read off the weekly board's list names.
    async fn resolve_lists(&self, ctx: &mut RunContext) -> ListRoles {
        if let Some(lists) = &self.config.lists {
            return lists.clone();
        }
        let fetched = self
            .service
            .board_lists(&self.config.weekly_board_id)
            .await;
        match ctx.settle(fetched) {
            Some(lists) => ListRoles::derive(&lists),
            None => {
                warn!("Could not get board lists, list roles unresolved");
                ListRoles::default()
            }
        }
    }

    async fn lookup_card(&self, card_id: &str, ctx: &mut RunContext) -> CardLookup {
        match self.service.get_card(card_id).await {
            Ok(card) => CardLookup::Found(card),
            Err(e) => {
                let gone = e.is_not_found();
                ctx.record(&e);
                if gone {
                    CardLookup::Gone
                } else {
                    CardLookup::Unavailable
                }
            }
        }
    }
}

fn log_summary(stats: &SyncStats, mapped: usize) {
    section("SYNC SUMMARY");
    info!("Cards Pulled: {}", stats.pulled);
    info!("Status Synced: {}", stats.synced);
    info!("Cards Removed: {}", stats.removed);
    info!("Errors: {}", stats.errors);
    info!("Total Mapped Cards: {mapped}");
}
