use tracing::{error, info, warn};

use crate::logging::section;
use crate::trello::BoardService;

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct SetupStats {
    pub boards_scanned: usize,
    pub labels_created: usize,
    pub labels_already_exist: usize,
    pub errors: usize,
}

/// Makes sure every reachable board has a label named exactly `name`.
/// Boards whose labels cannot be read are skipped so a rerun never duplicates a label.
pub async fn setup_all_boards(service: &dyn BoardService, name: &str, color: &str) -> SetupStats {
    let mut stats = SetupStats::default();
    section(&format!("SETTING UP '{name}' LABEL ON ALL BOARDS"));

    info!("Fetching all boards...");
    let boards = match service.list_boards().await {
        Ok(boards) => boards,
        Err(e) => {
            error!("API Error: {e}");
            stats.errors += 1;
            Vec::new()
        }
    };
    stats.boards_scanned = boards.len();
    info!("Found {} boards", boards.len());

    for board in &boards {
        let labels = match service.board_labels(&board.id).await {
            Ok(labels) => labels,
            Err(e) => {
                error!("API Error: {e}");
                warn!("Skipping {}: could not read its labels", board.name);
                stats.errors += 1;
                continue;
            }
        };
        if labels.iter().any(|l| l.name == name) {
            stats.labels_already_exist += 1;
            continue;
        }
        match service.create_label(&board.id, name, color).await {
            Ok(_) => {
                info!("  Created label on: {}", board.name);
                stats.labels_created += 1;
            }
            Err(e) => {
                error!("API Error: {e}");
                error!("  Failed to create label on: {}", board.name);
                stats.errors += 1;
            }
        }
    }

    section("SETUP SUMMARY");
    info!("Boards Scanned: {}", stats.boards_scanned);
    info!("Labels Created: {}", stats.labels_created);
    info!("Labels Already Exist: {}", stats.labels_already_exist);
    info!("Errors: {}", stats.errors);
    if stats.labels_created > 0 {
        info!(
            "Successfully created '{name}' label on {} boards!",
            stats.labels_created
        );
    } else if stats.errors == 0 {
        info!("All boards already have the '{name}' label.");
    }
    if stats.errors > 0 {
        warn!("{} errors occurred during setup.", stats.errors);
    }
    stats
}
