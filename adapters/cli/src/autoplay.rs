//! Plays levels to completion without a renderer.

use macrodata_core::{CellCoord, Event};
use macrodata_session::{Session, SessionError};
use serde::Serialize;
use tracing::info;

/// Outcome of one auto-played level.
#[derive(Clone, Debug, Serialize)]
pub(crate) struct LevelReport {
    pub(crate) level: String,
    pub(crate) header: String,
    pub(crate) groups: usize,
    pub(crate) cells_counted: usize,
    pub(crate) animations: usize,
    pub(crate) boxes: Vec<BoxReport>,
    pub(crate) completion: f64,
    pub(crate) victory: bool,
}

/// Final state of one progress box.
#[derive(Clone, Debug, Serialize)]
pub(crate) struct BoxReport {
    pub(crate) number: String,
    pub(crate) completion: f64,
}

impl LevelReport {
    pub(crate) fn summary(&self) -> String {
        let boxes = self
            .boxes
            .iter()
            .map(|report| format!("{}:{:.0}%", report.number, report.completion))
            .collect::<Vec<_>>()
            .join(" ");
        format!(
            "{} | {} groups, {} cells counted | {} | {}",
            self.header,
            self.groups,
            self.cells_counted,
            boxes,
            if self.victory { "victory" } else { "incomplete" }
        )
    }
}

/// Plays `levels` consecutive levels, resetting between them.
pub(crate) fn play_levels(
    session: &mut Session,
    levels: u32,
) -> Result<Vec<LevelReport>, SessionError> {
    let mut reports = Vec::new();
    for index in 0..levels {
        let report = play_level(session)?;
        info!(level = %report.level, victory = report.victory, "level finished");
        reports.push(report);

        if index + 1 < levels && !session.acknowledge_victory()? {
            session.reset_game()?;
        }
    }
    Ok(reports)
}

/// Clicks every root, then every revealed cell, finishing each animation as soon as it is issued.
pub(crate) fn play_level(session: &mut Session) -> Result<LevelReport, SessionError> {
    let _ = session.take_events();
    let _ = session.take_animation_requests();
    let mut animations = 0;

    for cell in scary_cells(session, true) {
        session.select_cell(cell.row(), cell.column())?;
        animations += finish_animations(session)?;
    }
    for cell in scary_cells(session, false) {
        session.select_cell(cell.row(), cell.column())?;
        animations += finish_animations(session)?;
    }

    if session.has_reached_full_completion() {
        let grace = std::time::Duration::from_millis(session.config().victory_grace_ms);
        session.advance(grace)?;
    }

    let events = session.take_events();
    let groups = events
        .iter()
        .filter(|event| matches!(event, Event::GroupFormed { .. }))
        .count();
    let cells_counted = events
        .iter()
        .filter(|event| matches!(event, Event::CellCounted { .. }))
        .count();

    Ok(LevelReport {
        level: session.level().name.clone(),
        header: session.header(),
        groups,
        cells_counted,
        animations,
        boxes: session
            .progress_boxes()
            .into_iter()
            .map(|snapshot| BoxReport {
                number: snapshot.display_number,
                completion: snapshot.completion.get(),
            })
            .collect(),
        completion: session.completion_percentage().get(),
        victory: session.is_complete(),
    })
}

fn scary_cells(session: &Session, roots: bool) -> Vec<CellCoord> {
    session
        .grid()
        .iter()
        .filter(|cell| cell.scary && !cell.selected && cell.root == roots)
        .map(|cell| cell.coord)
        .collect()
}

fn finish_animations(session: &mut Session) -> Result<usize, SessionError> {
    let requests = session.take_animation_requests();
    for request in &requests {
        let _ = session.complete_animation(request.id)?;
    }
    Ok(requests.len())
}
