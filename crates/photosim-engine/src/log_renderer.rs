//! Renderer that writes the simulation's visible state to the log.
//!
//! A headless run has no plant to draw, so every snapshot, series update
//! and feedback message becomes a structured tracing event instead.

use photosim_core::{BandColor, Renderer};
use photosim_feedback::FeedbackMessage;
use photosim_types::{DaySnapshot, SeriesKind, SeriesPoint};
use tracing::{debug, info};

/// Bridges the session's renderer seam to `tracing`.
#[derive(Debug, Default)]
pub struct LogRenderer {
    /// Last day logged at info level, so repeated renders of the same day
    /// drop to debug.
    last_day: Option<u32>,
}

impl LogRenderer {
    /// A renderer that has not logged anything yet.
    pub const fn new() -> Self {
        Self { last_day: None }
    }
}

impl Renderer for LogRenderer {
    fn render(&mut self, snapshot: &DaySnapshot) {
        if self.last_day == Some(snapshot.day) {
            debug!(
                day = snapshot.day,
                state = ?snapshot.state,
                light = %snapshot.light,
                pending_light = ?snapshot.pending_light,
                water = ?snapshot.water,
                energy = snapshot.energy_remaining,
                "Plant redrawn"
            );
            return;
        }
        self.last_day = Some(snapshot.day);
        info!(
            day = snapshot.day,
            state = ?snapshot.state,
            light = %snapshot.light,
            color = snapshot.light_color,
            water = ?snapshot.water,
            created = snapshot.totals.created,
            used = snapshot.totals.used,
            stored = snapshot.totals.stored,
            "Plant"
        );
    }

    fn update_series(&mut self, kind: SeriesKind, points: &[SeriesPoint]) {
        debug!(
            series = ?kind,
            points = points.len(),
            latest = points.last().map(|p| p.value),
            "Graph series updated"
        );
    }

    fn add_plot_band(&mut self, start: u32, end: u32, color: BandColor) {
        debug!(start, end, color = color.hex(), "Plot band added");
    }

    fn clear_plot_bands(&mut self) {
        debug!("Plot bands cleared");
        self.last_day = None;
    }

    fn show_feedback(&mut self, message: &FeedbackMessage) {
        for line in &message.lines {
            info!(message = ?message.id, trials = message.trial_count, "{line}");
        }
    }
}
