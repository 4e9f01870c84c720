//! The renderer seam.
//!
//! Drawing the plant and the graph is the host's job. The session pushes
//! snapshots, series points, plot bands and feedback through [`Renderer`]
//! and never reads anything back.

use std::sync::{Arc, Mutex, PoisonError};

use photosim_feedback::FeedbackMessage;
use photosim_types::{DaySnapshot, LightLevel, SeriesKind, SeriesPoint, WaterLevel};
use serde::Serialize;

/// Background shading for a span of days on the graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum BandColor {
    /// The light was off.
    Dark,
    /// The light was on below full intensity.
    Dim,
    /// The plant had no water.
    Dry,
}

impl BandColor {
    /// Shading for a day with `light` and `water`, or `None` for a normal
    /// day.
    pub const fn for_day(light: LightLevel, water: WaterLevel) -> Option<Self> {
        match (light, water) {
            (LightLevel::Off, _) => Some(Self::Dark),
            (_, WaterLevel::Off) => Some(Self::Dry),
            (LightLevel::Full, WaterLevel::On) => None,
            _ => Some(Self::Dim),
        }
    }

    /// CSS colour for the band.
    pub const fn hex(self) -> &'static str {
        match self {
            Self::Dark => "#d6d6e0",
            Self::Dim => "#f1f0c8",
            Self::Dry => "#ecd9c0",
        }
    }
}

/// Receives everything the host needs to draw.
pub trait Renderer: Send + core::fmt::Debug {
    /// Draw the plant and controls for the current state.
    fn render(&mut self, snapshot: &DaySnapshot);

    /// Replace the points of one graph series.
    fn update_series(&mut self, kind: SeriesKind, points: &[SeriesPoint]);

    /// Shade days `start..=end` on the graph.
    fn add_plot_band(&mut self, start: u32, end: u32, color: BandColor);

    /// Clear all plot bands (a new trial started).
    fn clear_plot_bands(&mut self) {}

    /// Show a feedback message to the student.
    fn show_feedback(&mut self, message: &FeedbackMessage);
}

/// Discards everything.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullRenderer;

impl Renderer for NullRenderer {
    fn render(&mut self, _snapshot: &DaySnapshot) {}

    fn update_series(&mut self, _kind: SeriesKind, _points: &[SeriesPoint]) {}

    fn add_plot_band(&mut self, _start: u32, _end: u32, _color: BandColor) {}

    fn show_feedback(&mut self, _message: &FeedbackMessage) {}
}

/// One call made on a [`RecordingRenderer`].
#[derive(Debug, Clone, PartialEq)]
pub enum RenderCall {
    /// [`Renderer::render`].
    Render(DaySnapshot),
    /// [`Renderer::update_series`]: the series and its points.
    UpdateSeries(SeriesKind, Vec<SeriesPoint>),
    /// [`Renderer::add_plot_band`].
    PlotBand(u32, u32, BandColor),
    /// [`Renderer::clear_plot_bands`].
    ClearPlotBands,
    /// [`Renderer::show_feedback`].
    Feedback(FeedbackMessage),
}

/// Records every call. Clones share the same log, so a test can keep one
/// handle and give the other to a session.
#[derive(Debug, Clone, Default)]
pub struct RecordingRenderer {
    calls: Arc<Mutex<Vec<RenderCall>>>,
}

impl RecordingRenderer {
    /// An empty recorder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Every call so far, oldest first.
    pub fn calls(&self) -> Vec<RenderCall> {
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// The most recent snapshot rendered, if any.
    pub fn last_snapshot(&self) -> Option<DaySnapshot> {
        self.calls().into_iter().rev().find_map(|call| match call {
            RenderCall::Render(snapshot) => Some(snapshot),
            _ => None,
        })
    }

    /// Every feedback message shown.
    pub fn feedback(&self) -> Vec<FeedbackMessage> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                RenderCall::Feedback(message) => Some(message),
                _ => None,
            })
            .collect()
    }

    fn push(&self, call: RenderCall) {
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(call);
    }
}

impl Renderer for RecordingRenderer {
    fn render(&mut self, snapshot: &DaySnapshot) {
        self.push(RenderCall::Render(snapshot.clone()));
    }

    fn update_series(&mut self, kind: SeriesKind, points: &[SeriesPoint]) {
        self.push(RenderCall::UpdateSeries(kind, points.to_vec()));
    }

    fn add_plot_band(&mut self, start: u32, end: u32, color: BandColor) {
        self.push(RenderCall::PlotBand(start, end, color));
    }

    fn clear_plot_bands(&mut self) {
        self.push(RenderCall::ClearPlotBands);
    }

    fn show_feedback(&mut self, message: &FeedbackMessage) {
        self.push(RenderCall::Feedback(message.clone()));
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use photosim_feedback::MessageId;

    use super::*;

    #[test]
    fn band_colors() {
        assert_eq!(BandColor::for_day(LightLevel::Full, WaterLevel::On), None);
        assert_eq!(
            BandColor::for_day(LightLevel::Off, WaterLevel::Off),
            Some(BandColor::Dark)
        );
        assert_eq!(
            BandColor::for_day(LightLevel::Full, WaterLevel::Off),
            Some(BandColor::Dry)
        );
        assert_eq!(
            BandColor::for_day(LightLevel::Half, WaterLevel::On),
            Some(BandColor::Dim)
        );
    }

    #[test]
    fn recording_renderer_shares_log_between_clones() {
        let handle = RecordingRenderer::new();
        let mut renderer = handle.clone();
        renderer.add_plot_band(1, 2, BandColor::Dark);
        renderer.show_feedback(&FeedbackMessage::new(MessageId::TryLightOff, 2));

        let calls = handle.calls();
        assert_eq!(calls.len(), 2);
        assert_eq!(calls[0], RenderCall::PlotBand(1, 2, BandColor::Dark));
        assert_eq!(handle.feedback().len(), 1);
        assert!(handle.last_snapshot().is_none());
    }
}
