//! Render-ready view model.
//!
//! Everything the external renderer needs for one frame: displayed
//! segments, the diversity score, the active navigation frame, the
//! interpolated angle set and the map line targets. The renderer never
//! needs to know animation timing or aggregation internals.

use serde::{Deserialize, Serialize};

use crate::diversity::types::{DiversityScore, HostingClass, ProviderKey, RiskTier};

use super::animation::{AnimationPhase, SegmentAngles};
use super::nav::Frame;

/// Overall presentability of the data set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DataState {
    /// Enough geolocation data has resolved to render normally
    Ready,
    /// Lookups still running; render the loading presentation
    Loading,
    /// No peer has operator data; render the neutral/disabled state
    NoAnalyzableData,
}

/// One displayed donut segment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Segment {
    pub key: ProviderKey,
    pub label: String,
    pub short_code: String,
    pub color: String,
    pub peer_count: usize,
    pub percentage: f64,
    pub risk_tier: RiskTier,
    /// Rendered risk label; suppressed for the low tier
    pub risk_label: Option<String>,
    pub hosting_class: HostingClass,
}

/// Where map connection lines originate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LineOrigin {
    /// The overall donut center
    Center,
    /// A provider's legend entry
    ProviderLegend(ProviderKey),
}

/// Peers that should have a connecting line drawn on the map.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LineTargets {
    pub origin: LineOrigin,
    pub peer_ids: Vec<i64>,
}

/// The complete render contract for one frame.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ViewModel {
    pub segments: Vec<Segment>,
    pub score: DiversityScore,
    pub data_state: DataState,
    /// Current navigation frame; `None` when the panel is closed
    pub active_frame: Option<Frame>,
    pub panel_open: bool,
    pub animation_phase: AnimationPhase,
    pub angles: Vec<SegmentAngles>,
    pub lines: Option<LineTargets>,
    /// Peers without provider affiliation, rendered as plain dots
    pub no_as_peer_ids: Vec<i64>,
    pub analyzable_count: usize,
    pub pinned_tooltip: Option<i64>,
    pub scroll_offset: f32,
    /// Advisory poll period for the external feed, in seconds
    pub refresh_interval_secs: u64,
}

impl ViewModel {
    /// Neutral model rendered before the first poll completes.
    pub fn empty(refresh_interval_secs: u64) -> Self {
        Self {
            segments: Vec::new(),
            score: DiversityScore::NoData,
            data_state: DataState::NoAnalyzableData,
            active_frame: None,
            panel_open: false,
            animation_phase: AnimationPhase::Idle,
            angles: Vec::new(),
            lines: None,
            no_as_peer_ids: Vec::new(),
            analyzable_count: 0,
            pinned_tooltip: None,
            scroll_offset: 0.0,
            refresh_interval_secs,
        }
    }
}
