//! Per-poll reconciliation of fresh data with live view state.
//!
//! Aggregates, score and view model are recomputed wholesale every poll;
//! navigation, animation, pinned tooltip and scroll position belong to the
//! user and are carried forward untouched. The one exception: a frame
//! whose referenced entity vanished from the new data collapses to its
//! nearest valid ancestor, and an expansion whose segment left the display
//! drops to idle. Nothing here is a user-visible error.
//!
//! Invariants:
//! - a frame never survives above a vanished ancestor (the stack is
//!   truncated at the first invalid frame from the bottom);
//! - identical input data with no user events in between reconciles to an
//!   identical state (no drift);
//! - the animation controller is rebased, never restarted, while its
//!   target segment is still on screen.

use crate::diversity::types::{AsAggregation, PeerRecord, ProviderKey};

use super::animation::AnimationController;
use super::nav::{peer_matches, Frame, NavigationStack};

/// What a reconciliation pass had to touch; used for logging and tests.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ReconcileReport {
    pub frames_dropped: usize,
    pub tooltip_cleared: bool,
    pub animation_reset: bool,
}

/// Whether a frame's referenced entity still exists in the new data.
///
/// A provider folded into "Others" still exists; its pre-folding aggregate
/// can render the detail panel. Only full disappearance invalidates it.
pub fn frame_valid(frame: &Frame, aggregation: &AsAggregation, peers: &[PeerRecord]) -> bool {
    match frame {
        Frame::ProviderList => true,
        Frame::ProviderDetail(key) => match key {
            ProviderKey::Asn(_) => aggregation.operator(*key).is_some(),
            ProviderKey::Others => aggregation.segment(ProviderKey::Others).is_some(),
        },
        Frame::CategoryFilter { dimension, value } => peers
            .iter()
            .any(|peer| peer_matches(peer, *dimension, value)),
        Frame::PeerDetail(peer_id) => peers.iter().any(|peer| peer.id == Some(*peer_id)),
    }
}

/// Merge one poll's aggregation into the live view state.
pub fn reconcile(
    nav: &mut NavigationStack,
    animation: &mut AnimationController,
    pinned_tooltip: &mut Option<i64>,
    aggregation: &AsAggregation,
    peers: &[PeerRecord],
) -> ReconcileReport {
    let mut report = ReconcileReport::default();

    // Collapse the stack at the first stale frame.
    let valid_prefix = nav
        .frames()
        .iter()
        .position(|frame| !frame_valid(frame, aggregation, peers));
    if let Some(keep) = valid_prefix {
        report.frames_dropped = nav.depth() - keep;
        log::debug!(
            "Collapsing {} stale navigation frame(s) after refresh",
            report.frames_dropped
        );
        nav.truncate(keep);
    }

    // Re-proportion the donut. The expansion survives only while its
    // segment is displayed and its provider frame survived the collapse.
    let shares = displayed_shares(aggregation);
    let target_alive = animation.target().map_or(true, |key| {
        shares.iter().any(|&(k, _)| k == key) && nav.active_provider() == Some(key)
    });
    if target_alive {
        animation.rebase(shares);
    } else {
        report.animation_reset = true;
        log::debug!("Expanded segment left the display; resetting animation to idle");
        animation.reset(shares);
    }

    if let Some(peer_id) = *pinned_tooltip {
        if !peers.iter().any(|peer| peer.id == Some(peer_id)) {
            *pinned_tooltip = None;
            report.tooltip_cleared = true;
        }
    }

    report
}

/// Displayed segment shares as fractions of the analyzable total.
pub fn displayed_shares(aggregation: &AsAggregation) -> Vec<(ProviderKey, f64)> {
    if aggregation.analyzable_count == 0 {
        return Vec::new();
    }
    let total = aggregation.analyzable_count as f64;
    aggregation
        .displayed
        .iter()
        .map(|a| (a.key, a.peer_count as f64 / total))
        .collect()
}
