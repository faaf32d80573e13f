//! Segment expansion animation state machine.
//!
//! Phases: `idle -> animating -> expanded` on selection,
//! `expanded -> reverting -> idle` on deselection, and
//! `expanded -> animating -> expanded` when switching straight to another
//! segment. Transitions interpolate segment angles from their current
//! geometry to the target geometry, so cancelling mid-flight never snaps.
//!
//! The machine is advanced by sampling: every mutating call takes the
//! caller's timestamp, never a real clock, which keeps the whole module
//! testable with synthetic time. A watchdog snaps any transition that
//! outlives a generous multiple of its nominal duration (tab backgrounding,
//! clock anomalies); a stuck `animating` phase would be an invalid state.

use serde::{Deserialize, Serialize};

use crate::diversity::types::ProviderKey;

/// Engine timestamps, in milliseconds. Always supplied by the caller.
pub type TickMs = f64;

const FULL_CIRCLE: f64 = std::f64::consts::TAU;
/// Segments are laid out clockwise from the top of the circle.
const CIRCLE_ORIGIN: f64 = -std::f64::consts::FRAC_PI_2;

/// Animation phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AnimationPhase {
    Idle,
    Animating,
    Expanded,
    Reverting,
}

/// Rendered geometry of one segment, in radians.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SegmentAngles {
    pub key: ProviderKey,
    pub start: f64,
    pub sweep: f64,
}

/// Timing parameters for segment transitions.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AnimationTiming {
    pub duration_ms: f64,
    /// Transitions older than `duration_ms * watchdog_factor` are snapped.
    pub watchdog_factor: f64,
    /// Circle fraction the selected segment occupies when expanded.
    pub expanded_fraction: f64,
}

impl Default for AnimationTiming {
    fn default() -> Self {
        Self {
            duration_ms: 400.0,
            watchdog_factor: 5.0,
            expanded_fraction: 0.6,
        }
    }
}

/// Owns the expansion state machine and the interpolated angle set.
#[derive(Debug, Clone, PartialEq)]
pub struct AnimationController {
    timing: AnimationTiming,
    /// Displayed segment shares (fractions of the analyzable total).
    shares: Vec<(ProviderKey, f64)>,
    phase: AnimationPhase,
    target_key: Option<ProviderKey>,
    started_at: TickMs,
    from: Vec<SegmentAngles>,
    target: Vec<SegmentAngles>,
    current: Vec<SegmentAngles>,
}

impl AnimationController {
    pub fn new(timing: AnimationTiming) -> Self {
        Self {
            timing,
            shares: Vec::new(),
            phase: AnimationPhase::Idle,
            target_key: None,
            started_at: 0.0,
            from: Vec::new(),
            target: Vec::new(),
            current: Vec::new(),
        }
    }

    pub fn phase(&self) -> AnimationPhase {
        self.phase
    }

    pub fn target(&self) -> Option<ProviderKey> {
        self.target_key
    }

    pub fn angles(&self) -> &[SegmentAngles] {
        &self.current
    }

    pub fn is_transitioning(&self) -> bool {
        matches!(
            self.phase,
            AnimationPhase::Animating | AnimationPhase::Reverting
        )
    }

    /// Begin expanding `key`. Switching targets mid-flight restarts the
    /// transition from the current interpolated angles, never from the
    /// last completed geometry.
    pub fn select(&mut self, key: ProviderKey, now: TickMs) {
        if self.target_key == Some(key)
            && matches!(
                self.phase,
                AnimationPhase::Animating | AnimationPhase::Expanded
            )
        {
            return;
        }
        let Some(target) = self.expanded_geometry(key) else {
            // No such segment on screen; nothing to animate.
            return;
        };
        self.from = self.current.clone();
        self.target = target;
        self.target_key = Some(key);
        self.phase = AnimationPhase::Animating;
        self.started_at = now;
        self.assert_invariants();
    }

    /// Begin reverting to the unexpanded layout.
    pub fn deselect(&mut self, now: TickMs) {
        if matches!(self.phase, AnimationPhase::Idle | AnimationPhase::Reverting) {
            return;
        }
        self.from = self.current.clone();
        self.target = self.base_geometry();
        self.phase = AnimationPhase::Reverting;
        self.started_at = now;
        self.assert_invariants();
    }

    /// Advance the interpolation. Returns true when the angle set changed.
    pub fn tick(&mut self, now: TickMs) -> bool {
        if !self.is_transitioning() {
            return false;
        }

        let elapsed = (now - self.started_at).max(0.0);
        if elapsed > self.timing.duration_ms * self.timing.watchdog_factor {
            log::warn!(
                "Segment transition exceeded its deadline ({}ms); snapping to target",
                elapsed
            );
            self.finish();
            return true;
        }

        let t = (elapsed / self.timing.duration_ms).clamp(0.0, 1.0);
        if t >= 1.0 {
            self.finish();
            return true;
        }

        let eased = ease_in_out_cubic(t);
        self.current = interpolate(&self.from, &self.target, eased);
        true
    }

    /// Adopt fresh segment shares without disturbing phase or timing.
    ///
    /// Steady phases snap their geometry to the new proportions; in-flight
    /// transitions retarget and keep interpolating from the current angles.
    pub fn rebase(&mut self, shares: Vec<(ProviderKey, f64)>) {
        self.shares = shares;
        match self.phase {
            AnimationPhase::Idle => {
                let base = self.base_geometry();
                self.from = base.clone();
                self.target = base.clone();
                self.current = base;
            }
            AnimationPhase::Expanded => {
                let key = self
                    .target_key
                    .expect("expanded phase always has a target key");
                match self.expanded_geometry(key) {
                    Some(target) => {
                        self.from = target.clone();
                        self.current = target.clone();
                        self.target = target;
                    }
                    None => self.reset_to_idle(),
                }
            }
            AnimationPhase::Animating => {
                let key = self
                    .target_key
                    .expect("animating phase always has a target key");
                match self.expanded_geometry(key) {
                    Some(target) => {
                        self.from = self.current.clone();
                        self.target = target;
                    }
                    None => self.reset_to_idle(),
                }
            }
            AnimationPhase::Reverting => {
                self.from = self.current.clone();
                self.target = self.base_geometry();
            }
        }
        self.assert_invariants();
    }

    /// Adopt fresh shares and drop straight to the idle layout.
    pub fn reset(&mut self, shares: Vec<(ProviderKey, f64)>) {
        self.shares = shares;
        self.reset_to_idle();
    }

    fn reset_to_idle(&mut self) {
        let base = self.base_geometry();
        self.phase = AnimationPhase::Idle;
        self.target_key = None;
        self.from = base.clone();
        self.target = base.clone();
        self.current = base;
        self.assert_invariants();
    }

    fn finish(&mut self) {
        self.current = self.target.clone();
        self.from = self.target.clone();
        self.phase = match self.phase {
            AnimationPhase::Animating => AnimationPhase::Expanded,
            AnimationPhase::Reverting => {
                self.target_key = None;
                AnimationPhase::Idle
            }
            steady => steady,
        };
        self.assert_invariants();
    }

    /// Proportional layout, every segment sized by its share.
    fn base_geometry(&self) -> Vec<SegmentAngles> {
        let total: f64 = self.shares.iter().map(|(_, share)| share).sum();
        if total <= 0.0 {
            return Vec::new();
        }
        let mut angle = CIRCLE_ORIGIN;
        self.shares
            .iter()
            .map(|&(key, share)| {
                let sweep = share / total * FULL_CIRCLE;
                let segment = SegmentAngles {
                    key,
                    start: angle,
                    sweep,
                };
                angle += sweep;
                segment
            })
            .collect()
    }

    /// Layout with `key` blown up to the configured fraction and the rest
    /// compressed into the remainder, preserving their relative sizes.
    fn expanded_geometry(&self, key: ProviderKey) -> Option<Vec<SegmentAngles>> {
        if !self.shares.iter().any(|&(k, _)| k == key) {
            return None;
        }
        let rest_total: f64 = self
            .shares
            .iter()
            .filter(|&&(k, _)| k != key)
            .map(|(_, share)| share)
            .sum();

        let expanded_sweep = if rest_total <= 0.0 {
            FULL_CIRCLE
        } else {
            self.timing.expanded_fraction * FULL_CIRCLE
        };
        let rest_sweep = FULL_CIRCLE - expanded_sweep;

        let mut angle = CIRCLE_ORIGIN;
        let segments = self
            .shares
            .iter()
            .map(|&(k, share)| {
                let sweep = if k == key {
                    expanded_sweep
                } else {
                    share / rest_total * rest_sweep
                };
                let segment = SegmentAngles {
                    key: k,
                    start: angle,
                    sweep,
                };
                angle += sweep;
                segment
            })
            .collect();
        Some(segments)
    }

    fn assert_invariants(&self) {
        debug_assert!(
            !matches!(
                self.phase,
                AnimationPhase::Animating | AnimationPhase::Expanded
            ) || self.target_key.is_some(),
            "animating/expanded phase requires a target"
        );
        debug_assert!(
            self.phase != AnimationPhase::Idle || self.target_key.is_none(),
            "idle phase must not retain a target"
        );
    }
}

/// Pair up segments by key and interpolate; a segment with no predecessor
/// grows out of its target start angle.
fn interpolate(from: &[SegmentAngles], target: &[SegmentAngles], t: f64) -> Vec<SegmentAngles> {
    target
        .iter()
        .map(|tgt| {
            let origin = from
                .iter()
                .find(|f| f.key == tgt.key)
                .copied()
                .unwrap_or(SegmentAngles {
                    key: tgt.key,
                    start: tgt.start,
                    sweep: 0.0,
                });
            SegmentAngles {
                key: tgt.key,
                start: lerp(origin.start, tgt.start, t),
                sweep: lerp(origin.sweep, tgt.sweep, t),
            }
        })
        .collect()
}

fn lerp(a: f64, b: f64, t: f64) -> f64 {
    a + (b - a) * t
}

fn ease_in_out_cubic(t: f64) -> f64 {
    if t < 0.5 {
        4.0 * t * t * t
    } else {
        1.0 - (-2.0 * t + 2.0).powi(3) / 2.0
    }
}
