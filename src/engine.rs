//! The live dashboard state store.
//!
//! One `DiversityEngine` owns every piece of mutable view state:
//! navigation stack, animation controller, pinned tooltip, scroll offset,
//! the latest aggregation/score and the render-ready view model. The two
//! trigger sources of the dashboard - the poll timer (`ingest`) and user
//! input (`handle`) - are serialized through `&mut self`, so a refresh
//! always reads the current interaction state, never a stale snapshot.

use crate::config::EngineConfig;
use crate::diversity::aggregator::{aggregate, ColorMap};
use crate::diversity::scorer::score;
use crate::diversity::types::{
    AsAggregation, DiversityScore, GeoStatus, PeerRecord, ProviderKey,
};
use crate::view::animation::{AnimationController, TickMs};
use crate::view::model::{DataState, LineOrigin, LineTargets, Segment, ViewModel};
use crate::view::nav::{peer_matches, FilterDimension, Frame, NavigationStack};
use crate::view::reconcile::reconcile;

/// User input, pointer or keyboard, as delivered by the renderer.
#[derive(Debug, Clone, PartialEq)]
pub enum InputEvent {
    OpenProviderList,
    SelectProvider(ProviderKey),
    SelectPeer(i64),
    SelectCategory {
        dimension: FilterDimension,
        value: String,
    },
    Back,
    Escape,
    Close,
    OutsideClick,
    PinTooltip(i64),
    ClearTooltip,
    Scroll(f32),
}

/// Aggregation, scoring, navigation and animation state for one dashboard.
pub struct DiversityEngine {
    config: EngineConfig,
    peers: Vec<PeerRecord>,
    aggregation: AsAggregation,
    diversity: DiversityScore,
    colors: ColorMap,
    nav: NavigationStack,
    animation: AnimationController,
    pinned_tooltip: Option<i64>,
    scroll_offset: f32,
    view: ViewModel,
}

impl DiversityEngine {
    pub fn new(config: EngineConfig) -> Self {
        let refresh_secs = config.refresh_interval.as_secs();
        let animation = AnimationController::new(config.animation_timing());
        Self {
            config,
            peers: Vec::new(),
            aggregation: AsAggregation::default(),
            diversity: DiversityScore::NoData,
            colors: ColorMap::new(),
            nav: NavigationStack::new(),
            animation,
            pinned_tooltip: None,
            scroll_offset: 0.0,
            view: ViewModel::empty(refresh_secs),
        }
    }

    /// The current render contract.
    pub fn view(&self) -> &ViewModel {
        &self.view
    }

    pub fn aggregation(&self) -> &AsAggregation {
        &self.aggregation
    }

    pub fn diversity(&self) -> DiversityScore {
        self.diversity
    }

    /// Poll tick: adopt a fresh peer set and reconcile it with the live
    /// interaction state.
    pub fn ingest(&mut self, records: Vec<PeerRecord>, _now: TickMs) {
        let aggregation = aggregate(&records, &self.colors, self.config.displayed_providers);
        self.colors = aggregation
            .displayed
            .iter()
            .filter_map(|a| a.color.clone().map(|c| (a.key, c)))
            .collect();
        self.diversity = score(&aggregation);
        self.peers = records;

        reconcile(
            &mut self.nav,
            &mut self.animation,
            &mut self.pinned_tooltip,
            &aggregation,
            &self.peers,
        );
        self.aggregation = aggregation;
        self.rebuild_view();
    }

    /// User input: mutate navigation/animation state and re-render.
    pub fn handle(&mut self, event: InputEvent, now: TickMs) {
        match event {
            InputEvent::OpenProviderList => {
                if self.nav.current() == Some(&Frame::ProviderList) {
                    self.nav.pop();
                } else if !self.nav.is_open() {
                    self.nav.push(Frame::ProviderList);
                }
            }
            InputEvent::SelectProvider(key) => {
                self.nav.select_provider(key);
            }
            InputEvent::SelectPeer(peer_id) => {
                if self.peer_exists(peer_id) {
                    self.nav.select_peer(peer_id);
                }
            }
            InputEvent::SelectCategory { dimension, value } => {
                self.nav.select_category(dimension, value);
            }
            InputEvent::Back | InputEvent::Escape => {
                self.nav.pop();
            }
            InputEvent::Close => {
                self.nav.reset();
                self.pinned_tooltip = None;
            }
            InputEvent::OutsideClick => self.outside_click(),
            InputEvent::PinTooltip(peer_id) => {
                if self.peer_exists(peer_id) {
                    self.pinned_tooltip = Some(peer_id);
                }
            }
            InputEvent::ClearTooltip => {
                self.pinned_tooltip = None;
            }
            InputEvent::Scroll(offset) => {
                self.scroll_offset = offset;
            }
        }
        self.sync_animation(now);
        self.rebuild_view();
    }

    /// Animation frame: advance the interpolation and refresh the angles.
    pub fn tick(&mut self, now: TickMs) {
        if self.animation.tick(now) {
            self.rebuild_view();
        }
    }

    /// First outside click with nesting (or a pinned tooltip) pops one
    /// level and unpins; the next one closes the panel entirely.
    fn outside_click(&mut self) {
        if self.pinned_tooltip.is_some() || self.nav.depth() > 1 {
            self.pinned_tooltip = None;
            if self.nav.depth() > 1 {
                self.nav.pop();
            }
        } else {
            self.nav.reset();
        }
    }

    /// Keep the expansion in lockstep with the navigation stack: the
    /// topmost provider frame with its own segment is the target,
    /// everything else reverts.
    fn sync_animation(&mut self, now: TickMs) {
        let desired = self
            .nav
            .active_provider()
            .filter(|key| self.aggregation.segment(*key).is_some());
        match desired {
            Some(key) => self.animation.select(key, now),
            None => self.animation.deselect(now),
        }
    }

    fn peer_exists(&self, peer_id: i64) -> bool {
        self.peers.iter().any(|peer| peer.id == Some(peer_id))
    }

    fn rebuild_view(&mut self) {
        let segments: Vec<Segment> = self
            .aggregation
            .displayed
            .iter()
            .map(|a| Segment {
                key: a.key,
                label: a.name.clone(),
                short_code: a.short_code.clone(),
                color: a.color.clone().unwrap_or_default(),
                peer_count: a.peer_count,
                percentage: a.percentage,
                risk_tier: a.risk_tier,
                risk_label: a.risk_tier.label().map(String::from),
                hosting_class: a.hosting_class,
            })
            .collect();

        self.view = ViewModel {
            segments,
            score: self.diversity,
            data_state: self.data_state(),
            active_frame: self.nav.current().cloned(),
            panel_open: self.nav.is_open(),
            animation_phase: self.animation.phase(),
            angles: self.animation.angles().to_vec(),
            lines: self.line_targets(),
            no_as_peer_ids: self.aggregation.no_as_peers.clone(),
            analyzable_count: self.aggregation.analyzable_count,
            pinned_tooltip: self.pinned_tooltip,
            scroll_offset: self.scroll_offset,
            refresh_interval_secs: self.config.refresh_interval.as_secs(),
        };
    }

    fn data_state(&self) -> DataState {
        if self.aggregation.analyzable_count == 0 {
            return DataState::NoAnalyzableData;
        }

        let public: Vec<&PeerRecord> = self
            .peers
            .iter()
            .filter(|p| p.base_fields().is_some() && p.geo_status != GeoStatus::Private)
            .collect();
        if public.is_empty() {
            return DataState::Ready;
        }
        let resolved = public
            .iter()
            .filter(|p| p.geo_status != GeoStatus::Pending)
            .count();
        if (resolved as f64 / public.len() as f64) < self.config.geo_ready_fraction {
            DataState::Loading
        } else {
            DataState::Ready
        }
    }

    /// Map connection lines for the current frame.
    fn line_targets(&self) -> Option<LineTargets> {
        match self.nav.current()? {
            Frame::ProviderList => None,
            Frame::ProviderDetail(key) => {
                let provider = self.aggregation.operator(*key)?;
                let origin = if self.aggregation.segment(*key).is_some() {
                    LineOrigin::ProviderLegend(*key)
                } else {
                    LineOrigin::Center
                };
                Some(LineTargets {
                    origin,
                    peer_ids: provider.members.clone(),
                })
            }
            Frame::PeerDetail(peer_id) => {
                let origin = self
                    .aggregation
                    .displayed
                    .iter()
                    .find(|a| a.members.contains(peer_id))
                    .map(|a| LineOrigin::ProviderLegend(a.key))
                    .unwrap_or(LineOrigin::Center);
                Some(LineTargets {
                    origin,
                    peer_ids: vec![*peer_id],
                })
            }
            Frame::CategoryFilter { dimension, value } => {
                let mut peer_ids: Vec<i64> = self
                    .peers
                    .iter()
                    .filter(|p| p.base_fields().is_some() && peer_matches(p, *dimension, value))
                    .filter_map(|p| p.id)
                    .collect();
                peer_ids.sort_unstable();
                Some(LineTargets {
                    origin: LineOrigin::Center,
                    peer_ids,
                })
            }
        }
    }
}
