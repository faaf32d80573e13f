//! # Peerscope - Autonomous-System diversity analysis for Bitcoin Core peers
//!
//! This library powers the provider-diversity view of a Bitcoin Core peer
//! dashboard: it groups a periodically refreshed peer list by network
//! operator (Autonomous System), scores how concentrated the node's
//! connections are, and drives the interactive donut/drill-down view whose
//! state must survive background data refreshes without visibly resetting.
//!
//! ## Overview
//!
//! Every poll cycle, the external feed hands the engine a flat list of
//! peer records (already enriched with geolocation and operator data).
//! The engine:
//!
//! - extracts a provider identity per peer (`diversity::classifier`),
//! - aggregates per-operator statistics, folds the long tail into an
//!   "Others" bucket and assigns stable display colors
//!   (`diversity::aggregator`),
//! - computes a 0-10 concentration score from the Herfindahl-Hirschman
//!   index over the true per-operator shares (`diversity::scorer`),
//! - reconciles the fresh data with the live drill-down and animation
//!   state (`view::reconcile`), and
//! - publishes a render-ready view model (`view::model`).
//!
//! User input (selections, back/close, outside clicks, tooltip pinning)
//! mutates the navigation stack and the segment-expansion animation
//! independently of the poll timer; both trigger sources are serialized
//! through one mutable [`engine::DiversityEngine`].
//!
//! ## Architecture
//!
//! - `diversity`: classification, aggregation, scoring and reports
//! - `view`: navigation stack, animation state machine, reconciliation
//!   and the view-model contract
//! - `engine`: the state store tying both together
//! - `config`: YAML-loadable engine tuning
//! - `snapshot`: peer snapshot loading for the report CLI
//! - `utils`: formatting helpers
//!
//! ## Example Usage
//!
//! ```rust,no_run
//! use peerscope::config::EngineConfig;
//! use peerscope::diversity::types::ProviderKey;
//! use peerscope::engine::{DiversityEngine, InputEvent};
//!
//! let mut engine = DiversityEngine::new(EngineConfig::default());
//!
//! // Poll tick: adopt a fresh peer snapshot.
//! let peers = peerscope::snapshot::load_peer_snapshot("peers.json")?;
//! engine.ingest(peers, 0.0);
//!
//! // User input: expand one provider's segment.
//! engine.handle(InputEvent::SelectProvider(ProviderKey::Asn(24940)), 16.0);
//! engine.tick(416.0);
//!
//! let view = engine.view();
//! println!("score: {:?}, segments: {}", view.score, view.segments.len());
//! # Ok::<(), color_eyre::eyre::Error>(())
//! ```
//!
//! ## Error Handling
//!
//! Everything inside the engine is recoverable by design: malformed
//! records are dropped and counted, stale selections collapse to the
//! nearest valid ancestor frame, and stuck animations are snapped by a
//! watchdog. Fallible I/O (config and snapshot loading, report writing)
//! returns `color_eyre::Result` with context.

pub mod config;
pub mod diversity;
pub mod engine;
pub mod snapshot;
pub mod utils;
pub mod view;
