//! Drill-down navigation stack.
//!
//! The panel is modelled as an ordered stack of frames; the top frame is
//! the current view and an empty stack means the panel is closed. All
//! user-driven navigation mutates the stack through the event methods
//! below, which encode the toggle and replacement rules.

use serde::{Deserialize, Serialize};

use crate::diversity::types::{PeerRecord, ProviderKey};

/// Dimension of a category filter frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FilterDimension {
    Network,
    Direction,
    Country,
    ConnectionType,
    Hosting,
}

/// One level of the drill-down stack.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Frame {
    /// The full provider legend list
    ProviderList,
    /// One provider's detail panel
    ProviderDetail(ProviderKey),
    /// Peers filtered by a category value
    CategoryFilter {
        dimension: FilterDimension,
        value: String,
    },
    /// A single peer's detail panel
    PeerDetail(i64),
}

/// Finite drill-down state: category filter -> provider -> peer.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct NavigationStack {
    frames: Vec<Frame>,
}

impl NavigationStack {
    pub fn new() -> Self {
        Self { frames: Vec::new() }
    }

    pub fn current(&self) -> Option<&Frame> {
        self.frames.last()
    }

    pub fn frames(&self) -> &[Frame] {
        &self.frames
    }

    pub fn depth(&self) -> usize {
        self.frames.len()
    }

    pub fn is_open(&self) -> bool {
        !self.frames.is_empty()
    }

    pub fn push(&mut self, frame: Frame) {
        self.frames.push(frame);
    }

    /// Pops one level; popping the last frame closes the panel.
    pub fn pop(&mut self) -> Option<Frame> {
        self.frames.pop()
    }

    pub fn replace_top(&mut self, frame: Frame) {
        match self.frames.last_mut() {
            Some(top) => *top = frame,
            None => self.frames.push(frame),
        }
    }

    pub fn reset(&mut self) {
        self.frames.clear();
    }

    /// Drops everything above (and including) index `len`.
    pub fn truncate(&mut self, len: usize) {
        self.frames.truncate(len);
    }

    /// The provider whose segment should be expanded: the topmost
    /// provider-detail frame, looking through any peer frame above it.
    pub fn active_provider(&self) -> Option<ProviderKey> {
        self.frames.iter().rev().find_map(|frame| match frame {
            Frame::ProviderDetail(key) => Some(*key),
            _ => None,
        })
    }

    /// Select a provider: toggles the same provider closed, switches an
    /// open provider detail in place, drills down otherwise.
    pub fn select_provider(&mut self, key: ProviderKey) {
        match self.current() {
            Some(Frame::ProviderDetail(current)) if *current == key => {
                self.pop();
            }
            Some(Frame::ProviderDetail(_)) => {
                self.replace_top(Frame::ProviderDetail(key));
            }
            _ => self.push(Frame::ProviderDetail(key)),
        }
    }

    /// Select a peer: a peer detail on top of a peer detail replaces it,
    /// so a peer frame always sits directly under its originating frame.
    pub fn select_peer(&mut self, peer_id: i64) {
        match self.current() {
            Some(Frame::PeerDetail(_)) => self.replace_top(Frame::PeerDetail(peer_id)),
            _ => self.push(Frame::PeerDetail(peer_id)),
        }
    }

    /// Select a category filter: toggles the identical filter closed,
    /// switches an open filter in place, drills down otherwise.
    pub fn select_category(&mut self, dimension: FilterDimension, value: String) {
        match self.current() {
            Some(Frame::CategoryFilter {
                dimension: d,
                value: v,
            }) if *d == dimension && *v == value => {
                self.pop();
            }
            Some(Frame::CategoryFilter { .. }) => {
                self.replace_top(Frame::CategoryFilter { dimension, value });
            }
            _ => self.push(Frame::CategoryFilter { dimension, value }),
        }
    }
}

/// Whether a peer matches a category filter value.
pub fn peer_matches(peer: &PeerRecord, dimension: FilterDimension, value: &str) -> bool {
    match dimension {
        FilterDimension::Network => peer
            .network
            .map(|n| n.to_string() == value)
            .unwrap_or(false),
        FilterDimension::Direction => peer.direction.to_string() == value,
        FilterDimension::Country => peer.country_code == value,
        FilterDimension::ConnectionType => peer.connection_type == value,
        FilterDimension::Hosting => {
            let class = if peer.hosting { "cloud" } else { "residential" };
            class == value
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const AS1: ProviderKey = ProviderKey::Asn(1);
    const AS2: ProviderKey = ProviderKey::Asn(2);

    #[test]
    fn test_pop_on_single_frame_closes() {
        let mut nav = NavigationStack::new();
        nav.push(Frame::ProviderList);
        assert!(nav.is_open());
        nav.pop();
        assert!(!nav.is_open());
        assert_eq!(nav.pop(), None);
        assert!(!nav.is_open());
    }

    #[test]
    fn test_select_same_provider_toggles_closed() {
        let mut nav = NavigationStack::new();
        nav.select_provider(AS1);
        assert_eq!(nav.current(), Some(&Frame::ProviderDetail(AS1)));
        nav.select_provider(AS1);
        assert!(!nav.is_open());
    }

    #[test]
    fn test_select_other_provider_switches_in_place() {
        let mut nav = NavigationStack::new();
        nav.select_provider(AS1);
        nav.select_provider(AS2);
        assert_eq!(nav.depth(), 1);
        assert_eq!(nav.current(), Some(&Frame::ProviderDetail(AS2)));
    }

    #[test]
    fn test_peer_chain_replaces_instead_of_stacking() {
        let mut nav = NavigationStack::new();
        nav.select_provider(AS1);
        nav.select_peer(10);
        nav.select_peer(11);
        nav.select_peer(12);
        assert_eq!(nav.depth(), 2);
        assert_eq!(nav.current(), Some(&Frame::PeerDetail(12)));
        nav.pop();
        assert_eq!(nav.current(), Some(&Frame::ProviderDetail(AS1)));
    }

    #[test]
    fn test_category_toggle_and_switch() {
        let mut nav = NavigationStack::new();
        nav.select_category(FilterDimension::Country, "DE".to_string());
        nav.select_category(FilterDimension::Country, "US".to_string());
        assert_eq!(nav.depth(), 1);
        nav.select_category(FilterDimension::Country, "US".to_string());
        assert!(!nav.is_open());
    }

    #[test]
    fn test_active_provider_sees_through_peer_frame() {
        let mut nav = NavigationStack::new();
        nav.select_category(FilterDimension::Network, "ipv4".to_string());
        nav.select_provider(AS1);
        nav.select_peer(5);
        assert_eq!(nav.active_provider(), Some(AS1));
        nav.reset();
        assert_eq!(nav.active_provider(), None);
    }

    #[test]
    fn test_peer_matches_dimensions() {
        use crate::diversity::types::{Direction, NetworkKind, PeerRecord};
        let peer = PeerRecord {
            id: Some(1),
            network: Some(NetworkKind::Ipv6),
            direction: Direction::Inbound,
            connection_type: "block-relay-only".to_string(),
            country_code: "DE".to_string(),
            hosting: true,
            ..Default::default()
        };
        assert!(peer_matches(&peer, FilterDimension::Network, "ipv6"));
        assert!(!peer_matches(&peer, FilterDimension::Network, "ipv4"));
        assert!(peer_matches(&peer, FilterDimension::Direction, "IN"));
        assert!(peer_matches(&peer, FilterDimension::Country, "DE"));
        assert!(peer_matches(
            &peer,
            FilterDimension::ConnectionType,
            "block-relay-only"
        ));
        assert!(peer_matches(&peer, FilterDimension::Hosting, "cloud"));
        assert!(!peer_matches(&peer, FilterDimension::Hosting, "residential"));
    }
}
