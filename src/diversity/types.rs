//! Core data types for provider diversity analysis.

use std::collections::HashMap;
use serde::{Deserialize, Serialize};

/// Peer network kind as reported by the node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NetworkKind {
    Ipv4,
    Ipv6,
    Onion,
    I2p,
    Cjdns,
}

impl std::fmt::Display for NetworkKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            NetworkKind::Ipv4 => write!(f, "ipv4"),
            NetworkKind::Ipv6 => write!(f, "ipv6"),
            NetworkKind::Onion => write!(f, "onion"),
            NetworkKind::I2p => write!(f, "i2p"),
            NetworkKind::Cjdns => write!(f, "cjdns"),
        }
    }
}

/// Connection direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Direction {
    /// IN - peer connected to us
    #[serde(rename = "IN")]
    Inbound,
    /// OUT - we connected to peer
    #[serde(rename = "OUT")]
    Outbound,
}

impl Default for Direction {
    fn default() -> Self {
        Direction::Outbound
    }
}

impl std::fmt::Display for Direction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Direction::Inbound => write!(f, "IN"),
            Direction::Outbound => write!(f, "OUT"),
        }
    }
}

/// Resolution status of a peer's geolocation lookup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum GeoStatus {
    /// Lookup completed with usable data
    Ok,
    /// Lookup not yet completed
    #[default]
    Pending,
    /// Private or overlay address, never resolvable
    Private,
    /// Lookup completed but the resolver had no data
    Unavailable,
}

/// One peer connection as delivered by the external feed.
///
/// All fields beyond `id` and `network` are optional on the wire; missing
/// geolocation or operator data is tolerated, not treated as malformed.
/// Records missing `id` or `network` are dropped from aggregation entirely.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct PeerRecord {
    #[serde(default)]
    pub id: Option<i64>,
    #[serde(default)]
    pub network: Option<NetworkKind>,
    #[serde(default)]
    pub direction: Direction,
    #[serde(default)]
    pub connection_type: String,
    #[serde(default)]
    pub subver: String,
    #[serde(default)]
    pub services: Vec<String>,
    #[serde(default)]
    pub ping_ms: u64,
    #[serde(default)]
    pub bytessent: u64,
    #[serde(default)]
    pub bytesrecv: u64,
    /// Connection age in seconds, already resolved by the feed
    #[serde(default)]
    pub conntime_sec: u64,
    #[serde(default)]
    pub country: String,
    #[serde(default, alias = "countryCode")]
    pub country_code: String,
    #[serde(default)]
    pub city: String,
    #[serde(default)]
    pub lat: f64,
    #[serde(default)]
    pub lon: f64,
    #[serde(default, alias = "location_status")]
    pub geo_status: GeoStatus,
    /// Raw operator string in ip-api format, e.g. "AS15169 Google LLC"
    #[serde(default, rename = "as")]
    pub as_info: String,
    /// Short operator code, e.g. "GOOGLE"
    #[serde(default)]
    pub asname: String,
    #[serde(default)]
    pub hosting: bool,
    #[serde(default)]
    pub mobile: bool,
    #[serde(default)]
    pub proxy: bool,
}

impl PeerRecord {
    /// Returns the required base fields, or `None` for a malformed record.
    pub fn base_fields(&self) -> Option<(i64, NetworkKind)> {
        Some((self.id?, self.network?))
    }
}

/// Normalized provider identity extracted from a peer record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderIdentity {
    pub asn: u32,
    pub name: String,
    pub short_code: String,
}

/// Key identifying a displayed aggregate: a concrete operator or the
/// folded long-tail bucket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ProviderKey {
    Asn(u32),
    Others,
}

impl std::fmt::Display for ProviderKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ProviderKey::Asn(asn) => write!(f, "AS{}", asn),
            ProviderKey::Others => write!(f, "Others"),
        }
    }
}

/// Hosting classification derived from member peers' hosting flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HostingClass {
    Residential,
    Cloud,
    Mixed,
}

impl HostingClass {
    /// Majority vote over the fraction of members carrying the hosting flag.
    pub fn from_fraction(hosting_fraction: f64) -> Self {
        if hosting_fraction >= 2.0 / 3.0 {
            HostingClass::Cloud
        } else if hosting_fraction <= 1.0 / 3.0 {
            HostingClass::Residential
        } else {
            HostingClass::Mixed
        }
    }
}

/// Concentration risk tier for a single provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskTier {
    Low,
    Moderate,
    High,
    Critical,
}

impl RiskTier {
    pub fn for_percentage(pct: f64) -> Self {
        if pct < 15.0 {
            RiskTier::Low
        } else if pct < 30.0 {
            RiskTier::Moderate
        } else if pct <= 50.0 {
            RiskTier::High
        } else {
            RiskTier::Critical
        }
    }

    /// Display label; the low tier is never labelled.
    pub fn label(&self) -> Option<&'static str> {
        match self {
            RiskTier::Low => None,
            RiskTier::Moderate => Some("moderate"),
            RiskTier::High => Some("high"),
            RiskTier::Critical => Some("critical"),
        }
    }
}

/// Quality tier for the overall diversity score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScoreTier {
    Critical,
    Poor,
    Moderate,
    Good,
    Excellent,
}

impl ScoreTier {
    pub fn for_score(score: f64) -> Self {
        if score >= 8.0 {
            ScoreTier::Excellent
        } else if score >= 6.0 {
            ScoreTier::Good
        } else if score >= 4.0 {
            ScoreTier::Moderate
        } else if score >= 2.0 {
            ScoreTier::Poor
        } else {
            ScoreTier::Critical
        }
    }
}

impl std::fmt::Display for ScoreTier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            ScoreTier::Critical => "critical",
            ScoreTier::Poor => "poor",
            ScoreTier::Moderate => "moderate",
            ScoreTier::Good => "good",
            ScoreTier::Excellent => "excellent",
        };
        write!(f, "{}", s)
    }
}

/// Overall diversity score, or the no-data sentinel.
///
/// Zero analyzable peers is materially different from a score of 0.0
/// (total concentration) and must render as a neutral state.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum DiversityScore {
    NoData,
    Rated {
        score: f64,
        tier: ScoreTier,
        analyzable_peers: usize,
    },
}

/// Statistics for one provider (or the folded "Others" bucket).
///
/// Value object: recomputed wholesale every poll cycle, never mutated in
/// place across cycles.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProviderAggregate {
    pub key: ProviderKey,
    pub name: String,
    pub short_code: String,
    /// Display color, assigned only on the displayed list
    pub color: Option<String>,
    pub peer_count: usize,
    /// Percentage of analyzable peers, 0-100
    pub percentage: f64,
    pub inbound: usize,
    pub outbound: usize,
    pub connection_types: HashMap<String, usize>,
    pub avg_ping_ms: f64,
    pub avg_bytes_sent: f64,
    pub avg_bytes_recv: f64,
    pub avg_conn_duration_sec: f64,
    pub subver_distribution: HashMap<String, usize>,
    pub country_distribution: HashMap<String, usize>,
    /// Service-flag combinations, keyed by the sorted flag set
    pub service_distribution: HashMap<String, usize>,
    pub hosting_class: HostingClass,
    pub risk_tier: RiskTier,
    pub members: Vec<i64>,
}

/// Full output of one aggregation pass.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct AsAggregation {
    /// Every operator with at least one analyzable peer, ranked by peer
    /// count descending (ties by ASN ascending). Colors unassigned.
    pub operators: Vec<ProviderAggregate>,
    /// The rendered segments: top operators plus "Others", colors assigned.
    pub displayed: Vec<ProviderAggregate>,
    /// Peers with no operator data, shown as plain dots.
    pub no_as_peers: Vec<i64>,
    pub analyzable_count: usize,
    pub malformed_count: usize,
}

impl AsAggregation {
    /// Looks up a provider's pre-folding aggregate by key.
    pub fn operator(&self, key: ProviderKey) -> Option<&ProviderAggregate> {
        match key {
            ProviderKey::Asn(_) => self.operators.iter().find(|a| a.key == key),
            ProviderKey::Others => self.displayed.iter().find(|a| a.key == key),
        }
    }

    /// Looks up a displayed segment by key.
    pub fn segment(&self, key: ProviderKey) -> Option<&ProviderAggregate> {
        self.displayed.iter().find(|a| a.key == key)
    }
}

/// Fixed segment palette; the ninth entry belongs to "Others".
pub const SEGMENT_PALETTE: [&str; 9] = [
    "#f7931a", "#3b82f6", "#22c55e", "#ef4444", "#a855f7", "#14b8a6", "#ec4899", "#eab308",
    "#64748b",
];

/// Palette entry reserved for the folded bucket.
pub const OTHERS_COLOR: &str = SEGMENT_PALETTE[8];
