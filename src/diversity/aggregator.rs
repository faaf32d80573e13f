//! Provider aggregation over the raw peer set.
//!
//! Partitions analyzable peers by operator, computes per-provider
//! statistics, ranks deterministically, folds the long tail into a single
//! "Others" bucket and assigns display colors from the fixed palette.

use std::collections::HashMap;

use super::classifier::classify;
use super::types::{
    AsAggregation, Direction, HostingClass, PeerRecord, ProviderAggregate, ProviderIdentity,
    ProviderKey, RiskTier, OTHERS_COLOR, SEGMENT_PALETTE,
};

/// Number of individually displayed providers; the palette reserves one
/// further entry for "Others".
pub const DEFAULT_DISPLAYED_PROVIDERS: usize = 8;

/// Sticky color assignment carried across poll cycles.
pub type ColorMap = HashMap<ProviderKey, String>;

/// Run one aggregation pass over the current peer set.
///
/// `previous_colors` is the displayed assignment from the prior cycle;
/// colors are re-assigned by rank only when the displayed membership
/// changes, so a stable top list keeps stable colors across polls.
pub fn aggregate(
    peers: &[PeerRecord],
    previous_colors: &ColorMap,
    displayed_providers: usize,
) -> AsAggregation {
    let mut malformed_count = 0usize;
    let mut no_as_peers: Vec<i64> = Vec::new();
    let mut partitions: HashMap<u32, (ProviderIdentity, Vec<&PeerRecord>)> = HashMap::new();

    for peer in peers {
        let Some((id, _network)) = peer.base_fields() else {
            malformed_count += 1;
            continue;
        };
        match classify(peer) {
            Some(identity) => {
                partitions
                    .entry(identity.asn)
                    .or_insert_with(|| (identity, Vec::new()))
                    .1
                    .push(peer);
            }
            None => no_as_peers.push(id),
        }
    }

    if malformed_count > 0 {
        log::debug!("Dropped {} malformed peer records", malformed_count);
    }

    let analyzable_count: usize = partitions.values().map(|(_, members)| members.len()).sum();

    let mut operators: Vec<ProviderAggregate> = partitions
        .into_values()
        .map(|(identity, members)| {
            build_aggregate(
                ProviderKey::Asn(identity.asn),
                identity.name,
                identity.short_code,
                &members,
                analyzable_count,
            )
        })
        .collect();

    // Descending by peer count, ties by ASN ascending, for a stable order.
    operators.sort_by(|a, b| {
        b.peer_count
            .cmp(&a.peer_count)
            .then_with(|| operator_asn(a).cmp(&operator_asn(b)))
    });

    let displayed = build_displayed(&operators, peers, analyzable_count, previous_colors, displayed_providers);

    no_as_peers.sort_unstable();

    AsAggregation {
        operators,
        displayed,
        no_as_peers,
        analyzable_count,
        malformed_count,
    }
}

fn operator_asn(aggregate: &ProviderAggregate) -> u32 {
    match aggregate.key {
        ProviderKey::Asn(asn) => asn,
        ProviderKey::Others => u32::MAX,
    }
}

/// Top-N slice plus the folded tail, with colors assigned.
fn build_displayed(
    operators: &[ProviderAggregate],
    peers: &[PeerRecord],
    analyzable_count: usize,
    previous_colors: &ColorMap,
    displayed_providers: usize,
) -> Vec<ProviderAggregate> {
    let mut displayed: Vec<ProviderAggregate> = operators
        .iter()
        .take(displayed_providers)
        .cloned()
        .collect();

    if operators.len() > displayed_providers {
        let folded_keys: Vec<ProviderKey> = operators[displayed_providers..]
            .iter()
            .map(|a| a.key)
            .collect();
        let folded_members: Vec<&PeerRecord> = peers
            .iter()
            .filter(|p| {
                p.base_fields().is_some()
                    && classify(p)
                        .map(|identity| folded_keys.contains(&ProviderKey::Asn(identity.asn)))
                        .unwrap_or(false)
            })
            .collect();

        displayed.push(build_aggregate(
            ProviderKey::Others,
            "Others".to_string(),
            "OTHERS".to_string(),
            &folded_members,
            analyzable_count,
        ));
    }

    assign_colors(&mut displayed, previous_colors);
    displayed
}

/// Assign palette colors in rank order, reusing the previous cycle's
/// assignment while the displayed membership is unchanged.
fn assign_colors(displayed: &mut [ProviderAggregate], previous_colors: &ColorMap) {
    let current_keys: Vec<ProviderKey> = displayed
        .iter()
        .map(|a| a.key)
        .filter(|k| *k != ProviderKey::Others)
        .collect();
    let previous_keys: Vec<&ProviderKey> = previous_colors
        .keys()
        .filter(|k| **k != ProviderKey::Others)
        .collect();

    let membership_unchanged = current_keys.len() == previous_keys.len()
        && current_keys.iter().all(|k| previous_colors.contains_key(k));

    for (rank, aggregate) in displayed.iter_mut().enumerate() {
        if aggregate.key == ProviderKey::Others {
            aggregate.color = Some(OTHERS_COLOR.to_string());
            continue;
        }
        let color = if membership_unchanged {
            previous_colors
                .get(&aggregate.key)
                .cloned()
                .unwrap_or_else(|| SEGMENT_PALETTE[rank % SEGMENT_PALETTE.len()].to_string())
        } else {
            SEGMENT_PALETTE[rank % SEGMENT_PALETTE.len()].to_string()
        };
        aggregate.color = Some(color);
    }
}

/// Compute the statistics block for one partition of peers.
fn build_aggregate(
    key: ProviderKey,
    name: String,
    short_code: String,
    members: &[&PeerRecord],
    analyzable_count: usize,
) -> ProviderAggregate {
    let count = members.len();
    let percentage = if analyzable_count > 0 {
        count as f64 / analyzable_count as f64 * 100.0
    } else {
        0.0
    };

    let inbound = members
        .iter()
        .filter(|p| p.direction == Direction::Inbound)
        .count();
    let hosting_count = members.iter().filter(|p| p.hosting).count();

    let mut connection_types: HashMap<String, usize> = HashMap::new();
    let mut subver_distribution: HashMap<String, usize> = HashMap::new();
    let mut country_distribution: HashMap<String, usize> = HashMap::new();
    let mut service_distribution: HashMap<String, usize> = HashMap::new();

    let mut ping_sum = 0u64;
    let mut sent_sum = 0u64;
    let mut recv_sum = 0u64;
    let mut conntime_sum = 0u64;

    for peer in members {
        if !peer.connection_type.is_empty() {
            *connection_types
                .entry(peer.connection_type.clone())
                .or_insert(0) += 1;
        }
        if !peer.subver.is_empty() {
            *subver_distribution.entry(peer.subver.clone()).or_insert(0) += 1;
        }
        if !peer.country_code.is_empty() {
            *country_distribution
                .entry(peer.country_code.clone())
                .or_insert(0) += 1;
        }
        *service_distribution
            .entry(service_combination(&peer.services))
            .or_insert(0) += 1;

        ping_sum += peer.ping_ms;
        sent_sum += peer.bytessent;
        recv_sum += peer.bytesrecv;
        conntime_sum += peer.conntime_sec;
    }

    let denom = count.max(1) as f64;
    let mut members_sorted: Vec<i64> = members.iter().filter_map(|p| p.id).collect();
    members_sorted.sort_unstable();

    ProviderAggregate {
        key,
        name,
        short_code,
        color: None,
        peer_count: count,
        percentage,
        inbound,
        outbound: count - inbound,
        connection_types,
        avg_ping_ms: ping_sum as f64 / denom,
        avg_bytes_sent: sent_sum as f64 / denom,
        avg_bytes_recv: recv_sum as f64 / denom,
        avg_conn_duration_sec: conntime_sum as f64 / denom,
        subver_distribution,
        country_distribution,
        service_distribution,
        hosting_class: HostingClass::from_fraction(hosting_count as f64 / denom),
        risk_tier: RiskTier::for_percentage(percentage),
        members: members_sorted,
    }
}

/// Canonical key for a service flag combination.
fn service_combination(services: &[String]) -> String {
    if services.is_empty() {
        return "none".to_string();
    }
    let mut flags: Vec<&str> = services.iter().map(String::as_str).collect();
    flags.sort_unstable();
    flags.join("|")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diversity::types::NetworkKind;

    fn peer(id: i64, asn: u32, name: &str) -> PeerRecord {
        PeerRecord {
            id: Some(id),
            network: Some(NetworkKind::Ipv4),
            as_info: format!("AS{} {}", asn, name),
            asname: name.to_uppercase(),
            ..Default::default()
        }
    }

    fn no_as_peer(id: i64) -> PeerRecord {
        PeerRecord {
            id: Some(id),
            network: Some(NetworkKind::Onion),
            geo_status: crate::diversity::types::GeoStatus::Private,
            ..Default::default()
        }
    }

    fn spread(counts: &[(u32, usize)]) -> Vec<PeerRecord> {
        let mut peers = Vec::new();
        let mut next_id = 0i64;
        for &(asn, count) in counts {
            for _ in 0..count {
                peers.push(peer(next_id, asn, &format!("Operator {}", asn)));
                next_id += 1;
            }
        }
        peers
    }

    #[test]
    fn test_percentages_sum_to_hundred() {
        let peers = spread(&[(1, 7), (2, 3)]);
        let agg = aggregate(&peers, &ColorMap::new(), DEFAULT_DISPLAYED_PROVIDERS);
        assert_eq!(agg.analyzable_count, 10);
        let total: f64 = agg.displayed.iter().map(|a| a.percentage).sum();
        assert!((total - 100.0).abs() < 1e-9);
        assert!((agg.displayed[0].percentage - 70.0).abs() < 1e-9);
        assert!((agg.displayed[1].percentage - 30.0).abs() < 1e-9);
    }

    #[test]
    fn test_ranking_is_deterministic_on_ties() {
        let peers = spread(&[(30, 2), (10, 2), (20, 2)]);
        let agg = aggregate(&peers, &ColorMap::new(), DEFAULT_DISPLAYED_PROVIDERS);
        let keys: Vec<ProviderKey> = agg.displayed.iter().map(|a| a.key).collect();
        assert_eq!(
            keys,
            vec![
                ProviderKey::Asn(10),
                ProviderKey::Asn(20),
                ProviderKey::Asn(30)
            ]
        );
    }

    #[test]
    fn test_top_eight_plus_others_folding() {
        // Operators 1..=8 get 10 peers each; 9..=12 get one each.
        let mut counts: Vec<(u32, usize)> = (1..=8).map(|asn| (asn, 10)).collect();
        counts.extend((9..=12).map(|asn| (asn, 1)));
        let peers = spread(&counts);

        let agg = aggregate(&peers, &ColorMap::new(), DEFAULT_DISPLAYED_PROVIDERS);
        assert_eq!(agg.operators.len(), 12);
        assert_eq!(agg.displayed.len(), 9);

        let others = agg.displayed.last().unwrap();
        assert_eq!(others.key, ProviderKey::Others);
        assert_eq!(others.peer_count, 4);
        assert_eq!(others.members.len(), 4);
        assert_eq!(others.color.as_deref(), Some(OTHERS_COLOR));

        let total: f64 = agg.displayed.iter().map(|a| a.percentage).sum();
        assert!((total - 100.0).abs() < 1e-9);
    }

    #[test]
    fn test_colors_follow_rank_initially() {
        let peers = spread(&[(1, 5), (2, 3), (3, 1)]);
        let agg = aggregate(&peers, &ColorMap::new(), DEFAULT_DISPLAYED_PROVIDERS);
        assert_eq!(agg.displayed[0].color.as_deref(), Some(SEGMENT_PALETTE[0]));
        assert_eq!(agg.displayed[1].color.as_deref(), Some(SEGMENT_PALETTE[1]));
        assert_eq!(agg.displayed[2].color.as_deref(), Some(SEGMENT_PALETTE[2]));
    }

    #[test]
    fn test_colors_sticky_across_rank_swap() {
        let first = aggregate(
            &spread(&[(1, 5), (2, 3)]),
            &ColorMap::new(),
            DEFAULT_DISPLAYED_PROVIDERS,
        );
        let colors: ColorMap = first
            .displayed
            .iter()
            .map(|a| (a.key, a.color.clone().unwrap()))
            .collect();

        // Same membership, ranks swapped: each operator keeps its color.
        let second = aggregate(
            &spread(&[(1, 3), (2, 5)]),
            &colors,
            DEFAULT_DISPLAYED_PROVIDERS,
        );
        assert_eq!(second.displayed[0].key, ProviderKey::Asn(2));
        assert_eq!(second.displayed[0].color.as_deref(), Some(SEGMENT_PALETTE[1]));
        assert_eq!(second.displayed[1].color.as_deref(), Some(SEGMENT_PALETTE[0]));
    }

    #[test]
    fn test_colors_reassigned_on_membership_change() {
        let first = aggregate(
            &spread(&[(1, 5), (2, 3)]),
            &ColorMap::new(),
            DEFAULT_DISPLAYED_PROVIDERS,
        );
        let colors: ColorMap = first
            .displayed
            .iter()
            .map(|a| (a.key, a.color.clone().unwrap()))
            .collect();

        // Operator 3 enters the displayed set: assignment reverts to rank order.
        let second = aggregate(
            &spread(&[(2, 5), (3, 4), (1, 3)]),
            &colors,
            DEFAULT_DISPLAYED_PROVIDERS,
        );
        assert_eq!(second.displayed[0].key, ProviderKey::Asn(2));
        assert_eq!(second.displayed[0].color.as_deref(), Some(SEGMENT_PALETTE[0]));
        assert_eq!(second.displayed[1].color.as_deref(), Some(SEGMENT_PALETTE[1]));
        assert_eq!(second.displayed[2].color.as_deref(), Some(SEGMENT_PALETTE[2]));
    }

    #[test]
    fn test_risk_tiers_from_percentage() {
        let peers = spread(&[(1, 60), (2, 25), (3, 10), (4, 5)]);
        let agg = aggregate(&peers, &ColorMap::new(), DEFAULT_DISPLAYED_PROVIDERS);
        assert_eq!(agg.displayed[0].risk_tier, RiskTier::Critical);
        assert_eq!(agg.displayed[1].risk_tier, RiskTier::Moderate);
        assert_eq!(agg.displayed[2].risk_tier, RiskTier::Low);
        assert_eq!(agg.displayed[2].risk_tier.label(), None);
        assert_eq!(agg.displayed[3].risk_tier, RiskTier::Low);
    }

    #[test]
    fn test_no_as_and_malformed_accounting() {
        let mut peers = spread(&[(1, 3)]);
        peers.push(no_as_peer(100));
        peers.push(no_as_peer(101));
        peers.push(PeerRecord {
            id: None,
            network: Some(NetworkKind::Ipv4),
            ..Default::default()
        });
        peers.push(PeerRecord {
            id: Some(200),
            network: None,
            ..Default::default()
        });

        let agg = aggregate(&peers, &ColorMap::new(), DEFAULT_DISPLAYED_PROVIDERS);
        assert_eq!(agg.analyzable_count, 3);
        assert_eq!(agg.no_as_peers, vec![100, 101]);
        assert_eq!(agg.malformed_count, 2);
    }

    #[test]
    fn test_direction_and_hosting_breakdown() {
        let mut peers = Vec::new();
        for id in 0..6 {
            let mut p = peer(id, 1, "Cloudy");
            p.hosting = id < 5;
            p.direction = if id % 2 == 0 {
                Direction::Inbound
            } else {
                Direction::Outbound
            };
            peers.push(p);
        }

        let agg = aggregate(&peers, &ColorMap::new(), DEFAULT_DISPLAYED_PROVIDERS);
        let a = &agg.displayed[0];
        assert_eq!(a.inbound, 3);
        assert_eq!(a.outbound, 3);
        assert_eq!(a.hosting_class, HostingClass::Cloud);
    }

    #[test]
    fn test_distribution_tables() {
        let mut a = peer(1, 1, "Op");
        a.subver = "Satoshi:27.0.0".to_string();
        a.country_code = "DE".to_string();
        a.services = vec!["NETWORK".to_string(), "WITNESS".to_string()];
        a.connection_type = "outbound-full-relay".to_string();
        let mut b = peer(2, 1, "Op");
        b.subver = "Satoshi:27.0.0".to_string();
        b.country_code = "US".to_string();
        b.services = vec!["WITNESS".to_string(), "NETWORK".to_string()];
        b.connection_type = "block-relay-only".to_string();

        let agg = aggregate(&[a, b], &ColorMap::new(), DEFAULT_DISPLAYED_PROVIDERS);
        let provider = &agg.displayed[0];
        assert_eq!(provider.subver_distribution.get("Satoshi:27.0.0"), Some(&2));
        assert_eq!(provider.country_distribution.get("DE"), Some(&1));
        assert_eq!(provider.service_distribution.get("NETWORK|WITNESS"), Some(&2));
        assert_eq!(provider.connection_types.get("outbound-full-relay"), Some(&1));
    }
}
