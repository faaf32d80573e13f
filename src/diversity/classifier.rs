//! Provider identity extraction from raw peer records.
//!
//! The upstream geolocation resolver reports the operator as a loosely
//! formatted string ("AS15169 Google LLC") plus a short code ("GOOGLE").
//! Extraction is an explicit parse with a defined failure mode, not an
//! implicit cast: anything non-conforming yields `None` and the peer is
//! treated as a private-network ("no-AS") peer.

use std::sync::LazyLock;

use regex::Regex;

use super::types::{PeerRecord, ProviderIdentity};

/// Match: "AS<number>" optionally followed by the operator name
static AS_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^AS(\d+)(?:\s+(.+))?$").expect("Invalid AS pattern regex")
});

/// Extract a normalized provider identity from one peer record.
///
/// Returns `None` when the record carries no parseable operator data.
pub fn classify(peer: &PeerRecord) -> Option<ProviderIdentity> {
    let raw = peer.as_info.trim();
    if raw.is_empty() {
        return None;
    }

    let caps = AS_PATTERN.captures(raw)?;
    let asn: u32 = caps.get(1)?.as_str().parse().ok()?;

    let name = caps
        .get(2)
        .map(|m| m.as_str().trim().to_string())
        .filter(|n| !n.is_empty())
        .or_else(|| {
            let code = peer.asname.trim();
            (!code.is_empty()).then(|| code.to_string())
        })
        .unwrap_or_else(|| format!("AS{}", asn));

    let short_code = {
        let code = peer.asname.trim();
        if code.is_empty() {
            name.clone()
        } else {
            code.to_string()
        }
    };

    Some(ProviderIdentity {
        asn,
        name,
        short_code,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diversity::types::{Direction, NetworkKind};

    fn peer_with_as(as_info: &str, asname: &str) -> PeerRecord {
        PeerRecord {
            id: Some(1),
            network: Some(NetworkKind::Ipv4),
            direction: Direction::Outbound,
            as_info: as_info.to_string(),
            asname: asname.to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn test_classify_full_operator_string() {
        let peer = peer_with_as("AS15169 Google LLC", "GOOGLE");
        let identity = classify(&peer).unwrap();
        assert_eq!(identity.asn, 15169);
        assert_eq!(identity.name, "Google LLC");
        assert_eq!(identity.short_code, "GOOGLE");
    }

    #[test]
    fn test_classify_number_only_falls_back_to_asname() {
        let peer = peer_with_as("AS24940", "HETZNER-AS");
        let identity = classify(&peer).unwrap();
        assert_eq!(identity.asn, 24940);
        assert_eq!(identity.name, "HETZNER-AS");
        assert_eq!(identity.short_code, "HETZNER-AS");
    }

    #[test]
    fn test_classify_number_only_no_asname() {
        let peer = peer_with_as("AS24940", "");
        let identity = classify(&peer).unwrap();
        assert_eq!(identity.name, "AS24940");
        assert_eq!(identity.short_code, "AS24940");
    }

    #[test]
    fn test_classify_missing_short_code_uses_name() {
        let peer = peer_with_as("AS701 Verizon Business", "");
        let identity = classify(&peer).unwrap();
        assert_eq!(identity.short_code, "Verizon Business");
    }

    #[test]
    fn test_classify_rejects_empty_and_malformed() {
        assert!(classify(&peer_with_as("", "GOOGLE")).is_none());
        assert!(classify(&peer_with_as("   ", "")).is_none());
        assert!(classify(&peer_with_as("Google LLC", "GOOGLE")).is_none());
        assert!(classify(&peer_with_as("ASxyz Google", "GOOGLE")).is_none());
        assert!(classify(&peer_with_as("15169 Google", "GOOGLE")).is_none());
    }

    #[test]
    fn test_classify_trims_whitespace() {
        let peer = peer_with_as("  AS15169 Google LLC  ", " GOOGLE ");
        let identity = classify(&peer).unwrap();
        assert_eq!(identity.asn, 15169);
        assert_eq!(identity.short_code, "GOOGLE");
    }
}
