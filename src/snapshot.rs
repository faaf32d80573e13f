//! Peer snapshot loading for the report CLI.
//!
//! A snapshot is the JSON array a dashboard feed exposes as its peer list.
//! Records are parsed individually so one malformed entry is dropped with
//! a warning instead of failing the whole file.

use std::fs;
use std::path::Path;

use color_eyre::eyre::{Context, Result};

use crate::diversity::types::PeerRecord;

/// Load a peer snapshot from a JSON file.
pub fn load_peer_snapshot<P: AsRef<Path>>(path: P) -> Result<Vec<PeerRecord>> {
    let path = path.as_ref();
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read peer snapshot: {}", path.display()))?;

    let values: Vec<serde_json::Value> = serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse peer snapshot: {}", path.display()))?;

    let total = values.len();
    let peers: Vec<PeerRecord> = values
        .into_iter()
        .filter_map(|value| match serde_json::from_value(value) {
            Ok(peer) => Some(peer),
            Err(e) => {
                log::warn!("Skipping unparseable peer record: {}", e);
                None
            }
        })
        .collect();

    log::info!(
        "Loaded {} of {} peer records from {}",
        peers.len(),
        total,
        path.display()
    );
    Ok(peers)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diversity::types::{Direction, GeoStatus, NetworkKind};
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_load_snapshot_with_wire_field_names() {
        let mut file = NamedTempFile::new().unwrap();
        write!(
            file,
            r#"[
                {{
                    "id": 7,
                    "network": "ipv4",
                    "direction": "IN",
                    "connection_type": "inbound",
                    "subver": "Satoshi:27.0.0",
                    "ping_ms": 42,
                    "countryCode": "DE",
                    "location_status": "ok",
                    "as": "AS24940 Hetzner Online GmbH",
                    "asname": "HETZNER-AS",
                    "hosting": true
                }},
                {{
                    "id": 8,
                    "network": "onion",
                    "location_status": "private"
                }}
            ]"#
        )
        .unwrap();

        let peers = load_peer_snapshot(file.path()).unwrap();
        assert_eq!(peers.len(), 2);

        let first = &peers[0];
        assert_eq!(first.id, Some(7));
        assert_eq!(first.network, Some(NetworkKind::Ipv4));
        assert_eq!(first.direction, Direction::Inbound);
        assert_eq!(first.country_code, "DE");
        assert_eq!(first.geo_status, GeoStatus::Ok);
        assert_eq!(first.as_info, "AS24940 Hetzner Online GmbH");
        assert!(first.hosting);

        let second = &peers[1];
        assert_eq!(second.network, Some(NetworkKind::Onion));
        assert_eq!(second.geo_status, GeoStatus::Private);
        assert_eq!(second.as_info, "");
    }

    #[test]
    fn test_bad_record_is_dropped_not_fatal() {
        let mut file = NamedTempFile::new().unwrap();
        write!(
            file,
            r#"[
                {{"id": 1, "network": "ipv4"}},
                {{"id": "not-a-number", "network": "ipv4"}},
                {{"id": 3, "network": "ipv6"}}
            ]"#
        )
        .unwrap();

        let peers = load_peer_snapshot(file.path()).unwrap();
        assert_eq!(peers.len(), 2);
        assert_eq!(peers[0].id, Some(1));
        assert_eq!(peers[1].id, Some(3));
    }

    #[test]
    fn test_missing_file_is_an_error() {
        assert!(load_peer_snapshot("/nonexistent/peers.json").is_err());
    }
}
