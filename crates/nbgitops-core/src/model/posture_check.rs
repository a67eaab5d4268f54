// ── Posture check domain type ──

use nbgitops_api::types::PostureCheckSet;
use serde::Deserialize;

/// The structured check set; shared with the wire format.
pub type PostureChecks = PostureCheckSet;

/// A posture check. Natural key: `name`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct PostureCheck {
    #[serde(skip)]
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub checks: PostureChecks,
}

impl PostureCheck {
    /// Structural equality ignoring `id` and the order of list-valued checks.
    pub fn matches(&self, other: &PostureCheck) -> bool {
        self.name == other.name
            && self.description == other.description
            && normalized(&self.checks) == normalized(&other.checks)
    }
}

/// Copy of `checks` with every list sorted so comparisons ignore order.
fn normalized(checks: &PostureChecks) -> PostureChecks {
    let mut out = checks.clone();
    if let Some(geo) = out.geo_location_check.as_mut() {
        geo.locations.sort();
    }
    if let Some(range) = out.peer_network_range_check.as_mut() {
        range.ranges.sort();
    }
    if let Some(process) = out.process_check.as_mut() {
        process.processes.sort();
    }
    out
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    const YAML: &str = r"
name: corp-devices
description: managed laptops
checks:
  nb_version_check:
    min_version: 0.28.0
  geo_location_check:
    action: allow
    locations:
      - country_code: DE
        city_name: Berlin
      - country_code: US
  peer_network_range_check:
    ranges: [10.0.0.0/8, 192.168.0.0/16]
";

    #[test]
    fn parses_nested_checks() {
        let pc: PostureCheck = serde_yaml::from_str(YAML).unwrap();
        assert_eq!(
            pc.checks.nb_version_check.as_ref().unwrap().min_version,
            "0.28.0"
        );
        assert!(pc.checks.os_version_check.is_none());
        let range = pc.checks.peer_network_range_check.as_ref().unwrap();
        assert_eq!(range.action, "allow");
    }

    #[test]
    fn list_order_is_ignored() {
        let a: PostureCheck = serde_yaml::from_str(YAML).unwrap();
        let mut b = a.clone();
        b.checks
            .geo_location_check
            .as_mut()
            .unwrap()
            .locations
            .reverse();
        b.checks
            .peer_network_range_check
            .as_mut()
            .unwrap()
            .ranges
            .reverse();
        assert!(a.matches(&b));
    }

    #[test]
    fn changed_version_differs() {
        let a: PostureCheck = serde_yaml::from_str(YAML).unwrap();
        let mut b = a.clone();
        b.checks.nb_version_check.as_mut().unwrap().min_version = "0.29.0".into();
        assert!(!a.matches(&b));
    }
}
