//! Security policy levels and the static profile behind each one.

use serde::{Deserialize, Serialize};

/// Isolation strictness applied to a sandboxed application.
///
/// All three levels mediate D-Bus; they differ in network, device, and
/// capability exposure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[non_exhaustive]
pub enum Policy {
    /// No network, no devices, every capability dropped.
    Restrictive,
    /// Network allowed, devices denied.
    #[default]
    Standard,
    /// Most access allowed.
    Permissive,
}

/// What a [`Policy`] permits, plus its listing description.
#[derive(Debug, Clone, Copy)]
#[non_exhaustive]
pub struct PolicyInfo {
    /// Whether the sandbox gets network access.
    pub network: bool,
    /// Whether device nodes are exposed.
    pub devices: bool,
    /// Capability drop level recorded for the policy.
    pub caps: CapDrop,
    /// Human-readable summary shown in listings.
    pub description: &'static str,
}

/// How aggressively Linux capabilities are dropped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum CapDrop {
    /// Drop every capability.
    All,
    /// Drop the dangerous subset.
    Dangerous,
    /// Drop only a minimal set.
    Minimal,
}

/// Profile for [`Policy::Restrictive`].
const RESTRICTIVE: PolicyInfo = PolicyInfo {
    network: false,
    devices: false,
    caps: CapDrop::All,
    description: "Ultra-Restrictive (No network, No devices, Smart D-Bus filtering)",
};

/// Profile for [`Policy::Standard`].
const STANDARD: PolicyInfo = PolicyInfo {
    network: true,
    devices: false,
    caps: CapDrop::Dangerous,
    description: "Standard (Network allowed, Smart D-Bus filtering)",
};

/// Profile for [`Policy::Permissive`].
const PERMISSIVE: PolicyInfo = PolicyInfo {
    network: true,
    devices: true,
    caps: CapDrop::Minimal,
    description: "Permissive (Most access allowed, Smart D-Bus filtering)",
};

impl Policy {
    /// Every policy, least to most permissive.
    pub const ALL: [Self; 3] = [Self::Restrictive, Self::Standard, Self::Permissive];

    /// Lowercase policy name, as accepted by [`FromStr`](std::str::FromStr).
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Restrictive => "restrictive",
            Self::Standard => "standard",
            Self::Permissive => "permissive",
        }
    }

    /// Static profile for this policy.
    #[must_use]
    pub const fn info(self) -> &'static PolicyInfo {
        match self {
            Self::Restrictive => &RESTRICTIVE,
            Self::Standard => &STANDARD,
            Self::Permissive => &PERMISSIVE,
        }
    }
}

impl std::fmt::Display for Policy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

impl std::str::FromStr for Policy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "restrictive" => Ok(Self::Restrictive),
            "standard" => Ok(Self::Standard),
            "permissive" => Ok(Self::Permissive),
            _ => Err(format!("unknown policy: {s}")),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn name_round_trips_through_from_str() {
        for policy in Policy::ALL {
            assert_eq!(policy.name().parse::<Policy>().unwrap(), policy);
        }
    }

    #[test]
    fn from_str_is_case_insensitive() {
        assert_eq!("RESTRICTIVE".parse::<Policy>().unwrap(), Policy::Restrictive);
        assert_eq!("Standard".parse::<Policy>().unwrap(), Policy::Standard);
    }

    #[test]
    fn from_str_rejects_unknown_names() {
        assert!("paranoid".parse::<Policy>().is_err());
    }

    #[test]
    fn default_is_standard() {
        assert_eq!(Policy::default(), Policy::Standard);
    }

    #[test]
    fn restrictive_denies_network_and_devices() {
        let info = Policy::Restrictive.info();
        assert!(!info.network);
        assert!(!info.devices);
        assert_eq!(info.caps, CapDrop::All);
    }

    #[test]
    fn permissive_allows_devices() {
        assert!(Policy::Permissive.info().devices);
        assert!(Policy::Standard.info().network);
        assert!(!Policy::Standard.info().devices);
    }

    #[test]
    fn serializes_as_lowercase_string() {
        let json = serde_json::to_string(&Policy::Restrictive).unwrap();
        assert_eq!(json, "\"restrictive\"");
        let back: Policy = serde_json::from_str("\"permissive\"").unwrap();
        assert_eq!(back, Policy::Permissive);
    }
}
