//! Health Status Types
//!
//! Class code → label → advisory. No logic beyond the lookup.

use serde::{Deserialize, Serialize};

// ============================================================================
// HEALTH STATUS
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum HealthStatus {
    Normal,
    Suspect,
    Pathological,
    /// Class code outside {1, 2, 3}
    Unknown,
}

impl HealthStatus {
    pub fn from_code(code: i64) -> Self {
        match code {
            1 => HealthStatus::Normal,
            2 => HealthStatus::Suspect,
            3 => HealthStatus::Pathological,
            _ => HealthStatus::Unknown,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            HealthStatus::Normal => "Normal",
            HealthStatus::Suspect => "Suspect",
            HealthStatus::Pathological => "Pathological",
            HealthStatus::Unknown => "Unknown",
        }
    }

    pub fn advisory(&self) -> Option<Advisory> {
        let (tier, message) = match self {
            HealthStatus::Normal => (
                AdvisoryTier::Success,
                "The fetal health status is Normal. Continue regular check-ups.",
            ),
            HealthStatus::Suspect => (
                AdvisoryTier::Warning,
                "The fetal health status is Suspect. Please consult your healthcare provider for further evaluation.",
            ),
            HealthStatus::Pathological => (
                AdvisoryTier::Error,
                "The fetal health status is Pathological. Immediate consultation with your healthcare provider is recommended.",
            ),
            HealthStatus::Unknown => return None,
        };
        Some(Advisory { tier, message: message.to_string() })
    }

    pub fn is_mapped(&self) -> bool {
        !matches!(self, HealthStatus::Unknown)
    }
}

impl std::fmt::Display for HealthStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

// ============================================================================
// ADVISORY
// ============================================================================

/// Visual tier of the advisory panel
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AdvisoryTier {
    Success,
    Warning,
    Error,
}

impl AdvisoryTier {
    /// CSS class of the advisory panel
    pub fn as_str(&self) -> &'static str {
        match self {
            AdvisoryTier::Success => "success",
            AdvisoryTier::Warning => "warning",
            AdvisoryTier::Error => "error",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Advisory {
    pub tier: AdvisoryTier,
    pub message: String,
}

// ============================================================================
// TESTS
// ============================================================================
