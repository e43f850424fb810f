//! Bulk cap calculation
//!
//! Derives a proposed add-on cap for heavy users from their historical usage.
//! Pure and order-preserving.

use serde::{Deserialize, Serialize};

use crate::config::CapDefaults;

/// Historical usage of one user
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UsageRow {
    pub email: String,
    pub credits_used: i64,
}

impl UsageRow {
    pub fn new(email: impl Into<String>, credits_used: i64) -> Self {
        Self {
            email: email.into(),
            credits_used,
        }
    }
}

/// Parameters of the cap rule
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CapPolicy {
    pub base_credits: i64,
    pub threshold: i64,
    pub buffer: i64,
    /// Raise negative proposals to zero instead of passing them through
    pub clamp_negative: bool,
}

impl CapPolicy {
    pub fn new(base_credits: i64, threshold: i64, buffer: i64) -> Self {
        Self {
            base_credits,
            threshold,
            buffer,
            clamp_negative: false,
        }
    }

    pub fn clamped(mut self, clamp: bool) -> Self {
        self.clamp_negative = clamp;
        self
    }
}

impl From<&CapDefaults> for CapPolicy {
    fn from(defaults: &CapDefaults) -> Self {
        Self {
            base_credits: defaults.base_credits,
            threshold: defaults.threshold,
            buffer: defaults.buffer,
            clamp_negative: defaults.clamp_negative_caps,
        }
    }
}

/// A selected row annotated with its proposed cap
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProposedCap {
    pub email: String,
    pub credits_used: i64,
    pub addon_used: i64,
    pub proposed_cap: i64,
    pub total_available: i64,
}

impl ProposedCap {
    /// The cap would sit below zero add-on credits
    pub fn is_negative(&self) -> bool {
        self.proposed_cap < 0
    }
}

/// Propose caps for every row whose usage exceeds the threshold
///
/// `proposed_cap = (credits_used - base_credits) + buffer` and
/// `total_available = base_credits + proposed_cap`. Negative caps are kept
/// unless the policy clamps them. Arithmetic saturates at the `i64` bounds.
pub fn propose_caps(rows: &[UsageRow], policy: &CapPolicy) -> Vec<ProposedCap> {
    rows.iter()
        .filter(|row| row.credits_used > policy.threshold)
        .map(|row| {
            let addon_used = row.credits_used.saturating_sub(policy.base_credits);
            let mut proposed_cap = addon_used.saturating_add(policy.buffer);
            if policy.clamp_negative && proposed_cap < 0 {
                proposed_cap = 0;
            }
            ProposedCap {
                email: row.email.clone(),
                credits_used: row.credits_used,
                addon_used,
                proposed_cap,
                total_available: policy.base_credits.saturating_add(proposed_cap),
            }
        })
        .collect()
}
