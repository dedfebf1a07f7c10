// src/services/quota.rs

//! Request quota accounting.

use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicUsize, Ordering};

/// Decrementing budget of remote calls.
///
/// The counter is atomic, so one tracker may be shared by concurrent runs.
#[derive(Debug)]
pub struct QuotaTracker {
    remaining: AtomicUsize,
}

impl QuotaTracker {
    pub fn new(limit: usize) -> Self {
        Self {
            remaining: AtomicUsize::new(limit),
        }
    }

    /// Take one unit. Returns false, leaving the counter untouched, when exhausted.
    pub fn try_consume(&self) -> bool {
        self.remaining
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |n| n.checked_sub(1))
            .is_ok()
    }

    pub fn remaining(&self) -> usize {
        self.remaining.load(Ordering::Acquire)
    }

    pub fn is_exhausted(&self) -> bool {
        self.remaining() == 0
    }
}

/// Default daily quotas keyed by provider identity.
#[derive(Debug, Clone)]
pub struct QuotaTable {
    limits: HashMap<String, usize>,
}

impl QuotaTable {
    /// Built-in defaults: google 200/day, seznam 500/day.
    pub fn builtin() -> Self {
        let limits = [("google", 200), ("seznam", 500)]
            .into_iter()
            .map(|(k, v)| (k.to_string(), v))
            .collect();
        Self { limits }
    }

    /// Built-in defaults overridden by configured entries.
    pub fn with_overrides(overrides: &BTreeMap<String, usize>) -> Self {
        let mut table = Self::builtin();
        for (provider, limit) in overrides {
            table.limits.insert(provider.to_ascii_lowercase(), *limit);
        }
        table
    }

    /// Limit for a provider, or `None` if it is unbounded.
    pub fn limit_for(&self, provider: &str) -> Option<usize> {
        self.limits.get(&provider.to_ascii_lowercase()).copied()
    }

    /// Fresh tracker for a provider with a known limit.
    pub fn tracker_for(&self, provider: &str) -> Option<QuotaTracker> {
        self.limit_for(provider).map(QuotaTracker::new)
    }
}

impl Default for QuotaTable {
    fn default() -> Self {
        Self::builtin()
    }
}
