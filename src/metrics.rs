//! Process-wide command counters.
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, MutexGuard, OnceLock};

static COMMANDS_TOTAL: AtomicU64 = AtomicU64::new(0);
static COMMANDS_FAILED: AtomicU64 = AtomicU64::new(0);
static UNKNOWN_COMMANDS: AtomicU64 = AtomicU64::new(0);
static SNAPSHOTS_RESTORED: AtomicU64 = AtomicU64::new(0);

static VERB_COUNTERS: OnceLock<Mutex<HashMap<String, VerbCounter>>> = OnceLock::new();

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct VerbCounter {
    pub attempts: u64,
    pub successes: u64,
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct MetricsSnapshot {
    pub commands_total: u64,
    pub commands_failed: u64,
    pub unknown_commands: u64,
    pub snapshots_restored: u64,
    pub verbs: HashMap<String, VerbCounter>,
}

fn verb_counter_lock() -> MutexGuard<'static, HashMap<String, VerbCounter>> {
    VERB_COUNTERS
        .get_or_init(|| Mutex::new(HashMap::new()))
        .lock()
        .unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// Count one executed command.
pub fn record_command(verb: &str, success: bool) -> VerbCounter {
    COMMANDS_TOTAL.fetch_add(1, Ordering::Relaxed);
    if !success {
        COMMANDS_FAILED.fetch_add(1, Ordering::Relaxed);
    }
    let mut guard = verb_counter_lock();
    let counter = guard.entry(verb.to_string()).or_default();
    counter.attempts = counter.attempts.saturating_add(1);
    if success {
        counter.successes = counter.successes.saturating_add(1);
    }
    *counter
}

pub fn inc_unknown_command() {
    UNKNOWN_COMMANDS.fetch_add(1, Ordering::Relaxed);
}

pub fn inc_snapshot_restored() {
    SNAPSHOTS_RESTORED.fetch_add(1, Ordering::Relaxed);
}

pub fn snapshot() -> MetricsSnapshot {
    MetricsSnapshot {
        commands_total: COMMANDS_TOTAL.load(Ordering::Relaxed),
        commands_failed: COMMANDS_FAILED.load(Ordering::Relaxed),
        unknown_commands: UNKNOWN_COMMANDS.load(Ordering::Relaxed),
        snapshots_restored: SNAPSHOTS_RESTORED.load(Ordering::Relaxed),
        verbs: verb_counter_lock().clone(),
    }
}
