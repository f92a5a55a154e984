//! Shared types for TabTimer
//!
//! This crate contains the serializable timer and configuration types that are
//! shared between the timer core (tabtimer-core) and the overlay UI layer.

pub mod formatting;

use serde::{Deserialize, Serialize};

// ─────────────────────────────────────────────────────────────────────────────
// Timer Kind
// ─────────────────────────────────────────────────────────────────────────────

/// The four timer semantics a tab can have.
///
/// Serialized with the short tags used by the persisted tab list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TimerKind {
    /// Counts up from zero, never stops on its own
    #[serde(rename = "stopwatch")]
    Stopwatch,
    /// Counts down and stops at zero
    #[serde(rename = "timer")]
    CountdownTimer,
    /// Remaining seconds until an absolute date, re-derived from the wall clock
    #[serde(rename = "targetDate")]
    TargetDateCountdown,
    /// Counts down, then restarts from its cycle duration after a grace window
    #[serde(rename = "cyclic")]
    CyclicTimer,
}

impl TimerKind {
    pub const ALL: [TimerKind; 4] = [
        TimerKind::Stopwatch,
        TimerKind::CountdownTimer,
        TimerKind::TargetDateCountdown,
        TimerKind::CyclicTimer,
    ];

    /// Persisted tag for this kind
    pub fn tag(&self) -> &'static str {
        match self {
            TimerKind::Stopwatch => "stopwatch",
            TimerKind::CountdownTimer => "timer",
            TimerKind::TargetDateCountdown => "targetDate",
            TimerKind::CyclicTimer => "cyclic",
        }
    }

    /// Parse a kind from its persisted tag or a descriptive alias.
    ///
    /// Matching is case-insensitive; returns `None` for anything unknown.
    pub fn from_tag(tag: &str) -> Option<Self> {
        match tag.trim().to_ascii_lowercase().as_str() {
            "stopwatch" => Some(TimerKind::Stopwatch),
            "timer" | "countdown" | "countdowntimer" => Some(TimerKind::CountdownTimer),
            "targetdate" | "targetdatecountdown" => Some(TimerKind::TargetDateCountdown),
            "cyclic" | "cyclictimer" => Some(TimerKind::CyclicTimer),
            _ => None,
        }
    }
}

impl std::fmt::Display for TimerKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.tag())
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Timer Record
// ─────────────────────────────────────────────────────────────────────────────

/// One timer tab, in its canonical persisted shape.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimerRecord {
    /// Creation timestamp in milliseconds, unique within the collection
    pub id: u64,
    /// User label (may be empty)
    pub name: String,
    #[serde(rename = "type")]
    pub kind: TimerKind,
    /// Seconds: elapsed for stopwatches, remaining for everything else
    pub time: u64,
    pub is_running: bool,
    /// CSS color token, always `rgba(r, g, b, 0.4)` once normalized
    pub background_color: String,
    /// Target instant (ISO 8601), target-date countdowns only
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_date_time: Option<String>,
    /// Seconds restored after each cycle, cyclic timers only
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cycle_duration: Option<u64>,
}

// ─────────────────────────────────────────────────────────────────────────────
// UI Projections
// ─────────────────────────────────────────────────────────────────────────────

/// Which decrement buttons the UI must disable (`true` = disabled).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct DecrementGuards {
    pub seconds: bool,
    pub minutes: bool,
    pub hours: bool,
}

/// Read-only snapshot of a timer for rendering.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimerView {
    pub id: u64,
    pub name: String,
    pub kind: TimerKind,
    pub time: u64,
    /// `H:MM:SS` / `M:SS`
    pub display: String,
    pub is_running: bool,
    pub background_color: String,
    pub decrement: DecrementGuards,
    /// Cyclic timer is at zero and waiting for its automatic restart
    pub reset_pending: bool,
    /// Remaining fraction for cyclic timers (of the cycle) and countdowns
    /// (of the default starting duration)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub progress: Option<f32>,
}

// ─────────────────────────────────────────────────────────────────────────────
// App Config
// ─────────────────────────────────────────────────────────────────────────────

/// Storage key the tab list is persisted under.
pub const DEFAULT_STORAGE_KEY: &str = "tabtimer-tabs";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppConfig {
    /// Period of the tick driver
    #[serde(default = "default_tick_interval_ms")]
    pub tick_interval_ms: u64,
    /// How long a cyclic timer sits at zero before restarting
    #[serde(default = "default_cyclic_reset_grace_secs")]
    pub cyclic_reset_grace_secs: u64,
    #[serde(default = "default_storage_key")]
    pub storage_key: String,
    /// Directory for the tab store (platform data dir when unset)
    #[serde(default)]
    pub storage_dir: Option<String>,
    /// Whether the overlay window ignores mouse input outside the tabs
    #[serde(default = "default_true")]
    pub click_through: bool,
}

fn default_tick_interval_ms() -> u64 {
    1000
}

fn default_cyclic_reset_grace_secs() -> u64 {
    10
}

fn default_storage_key() -> String {
    DEFAULT_STORAGE_KEY.to_string()
}

fn default_true() -> bool {
    true
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            tick_interval_ms: default_tick_interval_ms(),
            cyclic_reset_grace_secs: default_cyclic_reset_grace_secs(),
            storage_key: default_storage_key(),
            storage_dir: None,
            click_through: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kind_tags_round_trip() {
        for kind in TimerKind::ALL {
            assert_eq!(TimerKind::from_tag(kind.tag()), Some(kind));
        }
        assert_eq!(TimerKind::from_tag("CyclicTimer"), Some(TimerKind::CyclicTimer));
        assert_eq!(TimerKind::from_tag("alarm"), None);
    }

    #[test]
    fn record_uses_persisted_field_names() {
        let record = TimerRecord {
            id: 1,
            name: "Tea".to_string(),
            kind: TimerKind::CyclicTimer,
            time: 30,
            is_running: true,
            background_color: "rgba(30, 30, 30, 0.4)".to_string(),
            target_date_time: None,
            cycle_duration: Some(60),
        };
        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["type"], "cyclic");
        assert_eq!(json["isRunning"], true);
        assert_eq!(json["cycleDuration"], 60);
        assert!(json.get("targetDateTime").is_none());
    }

    #[test]
    fn config_fills_missing_fields() {
        let config: AppConfig = serde_json::from_str(r#"{"tick_interval_ms": 500}"#).unwrap();
        assert_eq!(config.tick_interval_ms, 500);
        assert_eq!(config.cyclic_reset_grace_secs, 10);
        assert_eq!(config.storage_key, DEFAULT_STORAGE_KEY);
        assert!(config.click_through);
    }
}
