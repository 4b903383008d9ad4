//! Slot configuration: per-task priority, stack size and period.
//!
//! A [`Config`] holds one [`TaskSpec`] for each of the six slots, grouped by
//! core.  It is plain data: the manager copies it when tasks are started and
//! never validates it.
//!
//! A configuration can also be read from YAML.  Every field is optional and
//! falls back to the default for its slot:
//! ```yaml
//! stack_size: 4096          # applied to all six slots first
//! core0:
//!   high:
//!     priority: 5
//!     period_ms: 10
//! core1:
//!   low:
//!     stack_size: 16384
//!     period_ms: 0          # yield instead of sleeping
//! ```

use std::path::Path;

use anyhow::{Context, Result};
use serde::Deserialize;
use tracing::{debug, info};

use crate::task::{Core, Slot, Tier};

// ── Constants ─────────────────────────────────────────────────────────────────

/// Default period between two hook invocations, in milliseconds.
pub const DEFAULT_PERIOD_MS: u32 = 1;

/// Stack size used when the build does not provide a platform value.
pub const FALLBACK_STACK_SIZE: u32 = 8192;

/// Default task stack size in bytes.
///
/// Taken from the `AUTOTASK_LOOP_STACK_SIZE` environment variable at build
/// time (the platform's loop-task stack size), or [`FALLBACK_STACK_SIZE`] when
/// the variable is unset or not a decimal number.
pub const DEFAULT_STACK_SIZE: u32 = match option_env!("AUTOTASK_LOOP_STACK_SIZE") {
    Some(v) => parse_stack_size(v),
    None => FALLBACK_STACK_SIZE,
};

pub const DEFAULT_PRIORITY_LOW: u32 = 1;
pub const DEFAULT_PRIORITY_NORMAL: u32 = 3;
pub const DEFAULT_PRIORITY_HIGH: u32 = 4;

const fn parse_stack_size(s: &str) -> u32 {
    let bytes = s.as_bytes();
    if bytes.is_empty() {
        return FALLBACK_STACK_SIZE;
    }
    let mut value: u32 = 0;
    let mut i = 0;
    while i < bytes.len() {
        let b = bytes[i];
        if !b.is_ascii_digit() {
            return FALLBACK_STACK_SIZE;
        }
        value = match value.checked_mul(10) {
            Some(v) => match v.checked_add((b - b'0') as u32) {
                Some(v) => v,
                None => return FALLBACK_STACK_SIZE,
            },
            None => return FALLBACK_STACK_SIZE,
        };
        i += 1;
    }
    value
}

// ── TaskSpec / CoreSpec / Config ──────────────────────────────────────────────

/// Scheduling parameters of one slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TaskSpec {
    /// Scheduler priority.
    pub priority: u32,
    /// Stack size in bytes.
    pub stack_size: u32,
    /// Period in milliseconds; `0` means "yield, don't sleep".
    pub period_ms: u32,
}

impl TaskSpec {
    /// Default spec for a tier: tier priority, [`DEFAULT_STACK_SIZE`],
    /// [`DEFAULT_PERIOD_MS`].
    pub fn default_for(tier: Tier) -> Self {
        let priority = match tier {
            Tier::Low => DEFAULT_PRIORITY_LOW,
            Tier::Normal => DEFAULT_PRIORITY_NORMAL,
            Tier::High => DEFAULT_PRIORITY_HIGH,
        };
        TaskSpec {
            priority,
            stack_size: DEFAULT_STACK_SIZE,
            period_ms: DEFAULT_PERIOD_MS,
        }
    }
}

/// The three tiers scheduled on one core.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CoreSpec {
    pub low: TaskSpec,
    pub normal: TaskSpec,
    pub high: TaskSpec,
}

impl CoreSpec {
    pub fn get(&self, tier: Tier) -> &TaskSpec {
        match tier {
            Tier::Low => &self.low,
            Tier::Normal => &self.normal,
            Tier::High => &self.high,
        }
    }

    pub fn get_mut(&mut self, tier: Tier) -> &mut TaskSpec {
        match tier {
            Tier::Low => &mut self.low,
            Tier::Normal => &mut self.normal,
            Tier::High => &mut self.high,
        }
    }
}

impl Default for CoreSpec {
    fn default() -> Self {
        CoreSpec {
            low: TaskSpec::default_for(Tier::Low),
            normal: TaskSpec::default_for(Tier::Normal),
            high: TaskSpec::default_for(Tier::High),
        }
    }
}

/// Full six-slot configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Config {
    pub core0: CoreSpec,
    pub core1: CoreSpec,
}

impl Config {
    /// Defaults everywhere except the stack size, which is `stack_size` for
    /// all six slots.
    pub fn with_stack_size(stack_size: u32) -> Self {
        let mut cfg = Config::default();
        for slot in Slot::ALL {
            cfg.get_mut(slot).stack_size = stack_size;
        }
        cfg
    }

    pub fn core(&self, core: Core) -> &CoreSpec {
        match core {
            Core::Core0 => &self.core0,
            Core::Core1 => &self.core1,
        }
    }

    pub fn core_mut(&mut self, core: Core) -> &mut CoreSpec {
        match core {
            Core::Core0 => &mut self.core0,
            Core::Core1 => &mut self.core1,
        }
    }

    /// Spec of one slot.
    pub fn get(&self, slot: Slot) -> &TaskSpec {
        self.core(slot.core).get(slot.tier)
    }

    pub fn get_mut(&mut self, slot: Slot) -> &mut TaskSpec {
        self.core_mut(slot.core).get_mut(slot.tier)
    }

    /// Parses the YAML file at `path` and merges it onto [`Config::default`].
    ///
    /// # Errors
    /// Returns an error if the file cannot be opened or if the YAML is
    /// structurally invalid.
    pub fn load_from_file(path: &Path) -> Result<Config> {
        info!("Loading task configuration from: {}", path.display());

        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Cannot open configuration file: {}", path.display()))?;

        Config::from_yaml_str(&content)
            .with_context(|| format!("Failed to parse YAML file: {}", path.display()))
    }

    /// Same as [`Config::load_from_file`] for an in-memory document.
    pub fn from_yaml_str(content: &str) -> Result<Config> {
        // An empty document deserialises to `null`, which means "all defaults".
        let file: Option<ConfigFile> = serde_yaml::from_str(content)?;
        let cfg = file.map(ConfigFile::into_config).unwrap_or_default();

        for slot in Slot::ALL {
            let spec = cfg.get(slot);
            debug!(
                slot = %slot,
                priority = spec.priority,
                stack_size = spec.stack_size,
                period_ms = spec.period_ms,
                "slot configured"
            );
        }
        Ok(cfg)
    }
}

// ── Private YAML deserialization types ────────────────────────────────────────

/// Top-level wrapper that maps directly onto the YAML file layout.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct ConfigFile {
    /// Stack size for every slot, applied before per-slot values.
    stack_size: Option<u32>,
    #[serde(default)]
    core0: CoreEntry,
    #[serde(default)]
    core1: CoreEntry,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct CoreEntry {
    #[serde(default)]
    low: TaskEntry,
    #[serde(default)]
    normal: TaskEntry,
    #[serde(default)]
    high: TaskEntry,
}

impl CoreEntry {
    fn get(&self, tier: Tier) -> &TaskEntry {
        match tier {
            Tier::Low => &self.low,
            Tier::Normal => &self.normal,
            Tier::High => &self.high,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct TaskEntry {
    priority: Option<u32>,
    stack_size: Option<u32>,
    period_ms: Option<u32>,
}

impl ConfigFile {
    fn into_config(self) -> Config {
        let mut cfg = match self.stack_size {
            Some(bytes) => Config::with_stack_size(bytes),
            None => Config::default(),
        };

        for slot in Slot::ALL {
            let entry = match slot.core {
                Core::Core0 => self.core0.get(slot.tier),
                Core::Core1 => self.core1.get(slot.tier),
            };
            let spec = cfg.get_mut(slot);
            if let Some(p) = entry.priority {
                spec.priority = p;
            }
            if let Some(s) = entry.stack_size {
                spec.stack_size = s;
            }
            if let Some(ms) = entry.period_ms {
                spec.period_ms = ms;
            }
        }
        cfg
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    /// Helper: write a YAML string to a temp file and return it.
    fn yaml_tempfile(content: &str) -> NamedTempFile {
        let mut f = NamedTempFile::new().unwrap();
        f.write_all(content.as_bytes()).unwrap();
        f
    }

    // ── Defaults ──────────────────────────────────────────────────────────────

    #[test]
    fn default_config_has_tier_priorities_on_both_cores() {
        let cfg = Config::default();
        for core in Core::ALL {
            let c = cfg.core(core);
            assert_eq!(c.low.priority, 1);
            assert_eq!(c.normal.priority, 3);
            assert_eq!(c.high.priority, 4);
        }
    }

    #[test]
    fn default_config_uses_default_stack_and_one_ms_period() {
        let cfg = Config::default();
        for slot in Slot::ALL {
            assert_eq!(cfg.get(slot).stack_size, DEFAULT_STACK_SIZE, "{slot}");
            assert_eq!(cfg.get(slot).period_ms, 1, "{slot}");
        }
    }

    #[test]
    fn with_stack_size_only_touches_stack_size() {
        let cfg = Config::with_stack_size(4096);
        let defaults = Config::default();
        for slot in Slot::ALL {
            assert_eq!(cfg.get(slot).stack_size, 4096);
            assert_eq!(cfg.get(slot).priority, defaults.get(slot).priority);
            assert_eq!(cfg.get(slot).period_ms, defaults.get(slot).period_ms);
        }
    }

    #[test]
    fn get_mut_changes_exactly_one_slot() {
        let mut cfg = Config::default();
        cfg.get_mut(Slot::CORE1_NORMAL).period_ms = 250;
        for slot in Slot::ALL {
            let expected = if slot == Slot::CORE1_NORMAL { 250 } else { 1 };
            assert_eq!(cfg.get(slot).period_ms, expected, "{slot}");
        }
    }

    #[test]
    fn parse_stack_size_accepts_decimal_and_falls_back_otherwise() {
        assert_eq!(parse_stack_size("16384"), 16384);
        assert_eq!(parse_stack_size(""), FALLBACK_STACK_SIZE);
        assert_eq!(parse_stack_size("0x2000"), FALLBACK_STACK_SIZE);
        assert_eq!(parse_stack_size("99999999999"), FALLBACK_STACK_SIZE);
    }

    // ── YAML loading ──────────────────────────────────────────────────────────

    #[test]
    fn load_full_yaml() {
        let yaml = r#"
core0:
  low:    { priority: 2, stack_size: 2048, period_ms: 100 }
  normal: { priority: 6, stack_size: 4096, period_ms: 10 }
  high:   { priority: 9, stack_size: 8192, period_ms: 0 }
core1:
  low:    { priority: 1, stack_size: 1024, period_ms: 1000 }
  normal: { priority: 3, stack_size: 1024, period_ms: 5 }
  high:   { priority: 4, stack_size: 1024, period_ms: 1 }
"#;
        let f = yaml_tempfile(yaml);
        let cfg = Config::load_from_file(f.path()).unwrap();

        assert_eq!(
            *cfg.get(Slot::CORE0_HIGH),
            TaskSpec {
                priority: 9,
                stack_size: 8192,
                period_ms: 0
            }
        );
        assert_eq!(cfg.get(Slot::CORE0_LOW).period_ms, 100);
        assert_eq!(cfg.get(Slot::CORE1_LOW).stack_size, 1024);
        assert_eq!(cfg.get(Slot::CORE1_NORMAL).period_ms, 5);
    }

    #[test]
    fn partial_yaml_merges_onto_defaults() {
        let yaml = r#"
core0:
  high:
    period_ms: 20
"#;
        let cfg = Config::from_yaml_str(yaml).unwrap();
        let mut expected = Config::default();
        expected.core0.high.period_ms = 20;
        assert_eq!(cfg, expected);
    }

    #[test]
    fn top_level_stack_size_applies_before_slot_overrides() {
        let yaml = r#"
stack_size: 4096
core1:
  low:
    stack_size: 16384
"#;
        let cfg = Config::from_yaml_str(yaml).unwrap();
        for slot in Slot::ALL {
            let expected = if slot == Slot::CORE1_LOW { 16384 } else { 4096 };
            assert_eq!(cfg.get(slot).stack_size, expected, "{slot}");
        }
    }

    #[test]
    fn empty_document_is_all_defaults() {
        assert_eq!(Config::from_yaml_str("").unwrap(), Config::default());
    }

    #[test]
    fn values_are_not_validated() {
        let yaml = "core0:\n  low: { priority: 0, stack_size: 0, period_ms: 0 }\n";
        let cfg = Config::from_yaml_str(yaml).unwrap();
        assert_eq!(
            *cfg.get(Slot::CORE0_LOW),
            TaskSpec {
                priority: 0,
                stack_size: 0,
                period_ms: 0
            }
        );
    }

    #[test]
    fn unknown_field_returns_error() {
        let yaml = "core2:\n  low: { priority: 1 }\n";
        assert!(Config::from_yaml_str(yaml).is_err());
    }

    #[test]
    fn missing_file_returns_error() {
        let result = Config::load_from_file(Path::new("/nonexistent/path/autotask.yaml"));
        assert!(result.is_err());
    }

    #[test]
    fn malformed_yaml_returns_error() {
        let f = yaml_tempfile("this is: not: valid: yaml: content:::");
        assert!(Config::load_from_file(f.path()).is_err());
    }
}
