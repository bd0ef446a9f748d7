//! Driver configuration structures and loaders.
use std::env;

/// Knobs for how an [`Agent`](crate::Agent) drives its tree.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DriverConfig {
    /// Reset the root after it reports `Finished`, so the next cycle
    /// re-qualifies from the start.
    pub reset_on_finish: bool,
    /// Cycle budget for [`Agent::run`](crate::Agent::run).
    pub max_cycles: u64,
    /// Log the active leaf after every tick.
    pub trace_active: bool,
}

impl Default for DriverConfig {
    fn default() -> Self {
        Self {
            reset_on_finish: true,
            max_cycles: 64,
            trace_active: false,
        }
    }
}

impl DriverConfig {
    /// Construct configuration from process environment variables.
    ///
    /// Environment variables:
    /// - `BT_RESET_ON_FINISH` - Reset the root after it finishes (default: true)
    /// - `BT_MAX_CYCLES` - Cycle budget for a run (default: 64)
    /// - `BT_TRACE_ACTIVE` - Log the active leaf every cycle (default: false;
    ///   empty, `1`, `true`, `yes` or `on` enable it)
    pub fn from_env() -> Self {
        Self::from_vars(|key| env::var(key).ok())
    }

    /// Same as [`DriverConfig::from_env`], reading variables through `lookup`.
    pub fn from_vars(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();

        if let Some(reset) = read_var::<bool>(&lookup, "BT_RESET_ON_FINISH") {
            config.reset_on_finish = reset;
        }

        if let Some(cycles) = read_var::<u64>(&lookup, "BT_MAX_CYCLES") {
            config.max_cycles = cycles.max(1);
        }

        // Setting the variable without a value also counts as "true"
        if let Some(trace) = lookup("BT_TRACE_ACTIVE") {
            config.trace_active = parse_flag(&trace);
        }

        config
    }

    #[must_use]
    pub fn with_max_cycles(mut self, max_cycles: u64) -> Self {
        self.max_cycles = max_cycles.max(1);
        self
    }

    #[must_use]
    pub fn with_reset_on_finish(mut self, reset_on_finish: bool) -> Self {
        self.reset_on_finish = reset_on_finish;
        self
    }
}

fn read_var<T>(lookup: &impl Fn(&str) -> Option<String>, key: &str) -> Option<T>
where
    T: std::str::FromStr,
{
    lookup(key)?.trim().parse().ok()
}

/// Empty, `1`, `true`, `yes` and `on` enable a flag; anything else disables it.
fn parse_flag(value: &str) -> bool {
    matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "" | "1" | "true" | "yes" | "on"
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = DriverConfig::default();
        assert!(config.reset_on_finish);
        assert_eq!(config.max_cycles, 64);
        assert!(!config.trace_active);
    }

    #[test]
    fn cycle_budget_is_at_least_one() {
        assert_eq!(DriverConfig::default().with_max_cycles(0).max_cycles, 1);
    }

    fn vars(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let pairs: Vec<(String, String)> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| {
            pairs
                .iter()
                .find(|(k, _)| k == key)
                .map(|(_, v)| v.clone())
        }
    }

    #[test]
    fn unset_variables_keep_defaults() {
        assert_eq!(DriverConfig::from_vars(vars(&[])), DriverConfig::default());
    }

    #[test]
    fn variables_override_defaults() {
        let config = DriverConfig::from_vars(vars(&[
            ("BT_RESET_ON_FINISH", "false"),
            ("BT_MAX_CYCLES", "0"),
            ("BT_TRACE_ACTIVE", ""),
        ]));
        assert!(!config.reset_on_finish);
        assert_eq!(config.max_cycles, 1);
        assert!(config.trace_active);
    }

    #[test]
    fn unparsable_values_are_ignored() {
        let config = DriverConfig::from_vars(vars(&[
            ("BT_RESET_ON_FINISH", "maybe"),
            ("BT_MAX_CYCLES", "lots"),
        ]));
        assert!(config.reset_on_finish);
        assert_eq!(config.max_cycles, 64);
    }

    #[test]
    fn trace_flag_can_be_switched_off() {
        for value in ["0", "no", "false", "off"] {
            let config = DriverConfig::from_vars(vars(&[("BT_TRACE_ACTIVE", value)]));
            assert!(!config.trace_active, "{value}");
        }
        for value in ["1", "TRUE", "yes", "on"] {
            let config = DriverConfig::from_vars(vars(&[("BT_TRACE_ACTIVE", value)]));
            assert!(config.trace_active, "{value}");
        }
    }
}
