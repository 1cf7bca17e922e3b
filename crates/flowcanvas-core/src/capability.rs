//! Capability option trees attached to nodes.
//!
//! Every capability-bearing node carries a list of [`CapabilityOption`]s,
//! toggled through the node's own menu. An option with suboptions acts as a
//! group: its enabled state is derived from its children rather than stored
//! independently.

use serde::{Deserialize, Serialize};

/// A user-toggleable feature flag on a node.
///
/// Leaf options (empty `suboptions`) own their `enabled` flag. Group options
/// derive it: a group is enabled iff at least one suboption is enabled.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CapabilityOption {
    pub id: String,
    pub label: String,
    enabled: bool,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub suboptions: Vec<CapabilityOption>,
}

impl CapabilityOption {
    /// Create a disabled leaf option.
    pub fn leaf(id: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
            enabled: false,
            suboptions: Vec::new(),
        }
    }

    /// Create a group option with the given suboptions.
    pub fn group(
        id: impl Into<String>,
        label: impl Into<String>,
        suboptions: Vec<CapabilityOption>,
    ) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
            enabled: false,
            suboptions,
        }
    }

    /// Enable or disable a leaf in a builder chain (test/template convenience).
    pub fn with_enabled(mut self, enabled: bool) -> Self {
        self.set_enabled(enabled);
        self
    }

    /// Whether this option is a group (has suboptions).
    pub fn is_group(&self) -> bool {
        !self.suboptions.is_empty()
    }

    /// Derived enabled state: groups report enabled iff any suboption is.
    pub fn is_enabled(&self) -> bool {
        if self.suboptions.is_empty() {
            self.enabled
        } else {
            self.suboptions.iter().any(CapabilityOption::is_enabled)
        }
    }

    /// Set the enabled flag. On groups the flag cascades to every suboption,
    /// since the group state itself is derived.
    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
        for sub in &mut self.suboptions {
            sub.set_enabled(enabled);
        }
    }
}

/// Toggle a top-level option by id.
///
/// Toggling a group flips it as a whole: the new state cascades to all of
/// its suboptions. Unknown ids are ignored.
pub fn toggle(options: &mut [CapabilityOption], id: &str) {
    if let Some(option) = options.iter_mut().find(|o| o.id == id) {
        let enabled = !option.is_enabled();
        option.set_enabled(enabled);
    }
}

/// Toggle a single suboption of a group. The group's own enabled state is
/// re-derived from its children. Unknown ids are ignored.
pub fn toggle_suboption(options: &mut [CapabilityOption], option_id: &str, sub_id: &str) {
    if let Some(option) = options.iter_mut().find(|o| o.id == option_id) {
        if let Some(sub) = option.suboptions.iter_mut().find(|s| s.id == sub_id) {
            let enabled = !sub.is_enabled();
            sub.set_enabled(enabled);
        }
        // Stored group flag tracks the derived state so serialization
        // round-trips agree with `is_enabled`.
        option.enabled = option.suboptions.iter().any(CapabilityOption::is_enabled);
    }
}

/// Flatten the enabled leaves of an option list, preserving declaration
/// order: the enabled suboptions of each group, then enabled plain leaves.
///
/// This ordered sequence is what drives port synthesis and child spawning.
pub fn enabled_leaves(options: &[CapabilityOption]) -> Vec<&CapabilityOption> {
    let mut leaves = Vec::new();
    for option in options {
        if option.is_group() {
            for sub in &option.suboptions {
                if sub.is_enabled() {
                    leaves.push(sub);
                }
            }
        } else if option.is_enabled() {
            leaves.push(option);
        }
    }
    leaves
}

/// Count of enabled top-level options (groups count once).
pub fn enabled_top_level(options: &[CapabilityOption]) -> Vec<&CapabilityOption> {
    options.iter().filter(|o| o.is_enabled()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Vec<CapabilityOption> {
        vec![
            CapabilityOption::group(
                "embeddings",
                "Embeddings",
                vec![
                    CapabilityOption::leaf("google-embeddings", "Google Embeddings"),
                    CapabilityOption::leaf("openai-embeddings", "OpenAI Embeddings"),
                ],
            ),
            CapabilityOption::leaf("memory", "Memory"),
            CapabilityOption::leaf("tool", "Tool"),
        ]
    }

    #[test]
    fn test_leaf_toggle() {
        let mut options = sample();
        toggle(&mut options, "memory");
        assert!(options[1].is_enabled());
        toggle(&mut options, "memory");
        assert!(!options[1].is_enabled());
    }

    #[test]
    fn test_group_enabled_is_derived() {
        let mut options = sample();
        assert!(!options[0].is_enabled());

        toggle_suboption(&mut options, "embeddings", "google-embeddings");
        assert!(options[0].is_enabled());

        toggle_suboption(&mut options, "embeddings", "google-embeddings");
        assert!(!options[0].is_enabled());
    }

    #[test]
    fn test_group_toggle_cascades() {
        let mut options = sample();
        toggle(&mut options, "embeddings");
        assert!(options[0].suboptions.iter().all(|s| s.is_enabled()));

        toggle(&mut options, "embeddings");
        assert!(options[0].suboptions.iter().all(|s| !s.is_enabled()));
    }

    #[test]
    fn test_enabled_leaves_order() {
        let mut options = sample();
        toggle(&mut options, "tool");
        toggle_suboption(&mut options, "embeddings", "openai-embeddings");
        toggle(&mut options, "memory");

        let leaves: Vec<&str> = enabled_leaves(&options)
            .iter()
            .map(|o| o.id.as_str())
            .collect();
        // Declaration order, not toggle order.
        assert_eq!(leaves, vec!["openai-embeddings", "memory", "tool"]);
    }

    #[test]
    fn test_enabled_top_level_counts_groups_once() {
        let mut options = sample();
        toggle_suboption(&mut options, "embeddings", "google-embeddings");
        toggle_suboption(&mut options, "embeddings", "openai-embeddings");
        toggle(&mut options, "memory");

        let top: Vec<&str> = enabled_top_level(&options)
            .iter()
            .map(|o| o.id.as_str())
            .collect();
        assert_eq!(top, vec!["embeddings", "memory"]);
    }

    #[test]
    fn test_unknown_ids_ignored() {
        let mut options = sample();
        toggle(&mut options, "nope");
        toggle_suboption(&mut options, "embeddings", "nope");
        assert!(enabled_leaves(&options).is_empty());
    }

    #[test]
    fn test_serde_round_trip_preserves_derived_state() {
        let mut options = sample();
        toggle_suboption(&mut options, "embeddings", "google-embeddings");

        let json = serde_json::to_string(&options).unwrap();
        let back: Vec<CapabilityOption> = serde_json::from_str(&json).unwrap();
        assert!(back[0].is_enabled());
        assert_eq!(enabled_leaves(&back).len(), 1);
    }
}
