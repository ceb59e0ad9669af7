use std::collections::BTreeSet;

use crate::context::MethodIdentity;

/// Decides whether a constraint applies to the dispatched handler method.
///
/// A gate with no targets is unrestricted. Otherwise it only opens for the
/// listed method names.
///
/// # Examples
///
/// ```
/// use action_pipeline::{MethodIdentity, TargetGate};
///
/// let gate = TargetGate::configure(Some(" save , update ,"));
///
/// assert!(gate.is_applicable(&MethodIdentity::new("save")));
/// assert!(gate.is_applicable(&MethodIdentity::new("update")));
/// assert!(!gate.is_applicable(&MethodIdentity::new("delete")));
///
/// // no targets: applies everywhere
/// assert!(TargetGate::configure(None).is_applicable(&MethodIdentity::new("delete")));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TargetGate {
    targets: BTreeSet<String>,
}

impl TargetGate {
    /// Creates an unrestricted gate.
    pub fn unrestricted() -> Self {
        Self::default()
    }

    /// Parses a comma-separated list of target method names.
    ///
    /// Entries are trimmed; empty entries are ignored. Absent or blank input
    /// yields an unrestricted gate.
    pub fn configure(targets_csv: Option<&str>) -> Self {
        let targets = targets_csv
            .unwrap_or_default()
            .split(',')
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .map(str::to_string)
            .collect();
        Self { targets }
    }

    /// Returns `true` if the gate opens for `method`.
    pub fn is_applicable(&self, method: &MethodIdentity) -> bool {
        self.targets.is_empty() || self.targets.contains(method.name())
    }

    /// Returns `true` if no targets are configured.
    pub fn is_unrestricted(&self) -> bool {
        self.targets.is_empty()
    }

    /// Iterates configured target names.
    pub fn targets(&self) -> impl Iterator<Item = &str> {
        self.targets.iter().map(String::as_str)
    }
}
