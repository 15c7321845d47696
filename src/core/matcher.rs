//! Finds the existing remote milestone a spec should reconcile against.

use crate::domain::model::RemoteMilestone;

#[derive(Debug, Clone)]
pub struct Match {
    pub milestone: RemoteMilestone,
    /// Matched via `existingNameToRename`; forces a title update when the
    /// matched title differs from the resolved name.
    pub by_rename: bool,
}

/// Ordered candidate search, first exact-title hit wins. A milestone may be
/// mid-rename (old title still live) or may already carry its final title from
/// a previous run; probing all three titles keeps the run from creating
/// duplicates in either situation.
pub fn find_existing(
    existing: &[RemoteMilestone],
    resolved_name: &str,
    rename_from: Option<&str>,
    linked: bool,
) -> Option<Match> {
    let probes: [(Option<&str>, bool); 3] = [
        (rename_from, true),
        (linked.then_some(resolved_name), false),
        (Some(resolved_name), false),
    ];

    for (title, by_rename) in probes {
        let Some(title) = title else { continue };
        if let Some(milestone) = existing.iter().find(|m| m.title == title) {
            return Some(Match {
                milestone: milestone.clone(),
                by_rename,
            });
        }
    }

    None
}
