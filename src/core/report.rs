//! Renders per-pair transcripts and the final run summary. Pure functions over
//! reconciliation outcomes; nothing here mutates them.

use crate::domain::model::{ReconcileAction, ReconcileOutcome, RepoTarget};
use chrono::DateTime;

/// ISO-8601 timestamp → `YYYY-MM-DD` for display. Unparseable values are shown
/// verbatim rather than dropped.
pub fn display_date(value: &str) -> String {
    DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.format("%Y-%m-%d").to_string())
        .unwrap_or_else(|_| value.to_string())
}

/// One `label: previous → new` diff line, collapsing to `(unchanged)` when the
/// normalized values are equal. `None` and "(not set)" count as equal.
pub fn format_value_change(label: &str, previous: Option<&str>, new: Option<&str>) -> String {
    let new_str = new.unwrap_or("(not set)");
    if previous == new {
        format!("    {}: {} (unchanged)", label, new_str)
    } else {
        format!(
            "    {}: {} → {}",
            label,
            previous.unwrap_or("(not set)"),
            new_str
        )
    }
}

/// Transcript block for one (repository, milestone) outcome: action verb line
/// plus the three field diffs. Dry-run and real runs produce the same diff
/// content, only the verb differs.
pub fn render_pair(outcome: &ReconcileOutcome) -> String {
    if let Some(error) = &outcome.error {
        return format!("  ❌ Error: {}", error);
    }

    let name = outcome.new_name.as_deref().unwrap_or("Unknown");
    let header = match outcome.action {
        Some(ReconcileAction::Create) => format!("  Would CREATE: {}", name),
        Some(ReconcileAction::Update) => format!(
            "  Would UPDATE: {} (milestone #{})",
            name,
            outcome.milestone_number.unwrap_or_default()
        ),
        Some(ReconcileAction::Created) => format!(
            "  ✅ Created: {} - {}",
            name,
            outcome.milestone_url.as_deref().unwrap_or_default()
        ),
        Some(ReconcileAction::Updated) => format!(
            "  ✅ Updated: {} - {}",
            name,
            outcome.milestone_url.as_deref().unwrap_or_default()
        ),
        None => return format!("  ❌ Error: no action recorded for {}", name),
    };

    // Unset fields keep whatever the remote record had, so their effective new
    // value is the previous one and they render as unchanged.
    let prev_description = outcome.previous_description.as_deref();
    let new_description = outcome.new_description.applied_to(prev_description);

    let prev_due = outcome.previous_due_date.as_deref().map(display_date);
    let new_due = outcome
        .new_due_date
        .applied_to(outcome.previous_due_date.as_deref())
        .map(display_date);

    let mut lines = vec![header];
    lines.push(format_value_change(
        "Name",
        outcome.previous_name.as_deref(),
        outcome.new_name.as_deref(),
    ));
    lines.push(format_value_change(
        "Description",
        prev_description,
        new_description,
    ));
    lines.push(format_value_change(
        "Due Date",
        prev_due.as_deref(),
        new_due.as_deref(),
    ));
    lines.join("\n")
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Totals {
    pub created: usize,
    pub updated: usize,
    pub errored: usize,
}

pub fn totals(outcomes: &[ReconcileOutcome]) -> Totals {
    let mut totals = Totals::default();
    for outcome in outcomes {
        if outcome.error.is_some() {
            totals.errored += 1;
        } else if outcome.action.is_some_and(|a| a.is_create()) {
            totals.created += 1;
        } else if outcome.action.is_some_and(|a| a.is_update()) {
            totals.updated += 1;
        }
    }
    totals
}

/// Final summary: per-repository sections in first-seen order, then aggregate
/// counts across the whole run.
pub fn render_summary(outcomes: &[ReconcileOutcome], dry_run: bool) -> String {
    let mut lines = Vec::new();
    lines.push(format!("\n{}", "=".repeat(80)));
    lines.push(if dry_run { "DRY RUN SUMMARY" } else { "EXECUTION SUMMARY" }.to_string());
    lines.push("=".repeat(80));

    for (repo, group) in group_by_repo(outcomes) {
        lines.push(format!("\n{}:", repo));

        let created: Vec<_> = group
            .iter()
            .filter(|o| o.error.is_none() && o.action.is_some_and(|a| a.is_create()))
            .collect();
        let updated: Vec<_> = group
            .iter()
            .filter(|o| o.error.is_none() && o.action.is_some_and(|a| a.is_update()))
            .collect();
        let errored: Vec<_> = group.iter().filter(|o| o.error.is_some()).collect();

        if dry_run {
            if !created.is_empty() {
                lines.push(format!("  Would create ({}):", created.len()));
                for o in &created {
                    lines.push(format!("    - {}", o.name.as_deref().unwrap_or("Unknown")));
                }
            }
            if !updated.is_empty() {
                lines.push(format!("  Would update ({}):", updated.len()));
                for o in &updated {
                    lines.push(format!(
                        "    - {} (milestone #{})",
                        o.name.as_deref().unwrap_or("Unknown"),
                        o.milestone_number.unwrap_or_default()
                    ));
                }
            }
        } else {
            if !created.is_empty() {
                lines.push(format!("  Created ({}):", created.len()));
                for o in &created {
                    lines.push(format!(
                        "    - {}: {}",
                        o.name.as_deref().unwrap_or("Unknown"),
                        o.milestone_url.as_deref().unwrap_or_default()
                    ));
                }
            }
            if !updated.is_empty() {
                lines.push(format!("  Updated ({}):", updated.len()));
                for o in &updated {
                    lines.push(format!(
                        "    - {}: {}",
                        o.name.as_deref().unwrap_or("Unknown"),
                        o.milestone_url.as_deref().unwrap_or_default()
                    ));
                }
            }
        }

        if !errored.is_empty() {
            lines.push(format!("  Errors ({}):", errored.len()));
            for o in &errored {
                lines.push(format!(
                    "    - {}: {}",
                    o.name.as_deref().unwrap_or("Unknown"),
                    o.error.as_deref().unwrap_or_default()
                ));
            }
        }
    }

    let totals = totals(outcomes);
    lines.push(format!(
        "\nTotal: {} created, {} updated, {} errors",
        totals.created, totals.updated, totals.errored
    ));
    lines.join("\n")
}

fn group_by_repo(outcomes: &[ReconcileOutcome]) -> Vec<(RepoTarget, Vec<&ReconcileOutcome>)> {
    let mut groups: Vec<(RepoTarget, Vec<&ReconcileOutcome>)> = Vec::new();
    for outcome in outcomes {
        match groups.iter_mut().find(|(repo, _)| *repo == outcome.repo) {
            Some((_, group)) => group.push(outcome),
            None => groups.push((outcome.repo.clone(), vec![outcome])),
        }
    }
    groups
}
