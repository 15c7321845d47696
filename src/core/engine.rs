//! Reconciliation decision engine: drives the repos × milestones cross-product
//! sequentially, deciding create vs update vs rename per pair.

use crate::config::SyncConfig;
use crate::core::matcher;
use crate::core::report;
use crate::core::resolve::{resolve_fields, ReferenceResolver};
use crate::domain::model::{
    FieldValue, MilestoneConfig, ReconcileAction, ReconcileOutcome, RepoTarget,
};
use crate::domain::ports::MilestoneHost;
use crate::utils::error::Result;

pub struct ReconcileEngine<'a, H: MilestoneHost> {
    host: &'a H,
    resolver: ReferenceResolver<'a, H>,
    dry_run: bool,
}

impl<'a, H: MilestoneHost> ReconcileEngine<'a, H> {
    pub fn new(host: &'a H, dry_run: bool) -> Self {
        Self {
            host,
            resolver: ReferenceResolver::new(host),
            dry_run,
        }
    }

    /// Processes every (repo, milestone) pair in config order, repos outer.
    /// Pairs run strictly one after another: a milestone created for an
    /// earlier spec must be visible to a later spec's matcher in the same
    /// repository.
    pub async fn run(&mut self, config: &SyncConfig) -> Vec<ReconcileOutcome> {
        println!(
            "Processing {} milestone(s) across {} repository/repositories...",
            config.milestones.len(),
            config.repos.len()
        );
        if self.dry_run {
            println!("DRY RUN MODE - No changes will be made\n");
        }

        let mut outcomes = Vec::with_capacity(config.repos.len() * config.milestones.len());
        for repo in &config.repos {
            println!("\nRepository: {}", repo);
            println!("{}", "-".repeat(80));

            for spec in &config.milestones {
                let outcome = self.process_pair(repo, spec).await;
                println!("{}", report::render_pair(&outcome));
                outcomes.push(outcome);
            }
        }
        outcomes
    }

    /// Reconciles one pair. Failures are recorded on the outcome at this
    /// boundary; one bad spec or unreachable reference never aborts the batch.
    pub async fn process_pair(
        &mut self,
        repo: &RepoTarget,
        spec: &MilestoneConfig,
    ) -> ReconcileOutcome {
        let mut outcome = ReconcileOutcome::new(repo.clone());
        if let Err(e) = self.reconcile(repo, spec, &mut outcome).await {
            tracing::debug!("Pair failed for {}: {}", repo, e);
            outcome.error = Some(e.to_string());
        }
        outcome
    }

    async fn reconcile(
        &mut self,
        repo: &RepoTarget,
        spec: &MilestoneConfig,
        outcome: &mut ReconcileOutcome,
    ) -> Result<()> {
        let reference = match &spec.reference_milestone_url {
            Some(url) => Some(self.resolver.resolve(url).await?),
            None => None,
        };
        let resolved = resolve_fields(spec, reference.as_ref())?;

        outcome.name = Some(resolved.name.clone());
        outcome.new_name = Some(resolved.name.clone());
        outcome.new_description = resolved.description.clone();
        outcome.new_due_date = resolved.due_on.clone();

        let existing = self.host.list_milestones(repo).await?;
        let matched = matcher::find_existing(
            &existing,
            &resolved.name,
            spec.existing_name_to_rename.as_deref(),
            resolved.linked,
        );

        match matched {
            Some(found) => {
                outcome.previous_name = Some(found.milestone.title.clone());
                // Empty strings from the remote normalize to "not set".
                outcome.previous_description = found
                    .milestone
                    .description
                    .clone()
                    .filter(|d| !d.is_empty());
                outcome.previous_due_date =
                    found.milestone.due_on.clone().filter(|d| !d.is_empty());

                // A plain milestone found by direct name match never re-sends
                // its own unchanged title.
                let needs_rename = found.by_rename && found.milestone.title != resolved.name;
                let title = needs_rename.then_some(resolved.name.as_str());

                if self.dry_run {
                    outcome.milestone_number = Some(found.milestone.number);
                    outcome.action = Some(ReconcileAction::Update);
                } else {
                    let updated = self
                        .host
                        .update_milestone(
                            repo,
                            found.milestone.number,
                            title,
                            &resolved.description,
                            &resolved.due_on,
                        )
                        .await?;
                    outcome.milestone_number = Some(updated.number);
                    outcome.action = Some(ReconcileAction::Updated);
                }
            }
            None => {
                // Nothing to leave untouched on a brand-new record, so only
                // explicitly-set fields go into the create call.
                if self.dry_run {
                    outcome.action = Some(ReconcileAction::Create);
                } else {
                    let description = match &resolved.description {
                        FieldValue::Set(v) => Some(v.as_str()),
                        _ => None,
                    };
                    let due_on = match &resolved.due_on {
                        FieldValue::Set(v) => Some(v.as_str()),
                        _ => None,
                    };
                    let created = self
                        .host
                        .create_milestone(repo, &resolved.name, description, due_on)
                        .await?;
                    outcome.milestone_number = Some(created.number);
                    outcome.action = Some(ReconcileAction::Created);
                }
            }
        }

        if let Some(number) = outcome.milestone_number {
            outcome.milestone_url = Some(self.host.milestone_web_url(repo, number));
        }
        Ok(())
    }
}
