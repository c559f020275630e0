mod brackets;
mod policy;
mod rules;

pub use brackets::{Bracket, RankTier};
pub use policy::{BracketViolation, GlobalViolation};

use super::catalog::ItemIndex;
use super::domain::{LootIntegrityError, Submission};
use rules::ResolvedSelection;
use serde::{Deserialize, Serialize};

/// Checks a complete submission against bracket budgets and duplication rules.
///
/// Rule breaches come back as data; only integrity failures (unknown items, colliding
/// cells) are returned as errors.
#[derive(Debug, Clone, Copy, Default)]
pub struct BracketValidator {
    slot_restrictions_enabled: bool,
}

impl BracketValidator {
    pub fn new(slot_restrictions_enabled: bool) -> Self {
        Self {
            slot_restrictions_enabled,
        }
    }

    pub fn validate(
        &self,
        submission: &Submission,
        catalog: &ItemIndex,
    ) -> Result<SubmissionValidation, LootIntegrityError> {
        submission.ensure_unique_cells()?;

        let resolved = submission
            .selections
            .iter()
            .map(|selection| {
                catalog
                    .require(&selection.item_id)
                    .map(|item| ResolvedSelection { selection, item })
            })
            .collect::<Result<Vec<_>, _>>()?;

        let global_violations = rules::check_global(&resolved);

        let reports = Bracket::budgeted()
            .into_iter()
            .filter_map(|bracket| {
                let tally =
                    rules::check_bracket(bracket, &resolved, self.slot_restrictions_enabled);
                if tally.allocation_points == 0 && tally.violations.is_empty() {
                    return None;
                }
                Some(BracketViolationReport {
                    bracket,
                    label: bracket.label(),
                    allocation_points: tally.allocation_points,
                    max_points: bracket.allocation_budget(),
                    violations: tally.violations,
                })
            })
            .collect();

        Ok(SubmissionValidation {
            selection_count: resolved.len(),
            global_violations,
            reports,
        })
    }
}

/// Spend and rule breaches for one budgeted bracket.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BracketViolationReport {
    pub bracket: Bracket,
    pub label: String,
    pub allocation_points: u32,
    pub max_points: u32,
    pub violations: Vec<BracketViolation>,
}

impl BracketViolationReport {
    pub fn messages(&self) -> Vec<String> {
        self.violations.iter().map(BracketViolation::summary).collect()
    }

    pub fn is_clean(&self) -> bool {
        self.violations.is_empty()
    }
}

/// Full validation result for a submission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubmissionValidation {
    pub selection_count: usize,
    pub global_violations: Vec<GlobalViolation>,
    pub reports: Vec<BracketViolationReport>,
}

impl SubmissionValidation {
    /// Whether the submission may be sent to officers for final review.
    pub fn is_acceptable(&self) -> bool {
        self.global_violations.is_empty()
            && self
                .reports
                .iter()
                .all(BracketViolationReport::is_clean)
    }

    /// Every violation as display text, global ones first.
    pub fn messages(&self) -> Vec<String> {
        let global = self.global_violations.iter().map(GlobalViolation::summary);
        let brackets = self.reports.iter().flat_map(|report| {
            report
                .violations
                .iter()
                .map(move |violation| format!("{}: {}", report.label, violation.summary()))
        });
        global.chain(brackets).collect()
    }

    pub fn report_for(&self, bracket: Bracket) -> Option<&BracketViolationReport> {
        self.reports.iter().find(|report| report.bracket == bracket)
    }
}
