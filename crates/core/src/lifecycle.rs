//! Project lifecycle: the five-stage delivery state machine.
//!
//! A project is created from a client brief at stage 1 / onboarding with the
//! deposit unpaid, and is moved forward by admin saves. Stage regressions
//! and status rollbacks are permitted (administrative override) but are
//! reported back as [`LifecycleWarning`]s for the caller to log; the one
//! hard invariant is that a completed project sits at the final stage.

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::types::DbId;

pub const STAGE_MIN: i32 = 1;
pub const STAGE_MAX: i32 = 5;

/// Deposit rate in percent of the total price.
pub const DEPOSIT_RATE_PERCENT: i64 = 30;

/// Project status values, ordered by lifecycle progress.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProjectStatus {
    Onboarding,
    Active,
    Completed,
}

impl ProjectStatus {
    pub fn parse(raw: &str) -> Option<ProjectStatus> {
        match raw {
            "onboarding" => Some(ProjectStatus::Onboarding),
            "active" => Some(ProjectStatus::Active),
            "completed" => Some(ProjectStatus::Completed),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ProjectStatus::Onboarding => "onboarding",
            ProjectStatus::Active => "active",
            ProjectStatus::Completed => "completed",
        }
    }
}

/// One selected service line of a brief: `{id, title, price}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceSelection {
    pub id: String,
    pub title: String,
    pub price: i64,
}

/// The lifecycle-bearing fields of a project.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProjectState {
    pub status: ProjectStatus,
    pub current_stage: i32,
    pub deposit_paid: bool,
}

/// A freshly validated brief, ready to insert.
#[derive(Debug, Clone, PartialEq)]
pub struct ProjectDraft {
    pub client_id: DbId,
    pub title: String,
    pub services_selected: Vec<ServiceSelection>,
    pub total_price: i64,
    pub status: ProjectStatus,
    pub current_stage: i32,
    pub deposit_paid: bool,
}

/// Admin save input; `None` fields are left unchanged.
#[derive(Debug, Clone, Copy, Default)]
pub struct AdminUpdate {
    pub status: Option<ProjectStatus>,
    pub stage: Option<i32>,
    pub deposit_paid: Option<bool>,
}

/// Non-blocking signals an admin save can raise. Callers log these at warn
/// level for audit; the save itself proceeds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecycleWarning {
    StageRegression { from: i32, to: i32 },
    StatusRollback { from: ProjectStatus, to: ProjectStatus },
}

/// Validate a client brief into a draft.
///
/// Every draft starts at stage 1, onboarding, deposit unpaid. Blank titles
/// and non-positive totals are rejected before any write.
pub fn create_draft(
    client_id: DbId,
    title: &str,
    services_selected: Vec<ServiceSelection>,
    total_price: i64,
) -> Result<ProjectDraft, CoreError> {
    let title = title.trim();
    if title.is_empty() {
        return Err(CoreError::Validation("Project title must not be empty".into()));
    }
    if total_price <= 0 {
        return Err(CoreError::Validation(format!(
            "Total price must be positive, got {total_price}"
        )));
    }
    Ok(ProjectDraft {
        client_id,
        title: title.to_string(),
        services_selected,
        total_price,
        status: ProjectStatus::Onboarding,
        current_stage: STAGE_MIN,
        deposit_paid: false,
    })
}

/// Apply an admin save to the current lifecycle state.
///
/// Precondition (enforced by the caller's authorization layer, documented
/// here): the actor holds the admin role.
///
/// Stage values outside `[1, 5]` are rejected, as is any final state that
/// would leave a completed project below the final stage. Regressions of
/// stage or status are applied but reported as warnings.
pub fn apply_admin_update(
    current: ProjectState,
    update: AdminUpdate,
) -> Result<(ProjectState, Vec<LifecycleWarning>), CoreError> {
    if let Some(stage) = update.stage {
        if !(STAGE_MIN..=STAGE_MAX).contains(&stage) {
            return Err(CoreError::Validation(format!(
                "Stage must be between {STAGE_MIN} and {STAGE_MAX}, got {stage}"
            )));
        }
    }

    let next = ProjectState {
        status: update.status.unwrap_or(current.status),
        current_stage: update.stage.unwrap_or(current.current_stage),
        deposit_paid: update.deposit_paid.unwrap_or(current.deposit_paid),
    };

    if next.status == ProjectStatus::Completed && next.current_stage != STAGE_MAX {
        return Err(CoreError::Validation(format!(
            "A completed project must be at stage {STAGE_MAX}, got {}",
            next.current_stage
        )));
    }

    let mut warnings = Vec::new();
    if next.current_stage < current.current_stage {
        warnings.push(LifecycleWarning::StageRegression {
            from: current.current_stage,
            to: next.current_stage,
        });
    }
    if next.status < current.status {
        warnings.push(LifecycleWarning::StatusRollback {
            from: current.status,
            to: next.status,
        });
    }

    Ok((next, warnings))
}

/// Delivery progress as a percentage of the five stages.
///
/// Exact by construction: stage 1 → 20, …, stage 5 → 100. Out-of-range
/// input is clamped so the result always lands in `[0, 100]`.
pub fn progress_percent(stage: i32) -> i32 {
    stage.clamp(0, STAGE_MAX) * 20
}

/// The 30% deposit for a total price, rounded half-up.
///
/// Integer arithmetic keeps the .5 boundary deterministic; this is the only
/// deposit computation in the system, so creation-time and lifecycle
/// displays can never disagree.
pub fn deposit_amount(total_price: i64) -> i64 {
    (total_price * DEPOSIT_RATE_PERCENT + 50) / 100
}
