//! Threshold evaluation over a set of children.
//!
//! # Examples
//!
//! ```
//! use health_core::models::{EntityId, HealthState};
//! use health_core::Percent;
//! use health_eval::GroupHealthStateCount;
//!
//! let mut group = GroupHealthStateCount::new(Percent::new(20).unwrap());
//! for i in 0..10 {
//!     let state = if i < 2 { HealthState::Error } else { HealthState::Ok };
//!     group.add(EntityId::node(format!("N{i}")), state, Vec::new());
//! }
//! assert_eq!(group.health_state(), HealthState::Ok);
//! ```

use health_core::config::Percent;
use health_core::errors::EvaluationError;
use health_core::models::{EntityId, HealthEvaluation, HealthState, HealthStateCount};

/// Counts children and keeps the evaluations of those in Warning or Error.
///
/// Children are evaluated under the same `consider_warning_as_error` as the
/// group, so a promoted Warning already arrives as Error.
#[derive(Debug, Clone)]
pub struct GroupHealthStateCount {
    max_percent_unhealthy: Percent,
    counts: HealthStateCount,
    unhealthy: Vec<(EntityId, HealthState, Vec<HealthEvaluation>)>,
}

impl GroupHealthStateCount {
    pub fn new(max_percent_unhealthy: Percent) -> Self {
        Self {
            max_percent_unhealthy,
            counts: HealthStateCount::new(),
            unhealthy: Vec::new(),
        }
    }

    pub fn add(&mut self, entity: EntityId, state: HealthState, evaluations: Vec<HealthEvaluation>) {
        self.counts.add(state);
        if state.is_unhealthy() {
            self.unhealthy.push((entity, state, evaluations));
        }
    }

    pub fn counts(&self) -> &HealthStateCount {
        &self.counts
    }

    pub fn total_count(&self) -> u64 {
        self.counts.total()
    }

    /// Children in Error; the count the threshold applies to.
    pub fn unhealthy_count(&self) -> u64 {
        self.counts.error_count
    }

    pub fn max_percent_unhealthy(&self) -> Percent {
        self.max_percent_unhealthy
    }

    /// Error when `100 * errors > max * total`. Otherwise Warning if any
    /// child is in Warning, Ok if none is.
    pub fn health_state(&self) -> HealthState {
        if !self
            .max_percent_unhealthy
            .is_respected(self.unhealthy_count(), self.total_count())
        {
            HealthState::Error
        } else if self.counts.warning_count > 0 {
            HealthState::Warning
        } else {
            HealthState::Ok
        }
    }

    /// Singular wrappers for every child at least as bad as `state`, in
    /// insertion order.
    pub fn unhealthy_evaluations_at(&self, state: HealthState) -> Result<Vec<HealthEvaluation>, EvaluationError> {
        self.unhealthy
            .iter()
            .filter(|(_, child, _)| !state.is_worse_than(*child))
            .map(|(entity, child, evaluations)| HealthEvaluation::entity(entity.clone(), *child, evaluations.clone()))
            .collect()
    }

    /// Singular wrappers for every child in Error.
    pub fn unhealthy_evaluations(&self) -> Result<Vec<HealthEvaluation>, EvaluationError> {
        self.unhealthy_evaluations_at(HealthState::Error)
    }

    /// Build the group's evaluation with `build` when it is not Ok.
    ///
    /// The children handed to `build` are those at least as bad as the
    /// group, and the unhealthy count is their number.
    pub fn into_evaluation<F>(self, build: F) -> Result<Option<HealthEvaluation>, EvaluationError>
    where
        F: FnOnce(HealthState, Vec<HealthEvaluation>, u64, u64, Percent) -> Result<HealthEvaluation, EvaluationError>,
    {
        let state = self.health_state();
        if !state.is_unhealthy() {
            return Ok(None);
        }
        let (total, max) = (self.total_count(), self.max_percent_unhealthy);
        let children = self
            .unhealthy
            .into_iter()
            .filter(|(_, child, _)| !state.is_worse_than(*child))
            .map(|(entity, child, evaluations)| HealthEvaluation::entity(entity, child, evaluations))
            .collect::<Result<Vec<_>, _>>()?;
        let unhealthy = children.len() as u64;
        build(state, children, unhealthy, total, max).map(Some)
    }

    /// Like [`into_evaluation`](Self::into_evaluation), but only an Error
    /// group produces one.
    pub fn into_error_evaluation<F>(self, build: F) -> Result<Option<HealthEvaluation>, EvaluationError>
    where
        F: FnOnce(HealthState, Vec<HealthEvaluation>, u64, u64, Percent) -> Result<HealthEvaluation, EvaluationError>,
    {
        if self.health_state() != HealthState::Error {
            return Ok(None);
        }
        self.into_evaluation(build)
    }
}
