use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::commission::{quote_commission, CommissionEvent, CommissionQuote};
use super::domain::{EventType, ProgramId, Reward, RewardContext};
use super::guard::{RewardGuard, RewardPolicy, RewardViolation};
use super::repository::{RepositoryError, RewardRepository};

/// Service composing the reward guard, repository, and condition engine.
pub struct RewardProgramService<R> {
    guard: Arc<RewardGuard>,
    repository: Arc<R>,
}

/// Commission quote request for a single event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuoteRequest {
    pub event: EventType,
    #[serde(default)]
    pub context: Option<RewardContext>,
    #[serde(flatten)]
    pub commission: CommissionEvent,
}

impl<R> RewardProgramService<R>
where
    R: RewardRepository + 'static,
{
    pub fn new(repository: Arc<R>, policy: RewardPolicy) -> Self {
        Self::with_guard(RewardGuard::with_policy(policy), repository)
    }

    pub fn with_guard(guard: RewardGuard, repository: Arc<R>) -> Self {
        Self {
            guard: Arc::new(guard),
            repository,
        }
    }

    /// Validate and store a reward, replacing the program's reward for the same event.
    pub fn configure(&self, reward: Reward) -> Result<Reward, RewardServiceError> {
        self.guard.validate(&reward)?;
        let stored = self.repository.upsert(reward)?;
        debug!(
            program = %stored.program_id.0,
            event = %stored.event,
            modifiers = stored.modifiers.len(),
            "reward configured"
        );
        Ok(stored)
    }

    pub fn rewards(&self, program_id: &ProgramId) -> Result<Vec<Reward>, RewardServiceError> {
        Ok(self.repository.list(program_id)?)
    }

    /// Quote the commission a partner earns for one event.
    pub fn quote(
        &self,
        program_id: &ProgramId,
        request: &QuoteRequest,
    ) -> Result<CommissionQuote, RewardServiceError> {
        let reward = self
            .repository
            .fetch(program_id, request.event)?
            .ok_or_else(|| RewardServiceError::NoReward {
                program: program_id.0.clone(),
                event: request.event,
            })?;

        let quote = quote_commission(&reward, request.context.as_ref(), &request.commission);
        debug!(
            program = %program_id.0,
            event = %request.event,
            modifier = ?quote.reward.modifier_index,
            earnings = quote.earnings(),
            "commission quoted"
        );
        Ok(quote)
    }
}

/// Error raised by the reward program service.
#[derive(Debug, thiserror::Error)]
pub enum RewardServiceError {
    #[error(transparent)]
    Violation(#[from] RewardViolation),
    #[error(transparent)]
    Repository(#[from] RepositoryError),
    #[error("program {program} has no {event} reward configured")]
    NoReward { program: String, event: EventType },
}
