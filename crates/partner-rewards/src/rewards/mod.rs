//! Partner reward configuration, condition evaluation, and commission quoting.
//!
//! The condition engine in [`conditions`] is a pure function over a reward's modifier groups
//! and a context snapshot. Everything around it (guard, repository, service, router) prepares
//! its inputs and turns its decision into a commission quote.

pub mod commission;
pub mod conditions;
pub mod domain;
pub(crate) mod guard;
pub mod repository;
pub mod router;
pub mod service;

#[cfg(test)]
mod tests;

pub use commission::{
    calculate_earnings, determine_partner_reward, quote_commission, within_recurring_window,
    CommissionDecision, CommissionEvent, CommissionQuote, EarningsError,
};
pub use conditions::{
    evaluate_condition, evaluate_group, evaluate_reward_conditions, EvaluationRequest,
    EvaluationResponse,
};
pub use domain::{
    AttributeValue, ConditionEntity, ConditionOperator, ConditionValue, CustomerContext,
    EventType, GroupOperator, PartnerContext, PartnerReward, ProgramId, Reward, RewardCondition,
    RewardConditionGroup, RewardContext, RewardId, RewardType, SaleContext,
};
pub use guard::{RewardGuard, RewardPolicy, RewardViolation, MAX_FLAT_AMOUNT};
pub use repository::{RepositoryError, RewardRepository, RewardSummaryView};
pub use router::reward_router;
pub use service::{QuoteRequest, RewardProgramService, RewardServiceError};
