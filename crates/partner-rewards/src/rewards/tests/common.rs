use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use axum::response::Response;
use chrono::{DateTime, TimeZone, Utc};
use serde_json::Value;

use crate::rewards::commission::CommissionEvent;
use crate::rewards::domain::{
    ConditionEntity, ConditionOperator, ConditionValue, EventType, GroupOperator,
    PartnerContext, ProgramId, Reward, RewardCondition, RewardConditionGroup, RewardContext,
    RewardId, RewardType,
};
use crate::rewards::guard::{RewardGuard, RewardPolicy};
use crate::rewards::repository::{RepositoryError, RewardRepository};
use crate::rewards::service::{QuoteRequest, RewardProgramService};
use crate::rewards::reward_router;

pub(super) fn program() -> ProgramId {
    ProgramId("prog_acme".to_string())
}

pub(super) fn condition(
    entity: ConditionEntity,
    attribute: &str,
    operator: ConditionOperator,
    value: ConditionValue,
) -> RewardCondition {
    RewardCondition {
        entity,
        attribute: attribute.to_string(),
        operator,
        value,
    }
}

pub(super) fn country_bonus(country: &str, amount: f64) -> RewardConditionGroup {
    RewardConditionGroup {
        operator: GroupOperator::And,
        amount,
        conditions: vec![condition(
            ConditionEntity::Partner,
            "country",
            ConditionOperator::EqualsTo,
            country.into(),
        )],
    }
}

pub(super) fn volume_bonus(min_conversions: &str, amount: f64) -> RewardConditionGroup {
    RewardConditionGroup {
        operator: GroupOperator::And,
        amount,
        conditions: vec![condition(
            ConditionEntity::Partner,
            "totalConversions",
            ConditionOperator::GreaterThanOrEqual,
            min_conversions.into(),
        )],
    }
}

pub(super) fn sale_reward() -> Reward {
    Reward {
        id: RewardId("rw_sale".to_string()),
        program_id: program(),
        event: EventType::Sale,
        reward_type: RewardType::Percentage,
        amount: 10.0,
        max_duration: Some(12),
        modifiers: vec![country_bonus("CA", 15.0), volume_bonus("50", 25.0)],
    }
}

pub(super) fn lead_reward() -> Reward {
    Reward {
        id: RewardId("rw_lead".to_string()),
        program_id: program(),
        event: EventType::Lead,
        reward_type: RewardType::Flat,
        amount: 300.0,
        max_duration: None,
        modifiers: vec![country_bonus("US", 500.0)],
    }
}

pub(super) fn partner(country: &str, total_conversions: f64) -> RewardContext {
    RewardContext {
        partner: Some(PartnerContext {
            country: Some(country.into()),
            total_conversions: Some(total_conversions.into()),
            ..PartnerContext::default()
        }),
        ..RewardContext::default()
    }
}

pub(super) fn at(year: i32, month: u32, day: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(year, month, day, 9, 30, 0)
        .single()
        .expect("valid timestamp")
}

pub(super) fn sale_quote(context: RewardContext, sale_amount: i64) -> QuoteRequest {
    QuoteRequest {
        event: EventType::Sale,
        context: Some(context),
        commission: CommissionEvent {
            quantity: 1,
            sale_amount: Some(sale_amount),
            first_commission_at: None,
            occurred_at: at(2025, 6, 1),
        },
    }
}

pub(super) fn guard() -> RewardGuard {
    RewardGuard::default()
}

pub(super) fn build_service() -> (
    Arc<MemoryRepository>,
    RewardProgramService<MemoryRepository>,
) {
    let repository = Arc::new(MemoryRepository::default());
    let service = RewardProgramService::new(repository.clone(), RewardPolicy::default());
    (repository, service)
}

pub(super) fn reward_router_with_service(
    service: RewardProgramService<MemoryRepository>,
) -> axum::Router {
    reward_router(Arc::new(service))
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}

#[derive(Default)]
pub(super) struct MemoryRepository {
    rewards: Mutex<HashMap<(ProgramId, EventType), Reward>>,
}

impl RewardRepository for MemoryRepository {
    fn upsert(&self, reward: Reward) -> Result<Reward, RepositoryError> {
        let mut guard = self.rewards.lock().expect("repository mutex poisoned");
        guard.insert((reward.program_id.clone(), reward.event), reward.clone());
        Ok(reward)
    }

    fn fetch(
        &self,
        program_id: &ProgramId,
        event: EventType,
    ) -> Result<Option<Reward>, RepositoryError> {
        let guard = self.rewards.lock().expect("repository mutex poisoned");
        Ok(guard.get(&(program_id.clone(), event)).cloned())
    }

    fn list(&self, program_id: &ProgramId) -> Result<Vec<Reward>, RepositoryError> {
        let guard = self.rewards.lock().expect("repository mutex poisoned");
        let mut rewards: Vec<Reward> = guard
            .values()
            .filter(|reward| &reward.program_id == program_id)
            .cloned()
            .collect();
        rewards.sort_by_key(|reward| reward.event);
        Ok(rewards)
    }
}

pub(super) struct UnavailableRepository;

impl RewardRepository for UnavailableRepository {
    fn upsert(&self, _reward: Reward) -> Result<Reward, RepositoryError> {
        Err(RepositoryError::Unavailable("maintenance".to_string()))
    }

    fn fetch(
        &self,
        _program_id: &ProgramId,
        _event: EventType,
    ) -> Result<Option<Reward>, RepositoryError> {
        Err(RepositoryError::Unavailable("maintenance".to_string()))
    }

    fn list(&self, _program_id: &ProgramId) -> Result<Vec<Reward>, RepositoryError> {
        Err(RepositoryError::Unavailable("maintenance".to_string()))
    }
}
