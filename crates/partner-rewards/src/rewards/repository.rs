use serde::Serialize;

use super::domain::{EventType, ProgramId, Reward, RewardId, RewardType};

/// Storage abstraction so the service module can be exercised in isolation.
///
/// A program holds at most one reward per event type; `upsert` replaces the existing one.
pub trait RewardRepository: Send + Sync {
    fn upsert(&self, reward: Reward) -> Result<Reward, RepositoryError>;
    fn fetch(
        &self,
        program_id: &ProgramId,
        event: EventType,
    ) -> Result<Option<Reward>, RepositoryError>;
    fn list(&self, program_id: &ProgramId) -> Result<Vec<Reward>, RepositoryError>;
}

/// Error enumeration for repository failures.
#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("repository unavailable: {0}")]
    Unavailable(String),
}

/// Condensed listing entry for a configured reward.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RewardSummaryView {
    pub reward_id: RewardId,
    pub event: EventType,
    #[serde(rename = "type")]
    pub reward_type: RewardType,
    pub amount: f64,
    pub modifier_count: usize,
    pub description: String,
}

impl From<&Reward> for RewardSummaryView {
    fn from(reward: &Reward) -> Self {
        let base = match reward.reward_type {
            RewardType::Flat => format!("{} minor units per {}", reward.amount, reward.event),
            RewardType::Percentage => format!("{}% of each {}", reward.amount, reward.event),
        };
        let duration = match reward.max_duration {
            None => String::new(),
            Some(0) => ", first sale only".to_string(),
            Some(months) => format!(", for {months} month(s)"),
        };
        let modifiers = match reward.modifiers.len() {
            0 => String::new(),
            1 => ", 1 modifier".to_string(),
            count => format!(", {count} modifiers"),
        };

        Self {
            reward_id: reward.id.clone(),
            event: reward.event,
            reward_type: reward.reward_type,
            amount: reward.amount,
            modifier_count: reward.modifiers.len(),
            description: format!("{base}{duration}{modifiers}"),
        }
    }
}
