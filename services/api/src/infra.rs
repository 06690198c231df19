use metrics_exporter_prometheus::PrometheusHandle;
use partner_rewards::rewards::{EventType, ProgramId, RepositoryError, Reward, RewardRepository};
use std::collections::HashMap;
use std::sync::atomic::AtomicBool;
use std::sync::{Arc, Mutex, MutexGuard};

type RewardTable = HashMap<(ProgramId, EventType), Reward>;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

#[derive(Default, Clone)]
pub(crate) struct InMemoryRewardRepository {
    rewards: Arc<Mutex<RewardTable>>,
}

impl InMemoryRewardRepository {
    fn table(&self) -> Result<MutexGuard<'_, RewardTable>, RepositoryError> {
        self.rewards
            .lock()
            .map_err(|_| RepositoryError::Unavailable("reward table lock poisoned".to_string()))
    }
}

impl RewardRepository for InMemoryRewardRepository {
    fn upsert(&self, reward: Reward) -> Result<Reward, RepositoryError> {
        let mut table = self.table()?;
        table.insert((reward.program_id.clone(), reward.event), reward.clone());
        Ok(reward)
    }

    fn fetch(
        &self,
        program_id: &ProgramId,
        event: EventType,
    ) -> Result<Option<Reward>, RepositoryError> {
        let table = self.table()?;
        Ok(table.get(&(program_id.clone(), event)).cloned())
    }

    fn list(&self, program_id: &ProgramId) -> Result<Vec<Reward>, RepositoryError> {
        let table = self.table()?;
        let mut rewards: Vec<Reward> = table
            .values()
            .filter(|reward| &reward.program_id == program_id)
            .cloned()
            .collect();
        rewards.sort_by_key(|reward| reward.event);
        Ok(rewards)
    }
}
