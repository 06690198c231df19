use chrono::{DateTime, Months, Utc};
use serde::{Deserialize, Serialize};

use super::conditions::select_winner;
use super::domain::{EventType, PartnerReward, Reward, RewardContext, RewardType};

/// Apply the reward's modifiers to the context and return the effective reward.
///
/// The winning modifier's amount replaces the base amount. Without a match the base reward
/// applies unchanged.
pub fn determine_partner_reward(reward: &Reward, context: Option<&RewardContext>) -> PartnerReward {
    let winner = select_winner(&reward.modifiers, context);

    PartnerReward {
        reward_id: reward.id.clone(),
        event: reward.event,
        reward_type: reward.reward_type,
        amount: winner.map_or(reward.amount, |(_, group)| group.amount),
        max_duration: reward.max_duration,
        modifier_index: winner.map(|(index, _)| index),
    }
}

fn default_quantity() -> u32 {
    1
}

/// The event a partner is being paid for.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommissionEvent {
    #[serde(default = "default_quantity")]
    pub quantity: u32,
    /// Sale amount in minor currency units; required for percentage rewards.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sale_amount: Option<i64>,
    /// When the customer first generated a commission, if ever.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub first_commission_at: Option<DateTime<Utc>>,
    pub occurred_at: DateTime<Utc>,
}

/// Reasons an event's earnings cannot be computed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum EarningsError {
    #[error("percentage reward requires a sale amount")]
    MissingSaleAmount,
    #[error("earnings exceed the representable range of minor units")]
    Overflow,
}

/// Earnings in minor currency units, rounded half away from zero.
pub fn calculate_earnings(
    reward: &PartnerReward,
    event: &CommissionEvent,
) -> Result<i64, EarningsError> {
    let raw = match reward.reward_type {
        RewardType::Flat => reward.amount * f64::from(event.quantity),
        RewardType::Percentage => {
            let sale_amount = event.sale_amount.ok_or(EarningsError::MissingSaleAmount)?;
            sale_amount as f64 * reward.amount / 100.0
        }
    };

    // i64::MAX as f64 rounds up to 2^63, which is itself out of range.
    let rounded = raw.round();
    if rounded.is_finite() && rounded >= i64::MIN as f64 && rounded < i64::MAX as f64 {
        Ok(rounded as i64)
    } else {
        Err(EarningsError::Overflow)
    }
}

/// Whether a sale still falls inside the reward's recurring commission window.
pub fn within_recurring_window(reward: &PartnerReward, event: &CommissionEvent) -> bool {
    if reward.event != EventType::Sale {
        return true;
    }

    let (Some(max_duration), Some(first_commission_at)) =
        (reward.max_duration, event.first_commission_at)
    else {
        return true;
    };

    if max_duration == 0 {
        return false;
    }

    match first_commission_at.checked_add_months(Months::new(max_duration)) {
        Some(window_end) => event.occurred_at < window_end,
        None => true,
    }
}

/// Outcome of quoting a commission for one event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum CommissionDecision {
    Payable { earnings: i64 },
    OutsideRecurringWindow { max_duration: u32 },
    MissingSaleAmount,
    EarningsOverflow,
}

impl CommissionDecision {
    pub fn summary(&self) -> String {
        match self {
            CommissionDecision::Payable { earnings } => {
                format!("commission payable: {earnings} minor units")
            }
            CommissionDecision::OutsideRecurringWindow { max_duration } => {
                if *max_duration == 0 {
                    "no commission: reward only pays on the first sale".to_string()
                } else {
                    format!("no commission: recurring window of {max_duration} month(s) elapsed")
                }
            }
            CommissionDecision::MissingSaleAmount => {
                "no commission: percentage reward requires a sale amount".to_string()
            }
            CommissionDecision::EarningsOverflow => {
                "no commission: earnings exceed the representable range".to_string()
            }
        }
    }
}

/// Effective reward and commission decision for an event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommissionQuote {
    pub reward: PartnerReward,
    pub decision: CommissionDecision,
}

impl CommissionQuote {
    pub fn earnings(&self) -> i64 {
        match self.decision {
            CommissionDecision::Payable { earnings } => earnings,
            _ => 0,
        }
    }
}

pub fn quote_commission(
    reward: &Reward,
    context: Option<&RewardContext>,
    event: &CommissionEvent,
) -> CommissionQuote {
    let partner_reward = determine_partner_reward(reward, context);

    let decision = if !within_recurring_window(&partner_reward, event) {
        CommissionDecision::OutsideRecurringWindow {
            max_duration: partner_reward.max_duration.unwrap_or_default(),
        }
    } else {
        match calculate_earnings(&partner_reward, event) {
            Ok(earnings) => CommissionDecision::Payable { earnings },
            Err(EarningsError::MissingSaleAmount) => CommissionDecision::MissingSaleAmount,
            Err(EarningsError::Overflow) => CommissionDecision::EarningsOverflow,
        }
    };

    CommissionQuote {
        reward: partner_reward,
        decision,
    }
}
