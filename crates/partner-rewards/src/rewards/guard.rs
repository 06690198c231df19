use super::conditions::coercion::text_as_number;
use super::domain::{
    ConditionEntity, ConditionOperator, ConditionValue, EventType, Reward, RewardCondition,
    RewardType,
};
use crate::config::RewardsConfig;

/// Validation errors raised before a reward is stored.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum RewardViolation {
    #[error("reward amount must be a finite, non-negative number (found {0})")]
    InvalidAmount(f64),
    #[error("reward amount cannot exceed {max} minor units (found {amount})")]
    AmountTooLarge { amount: f64, max: f64 },
    #[error("percentage rewards cannot exceed 100% (found {0})")]
    PercentageOverCap(f64),
    #[error("{event} rewards only support flat amounts")]
    PercentageOnNonSale { event: EventType },
    #[error("reward declares {found} modifiers (max {max})")]
    TooManyModifiers { max: usize, found: usize },
    #[error("modifier {modifier} declares {found} conditions (max {max})")]
    TooManyConditions {
        modifier: usize,
        max: usize,
        found: usize,
    },
    #[error("modifier {modifier} has no conditions")]
    EmptyModifier { modifier: usize },
    #[error("modifier {modifier} amount must be a finite, non-negative number (found {amount})")]
    InvalidModifierAmount { modifier: usize, amount: f64 },
    #[error("modifier {modifier} amount cannot exceed {max} minor units (found {amount})")]
    ModifierAmountTooLarge {
        modifier: usize,
        amount: f64,
        max: f64,
    },
    #[error("modifier {modifier} references unknown attribute {entity}.{attribute}")]
    UnknownAttribute {
        modifier: usize,
        entity: ConditionEntity,
        attribute: String,
    },
    #[error("modifier {modifier} uses {operator}, which expects a list value")]
    ExpectedList {
        modifier: usize,
        operator: ConditionOperator,
    },
    #[error("modifier {modifier} uses {operator}, which expects a single value")]
    ExpectedScalar {
        modifier: usize,
        operator: ConditionOperator,
    },
    #[error("modifier {modifier} compares {attribute} against a non-numeric threshold")]
    NonNumericThreshold { modifier: usize, attribute: String },
}

const DEFAULT_MAX_MODIFIERS: usize = 20;
const DEFAULT_MAX_CONDITIONS: usize = 10;

/// Ceiling for flat amounts, in minor units per event.
pub const MAX_FLAT_AMOUNT: f64 = 1_000_000_000_000.0;

/// Limits applied while validating reward configuration.
#[derive(Debug, Clone)]
pub struct RewardPolicy {
    max_modifiers: usize,
    max_conditions_per_modifier: usize,
}

impl RewardPolicy {
    pub fn new(max_modifiers: usize, max_conditions_per_modifier: usize) -> Self {
        Self {
            max_modifiers: if max_modifiers > 0 {
                max_modifiers
            } else {
                DEFAULT_MAX_MODIFIERS
            },
            max_conditions_per_modifier: if max_conditions_per_modifier > 0 {
                max_conditions_per_modifier
            } else {
                DEFAULT_MAX_CONDITIONS
            },
        }
    }

    pub fn max_modifiers(&self) -> usize {
        self.max_modifiers
    }

    pub fn max_conditions_per_modifier(&self) -> usize {
        self.max_conditions_per_modifier
    }
}

impl Default for RewardPolicy {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_MODIFIERS, DEFAULT_MAX_CONDITIONS)
    }
}

impl From<&RewardsConfig> for RewardPolicy {
    fn from(config: &RewardsConfig) -> Self {
        Self::new(config.max_modifiers, config.max_conditions_per_modifier)
    }
}

/// Guard that keeps malformed rewards away from the condition engine.
#[derive(Debug, Clone, Default)]
pub struct RewardGuard {
    policy: RewardPolicy,
}

impl RewardGuard {
    pub fn with_policy(policy: RewardPolicy) -> Self {
        Self { policy }
    }

    pub fn from_config(config: &RewardsConfig) -> Self {
        Self::with_policy(RewardPolicy::from(config))
    }

    pub fn policy(&self) -> &RewardPolicy {
        &self.policy
    }

    /// Report the first violation in modifier/condition order.
    pub fn validate(&self, reward: &Reward) -> Result<(), RewardViolation> {
        if !is_valid_amount(reward.amount) {
            return Err(RewardViolation::InvalidAmount(reward.amount));
        }

        if reward.reward_type == RewardType::Flat && reward.amount > MAX_FLAT_AMOUNT {
            return Err(RewardViolation::AmountTooLarge {
                amount: reward.amount,
                max: MAX_FLAT_AMOUNT,
            });
        }

        if reward.reward_type == RewardType::Percentage {
            if reward.event != EventType::Sale {
                return Err(RewardViolation::PercentageOnNonSale {
                    event: reward.event,
                });
            }
            if reward.amount > 100.0 {
                return Err(RewardViolation::PercentageOverCap(reward.amount));
            }
        }

        if reward.modifiers.len() > self.policy.max_modifiers {
            return Err(RewardViolation::TooManyModifiers {
                max: self.policy.max_modifiers,
                found: reward.modifiers.len(),
            });
        }

        for (modifier, group) in reward.modifiers.iter().enumerate() {
            if group.conditions.is_empty() {
                return Err(RewardViolation::EmptyModifier { modifier });
            }
            if group.conditions.len() > self.policy.max_conditions_per_modifier {
                return Err(RewardViolation::TooManyConditions {
                    modifier,
                    max: self.policy.max_conditions_per_modifier,
                    found: group.conditions.len(),
                });
            }
            if !is_valid_amount(group.amount) {
                return Err(RewardViolation::InvalidModifierAmount {
                    modifier,
                    amount: group.amount,
                });
            }
            match reward.reward_type {
                RewardType::Percentage if group.amount > 100.0 => {
                    return Err(RewardViolation::PercentageOverCap(group.amount));
                }
                RewardType::Flat if group.amount > MAX_FLAT_AMOUNT => {
                    return Err(RewardViolation::ModifierAmountTooLarge {
                        modifier,
                        amount: group.amount,
                        max: MAX_FLAT_AMOUNT,
                    });
                }
                _ => {}
            }

            for condition in &group.conditions {
                validate_condition(modifier, condition)?;
            }
        }

        Ok(())
    }
}

fn is_valid_amount(amount: f64) -> bool {
    amount.is_finite() && amount >= 0.0
}

fn validate_condition(modifier: usize, condition: &RewardCondition) -> Result<(), RewardViolation> {
    if !condition.entity.supports(&condition.attribute) {
        return Err(RewardViolation::UnknownAttribute {
            modifier,
            entity: condition.entity,
            attribute: condition.attribute.clone(),
        });
    }

    match (condition.operator.expects_list(), condition.value.is_list()) {
        (true, false) => {
            return Err(RewardViolation::ExpectedList {
                modifier,
                operator: condition.operator,
            })
        }
        (false, true) => {
            return Err(RewardViolation::ExpectedScalar {
                modifier,
                operator: condition.operator,
            })
        }
        _ => {}
    }

    if condition.operator.is_numeric() && !has_numeric_reading(&condition.value) {
        return Err(RewardViolation::NonNumericThreshold {
            modifier,
            attribute: condition.attribute.clone(),
        });
    }

    Ok(())
}

fn has_numeric_reading(value: &ConditionValue) -> bool {
    match value {
        ConditionValue::Number(number) => number.is_finite(),
        ConditionValue::Text(text) => {
            !text.trim().is_empty() && text_as_number(text).is_finite()
        }
        ConditionValue::NumberList(_) | ConditionValue::TextList(_) => false,
    }
}
