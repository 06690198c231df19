use super::super::domain::{GroupOperator, RewardConditionGroup, RewardContext};
use super::rules::evaluate_condition;

/// Combine a group's conditions under its AND/OR operator.
///
/// A group without conditions never matches, so a half-configured tier cannot pay out to
/// every partner.
pub fn evaluate_group(group: &RewardConditionGroup, context: Option<&RewardContext>) -> bool {
    if group.conditions.is_empty() {
        return false;
    }

    match group.operator {
        GroupOperator::And => group
            .conditions
            .iter()
            .all(|condition| evaluate_condition(condition, context)),
        GroupOperator::Or => group
            .conditions
            .iter()
            .any(|condition| evaluate_condition(condition, context)),
    }
}
