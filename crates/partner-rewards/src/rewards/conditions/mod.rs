pub(crate) mod coercion;
mod group;
mod rules;

pub use group::evaluate_group;
pub use rules::evaluate_condition;

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::domain::{RewardConditionGroup, RewardContext};

/// Pick the reward tier that applies to the context, if any.
///
/// Every group is evaluated. When several match, the most generous `amount` wins; equal
/// amounts resolve to the earliest group in input order. The returned reference always points
/// into `groups`.
pub fn evaluate_reward_conditions<'a>(
    groups: &'a [RewardConditionGroup],
    context: Option<&RewardContext>,
) -> Option<&'a RewardConditionGroup> {
    select_winner(groups, context).map(|(_, group)| group)
}

/// Same as [`evaluate_reward_conditions`] but also reports the winner's position.
pub(crate) fn select_winner<'a>(
    groups: &'a [RewardConditionGroup],
    context: Option<&RewardContext>,
) -> Option<(usize, &'a RewardConditionGroup)> {
    let context = context?;
    if groups.is_empty() {
        return None;
    }

    let mut matched = 0usize;
    let mut winner: Option<(usize, &'a RewardConditionGroup)> = None;

    for (index, group) in groups.iter().enumerate() {
        if !evaluate_group(group, Some(context)) {
            continue;
        }
        matched += 1;

        let replaces = match winner {
            Some((_, best)) => group.amount > best.amount,
            None => true,
        };
        if replaces {
            winner = Some((index, group));
        }
    }

    debug!(
        groups = groups.len(),
        matched,
        winner = ?winner.map(|(index, _)| index),
        amount = ?winner.map(|(_, group)| group.amount),
        "evaluated reward condition groups"
    );

    winner
}

/// Ad-hoc evaluation payload: condition groups plus the context to test them against.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvaluationRequest {
    pub conditions: Vec<RewardConditionGroup>,
    #[serde(default)]
    pub context: Option<RewardContext>,
}

impl EvaluationRequest {
    pub fn resolve(&self) -> EvaluationResponse<'_> {
        let group = evaluate_reward_conditions(&self.conditions, self.context.as_ref());
        EvaluationResponse {
            matched: group.is_some(),
            group,
        }
    }
}

/// Decision returned for an [`EvaluationRequest`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EvaluationResponse<'a> {
    pub matched: bool,
    pub group: Option<&'a RewardConditionGroup>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rewards::domain::{
        ConditionEntity, ConditionOperator, GroupOperator, PartnerContext, RewardCondition,
    };
    use serde_json::json;

    fn clicks_over(threshold: f64, amount: f64) -> RewardConditionGroup {
        RewardConditionGroup {
            operator: GroupOperator::And,
            amount,
            conditions: vec![RewardCondition {
                entity: ConditionEntity::Partner,
                attribute: "totalClicks".to_string(),
                operator: ConditionOperator::GreaterThan,
                value: threshold.into(),
            }],
        }
    }

    fn clicks(total: f64) -> RewardContext {
        RewardContext {
            partner: Some(PartnerContext {
                total_clicks: Some(total.into()),
                ..PartnerContext::default()
            }),
            ..RewardContext::default()
        }
    }

    #[test]
    fn equal_amounts_resolve_to_first_in_order() {
        let groups = vec![
            clicks_over(1.0, 500.0),
            clicks_over(10.0, 2000.0),
            clicks_over(5.0, 2000.0),
        ];
        let context = clicks(50.0);

        let (index, group) = select_winner(&groups, Some(&context)).expect("a group matches");

        assert_eq!(index, 1);
        assert!(std::ptr::eq(group, &groups[1]));
    }

    #[test]
    fn winner_ignores_input_position() {
        let context = clicks(50.0);
        let ascending = vec![clicks_over(1.0, 100.0), clicks_over(1.0, 300.0)];
        let descending = vec![clicks_over(1.0, 300.0), clicks_over(1.0, 100.0)];

        let first = evaluate_reward_conditions(&ascending, Some(&context)).expect("match");
        let second = evaluate_reward_conditions(&descending, Some(&context)).expect("match");

        assert_eq!(first.amount, 300.0);
        assert_eq!(second.amount, 300.0);
    }

    #[test]
    fn non_matching_higher_amounts_are_skipped() {
        let groups = vec![clicks_over(1000.0, 9000.0), clicks_over(1.0, 100.0)];

        let group = evaluate_reward_conditions(&groups, Some(&clicks(50.0))).expect("match");

        assert!(std::ptr::eq(group, &groups[1]));
    }

    #[test]
    fn request_resolves_from_json() {
        let request: EvaluationRequest = serde_json::from_value(json!({
            "conditions": [{
                "operator": "AND",
                "amount": 1500,
                "conditions": [
                    { "entity": "partner", "attribute": "totalClicks", "operator": "greater_than", "value": "100" }
                ]
            }],
            "context": { "partner": { "totalClicks": 101 } }
        }))
        .expect("request deserializes");

        let response = request.resolve();

        assert!(response.matched);
        assert_eq!(response.group.map(|group| group.amount), Some(1500.0));
        let body = serde_json::to_value(&response).expect("serializes");
        assert_eq!(body["group"]["amount"], json!(1500.0));
    }

    #[test]
    fn request_without_context_never_matches() {
        let request: EvaluationRequest = serde_json::from_value(json!({
            "conditions": [{
                "operator": "OR",
                "amount": 1500,
                "conditions": [
                    { "entity": "partner", "attribute": "totalClicks", "operator": "greater_than", "value": 0 }
                ]
            }],
            "context": null
        }))
        .expect("request deserializes");

        let response = request.resolve();

        assert!(!response.matched);
        assert!(response.group.is_none());
    }
}
