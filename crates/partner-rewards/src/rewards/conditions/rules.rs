use tracing::warn;

use super::super::domain::{
    AttributeValue, ConditionOperator, ConditionValue, RewardCondition, RewardContext,
};
use super::coercion::{
    attribute_as_number, attribute_as_text, condition_as_number, condition_as_text,
};

/// Evaluate one condition against the context snapshot.
///
/// An attribute that was never collected fails every operator, negative ones included, so a
/// reward cannot fire on data the platform does not have yet.
pub fn evaluate_condition(condition: &RewardCondition, context: Option<&RewardContext>) -> bool {
    let Some(field) = context.and_then(|ctx| ctx.attribute(condition.entity, &condition.attribute))
    else {
        return false;
    };

    match condition.operator {
        ConditionOperator::EqualsTo => strictly_equal(field, &condition.value),
        ConditionOperator::NotEquals => !strictly_equal(field, &condition.value),
        ConditionOperator::In => membership(condition, field).unwrap_or(false),
        ConditionOperator::NotIn => membership(condition, field)
            .map(|found| !found)
            .unwrap_or(false),
        ConditionOperator::StartsWith => {
            attribute_as_text(field).starts_with(&*condition_as_text(&condition.value))
        }
        ConditionOperator::EndsWith => {
            attribute_as_text(field).ends_with(&*condition_as_text(&condition.value))
        }
        ConditionOperator::GreaterThan => compare(field, &condition.value, |lhs, rhs| lhs > rhs),
        ConditionOperator::GreaterThanOrEqual => {
            compare(field, &condition.value, |lhs, rhs| lhs >= rhs)
        }
        ConditionOperator::LessThan => compare(field, &condition.value, |lhs, rhs| lhs < rhs),
        ConditionOperator::LessThanOrEqual => {
            compare(field, &condition.value, |lhs, rhs| lhs <= rhs)
        }
    }
}

fn strictly_equal(field: &AttributeValue, expected: &ConditionValue) -> bool {
    match (field, expected) {
        (AttributeValue::Text(actual), ConditionValue::Text(expected)) => actual == expected,
        (AttributeValue::Number(actual), ConditionValue::Number(expected)) => actual == expected,
        _ => false,
    }
}

/// `None` when the condition carries a scalar where a list is required.
fn membership(condition: &RewardCondition, field: &AttributeValue) -> Option<bool> {
    match &condition.value {
        ConditionValue::TextList(items) => Some(match field {
            AttributeValue::Text(actual) => items.iter().any(|item| item == actual),
            _ => false,
        }),
        ConditionValue::NumberList(items) => Some(match field {
            AttributeValue::Number(actual) => items.iter().any(|item| item == actual),
            _ => false,
        }),
        ConditionValue::Text(_) | ConditionValue::Number(_) => {
            warn!(
                entity = %condition.entity,
                attribute = %condition.attribute,
                operator = %condition.operator,
                "membership condition configured with a scalar value; treating as no match"
            );
            None
        }
    }
}

fn compare<F>(field: &AttributeValue, expected: &ConditionValue, cmp: F) -> bool
where
    F: Fn(f64, f64) -> bool,
{
    let lhs = attribute_as_number(field);
    let rhs = condition_as_number(expected);
    if lhs.is_nan() || rhs.is_nan() {
        return false;
    }
    cmp(lhs, rhs)
}
