use std::fmt;

use serde::{Deserialize, Deserializer, Serialize};

/// Identifier wrapper for partner programs.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ProgramId(pub String);

/// Identifier wrapper for configured rewards.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RewardId(pub String);

/// Commission-triggering event a reward pays out for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventType {
    Click,
    Lead,
    Sale,
}

impl EventType {
    pub const fn label(self) -> &'static str {
        match self {
            EventType::Click => "click",
            EventType::Lead => "lead",
            EventType::Sale => "sale",
        }
    }
}

impl fmt::Display for EventType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// How a reward amount translates into earnings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RewardType {
    /// Fixed amount in minor currency units per event.
    Flat,
    /// Percent of the sale amount.
    Percentage,
}

/// Entity a reward condition reads its attribute from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConditionEntity {
    Customer,
    Sale,
    Partner,
}

const CUSTOMER_ATTRIBUTES: &[&str] = &["country"];
const SALE_ATTRIBUTES: &[&str] = &["productId"];
const PARTNER_ATTRIBUTES: &[&str] = &[
    "country",
    "totalClicks",
    "totalLeads",
    "totalConversions",
    "totalSaleAmount",
    "totalCommissions",
];

impl ConditionEntity {
    pub const fn label(self) -> &'static str {
        match self {
            ConditionEntity::Customer => "customer",
            ConditionEntity::Sale => "sale",
            ConditionEntity::Partner => "partner",
        }
    }

    /// Attribute names the context snapshot carries for this entity.
    pub const fn attributes(self) -> &'static [&'static str] {
        match self {
            ConditionEntity::Customer => CUSTOMER_ATTRIBUTES,
            ConditionEntity::Sale => SALE_ATTRIBUTES,
            ConditionEntity::Partner => PARTNER_ATTRIBUTES,
        }
    }

    pub fn supports(self, attribute: &str) -> bool {
        self.attributes().contains(&attribute)
    }
}

impl fmt::Display for ConditionEntity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Comparison applied between a context attribute and the configured value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConditionOperator {
    EqualsTo,
    NotEquals,
    In,
    NotIn,
    StartsWith,
    EndsWith,
    GreaterThan,
    GreaterThanOrEqual,
    LessThan,
    LessThanOrEqual,
}

impl ConditionOperator {
    pub const fn label(self) -> &'static str {
        match self {
            ConditionOperator::EqualsTo => "equals_to",
            ConditionOperator::NotEquals => "not_equals",
            ConditionOperator::In => "in",
            ConditionOperator::NotIn => "not_in",
            ConditionOperator::StartsWith => "starts_with",
            ConditionOperator::EndsWith => "ends_with",
            ConditionOperator::GreaterThan => "greater_than",
            ConditionOperator::GreaterThanOrEqual => "greater_than_or_equal",
            ConditionOperator::LessThan => "less_than",
            ConditionOperator::LessThanOrEqual => "less_than_or_equal",
        }
    }

    /// Membership operators compare against a list value.
    pub const fn expects_list(self) -> bool {
        matches!(self, ConditionOperator::In | ConditionOperator::NotIn)
    }

    pub const fn is_numeric(self) -> bool {
        matches!(
            self,
            ConditionOperator::GreaterThan
                | ConditionOperator::GreaterThanOrEqual
                | ConditionOperator::LessThan
                | ConditionOperator::LessThanOrEqual
        )
    }
}

impl fmt::Display for ConditionOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Expected value configured on a condition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ConditionValue {
    Number(f64),
    Text(String),
    NumberList(Vec<f64>),
    TextList(Vec<String>),
}

impl ConditionValue {
    pub fn is_list(&self) -> bool {
        matches!(
            self,
            ConditionValue::NumberList(_) | ConditionValue::TextList(_)
        )
    }
}

impl From<&str> for ConditionValue {
    fn from(value: &str) -> Self {
        ConditionValue::Text(value.to_string())
    }
}

impl From<f64> for ConditionValue {
    fn from(value: f64) -> Self {
        ConditionValue::Number(value)
    }
}

/// Single predicate over one context attribute.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RewardCondition {
    pub entity: ConditionEntity,
    pub attribute: String,
    pub operator: ConditionOperator,
    pub value: ConditionValue,
}

/// Boolean composition applied across the conditions of a group.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum GroupOperator {
    And,
    Or,
}

/// Reward tier: authorizes `amount` when its conditions match.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RewardConditionGroup {
    pub operator: GroupOperator,
    pub amount: f64,
    #[serde(default)]
    pub conditions: Vec<RewardCondition>,
}

/// Attribute captured in a context snapshot. `Null` is an explicit null, distinct from an
/// attribute that was never collected.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AttributeValue {
    Null,
    Number(f64),
    Text(String),
}

impl From<&str> for AttributeValue {
    fn from(value: &str) -> Self {
        AttributeValue::Text(value.to_string())
    }
}

impl From<String> for AttributeValue {
    fn from(value: String) -> Self {
        AttributeValue::Text(value)
    }
}

impl From<f64> for AttributeValue {
    fn from(value: f64) -> Self {
        AttributeValue::Number(value)
    }
}

fn present<'de, D>(deserializer: D) -> Result<Option<AttributeValue>, D::Error>
where
    D: Deserializer<'de>,
{
    AttributeValue::deserialize(deserializer).map(Some)
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomerContext {
    #[serde(
        default,
        deserialize_with = "present",
        skip_serializing_if = "Option::is_none"
    )]
    pub country: Option<AttributeValue>,
}

impl CustomerContext {
    pub fn attribute(&self, name: &str) -> Option<&AttributeValue> {
        match name {
            "country" => self.country.as_ref(),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SaleContext {
    #[serde(
        default,
        deserialize_with = "present",
        skip_serializing_if = "Option::is_none"
    )]
    pub product_id: Option<AttributeValue>,
}

impl SaleContext {
    pub fn attribute(&self, name: &str) -> Option<&AttributeValue> {
        match name {
            "productId" => self.product_id.as_ref(),
            _ => None,
        }
    }
}

/// Partner profile and lifetime aggregates at the time of the event.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PartnerContext {
    #[serde(
        default,
        deserialize_with = "present",
        skip_serializing_if = "Option::is_none"
    )]
    pub country: Option<AttributeValue>,
    #[serde(
        default,
        deserialize_with = "present",
        skip_serializing_if = "Option::is_none"
    )]
    pub total_clicks: Option<AttributeValue>,
    #[serde(
        default,
        deserialize_with = "present",
        skip_serializing_if = "Option::is_none"
    )]
    pub total_leads: Option<AttributeValue>,
    #[serde(
        default,
        deserialize_with = "present",
        skip_serializing_if = "Option::is_none"
    )]
    pub total_conversions: Option<AttributeValue>,
    #[serde(
        default,
        deserialize_with = "present",
        skip_serializing_if = "Option::is_none"
    )]
    pub total_sale_amount: Option<AttributeValue>,
    #[serde(
        default,
        deserialize_with = "present",
        skip_serializing_if = "Option::is_none"
    )]
    pub total_commissions: Option<AttributeValue>,
}

impl PartnerContext {
    pub fn attribute(&self, name: &str) -> Option<&AttributeValue> {
        match name {
            "country" => self.country.as_ref(),
            "totalClicks" => self.total_clicks.as_ref(),
            "totalLeads" => self.total_leads.as_ref(),
            "totalConversions" => self.total_conversions.as_ref(),
            "totalSaleAmount" => self.total_sale_amount.as_ref(),
            "totalCommissions" => self.total_commissions.as_ref(),
            _ => None,
        }
    }
}

/// Immutable snapshot of customer, sale, and partner attributes for one event.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RewardContext {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub customer: Option<CustomerContext>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sale: Option<SaleContext>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub partner: Option<PartnerContext>,
}

impl RewardContext {
    /// Resolve `entity.attribute`, returning `None` when either was never collected.
    pub fn attribute(&self, entity: ConditionEntity, attribute: &str) -> Option<&AttributeValue> {
        match entity {
            ConditionEntity::Customer => self.customer.as_ref()?.attribute(attribute),
            ConditionEntity::Sale => self.sale.as_ref()?.attribute(attribute),
            ConditionEntity::Partner => self.partner.as_ref()?.attribute(attribute),
        }
    }
}

/// Program reward for one event type, optionally refined by modifier groups.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Reward {
    pub id: RewardId,
    pub program_id: ProgramId,
    pub event: EventType,
    #[serde(rename = "type")]
    pub reward_type: RewardType,
    pub amount: f64,
    /// Months a customer keeps generating sale commissions. `None` is lifetime, `0` is the
    /// first sale only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_duration: Option<u32>,
    #[serde(default)]
    pub modifiers: Vec<RewardConditionGroup>,
}

/// Effective reward for a partner once modifiers have been applied.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PartnerReward {
    pub reward_id: RewardId,
    pub event: EventType,
    #[serde(rename = "type")]
    pub reward_type: RewardType,
    pub amount: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_duration: Option<u32>,
    /// Index into `Reward::modifiers` of the winning group, if any matched.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub modifier_index: Option<usize>,
}
