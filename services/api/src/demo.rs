use crate::infra::InMemoryRewardRepository;
use chrono::{DateTime, Months, Utc};
use clap::Args;
use partner_rewards::error::AppError;
use partner_rewards::rewards::{
    CommissionEvent, ConditionEntity, ConditionOperator, ConditionValue, CustomerContext,
    EvaluationRequest, EventType, GroupOperator, PartnerContext, ProgramId, QuoteRequest, Reward,
    RewardCondition, RewardConditionGroup, RewardContext, RewardId, RewardPolicy,
    RewardProgramService, RewardSummaryView, RewardType, SaleContext,
};
use std::fs;
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Args, Debug)]
pub(crate) struct EvaluateArgs {
    /// JSON file holding `{ "conditions": [...], "context": {...} }`
    #[arg(long)]
    pub(crate) input: PathBuf,
    /// Pretty-print the decision
    #[arg(long)]
    pub(crate) pretty: bool,
}

#[derive(Args, Debug)]
pub(crate) struct DemoArgs {
    /// Sale amount in minor units used for the sale quotes
    #[arg(long, default_value_t = 12_900)]
    pub(crate) sale_amount: i64,
    /// Print each quote as JSON instead of a one-line summary
    #[arg(long)]
    pub(crate) json: bool,
}

pub(crate) fn run_evaluate(args: EvaluateArgs) -> Result<(), AppError> {
    let raw = fs::read_to_string(&args.input)?;
    let request: EvaluationRequest = serde_json::from_str(&raw)?;
    let response = request.resolve();

    let rendered = if args.pretty {
        serde_json::to_string_pretty(&response)?
    } else {
        serde_json::to_string(&response)?
    };
    println!("{rendered}");
    Ok(())
}

pub(crate) fn run_demo(args: DemoArgs) -> Result<(), AppError> {
    let program = ProgramId("prog_demo".to_string());
    let repository = Arc::new(InMemoryRewardRepository::default());
    let service = RewardProgramService::new(repository, RewardPolicy::default());

    for reward in demo_rewards(&program) {
        service.configure(reward)?;
    }

    println!("Partner rewards demo");
    println!("Program {} rewards:", program.0);
    for reward in service.rewards(&program)? {
        let view = RewardSummaryView::from(&reward);
        println!("- {} [{}]: {}", view.event, view.reward_id.0, view.description);
    }

    let now = Utc::now();
    println!("\nCommission quotes:");
    for (label, request) in demo_quotes(now, args.sale_amount) {
        let quote = service.quote(&program, &request)?;
        if args.json {
            println!("- {label}\n{}", serde_json::to_string_pretty(&quote)?);
            continue;
        }

        let modifier = match quote.reward.modifier_index {
            Some(index) => format!("modifier #{index}"),
            None => "base reward".to_string(),
        };
        println!(
            "- {label}: {} via {modifier} ({} {})",
            quote.decision.summary(),
            quote.reward.amount,
            match quote.reward.reward_type {
                RewardType::Flat => "flat",
                RewardType::Percentage => "%",
            }
        );
    }

    Ok(())
}

fn condition(
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

fn demo_rewards(program: &ProgramId) -> Vec<Reward> {
    let sale = Reward {
        id: RewardId("rw_demo_sale".to_string()),
        program_id: program.clone(),
        event: EventType::Sale,
        reward_type: RewardType::Percentage,
        amount: 20.0,
        max_duration: Some(12),
        modifiers: vec![
            RewardConditionGroup {
                operator: GroupOperator::And,
                amount: 30.0,
                conditions: vec![condition(
                    ConditionEntity::Sale,
                    "productId",
                    ConditionOperator::StartsWith,
                    "prod_enterprise".into(),
                )],
            },
            RewardConditionGroup {
                operator: GroupOperator::Or,
                amount: 25.0,
                conditions: vec![
                    condition(
                        ConditionEntity::Partner,
                        "totalConversions",
                        ConditionOperator::GreaterThanOrEqual,
                        ConditionValue::Number(100.0),
                    ),
                    condition(
                        ConditionEntity::Customer,
                        "country",
                        ConditionOperator::In,
                        ConditionValue::TextList(vec![
                            "SE".to_string(),
                            "NO".to_string(),
                            "DK".to_string(),
                        ]),
                    ),
                ],
            },
        ],
    };

    let lead = Reward {
        id: RewardId("rw_demo_lead".to_string()),
        program_id: program.clone(),
        event: EventType::Lead,
        reward_type: RewardType::Flat,
        amount: 500.0,
        max_duration: None,
        modifiers: vec![RewardConditionGroup {
            operator: GroupOperator::And,
            amount: 800.0,
            conditions: vec![
                condition(
                    ConditionEntity::Customer,
                    "country",
                    ConditionOperator::EqualsTo,
                    "US".into(),
                ),
                condition(
                    ConditionEntity::Partner,
                    "totalLeads",
                    ConditionOperator::GreaterThan,
                    ConditionValue::Number(10.0),
                ),
            ],
        }],
    };

    let click = Reward {
        id: RewardId("rw_demo_click".to_string()),
        program_id: program.clone(),
        event: EventType::Click,
        reward_type: RewardType::Flat,
        amount: 10.0,
        max_duration: None,
        modifiers: Vec::new(),
    };

    vec![sale, lead, click]
}

fn context(
    customer_country: Option<&str>,
    product: Option<&str>,
    partner: PartnerContext,
) -> RewardContext {
    RewardContext {
        customer: customer_country.map(|country| CustomerContext {
            country: Some(country.into()),
        }),
        sale: product.map(|product| SaleContext {
            product_id: Some(product.into()),
        }),
        partner: Some(partner),
    }
}

fn demo_quotes(now: DateTime<Utc>, sale_amount: i64) -> Vec<(&'static str, QuoteRequest)> {
    let sale_event = |first_commission_at: Option<DateTime<Utc>>| CommissionEvent {
        quantity: 1,
        sale_amount: Some(sale_amount),
        first_commission_at,
        occurred_at: now,
    };
    let veteran = PartnerContext {
        country: Some("GB".into()),
        total_conversions: Some(140.0_f64.into()),
        total_leads: Some(320.0_f64.into()),
        ..PartnerContext::default()
    };
    let newcomer = PartnerContext {
        country: Some("US".into()),
        total_conversions: Some(3.0_f64.into()),
        total_leads: Some(4.0_f64.into()),
        ..PartnerContext::default()
    };

    vec![
        (
            "enterprise sale from a new partner",
            QuoteRequest {
                event: EventType::Sale,
                context: Some(context(
                    Some("US"),
                    Some("prod_enterprise_annual"),
                    newcomer.clone(),
                )),
                commission: sale_event(None),
            },
        ),
        (
            "starter sale from a high-volume partner",
            QuoteRequest {
                event: EventType::Sale,
                context: Some(context(Some("US"), Some("prod_starter"), veteran.clone())),
                commission: sale_event(now.checked_sub_months(Months::new(2))),
            },
        ),
        (
            "renewal past the recurring window",
            QuoteRequest {
                event: EventType::Sale,
                context: Some(context(Some("SE"), Some("prod_starter"), newcomer.clone())),
                commission: sale_event(now.checked_sub_months(Months::new(14))),
            },
        ),
        (
            "US lead from a high-volume partner",
            QuoteRequest {
                event: EventType::Lead,
                context: Some(context(Some("US"), None, veteran)),
                commission: CommissionEvent {
                    quantity: 1,
                    sale_amount: None,
                    first_commission_at: None,
                    occurred_at: now,
                },
            },
        ),
        (
            "batch of clicks",
            QuoteRequest {
                event: EventType::Click,
                context: Some(context(None, None, newcomer)),
                commission: CommissionEvent {
                    quantity: 40,
                    sale_amount: None,
                    first_commission_at: None,
                    occurred_at: now,
                },
            },
        ),
    ]
}
