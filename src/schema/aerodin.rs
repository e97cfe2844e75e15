//! Aerodin Systems: a defense contractor governed by regulation, ethical
//! review and certification.
use super::domain::{DomainSchema, MandatoryIntermediate};
use crate::model::{TimeConfig, TimeUnit};

pub static SCHEMA: DomainSchema = DomainSchema {
    name: "aerodin",
    description: "Defense contractor - regulatory, ethical constraints, certification",
    areas: &[
        "capability",
        "regulatory_pressure",
        "political_risk",
        "ethical_scrutiny",
        "program_funding",
        "deployment_readiness",
        "workforce",
    ],
    stock_ids: &[
        "skilled_engineers",
        "junior_engineers",
        "active_defense_programs",
        "regulatory_backlog",
        "rd_knowledge",
        "certification_level",
        "public_trust_level",
        "cash_reserves",
        "certified_ai_modules",
    ],
    flow_ids: &[
        "hiring_rate",
        "attrition_rate",
        "promotion_rate",
        "training_completion",
        "program_approval_rate",
        "program_completion",
        "ethical_clearance_rate",
        "regulatory_submission_rate",
        "rd_investment",
        "knowledge_depreciation",
        "certification_progress",
        "trust_gain",
        "trust_loss",
        "revenue",
        "expenses",
    ],
    parameter_ids: &[
        "max_workforce",
        "hiring_target",
        "attrition_fraction",
        "training_time",
        "productivity_per_engineer",
        "ethical_review_time",
        "certification_requirement",
        "revenue_per_program",
        "cost_per_engineer",
        "overhead_rate",
        "regulatory_capacity",
        "political_sensitivity",
    ],
    auxiliary_ids: &[
        "total_workforce",
        "workforce_gap",
        "delivery_capacity",
        "ethical_pressure",
        "regulatory_delay",
        "deployment_readiness_index",
        "program_risk_score",
        "profit_margin",
    ],
    // Capability never converts straight into cash.
    forbidden_edges: &[("certified_ai_modules", "cash_reserves"), ("rd_knowledge", "cash_reserves")],
    // Programs only become active through the regulatory backlog.
    mandatory_intermediates: &[MandatoryIntermediate { target: "active_defense_programs", via: "regulatory_backlog" }],
    required_dependencies: &[],
    default_time: TimeConfig::new(0.0, 60.0, 1.0, TimeUnit::Months),
};
