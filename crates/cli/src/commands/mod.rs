//! Subcommand implementations. Each returns the JSON document to print.

use anyhow::Context;
use serde_json::{Value, json};

use packflow_forecasting::{DoiGoal, SafetyBufferRatio, TieBreak};
use packflow_infra::{EngineConfig, InMemoryService, Snapshot};

use crate::EngineArgs;

/// Environment config with command-line overrides applied.
fn engine_config(args: &EngineArgs) -> anyhow::Result<EngineConfig> {
    let mut config = EngineConfig::from_env();
    if let Some(days) = args.doi_goal {
        config.doi_goal = DoiGoal::try_from(days)?;
    }
    if let Some(ratio) = args.safety_buffer {
        config.safety_buffer = SafetyBufferRatio::new(ratio)?;
    }
    if let Some(tie_break) = &args.tie_break {
        config.tie_break = tie_break.parse::<TieBreak>()?;
    }
    Ok(config)
}

fn service(args: &EngineArgs) -> anyhow::Result<InMemoryService> {
    let config = engine_config(args)?;
    let snapshot = Snapshot::load(&args.snapshot)
        .with_context(|| format!("loading {}", args.snapshot.display()))?;
    tracing::info!(
        items = snapshot.inventory.len(),
        demand = snapshot.demand.len(),
        "snapshot loaded"
    );
    Ok(snapshot.into_service().with_config(config))
}

pub fn recommend(args: &EngineArgs) -> anyhow::Result<Value> {
    let set = service(args)?.recommend()?;
    Ok(serde_json::to_value(set)?)
}

pub fn draft(args: &EngineArgs, supplier: &str) -> anyhow::Result<Value> {
    let draft = service(args)?.draft_for_supplier(supplier)?;
    let validation = match draft.validate() {
        Ok(()) => json!({ "valid": true }),
        Err(err) => json!({
            "valid": false,
            "error": err.to_string(),
            "lines": err.offending_lines(),
        }),
    };
    Ok(json!({ "draft": draft, "validation": validation }))
}
