//! Build the generation request sent to the bracket service from a validated configuration.

use crate::logic::validate::validate;
use crate::models::{
    BracketConfig, BracketFormat, CustomConfigPayload, EngineError, FormatConfig, GenerationRequest,
    GroupPayload, ParticipantId, RoundRobinConfig, SeedList, StageConfig, StageDraft, StageSpec,
};

/// Validate and convert. Refuses while the configuration has blocking violations.
pub fn build_generation_request(
    config: &BracketConfig,
    seeds: &SeedList,
) -> Result<GenerationRequest, EngineError> {
    let report = validate(config, seeds).into_result()?;
    for warning in report.warnings() {
        log::debug!("generation warning ({}): {}", warning.field, warning.message);
    }

    let format = config.format.format();
    let mut request = GenerationRequest::bare(format);
    request.default_best_of = Some(config.best_of.default);
    request.auto_advance = Some(config.auto_advance);
    if format != BracketFormat::Custom && !config.best_of.overrides.is_empty() {
        request.best_of_per_round = Some(config.best_of.overrides.clone());
    }

    match &config.format {
        FormatConfig::SingleElimination(_) => {
            request.seeds = Some(seeds.ids());
        }
        FormatConfig::DoubleElimination(c) => {
            request.seeds = Some(seeds.ids());
            request.grand_finals_reset = Some(c.grand_finals_reset);
        }
        FormatConfig::RoundRobin(rr) => {
            request.seeds = Some(rr.flattened());
            request.groups = Some(group_payloads(rr));
        }
        FormatConfig::Swiss(c) => {
            request.seeds = Some(seeds.ids());
            request.swiss_config = Some(*c);
        }
        FormatConfig::BattleRoyale(c) => {
            let mut c = c.clone();
            c.total_lobbies = c.effective_lobbies(seeds.len());
            request.seeds = Some(seeds.ids());
            request.battle_royale_config = Some(c);
        }
        FormatConfig::Custom => {
            request.custom_config = Some(CustomConfigPayload::default());
        }
        FormatConfig::MultiStage { stages } => {
            request.seeds = stages.first().and_then(|s| first_stage_seeds(&s.config, seeds));
            request.stages = Some(
                stages
                    .iter()
                    .enumerate()
                    .map(|(i, stage)| {
                        let entrants = (i == 0).then_some(seeds.len());
                        stage_spec(i as u32, stage, entrants)
                    })
                    .collect(),
            );
        }
    }
    Ok(request)
}

fn group_payloads(rr: &RoundRobinConfig) -> Vec<GroupPayload> {
    rr.groups.iter().map(GroupPayload::from).collect()
}

fn first_stage_seeds(config: &FormatConfig, seeds: &SeedList) -> Option<Vec<ParticipantId>> {
    match config {
        FormatConfig::RoundRobin(rr) => Some(rr.flattened()),
        FormatConfig::Custom => None,
        _ => Some(seeds.ids()),
    }
}

fn stage_spec(order: u32, stage: &StageDraft, entrants: Option<usize>) -> StageSpec {
    StageSpec {
        stage_order: order,
        name: stage.name.trim().to_string(),
        bracket_type: stage.config.format(),
        is_visible_in_app: stage.is_visible,
        advancement_rule: stage.advancement_rule,
        config: stage_config(&stage.config, entrants),
    }
}

/// Format-specific stage config. Battle royale lobbies are resolved when entrants are known.
pub fn stage_config(config: &FormatConfig, entrants: Option<usize>) -> StageConfig {
    let mut out = StageConfig::default();
    match config {
        FormatConfig::SingleElimination(_) => {}
        FormatConfig::DoubleElimination(c) => out.grand_finals_reset = Some(c.grand_finals_reset),
        FormatConfig::RoundRobin(rr) => {
            if !rr.groups.is_empty() {
                out.groups = Some(group_payloads(rr));
            }
        }
        FormatConfig::Swiss(c) => out.swiss_config = Some(*c),
        FormatConfig::BattleRoyale(c) => {
            let mut c = c.clone();
            if let Some(n) = entrants {
                c.total_lobbies = c.effective_lobbies(n);
            }
            out.battle_royale_config = Some(c);
        }
        FormatConfig::Custom => out.custom_config = Some(CustomConfigPayload::default()),
        FormatConfig::MultiStage { .. } => {}
    }
    out
}
