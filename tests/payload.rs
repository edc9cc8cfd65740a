//! Integration tests for building generation requests from validated configurations.

use bracket_engine::logic::build_generation_request;
use bracket_engine::models::{
    AdvancementRule, BattleRoyaleConfig, BracketConfig, BracketFormat, EliminationConfig,
    EngineError, FormatConfig, Participant, ParticipationType, RoundRobinConfig, SeedList,
    StageDraft, SwissConfig,
};

fn seeds(n: usize) -> SeedList {
    SeedList::from_participants(
        ParticipationType::Player,
        (0..n).map(|i| Participant::player(format!("P{i}"))),
    )
    .unwrap()
}

#[test]
fn invalid_configuration_builds_nothing() {
    let config = BracketConfig::new(FormatConfig::Swiss(SwissConfig {
        total_rounds: 3,
        wins_to_qualify: 5,
        losses_to_eliminate: 3,
    }));
    match build_generation_request(&config, &seeds(8)) {
        Err(EngineError::Configuration(report)) => assert_eq!(report.errors().count(), 1),
        other => panic!("expected a configuration error, got {other:?}"),
    }
}

#[test]
fn elimination_request_carries_seed_order() {
    let s = seeds(4);
    let config = BracketConfig::new(FormatConfig::DoubleElimination(EliminationConfig {
        grand_finals_reset: true,
    }));
    let request = build_generation_request(&config, &s).unwrap();
    assert_eq!(request.bracket_type, BracketFormat::DoubleElimination);
    assert_eq!(request.seeds, Some(s.ids()));
    assert_eq!(request.grand_finals_reset, Some(true));
    assert_eq!(request.default_best_of, Some(1));
    assert_eq!(request.best_of_per_round, None);
}

#[test]
fn round_robin_request_sends_groups() {
    let s = seeds(6);
    let ids = s.ids();
    let rr = RoundRobinConfig::snake(&s, 2).unwrap();
    let request =
        build_generation_request(&BracketConfig::new(FormatConfig::RoundRobin(rr)), &s).unwrap();
    let groups = request.groups.unwrap();
    assert_eq!(groups.len(), 2);
    assert_eq!(groups[0].name, "Group A");
    assert_eq!(groups[0].team_ids, vec![ids[0], ids[3], ids[4]]);
    assert_eq!(
        request.seeds,
        Some(vec![ids[0], ids[3], ids[4], ids[1], ids[2], ids[5]])
    );
}

#[test]
fn battle_royale_request_resolves_lobby_count() {
    let config = BracketConfig::new(FormatConfig::BattleRoyale(BattleRoyaleConfig {
        total_rounds: 4,
        teams_per_lobby: 4,
        total_lobbies: 0,
        elimination_rules: Vec::new(),
    }));
    let request = build_generation_request(&config, &seeds(10)).unwrap();
    assert_eq!(request.battle_royale_config.unwrap().total_lobbies, 3);
}

#[test]
fn custom_request_starts_empty_and_drops_overrides() {
    let mut config = BracketConfig::new(FormatConfig::Custom);
    config.best_of.set_override(0, 1, 3);
    let request = build_generation_request(&config, &seeds(0)).unwrap();
    assert_eq!(request.bracket_type, BracketFormat::Custom);
    assert_eq!(request.seeds, None);
    assert!(request.custom_config.unwrap().rounds.is_empty());
    assert_eq!(request.best_of_per_round, None);
}

#[test]
fn overrides_are_sent_sorted() {
    let mut config = BracketConfig::new(FormatConfig::SingleElimination(EliminationConfig::default()));
    config.best_of.set_override(0, 3, 5);
    config.best_of.set_override(0, 1, 3);
    let request = build_generation_request(&config, &seeds(8)).unwrap();
    let rounds: Vec<u32> = request
        .best_of_per_round
        .unwrap()
        .iter()
        .map(|o| o.round)
        .collect();
    assert_eq!(rounds, vec![1, 3]);
}

#[test]
fn multi_stage_request_lists_stages_and_first_stage_seeds() {
    let s = seeds(8);
    let groups = RoundRobinConfig::auto(&s, 2).unwrap();
    let flattened = groups.flattened();
    let config = BracketConfig::new(FormatConfig::MultiStage {
        stages: vec![
            StageDraft::new(" Groups ", FormatConfig::RoundRobin(groups))
                .with_advancement(AdvancementRule::per_group(2)),
            StageDraft::new("Playoffs", FormatConfig::SingleElimination(EliminationConfig::default())),
        ],
    });
    let request = build_generation_request(&config, &s).unwrap();
    assert_eq!(request.seeds, Some(flattened));

    let stages = request.stages.unwrap();
    assert_eq!(stages.len(), 2);
    assert_eq!(stages[0].stage_order, 0);
    assert_eq!(stages[0].name, "Groups");
    assert_eq!(stages[0].bracket_type, BracketFormat::RoundRobin);
    assert_eq!(stages[0].config.groups.as_ref().map(Vec::len), Some(2));
    assert_eq!(stages[1].stage_order, 1);
    assert_eq!(stages[1].advancement_rule, None);
}

#[test]
fn request_serializes_with_wire_names() {
    let config = BracketConfig::new(FormatConfig::Swiss(SwissConfig::default()));
    let request = build_generation_request(&config, &seeds(4)).unwrap();
    let json = serde_json::to_value(&request).unwrap();
    assert_eq!(json["bracketType"], "swiss");
    assert_eq!(json["swissConfig"]["winsToQualify"], 3);
    assert_eq!(json["seeds"].as_array().map(Vec::len), Some(4));
    assert!(json.get("groups").is_none());
}
