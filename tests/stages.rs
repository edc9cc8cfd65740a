//! Integration tests for round counters and multi-stage transitions.

use bracket_engine::logic::build_generation_request;
use bracket_engine::models::{
    AdvancementRule, BattleRoyaleConfig, BattleRoyaleProgress, BracketConfig, BracketState,
    ConfirmAdvancementRequest, EliminationConfig, EliminationRule, EngineError, FormatConfig,
    Participant, ParticipationType, Record, RoundRobinConfig, SeedList, StageDraft, Standing,
    SwissConfig, SwissProgress,
};
use bracket_engine::{BracketRemote, MemoryRemote};
use uuid::Uuid;

fn seeds(n: usize) -> SeedList {
    SeedList::from_participants(
        ParticipationType::Team,
        (0..n).map(|i| Participant::team(format!("T{i}"))),
    )
    .unwrap()
}

#[test]
fn swiss_stops_at_the_last_round() {
    let mut p = SwissProgress::new(SwissConfig {
        total_rounds: 3,
        wins_to_qualify: 2,
        losses_to_eliminate: 2,
    });
    assert_eq!(p.current_round, 1);
    assert_eq!(p.advance().unwrap(), 2);
    assert_eq!(p.advance().unwrap(), 3);
    assert!(p.is_final_round());
    assert!(matches!(p.advance(), Err(EngineError::StateConflict(_))));
    assert_eq!(p.current_round, 3);
}

#[test]
fn battle_royale_applies_elimination_after_its_round() {
    let config = BattleRoyaleConfig {
        total_rounds: 3,
        teams_per_lobby: 4,
        total_lobbies: 0,
        elimination_rules: vec![EliminationRule {
            after_round: 2,
            eliminate_bottom: 3,
        }],
    };
    let mut p = BattleRoyaleProgress::new(config, 10);
    assert_eq!(p.lobbies, 3);
    assert_eq!(p.remaining, 10);

    assert_eq!(p.advance().unwrap(), None);
    assert_eq!(p.remaining, 10);
    let applied = p.advance().unwrap();
    assert_eq!(applied.map(|r| r.eliminate_bottom), Some(3));
    assert_eq!(p.remaining, 7);
    assert_eq!(p.current_round, 3);
    assert!(p.advance().is_err());
}

#[test]
fn battle_royale_refuses_to_leave_fewer_than_two() {
    let config = BattleRoyaleConfig {
        total_rounds: 2,
        teams_per_lobby: 3,
        total_lobbies: 1,
        elimination_rules: vec![EliminationRule {
            after_round: 1,
            eliminate_bottom: 2,
        }],
    };
    let mut p = BattleRoyaleProgress::new(config, 3);
    assert!(matches!(p.advance(), Err(EngineError::StateConflict(_))));
    assert_eq!(p.current_round, 1);
    assert_eq!(p.remaining, 3);
}

/// Round robin groups of four into a single elimination playoff, generated on a fresh store.
async fn two_stage_store() -> (MemoryRemote, Uuid, SeedList) {
    let s = seeds(8);
    let groups = RoundRobinConfig::auto(&s, 2).unwrap();
    let config = BracketConfig::new(FormatConfig::MultiStage {
        stages: vec![
            StageDraft::new("Groups", FormatConfig::RoundRobin(groups))
                .with_advancement(AdvancementRule::per_group(2)),
            StageDraft::new("Playoffs", FormatConfig::SingleElimination(EliminationConfig::default())),
        ],
    });
    let request = build_generation_request(&config, &s).unwrap();
    let store = MemoryRemote::new();
    let tournament = Uuid::new_v4();
    store.generate_bracket(tournament, &request).await.unwrap();
    (store, tournament, s)
}

/// Group A holds even seeds and Group B odd seeds; rank follows seed order within a group.
fn final_standings(s: &SeedList) -> Vec<Standing> {
    s.participants()
        .iter()
        .enumerate()
        .map(|(i, p)| Standing {
            participant: p.profile(),
            group: Some(if i % 2 == 0 { "Group A" } else { "Group B" }.to_string()),
            rank: (i / 2) as u32 + 1,
            record: Record::default(),
        })
        .collect()
}

#[tokio::test]
async fn advancement_waits_for_final_standings() {
    let (store, tournament, s) = two_stage_store().await;
    assert!(matches!(
        store.calculate_advancement(tournament, 0).await,
        Err(EngineError::StateConflict(_))
    ));

    store
        .record_stage_standings(tournament, 0, final_standings(&s), false)
        .unwrap();
    assert!(matches!(
        store.calculate_advancement(tournament, 0).await,
        Err(EngineError::StateConflict(_))
    ));
}

#[tokio::test]
async fn confirmed_advancement_generates_the_next_stage() {
    let (store, tournament, s) = two_stage_store().await;
    let ids = s.ids();
    store
        .record_stage_standings(tournament, 0, final_standings(&s), true)
        .unwrap();

    let mut proposal = store.calculate_advancement(tournament, 0).await.unwrap();
    assert_eq!(proposal.seed_ids(), vec![ids[0], ids[2], ids[1], ids[3]]);
    assert_eq!(proposal.seeds[2].reason, "1st in Group B");

    proposal.move_up(ids[1]).unwrap();
    let request = ConfirmAdvancementRequest {
        seeds: proposal.seed_ids(),
    };
    store
        .confirm_advancement(tournament, 0, &request)
        .await
        .unwrap();

    let bracket = store.get_bracket(tournament).await.unwrap().unwrap();
    let playoffs = &bracket.stages()[1];
    assert!(playoffs.is_generated);
    assert_eq!(playoffs.seeds, vec![ids[0], ids[1], ids[2], ids[3]]);
    assert_eq!(bracket.state, BracketState::InProgress);

    // A second confirmation would regenerate the stage.
    assert!(matches!(
        store.confirm_advancement(tournament, 0, &request).await,
        Err(EngineError::StateConflict(_))
    ));
}

#[tokio::test]
async fn confirmed_seeds_must_match_the_qualifiers() {
    let (store, tournament, s) = two_stage_store().await;
    let ids = s.ids();
    store
        .record_stage_standings(tournament, 0, final_standings(&s), true)
        .unwrap();

    let swapped_in = ConfirmAdvancementRequest {
        seeds: vec![ids[0], ids[2], ids[1], ids[5]],
    };
    assert!(matches!(
        store.confirm_advancement(tournament, 0, &swapped_in).await,
        Err(EngineError::StructuralConflict(_))
    ));
    let bracket = store.get_bracket(tournament).await.unwrap().unwrap();
    assert!(!bracket.stages()[1].is_generated);
}

#[tokio::test]
async fn completing_the_last_stage_completes_the_bracket() {
    let (store, tournament, s) = two_stage_store().await;
    store
        .record_stage_standings(tournament, 0, final_standings(&s), true)
        .unwrap();
    let proposal = store.calculate_advancement(tournament, 0).await.unwrap();
    let qualifiers: Vec<Standing> = proposal
        .seeds
        .iter()
        .enumerate()
        .map(|(i, seed)| Standing {
            participant: seed.participant.clone(),
            group: None,
            rank: i as u32 + 1,
            record: Record::default(),
        })
        .collect();
    store
        .confirm_advancement(
            tournament,
            0,
            &ConfirmAdvancementRequest {
                seeds: proposal.seed_ids(),
            },
        )
        .await
        .unwrap();

    // Someone eliminated in the group stage cannot appear in the playoff standings.
    let mut wrong = qualifiers.clone();
    wrong[0].participant = s.participants()[7].profile();
    assert!(store
        .record_stage_standings(tournament, 1, wrong, true)
        .is_err());

    store
        .record_stage_standings(tournament, 1, qualifiers, true)
        .unwrap();
    let bracket = store.get_bracket(tournament).await.unwrap().unwrap();
    assert!(bracket.is_completed());
    assert!(bracket.completed_at.is_some());
}
