//! Integration tests for the client session: fail-fast checks, refetch after success,
//! and untouched local state when the bracket service fails.

use bracket_engine::models::{
    AddMatchRequest, AddRoundRequest, AdvancementProposal, AssignSlotRequest, Bracket,
    BracketConfig, ConfirmAdvancementRequest, EliminationConfig, EngineError, FormatConfig,
    GenerationRequest, MatchId, Participant, ParticipationType, RemoteError, ReorderMatchRequest,
    ReorderRoundsRequest, ResultInput, RoundUpdate, SeedList, SetResultRequest, Slot,
    SwissConfig, TournamentId,
};
use bracket_engine::{BracketRemote, BracketSession, MemoryRemote};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::Duration;
use uuid::Uuid;

const TIMEOUT: Duration = Duration::from_secs(5);

fn seeds(n: usize) -> SeedList {
    SeedList::from_participants(
        ParticipationType::Team,
        (0..n).map(|i| Participant::team(format!("T{i}"))),
    )
    .unwrap()
}

/// Wraps the in-memory store; can be told to fail or stall every call, and counts mutations.
#[derive(Default)]
struct FlakyRemote {
    inner: MemoryRemote,
    fail: AtomicBool,
    stall: AtomicBool,
    mutations: AtomicUsize,
}

impl FlakyRemote {
    async fn gate(&self, mutation: bool) -> Result<(), EngineError> {
        if self.stall.load(Ordering::SeqCst) {
            tokio::time::sleep(Duration::from_secs(30)).await;
        }
        if self.fail.load(Ordering::SeqCst) {
            return Err(RemoteError::Unavailable("connection refused".to_string()).into());
        }
        if mutation {
            self.mutations.fetch_add(1, Ordering::SeqCst);
        }
        Ok(())
    }
}

impl BracketRemote for FlakyRemote {
    async fn generate_bracket(
        &self,
        tournament: TournamentId,
        request: &GenerationRequest,
    ) -> Result<Bracket, EngineError> {
        self.gate(true).await?;
        self.inner.generate_bracket(tournament, request).await
    }

    async fn get_bracket(&self, tournament: TournamentId) -> Result<Option<Bracket>, EngineError> {
        self.gate(false).await?;
        self.inner.get_bracket(tournament).await
    }

    async fn delete_bracket(&self, tournament: TournamentId) -> Result<(), EngineError> {
        self.gate(true).await?;
        self.inner.delete_bracket(tournament).await
    }

    async fn add_round(
        &self,
        tournament: TournamentId,
        request: &AddRoundRequest,
    ) -> Result<u32, EngineError> {
        self.gate(true).await?;
        self.inner.add_round(tournament, request).await
    }

    async fn update_round(
        &self,
        tournament: TournamentId,
        round: u32,
        update: &RoundUpdate,
    ) -> Result<(), EngineError> {
        self.gate(true).await?;
        self.inner.update_round(tournament, round, update).await
    }

    async fn delete_round(&self, tournament: TournamentId, round: u32) -> Result<(), EngineError> {
        self.gate(true).await?;
        self.inner.delete_round(tournament, round).await
    }

    async fn reorder_rounds(
        &self,
        tournament: TournamentId,
        request: &ReorderRoundsRequest,
    ) -> Result<(), EngineError> {
        self.gate(true).await?;
        self.inner.reorder_rounds(tournament, request).await
    }

    async fn add_match(
        &self,
        tournament: TournamentId,
        request: &AddMatchRequest,
    ) -> Result<MatchId, EngineError> {
        self.gate(true).await?;
        self.inner.add_match(tournament, request).await
    }

    async fn delete_match(
        &self,
        tournament: TournamentId,
        match_id: MatchId,
    ) -> Result<(), EngineError> {
        self.gate(true).await?;
        self.inner.delete_match(tournament, match_id).await
    }

    async fn reorder_match(
        &self,
        tournament: TournamentId,
        match_id: MatchId,
        request: &ReorderMatchRequest,
    ) -> Result<(), EngineError> {
        self.gate(true).await?;
        self.inner.reorder_match(tournament, match_id, request).await
    }

    async fn assign_slot(
        &self,
        tournament: TournamentId,
        match_id: MatchId,
        request: &AssignSlotRequest,
    ) -> Result<(), EngineError> {
        self.gate(true).await?;
        self.inner.assign_slot(tournament, match_id, request).await
    }

    async fn set_result(
        &self,
        tournament: TournamentId,
        match_id: MatchId,
        request: &SetResultRequest,
    ) -> Result<(), EngineError> {
        self.gate(true).await?;
        self.inner.set_result(tournament, match_id, request).await
    }

    async fn complete_custom_bracket(&self, tournament: TournamentId) -> Result<(), EngineError> {
        self.gate(true).await?;
        self.inner.complete_custom_bracket(tournament).await
    }

    async fn advance_swiss_round(&self, tournament: TournamentId) -> Result<u32, EngineError> {
        self.gate(true).await?;
        self.inner.advance_swiss_round(tournament).await
    }

    async fn advance_battle_royale_round(
        &self,
        tournament: TournamentId,
    ) -> Result<u32, EngineError> {
        self.gate(true).await?;
        self.inner.advance_battle_royale_round(tournament).await
    }

    async fn calculate_advancement(
        &self,
        tournament: TournamentId,
        stage_order: u32,
    ) -> Result<AdvancementProposal, EngineError> {
        self.gate(false).await?;
        self.inner.calculate_advancement(tournament, stage_order).await
    }

    async fn confirm_advancement(
        &self,
        tournament: TournamentId,
        stage_order: u32,
        request: &ConfirmAdvancementRequest,
    ) -> Result<(), EngineError> {
        self.gate(true).await?;
        self.inner
            .confirm_advancement(tournament, stage_order, request)
            .await
    }
}

fn session() -> BracketSession<FlakyRemote> {
    BracketSession::new(FlakyRemote::default(), Uuid::new_v4(), TIMEOUT)
}

async fn custom_session() -> BracketSession<FlakyRemote> {
    let mut s = session();
    s.generate(&BracketConfig::new(FormatConfig::Custom), &seeds(0))
        .await
        .unwrap();
    s
}

/// A custom session with one best-of-3 round holding one filled match.
async fn session_with_match() -> (BracketSession<FlakyRemote>, MatchId, Uuid, Uuid) {
    let mut s = custom_session().await;
    s.add_round(3, None).await.unwrap();
    let m = s.add_match(1).await.unwrap();
    let (a, b) = (Uuid::new_v4(), Uuid::new_v4());
    s.assign_slot(m, Slot::One, Some(a)).await.unwrap();
    s.assign_slot(m, Slot::Two, Some(b)).await.unwrap();
    (s, m, a, b)
}

fn custom(s: &BracketSession<FlakyRemote>) -> &bracket_engine::CustomBracket {
    s.bracket().and_then(Bracket::custom).unwrap()
}

#[tokio::test]
async fn invalid_configuration_never_reaches_the_service() {
    let mut s = session();
    let config = BracketConfig::new(FormatConfig::SingleElimination(EliminationConfig::default()));
    assert!(matches!(
        s.generate(&config, &seeds(1)).await,
        Err(EngineError::Configuration(_))
    ));
    assert_eq!(s.remote().mutations.load(Ordering::SeqCst), 0);
    assert!(s.bracket().is_none());
}

#[tokio::test]
async fn generate_fetches_the_new_bracket() {
    let mut s = session();
    let config = BracketConfig::new(FormatConfig::Swiss(SwissConfig::default()));
    let bracket = s.generate(&config, &seeds(8)).await.unwrap().cloned().unwrap();
    assert_eq!(bracket.tournament_id, s.tournament());
    assert_eq!(bracket.seeds.len(), 8);

    assert!(matches!(
        s.generate(&config, &seeds(8)).await,
        Err(EngineError::StateConflict(_))
    ));
}

#[tokio::test]
async fn mutations_refresh_the_local_copy() {
    let (mut s, m, a, _) = session_with_match().await;
    s.set_result(m, ResultInput::scores(2, 0)).await.unwrap();
    let result = custom(&s).find_match(m).unwrap().result.clone().unwrap();
    assert_eq!(result.winner_id, a);

    s.update_round(
        1,
        RoundUpdate {
            name: Some("Final".into()),
            best_of: None,
        },
    )
    .await
    .unwrap();
    assert_eq!(custom(&s).round(1).unwrap().name, "Final");
}

#[tokio::test]
async fn rejected_locally_means_no_remote_call() {
    let (mut s, m, _, _) = session_with_match().await;
    let before = s.remote().mutations.load(Ordering::SeqCst);

    assert!(matches!(
        s.set_result(m, ResultInput::scores(1, 1)).await,
        Err(EngineError::Configuration(_))
    ));
    assert!(s.add_round(2, None).await.is_err());
    assert!(s.reorder_round(1, 4).await.is_err());
    assert!(s.advance_swiss_round().await.is_err());

    assert_eq!(s.remote().mutations.load(Ordering::SeqCst), before);
}

#[tokio::test]
async fn service_failure_leaves_local_state_untouched() {
    let (mut s, m, _, _) = session_with_match().await;
    let before = s.bracket().cloned();
    s.remote().fail.store(true, Ordering::SeqCst);

    match s.set_result(m, ResultInput::scores(2, 1)).await {
        Err(EngineError::Remote(RemoteError::Unavailable(_))) => {}
        other => panic!("expected an unavailable service, got {other:?}"),
    }
    assert!(s.add_round(1, None).await.is_err());
    assert_eq!(s.bracket().cloned(), before);

    s.remote().fail.store(false, Ordering::SeqCst);
    let stored = s.remote().get_bracket(s.tournament()).await.unwrap();
    assert_eq!(stored, before);
}

#[tokio::test]
async fn slow_service_times_out() {
    let mut s = BracketSession::new(FlakyRemote::default(), Uuid::new_v4(), Duration::from_millis(50));
    s.remote().stall.store(true, Ordering::SeqCst);
    let config = BracketConfig::new(FormatConfig::Custom);
    match s.generate(&config, &seeds(0)).await {
        Err(EngineError::Remote(RemoteError::Timeout(d))) => assert_eq!(d, Duration::from_millis(50)),
        other => panic!("expected a timeout, got {other:?}"),
    }
    assert!(s.bracket().is_none());
}

#[tokio::test]
async fn destructive_calls_are_confirmed_against_the_proposed_state() {
    let (mut s, m, _, _) = session_with_match().await;
    s.set_result(m, ResultInput::scores(2, 1)).await.unwrap();

    let stale = s.propose_clear_result(m).unwrap();
    s.add_round(1, None).await.unwrap();
    assert!(matches!(s.confirm(&stale).await, Err(EngineError::StateConflict(_))));
    assert!(custom(&s).find_match(m).unwrap().has_result());

    let fresh = s.propose_clear_result(m).unwrap();
    s.confirm(&fresh).await.unwrap();
    assert!(!custom(&s).find_match(m).unwrap().has_result());

    let delete = s.propose_delete_round(1).unwrap();
    s.confirm(&delete).await.unwrap();
    assert_eq!(custom(&s).rounds.len(), 1);
    assert_eq!(custom(&s).rounds[0].round, 1);
}

#[tokio::test]
async fn completing_a_custom_bracket() {
    let (mut s, m, _, _) = session_with_match().await;
    s.set_result(m, ResultInput::scores(2, 1)).await.unwrap();
    let pending = s.propose_complete().unwrap();
    s.confirm(&pending).await.unwrap();

    let bracket = s.bracket().unwrap();
    assert!(bracket.is_completed());
    assert!(custom(&s).is_completed());
    assert!(matches!(s.add_round(1, None).await, Err(EngineError::StateConflict(_))));
}

#[tokio::test]
async fn swiss_rounds_advance_until_the_last() {
    let mut s = session();
    let config = BracketConfig::new(FormatConfig::Swiss(SwissConfig {
        total_rounds: 2,
        wins_to_qualify: 2,
        losses_to_eliminate: 1,
    }));
    s.generate(&config, &seeds(4)).await.unwrap();
    assert_eq!(s.advance_swiss_round().await.unwrap(), 2);
    let before = s.remote().mutations.load(Ordering::SeqCst);
    assert!(matches!(
        s.advance_swiss_round().await,
        Err(EngineError::StateConflict(_))
    ));
    assert_eq!(s.remote().mutations.load(Ordering::SeqCst), before);
}

#[tokio::test]
async fn deleting_the_bracket_clears_the_session() {
    let mut s = custom_session().await;
    s.delete().await.unwrap();
    assert!(s.bracket().is_none());
    assert!(s.remote().inner.is_empty());
    assert!(matches!(s.delete().await, Err(EngineError::StateConflict(_))));
}
