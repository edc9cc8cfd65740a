//! In-memory bracket service: brackets per tournament, with inactivity cleanup.
//!
//! Stands in for the persistence service behind [`BracketRemote`]. Every operation works on a
//! copy of the stored bracket and only stores it back on success.

use crate::logic::propose_advancement;
use crate::models::{
    AddMatchRequest, AddRoundRequest, AdvancementProposal, AssignSlotRequest, BattleRoyaleProgress,
    Bracket, BracketFormat, BracketState, ConfirmAdvancementRequest, CustomBracket, EngineError,
    FormatProgress, GenerationRequest, Group, MatchId, Pending, PendingAction, RemoteError,
    ReorderMatchRequest, ReorderRoundsRequest, ResultInput, RoundUpdate, SetResultRequest, Stage,
    Standing, SwissProgress, TournamentId,
};
use crate::remote::BracketRemote;
use chrono::{DateTime, Utc};
use std::collections::{HashMap, HashSet};
use std::sync::RwLock;
use std::time::{Duration, Instant};
use uuid::Uuid;

/// Stored bracket + last activity time (for auto-cleanup).
struct BracketEntry {
    bracket: Bracket,
    last_activity: Instant,
}

#[derive(Default)]
pub struct MemoryRemote {
    brackets: RwLock<HashMap<TournamentId, BracketEntry>>,
}

fn lock_error() -> EngineError {
    RemoteError::Unavailable("bracket store lock poisoned".to_string()).into()
}

fn no_bracket(tournament: TournamentId) -> EngineError {
    EngineError::NotFound(format!("bracket for tournament {}", tournament))
}

/// Record a generated bracket from its request. Match generation itself is not modelled.
fn bracket_from_request(
    tournament: TournamentId,
    request: &GenerationRequest,
    now: DateTime<Utc>,
) -> Result<Bracket, EngineError> {
    let seeds = request.seeds.clone().unwrap_or_default();
    let unique: HashSet<_> = seeds.iter().collect();
    if unique.len() != seeds.len() {
        return Err(EngineError::StructuralConflict(
            "a participant is seeded more than once".to_string(),
        ));
    }

    let progress = match request.bracket_type {
        BracketFormat::SingleElimination | BracketFormat::DoubleElimination => {
            FormatProgress::Elimination {
                grand_finals_reset: request.grand_finals_reset.unwrap_or(false),
            }
        }
        BracketFormat::RoundRobin => FormatProgress::RoundRobin,
        BracketFormat::Swiss => {
            let config = request
                .swiss_config
                .ok_or_else(|| EngineError::config("swissConfig", "Swiss config is required"))?;
            FormatProgress::Swiss(SwissProgress::new(config))
        }
        BracketFormat::BattleRoyale => {
            let config = request.battle_royale_config.clone().ok_or_else(|| {
                EngineError::config("battleRoyaleConfig", "Battle royale config is required")
            })?;
            FormatProgress::BattleRoyale(BattleRoyaleProgress::new(config, seeds.len()))
        }
        BracketFormat::Custom => {
            let mut custom = CustomBracket::new();
            for round in request.custom_config.iter().flat_map(|c| &c.rounds) {
                let position = custom.add_round(round.best_of, Some(round.name.clone()))?;
                for _ in 0..round.matches {
                    custom.add_match(position)?;
                }
            }
            FormatProgress::Custom(custom)
        }
        BracketFormat::MultiStage => {
            let specs = request.stages.as_deref().unwrap_or_default();
            if specs.len() < 2 {
                return Err(EngineError::config(
                    "stages",
                    "A multi-stage tournament needs at least 2 stages",
                ));
            }
            let stages = specs
                .iter()
                .enumerate()
                .map(|(i, spec)| Stage {
                    order: spec.stage_order,
                    name: spec.name.clone(),
                    format: spec.bracket_type,
                    is_visible: spec.is_visible_in_app,
                    advancement_rule: spec.advancement_rule,
                    config: spec.config.clone(),
                    is_generated: i == 0,
                    is_completed: false,
                    seeds: if i == 0 { seeds.clone() } else { Vec::new() },
                    standings: Vec::new(),
                })
                .collect();
            FormatProgress::MultiStage { stages }
        }
    };

    Ok(Bracket {
        id: Uuid::new_v4(),
        tournament_id: tournament,
        format: request.bracket_type,
        state: BracketState::InProgress,
        seeds,
        groups: request
            .groups
            .clone()
            .unwrap_or_default()
            .into_iter()
            .map(Group::from)
            .collect(),
        default_best_of: request.default_best_of.unwrap_or(1),
        best_of_per_round: request.best_of_per_round.clone().unwrap_or_default(),
        auto_advance: request.auto_advance.unwrap_or(false),
        progress,
        created_at: now,
        completed_at: None,
    })
}

impl MemoryRemote {
    pub fn new() -> Self {
        Self::default()
    }

    /// Run `f` on a copy of the tournament's bracket and store it back only if `f` succeeds.
    fn update<T>(
        &self,
        tournament: TournamentId,
        f: impl FnOnce(&mut Bracket) -> Result<T, EngineError>,
    ) -> Result<T, EngineError> {
        let mut g = self.brackets.write().map_err(|_| lock_error())?;
        let entry = g.get_mut(&tournament).ok_or_else(|| no_bracket(tournament))?;
        entry.last_activity = Instant::now();
        let mut draft = entry.bracket.clone();
        let out = f(&mut draft)?;
        entry.bracket = draft;
        Ok(out)
    }

    fn update_custom<T>(
        &self,
        tournament: TournamentId,
        f: impl FnOnce(&mut CustomBracket) -> Result<T, EngineError>,
    ) -> Result<T, EngineError> {
        self.update(tournament, |bracket| {
            let format = bracket.format;
            let custom = bracket.custom_mut().ok_or_else(|| {
                EngineError::StateConflict(format!("a {} bracket has no custom rounds", format))
            })?;
            f(custom)
        })
    }

    /// Apply a destructive custom action as confirmed by the caller.
    fn apply_confirmed(&self, tournament: TournamentId, action: PendingAction) -> Result<(), EngineError> {
        let now = Utc::now();
        self.update(tournament, |bracket| {
            if action == PendingAction::Complete {
                return bracket.complete_custom(now);
            }
            let custom = bracket.custom_mut().ok_or_else(|| {
                EngineError::StateConflict("the bracket has no custom rounds".to_string())
            })?;
            let pending = Pending {
                action,
                summary: String::new(),
                revision: custom.revision,
            };
            custom.confirm(&pending, now)
        })
    }

    /// Store a stage's standings as reported by match play. `final_standings` completes the stage.
    pub fn record_stage_standings(
        &self,
        tournament: TournamentId,
        stage_order: u32,
        standings: Vec<Standing>,
        final_standings: bool,
    ) -> Result<(), EngineError> {
        let now = Utc::now();
        self.update(tournament, |bracket| {
            bracket.record_stage_standings(stage_order, standings, final_standings, now)
        })
    }

    /// Remove brackets not touched for `max_idle`. Returns how many were removed.
    pub fn cleanup_inactive(&self, max_idle: Duration) -> usize {
        let mut g = match self.brackets.write() {
            Ok(guard) => guard,
            Err(_) => return 0,
        };
        let before = g.len();
        g.retain(|_, entry| entry.last_activity.elapsed() < max_idle);
        before - g.len()
    }

    pub fn len(&self) -> usize {
        self.brackets.read().map(|g| g.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl BracketRemote for MemoryRemote {
    async fn generate_bracket(
        &self,
        tournament: TournamentId,
        request: &GenerationRequest,
    ) -> Result<Bracket, EngineError> {
        let mut g = self.brackets.write().map_err(|_| lock_error())?;
        if g.contains_key(&tournament) {
            return Err(EngineError::StateConflict(
                "a bracket already exists for this tournament".to_string(),
            ));
        }
        let bracket = bracket_from_request(tournament, request, Utc::now())?;
        log::info!(
            "generated {} bracket {} for tournament {}",
            bracket.format,
            bracket.id,
            tournament
        );
        g.insert(
            tournament,
            BracketEntry {
                bracket: bracket.clone(),
                last_activity: Instant::now(),
            },
        );
        Ok(bracket)
    }

    async fn get_bracket(&self, tournament: TournamentId) -> Result<Option<Bracket>, EngineError> {
        let mut g = self.brackets.write().map_err(|_| lock_error())?;
        Ok(g.get_mut(&tournament).map(|entry| {
            entry.last_activity = Instant::now();
            entry.bracket.clone()
        }))
    }

    async fn delete_bracket(&self, tournament: TournamentId) -> Result<(), EngineError> {
        let mut g = self.brackets.write().map_err(|_| lock_error())?;
        g.remove(&tournament).ok_or_else(|| no_bracket(tournament))?;
        log::info!("deleted bracket of tournament {}", tournament);
        Ok(())
    }

    async fn add_round(
        &self,
        tournament: TournamentId,
        request: &AddRoundRequest,
    ) -> Result<u32, EngineError> {
        self.update_custom(tournament, |c| c.add_round(request.best_of, request.name.clone()))
    }

    async fn update_round(
        &self,
        tournament: TournamentId,
        round: u32,
        update: &RoundUpdate,
    ) -> Result<(), EngineError> {
        self.update_custom(tournament, |c| c.update_round(round, update))
    }

    async fn delete_round(&self, tournament: TournamentId, round: u32) -> Result<(), EngineError> {
        self.apply_confirmed(tournament, PendingAction::DeleteRound { round })
    }

    async fn reorder_rounds(
        &self,
        tournament: TournamentId,
        request: &ReorderRoundsRequest,
    ) -> Result<(), EngineError> {
        self.update_custom(tournament, |c| c.reorder_rounds(&request.rounds))
    }

    async fn add_match(
        &self,
        tournament: TournamentId,
        request: &AddMatchRequest,
    ) -> Result<MatchId, EngineError> {
        self.update_custom(tournament, |c| c.add_match(request.round))
    }

    async fn delete_match(
        &self,
        tournament: TournamentId,
        match_id: MatchId,
    ) -> Result<(), EngineError> {
        self.apply_confirmed(tournament, PendingAction::DeleteMatch { match_id })
    }

    async fn reorder_match(
        &self,
        tournament: TournamentId,
        match_id: MatchId,
        request: &ReorderMatchRequest,
    ) -> Result<(), EngineError> {
        self.update_custom(tournament, |c| c.reorder_match(match_id, request.new_position))
    }

    async fn assign_slot(
        &self,
        tournament: TournamentId,
        match_id: MatchId,
        request: &AssignSlotRequest,
    ) -> Result<(), EngineError> {
        self.update_custom(tournament, |c| {
            c.assign_slot(match_id, request.slot, request.team_id)
        })
    }

    async fn set_result(
        &self,
        tournament: TournamentId,
        match_id: MatchId,
        request: &SetResultRequest,
    ) -> Result<(), EngineError> {
        match *request {
            SetResultRequest::Scores {
                team1_score,
                team2_score,
                winner_id,
            } => self.update_custom(tournament, |c| {
                c.set_result(
                    match_id,
                    ResultInput {
                        score1: team1_score,
                        score2: team2_score,
                        winner_id,
                    },
                )
                .map(|_| ())
            }),
            SetResultRequest::Clear { clear: true } => {
                self.apply_confirmed(tournament, PendingAction::ClearResult { match_id })
            }
            SetResultRequest::Clear { clear: false } => Err(EngineError::InvalidArgument(
                "`clear` must be true when no scores are given".to_string(),
            )),
        }
    }

    async fn complete_custom_bracket(&self, tournament: TournamentId) -> Result<(), EngineError> {
        self.apply_confirmed(tournament, PendingAction::Complete)
    }

    async fn advance_swiss_round(&self, tournament: TournamentId) -> Result<u32, EngineError> {
        self.update(tournament, Bracket::advance_swiss_round)
    }

    async fn advance_battle_royale_round(
        &self,
        tournament: TournamentId,
    ) -> Result<u32, EngineError> {
        self.update(tournament, |bracket| {
            bracket.advance_battle_royale_round()?;
            match &bracket.progress {
                FormatProgress::BattleRoyale(p) => Ok(p.current_round),
                _ => Err(EngineError::StateConflict(
                    "the bracket has no battle royale rounds".to_string(),
                )),
            }
        })
    }

    async fn calculate_advancement(
        &self,
        tournament: TournamentId,
        stage_order: u32,
    ) -> Result<AdvancementProposal, EngineError> {
        let g = self.brackets.read().map_err(|_| lock_error())?;
        let entry = g.get(&tournament).ok_or_else(|| no_bracket(tournament))?;
        let stage = entry
            .bracket
            .stages()
            .iter()
            .find(|s| s.order == stage_order)
            .ok_or_else(|| EngineError::NotFound(format!("stage {}", stage_order)))?;
        propose_advancement(stage)
    }

    async fn confirm_advancement(
        &self,
        tournament: TournamentId,
        stage_order: u32,
        request: &ConfirmAdvancementRequest,
    ) -> Result<(), EngineError> {
        self.update(tournament, |bracket| {
            bracket.confirm_advancement(stage_order, &request.seeds)
        })
    }
}
