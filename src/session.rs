//! Client-side bracket session: local checks first, one remote call, then a refetch.
//!
//! Mutations take `&mut self`, so a session never has two of them in flight. Every mutation is
//! tried on a copy of the cached bracket before the remote call; a rejected or failed call leaves
//! the cache untouched. After a successful call the bracket is fetched again and replaces the
//! cache. There is no version check against the service: concurrent edits from elsewhere are
//! last-write-wins.

use crate::logic::build_generation_request;
use crate::models::{
    AddMatchRequest, AddRoundRequest, AdvancementProposal, AssignSlotRequest, Bracket,
    BracketConfig, ConfirmAdvancementRequest, CustomBracket, EngineError, MatchId, ParticipantId,
    Pending, PendingAction, RemoteError, ReorderMatchRequest, ReorderRoundsRequest, ResultInput,
    RoundMove, RoundUpdate, SeedList, SetResultRequest, Slot, TournamentId,
};
use crate::remote::BracketRemote;
use chrono::Utc;
use std::future::Future;
use std::time::Duration;

pub struct BracketSession<R> {
    remote: R,
    tournament: TournamentId,
    timeout: Duration,
    bracket: Option<Bracket>,
}

impl<R: BracketRemote> BracketSession<R> {
    pub fn new(remote: R, tournament: TournamentId, timeout: Duration) -> Self {
        Self {
            remote,
            tournament,
            timeout,
            bracket: None,
        }
    }

    pub fn tournament(&self) -> TournamentId {
        self.tournament
    }

    /// Last fetched bracket.
    pub fn bracket(&self) -> Option<&Bracket> {
        self.bracket.as_ref()
    }

    pub fn remote(&self) -> &R {
        &self.remote
    }

    async fn call<T>(
        &self,
        op: &str,
        request: impl Future<Output = Result<T, EngineError>>,
    ) -> Result<T, EngineError> {
        match tokio::time::timeout(self.timeout, request).await {
            Ok(Ok(value)) => Ok(value),
            Ok(Err(e)) => {
                log::warn!("{} for tournament {} failed: {}", op, self.tournament, e);
                Err(e)
            }
            Err(_) => {
                log::warn!(
                    "{} for tournament {} timed out after {:?}",
                    op,
                    self.tournament,
                    self.timeout
                );
                Err(RemoteError::Timeout(self.timeout).into())
            }
        }
    }

    /// Fetch the authoritative bracket and replace the cached one.
    pub async fn refresh(&mut self) -> Result<Option<&Bracket>, EngineError> {
        let bracket = self
            .call("getBracket", self.remote.get_bracket(self.tournament))
            .await?;
        self.bracket = bracket;
        Ok(self.bracket.as_ref())
    }

    fn current(&self) -> Result<&Bracket, EngineError> {
        self.bracket
            .as_ref()
            .ok_or_else(|| EngineError::StateConflict("no bracket has been generated".to_string()))
    }

    fn custom(&self) -> Result<&CustomBracket, EngineError> {
        let bracket = self.current()?;
        bracket.custom().ok_or_else(|| {
            EngineError::StateConflict(format!(
                "a {} bracket has no custom rounds",
                bracket.format
            ))
        })
    }

    /// Run a custom-bracket mutation on a copy of the cache to reject it before any remote call.
    fn check_custom<T>(
        &self,
        f: impl FnOnce(&mut CustomBracket) -> Result<T, EngineError>,
    ) -> Result<T, EngineError> {
        let mut draft = self.custom()?.clone();
        f(&mut draft)
    }

    /// Validate, build the generation request and generate. Fails fast on configuration errors.
    pub async fn generate(
        &mut self,
        config: &BracketConfig,
        seeds: &SeedList,
    ) -> Result<Option<&Bracket>, EngineError> {
        if self.bracket.is_some() {
            return Err(EngineError::StateConflict(
                "a bracket already exists for this tournament".to_string(),
            ));
        }
        let request = build_generation_request(config, seeds)?;
        self.call(
            "generateBracket",
            self.remote.generate_bracket(self.tournament, &request),
        )
        .await?;
        self.refresh().await
    }

    pub async fn delete(&mut self) -> Result<(), EngineError> {
        self.current()?;
        self.call("deleteBracket", self.remote.delete_bracket(self.tournament))
            .await?;
        self.bracket = None;
        Ok(())
    }

    pub async fn add_round(&mut self, best_of: u8, name: Option<String>) -> Result<u32, EngineError> {
        self.check_custom(|c| c.add_round(best_of, name.clone()))?;
        let request = AddRoundRequest { name, best_of };
        let round = self
            .call("addRound", self.remote.add_round(self.tournament, &request))
            .await?;
        self.refresh().await?;
        Ok(round)
    }

    pub async fn update_round(&mut self, round: u32, update: RoundUpdate) -> Result<(), EngineError> {
        self.check_custom(|c| c.update_round(round, &update))?;
        self.call(
            "updateRound",
            self.remote.update_round(self.tournament, round, &update),
        )
        .await?;
        self.refresh().await?;
        Ok(())
    }

    pub async fn reorder_rounds(&mut self, moves: Vec<RoundMove>) -> Result<(), EngineError> {
        self.check_custom(|c| c.reorder_rounds(&moves))?;
        let request = ReorderRoundsRequest { rounds: moves };
        self.call(
            "reorderRounds",
            self.remote.reorder_rounds(self.tournament, &request),
        )
        .await?;
        self.refresh().await?;
        Ok(())
    }

    pub async fn reorder_round(&mut self, round: u32, new_position: u32) -> Result<(), EngineError> {
        self.reorder_rounds(vec![RoundMove {
            round,
            new_position,
        }])
        .await
    }

    pub async fn add_match(&mut self, round: u32) -> Result<MatchId, EngineError> {
        self.check_custom(|c| c.add_match(round))?;
        let id = self
            .call(
                "addMatch",
                self.remote.add_match(self.tournament, &AddMatchRequest { round }),
            )
            .await?;
        self.refresh().await?;
        Ok(id)
    }

    pub async fn reorder_match(&mut self, match_id: MatchId, new_position: u32) -> Result<(), EngineError> {
        self.check_custom(|c| c.reorder_match(match_id, new_position))?;
        let request = ReorderMatchRequest { new_position };
        self.call(
            "reorderMatch",
            self.remote.reorder_match(self.tournament, match_id, &request),
        )
        .await?;
        self.refresh().await?;
        Ok(())
    }

    pub async fn assign_slot(
        &mut self,
        match_id: MatchId,
        slot: Slot,
        participant: Option<ParticipantId>,
    ) -> Result<(), EngineError> {
        self.check_custom(|c| c.assign_slot(match_id, slot, participant))?;
        let request = AssignSlotRequest {
            slot,
            team_id: participant,
        };
        self.call(
            "assignSlot",
            self.remote.assign_slot(self.tournament, match_id, &request),
        )
        .await?;
        self.refresh().await?;
        Ok(())
    }

    pub async fn set_result(&mut self, match_id: MatchId, input: ResultInput) -> Result<(), EngineError> {
        self.check_custom(|c| c.set_result(match_id, input))?;
        let request = SetResultRequest::from(input);
        self.call(
            "setResult",
            self.remote.set_result(self.tournament, match_id, &request),
        )
        .await?;
        self.refresh().await?;
        Ok(())
    }

    pub fn propose_delete_round(&self, round: u32) -> Result<Pending, EngineError> {
        self.custom()?.propose_delete_round(round)
    }

    pub fn propose_delete_match(&self, match_id: MatchId) -> Result<Pending, EngineError> {
        self.custom()?.propose_delete_match(match_id)
    }

    pub fn propose_clear_result(&self, match_id: MatchId) -> Result<Pending, EngineError> {
        self.custom()?.propose_clear_result(match_id)
    }

    pub fn propose_complete(&self) -> Result<Pending, EngineError> {
        self.custom()?.propose_complete()
    }

    /// Second half of a destructive call. Rejected if the bracket moved since the proposal.
    pub async fn confirm(&mut self, pending: &Pending) -> Result<(), EngineError> {
        self.check_custom(|c| c.confirm(pending, Utc::now()))?;
        let t = self.tournament;
        match pending.action {
            PendingAction::DeleteRound { round } => {
                self.call("deleteRound", self.remote.delete_round(t, round))
                    .await?
            }
            PendingAction::DeleteMatch { match_id } => {
                self.call("deleteMatch", self.remote.delete_match(t, match_id))
                    .await?
            }
            PendingAction::ClearResult { match_id } => {
                let request = SetResultRequest::Clear { clear: true };
                self.call("setResult", self.remote.set_result(t, match_id, &request))
                    .await?
            }
            PendingAction::Complete => {
                self.call(
                    "completeCustomBracket",
                    self.remote.complete_custom_bracket(t),
                )
                .await?
            }
        }
        self.refresh().await?;
        Ok(())
    }

    pub async fn advance_swiss_round(&mut self) -> Result<u32, EngineError> {
        self.current()?.clone().advance_swiss_round()?;
        let round = self
            .call(
                "advanceSwissRound",
                self.remote.advance_swiss_round(self.tournament),
            )
            .await?;
        self.refresh().await?;
        Ok(round)
    }

    pub async fn advance_battle_royale_round(&mut self) -> Result<u32, EngineError> {
        self.current()?.clone().advance_battle_royale_round()?;
        let round = self
            .call(
                "advanceBattleRoyaleRound",
                self.remote.advance_battle_royale_round(self.tournament),
            )
            .await?;
        self.refresh().await?;
        Ok(round)
    }

    /// First half of stage advancement; the proposal can be reordered before confirming.
    pub async fn calculate_advancement(
        &self,
        stage_order: u32,
    ) -> Result<AdvancementProposal, EngineError> {
        let stage = self
            .current()?
            .stages()
            .iter()
            .find(|s| s.order == stage_order)
            .ok_or_else(|| EngineError::NotFound(format!("stage {}", stage_order)))?;
        if !stage.is_completed {
            return Err(EngineError::StateConflict(format!(
                "stage {} is not completed yet",
                stage.name
            )));
        }
        self.call(
            "calculateAdvancement",
            self.remote.calculate_advancement(self.tournament, stage_order),
        )
        .await
    }

    /// Generate the next stage with the (possibly reordered) proposal.
    pub async fn confirm_advancement(
        &mut self,
        proposal: &AdvancementProposal,
    ) -> Result<(), EngineError> {
        let seeds = proposal.seed_ids();
        self.current()?
            .clone()
            .confirm_advancement(proposal.stage_order, &seeds)?;
        let request = ConfirmAdvancementRequest { seeds };
        self.call(
            "confirmAdvancement",
            self.remote
                .confirm_advancement(self.tournament, proposal.stage_order, &request),
        )
        .await?;
        self.refresh().await?;
        Ok(())
    }
}
