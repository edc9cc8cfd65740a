//! Contract of the external bracket service that persists and generates brackets.

use crate::models::{
    AddMatchRequest, AddRoundRequest, AdvancementProposal, AssignSlotRequest, Bracket,
    ConfirmAdvancementRequest, EngineError, GenerationRequest, MatchId, ReorderMatchRequest,
    ReorderRoundsRequest, RoundUpdate, SetResultRequest, TournamentId,
};

/// Operations of the bracket service. Each call is one request; implementations report
/// transport failures as [`EngineError::Remote`] and rejections with the matching category.
#[allow(async_fn_in_trait)]
pub trait BracketRemote {
    async fn generate_bracket(
        &self,
        tournament: TournamentId,
        request: &GenerationRequest,
    ) -> Result<Bracket, EngineError>;

    async fn get_bracket(&self, tournament: TournamentId) -> Result<Option<Bracket>, EngineError>;

    async fn delete_bracket(&self, tournament: TournamentId) -> Result<(), EngineError>;

    /// Returns the new round's position.
    async fn add_round(
        &self,
        tournament: TournamentId,
        request: &AddRoundRequest,
    ) -> Result<u32, EngineError>;

    async fn update_round(
        &self,
        tournament: TournamentId,
        round: u32,
        update: &RoundUpdate,
    ) -> Result<(), EngineError>;

    async fn delete_round(&self, tournament: TournamentId, round: u32) -> Result<(), EngineError>;

    async fn reorder_rounds(
        &self,
        tournament: TournamentId,
        request: &ReorderRoundsRequest,
    ) -> Result<(), EngineError>;

    /// Returns the new match's id.
    async fn add_match(
        &self,
        tournament: TournamentId,
        request: &AddMatchRequest,
    ) -> Result<MatchId, EngineError>;

    async fn delete_match(
        &self,
        tournament: TournamentId,
        match_id: MatchId,
    ) -> Result<(), EngineError>;

    async fn reorder_match(
        &self,
        tournament: TournamentId,
        match_id: MatchId,
        request: &ReorderMatchRequest,
    ) -> Result<(), EngineError>;

    async fn assign_slot(
        &self,
        tournament: TournamentId,
        match_id: MatchId,
        request: &AssignSlotRequest,
    ) -> Result<(), EngineError>;

    async fn set_result(
        &self,
        tournament: TournamentId,
        match_id: MatchId,
        request: &SetResultRequest,
    ) -> Result<(), EngineError>;

    async fn complete_custom_bracket(&self, tournament: TournamentId) -> Result<(), EngineError>;

    /// Returns the round now being played.
    async fn advance_swiss_round(&self, tournament: TournamentId) -> Result<u32, EngineError>;

    /// Returns the round now being played.
    async fn advance_battle_royale_round(
        &self,
        tournament: TournamentId,
    ) -> Result<u32, EngineError>;

    async fn calculate_advancement(
        &self,
        tournament: TournamentId,
        stage_order: u32,
    ) -> Result<AdvancementProposal, EngineError>;

    async fn confirm_advancement(
        &self,
        tournament: TournamentId,
        stage_order: u32,
        request: &ConfirmAdvancementRequest,
    ) -> Result<(), EngineError>;
}
