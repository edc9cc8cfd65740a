//! Data structures for the bracket engine: participants, seeds, formats, brackets, wire contracts.

mod bracket;
mod custom;
mod error;
mod format;
mod participant;
mod request;
mod schedule;
mod seed;

pub use bracket::{
    AdvancementProposal, AdvancingSeed, BattleRoyaleProgress, Bracket, BracketId, BracketState,
    FormatProgress, Record, Stage, Standing, SwissProgress, TournamentId,
};
pub use custom::{
    CustomBracket, CustomBracketStatus, CustomMatch, CustomRound, MatchId, MatchResult, Pending,
    PendingAction, ResultInput, RoundUpdate, Slot,
};
pub use error::{EngineError, RemoteError, Severity, ValidationReport, Violation};
pub use format::{
    AdvancementKind, AdvancementRule, BattleRoyaleConfig, BestOfOverride, BestOfPolicy,
    BracketConfig, BracketFormat, EliminationConfig, EliminationRule, FormatConfig, Group,
    RoundRobinConfig, StageDraft, SwissConfig, BEST_OF_VALUES, MAX_NAME_LEN,
};
pub use participant::{Participant, ParticipantId, ParticipantProfile, ParticipationType, Player, Team};
pub use request::{
    AddMatchRequest, AddRoundRequest, AssignSlotRequest, ConfirmAdvancementRequest,
    CustomConfigPayload, CustomRoundPayload, GenerationRequest, GroupPayload, ReorderMatchRequest,
    ReorderRoundsRequest, RoundMove, SetResultRequest, StageConfig, StageSpec,
};
pub use schedule::{ManualStatus, MatchSchedule, MatchStatus};
pub use seed::{Seed, SeedList};
