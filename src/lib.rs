//! Tournament bracket engine: seeding, format validation, generation payloads, stage advancement
//! and the custom bracket lifecycle, plus a client session over the bracket service.

pub mod config;
pub mod logic;
pub mod memory;
pub mod models;
pub mod remote;
pub mod session;

pub use config::ServerConfig;
pub use logic::{
    auto_distribute, build_generation_request, calculate_advancement, propose_advancement,
    resolve_result, snake_distribute, validate,
};
pub use memory::MemoryRemote;
pub use models::{
    Bracket, BracketConfig, BracketFormat, CustomBracket, EngineError, FormatConfig, Participant,
    ParticipantId, ParticipationType, RemoteError, SeedList, TournamentId, ValidationReport,
};
pub use remote::BracketRemote;
pub use session::BracketSession;
