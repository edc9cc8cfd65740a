//! Bracket engine logic: distribution, validation, payloads, advancement, custom lifecycle, stages.

mod advancement;
mod custom_bracket;
mod distribute;
mod groups;
mod payload;
mod stages;
mod validate;

pub use advancement::{calculate_advancement, ordinal, propose_advancement};
pub use custom_bracket::resolve_result;
pub use distribute::{auto_distribute, group_letters, group_name, snake_distribute, unassigned};
pub use payload::{build_generation_request, stage_config};
pub use validate::{
    validate, validate_battle_royale, validate_best_of, validate_custom, validate_elimination,
    validate_format, validate_multi_stage, validate_round_fields, validate_round_robin,
    validate_swiss,
};
