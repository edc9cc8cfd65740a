//! Bracket formats and their per-format configuration.

use crate::models::participant::ParticipantId;
use serde::{Deserialize, Serialize};

/// Allowed best-of values.
pub const BEST_OF_VALUES: [u8; 4] = [1, 3, 5, 7];
/// Max length of stage, group and round names.
pub const MAX_NAME_LEN: usize = 100;

#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BracketFormat {
    SingleElimination,
    DoubleElimination,
    RoundRobin,
    Swiss,
    BattleRoyale,
    Custom,
    MultiStage,
}

impl BracketFormat {
    pub fn as_str(self) -> &'static str {
        match self {
            BracketFormat::SingleElimination => "single_elimination",
            BracketFormat::DoubleElimination => "double_elimination",
            BracketFormat::RoundRobin => "round_robin",
            BracketFormat::Swiss => "swiss",
            BracketFormat::BattleRoyale => "battle_royale",
            BracketFormat::Custom => "custom",
            BracketFormat::MultiStage => "multi_stage",
        }
    }
}

impl std::fmt::Display for BracketFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A named subset of seeds (round robin grouping).
#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
pub struct Group {
    pub name: String,
    pub members: Vec<ParticipantId>,
}

impl Group {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            members: Vec::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    pub fn contains(&self, id: ParticipantId) -> bool {
        self.members.contains(&id)
    }
}

/// A per-round best-of override. `stage` is the 0-based stage order (0 outside multi-stage).
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BestOfOverride {
    pub stage: u32,
    pub round: u32,
    pub best_of: u8,
}

/// Default best-of plus explicit per-(stage, round) overrides, kept sorted by (stage, round).
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BestOfPolicy {
    pub default: u8,
    #[serde(default)]
    pub overrides: Vec<BestOfOverride>,
}

impl Default for BestOfPolicy {
    fn default() -> Self {
        Self {
            default: 1,
            overrides: Vec::new(),
        }
    }
}

impl BestOfPolicy {
    pub fn new(default: u8) -> Self {
        Self {
            default,
            overrides: Vec::new(),
        }
    }

    /// Set or replace the override for one round.
    pub fn set_override(&mut self, stage: u32, round: u32, best_of: u8) {
        match self
            .overrides
            .binary_search_by_key(&(stage, round), |o| (o.stage, o.round))
        {
            Ok(i) => self.overrides[i].best_of = best_of,
            Err(i) => self.overrides.insert(
                i,
                BestOfOverride {
                    stage,
                    round,
                    best_of,
                },
            ),
        }
    }

    pub fn clear_override(&mut self, stage: u32, round: u32) {
        self.overrides
            .retain(|o| !(o.stage == stage && o.round == round));
    }

    /// Effective best-of for a round.
    pub fn best_of_for(&self, stage: u32, round: u32) -> u8 {
        self.overrides
            .iter()
            .find(|o| o.stage == stage && o.round == round)
            .map(|o| o.best_of)
            .unwrap_or(self.default)
    }
}

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EliminationConfig {
    /// Double elimination only: replay the grand final if the lower-bracket side wins it.
    #[serde(default)]
    pub grand_finals_reset: bool,
}

#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
pub struct RoundRobinConfig {
    pub groups: Vec<Group>,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SwissConfig {
    pub total_rounds: u32,
    pub wins_to_qualify: u32,
    pub losses_to_eliminate: u32,
}

impl Default for SwissConfig {
    fn default() -> Self {
        Self {
            total_rounds: 5,
            wins_to_qualify: 3,
            losses_to_eliminate: 3,
        }
    }
}

/// After `after_round`, the bottom `eliminate_bottom` participants are eliminated.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EliminationRule {
    pub after_round: u32,
    pub eliminate_bottom: u32,
}

#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BattleRoyaleConfig {
    pub total_rounds: u32,
    pub teams_per_lobby: u32,
    /// 0 means "compute from participant count".
    #[serde(default)]
    pub total_lobbies: u32,
    #[serde(default)]
    pub elimination_rules: Vec<EliminationRule>,
}

impl Default for BattleRoyaleConfig {
    fn default() -> Self {
        Self {
            total_rounds: 3,
            teams_per_lobby: 20,
            total_lobbies: 0,
            elimination_rules: Vec::new(),
        }
    }
}

impl BattleRoyaleConfig {
    /// Lobby count needed to seat `participants` (ceil division). 0 when `teams_per_lobby` is 0.
    pub fn required_lobbies(&self, participants: usize) -> u32 {
        if self.teams_per_lobby == 0 {
            return 0;
        }
        (participants as u32).div_ceil(self.teams_per_lobby)
    }

    /// Configured lobby count, or the computed one when set to 0.
    pub fn effective_lobbies(&self, participants: usize) -> u32 {
        if self.total_lobbies == 0 {
            self.required_lobbies(participants)
        } else {
            self.total_lobbies
        }
    }

    /// Sum of every rule's `eliminate_bottom`, widened so large inputs cannot wrap.
    pub fn total_eliminated(&self) -> u64 {
        self.elimination_rules
            .iter()
            .map(|r| u64::from(r.eliminate_bottom))
            .sum()
    }

    pub fn rule_after(&self, round: u32) -> Option<&EliminationRule> {
        self.elimination_rules.iter().find(|r| r.after_round == round)
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AdvancementKind {
    TopNPerGroup,
    TopNOverall,
}

/// How participants move from one stage to the next.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct AdvancementRule {
    #[serde(rename = "type")]
    pub kind: AdvancementKind,
    pub count: u32,
}

impl AdvancementRule {
    pub fn per_group(count: u32) -> Self {
        Self {
            kind: AdvancementKind::TopNPerGroup,
            count,
        }
    }

    pub fn overall(count: u32) -> Self {
        Self {
            kind: AdvancementKind::TopNOverall,
            count,
        }
    }
}

/// Format plus its format-specific configuration.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(tag = "format", rename_all = "snake_case")]
pub enum FormatConfig {
    SingleElimination(EliminationConfig),
    DoubleElimination(EliminationConfig),
    RoundRobin(RoundRobinConfig),
    Swiss(SwissConfig),
    BattleRoyale(BattleRoyaleConfig),
    Custom,
    MultiStage { stages: Vec<StageDraft> },
}

impl FormatConfig {
    pub fn format(&self) -> BracketFormat {
        match self {
            FormatConfig::SingleElimination(_) => BracketFormat::SingleElimination,
            FormatConfig::DoubleElimination(_) => BracketFormat::DoubleElimination,
            FormatConfig::RoundRobin(_) => BracketFormat::RoundRobin,
            FormatConfig::Swiss(_) => BracketFormat::Swiss,
            FormatConfig::BattleRoyale(_) => BracketFormat::BattleRoyale,
            FormatConfig::Custom => BracketFormat::Custom,
            FormatConfig::MultiStage { .. } => BracketFormat::MultiStage,
        }
    }
}

/// One stage of a multi-stage tournament before generation.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StageDraft {
    pub name: String,
    #[serde(default = "default_visible")]
    pub is_visible: bool,
    #[serde(default)]
    pub advancement_rule: Option<AdvancementRule>,
    pub config: FormatConfig,
}

fn default_visible() -> bool {
    true
}

impl StageDraft {
    pub fn new(name: impl Into<String>, config: FormatConfig) -> Self {
        Self {
            name: name.into(),
            is_visible: true,
            advancement_rule: None,
            config,
        }
    }

    pub fn with_advancement(mut self, rule: AdvancementRule) -> Self {
        self.advancement_rule = Some(rule);
        self
    }
}

/// Everything the operator configures before generating a bracket.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BracketConfig {
    pub format: FormatConfig,
    #[serde(default)]
    pub best_of: BestOfPolicy,
    #[serde(default)]
    pub auto_advance: bool,
}

impl BracketConfig {
    pub fn new(format: FormatConfig) -> Self {
        Self {
            format,
            best_of: BestOfPolicy::default(),
            auto_advance: false,
        }
    }
}
