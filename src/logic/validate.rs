//! Per-format configuration validation.
//!
//! Every validator is pure and returns an ordered [`ValidationReport`]. Blocking violations stop
//! payload construction; advisory ones are shown to the operator but do not block.

use crate::logic::distribute::unassigned;
use crate::models::{
    AdvancementKind, BattleRoyaleConfig, BestOfPolicy, BracketConfig, BracketFormat,
    EliminationConfig, FormatConfig, ParticipantId, ParticipationType, RoundRobinConfig, SeedList,
    StageDraft, SwissConfig, ValidationReport, BEST_OF_VALUES, MAX_NAME_LEN,
};
use std::collections::{HashMap, HashSet};

pub const SWISS_MIN: u32 = 1;
pub const SWISS_MAX: u32 = 20;
pub const BR_MAX_ROUNDS: u32 = 30;
pub const BR_MIN_TEAMS_PER_LOBBY: u32 = 2;
pub const BR_MAX_TEAMS_PER_LOBBY: u32 = 100;
pub const BR_MAX_LOBBIES: u32 = 20;

/// Validate a full bracket configuration against the seeds it will be generated with.
pub fn validate(config: &BracketConfig, seeds: &SeedList) -> ValidationReport {
    let mut report = validate_format(&config.format, seeds);
    let stage_count = match &config.format {
        FormatConfig::MultiStage { stages } => stages.len() as u32,
        _ => 1,
    };
    if config.format.format() == BracketFormat::Custom {
        if !config.best_of.overrides.is_empty() {
            report.warn(
                "bestOfPerRound",
                "Per-round best-of overrides are ignored for custom brackets; set best-of on each round",
            );
        }
        check_best_of(&mut report, "defaultBestOf", config.best_of.default);
    } else {
        let best_of = validate_best_of(&config.best_of, stage_count);
        report.violations.extend(best_of.violations);
    }
    report
}

/// Dispatch to the validator for one format.
pub fn validate_format(format: &FormatConfig, seeds: &SeedList) -> ValidationReport {
    match format {
        FormatConfig::SingleElimination(c) => {
            validate_elimination(BracketFormat::SingleElimination, seeds, c)
        }
        FormatConfig::DoubleElimination(c) => {
            validate_elimination(BracketFormat::DoubleElimination, seeds, c)
        }
        FormatConfig::RoundRobin(c) => validate_round_robin(seeds, c),
        FormatConfig::Swiss(c) => validate_swiss(seeds, c),
        FormatConfig::BattleRoyale(c) => validate_battle_royale(seeds, c),
        FormatConfig::Custom => validate_custom(),
        FormatConfig::MultiStage { stages } => validate_multi_stage(seeds, stages),
    }
}

fn require_entrants(report: &mut ValidationReport, kind: ParticipationType, entrants: usize) {
    if entrants < 2 {
        report.error(
            "seeds",
            format!("At least 2 {} are required (have {})", kind.plural(), entrants),
        );
    }
}

fn check_best_of(report: &mut ValidationReport, field: &str, best_of: u8) {
    if !BEST_OF_VALUES.contains(&best_of) {
        report.error(field, format!("Best-of must be 1, 3, 5 or 7 (got {})", best_of));
    }
}

fn check_name(report: &mut ValidationReport, field: &str, label: &str, name: &str) {
    if name.trim().is_empty() {
        report.error(field, format!("{} name is required", label));
    } else if name.chars().count() > MAX_NAME_LEN {
        report.error(
            field,
            format!("{} name must be at most {} characters", label, MAX_NAME_LEN),
        );
    }
}

/// Default best-of and every override must be 1, 3, 5 or 7; overrides must name a real round.
pub fn validate_best_of(policy: &BestOfPolicy, stage_count: u32) -> ValidationReport {
    let mut report = ValidationReport::new();
    check_best_of(&mut report, "defaultBestOf", policy.default);
    for o in &policy.overrides {
        if o.round == 0 {
            report.error("bestOfPerRound", "Best-of override round numbers start at 1");
        }
        if o.stage >= stage_count {
            report.error(
                "bestOfPerRound",
                format!("Best-of override refers to stage {} which does not exist", o.stage + 1),
            );
        }
        if !BEST_OF_VALUES.contains(&o.best_of) {
            report.error(
                "bestOfPerRound",
                format!(
                    "Round {} best-of must be 1, 3, 5 or 7 (got {})",
                    o.round, o.best_of
                ),
            );
        }
    }
    report
}

/// Single and double elimination only need two participants.
pub fn validate_elimination(
    format: BracketFormat,
    seeds: &SeedList,
    config: &EliminationConfig,
) -> ValidationReport {
    elimination_report(format, seeds.kind(), Some(seeds.len()), config)
}

fn elimination_report(
    format: BracketFormat,
    kind: ParticipationType,
    entrants: Option<usize>,
    config: &EliminationConfig,
) -> ValidationReport {
    let mut report = ValidationReport::new();
    if let Some(n) = entrants {
        require_entrants(&mut report, kind, n);
    }
    if format == BracketFormat::SingleElimination && config.grand_finals_reset {
        report.warn(
            "grandFinalsReset",
            "Grand finals reset only applies to double elimination and will be ignored",
        );
    }
    report
}

/// Every seed in exactly one named group of at least two; unassigned seeds reported one by one.
pub fn validate_round_robin(seeds: &SeedList, config: &RoundRobinConfig) -> ValidationReport {
    let mut report = ValidationReport::new();
    let kind = seeds.kind();
    let name_of = |id: ParticipantId| {
        seeds
            .get(id)
            .map(|p| p.display_name().to_string())
            .unwrap_or_else(|| id.to_string())
    };

    if config.groups.is_empty() {
        report.error("groups", "At least one group is required");
    }

    let mut seen: HashMap<ParticipantId, usize> = HashMap::new();
    for (i, group) in config.groups.iter().enumerate() {
        let label = if group.name.trim().is_empty() {
            format!("Group #{}", i + 1)
        } else {
            group.name.clone()
        };
        check_name(&mut report, "groups.name", &format!("Group #{}", i + 1), &group.name);
        if group.len() < 2 {
            report.error(
                "groups.members",
                format!("{} needs at least 2 {}", label, kind.plural()),
            );
        }
        for &member in &group.members {
            if !seeds.contains(member) {
                report.error(
                    "groups.members",
                    format!("{} contains a {} that is not seeded", label, kind.singular()),
                );
            } else if seen.insert(member, i).is_some() {
                report.error(
                    "groups.members",
                    format!("{} is assigned to more than one group", name_of(member)),
                );
            }
        }
    }

    for id in unassigned(seeds, &config.groups) {
        report.error(
            "groups",
            format!("{} is not assigned to a group", name_of(id)),
        );
    }

    let sizes = config.groups.iter().map(|g| g.len());
    if let (Some(min), Some(max)) = (sizes.clone().min(), sizes.max()) {
        if max - min > 1 {
            report.warn(
                "groups",
                "Group sizes differ by more than one; standings are likely to need tiebreakers",
            );
        }
    }
    report
}

/// Swiss bounds (1-20), thresholds within total rounds, and an unreachable-outcome warning.
pub fn validate_swiss(seeds: &SeedList, config: &SwissConfig) -> ValidationReport {
    swiss_report(seeds.kind(), Some(seeds.len()), config)
}

fn swiss_report(
    kind: ParticipationType,
    entrants: Option<usize>,
    config: &SwissConfig,
) -> ValidationReport {
    let mut report = ValidationReport::new();
    let in_range = |v: u32| (SWISS_MIN..=SWISS_MAX).contains(&v);
    let fields = [
        ("totalRounds", "Total rounds", config.total_rounds),
        ("winsToQualify", "Wins to qualify", config.wins_to_qualify),
        ("lossesToEliminate", "Losses to eliminate", config.losses_to_eliminate),
    ];
    for (field, label, value) in fields {
        if !in_range(value) {
            report.error(
                field,
                format!("{} must be between {} and {} (got {})", label, SWISS_MIN, SWISS_MAX, value),
            );
        }
    }

    if in_range(config.total_rounds) {
        if in_range(config.wins_to_qualify) && config.wins_to_qualify > config.total_rounds {
            report.error(
                "winsToQualify",
                format!(
                    "Wins to qualify ({}) cannot exceed total rounds ({})",
                    config.wins_to_qualify, config.total_rounds
                ),
            );
        }
        if in_range(config.losses_to_eliminate) && config.losses_to_eliminate > config.total_rounds {
            report.error(
                "lossesToEliminate",
                format!(
                    "Losses to eliminate ({}) cannot exceed total rounds ({})",
                    config.losses_to_eliminate, config.total_rounds
                ),
            );
        }
        if in_range(config.wins_to_qualify)
            && in_range(config.losses_to_eliminate)
            && config.wins_to_qualify + config.losses_to_eliminate > config.total_rounds + 1
        {
            report.warn(
                "swissConfig",
                format!(
                    "With {} rounds some participants can finish without reaching {} wins or {} losses",
                    config.total_rounds, config.wins_to_qualify, config.losses_to_eliminate
                ),
            );
        }
    }

    if let Some(n) = entrants {
        require_entrants(&mut report, kind, n);
    }
    report
}

/// Battle royale bounds, lobby sizing, elimination rules, and at least two left standing.
pub fn validate_battle_royale(seeds: &SeedList, config: &BattleRoyaleConfig) -> ValidationReport {
    battle_royale_report(seeds.kind(), Some(seeds.len()), config)
}

fn battle_royale_report(
    kind: ParticipationType,
    entrants: Option<usize>,
    config: &BattleRoyaleConfig,
) -> ValidationReport {
    let mut report = ValidationReport::new();

    let rounds_ok = (1..=BR_MAX_ROUNDS).contains(&config.total_rounds);
    if !rounds_ok {
        report.error(
            "totalRounds",
            format!("Total rounds must be between 1 and {} (got {})", BR_MAX_ROUNDS, config.total_rounds),
        );
    }

    let lobby_size_ok =
        (BR_MIN_TEAMS_PER_LOBBY..=BR_MAX_TEAMS_PER_LOBBY).contains(&config.teams_per_lobby);
    if !lobby_size_ok {
        report.error(
            "teamsPerLobby",
            format!(
                "{} per lobby must be between {} and {} (got {})",
                capitalize(kind.plural()),
                BR_MIN_TEAMS_PER_LOBBY,
                BR_MAX_TEAMS_PER_LOBBY,
                config.teams_per_lobby
            ),
        );
    } else if let Some(n) = entrants {
        if config.teams_per_lobby as usize > n {
            report.error(
                "teamsPerLobby",
                format!(
                    "{} per lobby ({}) cannot exceed the number of {} ({})",
                    capitalize(kind.plural()),
                    config.teams_per_lobby,
                    kind.plural(),
                    n
                ),
            );
        }
    }

    if config.total_lobbies > BR_MAX_LOBBIES {
        report.error(
            "totalLobbies",
            format!("Total lobbies must be between 0 and {} (got {})", BR_MAX_LOBBIES, config.total_lobbies),
        );
    } else if let (Some(n), true, true) = (entrants, lobby_size_ok, config.total_lobbies > 0) {
        let required = config.required_lobbies(n);
        if config.total_lobbies < required {
            report.error(
                "totalLobbies",
                format!(
                    "{} lobbies of {} cannot seat {} {}",
                    config.total_lobbies,
                    config.teams_per_lobby,
                    n,
                    kind.plural()
                ),
            );
        } else if config.total_lobbies > required {
            report.warn(
                "totalLobbies",
                format!("Only {} lobbies are needed; the rest will be empty", required),
            );
        }
    }

    let mut seen_rounds = HashSet::new();
    for (i, rule) in config.elimination_rules.iter().enumerate() {
        let label = format!("Elimination rule #{}", i + 1);
        if rule.after_round < 1 || (rounds_ok && rule.after_round > config.total_rounds) {
            report.error(
                "eliminationRules",
                format!(
                    "{}: round must be between 1 and {} (got {})",
                    label, config.total_rounds, rule.after_round
                ),
            );
        } else if !seen_rounds.insert(rule.after_round) {
            report.error(
                "eliminationRules",
                format!("{}: round {} already has an elimination rule", label, rule.after_round),
            );
        }
        if rule.eliminate_bottom < 1 {
            report.error(
                "eliminationRules",
                format!("{}: must eliminate at least 1", label),
            );
        }
    }

    if let Some(n) = entrants {
        let eliminated = config.total_eliminated();
        if !config.elimination_rules.is_empty() && eliminated >= n.saturating_sub(1) as u64 {
            report.error(
                "eliminationRules",
                format!(
                    "Too many eliminated: {} of {} {} would leave fewer than 2 standing",
                    eliminated,
                    n,
                    kind.plural()
                ),
            );
        }
        require_entrants(&mut report, kind, n);
    }
    report
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Custom brackets start empty, so there is nothing to check before generation.
pub fn validate_custom() -> ValidationReport {
    ValidationReport::new()
}

/// Field checks for a custom round: name length and best-of.
pub fn validate_round_fields(name: Option<&str>, best_of: Option<u8>) -> ValidationReport {
    let mut report = ValidationReport::new();
    if let Some(name) = name {
        if name.chars().count() > MAX_NAME_LEN {
            report.error(
                "name",
                format!("Round name must be at most {} characters", MAX_NAME_LEN),
            );
        }
    }
    if let Some(best_of) = best_of {
        check_best_of(&mut report, "bestOf", best_of);
    }
    report
}

/// Multi-stage: at least two named stages, advancement rules on every non-final stage,
/// per-group advancement only out of round robin, and each stage's own format checks.
pub fn validate_multi_stage(seeds: &SeedList, stages: &[StageDraft]) -> ValidationReport {
    let mut report = ValidationReport::new();
    let kind = seeds.kind();
    if stages.len() < 2 {
        report.error(
            "stages",
            format!("A multi-stage tournament needs at least 2 stages (have {})", stages.len()),
        );
    }

    // Entrants of the stage being checked: the seed list for stage 1, then projected.
    let mut entrants = Some(seeds.len());
    for (i, stage) in stages.iter().enumerate() {
        let prefix = format!("Stage {}: ", i + 1);
        let mut sub = ValidationReport::new();
        check_name(&mut sub, "stages.name", "Stage", &stage.name);

        let format = stage.config.format();
        if format == BracketFormat::MultiStage {
            sub.error("stages.format", "a multi-stage bracket is not a recognized stage format");
            report.extend_prefixed(sub, &prefix);
            entrants = None;
            continue;
        }

        let is_last = i + 1 == stages.len();
        match (&stage.advancement_rule, is_last) {
            (None, false) => sub.error("stages.advancementRule", "an advancement rule is required"),
            (Some(rule), false) => {
                if rule.count < 1 {
                    sub.error("stages.advancementRule", "advancement count must be at least 1");
                }
                if rule.kind == AdvancementKind::TopNPerGroup && format != BracketFormat::RoundRobin {
                    sub.error(
                        "stages.advancementRule",
                        "top N per group advancement is only allowed out of a round robin stage",
                    );
                }
            }
            (Some(_), true) => sub.warn(
                "stages.advancementRule",
                "the final stage's advancement rule is ignored",
            ),
            (None, true) => {}
        }

        let format_report = if i == 0 {
            validate_format(&stage.config, seeds)
        } else {
            projected_stage_report(&stage.config, kind, entrants)
        };
        sub.violations.extend(format_report.violations);

        if let (Some(rule), Some(n)) = (&stage.advancement_rule, entrants) {
            if !is_last && rule.kind == AdvancementKind::TopNOverall && rule.count as usize > n {
                sub.warn(
                    "stages.advancementRule",
                    format!("advances {} but only {} {} enter this stage", rule.count, n, kind.plural()),
                );
            }
        }

        entrants = next_entrants(stage, entrants);
        report.extend_prefixed(sub, &prefix);
    }
    report
}

/// Checks for a later stage, whose seeds only exist after the previous stage completes.
fn projected_stage_report(
    config: &FormatConfig,
    kind: ParticipationType,
    entrants: Option<usize>,
) -> ValidationReport {
    match config {
        FormatConfig::SingleElimination(c) => {
            elimination_report(BracketFormat::SingleElimination, kind, entrants, c)
        }
        FormatConfig::DoubleElimination(c) => {
            elimination_report(BracketFormat::DoubleElimination, kind, entrants, c)
        }
        FormatConfig::Swiss(c) => swiss_report(kind, entrants, c),
        FormatConfig::BattleRoyale(c) => battle_royale_report(kind, entrants, c),
        // Groups of later round robin stages are drawn from the advancing seeds.
        FormatConfig::RoundRobin(_) | FormatConfig::Custom | FormatConfig::MultiStage { .. } => {
            ValidationReport::new()
        }
    }
}

/// Entrants of the stage after `stage`, when they can be known from its advancement rule.
fn next_entrants(stage: &StageDraft, entrants: Option<usize>) -> Option<usize> {
    let rule = stage.advancement_rule?;
    let count = rule.count as usize;
    match rule.kind {
        AdvancementKind::TopNOverall => Some(entrants.map_or(count, |n| count.min(n))),
        AdvancementKind::TopNPerGroup => match &stage.config {
            FormatConfig::RoundRobin(rr) if !rr.groups.is_empty() => Some(
                rr.groups.iter().map(|g| count.min(g.len())).sum(),
            ),
            _ => None,
        },
    }
}
