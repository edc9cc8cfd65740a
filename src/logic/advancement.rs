//! Advancement: who qualifies from a completed stage, and the proposed seeding of the next one.

use crate::models::{
    AdvancementKind, AdvancementProposal, AdvancementRule, AdvancingSeed, EngineError,
    ParticipantId, Stage, Standing,
};
use std::collections::HashSet;

/// English ordinal: 1st, 2nd, 3rd, 4th, 11th, 21st, ...
pub fn ordinal(n: u32) -> String {
    let suffix = match (n % 10, n % 100) {
        (_, 11..=13) => "th",
        (1, _) => "st",
        (2, _) => "nd",
        (3, _) => "rd",
        _ => "th",
    };
    format!("{}{}", n, suffix)
}

fn advancing(standing: &Standing, reason: String) -> AdvancingSeed {
    AdvancingSeed {
        participant: standing.participant.clone(),
        group: standing.group.clone(),
        reason,
    }
}

fn by_rank(standings: Vec<&Standing>) -> Vec<&Standing> {
    let mut sorted = standings;
    // Stable: equal ranks keep standings order.
    sorted.sort_by_key(|s| s.rank);
    sorted
}

/// Compute the qualifiers of a stage from its final standings.
///
/// `top_n_per_group` walks groups in `group_order` (groups only present in the standings follow,
/// in order of first appearance) and takes each group's top `count`. `top_n_overall` takes the top
/// `count` by rank regardless of group.
pub fn calculate_advancement(
    stage_order: u32,
    standings: &[Standing],
    group_order: &[String],
    rule: AdvancementRule,
) -> Result<AdvancementProposal, EngineError> {
    if rule.count < 1 {
        return Err(EngineError::config(
            "advancementRule",
            "advancement count must be at least 1",
        ));
    }
    let mut seen = HashSet::new();
    for s in standings {
        if !seen.insert(s.participant.id) {
            return Err(EngineError::StructuralConflict(format!(
                "{} appears more than once in the standings",
                s.participant.display_name
            )));
        }
    }
    let count = rule.count as usize;

    let seeds = match rule.kind {
        AdvancementKind::TopNPerGroup => {
            if standings.iter().any(|s| s.group.is_none()) {
                return Err(EngineError::config(
                    "advancementRule",
                    "top N per group needs grouped standings",
                ));
            }
            let mut groups: Vec<&str> = group_order.iter().map(String::as_str).collect();
            for s in standings {
                let g = s.group.as_deref().unwrap_or_default();
                if !groups.contains(&g) {
                    groups.push(g);
                }
            }
            groups
                .into_iter()
                .flat_map(|g| {
                    let members = standings
                        .iter()
                        .filter(|s| s.group.as_deref() == Some(g))
                        .collect();
                    by_rank(members)
                        .into_iter()
                        .take(count)
                        .map(move |s| advancing(s, format!("{} in {}", ordinal(s.rank), g)))
                        .collect::<Vec<_>>()
                })
                .collect()
        }
        AdvancementKind::TopNOverall => by_rank(standings.iter().collect())
            .into_iter()
            .take(count)
            .map(|s| {
                let reason = match &s.group {
                    Some(g) => format!("{} in {}", ordinal(s.rank), g),
                    None => format!("{} overall", ordinal(s.rank)),
                };
                advancing(s, reason)
            })
            .collect(),
    };

    Ok(AdvancementProposal {
        stage_order,
        rule,
        seeds,
    })
}

/// Propose advancement out of a stage. The stage must be generated, completed, and not final.
pub fn propose_advancement(stage: &Stage) -> Result<AdvancementProposal, EngineError> {
    if !stage.is_generated {
        return Err(EngineError::StateConflict(format!(
            "stage {} has not been generated",
            stage.name
        )));
    }
    if !stage.is_completed {
        return Err(EngineError::StateConflict(format!(
            "stage {} is not completed yet",
            stage.name
        )));
    }
    let rule = stage.advancement_rule.ok_or_else(|| {
        EngineError::StateConflict(format!("stage {} has no advancement rule", stage.name))
    })?;
    calculate_advancement(stage.order, &stage.standings, &stage.group_order(), rule)
}

impl AdvancementProposal {
    fn index_of(&self, id: ParticipantId) -> Result<usize, EngineError> {
        self.seeds
            .iter()
            .position(|s| s.participant.id == id)
            .ok_or_else(|| EngineError::NotFound(format!("participant {} in proposal", id)))
    }

    pub fn move_up(&mut self, id: ParticipantId) -> Result<(), EngineError> {
        let i = self.index_of(id)?;
        if i == 0 {
            return Err(EngineError::StructuralConflict(
                "participant is already the top seed".to_string(),
            ));
        }
        self.seeds.swap(i, i - 1);
        Ok(())
    }

    pub fn move_down(&mut self, id: ParticipantId) -> Result<(), EngineError> {
        let i = self.index_of(id)?;
        if i + 1 >= self.seeds.len() {
            return Err(EngineError::StructuralConflict(
                "participant is already the bottom seed".to_string(),
            ));
        }
        self.seeds.swap(i, i + 1);
        Ok(())
    }

    /// Seed ids in proposed order, as sent to `confirmAdvancement`.
    pub fn seed_ids(&self) -> Vec<ParticipantId> {
        self.seeds.iter().map(|s| s.participant.id).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::ordinal;

    #[test]
    fn ordinals() {
        let got: Vec<String> = [1, 2, 3, 4, 11, 12, 13, 21, 22, 101, 111].map(ordinal).into();
        assert_eq!(
            got,
            ["1st", "2nd", "3rd", "4th", "11th", "12th", "13th", "21st", "22nd", "101st", "111th"]
        );
    }
}
