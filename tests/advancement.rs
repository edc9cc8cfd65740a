//! Integration tests for qualifier calculation between stages.

use bracket_engine::logic::calculate_advancement;
use bracket_engine::models::{
    AdvancementRule, EngineError, ParticipantProfile, Record, Standing,
};
use uuid::Uuid;

fn standing(name: &str, group: Option<&str>, rank: u32) -> Standing {
    Standing {
        participant: ParticipantProfile {
            id: Uuid::new_v4(),
            display_name: name.to_string(),
            media: None,
        },
        group: group.map(str::to_string),
        rank,
        record: Record::default(),
    }
}

/// Two groups of four, listed out of rank order.
fn grouped() -> Vec<Standing> {
    vec![
        standing("A3", Some("Group A"), 3),
        standing("B1", Some("Group B"), 1),
        standing("A1", Some("Group A"), 1),
        standing("B4", Some("Group B"), 4),
        standing("A2", Some("Group A"), 2),
        standing("B2", Some("Group B"), 2),
        standing("A4", Some("Group A"), 4),
        standing("B3", Some("Group B"), 3),
    ]
}

fn names(proposal: &bracket_engine::models::AdvancementProposal) -> Vec<&str> {
    proposal
        .seeds
        .iter()
        .map(|s| s.participant.display_name.as_str())
        .collect()
}

#[test]
fn top_two_per_group_in_group_order() {
    let order = vec!["Group A".to_string(), "Group B".to_string()];
    let proposal = calculate_advancement(0, &grouped(), &order, AdvancementRule::per_group(2)).unwrap();
    assert_eq!(names(&proposal), vec!["A1", "A2", "B1", "B2"]);
    let groups: Vec<Option<&str>> = proposal.seeds.iter().map(|s| s.group.as_deref()).collect();
    assert_eq!(
        groups,
        vec![Some("Group A"), Some("Group A"), Some("Group B"), Some("Group B")]
    );
    assert_eq!(proposal.seeds[0].reason, "1st in Group A");
    assert_eq!(proposal.seeds[3].reason, "2nd in Group B");
}

#[test]
fn group_order_is_respected_and_unlisted_groups_follow() {
    let order = vec!["Group B".to_string()];
    let proposal = calculate_advancement(0, &grouped(), &order, AdvancementRule::per_group(1)).unwrap();
    assert_eq!(names(&proposal), vec!["B1", "A1"]);
}

#[test]
fn count_larger_than_group_takes_whole_group() {
    let proposal = calculate_advancement(0, &grouped(), &[], AdvancementRule::per_group(10)).unwrap();
    assert_eq!(proposal.seeds.len(), 8);
}

#[test]
fn top_n_overall_ignores_groups() {
    let standings = vec![
        standing("Third", None, 3),
        standing("First", None, 1),
        standing("Second", None, 2),
        standing("Fourth", None, 4),
    ];
    let proposal = calculate_advancement(1, &standings, &[], AdvancementRule::overall(3)).unwrap();
    assert_eq!(proposal.stage_order, 1);
    assert_eq!(names(&proposal), vec!["First", "Second", "Third"]);
    assert_eq!(proposal.seeds[2].reason, "3rd overall");
}

#[test]
fn equal_ranks_keep_standings_order() {
    let standings = vec![
        standing("X", None, 1),
        standing("Y", None, 1),
        standing("Z", None, 1),
    ];
    let proposal = calculate_advancement(0, &standings, &[], AdvancementRule::overall(2)).unwrap();
    assert_eq!(names(&proposal), vec!["X", "Y"]);
}

#[test]
fn rejects_bad_rules_and_standings() {
    assert!(matches!(
        calculate_advancement(0, &grouped(), &[], AdvancementRule::overall(0)),
        Err(EngineError::Configuration(_))
    ));

    let ungrouped = vec![standing("Solo", None, 1), standing("Duo", None, 2)];
    assert!(matches!(
        calculate_advancement(0, &ungrouped, &[], AdvancementRule::per_group(1)),
        Err(EngineError::Configuration(_))
    ));

    let mut dup = grouped();
    dup.push(dup[0].clone());
    assert!(matches!(
        calculate_advancement(0, &dup, &[], AdvancementRule::overall(2)),
        Err(EngineError::StructuralConflict(_))
    ));
}

#[test]
fn proposal_can_be_reordered() {
    let standings = vec![standing("One", None, 1), standing("Two", None, 2)];
    let mut proposal = calculate_advancement(0, &standings, &[], AdvancementRule::overall(2)).unwrap();
    let two = proposal.seeds[1].participant.id;
    proposal.move_up(two).unwrap();
    assert_eq!(names(&proposal), vec!["Two", "One"]);
    assert!(proposal.move_up(two).is_err());
    assert!(proposal.move_down(Uuid::new_v4()).is_err());
    assert_eq!(proposal.seed_ids()[0], two);
}
