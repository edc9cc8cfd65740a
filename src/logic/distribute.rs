//! Seed distribution into groups: round-robin (i mod G) and snake (serpentine rows).

use crate::models::{EngineError, Group, ParticipantId, SeedList};

/// Group label for a 0-based index: A..Z, then AA, AB, ...
pub fn group_letters(index: usize) -> String {
    let mut n = index;
    let mut letters = Vec::new();
    loop {
        letters.push((b'A' + (n % 26) as u8) as char);
        if n < 26 {
            break;
        }
        n = n / 26 - 1;
    }
    letters.iter().rev().collect()
}

/// Display name of the group at a 0-based index ("Group A").
pub fn group_name(index: usize) -> String {
    format!("Group {}", group_letters(index))
}

fn empty_groups(group_count: usize) -> Result<Vec<Group>, EngineError> {
    if group_count == 0 {
        return Err(EngineError::InvalidArgument(
            "group count must be at least 1".to_string(),
        ));
    }
    Ok((0..group_count).map(|i| Group::new(group_name(i))).collect())
}

fn distribute_by(
    seeds: &SeedList,
    group_count: usize,
    target: impl Fn(usize) -> usize,
) -> Result<Vec<Group>, EngineError> {
    let mut groups = empty_groups(group_count)?;
    for (i, id) in seeds.ids().into_iter().enumerate() {
        groups[target(i)].members.push(id);
    }
    Ok(groups)
}

/// Seed at index `i` goes to group `i mod group_count`, in seed order.
pub fn auto_distribute(seeds: &SeedList, group_count: usize) -> Result<Vec<Group>, EngineError> {
    distribute_by(seeds, group_count, |i| i % group_count)
}

/// Rows of `group_count` seeds; even rows fill left to right, odd rows right to left.
pub fn snake_distribute(seeds: &SeedList, group_count: usize) -> Result<Vec<Group>, EngineError> {
    distribute_by(seeds, group_count, |i| {
        let row = i / group_count;
        let col = i % group_count;
        if row % 2 == 0 {
            col
        } else {
            group_count - 1 - col
        }
    })
}

/// Seeds not in any group, in seed order.
pub fn unassigned(seeds: &SeedList, groups: &[Group]) -> Vec<ParticipantId> {
    seeds
        .ids()
        .into_iter()
        .filter(|id| !groups.iter().any(|g| g.contains(*id)))
        .collect()
}
