//! Group stage feeding a knockout bracket.

use super::{
    BracketError,
    elimination::single_elimination,
    models::{Bracket, BracketGroup, BracketMatch},
    round_robin::round_robin,
};

/// Distribute ranked participants over `group_count` groups, alternating
/// direction on every pass (0..k-1, then k-1..0). Group sizes differ by at
/// most one and neighbouring seeds land in different groups.
pub fn snake_draft(participants: &[usize], group_count: usize) -> Vec<Vec<usize>> {
    let mut groups = vec![Vec::new(); group_count];
    if group_count == 0 {
        return groups;
    }

    for (i, &team) in participants.iter().enumerate() {
        let pass = i / group_count;
        let pos = i % group_count;
        let group = if pass % 2 == 0 {
            pos
        } else {
            group_count - 1 - pos
        };
        groups[group].push(team);
    }

    groups
}

/// Groups of round-robin matches followed by a knockout for the
/// `group_count * advancing_per_group` qualifiers. Knockout sides are
/// left undecided until group results are known.
pub fn group_knockout(
    participants: &[usize],
    group_count: usize,
    advancing_per_group: usize,
    third_place_match: bool,
) -> Result<Bracket, BracketError> {
    let team_count = participants.len();

    if group_count == 0 || group_count > team_count {
        return Err(BracketError::InvalidOptions(format!(
            "group count must be between 1 and {team_count}, got {group_count}"
        )));
    }

    let smallest_group = team_count / group_count;
    if advancing_per_group == 0 || advancing_per_group > smallest_group {
        return Err(BracketError::InvalidOptions(format!(
            "advancing per group must be between 1 and {smallest_group}, got {advancing_per_group}"
        )));
    }

    let qualifiers = group_count * advancing_per_group;
    if qualifiers < 2 {
        return Err(BracketError::InvalidOptions(
            "knockout stage needs at least two qualifiers".to_string(),
        ));
    }

    let groups: Vec<BracketGroup> = snake_draft(participants, group_count)
        .into_iter()
        .enumerate()
        .map(|(index, teams)| BracketGroup::new(index, teams))
        .collect();

    let mut matches: Vec<BracketMatch> = groups
        .iter()
        .flat_map(|group| {
            round_robin(group.teams.len()).into_iter().map(move |mut m| {
                m.home = m.home.map(|local| group.teams[local]);
                m.away = m.away.map(|local| group.teams[local]);
                m.group = Some(group.index);
                m
            })
        })
        .collect();

    // stable: within a round, group order is kept
    matches.sort_by_key(|m| m.round);
    let group_rounds = matches.iter().map(|m| m.round).max().unwrap_or(0);

    let seeds: Vec<usize> = (0..qualifiers).collect();
    matches.extend(
        single_elimination(&seeds, third_place_match)
            .into_iter()
            .map(|mut m| {
                m.home = None;
                m.away = None;
                m.is_bye = false;
                m.round += group_rounds;
                m
            }),
    );

    Ok(Bracket { groups, matches })
}
