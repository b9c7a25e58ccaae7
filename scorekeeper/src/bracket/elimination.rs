//! Knockout bracket construction.

use super::models::{BracketMatch, Stage};

/// Slot order for a bracket of `bracket_size` (a power of two).
///
/// Built recursively: the order for `2k` slots emits, for every entry `s`
/// of the order for `k` slots, `s` followed by `2k - 1 - s`. Consecutive
/// pairs are first-round matches, so seed 0 meets the last seed, and
/// seeds 0 and 1 sit in opposite halves.
pub fn seeding_order(bracket_size: usize) -> Vec<usize> {
    if bracket_size <= 2 {
        return (0..bracket_size).collect();
    }

    seeding_order(bracket_size / 2)
        .into_iter()
        .flat_map(|s| [s, bracket_size - 1 - s])
        .collect()
}

/// Knockout bracket for `participants`, where `participants[slot]` is the
/// team index placed on seed slot `slot`.
///
/// Slots past the participant count are empty, which turns the first-round
/// match into a bye. Byes are not advanced. Later rounds are placeholders.
pub fn single_elimination(participants: &[usize], third_place_match: bool) -> Vec<BracketMatch> {
    let team_count = participants.len();
    if team_count < 2 {
        return Vec::new();
    }

    let bracket_size = team_count.next_power_of_two();
    let total_rounds = bracket_size.trailing_zeros();
    let mut matches = Vec::with_capacity(bracket_size);

    let first_stage = Stage::from_rounds_remaining(total_rounds - 1);
    for pair in seeding_order(bracket_size).chunks(2) {
        let home = participants.get(pair[0]).copied();
        let away = participants.get(pair[1]).copied();
        matches.push(BracketMatch::new(home, away, 1, first_stage));
    }

    for round in 2..=total_rounds {
        let stage = Stage::from_rounds_remaining(total_rounds - round);
        if round == total_rounds && third_place_match {
            matches.push(BracketMatch::placeholder(round, Stage::ThirdPlace));
        }
        for _ in 0..bracket_size >> round {
            matches.push(BracketMatch::placeholder(round, stage));
        }
    }

    matches
}
