//! Round robin scheduling with the circle method.

use super::models::{BracketMatch, Stage};

/// Every pairing of `team_count` teams exactly once.
///
/// Slot 0 stays fixed while the remaining slots rotate one position per
/// round. An odd count gets a phantom bye slot, and pairings against it
/// are dropped, so there are `n - 1` rounds (or `n` with the bye).
pub fn round_robin(team_count: usize) -> Vec<BracketMatch> {
    if team_count < 2 {
        return Vec::new();
    }

    let bye = (team_count % 2 == 1).then_some(team_count);
    let slot_count = team_count + usize::from(bye.is_some());
    let mut slots: Vec<usize> = (0..slot_count).collect();
    let mut matches = Vec::with_capacity(team_count * (team_count - 1) / 2);

    for round in 0..slot_count - 1 {
        for i in 0..slot_count / 2 {
            let a = slots[i];
            let b = slots[slot_count - 1 - i];
            if bye == Some(a) || bye == Some(b) {
                continue;
            }

            // the anchored team alternates home and away
            let (home, away) = if i == 0 && round % 2 == 1 {
                (b, a)
            } else {
                (a, b)
            };

            matches.push(BracketMatch::new(
                Some(home),
                Some(away),
                round as u32 + 1,
                Stage::Group,
            ));
        }

        slots[1..].rotate_right(1);
    }

    matches
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    fn pairs(matches: &[BracketMatch]) -> HashSet<(usize, usize)> {
        matches
            .iter()
            .map(|m| {
                let (a, b) = (m.home.unwrap(), m.away.unwrap());
                (a.min(b), a.max(b))
            })
            .collect()
    }

    #[test]
    fn test_four_teams() {
        let matches = round_robin(4);
        assert_eq!(matches.len(), 6);
        assert_eq!(pairs(&matches).len(), 6);
        assert_eq!(matches.iter().map(|m| m.round).max(), Some(3));
        assert!(matches.iter().all(|m| m.stage == Stage::Group && !m.is_bye));
    }

    #[test]
    fn test_odd_count_uses_extra_round() {
        let matches = round_robin(5);
        assert_eq!(matches.len(), 10);
        assert_eq!(pairs(&matches).len(), 10);
        assert_eq!(matches.iter().map(|m| m.round).max(), Some(5));
        assert!(matches.iter().all(|m| m.home.unwrap() < 5 && m.away.unwrap() < 5));
    }

    #[test]
    fn test_no_team_twice_per_round() {
        let matches = round_robin(6);
        for round in 1..=5 {
            let mut seen = HashSet::new();
            for m in matches.iter().filter(|m| m.round == round) {
                assert!(seen.insert(m.home.unwrap()));
                assert!(seen.insert(m.away.unwrap()));
            }
            assert_eq!(seen.len(), 6);
        }
    }

    #[test]
    fn test_degenerate_counts() {
        assert!(round_robin(0).is_empty());
        assert!(round_robin(1).is_empty());
        assert_eq!(round_robin(2).len(), 1);
    }
}
