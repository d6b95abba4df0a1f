use crate::domain::VoteValue;

/// Effect of a vote click given the vote the user already had.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VoteChange {
    /// Amount added to the post's cached score.
    pub delta: i64,
    /// The user's vote after the click; `None` means the vote was removed.
    pub next: Option<VoteValue>,
}

/// Clicking the same arrow again removes the vote; clicking the opposite
/// arrow flips it and moves the score by two.
pub fn resolve_vote(prior: Option<VoteValue>, requested: VoteValue) -> VoteChange {
    match prior {
        None => VoteChange {
            delta: requested.as_i64(),
            next: Some(requested),
        },
        Some(prior) if prior == requested => VoteChange {
            delta: -requested.as_i64(),
            next: None,
        },
        Some(prior) => VoteChange {
            delta: requested.as_i64() - prior.as_i64(),
            next: Some(requested),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const BOTH: [VoteValue; 2] = [VoteValue::Up, VoteValue::Down];

    #[test]
    fn first_vote_moves_score_by_its_value() {
        for value in BOTH {
            let change = resolve_vote(None, value);
            assert_eq!(change.delta, value.as_i64());
            assert_eq!(change.next, Some(value));
        }
    }

    #[test]
    fn repeating_a_vote_removes_it() {
        for value in BOTH {
            let change = resolve_vote(Some(value), value);
            assert_eq!(change.delta, -value.as_i64());
            assert_eq!(change.next, None);
        }
    }

    #[test]
    fn flipping_a_vote_moves_score_by_the_difference() {
        for (prior, requested) in [(VoteValue::Up, VoteValue::Down), (VoteValue::Down, VoteValue::Up)] {
            let change = resolve_vote(Some(prior), requested);
            assert_eq!(change.delta, requested.as_i64() - prior.as_i64());
            assert_eq!(change.delta.abs(), 2);
            assert_eq!(change.next, Some(requested));
        }
    }
}
