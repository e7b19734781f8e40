use std::collections::VecDeque;

use common::models::Direction;

const HISTORY_LEN: usize = 5;
const MAX_STREAK: usize = 3;

/// Breaks up long runs of the same direction.
///
/// Raw directions are remembered (not the balanced ones), and a proposal that
/// would make three identical raw directions in a row is flipped.
#[derive(Debug, Default)]
pub struct DirectionBalancer {
    recent: VecDeque<Direction>,
}

impl DirectionBalancer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn apply(&mut self, raw: Direction) -> Direction {
        self.recent.push_back(raw);
        if self.recent.len() > HISTORY_LEN {
            self.recent.pop_front();
        }

        if self.recent.len() >= MAX_STREAK
            && self.recent.iter().rev().take(MAX_STREAK).all(|d| *d == raw)
        {
            return raw.opposite();
        }
        raw
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use Direction::{Buy, Sell};

    #[test]
    fn test_third_identical_direction_is_flipped() {
        let mut balancer = DirectionBalancer::new();
        assert_eq!(balancer.apply(Buy), Buy);
        assert_eq!(balancer.apply(Buy), Buy);
        assert_eq!(balancer.apply(Buy), Sell);
        // The raw streak keeps going, so it keeps flipping.
        assert_eq!(balancer.apply(Buy), Sell);
    }

    #[test]
    fn test_mixed_directions_pass_through() {
        let mut balancer = DirectionBalancer::new();
        for raw in [Buy, Sell, Buy, Sell, Sell, Buy] {
            assert_eq!(balancer.apply(raw), raw);
        }
    }

    #[test]
    fn test_history_is_bounded() {
        let mut balancer = DirectionBalancer::new();
        for _ in 0..20 {
            balancer.apply(Sell);
        }
        assert_eq!(balancer.recent.len(), HISTORY_LEN);
    }
}
