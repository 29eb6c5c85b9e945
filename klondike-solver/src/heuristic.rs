use klondike_common::GameState;

/// Weights of the distance-to-goal estimate. Lower scores are closer to solved.
///
/// The estimate is not admissible; it steers a greedy best-first search
/// rather than bounding the remaining number of moves.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HeuristicWeights {
    /// Per card on a foundation.
    pub foundation: i32,
    /// Per face-down card in the tableau. A reveal moves the score by `-hidden`.
    pub hidden: i32,
    /// Per empty tableau column.
    pub empty_column: i32,
    /// Per card left in stock or waste.
    pub talon: i32,
}

impl Default for HeuristicWeights {
    fn default() -> Self {
        Self {
            foundation: -50,
            hidden: -20,
            empty_column: -30,
            talon: 1,
        }
    }
}

impl HeuristicWeights {
    pub fn evaluate(&self, state: &GameState) -> i32 {
        self.foundation * state.foundation_count() as i32
            + self.hidden * state.hidden_count() as i32
            + self.empty_column * state.empty_columns() as i32
            + self.talon * state.talon_count() as i32
    }
}

pub fn heuristic(state: &GameState) -> i32 {
    HeuristicWeights::default().evaluate(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::bury;
    use klondike_common::{Card, Move, apply_move};

    #[test]
    fn test_opening_deal() {
        let state = GameState::deal(&Card::full_deck()).unwrap();
        // 21 hidden tableau cards, 24 in the stock
        assert_eq!(heuristic(&state), -20 * 21 + 24);
    }

    #[test]
    fn test_solved_state() {
        let state = bury(
            r#"Foundation1: K♥
Foundation2: K♦
Foundation3: K♣
Foundation4: K♠"#,
            "Stock",
        );
        assert!(state.is_won());
        assert_eq!(heuristic(&state), -50 * 52 - 30 * 7);
    }

    #[test]
    fn test_foundation_move_lowers_score() {
        let state = bury(
            r#"Foundation1: T♥
Foundation2: K♦
Foundation3: K♣
Foundation4: K♠
Tableau1: K♥Q♥|J♥"#,
            "Stock",
        );
        let next = apply_move(&state, Move::TableauToFoundation(0)).unwrap();
        // one more foundation card, one fewer hidden card
        assert_eq!(heuristic(&next), heuristic(&state) - 50 + 20);
    }

    #[test]
    fn test_custom_weights() {
        let state = GameState::deal(&Card::full_deck()).unwrap();
        let weights = HeuristicWeights {
            foundation: 0,
            hidden: 0,
            empty_column: 0,
            talon: 2,
        };
        assert_eq!(weights.evaluate(&state), 48);
    }
}
