use klondike_common::rules::{can_place_on_foundation, can_place_on_tableau, is_valid_run};
use klondike_common::state::TOTAL_TABLEAUS;
use klondike_common::{GameState, Move};

use smallvec::SmallVec;

pub type PossibleMoves = SmallVec<[Move; 64]>;

pub fn possible_moves(state: &GameState) -> PossibleMoves {
    let mut moves = PossibleMoves::new();
    compute_possible_moves(state, &mut moves);
    moves
}

/// Appends every legal move of `state` to `possible_moves`: tableau to
/// foundation, waste to foundation, tableau to tableau, waste to tableau and
/// finally the draw, which also stands for recycling an exhausted stock.
///
/// Foundation to tableau moves are legal but never generated.
pub fn compute_possible_moves(state: &GameState, possible_moves: &mut PossibleMoves) {
    compute_move_to_foundation(state, possible_moves);
    compute_move_from_tableau(state, possible_moves);
    compute_move_from_waste(state, possible_moves);

    if !state.stock().is_empty() || !state.waste().is_empty() {
        possible_moves.push(Move::Draw);
    }
}

fn compute_move_to_foundation(state: &GameState, possible_moves: &mut PossibleMoves) {
    for (idx, pile) in state.tableaus().iter().enumerate() {
        if let Some(card) = pile.peek_top() {
            if can_place_on_foundation(card, state.foundation(card.suit).cards()) {
                possible_moves.push(Move::TableauToFoundation(idx));
            }
        }
    }

    if let Some(card) = state.waste().peek_top() {
        if can_place_on_foundation(card, state.foundation(card.suit).cards()) {
            possible_moves.push(Move::WasteToFoundation);
        }
    }
}

fn compute_move_from_tableau(state: &GameState, possible_moves: &mut PossibleMoves) {
    let tops: [_; TOTAL_TABLEAUS] = std::array::from_fn(|idx| state.tableau(idx).peek_top());

    for (src_idx, src_pile) in state.tableaus().iter().enumerate() {
        let cards = src_pile.cards();
        for start in src_pile.first_face_up()..cards.len() {
            let run = &cards[start..];
            if !is_valid_run(run) {
                continue;
            }
            for (dest_idx, &dest_top) in tops.iter().enumerate() {
                if dest_idx != src_idx && can_place_on_tableau(run[0], dest_top) {
                    possible_moves.push(Move::TableauToTableau(src_idx, dest_idx, run.len()));
                }
            }
        }
    }
}

fn compute_move_from_waste(state: &GameState, possible_moves: &mut PossibleMoves) {
    let Some(card) = state.waste().peek_top() else {
        return;
    };
    for (idx, pile) in state.tableaus().iter().enumerate() {
        if can_place_on_tableau(card, pile.peek_top()) {
            possible_moves.push(Move::WasteToTableau(idx));
        }
    }
}
