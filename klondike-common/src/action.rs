use crate::card::{Card, Suit};
use crate::error::GameError;
use crate::pile::{Cards, Pile};
use crate::rules::{can_place_on_foundation, can_place_on_tableau, is_valid_run};
use crate::state::{GameState, TOTAL_TABLEAUS};

use anyhow::Result;

/// A move between piles. Moves describe what to do, never hold on to a state,
/// and are applied by value with [`apply_move`].
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum Move {
    WasteToFoundation,
    WasteToTableau(usize),
    TableauToFoundation(usize),
    TableauToTableau(usize, usize, usize), // (from_index, to_index, count)
    /// Not produced by the search; kept for interactive play.
    FoundationToTableau(Suit, usize),
    /// Turns the top stock card, or recycles the waste when the stock is empty.
    Draw,
}

impl Move {
    pub fn is_draw(&self) -> bool {
        matches!(self, Move::Draw)
    }

    pub fn notation(&self) -> String {
        match *self {
            Move::Draw => "D".into(),
            Move::WasteToFoundation => "W:F".into(),
            Move::WasteToTableau(idx) => format!("W:T{}", idx + 1),
            Move::TableauToFoundation(idx) => format!("T{}:F", idx + 1),
            Move::FoundationToTableau(suit, idx) => format!("F{}:T{}", suit.symbol(), idx + 1),
            Move::TableauToTableau(from_idx, to_idx, count) => {
                let mut str = format!("T{}:T{}", from_idx + 1, to_idx + 1);
                if count > 1 {
                    str.push_str(&format!("@{count}"));
                }
                str
            }
        }
    }
}

pub fn format_moves(moves: &[Move]) -> String {
    let mut list = vec![];
    let mut i = 0;
    while i < moves.len() {
        if moves[i].is_draw() {
            let mut count = 1;
            while i + count < moves.len() && moves[i + count].is_draw() {
                count += 1;
            }
            list.push(if count == 1 {
                "D".into()
            } else {
                format!("{count}D")
            });
            i += count;
            continue;
        }
        list.push(moves[i].notation());
        i += 1;
    }

    let mut output = String::new();
    let max_width = list.iter().map(|s| s.chars().count()).max().unwrap_or_default() + 1;
    for chunk in list.chunks(10) {
        for cmd in chunk {
            output.push_str(&format!("{cmd:<width$}", width = max_width));
        }
        output.push('\n');
    }

    output
}

fn invalid(mov: Move, reason: impl Into<String>) -> anyhow::Error {
    GameError::invalid_move(mov, reason).into()
}

fn column(state: &GameState, mov: Move, idx: usize) -> Result<&Pile> {
    if idx >= TOTAL_TABLEAUS {
        return Err(invalid(mov, format!("no tableau column {}", idx + 1)));
    }
    Ok(&state.tableaus[idx])
}

/// Applies `mov` to `state` and returns the successor state.
///
/// `state` is left untouched. A move whose preconditions do not hold fails with
/// [`GameError::InvalidMove`]; a successor that breaks the card invariant fails
/// with [`GameError::CorruptState`].
pub fn apply_move(state: &GameState, mov: Move) -> Result<GameState> {
    let mut next = state.clone();

    match mov {
        Move::WasteToFoundation => {
            let card = next
                .waste
                .peek_top()
                .ok_or_else(|| invalid(mov, "waste is empty"))?;
            if !can_place_on_foundation(card, next.foundation(card.suit).cards()) {
                return Err(invalid(mov, format!("{card} cannot go on its foundation")));
            }
            next.waste.pop_card();
            next.foundations[card.suit.index()].push_card(card);
        }
        Move::WasteToTableau(idx) => {
            let target = column(&next, mov, idx)?.peek_top();
            let card = next
                .waste
                .peek_top()
                .ok_or_else(|| invalid(mov, "waste is empty"))?;
            if !can_place_on_tableau(card, target) {
                return Err(invalid(mov, format!("{card} cannot go on tableau {}", idx + 1)));
            }
            next.waste.pop_card();
            next.tableaus[idx].push_card(card);
        }
        Move::TableauToFoundation(idx) => {
            let card = column(&next, mov, idx)?
                .peek_top()
                .ok_or_else(|| invalid(mov, format!("tableau {} is empty", idx + 1)))?;
            if !can_place_on_foundation(card, next.foundation(card.suit).cards()) {
                return Err(invalid(mov, format!("{card} cannot go on its foundation")));
            }
            next.tableaus[idx].pop_card();
            next.tableaus[idx].reveal_top();
            next.foundations[card.suit.index()].push_card(card);
        }
        Move::TableauToTableau(from_idx, to_idx, count) => {
            if from_idx == to_idx {
                return Err(invalid(mov, "source and destination are the same column"));
            }
            let target = column(&next, mov, to_idx)?.peek_top();
            let run = column(&next, mov, from_idx)?
                .top(count)
                .filter(|run| !run.is_empty())
                .ok_or_else(|| invalid(mov, format!("tableau {} has fewer than {count} cards", from_idx + 1)))?;
            if !is_valid_run(run) {
                return Err(invalid(mov, "cards do not form a face-up alternating run"));
            }
            if !can_place_on_tableau(run[0], target) {
                return Err(invalid(mov, format!("{} cannot go on tableau {}", run[0], to_idx + 1)));
            }
            let cards: Cards = next.tableaus[from_idx].take_top(count).unwrap_or_default();
            next.tableaus[to_idx].extend_from_slice(&cards);
            next.tableaus[from_idx].reveal_top();
        }
        Move::FoundationToTableau(suit, idx) => {
            let target = column(&next, mov, idx)?.peek_top();
            let card = next
                .foundation(suit)
                .peek_top()
                .ok_or_else(|| invalid(mov, format!("{} foundation is empty", suit.symbol())))?;
            if !can_place_on_tableau(card, target) {
                return Err(invalid(mov, format!("{card} cannot go on tableau {}", idx + 1)));
            }
            next.foundations[suit.index()].pop_card();
            next.tableaus[idx].push_card(card);
        }
        Move::Draw => {
            if let Some(card) = next.stock.pop_card() {
                next.waste.push_card(card.with_face_up(true));
            } else if !next.waste.is_empty() {
                next.stock = Pile::new(next.waste.take_all_reversed(false));
            } else {
                return Err(invalid(mov, "stock and waste are empty"));
            }
        }
    }

    next.validate()?;
    Ok(next)
}

pub fn describe_move(state: &GameState, mov: &Move) -> String {
    let format_card =
        |card: Option<Card>| -> String { card.map(|c| c.to_pretty_string()).unwrap_or_default() };
    let tableau_top = |idx: usize| state.tableaus.get(idx).and_then(Pile::peek_top);

    match *mov {
        Move::WasteToFoundation => {
            let from_card = state.waste.peek_top();
            let to_card = from_card.and_then(|c| state.foundation(c.suit).peek_top());
            format!(
                "(Waste) {} -> (Foundation) {}",
                format_card(from_card),
                format_card(to_card)
            )
        }
        Move::WasteToTableau(idx) => format!(
            "(Waste) {} -> (Tableau{}) {}",
            format_card(state.waste.peek_top()),
            idx + 1,
            format_card(tableau_top(idx))
        ),
        Move::TableauToFoundation(idx) => {
            let from_card = tableau_top(idx);
            let to_card = from_card.and_then(|c| state.foundation(c.suit).peek_top());
            format!(
                "(Tableau{}) {} -> (Foundation) {}",
                idx + 1,
                format_card(from_card),
                format_card(to_card)
            )
        }
        Move::FoundationToTableau(suit, idx) => format!(
            "(Foundation{}) {} -> (Tableau{}) {}",
            suit.symbol(),
            format_card(state.foundation(suit).peek_top()),
            idx + 1,
            format_card(tableau_top(idx))
        ),
        Move::TableauToTableau(from_idx, to_idx, count) => {
            let from_cards = state
                .tableaus
                .get(from_idx)
                .and_then(|pile| pile.top(count))
                .unwrap_or_default()
                .iter()
                .map(|c| c.to_pretty_string())
                .collect::<Vec<_>>()
                .join("");
            format!(
                "(Tableau{}) {from_cards} -> (Tableau{}) {}",
                from_idx + 1,
                to_idx + 1,
                format_card(tableau_top(to_idx))
            )
        }
        Move::Draw => match state.stock.peek_top() {
            Some(card) => format!("Draw {card}"),
            None => "Redeal".to_string(),
        },
    }
}
