//! Placement predicates shared by the search and by interactive move validation.

use crate::card::{Card, Rank};

/// Whether `card` may be placed on a tableau column whose top card is `target`
/// (`None` for an empty column).
///
/// Only face-up cards move. An empty column accepts a King; otherwise the card
/// must be one rank below the target and of the opposite color.
pub fn can_place_on_tableau(card: Card, target: Option<Card>) -> bool {
    if !card.face_up {
        return false;
    }
    match target {
        None => card.rank == Rank::King,
        Some(target) => {
            target.face_up
                && target.rank.prev() == Some(card.rank)
                && card.color() != target.color()
        }
    }
}

/// Whether `card` may be placed on `pile`, a foundation pile listed bottom to top.
pub fn can_place_on_foundation(card: Card, pile: &[Card]) -> bool {
    if !card.face_up {
        return false;
    }
    match pile.last() {
        None => card.rank == Rank::Ace,
        Some(top) => top.face_up && top.suit == card.suit && top.rank.next() == Some(card.rank),
    }
}

/// Whether `cards` may move together as one tableau run: every card face-up and
/// each card one rank below and opposite in color to the card beneath it.
pub fn is_valid_run(cards: &[Card]) -> bool {
    if cards.iter().any(|card| !card.face_up) {
        return false;
    }
    cards
        .windows(2)
        .all(|pair| pair[0].rank.prev() == Some(pair[1].rank) && pair[0].color() != pair[1].color())
}
