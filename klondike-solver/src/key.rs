use klondike_common::{Card, GameState, Suit};

use smallvec::SmallVec;

const KEY_CAPACITY: usize = 96;
const SEPARATOR: u8 = 0xff;
const FACE_UP: u8 = 0x80;

/// Deduplication key of a state in the visited set.
///
/// Holds every tableau card with its orientation and the height of each
/// foundation. The stock and waste only contribute their sizes unless the
/// key is built with `exact_talon`, so positions that differ only in talon
/// order collide by default.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct StateKey(SmallVec<[u8; KEY_CAPACITY]>);

impl StateKey {
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }
}

#[inline]
fn card_byte(card: &Card) -> u8 {
    card.id() | if card.face_up { FACE_UP } else { 0 }
}

pub fn state_key(state: &GameState, exact_talon: bool) -> StateKey {
    let mut key = SmallVec::new();

    for pile in state.tableaus() {
        key.extend(pile.iter().map(card_byte));
        key.push(SEPARATOR);
    }

    for suit in Suit::ALL {
        key.push(suit.index() as u8);
        key.push(state.foundation(suit).len() as u8);
    }

    key.push(state.stock().len() as u8);
    key.push(state.waste().len() as u8);

    if exact_talon {
        key.extend(state.stock().iter().map(Card::id));
        key.push(SEPARATOR);
        key.extend(state.waste().iter().map(Card::id));
    }

    StateKey(key)
}
