use crate::card::Card;

use smallvec::SmallVec;
use std::sync::Arc;

/// Inline capacity of a pile; the stock is the largest pile of a fresh deal.
pub const PILE_CAPACITY: usize = 24;

pub type Cards = SmallVec<[Card; PILE_CAPACITY]>;

/// An ordered run of cards, bottom first, with copy-on-write storage.
///
/// Cloning a pile only bumps a reference count. The first mutation of a clone
/// copies the cards, so a pile reachable from one game state never observes
/// edits made while building another.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Pile {
    cards: Arc<Cards>,
}

impl Pile {
    pub fn new<I: IntoIterator<Item = Card>>(cards: I) -> Self {
        Self {
            cards: Arc::new(cards.into_iter().collect()),
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.cards.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    #[inline]
    pub fn cards(&self) -> &[Card] {
        &self.cards
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Card> {
        self.cards.iter()
    }

    #[inline]
    pub fn peek_top(&self) -> Option<Card> {
        self.cards.last().copied()
    }

    /// Index of the lowest card of the face-up run that ends at the top.
    /// Equals `len()` when the pile is empty or its top card is face-down.
    pub fn first_face_up(&self) -> usize {
        let face_up_on_top = self.cards.iter().rev().take_while(|card| card.face_up).count();
        self.len() - face_up_on_top
    }

    #[inline]
    pub fn face_up_count(&self) -> usize {
        self.len() - self.first_face_up()
    }

    pub fn hidden_count(&self) -> usize {
        self.cards.iter().filter(|card| !card.face_up).count()
    }

    /// The top `count` cards, bottom first.
    pub fn top(&self, count: usize) -> Option<&[Card]> {
        let len = self.len();
        (count <= len).then(|| &self.cards[len - count..])
    }

    /// Whether both piles still point at the same storage.
    pub fn shares_storage_with(&self, other: &Pile) -> bool {
        Arc::ptr_eq(&self.cards, &other.cards)
    }

    #[inline]
    fn cards_mut(&mut self) -> &mut Cards {
        Arc::make_mut(&mut self.cards)
    }

    #[inline]
    pub fn push_card(&mut self, card: Card) {
        self.cards_mut().push(card);
    }

    pub fn extend_from_slice(&mut self, cards: &[Card]) {
        self.cards_mut().extend_from_slice(cards);
    }

    #[inline]
    pub fn pop_card(&mut self) -> Option<Card> {
        if self.is_empty() {
            return None;
        }
        self.cards_mut().pop()
    }

    /// Removes the top `count` cards and returns them bottom first.
    pub fn take_top(&mut self, count: usize) -> Option<Cards> {
        let len = self.len();
        if count > len {
            return None;
        }
        Some(self.cards_mut().drain(len - count..).collect())
    }

    /// Empties the pile, returning its cards reversed and turned to `face_up`.
    pub fn take_all_reversed(&mut self, face_up: bool) -> Cards {
        let cards: Cards = self
            .cards
            .iter()
            .rev()
            .map(|card| card.with_face_up(face_up))
            .collect();
        self.cards = Arc::default();
        cards
    }

    /// Turns the top card face-up; returns whether it was face-down.
    pub fn reveal_top(&mut self) -> bool {
        match self.cards.last() {
            Some(card) if !card.face_up => {
                if let Some(top) = self.cards_mut().last_mut() {
                    top.face_up = true;
                }
                true
            }
            _ => false,
        }
    }
}

impl<'a> IntoIterator for &'a Pile {
    type Item = &'a Card;
    type IntoIter = std::slice::Iter<'a, Card>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::card::{Rank, Suit};

    fn card(rank: Rank, suit: Suit, face_up: bool) -> Card {
        Card::new(rank, suit).with_face_up(face_up)
    }

    #[test]
    fn test_clone_is_copy_on_write() {
        let original = Pile::new([
            card(Rank::Five, Suit::Clubs, false),
            card(Rank::Four, Suit::Hearts, true),
        ]);
        let mut copy = original.clone();
        assert!(copy.shares_storage_with(&original));

        copy.pop_card();
        assert!(!copy.shares_storage_with(&original));
        assert_eq!(original.len(), 2);
        assert_eq!(copy.len(), 1);
        assert_eq!(original.peek_top(), Some(card(Rank::Four, Suit::Hearts, true)));
    }

    #[test]
    fn test_face_up_run() {
        let pile = Pile::new([
            card(Rank::King, Suit::Clubs, false),
            card(Rank::Nine, Suit::Spades, false),
            card(Rank::Eight, Suit::Hearts, true),
            card(Rank::Seven, Suit::Clubs, true),
        ]);
        assert_eq!(pile.first_face_up(), 2);
        assert_eq!(pile.face_up_count(), 2);
        assert_eq!(pile.hidden_count(), 2);
        assert_eq!(pile.top(2).map(|c| c.len()), Some(2));
        assert!(pile.top(5).is_none());

        let empty = Pile::default();
        assert_eq!(empty.first_face_up(), 0);
        assert_eq!(empty.face_up_count(), 0);
    }

    #[test]
    fn test_take_top_and_reveal() {
        let mut pile = Pile::new([
            card(Rank::King, Suit::Clubs, false),
            card(Rank::Eight, Suit::Hearts, true),
            card(Rank::Seven, Suit::Clubs, true),
        ]);
        let taken = pile.take_top(2).unwrap();
        assert_eq!(taken[0].rank, Rank::Eight);
        assert_eq!(taken[1].rank, Rank::Seven);
        assert!(pile.reveal_top());
        assert!(!pile.reveal_top());
        assert_eq!(pile.peek_top(), Some(card(Rank::King, Suit::Clubs, true)));
        assert!(pile.take_top(2).is_none());
    }

    #[test]
    fn test_take_all_reversed() {
        let mut pile = Pile::new([
            card(Rank::Ace, Suit::Clubs, true),
            card(Rank::Two, Suit::Clubs, true),
        ]);
        let cards = pile.take_all_reversed(false);
        assert!(pile.is_empty());
        assert_eq!(cards[0], card(Rank::Two, Suit::Clubs, false));
        assert_eq!(cards[1], card(Rank::Ace, Suit::Clubs, false));
    }
}
