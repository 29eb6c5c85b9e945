//! Shuffled deals biased toward being winnable.
//!
//! The bias only nudges the odds: Kings sit at the bottom of columns, low cards
//! near the surface of the short columns and Aces in the stock. Whether a deal
//! can actually be won is for the solver to decide.

use crate::card::{Card, MAX_CARD, Rank};
use crate::error::GameError;
use crate::state::{Deal, TABLEAU_CARDS, TOTAL_TABLEAUS, column_start};

use anyhow::Result;
use rand::Rng;
use rand::seq::SliceRandom;
use smallvec::SmallVec;

/// Layouts tried before giving up with [`GameError::DealGenerationFailed`].
pub const MAX_DEAL_ATTEMPTS: usize = 16;

/// Columns whose upper rows receive low cards.
const LOW_CARD_COLUMNS: usize = 4;
const LOW_CARD_ROWS: std::ops::RangeInclusive<usize> = 1..=3;

type Slots = [Option<Card>; MAX_CARD as usize];

pub fn generate_deal() -> Result<Deal> {
    generate_deal_with(&mut rand::rng())
}

pub fn generate_deal_with<R: Rng + ?Sized>(rng: &mut R) -> Result<Deal> {
    retry_deal(MAX_DEAL_ATTEMPTS, || biased_layout(rng))
}

fn retry_deal<F>(max_attempts: usize, mut attempt: F) -> Result<Deal>
where
    F: FnMut() -> Slots,
{
    for _ in 0..max_attempts {
        if let Some(deal) = validate_layout(&attempt()) {
            return Ok(deal);
        }
    }
    Err(GameError::DealGenerationFailed {
        attempts: max_attempts,
    }
    .into())
}

#[inline]
fn is_low_card(card: &Card) -> bool {
    (Rank::Two..=Rank::Four).contains(&card.rank)
}

/// Whether deal index `index` ends up as the face-up top of its column.
pub fn is_column_top(index: usize) -> bool {
    (0..TOTAL_TABLEAUS).any(|column| column_start(column) + column == index)
}

fn place(slots: &mut Slots, used: &mut u64, slot: usize, card: Card) {
    slots[slot] = Some(card);
    *used |= 1 << card.id();
}

fn biased_layout<R: Rng + ?Sized>(rng: &mut R) -> Slots {
    let mut shuffled = Card::full_deck();
    shuffled.shuffle(rng);

    let pick = |pred: fn(&Card) -> bool| -> SmallVec<[Card; 12]> {
        shuffled.iter().filter(|c| pred(c)).copied().collect()
    };
    let kings = pick(Card::is_king);
    let low_cards = pick(is_low_card);
    let aces = pick(|c| c.rank == Rank::Ace);

    let mut slots: Slots = [None; MAX_CARD as usize];
    let mut used: u64 = 0;

    let mut heads: [usize; TOTAL_TABLEAUS] = std::array::from_fn(column_start);
    heads.shuffle(rng);
    for (&slot, &king) in heads.iter().zip(&kings) {
        place(&mut slots, &mut used, slot, king);
    }

    let mut low_iter = low_cards.iter();
    'columns: for column in 0..LOW_CARD_COLUMNS {
        for row in LOW_CARD_ROWS.filter(|&row| row <= column) {
            let slot = column_start(column) + row;
            if slots[slot].is_some() {
                continue;
            }
            match low_iter.next() {
                Some(&card) => place(&mut slots, &mut used, slot, card),
                None => break 'columns,
            }
        }
    }

    let mut stock_slots: SmallVec<[usize; 24]> = (TABLEAU_CARDS..MAX_CARD as usize).collect();
    stock_slots.shuffle(rng);
    for (&slot, &ace) in stock_slots.iter().zip(&aces) {
        place(&mut slots, &mut used, slot, ace);
    }

    let mut leftovers = shuffled.iter().filter(|c| used & (1 << c.id()) == 0);
    for slot in slots.iter_mut().filter(|s| s.is_none()) {
        *slot = leftovers.next().copied();
    }

    for (index, slot) in slots.iter_mut().enumerate() {
        if let Some(card) = slot {
            card.face_up = index < TABLEAU_CARDS && is_column_top(index);
        }
    }
    slots
}

/// Accepts a layout holding each of the 52 cards exactly once and turns the
/// stock region face-down.
fn validate_layout(slots: &Slots) -> Option<Deal> {
    let mut seen: u64 = 0;
    let mut deal = Card::full_deck();
    for (index, slot) in slots.iter().enumerate() {
        let card = (*slot)?;
        let bit = 1u64 << card.id();
        if seen & bit != 0 {
            return None;
        }
        seen |= bit;
        deal[index] = if index >= TABLEAU_CARDS {
            card.with_face_up(false)
        } else {
            card
        };
    }
    Some(deal)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::GameState;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn assert_complete(deal: &Deal) {
        let mut seen: u64 = 0;
        for card in deal {
            assert_eq!(seen & (1 << card.id()), 0, "{card} dealt twice");
            seen |= 1 << card.id();
        }
        assert_eq!(seen.count_ones(), MAX_CARD as u32);
    }

    #[test]
    fn test_generated_deals_are_complete() {
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..200 {
            let deal = generate_deal_with(&mut rng).unwrap();
            assert_complete(&deal);
            assert!(deal[TABLEAU_CARDS..].iter().all(|card| !card.face_up));
            for (index, card) in deal[..TABLEAU_CARDS].iter().enumerate() {
                assert_eq!(card.face_up, is_column_top(index));
            }
            assert!(GameState::deal(&deal).is_ok());
        }
    }

    #[test]
    fn test_deal_bias() {
        let mut rng = StdRng::seed_from_u64(42);
        for _ in 0..50 {
            let deal = generate_deal_with(&mut rng).unwrap();

            let kings_at_heads = (0..TOTAL_TABLEAUS)
                .filter(|&column| deal[column_start(column)].is_king())
                .count();
            assert_eq!(kings_at_heads, 4);

            assert!(deal[TABLEAU_CARDS..].iter().filter(|c| c.rank == Rank::Ace).count() == 4);

            for column in 1..LOW_CARD_COLUMNS {
                for row in LOW_CARD_ROWS.filter(|&row| row <= column) {
                    let card = deal[column_start(column) + row];
                    assert!(is_low_card(&card), "{card} at column {column} row {row}");
                }
            }
        }
    }

    #[test]
    fn test_seeded_generation_is_deterministic() {
        let a = generate_deal_with(&mut StdRng::seed_from_u64(3)).unwrap();
        let b = generate_deal_with(&mut StdRng::seed_from_u64(3)).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_column_tops() {
        let tops: Vec<usize> = (0..TABLEAU_CARDS).filter(|&i| is_column_top(i)).collect();
        assert_eq!(tops, [0, 2, 5, 9, 14, 20, 27]);
    }

    #[test]
    fn test_retry_gives_up() {
        let mut attempts = 0;
        let err = retry_deal(3, || {
            attempts += 1;
            [None; MAX_CARD as usize]
        })
        .unwrap_err();
        assert_eq!(attempts, 3);
        assert_eq!(
            err.downcast_ref::<GameError>(),
            Some(&GameError::DealGenerationFailed { attempts: 3 })
        );
    }

    #[test]
    fn test_retry_rejects_duplicates_then_recovers() {
        let deck = Card::full_deck();
        let mut attempts = 0;
        let deal = retry_deal(MAX_DEAL_ATTEMPTS, || {
            attempts += 1;
            let mut slots: Slots = deck.map(Some);
            if attempts == 1 {
                slots[1] = slots[0];
            }
            slots[51] = slots[51].map(|card| card.with_face_up(true));
            slots
        })
        .unwrap();
        assert_eq!(attempts, 2);
        assert_complete(&deal);
        assert!(!deal[51].face_up);
    }
}
