use crate::card::{Card, MAX_CARD, MAX_RANK, Rank, Suit};
use crate::error::GameError;
use crate::pile::Pile;

use anyhow::{Context, Result};

pub const TOTAL_FOUNDATIONS: usize = 4;
pub const TOTAL_TABLEAUS: usize = 7;
pub const TABLEAU_CARDS: usize = TOTAL_TABLEAUS * (TOTAL_TABLEAUS + 1) / 2;
pub const TALON_SIZE: usize = MAX_CARD as usize - TABLEAU_CARDS;

/// A full deck in deal order: indices `0..28` fill the tableau column by column,
/// the rest form the stock with index 51 on top.
pub type Deal = [Card; MAX_CARD as usize];

/// Index into a [`Deal`] of the bottom card of tableau column `column`.
pub const fn column_start(column: usize) -> usize {
    column * (column + 1) / 2
}

/// A complete Klondike position.
///
/// States are values: every transition builds a new one, and piles that a
/// transition does not touch are shared with the previous state until written.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GameState {
    pub(crate) tableaus: [Pile; TOTAL_TABLEAUS],
    /// Indexed by [`Suit::index`].
    pub(crate) foundations: [Pile; TOTAL_FOUNDATIONS],
    pub(crate) stock: Pile,
    pub(crate) waste: Pile,
}

impl GameState {
    /// Lays out `deal` as an opening position: column `i` receives `i + 1`
    /// cards with only the last face-up, the remaining 24 form the stock.
    pub fn deal(deal: &Deal) -> Result<Self> {
        let tableaus = std::array::from_fn(|column| {
            let start = column_start(column);
            Pile::new(
                deal[start..=start + column]
                    .iter()
                    .enumerate()
                    .map(|(row, card)| card.with_face_up(row == column)),
            )
        });
        let stock = Pile::new(
            deal[TABLEAU_CARDS..]
                .iter()
                .map(|card| card.with_face_up(false)),
        );

        Self::from_parts(tableaus, Default::default(), stock, Pile::default())
    }

    /// Assembles a state from its piles and checks every invariant.
    pub fn from_parts(
        tableaus: [Pile; TOTAL_TABLEAUS],
        foundations: [Pile; TOTAL_FOUNDATIONS],
        stock: Pile,
        waste: Pile,
    ) -> Result<Self> {
        let state = Self {
            tableaus,
            foundations,
            stock,
            waste,
        };
        state.validate()?;
        Ok(state)
    }

    #[inline]
    pub fn tableaus(&self) -> &[Pile; TOTAL_TABLEAUS] {
        &self.tableaus
    }

    #[inline]
    pub fn tableau(&self, column: usize) -> &Pile {
        &self.tableaus[column]
    }

    #[inline]
    pub fn foundations(&self) -> &[Pile; TOTAL_FOUNDATIONS] {
        &self.foundations
    }

    #[inline]
    pub fn foundation(&self, suit: Suit) -> &Pile {
        &self.foundations[suit.index()]
    }

    #[inline]
    pub fn stock(&self) -> &Pile {
        &self.stock
    }

    #[inline]
    pub fn waste(&self) -> &Pile {
        &self.waste
    }

    pub fn is_won(&self) -> bool {
        self.foundations
            .iter()
            .all(|pile| pile.len() == MAX_RANK as usize)
    }

    pub fn foundation_count(&self) -> usize {
        self.foundations.iter().map(Pile::len).sum()
    }

    /// Face-down cards still buried in the tableau.
    pub fn hidden_count(&self) -> usize {
        self.tableaus.iter().map(Pile::hidden_count).sum()
    }

    pub fn empty_columns(&self) -> usize {
        self.tableaus.iter().filter(|pile| pile.is_empty()).count()
    }

    /// Cards in stock and waste together.
    pub fn talon_count(&self) -> usize {
        self.stock.len() + self.waste.len()
    }

    /// Checks that the five containers hold each of the 52 cards exactly once,
    /// that foundations ascend from the Ace in their own suit, that the stock
    /// is face-down and the waste face-up.
    pub fn validate(&self) -> Result<()> {
        let mut seen: u64 = 0;
        let mut count = 0;
        let mut check_cards = |cards: &[Card], location: &str| -> Result<()> {
            for card in cards {
                let bit = 1u64 << card.id();
                if seen & bit != 0 {
                    return Err(GameError::corrupt(format!("{card} appears twice ({location})")).into());
                }
                seen |= bit;
                count += 1;
            }
            Ok(())
        };

        for (i, pile) in self.tableaus.iter().enumerate() {
            check_cards(pile.cards(), &format!("tableau {}", i + 1))?;
        }
        for (suit, pile) in Suit::ALL.iter().zip(&self.foundations) {
            check_cards(pile.cards(), &format!("foundation {}", suit.symbol()))?;
        }
        check_cards(self.stock.cards(), "stock")?;
        check_cards(self.waste.cards(), "waste")?;

        if count != MAX_CARD as usize {
            return Err(GameError::corrupt(format!("expected {MAX_CARD} cards, found {count}")).into());
        }

        for (suit, pile) in Suit::ALL.iter().zip(&self.foundations) {
            for (i, card) in pile.iter().enumerate() {
                if card.suit != *suit || card.rank.index() as usize != i || !card.face_up {
                    return Err(GameError::corrupt(format!(
                        "{card} out of place on the {} foundation",
                        suit.symbol()
                    ))
                    .into());
                }
            }
        }
        if let Some(card) = self.stock.iter().find(|card| card.face_up) {
            return Err(GameError::corrupt(format!("{card} is face-up in the stock")).into());
        }
        if let Some(card) = self.waste.iter().find(|card| !card.face_up) {
            return Err(GameError::corrupt(format!("{card} is face-down in the waste")).into());
        }

        Ok(())
    }

    pub fn parse(content: &str) -> Result<Self> {
        let mut state = Self::default();

        for line in content
            .split('\n')
            .map(|v| v.trim())
            .filter(|l| !l.is_empty())
        {
            let line_context = || format!("Failed to parse at '{line}'");
            if let Some(rest) = line.strip_prefix("Stock:") {
                let cards = Self::parse_cards(rest.trim()).with_context(line_context)?;
                state.stock = Pile::new(cards.into_iter().map(|c| c.with_face_up(false)));
            } else if let Some(rest) = line.strip_prefix("Waste:") {
                let cards = Self::parse_cards(rest.trim()).with_context(line_context)?;
                state.waste = Pile::new(cards.into_iter().map(|c| c.with_face_up(true)));
            } else if let Some(rest) = line.strip_prefix("Foundation") {
                let (_, cards_str) = Self::parse_indexed(rest, TOTAL_FOUNDATIONS)
                    .context("Invalid foundation index")
                    .with_context(line_context)?;
                let cards = Self::parse_cards(cards_str).with_context(line_context)?;
                if let Some(top) = cards.last() {
                    state.foundations[top.suit.index()] = Pile::new(
                        Rank::ALL[..=top.rank.index() as usize]
                            .iter()
                            .map(|&rank| Card::new(rank, top.suit).with_face_up(true)),
                    );
                }
            } else if let Some(rest) = line.strip_prefix("Tableau") {
                let (idx, cards_str) = Self::parse_indexed(rest, TOTAL_TABLEAUS)
                    .context("Invalid tableau index")
                    .with_context(line_context)?;
                let (before, after) = match cards_str.find('|') {
                    Some(pos) => (&cards_str[..pos], &cards_str[pos + 1..]),
                    None => (cards_str, ""),
                };
                let hidden = Self::parse_cards(before.trim()).with_context(line_context)?;
                let visible = Self::parse_cards(after.trim()).with_context(line_context)?;
                state.tableaus[idx] = Pile::new(
                    hidden
                        .into_iter()
                        .map(|c| c.with_face_up(false))
                        .chain(visible.into_iter().map(|c| c.with_face_up(true))),
                );
            }
        }

        state.validate()?;
        Ok(state)
    }

    fn parse_indexed(rest: &str, total: usize) -> Result<(usize, &str)> {
        let mut parts = rest.splitn(2, ':');
        let idx = parts.next().unwrap_or("").trim().parse::<usize>()?;
        if idx == 0 || idx > total {
            anyhow::bail!("Index {idx} out of range 1..={total}");
        }
        Ok((idx - 1, parts.next().unwrap_or("").trim()))
    }

    fn parse_cards(s: &str) -> Result<Vec<Card>> {
        let mut cards = Vec::new();
        let mut chars = s.chars().peekable();
        while let Some(&c1) = chars.peek() {
            if c1.is_whitespace() || c1 == '|' {
                chars.next();
                continue;
            }
            let rank = c1;
            chars.next();
            let suit = match chars.next() {
                Some(s) => s,
                None => anyhow::bail!("Missing suit after rank {rank}"),
            };
            cards.push(Card::parse(rank, suit)?);
        }
        Ok(cards)
    }

    pub fn to_pretty_string(&self) -> String {
        let mut output = String::new();

        if !self.stock.is_empty() {
            output.push_str("Stock: ");
            for card in &self.stock {
                output.push_str(&card.to_pretty_string());
            }
            output.push('\n');
        }

        if !self.waste.is_empty() {
            output.push_str("Waste: ");
            for card in &self.waste {
                output.push_str(&card.to_pretty_string());
            }
            output.push('\n');
        }

        for (i, pile) in self.foundations.iter().enumerate() {
            if let Some(card) = pile.peek_top() {
                output.push_str(&format!("Foundation{}: {card}\n", i + 1));
            }
        }

        for (i, tableau) in self.tableaus.iter().enumerate() {
            if tableau.is_empty() {
                continue;
            }
            output.push_str(&format!("Tableau{}: ", i + 1));
            let sep = tableau.first_face_up();
            for (j, card) in tableau.iter().enumerate() {
                if j == sep {
                    output.push('|');
                }
                output.push_str(&card.to_pretty_string());
            }
            output.push('\n');
        }

        output.truncate(output.trim_end().len());
        output
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const BOARD_STR: &str = r#"Stock: 5♦2♥8♦K♣7♥J♣
Waste: 7♦Q♥K♥T♦6♣9♥K♦J♠T♣Q♣3♣2♦Q♦8♥6♥7♠8♠
Foundation1: A♥
Foundation3: 2♣
Foundation4: A♠
Tableau1: |5♣
Tableau2: J♥|6♠
Tableau3: T♠5♥|Q♠
Tableau4: 9♠T♥2♠|9♣
Tableau5: 7♣4♥3♠|A♦
Tableau6: 3♥3♦4♣5♠4♦|8♣
Tableau7: 6♦4♠9♦K♠|J♦"#;

    fn ordered_deal() -> Deal {
        Card::full_deck()
    }

    #[test]
    fn test_parse_board() {
        let state = GameState::parse(BOARD_STR).unwrap();
        assert!(state.validate().is_ok());
        assert_eq!(state.foundation_count(), 4);
        assert_eq!(state.stock().len(), 6);
        assert_eq!(state.waste().len(), 17);
        assert_eq!(BOARD_STR, state.to_pretty_string());
    }

    #[test]
    fn test_parse_rejects_missing_cards() {
        let err = GameState::parse("Tableau1: |K♠").unwrap_err();
        assert!(matches!(
            err.downcast_ref::<GameError>(),
            Some(GameError::CorruptState { .. })
        ));
    }

    #[test]
    fn test_parse_rejects_bad_lines() {
        assert!(GameState::parse("Tableau9: |K♠").is_err());
        assert!(GameState::parse("Stock: K").is_err());
        assert!(GameState::parse("Stock: Z♠").is_err());
    }

    #[test]
    fn test_deal_layout() {
        let state = GameState::deal(&ordered_deal()).unwrap();
        let mut total = 0;
        for (i, pile) in state.tableaus().iter().enumerate() {
            assert_eq!(pile.len(), i + 1);
            for (j, card) in pile.iter().enumerate() {
                assert_eq!(card.face_up, j == i);
            }
            total += pile.len();
        }
        assert_eq!(total, TABLEAU_CARDS);
        assert_eq!(state.stock().len(), TALON_SIZE);
        assert!(state.stock().iter().all(|card| !card.face_up));
        assert!(state.waste().is_empty());
        assert_eq!(state.foundation_count(), 0);
        assert_eq!(state.hidden_count(), TABLEAU_CARDS - TOTAL_TABLEAUS);
        assert_eq!(state.stock().peek_top(), Some(ordered_deal()[51]));
    }

    #[test]
    fn test_deal_rejects_duplicates() {
        let mut deal = ordered_deal();
        deal[10] = deal[11];
        let err = GameState::deal(&deal).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<GameError>(),
            Some(GameError::CorruptState { .. })
        ));
    }

    #[test]
    fn test_is_won() {
        let foundations = Suit::ALL.map(|suit| {
            Pile::new(Rank::ALL.map(|rank| Card::new(rank, suit).with_face_up(true)))
        });
        let state = GameState::from_parts(
            Default::default(),
            foundations,
            Pile::default(),
            Pile::default(),
        )
        .unwrap();
        assert!(state.is_won());
        assert_eq!(state.foundation_count(), 52);
        assert_eq!(state.empty_columns(), TOTAL_TABLEAUS);

        let state = GameState::deal(&ordered_deal()).unwrap();
        assert!(!state.is_won());
    }

    #[test]
    fn test_foundation_out_of_order_is_corrupt() {
        let mut state = GameState::parse(BOARD_STR).unwrap();
        let card = state.foundations[Suit::Hearts.index()].pop_card().unwrap();
        state.foundations[Suit::Spades.index()].push_card(card);
        assert!(state.validate().is_err());
    }
}
