use anyhow::{Context, Result};
use std::fmt;

pub const MAX_RANK: u8 = 13;
pub const MAX_SUIT: u8 = 4;
pub const MAX_CARD: u8 = MAX_SUIT * MAX_RANK;

const RANKS: [char; 13] = [
    'A', '2', '3', '4', '5', '6', '7', '8', '9', 'T', 'J', 'Q', 'K',
];
const SUITS: [char; 4] = ['♥', '♦', '♣', '♠'];
const SUITS_ASCII: [char; 4] = ['h', 'd', 'c', 's'];

#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Rank {
    Ace = 0,
    Two,
    Three,
    Four,
    Five,
    Six,
    Seven,
    Eight,
    Nine,
    Ten,
    Jack,
    Queen,
    King,
}

impl Rank {
    pub const ALL: [Rank; 13] = [
        Rank::Ace,
        Rank::Two,
        Rank::Three,
        Rank::Four,
        Rank::Five,
        Rank::Six,
        Rank::Seven,
        Rank::Eight,
        Rank::Nine,
        Rank::Ten,
        Rank::Jack,
        Rank::Queen,
        Rank::King,
    ];

    /// Zero-based position, Ace = 0 and King = 12.
    #[inline]
    pub fn index(self) -> u8 {
        self as u8
    }

    /// Face value, Ace = 1 and King = 13.
    #[inline]
    pub fn value(self) -> u8 {
        self as u8 + 1
    }

    pub fn from_index(index: u8) -> Option<Rank> {
        Rank::ALL.get(index as usize).copied()
    }

    /// The rank directly above this one, `None` for the King.
    pub fn next(self) -> Option<Rank> {
        Rank::from_index(self.index() + 1)
    }

    /// The rank directly below this one, `None` for the Ace.
    pub fn prev(self) -> Option<Rank> {
        self.index().checked_sub(1).and_then(Rank::from_index)
    }

    pub fn symbol(self) -> char {
        RANKS[self.index() as usize]
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Color {
    Red,
    Black,
}

#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Suit {
    Hearts = 0,
    Diamonds,
    Clubs,
    Spades,
}

impl Suit {
    pub const ALL: [Suit; 4] = [Suit::Hearts, Suit::Diamonds, Suit::Clubs, Suit::Spades];

    #[inline]
    pub fn index(self) -> usize {
        self as usize
    }

    pub fn from_index(index: usize) -> Option<Suit> {
        Suit::ALL.get(index).copied()
    }

    #[inline]
    pub fn color(self) -> Color {
        match self {
            Suit::Hearts | Suit::Diamonds => Color::Red,
            Suit::Clubs | Suit::Spades => Color::Black,
        }
    }

    pub fn symbol(self) -> char {
        SUITS[self.index()]
    }
}

/// A playing card together with its orientation.
///
/// Two cards are the same physical card when their [`Card::id`] matches;
/// `face_up` only records how the card currently lies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Card {
    pub rank: Rank,
    pub suit: Suit,
    pub face_up: bool,
}

impl Card {
    /// Creates a face-down card.
    pub const fn new(rank: Rank, suit: Suit) -> Self {
        Self {
            rank,
            suit,
            face_up: false,
        }
    }

    pub fn new_with_id(id: u8) -> Option<Self> {
        if id >= MAX_CARD {
            return None;
        }
        let rank = Rank::from_index(id % MAX_RANK)?;
        let suit = Suit::from_index((id / MAX_RANK) as usize)?;
        Some(Self::new(rank, suit))
    }

    pub fn with_face_up(self, face_up: bool) -> Self {
        Self { face_up, ..self }
    }

    /// Identity of the physical card in `0..52`, independent of orientation.
    #[inline]
    pub fn id(&self) -> u8 {
        self.suit as u8 * MAX_RANK + self.rank.index()
    }

    #[inline]
    pub fn color(&self) -> Color {
        self.suit.color()
    }

    #[inline]
    pub fn is_king(&self) -> bool {
        self.rank == Rank::King
    }

    pub fn same_card(&self, other: &Card) -> bool {
        self.id() == other.id()
    }

    /// The canonical 52-card set, face-down, hearts first and Ace to King within a suit.
    pub fn full_deck() -> [Card; MAX_CARD as usize] {
        std::array::from_fn(|i| {
            Card::new(
                Rank::ALL[i % MAX_RANK as usize],
                Suit::ALL[i / MAX_RANK as usize],
            )
        })
    }

    pub fn parse(rank: char, suit: char) -> Result<Self> {
        let rank_idx = RANKS
            .iter()
            .position(|&r| r == rank.to_ascii_uppercase())
            .with_context(|| format!("Invalid rank at card {rank}{suit}"))?;
        let suit_idx = SUITS
            .iter()
            .position(|&s| s == suit)
            .or_else(|| {
                SUITS_ASCII
                    .iter()
                    .position(|&s| s == suit.to_ascii_lowercase())
            })
            .with_context(|| format!("Invalid suit at card {rank}{suit}"))?;
        Ok(Card::new(Rank::ALL[rank_idx], Suit::ALL[suit_idx]))
    }

    pub fn to_pretty_string(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for Card {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.rank.symbol(), self.suit.symbol())
    }
}
