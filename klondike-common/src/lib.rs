//! Cards, placement rules, immutable game states and biased deal generation
//! for single-draw Klondike Solitaire.
pub mod action;
pub mod card;
pub mod deal;
pub mod error;
pub mod pile;
pub mod rules;
pub mod state;

pub use crate::action::{Move, apply_move, describe_move, format_moves};
pub use crate::card::{Card, Color, Rank, Suit};
pub use crate::deal::{MAX_DEAL_ATTEMPTS, generate_deal, generate_deal_with};
pub use crate::error::GameError;
pub use crate::pile::Pile;
pub use crate::rules::{can_place_on_foundation, can_place_on_tableau, is_valid_run};
pub use crate::state::{Deal, GameState};
