//! Player state: held cards and the won-trick pile.

use crate::card::{Card, Suit};
use serde::{Deserialize, Serialize};

/// Player identifier by seat (0-2 for a three-player table).
///
/// Seats are assigned once per session and never reassigned; turn order and
/// ownership comparisons go through the seat number, never the nickname.
pub type Seat = u8;

/// Cards a player currently holds, plus the tricks they have taken.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Hand {
    /// Cards currently held.
    pub cards: Vec<Card>,
    /// Cards collected from won tricks.
    pub won: Vec<Card>,
}

impl Hand {
    /// Create an empty hand.
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether the exact card is held.
    pub fn contains(&self, card: Card) -> bool {
        self.cards.contains(&card)
    }

    /// Whether any held card is of the given suit.
    pub fn has_suit(&self, suit: Suit) -> bool {
        self.cards.iter().any(|c| c.suit == suit)
    }

    /// Add a card to the held cards.
    pub fn add(&mut self, card: Card) {
        self.cards.push(card);
    }

    /// Remove a held card. Returns false if the card is not in the hand.
    pub fn remove(&mut self, card: Card) -> bool {
        if let Some(pos) = self.cards.iter().position(|c| *c == card) {
            self.cards.remove(pos);
            true
        } else {
            false
        }
    }

    /// Move a card from a won trick onto the pile.
    pub fn add_won(&mut self, card: Card) {
        self.won.push(card);
    }

    /// Whether no cards are held.
    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }
}

/// A single seated player.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Player {
    /// Seat number (0-2)
    pub seat: Seat,
    /// Display name, never used for rules decisions
    pub name: String,
    /// Held cards and won pile
    pub hand: Hand,
}

impl Player {
    /// Create a new player with an empty hand.
    pub fn new(seat: Seat, name: String) -> Self {
        Self {
            seat,
            name,
            hand: Hand::new(),
        }
    }

    /// Whether the player still has cards to play.
    pub fn has_cards(&self) -> bool {
        !self.hand.is_empty()
    }
}
