//! Card identity, per-mode strength, and the 32-card deck.
//!
//! This module contains:
//! - Suit and rank enums with their display symbols
//! - The game mode, which decides how card strength is ordered
//! - The `Card` value type and its effective strength
//! - The dealing deck with cursor-based dealing

use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Number of cards in a Marias deck.
pub const DECK_SIZE: usize = 32;

/// Card suit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Suit {
    Hearts,
    Bells,
    Acorns,
    Leaves,
}

impl Suit {
    /// All suits
    pub const ALL: [Suit; 4] = [Suit::Hearts, Suit::Bells, Suit::Acorns, Suit::Leaves];

    /// Symbol shown to players.
    pub fn symbol(&self) -> &'static str {
        match self {
            Suit::Hearts => "♥",
            Suit::Bells => "♦",
            Suit::Acorns => "♣",
            Suit::Leaves => "♠",
        }
    }
}

impl fmt::Display for Suit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.symbol())
    }
}

/// Card rank.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Rank {
    Seven,
    Eight,
    Nine,
    Ten,
    Jack,
    Queen,
    King,
    Ace,
}

impl Rank {
    /// All ranks
    pub const ALL: [Rank; 8] = [
        Rank::Seven,
        Rank::Eight,
        Rank::Nine,
        Rank::Ten,
        Rank::Jack,
        Rank::Queen,
        Rank::King,
        Rank::Ace,
    ];

    /// Symbol shown to players.
    pub fn symbol(&self) -> &'static str {
        match self {
            Rank::Seven => "7",
            Rank::Eight => "8",
            Rank::Nine => "9",
            Rank::Ten => "10",
            Rank::Jack => "J",
            Rank::Queen => "Q",
            Rank::King => "K",
            Rank::Ace => "A",
        }
    }
}

impl fmt::Display for Rank {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.symbol())
    }
}

/// Game mode resolved by the bidding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Mode {
    /// Normal play with a trump suit.
    Hra,
    /// The licitator must not take a single trick.
    Betl,
    /// The licitator must take every trick.
    Durch,
}

/// A playing card.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Card {
    pub rank: Rank,
    pub suit: Suit,
}

impl Card {
    /// Create a new card.
    pub const fn new(rank: Rank, suit: Suit) -> Self {
        Self { rank, suit }
    }

    /// Effective strength of this card under the given mode, 1..=8.
    ///
    /// Under Hra the ten sits between the king and the ace; under Betl and
    /// Durch it drops back between the nine and the jack.
    pub fn strength(&self, mode: Mode) -> u8 {
        match mode {
            Mode::Hra => match self.rank {
                Rank::Seven => 1,
                Rank::Eight => 2,
                Rank::Nine => 3,
                Rank::Jack => 4,
                Rank::Queen => 5,
                Rank::King => 6,
                Rank::Ten => 7,
                Rank::Ace => 8,
            },
            Mode::Betl | Mode::Durch => match self.rank {
                Rank::Seven => 1,
                Rank::Eight => 2,
                Rank::Nine => 3,
                Rank::Ten => 4,
                Rank::Jack => 5,
                Rank::Queen => 6,
                Rank::King => 7,
                Rank::Ace => 8,
            },
        }
    }
}

impl fmt::Display for Card {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.rank.symbol(), self.suit.symbol())
    }
}

/// The dealing deck.
///
/// Cards are dealt by advancing a cursor rather than removing them; the deal
/// counts are fixed, so the cursor reaching the end means the full deck is
/// out.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Deck {
    cards: Vec<Card>,
    cursor: usize,
}

impl Deck {
    /// Create the full 32-card deck in suit/rank order.
    pub fn ordered() -> Self {
        let mut cards = Vec::with_capacity(DECK_SIZE);
        for suit in Suit::ALL {
            for rank in Rank::ALL {
                cards.push(Card::new(rank, suit));
            }
        }
        Self { cards, cursor: 0 }
    }

    /// Create the full deck in a freshly shuffled order.
    pub fn shuffled() -> Self {
        let mut deck = Self::ordered();
        deck.shuffle(&mut rand::thread_rng());
        deck
    }

    /// Shuffle all 32 cards and reset the deal cursor.
    pub fn shuffle<R: Rng>(&mut self, rng: &mut R) {
        self.cards.shuffle(rng);
        self.cursor = 0;
    }

    /// Next undealt card, advancing the cursor. `None` once the deck is out.
    pub fn draw(&mut self) -> Option<Card> {
        let card = self.cards.get(self.cursor).copied();
        if card.is_some() {
            self.cursor += 1;
        }
        card
    }

    /// Whether any undealt cards remain.
    pub fn has_next(&self) -> bool {
        self.cursor < self.cards.len()
    }

    /// Number of cards not yet dealt.
    pub fn remaining(&self) -> usize {
        self.cards.len() - self.cursor
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_deck_has_32_unique_cards() {
        let mut deck = Deck::shuffled();
        let mut seen = HashSet::new();
        while let Some(card) = deck.draw() {
            assert!(seen.insert(card), "duplicate card dealt: {}", card);
        }
        assert_eq!(seen.len(), DECK_SIZE);
    }

    #[test]
    fn test_draw_past_exhaustion_returns_none() {
        let mut deck = Deck::ordered();
        for _ in 0..DECK_SIZE {
            assert!(deck.draw().is_some());
        }
        assert!(!deck.has_next());
        assert_eq!(deck.draw(), None);
        assert_eq!(deck.remaining(), 0);
    }

    #[test]
    fn test_shuffle_resets_cursor() {
        let mut deck = Deck::ordered();
        for _ in 0..10 {
            deck.draw();
        }
        deck.shuffle(&mut rand::thread_rng());
        assert_eq!(deck.remaining(), DECK_SIZE);
    }

    #[test]
    fn test_hra_strength_order() {
        let ace = Card::new(Rank::Ace, Suit::Hearts);
        let ten = Card::new(Rank::Ten, Suit::Hearts);
        let king = Card::new(Rank::King, Suit::Hearts);
        let seven = Card::new(Rank::Seven, Suit::Hearts);

        assert_eq!(ace.strength(Mode::Hra), 8);
        assert_eq!(ten.strength(Mode::Hra), 7);
        assert_eq!(king.strength(Mode::Hra), 6);
        assert_eq!(seven.strength(Mode::Hra), 1);
        assert!(ten.strength(Mode::Hra) > king.strength(Mode::Hra));
    }

    #[test]
    fn test_betl_demotes_the_ten() {
        let ten = Card::new(Rank::Ten, Suit::Bells);
        let jack = Card::new(Rank::Jack, Suit::Bells);
        let king = Card::new(Rank::King, Suit::Bells);
        let nine = Card::new(Rank::Nine, Suit::Bells);

        for mode in [Mode::Betl, Mode::Durch] {
            assert_eq!(ten.strength(mode), 4);
            assert!(ten.strength(mode) < jack.strength(mode));
            assert!(ten.strength(mode) < king.strength(mode));
            assert!(ten.strength(mode) > nine.strength(mode));
        }
    }

    #[test]
    fn test_card_display() {
        let card = Card::new(Rank::Ten, Suit::Hearts);
        assert_eq!(card.to_string(), "10 ♥");
    }
}
