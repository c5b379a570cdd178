//! Player intents and the events they produce.
//!
//! The bidding choices the table clients express as text labels ("BETL",
//! "Dobrý", "ANO", ...) are decoded into these closed enums at the transport
//! boundary; the engine never matches on raw strings.

use crate::card::{Card, Mode, Suit};
use crate::player::Seat;
use serde::{Deserialize, Serialize};

/// Game declared by the licitator during mode selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ModeChoice {
    Hra,
    Betl,
    Durch,
}

impl ModeChoice {
    /// The mode this choice declares.
    pub fn mode(self) -> Mode {
        match self {
            ModeChoice::Hra => Mode::Hra,
            ModeChoice::Betl => Mode::Betl,
            ModeChoice::Durch => Mode::Durch,
        }
    }
}

/// Answer in the accept/reject round.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BidResponse {
    /// Accept the declared game ("Dobrý")
    Dobry,
    /// Reject it and claim a higher game ("Špatný")
    Spatny,
}

/// Game claimed by a player who out-bid the licitator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum HigherGameChoice {
    Betl,
    Durch,
}

/// Answer to the end-of-hand prompt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ResetChoice {
    /// Deal another hand ("ANO")
    Ano,
    /// Close the session ("NE")
    Ne,
}

/// All intents a seat can submit to a session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Intent {
    // ==================== Hand Setup ====================
    /// Deal the full deck out to the seats
    Deal,

    // ==================== Bidding ====================
    /// Announce the trump suit by showing a card of it
    ChooseTrump(Card),
    /// Lay one card aside into the talon
    DiscardToTalon(Card),
    /// Declare the game to play
    ChooseMode(ModeChoice),
    /// Accept or reject the declared game
    Respond(BidResponse),
    /// Pick the higher game after rejecting
    ChooseHigherGame(HigherGameChoice),

    // ==================== Play ====================
    /// Play a card into the current trick
    PlayCard(Card),
    /// Advance past a completed trick once it has been displayed
    ConfirmTrick,

    // ==================== End of Hand ====================
    /// Deal again or close the table
    ResetOrEnd(ResetChoice),
}

/// Outcome of a finished hand.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum HandResult {
    /// The licitator fulfilled a Betl or Durch contract
    ContractWon,
    /// The licitator broke the contract; the hand ended on the first
    /// violating trick
    ContractLost,
    /// Hra point tally, licitator vs. the other two seats combined
    Points { licitator: u32, opponents: u32 },
}

impl HandResult {
    /// User-facing summary line in the table's language.
    pub fn summary(&self) -> String {
        match self {
            HandResult::ContractWon => "Licitátor vyhrál!".to_string(),
            HandResult::ContractLost => "Licitátor prohrál!".to_string(),
            HandResult::Points {
                licitator,
                opponents,
            } => {
                if licitator > opponents {
                    format!("Vyhrál Licitátor v poměru {} : {}", licitator, opponents)
                } else if opponents > licitator {
                    format!("Vyhráli hráči v poměru {} : {}", opponents, licitator)
                } else {
                    format!("Nerozhodně {} : {}", licitator, opponents)
                }
            }
        }
    }
}

/// Events that occur as a result of intents.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameEvent {
    /// All 32 cards went out to the seats
    CardsDealt,

    /// The licitator announced trump
    TrumpChosen { seat: Seat, suit: Suit },

    /// A card went into the talon (which card stays hidden)
    CardDiscarded { seat: Seat },

    /// The licitator declared a game
    ModeChosen { seat: Seat, mode: Mode },

    /// A seat answered the accept/reject round
    BidAnswered { seat: Seat, response: BidResponse },

    /// A seat out-bid the licitator and took over the declaration,
    /// pulling the talon back into their hand
    Escalated { seat: Seat, mode: Mode },

    /// A card went onto the table
    CardPlayed { seat: Seat, card: Card },

    /// One card per seat is on the table; the winner is decided but the
    /// trick stays visible until confirmed
    TrickCompleted { winner: Seat, cards: Vec<Card> },

    /// The hand is over
    HandEnded { result: HandResult },

    /// A fresh hand was dealt after the reset prompt
    SessionReset,

    /// The table declined another hand
    SessionClosed,
}
