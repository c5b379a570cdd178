//! Legal-play validation, trick resolution, and the point tally.
//!
//! Everything here is a pure function over cards already on the table and the
//! acting player's hand; session state stays in [`crate::game`].

use crate::card::{Card, Mode, Suit};
use crate::player::{Hand, Seat};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Why a candidate card is not a legal play.
///
/// The display strings are the user-facing rejection messages, forwarded
/// verbatim to the table clients.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error, Serialize, Deserialize)]
pub enum PlayViolation {
    #[error("Musíš zahrát stejnou barvu!")]
    MustFollowSuit,

    #[error("Musíš zahrát vyšší kartu!")]
    MustOvertrump,

    #[error("Musíš zahrát trumf!")]
    MustPlayTrump,
}

/// Highest effective strength among already-played cards of `suit`.
fn highest_played(table: &[Option<Card>], suit: Suit, mode: Mode) -> Option<u8> {
    table
        .iter()
        .flatten()
        .filter(|c| c.suit == suit)
        .map(|c| c.strength(mode))
        .max()
}

/// Whether the hand holds a card of `suit` stronger than `strength`.
fn can_beat(hand: &Hand, suit: Suit, strength: u8, mode: Mode) -> bool {
    hand.cards
        .iter()
        .any(|c| c.suit == suit && c.strength(mode) > strength)
}

/// Validate `candidate` against the follow-suit, overtrump and
/// trump-obligation rules.
///
/// `trick_suit` is `None` when the candidate opens the trick, in which case
/// any held card is legal. `table` holds the cards already played in this
/// trick, one slot per seat.
pub fn check_play(
    hand: &Hand,
    trick_suit: Option<Suit>,
    trump: Option<Suit>,
    candidate: Card,
    table: &[Option<Card>],
    mode: Mode,
) -> Result<(), PlayViolation> {
    let Some(trick_suit) = trick_suit else {
        return Ok(());
    };

    // Holding the led suit: must follow it, and must beat the current best
    // of that suit when able.
    if hand.has_suit(trick_suit) {
        if candidate.suit != trick_suit {
            return Err(PlayViolation::MustFollowSuit);
        }
        if let Some(best) = highest_played(table, trick_suit, mode) {
            if candidate.strength(mode) < best && can_beat(hand, trick_suit, best, mode) {
                return Err(PlayViolation::MustOvertrump);
            }
        }
        return Ok(());
    }

    // Out of the led suit but holding trump: the trump obligation applies,
    // with the same overtrump rule among trumps already on the table.
    if let Some(trump) = trump {
        if hand.has_suit(trump) {
            if candidate.suit != trump {
                return Err(PlayViolation::MustPlayTrump);
            }
            if let Some(best) = highest_played(table, trump, mode) {
                if candidate.strength(mode) < best && can_beat(hand, trump, best, mode) {
                    return Err(PlayViolation::MustOvertrump);
                }
            }
            return Ok(());
        }
    }

    // Neither led suit nor trump: anything goes.
    Ok(())
}

/// Decide the winning seat of a completed trick.
///
/// `played` holds one card per seat, indexed by seat number; `leader` is the
/// seat that opened the trick. Under Hra any trump on the table beats every
/// plain card; otherwise only cards of the led suit can win.
pub fn resolve_trick(played: &[Card], leader: Seat, mode: Mode, trump: Option<Suit>) -> Seat {
    if mode == Mode::Hra {
        if let Some(trump) = trump {
            let trumps: Vec<Seat> = (0..played.len() as Seat)
                .filter(|&seat| played[seat as usize].suit == trump)
                .collect();

            if !trumps.is_empty() {
                let mut winner = trumps[0];
                for &seat in &trumps[1..] {
                    if played[seat as usize].strength(mode)
                        > played[winner as usize].strength(mode)
                    {
                        winner = seat;
                    }
                }
                return winner;
            }
        }
    }

    // No trump on the table: highest card of the led suit takes it.
    let led = played[leader as usize].suit;
    let mut winner = leader;
    for seat in 0..played.len() as Seat {
        if seat == leader {
            continue;
        }
        let card = played[seat as usize];
        if card.suit == led
            && card.strength(mode) > played[winner as usize].strength(mode)
        {
            winner = seat;
        }
    }
    winner
}

/// Point value of a single won card under the simplified tally: tens and
/// aces score 10, everything else 0.
pub fn card_points(card: Card) -> u32 {
    if card.strength(Mode::Hra) >= 7 {
        10
    } else {
        0
    }
}

/// Sum of point values over a pile of won cards. Computed fresh on every
/// call; nothing is accumulated between calls.
pub fn tally(cards: &[Card]) -> u32 {
    cards.iter().map(|c| card_points(*c)).sum()
}
