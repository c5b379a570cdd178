//! Bidding and play state machine for a single table session.
//!
//! `GameSession` owns the players, the deck, the talon and the in-progress
//! trick, and advances through the bidding phases into trick play by applying
//! one intent at a time. It is purely synchronous; the hosting shell decides
//! when intents arrive and serializes them.

use crate::actions::{
    BidResponse, GameEvent, HandResult, HigherGameChoice, Intent, ModeChoice, ResetChoice,
};
use crate::card::{Card, Deck, Mode, Suit};
use crate::player::{Hand, Player, Seat};
use crate::rules;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Seats at the table.
pub const PLAYER_COUNT: usize = 3;

/// Cards the licitator lays aside during bidding.
pub const TALON_SIZE: usize = 2;

/// Deal batches: seven to the licitator, five to each opponent, five more to
/// the licitator, five more to each opponent.
const DEAL_BATCHES: [usize; 4] = [7, 5, 5, 5];

/// Session phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GamePhase {
    /// Fresh shuffled deck, no cards in hands yet
    Dealing,

    /// The licitator announces the trump suit
    TrumpSelection,

    /// The licitator lays two cards aside
    TalonDiscard,

    /// The licitator declares Hra, Betl or Durch
    ModeSelection,

    /// The other seats accept or reject the declared game in turn
    FirstAcceptReject,

    /// A rejecting seat picks the higher game it claims
    HigherGameSelect,

    /// Trick play under Hra
    PlayNormal,

    /// Trick play under Betl; the licitator must lose every trick
    PlayBetl,

    /// Trick play under Durch; the licitator must win every trick
    PlayDurch,

    /// Hand finished, awaiting the reset prompt
    End,

    /// The table declined another hand
    Closed,
}

impl GamePhase {
    /// Whether tricks are being played in this phase.
    pub fn is_play(&self) -> bool {
        matches!(
            self,
            GamePhase::PlayNormal | GamePhase::PlayBetl | GamePhase::PlayDurch
        )
    }
}

/// Errors that can occur when applying intents.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
pub enum GameError {
    #[error("Not your turn")]
    NotYourTurn,

    #[error("Invalid action for current phase")]
    InvalidPhase,

    #[error("Card not in hand")]
    CardNotInHand,

    #[error("{0}")]
    RuleViolation(#[from] rules::PlayViolation),

    #[error("Deck exhausted during deal")]
    EmptyDeck,

    #[error("Session is over")]
    SessionOver,
}

/// A resolved trick kept on the table until the shell has displayed it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompletedTrick {
    /// Seat that takes the trick
    pub winner: Seat,
    /// The three cards, in seat order
    pub cards: Vec<Card>,
}

/// The complete session state for one table.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameSession {
    /// All seated players
    pub players: Vec<Player>,
    /// Current phase
    pub phase: GamePhase,
    /// Seat expected to act next
    pub active_seat: Seat,
    /// Seat currently obligated to declare trump and mode; changes hands
    /// when a higher game is claimed
    pub licitator: Seat,
    /// Trump suit; unset until announced, cleared again for Betl and Durch
    pub trump: Option<Suit>,
    /// Game mode; unset until the bidding resolves it
    pub mode: Option<Mode>,
    /// In-progress trick, one slot per seat
    pub table: Vec<Option<Card>>,
    /// Seat that opened the current trick
    pub trick_leader: Seat,
    /// Cards laid aside during bidding
    pub talon: Vec<Card>,
    /// Outcome of the finished hand
    pub result: Option<HandResult>,
    deck: Deck,
    /// Discards made in the current talon round
    talon_discards: u8,
    /// Whether any seat has out-bid the licitator this hand
    escalated: bool,
    /// Seat holding the highest bid once escalation is active
    higher_holder: Option<Seat>,
    /// Resolved trick still showing on the table
    completed_trick: Option<CompletedTrick>,
}

impl GameSession {
    /// Create a session with a fresh shuffled deck. Seat 0 opens as the
    /// licitator.
    pub fn new(player_names: Vec<String>) -> Self {
        assert_eq!(
            player_names.len(),
            PLAYER_COUNT,
            "Must provide names for all seats"
        );

        let players: Vec<Player> = player_names
            .into_iter()
            .enumerate()
            .map(|(i, name)| Player::new(i as Seat, name))
            .collect();

        Self {
            players,
            phase: GamePhase::Dealing,
            active_seat: 0,
            licitator: 0,
            trump: None,
            mode: None,
            table: vec![None; PLAYER_COUNT],
            trick_leader: 0,
            talon: Vec::new(),
            result: None,
            deck: Deck::shuffled(),
            talon_discards: 0,
            escalated: false,
            higher_holder: None,
            completed_trick: None,
        }
    }

    // ==================== Snapshot Accessors ====================

    /// Get a player by seat.
    pub fn get_player(&self, seat: Seat) -> Option<&Player> {
        self.players.get(seat as usize)
    }

    /// The completed trick still showing on the table, if any.
    pub fn pending_trick(&self) -> Option<&CompletedTrick> {
        self.completed_trick.as_ref()
    }

    /// Whether the hand has finished.
    pub fn is_finished(&self) -> bool {
        matches!(self.phase, GamePhase::End | GamePhase::Closed)
    }

    /// Number of cards not yet dealt.
    pub fn undealt(&self) -> usize {
        self.deck.remaining()
    }

    /// User-facing summary of the finished hand.
    pub fn result_text(&self) -> Option<String> {
        self.result.map(|r| r.summary())
    }

    // ==================== Intent Dispatch ====================

    /// Apply a decoded intent from `seat`.
    pub fn apply(&mut self, seat: Seat, intent: Intent) -> Result<Vec<GameEvent>, GameError> {
        match intent {
            Intent::Deal => self.deal(),
            Intent::ChooseTrump(card) => self.choose_trump(seat, card),
            Intent::DiscardToTalon(card) => self.discard_to_talon(seat, card),
            Intent::ChooseMode(choice) => self.choose_mode(seat, choice),
            Intent::Respond(response) => self.accept_or_reject(seat, response),
            Intent::ChooseHigherGame(choice) => self.choose_higher_game(seat, choice),
            Intent::PlayCard(card) => self.play_card(seat, card),
            Intent::ConfirmTrick => self.confirm_trick(),
            Intent::ResetOrEnd(choice) => self.reset_or_end(choice),
        }
    }

    // ==================== Bidding ====================

    /// Deal all 32 cards: twelve to the licitator, ten to each opponent.
    pub fn deal(&mut self) -> Result<Vec<GameEvent>, GameError> {
        self.expect_phase(GamePhase::Dealing)?;

        for (batch, &count) in DEAL_BATCHES.iter().enumerate() {
            if batch % 2 == 0 {
                for _ in 0..count {
                    let card = self.deck.draw().ok_or(GameError::EmptyDeck)?;
                    self.hand_mut(self.licitator).add(card);
                }
            } else {
                for seat in 0..PLAYER_COUNT as Seat {
                    if seat == self.licitator {
                        continue;
                    }
                    for _ in 0..count {
                        let card = self.deck.draw().ok_or(GameError::EmptyDeck)?;
                        self.hand_mut(seat).add(card);
                    }
                }
            }
        }

        self.phase = GamePhase::TrumpSelection;
        self.active_seat = self.licitator;
        Ok(vec![GameEvent::CardsDealt])
    }

    /// Announce the trump suit. The shown card stays in the licitator's
    /// hand; the announcement only fixes its suit.
    pub fn choose_trump(&mut self, seat: Seat, card: Card) -> Result<Vec<GameEvent>, GameError> {
        self.expect_phase(GamePhase::TrumpSelection)?;
        self.expect_turn(seat)?;
        if !self.seat_player(seat).hand.contains(card) {
            return Err(GameError::CardNotInHand);
        }

        self.trump = Some(card.suit);
        self.phase = GamePhase::TalonDiscard;
        Ok(vec![GameEvent::TrumpChosen {
            seat,
            suit: card.suit,
        }])
    }

    /// Lay one card aside. After the second discard the session branches on
    /// whether a higher game is pending.
    pub fn discard_to_talon(
        &mut self,
        seat: Seat,
        card: Card,
    ) -> Result<Vec<GameEvent>, GameError> {
        self.expect_phase(GamePhase::TalonDiscard)?;
        self.expect_turn(seat)?;
        if !self.hand_mut(seat).remove(card) {
            return Err(GameError::CardNotInHand);
        }
        self.talon.push(card);
        self.talon_discards += 1;

        let events = vec![GameEvent::CardDiscarded { seat }];

        if self.talon_discards as usize == TALON_SIZE {
            if self.escalated
                && self.mode == Some(Mode::Betl)
                && self.higher_holder != Some(self.last_seat())
            {
                // Re-offer the claimed Betl to the remaining seats
                self.talon_discards = 0;
                self.phase = GamePhase::FirstAcceptReject;
                self.next_seat();
            } else if self.escalated && self.mode == Some(Mode::Betl) {
                self.begin_play(GamePhase::PlayBetl);
            } else if self.escalated && self.mode == Some(Mode::Durch) {
                self.begin_play(GamePhase::PlayDurch);
            } else {
                self.talon_discards = 0;
                self.phase = GamePhase::ModeSelection;
            }
        }

        Ok(events)
    }

    /// Declare the game to play. Gated on the mode being unset so a re-offer
    /// round cannot overwrite an escalated declaration.
    pub fn choose_mode(
        &mut self,
        seat: Seat,
        choice: ModeChoice,
    ) -> Result<Vec<GameEvent>, GameError> {
        self.expect_phase(GamePhase::ModeSelection)?;
        self.expect_turn(seat)?;
        if self.mode.is_some() {
            return Err(GameError::InvalidPhase);
        }

        let mut events = vec![GameEvent::ModeChosen {
            seat,
            mode: choice.mode(),
        }];

        match choice {
            ModeChoice::Hra => {
                self.mode = Some(Mode::Hra);
                self.phase = GamePhase::FirstAcceptReject;
                self.next_seat();
            }
            ModeChoice::Betl => {
                self.escalate(seat, Mode::Betl, &mut events);
                self.phase = GamePhase::FirstAcceptReject;
                self.next_seat();
            }
            ModeChoice::Durch => {
                // Durch goes straight to play; there is no reject round
                // against it
                self.escalate(seat, Mode::Durch, &mut events);
                self.begin_play(GamePhase::PlayDurch);
            }
        }

        Ok(events)
    }

    /// Answer the declared game with "Dobrý" or "Špatný".
    pub fn accept_or_reject(
        &mut self,
        seat: Seat,
        response: BidResponse,
    ) -> Result<Vec<GameEvent>, GameError> {
        self.expect_phase(GamePhase::FirstAcceptReject)?;
        self.expect_turn(seat)?;

        let mut events = vec![GameEvent::BidAnswered { seat, response }];

        match response {
            BidResponse::Spatny if !self.escalated => {
                self.escalated = true;
                self.higher_holder = Some(seat);
                self.phase = GamePhase::HigherGameSelect;
            }
            BidResponse::Spatny => {
                // A second rejection can only claim the top game
                self.escalate(seat, Mode::Durch, &mut events);
            }
            BidResponse::Dobry if self.escalated => {
                // The remaining seats accepted the claimed Betl
                self.begin_play(GamePhase::PlayBetl);
            }
            BidResponse::Dobry if seat == self.last_seat() => {
                let mode = self.mode.unwrap_or(Mode::Hra);
                self.mode = Some(mode);
                match mode {
                    Mode::Hra => self.begin_play(GamePhase::PlayNormal),
                    Mode::Betl => self.begin_play(GamePhase::PlayBetl),
                    Mode::Durch => self.begin_play(GamePhase::PlayDurch),
                }
            }
            BidResponse::Dobry => self.next_seat(),
        }

        Ok(events)
    }

    /// Pick the game claimed after a rejection. Either way the declaration
    /// transfers to the claiming seat.
    pub fn choose_higher_game(
        &mut self,
        seat: Seat,
        choice: HigherGameChoice,
    ) -> Result<Vec<GameEvent>, GameError> {
        self.expect_phase(GamePhase::HigherGameSelect)?;
        self.expect_turn(seat)?;

        let mut events = Vec::new();
        let mode = match choice {
            HigherGameChoice::Betl => Mode::Betl,
            HigherGameChoice::Durch => Mode::Durch,
        };
        self.escalate(seat, mode, &mut events);
        Ok(events)
    }

    // ==================== Trick Play ====================

    /// Play a card into the current trick.
    pub fn play_card(&mut self, seat: Seat, card: Card) -> Result<Vec<GameEvent>, GameError> {
        self.expect_play_phase()?;
        if self.completed_trick.is_some() {
            // The table still shows the finished trick
            return Err(GameError::InvalidPhase);
        }
        self.expect_turn(seat)?;

        let mode = self.mode.ok_or(GameError::InvalidPhase)?;
        if !self.seat_player(seat).hand.contains(card) {
            return Err(GameError::CardNotInHand);
        }

        let trick_suit = self.table[self.trick_leader as usize].map(|c| c.suit);
        rules::check_play(
            &self.seat_player(seat).hand,
            trick_suit,
            self.trump,
            card,
            &self.table,
            mode,
        )?;

        self.hand_mut(seat).remove(card);
        self.table[seat as usize] = Some(card);

        let mut events = vec![GameEvent::CardPlayed { seat, card }];

        if self.table.iter().all(|slot| slot.is_some()) {
            let played: Vec<Card> = self.table.iter().flatten().copied().collect();
            let winner = rules::resolve_trick(&played, self.trick_leader, mode, self.trump);
            self.completed_trick = Some(CompletedTrick {
                winner,
                cards: played.clone(),
            });
            events.push(GameEvent::TrickCompleted {
                winner,
                cards: played,
            });
        } else {
            self.next_seat();
        }

        Ok(events)
    }

    /// Advance past a completed trick once the shell has displayed it.
    ///
    /// Contract violations end the hand here: in Betl the licitator taking
    /// the trick loses immediately, in Durch the licitator missing it does.
    pub fn confirm_trick(&mut self) -> Result<Vec<GameEvent>, GameError> {
        self.expect_play_phase()?;
        let trick = self.completed_trick.take().ok_or(GameError::InvalidPhase)?;

        self.table = vec![None; PLAYER_COUNT];
        let mut events = Vec::new();

        // The winner collects either way; Betl and Durch verdicts never
        // look at the piles.
        for card in trick.cards {
            self.hand_mut(trick.winner).add_won(card);
        }

        let broken = match self.phase {
            GamePhase::PlayBetl => trick.winner == self.licitator,
            GamePhase::PlayDurch => trick.winner != self.licitator,
            _ => false,
        };
        if broken {
            self.finish(HandResult::ContractLost, &mut events);
            return Ok(events);
        }

        if self.players.iter().all(|p| !p.has_cards()) {
            let result = match self.phase {
                GamePhase::PlayNormal => self.tally_result(),
                _ => HandResult::ContractWon,
            };
            self.finish(result, &mut events);
            return Ok(events);
        }

        self.active_seat = trick.winner;
        self.trick_leader = trick.winner;
        Ok(events)
    }

    // ==================== End of Hand ====================

    /// Answer the end-of-hand prompt: ANO shuffles and deals a fresh hand,
    /// NE closes the table.
    pub fn reset_or_end(&mut self, choice: ResetChoice) -> Result<Vec<GameEvent>, GameError> {
        self.expect_phase(GamePhase::End)?;

        match choice {
            ResetChoice::Ano => {
                for player in &mut self.players {
                    player.hand = Hand::new();
                }
                self.deck.shuffle(&mut rand::thread_rng());
                self.talon.clear();
                self.table = vec![None; PLAYER_COUNT];
                self.trump = None;
                self.mode = None;
                self.talon_discards = 0;
                self.escalated = false;
                self.higher_holder = None;
                self.completed_trick = None;
                self.result = None;
                self.phase = GamePhase::Dealing;
                self.active_seat = self.licitator;
                self.trick_leader = self.licitator;
                Ok(vec![GameEvent::SessionReset])
            }
            ResetChoice::Ne => {
                self.phase = GamePhase::Closed;
                Ok(vec![GameEvent::SessionClosed])
            }
        }
    }

    // ==================== Helper Methods ====================

    fn seat_player(&self, seat: Seat) -> &Player {
        &self.players[seat as usize]
    }

    fn hand_mut(&mut self, seat: Seat) -> &mut Hand {
        &mut self.players[seat as usize].hand
    }

    fn last_seat(&self) -> Seat {
        (PLAYER_COUNT - 1) as Seat
    }

    fn next_seat(&mut self) {
        self.active_seat = (self.active_seat + 1) % PLAYER_COUNT as Seat;
    }

    fn expect_phase(&self, phase: GamePhase) -> Result<(), GameError> {
        if self.phase == GamePhase::Closed {
            return Err(GameError::SessionOver);
        }
        if self.phase != phase {
            return Err(GameError::InvalidPhase);
        }
        Ok(())
    }

    fn expect_play_phase(&self) -> Result<(), GameError> {
        if self.phase == GamePhase::Closed {
            return Err(GameError::SessionOver);
        }
        if !self.phase.is_play() {
            return Err(GameError::InvalidPhase);
        }
        Ok(())
    }

    fn expect_turn(&self, seat: Seat) -> Result<(), GameError> {
        if seat != self.active_seat {
            return Err(GameError::NotYourTurn);
        }
        Ok(())
    }

    /// Record a higher bid. When the bidder is not the current licitator the
    /// declaration moves: the bidder becomes licitator, takes the talon back
    /// into hand and repeats the discard. Betl and Durch play without trump.
    fn escalate(&mut self, seat: Seat, mode: Mode, events: &mut Vec<GameEvent>) {
        self.mode = Some(mode);
        self.trump = None;
        self.higher_holder = Some(seat);

        if seat != self.licitator {
            self.licitator = seat;
            while let Some(card) = self.talon.pop() {
                self.hand_mut(seat).add(card);
            }
            self.talon_discards = 0;
            self.phase = GamePhase::TalonDiscard;
            self.active_seat = seat;
            events.push(GameEvent::Escalated { seat, mode });
        }
    }

    /// Enter a play phase with the licitator leading the first trick.
    fn begin_play(&mut self, phase: GamePhase) {
        self.phase = phase;
        self.active_seat = self.licitator;
        self.trick_leader = self.licitator;
        self.table = vec![None; PLAYER_COUNT];
    }

    fn finish(&mut self, result: HandResult, events: &mut Vec<GameEvent>) {
        self.result = Some(result);
        self.phase = GamePhase::End;
        events.push(GameEvent::HandEnded { result });
    }

    /// Point tally for a played-out Hra hand, computed fresh from the won
    /// piles.
    fn tally_result(&self) -> HandResult {
        let licitator = rules::tally(&self.seat_player(self.licitator).hand.won);
        let opponents = self
            .players
            .iter()
            .filter(|p| p.seat != self.licitator)
            .map(|p| rules::tally(&p.hand.won))
            .sum();
        HandResult::Points {
            licitator,
            opponents,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::card::Rank;

    fn names() -> Vec<String> {
        vec!["A".into(), "B".into(), "C".into()]
    }

    fn card(rank: Rank, suit: Suit) -> Card {
        Card::new(rank, suit)
    }

    /// Run the bidding up to mode selection: deal, announce trump, discard
    /// two cards.
    fn bid_to_mode_selection(session: &mut GameSession) {
        session.deal().unwrap();
        let trump_card = session.players[0].hand.cards[0];
        session.choose_trump(0, trump_card).unwrap();
        for _ in 0..2 {
            let discard = session.players[0].hand.cards[0];
            session.discard_to_talon(0, discard).unwrap();
        }
    }

    #[test]
    fn test_new_session_starts_dealing() {
        let session = GameSession::new(names());
        assert_eq!(session.phase, GamePhase::Dealing);
        assert_eq!(session.licitator, 0);
        assert_eq!(session.active_seat, 0);
        assert_eq!(session.undealt(), 32);
    }

    #[test]
    fn test_deal_counts() {
        let mut session = GameSession::new(names());
        session.deal().unwrap();

        assert_eq!(session.players[0].hand.cards.len(), 12);
        assert_eq!(session.players[1].hand.cards.len(), 10);
        assert_eq!(session.players[2].hand.cards.len(), 10);
        assert_eq!(session.undealt(), 0);
        assert_eq!(session.phase, GamePhase::TrumpSelection);
        assert_eq!(session.active_seat, 0);
    }

    #[test]
    fn test_deal_twice_rejected() {
        let mut session = GameSession::new(names());
        session.deal().unwrap();
        assert_eq!(session.deal(), Err(GameError::InvalidPhase));
    }

    #[test]
    fn test_trump_choice_keeps_card_in_hand() {
        let mut session = GameSession::new(names());
        session.deal().unwrap();

        let trump_card = session.players[0].hand.cards[3];
        session.choose_trump(0, trump_card).unwrap();

        assert_eq!(session.trump, Some(trump_card.suit));
        assert_eq!(session.players[0].hand.cards.len(), 12);
        assert!(session.players[0].hand.contains(trump_card));
        assert_eq!(session.phase, GamePhase::TalonDiscard);
    }

    #[test]
    fn test_trump_choice_needs_held_card() {
        let mut session = GameSession::new(names());
        session.deal().unwrap();

        // Find a card the licitator does not hold
        let held = session.players[0].hand.cards.clone();
        let other = session.players[1].hand.cards[0];
        assert!(!held.contains(&other));

        assert_eq!(
            session.choose_trump(0, other),
            Err(GameError::CardNotInHand)
        );
    }

    #[test]
    fn test_only_active_seat_may_act() {
        let mut session = GameSession::new(names());
        session.deal().unwrap();

        let other_card = session.players[1].hand.cards[0];
        assert_eq!(
            session.choose_trump(1, other_card),
            Err(GameError::NotYourTurn)
        );
    }

    #[test]
    fn test_talon_discard_flow() {
        let mut session = GameSession::new(names());
        session.deal().unwrap();
        let trump_card = session.players[0].hand.cards[0];
        session.choose_trump(0, trump_card).unwrap();

        let first = session.players[0].hand.cards[0];
        session.discard_to_talon(0, first).unwrap();
        assert_eq!(session.talon.len(), 1);
        assert_eq!(session.phase, GamePhase::TalonDiscard);

        let second = session.players[0].hand.cards[0];
        session.discard_to_talon(0, second).unwrap();
        assert_eq!(session.talon.len(), 2);
        assert_eq!(session.players[0].hand.cards.len(), 10);
        assert_eq!(session.phase, GamePhase::ModeSelection);
    }

    #[test]
    fn test_hra_goes_through_accept_round() {
        let mut session = GameSession::new(names());
        bid_to_mode_selection(&mut session);

        session.choose_mode(0, ModeChoice::Hra).unwrap();
        assert_eq!(session.mode, Some(Mode::Hra));
        assert_eq!(session.phase, GamePhase::FirstAcceptReject);
        assert_eq!(session.active_seat, 1);

        session.accept_or_reject(1, BidResponse::Dobry).unwrap();
        assert_eq!(session.phase, GamePhase::FirstAcceptReject);
        assert_eq!(session.active_seat, 2);

        session.accept_or_reject(2, BidResponse::Dobry).unwrap();
        assert_eq!(session.phase, GamePhase::PlayNormal);
        assert_eq!(session.active_seat, session.licitator);
        assert_eq!(session.trick_leader, session.licitator);
    }

    #[test]
    fn test_mode_cannot_be_redeclared() {
        let mut session = GameSession::new(names());
        bid_to_mode_selection(&mut session);
        session.choose_mode(0, ModeChoice::Hra).unwrap();

        // Force the phase back; the set mode still blocks a second choice
        session.phase = GamePhase::ModeSelection;
        session.active_seat = 0;
        assert_eq!(
            session.choose_mode(0, ModeChoice::Betl),
            Err(GameError::InvalidPhase)
        );
    }

    #[test]
    fn test_durch_skips_accept_round() {
        let mut session = GameSession::new(names());
        bid_to_mode_selection(&mut session);

        session.choose_mode(0, ModeChoice::Durch).unwrap();
        assert_eq!(session.mode, Some(Mode::Durch));
        assert_eq!(session.trump, None);
        assert_eq!(session.phase, GamePhase::PlayDurch);
        assert_eq!(session.active_seat, 0);
    }

    #[test]
    fn test_licitator_betl_is_offered_around() {
        let mut session = GameSession::new(names());
        bid_to_mode_selection(&mut session);

        session.choose_mode(0, ModeChoice::Betl).unwrap();
        assert_eq!(session.mode, Some(Mode::Betl));
        assert_eq!(session.trump, None);
        assert_eq!(session.phase, GamePhase::FirstAcceptReject);
        assert_eq!(session.active_seat, 1);

        session.accept_or_reject(1, BidResponse::Dobry).unwrap();
        session.accept_or_reject(2, BidResponse::Dobry).unwrap();
        assert_eq!(session.phase, GamePhase::PlayBetl);
        assert_eq!(session.active_seat, 0);
    }

    #[test]
    fn test_rejection_transfers_talon() {
        let mut session = GameSession::new(names());
        bid_to_mode_selection(&mut session);
        session.choose_mode(0, ModeChoice::Hra).unwrap();

        session.accept_or_reject(1, BidResponse::Spatny).unwrap();
        assert_eq!(session.phase, GamePhase::HigherGameSelect);
        assert_eq!(session.active_seat, 1);

        session
            .choose_higher_game(1, HigherGameChoice::Betl)
            .unwrap();

        // Seat 1 is the new licitator, holding the old talon
        assert_eq!(session.licitator, 1);
        assert_eq!(session.mode, Some(Mode::Betl));
        assert_eq!(session.trump, None);
        assert_eq!(session.talon.len(), 0);
        assert_eq!(session.players[1].hand.cards.len(), 12);
        // The old licitator keeps the ten cards left after the discard
        assert_eq!(session.players[0].hand.cards.len(), 10);
        assert_eq!(session.phase, GamePhase::TalonDiscard);
        assert_eq!(session.active_seat, 1);
    }

    #[test]
    fn test_escalated_betl_reoffer_and_accept() {
        let mut session = GameSession::new(names());
        bid_to_mode_selection(&mut session);
        session.choose_mode(0, ModeChoice::Hra).unwrap();
        session.accept_or_reject(1, BidResponse::Spatny).unwrap();
        session
            .choose_higher_game(1, HigherGameChoice::Betl)
            .unwrap();

        for _ in 0..2 {
            let discard = session.players[1].hand.cards[0];
            session.discard_to_talon(1, discard).unwrap();
        }

        // Seat 1 is not the last seat, so the Betl is offered onwards
        assert_eq!(session.phase, GamePhase::FirstAcceptReject);
        assert_eq!(session.active_seat, 2);

        session.accept_or_reject(2, BidResponse::Dobry).unwrap();
        assert_eq!(session.phase, GamePhase::PlayBetl);
        assert_eq!(session.active_seat, 1);
        assert_eq!(session.trick_leader, 1);
    }

    #[test]
    fn test_second_rejection_escalates_to_durch() {
        let mut session = GameSession::new(names());
        bid_to_mode_selection(&mut session);
        session.choose_mode(0, ModeChoice::Hra).unwrap();
        session.accept_or_reject(1, BidResponse::Spatny).unwrap();
        session
            .choose_higher_game(1, HigherGameChoice::Betl)
            .unwrap();
        for _ in 0..2 {
            let discard = session.players[1].hand.cards[0];
            session.discard_to_talon(1, discard).unwrap();
        }

        session.accept_or_reject(2, BidResponse::Spatny).unwrap();
        assert_eq!(session.mode, Some(Mode::Durch));
        assert_eq!(session.licitator, 2);
        assert_eq!(session.players[2].hand.cards.len(), 12);
        assert_eq!(session.phase, GamePhase::TalonDiscard);

        for _ in 0..2 {
            let discard = session.players[2].hand.cards[0];
            session.discard_to_talon(2, discard).unwrap();
        }
        assert_eq!(session.phase, GamePhase::PlayDurch);
        assert_eq!(session.active_seat, 2);
    }

    #[test]
    fn test_play_rejects_cards_not_held() {
        let mut session = GameSession::new(names());
        session.phase = GamePhase::PlayNormal;
        session.mode = Some(Mode::Hra);
        session.trump = Some(Suit::Hearts);
        session.players[0].hand.cards = vec![card(Rank::Ace, Suit::Bells)];

        assert_eq!(
            session.play_card(0, card(Rank::King, Suit::Bells)),
            Err(GameError::CardNotInHand)
        );
    }

    #[test]
    fn test_rule_violation_keeps_card_in_hand() {
        let mut session = GameSession::new(names());
        session.phase = GamePhase::PlayNormal;
        session.mode = Some(Mode::Hra);
        session.trump = Some(Suit::Hearts);
        session.players[0].hand.cards = vec![card(Rank::Seven, Suit::Bells)];
        session.players[1].hand.cards = vec![
            card(Rank::Nine, Suit::Bells),
            card(Rank::Ace, Suit::Leaves),
        ];
        session.players[2].hand.cards = vec![card(Rank::Eight, Suit::Acorns)];

        session.play_card(0, card(Rank::Seven, Suit::Bells)).unwrap();

        let err = session.play_card(1, card(Rank::Ace, Suit::Leaves));
        assert_eq!(
            err,
            Err(GameError::RuleViolation(
                rules::PlayViolation::MustFollowSuit
            ))
        );
        // Nothing moved; the same seat retries
        assert_eq!(session.players[1].hand.cards.len(), 2);
        assert_eq!(session.active_seat, 1);
    }

    #[test]
    fn test_completed_trick_waits_for_confirmation() {
        let mut session = GameSession::new(names());
        session.phase = GamePhase::PlayNormal;
        session.mode = Some(Mode::Hra);
        session.trump = Some(Suit::Hearts);
        session.players[0].hand.cards = vec![
            card(Rank::Seven, Suit::Bells),
            card(Rank::Eight, Suit::Bells),
        ];
        session.players[1].hand.cards = vec![
            card(Rank::Nine, Suit::Bells),
            card(Rank::Seven, Suit::Acorns),
        ];
        session.players[2].hand.cards = vec![
            card(Rank::Ten, Suit::Bells),
            card(Rank::Eight, Suit::Acorns),
        ];

        session.play_card(0, card(Rank::Seven, Suit::Bells)).unwrap();
        session.play_card(1, card(Rank::Nine, Suit::Bells)).unwrap();
        let events = session
            .play_card(2, card(Rank::Ten, Suit::Bells))
            .unwrap();

        assert!(events
            .iter()
            .any(|e| matches!(e, GameEvent::TrickCompleted { winner: 2, .. })));
        assert!(session.pending_trick().is_some());

        // Further plays wait for the confirmation
        assert_eq!(
            session.play_card(2, card(Rank::Eight, Suit::Acorns)),
            Err(GameError::InvalidPhase)
        );

        session.confirm_trick().unwrap();
        assert_eq!(session.players[2].hand.won.len(), 3);
        assert_eq!(session.active_seat, 2);
        assert_eq!(session.trick_leader, 2);
        assert!(session.table.iter().all(|slot| slot.is_none()));
    }

    #[test]
    fn test_reset_deals_fresh_hand() {
        let mut session = GameSession::new(names());
        session.phase = GamePhase::End;
        session.result = Some(HandResult::ContractWon);
        session.players[0].hand.add_won(card(Rank::Ace, Suit::Hearts));

        session.reset_or_end(ResetChoice::Ano).unwrap();
        assert_eq!(session.phase, GamePhase::Dealing);
        assert_eq!(session.undealt(), 32);
        assert!(session.result.is_none());
        assert!(session.players.iter().all(|p| p.hand.won.is_empty()));
        assert_eq!(session.licitator, 0);
    }

    #[test]
    fn test_closing_the_session() {
        let mut session = GameSession::new(names());
        session.phase = GamePhase::End;

        let events = session.reset_or_end(ResetChoice::Ne).unwrap();
        assert_eq!(events, vec![GameEvent::SessionClosed]);
        assert_eq!(session.phase, GamePhase::Closed);
        assert_eq!(session.deal(), Err(GameError::SessionOver));
    }

    #[test]
    fn test_result_text() {
        let mut session = GameSession::new(names());
        assert_eq!(session.result_text(), None);

        session.result = Some(HandResult::Points {
            licitator: 40,
            opponents: 20,
        });
        assert_eq!(
            session.result_text().as_deref(),
            Some("Vyhrál Licitátor v poměru 40 : 20")
        );
    }
}
