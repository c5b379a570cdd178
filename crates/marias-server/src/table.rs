//! Game table management.

use marias_core::{GameEvent, GamePhase, GameSession, Intent, Seat, PLAYER_COUNT};
use std::collections::HashMap;
use thiserror::Error;
use uuid::Uuid;

use crate::protocol::{PlayerInfo, TableInfo, TableStatus};

#[derive(Debug, Error)]
pub enum TableError {
    #[error("Table is full")]
    TableFull,

    #[error("Player not at table")]
    PlayerNotAtTable,

    #[error("Not the host")]
    NotHost,

    #[error("Game already started")]
    GameAlreadyStarted,

    #[error("A table needs three players")]
    NotEnoughPlayers,

    #[error("Game not started")]
    GameNotStarted,

    #[error("Invalid intent: {0}")]
    InvalidIntent(String),
}

/// A player seated at a table.
#[derive(Debug, Clone)]
pub struct TablePlayer {
    pub id: Uuid,
    pub name: String,
    pub connected: bool,
    /// Seat in the game (0-2), assigned when the game starts
    pub seat: Option<Seat>,
}

impl TablePlayer {
    pub fn new(id: Uuid, name: String) -> Self {
        Self {
            id,
            name,
            connected: true,
            seat: None,
        }
    }

    pub fn to_info(&self) -> PlayerInfo {
        PlayerInfo {
            id: self.id,
            name: self.name.clone(),
            connected: self.connected,
        }
    }
}

/// A table hosting one three-player session.
pub struct GameTable {
    pub id: Uuid,
    pub name: String,
    pub host_id: Uuid,
    pub status: TableStatus,
    pub players: HashMap<Uuid, TablePlayer>,
    /// Order of players for seat assignment
    pub seat_order: Vec<Uuid>,
    /// The session (once started)
    pub session: Option<GameSession>,
}

impl GameTable {
    pub fn new(id: Uuid, host_id: Uuid, host_name: String) -> Self {
        let mut players = HashMap::new();
        players.insert(host_id, TablePlayer::new(host_id, host_name.clone()));

        Self {
            id,
            name: format!("{}'s table", host_name),
            host_id,
            status: TableStatus::Waiting,
            players,
            seat_order: vec![host_id],
            session: None,
        }
    }

    pub fn player_count(&self) -> usize {
        self.players.len()
    }

    pub fn is_full(&self) -> bool {
        self.players.len() >= PLAYER_COUNT
    }

    pub fn add_player(&mut self, player_id: Uuid, name: String) -> Result<(), TableError> {
        if self.status != TableStatus::Waiting {
            return Err(TableError::GameAlreadyStarted);
        }
        if self.is_full() {
            return Err(TableError::TableFull);
        }

        self.players
            .insert(player_id, TablePlayer::new(player_id, name));
        self.seat_order.push(player_id);
        Ok(())
    }

    pub fn remove_player(&mut self, player_id: Uuid) -> Result<bool, TableError> {
        if !self.players.contains_key(&player_id) {
            return Err(TableError::PlayerNotAtTable);
        }

        self.players.remove(&player_id);
        self.seat_order.retain(|&id| id != player_id);

        // If host left, assign new host
        if player_id == self.host_id && !self.seat_order.is_empty() {
            self.host_id = self.seat_order[0];
        }

        // Return true if table is now empty
        Ok(self.players.is_empty())
    }

    pub fn set_player_connected(&mut self, player_id: Uuid, connected: bool) {
        if let Some(player) = self.players.get_mut(&player_id) {
            player.connected = connected;
        }
    }

    /// Start the session and deal the first hand.
    pub fn start_game(&mut self, requester_id: Uuid) -> Result<Vec<GameEvent>, TableError> {
        if requester_id != self.host_id {
            return Err(TableError::NotHost);
        }
        if self.status != TableStatus::Waiting {
            return Err(TableError::GameAlreadyStarted);
        }
        if self.players.len() != PLAYER_COUNT {
            return Err(TableError::NotEnoughPlayers);
        }

        // Assign seats in join order
        for (idx, &player_id) in self.seat_order.iter().enumerate() {
            if let Some(player) = self.players.get_mut(&player_id) {
                player.seat = Some(idx as Seat);
            }
        }

        let player_names: Vec<String> = self
            .seat_order
            .iter()
            .filter_map(|id| self.players.get(id).map(|p| p.name.clone()))
            .collect();

        let mut session = GameSession::new(player_names);
        let events = session
            .deal()
            .map_err(|e| TableError::InvalidIntent(e.to_string()))?;
        self.session = Some(session);
        self.status = TableStatus::InGame;

        Ok(events)
    }

    /// Decode and apply an intent from a connection.
    pub fn apply_intent(
        &mut self,
        player_id: Uuid,
        intent: serde_json::Value,
    ) -> Result<Vec<GameEvent>, TableError> {
        let player = self
            .players
            .get(&player_id)
            .ok_or(TableError::PlayerNotAtTable)?;
        let seat = player.seat.ok_or(TableError::PlayerNotAtTable)?;

        // Decode at the boundary; the engine only sees typed intents
        let intent: Intent = serde_json::from_value(intent)
            .map_err(|e| TableError::InvalidIntent(e.to_string()))?;

        let session = self.session.as_mut().ok_or(TableError::GameNotStarted)?;
        let mut events = session
            .apply(seat, intent)
            .map_err(|e| TableError::InvalidIntent(e.to_string()))?;

        self.deal_if_pending(&mut events);

        if self.session.as_ref().map(|s| s.phase) == Some(GamePhase::Closed) {
            self.status = TableStatus::Finished;
        }

        Ok(events)
    }

    /// Advance past a displayed trick. Driven by the server's display timer.
    pub fn confirm_trick(&mut self) -> Result<Vec<GameEvent>, TableError> {
        let session = self.session.as_mut().ok_or(TableError::GameNotStarted)?;
        session
            .confirm_trick()
            .map_err(|e| TableError::InvalidIntent(e.to_string()))
    }

    /// Deal whenever the session sits on a fresh deck (after an ANO reset).
    fn deal_if_pending(&mut self, events: &mut Vec<GameEvent>) {
        if let Some(session) = self.session.as_mut() {
            if session.phase == GamePhase::Dealing {
                if let Ok(mut dealt) = session.deal() {
                    events.append(&mut dealt);
                }
            }
        }
    }

    pub fn get_game_state(&self) -> Option<serde_json::Value> {
        self.session
            .as_ref()
            .and_then(|s| serde_json::to_value(s).ok())
    }

    pub fn active_seat(&self) -> Option<usize> {
        self.session.as_ref().map(|s| s.active_seat as usize)
    }

    pub fn has_pending_trick(&self) -> bool {
        self.session
            .as_ref()
            .map_or(false, |s| s.pending_trick().is_some())
    }

    /// Summary line once the hand has finished.
    pub fn result_summary(&self) -> Option<String> {
        self.session
            .as_ref()
            .filter(|s| s.is_finished())
            .and_then(|s| s.result_text())
    }

    pub fn to_info(&self) -> TableInfo {
        TableInfo {
            id: self.id,
            name: self.name.clone(),
            players: self
                .seat_order
                .iter()
                .filter_map(|id| self.players.get(id).map(|p| p.to_info()))
                .collect(),
            host_id: self.host_id,
            status: self.status,
        }
    }
}
