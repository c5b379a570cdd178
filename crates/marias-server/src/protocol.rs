//! WebSocket protocol messages for Marias multiplayer.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Messages sent from client to server.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload")]
pub enum ClientMessage {
    /// Open a new table
    CreateTable { player_name: String },

    /// Join an existing table
    JoinTable { table_id: Uuid, player_name: String },

    /// Leave current table
    LeaveTable,

    /// Start the game (host only, needs a full table)
    StartGame,

    /// Submit a game intent
    GameIntent { intent: serde_json::Value },

    /// Request table list
    ListTables,

    /// Ping for keepalive
    Ping,
}

/// Messages sent from server to client.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload")]
pub enum ServerMessage {
    /// Welcome message with assigned player ID
    Welcome { player_id: Uuid },

    /// Table created successfully
    TableCreated { table_id: Uuid },

    /// Joined table successfully
    JoinedTable { table: TableInfo },

    /// Left table successfully
    LeftTable,

    /// Table state updated (player joined/left)
    TableUpdated { table: TableInfo },

    /// Game started
    GameStarted { state: serde_json::Value },

    /// Game state updated
    GameState { state: serde_json::Value },

    /// Intent applied (or rejected with the rule reason)
    IntentResult {
        success: bool,
        events: Vec<serde_json::Value>,
        error: Option<String>,
    },

    /// Active seat changed
    TurnChanged { seat: usize },

    /// The finished hand's summary line
    HandFinished { summary: String },

    /// List of available tables
    TableList { tables: Vec<TableInfo> },

    /// Error occurred
    Error { message: String },

    /// Pong response
    Pong,
}

/// Table information for clients.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TableInfo {
    pub id: Uuid,
    pub name: String,
    pub players: Vec<PlayerInfo>,
    pub host_id: Uuid,
    pub status: TableStatus,
}

/// Player information at a table.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlayerInfo {
    pub id: Uuid,
    pub name: String,
    pub connected: bool,
}

/// Table status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TableStatus {
    Waiting,
    InGame,
    Finished,
}
