//! WebSocket server and connection handling.
//!
//! All session mutation goes through `DashMap::get_mut`, so intents against
//! one table are strictly serialized; broadcasts work from snapshots taken
//! before the entry lock is released.

use crate::protocol::{ClientMessage, ServerMessage, TableStatus};
use crate::table::GameTable;
use dashmap::DashMap;
use futures_util::{SinkExt, StreamExt};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::mpsc;
use tokio_tungstenite::{accept_async, tungstenite::Message};
use tracing::{error, info, warn};
use uuid::Uuid;

/// How long a completed trick stays on the table before play advances.
const TRICK_DISPLAY: Duration = Duration::from_secs(3);

/// Server state shared across all connections.
pub struct ServerState {
    /// All active tables
    pub tables: DashMap<Uuid, GameTable>,
    /// Mapping from player ID to their table ID
    pub player_tables: DashMap<Uuid, Uuid>,
    /// Mapping from player ID to their message sender
    pub player_senders: DashMap<Uuid, mpsc::UnboundedSender<ServerMessage>>,
}

impl ServerState {
    pub fn new() -> Self {
        Self {
            tables: DashMap::new(),
            player_tables: DashMap::new(),
            player_senders: DashMap::new(),
        }
    }

    /// Send a message to a specific player.
    pub fn send_to_player(&self, player_id: Uuid, msg: ServerMessage) {
        if let Some(sender) = self.player_senders.get(&player_id) {
            let _ = sender.send(msg);
        }
    }

    /// Broadcast a message to all players at a table.
    pub fn broadcast_to_table(&self, table_id: Uuid, msg: ServerMessage) {
        if let Some(table) = self.tables.get(&table_id) {
            for player_id in table.players.keys() {
                self.send_to_player(*player_id, msg.clone());
            }
        }
    }

    /// Broadcast a message to all players at a table except one.
    pub fn broadcast_to_table_except(&self, table_id: Uuid, except: Uuid, msg: ServerMessage) {
        if let Some(table) = self.tables.get(&table_id) {
            for player_id in table.players.keys() {
                if *player_id != except {
                    self.send_to_player(*player_id, msg.clone());
                }
            }
        }
    }

    /// Get list of tables waiting for players.
    pub fn get_waiting_tables(&self) -> Vec<crate::protocol::TableInfo> {
        self.tables
            .iter()
            .filter(|t| t.status == TableStatus::Waiting)
            .map(|t| t.to_info())
            .collect()
    }
}

impl Default for ServerState {
    fn default() -> Self {
        Self::new()
    }
}

/// Run the WebSocket server.
pub async fn run_server(addr: SocketAddr, state: Arc<ServerState>) -> anyhow::Result<()> {
    let listener = TcpListener::bind(addr).await?;
    info!("Marias server listening on {}", addr);

    while let Ok((stream, peer_addr)) = listener.accept().await {
        let state = Arc::clone(&state);
        tokio::spawn(async move {
            if let Err(e) = handle_connection(stream, peer_addr, state).await {
                error!("Connection error from {}: {}", peer_addr, e);
            }
        });
    }

    Ok(())
}

/// Handle a single WebSocket connection.
async fn handle_connection(
    stream: TcpStream,
    addr: SocketAddr,
    state: Arc<ServerState>,
) -> anyhow::Result<()> {
    let ws_stream = accept_async(stream).await?;
    info!("New WebSocket connection from {}", addr);

    let (mut ws_sender, mut ws_receiver) = ws_stream.split();

    // Assign a player ID
    let player_id = Uuid::new_v4();

    // Create channel for outgoing messages
    let (tx, mut rx) = mpsc::unbounded_channel::<ServerMessage>();
    state.player_senders.insert(player_id, tx);

    // Send welcome message
    let welcome = ServerMessage::Welcome { player_id };
    let msg_text = serde_json::to_string(&welcome)?;
    ws_sender.send(Message::Text(msg_text.into())).await?;

    // Spawn task to forward messages from channel to WebSocket
    let send_task = tokio::spawn(async move {
        while let Some(msg) = rx.recv().await {
            if let Ok(text) = serde_json::to_string(&msg) {
                if ws_sender.send(Message::Text(text.into())).await.is_err() {
                    break;
                }
            }
        }
    });

    // Handle incoming messages
    while let Some(msg) = ws_receiver.next().await {
        match msg {
            Ok(Message::Text(text)) => {
                if let Ok(client_msg) = serde_json::from_str::<ClientMessage>(&text) {
                    handle_message(player_id, client_msg, &state);
                } else {
                    warn!("Invalid message from {}: {}", player_id, text);
                }
            }
            Ok(Message::Close(_)) => {
                info!("Client {} closing connection", player_id);
                break;
            }
            Ok(Message::Ping(data)) => {
                state.send_to_player(player_id, ServerMessage::Pong);
                let _ = data; // Just consume it
            }
            Err(e) => {
                error!("WebSocket error from {}: {}", player_id, e);
                break;
            }
            _ => {}
        }
    }

    // Clean up on disconnect
    handle_disconnect(player_id, &state);
    state.player_senders.remove(&player_id);
    send_task.abort();

    info!("Connection closed for {}", player_id);
    Ok(())
}

/// Handle a client message.
fn handle_message(player_id: Uuid, msg: ClientMessage, state: &Arc<ServerState>) {
    match msg {
        ClientMessage::CreateTable { player_name } => {
            let table_id = Uuid::new_v4();
            let table = GameTable::new(table_id, player_id, player_name);
            let table_info = table.to_info();

            state.tables.insert(table_id, table);
            state.player_tables.insert(player_id, table_id);

            state.send_to_player(player_id, ServerMessage::TableCreated { table_id });
            state.send_to_player(player_id, ServerMessage::JoinedTable { table: table_info });
        }

        ClientMessage::JoinTable {
            table_id,
            player_name,
        } => {
            if let Some(mut table) = state.tables.get_mut(&table_id) {
                match table.add_player(player_id, player_name) {
                    Ok(()) => {
                        let table_info = table.to_info();
                        state.player_tables.insert(player_id, table_id);

                        state.send_to_player(
                            player_id,
                            ServerMessage::JoinedTable {
                                table: table_info.clone(),
                            },
                        );

                        // Notify other players
                        drop(table); // Release lock before broadcasting
                        state.broadcast_to_table_except(
                            table_id,
                            player_id,
                            ServerMessage::TableUpdated { table: table_info },
                        );
                    }
                    Err(e) => {
                        state.send_to_player(
                            player_id,
                            ServerMessage::Error {
                                message: e.to_string(),
                            },
                        );
                    }
                }
            } else {
                state.send_to_player(
                    player_id,
                    ServerMessage::Error {
                        message: "Table not found".to_string(),
                    },
                );
            }
        }

        ClientMessage::LeaveTable => {
            if let Some((_, table_id)) = state.player_tables.remove(&player_id) {
                let should_remove = {
                    if let Some(mut table) = state.tables.get_mut(&table_id) {
                        let is_empty = table.remove_player(player_id).unwrap_or(false);

                        if !is_empty {
                            let table_info = table.to_info();
                            drop(table);
                            state.broadcast_to_table(
                                table_id,
                                ServerMessage::TableUpdated { table: table_info },
                            );
                        }

                        is_empty
                    } else {
                        false
                    }
                };

                if should_remove {
                    state.tables.remove(&table_id);
                }

                state.send_to_player(player_id, ServerMessage::LeftTable);
            }
        }

        ClientMessage::StartGame => {
            if let Some(&table_id) = state.player_tables.get(&player_id).as_deref() {
                if let Some(mut table) = state.tables.get_mut(&table_id) {
                    match table.start_game(player_id) {
                        Ok(_events) => {
                            let game_state = table.get_game_state();
                            let active = table.active_seat();

                            drop(table);

                            if let Some(snapshot) = game_state {
                                state.broadcast_to_table(
                                    table_id,
                                    ServerMessage::GameStarted { state: snapshot },
                                );
                            }
                            if let Some(seat) = active {
                                state.broadcast_to_table(
                                    table_id,
                                    ServerMessage::TurnChanged { seat },
                                );
                            }
                        }
                        Err(e) => {
                            state.send_to_player(
                                player_id,
                                ServerMessage::Error {
                                    message: e.to_string(),
                                },
                            );
                        }
                    }
                }
            }
        }

        ClientMessage::GameIntent { intent } => {
            if let Some(&table_id) = state.player_tables.get(&player_id).as_deref() {
                if let Some(mut table) = state.tables.get_mut(&table_id) {
                    match table.apply_intent(player_id, intent) {
                        Ok(events) => {
                            let game_state = table.get_game_state();
                            let active = table.active_seat();
                            let summary = table.result_summary();
                            let trick_pending = table.has_pending_trick();

                            drop(table);

                            state.send_to_player(
                                player_id,
                                ServerMessage::IntentResult {
                                    success: true,
                                    events: events
                                        .iter()
                                        .filter_map(|e| serde_json::to_value(e).ok())
                                        .collect(),
                                    error: None,
                                },
                            );

                            broadcast_game_update(state, table_id, game_state, active, summary);

                            // Leave the finished trick visible, then advance
                            if trick_pending {
                                schedule_trick_confirm(state, table_id);
                            }
                        }
                        Err(e) => {
                            state.send_to_player(
                                player_id,
                                ServerMessage::IntentResult {
                                    success: false,
                                    events: vec![],
                                    error: Some(e.to_string()),
                                },
                            );
                        }
                    }
                }
            }
        }

        ClientMessage::ListTables => {
            let tables = state.get_waiting_tables();
            state.send_to_player(player_id, ServerMessage::TableList { tables });
        }

        ClientMessage::Ping => {
            state.send_to_player(player_id, ServerMessage::Pong);
        }
    }
}

/// Broadcast the post-intent snapshot, turn pointer, and (once the hand is
/// over) the result summary.
fn broadcast_game_update(
    state: &Arc<ServerState>,
    table_id: Uuid,
    game_state: Option<serde_json::Value>,
    active: Option<usize>,
    summary: Option<String>,
) {
    if let Some(snapshot) = game_state {
        state.broadcast_to_table(table_id, ServerMessage::GameState { state: snapshot });
    }
    if let Some(seat) = active {
        state.broadcast_to_table(table_id, ServerMessage::TurnChanged { seat });
    }
    if let Some(summary) = summary {
        state.broadcast_to_table(table_id, ServerMessage::HandFinished { summary });
    }
}

/// After the display delay, confirm the trick and push the refreshed state.
fn schedule_trick_confirm(state: &Arc<ServerState>, table_id: Uuid) {
    let state = Arc::clone(state);
    tokio::spawn(async move {
        tokio::time::sleep(TRICK_DISPLAY).await;

        let update = {
            if let Some(mut table) = state.tables.get_mut(&table_id) {
                match table.confirm_trick() {
                    Ok(_events) => {
                        let snapshot = table.get_game_state();
                        let active = table.active_seat();
                        let summary = table.result_summary();
                        drop(table);
                        Some((snapshot, active, summary))
                    }
                    // A reconnecting client may have confirmed already
                    Err(_) => None,
                }
            } else {
                None
            }
        };

        if let Some((snapshot, active, summary)) = update {
            broadcast_game_update(&state, table_id, snapshot, active, summary);
        }
    });
}

/// Handle player disconnect.
fn handle_disconnect(player_id: Uuid, state: &Arc<ServerState>) {
    if let Some((_, table_id)) = state.player_tables.remove(&player_id) {
        if let Some(mut table) = state.tables.get_mut(&table_id) {
            // Mark player as disconnected instead of removing during game
            if table.status == TableStatus::InGame {
                table.set_player_connected(player_id, false);
                let table_info = table.to_info();
                drop(table);
                state.broadcast_to_table(table_id, ServerMessage::TableUpdated { table: table_info });
            } else {
                // Remove player if game hasn't started
                let is_empty = table.remove_player(player_id).unwrap_or(false);
                if is_empty {
                    drop(table);
                    state.tables.remove(&table_id);
                } else {
                    let table_info = table.to_info();
                    drop(table);
                    state.broadcast_to_table(table_id, ServerMessage::TableUpdated { table: table_info });
                }
            }
        }
    }
}
