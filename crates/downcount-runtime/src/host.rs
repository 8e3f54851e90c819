//! The proxy host seam.
//!
//! The proxy that loads this runtime is an external collaborator. Everything
//! the runtime needs from it is behind the [`Host`] trait: player
//! enumeration, the display surfaces, command execution, and transfers.
//! Lifecycle and player events flow the other way as explicit method calls
//! on [`DowncountRuntime`](crate::runtime::DowncountRuntime).

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;

/// Errors the host can report back to the runtime.
#[derive(Error, Debug)]
pub enum HostError {
    /// A player transfer was refused or failed.
    #[error("transfer to '{server}' failed: {reason}")]
    TransferFailed { server: String, reason: String },

    /// The named server is not registered with the proxy.
    #[error("unknown server: {0}")]
    UnknownServer(String),
}

/// Result type for host operations.
pub type HostResult<T> = Result<T, HostError>;

/// A connected player as the runtime sees it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Player {
    /// Username, unique per connection.
    pub name: String,
    /// Backend server the player is currently on, if known.
    pub server: Option<String>,
    /// Extra placeholder variables the host supplies for this player.
    pub vars: HashMap<String, String>,
}

impl Player {
    /// Creates a player with just a name.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            server: None,
            vars: HashMap::new(),
        }
    }

    /// Sets the player's current server.
    pub fn on_server(mut self, server: impl Into<String>) -> Self {
        self.server = Some(server.into());
        self
    }

    /// Placeholder variables for this player, including the built-ins
    /// `player` and `server`.
    pub fn placeholder_vars(&self) -> impl Iterator<Item = (String, String)> + '_ {
        let builtins = [
            ("player".to_string(), self.name.clone()),
            (
                "server".to_string(),
                self.server.clone().unwrap_or_default(),
            ),
        ];
        builtins
            .into_iter()
            .chain(self.vars.iter().map(|(k, v)| (k.clone(), v.clone())))
    }
}

/// Title display timing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TitleTimes {
    pub fade_in: Duration,
    pub stay: Duration,
    pub fade_out: Duration,
}

impl Default for TitleTimes {
    fn default() -> Self {
        Self {
            fade_in: Duration::ZERO,
            stay: Duration::from_secs(2),
            fade_out: Duration::ZERO,
        }
    }
}

/// Boss bar colors the host understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BossbarColor {
    Pink,
    #[default]
    Blue,
    Red,
    Green,
    Yellow,
    Purple,
    White,
}

impl BossbarColor {
    /// Parses a color name, falling back to blue.
    pub fn parse(name: &str) -> Self {
        match name.to_lowercase().as_str() {
            "pink" => Self::Pink,
            "red" => Self::Red,
            "green" => Self::Green,
            "yellow" => Self::Yellow,
            "purple" => Self::Purple,
            "white" => Self::White,
            _ => Self::Blue,
        }
    }
}

/// Interface to the proxy host.
///
/// Implementations must be `Send + Sync`; the runtime calls them from its
/// tick loop and from spawned action tasks concurrently. Display methods
/// are best-effort and must not panic.
#[async_trait]
pub trait Host: Send + Sync {
    /// All currently connected players.
    async fn players(&self) -> Vec<Player>;

    /// Whether a backend server with this name is registered.
    async fn has_server(&self, name: &str) -> bool;

    /// Sends a chat message to a player.
    async fn send_message(&self, player: &Player, text: &str);

    /// Sends an action bar line to a player.
    async fn send_actionbar(&self, player: &Player, text: &str);

    /// Shows a title/subtitle to a player.
    async fn show_title(&self, player: &Player, title: &str, subtitle: &str, times: TitleTimes);

    /// Shows (or updates) a keyed boss bar for a player.
    ///
    /// The key identifies the bar across updates so the host can reuse it.
    async fn show_bossbar(
        &self,
        player: &Player,
        key: &str,
        text: &str,
        progress: f32,
        color: BossbarColor,
    );

    /// Hides a keyed boss bar from a player.
    async fn hide_bossbar(&self, player: &Player, key: &str);

    /// Executes a command as the proxy console.
    async fn run_console_command(&self, command: &str);

    /// Dispatches a command as the given player.
    async fn run_player_command(&self, player: &Player, command: &str);

    /// Moves a player to another backend server.
    async fn transfer(&self, player: &Player, server: &str) -> HostResult<()>;
}

#[cfg(test)]
pub(crate) mod testing {
    //! A host double that records every call for assertions.

    use super::*;
    use parking_lot::Mutex;

    /// What the [`RecordingHost`] observed, in call order.
    #[derive(Debug, Clone, PartialEq)]
    pub enum HostCall {
        Message { player: String, text: String },
        Actionbar { player: String, text: String },
        Title { player: String, title: String, subtitle: String },
        Bossbar { player: String, key: String, text: String, progress: f32 },
        HideBossbar { player: String, key: String },
        ConsoleCommand { command: String },
        PlayerCommand { player: String, command: String },
        Transfer { player: String, server: String },
    }

    #[derive(Default)]
    pub struct RecordingHost {
        pub players: Vec<Player>,
        pub servers: Vec<String>,
        pub calls: Mutex<Vec<HostCall>>,
    }

    impl RecordingHost {
        pub fn with_players(players: Vec<Player>) -> Self {
            Self {
                players,
                servers: vec!["lobby".to_string(), "survival".to_string()],
                calls: Mutex::new(Vec::new()),
            }
        }

        pub fn calls(&self) -> Vec<HostCall> {
            self.calls.lock().clone()
        }
    }

    #[async_trait]
    impl Host for RecordingHost {
        async fn players(&self) -> Vec<Player> {
            self.players.clone()
        }

        async fn has_server(&self, name: &str) -> bool {
            self.servers.iter().any(|s| s == name)
        }

        async fn send_message(&self, player: &Player, text: &str) {
            self.calls.lock().push(HostCall::Message {
                player: player.name.clone(),
                text: text.to_string(),
            });
        }

        async fn send_actionbar(&self, player: &Player, text: &str) {
            self.calls.lock().push(HostCall::Actionbar {
                player: player.name.clone(),
                text: text.to_string(),
            });
        }

        async fn show_title(&self, player: &Player, title: &str, subtitle: &str, _times: TitleTimes) {
            self.calls.lock().push(HostCall::Title {
                player: player.name.clone(),
                title: title.to_string(),
                subtitle: subtitle.to_string(),
            });
        }

        async fn show_bossbar(
            &self,
            player: &Player,
            key: &str,
            text: &str,
            progress: f32,
            _color: BossbarColor,
        ) {
            self.calls.lock().push(HostCall::Bossbar {
                player: player.name.clone(),
                key: key.to_string(),
                text: text.to_string(),
                progress,
            });
        }

        async fn hide_bossbar(&self, player: &Player, key: &str) {
            self.calls.lock().push(HostCall::HideBossbar {
                player: player.name.clone(),
                key: key.to_string(),
            });
        }

        async fn run_console_command(&self, command: &str) {
            self.calls.lock().push(HostCall::ConsoleCommand {
                command: command.to_string(),
            });
        }

        async fn run_player_command(&self, player: &Player, command: &str) {
            self.calls.lock().push(HostCall::PlayerCommand {
                player: player.name.clone(),
                command: command.to_string(),
            });
        }

        async fn transfer(&self, player: &Player, server: &str) -> HostResult<()> {
            if !self.has_server(server).await {
                return Err(HostError::UnknownServer(server.to_string()));
            }
            self.calls.lock().push(HostCall::Transfer {
                player: player.name.clone(),
                server: server.to_string(),
            });
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bossbar_color_parse() {
        assert_eq!(BossbarColor::parse("RED"), BossbarColor::Red);
        assert_eq!(BossbarColor::parse("mauve"), BossbarColor::Blue);
    }

    #[test]
    fn test_placeholder_vars_include_builtins() {
        let mut player = Player::new("Ari").on_server("lobby");
        player.vars.insert("rank".to_string(), "vip".to_string());
        let vars: HashMap<String, String> = player.placeholder_vars().collect();
        assert_eq!(vars.get("player").map(String::as_str), Some("Ari"));
        assert_eq!(vars.get("server").map(String::as_str), Some("lobby"));
        assert_eq!(vars.get("rank").map(String::as_str), Some("vip"));
    }
}
