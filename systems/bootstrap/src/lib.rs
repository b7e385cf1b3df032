#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Pure system that greets newly connected players.

use respawn_governor_core::{Command, ConfigSnapshot, Event, PlayerId, ANNOUNCE_BANNER};

/// Emits the informational governor banner when players connect.
#[derive(Debug, Default)]
pub struct Bootstrap;

impl Bootstrap {
    /// Creates a new bootstrap system.
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    /// Banner a connecting player should receive, when announcements are on.
    ///
    /// Both the master switch and the announce flag must be set; otherwise
    /// connections stay silent.
    #[must_use]
    pub fn login_banner(config: &ConfigSnapshot) -> Option<&'static str> {
        (config.enabled && config.announce_on_login).then_some(ANNOUNCE_BANNER)
    }

    /// Emits one system-message command per observed player connection.
    pub fn handle(&self, events: &[Event], config: &ConfigSnapshot, out: &mut Vec<Command>) {
        let Some(banner) = Self::login_banner(config) else {
            return;
        };
        for event in events {
            if let Event::PlayerConnected { player } = event {
                self.announce(*player, banner, out);
            }
        }
    }

    fn announce(&self, player: PlayerId, banner: &str, out: &mut Vec<Command>) {
        out.push(Command::DeliverSystemMessage {
            player,
            text: banner.to_string(),
        });
    }
}
