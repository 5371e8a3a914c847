// On-screen keyboard nudging for the search box
// Onboard's auto-show flickers with some toolkits, so when forced we tell it explicitly:
// show on focus in, hide on focus out. Delivery over the session bus belongs to the host.

use serde::{Deserialize, Serialize};
use tracing::info;

pub const ONBOARD_SERVICE: &str = "org.onboard.Onboard";
pub const ONBOARD_PATH: &str = "/org/onboard/Onboard/Keyboard";
pub const ONBOARD_INTERFACE: &str = "org.onboard.Onboard.Keyboard";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum KeyboardCommand {
    Show,
    Hide,
}

impl KeyboardCommand {
    /// Method name on the Onboard keyboard interface.
    pub fn method(self) -> &'static str {
        match self {
            KeyboardCommand::Show => "Show",
            KeyboardCommand::Hide => "Hide",
        }
    }
}

/// Where keyboard commands go (a session-bus client in the real app).
pub trait KeyboardBus {
    fn send(&mut self, command: KeyboardCommand);
}

/// Bus that only writes the command to the log.
#[derive(Debug, Default)]
pub struct LogBus;

impl KeyboardBus for LogBus {
    fn send(&mut self, command: KeyboardCommand) {
        info!(
            "Firing {} keyboard ({} {})",
            command.method(),
            ONBOARD_SERVICE,
            ONBOARD_PATH
        );
    }
}

#[derive(Debug, Clone, Copy)]
pub struct SearchFocus {
    forced: bool,
}

impl SearchFocus {
    pub fn new(force_onboard_keyboard: bool) -> Self {
        Self {
            forced: force_onboard_keyboard,
        }
    }

    /// Send Show/Hide for a focus change of the search box. Returns what was sent.
    pub fn focus_changed(
        &self,
        focused: bool,
        bus: &mut dyn KeyboardBus,
    ) -> Option<KeyboardCommand> {
        if !self.forced {
            return None;
        }
        let command = if focused {
            KeyboardCommand::Show
        } else {
            KeyboardCommand::Hide
        };
        bus.send(command);
        Some(command)
    }
}
