use std::fmt::{Display, Formatter, Result as FmtResult};
use std::num::ParseIntError;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

////////////////////////////////////////////// CommandId ///////////////////////////////////////////////

/// Identifier assigned to a command by the store when it is created.
///
/// Identifiers are never chosen by clients; the only way to obtain a fresh one is through
/// [`crate::CommandRepository::create_command`].
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct CommandId(i32);

impl CommandId {
    /// Wraps a raw store identifier.
    pub fn new(id: i32) -> Self {
        CommandId(id)
    }

    /// Returns the raw store identifier.
    pub fn get(self) -> i32 {
        self.0
    }
}

impl Display for CommandId {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        write!(f, "{}", self.0)
    }
}

impl FromStr for CommandId {
    type Err = ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim().parse().map(CommandId)
    }
}

impl From<i32> for CommandId {
    fn from(id: i32) -> Self {
        CommandId(id)
    }
}

/////////////////////////////////////////////// Command ////////////////////////////////////////////////

/// A stored command: how to do something, on which platform, and the command line that does it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Command {
    /// Store-assigned identifier.
    pub id: CommandId,
    /// Short description of what the command accomplishes.
    pub how_to: String,
    /// Platform, tool, or framework the command applies to.
    pub platform: String,
    /// The command line itself.
    pub command_line: String,
}

/// A command that has not been persisted yet and therefore has no identifier.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewCommand {
    /// Short description of what the command accomplishes.
    pub how_to: String,
    /// Platform, tool, or framework the command applies to.
    pub platform: String,
    /// The command line itself.
    pub command_line: String,
}

impl NewCommand {
    /// Creates a new unpersisted command.
    pub fn new(
        how_to: impl Into<String>,
        platform: impl Into<String>,
        command_line: impl Into<String>,
    ) -> Self {
        NewCommand {
            how_to: how_to.into(),
            platform: platform.into(),
            command_line: command_line.into(),
        }
    }

    /// Attaches the identifier assigned by a store.
    pub fn with_id(self, id: CommandId) -> Command {
        Command {
            id,
            how_to: self.how_to,
            platform: self.platform,
            command_line: self.command_line,
        }
    }
}
