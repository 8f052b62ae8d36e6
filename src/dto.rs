//! Request and response shapes for the command HTTP API.
//!
//! The read DTO is what clients see; the create and update DTOs are what clients send. None of
//! the input shapes carry an identifier: identifiers are assigned by the store on create and
//! taken from the request path on update.
//!
//! Input DTOs tolerate missing fields (they default to the empty string) so that an empty body
//! `{}` is a valid create or update request.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::CommandId;

/// Maximum number of characters accepted in `howTo`, matching the `VARCHAR(250)` column.
pub const MAX_HOW_TO_CHARS: usize = 250;

/// Output representation of a stored command.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommandReadDto {
    /// Store-assigned identifier.
    pub id: CommandId,
    /// Short description of what the command accomplishes.
    pub how_to: String,
    /// Platform, tool, or framework the command applies to.
    pub platform: String,
    /// The command line itself.
    pub command_line: String,
}

/// Input representation for creating a command.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CommandCreateDto {
    /// Short description of what the command accomplishes.
    pub how_to: String,
    /// Platform, tool, or framework the command applies to.
    pub platform: String,
    /// The command line itself.
    pub command_line: String,
}

/// Input representation for full and partial (JSON Patch) updates of a command.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CommandUpdateDto {
    /// Short description of what the command accomplishes.
    pub how_to: String,
    /// Platform, tool, or framework the command applies to.
    pub platform: String,
    /// The command line itself.
    pub command_line: String,
}

/// Error returned when an input DTO cannot be stored as given.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// A field holds more characters than the store accepts.
    #[error("field {field} is {actual} characters long; at most {max} are allowed")]
    TooLong {
        /// Wire name of the offending field.
        field: &'static str,
        /// Maximum number of characters.
        max: usize,
        /// Number of characters received.
        actual: usize,
    },
}

fn check_how_to(how_to: &str) -> Result<(), ValidationError> {
    let actual = how_to.chars().count();
    if actual > MAX_HOW_TO_CHARS {
        return Err(ValidationError::TooLong {
            field: "howTo",
            max: MAX_HOW_TO_CHARS,
            actual,
        });
    }
    Ok(())
}

impl CommandCreateDto {
    /// Checks that the DTO fits the store's column constraints.
    pub fn validate(&self) -> Result<(), ValidationError> {
        check_how_to(&self.how_to)
    }
}

impl CommandUpdateDto {
    /// Checks that the DTO fits the store's column constraints.
    pub fn validate(&self) -> Result<(), ValidationError> {
        check_how_to(&self.how_to)
    }
}
