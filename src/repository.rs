//! # Command Repository
//!
//! The [`CommandRepository`] trait is the single seam between the HTTP layer and persistence.
//! Handlers hold an `Arc<dyn CommandRepository>` and treat it as the only source of truth;
//! nothing is cached across requests.
//!
//! Two implementations ship with the crate:
//!
//! - [`InMemoryCommandRepository`]: a `Mutex<BTreeMap>` with a monotonically increasing id
//!   counter. Used by tests and by the daemon when no database is configured.
//! - [`crate::sql::PgCommandRepository`]: PostgreSQL through `sqlx`.
//!
//! ```rust
//! # use command_api::{CommandRepository, InMemoryCommandRepository, NewCommand};
//! # #[tokio::main]
//! # async fn main() {
//! let repository = InMemoryCommandRepository::new();
//! let created = repository
//!     .create_command(NewCommand::new("List files", "Linux", "ls -la"))
//!     .await
//!     .unwrap();
//! let found = repository.get_command_by_id(created.id).await.unwrap();
//! assert_eq!(found, Some(created));
//! # }
//! ```

use std::collections::BTreeMap;
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;

use crate::{Command, CommandId, NewCommand, RepositoryError};

/// Persistence operations for commands.
///
/// Implementors must be safe to share across request handlers.
#[async_trait]
pub trait CommandRepository: Send + Sync {
    /// Lists every stored command ordered by identifier.
    ///
    /// An empty store yields an empty vector, never an error.
    async fn get_all_commands(&self) -> Result<Vec<Command>, RepositoryError>;

    /// Retrieves a command by identifier.
    ///
    /// # Returns
    /// * `Ok(Some(Command))` - Command found
    /// * `Ok(None)` - No command has this identifier
    async fn get_command_by_id(&self, id: CommandId) -> Result<Option<Command>, RepositoryError>;

    /// Persists a new command and returns it with its store-assigned identifier.
    async fn create_command(&self, command: NewCommand) -> Result<Command, RepositoryError>;

    /// Replaces the stored fields of `command.id` with those of `command`.
    ///
    /// # Returns
    /// * `Ok(true)` - Command existed and was updated
    /// * `Ok(false)` - Command did not exist
    async fn update_command(&self, command: &Command) -> Result<bool, RepositoryError>;

    /// Deletes a command.
    ///
    /// # Returns
    /// * `Ok(true)` - Command existed and was deleted
    /// * `Ok(false)` - Command did not exist
    async fn delete_command(&self, id: CommandId) -> Result<bool, RepositoryError>;
}

////////////////////////////////////////// InMemoryCommandRepository //////////////////////////////////////////

#[derive(Debug)]
struct InMemoryState {
    commands: BTreeMap<CommandId, Command>,
    next_id: i32,
}

/// Thread-safe in-memory command store.
///
/// Identifiers start at 1 and are never reused, even after deletes.
#[derive(Debug)]
pub struct InMemoryCommandRepository {
    state: Mutex<InMemoryState>,
}

impl Default for InMemoryCommandRepository {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryCommandRepository {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self {
            state: Mutex::new(InMemoryState {
                commands: BTreeMap::new(),
                next_id: 1,
            }),
        }
    }

    /// Creates a store pre-populated with `commands`, assigning identifiers in order.
    pub fn with_commands(commands: impl IntoIterator<Item = NewCommand>) -> Self {
        let mut state = InMemoryState {
            commands: BTreeMap::new(),
            next_id: 1,
        };
        for command in commands {
            let id = CommandId::new(state.next_id);
            state.next_id += 1;
            state.commands.insert(id, command.with_id(id));
        }
        Self {
            state: Mutex::new(state),
        }
    }

    /// Returns the number of stored commands.
    pub fn len(&self) -> usize {
        self.lock().map(|state| state.commands.len()).unwrap_or(0)
    }

    /// Returns true when no commands are stored.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn lock(&self) -> Result<MutexGuard<'_, InMemoryState>, RepositoryError> {
        self.state
            .lock()
            .map_err(|_| RepositoryError::Internal("command store lock poisoned".to_string()))
    }
}

#[async_trait]
impl CommandRepository for InMemoryCommandRepository {
    async fn get_all_commands(&self) -> Result<Vec<Command>, RepositoryError> {
        let state = self.lock()?;
        Ok(state.commands.values().cloned().collect())
    }

    async fn get_command_by_id(&self, id: CommandId) -> Result<Option<Command>, RepositoryError> {
        let state = self.lock()?;
        Ok(state.commands.get(&id).cloned())
    }

    async fn create_command(&self, command: NewCommand) -> Result<Command, RepositoryError> {
        let mut state = self.lock()?;
        let id = CommandId::new(state.next_id);
        state.next_id = state
            .next_id
            .checked_add(1)
            .ok_or_else(|| RepositoryError::Internal("command id space exhausted".to_string()))?;
        let command = command.with_id(id);
        state.commands.insert(id, command.clone());
        Ok(command)
    }

    async fn update_command(&self, command: &Command) -> Result<bool, RepositoryError> {
        let mut state = self.lock()?;
        match state.commands.get_mut(&command.id) {
            Some(stored) => {
                stored.clone_from(command);
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn delete_command(&self, id: CommandId) -> Result<bool, RepositoryError> {
        let mut state = self.lock()?;
        Ok(state.commands.remove(&id).is_some())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn empty_store_lists_nothing() {
        let repository = InMemoryCommandRepository::new();
        let commands = repository.get_all_commands().await.unwrap();
        assert!(commands.is_empty());
        assert!(repository.is_empty());
    }

    #[tokio::test]
    async fn create_assigns_increasing_ids() {
        let repository = InMemoryCommandRepository::new();
        let first = repository
            .create_command(NewCommand::new("a", "p", "1"))
            .await
            .unwrap();
        let second = repository
            .create_command(NewCommand::new("b", "p", "2"))
            .await
            .unwrap();
        assert_eq!(first.id, CommandId::new(1));
        assert_eq!(second.id, CommandId::new(2));
        assert_eq!(repository.len(), 2);
    }

    #[tokio::test]
    async fn ids_are_not_reused_after_delete() {
        let repository = InMemoryCommandRepository::new();
        let first = repository
            .create_command(NewCommand::new("a", "p", "1"))
            .await
            .unwrap();
        assert!(repository.delete_command(first.id).await.unwrap());

        let second = repository
            .create_command(NewCommand::new("b", "p", "2"))
            .await
            .unwrap();
        assert!(second.id > first.id);
    }

    #[tokio::test]
    async fn get_missing_returns_none() {
        let repository = InMemoryCommandRepository::new();
        let found = repository
            .get_command_by_id(CommandId::new(1))
            .await
            .unwrap();
        assert!(found.is_none());
    }

    #[tokio::test]
    async fn update_existing_and_missing() {
        let repository =
            InMemoryCommandRepository::with_commands([NewCommand::new("a", "p", "1")]);
        let mut command = repository
            .get_command_by_id(CommandId::new(1))
            .await
            .unwrap()
            .unwrap();
        command.command_line = "changed".to_string();
        assert!(repository.update_command(&command).await.unwrap());

        let stored = repository
            .get_command_by_id(CommandId::new(1))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(stored.command_line, "changed");

        let missing = NewCommand::new("x", "y", "z").with_id(CommandId::new(42));
        assert!(!repository.update_command(&missing).await.unwrap());
    }

    #[tokio::test]
    async fn delete_existing_and_missing() {
        let repository =
            InMemoryCommandRepository::with_commands([NewCommand::new("a", "p", "1")]);
        assert!(repository.delete_command(CommandId::new(1)).await.unwrap());
        assert!(!repository.delete_command(CommandId::new(1)).await.unwrap());
        assert!(repository.is_empty());
    }

    #[tokio::test]
    async fn list_is_ordered_by_id() {
        let repository = InMemoryCommandRepository::with_commands([
            NewCommand::new("a", "p", "1"),
            NewCommand::new("b", "p", "2"),
            NewCommand::new("c", "p", "3"),
        ]);
        let ids: Vec<i32> = repository
            .get_all_commands()
            .await
            .unwrap()
            .into_iter()
            .map(|c| c.id.get())
            .collect();
        assert_eq!(ids, vec![1, 2, 3]);
    }
}
