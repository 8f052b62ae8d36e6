use async_trait::async_trait;
use sqlx::PgPool;

use crate::{Command, CommandId, CommandRepository, NewCommand, RepositoryError};

/// PostgreSQL-backed [`CommandRepository`].
///
/// Each call runs in its own transaction.
#[derive(Debug, Clone)]
pub struct PgCommandRepository {
    pool: PgPool,
}

impl PgCommandRepository {
    /// Wraps an existing connection pool. Migrations must already have been applied.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Returns the underlying pool.
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

#[async_trait]
impl CommandRepository for PgCommandRepository {
    async fn get_all_commands(&self) -> Result<Vec<Command>, RepositoryError> {
        let mut tx = self.pool.begin().await?;
        let commands = super::command::list(&mut tx).await?;
        tx.commit().await?;
        Ok(commands)
    }

    async fn get_command_by_id(&self, id: CommandId) -> Result<Option<Command>, RepositoryError> {
        let mut tx = self.pool.begin().await?;
        let command = super::command::get(&mut tx, id).await?;
        tx.commit().await?;
        Ok(command)
    }

    async fn create_command(&self, command: NewCommand) -> Result<Command, RepositoryError> {
        let mut tx = self.pool.begin().await?;
        let created = super::command::create(&mut tx, &command).await?;
        tx.commit().await?;
        Ok(created)
    }

    async fn update_command(&self, command: &Command) -> Result<bool, RepositoryError> {
        let mut tx = self.pool.begin().await?;
        let updated = super::command::update(&mut tx, command).await?;
        tx.commit().await?;
        Ok(updated)
    }

    async fn delete_command(&self, id: CommandId) -> Result<bool, RepositoryError> {
        let mut tx = self.pool.begin().await?;
        let deleted = super::command::delete(&mut tx, id).await?;
        tx.commit().await?;
        Ok(deleted)
    }
}
