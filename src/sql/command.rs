//! Command operations for PostgreSQL database.
//!
//! Every function takes an open transaction so that callers decide the unit of work.

use sqlx::{Postgres, Transaction};

use crate::{Command, CommandId, NewCommand, RepositoryError};

/// Result type for database operations.
pub type SqlResult<T> = Result<T, RepositoryError>;

type CommandRow = (i32, String, String, String);

fn from_row((id, how_to, platform, command_line): CommandRow) -> Command {
    Command {
        id: CommandId::new(id),
        how_to,
        platform,
        command_line,
    }
}

/// Inserts a new command and returns it with the identifier assigned by the database.
///
/// # Arguments
/// * `tx` - PostgreSQL transaction
/// * `command` - The command to insert
///
/// # Examples
/// ```no_run
/// # use command_api::{NewCommand, sql};
/// # use sqlx::PgPool;
/// # async fn example(pool: PgPool) -> Result<(), Box<dyn std::error::Error>> {
/// let mut tx = pool.begin().await?;
/// let created = sql::command::create(&mut tx, &NewCommand::new("List files", "Linux", "ls")).await?;
/// tx.commit().await?;
/// println!("created command {}", created.id);
/// # Ok(())
/// # }
/// ```
pub async fn create(tx: &mut Transaction<'_, Postgres>, command: &NewCommand) -> SqlResult<Command> {
    let result = sqlx::query_as::<_, CommandRow>(
        r#"
        INSERT INTO commands (how_to, platform, command_line)
        VALUES ($1, $2, $3)
        RETURNING id, how_to, platform, command_line
        "#,
    )
    .bind(&command.how_to)
    .bind(&command.platform)
    .bind(&command.command_line)
    .fetch_one(&mut **tx)
    .await;

    match result {
        Ok(row) => Ok(from_row(row)),
        Err(e) => {
            tracing::error!(error = %e, "database error creating command");
            Err(e.into())
        }
    }
}

/// Retrieves a command by identifier.
///
/// # Returns
/// * `Ok(Some(Command))` - Command found
/// * `Ok(None)` - Command not found
/// * `Err(RepositoryError::Internal)` - Database error
pub async fn get(tx: &mut Transaction<'_, Postgres>, id: CommandId) -> SqlResult<Option<Command>> {
    let result = sqlx::query_as::<_, CommandRow>(
        r#"
        SELECT id, how_to, platform, command_line
        FROM commands
        WHERE id = $1
        "#,
    )
    .bind(id.get())
    .fetch_optional(&mut **tx)
    .await;

    match result {
        Ok(row) => Ok(row.map(from_row)),
        Err(e) => {
            tracing::error!(error = %e, %id, "database error getting command");
            Err(e.into())
        }
    }
}

/// Lists all commands ordered by identifier.
pub async fn list(tx: &mut Transaction<'_, Postgres>) -> SqlResult<Vec<Command>> {
    let result = sqlx::query_as::<_, CommandRow>(
        r#"
        SELECT id, how_to, platform, command_line
        FROM commands
        ORDER BY id ASC
        "#,
    )
    .fetch_all(&mut **tx)
    .await;

    match result {
        Ok(rows) => Ok(rows.into_iter().map(from_row).collect()),
        Err(e) => {
            tracing::error!(error = %e, "database error listing commands");
            Err(e.into())
        }
    }
}

/// Overwrites the mutable fields of an existing command.
///
/// # Returns
/// * `Ok(true)` - Command existed and was updated
/// * `Ok(false)` - Command did not exist
/// * `Err(RepositoryError::Internal)` - Database error
pub async fn update(tx: &mut Transaction<'_, Postgres>, command: &Command) -> SqlResult<bool> {
    let result = sqlx::query(
        r#"
        UPDATE commands
        SET how_to = $2, platform = $3, command_line = $4
        WHERE id = $1
        "#,
    )
    .bind(command.id.get())
    .bind(&command.how_to)
    .bind(&command.platform)
    .bind(&command.command_line)
    .execute(&mut **tx)
    .await;

    match result {
        Ok(result) => Ok(result.rows_affected() > 0),
        Err(e) => {
            tracing::error!(error = %e, id = %command.id, "database error updating command");
            Err(e.into())
        }
    }
}

/// Deletes a command.
///
/// # Returns
/// * `Ok(true)` - Command existed and was deleted
/// * `Ok(false)` - Command did not exist
/// * `Err(RepositoryError::Internal)` - Database error
pub async fn delete(tx: &mut Transaction<'_, Postgres>, id: CommandId) -> SqlResult<bool> {
    let result = sqlx::query(
        r#"
        DELETE FROM commands
        WHERE id = $1
        "#,
    )
    .bind(id.get())
    .execute(&mut **tx)
    .await;

    match result {
        Ok(result) => Ok(result.rows_affected() > 0),
        Err(e) => {
            tracing::error!(error = %e, %id, "database error deleting command");
            Err(e.into())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sql::tests::setup_test_db;

    #[tokio::test]
    async fn create_and_get() {
        let Some(pool) = setup_test_db().await else {
            return;
        };

        let mut tx = pool.begin().await.unwrap();
        let created = create(&mut tx, &NewCommand::new("Run tests", "cargo", "cargo test"))
            .await
            .unwrap();
        tx.commit().await.unwrap();

        let mut tx = pool.begin().await.unwrap();
        let found = get(&mut tx, created.id).await.unwrap();
        tx.commit().await.unwrap();
        assert_eq!(found, Some(created));
    }

    #[tokio::test]
    async fn create_assigns_distinct_ids() {
        let Some(pool) = setup_test_db().await else {
            return;
        };

        let mut tx = pool.begin().await.unwrap();
        let first = create(&mut tx, &NewCommand::new("a", "p", "1")).await.unwrap();
        let second = create(&mut tx, &NewCommand::new("b", "p", "2")).await.unwrap();
        tx.commit().await.unwrap();
        assert_ne!(first.id, second.id);
    }

    #[tokio::test]
    async fn get_missing() {
        let Some(pool) = setup_test_db().await else {
            return;
        };

        let mut tx = pool.begin().await.unwrap();
        let found = get(&mut tx, CommandId::new(12345)).await.unwrap();
        assert!(found.is_none());
    }

    #[tokio::test]
    async fn list_ordered_by_id() {
        let Some(pool) = setup_test_db().await else {
            return;
        };

        let mut tx = pool.begin().await.unwrap();
        create(&mut tx, &NewCommand::new("a", "p", "1")).await.unwrap();
        create(&mut tx, &NewCommand::new("b", "p", "2")).await.unwrap();
        create(&mut tx, &NewCommand::new("c", "p", "3")).await.unwrap();
        tx.commit().await.unwrap();

        let mut tx = pool.begin().await.unwrap();
        let commands = list(&mut tx).await.unwrap();
        let how_tos: Vec<&str> = commands.iter().map(|c| c.how_to.as_str()).collect();
        assert_eq!(how_tos, vec!["a", "b", "c"]);
    }

    #[tokio::test]
    async fn update_existing_and_missing() {
        let Some(pool) = setup_test_db().await else {
            return;
        };

        let mut tx = pool.begin().await.unwrap();
        let mut command = create(&mut tx, &NewCommand::new("a", "p", "1")).await.unwrap();
        tx.commit().await.unwrap();

        command.platform = "changed".to_string();
        let mut tx = pool.begin().await.unwrap();
        assert!(update(&mut tx, &command).await.unwrap());
        tx.commit().await.unwrap();

        let mut tx = pool.begin().await.unwrap();
        let stored = get(&mut tx, command.id).await.unwrap().unwrap();
        assert_eq!(stored.platform, "changed");

        let missing = NewCommand::new("x", "y", "z").with_id(CommandId::new(99999));
        assert!(!update(&mut tx, &missing).await.unwrap());
    }

    #[tokio::test]
    async fn delete_existing_and_missing() {
        let Some(pool) = setup_test_db().await else {
            return;
        };

        let mut tx = pool.begin().await.unwrap();
        let command = create(&mut tx, &NewCommand::new("a", "p", "1")).await.unwrap();
        tx.commit().await.unwrap();

        let mut tx = pool.begin().await.unwrap();
        assert!(delete(&mut tx, command.id).await.unwrap());
        assert!(!delete(&mut tx, command.id).await.unwrap());
        tx.commit().await.unwrap();

        let mut tx = pool.begin().await.unwrap();
        assert!(get(&mut tx, command.id).await.unwrap().is_none());
    }
}
