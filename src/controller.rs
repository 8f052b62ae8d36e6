//! # Commands Controller
//!
//! HTTP entry points for the command resource. Every handler is a single request/response
//! transition: it reads or writes through the [`CommandRepository`] held in [`AppState`] and
//! converts between entities and DTOs with the shared [`Mapper`].
//!
//! | Method | Path                  | Success              | Failure                  |
//! |--------|-----------------------|----------------------|--------------------------|
//! | GET    | `/api/commands`       | 200 `[ReadDto]`      |                          |
//! | GET    | `/api/commands/:id`   | 200 `ReadDto`        | 404                      |
//! | POST   | `/api/commands`       | 201 `ReadDto` + Location | 400                  |
//! | PUT    | `/api/commands/:id`   | 204                  | 404, 400                 |
//! | PATCH  | `/api/commands/:id`   | 204                  | 404, 400                 |
//! | DELETE | `/api/commands/:id`   | 204                  | 200 when the id is absent |
//!
//! Deleting an absent id answers `200 OK` with an empty body rather than 404. Clients that
//! need to distinguish the two cases can rely on 204 meaning "something was deleted".

use std::sync::Arc;

use axum::Router;
use axum::async_trait;
use axum::body::Bytes;
use axum::extract::{FromRequest, Path, Request, State};
use axum::http::{HeaderName, StatusCode, header};
use axum::response::{IntoResponse, Json, Response};
use axum::routing::get;
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use thiserror::Error;

use crate::{
    Command, CommandCreateDto, CommandId, CommandReadDto, CommandRepository, CommandUpdateDto,
    Mapper, MappingError, NewCommand, RepositoryError, ValidationError,
};

/// Route under which the command collection is served.
pub const COMMANDS_ROUTE: &str = "/api/commands";

/// Returns the route of a single command, as used in `Location` headers.
pub fn command_route(id: CommandId) -> String {
    format!("{}/{}", COMMANDS_ROUTE, id)
}

/////////////////////////////////////////////// AppState ///////////////////////////////////////////////

/// Shared, immutable dependencies of every handler.
#[derive(Clone)]
pub struct AppState {
    /// The single source of truth for commands.
    pub repository: Arc<dyn CommandRepository>,
    /// Mapping rules built once at startup.
    pub mapper: Arc<Mapper>,
}

impl AppState {
    /// Bundles a repository and a mapper.
    pub fn new(repository: Arc<dyn CommandRepository>, mapper: Arc<Mapper>) -> Self {
        Self { repository, mapper }
    }
}

/////////////////////////////////////////////// ApiError ///////////////////////////////////////////////

/// Errors returned by command handlers.
#[derive(Debug, Error)]
pub enum ApiError {
    /// No command has the requested identifier. Rendered as a bare 404.
    #[error("command not found")]
    NotFound,
    /// The request was malformed or failed validation.
    #[error("bad request: {0}")]
    BadRequest(String),
    /// Storage or mapping failed; details are logged and not sent to the client.
    #[error("internal error: {0}")]
    Internal(String),
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    error: String,
    status: u16,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::NotFound => return StatusCode::NOT_FOUND.into_response(),
            ApiError::BadRequest(message) => (StatusCode::BAD_REQUEST, message),
            ApiError::Internal(detail) => {
                tracing::error!(error = %detail, "request failed");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal server error".to_string(),
                )
            }
        };
        let body = ErrorBody {
            error: message,
            status: status.as_u16(),
        };
        (status, Json(body)).into_response()
    }
}

impl From<RepositoryError> for ApiError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::NotFound => ApiError::NotFound,
            other => ApiError::Internal(other.to_string()),
        }
    }
}

impl From<MappingError> for ApiError {
    fn from(err: MappingError) -> Self {
        ApiError::Internal(err.to_string())
    }
}

impl From<ValidationError> for ApiError {
    fn from(err: ValidationError) -> Self {
        ApiError::BadRequest(err.to_string())
    }
}

/////////////////////////////////////////////// DtoBody ////////////////////////////////////////////////

/// Extracts a request body as JSON, or as YAML when the `Content-Type` names yaml.
pub struct DtoBody<T>(pub T);

#[async_trait]
impl<S, T> FromRequest<S> for DtoBody<T>
where
    S: Send + Sync,
    T: DeserializeOwned,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let is_yaml = req
            .headers()
            .get(header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .is_some_and(|ct| ct.contains("yaml") || ct.contains("yml"));

        let bytes = Bytes::from_request(req, state)
            .await
            .map_err(|_| ApiError::BadRequest("failed to read request body".to_string()))?;

        let value = if is_yaml {
            serde_yml::from_slice::<T>(&bytes)
                .map_err(|e| ApiError::BadRequest(format!("invalid yaml: {}", e)))?
        } else {
            serde_json::from_slice::<T>(&bytes)
                .map_err(|e| ApiError::BadRequest(format!("invalid json: {}", e)))?
        };

        Ok(DtoBody(value))
    }
}

////////////////////////////////////////////// Handlers ////////////////////////////////////////////////

/// Response of a successful create: 201, a `Location` header, and the new resource.
pub type Created<T> = (StatusCode, [(HeaderName, String); 1], Json<T>);

/// Lists all commands.
pub async fn get_all_commands(
    State(state): State<AppState>,
) -> Result<Json<Vec<CommandReadDto>>, ApiError> {
    let commands = state.repository.get_all_commands().await?;
    let dtos = state.mapper.map_all::<Command, CommandReadDto>(&commands)?;
    tracing::debug!(count = dtos.len(), "listed commands");
    Ok(Json(dtos))
}

/// Gets a command by identifier.
pub async fn get_command_by_id(
    State(state): State<AppState>,
    Path(id): Path<CommandId>,
) -> Result<Json<CommandReadDto>, ApiError> {
    let command = state.repository.get_command_by_id(id).await?;
    match state
        .mapper
        .map_option::<Command, CommandReadDto>(command.as_ref())?
    {
        Some(dto) => Ok(Json(dto)),
        None => {
            tracing::warn!(%id, "command not found");
            Err(ApiError::NotFound)
        }
    }
}

/// Creates a command; the store assigns its identifier.
pub async fn create_command(
    State(state): State<AppState>,
    DtoBody(dto): DtoBody<CommandCreateDto>,
) -> Result<Created<CommandReadDto>, ApiError> {
    dto.validate()?;
    let new_command: NewCommand = state.mapper.map(&dto)?;
    let command = state.repository.create_command(new_command).await?;
    let read: CommandReadDto = state.mapper.map(&command)?;
    tracing::debug!(id = %command.id, "created command");
    Ok((
        StatusCode::CREATED,
        [(header::LOCATION, command_route(command.id))],
        Json(read),
    ))
}

/// Replaces every field of an existing command.
pub async fn update_command(
    State(state): State<AppState>,
    Path(id): Path<CommandId>,
    DtoBody(dto): DtoBody<CommandUpdateDto>,
) -> Result<StatusCode, ApiError> {
    let Some(mut command) = state.repository.get_command_by_id(id).await? else {
        tracing::warn!(%id, "update of missing command");
        return Err(ApiError::NotFound);
    };
    dto.validate()?;
    state.mapper.map_onto(&dto, &mut command)?;
    if !state.repository.update_command(&command).await? {
        tracing::warn!(%id, "command vanished during update");
        return Err(ApiError::NotFound);
    }
    tracing::debug!(%id, "updated command");
    Ok(StatusCode::NO_CONTENT)
}

/// Applies a JSON Patch document to the update shape of an existing command.
///
/// The patch is applied to a copy; the stored command changes only when the whole patch
/// applies and the result validates.
pub async fn partial_command_update(
    State(state): State<AppState>,
    Path(id): Path<CommandId>,
    DtoBody(patch): DtoBody<json_patch::Patch>,
) -> Result<StatusCode, ApiError> {
    let Some(mut command) = state.repository.get_command_by_id(id).await? else {
        tracing::warn!(%id, "patch of missing command");
        return Err(ApiError::NotFound);
    };

    let to_patch: CommandUpdateDto = state.mapper.map(&command)?;
    let patched = apply_patch(&to_patch, &patch)?;
    patched.validate()?;

    state.mapper.map_onto(&patched, &mut command)?;
    if !state.repository.update_command(&command).await? {
        tracing::warn!(%id, "command vanished during patch");
        return Err(ApiError::NotFound);
    }
    tracing::debug!(%id, operations = patch.0.len(), "patched command");
    Ok(StatusCode::NO_CONTENT)
}

fn apply_patch(
    dto: &CommandUpdateDto,
    patch: &json_patch::Patch,
) -> Result<CommandUpdateDto, ApiError> {
    let mut document =
        serde_json::to_value(dto).map_err(|e| ApiError::Internal(e.to_string()))?;
    json_patch::patch(&mut document, &patch.0)
        .map_err(|e| ApiError::BadRequest(format!("failed to apply patch: {}", e)))?;

    // `add` may create members the update shape does not have.
    if let Value::Object(fields) = &document {
        if let Some(unknown) = fields
            .keys()
            .find(|k| !matches!(k.as_str(), "howTo" | "platform" | "commandLine"))
        {
            return Err(ApiError::BadRequest(format!(
                "patch targets unknown field {:?}",
                unknown
            )));
        }
    }

    serde_json::from_value(document)
        .map_err(|e| ApiError::BadRequest(format!("patched document is invalid: {}", e)))
}

/// Deletes a command.
///
/// Answers 204 when a command was deleted and 200 when there was nothing to delete.
pub async fn delete_command(
    State(state): State<AppState>,
    Path(id): Path<CommandId>,
) -> Result<StatusCode, ApiError> {
    if state.repository.delete_command(id).await? {
        tracing::debug!(%id, "deleted command");
        Ok(StatusCode::NO_CONTENT)
    } else {
        tracing::warn!(%id, "delete of missing command");
        Ok(StatusCode::OK)
    }
}

////////////////////////////////////////////// Router //////////////////////////////////////////////////

/// Creates an Axum router with the command endpoints mounted under [`COMMANDS_ROUTE`].
pub fn create_command_router(state: AppState) -> Router {
    Router::new()
        .route(COMMANDS_ROUTE, get(get_all_commands).post(create_command))
        .route(
            "/api/commands/:id",
            get(get_command_by_id)
                .put(update_command)
                .patch(partial_command_update)
                .delete(delete_command),
        )
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{InMemoryCommandRepository, command_mapper};

    fn state_with(repository: InMemoryCommandRepository) -> AppState {
        AppState::new(Arc::new(repository), Arc::new(command_mapper()))
    }

    fn get_commands(num: usize) -> InMemoryCommandRepository {
        InMemoryCommandRepository::with_commands(
            std::iter::repeat_with(|| {
                NewCommand::new(
                    "How to generate a migration",
                    ".Net Core EF",
                    "dotnet ef migrations add <Name of Migration>",
                )
            })
            .take(num),
        )
    }

    fn mock_store() -> InMemoryCommandRepository {
        InMemoryCommandRepository::with_commands([NewCommand::new("Mock", "Mock", "Mock")])
    }

    fn patch_from(value: Value) -> json_patch::Patch {
        serde_json::from_value(value).unwrap()
    }

    #[tokio::test]
    async fn get_all_commands_returns_empty_list_when_db_is_empty() {
        let state = state_with(get_commands(0));
        let Json(commands) = get_all_commands(State(state)).await.unwrap();
        assert!(commands.is_empty());
    }

    #[tokio::test]
    async fn get_all_commands_returns_one_item_when_db_has_one_resource() {
        let state = state_with(get_commands(1));
        let Json(commands) = get_all_commands(State(state)).await.unwrap();
        assert_eq!(commands.len(), 1);
        assert_eq!(commands[0].platform, ".Net Core EF");
    }

    #[tokio::test]
    async fn get_command_by_id_returns_not_found_for_missing_id() {
        let state = state_with(get_commands(0));
        let result = get_command_by_id(State(state), Path(CommandId::new(1))).await;
        assert!(matches!(result, Err(ApiError::NotFound)));
    }

    #[tokio::test]
    async fn get_command_by_id_returns_read_dto_for_valid_id() {
        let state = state_with(mock_store());
        let Json(dto) = get_command_by_id(State(state), Path(CommandId::new(1)))
            .await
            .unwrap();
        assert_eq!(
            dto,
            CommandReadDto {
                id: CommandId::new(1),
                how_to: "Mock".to_string(),
                platform: "Mock".to_string(),
                command_line: "Mock".to_string(),
            }
        );
    }

    #[tokio::test]
    async fn create_command_returns_created_at_route() {
        let state = state_with(mock_store());
        let (status, [(name, location)], Json(dto)) =
            create_command(State(state), DtoBody(CommandCreateDto::default()))
                .await
                .unwrap();
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(name, header::LOCATION);
        assert_eq!(dto.id, CommandId::new(2));
        assert_eq!(location, "/api/commands/2");
    }

    #[tokio::test]
    async fn create_command_rejects_overlong_how_to() {
        let state = state_with(get_commands(0));
        let dto = CommandCreateDto {
            how_to: "x".repeat(crate::MAX_HOW_TO_CHARS + 1),
            ..Default::default()
        };
        let result = create_command(State(state.clone()), DtoBody(dto)).await;
        assert!(matches!(result, Err(ApiError::BadRequest(_))));
        assert!(state.repository.get_all_commands().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn update_command_returns_no_content_for_valid_object() {
        let state = state_with(mock_store());
        let status = update_command(
            State(state.clone()),
            Path(CommandId::new(1)),
            DtoBody(CommandUpdateDto::default()),
        )
        .await
        .unwrap();
        assert_eq!(status, StatusCode::NO_CONTENT);

        let stored = state
            .repository
            .get_command_by_id(CommandId::new(1))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(stored.how_to, "");
        assert_eq!(stored.id, CommandId::new(1));
    }

    #[tokio::test]
    async fn update_command_returns_not_found_for_missing_resource() {
        let state = state_with(get_commands(0));
        let result = update_command(
            State(state),
            Path(CommandId::new(0)),
            DtoBody(CommandUpdateDto::default()),
        )
        .await;
        assert!(matches!(result, Err(ApiError::NotFound)));
    }

    #[tokio::test]
    async fn partial_update_returns_not_found_for_missing_resource() {
        let state = state_with(get_commands(0));
        let result = partial_command_update(
            State(state),
            Path(CommandId::new(0)),
            DtoBody(patch_from(serde_json::json!([]))),
        )
        .await;
        assert!(matches!(result, Err(ApiError::NotFound)));
    }

    #[tokio::test]
    async fn partial_update_replaces_single_field() {
        let state = state_with(mock_store());
        let patch = patch_from(serde_json::json!([
            {"op": "replace", "path": "/commandLine", "value": "patched"}
        ]));
        let status = partial_command_update(State(state.clone()), Path(CommandId::new(1)), DtoBody(patch))
            .await
            .unwrap();
        assert_eq!(status, StatusCode::NO_CONTENT);

        let stored = state
            .repository
            .get_command_by_id(CommandId::new(1))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(stored.command_line, "patched");
        assert_eq!(stored.how_to, "Mock");
        assert_eq!(stored.platform, "Mock");
    }

    #[tokio::test]
    async fn partial_update_rejects_missing_path_and_leaves_resource_unchanged() {
        let state = state_with(mock_store());
        let patch = patch_from(serde_json::json!([
            {"op": "replace", "path": "/howTo", "value": "first"},
            {"op": "replace", "path": "/doesNotExist", "value": "x"}
        ]));
        let result =
            partial_command_update(State(state.clone()), Path(CommandId::new(1)), DtoBody(patch))
                .await;
        assert!(matches!(result, Err(ApiError::BadRequest(_))));

        let stored = state
            .repository
            .get_command_by_id(CommandId::new(1))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(stored.how_to, "Mock");
    }

    #[tokio::test]
    async fn partial_update_rejects_added_unknown_field() {
        let state = state_with(mock_store());
        let patch = patch_from(serde_json::json!([
            {"op": "add", "path": "/id", "value": 77}
        ]));
        let result =
            partial_command_update(State(state), Path(CommandId::new(1)), DtoBody(patch)).await;
        assert!(matches!(result, Err(ApiError::BadRequest(_))));
    }

    #[tokio::test]
    async fn delete_command_returns_no_content_for_valid_id() {
        let state = state_with(mock_store());
        let status = delete_command(State(state.clone()), Path(CommandId::new(1)))
            .await
            .unwrap();
        assert_eq!(status, StatusCode::NO_CONTENT);
        assert!(state.repository.get_all_commands().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn delete_command_returns_ok_for_missing_resource() {
        let state = state_with(get_commands(0));
        let status = delete_command(State(state), Path(CommandId::new(0)))
            .await
            .unwrap();
        assert_eq!(status, StatusCode::OK);
    }

    #[test]
    fn not_found_has_no_body() {
        let response = ApiError::NotFound.into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert!(response.headers().get(header::CONTENT_TYPE).is_none());
    }

    #[test]
    fn repository_errors_become_internal() {
        let err: ApiError = RepositoryError::Internal("db down".to_string()).into();
        assert!(matches!(err, ApiError::Internal(_)));
        assert_eq!(
            err.into_response().status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
