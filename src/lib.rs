//! # command-api: A Catalogue of Command Lines
//!
//! Developers forget command lines. This crate serves a small catalogue of them over HTTP:
//! each entry records *how to* do something, the *platform* it applies to, and the
//! *command line* that does it. Entries can be listed, fetched, created, replaced, patched
//! with RFC 6902 JSON Patch documents, and deleted.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │ HTTP API Layer (Axum routes)            │  controller
//! ├─────────────────────────────────────────┤
//! │ DTOs and mapping profile                │  dto, mapping
//! ├─────────────────────────────────────────┤
//! │ Repository (trait-based abstraction)    │  repository
//! ├─────────────────────────────────────────┤
//! │ Persistence (in memory or PostgreSQL)   │  sql
//! └─────────────────────────────────────────┘
//! ```
//!
//! The controller never touches storage types directly. It converts between the wire shapes in
//! [`dto`] and the stored [`Command`] with a [`Mapper`] built once at startup, and it reads and
//! writes through an `Arc<dyn CommandRepository>`.
//!
//! ## Usage
//!
//! ```rust
//! # use std::sync::Arc;
//! # use command_api::{AppState, InMemoryCommandRepository, command_mapper, create_command_router};
//! let state = AppState::new(
//!     Arc::new(InMemoryCommandRepository::new()),
//!     Arc::new(command_mapper()),
//! );
//! let app: axum::Router = create_command_router(state);
//! ```
//!
//! ## HTTP API
//!
//! | Method | Path                | Description                          |
//! |--------|---------------------|--------------------------------------|
//! | GET    | `/api/commands`     | List all commands                    |
//! | GET    | `/api/commands/:id` | Get one command                      |
//! | POST   | `/api/commands`     | Create a command                     |
//! | PUT    | `/api/commands/:id` | Replace a command                    |
//! | PATCH  | `/api/commands/:id` | Apply a JSON Patch to a command      |
//! | DELETE | `/api/commands/:id` | Delete a command                     |
//!
//! Request bodies may be JSON or, with a yaml `Content-Type`, YAML.

#![deny(missing_docs)]

mod command;
mod config;
mod controller;
mod dto;
mod errors;
mod mapping;
mod repository;

/// Output and exit helpers for the command-line tools.
pub mod cli_utils;
/// HTTP client for the command API.
pub mod http_utils;
/// PostgreSQL persistence.
pub mod sql;

pub use command::{Command, CommandId, NewCommand};
pub use config::{
    DATABASE_URL_ENV, DEFAULT_HOST, DEFAULT_LOG_FILTER, DEFAULT_PORT, ServerArgs, ServerConfig,
    StorageBackend,
};
pub use controller::{
    ApiError, AppState, COMMANDS_ROUTE, Created, DtoBody, command_route, create_command,
    create_command_router, delete_command, get_all_commands, get_command_by_id,
    partial_command_update, update_command,
};
pub use dto::{
    CommandCreateDto, CommandReadDto, CommandUpdateDto, MAX_HOW_TO_CHARS, ValidationError,
};
pub use errors::RepositoryError;
pub use mapping::{
    CommandsProfile, MapFrom, MapOnto, Mapper, MapperConfiguration, MappingError,
    MappingProfile, command_mapper,
};
pub use repository::{CommandRepository, InMemoryCommandRepository};
