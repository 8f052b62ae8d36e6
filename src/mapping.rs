//! # Entity/DTO Mapping
//!
//! Declarative projection rules between [`Command`] and its DTO shapes.
//!
//! A [`MapperConfiguration`] collects the pairs declared by one or more [`MappingProfile`]s and
//! is frozen into an immutable [`Mapper`] at startup. The mapper is shared by reference (usually
//! inside an `Arc`) with everything that needs to convert between shapes; there is no global
//! mapping state.
//!
//! Field rules are plain name-for-name copies expressed through [`MapFrom`] (build a new value)
//! and [`MapOnto`] (overwrite the matching fields of an existing value). A pair may only be
//! mapped once a profile has declared it; asking for anything else yields
//! [`MappingError::UnregisteredMap`].
//!
//! ```rust
//! # use command_api::{Command, CommandId, CommandReadDto, NewCommand, MapperConfiguration, CommandsProfile};
//! let mapper = MapperConfiguration::new().add_profile(CommandsProfile).build();
//!
//! let command = NewCommand::new("Mock", "Mock", "Mock").with_id(CommandId::new(1));
//! let dto: CommandReadDto = mapper.map(&command).unwrap();
//! assert_eq!(dto.id, CommandId::new(1));
//! assert_eq!(dto.how_to, "Mock");
//! ```

use std::any::{TypeId, type_name};
use std::collections::HashSet;

use thiserror::Error;

use crate::{Command, CommandCreateDto, CommandReadDto, CommandUpdateDto, NewCommand};

/// Builds `Self` from a source value by copying identically named fields.
pub trait MapFrom<S>: Sized {
    /// Projects `source` into a new value.
    fn map_from(source: &S) -> Self;
}

/// Copies the identically named fields of `self` onto an existing target.
///
/// Fields that only exist on the target are left untouched.
pub trait MapOnto<T> {
    /// Overwrites the shared fields of `target`.
    fn map_onto(&self, target: &mut T);
}

/// Errors produced by [`Mapper`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MappingError {
    /// No registered profile declares a map between the two types.
    #[error("no mapping registered from {from} to {to}")]
    UnregisteredMap {
        /// Source type name.
        from: &'static str,
        /// Target type name.
        to: &'static str,
    },
}

/// A set of map declarations that can be added to a [`MapperConfiguration`].
pub trait MappingProfile {
    /// Declares this profile's maps on `config`.
    fn configure(&self, config: &mut MapperConfiguration);
}

/// Mutable collection of declared maps; call [`MapperConfiguration::build`] to freeze it.
#[derive(Debug, Default)]
pub struct MapperConfiguration {
    maps: HashSet<(TypeId, TypeId)>,
}

impl MapperConfiguration {
    /// Creates a configuration with no maps declared.
    pub fn new() -> Self {
        Self::default()
    }

    /// Declares that values of `S` may be mapped to `T`.
    pub fn create_map<S: 'static, T: 'static>(&mut self) -> &mut Self {
        self.maps.insert((TypeId::of::<S>(), TypeId::of::<T>()));
        self
    }

    /// Adds every map declared by `profile`.
    pub fn add_profile(mut self, profile: impl MappingProfile) -> Self {
        profile.configure(&mut self);
        self
    }

    /// Freezes the configuration into an immutable mapper.
    pub fn build(self) -> Mapper {
        Mapper { maps: self.maps }
    }
}

/// Immutable mapper built once at startup.
#[derive(Debug, Clone)]
pub struct Mapper {
    maps: HashSet<(TypeId, TypeId)>,
}

impl Mapper {
    /// Returns true when a profile declared a map from `S` to `T`.
    pub fn is_registered<S: 'static, T: 'static>(&self) -> bool {
        self.maps.contains(&(TypeId::of::<S>(), TypeId::of::<T>()))
    }

    fn ensure_registered<S: 'static, T: 'static>(&self) -> Result<(), MappingError> {
        if self.is_registered::<S, T>() {
            Ok(())
        } else {
            Err(MappingError::UnregisteredMap {
                from: type_name::<S>(),
                to: type_name::<T>(),
            })
        }
    }

    /// Maps `source` into a new `T`.
    pub fn map<S: 'static, T: MapFrom<S> + 'static>(&self, source: &S) -> Result<T, MappingError> {
        self.ensure_registered::<S, T>()?;
        Ok(T::map_from(source))
    }

    /// Maps an optional source; an absent source maps to an absent result.
    pub fn map_option<S: 'static, T: MapFrom<S> + 'static>(
        &self,
        source: Option<&S>,
    ) -> Result<Option<T>, MappingError> {
        self.ensure_registered::<S, T>()?;
        Ok(source.map(T::map_from))
    }

    /// Maps every element of `sources`, preserving order.
    pub fn map_all<S: 'static, T: MapFrom<S> + 'static>(
        &self,
        sources: &[S],
    ) -> Result<Vec<T>, MappingError> {
        self.ensure_registered::<S, T>()?;
        Ok(sources.iter().map(T::map_from).collect())
    }

    /// Overwrites the shared fields of `target` with those of `source`.
    pub fn map_onto<S: MapOnto<T> + 'static, T: 'static>(
        &self,
        source: &S,
        target: &mut T,
    ) -> Result<(), MappingError> {
        self.ensure_registered::<S, T>()?;
        source.map_onto(target);
        Ok(())
    }
}

/////////////////////////////////////////// CommandsProfile ///////////////////////////////////////////

/// Maps between [`Command`] and the command DTOs.
#[derive(Debug, Clone, Copy, Default)]
pub struct CommandsProfile;

impl MappingProfile for CommandsProfile {
    fn configure(&self, config: &mut MapperConfiguration) {
        config
            .create_map::<Command, CommandReadDto>()
            .create_map::<CommandReadDto, Command>()
            .create_map::<CommandCreateDto, NewCommand>()
            .create_map::<CommandUpdateDto, Command>()
            .create_map::<Command, CommandUpdateDto>();
    }
}

/// Builds the mapper used by the command API.
pub fn command_mapper() -> Mapper {
    MapperConfiguration::new().add_profile(CommandsProfile).build()
}

impl MapFrom<Command> for CommandReadDto {
    fn map_from(source: &Command) -> Self {
        CommandReadDto {
            id: source.id,
            how_to: source.how_to.clone(),
            platform: source.platform.clone(),
            command_line: source.command_line.clone(),
        }
    }
}

impl MapFrom<CommandReadDto> for Command {
    fn map_from(source: &CommandReadDto) -> Self {
        Command {
            id: source.id,
            how_to: source.how_to.clone(),
            platform: source.platform.clone(),
            command_line: source.command_line.clone(),
        }
    }
}

impl MapFrom<CommandCreateDto> for NewCommand {
    fn map_from(source: &CommandCreateDto) -> Self {
        NewCommand {
            how_to: source.how_to.clone(),
            platform: source.platform.clone(),
            command_line: source.command_line.clone(),
        }
    }
}

impl MapFrom<Command> for CommandUpdateDto {
    fn map_from(source: &Command) -> Self {
        CommandUpdateDto {
            how_to: source.how_to.clone(),
            platform: source.platform.clone(),
            command_line: source.command_line.clone(),
        }
    }
}

// The update DTO has no id, so a fresh Command would carry the default one.
impl MapFrom<CommandUpdateDto> for Command {
    fn map_from(source: &CommandUpdateDto) -> Self {
        let mut command = Command::default();
        source.map_onto(&mut command);
        command
    }
}

impl MapOnto<Command> for CommandUpdateDto {
    fn map_onto(&self, target: &mut Command) {
        target.how_to.clone_from(&self.how_to);
        target.platform.clone_from(&self.platform);
        target.command_line.clone_from(&self.command_line);
    }
}
