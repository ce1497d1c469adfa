//! # Command Records
//!
//! A [`Command`] is one invocable overload: a path of [`Segment`]s, an
//! ordered list of [`Parameter`]s, opaque [`Extensions`] and a handler.
//! Commands are immutable once built; the store only ever holds them behind
//! an `Arc`.
//!
//! Commands are declared explicitly, through [`Command::builder`] or the
//! `#[command]` attribute, and nested with [`Group`].
//!
//! ```rust,ignore
//! let ban = Command::builder("ban")
//!     .alias("b")
//!     .parameter(Parameter::of::<u64>("user"))
//!     .parameter(Parameter::of::<String>("reason").remainder())
//!     .handler(ban_handler)
//!     .build()?;
//!
//! let commands = Group::new("mod").alias("m").command(ban).flatten()?;
//! ```

use crate::{
    error::BuildError,
    extensions::Extensions,
    handler::{DynHandler, Handler},
    overrides::{Overrides, ParameterOverride},
    path::Path,
};
use bitflags::bitflags;
use std::{any::TypeId, collections::HashSet, fmt, sync::Arc};

fn validate_name(name: &str) -> Result<(), BuildError> {
    if name.is_empty() {
        return Err(BuildError::EmptyName);
    }
    if name.chars().any(char::is_whitespace) {
        return Err(BuildError::InvalidName(name.to_owned()));
    }
    Ok(())
}

/// One level of a command path: a declared name and its aliases.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Segment {
    name: Path,
    aliases: Vec<Path>,
}

impl Segment {
    /// A segment with no aliases.
    pub fn new(name: impl Into<Path>) -> Self {
        Self {
            name: name.into(),
            aliases: Vec::new(),
        }
    }

    /// Add an alias. Duplicates of the name or an existing alias are ignored.
    pub fn alias(mut self, alias: impl Into<Path>) -> Self {
        self.push_alias(alias.into());
        self
    }

    fn push_alias(&mut self, alias: Path) {
        if alias != self.name && !self.aliases.contains(&alias) {
            self.aliases.push(alias);
        }
    }

    /// The declared name.
    pub fn name(&self) -> &Path {
        &self.name
    }

    /// The aliases, excluding the declared name.
    pub fn aliases(&self) -> &[Path] {
        &self.aliases
    }

    /// Every spelling that selects this segment; the declared name first.
    pub fn alternatives(&self) -> impl Iterator<Item = &Path> {
        std::iter::once(&self.name).chain(self.aliases.iter())
    }

    fn validate(&self) -> Result<(), BuildError> {
        self.alternatives()
            .try_for_each(|alternative| validate_name(alternative.as_str()))
    }
}

bitflags! {
    /// Binding behavior of a [`Parameter`].
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct ParameterFlags: u8 {
        /// Left unbound when no token remains for it.
        const OPTIONAL = 1;
        /// Consumes the unconsumed remainder of the raw input.
        const REMAINDER = 1 << 1;
    }
}

/// One formal argument of a command.
#[derive(Clone, Debug)]
pub struct Parameter {
    name: String,
    type_id: TypeId,
    type_name: &'static str,
    flags: ParameterFlags,
    overrides: Overrides,
}

impl Parameter {
    /// A required parameter binding values of type `T`.
    pub fn of<T: Send + Sync + 'static>(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            type_id: TypeId::of::<T>(),
            type_name: std::any::type_name::<T>(),
            flags: ParameterFlags::empty(),
            overrides: Overrides::new(),
        }
    }

    /// Mark the parameter optional.
    pub fn optional(mut self) -> Self {
        self.flags |= ParameterFlags::OPTIONAL;
        self
    }

    /// Mark the parameter as the remainder parameter.
    pub fn remainder(mut self) -> Self {
        self.flags |= ParameterFlags::REMAINDER;
        self
    }

    /// Attach a binder override.
    pub fn with_override(mut self, entry: ParameterOverride) -> Self {
        self.overrides.insert(entry);
        self
    }

    /// The parameter name, unique within its command.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The declared value type.
    pub fn type_id(&self) -> TypeId {
        self.type_id
    }

    /// The declared value type's name.
    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    /// Binding flags.
    pub fn flags(&self) -> ParameterFlags {
        self.flags
    }

    /// Whether the parameter may stay unbound.
    pub fn is_optional(&self) -> bool {
        self.flags.contains(ParameterFlags::OPTIONAL)
    }

    /// Whether the parameter absorbs the remaining input.
    pub fn is_remainder(&self) -> bool {
        self.flags.contains(ParameterFlags::REMAINDER)
    }

    /// Binder overrides.
    pub fn overrides(&self) -> &Overrides {
        &self.overrides
    }
}

/// One invocable command overload.
pub struct Command {
    path: Vec<Segment>,
    parameters: Vec<Parameter>,
    extensions: Extensions,
    handler: Arc<dyn DynHandler>,
}

impl Command {
    /// Start declaring a command named `name`.
    pub fn builder(name: impl Into<Path>) -> CommandBuilder {
        CommandBuilder {
            segment: Segment::new(name),
            parameters: Vec::new(),
            extensions: Extensions::new(),
            handler: None,
        }
    }

    /// The declared path, one segment per level.
    pub fn segments(&self) -> &[Segment] {
        &self.path
    }

    /// The declared names joined with spaces, e.g. `mod ban`.
    pub fn name(&self) -> Path {
        self.path
            .iter()
            .fold(Path::empty(), |acc, segment| Path::combine(&acc, segment.name()))
    }

    /// Every full spelling of this command's path.
    ///
    /// The product of each segment's alternatives; the first entry is the
    /// declared name at every level.
    pub fn alias_paths(&self) -> Vec<Vec<Path>> {
        let mut paths = vec![Vec::new()];
        for segment in &self.path {
            paths = paths
                .into_iter()
                .flat_map(|prefix: Vec<Path>| {
                    segment.alternatives().map(move |alternative| {
                        let mut path = prefix.clone();
                        path.push(alternative.clone());
                        path
                    })
                })
                .collect();
        }
        paths
    }

    /// Number of path levels.
    pub fn depth(&self) -> usize {
        self.path.len()
    }

    /// The formal parameters, in declared order.
    pub fn parameters(&self) -> &[Parameter] {
        &self.parameters
    }

    /// Opaque metadata attached at declaration.
    pub fn extensions(&self) -> &Extensions {
        &self.extensions
    }

    /// The handler invoked when this overload is selected.
    pub fn handler(&self) -> &Arc<dyn DynHandler> {
        &self.handler
    }

    /// Nest this command under `segment`.
    pub fn prefixed(mut self, segment: Segment) -> Self {
        self.path.insert(0, segment);
        self
    }
}

impl fmt::Debug for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Command")
            .field("path", &self.path)
            .field("parameters", &self.parameters)
            .field("extensions", &self.extensions)
            .finish_non_exhaustive()
    }
}

/// Validating builder for [`Command`].
pub struct CommandBuilder {
    segment: Segment,
    parameters: Vec<Parameter>,
    extensions: Extensions,
    handler: Option<Arc<dyn DynHandler>>,
}

impl CommandBuilder {
    /// Add an alias for the command name.
    pub fn alias(mut self, alias: impl Into<Path>) -> Self {
        self.segment.push_alias(alias.into());
        self
    }

    /// Append a parameter.
    pub fn parameter(mut self, parameter: Parameter) -> Self {
        self.parameters.push(parameter);
        self
    }

    /// Attach extension data.
    pub fn extension<T: Send + Sync + 'static>(mut self, value: T) -> Self {
        self.extensions.insert(value);
        self
    }

    /// Set the handler.
    pub fn handler<H: Handler>(mut self, handler: H) -> Self {
        self.handler = Some(Arc::new(handler));
        self
    }

    /// Set an already type-erased handler.
    pub fn dyn_handler(mut self, handler: Arc<dyn DynHandler>) -> Self {
        self.handler = Some(handler);
        self
    }

    /// Validate and build.
    pub fn build(self) -> Result<Command, BuildError> {
        self.segment.validate()?;
        let command = self.segment.name().to_string();

        let mut seen = HashSet::new();
        for (index, parameter) in self.parameters.iter().enumerate() {
            if parameter.name.is_empty() {
                return Err(BuildError::EmptyName);
            }
            if !seen.insert(parameter.name.as_str()) {
                return Err(BuildError::DuplicateParameter {
                    command,
                    parameter: parameter.name.clone(),
                });
            }
            if parameter.is_remainder() && index + 1 != self.parameters.len() {
                return Err(BuildError::RemainderNotLast {
                    command,
                    parameter: parameter.name.clone(),
                });
            }
        }

        let handler = self
            .handler
            .ok_or_else(|| BuildError::MissingHandler(command.clone()))?;

        Ok(Command {
            path: vec![self.segment],
            parameters: self.parameters,
            extensions: self.extensions,
            handler,
        })
    }
}

/// A named level that nests commands and other groups.
#[derive(Debug)]
pub struct Group {
    segment: Segment,
    commands: Vec<Command>,
    groups: Vec<Group>,
}

impl Group {
    /// A group named `name`.
    pub fn new(name: impl Into<Path>) -> Self {
        Self {
            segment: Segment::new(name),
            commands: Vec::new(),
            groups: Vec::new(),
        }
    }

    /// Add an alias for the group name.
    pub fn alias(mut self, alias: impl Into<Path>) -> Self {
        self.segment.push_alias(alias.into());
        self
    }

    /// Add a command.
    pub fn command(mut self, command: Command) -> Self {
        self.commands.push(command);
        self
    }

    /// Add a nested group.
    pub fn group(mut self, group: Group) -> Self {
        self.groups.push(group);
        self
    }

    /// Every contained command with this group's segment prefixed.
    pub fn flatten(self) -> Result<Vec<Command>, BuildError> {
        self.segment.validate()?;
        let mut commands = self.commands;
        for group in self.groups {
            commands.extend(group.flatten()?);
        }
        Ok(commands
            .into_iter()
            .map(|command| command.prefixed(self.segment.clone()))
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{handler::Invocation, reply::Reply};

    async fn noop(_: Invocation) -> Reply {
        Reply::empty()
    }

    #[test]
    fn test_alias_dedup() {
        let segment = Segment::new("help").alias("h").alias("H").alias("HELP");
        assert_eq!(segment.aliases(), &[Path::new("h")]);
        assert_eq!(segment.alternatives().count(), 2);
    }

    #[test]
    fn test_builder_validation() {
        assert_eq!(
            Command::builder("").handler(noop).build().unwrap_err(),
            BuildError::EmptyName
        );
        assert_eq!(
            Command::builder("a b").handler(noop).build().unwrap_err(),
            BuildError::InvalidName("a b".into())
        );
        assert_eq!(
            Command::builder("x").build().unwrap_err(),
            BuildError::MissingHandler("x".into())
        );

        let err = Command::builder("x")
            .parameter(Parameter::of::<i32>("n"))
            .parameter(Parameter::of::<i32>("n"))
            .handler(noop)
            .build()
            .unwrap_err();
        assert!(matches!(err, BuildError::DuplicateParameter { .. }));

        let err = Command::builder("x")
            .parameter(Parameter::of::<String>("rest").remainder())
            .parameter(Parameter::of::<i32>("n"))
            .handler(noop)
            .build()
            .unwrap_err();
        assert!(matches!(err, BuildError::RemainderNotLast { .. }));
    }

    #[test]
    fn test_group_alias_product() {
        let ban = Command::builder("ban")
            .alias("b")
            .handler(noop)
            .build()
            .unwrap();
        let commands = Group::new("mod").alias("m").command(ban).flatten().unwrap();
        assert_eq!(commands.len(), 1);

        let command = &commands[0];
        assert_eq!(command.name(), Path::new("mod ban"));
        assert_eq!(command.depth(), 2);

        let paths: Vec<String> = command
            .alias_paths()
            .into_iter()
            .map(|p| p.iter().map(Path::as_str).collect::<Vec<_>>().join(" "))
            .collect();
        assert_eq!(paths, ["mod ban", "mod b", "m ban", "m b"]);
    }

    #[test]
    fn test_nested_groups() {
        let list = Command::builder("list").handler(noop).build().unwrap();
        let commands = Group::new("admin")
            .group(Group::new("roles").command(list))
            .flatten()
            .unwrap();
        assert_eq!(commands[0].name(), Path::new("admin roles list"));
    }

    #[test]
    fn test_parameter_flags() {
        let p = Parameter::of::<String>("text").optional().remainder();
        assert!(p.is_optional());
        assert!(p.is_remainder());
        assert_eq!(p.type_id(), TypeId::of::<String>());
        assert!(
            Parameter::of::<u8>("n")
                .with_override(ParameterOverride::NumberStyle(
                    crate::overrides::NumberStyle::HEX_NUMBER
                ))
                .overrides()
                .number_style()
                .is_some()
        );
    }
}
