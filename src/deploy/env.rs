//! Binding the variables a descriptor references.
//!
//! Values come from the process environment, layered over an optional
//! `.env` file; the process environment wins. Binding either yields every
//! referenced variable or fails listing all of the missing ones, before any
//! orchestrator command can be built.

use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;

use super::StackError;
use super::descriptor::Descriptor;

/// Names whose values are never printed.
fn is_secret(name: &str) -> bool {
    name.contains("PASSWORD") || name.contains("SECRET")
}

fn is_port(name: &str) -> bool {
    name.ends_with("_PORT")
}

fn validate_port(name: &str, value: &str) -> Result<(), StackError> {
    match value.parse::<u16>() {
        Ok(port) if port > 0 => Ok(()),
        _ => Err(StackError::InvalidPort {
            name: name.to_string(),
            value: value.to_string(),
        }),
    }
}

/// Reads `KEY=VALUE` pairs from an env file without touching the process
/// environment. A missing file yields an empty map.
pub fn read_env_file(path: &Path) -> Result<BTreeMap<String, String>, StackError> {
    if !path.exists() {
        return Ok(BTreeMap::new());
    }

    let to_err = |source| StackError::EnvFile {
        path: path.to_path_buf(),
        source,
    };

    dotenvy::from_path_iter(path)
        .map_err(to_err)?
        .map(|item| item.map_err(to_err))
        .collect()
}

/// A complete binding of a descriptor's variables.
#[derive(Clone, PartialEq, Eq)]
pub struct StackEnv {
    values: BTreeMap<String, String>,
}

impl StackEnv {
    /// Binds every variable `descriptor` references through `lookup`.
    ///
    /// # Errors
    ///
    /// - [`StackError::MissingVariables`] listing every unset or empty variable
    /// - [`StackError::InvalidPort`] for a `*_PORT` value outside `1..=65535`
    pub fn bind<F>(descriptor: &Descriptor, lookup: F) -> Result<Self, StackError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut values = BTreeMap::new();
        let mut missing = Vec::new();

        for name in descriptor.required_variables() {
            match lookup(name) {
                Some(value) if !value.trim().is_empty() => {
                    values.insert(name.to_string(), value);
                }
                _ => missing.push(name.to_string()),
            }
        }

        if !missing.is_empty() {
            return Err(StackError::MissingVariables(missing));
        }

        for (name, value) in &values {
            if is_port(name) {
                validate_port(name, value)?;
            }
        }

        Ok(Self { values })
    }

    /// Binds from the process environment layered over `env_file`.
    pub fn from_environment(
        descriptor: &Descriptor,
        env_file: Option<&Path>,
    ) -> Result<Self, StackError> {
        let file_values = match env_file {
            Some(path) => read_env_file(path)?,
            None => BTreeMap::new(),
        };

        Self::bind(descriptor, |name| {
            std::env::var(name)
                .ok()
                .or_else(|| file_values.get(name).cloned())
        })
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.values.get(name).map(String::as_str)
    }

    /// All bound pairs, for exporting to a child process.
    pub fn vars(&self) -> impl Iterator<Item = (&str, &str)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// All bound pairs with secrets replaced by `***`.
    pub fn masked(&self) -> Vec<(&str, &str)> {
        self.vars()
            .map(|(k, v)| if is_secret(k) { (k, "***") } else { (k, v) })
            .collect()
    }
}

impl fmt::Debug for StackEnv {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.masked()).finish()
    }
}

impl fmt::Display for StackEnv {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (name, value) in self.masked() {
            writeln!(f, "{name}={value}")?;
        }
        Ok(())
    }
}
