//! Identifiers captured from earlier responses.
//!
//! Later requests reference them through `{name}` placeholders in their
//! path templates. The map only grows: a name is written once and never
//! replaced.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::error::{DomainError, DomainResult};

/// Logical name to identifier value, add-only.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CapturedIds {
    ids: BTreeMap<String, String>,
}

impl CapturedIds {
    /// Creates an empty map.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Records an identifier.
    ///
    /// # Errors
    ///
    /// Returns an error if the name or value is empty, or the name was
    /// already captured.
    pub fn capture(&mut self, name: impl Into<String>, value: impl Into<String>) -> DomainResult<()> {
        let name = name.into();
        let value = value.into();
        if name.is_empty() {
            return Err(DomainError::InvalidIdentifier("empty name".to_string()));
        }
        if value.is_empty() {
            return Err(DomainError::InvalidIdentifier(format!("empty value for '{name}'")));
        }
        if self.ids.contains_key(&name) {
            return Err(DomainError::IdentifierAlreadyCaptured(name));
        }
        self.ids.insert(name, value);
        Ok(())
    }

    /// Returns the identifier, if captured.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&str> {
        self.ids.get(name).map(String::as_str)
    }

    /// Returns the identifier or a `MissingIdentifier` error.
    ///
    /// # Errors
    ///
    /// Returns an error if the name was never captured.
    pub fn require(&self, name: &str) -> DomainResult<&str> {
        self.get(name)
            .ok_or_else(|| DomainError::MissingIdentifier(name.to_string()))
    }

    /// Returns true if the name was captured.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.ids.contains_key(name)
    }

    /// Returns the number of captured identifiers.
    #[must_use]
    pub fn len(&self) -> usize {
        self.ids.len()
    }

    /// Returns true if nothing was captured yet.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }
}

/// A request path with `{name}` placeholders.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PathTemplate(String);

impl PathTemplate {
    /// Wraps a raw template.
    #[must_use]
    pub fn new(template: impl Into<String>) -> Self {
        Self(template.into())
    }

    /// Returns the raw template.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns the placeholder names in order of appearance.
    ///
    /// # Errors
    ///
    /// Returns an error for an unterminated or empty placeholder.
    pub fn placeholders(&self) -> DomainResult<Vec<&str>> {
        let mut names = Vec::new();
        let mut rest = self.0.as_str();
        while let Some((_, name, after)) = self.next_placeholder(rest)? {
            names.push(name);
            rest = after;
        }
        Ok(names)
    }

    /// Splits `rest` into the literal before the next placeholder, its name
    /// and what follows it.
    fn next_placeholder<'a>(
        &self,
        rest: &'a str,
    ) -> DomainResult<Option<(&'a str, &'a str, &'a str)>> {
        let Some(open) = rest.find('{') else {
            return Ok(None);
        };
        let after = &rest[open + 1..];
        let close = after
            .find('}')
            .ok_or_else(|| DomainError::InvalidPathTemplate(self.0.clone()))?;
        let name = &after[..close];
        if name.is_empty() {
            return Err(DomainError::InvalidPathTemplate(self.0.clone()));
        }
        Ok(Some((&rest[..open], name, &after[close + 1..])))
    }

    /// Returns the first placeholder that has not been captured.
    ///
    /// # Errors
    ///
    /// Returns an error if the template is malformed.
    pub fn first_missing<'a>(&'a self, ids: &CapturedIds) -> DomainResult<Option<&'a str>> {
        Ok(self
            .placeholders()?
            .into_iter()
            .find(|name| !ids.contains(name)))
    }

    /// Substitutes every placeholder with its captured identifier.
    ///
    /// # Errors
    ///
    /// Returns `MissingIdentifier` if a placeholder was never captured, or
    /// `InvalidPathTemplate` if the template is malformed.
    pub fn render(&self, ids: &CapturedIds) -> DomainResult<String> {
        let mut rendered = String::with_capacity(self.0.len());
        let mut rest = self.0.as_str();
        while let Some((literal, name, after)) = self.next_placeholder(rest)? {
            rendered.push_str(literal);
            rendered.push_str(ids.require(name)?);
            rest = after;
        }
        rendered.push_str(rest);
        Ok(rendered)
    }
}

impl std::fmt::Display for PathTemplate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for PathTemplate {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for PathTemplate {
    fn from(value: String) -> Self {
        Self(value)
    }
}
