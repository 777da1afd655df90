/*
 * permission.rs
 * Copyright (c) 2025 Posit, PBC
 *
 * Permission entries and principals.
 */

use crate::{Error, Result};
use bundle_dyn::{Mapping, Path, Value, ValueKind};
use std::fmt;

pub const LEVEL_KEY: &str = "level";
pub const USER_NAME_KEY: &str = "user_name";
pub const GROUP_NAME_KEY: &str = "group_name";
pub const SERVICE_PRINCIPAL_NAME_KEY: &str = "service_principal_name";

const IDENTITY_KEYS: [&str; 3] = [USER_NAME_KEY, GROUP_NAME_KEY, SERVICE_PRINCIPAL_NAME_KEY];

/// An identity that can hold a permission.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Principal {
    User(String),
    Group(String),
    ServicePrincipal(String),
}

impl Principal {
    fn from_field(field: &str, name: &str) -> Option<Principal> {
        match field {
            USER_NAME_KEY => Some(Principal::User(name.to_string())),
            GROUP_NAME_KEY => Some(Principal::Group(name.to_string())),
            SERVICE_PRINCIPAL_NAME_KEY => Some(Principal::ServicePrincipal(name.to_string())),
            _ => None,
        }
    }

    /// The identity of a permission entry, if it names exactly one.
    pub fn from_value(entry: &Value) -> Option<Principal> {
        identity_of(entry).ok()
    }

    /// Field of a permission entry that holds this identity.
    pub fn field(&self) -> &'static str {
        match self {
            Principal::User(_) => USER_NAME_KEY,
            Principal::Group(_) => GROUP_NAME_KEY,
            Principal::ServicePrincipal(_) => SERVICE_PRINCIPAL_NAME_KEY,
        }
    }

    pub fn name(&self) -> &str {
        match self {
            Principal::User(name) | Principal::Group(name) | Principal::ServicePrincipal(name) => {
                name
            }
        }
    }
}

impl fmt::Display for Principal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Principal::User(name) => write!(f, "user `{}`", name),
            Principal::Group(name) => write!(f, "group `{}`", name),
            Principal::ServicePrincipal(name) => write!(f, "service principal `{}`", name),
        }
    }
}

/// The principal a configuration is processed for.
///
/// Users are identified by user name, service principals by application id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CurrentUser {
    principal: Principal,
}

impl CurrentUser {
    pub fn user(user_name: impl Into<String>) -> Self {
        Self {
            principal: Principal::User(user_name.into()),
        }
    }

    pub fn service_principal(application_id: impl Into<String>) -> Self {
        Self {
            principal: Principal::ServicePrincipal(application_id.into()),
        }
    }

    pub fn principal(&self) -> &Principal {
        &self.principal
    }
}

/// A permission entry: a level held by one principal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Permission {
    pub level: String,
    pub principal: Principal,
}

impl Permission {
    pub fn new(level: impl Into<String>, principal: Principal) -> Self {
        Self {
            level: level.into(),
            principal,
        }
    }

    /// Read a permission entry.
    ///
    /// # Errors
    ///
    /// [`Error::InvalidPermission`] at `path` when the entry is not a
    /// mapping, has no string `level`, or does not name exactly one of
    /// `user_name`, `group_name`, `service_principal_name`.
    pub fn from_value(entry: &Value, path: &Path) -> Result<Permission> {
        let invalid = |message: String| Error::InvalidPermission {
            path: path.clone(),
            message,
        };
        if entry.as_mapping().is_none() {
            return Err(invalid(format!("expected a mapping, found {}", entry.kind())));
        }
        let level = entry
            .get(LEVEL_KEY)
            .and_then(Value::as_str)
            .ok_or_else(|| invalid(format!("{} must be a string", LEVEL_KEY)))?;
        let principal = identity_of(entry).map_err(invalid)?;
        Ok(Permission::new(level, principal))
    }

    pub fn to_value(&self) -> Value {
        let mut entry = Mapping::new();
        entry.insert(LEVEL_KEY.to_string(), Value::from(self.level.as_str()));
        entry.insert(
            self.principal.field().to_string(),
            Value::from(self.principal.name()),
        );
        Value::mapping(entry)
    }
}

/// Parse every entry of a permission list located at `path`.
pub fn parse_permissions(entries: &[Value], path: &Path) -> Result<Vec<Permission>> {
    entries
        .iter()
        .enumerate()
        .map(|(i, entry)| Permission::from_value(entry, &path.index(i)))
        .collect()
}

fn identity_of(entry: &Value) -> std::result::Result<Principal, String> {
    let mut found = Vec::new();
    for field in IDENTITY_KEYS {
        match entry.get(field).map(|value| &value.kind) {
            None | Some(ValueKind::Nil | ValueKind::Invalid) => {}
            Some(ValueKind::String(name)) if name.is_empty() => {}
            Some(ValueKind::String(name)) => found.extend(Principal::from_field(field, name)),
            Some(_) => return Err(format!("{} must be a string", field)),
        }
    }
    match found.len() {
        1 => Ok(found.remove(0)),
        0 => Err(format!(
            "exactly one of {} must be set, found none",
            IDENTITY_KEYS.join(", ")
        )),
        n => Err(format!(
            "exactly one of {} must be set, found {}",
            IDENTITY_KEYS.join(", "),
            n
        )),
    }
}
