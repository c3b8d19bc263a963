use std::collections::BTreeMap;

use serde::Serialize;
use tracing::debug;

use crate::error::{CodecError, Result};
use crate::profile::{ConsoleKind, ConsoleProfile};

/// Emitted when the active profile changes.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct ProfileChange {
    pub previous: String,
    pub current: String,
}

type Observer = Box<dyn FnMut(&ProfileChange) + Send>;

/// Known profiles plus the one currently active.
///
/// Owned by the caller and passed to codec calls explicitly, so separate
/// registries never see each other's state.
pub struct Registry {
    profiles: BTreeMap<String, ConsoleProfile>,
    active: String,
    observers: Vec<Observer>,
}

impl Default for Registry {
    fn default() -> Self {
        Self::with_builtin()
    }
}

impl std::fmt::Debug for Registry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Registry")
            .field("profiles", &self.profiles.keys().collect::<Vec<_>>())
            .field("active", &self.active)
            .field("observers", &self.observers.len())
            .finish()
    }
}

impl Registry {
    /// A registry holding only the unconstrained `default` profile.
    pub fn new() -> Self {
        let default = ConsoleKind::Default.profile();
        let active = default.id.clone();
        let mut profiles = BTreeMap::new();
        profiles.insert(active.clone(), default);
        Self {
            profiles,
            active,
            observers: Vec::new(),
        }
    }

    /// Every built-in console profile, `default` active.
    pub fn with_builtin() -> Self {
        let mut reg = Self::new();
        for kind in ConsoleKind::ALL {
            reg.register(kind.profile());
        }
        reg
    }

    /// Adds `profile`, replacing any profile with the same id.
    pub fn register(&mut self, profile: ConsoleProfile) {
        self.profiles.insert(profile.id.clone(), profile);
    }

    /// Looks up by id, falling back to console aliases (`gb`, `md`, ...).
    pub fn get(&self, id: &str) -> Option<&ConsoleProfile> {
        self.profiles.get(id).or_else(|| {
            id.parse::<ConsoleKind>()
                .ok()
                .and_then(|k| self.profiles.get(k.id()))
        })
    }

    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.profiles.keys().map(String::as_str)
    }

    pub fn profiles(&self) -> impl Iterator<Item = &ConsoleProfile> {
        self.profiles.values()
    }

    /// Replaces the active profile. Constraints of the previous profile are
    /// not carried over. Unknown ids leave the registry unchanged.
    pub fn set_active(&mut self, id: &str) -> Result<ProfileChange> {
        let next = self
            .get(id)
            .map(|p| p.id.clone())
            .ok_or_else(|| CodecError::UnknownProfile(id.to_string()))?;
        let change = ProfileChange {
            previous: std::mem::replace(&mut self.active, next.clone()),
            current: next,
        };
        debug!(previous = %change.previous, current = %change.current, "active profile changed");
        for observer in &mut self.observers {
            observer(&change);
        }
        Ok(change)
    }

    pub fn active(&self) -> &ConsoleProfile {
        // `active` only ever holds ids present in `profiles`
        &self.profiles[&self.active]
    }

    /// Adds a callback run after every successful [`Registry::set_active`].
    pub fn subscribe(&mut self, observer: impl FnMut(&ProfileChange) + Send + 'static) {
        self.observers.push(Box::new(observer));
    }
}
