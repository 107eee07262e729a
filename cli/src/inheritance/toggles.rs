use std::collections::BTreeMap;

use crate::schema::{PropertyRegistry, SchemaError};

use super::defaults::InheritanceDefaults;

/// Per-node inheritance flags, one per toggle slot in the schema.
///
/// A flag set to `true` means "delegate this property to the parent".
/// The stash holds the flags that were active before inheritance was
/// switched off wholesale, so it can be restored later.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InheritanceToggles {
    flags: BTreeMap<&'static str, bool>,
    stashed: Option<BTreeMap<&'static str, bool>>,
}

impl InheritanceToggles {
    /// Every slot set to `value`.
    pub fn uniform(schema: &PropertyRegistry, value: bool) -> Self {
        Self {
            flags: schema.toggle_names().iter().map(|name| (*name, value)).collect(),
            stashed: None,
        }
    }

    /// Slots initialised from the default-inheritance template.
    pub fn from_defaults(schema: &PropertyRegistry, defaults: &InheritanceDefaults) -> Self {
        Self {
            flags: schema
                .toggle_names()
                .iter()
                .map(|name| (*name, defaults.flag_for(name)))
                .collect(),
            stashed: None,
        }
    }

    /// `None` when the schema has no slot with this name.
    pub fn get(&self, name: &str) -> Option<bool> {
        self.flags.get(name).copied()
    }

    pub fn is_set(&self, name: &str) -> bool {
        self.get(name).unwrap_or(false)
    }

    /// Returns whether the flag actually changed.
    pub fn set(&mut self, name: &str, value: bool) -> Result<bool, SchemaError> {
        match self.flags.get_mut(name) {
            Some(flag) => {
                let changed = *flag != value;
                *flag = value;
                Ok(changed)
            }
            None => Err(SchemaError::UnknownProperty {
                name: name.to_string(),
            }),
        }
    }

    pub fn set_all(&mut self, value: bool) -> bool {
        let mut changed = false;
        for flag in self.flags.values_mut() {
            changed |= *flag != value;
            *flag = value;
        }
        changed
    }

    pub fn everything_inherited(&self) -> bool {
        self.flags.values().all(|flag| *flag)
    }

    pub fn enabled(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.flags.iter().filter(|(_, flag)| **flag).map(|(name, _)| *name)
    }

    pub fn flags(&self) -> &BTreeMap<&'static str, bool> {
        &self.flags
    }

    pub fn stashed(&self) -> Option<&BTreeMap<&'static str, bool>> {
        self.stashed.as_ref()
    }

    pub fn has_stash(&self) -> bool {
        self.stashed.is_some()
    }

    /// Stashes the current flags and clears them all.
    ///
    /// An existing stash is kept, so disabling twice does not overwrite the
    /// snapshot with an all-false one.
    pub fn disable(&mut self) {
        if self.stashed.is_none() {
            self.stashed = Some(self.flags.clone());
        }
        self.set_all(false);
    }

    /// Restores stashed flags. Returns false when nothing was stashed.
    pub fn restore(&mut self) -> bool {
        match self.stashed.take() {
            Some(stashed) => {
                for (name, value) in stashed {
                    if let Some(flag) = self.flags.get_mut(name) {
                        *flag = value;
                    }
                }
                true
            }
            None => false,
        }
    }

    pub(crate) fn set_stash(&mut self, stashed: Option<BTreeMap<&'static str, bool>>) {
        self.stashed = stashed;
    }

    /// Copies every flag from `other`. The stash is left alone.
    pub fn copy_from(&mut self, other: &InheritanceToggles) {
        for (name, value) in &other.flags {
            if let Some(flag) = self.flags.get_mut(name) {
                *flag = *value;
            }
        }
    }
}
