// Copyright (c) 2025 Ronan LE MEILLAT, SCTG Development
// This file is part of the turbo-badges project and is licensed under the
// SCTG Development Non-Commercial License v1.0 (see LICENSE.md for details).

//! Badge roster
//!
//! A [`BadgeRoster`] is the working set of people a badge agent is preparing
//! badges for. Entries come either from the user directory loaded from the
//! API (`GET /users`) or from a manually filled [`EntryForm`].
//!
//! The roster lives in memory only: nothing is saved or restored, and edits
//! made here (names, photo) are not sent back to the API.

use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::models::UserProfile;
use crate::session::{ApiRequest, SessionError, SessionManager};

/// Refused roster operations
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RosterError {
    #[error("Please select a user")]
    NoUserSelected,

    #[error("User {0} is not in the loaded directory")]
    UnknownUser(String),

    #[error("User {0} is already in the roster")]
    AlreadyInRoster(String),

    #[error("First name, last name and email are required")]
    MissingRequiredFields,

    #[error("No roster entry with id {0}")]
    UnknownEntry(String),
}

/// One person to print a badge for
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BadgeEntry {
    pub id: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,

    /// Photo reference (server filename, URL or local path)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub photo: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub commission: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub permissions: Option<String>,
}

impl BadgeEntry {
    /// Uppercased initials, for avatar placeholders
    pub fn initials(&self) -> String {
        self.first_name
            .trim()
            .chars()
            .take(1)
            .chain(self.last_name.trim().chars().take(1))
            .flat_map(char::to_uppercase)
            .collect()
    }

    pub fn display_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }

    fn from_profile(user: &UserProfile) -> Self {
        Self {
            id: user.id.clone(),
            first_name: user.first_name.clone(),
            last_name: user.last_name.clone(),
            email: user.email.clone(),
            photo: None,
            commission: None,
            permissions: None,
        }
    }
}

/// Manually entered roster entry
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EntryForm {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub photo: String,
    pub commission: String,
    pub permissions: String,
}

fn non_blank(value: &str) -> Option<String> {
    let value = value.trim();
    (!value.is_empty()).then(|| value.to_string())
}

impl EntryForm {
    fn validate(&self) -> Result<(), RosterError> {
        if [&self.first_name, &self.last_name, &self.email]
            .iter()
            .any(|field| field.trim().is_empty())
        {
            return Err(RosterError::MissingRequiredFields);
        }
        Ok(())
    }

    fn fill(&self, entry: &mut BadgeEntry) {
        entry.first_name = self.first_name.trim().to_string();
        entry.last_name = self.last_name.trim().to_string();
        entry.email = self.email.trim().to_string();
        entry.photo = non_blank(&self.photo);
        entry.commission = non_blank(&self.commission);
        entry.permissions = non_blank(&self.permissions);
    }
}

/// In-memory roster plus the user directory it draws from
#[derive(Debug, Clone, Default)]
pub struct BadgeRoster {
    directory: Vec<UserProfile>,
    entries: Vec<BadgeEntry>,
}

impl BadgeRoster {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load the user directory from the API.
    ///
    /// Returns `Ok(true)` when the directory was replaced. A non-success
    /// answer is logged and leaves the current directory in place.
    pub async fn load_directory(&mut self, session: &SessionManager) -> Result<bool, SessionError> {
        let response = session
            .auth_fetch(&ApiRequest::get(session.endpoint("/users")))
            .await?;

        if !response.status().is_success() {
            warn!(
                "User directory could not be loaded (status {}), keeping {} known users",
                response.status(),
                self.directory.len()
            );
            return Ok(false);
        }

        let users: Vec<UserProfile> = response.json().await?;
        info!("Loaded {} users into the directory", users.len());
        self.set_directory(users);
        Ok(true)
    }

    pub fn set_directory(&mut self, users: Vec<UserProfile>) {
        self.directory = users;
    }

    pub fn directory(&self) -> &[UserProfile] {
        &self.directory
    }

    pub fn entries(&self) -> &[BadgeEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, id: &str) -> Option<&BadgeEntry> {
        self.entries.iter().find(|entry| entry.id == id)
    }

    fn contains(&self, id: &str) -> bool {
        self.get(id).is_some()
    }

    fn entry_mut(&mut self, id: &str) -> Result<&mut BadgeEntry, RosterError> {
        self.entries
            .iter_mut()
            .find(|entry| entry.id == id)
            .ok_or_else(|| RosterError::UnknownEntry(id.to_string()))
    }

    /// Directory users that are not in the roster yet
    pub fn available_users(&self) -> Vec<&UserProfile> {
        self.directory
            .iter()
            .filter(|user| !self.contains(&user.id))
            .collect()
    }

    /// Add a directory user to the roster
    pub fn add_existing(&mut self, user_id: &str) -> Result<&BadgeEntry, RosterError> {
        if user_id.trim().is_empty() {
            return Err(RosterError::NoUserSelected);
        }

        let user = self
            .directory
            .iter()
            .find(|user| user.id == user_id)
            .ok_or_else(|| RosterError::UnknownUser(user_id.to_string()))?;

        if self.contains(user_id) {
            return Err(RosterError::AlreadyInRoster(user_id.to_string()));
        }

        let entry = BadgeEntry::from_profile(user);
        debug!("Adding {} to the roster", entry.display_name());
        self.entries.push(entry);
        Ok(&self.entries[self.entries.len() - 1])
    }

    /// Add a person who has no account, under a fresh id
    pub fn add_manual(&mut self, form: &EntryForm) -> Result<&BadgeEntry, RosterError> {
        form.validate()?;

        let mut entry = BadgeEntry {
            id: uuid::Uuid::new_v4().to_string(),
            first_name: String::new(),
            last_name: String::new(),
            email: String::new(),
            photo: None,
            commission: None,
            permissions: None,
        };
        form.fill(&mut entry);
        debug!("Adding manual entry {} to the roster", entry.display_name());
        self.entries.push(entry);
        Ok(&self.entries[self.entries.len() - 1])
    }

    /// Overwrite an entry with the form's values
    pub fn update_manual(&mut self, id: &str, form: &EntryForm) -> Result<&BadgeEntry, RosterError> {
        form.validate()?;
        let entry = self.entry_mut(id)?;
        form.fill(entry);
        Ok(entry)
    }

    /// Drop an entry. Returns true when there was one.
    pub fn remove(&mut self, id: &str) -> bool {
        let before = self.entries.len();
        self.entries.retain(|entry| entry.id != id);
        before != self.entries.len()
    }

    /// Directory profile backing an entry, to open the profile editor on
    pub fn profile_for_edit(&self, id: &str) -> Result<&UserProfile, RosterError> {
        self.directory
            .iter()
            .find(|user| user.id == id)
            .ok_or_else(|| {
                warn!("User {} not found in the loaded directory", id);
                RosterError::UnknownUser(id.to_string())
            })
    }

    /// Apply a name edit to an entry and to its directory copy
    pub fn apply_profile_edit(
        &mut self,
        id: &str,
        first_name: &str,
        last_name: &str,
    ) -> Result<(), RosterError> {
        let entry = self.entry_mut(id)?;
        entry.first_name = first_name.to_string();
        entry.last_name = last_name.to_string();

        if let Some(user) = self.directory.iter_mut().find(|user| user.id == id) {
            user.first_name = first_name.to_string();
            user.last_name = last_name.to_string();
        }
        Ok(())
    }

    /// Attach a photo to an entry
    pub fn set_photo(&mut self, id: &str, reference: impl Into<String>) -> Result<(), RosterError> {
        self.entry_mut(id)?.photo = Some(reference.into());
        Ok(())
    }
}
