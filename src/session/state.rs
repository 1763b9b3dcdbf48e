// Copyright (c) 2025 Ronan LE MEILLAT, SCTG Development
// This file is part of the turbo-badges project and is licensed under the
// SCTG Development Non-Commercial License v1.0 (see LICENSE.md for details).

//! In-memory session record

use serde::Serialize;

use crate::models::UserProfile;

/// Point-in-time copy of the session, handed to consumers such as guards.
///
/// While `is_bootstrapping` is true the other fields mean "unknown yet" and
/// consumers must not take access decisions.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SessionSnapshot {
    /// Short-lived bearer credential, absent when unauthenticated
    #[serde(skip_serializing)]
    pub access_credential: Option<String>,

    /// Profile of the signed-in user
    pub current_user: Option<UserProfile>,

    /// True until the initial renewal and profile fetch have completed
    pub is_bootstrapping: bool,
}

impl SessionSnapshot {
    /// Snapshot of a settled session with a signed-in user
    pub fn authenticated(credential: impl Into<String>, user: UserProfile) -> Self {
        Self {
            access_credential: Some(credential.into()),
            current_user: Some(user),
            is_bootstrapping: false,
        }
    }

    /// Snapshot of a settled session without a user
    pub fn anonymous() -> Self {
        Self::default()
    }

    /// Snapshot taken while the bootstrap sequence is still running
    pub fn bootstrapping() -> Self {
        Self {
            is_bootstrapping: true,
            ..Self::default()
        }
    }

    pub fn is_authenticated(&self) -> bool {
        self.current_user.is_some()
    }

    /// Role name of the signed-in user
    pub fn role_name(&self) -> Option<&str> {
        self.current_user.as_ref().map(|user| user.role.name.as_str())
    }
}

/// Mutable session record guarded by the manager's lock
#[derive(Debug)]
pub(crate) struct SessionState {
    pub(crate) access_credential: Option<String>,
    pub(crate) current_user: Option<UserProfile>,
    pub(crate) is_bootstrapping: bool,
    pub(crate) bootstrap_started: bool,
    /// Bumped whenever the session is cleared; credentials obtained under an
    /// older epoch are discarded
    pub(crate) epoch: u64,
}

impl Default for SessionState {
    fn default() -> Self {
        Self {
            access_credential: None,
            current_user: None,
            is_bootstrapping: true,
            bootstrap_started: false,
            epoch: 0,
        }
    }
}

impl SessionState {
    pub(crate) fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            access_credential: self.access_credential.clone(),
            current_user: self.current_user.clone(),
            is_bootstrapping: self.is_bootstrapping,
        }
    }

    /// Drop the credential and the user, starting a new epoch
    pub(crate) fn clear(&mut self) {
        self.access_credential = None;
        self.current_user = None;
        self.epoch += 1;
    }

    /// Leave the bootstrapping phase, whatever its outcome
    pub(crate) fn settle(&mut self) {
        self.bootstrap_started = true;
        self.is_bootstrapping = false;
    }
}
