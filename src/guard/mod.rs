// Copyright (c) 2025 Ronan LE MEILLAT, SCTG Development
// This file is part of the turbo-badges project and is licensed under the
// SCTG Development Non-Commercial License v1.0 (see LICENSE.md for details).

//! Role-based access decisions
//!
//! A [`Guard`] protects a page or an action. Given a [`SessionSnapshot`] it
//! decides whether to wait, grant, show a fallback or redirect:
//!
//! - while the session is bootstrapping nothing is decided,
//! - without a user the fallback is shown if there is one, otherwise the
//!   user is redirected (never both),
//! - with a user and a non-empty list of allowed roles, the user's role must
//!   be in the list or be `admin`: every guarded page is implicitly an
//!   admin page,
//! - with a user and no allowed roles, signing in is enough.
//!
//! Role names are compared case-insensitively.
//!
//! ```
//! use turbo_badges::guard::{Guard, GuardDecision, Roles};
//! use turbo_badges::SessionSnapshot;
//!
//! let guard = Guard::new().allow(Roles::Agent).redirect_to("/profile");
//! assert_eq!(guard.evaluate(&SessionSnapshot::bootstrapping()), GuardDecision::Loading);
//! assert_eq!(
//!     guard.evaluate(&SessionSnapshot::anonymous()),
//!     GuardDecision::Redirect("/profile".to_string())
//! );
//! ```

pub mod hooks;
pub mod navigator;

use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use log::debug;

use crate::session::SessionSnapshot;

pub use hooks::{
    current_role, enforce_auth, enforce_role, has_any_role, has_role, require_auth,
    require_role, AccessCheck, AuthCheck,
};
pub use navigator::{Navigator, PrintNavigator};

/// Where refused users are sent unless told otherwise
pub const DEFAULT_REDIRECT: &str = "/";

/// Built-in role names
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Roles {
    Admin,
    Agent,
    User,
}

impl Roles {
    pub fn as_str(&self) -> &'static str {
        match self {
            Roles::Admin => "admin",
            Roles::Agent => "agent",
            Roles::User => "user",
        }
    }
}

impl fmt::Display for Roles {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Roles {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "admin" => Ok(Roles::Admin),
            "agent" => Ok(Roles::Agent),
            "user" => Ok(Roles::User),
            _ => Err(format!("Unknown role: {}", s)),
        }
    }
}

impl AsRef<str> for Roles {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

/// Lowercased set of role names a guard admits: the given ones plus `admin`.
///
/// The caller's list is only read.
pub fn effective_allowed_roles<S: AsRef<str>>(allowed: &[S]) -> BTreeSet<String> {
    allowed
        .iter()
        .map(|role| role.as_ref().to_ascii_lowercase())
        .chain(std::iter::once(Roles::Admin.as_str().to_string()))
        .collect()
}

/// Outcome of a guard evaluation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GuardDecision {
    /// The session is still bootstrapping, show a neutral loading state
    Loading,
    /// Render the protected content
    Granted,
    /// Render the caller-provided fallback instead
    Fallback,
    /// Send the user elsewhere
    Redirect(String),
}

/// Access policy of a protected page
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Guard {
    allowed_roles: Vec<String>,
    redirect_to: String,
    has_fallback: bool,
}

impl Default for Guard {
    fn default() -> Self {
        Self {
            allowed_roles: Vec::new(),
            redirect_to: DEFAULT_REDIRECT.to_string(),
            has_fallback: false,
        }
    }
}

impl Guard {
    /// Guard that only requires a signed-in user, redirecting to `/`
    pub fn new() -> Self {
        Self::default()
    }

    /// Admit one more role
    pub fn allow(mut self, role: impl AsRef<str>) -> Self {
        self.allowed_roles.push(role.as_ref().to_string());
        self
    }

    /// Admit several roles
    pub fn allow_all<S: AsRef<str>>(mut self, roles: &[S]) -> Self {
        self.allowed_roles
            .extend(roles.iter().map(|role| role.as_ref().to_string()));
        self
    }

    /// Where to send users who may not see the page (default `/`)
    pub fn redirect_to(mut self, location: impl Into<String>) -> Self {
        self.redirect_to = location.into();
        self
    }

    /// Show a fallback instead of redirecting
    pub fn with_fallback(mut self) -> Self {
        self.has_fallback = true;
        self
    }

    pub fn allowed_roles(&self) -> &[String] {
        &self.allowed_roles
    }

    fn refuse(&self) -> GuardDecision {
        if self.has_fallback {
            GuardDecision::Fallback
        } else {
            GuardDecision::Redirect(self.redirect_to.clone())
        }
    }

    /// Decide what to do for the given session
    pub fn evaluate(&self, session: &SessionSnapshot) -> GuardDecision {
        if session.is_bootstrapping {
            return GuardDecision::Loading;
        }

        let user = match &session.current_user {
            Some(user) => user,
            None => return self.refuse(),
        };

        if self.allowed_roles.is_empty() {
            return GuardDecision::Granted;
        }

        let role = user.role.name.to_ascii_lowercase();
        if effective_allowed_roles(&self.allowed_roles).contains(&role) {
            GuardDecision::Granted
        } else {
            debug!(
                "Role '{}' not in {:?}, access refused",
                user.role.name, self.allowed_roles
            );
            self.refuse()
        }
    }

    /// Evaluate and perform the redirect, if any, through `navigator`
    pub fn enforce(&self, session: &SessionSnapshot, navigator: &dyn Navigator) -> GuardDecision {
        let decision = self.evaluate(session);
        if let GuardDecision::Redirect(location) = &decision {
            navigator.navigate(location);
        }
        decision
    }
}
