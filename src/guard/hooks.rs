// Copyright (c) 2025 Ronan LE MEILLAT, SCTG Development
// This file is part of the turbo-badges project and is licensed under the
// SCTG Development Non-Commercial License v1.0 (see LICENSE.md for details).

//! Role queries over a session snapshot
//!
//! These are the building blocks for conditional rendering. Unlike
//! [`Guard`](super::Guard), only [`has_any_role`] grants admins a blanket
//! pass; [`has_role`] and [`require_role`] match the role name strictly.
//!
//! [`enforce_role`] and [`enforce_auth`] also send the user away once the
//! session has settled and access is refused.

use serde::Serialize;

use super::{Navigator, Roles};
use crate::session::SessionSnapshot;

/// Result of [`require_role`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AccessCheck {
    pub has_permission: bool,
    pub is_loading: bool,
}

/// Result of [`require_auth`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthCheck {
    pub is_authenticated: bool,
    pub is_loading: bool,
}

/// Role name of the signed-in user
pub fn current_role(session: &SessionSnapshot) -> Option<&str> {
    session.role_name()
}

/// True when the user's role is exactly `name`, ignoring case
pub fn has_role(session: &SessionSnapshot, name: &str) -> bool {
    session
        .current_user
        .as_ref()
        .is_some_and(|user| user.has_role(name))
}

/// True when the user is an admin or holds one of `names`
pub fn has_any_role<S: AsRef<str>>(session: &SessionSnapshot, names: &[S]) -> bool {
    let Some(user) = &session.current_user else {
        return false;
    };
    user.has_role(Roles::Admin.as_str()) || names.iter().any(|name| user.has_role(name.as_ref()))
}

/// Whether the user holds one of `names`, without admin override
pub fn require_role<S: AsRef<str>>(session: &SessionSnapshot, names: &[S]) -> AccessCheck {
    let has_permission = session
        .current_user
        .as_ref()
        .is_some_and(|user| names.iter().any(|name| user.has_role(name.as_ref())));
    AccessCheck {
        has_permission,
        is_loading: session.is_bootstrapping,
    }
}

pub fn require_auth(session: &SessionSnapshot) -> AuthCheck {
    AuthCheck {
        is_authenticated: session.is_authenticated(),
        is_loading: session.is_bootstrapping,
    }
}

/// [`require_role`], navigating to `redirect_to` when the settled session
/// lacks every role in `names`
pub fn enforce_role<S: AsRef<str>>(
    session: &SessionSnapshot,
    names: &[S],
    redirect_to: &str,
    navigator: &dyn Navigator,
) -> AccessCheck {
    let check = require_role(session, names);
    if !check.is_loading && !check.has_permission {
        navigator.navigate(redirect_to);
    }
    check
}

/// [`require_auth`], navigating to `redirect_to` when the settled session
/// has no user
pub fn enforce_auth(
    session: &SessionSnapshot,
    redirect_to: &str,
    navigator: &dyn Navigator,
) -> AuthCheck {
    let check = require_auth(session);
    if !check.is_loading && !check.is_authenticated {
        navigator.navigate(redirect_to);
    }
    check
}
