// Copyright (c) 2025 Ronan LE MEILLAT, SCTG Development
// This file is part of the turbo-badges project and is licensed under the
// SCTG Development Non-Commercial License v1.0 (see LICENSE.md for details).

//! Navigation seam
//!
//! Guards and login entry points decide *where* the user should go; the
//! host application decides *how* to get there (full-page redirect, router
//! push, printing a link in a terminal).

use log::info;

/// Something able to send the user to another location
#[cfg_attr(test, mockall::automock)]
pub trait Navigator: Send + Sync {
    /// Go to `location`, either an absolute URL or an application path
    fn navigate(&self, location: &str);
}

/// Navigator for terminal front ends: prints the location for the user to open
#[derive(Debug, Default, Clone, Copy)]
pub struct PrintNavigator;

impl Navigator for PrintNavigator {
    fn navigate(&self, location: &str) {
        info!("Navigating to {}", location);
        println!("Open {} to continue", location);
    }
}
