//! Route table, route guard and navigation.
//!
//! `/login` is public, `/` is the protected shell (home is its default
//! child) and every other path redirects to `/`. The guard is a pure
//! predicate; redirects are decided by [`resolve`] and carried out by
//! whoever owns the [`Navigator`].

use std::sync::Mutex;

use tracing::debug;

use crate::auth::AuthService;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Route {
    Login,
    Home,
}

impl Route {
    pub fn path(&self) -> &'static str {
        match self {
            Route::Login => "/login",
            Route::Home => "/",
        }
    }

    /// Routes under the shell require a session
    pub fn is_protected(&self) -> bool {
        matches!(self, Route::Home)
    }

    /// Match a path against the route table; `None` means the wildcard.
    pub fn parse(path: &str) -> Option<Route> {
        let path = path.split(['?', '#']).next().unwrap_or_default();
        match path.trim_end_matches('/') {
            "" => Some(Route::Home),
            "/login" | "login" => Some(Route::Login),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution {
    Render(Route),
    Redirect(Route),
}

/// Gates the protected shell on the presence of a session.
#[derive(Debug, Clone, Copy, Default)]
pub struct RouteGuard;

impl RouteGuard {
    pub fn can_activate(&self, auth: &AuthService) -> bool {
        auth.is_logged_in()
    }
}

/// One step of route resolution for `path`, given the guard's answer.
pub fn resolve(path: &str, guard_passes: bool) -> Resolution {
    match Route::parse(path) {
        None => Resolution::Redirect(Route::Home),
        Some(route) if route.is_protected() && !guard_passes => Resolution::Redirect(Route::Login),
        Some(route) => Resolution::Render(route),
    }
}

/// Follow redirects until a route renders.
pub fn settle(path: &str, guard_passes: bool) -> Route {
    let mut resolution = resolve(path, guard_passes);
    // Two hops at most: wildcard -> home -> login.
    for _ in 0..2 {
        match resolution {
            Resolution::Render(route) => return route,
            Resolution::Redirect(route) => resolution = resolve(route.path(), guard_passes),
        }
    }
    match resolution {
        Resolution::Render(route) | Resolution::Redirect(route) => route,
    }
}

pub trait Navigator: Send + Sync {
    fn navigate(&self, route: Route);
}

/// Navigator that records where the app has been.
#[derive(Debug, Default)]
pub struct History {
    entries: Mutex<Vec<Route>>,
}

impl History {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn current(&self) -> Option<Route> {
        self.lock().last().copied()
    }

    pub fn entries(&self) -> Vec<Route> {
        self.lock().clone()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Vec<Route>> {
        self.entries.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl Navigator for History {
    fn navigate(&self, route: Route) {
        debug!(path = route.path(), "Navigating");
        self.lock().push(route);
    }
}
