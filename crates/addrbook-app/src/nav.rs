//! Navigation header and login surface state.
//!
//! Authentication itself lives elsewhere; this module only turns the current
//! route and auth state into what the header and login page should show.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    Login,
    Signup,
    Addresses,
    Other(String),
}

impl Route {
    /// Parse a request path. Query strings and a trailing slash are ignored.
    pub fn parse(path: &str) -> Self {
        let path = path.split(['?', '#']).next().unwrap_or_default();
        let trimmed = path.trim_end_matches('/');
        match trimmed {
            "/login" => Route::Login,
            "/signup" => Route::Signup,
            "/address" | "/addresses" => Route::Addresses,
            "" => Route::Other("/".to_string()),
            other => Route::Other(other.to_string()),
        }
    }

    pub fn path(&self) -> &str {
        match self {
            Route::Login => "/login",
            Route::Signup => "/signup",
            Route::Addresses => "/address",
            Route::Other(path) => path,
        }
    }

    pub fn is_auth_page(&self) -> bool {
        matches!(self, Route::Login | Route::Signup)
    }
}

/// Signed-in user details shown in the header.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Profile {
    pub name: String,
    #[serde(default)]
    pub email: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum AuthState {
    #[default]
    Anonymous,
    /// `profile` is `None` while it is still loading.
    Authenticated { profile: Option<Profile> },
}

impl AuthState {
    pub fn is_authenticated(&self) -> bool {
        matches!(self, AuthState::Authenticated { .. })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Placement {
    /// Floats over the page content (auth pages with a full-bleed backdrop).
    Overlay,
    /// Part of the normal page flow.
    Inline,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Header {
    pub placement: Placement,
    pub authenticated: bool,
    pub display_name: Option<String>,
    pub show_sign_in: bool,
}

impl Header {
    pub fn resolve(route: &Route, auth: &AuthState) -> Self {
        let placement = if route.is_auth_page() {
            Placement::Overlay
        } else {
            Placement::Inline
        };
        let display_name = match auth {
            AuthState::Authenticated {
                profile: Some(profile),
            } => Some(profile.name.clone()),
            _ => None,
        };
        Self {
            placement,
            authenticated: auth.is_authenticated(),
            display_name,
            show_sign_in: !auth.is_authenticated() && !route.is_auth_page(),
        }
    }
}

/// View model for the login page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoginSurface {
    pub title: &'static str,
    pub backdrop: &'static str,
}

impl LoginSurface {
    pub fn for_route(route: &Route) -> Option<Self> {
        match route {
            Route::Login => Some(Self {
                title: "Sign in",
                backdrop: "/bg/drops.jpeg",
            }),
            _ => None,
        }
    }
}
