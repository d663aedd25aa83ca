//! Navigation gating.
//!
//! A pure function from the requested screen and the session state to the
//! screen that is actually shown. Protected screens require a session and
//! redirect to [`Screen::Login`] without one; the auth screens redirect an
//! already-signed-in user to the dashboard instead of showing a pointless
//! form.

use serde::Serialize;

/// Screens the application can present.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Screen {
    /// Aggregate spend overview. The root target.
    Dashboard,
    /// Item list management.
    Items,
    /// Other-cost list management.
    OtherCosts,
    /// Sign-in form.
    Login,
    /// Registration form.
    SignUp,
    /// Fallback for unknown targets, reachable in any session state.
    NotFound,
}

impl Screen {
    /// Whether this screen requires an authenticated session.
    pub fn is_protected(self) -> bool {
        matches!(self, Self::Dashboard | Self::Items | Self::OtherCosts)
    }
}

/// Resolve the screen to present for a navigation request.
pub fn resolve(requested: Screen, authenticated: bool) -> Screen {
    match requested {
        screen if screen.is_protected() && !authenticated => Screen::Login,
        Screen::Login | Screen::SignUp if authenticated => Screen::Dashboard,
        screen => screen,
    }
}
