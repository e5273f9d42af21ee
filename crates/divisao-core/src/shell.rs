use std::sync::Arc;

use crate::auth::AuthService;
use crate::routes::{Navigator, Route};

/// Actions available from the authenticated shell and its pages.
pub struct Shell {
    auth: AuthService,
    navigator: Arc<dyn Navigator>,
}

impl Shell {
    pub fn new(auth: AuthService, navigator: Arc<dyn Navigator>) -> Self {
        Self { auth, navigator }
    }

    /// End the session and go back to the login page
    pub fn sign_out(&self) {
        self.auth.logout();
        self.navigator.navigate(Route::Login);
    }
}
