//! Session bootstrap and authentication diagnostics.

mod bootstrap;
mod diagnostics;

pub use bootstrap::{
    check_session, login, signup, SessionBootstrap, CALLBACK_PATH, CSRF_PATH, PROVIDERS_PATH,
    SESSION_PATH, SIGNUP_PATH,
};
pub use diagnostics::troubleshooting_tips;
