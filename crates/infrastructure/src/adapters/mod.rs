//! Port implementations backed by the network and the system clock.

mod reqwest_session;
mod system_clock;

pub use reqwest_session::{ReqwestSession, ReqwestSessionFactory, MAX_REDIRECTS};
pub use system_clock::SystemClock;
