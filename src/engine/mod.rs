//! Core engine: poll timer, bet detection session, and the app
//! controller that drives them.

pub mod app;
pub mod session;
pub mod timer;
