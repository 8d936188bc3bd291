//! quotes-rs: a quote session with back/forward history, clipboard copy
//! and spoken narration, plus a terminal front end.

pub mod config;
pub mod desktop;
pub mod error;
pub mod presenter;
pub mod provider;
pub mod quote;
pub mod session;
pub mod speech;

#[cfg(test)]
mod fakes;
