//! CIMS administration console runtime.
//!
//! Every console page follows the same list/form pattern: guard the session,
//! fill dropdowns from reference data, render the record grid, and drive a
//! create/update form plus a confirm-before-delete flow against the CIMS REST
//! services. This crate holds that pattern as typed, headless state so the
//! desktop shell (feature `desktop`) only has to forward commands and render
//! the resulting [`page::PageView`].

pub mod catalog;
pub mod client;
pub mod config;
pub mod envelope;
pub mod error;
pub mod export;
pub mod form;
pub mod grid;
pub mod inflight;
pub mod ledger;
pub mod logging;
pub mod lookup;
pub mod options;
pub mod page;
pub mod preview;
pub mod session;
pub mod transport;
pub mod values;

#[cfg(feature = "desktop")]
pub mod commands;

pub use client::ApiClient;
pub use config::ConsoleConfig;
pub use error::{ConsoleError, ConsoleResult};
pub use page::{PageController, PageView, Pane, UiEvent};
pub use session::{Authenticator, Navigation, SessionStore};
