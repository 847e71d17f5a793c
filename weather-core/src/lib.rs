//! Core library for the city weather lookup.
//!
//! This crate defines:
//! - Configuration handling
//! - The upstream weather provider and its error taxonomy
//! - The lookup client, background search logger and debounced search coordinator
//! - Shared domain and wire models (snapshots, search log entries)
//!
//! It is used by `weather-server` and `weather-cli`.

pub mod config;
pub mod coordinator;
pub mod error;
pub mod logger;
pub mod lookup;
pub mod model;
pub mod provider;

pub use config::Config;
pub use coordinator::{SearchCoordinator, SearchHandle, SearchSettings, ViewState};
pub use error::{ErrorKind, LookupError, ProviderError};
pub use logger::{BackgroundLogger, HttpLogSink, SearchLogSink};
pub use lookup::{HttpLookupClient, WeatherLookup};
pub use model::{SearchLogEntry, WeatherSnapshot};
pub use provider::WeatherProvider;
