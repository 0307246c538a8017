//! Boxing API surface: typed request bodies, the blocking client, and response inspection.

pub mod client;
pub mod response;
pub mod types;

pub use client::ApiClient;
pub use response::{has_success_marker, pretty_json, summarize_body, ApiResponse, SUCCESS_MARKER};
pub use types::{Boxer, LeaderboardEntry, NewBoxer, SortBy};
