//! # Platform Client Crate
//!
//! Everything the curator knows about the video platform lives here.
//!
//! ## Main Components
//!
//! - **platform**: The `VideoPlatform` capability trait (search, read playlist, add, remove)
//! - **youtube**: `YouTubeClient`, the HTTP implementation over the YouTube Data API v3
//! - **fake**: `InMemoryPlatform`, a scriptable in-memory implementation for tests
//! - **retry**: Bounded exponential backoff for transient failures
//! - **credentials**: API key / OAuth token handling
//! - **error**: `PlatformError` and HTTP response classification
//!
//! ## Example Usage
//!
//! ```ignore
//! use platform_client::{Credentials, VideoPlatform, YouTubeClient};
//!
//! let client = YouTubeClient::new(&settings.platform, Credentials::from_env()?)?;
//! let state = client.get_playlist_items("PLx0sYbCqOb8TBPRdmBHs5Iftvv9TPboYG").await?;
//! println!("{} items", state.current_item_ids.len());
//! ```

pub mod credentials;
pub mod error;
pub mod fake;
pub mod platform;
pub mod retry;
mod wire;
pub mod youtube;

pub use credentials::{Credentials, ACCESS_TOKEN_VAR, API_KEY_VAR};
pub use error::PlatformError;
pub use fake::{InMemoryPlatform, Operation, PlatformCall};
pub use platform::VideoPlatform;
pub use retry::{retry_transient, RetryPolicy};
pub use youtube::YouTubeClient;
