//! nimbus-client: HTTP client library
//!
//! Typed access to the nimbus daemon API.
//!
//! # Examples
//!
//! ```no_run
//! use nimbus_client::HttpClient;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let client = HttpClient::new("http://localhost:3232")?;
//!
//! for endpoint in client.all().await? {
//!     println!("{} {} {}", endpoint.cloud, endpoint.kind, endpoint.name);
//! }
//!
//! let snapshot = client.capture_snapshot().await?;
//! println!("stored {} endpoints at {}", snapshot.endpoints.len(), snapshot.timestamp);
//! # Ok(())
//! # }
//! ```

pub mod error;
pub mod http;

pub use error::{ClientError, Result};
pub use http::HttpClient;
