#![deny(clippy::print_stdout, clippy::print_stderr, clippy::unwrap_used)]

//! Used to communicate with a MarkUs instance. See the MarkusClient struct for more details.
//!
//! ```rust,no_run
//! use markus_client::MarkusClient;
//!
//! let client = MarkusClient::new("api_key", "https://markus.example.com/csc108".parse().unwrap()).unwrap();
//! let groups = client.get_groups(1).unwrap();
//! if groups.is_success() {
//!     let groups: Vec<markus_client::response::Group> = groups.deserialize().unwrap();
//! }
//! ```
//!

mod client;
mod error;
pub mod path;
pub mod request;
pub mod response;

pub use self::{
    client::MarkusClient,
    error::{MarkusClientError, MarkusClientResult},
    path::resource_path,
    response::{ApiResponse, ResponseBody, ResponseFormat},
};
// these types are part of markus-client's API and thus re-exported
pub use reqwest::StatusCode;
pub use url::Url;
