//! Remote access to the library-management service.
//!
//! [`RemoteStore`] is the seam the sync layer talks to: one async method per
//! (entity, verb) pair. [`HttpRemote`] implements it over the service's REST
//! surface:
//!
//! | Operation | Method | Path |
//! |---|---|---|
//! | list libraries | GET | `/v1/library` |
//! | create library | POST | `/v1/library` |
//! | update library | PUT | `/v1/library/{id}` |
//! | delete library | DELETE | `/v1/library/{id}` |
//! | list books | GET | `/v1/library/{id}/book` |
//! | checkout | POST | `/v1/library/{id}/book/{isbn}/checkout` |
//! | loans for user | GET | `/v1/books/user/{username}` |
//!
//! Every decoded record is validated field by field before it is returned;
//! anything that does not match the expected shape is a
//! [`RemoteError::Decode`].
//!
//! # Example
//!
//! ```
//! use libraryapp_remote::{HttpRemote, RemoteConfig};
//!
//! let config = RemoteConfig {
//!     base_url: "http://localhost:8080".to_string(),
//!     ..Default::default()
//! };
//! let remote = HttpRemote::new(config).unwrap();
//! assert_eq!(remote.base_url(), "http://localhost:8080");
//! ```

mod config;
mod error;
mod http;
mod store;
mod wire;

pub use config::RemoteConfig;
pub use error::{RemoteError, RemoteResult};
pub use http::HttpRemote;
pub use store::RemoteStore;
pub use wire::{CheckoutRequest, LibraryBookEntry, LibraryBookInfo};
