//! # canvas-lms-client
//!
//! Typed async client for the Canvas LMS REST API.
//!
//! ## Overview
//!
//! All traffic goes through one [`Connection`](transport::Connection), which
//! owns the HTTP client and the bearer token. It resolves URLs against the
//! site root, follows `Link` pagination lazily, decodes list pages item by
//! item, normalizes the two Canvas error payload shapes and drives the
//! three-step file upload. The resource clients on [`CanvasClient`] are thin
//! views that build URLs and settings on top of it.
//!
//! Every operation takes a [`CancellationToken`]; a fired token surfaces as
//! [`Error::Cancelled`].
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use canvas_lms_client::settings::{CourseList, ListSettings};
//! use canvas_lms_client::{CanvasClientBuilder, CancellationToken};
//! use futures::TryStreamExt;
//!
//! #[tokio::main]
//! async fn main() -> canvas_lms_client::Result<()> {
//!     let client = CanvasClientBuilder::new()
//!         .via_http("https://canvas.example.edu", "access-token")?
//!         .build()?;
//!     let cancel = CancellationToken::new();
//!
//!     let settings = CourseList::new().with_list(ListSettings::new().with_page_size(100));
//!     let mut courses = client.courses().list_for_current_user(&settings, &cancel);
//!     while let Some(course) = courses.try_next().await? {
//!         println!("{} [{:?}]", course.name, course.term.map(|t| t.name));
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Module Organization
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`client`] | Client builder and per-resource facades |
//! | [`transport`] | Connection, pagination, uploads, error classification |
//! | [`settings`] | List and item settings rendered as query parameters |
//! | [`params`] | Query-string parameter encoding |
//! | [`types`] | Entity records returned by Canvas |

pub mod client;
pub mod params;
pub mod settings;
pub mod transport;
pub mod types;

pub use client::{CanvasClient, CanvasClientBuilder};
pub use error::UploadStage;
pub use params::{Parameter, Parameters};
pub use tokio_util::sync::CancellationToken;
pub use transport::{Connection, ConnectionBuilder};

use futures::Stream;
use std::pin::Pin;

/// Result type alias for the library
pub type Result<T> = std::result::Result<T, Error>;

/// A pinned, boxed stream of `Result<T>` items.
pub type BoxStream<'a, T> = Pin<Box<dyn Stream<Item = Result<T>> + Send + 'a>>;

/// Error type for the library
pub mod error;
pub use error::{Error, ErrorContext};
