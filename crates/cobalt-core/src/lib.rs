//! Cobalt Core
//!
//! Wires the per-user collections and the scenario surface cache into one
//! [`Backend`]:
//! - credit ratings and scenarios, each a file-backed owner-keyed store
//! - content-addressed scenario surface requests
//! - seeding of new accounts from the demo owner
//!
//! Authentication and HTTP routing live outside this crate; callers hand
//! in a verified owner id and decoded JSON bodies.
//!
//! # Example
//!
//! ```rust,ignore
//! use cobalt_core::{Backend, CobaltConfig, Collection};
//!
//! let backend = Backend::open(CobaltConfig::load(None)?);
//! backend.on_signup(&owner)?;
//! let listing = backend.list(Collection::Ratings, &owner)?;
//! println!("{} ratings", listing.total);
//! ```

#![warn(unreachable_pub)]
#![allow(missing_docs)]

pub mod backend;
pub mod config;
pub mod error;

pub use backend::{Backend, Collection, Listing, SeedReport};
pub use config::{CobaltConfig, DATA_DIR_ENV};
pub use error::CobaltError;

pub use cobalt_store::{ErrorKind, OwnerId, Record};
pub use cobalt_surface::{Fingerprint, PlotType, Submission, SurfaceEntry, SurfaceStatus};

/// Prelude module for common imports
pub mod prelude {
    //! Common imports for working with Cobalt Core
    pub use crate::{
        Backend, CobaltConfig, CobaltError, Collection, ErrorKind, Listing, OwnerId, Record,
        SurfaceStatus,
    };
}

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
