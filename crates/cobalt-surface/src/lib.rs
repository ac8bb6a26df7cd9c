//! Cobalt scenario surface cache
//!
//! Idempotent, content-addressed request/response cache for scenario
//! surface computations.
//!
//! # Core Concepts
//!
//! - [`Fingerprint`]: 16 hex character SHA-256 prefix of the canonical payload
//! - [`SurfaceCache`]: `submit` registers a request, `poll` completes it once
//!   and memoizes the result
//! - [`SurfaceEntry`]: `pending` → `completed`, never backwards
//!
//! # Example
//!
//! ```rust,ignore
//! use cobalt_surface::{SurfaceCache, SurfaceStatus};
//!
//! let cache = SurfaceCache::open("data/scenario_surfaces.json");
//! let submission = cache.submit(&owner, &request)?;
//! if submission.status == SurfaceStatus::Pending {
//!     let result = cache.poll(&submission.fingerprint)?;
//!     println!("{:?} with {} samples", result.plot_type, result.sample_count());
//! }
//! ```

#![warn(unreachable_pub)]
#![allow(missing_docs)]

mod cache;
mod entry;
mod error;
mod fingerprint;
pub mod synth;

pub use cache::SurfaceCache;
pub use entry::{
    PlotType, Submission, SurfaceDocument, SurfaceEntry, SurfaceResult, SurfaceStatus,
};
pub use error::SurfaceError;
pub use fingerprint::{canonicalize, Fingerprint, FingerprintError, FINGERPRINT_LEN};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
