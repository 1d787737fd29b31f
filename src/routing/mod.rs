//! Routing subsystem.
//!
//! # Data Flow
//! ```text
//! Startup:
//!     Vec<Endpoint>
//!     → collision.rs (validators resolve, no ambiguous pair)
//!     → index.rs (bucket by method + fragment count)
//!     → Index (immutable, shared via Arc)
//!
//! Per request:
//!     path → fragments.rs (split, then percent-decode)
//!     → index.rs (bucket lookup, O(1))
//!     → matcher.rs (scan bucket, run capture validators)
//!     → Match { endpoint, captures } or no match
//! ```
//!
//! # Design Decisions
//! - Routes compiled at startup, immutable at runtime
//! - Deterministic: same input always matches same endpoint
//! - First match wins (declaration order), safe after the collision check

pub mod collision;
pub mod fragments;
pub mod index;
pub mod matcher;

pub use collision::{collide, runtime_check, CheckError, CheckResult};
pub use fragments::{decode_fragments, split_path};
pub use index::{build_index, dispatch_key, Index, Match};
pub use matcher::{match_endpoint, CaptureMap};
