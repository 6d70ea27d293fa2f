//! Core logic for the Whetstone active-model service.
//!
//! An active model is the runtime binding created when a provisioning policy
//! claims a node; it carries an append-only state-transition log. This crate
//! holds the parts with real decisions in them:
//!
//! - [`selector`]: reconciling the three mutually-exclusive ways a request
//!   can identify its target (node uuid, hardware id, owning policy)
//! - [`authz`]: the two origin-based access tiers (server-only, subnet-only)
//! - [`logview`]: turning raw state logs into elapsed-time-annotated rows,
//!   merged and ordered across records
//! - [`filter`]: `key=value+key=value` attribute filtering of result sets
//!
//! The HTTP transport and the object store live in sibling crates; every
//! function here returns an explicit [`ApiError`] instead of relying on the
//! transport to guess.

pub mod authz;
pub mod error;
pub mod filter;
pub mod logview;
pub mod selector;

pub use authz::{AuthTier, OriginPolicy, Subnet};
pub use error::ApiError;
pub use logview::LogRow;
pub use selector::{Resolution, Selector};
