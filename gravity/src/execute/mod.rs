//! Execute handlers for the Gravity bridge contract.
//!
//! This module contains all execute message handlers, organized by component:
//! - `delegate` - Validator directory: delegate keys, static validators, power feed
//! - `attestation` - Claim voting, observation and claim side effects
//! - `valset` - Valset requests and confirmations
//! - `batch` - Outgoing pool, batches and batch confirmations
//! - `block` - Periodic housekeeping
//! - `admin` - Config, token registry, pause and admin transfer

mod admin;
mod attestation;
mod batch;
mod block;
mod delegate;
mod valset;

pub use admin::*;
pub use attestation::*;
pub use batch::*;
pub use block::*;
pub use delegate::*;
pub use valset::*;
