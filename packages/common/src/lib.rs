//! Common - Shared Types and Utilities for Gravity Bridge Contracts
//!
//! This package provides shared type definitions and utility functions
//! used across the Gravity bridge smart contracts.

pub mod asset;

pub use asset::{Asset, AssetInfo};
