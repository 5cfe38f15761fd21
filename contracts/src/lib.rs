//! fyDai CDP Contracts
//!
//! Collateralized debt core of a fixed-maturity lending protocol on Casper.
//!
//! ## Architecture
//!
//! - **Controller**: User ledger of posted collateral and fyDai debt per series
//! - **Treasury**: Reserve manager settling against the money market and Chai
//! - **Access**: Owner/orchestrated registry and per-user delegation
//!
//! ## Collateral
//!
//! - Weth: priced by the money market spot, locked in the market by the Treasury
//! - Chai: priced by the savings index, held by the Treasury
//!
//! ## Debt valuation
//!
//! One fyDai is worth one Dai until its series matures. After maturity the
//! debt grows with the market rate (Weth) or the savings index (Chai), as
//! reported by the fyDai contract.

#![cfg_attr(target_arch = "wasm32", no_std)]

#[cfg(target_arch = "wasm32")]
extern crate alloc;

// Re-export odra for downstream usage
pub use odra;

// Core module declarations
pub mod types;
pub mod errors;
pub mod math;
pub mod events;
pub mod interfaces;
pub mod access;

// Contract modules
pub mod controller;
pub mod treasury;
