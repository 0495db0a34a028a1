//! AskMarket Types - Canonical domain types for the prompt marketplace
//!
//! This crate contains all foundational types for AskMarket with zero
//! dependencies on other askmarket crates:
//!
//! - Identity types (AccountId, RequestId)
//! - Fee amounts with checked arithmetic
//! - Request, Response and Rating records
//! - Marketplace notifications
//! - The marketplace error taxonomy
//!
//! # Request lifecycle
//!
//! ```text
//! request_standard ─→ Pending ────────┐
//!                                     ├─→ provide_response ─→ Completed ─→ rate_response
//! request_premium  ─→ PremiumPending ─┘
//! ```

pub mod identity;
pub mod amount;
pub mod request;
pub mod rating;
pub mod event;
pub mod error;

pub use identity::*;
pub use amount::*;
pub use request::*;
pub use rating::*;
pub use event::*;
pub use error::*;

/// Version of the AskMarket types schema
pub const TYPES_VERSION: &str = "0.1.0";

/// Logical timestamp (block height or monotonic milliseconds, depending on the clock)
pub type Timestamp = u64;
