//! Poll subdomain
//!
//! - [`entities`]: [`Poll`](entities::Poll), [`Choice`](entities::Choice) and lifecycle state
//! - [`duration`]: compact duration strings (`1d2h3m4s`)
//! - [`symbol`]: reserved control symbols and reaction classification
//! - [`choice_input`]: parsing `<symbol> <text>` choice proposals
//! - [`content`]: what the poll message displays
//!
//! # Lifecycle
//!
//! ```text
//!   create ──▶ Open ──(end date reached, daemon tick)──▶ Ended
//!               │                                          │
//!               └──────────────(delete, confirmed)─────────┴──▶ Deleted
//! ```
//!
//! Manual end only moves the end date to "now"; the next daemon tick
//! performs the transition.

pub mod choice_input;
pub mod content;
pub mod duration;
pub mod entities;
pub mod symbol;
