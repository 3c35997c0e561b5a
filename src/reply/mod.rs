//! # Reply Module
//!
//! The single-slot handoff that bridges a handler's one computed result back
//! to the point where the HTTP response is assembled. Each request gets its
//! own slot; the slot is filled at most once and drained exactly once.

mod core;

pub use self::core::{reply_slot, ReplyReceiver, ReplySlot, EMPTY_BODY};
