use may::sync::mpsc;
use serde_json::Value;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Sentinel body used when a handler completes without sending a payload.
pub const EMPTY_BODY: &str = "";

/// Create a connected send/drain pair for one request.
///
/// The [`ReplySlot`] travels with the request context into the handler; the
/// [`ReplyReceiver`] stays with the runner, which drains it once the handler
/// has run to completion.
#[must_use]
pub fn reply_slot() -> (ReplySlot, ReplyReceiver) {
    let (tx, rx) = mpsc::channel();
    let filled = Arc::new(AtomicBool::new(false));
    (
        ReplySlot {
            filled: filled.clone(),
            tx,
        },
        ReplyReceiver { filled, rx },
    )
}

/// Send side of the per-request result slot.
///
/// Capacity is one: the first `send` wins, later sends are silently dropped.
#[derive(Debug, Clone)]
pub struct ReplySlot {
    filled: Arc<AtomicBool>,
    tx: mpsc::Sender<Value>,
}

impl ReplySlot {
    /// Hand off the handler's result. A no-op if the slot is already filled.
    pub fn send(&self, value: Value) {
        if !self.filled.swap(true, Ordering::AcqRel) {
            let _ = self.tx.send(value);
        }
    }

    /// Force-complete with the empty-body sentinel. A no-op if the slot is
    /// already filled, so a value sent earlier is never overwritten.
    ///
    /// The runner calls this only after the handler has run to completion,
    /// which is what guarantees [`ReplyReceiver::receive`] never waits on a
    /// handler that forgot to send.
    pub fn finish(&self) {
        if !self.filled.swap(true, Ordering::AcqRel) {
            let _ = self.tx.send(Value::String(EMPTY_BODY.to_string()));
        }
    }

    #[must_use]
    pub fn is_filled(&self) -> bool {
        self.filled.load(Ordering::Acquire)
    }
}

/// Drain side of the per-request result slot. Consumed by value: a slot is
/// drained exactly once.
pub struct ReplyReceiver {
    filled: Arc<AtomicBool>,
    rx: mpsc::Receiver<Value>,
}

impl ReplyReceiver {
    /// Yield the filled value, or the empty-body sentinel if nothing was
    /// ever sent. Does not block when the slot was never filled.
    #[must_use]
    pub fn receive(self) -> Value {
        if !self.filled.load(Ordering::Acquire) {
            return Value::String(EMPTY_BODY.to_string());
        }
        self.rx
            .recv()
            .unwrap_or_else(|_| Value::String(EMPTY_BODY.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_send_then_receive() {
        let (slot, rx) = reply_slot();
        slot.send(json!({"ok": true}));
        assert!(slot.is_filled());
        assert_eq!(rx.receive(), json!({"ok": true}));
    }

    #[test]
    fn test_second_send_is_dropped() {
        let (slot, rx) = reply_slot();
        slot.send(json!("first"));
        slot.send(json!("second"));
        assert_eq!(rx.receive(), json!("first"));
    }

    #[test]
    fn test_finish_after_send_keeps_value() {
        let (slot, rx) = reply_slot();
        slot.send(json!(42));
        slot.finish();
        assert_eq!(rx.receive(), json!(42));
    }

    #[test]
    fn test_finish_without_send_yields_sentinel() {
        let (slot, rx) = reply_slot();
        slot.finish();
        assert_eq!(rx.receive(), json!(EMPTY_BODY));
    }

    #[test]
    fn test_receive_without_any_completion_yields_sentinel() {
        let (_slot, rx) = reply_slot();
        assert_eq!(rx.receive(), json!(EMPTY_BODY));
    }
}
