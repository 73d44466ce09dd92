//! Caller-owned ratchet counter bookkeeping.
//!
//! The protocol core never stores counters. [`RatchetCounters`] is a plain
//! value the caller keeps per peer, persists however it likes (it is serde
//! serialisable), and passes into
//! [`receive_psk_message`](crate::receive_psk_message).

use serde::{Deserialize, Serialize};

use crate::psk_ratchet::in_window_of;
use crate::psk_types::PSK_COUNTER_WINDOW;
use crate::types::{AlgoChatError, Result};

/// Send and receive counters for a PSK conversation with a single peer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RatchetCounters {
    send_counter: u32,
    last_accepted: Option<u32>,
    #[serde(default = "default_window")]
    window: u32,
}

fn default_window() -> u32 {
    PSK_COUNTER_WINDOW
}

impl RatchetCounters {
    /// Fresh state: nothing sent, nothing received, default window.
    pub fn new() -> Self {
        Self {
            send_counter: 0,
            last_accepted: None,
            window: PSK_COUNTER_WINDOW,
        }
    }

    /// Override the receive window.
    pub fn with_window(mut self, window: u32) -> Self {
        self.window = window;
        self
    }

    /// Resume from a known send position.
    pub fn with_send_counter(mut self, send_counter: u32) -> Self {
        self.send_counter = send_counter;
        self
    }

    /// The counter the next outgoing message will use.
    pub fn send_counter(&self) -> u32 {
        self.send_counter
    }

    /// Highest counter accepted from the peer so far.
    pub fn last_accepted(&self) -> Option<u32> {
        self.last_accepted
    }

    /// Receive window in counter steps.
    pub fn window(&self) -> u32 {
        self.window
    }

    /// Returns the counter for the next outgoing message and advances.
    ///
    /// The last usable counter is `u32::MAX - 1`; the counter never wraps.
    pub fn next_send_counter(&mut self) -> Result<u32> {
        let counter = self.send_counter;
        self.send_counter = counter
            .checked_add(1)
            .ok_or(AlgoChatError::CounterExhausted)?;
        Ok(counter)
    }

    /// Validates a received counter without recording it.
    ///
    /// Accepts `[last, last + window]` minus `last` itself. Before anything
    /// is accepted the base is 0 and 0 is allowed.
    pub fn check_receive(&self, counter: u32) -> Result<()> {
        let base = self.last_accepted.unwrap_or(0);

        if self.last_accepted == Some(counter) {
            return Err(AlgoChatError::CounterReplayed(counter));
        }

        if !in_window_of(counter, base, self.window) {
            tracing::debug!(
                counter,
                last_accepted = base,
                window = self.window,
                "counter outside window"
            );
            return Err(AlgoChatError::CounterOutOfWindow {
                counter,
                last_accepted: base,
                window: self.window,
            });
        }

        Ok(())
    }

    /// Validates and records a received counter.
    pub fn accept(&mut self, counter: u32) -> Result<()> {
        self.check_receive(counter)?;
        self.last_accepted = Some(counter);
        Ok(())
    }
}

impl Default for RatchetCounters {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_state() {
        let state = RatchetCounters::new();
        assert_eq!(state.send_counter(), 0);
        assert_eq!(state.last_accepted(), None);
        assert_eq!(state.window(), PSK_COUNTER_WINDOW);
        assert_eq!(state, RatchetCounters::default());
    }

    #[test]
    fn test_advance_send_counter() {
        let mut state = RatchetCounters::new();
        assert_eq!(state.next_send_counter().unwrap(), 0);
        assert_eq!(state.next_send_counter().unwrap(), 1);
        assert_eq!(state.next_send_counter().unwrap(), 2);
        assert_eq!(state.send_counter(), 3);
    }

    #[test]
    fn test_send_counter_never_wraps() {
        let mut state = RatchetCounters::new().with_send_counter(u32::MAX - 1);
        assert_eq!(state.next_send_counter().unwrap(), u32::MAX - 1);
        assert!(matches!(
            state.next_send_counter(),
            Err(AlgoChatError::CounterExhausted)
        ));
        assert_eq!(state.send_counter(), u32::MAX);
    }

    #[test]
    fn test_validate_and_record() {
        let mut state = RatchetCounters::new();

        state.accept(0).unwrap();
        assert_eq!(state.last_accepted(), Some(0));

        state.accept(1).unwrap();
        state.accept(5).unwrap();
        assert_eq!(state.last_accepted(), Some(5));
    }

    #[test]
    fn test_replay_detection() {
        let mut state = RatchetCounters::new();
        state.accept(0).unwrap();
        assert!(matches!(
            state.check_receive(0),
            Err(AlgoChatError::CounterReplayed(0))
        ));
    }

    #[test]
    fn test_counter_window() {
        let mut state = RatchetCounters::new();
        state.accept(150).unwrap();

        assert!(state.check_receive(350).is_ok());
        assert!(matches!(
            state.check_receive(351),
            Err(AlgoChatError::CounterOutOfWindow { counter: 351, last_accepted: 150, window: 200 })
        ));
        assert!(matches!(
            state.check_receive(149),
            Err(AlgoChatError::CounterOutOfWindow { .. })
        ));
    }

    #[test]
    fn test_first_receive_bounded_from_zero() {
        let state = RatchetCounters::new();
        assert!(state.check_receive(PSK_COUNTER_WINDOW).is_ok());
        assert!(state.check_receive(PSK_COUNTER_WINDOW + 1).is_err());
    }

    #[test]
    fn test_rejected_counter_is_not_recorded() {
        let mut state = RatchetCounters::new();
        state.accept(10).unwrap();
        assert!(state.accept(5).is_err());
        assert_eq!(state.last_accepted(), Some(10));
    }

    #[test]
    fn test_custom_window() {
        let mut state = RatchetCounters::new().with_window(5);
        state.accept(0).unwrap();
        assert!(state.check_receive(5).is_ok());
        assert!(state.check_receive(6).is_err());
    }

    #[test]
    fn test_serde_roundtrip() {
        let mut state = RatchetCounters::new().with_window(50);
        state.next_send_counter().unwrap();
        state.accept(7).unwrap();

        let json = serde_json::to_string(&state).unwrap();
        let restored: RatchetCounters = serde_json::from_str(&json).unwrap();
        assert_eq!(restored, state);
    }

    #[test]
    fn test_missing_window_uses_default() {
        let restored: RatchetCounters =
            serde_json::from_str(r#"{"send_counter":3,"last_accepted":null}"#).unwrap();
        assert_eq!(restored.window(), PSK_COUNTER_WINDOW);
        assert_eq!(restored.send_counter(), 3);
    }
}
