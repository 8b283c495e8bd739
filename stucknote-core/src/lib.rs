//! # stucknote-core
//!
//! Library backend for stucknote, a live MIDI stuck-note monitor. Watches a
//! stream of raw MIDI packets and reports Note On events that are never
//! followed by a matching Note Off within a configurable timeout — the
//! classic "stuck note" symptom of controllers or software that drop
//! Note Off messages.
//!
//! Device access is not in this crate: the monitor consumes an abstract
//! packet feed (a channel of raw messages) and a cancel channel, so any
//! backend that can produce raw MIDI bytes plugs in.
//!
//! ```rust,ignore
//! use stucknote_core::config::Config;
//! use stucknote_core::monitor::{Monitor, MonitorError, Packet};
//!
//! let config = Config::load().monitor_config();
//! let (packet_tx, packet_rx) = crossbeam_channel::bounded::<Packet>(16);
//! let (cancel_tx, cancel_rx) = crossbeam_channel::bounded::<()>(1);
//!
//! // Feed packet_tx from a MIDI input callback, then:
//! let mut sink = |key: u8| eprintln!("Missing Note Off for {}", key);
//! match Monitor::new(config).run(packet_rx, cancel_rx, &mut sink) {
//!     MonitorError::Cancelled => {}
//!     MonitorError::Transport(e) => eprintln!("{}", e),
//! }
//! ```
//!
//! ## Module overview
//!
//! - [`midi`] — raw message classification (Note On / Note Off / ignored)
//! - [`tracker`] — per-note lifecycle state and the timeout sweep
//! - [`monitor`] — the sequential event loop merging packets and sweep ticks
//! - [`config`] — TOML configuration (embedded defaults + user override)

pub mod config;
pub mod midi;
pub mod monitor;
pub mod tracker;
