//! The sequential monitor loop.
//!
//! Packets and sweep ticks are two independent event sources merged into one
//! loop via `crossbeam_channel::select!`, one event per iteration. The note
//! map is owned by this loop alone, so there is no locking anywhere.

use std::fmt;
use std::time::Instant;

use crossbeam_channel::{select, tick, Receiver};

use crate::config::MonitorConfig;
use crate::midi::{self, MidiMessage};
use crate::tracker::{NoteTracker, ViolationSink};

/// One raw MIDI message from the packet source. An `Err` means the stream
/// has failed and no further packets will be delivered.
pub type Packet = Result<Vec<u8>, String>;

/// Why the monitor loop stopped.
#[derive(Debug)]
pub enum MonitorError {
    /// The packet source failed (malformed stream, device disconnect).
    /// Fatal: the monitor does not retry.
    Transport(String),
    /// We were asked to stop. A normal terminal condition, surfaced
    /// distinctly so callers can tell it apart from a broken stream.
    Cancelled,
}

impl fmt::Display for MonitorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Transport(e) => write!(f, "packet source failed: {}", e),
            Self::Cancelled => write!(f, "cancelled"),
        }
    }
}

impl std::error::Error for MonitorError {}

/// Drives a [`NoteTracker`] from a packet feed, sweeping on a fixed cadence.
pub struct Monitor {
    tracker: NoteTracker,
    config: MonitorConfig,
}

impl Monitor {
    pub fn new(config: MonitorConfig) -> Self {
        Self {
            tracker: NoteTracker::new(config.timeout),
            config,
        }
    }

    /// Run until the packet source fails or cancellation is requested,
    /// returning the terminal condition. The loop suspends only while
    /// waiting for the next of {packet, sweep tick, cancel}.
    ///
    /// Dropping the cancel sender also stops the loop: holding it is what
    /// keeps the monitor alive. No note state is drained or reported on
    /// cancellation.
    pub fn run(
        mut self,
        packets: Receiver<Packet>,
        cancel: Receiver<()>,
        sink: &mut impl ViolationSink,
    ) -> MonitorError {
        let ticker = tick(self.config.sweep_interval);
        log::info!(
            target: "monitor",
            "monitoring (timeout {:?}, sweep every {:?})",
            self.config.timeout,
            self.config.sweep_interval
        );

        loop {
            select! {
                recv(cancel) -> _ => {
                    log::info!(target: "monitor", "shutdown requested");
                    return MonitorError::Cancelled;
                }
                recv(packets) -> packet => match packet {
                    Ok(Ok(data)) => self.handle_packet(&data),
                    Ok(Err(e)) => return MonitorError::Transport(e),
                    Err(_) => {
                        return MonitorError::Transport(
                            "packet source disconnected".to_string(),
                        );
                    }
                },
                recv(ticker) -> at => {
                    let now = at.unwrap_or_else(|_| Instant::now());
                    self.tracker.sweep(now, sink);
                }
            }
        }
    }

    fn handle_packet(&mut self, data: &[u8]) {
        if self.config.debug {
            // Debug mode dumps the raw bytes and tracks nothing.
            log::debug!(target: "monitor", "packet: {:02X?}", data);
            return;
        }
        match midi::classify(data) {
            Some(MidiMessage::NoteOn { key }) => self.tracker.note_on(key, Instant::now()),
            Some(MidiMessage::NoteOff { key }) => self.tracker.note_off(key),
            None => {}
        }
    }
}
