//! midir-backed packet source.
//!
//! Turns a hardware MIDI input port into the channel feed the monitor loop
//! consumes. Buffer management lives here, on the source side: the channel
//! is bounded and a full buffer drops the packet rather than blocking the
//! driver callback.

use crossbeam_channel::{bounded, Receiver, TrySendError};
use midir::{Ignore, MidiInput, MidiInputConnection};

use stucknote_core::monitor::Packet;

/// Bounded buffer between the driver callback and the monitor loop,
/// absorbing bursts from the device.
const QUEUE_SIZE: usize = 16;

const CLIENT_NAME: &str = "stucknote";

/// An open MIDI input connection. Dropping it closes the port, which
/// disconnects the packet feed and terminates the monitor.
pub struct PacketSource {
    _connection: MidiInputConnection<()>,
    pub port_name: String,
}

/// List the names of all available MIDI input ports.
pub fn list_ports() -> Result<Vec<String>, String> {
    let mut midi_in = MidiInput::new(CLIENT_NAME).map_err(|e| e.to_string())?;
    midi_in.ignore(Ignore::None);

    let mut names = Vec::new();
    for port in midi_in.ports() {
        names.push(
            midi_in
                .port_name(&port)
                .unwrap_or_else(|_| "<unknown>".to_string()),
        );
    }
    Ok(names)
}

/// Open the first input port whose name contains `device`
/// (case-insensitive) and start forwarding its raw messages.
pub fn connect(device: &str) -> Result<(PacketSource, Receiver<Packet>), String> {
    let mut midi_in = MidiInput::new(CLIENT_NAME).map_err(|e| e.to_string())?;
    midi_in.ignore(Ignore::None);

    let ports = midi_in.ports();
    let wanted = device.to_lowercase();
    let port = ports
        .iter()
        .find(|p| {
            midi_in
                .port_name(p)
                .map(|n| n.to_lowercase().contains(&wanted))
                .unwrap_or(false)
        })
        .ok_or_else(|| format!("no MIDI input port matching \"{}\" detected", device))?;

    let port_name = midi_in
        .port_name(port)
        .unwrap_or_else(|_| "<unknown>".to_string());

    let (tx, rx) = bounded::<Packet>(QUEUE_SIZE);
    let connection = midi_in
        .connect(
            port,
            "stucknote-in",
            move |_timestamp, message, _| {
                match tx.try_send(Ok(message.to_vec())) {
                    Ok(()) => {}
                    Err(TrySendError::Full(_)) => {
                        log::warn!(target: "source", "packet buffer full, dropping message");
                    }
                    // Monitor already gone; nothing left to feed.
                    Err(TrySendError::Disconnected(_)) => {}
                }
            },
            (),
        )
        .map_err(|e| e.to_string())?;

    Ok((
        PacketSource {
            _connection: connection,
            port_name,
        },
        rx,
    ))
}
