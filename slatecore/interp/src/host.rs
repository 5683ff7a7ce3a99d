//! Host-facing channel surface: the interpreter streams events out and
//! receives INPUT lines and a cancellation flag in.
use std::sync::atomic::AtomicBool;
use std::sync::Arc;

use crossbeam_channel::{unbounded, Receiver, Sender};

#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    /// One OUTPUT line, emitted as soon as it is produced.
    Output(String),
    /// Non-fatal diagnostic; never halts the run.
    Warning(String),
    /// The run is blocked until one line arrives on the input channel.
    InputRequest,
    /// Terminal: full newline-joined output log.
    Done(String),
    /// Terminal: rendered diagnostic (`Line <n>: <Kind>: <msg>`, or "stopped").
    Error(String),
}

/// Everything the interpreter holds of its host.
pub struct Host {
    pub events: Sender<Event>,
    pub input: Receiver<String>,
    pub cancel: Arc<AtomicBool>,
}

impl Host {
    /// Build a host plus the far ends a driver needs: the event receiver,
    /// the input sender, and the shared cancel flag.
    pub fn channel() -> (Host, Receiver<Event>, Sender<String>, Arc<AtomicBool>) {
        let (ev_tx, ev_rx) = unbounded::<Event>();
        let (in_tx, in_rx) = unbounded::<String>();
        let cancel = Arc::new(AtomicBool::new(false));
        let host = Host { events: ev_tx, input: in_rx, cancel: cancel.clone() };
        (host, ev_rx, in_tx, cancel)
    }

    pub fn send(&self, ev: Event) {
        let _ = self.events.send(ev);
    }
}
