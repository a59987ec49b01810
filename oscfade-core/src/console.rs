//! Console abstraction: the two things the fade engine needs from a mixer.
//!
//! `Console` captures what the engine *means* to do (ask for a fader's value,
//! set a fader) independently of how it's done (OSC over UDP). This keeps the
//! command handler and fade task testable without a desk on the network.

use std::fmt;
use std::io;
use std::net::{SocketAddr, ToSocketAddrs, UdpSocket};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;

use crossbeam_channel::{Receiver, Sender};
use rosc::{OscMessage, OscPacket, OscType};

/// Result type for console operations.
pub type ConsoleResult<T = ()> = Result<T, ConsoleError>;

/// Error from a console send.
#[derive(Debug, Clone)]
pub struct ConsoleError(pub String);

impl fmt::Display for ConsoleError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::error::Error for ConsoleError {}

impl From<io::Error> for ConsoleError {
    fn from(e: io::Error) -> Self {
        ConsoleError(e.to_string())
    }
}

impl From<rosc::OscError> for ConsoleError {
    fn from(e: rosc::OscError) -> Self {
        ConsoleError(format!("OSC encode failed: {:?}", e))
    }
}

/// Semantic-level console operations.
pub trait Console: Send + Sync {
    /// Ask the console to report the current value at `address`.
    /// The answer arrives asynchronously on the response socket.
    fn query(&self, address: &str) -> ConsoleResult;

    /// Set the fader at `address` to `value`.
    fn set_fader(&self, address: &str, value: f32) -> ConsoleResult;
}

// ─── OSC over UDP ───────────────────────────────────────────────────

/// Console reached over OSC/UDP.
///
/// Queries and sets go out from the same local socket the response loop
/// listens on, since the console answers to whatever port a request came from.
pub struct OscConsole {
    socket: UdpSocket,
    console_addr: SocketAddr,
}

impl OscConsole {
    pub fn bind<A: ToSocketAddrs>(local: A, console_addr: SocketAddr) -> io::Result<Self> {
        let socket = UdpSocket::bind(local)?;
        Ok(Self {
            socket,
            console_addr,
        })
    }

    pub fn local_addr(&self) -> io::Result<SocketAddr> {
        self.socket.local_addr()
    }

    /// Clone the underlying socket for the response receive loop.
    pub fn try_clone_socket(&self) -> io::Result<UdpSocket> {
        self.socket.try_clone()
    }

    pub fn send_message(&self, addr: &str, args: Vec<OscType>) -> ConsoleResult {
        let msg = OscPacket::Message(OscMessage {
            addr: addr.to_string(),
            args,
        });
        let buf = rosc::encoder::encode(&msg)?;
        self.socket.send_to(&buf, self.console_addr)?;
        Ok(())
    }
}

impl Console for OscConsole {
    fn query(&self, address: &str) -> ConsoleResult {
        self.send_message(address, Vec::new())
    }

    fn set_fader(&self, address: &str, value: f32) -> ConsoleResult {
        self.send_message(address, vec![OscType::Float(value)])
    }
}

// ─── TestConsole ────────────────────────────────────────────────────

/// One message a `TestConsole` accepted. `value` is `None` for queries.
#[derive(Debug, Clone)]
pub struct SentMessage {
    pub address: String,
    pub value: Option<f32>,
}

impl SentMessage {
    pub fn is_query(&self) -> bool {
        self.value.is_none()
    }
}

/// A console that records every message for assertions.
///
/// Sends succeed unless failures are armed with `fail_next_sets` or
/// `set_fail_queries`. Failed sends are counted, not recorded.
pub struct TestConsole {
    sent: Mutex<Vec<SentMessage>>,
    subscribers: Mutex<Vec<Sender<SentMessage>>>,
    fail_queries: AtomicBool,
    fail_sets: AtomicUsize,
    failed: AtomicUsize,
}

impl Default for TestConsole {
    fn default() -> Self {
        Self::new()
    }
}

impl TestConsole {
    pub fn new() -> Self {
        Self {
            sent: Mutex::new(Vec::new()),
            subscribers: Mutex::new(Vec::new()),
            fail_queries: AtomicBool::new(false),
            fail_sets: AtomicUsize::new(0),
            failed: AtomicUsize::new(0),
        }
    }

    /// All messages accepted so far, in send order.
    pub fn sent(&self) -> Vec<SentMessage> {
        self.sent.lock().map(|s| s.clone()).unwrap_or_default()
    }

    /// Messages accepted for one address.
    pub fn sent_to(&self, address: &str) -> Vec<SentMessage> {
        self.sent()
            .into_iter()
            .filter(|m| m.address == address)
            .collect()
    }

    /// Receive every message accepted from now on.
    pub fn subscribe(&self) -> Receiver<SentMessage> {
        let (tx, rx) = crossbeam_channel::unbounded();
        if let Ok(mut subs) = self.subscribers.lock() {
            subs.push(tx);
        }
        rx
    }

    pub fn set_fail_queries(&self, fail: bool) {
        self.fail_queries.store(fail, Ordering::SeqCst);
    }

    /// Make the next `n` fader sets fail.
    pub fn fail_next_sets(&self, n: usize) {
        self.fail_sets.store(n, Ordering::SeqCst);
    }

    pub fn failed_sends(&self) -> usize {
        self.failed.load(Ordering::SeqCst)
    }

    fn record(&self, address: &str, value: Option<f32>) {
        let msg = SentMessage {
            address: address.to_string(),
            value,
        };
        if let Ok(mut subs) = self.subscribers.lock() {
            subs.retain(|tx| tx.send(msg.clone()).is_ok());
        }
        if let Ok(mut sent) = self.sent.lock() {
            sent.push(msg);
        }
    }

    fn fail(&self, what: &str) -> ConsoleResult {
        self.failed.fetch_add(1, Ordering::SeqCst);
        Err(ConsoleError(format!("{} rejected by test console", what)))
    }
}

impl Console for TestConsole {
    fn query(&self, address: &str) -> ConsoleResult {
        if self.fail_queries.load(Ordering::SeqCst) {
            return self.fail("query");
        }
        self.record(address, None);
        Ok(())
    }

    fn set_fader(&self, address: &str, value: f32) -> ConsoleResult {
        let armed = self
            .fail_sets
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok();
        if armed {
            return self.fail("set");
        }
        self.record(address, Some(value));
        Ok(())
    }
}
