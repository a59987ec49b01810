//! Address-pattern dispatch and the UDP receive loop that feeds it.

use std::io;
use std::net::UdpSocket;
use std::sync::Arc;
use std::thread;

use log::{debug, error, trace, warn};
use rosc::{OscMessage, OscPacket};

/// Callback for one decoded message.
pub type Handler = Arc<dyn Fn(&OscMessage) + Send + Sync>;

/// Which addresses a handler is registered for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AddressPattern {
    /// Every message (`"*"`).
    Any,
    Exact(String),
}

impl AddressPattern {
    pub fn parse(pattern: &str) -> Self {
        if pattern == "*" {
            AddressPattern::Any
        } else {
            AddressPattern::Exact(pattern.to_string())
        }
    }

    pub fn matches(&self, addr: &str) -> bool {
        match self {
            AddressPattern::Any => true,
            AddressPattern::Exact(p) => p == addr,
        }
    }
}

/// How matched handlers are invoked.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Delivery {
    /// On the receive thread, one message at a time.
    Inline,
    /// Each invocation on a fresh thread, so a slow handler never stalls
    /// the receive loop.
    Spawned,
}

/// Routes decoded messages to handlers by address. Messages that match no
/// pattern are dropped.
pub struct Dispatcher {
    name: String,
    routes: Vec<(AddressPattern, Handler)>,
    delivery: Delivery,
}

impl Dispatcher {
    pub fn new(name: &str, delivery: Delivery) -> Self {
        Self {
            name: name.to_string(),
            routes: Vec::new(),
            delivery,
        }
    }

    pub fn add_handler<F>(&mut self, pattern: &str, handler: F)
    where
        F: Fn(&OscMessage) + Send + Sync + 'static,
    {
        self.routes.push((AddressPattern::parse(pattern), Arc::new(handler)));
    }

    /// Dispatch every message in `packet`, descending into bundles.
    /// Returns how many handler invocations were made.
    pub fn dispatch_packet(&self, packet: &OscPacket) -> usize {
        match packet {
            OscPacket::Message(msg) => self.dispatch_message(msg),
            OscPacket::Bundle(bundle) => bundle
                .content
                .iter()
                .map(|p| self.dispatch_packet(p))
                .sum(),
        }
    }

    pub fn dispatch_message(&self, msg: &OscMessage) -> usize {
        let mut invoked = 0;
        for (pattern, handler) in &self.routes {
            if !pattern.matches(&msg.addr) {
                continue;
            }
            invoked += 1;
            match self.delivery {
                Delivery::Inline => handler(msg),
                Delivery::Spawned => {
                    let handler = Arc::clone(handler);
                    let msg = msg.clone();
                    let spawned = thread::Builder::new()
                        .name(format!("{} {}", self.name, msg.addr))
                        .spawn(move || handler(&msg));
                    if let Err(e) = spawned {
                        error!(target: "dispatch", "{}: failed spawning handler: {}", self.name, e);
                    }
                }
            }
        }
        if invoked == 0 {
            trace!(target: "dispatch", "{}: no handler for {}", self.name, msg.addr);
        }
        invoked
    }
}

/// Receive loop: decode each datagram on `socket` and hand it to `dispatcher`.
///
/// Runs until the socket fails. Undecodable datagrams are logged and skipped.
pub fn serve(socket: UdpSocket, dispatcher: Dispatcher) -> io::Error {
    let mut buf = [0u8; rosc::decoder::MTU];
    loop {
        match socket.recv_from(&mut buf) {
            Ok((n, from)) => match rosc::decoder::decode_udp(&buf[..n]) {
                Ok((_, packet)) => {
                    dispatcher.dispatch_packet(&packet);
                }
                Err(e) => {
                    debug!(target: "dispatch", "{}: undecodable packet from {}: {:?}", dispatcher.name, from, e)
                }
            },
            Err(ref e)
                if matches!(
                    e.kind(),
                    io::ErrorKind::WouldBlock
                        | io::ErrorKind::TimedOut
                        | io::ErrorKind::Interrupted
                        | io::ErrorKind::ConnectionReset
                ) =>
            {
                continue
            }
            Err(e) => {
                warn!(target: "dispatch", "{}: receive loop exiting: {}", dispatcher.name, e);
                return e;
            }
        }
    }
}
