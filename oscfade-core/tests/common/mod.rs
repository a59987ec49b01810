#![allow(dead_code)]
//! Test harness: a fake console on loopback and a bridge pointed at it.

use std::net::{IpAddr, Ipv4Addr, SocketAddr, UdpSocket};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use rosc::{OscMessage, OscPacket, OscType};

use oscfade_core::{Bridge, Config, ParameterStore};

pub const LOCALHOST: IpAddr = IpAddr::V4(Ipv4Addr::LOCALHOST);

/// A UDP peer standing in for the mixing console.
pub struct FakeDesk {
    socket: UdpSocket,
}

impl FakeDesk {
    pub fn bind() -> Self {
        let socket = UdpSocket::bind("127.0.0.1:0").unwrap();
        Self { socket }
    }

    pub fn port(&self) -> u16 {
        self.socket.local_addr().unwrap().port()
    }

    /// Next message the bridge sent, with the address it came from.
    pub fn recv(&self, timeout: Duration) -> Option<(OscMessage, SocketAddr)> {
        self.socket.set_read_timeout(Some(timeout)).unwrap();
        let mut buf = [0u8; rosc::decoder::MTU];
        let (n, from) = self.socket.recv_from(&mut buf).ok()?;
        match rosc::decoder::decode_udp(&buf[..n]).ok()? {
            (_, OscPacket::Message(msg)) => Some((msg, from)),
            (_, OscPacket::Bundle(_)) => None,
        }
    }

    /// Collect messages for `address` until one carries exactly `value`.
    pub fn recv_until_value(&self, address: &str, value: f32, timeout: Duration) -> Vec<OscMessage> {
        let start = Instant::now();
        let mut seen = Vec::new();
        while start.elapsed() < timeout {
            let Some((msg, _)) = self.recv(Duration::from_millis(100)) else {
                continue;
            };
            if msg.addr != address {
                continue;
            }
            let done = msg.args == vec![OscType::Float(value)];
            seen.push(msg);
            if done {
                return seen;
            }
        }
        panic!("Timed out waiting for {} = {} (saw {:?})", address, value, seen);
    }

    pub fn send(&self, to: SocketAddr, addr: &str, args: Vec<OscType>) {
        let packet = OscPacket::Message(OscMessage {
            addr: addr.to_string(),
            args,
        });
        let buf = rosc::encoder::encode(&packet).unwrap();
        self.socket.send_to(&buf, to).unwrap();
    }
}

/// Bridge on loopback with ephemeral ports, talking to `desk`.
pub fn start_bridge(desk: &FakeDesk, query_delay_ms: u64) -> Bridge {
    let config = Config::with_overrides(&format!(
        "[network]\nbind_host = \"127.0.0.1\"\ncommand_port = 0\nresponse_port = 0\nconsole_port = {}\n\n[fade]\nquery_delay_ms = {}\n",
        desk.port(),
        query_delay_ms
    ))
    .unwrap();
    Bridge::start(&config, LOCALHOST).unwrap()
}

/// Start the command loop on a background thread.
pub fn run_bridge(bridge: Bridge) -> (SocketAddr, SocketAddr, Arc<ParameterStore>) {
    let command_addr = bridge.command_addr().unwrap();
    let response_addr = bridge.response_addr().unwrap();
    let store = bridge.store();
    thread::spawn(move || bridge.run());
    (command_addr, response_addr, store)
}

/// Send an OSC message from a throwaway socket, as a show controller would.
pub fn send_command(to: SocketAddr, addr: &str, args: Vec<OscType>) {
    let socket = UdpSocket::bind("127.0.0.1:0").unwrap();
    let packet = OscPacket::Message(OscMessage {
        addr: addr.to_string(),
        args,
    });
    socket
        .send_to(&rosc::encoder::encode(&packet).unwrap(), to)
        .unwrap();
}

/// Poll `check` until it holds or `timeout` elapses.
pub fn wait_for<F: Fn() -> bool>(check: F, timeout: Duration) -> bool {
    let start = Instant::now();
    while start.elapsed() < timeout {
        if check() {
            return true;
        }
        thread::sleep(Duration::from_millis(5));
    }
    check()
}
