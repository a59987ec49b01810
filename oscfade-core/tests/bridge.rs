mod common;

use std::net::UdpSocket;
use std::time::Duration;

use rosc::OscType;

use oscfade_core::{parse_console_ip, Bridge, Config, StartupError};
use oscfade_types::{ParamId, ParameterClass};

use common::{FakeDesk, LOCALHOST};

#[test]
fn channel_fade_queries_then_ramps_from_reported_value() {
    let desk = FakeDesk::bind();
    let bridge = common::start_bridge(&desk, 150);
    let (command_addr, _, store) = common::run_bridge(bridge);
    let id = ParamId::new(ParameterClass::Channel, 5).unwrap();

    common::send_command(
        command_addr,
        "/fade/channel",
        vec![OscType::Int(5), OscType::Float(0.75), OscType::Float(0.25)],
    );

    // The query comes first, from the response socket
    let (query, from) = desk.recv(Duration::from_secs(2)).expect("query");
    assert_eq!(query.addr, "/ch/5/mix/fader");
    assert!(query.args.is_empty());

    // Answer it like the console would
    desk.send(from, "/ch/5/mix/fader", vec![OscType::Float(0.2)]);

    let sets = desk.recv_until_value("/ch/5/mix/fader", 0.75, Duration::from_secs(3));
    let values: Vec<f32> = sets
        .iter()
        .map(|m| match m.args.as_slice() {
            [OscType::Float(v)] => *v,
            other => panic!("Expected one float, got {:?}", other),
        })
        .collect();
    let (interim, last) = values.split_at(values.len() - 1);
    assert_eq!(last, &[0.75]);
    assert!(!interim.is_empty());
    assert!(interim.iter().all(|v| *v > 0.2 && *v < 0.75), "{:?}", interim);

    assert_eq!(store.get(id), 0.75);
}

#[test]
fn zero_duration_fade_sends_one_set() {
    let desk = FakeDesk::bind();
    let bridge = common::start_bridge(&desk, 20);
    let (command_addr, _, _) = common::run_bridge(bridge);

    common::send_command(
        command_addr,
        "/fade/aux",
        vec![OscType::Int(6), OscType::Int(1), OscType::Int(0)],
    );

    let (query, _) = desk.recv(Duration::from_secs(2)).expect("query");
    assert_eq!(query.addr, "/auxin/6/mix/fader");
    let (set, _) = desk.recv(Duration::from_secs(2)).expect("final set");
    assert_eq!(set.args, vec![OscType::Float(1.0)]);
    assert!(desk.recv(Duration::from_millis(200)).is_none());
}

#[test]
fn unsolicited_reports_update_the_store() {
    let desk = FakeDesk::bind();
    let bridge = common::start_bridge(&desk, 0);
    let (_, response_addr, store) = common::run_bridge(bridge);

    desk.send(response_addr, "/bus/x/mix/fader", vec![OscType::Float(0.5)]);
    desk.send(response_addr, "/bus/16/mix/fader", vec![OscType::Float(0.33)]);

    let id = ParamId::new(ParameterClass::Bus, 16).unwrap();
    assert!(common::wait_for(|| store.get(id) == 0.33, Duration::from_secs(2)));
    let buses = store.snapshot(ParameterClass::Bus);
    assert!(buses[..15].iter().all(|v| *v == 0.0));
}

#[test]
fn invalid_and_unrouted_commands_reach_nothing() {
    let desk = FakeDesk::bind();
    let bridge = common::start_bridge(&desk, 0);
    let (command_addr, _, store) = common::run_bridge(bridge);

    common::send_command(
        command_addr,
        "/fade/bus",
        vec![OscType::Int(17), OscType::Float(0.5), OscType::Float(1.0)],
    );
    common::send_command(
        command_addr,
        "/fade/dca",
        vec![OscType::Int(1), OscType::Float(0.5), OscType::Float(1.0)],
    );
    common::send_command(
        command_addr,
        "/fade/channel",
        vec![OscType::Int(1), OscType::Float(0.5), OscType::Float(61.0)],
    );

    assert!(desk.recv(Duration::from_millis(400)).is_none());
    assert!(store.snapshot(ParameterClass::Bus).iter().all(|v| *v == 0.0));
}

#[test]
fn slow_command_does_not_block_the_next() {
    let desk = FakeDesk::bind();
    let bridge = common::start_bridge(&desk, 300);
    let (command_addr, _, _) = common::run_bridge(bridge);

    common::send_command(
        command_addr,
        "/fade/channel",
        vec![OscType::Int(1), OscType::Float(0.5), OscType::Float(0.0)],
    );
    common::send_command(
        command_addr,
        "/fade/channel",
        vec![OscType::Int(2), OscType::Float(0.5), OscType::Float(0.0)],
    );

    // Both queries arrive well before either query delay has run out
    let (first, _) = desk.recv(Duration::from_millis(250)).expect("first query");
    let (second, _) = desk.recv(Duration::from_millis(250)).expect("second query");
    let mut addrs = vec![first.addr, second.addr];
    addrs.sort();
    assert_eq!(addrs, vec!["/ch/1/mix/fader", "/ch/2/mix/fader"]);
}

#[test]
fn busy_command_port_is_a_startup_error() {
    let taken = UdpSocket::bind("127.0.0.1:0").unwrap();
    let port = taken.local_addr().unwrap().port();
    let config = Config::with_overrides(&format!(
        "[network]\nbind_host = \"127.0.0.1\"\ncommand_port = {}\nresponse_port = 0\n",
        port
    ))
    .unwrap();

    match Bridge::start(&config, LOCALHOST) {
        Err(StartupError::Bind { addr, .. }) => assert_eq!(addr, format!("127.0.0.1:{}", port)),
        Err(other) => panic!("Expected bind error, got {}", other),
        Ok(_) => panic!("Expected bind error"),
    }
}

#[test]
fn console_ip_must_parse() {
    assert!(parse_console_ip("192.168.0.64").is_ok());
    assert!(parse_console_ip("::1").is_ok());
    assert!(matches!(
        parse_console_ip("desk.local"),
        Err(StartupError::InvalidConsoleAddress(_))
    ));
    assert!(matches!(
        parse_console_ip("300.1.1.1"),
        Err(StartupError::InvalidConsoleAddress(_))
    ));
}

#[test]
fn failed_startup_releases_the_response_port() {
    let taken = UdpSocket::bind("127.0.0.1:0").unwrap();
    let command_port = taken.local_addr().unwrap().port();
    let response_port = {
        let free = UdpSocket::bind("127.0.0.1:0").unwrap();
        free.local_addr().unwrap().port()
    };
    let config = Config::with_overrides(&format!(
        "[network]\nbind_host = \"127.0.0.1\"\ncommand_port = {}\nresponse_port = {}\n",
        command_port, response_port
    ))
    .unwrap();

    assert!(matches!(
        Bridge::start(&config, LOCALHOST),
        Err(StartupError::Bind { .. })
    ));
    // No response loop is left holding the socket
    assert!(UdpSocket::bind(("127.0.0.1", response_port)).is_ok());
}
