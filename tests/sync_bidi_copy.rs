use std::io::{Read, Write};
use std::net::{SocketAddr, TcpStream};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use relayws::{ForwardConfig, HandlerConfig, IdleTimeout, Server};

use log::debug;

const ECHO_DATA: &[u8] = b"ECHO ECHO ECHO!";

fn spawn_server(config: HandlerConfig) -> SocketAddr {
    let server = Arc::new(Server::bind("127.0.0.1:0").unwrap());
    let addr = server.local_addr().unwrap();
    thread::spawn(move || server.start(config).unwrap());
    addr
}

fn spawn_bounce() -> SocketAddr {
    let server = Arc::new(Server::bind("127.0.0.1:0").unwrap());
    let addr = server.local_addr().unwrap();
    thread::spawn(move || server.start_bounce().unwrap());
    addr
}

fn connect(addr: SocketAddr) -> TcpStream {
    let tcp = TcpStream::connect(addr).unwrap();
    tcp.set_read_timeout(Some(Duration::from_secs(10))).unwrap();
    tcp
}

// client <=> forward(relay) <=> bounce(server)
#[test]
fn sync_bidi_copy() {
    let _ = env_logger::builder().is_test(true).try_init();

    let bounce = spawn_bounce();
    let forward = {
        let server = Arc::new(Server::bind("127.0.0.1:0").unwrap());
        let addr = server.local_addr().unwrap();
        thread::spawn(move || server.start_forward("127.0.0.1", bounce.port()).unwrap());
        addr
    };

    let mut tcp = connect(forward);
    debug!("client: tcp connected!");

    // not an upgrade request, websocket support answers 400
    tcp.write_all(ECHO_DATA).unwrap();
    let mut buf = vec![0u8; 24];
    tcp.read_exact(&mut buf).unwrap();
    assert_eq!(buf, b"HTTP/1.1 400 Bad Request");
}

#[test]
fn sync_bidi_copy_raw() {
    let _ = env_logger::builder().is_test(true).try_init();

    let bounce = spawn_bounce();
    let config = ForwardConfig::new("127.0.0.1", bounce.port()).with_websocket(false);
    let forward = spawn_server(HandlerConfig::Forward(config));

    let mut tcp = connect(forward);
    debug!("client: tcp connected!");

    let mut buf = vec![0u8; 1024];
    for i in 1..=5 {
        debug!("client: send[{}]..", i);
        tcp.write_all(ECHO_DATA).unwrap();

        tcp.read_exact(&mut buf[..ECHO_DATA.len()]).unwrap();
        assert_eq!(&buf[..ECHO_DATA.len()], ECHO_DATA);
    }

    let data: Vec<u8> = (0..=255).collect();
    tcp.write_all(&data).unwrap();
    tcp.read_exact(&mut buf[..data.len()]).unwrap();
    assert_eq!(&buf[..data.len()], &data[..]);

    debug!("client: close");
}

#[test]
fn sync_bidi_copy_idle_timeout() {
    let _ = env_logger::builder().is_test(true).try_init();

    let bounce = spawn_bounce();
    let config = ForwardConfig::new("127.0.0.1", bounce.port())
        .with_websocket(false)
        .with_idle_timeout(IdleTimeout::from_secs(1));
    let forward = spawn_server(HandlerConfig::Forward(config));

    let mut tcp = connect(forward);
    tcp.write_all(ECHO_DATA).unwrap();
    let mut buf = vec![0u8; ECHO_DATA.len()];
    tcp.read_exact(&mut buf).unwrap();

    let start = Instant::now();
    let n = tcp.read(&mut buf).unwrap();
    assert_eq!(n, 0);
    assert!(start.elapsed() < Duration::from_secs(5));
}

#[test]
fn sync_bidi_copy_upstream_down() {
    let _ = env_logger::builder().is_test(true).try_init();

    let port = {
        let server = Server::bind("127.0.0.1:0").unwrap();
        server.local_addr().unwrap().port()
    };
    let forward = spawn_server(HandlerConfig::Forward(ForwardConfig::new("127.0.0.1", port)));

    // the relay closes the connection, and keeps accepting
    for _ in 0..2 {
        let mut tcp = connect(forward);
        let mut buf = [0u8; 16];
        let n = tcp.read(&mut buf).unwrap_or(0);
        assert_eq!(n, 0);
    }
}
