use lensctl::{DeviceConfig, Lens, LensError, SessionStatus};
use std::collections::VecDeque;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};

const PROBE: &[u8] = &[0xFF, 0xF1];
const EXIT: &[u8] = &[0x1D];

/// Behaviour of one accepted connection
struct Script {
    focus: Vec<&'static str>,
}

type Log = Arc<Mutex<Vec<(usize, Vec<u8>)>>>;

/// Fake lens adapter. Each accepted connection follows the next script;
/// once the focus readings run out the connection goes silent. The
/// listener closes after the last script is used.
async fn spawn_adapter(scripts: Vec<Script>) -> (SocketAddr, Log) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let log: Log = Arc::new(Mutex::new(Vec::new()));

    let server_log = Arc::clone(&log);
    tokio::spawn(async move {
        for (number, script) in scripts.into_iter().enumerate() {
            let Ok((socket, _)) = listener.accept().await else {
                return;
            };
            tokio::spawn(serve(number, socket, script, Arc::clone(&server_log)));
        }
    });

    (addr, log)
}

async fn serve(number: usize, mut socket: TcpStream, script: Script, log: Log) {
    let mut focus: VecDeque<&str> = script.focus.into();
    let mut silent = false;
    let mut buffer = Vec::new();
    let mut chunk = [0u8; 256];

    if socket.write_all(b"Lens adapter ready\r\n").await.is_err() {
        return;
    }

    loop {
        let n = match socket.read(&mut chunk).await {
            Ok(0) | Err(_) => return,
            Ok(n) => n,
        };
        buffer.extend_from_slice(&chunk[..n]);

        while let Some(pos) = buffer.windows(2).position(|w| w == b"\r\n") {
            let line: Vec<u8> = buffer.drain(..pos + 2).take(pos).collect();
            log.lock().unwrap().push((number, line.clone()));

            if line == EXIT {
                return;
            }
            if silent {
                continue;
            }

            let reply = if line == PROBE {
                "\r\n".to_string()
            } else if line == b"pf" {
                match focus.pop_front() {
                    Some(value) => format!("pf {}\r\n", value),
                    None => {
                        silent = true;
                        continue;
                    }
                }
            } else {
                format!("{} 0\r\n", String::from_utf8_lossy(&line))
            };

            if focus.is_empty() && line == b"pf" {
                silent = true;
            }
            if socket.write_all(reply.as_bytes()).await.is_err() {
                return;
            }
        }
    }
}

fn device_for(addr: SocketAddr) -> DeviceConfig {
    let mut device = DeviceConfig::new("sim", addr.ip().to_string(), addr.port());
    device.connect_timeout_ms = 500;
    device.read_timeout_ms = 300;
    device.probe_timeout_ms = 300;
    device.reconnect_backoff_ms = 50;
    device
}

fn requests_on(log: &Log, connection: usize) -> Vec<Vec<u8>> {
    log.lock()
        .unwrap()
        .iter()
        .filter(|(number, _)| *number == connection)
        .map(|(_, line)| line.clone())
        .collect()
}

async fn wait_for_exit(log: &Log, connection: usize) -> bool {
    for _ in 0..50 {
        if requests_on(log, connection).iter().any(|line| line == EXIT) {
            return true;
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
    false
}

#[tokio::test]
async fn test_startup_sequence_runs_on_connect() {
    let (addr, log) = spawn_adapter(vec![Script { focus: vec!["100"] }]).await;

    let mut lens = Lens::connect(&device_for(addr)).await;
    assert_eq!(lens.session().status(), SessionStatus::Ready);
    assert_eq!(lens.get_focus().await.unwrap(), "100");
    lens.close().await;

    let requests: Vec<Vec<u8>> = requests_on(&log, 0)
        .into_iter()
        .filter(|line| line != PROBE)
        .collect();
    assert_eq!(requests[..3], [b"in".to_vec(), b"la".to_vec(), b"pf".to_vec()]);
}

#[tokio::test]
async fn test_silent_adapter_is_replaced_transparently() {
    let (addr, log) = spawn_adapter(vec![
        Script {
            focus: vec!["100", "100", "105"],
        },
        Script { focus: vec!["110"] },
    ])
    .await;

    let mut device = device_for(addr);
    device.initialize = false;
    let mut lens = Lens::connect(&device).await;

    assert_eq!(lens.get_focus().await.unwrap(), "100");
    assert_eq!(lens.get_focus().await.unwrap(), "100");
    assert_eq!(lens.get_focus().await.unwrap(), "105");
    assert_eq!(lens.get_focus().await.unwrap(), "110");

    let stats = lens.session().statistics();
    assert_eq!(stats.reconnects, 1);
    assert_eq!(stats.probe_failures, 1);
    assert_eq!(lens.session().status(), SessionStatus::Ready);

    // the stale connection was told to exit before the new one was used
    assert!(wait_for_exit(&log, 0).await);

    lens.close().await;
    assert!(wait_for_exit(&log, 1).await);
}

#[tokio::test]
async fn test_unreachable_adapter_reports_connection_lost() {
    let (addr, _log) = spawn_adapter(vec![Script {
        focus: vec!["100"],
    }])
    .await;

    let mut device = device_for(addr);
    device.initialize = false;
    let mut lens = Lens::connect(&device).await;

    assert_eq!(lens.get_focus().await.unwrap(), "100");
    let result = lens.get_focus().await;

    assert!(matches!(result, Err(LensError::ConnectionLost { .. })));
    assert_eq!(lens.session().status(), SessionStatus::Degraded);
    lens.close().await;
}

#[tokio::test]
async fn test_connect_to_missing_adapter_starts_degraded() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let mut device = device_for(addr);
    device.reconnect_backoff_ms = 0;
    let mut lens = Lens::connect(&device).await;

    assert_eq!(lens.session().status(), SessionStatus::Degraded);
    assert!(!lens.session().is_connected());

    lens.close().await;
    lens.close().await;
    assert_eq!(lens.session().status(), SessionStatus::Closed);
    assert!(matches!(lens.get_focus().await, Err(LensError::Closed)));
}

#[tokio::test]
async fn test_set_commands_reach_the_wire() {
    let (addr, log) = spawn_adapter(vec![Script { focus: vec!["1"] }]).await;

    let mut device = device_for(addr);
    device.initialize = false;
    let mut lens = Lens::connect(&device).await;

    lens.set_focus(-1).await.unwrap();
    lens.set_focus(0).await.unwrap();
    lens.set_focus(42).await.unwrap();
    lens.set_aperture(-1).await.unwrap();
    lens.set_aperture(0).await.unwrap();
    lens.set_aperture(42).await.unwrap();
    lens.close().await;

    let requests: Vec<String> = requests_on(&log, 0)
        .into_iter()
        .filter(|line| line != PROBE && line != EXIT)
        .map(|line| String::from_utf8(line).unwrap())
        .collect();
    assert_eq!(requests, vec!["mi", "mz", "fa 42", "mo", "mc", "ma 42"]);
}
