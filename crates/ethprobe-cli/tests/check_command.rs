//! End-to-end tests for the `ethprobe` binary.
//!
//! A tiny blocking HTTP server plays the execution client; the tests run
//! the real binary and assert on exit codes and output.

use std::io::{Read, Write};
use std::net::{SocketAddr, TcpListener, TcpStream};
use std::process::{Command, Output};

fn ethprobe(dir: &std::path::Path, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_ethprobe"))
        .args(args)
        .current_dir(dir)
        .env_remove("RUST_LOG")
        .output()
        .expect("failed to run ethprobe")
}

/// Answer `eth_blockNumber` with 0x2a and `eth_chainId` with `chain_hex`,
/// one request per connection.
fn fake_node(chain_hex: &'static str) -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();

    std::thread::spawn(move || {
        for stream in listener.incoming() {
            let Ok(mut stream) = stream else { break };
            let request = read_request(&mut stream);
            let result = if request.contains("eth_chainId") {
                chain_hex
            } else {
                "0x2a"
            };
            let body = format!(r#"{{"jsonrpc":"2.0","id":1,"result":"{result}"}}"#);
            let response = format!(
                "HTTP/1.1 200 OK\r\ncontent-type: application/json\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{body}",
                body.len()
            );
            let _ = stream.write_all(response.as_bytes());
        }
    });

    addr
}

fn read_request(stream: &mut TcpStream) -> String {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 1024];
    loop {
        let n = stream.read(&mut chunk).unwrap_or(0);
        if n == 0 {
            break;
        }
        buf.extend_from_slice(&chunk[..n]);

        if let Some(end) = buf.windows(4).position(|w| w == b"\r\n\r\n") {
            let head = String::from_utf8_lossy(&buf[..end]).to_ascii_lowercase();
            let len = head
                .lines()
                .find_map(|l| l.strip_prefix("content-length:"))
                .and_then(|v| v.trim().parse::<usize>().ok())
                .unwrap_or(0);
            if buf.len() >= end + 4 + len {
                break;
            }
        }
    }
    String::from_utf8_lossy(&buf).into_owned()
}

/// Accept connections and never answer.
fn silent_node() -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();

    std::thread::spawn(move || {
        let mut held = Vec::new();
        for stream in listener.incoming() {
            let Ok(stream) = stream else { break };
            held.push(stream);
        }
    });

    addr
}

fn closed_port() -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    listener.local_addr().unwrap()
}

#[test]
fn healthy_node_exits_zero_with_json_report() {
    let dir = tempfile::tempdir().unwrap();
    let addr = fake_node("0x1");
    let endpoint = format!("http://{addr}");

    let out = ethprobe(
        dir.path(),
        &["check", "--endpoint", &endpoint, "--chain-id", "1", "--format", "json"],
    );
    assert_eq!(out.status.code(), Some(0), "{}", String::from_utf8_lossy(&out.stderr));

    let report: serde_json::Value = serde_json::from_slice(&out.stdout).unwrap();
    assert_eq!(report["healthy"], true);
    assert_eq!(report["block_number"], 42);
    assert_eq!(report["chain_id"], 1);
    assert_eq!(report["network"], "mainnet");
}

#[test]
fn wrong_network_exits_four() {
    let dir = tempfile::tempdir().unwrap();
    let addr = fake_node("0x4");
    let endpoint = format!("http://{addr}");

    let out = ethprobe(
        dir.path(),
        &[
            "check",
            "--endpoint",
            &endpoint,
            "--network",
            "mainnet",
            "--max-attempts",
            "2",
            "--retry-delay",
            "0s",
        ],
    );
    assert_eq!(out.status.code(), Some(4));
    assert!(String::from_utf8_lossy(&out.stderr).contains("network mismatch"));
}

#[test]
fn fail_fast_mismatch_exits_four() {
    let dir = tempfile::tempdir().unwrap();
    let addr = fake_node("0xaa36a7");
    let endpoint = format!("http://{addr}");

    let out = ethprobe(
        dir.path(),
        &["check", "--endpoint", &endpoint, "--chain-id", "1", "--fail-fast-on-mismatch"],
    );
    assert_eq!(out.status.code(), Some(4));
}

#[test]
fn unreachable_node_exits_three() {
    let dir = tempfile::tempdir().unwrap();
    let endpoint = format!("http://{}", closed_port());

    let out = ethprobe(
        dir.path(),
        &[
            "check",
            "--endpoint",
            &endpoint,
            "--chain-id",
            "1",
            "--max-attempts",
            "2",
            "--retry-delay",
            "10ms",
            "--format",
            "json",
        ],
    );
    assert_eq!(out.status.code(), Some(3));

    let report: serde_json::Value = serde_json::from_slice(&out.stdout).unwrap();
    assert_eq!(report["healthy"], false);
    assert!(report["error"].as_str().unwrap().contains("after 2 attempt(s)"));
}

#[test]
fn expired_deadline_exits_three_with_json_report() {
    let dir = tempfile::tempdir().unwrap();
    let endpoint = format!("http://{}", silent_node());

    let out = ethprobe(
        dir.path(),
        &[
            "check",
            "--endpoint",
            &endpoint,
            "--chain-id",
            "1",
            "--deadline",
            "1s",
            "--format",
            "json",
        ],
    );
    assert_eq!(out.status.code(), Some(3), "{}", String::from_utf8_lossy(&out.stderr));

    let report: serde_json::Value = serde_json::from_slice(&out.stdout).unwrap();
    assert_eq!(report["healthy"], false);
    assert!(report["error"].as_str().unwrap().contains("did not finish within"));
}

#[test]
fn invalid_input_exits_two() {
    let dir = tempfile::tempdir().unwrap();

    let bad_scheme = ethprobe(
        dir.path(),
        &["check", "--endpoint", "ws://127.0.0.1:8546", "--chain-id", "1"],
    );
    assert_eq!(bad_scheme.status.code(), Some(2));

    let bad_port = ethprobe(
        dir.path(),
        &["check", "--endpoint", "http://127.0.0.1:8545:9", "--chain-id", "1"],
    );
    assert_eq!(bad_port.status.code(), Some(2));

    let huge_delay = ethprobe(
        dir.path(),
        &[
            "check",
            "--endpoint",
            "http://127.0.0.1:8545",
            "--chain-id",
            "1",
            "--retry-delay",
            "307445734561825862m",
        ],
    );
    assert_eq!(huge_delay.status.code(), Some(2));

    let unknown_network = ethprobe(
        dir.path(),
        &["check", "--endpoint", "http://127.0.0.1:8545", "--network", "kovan"],
    );
    assert_eq!(unknown_network.status.code(), Some(2));

    let missing_chain = ethprobe(dir.path(), &["check", "--endpoint", "http://127.0.0.1:8545"]);
    assert_eq!(missing_chain.status.code(), Some(2));

    let zero_attempts = ethprobe(
        dir.path(),
        &["check", "--endpoint", "http://127.0.0.1:8545", "--chain-id", "1", "--max-attempts", "0"],
    );
    assert_eq!(zero_attempts.status.code(), Some(2));
}

#[test]
fn init_then_check_from_working_directory() {
    let dir = tempfile::tempdir().unwrap();
    let addr = fake_node("0x4268");
    let endpoint = format!("http://{addr}");

    let out = ethprobe(
        dir.path(),
        &["init", "--endpoint", &endpoint, "--network", "holesky", "--name", "geth-holesky"],
    );
    assert_eq!(out.status.code(), Some(0), "{}", String::from_utf8_lossy(&out.stderr));
    assert!(dir.path().join("ethprobe.toml").is_file());

    let again = ethprobe(dir.path(), &["init"]);
    assert_eq!(again.status.code(), Some(2));

    let check = ethprobe(dir.path(), &["check"]);
    assert_eq!(check.status.code(), Some(0), "{}", String::from_utf8_lossy(&check.stderr));
    assert!(String::from_utf8_lossy(&check.stdout).contains("17000 (holesky)"));
}

#[test]
fn networks_lists_known_chains() {
    let dir = tempfile::tempdir().unwrap();
    let out = ethprobe(dir.path(), &["networks", "--format", "json"]);
    assert_eq!(out.status.code(), Some(0));

    let list: serde_json::Value = serde_json::from_slice(&out.stdout).unwrap();
    let names: Vec<&str> = list
        .as_array()
        .unwrap()
        .iter()
        .map(|n| n["name"].as_str().unwrap())
        .collect();
    assert!(names.contains(&"mainnet"));
    assert!(names.contains(&"sepolia"));
}
