//! Stdin forwarding against the simulation driver.
//!
//! Input comes from in-memory readers; the runtime runs on a paused clock.

use std::time::Duration;

use openchat_cli::{CliError, forward, shutdown};
use openchat_client::{ClientHandle, Runtime, RuntimeConfig};
use openchat_core::{ConnectionState, Frame};
use openchat_harness::{RecordingObserver, SimDriver, SimDriverHandle, SimEnv};
use tokio::{
    io::{AsyncBufReadExt, BufReader, Lines},
    task::JoinHandle,
};

struct Client {
    handle: ClientHandle,
    driver: SimDriverHandle,
    observer: RecordingObserver,
    task: JoinHandle<()>,
}

fn spawn_client() -> Client {
    let (driver, driver_handle) = SimDriver::new();
    let observer = RecordingObserver::new();
    let config = RuntimeConfig { relay_url: "sim://relay".to_string(), ..RuntimeConfig::default() };

    let (runtime, handle) = Runtime::new(driver, SimEnv::with_seed(1), observer.clone(), config);
    let task = tokio::spawn(runtime.run());

    Client { handle, driver: driver_handle, observer, task }
}

fn input(bytes: &'static [u8]) -> Lines<BufReader<&'static [u8]>> {
    BufReader::new(bytes).lines()
}

async fn settle() {
    tokio::time::sleep(Duration::from_millis(10)).await;
}

fn texts(observer: &RecordingObserver) -> Vec<String> {
    observer.messages().into_iter().filter(|m| !m.is_system).map(|m| m.text).collect()
}

#[tokio::test(start_paused = true)]
async fn quit_stops_reading() {
    let client = spawn_client();
    let mut lines = input(b"first\n/quit\nnever sent\n");
    let mut out = Vec::new();

    forward(&client.handle, &mut lines, "alice", &mut out).await.unwrap();
    settle().await;

    assert_eq!(texts(&client.observer), ["first"]);
    assert!(out.is_empty());
    assert_eq!(lines.next_line().await.unwrap().as_deref(), Some("never sent"));
}

#[tokio::test(start_paused = true)]
async fn leave_then_join_reconnects_under_same_name() {
    let client = spawn_client();
    let mut lines = input(b"hi\n/leave\n/join\n");

    forward(&client.handle, &mut lines, "alice", &mut Vec::new()).await.unwrap();
    settle().await;

    assert_eq!(client.driver.connect_urls(), ["sim://relay", "sim://relay"]);
    assert_eq!(client.observer.state(), Some(ConnectionState::Connected));
    assert_eq!(client.observer.snapshot().session.unwrap().display_name(), "alice");
    assert_eq!(texts(&client.observer), ["hi"]);
    assert!(client.observer.snapshot().rejections.is_empty());
}

#[tokio::test(start_paused = true)]
async fn unknown_command_is_reported_not_sent() {
    let client = spawn_client();
    let mut lines = input(b"/dance\n");
    let mut out = Vec::new();

    forward(&client.handle, &mut lines, "alice", &mut out).await.unwrap();
    settle().await;

    assert_eq!(String::from_utf8(out).unwrap(), "!! unknown command /dance (try /join, /leave or /quit)\n");
    assert!(texts(&client.observer).is_empty());
}

#[tokio::test(start_paused = true)]
async fn read_error_still_leaves_relay() {
    let client = spawn_client();
    let mut lines = input(b"hello\n\xff\xfe\n");

    let result = forward(&client.handle, &mut lines, "alice", &mut Vec::new()).await;
    assert!(matches!(result, Err(CliError::Io(_))));
    settle().await;
    assert_eq!(client.observer.state(), Some(ConnectionState::Connected));

    shutdown(client.handle, client.task).await;

    let sent = client.driver.take_outgoing();
    assert!(matches!(sent.last(), Some(Frame::Leave { .. })));
    assert_eq!(client.driver.close_count(), 1);
    assert!(client.driver.is_stopped());
    assert_eq!(client.observer.state(), Some(ConnectionState::Disconnected));
    assert_eq!(texts(&client.observer), ["hello"]);
}
