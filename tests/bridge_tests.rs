//! End-to-end tests for the callback bridge over real HTTP transfers

mod common;

use bgdl_session::{Bridge, CallbackContext, ACTION_START, ACTION_STOP};
use common::TestEnvironment;
use httpmock::prelude::*;
use serde_json::{json, Value};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::Notify;

#[derive(Debug, Clone)]
enum Reply {
    Success { message: Option<Value>, keep: bool },
    Error(Value),
}

/// Records replies and wakes waiters on the final one
#[derive(Default)]
struct Recorder {
    replies: Mutex<Vec<Reply>>,
    done: Notify,
}

impl Recorder {
    fn replies(&self) -> Vec<Reply> {
        self.replies.lock().unwrap().clone()
    }

    async fn wait_done(&self) {
        tokio::time::timeout(Duration::from_secs(10), self.done.notified())
            .await
            .expect("no final reply");
    }
}

impl CallbackContext for Recorder {
    fn success(&self, message: Option<Value>, keep_callback: bool) {
        self.replies.lock().unwrap().push(Reply::Success {
            message,
            keep: keep_callback,
        });
        if !keep_callback {
            self.done.notify_one();
        }
    }

    fn error(&self, message: Value) {
        self.replies.lock().unwrap().push(Reply::Error(message));
        self.done.notify_one();
    }
}

#[tokio::test]
async fn test_bridge_download_reports_progress_and_success() {
    let env = TestEnvironment::new().await;
    env.server
        .mock_async(|when, then| {
            when.method(GET).path("/doc.pdf");
            then.status(200).body(vec![1u8; 2048]);
        })
        .await;

    let bridge = Bridge::new(env.session.clone());
    let recorder = Arc::new(Recorder::default());
    let args = vec![
        json!(env.server.url("/doc.pdf")),
        json!(TestEnvironment::destination("doc.pdf")),
    ];
    assert!(bridge.execute(ACTION_START, args, recorder.clone()));
    recorder.wait_done().await;

    let replies = recorder.replies();
    let (last, progress) = replies.split_last().unwrap();
    assert!(matches!(
        last,
        Reply::Success {
            message: None,
            keep: false
        }
    ));
    let final_progress = match progress.last() {
        Some(Reply::Success {
            message: Some(message),
            keep: true,
        }) => message.clone(),
        other => panic!("expected a progress reply, got {other:?}"),
    };
    assert_eq!(final_progress["progress"]["bytesReceived"], 2048);
    assert_eq!(final_progress["progress"]["totalBytesToReceive"], 2048);
    assert!(env.path("doc.pdf").exists());
}

#[tokio::test]
async fn test_bridge_reports_http_failure_payload() {
    let env = TestEnvironment::new().await;
    env.server
        .mock_async(|when, then| {
            when.method(GET).path("/gone.bin");
            then.status(404);
        })
        .await;

    let bridge = Bridge::new(env.session.clone());
    let recorder = Recorder::default();
    let args = vec![
        json!(env.server.url("/gone.bin")),
        json!(TestEnvironment::destination("gone.bin")),
    ];
    bridge.start_async(&args, &recorder).await;

    let replies = recorder.replies();
    let errors: Vec<&Value> = replies
        .iter()
        .filter_map(|r| match r {
            Reply::Error(message) => Some(message),
            Reply::Success { .. } => None,
        })
        .collect();
    assert_eq!(errors.len(), 1);
    assert!(matches!(replies.last(), Some(Reply::Error(_))));

    let message = errors[0];
    assert_eq!(message["code"], "transfer.failure");
    assert_eq!(message["retryable"], false);
    assert_eq!(message["response"]["statusCode"], 404);
}

#[tokio::test]
async fn test_bridge_stop_ends_running_download() {
    let env = TestEnvironment::new().await;
    env.server
        .mock_async(|when, then| {
            when.method(GET).path("/big.iso");
            then.status(200).body("iso").delay(Duration::from_secs(10));
        })
        .await;

    let uri = env.server.url("/big.iso");
    let bridge = Bridge::new(env.session.clone());
    let download = Arc::new(Recorder::default());
    assert!(bridge.execute(
        ACTION_START,
        vec![json!(uri), json!(TestEnvironment::destination("big.iso"))],
        download.clone(),
    ));

    while !env.session.is_tracked(&uri) {
        tokio::time::sleep(Duration::from_millis(10)).await;
    }

    let stop = Recorder::default();
    bridge.stop(&[json!(uri)], &stop).await;
    assert!(matches!(
        stop.replies().as_slice(),
        [Reply::Success { keep: false, .. }]
    ));

    download.wait_done().await;
    match download.replies().last() {
        Some(Reply::Error(message)) => {
            assert_eq!(message["code"], "transfer.cancelled");
            assert_eq!(message["retryable"], true);
        }
        other => panic!("expected cancellation, got {other:?}"),
    }
    assert!(!env.path("big.iso.download").exists());
    assert_eq!(std::fs::metadata(env.path("big.iso")).unwrap().len(), 0);
}

#[tokio::test]
async fn test_bridge_stop_of_unknown_uri_succeeds() {
    let env = TestEnvironment::new().await;
    let bridge = Bridge::new(env.session.clone());
    let recorder = Arc::new(Recorder::default());

    assert!(bridge.execute(
        ACTION_STOP,
        vec![json!(env.server.url("/never.bin"))],
        recorder.clone(),
    ));
    recorder.wait_done().await;

    assert!(matches!(
        recorder.replies().as_slice(),
        [Reply::Success {
            message: None,
            keep: false
        }]
    ));
}
