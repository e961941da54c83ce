//! JSON-lines front end for the callback bridge
//!
//! Each input line is `{"callbackId": .., "action": .., "args": [..]}`; every
//! callback result is written as one output line
//! `{"callbackId": .., "status": "ok"|"error", "keepCallback": .., "message": ..}`.
//! Commands run concurrently, so results of different calls interleave.

use bgdl_session::{Bridge, CallbackContext};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::sync::mpsc::{self, UnboundedSender};
use tracing::{info, warn};

use crate::error::CliError;

#[derive(Debug, Deserialize)]
struct Command {
    #[serde(rename = "callbackId", default)]
    callback_id: Value,
    action: String,
    #[serde(default)]
    args: Vec<Value>,
}

#[derive(Debug, Serialize)]
struct Reply {
    #[serde(rename = "callbackId")]
    callback_id: Value,
    status: &'static str,
    #[serde(rename = "keepCallback")]
    keep_callback: bool,
    message: Option<Value>,
}

impl Reply {
    fn error(callback_id: Value, message: Value) -> Self {
        Self {
            callback_id,
            status: "error",
            keep_callback: false,
            message: Some(message),
        }
    }
}

/// Routes one call's results to the output writer
struct LineContext {
    callback_id: Value,
    out: UnboundedSender<Reply>,
}

impl CallbackContext for LineContext {
    fn success(&self, message: Option<Value>, keep_callback: bool) {
        let _ = self.out.send(Reply {
            callback_id: self.callback_id.clone(),
            status: "ok",
            keep_callback,
            message,
        });
    }

    fn error(&self, message: Value) {
        let _ = self
            .out
            .send(Reply::error(self.callback_id.clone(), message));
    }
}

/// Read commands until stdin closes or Ctrl-C, then wait for running calls
pub async fn serve(bridge: Bridge) -> Result<(), CliError> {
    let (out, mut replies) = mpsc::unbounded_channel::<Reply>();

    // Ends once every call holding a sender has finished
    let writer = tokio::spawn(async move {
        let mut stdout = tokio::io::stdout();
        while let Some(reply) = replies.recv().await {
            let Ok(mut line) = serde_json::to_vec(&reply) else {
                continue;
            };
            line.push(b'\n');
            if stdout.write_all(&line).await.is_err() || stdout.flush().await.is_err() {
                break;
            }
        }
    });

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        let line = tokio::select! {
            line = lines.next_line() => line?,
            _ = tokio::signal::ctrl_c() => {
                info!("interrupted, detaching running transfers");
                let detached = bridge.session().shutdown();
                info!(count = detached.len(), "detached");
                return Ok(());
            }
        };
        let Some(line) = line else { break };
        if line.trim().is_empty() {
            continue;
        }
        dispatch(&bridge, &line, &out);
    }

    drop(out);
    let _ = writer.await;
    bridge.session().shutdown();
    Ok(())
}

fn dispatch(bridge: &Bridge, line: &str, out: &UnboundedSender<Reply>) {
    let command = match serde_json::from_str::<Command>(line) {
        Ok(command) => command,
        Err(e) => {
            warn!(error = %e, "malformed command line");
            let _ = out.send(Reply::error(
                Value::Null,
                json!({"code": "bridge.malformed_command", "message": e.to_string()}),
            ));
            return;
        }
    };

    let ctx = Arc::new(LineContext {
        callback_id: command.callback_id.clone(),
        out: out.clone(),
    });
    if !bridge.execute(&command.action, command.args, ctx) {
        let _ = out.send(Reply::error(
            command.callback_id,
            json!({
                "code": "bridge.invalid_action",
                "message": format!("unknown action `{}`", command.action),
            }),
        ));
    }
}
