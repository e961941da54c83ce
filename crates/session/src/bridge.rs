//! Callback bridge for scripting hosts
//!
//! A scripting host calls [`Bridge::execute`] with an action name and a
//! positional argument list, and receives results through a
//! [`CallbackContext`]. `startAsync` keeps its callback alive across progress
//! messages; every other result closes it.
//!
//! `startAsync` arguments:
//!
//! | index | meaning |
//! |-------|---------|
//! | 0 | source URI |
//! | 1 | destination URI |
//! | 2 | URI matcher pattern (optional) |
//! | 3 | notification title (ignored) |
//! | 4 | request headers, `[{"Key": .., "Value": ..}]` (optional) |
//! | 5 | user agent (optional) |
//!
//! `stop` takes the source URI at index 0.

use bgdl_errors::{Error, TransferError};
use bgdl_events::{FailureContext, ProgressSnapshot, ResponseInfo, TransferEvent};
use futures::StreamExt;
use serde_json::{json, Value};
use std::sync::Arc;

use crate::matcher::UriMatcher;
use crate::session::{DownloadSession, StartRequest};

pub const ACTION_START: &str = "startAsync";
pub const ACTION_STOP: &str = "stop";

/// Where results of one bridge call are delivered
pub trait CallbackContext: Send + Sync {
    /// Deliver a success result; `keep_callback` leaves the callback open
    /// for further results
    fn success(&self, message: Option<Value>, keep_callback: bool);

    /// Deliver a failure; always the last result of the call
    fn error(&self, message: Value);
}

/// Decoded `startAsync` arguments
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StartArgs {
    pub source_uri: String,
    pub destination_uri: String,
    pub uri_matcher: Option<String>,
    pub headers: Vec<(String, String)>,
    pub user_agent: Option<String>,
}

impl StartArgs {
    /// Decode positional arguments
    ///
    /// # Errors
    ///
    /// Returns `InvalidArguments` when the source or destination is absent or
    /// an argument has the wrong shape.
    pub fn from_args(args: &[Value]) -> Result<Self, Error> {
        Ok(Self {
            source_uri: required_string(args, 0, "source URI")?,
            destination_uri: required_string(args, 1, "destination URI")?,
            uri_matcher: optional_string(args, 2)?,
            headers: headers(args.get(4))?,
            user_agent: optional_string(args, 5)?,
        })
    }

    /// Convert into a session request, compiling the URI matcher
    ///
    /// # Errors
    ///
    /// Returns `InvalidArguments` for an invalid matcher pattern.
    pub fn into_request(self) -> Result<StartRequest, Error> {
        let uri_matcher = self
            .uri_matcher
            .as_deref()
            .map(UriMatcher::pattern)
            .transpose()?;
        Ok(StartRequest {
            source_uri: self.source_uri,
            destination_uri: self.destination_uri,
            user_agent: self.user_agent,
            headers: self.headers,
            uri_matcher,
        })
    }
}

fn invalid(message: impl Into<String>) -> Error {
    TransferError::InvalidArguments {
        message: message.into(),
    }
    .into()
}

/// Missing, `null`, `"null"` and `""` all mean "not supplied"
fn optional_string(args: &[Value], index: usize) -> Result<Option<String>, Error> {
    match args.get(index) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) if s.is_empty() || s == "null" => Ok(None),
        Some(Value::String(s)) => Ok(Some(s.clone())),
        Some(other) => Err(invalid(format!(
            "argument {index} must be a string, got {other}"
        ))),
    }
}

fn required_string(args: &[Value], index: usize, name: &str) -> Result<String, Error> {
    optional_string(args, index)?
        .ok_or_else(|| invalid(format!("{name} (argument {index}) is required")))
}

fn headers(value: Option<&Value>) -> Result<Vec<(String, String)>, Error> {
    match value {
        None | Some(Value::Null) => Ok(Vec::new()),
        Some(Value::String(s)) if s.is_empty() || s == "null" => Ok(Vec::new()),
        Some(Value::Array(items)) => items.iter().map(header_pair).collect(),
        Some(Value::Object(map)) => map
            .iter()
            .map(|(name, value)| Ok::<_, Error>((name.clone(), header_value(value)?)))
            .collect(),
        Some(other) => Err(invalid(format!("headers must be a list, got {other}"))),
    }
}

fn header_pair(item: &Value) -> Result<(String, String), Error> {
    let field = |upper: &str, lower: &str| item.get(upper).or_else(|| item.get(lower));
    match (field("Key", "key"), field("Value", "value")) {
        (Some(Value::String(name)), Some(value)) if !name.is_empty() => {
            Ok((name.clone(), header_value(value)?))
        }
        _ => Err(invalid(format!("malformed header entry {item}"))),
    }
}

fn header_value(value: &Value) -> Result<String, Error> {
    match value {
        Value::String(s) => Ok(s.clone()),
        Value::Number(n) => Ok(n.to_string()),
        Value::Bool(b) => Ok(b.to_string()),
        other => Err(invalid(format!("header value must be a string, got {other}"))),
    }
}

/// `{"progress": {"bytesReceived": .., "totalBytesToReceive": ..}}`
///
/// An unknown total is reported as 0.
#[must_use]
pub fn progress_message(progress: &ProgressSnapshot) -> Value {
    json!({
        "progress": {
            "bytesReceived": progress.bytes_received,
            "totalBytesToReceive": progress.total_bytes_to_receive.unwrap_or(0),
        }
    })
}

/// `{code, message, hint?, retryable, response?}`
#[must_use]
pub fn failure_message(error: &Error, response: Option<&ResponseInfo>) -> Value {
    let failure = FailureContext::from_error(error);
    let mut message = json!({
        "code": failure.code.unwrap_or_else(|| "internal".to_string()),
        "message": failure.message,
        "retryable": failure.retryable,
    });
    if let Some(hint) = failure.hint {
        message["hint"] = Value::String(hint);
    }
    if let Some(response) = response {
        if let Ok(value) = serde_json::to_value(response) {
            message["response"] = value;
        }
    }
    message
}

/// Positional-argument front end over a [`DownloadSession`]
#[derive(Debug, Clone)]
pub struct Bridge {
    session: Arc<DownloadSession>,
}

impl Bridge {
    #[must_use]
    pub fn new(session: Arc<DownloadSession>) -> Self {
        Self { session }
    }

    #[must_use]
    pub fn session(&self) -> &Arc<DownloadSession> {
        &self.session
    }

    /// Dispatch `action` on a background task
    ///
    /// Returns `false` for an unknown action, in which case `ctx` is never
    /// called. Must be called from within a tokio runtime.
    pub fn execute(&self, action: &str, args: Vec<Value>, ctx: Arc<dyn CallbackContext>) -> bool {
        match action {
            ACTION_START => {
                let bridge = self.clone();
                tokio::spawn(async move { bridge.start_async(&args, ctx.as_ref()).await });
                true
            }
            ACTION_STOP => {
                let bridge = self.clone();
                tokio::spawn(async move { bridge.stop(&args, ctx.as_ref()).await });
                true
            }
            other => {
                tracing::debug!(action = other, "unknown bridge action");
                false
            }
        }
    }

    /// Run `startAsync` to completion, reporting through `ctx`
    pub async fn start_async(&self, args: &[Value], ctx: &dyn CallbackContext) {
        let request = match StartArgs::from_args(args).and_then(StartArgs::into_request) {
            Ok(request) => request,
            Err(error) => {
                ctx.error(failure_message(&error, None));
                return;
            }
        };

        let mut stream = self.session.start(request).await;
        while let Some(event) = stream.next().await {
            match event {
                TransferEvent::Progress(progress) => {
                    ctx.success(Some(progress_message(&progress)), true);
                }
                TransferEvent::Completed => ctx.success(None, false),
                TransferEvent::Failed { error, response } => {
                    ctx.error(failure_message(&error, response.as_ref()));
                }
            }
        }
    }

    /// Run `stop`, reporting through `ctx`
    pub async fn stop(&self, args: &[Value], ctx: &dyn CallbackContext) {
        let uri = match required_string(args, 0, "source URI") {
            Ok(uri) => uri,
            Err(error) => {
                ctx.error(failure_message(&error, None));
                return;
            }
        };

        match self.session.stop(&uri).await {
            Ok(()) => ctx.success(None, false),
            Err(error) => ctx.error(failure_message(&error, None)),
        }
    }
}
