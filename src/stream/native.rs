//! Native stream opener: `tokio-tungstenite`.
//!
//! Each opened stream owns one background task that:
//! - connects and subscribes with the stream's [`StreamParams`]
//! - runs an application-level ping/pong health check
//! - reconnects with exponential backoff and jitter, resubscribing each time
//! - on cancel, unsubscribes and closes the socket gracefully

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use futures_util::stream::{SplitSink, SplitStream};
use futures_util::{SinkExt, StreamExt};
use tokio::net::TcpStream;
use tokio::sync::oneshot;
use tokio_tungstenite::tungstenite::protocol::frame::coding::CloseCode;
use tokio_tungstenite::tungstenite::protocol::CloseFrame;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{connect_async, MaybeTlsStream, WebSocketStream};

use crate::error::StreamError;
use crate::stream::{
    MessageIn, MessageOut, StreamCallback, StreamConfig, StreamHandle, StreamOpener, StreamParams,
};

type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;

// ─── Disconnect reasons for reconnection decision ────────────────────────────

enum DisconnectReason {
    Cancelled,
    NormalClose,
    PongTimeout,
    RateLimited,
    Error(String),
}

// ─── Background task state ───────────────────────────────────────────────────

struct StreamTask {
    config: StreamConfig,
    params: StreamParams,
    callback: StreamCallback,
    cancel_rx: oneshot::Receiver<()>,
    /// Set by the handle before the cancel signal is sent.
    cancelled: Arc<AtomicBool>,
    reconnect_attempts: u32,
}

impl StreamTask {
    fn should_reconnect(&self) -> bool {
        self.config.reconnect && self.reconnect_attempts < self.config.max_reconnect_attempts
    }

    fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }

    fn deliver(&self, msg: MessageIn) {
        if self.is_cancelled() {
            return;
        }
        match msg {
            MessageIn::Pong => {}
            MessageIn::Error { message, code } => {
                tracing::warn!(
                    stream = %self.params.kind,
                    code = code.as_deref().unwrap_or("-"),
                    "Stream error from server: {}",
                    message
                );
            }
            data => {
                if let Some(update) = data.into_update() {
                    if update.kind() == self.params.kind {
                        (self.callback)(update);
                    } else {
                        tracing::debug!(
                            stream = %self.params.kind,
                            "Ignoring {} update on this stream",
                            update.kind()
                        );
                    }
                }
            }
        }
    }
}

// ─── Public opener ───────────────────────────────────────────────────────────

/// Lower bound for the ping interval and pong timeout.
pub const MIN_HEALTH_CHECK_MS: u32 = 100;

/// Opens one WebSocket connection per stream on the current tokio runtime.
#[derive(Debug, Clone, Default)]
pub struct WsStreamOpener {
    config: StreamConfig,
}

impl WsStreamOpener {
    /// Ping interval and pong timeout below [`MIN_HEALTH_CHECK_MS`] are
    /// raised to it.
    pub fn new(mut config: StreamConfig) -> Self {
        if config.ping_interval_ms < MIN_HEALTH_CHECK_MS
            || config.pong_timeout_ms < MIN_HEALTH_CHECK_MS
        {
            tracing::warn!(
                ping_interval_ms = config.ping_interval_ms,
                pong_timeout_ms = config.pong_timeout_ms,
                "Stream health check timing raised to {}ms minimum",
                MIN_HEALTH_CHECK_MS
            );
            config.ping_interval_ms = config.ping_interval_ms.max(MIN_HEALTH_CHECK_MS);
            config.pong_timeout_ms = config.pong_timeout_ms.max(MIN_HEALTH_CHECK_MS);
        }
        Self { config }
    }

    pub fn config(&self) -> &StreamConfig {
        &self.config
    }
}

impl StreamOpener for WsStreamOpener {
    fn open(
        &self,
        params: StreamParams,
        callback: StreamCallback,
    ) -> Result<StreamHandle, StreamError> {
        let runtime = tokio::runtime::Handle::try_current().map_err(|_| StreamError::NoRuntime)?;
        let (cancel_tx, cancel_rx) = oneshot::channel();
        let cancelled = Arc::new(AtomicBool::new(false));

        let kind = params.kind;
        let task = StreamTask {
            config: self.config.clone(),
            params,
            callback,
            cancel_rx,
            cancelled: cancelled.clone(),
            reconnect_attempts: 0,
        };
        let join = runtime.spawn(run_task(task));
        let abort = join.abort_handle();

        Ok(StreamHandle::new(kind, move || {
            cancelled.store(true, Ordering::SeqCst);
            // Task already gone (or not listening): make sure it stops.
            if cancel_tx.send(()).is_err() {
                abort.abort();
            }
        }))
    }
}

// ─── Background task ─────────────────────────────────────────────────────────

async fn run_task(mut task: StreamTask) {
    loop {
        // ── 1. Attempt connection ────────────────────────────────────────
        let connected = tokio::select! {
            res = attempt_connect(&task.config.url) => res,
            _ = &mut task.cancel_rx => return,
        };

        let (mut sink, stream) = match connected {
            Ok(parts) => parts,
            Err(e) => {
                tracing::error!(stream = %task.params.kind, "Stream connection failed: {}", e);
                if task.should_reconnect() && backoff_sleep(&mut task, false).await {
                    continue;
                }
                return;
            }
        };

        // ── 2. Connected: (re)subscribe ──────────────────────────────────
        task.reconnect_attempts = 0;
        let subscribe = MessageOut::Subscribe {
            params: task.params.clone(),
        };
        if let Err(e) = send_msg(&mut sink, &subscribe).await {
            tracing::warn!(stream = %task.params.kind, "Subscribe failed: {}", e);
        } else {
            tracing::info!(stream = %task.params.kind, "Stream subscribed");
        }

        // ── 3. Inner select! loop ────────────────────────────────────────
        let reason = run_connected(&mut task, sink, stream).await;

        // ── 4. Post-disconnect decision ──────────────────────────────────
        let rate_limited = match reason {
            DisconnectReason::Cancelled | DisconnectReason::NormalClose => return,
            DisconnectReason::RateLimited => true,
            DisconnectReason::PongTimeout => false,
            DisconnectReason::Error(e) => {
                tracing::warn!(stream = %task.params.kind, "Stream dropped: {}", e);
                false
            }
        };

        if !(task.should_reconnect() && backoff_sleep(&mut task, rate_limited).await) {
            tracing::warn!(stream = %task.params.kind, "Stream stopped reconnecting");
            return;
        }
    }
}

/// The inner connected loop: runs until the connection breaks or the
/// stream is cancelled.
async fn run_connected(
    task: &mut StreamTask,
    mut sink: SplitSink<WsStream, Message>,
    mut stream: SplitStream<WsStream>,
) -> DisconnectReason {
    let ping_dur =
        Duration::from_millis(task.config.ping_interval_ms.max(MIN_HEALTH_CHECK_MS) as u64);
    let pong_dur =
        Duration::from_millis(task.config.pong_timeout_ms.max(MIN_HEALTH_CHECK_MS) as u64);

    let mut ping_interval = tokio::time::interval(ping_dur);
    ping_interval.reset();

    let mut awaiting_pong = false;
    let far_future = tokio::time::Instant::now() + Duration::from_secs(86400);
    let pong_sleep = tokio::time::sleep_until(far_future);
    tokio::pin!(pong_sleep);

    loop {
        tokio::select! {
            biased;

            // ── a) Cancellation ──────────────────────────────────────────
            _ = &mut task.cancel_rx => {
                let unsubscribe = MessageOut::Unsubscribe { params: task.params.clone() };
                if let Err(e) = send_msg(&mut sink, &unsubscribe).await {
                    tracing::debug!("Unsubscribe on cancel failed: {}", e);
                }
                let _ = sink.send(Message::Close(Some(CloseFrame {
                    code: CloseCode::Normal,
                    reason: "Stream cancelled".into(),
                }))).await;
                return DisconnectReason::Cancelled;
            }

            // ── b) Incoming message ──────────────────────────────────────
            msg = stream.next() => {
                match msg {
                    Some(Ok(Message::Text(text))) => {
                        match decode_frame(text.as_str()) {
                            Ok(msg_in) => {
                                if matches!(msg_in, MessageIn::Pong) {
                                    awaiting_pong = false;
                                    pong_sleep.as_mut().reset(far_future);
                                }
                                task.deliver(msg_in);
                            }
                            Err(e) => tracing::warn!("{}, raw: {}", e, text.as_str()),
                        }
                    }
                    Some(Ok(Message::Ping(data))) => {
                        let _ = sink.send(Message::Pong(data)).await;
                    }
                    Some(Ok(Message::Close(frame))) => {
                        let (code, reason) = extract_close(frame.as_ref());
                        return match code {
                            1000 => DisconnectReason::NormalClose,
                            1008 => DisconnectReason::RateLimited,
                            _ => DisconnectReason::Error(
                                StreamError::Closed { code: Some(code), reason }.to_string(),
                            ),
                        };
                    }
                    Some(Ok(_)) => {}
                    Some(Err(e)) => return DisconnectReason::Error(e.to_string()),
                    None => return DisconnectReason::Error("Stream ended".into()),
                }
            }

            // ── c) Ping interval ─────────────────────────────────────────
            _ = ping_interval.tick() => {
                if let Err(e) = send_msg(&mut sink, &MessageOut::Ping).await {
                    tracing::warn!("Failed to send ping: {}", e);
                } else if !awaiting_pong {
                    awaiting_pong = true;
                    pong_sleep.as_mut().reset(tokio::time::Instant::now() + pong_dur);
                }
            }

            // ── d) Pong timeout ──────────────────────────────────────────
            () = &mut pong_sleep, if awaiting_pong => {
                tracing::warn!(
                    "Pong timeout: no response within {}ms",
                    task.config.pong_timeout_ms
                );
                let _ = sink.close().await;
                return DisconnectReason::PongTimeout;
            }
        }
    }
}

// ─── Helpers ─────────────────────────────────────────────────────────────────

/// Attempt to establish a WebSocket connection with a 30-second timeout.
async fn attempt_connect(
    url: &str,
) -> Result<(SplitSink<WsStream, Message>, SplitStream<WsStream>), StreamError> {
    let (ws_stream, _) = tokio::time::timeout(Duration::from_secs(30), connect_async(url))
        .await
        .map_err(|_| StreamError::ConnectionFailed("Connection timeout".into()))?
        .map_err(|e| StreamError::ConnectionFailed(e.to_string()))?;

    Ok(ws_stream.split())
}

fn decode_frame(text: &str) -> Result<MessageIn, StreamError> {
    serde_json::from_str(text).map_err(|e| StreamError::Deserialization(e.to_string()))
}

/// Serialize and send a MessageOut over the sink.
async fn send_msg(
    sink: &mut SplitSink<WsStream, Message>,
    msg: &MessageOut,
) -> Result<(), StreamError> {
    let json = serde_json::to_string(msg).map_err(|e| StreamError::SendFailed(e.to_string()))?;
    sink.send(Message::Text(json.into()))
        .await
        .map_err(|e| StreamError::SendFailed(e.to_string()))
}

/// Extract close code and reason from an optional CloseFrame.
fn extract_close(frame: Option<&CloseFrame>) -> (u16, String) {
    match frame {
        Some(f) => (f.code.into(), f.reason.to_string()),
        None => (1006, "No close frame".into()),
    }
}

// ─── Reconnection backoff ────────────────────────────────────────────────────

fn backoff_delay_ms(base_ms: u32, attempt: u32, rate_limited: bool, jitter: u32) -> u32 {
    let exp = attempt.saturating_sub(1).min(10);
    let base = base_ms.saturating_mul(1u32 << exp);
    let cap = if rate_limited { 300_000 } else { 60_000 };
    base.saturating_add(jitter).min(cap)
}

/// Sleep before the next reconnect. Returns `false` if the stream was
/// cancelled while waiting.
async fn backoff_sleep(task: &mut StreamTask, rate_limited: bool) -> bool {
    task.reconnect_attempts += 1;

    let jitter_max = if rate_limited { 1000 } else { 500 };
    let delay = backoff_delay_ms(
        task.config.base_reconnect_delay_ms,
        task.reconnect_attempts,
        rate_limited,
        rand::random::<u32>() % jitter_max,
    );

    tracing::info!(
        stream = %task.params.kind,
        "Reconnect attempt {}/{} in {}ms{}",
        task.reconnect_attempts,
        task.config.max_reconnect_attempts,
        delay,
        if rate_limited { " (rate-limited)" } else { "" }
    );

    tokio::select! {
        _ = tokio::time::sleep(Duration::from_millis(delay as u64)) => true,
        _ = &mut task.cancel_rx => false,
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────
