//! Connection state machine for the market-data stream.
//!
//! ```text
//! Disconnected --connect--> Connecting --"connected"--> Connected
//!     ^                                                    | send auth
//!     |                                            "auth_success"
//!     +---- close / I/O error / auth_failed ---- Authenticated
//! ```
//!
//! The client never blocks beyond the transport's readiness wait. All
//! progress happens in [`StreamClient::tick`], which the compositor calls
//! from its loop; observable changes are reported as [`StreamEvent`]s.

use std::fmt;
use std::time::Instant;

use crossbeam_channel::{Receiver, Sender};
use tracing::{debug, info, warn};

use super::protocol::{self, Control, ControlStatus, Message};
use super::subscription::SubscriptionList;
use super::transport::{Connector, Transport};
use crate::config::StreamConfig;
use crate::error::StreamError;

/// Frames handled per tick before yielding back to the input loop.
pub const MAX_FRAMES_PER_TICK: usize = 64;

/// Connection state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    /// No transport.
    Disconnected,
    /// Transport open, waiting for the server's greeting.
    Connecting,
    /// Greeted; authentication sent.
    Connected,
    /// Subscriptions may be changed.
    Authenticated,
}

impl fmt::Display for ConnectionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Disconnected => "disconnected",
            Self::Connecting => "connecting",
            Self::Connected => "connected",
            Self::Authenticated => "authenticated",
        };
        f.write_str(name)
    }
}

/// Something the compositor should know about.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StreamEvent {
    /// One-line message for the status row.
    Status(String),
    /// The connection moved to a new state.
    StateChanged(ConnectionState),
    /// New data arrived for a channel.
    Updated(String),
    /// A frame or entry was dropped.
    FrameError(String),
}

/// Result of a successful subscribe call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubscribeOutcome {
    /// The subscribe request went out.
    Sent,
    /// The channel was already subscribed; nothing was sent.
    AlreadySubscribed,
    /// A connection is being established; the request goes out once
    /// authenticated.
    Queued,
}

/// Counters for diagnostics.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StreamStats {
    /// Text frames received.
    pub frames_received: u64,
    /// Frames or entries that could not be understood.
    pub malformed_frames: u64,
    /// Data entries applied to a subscription.
    pub data_updates: u64,
    /// Data entries for channels nobody subscribed to.
    pub unmatched_frames: u64,
    /// Endpoint connection attempts.
    pub connect_attempts: u64,
}

/// Unbounded queue for [`StreamEvent`]s.
pub fn event_channel() -> (Sender<StreamEvent>, Receiver<StreamEvent>) {
    crossbeam_channel::unbounded()
}

/// WebSocket session manager.
pub struct StreamClient {
    connector: Box<dyn Connector>,
    primary: String,
    secondary: String,
    transport: Option<Box<dyn Transport>>,
    state: ConnectionState,
    token: Option<String>,
    subscriptions: SubscriptionList,
    events: Sender<StreamEvent>,
    stats: StreamStats,
    shutdown_requested: bool,
}

impl fmt::Debug for StreamClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StreamClient")
            .field("primary", &self.primary)
            .field("secondary", &self.secondary)
            .field("state", &self.state)
            .field("has_token", &self.token.is_some())
            .field("subscriptions", &self.subscriptions.len())
            .field("stats", &self.stats)
            .finish_non_exhaustive()
    }
}

impl StreamClient {
    /// Create a disconnected client.
    pub fn new(
        connector: Box<dyn Connector>,
        config: &StreamConfig,
        events: Sender<StreamEvent>,
    ) -> Self {
        Self::with_endpoints(
            connector,
            config.primary_endpoint(),
            config.secondary_endpoint(),
            events,
        )
    }

    /// Create a disconnected client for explicit endpoints.
    pub fn with_endpoints(
        connector: Box<dyn Connector>,
        primary: impl Into<String>,
        secondary: impl Into<String>,
        events: Sender<StreamEvent>,
    ) -> Self {
        Self {
            connector,
            primary: primary.into(),
            secondary: secondary.into(),
            transport: None,
            state: ConnectionState::Disconnected,
            token: None,
            subscriptions: SubscriptionList::new(),
            events,
            stats: StreamStats::default(),
            shutdown_requested: false,
        }
    }

    /// Current state.
    pub const fn state(&self) -> ConnectionState {
        self.state
    }

    /// Subscribed channels with their cached values.
    pub const fn subscriptions(&self) -> &SubscriptionList {
        &self.subscriptions
    }

    /// Diagnostic counters.
    pub const fn stats(&self) -> StreamStats {
        self.stats
    }

    /// True once a token is cached for this session.
    pub const fn has_token(&self) -> bool {
        self.token.is_some()
    }

    /// Cache the API token for this session.
    pub fn set_token(&mut self, token: impl Into<String>) {
        let token = token.into();
        self.token = (!token.trim().is_empty()).then(|| token.trim().to_string());
    }

    /// Record a channel's previous close. Returns false for unknown channels.
    pub fn set_previous_close(&mut self, channel: &str, close: f64) -> bool {
        self.subscriptions.set_previous_close(channel, close)
    }

    /// Add persisted channels without connecting. They are sent with the
    /// first authenticated subscribe.
    pub fn restore<I, S>(&mut self, channels: I) -> usize
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        channels
            .into_iter()
            .filter(|c| self.subscriptions.insert(c.as_ref()))
            .count()
    }

    /// Reconnect for restored channels, if any and if disconnected.
    pub fn resume(&mut self) -> Result<bool, StreamError> {
        if self.state != ConnectionState::Disconnected || self.subscriptions.is_empty() {
            return Ok(false);
        }
        self.connect()?;
        Ok(true)
    }

    /// Open a transport: primary endpoint first, then the secondary.
    pub fn connect(&mut self) -> Result<(), StreamError> {
        if self.state != ConnectionState::Disconnected {
            return Ok(());
        }
        if self.token.is_none() {
            return Err(StreamError::MissingCredential);
        }
        self.shutdown_requested = false;
        self.set_state(ConnectionState::Connecting);

        self.stats.connect_attempts += 1;
        let transport = match self.connector.connect(&self.primary) {
            Ok(transport) => transport,
            Err(primary_error) => {
                warn!(endpoint = %self.primary, error = %primary_error, "primary endpoint failed");
                self.stats.connect_attempts += 1;
                match self.connector.connect(&self.secondary) {
                    Ok(transport) => {
                        self.emit(StreamEvent::Status(format!(
                            "Real-time feed unavailable, using {}",
                            self.secondary
                        )));
                        transport
                    }
                    Err(secondary_error) => {
                        warn!(endpoint = %self.secondary, error = %secondary_error, "secondary endpoint failed");
                        self.set_state(ConnectionState::Disconnected);
                        return Err(StreamError::ConnectFailed {
                            primary: self.primary.clone(),
                            primary_error: primary_error.to_string(),
                            secondary: self.secondary.clone(),
                            secondary_error: secondary_error.to_string(),
                        });
                    }
                }
            }
        };
        self.transport = Some(transport);
        Ok(())
    }

    /// Subscribe to `channel` (e.g. `AM.X`).
    ///
    /// While disconnected this queues the channel and connects. While
    /// connecting or awaiting authentication it fails without touching the
    /// wire or the list.
    pub fn subscribe(&mut self, channel: &str) -> Result<SubscribeOutcome, StreamError> {
        match self.state {
            ConnectionState::Disconnected => {
                if self.token.is_none() {
                    return Err(StreamError::MissingCredential);
                }
                let added = self.subscriptions.insert(channel);
                if let Err(e) = self.connect() {
                    if added {
                        self.subscriptions.remove(channel);
                    }
                    return Err(e);
                }
                Ok(SubscribeOutcome::Queued)
            }
            ConnectionState::Connecting | ConnectionState::Connected => {
                Err(StreamError::NotAuthenticated)
            }
            ConnectionState::Authenticated => {
                if self.subscriptions.contains(channel) {
                    return Ok(SubscribeOutcome::AlreadySubscribed);
                }
                self.send(&protocol::subscribe_message(&[channel.to_string()]))?;
                self.subscriptions.insert(channel);
                self.subscriptions.mark_sent(channel);
                info!(channel, "subscribed");
                Ok(SubscribeOutcome::Sent)
            }
        }
    }

    /// Unsubscribe from `channel`. Returns false if it was not subscribed.
    pub fn unsubscribe(&mut self, channel: &str) -> Result<bool, StreamError> {
        if self.state != ConnectionState::Authenticated {
            return Err(StreamError::NotAuthenticated);
        }
        let Some(sub) = self.subscriptions.get(channel) else {
            return Ok(false);
        };
        if sub.is_sent() {
            self.send(&protocol::unsubscribe_message(&[channel.to_string()]))?;
        }
        self.subscriptions.remove(channel);
        info!(channel, "unsubscribed");
        Ok(true)
    }

    /// Close on the next tick.
    pub fn request_shutdown(&mut self) {
        self.shutdown_requested = true;
    }

    /// Send a close frame and drop the transport immediately.
    pub fn shutdown_now(&mut self) {
        self.shutdown_requested = false;
        if let Some(mut transport) = self.transport.take() {
            transport.close();
            info!("stream closed");
        }
        self.subscriptions.mark_all_unsent();
        self.set_state(ConnectionState::Disconnected);
    }

    /// Advance the connection by one step.
    pub fn tick(&mut self, now: Instant) {
        if self.shutdown_requested {
            self.shutdown_now();
            return;
        }
        for _ in 0..MAX_FRAMES_PER_TICK {
            let polled = match self.transport.as_mut() {
                Some(transport) => transport.poll_frame(),
                None => return,
            };
            match polled {
                Ok(Some(text)) => {
                    self.stats.frames_received += 1;
                    self.handle_frame(&text, now);
                }
                Ok(None) => return,
                Err(e) => {
                    warn!(error = %e, "stream transport failed");
                    self.teardown(format!("Stream disconnected: {e}"));
                    return;
                }
            }
        }
    }

    fn handle_frame(&mut self, text: &str, now: Instant) {
        let messages = match protocol::parse_frame(text) {
            Ok(messages) => messages,
            Err(e) => {
                self.stats.malformed_frames += 1;
                warn!(error = %e, "dropping frame");
                self.emit(StreamEvent::FrameError(e.to_string()));
                self.emit(StreamEvent::Status(String::from("Could not parse Polygon.IO JSON")));
                return;
            }
        };
        for message in messages {
            match message {
                Message::Control(control) => self.handle_control(control),
                Message::Data(aggregate) => {
                    let key = format!("{}.{}", aggregate.ev, aggregate.sym);
                    if let Some(channel) = self.subscriptions.apply(aggregate, now) {
                        self.stats.data_updates += 1;
                        self.emit(StreamEvent::Updated(channel));
                    } else {
                        self.stats.unmatched_frames += 1;
                        debug!(channel = %key, "data for unsubscribed channel");
                    }
                }
                Message::Malformed(reason) => {
                    self.stats.malformed_frames += 1;
                    debug!(%reason, "dropping entry");
                    self.emit(StreamEvent::FrameError(reason));
                    self.emit(StreamEvent::Status(String::from("Unhandled PolygonIO stream data")));
                }
            }
            if self.transport.is_none() {
                return;
            }
        }
    }

    fn handle_control(&mut self, control: Control) {
        debug!(status = ?control.status, message = %control.message, "control message");
        match control.status {
            ControlStatus::Connected => {
                self.set_state(ConnectionState::Connected);
                self.emit(StreamEvent::Status(String::from("Connected to Polygon.IO stream.")));
                let Some(token) = self.token.clone() else {
                    self.teardown(String::from("No API token for the stream"));
                    return;
                };
                // Failures already tore the connection down.
                let _ = self.send(&protocol::auth_message(&token));
            }
            ControlStatus::AuthSuccess => {
                self.set_state(ConnectionState::Authenticated);
                self.emit(StreamEvent::Status(String::from(
                    "Authenticated to PolygonIO stream.",
                )));
                let pending = self.subscriptions.unsent();
                if !pending.is_empty() && self.send(&protocol::subscribe_message(&pending)).is_ok() {
                    self.subscriptions.mark_all_sent();
                    info!(channels = %pending.join(","), "subscribed");
                }
            }
            ControlStatus::AuthFailed => {
                self.token = None;
                self.teardown(format!("Stream authentication failed: {}", control.message));
            }
            ControlStatus::Success | ControlStatus::Error | ControlStatus::Other(_) => {
                if !control.message.is_empty() {
                    self.emit(StreamEvent::Status(control.message));
                }
            }
        }
    }

    fn send(&mut self, text: &str) -> Result<(), StreamError> {
        let Some(transport) = self.transport.as_mut() else {
            return Err(StreamError::NotAuthenticated);
        };
        if let Err(e) = transport.send_text(text) {
            warn!(error = %e, "send failed");
            self.teardown(format!("Stream disconnected: {e}"));
            return Err(e);
        }
        Ok(())
    }

    fn teardown(&mut self, status: String) {
        if let Some(mut transport) = self.transport.take() {
            transport.close();
        }
        self.subscriptions.mark_all_unsent();
        self.set_state(ConnectionState::Disconnected);
        self.emit(StreamEvent::Status(status));
    }

    fn set_state(&mut self, state: ConnectionState) {
        if self.state == state {
            return;
        }
        info!(from = %self.state, to = %state, "stream state");
        self.state = state;
        self.emit(StreamEvent::StateChanged(state));
    }

    fn emit(&self, event: StreamEvent) {
        if self.events.send(event).is_err() {
            debug!("stream event receiver dropped");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::collections::VecDeque;
    use std::rc::Rc;

    const CONNECTED: &str = r#"[{"ev":"status","status":"connected","message":"Connected Successfully"}]"#;
    const AUTHED: &str = r#"[{"ev":"status","status":"auth_success","message":"authenticated"}]"#;

    #[derive(Default)]
    struct Wire {
        incoming: VecDeque<Result<Option<String>, StreamError>>,
        sent: Vec<String>,
        closed: bool,
    }

    struct ScriptedTransport(Rc<RefCell<Wire>>);

    impl Transport for ScriptedTransport {
        fn send_text(&mut self, text: &str) -> Result<(), StreamError> {
            self.0.borrow_mut().sent.push(text.to_string());
            Ok(())
        }

        fn poll_frame(&mut self) -> Result<Option<String>, StreamError> {
            self.0.borrow_mut().incoming.pop_front().unwrap_or(Ok(None))
        }

        fn close(&mut self) {
            self.0.borrow_mut().closed = true;
        }
    }

    struct ScriptedConnector {
        wire: Rc<RefCell<Wire>>,
        refuse: Vec<&'static str>,
        attempts: Rc<RefCell<Vec<String>>>,
    }

    impl Connector for ScriptedConnector {
        fn connect(&mut self, url: &str) -> Result<Box<dyn Transport>, StreamError> {
            self.attempts.borrow_mut().push(url.to_string());
            if self.refuse.iter().any(|r| *r == url) {
                return Err(StreamError::Transport(format!("{url} refused")));
            }
            Ok(Box::new(ScriptedTransport(Rc::clone(&self.wire))))
        }
    }

    struct Harness {
        client: StreamClient,
        wire: Rc<RefCell<Wire>>,
        attempts: Rc<RefCell<Vec<String>>>,
        events: Receiver<StreamEvent>,
    }

    impl Harness {
        fn new(refuse: Vec<&'static str>) -> Self {
            let wire = Rc::new(RefCell::new(Wire::default()));
            let attempts = Rc::new(RefCell::new(Vec::new()));
            let connector = ScriptedConnector {
                wire: Rc::clone(&wire),
                refuse,
                attempts: Rc::clone(&attempts),
            };
            let (tx, rx) = event_channel();
            let mut client = StreamClient::with_endpoints(Box::new(connector), "wss://rt", "wss://delayed", tx);
            client.set_token("secret");
            Self {
                client,
                wire,
                attempts,
                events: rx,
            }
        }

        fn feed(&self, frame: &str) {
            self.wire.borrow_mut().incoming.push_back(Ok(Some(frame.to_string())));
        }

        fn sent(&self) -> Vec<String> {
            self.wire.borrow().sent.clone()
        }

        fn drain(&self) -> Vec<StreamEvent> {
            self.events.try_iter().collect()
        }

        fn authenticate(&mut self) {
            self.client.connect().unwrap();
            self.feed(CONNECTED);
            self.feed(AUTHED);
            self.client.tick(Instant::now());
            assert_eq!(self.client.state(), ConnectionState::Authenticated);
        }
    }

    #[test]
    fn test_connect_then_authenticate_then_subscribe() {
        let mut h = Harness::new(vec![]);
        assert_eq!(h.client.state(), ConnectionState::Disconnected);

        h.client.connect().unwrap();
        h.feed(CONNECTED);
        h.feed(AUTHED);
        h.client.tick(Instant::now());

        let states: Vec<_> = h
            .drain()
            .into_iter()
            .filter_map(|e| match e {
                StreamEvent::StateChanged(s) => Some(s),
                _ => None,
            })
            .collect();
        assert_eq!(
            states,
            vec![
                ConnectionState::Connecting,
                ConnectionState::Connected,
                ConnectionState::Authenticated
            ]
        );
        assert_eq!(h.sent(), vec![r#"{"action":"auth","params":"secret"}"#.to_string()]);

        assert_eq!(h.client.subscribe("AM.X").unwrap(), SubscribeOutcome::Sent);
        assert_eq!(
            h.sent().last().map(String::as_str),
            Some(r#"{"action":"subscribe","params":"AM.X"}"#)
        );
    }

    #[test]
    fn test_subscribe_before_auth_is_rejected_without_wire_traffic() {
        let mut h = Harness::new(vec![]);
        h.client.connect().unwrap();
        h.feed(CONNECTED);
        h.client.tick(Instant::now());
        assert_eq!(h.client.state(), ConnectionState::Connected);
        let before = h.sent().len();

        assert!(matches!(h.client.subscribe("AM.X"), Err(StreamError::NotAuthenticated)));
        assert!(matches!(h.client.unsubscribe("AM.X"), Err(StreamError::NotAuthenticated)));
        assert_eq!(h.sent().len(), before);
        assert!(h.client.subscriptions().is_empty());
    }

    #[test]
    fn test_subscribe_twice_keeps_one_entry() {
        let mut h = Harness::new(vec![]);
        h.authenticate();
        assert_eq!(h.client.subscribe("AM.X").unwrap(), SubscribeOutcome::Sent);
        assert_eq!(
            h.client.subscribe("AM.X").unwrap(),
            SubscribeOutcome::AlreadySubscribed
        );
        assert_eq!(h.client.subscriptions().len(), 1);
        let subscribes = h.sent().iter().filter(|m| m.contains("\"subscribe\"")).count();
        assert_eq!(subscribes, 1);
    }

    #[test]
    fn test_first_subscribe_connects_and_sends_after_auth() {
        let mut h = Harness::new(vec![]);
        assert_eq!(h.client.subscribe("AM.X").unwrap(), SubscribeOutcome::Queued);
        assert_eq!(h.client.state(), ConnectionState::Connecting);
        assert!(h.sent().is_empty());

        h.feed(CONNECTED);
        h.feed(AUTHED);
        h.client.tick(Instant::now());
        assert_eq!(
            h.sent(),
            vec![
                r#"{"action":"auth","params":"secret"}"#.to_string(),
                r#"{"action":"subscribe","params":"AM.X"}"#.to_string(),
            ]
        );
        assert!(h.client.subscriptions().unsent().is_empty());
    }

    #[test]
    fn test_fallback_to_secondary_endpoint() {
        let mut h = Harness::new(vec!["wss://rt"]);
        h.client.connect().unwrap();
        assert_eq!(*h.attempts.borrow(), vec!["wss://rt", "wss://delayed"]);
        assert_eq!(h.client.stats().connect_attempts, 2);
        assert!(h
            .drain()
            .iter()
            .any(|e| matches!(e, StreamEvent::Status(s) if s.contains("wss://delayed"))));
    }

    #[test]
    fn test_both_endpoints_fail() {
        let mut h = Harness::new(vec!["wss://rt", "wss://delayed"]);
        let err = h.client.subscribe("AM.X").unwrap_err();
        assert!(matches!(err, StreamError::ConnectFailed { .. }));
        assert_eq!(h.client.state(), ConnectionState::Disconnected);
        assert!(h.client.subscriptions().is_empty());
        assert_eq!(h.attempts.borrow().len(), 2);
    }

    #[test]
    fn test_missing_token() {
        let mut h = Harness::new(vec![]);
        h.client.set_token("   ");
        assert!(matches!(h.client.subscribe("AM.X"), Err(StreamError::MissingCredential)));
        assert!(h.attempts.borrow().is_empty());
    }

    #[test]
    fn test_data_updates_matching_subscription() {
        let mut h = Harness::new(vec![]);
        h.authenticate();
        h.client.subscribe("AM.X").unwrap();
        h.drain();

        let now = Instant::now();
        h.feed(r#"[{"ev":"AM","sym":"X","c":1.25,"e":1610144700000},{"ev":"AM","sym":"Z","c":9}]"#);
        h.client.tick(now);

        let sub = h.client.subscriptions().get("AM.X").unwrap();
        assert_eq!(sub.latest().unwrap().close, Some(1.25));
        assert_eq!(sub.last_update(), Some(now));
        let stats = h.client.stats();
        assert_eq!(stats.data_updates, 1);
        assert_eq!(stats.unmatched_frames, 1);
        assert_eq!(h.drain(), vec![StreamEvent::Updated("AM.X".into())]);
    }

    #[test]
    fn test_malformed_frame_keeps_connection() {
        let mut h = Harness::new(vec![]);
        h.authenticate();
        h.feed("not json");
        h.feed(r#"[{"what":"ever"}]"#);
        h.client.tick(Instant::now());
        assert_eq!(h.client.state(), ConnectionState::Authenticated);
        assert_eq!(h.client.stats().malformed_frames, 2);
        assert!(h
            .drain()
            .iter()
            .any(|e| matches!(e, StreamEvent::Status(s) if s == "Could not parse Polygon.IO JSON")));
    }

    #[test]
    fn test_auth_failure_clears_token() {
        let mut h = Harness::new(vec![]);
        h.client.connect().unwrap();
        h.feed(CONNECTED);
        h.feed(r#"[{"ev":"status","status":"auth_failed","message":"authentication failed"}]"#);
        h.client.tick(Instant::now());
        assert_eq!(h.client.state(), ConnectionState::Disconnected);
        assert!(!h.client.has_token());
        assert!(h.wire.borrow().closed);
    }

    #[test]
    fn test_transport_error_tears_down() {
        let mut h = Harness::new(vec![]);
        h.authenticate();
        h.client.subscribe("AM.X").unwrap();
        h.wire
            .borrow_mut()
            .incoming
            .push_back(Err(StreamError::Transport("reset".into())));
        h.client.tick(Instant::now());
        assert_eq!(h.client.state(), ConnectionState::Disconnected);
        assert_eq!(h.client.subscriptions().unsent(), vec!["AM.X".to_string()]);
    }

    #[test]
    fn test_shutdown_on_next_tick_sends_close() {
        let mut h = Harness::new(vec![]);
        h.authenticate();
        h.client.request_shutdown();
        assert!(!h.wire.borrow().closed);
        h.client.tick(Instant::now());
        assert!(h.wire.borrow().closed);
        assert_eq!(h.client.state(), ConnectionState::Disconnected);
    }

    #[test]
    fn test_unsubscribe() {
        let mut h = Harness::new(vec![]);
        h.authenticate();
        h.client.subscribe("AM.X").unwrap();
        assert!(h.client.unsubscribe("AM.X").unwrap());
        assert!(!h.client.unsubscribe("AM.X").unwrap());
        assert_eq!(
            h.sent().last().map(String::as_str),
            Some(r#"{"action":"unsubscribe","params":"AM.X"}"#)
        );
    }

    #[test]
    fn test_restored_channels_go_out_together() {
        let mut h = Harness::new(vec![]);
        assert_eq!(h.client.restore(["AM.X", "AM.Y", "AM.X"]), 2);
        assert!(h.client.resume().unwrap());
        h.feed(CONNECTED);
        h.feed(AUTHED);
        h.client.tick(Instant::now());
        assert_eq!(
            h.sent().last().map(String::as_str),
            Some(r#"{"action":"subscribe","params":"AM.X,AM.Y"}"#)
        );
    }
}
