//! Subscribed channels and their cached values.

use std::path::Path;
use std::time::Instant;

use tracing::warn;

use super::protocol::Aggregate;
use crate::error::{Error, Result};

/// One subscribed channel, e.g. `AM.X` (minute aggregates for `X`).
#[derive(Debug, Clone)]
pub struct Subscription {
    channel: String,
    sent: bool,
    latest: Option<Aggregate>,
    previous_close: Option<f64>,
    last_update: Option<Instant>,
}

impl Subscription {
    /// A channel with no data yet.
    pub fn new(channel: impl Into<String>) -> Self {
        Self {
            channel: channel.into(),
            sent: false,
            latest: None,
            previous_close: None,
            last_update: None,
        }
    }

    /// Channel identifier.
    pub fn channel(&self) -> &str {
        &self.channel
    }

    /// Whether the subscribe request went out on the current connection.
    pub const fn is_sent(&self) -> bool {
        self.sent
    }

    /// Last aggregate received.
    pub const fn latest(&self) -> Option<&Aggregate> {
        self.latest.as_ref()
    }

    /// Close of the previous session, if known.
    pub const fn previous_close(&self) -> Option<f64> {
        self.previous_close
    }

    /// When data last arrived.
    pub const fn last_update(&self) -> Option<Instant> {
        self.last_update
    }

    /// True when `(ev, sym)` addresses this channel.
    pub fn matches(&self, ev: &str, sym: &str) -> bool {
        self.channel
            .split_once('.')
            .is_some_and(|(e, s)| e == ev && s == sym)
    }

    fn apply(&mut self, aggregate: Aggregate, now: Instant) {
        self.latest = Some(aggregate);
        self.last_update = Some(now);
    }
}

/// Duplicate-free, insertion-ordered subscription list.
#[derive(Debug, Clone, Default)]
pub struct SubscriptionList {
    items: Vec<Subscription>,
}

impl SubscriptionList {
    /// Empty list.
    pub const fn new() -> Self {
        Self { items: Vec::new() }
    }

    /// Number of channels.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// True when nothing is subscribed.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Iterate in subscription order.
    pub fn iter(&self) -> impl Iterator<Item = &Subscription> {
        self.items.iter()
    }

    /// Channel identifiers in order.
    pub fn channels(&self) -> Vec<String> {
        self.items.iter().map(|s| s.channel.clone()).collect()
    }

    /// Look up a channel.
    pub fn get(&self, channel: &str) -> Option<&Subscription> {
        self.items.iter().find(|s| s.channel == channel)
    }

    /// True if `channel` is present.
    pub fn contains(&self, channel: &str) -> bool {
        self.get(channel).is_some()
    }

    /// Add a channel. Returns false if it was already present.
    pub fn insert(&mut self, channel: &str) -> bool {
        if self.contains(channel) {
            return false;
        }
        self.items.push(Subscription::new(channel));
        true
    }

    /// Remove a channel. Returns false if it was absent.
    pub fn remove(&mut self, channel: &str) -> bool {
        let before = self.items.len();
        self.items.retain(|s| s.channel != channel);
        self.items.len() != before
    }

    /// Channels whose subscribe request has not gone out yet.
    pub fn unsent(&self) -> Vec<String> {
        self.items
            .iter()
            .filter(|s| !s.sent)
            .map(|s| s.channel.clone())
            .collect()
    }

    /// Flag every channel as sent.
    pub fn mark_all_sent(&mut self) {
        for sub in &mut self.items {
            sub.sent = true;
        }
    }

    /// Flag one channel as sent.
    pub fn mark_sent(&mut self, channel: &str) {
        if let Some(sub) = self.items.iter_mut().find(|s| s.channel == channel) {
            sub.sent = true;
        }
    }

    /// Forget the sent flags, e.g. after the connection dropped.
    pub fn mark_all_unsent(&mut self) {
        for sub in &mut self.items {
            sub.sent = false;
        }
    }

    /// Record the previous session close for a channel.
    pub fn set_previous_close(&mut self, channel: &str, close: f64) -> bool {
        match self.items.iter_mut().find(|s| s.channel == channel) {
            Some(sub) => {
                sub.previous_close = Some(close);
                true
            }
            None => false,
        }
    }

    /// Store an aggregate on the matching channel. Returns its identifier,
    /// or `None` if no subscription matches `(ev, sym)`.
    pub fn apply(&mut self, aggregate: Aggregate, now: Instant) -> Option<String> {
        let sub = self
            .items
            .iter_mut()
            .find(|s| s.matches(&aggregate.ev, &aggregate.sym))?;
        sub.apply(aggregate, now);
        Some(sub.channel.clone())
    }
}

/// Split a comma-separated list into trimmed, non-empty channel names.
pub fn parse_channel_list(line: &str) -> Vec<String> {
    line.split(',')
        .map(str::trim)
        .filter(|c| !c.is_empty())
        .map(String::from)
        .collect()
}

/// Read the persisted subscription list. A missing file means none.
pub fn load_subscriptions(path: &Path) -> Result<Vec<String>> {
    match std::fs::read_to_string(path) {
        Ok(text) => {
            let line = text.lines().next().unwrap_or_default();
            let channels = parse_channel_list(line);
            if text.lines().count() > 1 {
                warn!(path = %path.display(), "ignoring extra lines in subscription file");
            }
            Ok(channels)
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Vec::new()),
        Err(e) => Err(Error::io("reading subscriptions", path, e)),
    }
}

/// Write the subscription list as one comma-separated line.
pub fn save_subscriptions(path: &Path, channels: &[String]) -> Result<()> {
    let mut line = channels.join(",");
    line.push('\n');
    std::fs::write(path, line).map_err(|e| Error::io("writing subscriptions", path, e))
}
