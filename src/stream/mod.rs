//! Live market-data stream: wire protocol, transport, connection state
//! machine and the text of the stream panel.

pub mod client;
pub mod credentials;
pub mod panel;
pub mod protocol;
pub mod subscription;
pub mod transport;

pub use client::{
    event_channel, ConnectionState, StreamClient, StreamEvent, StreamStats, SubscribeOutcome,
};
pub use credentials::{TokenStore, TOKEN_PROMPT};
pub use protocol::{Aggregate, Message};
pub use subscription::{load_subscriptions, save_subscriptions, Subscription, SubscriptionList};
pub use transport::{Connector, Transport, WsConnector};
