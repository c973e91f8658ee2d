//! WebSocket transport.
//!
//! The client talks to the network only through [`Connector`] and
//! [`Transport`], so the connection state machine can be driven by a
//! scripted transport in tests.

use std::io::ErrorKind;
use std::net::{TcpStream, ToSocketAddrs};
use std::time::Duration;

use tracing::{debug, info};
use tungstenite::client::IntoClientRequest;
use tungstenite::stream::MaybeTlsStream;
use tungstenite::{Message, WebSocket};

use crate::error::StreamError;

/// An open message-oriented connection.
pub trait Transport {
    /// Send one text frame.
    fn send_text(&mut self, text: &str) -> Result<(), StreamError>;

    /// Return the next complete text frame if one arrives within the
    /// transport's readiness wait. Partial frames stay buffered.
    fn poll_frame(&mut self) -> Result<Option<String>, StreamError>;

    /// Send a close frame and release the connection.
    fn close(&mut self);
}

/// Opens transports.
pub trait Connector {
    /// Connect to `url`.
    fn connect(&mut self, url: &str) -> Result<Box<dyn Transport>, StreamError>;
}

/// Connects over TCP (TLS for `wss`) with `tungstenite`.
#[derive(Debug, Clone)]
pub struct WsConnector {
    connect_timeout: Duration,
    socket_wait: Duration,
}

impl WsConnector {
    /// Create a connector. `socket_wait` bounds each [`Transport::poll_frame`].
    pub const fn new(connect_timeout: Duration, socket_wait: Duration) -> Self {
        Self {
            connect_timeout,
            socket_wait,
        }
    }
}

impl Connector for WsConnector {
    fn connect(&mut self, url: &str) -> Result<Box<dyn Transport>, StreamError> {
        let request = url.into_client_request()?;
        let uri = request.uri();
        let host = uri
            .host()
            .ok_or_else(|| StreamError::Transport(format!("no host in {url}")))?
            .to_string();
        let default_port = if uri.scheme_str() == Some("wss") { 443 } else { 80 };
        let port = uri.port_u16().unwrap_or(default_port);

        let addr = (host.as_str(), port)
            .to_socket_addrs()
            .map_err(|e| StreamError::Transport(format!("resolving {host}: {e}")))?
            .next()
            .ok_or_else(|| StreamError::Transport(format!("{host} has no address")))?;

        debug!(%addr, url, "connecting");
        let tcp = TcpStream::connect_timeout(&addr, self.connect_timeout)
            .map_err(|e| StreamError::Transport(format!("connecting to {addr}: {e}")))?;
        tcp.set_nodelay(true)
            .map_err(|e| StreamError::Transport(e.to_string()))?;
        let control = tcp
            .try_clone()
            .map_err(|e| StreamError::Transport(e.to_string()))?;
        // The handshake itself blocks up to the connect timeout.
        control
            .set_read_timeout(Some(self.connect_timeout))
            .map_err(|e| StreamError::Transport(e.to_string()))?;

        let (socket, response) = tungstenite::client_tls_with_config(request, tcp, None, None)
            .map_err(|e| StreamError::Transport(format!("handshake with {url}: {e}")))?;

        let wait = if self.socket_wait.is_zero() {
            Duration::from_millis(1)
        } else {
            self.socket_wait
        };
        control
            .set_read_timeout(Some(wait))
            .map_err(|e| StreamError::Transport(e.to_string()))?;

        info!(url, status = %response.status(), "websocket open");
        Ok(Box::new(WsTransport { socket, open: true }))
    }
}

struct WsTransport {
    socket: WebSocket<MaybeTlsStream<TcpStream>>,
    open: bool,
}

impl Transport for WsTransport {
    fn send_text(&mut self, text: &str) -> Result<(), StreamError> {
        self.socket.send(Message::Text(text.to_string()))?;
        Ok(())
    }

    fn poll_frame(&mut self) -> Result<Option<String>, StreamError> {
        loop {
            match self.socket.read() {
                Ok(Message::Text(text)) => return Ok(Some(text)),
                Ok(Message::Binary(bytes)) => {
                    return String::from_utf8(bytes)
                        .map(Some)
                        .map_err(|e| StreamError::Protocol(e.to_string()));
                }
                Ok(Message::Close(frame)) => {
                    self.open = false;
                    let reason = frame.map_or_else(|| String::from("no reason"), |f| f.reason.into_owned());
                    return Err(StreamError::Transport(format!("closed by server: {reason}")));
                }
                // Pongs are queued by tungstenite and flushed on the next read.
                Ok(Message::Ping(_) | Message::Pong(_) | Message::Frame(_)) => {}
                Err(tungstenite::Error::Io(e))
                    if matches!(e.kind(), ErrorKind::WouldBlock | ErrorKind::TimedOut) =>
                {
                    return Ok(None);
                }
                Err(e) => {
                    self.open = false;
                    return Err(e.into());
                }
            }
        }
    }

    fn close(&mut self) {
        if !self.open {
            return;
        }
        self.open = false;
        if let Err(e) = self.socket.close(None).and_then(|()| self.socket.flush()) {
            debug!(error = %e, "close frame not delivered");
        }
    }
}

impl Drop for WsTransport {
    fn drop(&mut self) {
        self.close();
    }
}
