//! SSDP (Simple Service Discovery Protocol) message parsing and transport
//!
//! Two sockets are used: a listener joined to the SSDP multicast group on
//! port 1900 for `NOTIFY` announcements, and an ephemeral socket that sends
//! M-SEARCH requests and receives the unicast responses.

use std::net::{Ipv4Addr, SocketAddr};
use std::sync::Arc;

use async_trait::async_trait;
use socket2::{Domain, Protocol, Socket, Type};
use tokio::net::UdpSocket;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::error::{DiscoveryError, Result};
use crate::{ActiveSearch, Announcement, DiscoveryEvent};

/// SSDP multicast group.
pub const SSDP_MULTICAST_ADDR: Ipv4Addr = Ipv4Addr::new(239, 255, 255, 250);

/// SSDP port.
pub const SSDP_PORT: u16 = 1900;

/// A parsed SSDP datagram that is relevant to discovery.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SsdpMessage {
    /// `NOTIFY * HTTP/1.1` with `NTS: ssdp:alive`
    Alive(Announcement),
    /// `NOTIFY * HTTP/1.1` with `NTS: ssdp:byebye`
    ByeBye(Announcement),
    /// `HTTP/1.1 200 OK` answer to an M-SEARCH
    SearchResponse(Announcement),
}

impl SsdpMessage {
    /// Parse an SSDP datagram.
    ///
    /// Returns `None` for M-SEARCH requests from other control points,
    /// `ssdp:update` notifications, and messages missing USN or NT/ST.
    pub fn parse(text: &str) -> Option<Self> {
        let mut lines = text.lines();
        let start_line = lines.next()?.trim();

        let mut location = None;
        let mut target = None;
        let mut usn = None;
        let mut nts = None;

        for (name, value) in lines.filter_map(split_header) {
            if name.eq_ignore_ascii_case("LOCATION") {
                location = Some(value.to_string());
            } else if name.eq_ignore_ascii_case("NT") || name.eq_ignore_ascii_case("ST") {
                target = Some(value.to_string());
            } else if name.eq_ignore_ascii_case("USN") {
                usn = Some(value.to_string());
            } else if name.eq_ignore_ascii_case("NTS") {
                nts = Some(value.to_string());
            }
        }

        let announcement = Announcement {
            usn: usn?,
            target: target?,
            location,
        };

        if starts_with_ignore_ascii_case(start_line, "NOTIFY") {
            match nts.as_deref() {
                Some(v) if v.eq_ignore_ascii_case("ssdp:alive") => Some(Self::Alive(announcement)),
                Some(v) if v.eq_ignore_ascii_case("ssdp:byebye") => {
                    Some(Self::ByeBye(announcement))
                }
                _ => None,
            }
        } else if starts_with_ignore_ascii_case(start_line, "HTTP/1.1 200") {
            Some(Self::SearchResponse(announcement))
        } else {
            None
        }
    }

    /// Convert into the event delivered to consumers.
    pub fn into_event(self) -> DiscoveryEvent {
        match self {
            SsdpMessage::Alive(a) => DiscoveryEvent::Available(a),
            SsdpMessage::ByeBye(a) => DiscoveryEvent::Unavailable(a),
            SsdpMessage::SearchResponse(a) => DiscoveryEvent::Found(a),
        }
    }
}

/// Split a header line like `"LOCATION: http://..."` into name and trimmed value.
fn split_header(line: &str) -> Option<(&str, &str)> {
    let (name, value) = line.split_once(':')?;
    let name = name.trim();
    if name.is_empty() || name.contains(' ') {
        return None;
    }
    Some((name, value.trim()))
}

#[inline]
fn starts_with_ignore_ascii_case(s: &str, prefix: &str) -> bool {
    s.len() >= prefix.len() && s.as_bytes()[..prefix.len()].eq_ignore_ascii_case(prefix.as_bytes())
}

fn build_msearch_message(search_target: &str, mx: u8, user_agent: &str) -> String {
    format!(
        "M-SEARCH * HTTP/1.1\r\n\
         HOST: {}:{}\r\n\
         MAN: \"ssdp:discover\"\r\n\
         MX: {}\r\n\
         ST: {}\r\n\
         USER-AGENT: {}\r\n\
         \r\n",
        SSDP_MULTICAST_ADDR, SSDP_PORT, mx, search_target, user_agent
    )
}

/// Configuration for the SSDP transport.
#[derive(Debug, Clone)]
pub struct SsdpConfig {
    /// Local IPv4 interface to listen and search on (`0.0.0.0` for the default route)
    pub interface: Ipv4Addr,
    /// MX value (max response delay in seconds) sent with M-SEARCH
    pub mx: u8,
    /// Capacity of the event channel handed to the consumer
    pub channel_capacity: usize,
    /// USER-AGENT header sent with M-SEARCH
    pub user_agent: String,
}

impl Default for SsdpConfig {
    fn default() -> Self {
        Self {
            interface: Ipv4Addr::UNSPECIFIED,
            mx: 2,
            channel_capacity: 64,
            user_agent: "openhome-rs/1.0 UPnP/1.0".to_string(),
        }
    }
}

/// SSDP transport emitting [`DiscoveryEvent`]s.
///
/// Receive loops run as tokio tasks until the event receiver is dropped or
/// the transport itself is dropped.
pub struct SsdpTransport {
    search_socket: Arc<UdpSocket>,
    config: SsdpConfig,
    tasks: Vec<JoinHandle<()>>,
}

impl SsdpTransport {
    /// Bind the SSDP sockets and start listening.
    ///
    /// Returns the transport, used to trigger searches, and the receiving
    /// side of the event channel.
    pub async fn bind(config: SsdpConfig) -> Result<(Self, mpsc::Receiver<DiscoveryEvent>)> {
        let notify_socket = Arc::new(bind_notify_socket(config.interface)?);

        let search_socket = UdpSocket::bind(SocketAddr::from((config.interface, 0)))
            .await
            .map_err(DiscoveryError::SocketBind)?;
        // UPnP 1.0 recommends a TTL of 4 for SSDP multicast
        if let Err(e) = search_socket.set_multicast_ttl_v4(4) {
            tracing::warn!("Failed to set multicast TTL on search socket: {}", e);
        }
        let search_socket = Arc::new(search_socket);

        let (tx, rx) = mpsc::channel(config.channel_capacity.max(1));

        let tasks = vec![
            tokio::spawn(receive_loop(notify_socket, tx.clone(), "notify")),
            tokio::spawn(receive_loop(Arc::clone(&search_socket), tx, "search")),
        ];

        tracing::debug!(
            "SSDP transport listening on {}:{} (interface {})",
            SSDP_MULTICAST_ADDR,
            SSDP_PORT,
            config.interface
        );

        Ok((
            Self {
                search_socket,
                config,
                tasks,
            },
            rx,
        ))
    }
}

#[async_trait]
impl ActiveSearch for SsdpTransport {
    async fn search(&self, search_target: &str) -> Result<()> {
        let request = build_msearch_message(search_target, self.config.mx, &self.config.user_agent);

        self.search_socket
            .send_to(request.as_bytes(), SocketAddr::from((SSDP_MULTICAST_ADDR, SSDP_PORT)))
            .await
            .map_err(DiscoveryError::SendSearch)?;

        tracing::debug!("Sent M-SEARCH for {}", search_target);
        Ok(())
    }
}

impl Drop for SsdpTransport {
    fn drop(&mut self) {
        for task in &self.tasks {
            task.abort();
        }
    }
}

/// Create the multicast listener on port 1900.
///
/// Address reuse is required because other control points on the same host
/// usually hold the port as well.
fn bind_notify_socket(interface: Ipv4Addr) -> Result<UdpSocket> {
    let socket = Socket::new(Domain::IPV4, Type::DGRAM, Some(Protocol::UDP))
        .map_err(DiscoveryError::SocketBind)?;

    if let Err(e) = socket.set_reuse_address(true) {
        tracing::warn!("Failed to set SO_REUSEADDR: {}", e);
    }

    #[cfg(all(unix, not(any(target_os = "solaris", target_os = "illumos"))))]
    if let Err(e) = socket.set_reuse_port(true) {
        tracing::warn!("Failed to set SO_REUSEPORT: {}", e);
    }

    socket
        .bind(&SocketAddr::from((Ipv4Addr::UNSPECIFIED, SSDP_PORT)).into())
        .map_err(DiscoveryError::SocketBind)?;

    socket
        .join_multicast_v4(&SSDP_MULTICAST_ADDR, &interface)
        .map_err(DiscoveryError::MulticastJoin)?;

    socket
        .set_nonblocking(true)
        .map_err(DiscoveryError::SocketBind)?;

    let std_socket: std::net::UdpSocket = socket.into();
    UdpSocket::from_std(std_socket).map_err(DiscoveryError::SocketBind)
}

async fn receive_loop(
    socket: Arc<UdpSocket>,
    events: mpsc::Sender<DiscoveryEvent>,
    label: &'static str,
) {
    let mut buf = [0u8; 4096];

    loop {
        tokio::select! {
            _ = events.closed() => break,
            received = socket.recv_from(&mut buf) => match received {
                Ok((size, src)) => {
                    let text = String::from_utf8_lossy(&buf[..size]);
                    let Some(message) = SsdpMessage::parse(&text) else {
                        tracing::trace!("[{}] Ignoring datagram from {}", label, src);
                        continue;
                    };
                    tracing::trace!("[{}] {:?} from {}", label, message, src);
                    if events.send(message.into_event()).await.is_err() {
                        break;
                    }
                }
                Err(e) => {
                    tracing::warn!("[{}] Socket recv error: {}", label, e);
                }
            }
        }
    }

    tracing::debug!("[{}] SSDP receive loop stopped", label);
}
