//! Network reachability status.
//!
//! [`ConnectivityMonitor`] is a two-state machine owned by the UI thread.  It
//! never looks at the network itself; it only applies path updates delivered
//! to it.  Those updates come from the path watcher in [`crate::worker`],
//! which asks a [`ReachabilityProbe`] and reports only changes.
//!
//! While the monitor says [`ConnectivityStatus::Disconnected`] no fetch is
//! started and the UI shows its offline screen.

use std::future::Future;
use std::time::Duration;

use tokio::net::TcpStream;
use tracing::info;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ConnectivityStatus {
    #[default]
    Connected,
    Disconnected,
}

impl ConnectivityStatus {
    pub fn from_reachable(reachable: bool) -> Self {
        if reachable {
            Self::Connected
        } else {
            Self::Disconnected
        }
    }
}

/// A status change reported by [`ConnectivityMonitor::apply`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Transition {
    pub from: ConnectivityStatus,
    pub to: ConnectivityStatus,
}

impl Transition {
    /// True for `Disconnected -> Connected`.
    pub fn is_reconnect(self) -> bool {
        self.from == ConnectivityStatus::Disconnected && self.to == ConnectivityStatus::Connected
    }
}

/// Current reachability as last reported by the path watcher.
#[derive(Debug, Clone)]
pub struct ConnectivityMonitor {
    status: ConnectivityStatus,
}

impl ConnectivityMonitor {
    /// `initial` holds until the first path update arrives.
    pub fn new(initial: ConnectivityStatus) -> Self {
        Self { status: initial }
    }

    pub fn status(&self) -> ConnectivityStatus {
        self.status
    }

    pub fn is_connected(&self) -> bool {
        self.status == ConnectivityStatus::Connected
    }

    /// Apply a path update.  Returns the transition if the status changed.
    pub fn apply(&mut self, update: ConnectivityStatus) -> Option<Transition> {
        if update == self.status {
            return None;
        }
        let transition = Transition {
            from: self.status,
            to: update,
        };
        self.status = update;
        info!(from = ?transition.from, to = ?transition.to, "connectivity changed");
        Some(transition)
    }
}

/// Answers "can we reach the network right now?".
pub trait ReachabilityProbe: Send + Sync + 'static {
    fn reachable(&self) -> impl Future<Output = bool> + Send;
}

/// Reachability by opening (and immediately dropping) a TCP connection.
pub struct TcpProbe {
    addr: String,
    timeout: Duration,
}

impl TcpProbe {
    /// `addr` is a `host:port` pair, e.g. `newsapi.org:443`.
    pub fn new(addr: impl Into<String>, timeout: Duration) -> Self {
        Self {
            addr: addr.into(),
            timeout,
        }
    }
}

impl ReachabilityProbe for TcpProbe {
    async fn reachable(&self) -> bool {
        matches!(
            tokio::time::timeout(self.timeout, TcpStream::connect(self.addr.as_str())).await,
            Ok(Ok(_))
        )
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
