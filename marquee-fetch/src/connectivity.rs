//! Network and session connectivity signals.
//!
//! A request is only dispatched when both the network is online and the
//! session socket is connected.

use tokio::sync::watch;

/// Read side of the two connectivity signals.
#[derive(Debug, Clone)]
pub struct Connectivity {
    network: watch::Receiver<bool>,
    session: watch::Receiver<bool>,
    /// Combined state as last observed by `reconnected`.
    last_connected: bool,
}

/// Write side of the two connectivity signals.
#[derive(Debug, Clone)]
pub struct ConnectivityControl {
    network: watch::Sender<bool>,
    session: watch::Sender<bool>,
}

impl Connectivity {
    /// Create both signals with the given initial states.
    pub fn channel(network_online: bool, session_connected: bool) -> (ConnectivityControl, Connectivity) {
        let (network_tx, network_rx) = watch::channel(network_online);
        let (session_tx, session_rx) = watch::channel(session_connected);
        (
            ConnectivityControl {
                network: network_tx,
                session: session_tx,
            },
            Connectivity::from_receivers(network_rx, session_rx),
        )
    }

    pub fn from_receivers(network: watch::Receiver<bool>, session: watch::Receiver<bool>) -> Self {
        let last_connected = *network.borrow() && *session.borrow();
        Self {
            network,
            session,
            last_connected,
        }
    }

    /// A copy that only observes changes made from now on.
    pub fn subscribe(&self) -> Self {
        let mut network = self.network.clone();
        let mut session = self.session.clone();
        let last_connected = *network.borrow_and_update() && *session.borrow_and_update();
        Self {
            network,
            session,
            last_connected,
        }
    }

    pub fn network_online(&self) -> bool {
        *self.network.borrow()
    }

    pub fn session_connected(&self) -> bool {
        *self.session.borrow()
    }

    pub fn is_connected(&self) -> bool {
        self.network_online() && self.session_connected()
    }

    /// Wait for a transition into the connected state.
    ///
    /// Only an offline to connected change of the combined state counts.
    /// Re-sent values and changes that leave it offline are skipped. If both
    /// senders are gone this never returns.
    pub async fn reconnected(&mut self) {
        let mut network_open = true;
        let mut session_open = true;
        loop {
            if !network_open && !session_open {
                std::future::pending::<()>().await;
            }
            tokio::select! {
                res = self.network.changed(), if network_open => {
                    if res.is_err() {
                        network_open = false;
                        continue;
                    }
                }
                res = self.session.changed(), if session_open => {
                    if res.is_err() {
                        session_open = false;
                        continue;
                    }
                }
            }
            let now = self.is_connected();
            let was = std::mem::replace(&mut self.last_connected, now);
            if !was && now {
                return;
            }
        }
    }
}

impl ConnectivityControl {
    pub fn set_network_online(&self, online: bool) {
        send_if_changed(&self.network, online);
    }

    pub fn set_session_connected(&self, connected: bool) {
        send_if_changed(&self.session, connected);
    }

    /// Sender for the session signal, for a socket monitor to drive.
    pub fn session_sender(&self) -> watch::Sender<bool> {
        self.session.clone()
    }

    pub fn network_sender(&self) -> watch::Sender<bool> {
        self.network.clone()
    }
}

fn send_if_changed(sender: &watch::Sender<bool>, value: bool) {
    sender.send_if_modified(|current| {
        if *current == value {
            return false;
        }
        *current = value;
        true
    });
}
