//! HTTP server configuration object and helpers.

use std::net::SocketAddr;

use wanderlust::inbound::http::session_config::SessionSettings;
use wanderlust::inbound::http::state::HttpState;

/// Builder-style configuration for creating the HTTP server.
pub struct ServerConfig {
    pub(crate) session: SessionSettings,
    pub(crate) bind_addr: SocketAddr,
    pub(crate) http_state: HttpState,
}

impl ServerConfig {
    /// Combine resolved session settings with the adapters behind the routes.
    #[must_use]
    pub const fn new(
        session: SessionSettings,
        bind_addr: SocketAddr,
        http_state: HttpState,
    ) -> Self {
        Self {
            session,
            bind_addr,
            http_state,
        }
    }

    /// Return the socket address the server will bind to.
    #[must_use]
    pub const fn bind_addr(&self) -> SocketAddr {
        self.bind_addr
    }
}
