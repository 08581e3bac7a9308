//! # Dashboard HTTP Server
//!
//! A lightweight JSON API over one operator session, served with tiny-http.
//! Rendering (charts, map tiles, page layout) is left to whatever front end
//! consumes the API. See [`api`] for the endpoint list.
//!
//! Requests are handled one at a time against a single [`Session`]. The
//! history therefore lives exactly as long as the server process.

pub mod api;
pub mod map;

use std::io::Read;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use crate::analysis::Session;
use crate::{DashboardConfig, NetraError, NetraResult};

/// How often the accept loop checks the shutdown flag.
const POLL_INTERVAL: Duration = Duration::from_millis(250);

pub struct DashboardServer {
    config: DashboardConfig,
    session: Arc<Mutex<Session>>,
}

impl DashboardServer {
    pub fn new(config: &DashboardConfig, session: Session) -> Self {
        Self {
            config: config.clone(),
            session: Arc::new(Mutex::new(session)),
        }
    }

    /// Shared handle to the session, e.g. for a final report on shutdown.
    pub fn session(&self) -> Arc<Mutex<Session>> {
        Arc::clone(&self.session)
    }

    /// Get the bind address string for this dashboard.
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.config.bind_address, self.config.port)
    }

    /// Serve until `shutdown` is set. Blocking; run it on its own thread.
    pub fn run(&self, shutdown: Arc<AtomicBool>) -> NetraResult<()> {
        let addr = self.bind_address();
        let server = tiny_http::Server::http(&addr)
            .map_err(|e| NetraError::Dashboard(format!("Cannot bind {}: {}", addr, e)))?;

        log::info!("[DASHBOARD] Listening on http://{}", addr);

        let mut served: u64 = 0;
        while !shutdown.load(Ordering::SeqCst) {
            let mut request = match server.recv_timeout(POLL_INTERVAL)? {
                Some(r) => r,
                None => continue,
            };

            let method = request.method().to_string();
            let url = request.url().to_string();

            let mut body = String::new();
            if let Err(e) = request.as_reader().read_to_string(&mut body) {
                log::warn!("[DASHBOARD] Unreadable body on {} {}: {}", method, url, e);
            }

            let response = {
                let mut session = self
                    .session
                    .lock()
                    .map_err(|_| NetraError::Dashboard("session lock poisoned".to_string()))?;
                api::route(&mut session, &method, &url, &body)
            };

            log::debug!("[DASHBOARD] {} {} -> {}", method, url, response.status);

            let header = tiny_http::Header::from_bytes(
                &b"Content-Type"[..],
                response.content_type.as_bytes(),
            )
            .map_err(|_| NetraError::Dashboard("invalid content type header".to_string()))?;

            let http_response = tiny_http::Response::from_string(response.body)
                .with_status_code(response.status)
                .with_header(header);

            if let Err(e) = request.respond(http_response) {
                log::warn!("[DASHBOARD] Failed to respond to {} {}: {}", method, url, e);
            }
            served += 1;
        }

        log::info!("[DASHBOARD] Stopped after {} requests", served);
        Ok(())
    }
}
