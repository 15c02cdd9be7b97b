//! Non-blocking HTTP listener driven from the scheduler loop.
//!
//! The listener is polled once per tick.  When a client is waiting, its
//! request is read against a single deadline, routed, answered and closed
//! before control returns to the loop, so [`DeviceState`] never needs a
//! lock.  The same `std::net` code runs on ESP-IDF (lwIP sockets) and on
//! the host.

use std::io::{ErrorKind, Read, Write};
use std::net::{SocketAddr, TcpListener, TcpStream};
use std::time::{Duration, Instant};

use log::{debug, info, warn};

use crate::app::ports::{HardwarePort, RequestDispatcher};
use crate::app::state::DeviceState;
use crate::error::{CommsError, Error, HttpError};

use super::{Request, routes};

/// Upper bound on the request head we are willing to buffer.
pub const MAX_HEAD_LEN: usize = 1024;

/// Default budget for reading one request head, and for writing its reply.
pub const DEFAULT_IO_TIMEOUT: Duration = Duration::from_millis(200);

pub struct HttpServer {
    listener: TcpListener,
    io_timeout: Duration,
}

impl HttpServer {
    /// Listen on `0.0.0.0:<port>`.
    pub fn bind(port: u16) -> Result<Self, Error> {
        Self::bind_addr(SocketAddr::from(([0, 0, 0, 0], port)))
    }

    /// Listen on an explicit address.  Port `0` lets the OS choose; see
    /// [`local_addr()`](Self::local_addr).
    pub fn bind_addr(addr: SocketAddr) -> Result<Self, Error> {
        let listener = TcpListener::bind(addr).map_err(|e| {
            warn!("HTTP: bind {} failed: {}", addr, e);
            Error::from(CommsError::ListenerBindFailed)
        })?;
        listener.set_nonblocking(true).map_err(|e| {
            warn!("HTTP: set_nonblocking failed: {}", e);
            Error::from(CommsError::ListenerBindFailed)
        })?;
        info!("HTTP: listening on {}", addr);
        Ok(Self {
            listener,
            io_timeout: DEFAULT_IO_TIMEOUT,
        })
    }

    #[must_use]
    pub fn with_io_timeout(mut self, timeout: Duration) -> Self {
        self.io_timeout = timeout;
        self
    }

    pub fn local_addr(&self) -> Option<SocketAddr> {
        self.listener.local_addr().ok()
    }

    fn exchange<H: HardwarePort>(
        &self,
        stream: &mut TcpStream,
        state: &mut DeviceState,
        hw: &mut H,
        now_ms: u32,
    ) -> Result<(), HttpError> {
        let deadline = Instant::now() + self.io_timeout;

        // The accepted socket may inherit non-blocking mode from the listener.
        stream.set_nonblocking(false).map_err(|_| HttpError::Read)?;
        stream
            .set_write_timeout(Some(self.io_timeout))
            .map_err(|_| HttpError::Write)?;

        let response = match read_request_line(stream, deadline) {
            Ok(line) => match Request::parse(&line) {
                Ok(req) => {
                    debug!("HTTP | {:?} {}", req.method, req.path);
                    routes::handle(&req, state, hw, now_ms)
                }
                Err(_) => routes::bad_request(),
            },
            Err(HttpError::Parse) => routes::bad_request(),
            Err(e) => return Err(e),
        };

        stream
            .write_all(&response.to_bytes())
            .and_then(|()| stream.flush())
            .map_err(|_| HttpError::Write)?;
        debug!("HTTP | -> {}", response.status.code());
        Ok(())
    }
}

/// Read until the blank line that ends the head, the buffer is full, or
/// `deadline` passes, whichever comes first.  A client that trickles bytes
/// cannot hold the loop past the deadline.
///
/// Only the request line is decoded.  Header bytes are never inspected, so
/// non-UTF-8 header values do not affect routing.
fn read_request_line(stream: &mut TcpStream, deadline: Instant) -> Result<String, HttpError> {
    let mut buf = [0u8; MAX_HEAD_LEN];
    let mut len = 0;
    while len < buf.len() {
        let remaining = deadline.saturating_duration_since(Instant::now());
        if remaining.is_zero() {
            return Err(HttpError::Read);
        }
        stream
            .set_read_timeout(Some(remaining))
            .map_err(|_| HttpError::Read)?;
        let n = match stream.read(&mut buf[len..]) {
            Ok(n) => n,
            Err(ref e) if e.kind() == ErrorKind::Interrupted => continue,
            Err(_) => return Err(HttpError::Read),
        };
        if n == 0 {
            if len == 0 {
                return Err(HttpError::Closed);
            }
            break;
        }
        len += n;
        if buf[..len].windows(4).any(|w| w == b"\r\n\r\n") {
            break;
        }
    }
    let head = &buf[..len];
    let line_end = head
        .windows(2)
        .position(|w| w == b"\r\n")
        .unwrap_or(len);
    core::str::from_utf8(&head[..line_end])
        .map(str::to_owned)
        .map_err(|_| HttpError::Parse)
}

impl RequestDispatcher for HttpServer {
    fn service_pending<H: HardwarePort>(
        &mut self,
        state: &mut DeviceState,
        hw: &mut H,
        now_ms: u32,
    ) -> usize {
        let mut stream = match self.listener.accept() {
            Ok((stream, _)) => stream,
            Err(ref e) if e.kind() == ErrorKind::WouldBlock => return 0,
            Err(e) => {
                warn!("HTTP: accept error: {}", e);
                return 0;
            }
        };

        match self.exchange(&mut stream, state, hw, now_ms) {
            Ok(()) => 1,
            Err(e) => {
                warn!("HTTP: request dropped: {}", e);
                0
            }
        }
    }
}
