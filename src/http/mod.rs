//! Minimal HTTP/1.1 plumbing for the device dashboard.
//!
//! Only the request line is interpreted; headers are read and discarded.
//! Every response is sent with `Connection: close` and an explicit
//! `Content-Length`, so the client never waits on a half-open socket.

pub mod routes;
pub mod server;

use core::fmt::Write as _;

use crate::error::HttpError;

/// Longest request path we keep.  Longer paths are rejected with 400.
pub const PATH_CAPACITY: usize = 128;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Head,
    Post,
    Put,
    Delete,
    Options,
    Patch,
}

impl Method {
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "GET" => Some(Self::Get),
            "HEAD" => Some(Self::Head),
            "POST" => Some(Self::Post),
            "PUT" => Some(Self::Put),
            "DELETE" => Some(Self::Delete),
            "OPTIONS" => Some(Self::Options),
            "PATCH" => Some(Self::Patch),
            _ => None,
        }
    }
}

/// A parsed request line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Request {
    pub method: Method,
    pub path: heapless::String<PATH_CAPACITY>,
}

impl Request {
    /// Parse the start of a request head (`METHOD SP PATH SP VERSION`).
    pub fn parse(head: &str) -> Result<Self, HttpError> {
        let (method, raw_path) = parse_request_line(head).ok_or(HttpError::Parse)?;
        if !raw_path.starts_with('/') {
            return Err(HttpError::Parse);
        }
        let mut path = heapless::String::new();
        path.push_str(raw_path).map_err(|()| HttpError::Parse)?;
        Ok(Self { method, path })
    }
}

fn parse_request_line(head: &str) -> Option<(Method, &str)> {
    let line_end = head.find("\r\n").unwrap_or(head.len());
    let mut parts = head[..line_end].split_whitespace();
    let method = parts.next().and_then(Method::parse)?;
    let path = parts.next()?;
    let version = parts.next()?;
    if !version.starts_with("HTTP/") || parts.next().is_some() {
        return None;
    }
    Some((method, path))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    Ok,
    Found,
    BadRequest,
    NotFound,
    MethodNotAllowed,
    InternalServerError,
}

impl Status {
    pub fn code(self) -> u16 {
        match self {
            Self::Ok => 200,
            Self::Found => 302,
            Self::BadRequest => 400,
            Self::NotFound => 404,
            Self::MethodNotAllowed => 405,
            Self::InternalServerError => 500,
        }
    }

    pub fn reason(self) -> &'static str {
        match self {
            Self::Ok => "OK",
            Self::Found => "Found",
            Self::BadRequest => "Bad Request",
            Self::NotFound => "Not Found",
            Self::MethodNotAllowed => "Method Not Allowed",
            Self::InternalServerError => "Internal Server Error",
        }
    }
}

pub const TEXT_PLAIN: &str = "text/plain; charset=utf-8";
pub const TEXT_HTML: &str = "text/html; charset=utf-8";
pub const APPLICATION_JSON: &str = "application/json";

#[derive(Debug, Clone, PartialEq)]
pub struct Response {
    pub status: Status,
    pub content_type: &'static str,
    pub location: Option<&'static str>,
    pub body: String,
}

impl Response {
    pub fn new(status: Status, content_type: &'static str, body: impl Into<String>) -> Self {
        Self {
            status,
            content_type,
            location: None,
            body: body.into(),
        }
    }

    pub fn text(status: Status, body: impl Into<String>) -> Self {
        Self::new(status, TEXT_PLAIN, body)
    }

    pub fn html(body: String) -> Self {
        Self::new(Status::Ok, TEXT_HTML, body)
    }

    pub fn json(body: String) -> Self {
        Self::new(Status::Ok, APPLICATION_JSON, body)
    }

    pub fn redirect(location: &'static str) -> Self {
        Self {
            status: Status::Found,
            content_type: TEXT_PLAIN,
            location: Some(location),
            body: String::new(),
        }
    }

    /// Status line and headers, terminated by the blank line.
    pub fn head(&self) -> String {
        let mut out = String::with_capacity(128);
        // Writing into a String cannot fail.
        let _ = write!(
            out,
            "HTTP/1.1 {} {}\r\nContent-Type: {}\r\nContent-Length: {}\r\n",
            self.status.code(),
            self.status.reason(),
            self.content_type,
            self.body.len(),
        );
        if let Some(location) = self.location {
            let _ = write!(out, "Location: {location}\r\n");
        }
        out.push_str("Connection: close\r\n\r\n");
        out
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        let mut bytes = self.head().into_bytes();
        bytes.extend_from_slice(self.body.as_bytes());
        bytes
    }
}
