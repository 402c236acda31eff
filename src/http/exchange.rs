//! The narrow slice of the HTTP server the handlers are allowed to touch.
//!
//! One `HttpExchange` is one in-flight request/response pair. The handlers
//! fill in status, headers and body through it; connection handling and
//! parsing stay inside the server. Every step reports failure so the
//! handler can translate it into a 500.

use crate::error::HttpError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Head,
}

pub trait HttpExchange {
    fn method(&self) -> Method;

    /// Request header lookup. Names compare case-insensitively.
    fn request_header(&self, name: &str) -> Option<&str>;

    fn set_status(&mut self, status: u16) -> Result<(), HttpError>;

    fn set_header(&mut self, name: &'static str, value: &str) -> Result<(), HttpError>;

    fn set_content_length(&mut self, len: usize) -> Result<(), HttpError>;

    /// Send the buffered body and complete the response. `durable` says the
    /// buffer outlives the call (e.g. `'static` assets); when false the
    /// server must copy it before returning. HEAD requests drop the body
    /// but keep Content-Length.
    fn send_body(&mut self, body: &[u8], durable: bool) -> Result<(), HttpError>;

    /// Complete the response with status and headers only.
    fn send_header_only(&mut self) -> Result<(), HttpError>;

    /// Replace whatever was staged with a bare error status.
    fn send_error(&mut self, status: u16) -> Result<(), HttpError>;
}
