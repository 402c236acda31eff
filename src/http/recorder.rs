//! In-memory [`HttpExchange`] for host tests and the simulation build.
//!
//! Behaves like the device server as far as the handlers can tell: status
//! defaults to 200, HEAD drops the body but keeps Content-Length, request
//! header names compare case-insensitively. Any single step can be made to
//! fail to exercise the 500 path.

use crate::error::HttpError;

use super::exchange::{HttpExchange, Method};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResponseRecorder {
    method: Method,
    request_headers: Vec<(String, String)>,
    fail_on: Option<HttpError>,

    pub status: u16,
    pub headers: Vec<(&'static str, String)>,
    pub content_length: Option<usize>,
    pub body: Vec<u8>,
    /// Whether `send_body` was handed a buffer that outlives the call.
    pub durable: Option<bool>,
    pub sent: bool,
}

impl ResponseRecorder {
    pub fn new(method: Method) -> Self {
        Self {
            method,
            request_headers: Vec::new(),
            fail_on: None,
            status: 200,
            headers: Vec::new(),
            content_length: None,
            body: Vec::new(),
            durable: None,
            sent: false,
        }
    }

    pub fn get() -> Self {
        Self::new(Method::Get)
    }

    pub fn head() -> Self {
        Self::new(Method::Head)
    }

    #[must_use]
    pub fn with_request_header(mut self, name: &str, value: &str) -> Self {
        self.request_headers.push((name.to_owned(), value.to_owned()));
        self
    }

    /// Make the matching step return `err`. `SetHeader` matches by name.
    #[must_use]
    pub fn failing_on(mut self, err: HttpError) -> Self {
        self.fail_on = Some(err);
        self
    }

    /// First response header with this name (case-insensitive).
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    pub fn body_str(&self) -> &str {
        core::str::from_utf8(&self.body).unwrap_or("")
    }

    fn check(&self, step: HttpError) -> Result<(), HttpError> {
        if self.fail_on == Some(step) { Err(step) } else { Ok(()) }
    }
}

impl HttpExchange for ResponseRecorder {
    fn method(&self) -> Method {
        self.method
    }

    fn request_header(&self, name: &str) -> Option<&str> {
        self.request_headers
            .iter()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    fn set_status(&mut self, status: u16) -> Result<(), HttpError> {
        self.check(HttpError::SetStatus)?;
        self.status = status;
        Ok(())
    }

    fn set_header(&mut self, name: &'static str, value: &str) -> Result<(), HttpError> {
        self.check(HttpError::SetHeader(name))?;
        self.headers.push((name, value.to_owned()));
        Ok(())
    }

    fn set_content_length(&mut self, len: usize) -> Result<(), HttpError> {
        self.check(HttpError::SetContentLength)?;
        self.content_length = Some(len);
        Ok(())
    }

    fn send_body(&mut self, body: &[u8], durable: bool) -> Result<(), HttpError> {
        self.check(HttpError::SendBody)?;
        if self.method == Method::Get {
            self.body = body.to_vec();
        }
        self.durable = Some(durable);
        self.sent = true;
        Ok(())
    }

    fn send_header_only(&mut self) -> Result<(), HttpError> {
        self.check(HttpError::SendHeaders)?;
        self.body.clear();
        self.sent = true;
        Ok(())
    }

    fn send_error(&mut self, status: u16) -> Result<(), HttpError> {
        self.status = status;
        self.headers.clear();
        self.content_length = Some(0);
        self.body.clear();
        self.durable = None;
        self.sent = true;
        Ok(())
    }
}
