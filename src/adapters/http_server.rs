//! ESP-IDF HTTP server binding.
//!
//! Registers every route for GET and HEAD and adapts each in-flight
//! request to [`HttpExchange`]. Status and headers are staged in fixed
//! buffers until the handler sends, because the IDF response is created in
//! one call with all headers at once.

use std::sync::Arc;
use std::time::Duration;

use esp_idf_svc::http::server::{Configuration, EspHttpConnection, EspHttpServer, Request};
use esp_idf_svc::http::{Headers, Method as EspMethod};
use esp_idf_svc::io::Write;
use log::info;

use crate::app::ports::TelemetryPort;
use crate::config::SystemConfig;
use crate::error::HttpError;
use crate::http::exchange::{HttpExchange, Method};
use crate::http::{Exposition, ROUTES};

const MAX_HEADERS: usize = 6;
type HeaderValue = heapless::String<48>;

pub struct EspExchange<'r, 'c> {
    req: Option<Request<&'r mut EspHttpConnection<'c>>>,
    method: Method,
    status: u16,
    headers: heapless::Vec<(&'static str, HeaderValue), MAX_HEADERS>,
    content_length: Option<heapless::String<10>>,
}

impl<'r, 'c> EspExchange<'r, 'c> {
    pub fn new(req: Request<&'r mut EspHttpConnection<'c>>, method: Method) -> Self {
        Self {
            req: Some(req),
            method,
            status: 200,
            headers: heapless::Vec::new(),
            content_length: None,
        }
    }

    fn respond(&mut self, body: Option<&[u8]>, err: HttpError) -> Result<(), HttpError> {
        let req = self.req.take().ok_or(err)?;

        let mut hdrs: heapless::Vec<(&str, &str), { MAX_HEADERS + 1 }> = heapless::Vec::new();
        for (name, value) in &self.headers {
            hdrs.push((*name, value.as_str())).map_err(|_| err)?;
        }
        if let Some(len) = &self.content_length {
            hdrs.push(("Content-Length", len.as_str())).map_err(|_| err)?;
        }

        let mut resp = req.into_response(self.status, None, &hdrs).map_err(|_| err)?;
        if let (Some(body), Method::Get) = (body, self.method) {
            resp.write_all(body).map_err(|_| HttpError::SendBody)?;
        }
        Ok(())
    }
}

impl HttpExchange for EspExchange<'_, '_> {
    fn method(&self) -> Method {
        self.method
    }

    fn request_header(&self, name: &str) -> Option<&str> {
        self.req.as_ref()?.header(name)
    }

    fn set_status(&mut self, status: u16) -> Result<(), HttpError> {
        self.status = status;
        Ok(())
    }

    fn set_header(&mut self, name: &'static str, value: &str) -> Result<(), HttpError> {
        let mut v = HeaderValue::new();
        v.push_str(value).map_err(|_| HttpError::SetHeader(name))?;
        self.headers.push((name, v)).map_err(|_| HttpError::SetHeader(name))
    }

    fn set_content_length(&mut self, len: usize) -> Result<(), HttpError> {
        use core::fmt::Write as _;
        let mut s = heapless::String::new();
        write!(s, "{}", len).map_err(|_| HttpError::SetContentLength)?;
        self.content_length = Some(s);
        Ok(())
    }

    /// The IDF server copies on write, so `durable` changes nothing here.
    fn send_body(&mut self, body: &[u8], _durable: bool) -> Result<(), HttpError> {
        self.respond(Some(body), HttpError::SendBody)
    }

    fn send_header_only(&mut self) -> Result<(), HttpError> {
        self.respond(None, HttpError::SendHeaders)
    }

    fn send_error(&mut self, status: u16) -> Result<(), HttpError> {
        self.status = status;
        self.headers.clear();
        self.set_content_length(0)?;
        self.respond(None, HttpError::SendHeaders)
    }
}

/// Start the server and register GET and HEAD for every route.
pub fn start<T>(exposition: Arc<Exposition<T>>, cfg: &SystemConfig) -> anyhow::Result<EspHttpServer<'static>>
where
    T: TelemetryPort + ?Sized + 'static,
{
    let conf = Configuration {
        http_port: cfg.http_port,
        session_timeout: Duration::from_secs(u64::from(cfg.http_idle_timeout_secs)),
        max_uri_handlers: ROUTES.len() * 2,
        stack_size: 8 * 1024,
        ..Default::default()
    };
    let mut server = EspHttpServer::new(&conf)?;

    for endpoint in ROUTES {
        for (method, esp_method) in [(Method::Get, EspMethod::Get), (Method::Head, EspMethod::Head)] {
            let exp = Arc::clone(&exposition);
            server.fn_handler::<anyhow::Error, _>(endpoint.path(), esp_method, move |req| {
                let mut ex = EspExchange::new(req, method);
                exp.serve(endpoint, &mut ex)?;
                Ok(())
            })?;
        }
    }

    info!(
        "http: listening on :{} ({} routes, idle timeout {}s)",
        cfg.http_port,
        ROUTES.len(),
        cfg.http_idle_timeout_secs
    );
    Ok(server)
}
