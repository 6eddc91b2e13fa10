//! Blocking HTTP exchange with the registry over libcurl.
//!
//! Runs in the current thread; `RegistryClient` calls it from
//! `spawn_blocking`.

use std::str;
use url::Url;

use crate::config::TransportConfig;
use crate::error::TransportError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Method {
    Get,
    Put,
    Delete,
}

impl Method {
    pub(crate) fn as_str(self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Put => "PUT",
            Method::Delete => "DELETE",
        }
    }
}

/// Request body and its media type.
#[derive(Debug, Clone)]
pub(crate) struct Upload {
    pub content_type: String,
    pub body: Vec<u8>,
}

/// Status, headers of the final response (after redirects), and body.
#[derive(Debug)]
pub(crate) struct Response {
    pub url: Url,
    pub status: u32,
    pub headers: Vec<String>,
    pub body: Vec<u8>,
}

impl Response {
    /// `Content-Type` without parameters.
    pub fn media_type(&self) -> Option<&str> {
        self.header("content-type")
            .and_then(|v| v.split(';').next())
            .map(str::trim)
            .filter(|v| !v.is_empty())
    }

    /// Value of the last header named `name` (case-insensitive).
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.iter().rev().find_map(|line| {
            let (k, v) = line.split_once(':')?;
            k.trim().eq_ignore_ascii_case(name).then_some(v.trim())
        })
    }

    pub fn json<T: serde::de::DeserializeOwned>(&self) -> Result<T, TransportError> {
        serde_json::from_slice(&self.body).map_err(|source| TransportError::Decode {
            url: self.url.to_string(),
            source,
        })
    }
}

/// Performs one request and fails on any non-2xx status.
pub(crate) fn perform(
    method: Method,
    url: &Url,
    accept: Option<&str>,
    upload: Option<&Upload>,
    transport: &TransportConfig,
) -> Result<Response, TransportError> {
    let mut headers: Vec<String> = Vec::new();
    let mut body: Vec<u8> = Vec::new();

    let mut easy = curl::easy::Easy::new();
    easy.url(url.as_str())?;
    match method {
        Method::Get => easy.get(true)?,
        Method::Put => easy.custom_request("PUT")?,
        Method::Delete => easy.custom_request("DELETE")?,
    }
    easy.follow_location(true)?;
    easy.connect_timeout(transport.connect_timeout())?;
    easy.timeout(transport.request_timeout())?;
    easy.useragent(concat!("regcat/", env!("CARGO_PKG_VERSION")))?;

    let mut list = curl::easy::List::new();
    if let Some(accept) = accept {
        list.append(&format!("Accept: {accept}"))?;
    }
    if let Some(upload) = upload {
        easy.post_fields_copy(&upload.body)?;
        list.append(&format!("Content-Type: {}", upload.content_type))?;
        // No "Expect: 100-continue" round trip before the body.
        list.append("Expect:")?;
    }
    easy.http_headers(list)?;

    {
        let mut transfer = easy.transfer();
        transfer.header_function(|data| {
            if let Ok(s) = str::from_utf8(data) {
                let line = s.trim_end();
                // A new status line starts the headers of a redirected response.
                if line.starts_with("HTTP/") {
                    headers.clear();
                }
                headers.push(line.to_string());
            }
            true
        })?;
        transfer.write_function(|data| {
            body.extend_from_slice(data);
            Ok(data.len())
        })?;
        transfer.perform()?;
    }

    let status = easy.response_code()?;
    tracing::trace!(method = method.as_str(), url = %url, status, "registry response");
    if !(200..300).contains(&status) {
        return Err(TransportError::Http {
            method: method.as_str(),
            url: url.to_string(),
            status,
        });
    }

    Ok(Response {
        url: url.clone(),
        status,
        headers,
        body,
    })
}
