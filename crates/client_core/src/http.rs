//! JSON-over-HTTP request client for the admin API.
//!
//! Every call makes exactly one attempt. Transport problems and non-success
//! statuses both come back as [`RequestFailure`]; the client never retries
//! and never reports failures on the caller's behalf.

use reqwest::{
    header::{HeaderMap, HeaderName, HeaderValue, CONTENT_TYPE},
    Client, Method, Response, StatusCode,
};
use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value;
use tracing::debug;

use crate::{config::UiConfig, error::RequestFailure};

const JSON_CONTENT_TYPE: &str = "application/json";

#[derive(Debug, Clone, PartialEq)]
pub enum RequestBody {
    /// Serialized to JSON text before sending.
    Json(Value),
    Text(String),
}

#[derive(Debug, Clone, PartialEq)]
pub enum ResponseBody {
    Json(Value),
    Text(String),
    Empty,
}

impl ResponseBody {
    pub fn as_json(&self) -> Option<&Value> {
        match self {
            ResponseBody::Json(value) => Some(value),
            _ => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            ResponseBody::Text(text) => Some(text),
            _ => None,
        }
    }

    /// The body as a JSON value; text becomes a JSON string.
    pub fn into_value(self) -> Option<Value> {
        match self {
            ResponseBody::Json(value) => Some(value),
            ResponseBody::Text(text) => Some(Value::String(text)),
            ResponseBody::Empty => None,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct RequestOptions {
    pub method: Method,
    /// Applied over the default `Content-Type: application/json`.
    pub headers: Vec<(String, String)>,
    pub body: Option<RequestBody>,
}

impl RequestOptions {
    pub fn new(method: Method) -> Self {
        Self {
            method,
            ..Self::default()
        }
    }

    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    pub fn json(mut self, body: Value) -> Self {
        self.body = Some(RequestBody::Json(body));
        self
    }

    pub fn text(mut self, body: impl Into<String>) -> Self {
        self.body = Some(RequestBody::Text(body.into()));
        self
    }
}

pub struct RequestClient {
    http: Client,
    base_url: String,
}

impl RequestClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_client(Client::new(), base_url)
    }

    pub fn with_client(http: Client, base_url: impl Into<String>) -> Self {
        Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    /// Client rooted at the configured API prefix, with its request timeout.
    pub fn from_config(config: &UiConfig) -> reqwest::Result<Self> {
        let mut builder = Client::builder();
        if let Some(timeout) = config.request_timeout() {
            builder = builder.timeout(timeout);
        }
        Ok(Self::with_client(builder.build()?, config.api_root()))
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn url_for(&self, path: &str) -> String {
        if path.is_empty() || path.starts_with('/') || path.starts_with('?') {
            format!("{}{path}", self.base_url)
        } else {
            format!("{}/{path}", self.base_url)
        }
    }

    pub async fn request(
        &self,
        path: &str,
        options: RequestOptions,
    ) -> Result<ResponseBody, RequestFailure> {
        self.send(path, options).await.map(|(_, body)| body)
    }

    pub async fn get(&self, path: &str) -> Result<ResponseBody, RequestFailure> {
        self.request(path, RequestOptions::new(Method::GET)).await
    }

    pub async fn post<B>(&self, path: &str, body: &B) -> Result<ResponseBody, RequestFailure>
    where
        B: Serialize + ?Sized,
    {
        let options = RequestOptions::new(Method::POST).json(to_value(body)?);
        self.request(path, options).await
    }

    pub async fn put<B>(&self, path: &str, body: &B) -> Result<ResponseBody, RequestFailure>
    where
        B: Serialize + ?Sized,
    {
        let options = RequestOptions::new(Method::PUT).json(to_value(body)?);
        self.request(path, options).await
    }

    pub async fn delete(&self, path: &str) -> Result<ResponseBody, RequestFailure> {
        self.request(path, RequestOptions::new(Method::DELETE)).await
    }

    pub async fn get_json<T>(&self, path: &str) -> Result<T, RequestFailure>
    where
        T: DeserializeOwned,
    {
        let (status, body) = self.send(path, RequestOptions::new(Method::GET)).await?;
        decode(status, body)
    }

    pub async fn post_json<B, T>(&self, path: &str, body: &B) -> Result<T, RequestFailure>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let options = RequestOptions::new(Method::POST).json(to_value(body)?);
        let (status, body) = self.send(path, options).await?;
        decode(status, body)
    }

    pub async fn put_json<B, T>(&self, path: &str, body: &B) -> Result<T, RequestFailure>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let options = RequestOptions::new(Method::PUT).json(to_value(body)?);
        let (status, body) = self.send(path, options).await?;
        decode(status, body)
    }

    async fn send(
        &self,
        path: &str,
        options: RequestOptions,
    ) -> Result<(StatusCode, ResponseBody), RequestFailure> {
        let url = self.url_for(path);
        let headers = merge_headers(&options.headers)?;

        let mut builder = self
            .http
            .request(options.method.clone(), &url)
            .headers(headers);
        if let Some(body) = options.body {
            let payload = match body {
                RequestBody::Json(value) => {
                    serde_json::to_string(&value).map_err(RequestFailure::transport)?
                }
                RequestBody::Text(text) => text,
            };
            builder = builder.body(payload);
        }

        debug!(method = %options.method, url = %url, "sending request");
        let response = builder.send().await.map_err(RequestFailure::transport)?;
        let status = response.status();
        let body = read_body(response).await?;
        debug!(method = %options.method, url = %url, status = status.as_u16(), "response received");

        if !status.is_success() {
            return Err(RequestFailure::api(status.as_u16(), body.into_value()));
        }
        Ok((status, body))
    }
}

fn merge_headers(overrides: &[(String, String)]) -> Result<HeaderMap, RequestFailure> {
    let mut headers = HeaderMap::new();
    headers.insert(CONTENT_TYPE, HeaderValue::from_static(JSON_CONTENT_TYPE));
    for (name, value) in overrides {
        let name = HeaderName::from_bytes(name.as_bytes()).map_err(RequestFailure::transport)?;
        let value = HeaderValue::from_str(value).map_err(RequestFailure::transport)?;
        headers.insert(name, value);
    }
    Ok(headers)
}

fn is_json_content_type(content_type: &str) -> bool {
    let essence = content_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase();
    essence == JSON_CONTENT_TYPE || essence.ends_with("+json")
}

async fn read_body(response: Response) -> Result<ResponseBody, RequestFailure> {
    let is_json = response
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .is_some_and(is_json_content_type);
    let bytes = response.bytes().await.map_err(RequestFailure::transport)?;
    if bytes.is_empty() {
        return Ok(ResponseBody::Empty);
    }
    if is_json {
        let value = serde_json::from_slice(&bytes).map_err(RequestFailure::transport)?;
        return Ok(ResponseBody::Json(value));
    }
    Ok(ResponseBody::Text(String::from_utf8_lossy(&bytes).into_owned()))
}

fn to_value<B>(body: &B) -> Result<Value, RequestFailure>
where
    B: Serialize + ?Sized,
{
    serde_json::to_value(body).map_err(RequestFailure::transport)
}

fn decode<T>(status: StatusCode, body: ResponseBody) -> Result<T, RequestFailure>
where
    T: DeserializeOwned,
{
    let value = match body {
        ResponseBody::Json(value) => value,
        ResponseBody::Empty => Value::Null,
        ResponseBody::Text(_) => {
            return Err(RequestFailure::decode(
                status.as_u16(),
                "expected a JSON response body",
            ))
        }
    };
    serde_json::from_value(value).map_err(|err| RequestFailure::decode(status.as_u16(), err))
}

#[cfg(test)]
#[path = "tests/http_tests.rs"]
mod tests;
