use std::collections::{BTreeMap, HashMap};
use std::fmt::{Display, Formatter};
use std::future::Future;
use std::pin::Pin;
use std::sync::{Arc, Mutex};

/// Query parameter carrying the provider secret; masked in logs.
const SECRET_PARAM: &str = "apikey";

/// GET request against the provider's single query endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpRequest {
    pub base_url: String,
    pub query: BTreeMap<String, String>,
    pub timeout_ms: u64,
}

impl HttpRequest {
    pub fn get(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            query: BTreeMap::new(),
            timeout_ms: 30_000,
        }
    }

    pub fn with_param(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.insert(name.into(), value.into());
        self
    }

    pub fn with_timeout_ms(mut self, timeout_ms: u64) -> Self {
        self.timeout_ms = timeout_ms;
        self
    }

    pub fn param(&self, name: &str) -> Option<&str> {
        self.query.get(name).map(String::as_str)
    }

    /// Full URL with every parameter percent-encoded.
    pub fn url(&self) -> String {
        self.render(|_, value| urlencoding::encode(value).into_owned())
    }

    /// URL safe to log: the API key is replaced with `***`.
    pub fn redacted_url(&self) -> String {
        self.render(|name, value| {
            if name == SECRET_PARAM {
                String::from("***")
            } else {
                urlencoding::encode(value).into_owned()
            }
        })
    }

    fn render(&self, encode: impl Fn(&str, &str) -> String) -> String {
        if self.query.is_empty() {
            return self.base_url.clone();
        }
        let query = self
            .query
            .iter()
            .map(|(name, value)| format!("{}={}", urlencoding::encode(name), encode(name, value)))
            .collect::<Vec<_>>()
            .join("&");
        let separator = if self.base_url.contains('?') { '&' } else { '?' };
        format!("{}{separator}{query}", self.base_url)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub body: String,
}

impl HttpResponse {
    pub fn ok_json(body: impl Into<String>) -> Self {
        Self::with_status(200, body)
    }

    pub fn with_status(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    pub const fn is_success(&self) -> bool {
        self.status >= 200 && self.status < 300
    }
}

/// Transport-level HTTP error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpError {
    message: String,
    timeout: bool,
}

impl HttpError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            timeout: false,
        }
    }

    pub fn timeout(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            timeout: true,
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub const fn is_timeout(&self) -> bool {
        self.timeout
    }
}

impl Display for HttpError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.message)
    }
}

impl std::error::Error for HttpError {}

pub type HttpFuture<'a> = Pin<Box<dyn Future<Output = Result<HttpResponse, HttpError>> + Send + 'a>>;

/// Adapter transport contract.
pub trait HttpClient: Send + Sync {
    fn execute<'a>(&'a self, request: HttpRequest) -> HttpFuture<'a>;
}

/// Production HTTP client using reqwest.
#[derive(Debug, Clone)]
pub struct ReqwestHttpClient {
    client: Arc<reqwest::Client>,
}

impl ReqwestHttpClient {
    pub fn new() -> Self {
        Self {
            client: Arc::new(
                reqwest::Client::builder()
                    .user_agent(concat!("fundscope/", env!("CARGO_PKG_VERSION")))
                    .build()
                    .unwrap_or_else(|_| reqwest::Client::new()),
            ),
        }
    }

    pub fn with_client(client: reqwest::Client) -> Self {
        Self {
            client: Arc::new(client),
        }
    }
}

impl Default for ReqwestHttpClient {
    fn default() -> Self {
        Self::new()
    }
}

impl HttpClient for ReqwestHttpClient {
    fn execute<'a>(&'a self, request: HttpRequest) -> HttpFuture<'a> {
        Box::pin(async move {
            let timeout = std::time::Duration::from_millis(request.timeout_ms);
            let response = self
                .client
                .get(request.url())
                .timeout(timeout)
                .send()
                .await
                .map_err(|e| {
                    // reqwest errors embed the URL, which carries the API key.
                    let e = e.without_url();
                    if e.is_timeout() {
                        HttpError::timeout(format!("request timeout: {e}"))
                    } else if e.is_connect() {
                        HttpError::new(format!("connection failed: {e}"))
                    } else {
                        HttpError::new(format!("request failed: {e}"))
                    }
                })?;

            let status = response.status().as_u16();
            let body = response
                .text()
                .await
                .map_err(|e| HttpError::new(format!("failed to read response body: {}", e.without_url())))?;

            Ok(HttpResponse { status, body })
        })
    }
}

/// Offline transport that answers by the request's `function` parameter.
///
/// Unscripted functions answer `{}`. Every request is recorded so tests can
/// assert on call counts and cache hits.
#[derive(Debug, Default)]
pub struct ScriptedHttpClient {
    responses: Mutex<HashMap<String, Result<HttpResponse, HttpError>>>,
    requests: Mutex<Vec<HttpRequest>>,
}

impl ScriptedHttpClient {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn respond(self, function: &str, response: HttpResponse) -> Self {
        self.set(function, Ok(response));
        self
    }

    pub fn respond_json(self, function: &str, body: &serde_json::Value) -> Self {
        self.respond(function, HttpResponse::ok_json(body.to_string()))
    }

    pub fn fail(self, function: &str, error: HttpError) -> Self {
        self.set(function, Err(error));
        self
    }

    /// Replace the scripted answer for `function` after construction.
    pub fn set(&self, function: &str, outcome: Result<HttpResponse, HttpError>) {
        if let Ok(mut responses) = self.responses.lock() {
            responses.insert(function.to_owned(), outcome);
        }
    }

    pub fn requests(&self) -> Vec<HttpRequest> {
        self.requests
            .lock()
            .map(|requests| requests.clone())
            .unwrap_or_default()
    }

    /// How many requests carried `function`.
    pub fn calls(&self, function: &str) -> usize {
        self.requests()
            .iter()
            .filter(|request| request.param("function") == Some(function))
            .count()
    }
}

impl HttpClient for ScriptedHttpClient {
    fn execute<'a>(&'a self, request: HttpRequest) -> HttpFuture<'a> {
        let function = request.param("function").unwrap_or_default().to_owned();
        if let Ok(mut requests) = self.requests.lock() {
            requests.push(request);
        }
        let outcome = self
            .responses
            .lock()
            .ok()
            .and_then(|responses| responses.get(&function).cloned())
            .unwrap_or_else(|| Ok(HttpResponse::ok_json("{}")));
        Box::pin(async move { outcome })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn url_encodes_parameters_in_key_order() {
        let request = HttpRequest::get("https://example.test/query")
            .with_param("symbol", "BRK B")
            .with_param("function", "OVERVIEW");

        assert_eq!(
            request.url(),
            "https://example.test/query?function=OVERVIEW&symbol=BRK%20B"
        );
    }

    #[test]
    fn redacted_url_hides_api_key() {
        let request = HttpRequest::get("https://example.test/query")
            .with_param("apikey", "SECRET")
            .with_param("function", "EARNINGS");

        let redacted = request.redacted_url();
        assert!(!redacted.contains("SECRET"));
        assert!(redacted.contains("apikey=***"));
    }

    #[tokio::test]
    async fn scripted_client_answers_by_function_and_records_calls() {
        let client = ScriptedHttpClient::new()
            .respond_json("OVERVIEW", &serde_json::json!({"Symbol": "IBM"}))
            .fail("EARNINGS", HttpError::timeout("timed out"));

        let overview = client
            .execute(HttpRequest::get("x").with_param("function", "OVERVIEW"))
            .await
            .expect("scripted");
        assert!(overview.body.contains("IBM"));

        let earnings = client
            .execute(HttpRequest::get("x").with_param("function", "EARNINGS"))
            .await;
        assert!(earnings.expect_err("scripted failure").is_timeout());

        let unknown = client
            .execute(HttpRequest::get("x").with_param("function", "CASH_FLOW"))
            .await
            .expect("default answer");
        assert_eq!(unknown.body, "{}");
        assert_eq!(client.calls("OVERVIEW"), 1);
        assert_eq!(client.requests().len(), 3);
    }
}
