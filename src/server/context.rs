use axum::http::HeaderMap;

const RETRY_NUM_HEADER: &str = "x-slack-retry-num";
const RETRY_REASON_HEADER: &str = "x-slack-retry-reason";

/// Per-request information handed to handlers alongside their payload.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Context {
    /// The path the request was routed by.
    pub path: String,
    /// How many times the platform has already tried to deliver this request,
    /// if it's a retry.
    pub retry_num: Option<u32>,
    pub retry_reason: Option<String>,
}

impl Context {
    pub fn new<T: ToString>(path: T, headers: &HeaderMap) -> Self {
        let header = |name| headers.get(name).and_then(|v| v.to_str().ok());

        Context {
            path: path.to_string(),
            retry_num: header(RETRY_NUM_HEADER).and_then(|v| v.trim().parse().ok()),
            retry_reason: header(RETRY_REASON_HEADER).map(ToOwned::to_owned),
        }
    }

    pub fn is_retry(&self) -> bool {
        self.retry_num.is_some()
    }
}
