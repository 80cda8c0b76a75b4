//! Graph API access.
//!
//! Everything above this module consumes the [`GraphSession`] trait, so the
//! harvesting logic never sees HTTP. The concrete [`GraphClient`] signs each
//! request with the app access token (`app_id|app_secret`); tests substitute
//! a scripted session.

pub mod error;
pub mod page;

use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value;

pub use error::GraphError;

const GRAPH_ROOT: &str = "https://graph.facebook.com/v2.12";

/// Minimal async session over the Graph API.
///
/// `get` addresses a resource path relative to the API root; `get_url`
/// follows an absolute URL, which is how paging continuations arrive.
#[async_trait::async_trait]
pub trait GraphSession: Send + Sync {
    async fn get(&self, path: &str, params: &[(&str, &str)]) -> Result<Value, GraphError>;

    async fn get_url(&self, url: &str) -> Result<Value, GraphError>;
}

/// Reqwest-backed session authenticated with an app access token.
pub struct GraphClient {
    http: reqwest::Client,
    root: String,
    access_token: String,
}

impl GraphClient {
    pub fn new(app_id: &str, app_secret: &str) -> Self {
        Self {
            http: reqwest::Client::new(),
            root: GRAPH_ROOT.to_string(),
            access_token: format!("{app_id}|{app_secret}"),
        }
    }
}

#[async_trait::async_trait]
impl GraphSession for GraphClient {
    async fn get(&self, path: &str, params: &[(&str, &str)]) -> Result<Value, GraphError> {
        let url = format!("{}/{}", self.root, path);
        tracing::debug!("GET {url}");
        let response = self
            .http
            .get(&url)
            .query(&[("access_token", self.access_token.as_str())])
            .query(params)
            .send()
            .await?;
        interpret(response).await
    }

    async fn get_url(&self, url: &str) -> Result<Value, GraphError> {
        tracing::debug!("GET {url}");
        let response = self.http.get(url).send().await?;
        interpret(response).await
    }
}

#[derive(Debug, Default, Deserialize)]
struct ApiErrorBody {
    #[serde(default)]
    message: String,
    #[serde(default, rename = "type")]
    kind: String,
    #[serde(default)]
    code: i64,
}

/// Turn a Graph response into a JSON value, surfacing the embedded `error`
/// object when present. Graph reports failures with a JSON body even on
/// non-2xx statuses, so the body is checked before the status code.
async fn interpret(response: reqwest::Response) -> Result<Value, GraphError> {
    let status = response.status();
    let value: Value = response.json().await?;
    if let Some(err) = value.get("error") {
        let body: ApiErrorBody = serde_json::from_value(err.clone()).unwrap_or_default();
        return Err(GraphError::Api {
            code: body.code,
            kind: body.kind,
            message: body.message,
        });
    }
    if !status.is_success() {
        return Err(GraphError::Api {
            code: i64::from(status.as_u16()),
            kind: "http".to_string(),
            message: format!("unexpected status {status}"),
        });
    }
    Ok(value)
}

/// Decode a response value into a wire struct, naming the resource in the
/// error so a shape mismatch is traceable to the request that produced it.
pub fn decode<T: DeserializeOwned>(resource: &str, value: Value) -> Result<T, GraphError> {
    serde_json::from_value(value).map_err(|source| GraphError::Decode {
        resource: resource.to_string(),
        source,
    })
}
