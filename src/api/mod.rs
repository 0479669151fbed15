mod error;

pub(crate) use error::{ApiError, ApiResult, RequestFailure};

use crate::config::EnvConfig;
use crate::models::{UserDraft, UserListResponse, UserPage, UserPatch};
use crate::session::SharedCredentials;
use async_trait::async_trait;
use reqwest::Method;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize, Clone, Debug)]
pub(crate) struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Serialize, Deserialize, Clone, Debug)]
pub(crate) struct LoginResponse {
    pub token: String,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, strum::Display)]
#[strum(serialize_all = "snake_case")]
pub(crate) enum Operation {
    Authenticate,
    ListPage,
    UpdateUser,
    DeleteUser,
}

/// The four calls the admin console makes against the users resource.
///
/// `?Send` because browser futures are tied to the JS event loop.
#[async_trait(?Send)]
pub(crate) trait UsersApi {
    /// Exchanges credentials for a session token. Does not persist it.
    async fn authenticate(&self, email: &str, password: &str) -> ApiResult<String>;

    async fn list_page(&self, page: u32) -> ApiResult<UserPage>;

    async fn update_user(&self, id: u64, draft: &UserDraft) -> ApiResult<UserPatch>;

    async fn delete_user(&self, id: u64) -> ApiResult<()>;
}

#[derive(Clone)]
pub(crate) struct ApiClient {
    pub(crate) base_url: String,
    credentials: SharedCredentials,
}

impl ApiClient {
    pub fn new(base_url: String, credentials: SharedCredentials) -> Self {
        Self {
            base_url: EnvConfig::with_api_url(base_url).api_url,
            credentials,
        }
    }

    pub fn from_env(credentials: SharedCredentials) -> Self {
        Self::new(EnvConfig::new().api_url, credentials)
    }

    fn with_auth_headers(
        mut req: reqwest::RequestBuilder,
        token: Option<String>,
    ) -> reqwest::RequestBuilder {
        if let Some(token) = token {
            req = req.header("Authorization", format!("Bearer {}", token));
        }
        req
    }

    fn request_builder(
        &self,
        client: &reqwest::Client,
        method: Method,
        path: &str,
        body: Option<&impl Serialize>,
    ) -> reqwest::RequestBuilder {
        let url = format!("{}{}", self.base_url, path);
        let mut req = client.request(method, url);
        // Read the store per request so a logout or re-login is picked up immediately.
        req = Self::with_auth_headers(req, self.credentials.get());

        if let Some(b) = body {
            req = req.json(b);
        }
        req
    }

    async fn send(
        &self,
        method: Method,
        path: &str,
        body: Option<&impl Serialize>,
    ) -> Result<reqwest::Response, RequestFailure> {
        let client = reqwest::Client::new();
        let res = self
            .request_builder(&client, method, path, body)
            .send()
            .await
            .map_err(RequestFailure::network)?;

        if res.status().is_success() {
            Ok(res)
        } else {
            let status = res.status().as_u16();
            let body = res.text().await.unwrap_or_default();
            Err(RequestFailure::from_status(status, body))
        }
    }

    async fn send_json<T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        body: Option<&impl Serialize>,
    ) -> Result<T, RequestFailure> {
        let res = self.send(method, path, body).await?;
        res.json().await.map_err(RequestFailure::decode)
    }
}

fn log_outcome<T>(op: Operation, result: ApiResult<T>) -> ApiResult<T> {
    match &result {
        Ok(_) => tracing::debug!(%op, "request succeeded"),
        Err(e) => tracing::warn!(%op, error = %e, "request failed"),
    }
    result
}

#[async_trait(?Send)]
impl UsersApi for ApiClient {
    async fn authenticate(&self, email: &str, password: &str) -> ApiResult<String> {
        tracing::debug!(op = %Operation::Authenticate, "sending request");
        let body = LoginRequest {
            email: email.to_string(),
            password: password.to_string(),
        };
        let result = self
            .send_json::<LoginResponse>(Method::POST, "/login", Some(&body))
            .await
            .and_then(|res| {
                if res.token.trim().is_empty() {
                    Err(RequestFailure::Decode("empty token".to_string()))
                } else {
                    Ok(res.token)
                }
            })
            .map_err(ApiError::Auth);
        log_outcome(Operation::Authenticate, result)
    }

    async fn list_page(&self, page: u32) -> ApiResult<UserPage> {
        tracing::debug!(op = %Operation::ListPage, page, "sending request");
        let result = self
            .send_json::<UserListResponse>(
                Method::GET,
                &format!("/users?page={page}"),
                None::<&()>,
            )
            .await
            .map(UserPage::from)
            .map_err(ApiError::Fetch);
        log_outcome(Operation::ListPage, result)
    }

    async fn update_user(&self, id: u64, draft: &UserDraft) -> ApiResult<UserPatch> {
        tracing::debug!(op = %Operation::UpdateUser, id, "sending request");
        let result = self
            .send_json::<UserPatch>(Method::PUT, &format!("/users/{id}"), Some(draft))
            .await
            .map_err(ApiError::Update);
        log_outcome(Operation::UpdateUser, result)
    }

    async fn delete_user(&self, id: u64) -> ApiResult<()> {
        tracing::debug!(op = %Operation::DeleteUser, id, "sending request");
        // The server answers 204 with no body; nothing to decode.
        let result = self
            .send(Method::DELETE, &format!("/users/{id}"), None::<&()>)
            .await
            .map(|_| ())
            .map_err(ApiError::Delete);
        log_outcome(Operation::DeleteUser, result)
    }
}
