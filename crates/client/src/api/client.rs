//! Blog REST API client.
//!
//! Every request goes through [`ApiClient::request`], which reads the bearer
//! token from the key-value store (not from the in-memory session) and
//! attaches it when present. Clearing the stored token therefore stops it
//! from being sent on the very next request.

use std::fmt;
use std::sync::Arc;

use reqwest::header::CONTENT_TYPE;
use reqwest::{Method, RequestBuilder, Response, StatusCode};
use secrecy::{ExposeSecret, SecretString};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, instrument, warn};
use url::Url;

use inkpost_core::{Email, Envelope, ErrorBody, LoginResponse, Post, PostDraft, PostId, Profile, User};

use super::error::ApiError;
use crate::config::{ClientConfig, parse_api_url};
use crate::storage::{KeyValueStore, keys};

const USER_AGENT: &str = concat!("inkpost/", env!("CARGO_PKG_VERSION"));

#[derive(Serialize)]
struct RegisterBody<'a> {
    name: &'a str,
    email: &'a str,
    password: &'a str,
}

#[derive(Serialize)]
struct LoginBody<'a> {
    email: &'a str,
    password: &'a str,
}

/// Blog API client bound to a base URL and a token store.
pub struct ApiClient<S> {
    http: reqwest::Client,
    base_url: Url,
    store: Arc<S>,
}

impl<S> Clone for ApiClient<S> {
    fn clone(&self) -> Self {
        Self {
            http: self.http.clone(),
            base_url: self.base_url.clone(),
            store: Arc::clone(&self.store),
        }
    }
}

impl<S> fmt::Debug for ApiClient<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ApiClient")
            .field("base_url", &self.base_url.as_str())
            .finish_non_exhaustive()
    }
}

impl<S: KeyValueStore> ApiClient<S> {
    /// Create a client from configuration.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Network` if the HTTP client cannot be built.
    pub fn new(config: &ClientConfig, store: Arc<S>) -> Result<Self, ApiError> {
        let mut builder = reqwest::Client::builder().user_agent(USER_AGENT);
        if let Some(timeout) = config.timeout {
            builder = builder.timeout(timeout);
        }

        Ok(Self {
            http: builder.build()?,
            base_url: config.api_url.clone(),
            store,
        })
    }

    /// Create a client for `base_url` with transport defaults.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::InvalidUrl` if `base_url` is not a usable base, or
    /// `ApiError::Network` if the HTTP client cannot be built.
    pub fn with_base_url(base_url: &str, store: Arc<S>) -> Result<Self, ApiError> {
        Ok(Self {
            http: reqwest::Client::builder().user_agent(USER_AGENT).build()?,
            base_url: parse_api_url(base_url).map_err(ApiError::InvalidUrl)?,
            store,
        })
    }

    /// The store the bearer token is read from.
    #[must_use]
    pub const fn store(&self) -> &Arc<S> {
        &self.store
    }

    /// Base URL of the API.
    #[must_use]
    pub const fn base_url(&self) -> &Url {
        &self.base_url
    }

    // =========================================================================
    // Users
    // =========================================================================

    /// Create an account.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the server rejects it.
    #[instrument(skip(self, password), fields(email = %email))]
    pub async fn register(
        &self,
        name: &str,
        email: &Email,
        password: &SecretString,
    ) -> Result<(), ApiError> {
        let body = RegisterBody {
            name,
            email: email.as_str(),
            password: password.expose_secret(),
        };

        Self::send(self.request(Method::POST, &["user", "new"]).await?.json(&body))
            .await?;

        debug!("Account created");
        Ok(())
    }

    /// Exchange credentials for a bearer token.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Auth` for rejected credentials and
    /// `ApiError::Decode` if the response carries no usable token.
    #[instrument(skip(self, password), fields(email = %email))]
    pub async fn login(&self, email: &Email, password: &SecretString) -> Result<SecretString, ApiError> {
        let body = LoginBody {
            email: email.as_str(),
            password: password.expose_secret(),
        };

        let response = Self::send(self.request(Method::POST, &["user", "login"]).await?.json(&body))
            .await?;
        let login: LoginResponse = read_json(response).await?;

        if login.token.is_empty() {
            return Err(ApiError::Decode("login response has an empty token".to_string()));
        }

        debug!("Login accepted");
        Ok(SecretString::from(login.token))
    }

    /// Fetch the signed-in user's profile.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails, the token is rejected, or the
    /// payload has no user ID.
    #[instrument(skip(self))]
    pub async fn profile(&self) -> Result<Profile, ApiError> {
        let response = Self::send(self.request(Method::GET, &["user", "monprofil"]).await?)
            .await?;
        let envelope: Envelope<Profile> = read_json(response).await?;

        debug!(user_id = %envelope.data.id, is_admin = envelope.data.is_admin, "Profile loaded");
        Ok(envelope.data)
    }

    /// List every user. Admin only on the server side.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the server rejects it.
    #[instrument(skip(self))]
    pub async fn list_users(&self) -> Result<Vec<User>, ApiError> {
        let response = Self::send(self.request(Method::GET, &["user", "all"]).await?)
            .await?;
        let envelope: Envelope<Vec<User>> = read_json(response).await?;

        debug!(count = envelope.data.len(), "Users loaded");
        Ok(envelope.data)
    }

    // =========================================================================
    // Posts
    // =========================================================================

    /// Create a post.
    ///
    /// Returns the created post when the server echoes it back.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the server rejects it.
    #[instrument(skip(self, draft))]
    pub async fn create_post(&self, draft: &PostDraft) -> Result<Option<Post>, ApiError> {
        let response = Self::send(self.request(Method::POST, &["post", "new"]).await?.json(draft))
            .await?;
        let body = response.text().await?;

        Ok(serde_json::from_str::<Envelope<Post>>(&body)
            .ok()
            .map(|envelope| envelope.data))
    }

    /// Fetch a post.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails, the post does not exist, or the
    /// payload does not parse.
    #[instrument(skip(self), fields(post_id = %id))]
    pub async fn get_post(&self, id: &PostId) -> Result<Post, ApiError> {
        let response = Self::send(self.request(Method::GET, &["post", id.as_str()]).await?)
            .await?;
        let envelope: Envelope<Post> = read_json(response).await?;
        Ok(envelope.data)
    }

    /// Update any post. Admin only on the server side.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the server rejects it.
    #[instrument(skip(self, draft), fields(post_id = %id))]
    pub async fn update_post(&self, id: &PostId, draft: &PostDraft) -> Result<(), ApiError> {
        Self::send(
            self.request(Method::PUT, &["post", "update", id.as_str()])
                .await?
                .json(draft),
        )
        .await?;
        Ok(())
    }

    /// Delete any post. Admin only on the server side.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the server rejects it.
    #[instrument(skip(self), fields(post_id = %id))]
    pub async fn delete_post(&self, id: &PostId) -> Result<(), ApiError> {
        Self::send(
            self.request(Method::DELETE, &["post", "delete", id.as_str()])
                .await?,
        )
        .await?;
        Ok(())
    }

    /// Update a post owned by the signed-in user.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the server rejects it.
    #[instrument(skip(self, draft), fields(post_id = %id))]
    pub async fn update_own_post(&self, id: &PostId, draft: &PostDraft) -> Result<(), ApiError> {
        Self::send(
            self.request(Method::PUT, &["post", "updateOwnPost", id.as_str()])
                .await?
                .json(draft),
        )
        .await?;
        Ok(())
    }

    /// Delete a post owned by the signed-in user.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the server rejects it.
    #[instrument(skip(self), fields(post_id = %id))]
    pub async fn delete_own_post(&self, id: &PostId) -> Result<(), ApiError> {
        Self::send(
            self.request(Method::DELETE, &["post", "deleteOwnPost", id.as_str()])
                .await?,
        )
        .await?;
        Ok(())
    }

    // =========================================================================
    // Request plumbing
    // =========================================================================

    /// Build a request for `segments` below the base URL, with credentials.
    async fn request(&self, method: Method, segments: &[&str]) -> Result<RequestBuilder, ApiError> {
        let url = self.endpoint(segments)?;
        let builder = self
            .http
            .request(method, url)
            .header(CONTENT_TYPE, "application/json");
        Ok(self.authorize(builder).await)
    }

    /// Attach the stored bearer token, if any.
    async fn authorize(&self, builder: RequestBuilder) -> RequestBuilder {
        match self.store.get(keys::USER_TOKEN).await {
            Ok(Some(token)) if !token.is_empty() => builder.bearer_auth(token),
            Ok(_) => builder,
            Err(e) => {
                warn!(error = %e, "Could not read stored token, sending request without credentials");
                builder
            }
        }
    }

    /// Append percent-encoded path segments to the base URL.
    fn endpoint(&self, segments: &[&str]) -> Result<Url, ApiError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|()| ApiError::InvalidUrl(self.base_url.to_string()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    /// Send a request and turn non-success statuses into errors.
    async fn send(builder: RequestBuilder) -> Result<Response, ApiError> {
        let response = builder.send().await?;
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        let message = serde_json::from_str::<ErrorBody>(&body)
            .ok()
            .and_then(|b| b.message);

        debug!(status = status.as_u16(), message = ?message, "API request rejected");

        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            Err(ApiError::Auth {
                status: status.as_u16(),
                message,
            })
        } else {
            Err(ApiError::Status {
                status: status.as_u16(),
                message,
            })
        }
    }
}

/// Parse a JSON response body into `T`.
async fn read_json<T: DeserializeOwned>(response: Response) -> Result<T, ApiError> {
    let body = response.text().await?;
    serde_json::from_str(&body).map_err(|e| ApiError::Decode(e.to_string()))
}
