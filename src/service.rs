// SPDX-License-Identifier: Apache-2.0
// Copyright (C) 2025 Michael Dippery <michael@monkey-robot.com>

//! Authenticated requests to external AI providers.
//!
//! Requests sent through these services go straight to the provider's own
//! servers, carrying the caller's API key.

use crate::auth::Auth;
use crate::http::{HTTPError, HTTPResult, HTTPService};
use crate::provider::Provider;
use log::{debug, info};
use reqwest::{Client, IntoUrl, RequestBuilder, StatusCode, header};

/// A general service for making authenticated HTTP calls to an API.
///
/// While this may appear to be more like a "client", think of it as a
/// proxy for a (possibly remote) API service.
pub trait APIService {
    /// Send a GET request to the `uri` and return the raw response body.
    fn get<U>(&self, uri: U, auth: &Auth) -> impl Future<Output = HTTPResult<String>> + Send
    where
        U: IntoUrl + Send;
}

/// Adds `auth` to a request as a bearer token.
pub fn authorize(request: RequestBuilder, auth: &Auth) -> RequestBuilder {
    let auth_header = format!("Bearer {}", auth.api_key());
    request.header(header::AUTHORIZATION, auth_header)
}

/// The outcome of checking a credential with its provider.
#[derive(Debug, Eq, PartialEq)]
pub enum Verification {
    /// The provider accepted the credential.
    Valid,

    /// The provider rejected the credential with the given status.
    Invalid(StatusCode),

    /// The provider offers no way to check credentials.
    Unsupported,
}

impl Verification {
    /// Interprets the status of a response from a verification endpoint.
    ///
    /// A 401 or 403 means the credential was rejected; any other
    /// unsuccessful status is an error.
    pub fn from_status(status: StatusCode) -> HTTPResult<Self> {
        match status {
            status if status.is_success() => Ok(Self::Valid),
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => Ok(Self::Invalid(status)),
            status => Err(HTTPError::Http(status)),
        }
    }
}

/// A concrete implementation of an HTTP API service.
///
/// It more or less just wraps a Reqwest client, making it easier to swap
/// out the service for a deterministic service when writing tests.
#[derive(Debug)]
pub struct ProviderService {
    client: Client,
}

impl HTTPService for ProviderService {}

impl ProviderService {
    /// Creates a new service with a default HTTP client.
    pub fn new() -> HTTPResult<Self> {
        let client = Self::client()?;
        Ok(Self { client })
    }

    /// Checks `auth` against `provider`'s API.
    ///
    /// See [`Verification::from_status()`] for how responses are judged.
    pub async fn verify(&self, provider: Provider, auth: &Auth) -> HTTPResult<Verification> {
        let Some(uri) = provider.verify_url() else {
            debug!("{provider} has no verification endpoint");
            return Ok(Verification::Unsupported);
        };

        info!("Verifying {provider} credential against {uri}");
        match self.get(uri, auth).await {
            Ok(_) => Ok(Verification::Valid),
            Err(HTTPError::Http(status)) => Verification::from_status(status),
            Err(err) => Err(err),
        }
    }
}

impl APIService for ProviderService {
    // Actual requests are covered by the replicate_service_https
    // integration test, which needs a live credential.
    async fn get<U>(&self, uri: U, auth: &Auth) -> HTTPResult<String>
    where
        U: IntoUrl + Send,
    {
        let resp = authorize(self.client.get(uri), auth).send().await?;
        if !resp.status().is_success() {
            Err(HTTPError::Http(resp.status()))
        } else {
            resp.text().await.map_err(HTTPError::Body)
        }
    }
}
