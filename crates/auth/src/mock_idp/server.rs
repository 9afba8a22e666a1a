//! Mock IdP server for development and testing.
//!
//! Simulates a provider's authorization endpoint so the whole login flow
//! can run locally without real OAuth credentials.

use axum::{
    extract::{Path, Query},
    response::{Html, Redirect},
    routing::{get, post},
    Form, Router,
};
use serde::Deserialize;
use std::net::SocketAddr;
use tokio::net::TcpListener;

use super::templates;
use crate::providers::MockCode;

#[derive(Deserialize)]
struct AuthorizeQuery {
    state: String,
    redirect_uri: String,
}

#[derive(Deserialize)]
struct LoginForm {
    state: String,
    redirect_uri: String,
    email: String,
    #[serde(default)]
    sub: String,
    #[serde(default)]
    first_name: String,
    #[serde(default)]
    last_name: String,
    #[serde(default)]
    nickname: String,
    #[serde(default)]
    action: Option<String>,
}

/// Mock IdP server that simulates OAuth authorization endpoints.
pub struct MockIdpServer {
    port: u16,
}

impl MockIdpServer {
    /// Create a new mock IdP server.
    ///
    /// # Arguments
    /// * `port` - The port to listen on (typically 3001)
    pub fn new(port: u16) -> Self {
        Self { port }
    }

    /// Routes served by the mock IdP:
    /// - `GET /{provider}/authorize` - Login page
    /// - `POST /authorize/submit` - Form submission handler
    pub fn router() -> Router {
        Router::new()
            .route("/{provider}/authorize", get(authorize))
            .route("/authorize/submit", post(authorize_submit))
    }

    /// Run the mock IdP server until the process exits.
    pub async fn run(self) -> Result<(), std::io::Error> {
        let addr = SocketAddr::from(([127, 0, 0, 1], self.port));
        tracing::info!("Mock IdP server listening on http://{}", addr);

        let listener = TcpListener::bind(addr).await?;
        axum::serve(listener, Self::router()).await
    }
}

async fn authorize(
    Path(provider): Path<String>,
    Query(params): Query<AuthorizeQuery>,
) -> Html<String> {
    Html(templates::login_page(
        &provider,
        &params.state,
        &params.redirect_uri,
    ))
}

async fn authorize_submit(Form(form): Form<LoginForm>) -> Redirect {
    let encoded_state = urlencoding::encode(&form.state);
    let separator = if form.redirect_uri.contains('?') { '&' } else { '?' };

    if form.action.as_deref() == Some("deny") {
        return Redirect::to(&format!(
            "{}{}error=access_denied&state={}",
            form.redirect_uri, separator, encoded_state,
        ));
    }

    let sub = if form.sub.is_empty() {
        format!("mock-{}", form.email)
    } else {
        form.sub
    };

    let code = MockCode {
        sub,
        email: form.email,
        first_name: form.first_name,
        last_name: form.last_name,
        nickname: form.nickname,
    }
    .encode();

    Redirect::to(&format!(
        "{}{}code={}&state={}",
        form.redirect_uri,
        separator,
        urlencoding::encode(&code),
        encoded_state,
    ))
}
