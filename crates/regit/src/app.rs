use std::time::Duration;

use axum::{
    http::{header, HeaderValue, Method, StatusCode},
    routing::get,
    Router,
};
use regit_auth::auth_routes;
use tower_http::{
    cors::{AllowOrigin, CorsLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::{
    config::Config,
    handlers::{
        health::livez,
        messages::{create_message, list_messages},
        profile::get_profile,
        root::hello,
    },
    state::AppState,
};

/// CORS for browser clients on other origins.
///
/// Credentials are allowed so the session cookie travels. With no configured
/// origins the request's own origin is echoed back.
fn cors_layer(config: &Config) -> CorsLayer {
    let origins: Vec<HeaderValue> = config
        .cors_allowed_origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(e) => {
                tracing::warn!(%origin, error = %e, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    let allow_origin = if origins.is_empty() {
        AllowOrigin::mirror_request()
    } else {
        AllowOrigin::list(origins)
    };

    CorsLayer::new()
        .allow_origin(allow_origin)
        .allow_credentials(true)
        .allow_methods([Method::GET, Method::PUT])
        .allow_headers([header::ORIGIN, header::CONTENT_TYPE, header::ACCEPT])
}

/// Create the application router with all routes and middleware.
pub fn create_app(state: AppState, config: &Config) -> Router {
    let auth = auth_routes().with_state::<AppState>(state.auth.clone());

    Router::new()
        .route("/", get(hello))
        .route("/livez", get(livez))
        .route("/profile", get(get_profile))
        .route("/messages", get(list_messages).put(create_message))
        .merge(auth)
        .layer(cors_layer(config))
        .layer(TraceLayer::new_for_http())
        .layer(TimeoutLayer::with_status_code(
            StatusCode::REQUEST_TIMEOUT,
            Duration::from_secs(10),
        ))
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    use axum::{
        body::Body,
        http::{Request, Response},
    };
    use axum_extra::extract::{cookie::Cookie, CookieJar};
    use http_body_util::BodyExt;
    use regit_auth::{MockCode, SESSION_COOKIE};
    use regit_core::auth::USER_ID_KEY;
    use regit_core::chat::{MessageResponse, UserResponse};
    use serde_json::Value;
    use uuid::Uuid;
    use tower::ServiceExt;
    use url::Url;

    use crate::state::test_support::TEST_PROVIDER;

    fn app() -> Router {
        create_app(AppState::for_tests(), &Config::default())
    }

    /// Minimal cookie-keeping client over `oneshot`.
    #[derive(Default)]
    struct Browser {
        cookies: HashMap<String, String>,
    }

    impl Browser {
        async fn send(&mut self, app: &Router, request: Request<Body>) -> Response<Body> {
            let mut request = request;
            let header_value = self
                .cookies
                .iter()
                .map(|(k, v)| format!("{k}={v}"))
                .collect::<Vec<_>>()
                .join("; ");
            if !header_value.is_empty() {
                request
                    .headers_mut()
                    .insert(header::COOKIE, header_value.parse().unwrap());
            }

            let response = app.clone().oneshot(request).await.unwrap();

            for value in response.headers().get_all(header::SET_COOKIE) {
                let cookie = Cookie::parse(value.to_str().unwrap().to_string()).unwrap();
                if cookie.value().is_empty() {
                    self.cookies.remove(cookie.name());
                } else {
                    self.cookies
                        .insert(cookie.name().to_string(), cookie.value().to_string());
                }
            }

            response
        }

        async fn get(&mut self, app: &Router, uri: &str) -> Response<Body> {
            let request = Request::builder().uri(uri).body(Body::empty()).unwrap();
            self.send(app, request).await
        }

        async fn put_json(&mut self, app: &Router, uri: &str, json: &str) -> Response<Body> {
            let request = Request::builder()
                .method("PUT")
                .uri(uri)
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(json.to_string()))
                .unwrap();
            self.send(app, request).await
        }

        /// Walks the login round trip as the mock IdP would for `sub`.
        async fn log_in(&mut self, app: &Router, login_uri: &str, sub: &str) -> Response<Body> {
            let response = self.get(app, login_uri).await;
            assert_eq!(response.status(), StatusCode::SEE_OTHER);

            let state = Url::parse(&location(&response))
                .unwrap()
                .query_pairs()
                .find(|(k, _)| k == "state")
                .map(|(_, v)| v.into_owned())
                .unwrap();

            let code = MockCode {
                sub: sub.to_string(),
                email: format!("{sub}@example.com"),
                first_name: "Ada".to_string(),
                last_name: "Lovelace".to_string(),
                nickname: format!("nick-{sub}"),
            }
            .encode();

            let callback = format!("/auth/callback/{TEST_PROVIDER}?code={code}&state={state}");
            self.get(app, &callback).await
        }
    }

    fn location(response: &Response<Body>) -> String {
        response
            .headers()
            .get(header::LOCATION)
            .unwrap()
            .to_str()
            .unwrap()
            .to_string()
    }

    async fn body_bytes(response: Response<Body>) -> Vec<u8> {
        response
            .into_body()
            .collect()
            .await
            .unwrap()
            .to_bytes()
            .to_vec()
    }

    #[tokio::test]
    async fn test_root_greets() {
        let response = Browser::default().get(&app(), "/").await;

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_bytes(response).await, b"Hello, World!");
    }

    #[tokio::test]
    async fn test_livez() {
        let response = Browser::default().get(&app(), "/livez").await;

        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_profile_requires_session() {
        let response = Browser::default().get(&app(), "/profile").await;

        assert_eq!(response.status(), StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn test_profile_with_forged_cookie_is_forbidden() {
        let app = app();
        let mut browser = Browser::default();
        browser
            .cookies
            .insert(SESSION_COOKIE.to_string(), "not-a-session".to_string());

        let response = browser.get(&app, "/profile").await;

        assert_eq!(response.status(), StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn test_profile_with_bad_user_id_is_forbidden() {
        let state = AppState::for_tests();
        let app = create_app(state.clone(), &Config::default());

        let values = [
            Value::from(Uuid::nil().to_string()),
            Value::from(Uuid::new_v4().to_string()),
            Value::from("junk"),
            Value::from(42),
        ];
        for value in values {
            let mut session = state.auth.cross_site.get(&CookieJar::new()).await.unwrap();
            session.set(USER_ID_KEY, value.clone());
            let jar = state
                .auth
                .cross_site
                .save(CookieJar::new(), &session)
                .await
                .unwrap();

            let mut browser = Browser::default();
            browser.cookies.insert(
                SESSION_COOKIE.to_string(),
                jar.get(SESSION_COOKIE).unwrap().value().to_string(),
            );
            let response = browser.get(&app, "/profile").await;

            assert_eq!(response.status(), StatusCode::FORBIDDEN, "user_id = {value}");
        }
    }

    #[tokio::test]
    async fn test_messages_empty_list() {
        let response = Browser::default().get(&app(), "/messages").await;

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_bytes(response).await, b"[]");
    }

    #[tokio::test]
    async fn test_put_message_without_session_is_forbidden() {
        let app = app();
        let mut browser = Browser::default();

        let response = browser
            .put_json(&app, "/messages", r#"{"message":"hi"}"#)
            .await;
        assert_eq!(response.status(), StatusCode::FORBIDDEN);

        // Forbidden wins over a malformed body
        let response = browser.put_json(&app, "/messages", "{not json").await;
        assert_eq!(response.status(), StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn test_login_profile_and_messages_flow() {
        let app = app();
        let mut browser = Browser::default();

        // "L21lc3NhZ2Vz" is base64("/messages")
        let response = browser
            .log_in(&app, "/login/google?r=L21lc3NhZ2Vz", "user-1")
            .await;
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(location(&response), "/messages");

        let response = browser.get(&app, "/profile").await;
        assert_eq!(response.status(), StatusCode::OK);
        let profile: UserResponse = serde_json::from_slice(&body_bytes(response).await).unwrap();
        assert_eq!(profile.name, "nick-user-1");

        let response = browser
            .put_json(&app, "/messages", r#"{"message":"first"}"#)
            .await;
        assert_eq!(response.status(), StatusCode::OK);
        let created: MessageResponse =
            serde_json::from_slice(&body_bytes(response).await).unwrap();
        assert_eq!(created.message, "first");

        let request = Request::builder()
            .method("PUT")
            .uri("/messages")
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(Body::from("message=second"))
            .unwrap();
        let response = browser.send(&app, request).await;
        assert_eq!(response.status(), StatusCode::OK);

        // Listing needs no session
        let response = Browser::default().get(&app, "/messages").await;
        let messages: Vec<MessageResponse> =
            serde_json::from_slice(&body_bytes(response).await).unwrap();
        let texts: Vec<_> = messages.iter().map(|m| m.message.as_str()).collect();
        assert_eq!(texts, vec!["first", "second"]);
        assert_eq!(messages[0].id, created.id);
    }

    #[tokio::test]
    async fn test_malformed_message_body_is_client_error() {
        let app = app();
        let mut browser = Browser::default();
        browser.log_in(&app, "/login/google", "user-1").await;

        let response = browser.put_json(&app, "/messages", "{not json").await;

        assert!(response.status().is_client_error());
        assert_ne!(response.status(), StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn test_logout_ends_session() {
        let app = app();
        let mut browser = Browser::default();
        let response = browser.log_in(&app, "/login/google", "user-1").await;
        assert_eq!(location(&response), "/profile");

        let response = browser.get(&app, "/logout").await;
        assert_eq!(response.status(), StatusCode::OK);

        let response = browser.get(&app, "/profile").await;
        assert_eq!(response.status(), StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn test_same_provider_identity_maps_to_one_user() {
        let app = app();

        let mut first = Browser::default();
        first.log_in(&app, "/login/google", "user-1").await;
        let mut second = Browser::default();
        second.log_in(&app, "/login/google", "user-1").await;

        let profile = |response: Response<Body>| async move {
            serde_json::from_slice::<UserResponse>(&body_bytes(response).await).unwrap()
        };
        let a = profile(first.get(&app, "/profile").await).await;
        let b = profile(second.get(&app, "/profile").await).await;

        assert_eq!(a.id, b.id);
    }

    #[tokio::test]
    async fn test_unknown_provider_is_not_found() {
        let response = Browser::default().get(&app(), "/login/github").await;

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_cors_mirrors_origin_with_credentials() {
        let request = Request::builder()
            .uri("/messages")
            .header(header::ORIGIN, "http://client.example.com")
            .body(Body::empty())
            .unwrap();

        let response = app().oneshot(request).await.unwrap();

        let headers = response.headers();
        assert_eq!(
            headers[header::ACCESS_CONTROL_ALLOW_ORIGIN],
            "http://client.example.com"
        );
        assert_eq!(headers[header::ACCESS_CONTROL_ALLOW_CREDENTIALS], "true");
    }

    #[tokio::test]
    async fn test_cors_configured_origins_reject_others() {
        let config = Config {
            cors_allowed_origins: vec!["http://allowed.example.com".to_string()],
            ..Config::default()
        };
        let app = create_app(AppState::for_tests(), &config);

        let request = Request::builder()
            .uri("/messages")
            .header(header::ORIGIN, "http://evil.example.com")
            .body(Body::empty())
            .unwrap();
        let response = app.oneshot(request).await.unwrap();

        assert!(!response
            .headers()
            .contains_key(header::ACCESS_CONTROL_ALLOW_ORIGIN));
    }
}
