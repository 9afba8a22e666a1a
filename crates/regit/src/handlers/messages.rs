//! Message log handlers.

use axum::{
    extract::{FromRequest, Request, State},
    http::header,
    response::{IntoResponse, Response},
    Form, Json,
};
use regit_auth::CurrentUser;
use regit_core::chat::{
    message_view, message_views, CreateMessageRequest, Message, MessageResponse,
};

use crate::{handlers::AppError, state::AppState};

/// Body of `PUT /messages`, sent either as JSON or as an urlencoded form.
#[derive(Debug)]
pub struct MessageBody(pub CreateMessageRequest);

impl<S> FromRequest<S> for MessageBody
where
    S: Send + Sync,
{
    type Rejection = Response;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let is_form = req
            .headers()
            .get(header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .is_some_and(|v| v.starts_with("application/x-www-form-urlencoded"));

        if is_form {
            let Form(body) = Form::<CreateMessageRequest>::from_request(req, state)
                .await
                .map_err(IntoResponse::into_response)?;
            Ok(Self(body))
        } else {
            let Json(body) = Json::<CreateMessageRequest>::from_request(req, state)
                .await
                .map_err(IntoResponse::into_response)?;
            Ok(Self(body))
        }
    }
}

/// Append a message as the logged-in user (PUT /messages).
///
/// The session is checked before the body is parsed, so an anonymous caller
/// gets 403 whatever it sends.
pub async fn create_message(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    MessageBody(body): MessageBody,
) -> Result<Json<MessageResponse>, AppError> {
    let message = Message::new(&user, body.message);

    state.messages.create_message(&message).await?;

    tracing::info!(message_id = %message.id, user_id = %user.id, "Created message");

    Ok(Json(message_view(&message)))
}

/// Every message in store order (GET /messages). No session required.
pub async fn list_messages(
    State(state): State<AppState>,
) -> Result<Json<Vec<MessageResponse>>, AppError> {
    let messages = state.messages.list_messages().await?;

    Ok(Json(message_views(&messages)))
}
