use axum::{
    extract::{Path, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
};
use uuid::Uuid;

use crate::app_state::AppState;

/// `GET /readings/images/{id}`: photographs referenced by `imageRef`.
pub async fn get_image(State(app): State<AppState>, Path(id): Path<String>) -> Response {
    let Some(image) = Uuid::parse_str(&id).ok().and_then(|id| app.images().get(&id)) else {
        return (StatusCode::NOT_FOUND, "image not found").into_response();
    };
    (
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, image.mime),
            (header::CACHE_CONTROL, "private, max-age=86400"),
        ],
        image.bytes,
    )
        .into_response()
}
