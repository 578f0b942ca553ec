use axum::{
    body::Bytes,
    extract::{multipart::MultipartError, Multipart, Query, State},
    http::StatusCode,
    response::{Html, Redirect},
    Form,
};
use models::student::{parse_student_id, StudentInput};
use serde::Deserialize;
use tracing::info;

use crate::errors::ApiError;
use crate::state::AppState;
use crate::views::{self, Notices};

#[derive(Debug, Default, Deserialize)]
pub struct IndexQuery {
    #[serde(default)]
    pub added: bool,
    #[serde(default)]
    pub deleted: bool,
}

#[derive(Debug, Default, Deserialize)]
pub struct DisplayForm {
    #[serde(default)]
    pub display_id: String,
}

#[derive(Debug, Default, Deserialize)]
pub struct DeleteForm {
    #[serde(default)]
    pub delete_id: String,
}

/// Landing page: every student plus any notice carried by the redirect.
pub async fn index(State(state): State<AppState>, Query(q): Query<IndexQuery>) -> Html<String> {
    let students = state.registry.list().await;
    Html(views::index_page(&students, Notices { added: q.added, deleted: q.deleted }))
}

pub async fn all_students(State(state): State<AppState>) -> Html<String> {
    let students = state.registry.list().await;
    Html(views::all_students_page(&students))
}

fn form_error(err: MultipartError) -> ApiError {
    ApiError::new(err.status(), "Error parsing form data")
}

/// Multipart form: `name`, `cgpa`, `career_interest`, `image`.
pub async fn add_student(State(state): State<AppState>, mut multipart: Multipart) -> Result<Redirect, ApiError> {
    let mut input = StudentInput::default();
    let mut image: Option<Bytes> = None;

    while let Some(field) = multipart.next_field().await.map_err(form_error)? {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "name" => input.name = field.text().await.map_err(form_error)?,
            "cgpa" => input.cgpa = field.text().await.map_err(form_error)?,
            "career_interest" => input.career_interest = field.text().await.map_err(form_error)?,
            "image" => image = Some(field.bytes().await.map_err(form_error)?),
            _ => {}
        }
    }

    // Report a bad grade before a missing photo.
    input.validate()?;
    let image = image
        .filter(|bytes| !bytes.is_empty())
        .ok_or_else(|| ApiError::bad_request("Error uploading image"))?;
    if image.len() > state.max_upload_bytes {
        return Err(ApiError::new(StatusCode::PAYLOAD_TOO_LARGE, "Image exceeds the upload limit"));
    }

    let record = state.registry.add(input, &image).await?;
    info!(id = record.id, "student added");
    Ok(Redirect::to("/?added=true"))
}

pub async fn display_student(
    State(state): State<AppState>,
    Form(form): Form<DisplayForm>,
) -> Result<Html<String>, ApiError> {
    let id = parse_student_id(&form.display_id)?;
    let student = state.registry.get(id).await?;
    Ok(Html(views::student_details_page(&student)))
}

pub async fn delete_student(
    State(state): State<AppState>,
    Form(form): Form<DeleteForm>,
) -> Result<Redirect, ApiError> {
    let id = parse_student_id(&form.delete_id)?;
    state.registry.delete(id).await?;
    info!(id, "student deleted");
    Ok(Redirect::to("/?deleted=true"))
}
