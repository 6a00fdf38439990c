use axum::{
    extract::{Multipart, State},
    Json,
};
use tracing::info;

use crate::errors::AppError;
use crate::matching::document::TextDocument;
use crate::state::AppState;

/// POST /api/v1/documents/extract
///
/// Extracts the text of the uploaded `file` field and reports its language.
pub async fn handle_extract_document(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<TextDocument>, AppError> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::Validation(format!("Invalid multipart body: {e}")))?
    {
        if field.name() != Some("file") {
            continue;
        }
        let file_name = field.file_name().unwrap_or("document.pdf").to_string();
        let data = field
            .bytes()
            .await
            .map_err(|e| AppError::Validation(format!("Invalid file: {e}")))?;

        let document = state.extractor.extract(data).await?;
        info!(%file_name, language = %document.language(), "Document extracted");
        return Ok(Json(document));
    }

    Err(AppError::Validation("No file provided".to_string()))
}
