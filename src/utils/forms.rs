use actix_multipart::Multipart;
use actix_web::{web, HttpRequest};
use futures_util::{StreamExt, TryStreamExt};
use serde::Deserialize;

use crate::errors::AppError;
use crate::utils::uploads::UploadStore;

/// One employee payload, decoded from either a JSON body or a multipart form.
/// `None` means the field was absent; presence with an empty string is kept
/// so optional columns can be coerced to NULL by the caller.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct EmployeeForm {
    pub id: Option<String>,
    pub name: Option<String>,
    pub department: Option<String>,
    pub designation: Option<String>,
    pub project: Option<String>,
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub status: Option<String>,
    pub remove_image: Option<String>,
    /// Public path of a freshly stored image, set only on the multipart path.
    #[serde(skip)]
    pub image_path: Option<String>,
}

impl EmployeeForm {
    pub fn remove_image_requested(&self) -> bool {
        self.remove_image.as_deref().map_or(false, is_truthy)
    }
}

pub fn none_if_empty(value: String) -> Option<String> {
    if value.is_empty() {
        None
    } else {
        Some(value)
    }
}

fn is_truthy(value: &str) -> bool {
    matches!(
        value.to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}

fn is_multipart(req: &HttpRequest) -> bool {
    req.headers()
        .get(actix_web::http::header::CONTENT_TYPE)
        .and_then(|ct| ct.to_str().ok())
        .map_or(false, |ct| ct.starts_with("multipart/form-data"))
}

/// Reads the request body into an `EmployeeForm`. Multipart text fields are
/// collected by name and a single `image` file is streamed into `uploads`;
/// anything else falls back to a JSON body (empty bodies decode to defaults).
pub async fn read_employee_form(
    req: &HttpRequest,
    payload: web::Payload,
    uploads: &UploadStore,
) -> Result<EmployeeForm, AppError> {
    if is_multipart(req) {
        read_multipart_form(req, payload, uploads).await
    } else {
        read_json_form(payload).await
    }
}

async fn read_json_form(mut payload: web::Payload) -> Result<EmployeeForm, AppError> {
    let mut body = web::BytesMut::new();
    while let Some(chunk) = payload.next().await {
        let chunk =
            chunk.map_err(|err| AppError::BadRequest(format!("failed to read body: {}", err)))?;
        body.extend_from_slice(&chunk);
    }
    if body.is_empty() {
        return Ok(EmployeeForm::default());
    }
    serde_json::from_slice(&body)
        .map_err(|err| AppError::BadRequest(format!("invalid JSON body: {}", err)))
}

async fn read_multipart_form(
    req: &HttpRequest,
    payload: web::Payload,
    uploads: &UploadStore,
) -> Result<EmployeeForm, AppError> {
    let mut multipart = Multipart::new(req.headers(), payload);
    let mut form = EmployeeForm::default();

    while let Some(mut field) = multipart
        .try_next()
        .await
        .map_err(|err| AppError::BadRequest(format!("malformed multipart body: {}", err)))?
    {
        let name = field
            .content_disposition()
            .get_name()
            .unwrap_or_default()
            .to_owned();
        match name.as_str() {
            "image" => {
                // One image per request; extra files are drained and dropped.
                if form.image_path.is_none() {
                    form.image_path = Some(uploads.save_field(&mut field).await?);
                } else {
                    drain_field(&mut field).await?;
                }
            }
            "id" => form.id = Some(read_text_field(&mut field).await?),
            "name" => form.name = Some(read_text_field(&mut field).await?),
            "department" => form.department = Some(read_text_field(&mut field).await?),
            "designation" => form.designation = Some(read_text_field(&mut field).await?),
            "project" => form.project = Some(read_text_field(&mut field).await?),
            "type" => form.kind = Some(read_text_field(&mut field).await?),
            "status" => form.status = Some(read_text_field(&mut field).await?),
            "remove_image" => form.remove_image = Some(read_text_field(&mut field).await?),
            _ => drain_field(&mut field).await?,
        }
    }

    Ok(form)
}

async fn read_text_field(field: &mut actix_multipart::Field) -> Result<String, AppError> {
    let mut bytes = Vec::new();
    while let Some(chunk) = field
        .try_next()
        .await
        .map_err(|err| AppError::BadRequest(format!("malformed field: {}", err)))?
    {
        bytes.extend_from_slice(&chunk);
    }
    String::from_utf8(bytes)
        .map_err(|_| AppError::BadRequest("form fields must be UTF-8".to_string()))
}

async fn drain_field(field: &mut actix_multipart::Field) -> Result<(), AppError> {
    while field
        .try_next()
        .await
        .map_err(|err| AppError::BadRequest(format!("malformed field: {}", err)))?
        .is_some()
    {}
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_string_coerces_to_none() {
        assert_eq!(none_if_empty(String::new()), None);
        assert_eq!(none_if_empty("QA".to_string()), Some("QA".to_string()));
    }

    #[test]
    fn remove_image_accepts_common_truthy_spellings() {
        for value in ["1", "true", "TRUE", "yes", "on"] {
            let form = EmployeeForm {
                remove_image: Some(value.to_string()),
                ..Default::default()
            };
            assert!(form.remove_image_requested(), "{} should be truthy", value);
        }
        for value in ["0", "false", "", "no"] {
            let form = EmployeeForm {
                remove_image: Some(value.to_string()),
                ..Default::default()
            };
            assert!(!form.remove_image_requested(), "{} should be falsy", value);
        }
        assert!(!EmployeeForm::default().remove_image_requested());
    }

    #[test]
    fn json_form_maps_type_key_and_ignores_unknown_keys() {
        let form: EmployeeForm = serde_json::from_str(
            r#"{"id":"E1","name":"Ann","type":"Full-Time","badge_color":"green"}"#,
        )
        .unwrap();
        assert_eq!(form.id.as_deref(), Some("E1"));
        assert_eq!(form.kind.as_deref(), Some("Full-Time"));
        assert!(form.department.is_none());
    }
}
