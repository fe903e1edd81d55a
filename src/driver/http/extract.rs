//! Form Submission Extractor
//!
//! リクエスト本文を `FormData` に変換する
//!
//! 対応する形式:
//!
//! - `multipart/form-data`（ファイルを含む）
//! - `application/x-www-form-urlencoded`
//! - `application/json`（フラットなオブジェクト。配列は同名フィールドの繰り返しになる）

use axum::extract::{FromRequest, Multipart, Request};
use axum::http::header::CONTENT_TYPE;
use axum::{Form, Json};
use serde_json::{Map, Value};

use super::error::ApiError;
use crate::application::dto::form_data::FormData;
use crate::domain::entities::upload::UploadedFile;

/// フォーム送信として解釈したリクエスト本文
#[derive(Debug)]
pub struct FormSubmission(pub FormData);

impl<S> FromRequest<S> for FormSubmission
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let content_type = req
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default()
            .to_ascii_lowercase();

        let form = if content_type.starts_with("multipart/form-data") {
            let multipart = Multipart::from_request(req, state)
                .await
                .map_err(|e| ApiError::rejected(e.status(), e.body_text()))?;
            read_multipart(multipart).await?
        } else if content_type.starts_with("application/json") {
            let Json(object) = Json::<Map<String, Value>>::from_request(req, state)
                .await
                .map_err(|e| ApiError::rejected(e.status(), e.body_text()))?;
            form_from_json(object)
        } else {
            let Form(pairs) = Form::<Vec<(String, String)>>::from_request(req, state)
                .await
                .map_err(|e| ApiError::rejected(e.status(), e.body_text()))?;
            pairs.into_iter().collect()
        };

        Ok(Self(form))
    }
}

async fn read_multipart(mut multipart: Multipart) -> Result<FormData, ApiError> {
    let mut form = FormData::new();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::rejected(e.status(), e.body_text()))?
    {
        let Some(name) = field.name().map(str::to_string) else {
            continue;
        };

        match field.file_name().map(str::to_string) {
            Some(file_name) => {
                let content_type = field
                    .content_type()
                    .unwrap_or("application/octet-stream")
                    .to_string();
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|e| ApiError::rejected(e.status(), e.body_text()))?;

                // 未選択のファイル入力
                if file_name.is_empty() && bytes.is_empty() {
                    continue;
                }
                form.append_file(name, UploadedFile::new(file_name, content_type, bytes.to_vec()));
            }
            None => {
                let text = field
                    .text()
                    .await
                    .map_err(|e| ApiError::rejected(e.status(), e.body_text()))?;
                form.append(name, text);
            }
        }
    }

    Ok(form)
}

/// JSONオブジェクトをフォームのフィールドに展開する
///
/// `null` は送られなかったものとして扱う
pub fn form_from_json(object: Map<String, Value>) -> FormData {
    let mut form = FormData::new();

    for (name, value) in object {
        match value {
            Value::Null => {}
            Value::Array(values) => {
                for value in values {
                    if let Some(text) = json_text(value) {
                        form.append(name.clone(), text);
                    }
                }
            }
            value => {
                if let Some(text) = json_text(value) {
                    form.append(name, text);
                }
            }
        }
    }

    form
}

fn json_text(value: Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(s),
        other => Some(other.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::StatusCode;
    use serde_json::json;

    async fn extract(content_type: &str, body: impl Into<Body>) -> Result<FormData, ApiError> {
        let request = Request::builder()
            .method("POST")
            .uri("/")
            .header(CONTENT_TYPE, content_type)
            .body(body.into())
            .unwrap();

        FormSubmission::from_request(request, &()).await.map(|f| f.0)
    }

    #[test]
    fn test_form_from_json() {
        let form = form_from_json(
            json!({
                "title": "Juara 1",
                "members": ["m1", "m2"],
                "order_index": 3,
                "is_active": true,
                "bio": null
            })
            .as_object()
            .unwrap()
            .clone(),
        );

        assert_eq!(form.get("title"), Some("Juara 1"));
        assert_eq!(form.get_all("members"), vec!["m1", "m2"]);
        assert_eq!(form.get("order_index"), Some("3"));
        assert_eq!(form.get("is_active"), Some("true"));
        assert_eq!(form.get("bio"), None);
    }

    #[tokio::test]
    async fn test_urlencoded_body() {
        let form = extract(
            "application/x-www-form-urlencoded",
            "name=Tim+Riset&members=a&members=b",
        )
        .await
        .unwrap();

        assert_eq!(form.get("name"), Some("Tim Riset"));
        assert_eq!(form.get_all("members"), vec!["a", "b"]);
    }

    #[tokio::test]
    async fn test_json_body() {
        let form = extract("application/json", r#"{"name":"Humas"}"#)
            .await
            .unwrap();
        assert_eq!(form.get("name"), Some("Humas"));
    }

    #[tokio::test]
    async fn test_malformed_json_is_rejected() {
        let result = extract("application/json", "{not json").await;
        match result {
            Err(ApiError::MalformedRequest { status, .. }) => {
                assert_eq!(status, StatusCode::BAD_REQUEST)
            }
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_multipart_body_with_file() {
        let body = concat!(
            "--XBOUNDARY\r\n",
            "Content-Disposition: form-data; name=\"name\"\r\n\r\n",
            "Budi\r\n",
            "--XBOUNDARY\r\n",
            "Content-Disposition: form-data; name=\"photo_url\"; filename=\"budi.png\"\r\n",
            "Content-Type: image/png\r\n\r\n",
            "PNGDATA\r\n",
            "--XBOUNDARY\r\n",
            "Content-Disposition: form-data; name=\"cv\"; filename=\"\"\r\n",
            "Content-Type: application/octet-stream\r\n\r\n",
            "\r\n",
            "--XBOUNDARY--\r\n",
        );

        let form = extract("multipart/form-data; boundary=XBOUNDARY", body)
            .await
            .unwrap();

        assert_eq!(form.get("name"), Some("Budi"));
        let photo = form.file("photo_url").unwrap();
        assert_eq!(photo.file_name, "budi.png");
        assert_eq!(photo.content_type, "image/png");
        assert_eq!(photo.bytes, b"PNGDATA");
        assert!(form.file("cv").is_none());
    }
}
