use crate::error::{Error, WebErrorKind};
use axum::{
    async_trait,
    extract::{multipart::MultipartError, FromRequest, Multipart, Request},
    http::StatusCode,
};
use domain::language::Language;
use domain::meeting::{AudioUpload, NewMeeting};
use domain::Id;
use log::*;

/// The multipart body of `POST /meetings`: one `file` part plus optional text fields.
#[derive(Debug)]
pub(crate) struct MeetingUpload {
    pub new_meeting: NewMeeting,
    pub audio: AudioUpload,
}

#[async_trait]
impl<S> FromRequest<S> for MeetingUpload
where
    S: Send + Sync,
{
    type Rejection = Error;

    async fn from_request(request: Request, state: &S) -> Result<Self, Self::Rejection> {
        let mut multipart = Multipart::from_request(request, state)
            .await
            .map_err(|rejection| Error::bad_request(rejection.body_text()))?;

        let mut new_meeting = NewMeeting::default();
        let mut audio = None;

        while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
            let name = field.name().unwrap_or_default().to_owned();
            if name == "file" {
                let filename = field.file_name().unwrap_or_default().to_owned();
                let bytes = field.bytes().await.map_err(multipart_error)?;
                audio = Some(AudioUpload {
                    filename,
                    bytes: bytes.to_vec(),
                });
                continue;
            }

            let value = field.text().await.map_err(multipart_error)?;
            let value = value.trim();
            if value.is_empty() {
                continue;
            }
            match name.as_str() {
                "title" => new_meeting.title = Some(value.to_owned()),
                "description" => new_meeting.description = Some(value.to_owned()),
                "ai_instructions" => new_meeting.ai_instructions = Some(value.to_owned()),
                "language" => new_meeting.language = Some(parse_language(value)?),
                "project_id" => {
                    new_meeting.project_id = Some(
                        value
                            .parse::<Id>()
                            .map_err(|_| Error::bad_request("Invalid project_id"))?,
                    )
                }
                other => debug!("Ignoring unknown upload field {other:?}"),
            }
        }

        let audio = audio.ok_or_else(|| Error::bad_request("Missing file part"))?;
        Ok(MeetingUpload { new_meeting, audio })
    }
}

fn parse_language(value: &str) -> Result<Language, Error> {
    serde_json::from_value(serde_json::Value::String(value.to_lowercase()))
        .map_err(|_| Error::bad_request(format!("Unsupported language: {value}")))
}

fn multipart_error(err: MultipartError) -> Error {
    if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
        warn!("Upload exceeded the request body limit");
        return Error::Web(WebErrorKind::PayloadTooLarge);
    }
    Error::bad_request(err.body_text())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;

    const BOUNDARY: &str = "meeting-upload-boundary";

    fn multipart_request(parts: &[(&str, Option<&str>, &str)]) -> Request {
        let mut body = String::new();
        for (name, filename, content) in parts {
            body.push_str(&format!("--{BOUNDARY}\r\n"));
            match filename {
                Some(filename) => body.push_str(&format!(
                    "Content-Disposition: form-data; name=\"{name}\"; filename=\"{filename}\"\r\nContent-Type: audio/mpeg\r\n\r\n"
                )),
                None => body.push_str(&format!(
                    "Content-Disposition: form-data; name=\"{name}\"\r\n\r\n"
                )),
            }
            body.push_str(content);
            body.push_str("\r\n");
        }
        body.push_str(&format!("--{BOUNDARY}--\r\n"));

        axum::http::Request::builder()
            .method("POST")
            .uri("/meetings")
            .header(
                "content-type",
                format!("multipart/form-data; boundary={BOUNDARY}"),
            )
            .body(Body::from(body))
            .unwrap()
    }

    #[tokio::test]
    async fn collects_the_file_and_metadata() {
        let project_id = Id::new_v4();
        let project_id_text = project_id.to_string();
        let request = multipart_request(&[
            ("title", None, "Weekly sync"),
            ("language", None, "DE"),
            ("project_id", None, project_id_text.as_str()),
            ("description", None, "   "),
            ("file", Some("weekly.mp3"), "ID3audio"),
        ]);

        let upload = MeetingUpload::from_request(request, &()).await.unwrap();

        assert_eq!(upload.audio.filename, "weekly.mp3");
        assert_eq!(upload.audio.bytes, b"ID3audio");
        assert_eq!(upload.new_meeting.title.as_deref(), Some("Weekly sync"));
        assert_eq!(upload.new_meeting.language, Some(Language::De));
        assert_eq!(upload.new_meeting.project_id, Some(project_id));
        assert_eq!(upload.new_meeting.description, None);
    }

    #[tokio::test]
    async fn requires_a_file_part() {
        let request = multipart_request(&[("title", None, "No audio")]);

        let err = MeetingUpload::from_request(request, &()).await.unwrap_err();

        assert!(matches!(err, Error::Web(WebErrorKind::BadRequest(_))));
    }

    #[tokio::test]
    async fn rejects_unknown_languages() {
        let request = multipart_request(&[
            ("language", None, "klingon"),
            ("file", Some("a.mp3"), "ID3"),
        ]);

        let err = MeetingUpload::from_request(request, &()).await.unwrap_err();

        assert!(matches!(err, Error::Web(WebErrorKind::BadRequest(_))));
    }
}
