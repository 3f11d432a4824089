use crate::{
    errors::{UploadError, UploadResult},
    sanitize::sanitize,
    storage::ImageStore,
};
use base64::{
    alphabet,
    engine::{DecodePaddingMode, GeneralPurpose, GeneralPurposeConfig},
    Engine,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;

const JPEG_DATA_URI_PREFIX: &str = "data:image/jpeg;base64,";

/// Standard alphabet; browsers always pad, but unpadded payloads are accepted too.
const PAYLOAD_ENGINE: GeneralPurpose = GeneralPurpose::new(
    &alphabet::STANDARD,
    GeneralPurposeConfig::new().with_decode_padding_mode(DecodePaddingMode::Indifferent),
);

/// Raw request body. Fields stay untyped until `validate` so that absent,
/// null and falsy values all surface as `MissingFields`.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadRequest {
    pub area: Option<Value>,
    pub first_name: Option<Value>,
    pub last_name: Option<Value>,
    pub image_data: Option<Value>,
}

#[derive(Debug)]
pub struct ValidUpload {
    pub area: String,
    pub first_name: String,
    pub last_name: String,
    pub file_name: String,
    pub image: Vec<u8>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadReceipt {
    pub success: bool,
    pub file_name: String,
    #[serde(skip)]
    pub bytes_written: usize,
}

pub fn parse_request(body: &[u8]) -> UploadResult<UploadRequest> {
    let value: Value = serde_json::from_slice(body).map_err(|_| UploadError::InvalidRequest)?;
    if !value.is_object() {
        return Err(UploadError::InvalidRequest);
    }
    serde_json::from_value(value).map_err(|_| UploadError::InvalidRequest)
}

impl UploadRequest {
    pub fn validate(self) -> UploadResult<ValidUpload> {
        let (Some(area), Some(first), Some(last), Some(image_data)) = (
            present(self.area),
            present(self.first_name),
            present(self.last_name),
            present(self.image_data),
        ) else {
            return Err(UploadError::MissingFields);
        };

        let area = sanitize(&name_text(area)?);
        let first_name = sanitize(&name_text(first)?);
        let last_name = sanitize(&name_text(last)?);
        if area.is_empty() || first_name.is_empty() || last_name.is_empty() {
            return Err(UploadError::InvalidNameFields);
        }

        let Value::String(image_data) = image_data else {
            return Err(UploadError::InvalidRequest);
        };
        let image = jpeg_payload(&image_data)?;
        let file_name = file_name(&area, &first_name, &last_name);
        Ok(ValidUpload { area, first_name, last_name, file_name, image })
    }
}

/// Drops falsy values: absent, `null`, `false`, `0` and `""`.
fn present(value: Option<Value>) -> Option<Value> {
    match value? {
        Value::Null | Value::Bool(false) => None,
        Value::String(s) if s.is_empty() => None,
        Value::Number(n) if n.as_f64() == Some(0.0) => None,
        v => Some(v),
    }
}

/// Text form of a name field. Scalars are accepted, arrays and objects are not.
fn name_text(value: Value) -> UploadResult<String> {
    match value {
        Value::String(s) => Ok(s),
        Value::Number(n) => Ok(number_text(&n)),
        Value::Bool(b) => Ok(b.to_string()),
        Value::Null | Value::Array(_) | Value::Object(_) => Err(UploadError::InvalidRequest),
    }
}

/// Integral floats print without a fraction, so `1.0` and `1` name the same file.
fn number_text(n: &serde_json::Number) -> String {
    match n.as_f64() {
        Some(f) if n.is_f64() && f.fract() == 0.0 && f.abs() < 1e21 => format!("{f:.0}"),
        _ => n.to_string(),
    }
}

/// Strips the JPEG data URI prefix and decodes what follows. Only the shape
/// is checked; the bytes are never inspected as an image.
pub fn jpeg_payload(image_data: &str) -> UploadResult<Vec<u8>> {
    let payload = image_data
        .strip_prefix(JPEG_DATA_URI_PREFIX)
        .filter(|p| !p.is_empty())
        .ok_or(UploadError::InvalidImageFormat)?;
    PAYLOAD_ENGINE.decode(payload).map_err(|_| UploadError::InvalidImageFormat)
}

pub fn file_name(area: &str, first_name: &str, last_name: &str) -> String {
    format!("{area}_{first_name}_{last_name}.jpg")
}

pub async fn handle_upload(store: &ImageStore, body: &[u8]) -> UploadResult<UploadReceipt> {
    let upload = parse_request(body)?.validate()?;
    tracing::debug!(
        area = %upload.area,
        first_name = %upload.first_name,
        last_name = %upload.last_name,
        image_bytes = upload.image.len(),
        "upload validated"
    );
    store.save(&upload.file_name, &upload.image).await?;
    Ok(UploadReceipt {
        success: true,
        bytes_written: upload.image.len(),
        file_name: upload.file_name,
    })
}
