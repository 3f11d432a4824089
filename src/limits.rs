use crate::errors::UploadError;
use axum::{body::Body, http::HeaderMap};
use bytes::{Bytes, BytesMut};
use futures::StreamExt;

pub fn content_length_ok(headers: &HeaderMap, max_bytes: usize) -> Result<(), UploadError> {
    if let Some(len) = headers
        .get(axum::http::header::CONTENT_LENGTH)
        .and_then(|v| v.to_str().ok())
        .and_then(|s| s.parse::<usize>().ok())
    {
        if len > max_bytes {
            return Err(UploadError::PayloadTooLarge);
        }
    }
    Ok(())
}

/// Collects the body chunk by chunk, bailing out as soon as the running
/// total passes `max_bytes`.
pub async fn read_body_limited(body: Body, max_bytes: usize) -> Result<Bytes, UploadError> {
    let mut stream = body.into_data_stream();
    let mut buf = BytesMut::new();
    while let Some(chunk) = stream.next().await {
        let chunk = chunk.map_err(|e| {
            tracing::debug!(error = %e, "request body aborted");
            UploadError::InvalidRequest
        })?;
        if buf.len() + chunk.len() > max_bytes {
            return Err(UploadError::PayloadTooLarge);
        }
        buf.extend_from_slice(&chunk);
    }
    Ok(buf.freeze())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chunked(chunks: usize, size: usize) -> Body {
        let parts = (0..chunks).map(move |_| Ok::<_, std::io::Error>(Bytes::from(vec![b'a'; size])));
        Body::from_stream(futures::stream::iter(parts))
    }

    #[tokio::test]
    async fn under_limit_is_collected() {
        let out = read_body_limited(chunked(4, 256), 1024).await.unwrap();
        assert_eq!(out.len(), 1024);
    }

    #[tokio::test]
    async fn over_limit_is_rejected_mid_stream() {
        let err = read_body_limited(chunked(5, 256), 1024).await.unwrap_err();
        assert!(matches!(err, UploadError::PayloadTooLarge));
    }

    #[tokio::test]
    async fn stream_error_is_invalid_request() {
        let parts = vec![
            Ok(Bytes::from_static(b"{\"area\":")),
            Err(std::io::Error::new(std::io::ErrorKind::ConnectionReset, "gone")),
        ];
        let body = Body::from_stream(futures::stream::iter(parts));
        let err = read_body_limited(body, 1024).await.unwrap_err();
        assert!(matches!(err, UploadError::InvalidRequest));
    }

    #[test]
    fn declared_length_checked() {
        let mut h = HeaderMap::new();
        h.insert(axum::http::header::CONTENT_LENGTH, "2048".parse().unwrap());
        assert!(content_length_ok(&h, 4096).is_ok());
        assert!(matches!(content_length_ok(&h, 1024), Err(UploadError::PayloadTooLarge)));
        assert!(content_length_ok(&HeaderMap::new(), 1).is_ok());
    }
}
