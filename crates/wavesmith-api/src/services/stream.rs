//! Streams a produced file to the client, then removes the request's temp files.

use crate::error::HttpAppError;
use axum::{
    body::Body,
    http::{header, StatusCode},
    response::Response,
};
use bytes::Bytes;
use futures::{stream, StreamExt};
use std::path::PathBuf;
use tokio_util::io::ReaderStream;
use wavesmith_core::constants::OUTPUT_CONTENT_TYPE;
use wavesmith_core::AppError;
use wavesmith_processing::RequestFiles;

/// Build a download response for `output`.
///
/// A body polled past its last chunk runs cleanup inline. With `Content-Length` set, hyper
/// stops polling after the last byte and drops the body instead, as it does when the client
/// disconnects; `RequestFiles` then schedules removal on the runtime from `Drop`.
pub async fn stream_output(files: RequestFiles, output: PathBuf) -> Result<Response, HttpAppError> {
    let file = match tokio::fs::File::open(&output).await {
        Ok(file) => file,
        Err(e) => {
            files.cleanup().await;
            return Err(AppError::Io(format!("Failed to open output file: {}", e)).into());
        }
    };
    let length = file.metadata().await.ok().map(|m| m.len());

    let filename = output
        .file_name()
        .and_then(|name| name.to_str())
        .unwrap_or("output.wav")
        .to_string();

    let cleanup = stream::once(async move {
        files.cleanup().await;
    })
    .filter_map(|()| async { None::<Result<Bytes, std::io::Error>> });
    let body_stream = ReaderStream::new(file).chain(cleanup);

    let mut builder = Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, OUTPUT_CONTENT_TYPE)
        .header(
            header::CONTENT_DISPOSITION,
            format!("attachment; filename=\"{}\"", filename),
        );
    if let Some(length) = length {
        builder = builder.header(header::CONTENT_LENGTH, length);
    }

    builder
        .body(Body::from_stream(body_stream))
        .map_err(|e| HttpAppError(AppError::Internal(format!("Failed to build response: {}", e))))
}
