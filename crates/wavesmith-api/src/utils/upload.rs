//! Multipart parsing for audio uploads

use crate::error::HttpAppError;
use axum::extract::Multipart;
use bytes::Bytes;
use std::collections::HashMap;
use wavesmith_core::constants::AUDIO_FIELD_NAME;
use wavesmith_core::AppError;

/// One uploaded file, held in memory until it is persisted for the tool.
#[derive(Debug, Clone)]
pub struct UploadedAudio {
    pub data: Bytes,
    pub filename: String,
    pub content_type: String,
}

impl UploadedAudio {
    pub fn size(&self) -> usize {
        self.data.len()
    }
}

/// Files under the audio field, in upload order, plus every text field.
#[derive(Debug, Default)]
pub struct AudioForm {
    pub files: Vec<UploadedAudio>,
    pub fields: HashMap<String, String>,
}

impl AudioForm {
    /// The single file of a one-input operation.
    pub fn single_file(&self) -> Result<&UploadedAudio, AppError> {
        match self.files.as_slice() {
            [] => Err(AppError::InvalidInput("No audio file provided".to_string())),
            [file] => {
                reject_empty(file)?;
                Ok(file)
            }
            files => Err(AppError::InvalidInput(format!(
                "Exactly one audio file expected, got {}",
                files.len()
            ))),
        }
    }

    /// All files of a merge; at least two are required.
    pub fn at_least_two(&self) -> Result<&[UploadedAudio], AppError> {
        if self.files.len() < 2 {
            return Err(AppError::InvalidInput(
                "At least two audio files required for merging".to_string(),
            ));
        }
        for file in &self.files {
            reject_empty(file)?;
        }
        Ok(&self.files)
    }

    /// Optional text field; blank values count as absent.
    pub fn text(&self, name: &str) -> Option<&str> {
        self.fields
            .get(name)
            .map(|v| v.trim())
            .filter(|v| !v.is_empty())
    }

    /// Optional numeric field; blank values count as absent.
    pub fn number(&self, name: &str) -> Result<Option<f64>, AppError> {
        let Some(raw) = self.text(name) else {
            return Ok(None);
        };
        raw.parse::<f64>()
            .ok()
            .filter(|v| v.is_finite())
            .map(Some)
            .ok_or_else(|| AppError::InvalidInput(format!("'{}' must be a number", name)))
    }
}

fn reject_empty(file: &UploadedAudio) -> Result<(), AppError> {
    if file.size() == 0 {
        return Err(AppError::InvalidInput(format!(
            "Uploaded file '{}' is empty",
            file.filename
        )));
    }
    Ok(())
}

/// Read the whole multipart body.
///
/// Fields named `audioFile` are collected as files in the order they arrive. Other
/// file parts are ignored; other text parts become parameters.
pub async fn read_audio_form(mut multipart: Multipart) -> Result<AudioForm, HttpAppError> {
    let mut form = AudioForm::default();

    while let Some(field) = multipart.next_field().await? {
        let field_name = field.name().map(|s| s.to_string()).unwrap_or_default();

        if field_name == AUDIO_FIELD_NAME {
            let filename = field
                .file_name()
                .map(|s| s.to_string())
                .unwrap_or_else(|| "unknown".to_string());
            let content_type = field
                .content_type()
                .map(|s| s.to_string())
                .unwrap_or_else(|| "application/octet-stream".to_string());
            let upload = UploadedAudio {
                data: field.bytes().await?,
                filename,
                content_type,
            };

            tracing::debug!(
                filename = %upload.filename,
                content_type = %upload.content_type,
                size = upload.size(),
                "Received audio file"
            );
            form.files.push(upload);
        } else if field.file_name().is_some() {
            tracing::debug!(field = %field_name, "Ignoring unexpected file field");
        } else {
            let value = field.text().await?;
            form.fields.insert(field_name, value);
        }
    }

    Ok(form)
}
