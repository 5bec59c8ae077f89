//! Test fixtures

use axum_test::multipart::{MultipartForm, Part};

/// What the fake tool writes as its output.
pub const OUTPUT_BYTES: &[u8] = b"RIFF\x24\x00\x00\x00WAVEprocessed";

/// Minimal 8 kHz mono 16-bit WAV with `samples` silent samples.
pub fn create_minimal_wav(samples: u32) -> Vec<u8> {
    let data_len = samples * 2;
    let mut wav = Vec::with_capacity(44 + data_len as usize);
    wav.extend_from_slice(b"RIFF");
    wav.extend_from_slice(&(36 + data_len).to_le_bytes());
    wav.extend_from_slice(b"WAVE");
    wav.extend_from_slice(b"fmt ");
    wav.extend_from_slice(&16u32.to_le_bytes());
    wav.extend_from_slice(&1u16.to_le_bytes()); // PCM
    wav.extend_from_slice(&1u16.to_le_bytes()); // mono
    wav.extend_from_slice(&8000u32.to_le_bytes());
    wav.extend_from_slice(&16000u32.to_le_bytes());
    wav.extend_from_slice(&2u16.to_le_bytes());
    wav.extend_from_slice(&16u16.to_le_bytes());
    wav.extend_from_slice(b"data");
    wav.extend_from_slice(&data_len.to_le_bytes());
    wav.resize(44 + data_len as usize, 0);
    wav
}

pub fn wav_part(name: &str) -> Part {
    Part::bytes(bytes::Bytes::from(create_minimal_wav(16)))
        .file_name(name.to_string())
        .mime_type("audio/wav")
}

/// Form with one `audioFile` part.
pub fn single_wav_form() -> MultipartForm {
    MultipartForm::new().add_part("audioFile", wav_part("clip.wav"))
}

/// Form with `count` `audioFile` parts named `part-0.wav`, `part-1.wav`, ...
pub fn multi_wav_form(count: usize) -> MultipartForm {
    (0..count).fold(MultipartForm::new(), |form, i| {
        form.add_part("audioFile", wav_part(&format!("part-{}.wav", i)))
    })
}

/// A complete HTTP/1.1 request posting one `audioFile` part to `path`, for tests that
/// drive the socket directly.
pub fn raw_upload_request(path: &str) -> Vec<u8> {
    const BOUNDARY: &str = "wavesmith-test-boundary";

    let mut body = Vec::new();
    body.extend_from_slice(
        format!(
            "--{}\r\nContent-Disposition: form-data; name=\"audioFile\"; filename=\"clip.wav\"\r\nContent-Type: audio/wav\r\n\r\n",
            BOUNDARY
        )
        .as_bytes(),
    );
    body.extend_from_slice(&create_minimal_wav(16));
    body.extend_from_slice(format!("\r\n--{}--\r\n", BOUNDARY).as_bytes());

    let mut request = format!(
        "POST {} HTTP/1.1\r\nHost: localhost\r\nContent-Type: multipart/form-data; boundary={}\r\nContent-Length: {}\r\nConnection: close\r\n\r\n",
        path,
        BOUNDARY,
        body.len()
    )
    .into_bytes();
    request.extend_from_slice(&body);
    request
}
