//! Decoding of downloaded payloads by content type.

use std::io::Cursor;

use image::{ImageFormat, ImageReader};
use serde_json::Value;
use tracing::debug;

/// A downloaded object, decoded according to its `Content-Type`.
#[derive(Debug, Clone, PartialEq)]
pub enum Content {
    /// Raw image bytes whose header the `image` crate understood.
    Image {
        format: ImageFormat,
        width: u32,
        height: u32,
        bytes: Vec<u8>,
    },
    Json(Value),
    Text(String),
    /// Anything that could not be decoded, kept as-is.
    Unsupported {
        content_type: Option<String>,
        bytes: Vec<u8>,
    },
}

impl Content {
    /// Decode `bytes` as announced by `content_type`.
    ///
    /// Never fails: unknown types and malformed bodies end up in
    /// [`Content::Unsupported`].
    pub fn decode(content_type: Option<&str>, bytes: Vec<u8>) -> Self {
        let essence = content_type.map(essence);
        match essence.as_deref() {
            Some(t) if t.starts_with("image/") => decode_image(content_type, bytes),
            Some("application/json") => match serde_json::from_slice(&bytes) {
                Ok(value) => Content::Json(value),
                Err(e) => {
                    debug!("body is not valid JSON: {}", e);
                    unsupported(content_type, bytes)
                }
            },
            Some("text/plain") => match String::from_utf8(bytes) {
                Ok(text) => Content::Text(text),
                Err(e) => unsupported(content_type, e.into_bytes()),
            },
            _ => unsupported(content_type, bytes),
        }
    }

    /// The undecoded bytes, when decoding was not possible.
    pub fn raw_bytes(&self) -> Option<&[u8]> {
        match self {
            Content::Image { bytes, .. } | Content::Unsupported { bytes, .. } => Some(bytes),
            _ => None,
        }
    }
}

/// `text/plain; charset=utf-8` -> `text/plain`
fn essence(content_type: &str) -> String {
    content_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase()
}

fn unsupported(content_type: Option<&str>, bytes: Vec<u8>) -> Content {
    Content::Unsupported {
        content_type: content_type.map(str::to_string),
        bytes,
    }
}

fn decode_image(content_type: Option<&str>, bytes: Vec<u8>) -> Content {
    let header = ImageReader::new(Cursor::new(bytes.as_slice()))
        .with_guessed_format()
        .ok()
        .and_then(|reader| {
            let format = reader.format()?;
            let (width, height) = reader.into_dimensions().ok()?;
            Some((format, width, height))
        });

    match header {
        Some((format, width, height)) => Content::Image {
            format,
            width,
            height,
            bytes,
        },
        None => {
            debug!("image header not recognised");
            unsupported(content_type, bytes)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{DynamicImage, RgbImage};
    use serde_json::json;

    fn png(width: u32, height: u32) -> Vec<u8> {
        let mut buf = Vec::new();
        DynamicImage::ImageRgb8(RgbImage::new(width, height))
            .write_to(&mut Cursor::new(&mut buf), ImageFormat::Png)
            .unwrap();
        buf
    }

    #[test]
    fn test_essence_strips_parameters() {
        assert_eq!(essence("Text/Plain; charset=UTF-8"), "text/plain");
        assert_eq!(essence("application/json"), "application/json");
    }

    #[test]
    fn test_decode_json() {
        let content = Content::decode(Some("application/json"), br#"{"a": 1}"#.to_vec());
        assert_eq!(content, Content::Json(json!({"a": 1})));
    }

    #[test]
    fn test_malformed_json_is_unsupported() {
        let content = Content::decode(Some("application/json"), b"{not json".to_vec());
        assert_eq!(content.raw_bytes(), Some(&b"{not json"[..]));
        assert!(matches!(content, Content::Unsupported { .. }));
    }

    #[test]
    fn test_decode_text_with_charset() {
        let content = Content::decode(Some("text/plain; charset=utf-8"), b"hi".to_vec());
        assert_eq!(content, Content::Text("hi".to_string()));
    }

    #[test]
    fn test_invalid_utf8_text_keeps_bytes() {
        let content = Content::decode(Some("text/plain"), vec![0xff, 0xfe]);
        assert_eq!(
            content,
            Content::Unsupported {
                content_type: Some("text/plain".to_string()),
                bytes: vec![0xff, 0xfe],
            }
        );
    }

    #[test]
    fn test_decode_png() {
        let bytes = png(3, 2);
        match Content::decode(Some("image/png"), bytes.clone()) {
            Content::Image {
                format,
                width,
                height,
                bytes: raw,
            } => {
                assert_eq!(format, ImageFormat::Png);
                assert_eq!((width, height), (3, 2));
                assert_eq!(raw, bytes);
            }
            other => panic!("expected image, got {:?}", other),
        }
    }

    #[test]
    fn test_garbage_image_is_unsupported() {
        let content = Content::decode(Some("image/jpeg"), b"nope".to_vec());
        assert!(matches!(content, Content::Unsupported { .. }));
    }

    #[test]
    fn test_missing_content_type() {
        let content = Content::decode(None, b"x".to_vec());
        assert_eq!(
            content,
            Content::Unsupported {
                content_type: None,
                bytes: b"x".to_vec(),
            }
        );
    }
}
