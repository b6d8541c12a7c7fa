//! JSON and RON (de)serialization of documents and reports.
use std::fs::File;
use std::io::{Read, Write};
use std::path::Path;

use ron::ser::PrettyConfig;
use serde::{Serialize, de::DeserializeOwned};
use thiserror::Error;

use crate::net::document::Element;

#[derive(Debug, Error)]
pub enum IoError {
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("ron error: {0}")]
    Ron(#[from] ron::Error),
    #[error("ron error: {0}")]
    RonSpanned(#[from] ron::error::SpannedError),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl IoError {
    /// The input could be read but not decoded.
    pub fn is_decode(&self) -> bool {
        !matches!(self, IoError::Io(_))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    Json,
    Ron,
}

impl Format {
    /// `.ron` files are RON, everything else is read as JSON.
    pub fn from_path<P: AsRef<Path>>(path: P) -> Self {
        match path.as_ref().extension().and_then(|ext| ext.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("ron") => Format::Ron,
            _ => Format::Json,
        }
    }
}

pub fn to_json_string<T>(value: &T) -> Result<String, IoError>
where
    T: Serialize,
{
    Ok(serde_json::to_string_pretty(value)?)
}

pub fn from_json_str<T>(s: &str) -> Result<T, IoError>
where
    T: DeserializeOwned,
{
    Ok(serde_json::from_str(s)?)
}

pub fn write_json<P: AsRef<Path>, T: Serialize>(path: P, value: &T) -> Result<(), IoError> {
    let mut file = File::create(path)?;
    let content = to_json_string(value)?;
    file.write_all(content.as_bytes())?;
    Ok(())
}

pub fn to_ron_string<T>(value: &T) -> Result<String, IoError>
where
    T: Serialize,
{
    let mut pretty = PrettyConfig::default();
    pretty.new_line = "\n".into();
    Ok(ron::ser::to_string_pretty(value, pretty)?)
}

pub fn from_ron_str<T>(s: &str) -> Result<T, IoError>
where
    T: DeserializeOwned,
{
    Ok(ron::from_str(s)?)
}

fn read_to_string<P: AsRef<Path>>(path: P) -> Result<String, IoError> {
    let mut file = File::open(path)?;
    let mut content = String::new();
    file.read_to_string(&mut content)?;
    Ok(content)
}

pub fn parse_document(content: &str, format: Format) -> Result<Element, IoError> {
    match format {
        Format::Json => from_json_str(content),
        Format::Ron => from_ron_str(content),
    }
}

/// Reads a document tree, choosing the format from the file extension.
pub fn read_document<P: AsRef<Path>>(path: P) -> Result<Element, IoError> {
    let format = Format::from_path(&path);
    let content = read_to_string(&path)?;
    parse_document(&content, format)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn json_document_with_defaults() {
        let json = r#"{
            "tag": "pnml",
            "children": [
                { "tag": "net", "attributes": { "id": "n" }, "children": [
                    { "tag": "place", "attributes": { "id": "p1" } }
                ] }
            ]
        }"#;
        let doc = parse_document(json, Format::Json).unwrap();
        assert_eq!(doc.children[0].children[0].attributes["id"], "p1");
        assert!(doc.text.is_none());
    }

    #[test]
    fn ron_round_trip_of_a_document() {
        let doc = Element::new("net")
            .with_attr("id", "n")
            .with_child(Element::new("transition").with_attr("id", "t1"));
        let text = to_ron_string(&doc).unwrap();
        assert_eq!(parse_document(&text, Format::Ron).unwrap(), doc);
    }

    #[test]
    fn malformed_input_is_a_decode_error() {
        let err = parse_document("{ not json", Format::Json).unwrap_err();
        assert!(err.is_decode());
    }

    #[test]
    fn format_from_extension() {
        assert_eq!(Format::from_path("nets/a.RON"), Format::Ron);
        assert_eq!(Format::from_path("nets/a.json"), Format::Json);
        assert_eq!(Format::from_path("nets/a"), Format::Json);
    }
}
