#![doc = include_str!("../README.md")]
#![deny(unsafe_code)]
#![deny(clippy::all)]

use hard_xml::{XmlRead, XmlWrite};
use quick_xml::events::Event;
use thiserror::Error;

pub mod model_description;
pub mod ssd;
pub mod system_structure;

/// XML declaration prepended to every serialized document
pub const XML_DECLARATION: &str = r#"<?xml version="1.0" encoding="UTF-8"?>"#;

#[derive(Debug, Error)]
pub enum Error {
    #[error("Error parsing XML: {0}")]
    XmlParse(String),

    #[error("Error writing XML: {0}")]
    XmlWrite(String),

    #[error(transparent)]
    Format(#[from] quick_xml::Error),
}

/// Serialize a document, including the XML declaration.
///
/// With `pretty` set, the output is re-indented with four spaces per level.
pub fn serialize<T: XmlWrite>(value: &T, pretty: bool) -> Result<String, Error> {
    let xml = XmlWrite::to_string(value).map_err(|e| Error::XmlWrite(e.to_string()))?;
    let body = if pretty { indent(&xml)? } else { xml };
    Ok(format!("{XML_DECLARATION}\n{body}\n"))
}

pub fn deserialize<'a, T: XmlRead<'a>>(xml: &'a str) -> Result<T, Error> {
    T::from_str(xml).map_err(|e| Error::XmlParse(e.to_string()))
}

fn indent(xml: &str) -> Result<String, Error> {
    let mut reader = quick_xml::Reader::from_str(xml);
    reader.trim_text(true);
    let mut writer = quick_xml::Writer::new_with_indent(Vec::new(), b' ', 4);
    // An element without content is held back so that it can be written as `<tag/>`.
    let mut pending = None;
    loop {
        let event = reader.read_event()?;
        match (pending.take(), event) {
            (Some(start), Event::End(_)) => writer.write_event(Event::Empty(start))?,
            (held, event) => {
                if let Some(start) = held {
                    writer.write_event(Event::Start(start))?;
                }
                match event {
                    Event::Eof => break,
                    Event::Start(start) => pending = Some(start.into_owned()),
                    event => writer.write_event(event)?,
                }
            }
        }
    }
    String::from_utf8(writer.into_inner()).map_err(|e| Error::XmlWrite(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_indent() {
        let pretty = indent("<a><b x=\"1\"></b><c>text</c></a>").unwrap();
        assert_eq!(pretty, "<a>\n    <b x=\"1\"/>\n    <c>text</c>\n</a>");
    }
}
