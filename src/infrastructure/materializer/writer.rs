//! Hadoop-style configuration XML

use std::borrow::Cow;
use std::io::Write;

use quick_xml::escape::escape;
use quick_xml::events::{BytesDecl, BytesEnd, BytesPI, BytesStart, BytesText, Event};
use quick_xml::Writer;

use crate::domain::{ConfigurationResource, DomainError};

const STYLESHEET: &str = r#"xml-stylesheet type="text/xsl" href="configuration.xsl""#;
const XINCLUDE_NS: &str = "http://www.w3.org/2001/XInclude";

fn write_failed(err: impl std::fmt::Display) -> DomainError {
    DomainError::configuration(format!("Failed to write configuration XML: {}", err))
}

fn newline<W: Write>(writer: &mut Writer<W>) -> Result<(), DomainError> {
    writer
        .write_event(Event::Text(BytesText::from_escaped("\n")))
        .map_err(write_failed)
}

fn is_xml_char(c: char) -> bool {
    matches!(
        c,
        '\t' | '\n' | '\r' | '\u{20}'..='\u{D7FF}' | '\u{E000}'..='\u{FFFD}' | '\u{10000}'..
    )
}

/// Escape element text, keeping carriage returns as character references
fn escape_text<'a>(tag: &str, text: &'a str) -> Result<Cow<'a, str>, DomainError> {
    if let Some(c) = text.chars().find(|c| !is_xml_char(*c)) {
        return Err(DomainError::configuration(format!(
            "Character U+{:04X} cannot be written in a configuration <{}>",
            c as u32, tag
        )));
    }

    let escaped = escape(text);
    if escaped.contains('\r') {
        Ok(Cow::Owned(escaped.replace('\r', "&#13;")))
    } else {
        Ok(escaped)
    }
}

fn text_element<W: Write>(
    writer: &mut Writer<W>,
    tag: &str,
    text: &str,
) -> Result<(), DomainError> {
    let escaped = escape_text(tag, text)?;

    writer
        .write_event(Event::Start(BytesStart::new(tag)))
        .map_err(write_failed)?;
    if !escaped.is_empty() {
        writer
            .write_event(Event::Text(BytesText::from_escaped(escaped)))
            .map_err(write_failed)?;
    }
    writer
        .write_event(Event::End(BytesEnd::new(tag)))
        .map_err(write_failed)
}

/// Serialize one resource snapshot as a `<configuration>` document
///
/// Each property becomes `<property><name>..</name><value>..</value></property>`
/// on its own line. Characters XML 1.0 cannot carry are rejected and
/// carriage returns are written as `&#13;` so parsers keep them.
pub fn write_configuration<W: Write>(
    out: W,
    resource: &ConfigurationResource,
) -> Result<(), DomainError> {
    let mut writer = Writer::new(out);

    writer
        .write_event(Event::Decl(BytesDecl::new("1.0", None, None)))
        .map_err(write_failed)?;
    newline(&mut writer)?;
    writer
        .write_event(Event::PI(BytesPI::new(STYLESHEET)))
        .map_err(write_failed)?;
    newline(&mut writer)?;

    let root = BytesStart::new("configuration").with_attributes([("xmlns:xi", XINCLUDE_NS)]);
    writer
        .write_event(Event::Start(root))
        .map_err(write_failed)?;
    newline(&mut writer)?;

    for (key, value) in resource.properties() {
        writer
            .write_event(Event::Start(BytesStart::new("property")))
            .map_err(write_failed)?;
        text_element(&mut writer, "name", key)?;
        text_element(&mut writer, "value", value)?;
        writer
            .write_event(Event::End(BytesEnd::new("property")))
            .map_err(write_failed)?;
        newline(&mut writer)?;
    }

    writer
        .write_event(Event::End(BytesEnd::new("configuration")))
        .map_err(write_failed)?;
    newline(&mut writer)?;

    writer.into_inner().flush().map_err(write_failed)
}

/// Read `<name>`/`<value>` pairs back out of a configuration document
#[cfg(test)]
pub(crate) fn read_properties(xml: &str) -> Vec<(String, String)> {
    use quick_xml::Reader;

    let mut reader = Reader::from_str(xml);
    let mut properties = Vec::new();
    let mut current: Option<String> = None;
    let mut name = String::new();

    loop {
        match reader.read_event().unwrap() {
            Event::Start(e) => {
                if matches!(e.name().as_ref(), b"name" | b"value") {
                    current = Some(String::new());
                }
            }
            Event::Text(t) => {
                if let Some(buf) = current.as_mut() {
                    buf.push_str(&t.unescape().unwrap());
                }
            }
            Event::End(e) => match e.name().as_ref() {
                b"name" => name = current.take().unwrap_or_default(),
                b"value" => {
                    let value = current.take().unwrap_or_default();
                    properties.push((std::mem::take(&mut name), value));
                }
                _ => {}
            },
            Event::Eof => break,
            _ => {}
        }
    }

    properties
}
