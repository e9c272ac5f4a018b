// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! A forgiving XML element tree.
//!
//! Controller responses are only loosely XML: end tags may not match, bodies
//! may be cut short and entities may be undeclared. The tree keeps whatever
//! could be read instead of rejecting the document, and only fails when no
//! element at all was found.

use std::borrow::Cow;

use quick_xml::Reader;
use quick_xml::events::{BytesStart, Event};

use crate::error::ParseError;

/// One element of a response document.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct XmlElement {
    name: String,
    attributes: Vec<(String, String)>,
    text: String,
    children: Vec<XmlElement>,
}

impl XmlElement {
    /// Parses a response body into its root element.
    ///
    /// # Errors
    ///
    /// Returns `ParseError::UnexpectedFormat` if the body holds no element.
    ///
    /// # Examples
    ///
    /// ```
    /// use idrac_lib::response::XmlElement;
    ///
    /// let root = XmlElement::parse("<root><pwState>1</pwState></root>").unwrap();
    /// assert_eq!(root.child_text("pwState"), "1");
    /// assert_eq!(root.child_text("missing"), "");
    /// ```
    pub fn parse(body: &str) -> Result<Self, ParseError> {
        let mut reader = Reader::from_str(body);
        reader.config_mut().check_end_names = false;

        let mut stack: Vec<XmlElement> = Vec::new();
        let mut root: Option<XmlElement> = None;

        loop {
            match reader.read_event() {
                Ok(Event::Start(start)) => stack.push(Self::from_start(&start)),
                Ok(Event::Empty(start)) => attach(&mut stack, &mut root, Self::from_start(&start)),
                Ok(Event::End(_)) => {
                    if let Some(element) = stack.pop() {
                        attach(&mut stack, &mut root, element);
                    }
                }
                Ok(Event::Text(text)) => {
                    if let Some(top) = stack.last_mut() {
                        let decoded = text
                            .unescape()
                            .unwrap_or_else(|_| String::from_utf8_lossy(&text).into_owned().into());
                        top.text.push_str(&decoded);
                    }
                }
                Ok(Event::CData(data)) => {
                    if let Some(top) = stack.last_mut() {
                        top.text.push_str(&String::from_utf8_lossy(&data));
                    }
                }
                Ok(Event::Eof) => break,
                Ok(_) => {}
                Err(err) => {
                    tracing::debug!(
                        error = %err,
                        position = reader.buffer_position(),
                        "Malformed XML, keeping the elements read so far"
                    );
                    break;
                }
            }
        }

        // Close whatever the document left open.
        while let Some(element) = stack.pop() {
            attach(&mut stack, &mut root, element);
        }

        root.ok_or_else(|| ParseError::UnexpectedFormat("no XML element in response".to_string()))
    }

    fn from_start(start: &BytesStart<'_>) -> Self {
        let attributes = start
            .attributes()
            .filter_map(Result::ok)
            .map(|attr| {
                let key = lossy(attr.key.local_name().as_ref()).into_owned();
                let value = attr
                    .unescape_value()
                    .map_or_else(|_| lossy(&attr.value).into_owned(), Cow::into_owned);
                (key, value)
            })
            .collect();

        Self {
            name: lossy(start.local_name().as_ref()).into_owned(),
            attributes,
            text: String::new(),
            children: Vec::new(),
        }
    }

    /// Returns the element name without namespace prefix.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the element's own text, trimmed.
    ///
    /// Text interleaved with child elements is concatenated.
    #[must_use]
    pub fn text(&self) -> &str {
        self.text.trim()
    }

    /// Returns the child elements in document order.
    #[must_use]
    pub fn children(&self) -> &[XmlElement] {
        &self.children
    }

    /// Returns true if the element has child elements.
    #[must_use]
    pub fn has_children(&self) -> bool {
        !self.children.is_empty()
    }

    /// Returns an attribute value.
    #[must_use]
    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }

    /// Returns the first direct child with the given name.
    #[must_use]
    pub fn child(&self, name: &str) -> Option<&XmlElement> {
        self.children.iter().find(|c| c.name == name)
    }

    /// Returns the trimmed text of a direct child, or `""` when absent.
    #[must_use]
    pub fn child_text(&self, name: &str) -> &str {
        self.child(name).map_or("", XmlElement::text)
    }

    /// Returns the first non-empty value among children or attributes named
    /// by `names`, tried in order.
    #[must_use]
    pub fn field(&self, names: &[&str]) -> Option<&str> {
        names.iter().find_map(|name| {
            self.child(name)
                .map(XmlElement::text)
                .or_else(|| self.attribute(name).map(str::trim))
                .filter(|v| !v.is_empty())
        })
    }

    /// Finds the first element with the given name, this one included,
    /// searching breadth-first.
    #[must_use]
    pub fn find(&self, name: &str) -> Option<&XmlElement> {
        if self.name == name {
            return Some(self);
        }
        let mut level: Vec<&XmlElement> = self.children.iter().collect();
        while !level.is_empty() {
            if let Some(found) = level.iter().find(|e| e.name == name) {
                return Some(found);
            }
            level = level.iter().flat_map(|e| e.children.iter()).collect();
        }
        None
    }
}

fn attach(stack: &mut [XmlElement], root: &mut Option<XmlElement>, element: XmlElement) {
    if let Some(parent) = stack.last_mut() {
        parent.children.push(element);
    } else if root.is_none() {
        *root = Some(element);
    }
}

fn lossy(bytes: &[u8]) -> Cow<'_, str> {
    String::from_utf8_lossy(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_nested_elements() {
        let root = XmlElement::parse(
            r#"<?xml version="1.0" encoding="UTF-8"?>
            <root>
                <authResult>0</authResult>
                <forwardUrl>index.html?ST1=a,ST2=b</forwardUrl>
            </root>"#,
        )
        .unwrap();
        assert_eq!(root.name(), "root");
        assert_eq!(root.child_text("authResult"), "0");
        assert_eq!(root.child_text("forwardUrl"), "index.html?ST1=a,ST2=b");
        assert_eq!(root.text(), "");
    }

    #[test]
    fn empty_and_missing_elements_are_empty_strings() {
        let root = XmlElement::parse("<root><errorMsg></errorMsg><osName/></root>").unwrap();
        assert_eq!(root.child_text("errorMsg"), "");
        assert_eq!(root.child_text("osName"), "");
        assert_eq!(root.child_text("svcTag"), "");
        assert!(root.child("osName").is_some());
    }

    #[test]
    fn keeps_newlines_inside_text() {
        let root = XmlElement::parse("<root><sel>1|a|b|c\n2|d|e|f</sel></root>").unwrap();
        assert_eq!(root.child_text("sel"), "1|a|b|c\n2|d|e|f");
    }

    #[test]
    fn unescapes_entities_and_reads_cdata() {
        let root =
            XmlElement::parse("<root><a>R&amp;D</a><b><![CDATA[x<y]]></b></root>").unwrap();
        assert_eq!(root.child_text("a"), "R&D");
        assert_eq!(root.child_text("b"), "x<y");
    }

    #[test]
    fn undeclared_entity_keeps_raw_text() {
        let root = XmlElement::parse("<root><a>x&nbsp;y</a></root>").unwrap();
        assert_eq!(root.child_text("a"), "x&nbsp;y");
    }

    #[test]
    fn truncated_document_keeps_partial_tree() {
        let root = XmlElement::parse("<root><hostName>R710</hostName><sysDesc>Power").unwrap();
        assert_eq!(root.name(), "root");
        assert_eq!(root.child_text("hostName"), "R710");
    }

    #[test]
    fn mismatched_end_tag_is_tolerated() {
        let root = XmlElement::parse("<root><pwState>1</pwstate></root>").unwrap();
        assert_eq!(root.child_text("pwState"), "1");
    }

    #[test]
    fn reads_attributes() {
        let root = XmlElement::parse(r#"<root><sensor name="Fan1" reading="5400"/></root>"#)
            .unwrap();
        let sensor = root.child("sensor").unwrap();
        assert_eq!(sensor.attribute("name"), Some("Fan1"));
        assert_eq!(sensor.field(&["label", "name"]), Some("Fan1"));
    }

    #[test]
    fn field_prefers_first_non_empty_alias() {
        let root = XmlElement::parse("<s><name></name><sensorName>CPU</sensorName></s>").unwrap();
        assert_eq!(root.field(&["name", "sensorName"]), Some("CPU"));
        assert_eq!(root.field(&["label"]), None);
    }

    #[test]
    fn find_searches_descendants() {
        let root = XmlElement::parse("<root><data><pwState>0</pwState></data></root>").unwrap();
        assert_eq!(root.find("pwState").map(XmlElement::text), Some("0"));
        assert_eq!(root.find("root").map(XmlElement::name), Some("root"));
        assert!(root.find("sel").is_none());
    }

    #[test]
    fn non_xml_body_is_an_error() {
        assert!(matches!(
            XmlElement::parse("Service Unavailable"),
            Err(ParseError::UnexpectedFormat(_))
        ));
        assert!(XmlElement::parse("").is_err());
    }
}
