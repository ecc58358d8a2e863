// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! The grouped UCD XML export (`ucd.nounihan.grouped.xml`) as plain records.
//!
//! The export looks roughly like this:
//!
//! ```xml
//! <ucd xmlns="http://www.unicode.org/ns/2003/ucd/1.0">
//!   <description>Unicode 16.0.0</description>
//!   <repertoire>
//!     <group ea="Na" Emoji="N" EPres="N">
//!       <char cp="0041"/>
//!       <char first-cp="3000" last-cp="303F" ea="W"/>
//!     </group>
//!   </repertoire>
//! </ucd>
//! ```
//!
//! Attributes on a `<group>` are defaults for every `<char>` inside it.

use std::fmt;
use std::fs;
use std::ops::RangeInclusive;
use std::path::Path;

use crate::apperr::{Attribute, Error, Result};

pub const UCD_NAMESPACE: &str = "http://www.unicode.org/ns/2003/ucd/1.0";
pub const MAX_CODEPOINT: u32 = 0x10FFFF;

/// An inclusive `[first, last]` range of codepoints, both `<= MAX_CODEPOINT`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CodepointRange {
    first: u32,
    last: u32,
}

impl CodepointRange {
    pub const fn new(first: u32, last: u32) -> Self {
        assert!(first <= last && last <= MAX_CODEPOINT);
        Self { first, last }
    }

    pub const fn single(cp: u32) -> Self {
        Self::new(cp, cp)
    }

    pub fn first(&self) -> u32 {
        self.first
    }

    pub fn last(&self) -> u32 {
        self.last
    }

    /// The range as table indices.
    pub fn indices(&self) -> RangeInclusive<usize> {
        self.first as usize..=self.last as usize
    }
}

impl fmt::Display for CodepointRange {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        if self.first == self.last {
            write!(f, "U+{:04X}", self.first)
        } else {
            write!(f, "U+{:04X} to U+{:04X}", self.first, self.last)
        }
    }
}

/// How a `<char>` entry names its codepoints.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Span {
    Single(u32),
    Range { first: u32, last: u32 },
}

impl Span {
    pub fn range(&self) -> CodepointRange {
        match *self {
            Span::Single(cp) => CodepointRange::single(cp),
            Span::Range { first, last } => CodepointRange::new(first, last),
        }
    }
}

/// The properties we care about. `None` means "not given here".
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Properties {
    /// East Asian Width code (`ea`), e.g. "Na" or "W".
    pub east_asian: Option<String>,
    /// `Emoji`
    pub emoji: Option<bool>,
    /// `EPres`
    pub emoji_presentation: Option<bool>,
}

impl Properties {
    fn from_node(node: &roxmltree::Node) -> Self {
        Self {
            east_asian: attribute(node, "ea").map(str::to_string),
            emoji: attribute(node, "Emoji").map(|v| v == "Y"),
            emoji_presentation: attribute(node, "EPres").map(|v| v == "Y"),
        }
    }

    /// Fills everything not given here from the enclosing group.
    pub fn inherit(&self, group: &Properties) -> Properties {
        Properties {
            east_asian: self.east_asian.clone().or_else(|| group.east_asian.clone()),
            emoji: self.emoji.or(group.emoji),
            emoji_presentation: self.emoji_presentation.or(group.emoji_presentation),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CharEntry {
    pub span: Span,
    pub properties: Properties,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Group {
    pub properties: Properties,
    pub entries: Vec<CharEntry>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UcdDocument {
    pub description: String,
    pub groups: Vec<Group>,
}

impl UcdDocument {
    pub fn read(path: &Path) -> Result<Self> {
        let bytes = fs::read(path)
            .map_err(|source| Error::SourceRead { path: path.to_path_buf(), source })?;
        Self::from_bytes(&bytes)
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let text = std::str::from_utf8(bytes)
            .map_err(|err| Error::document(format!("invalid UTF-8: {err}")))?;
        Self::parse(text)
    }

    /// Parses the export, keeping groups and entries in document order.
    ///
    /// Only `<char>` entries are read. `<reserved>`, `<noncharacter>` and
    /// `<surrogate>` entries are skipped and their codepoints keep the table default.
    pub fn parse(text: &str) -> Result<Self> {
        let doc = roxmltree::Document::parse(text)?;
        let root = doc.root_element();
        let repertoire = root
            .children()
            .find(|n| n.has_tag_name((UCD_NAMESPACE, "repertoire")))
            .ok_or_else(|| Error::document("missing ucd repertoire"))?;
        let description = root
            .children()
            .find(|n| n.has_tag_name((UCD_NAMESPACE, "description")))
            .and_then(|n| n.text())
            .unwrap_or_default()
            .to_string();

        let mut groups = Vec::new();

        for group in repertoire.children().filter(|n| n.has_tag_name((UCD_NAMESPACE, "group"))) {
            let mut entries = Vec::new();

            for char in group.children().filter(|n| n.has_tag_name((UCD_NAMESPACE, "char"))) {
                entries.push(CharEntry {
                    span: parse_span(&char)?,
                    properties: Properties::from_node(&char),
                });
            }

            groups.push(Group { properties: Properties::from_node(&group), entries });
        }

        Ok(Self { description, groups })
    }

    pub fn entry_count(&self) -> usize {
        self.groups.iter().map(|g| g.entries.len()).sum()
    }
}

// An empty attribute counts as absent.
fn attribute<'a>(node: &roxmltree::Node<'a, '_>, name: &str) -> Option<&'a str> {
    node.attribute(name).filter(|v| !v.is_empty())
}

fn parse_span(node: &roxmltree::Node) -> Result<Span> {
    if let Some(cp) = attribute(node, "cp") {
        return Ok(Span::Single(parse_codepoint(Attribute::Codepoint, Some(cp))?));
    }

    let first_text = attribute(node, "first-cp");
    let last_text = attribute(node, "last-cp");
    let first = parse_codepoint(Attribute::FirstCodepoint, first_text)?;
    let last = parse_codepoint(Attribute::LastCodepoint, last_text)?;
    if first > last {
        return Err(Error::AttributeParse {
            attribute: Attribute::LastCodepoint,
            value: last_text.unwrap_or_default().to_string(),
        });
    }

    Ok(Span::Range { first, last })
}

fn parse_codepoint(attribute: Attribute, value: Option<&str>) -> Result<u32> {
    let value = value.unwrap_or_default();
    let err = || Error::AttributeParse { attribute, value: value.to_string() };

    // from_str_radix() would also accept a leading '+'.
    if value.is_empty() || !value.bytes().all(|b| b.is_ascii_hexdigit()) {
        return Err(err());
    }

    match u32::from_str_radix(value, 16) {
        Ok(cp) if cp <= MAX_CODEPOINT => Ok(cp),
        _ => Err(err()),
    }
}

#[cfg(test)]
pub(crate) fn test_document(repertoire: &str) -> String {
    format!(
        r#"<?xml version="1.0" encoding="UTF-8"?>
<ucd xmlns="{UCD_NAMESPACE}">
<description>Unicode 16.0.0</description>
<repertoire>{repertoire}</repertoire>
</ucd>"#
    )
}
