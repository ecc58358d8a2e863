// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Turns a [`UcdDocument`] into a dense per-codepoint [`WidthTable`].

use std::fmt;
use std::ops::Index;

use crate::apperr::{Error, Result};
use crate::ucd::{CodepointRange, MAX_CODEPOINT, Properties, UcdDocument};

/// Number of entries in a [`WidthTable`]: one per codepoint.
pub const TABLE_LEN: usize = MAX_CODEPOINT as usize + 1;

#[repr(u8)]
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WidthClass {
    /// Ambiguous. Also the value of every codepoint no entry mentions.
    #[default]
    Zero = 0,
    Narrow = 1,
    Wide = 2,
}

impl WidthClass {
    /// Maps an East Asian Width code to its class.
    pub fn from_east_asian(code: &str, no_ambiguous: bool) -> Option<Self> {
        match code {
            "N" | "Na" | "H" => Some(WidthClass::Narrow), // Neutral, Narrow, Half-width
            "W" | "F" => Some(WidthClass::Wide),          // Wide, Full-width
            "A" if no_ambiguous => Some(WidthClass::Narrow),
            "A" => Some(WidthClass::Zero), // Ambiguous
            _ => None,
        }
    }

    pub fn value(self) -> u8 {
        self as u8
    }
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ExtractOptions {
    /// Map `ea=A` to narrow instead of zero.
    pub no_ambiguous: bool,
    /// Make `Emoji=Y EPres=Y` entries wide regardless of `ea`.
    pub emoji_presentation: bool,
}

/// One width class per codepoint, stored as its `u8` value.
#[derive(Clone, PartialEq, Eq)]
pub struct WidthTable {
    values: Box<[u8]>,
}

impl WidthTable {
    fn new() -> Self {
        Self { values: vec![WidthClass::Zero.value(); TABLE_LEN].into_boxed_slice() }
    }

    pub fn get(&self, cp: u32) -> WidthClass {
        match self.values[cp as usize] {
            1 => WidthClass::Narrow,
            2 => WidthClass::Wide,
            _ => WidthClass::Zero,
        }
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.values
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    fn fill(&mut self, range: CodepointRange, class: WidthClass) {
        self.values[range.indices()].fill(class.value());
    }
}

impl fmt::Debug for WidthTable {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("WidthTable").field("len", &self.values.len()).finish_non_exhaustive()
    }
}

impl Index<u32> for WidthTable {
    type Output = u8;

    fn index(&self, cp: u32) -> &u8 {
        &self.values[cp as usize]
    }
}

/// Builds the table from one or more documents.
///
/// Documents are applied in order and so are their entries, so a later entry
/// overwrites an earlier one wherever their ranges overlap. This is how override
/// documents are layered on top of the UCD export. On error nothing is returned.
pub fn extract(documents: &[UcdDocument], options: &ExtractOptions) -> Result<WidthTable> {
    let mut table = WidthTable::new();

    for doc in documents {
        for group in &doc.groups {
            for entry in &group.entries {
                let range = entry.span.range();
                let properties = entry.properties.inherit(&group.properties);
                table.fill(range, resolve_class(&properties, range, options)?);
            }
        }
    }

    Ok(table)
}

/// Parses `bytes` as a single document and extracts its table.
pub fn extract_bytes(bytes: &[u8], options: &ExtractOptions) -> Result<WidthTable> {
    let doc = UcdDocument::from_bytes(bytes)?;
    extract(std::slice::from_ref(&doc), options)
}

fn resolve_class(
    properties: &Properties,
    range: CodepointRange,
    options: &ExtractOptions,
) -> Result<WidthClass> {
    if options.emoji_presentation
        && properties.emoji == Some(true)
        && properties.emoji_presentation == Some(true)
    {
        return Ok(WidthClass::Wide);
    }

    let code = properties.east_asian.as_deref().unwrap_or_default();
    WidthClass::from_east_asian(code, options.no_ambiguous)
        .ok_or_else(|| Error::UnknownWidthClass { code: code.to_string(), range })
}
