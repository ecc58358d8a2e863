// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use std::path::PathBuf;
use std::{error, fmt, io, result};

use crate::ucd::CodepointRange;

pub type Result<T> = result::Result<T, Error>;

/// The codepoint attribute of a `<char>` entry that failed to parse.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Attribute {
    Codepoint,
    FirstCodepoint,
    LastCodepoint,
}

impl Attribute {
    pub fn name(self) -> &'static str {
        match self {
            Attribute::Codepoint => "cp",
            Attribute::FirstCodepoint => "first-cp",
            Attribute::LastCodepoint => "last-cp",
        }
    }

    pub fn is_range(self) -> bool {
        !matches!(self, Attribute::Codepoint)
    }
}

// Every variant is fatal. Extraction stops at the first one.
#[derive(Debug)]
pub enum Error {
    SourceRead { path: PathBuf, source: io::Error },
    DocumentParse { reason: String },
    AttributeParse { attribute: Attribute, value: String },
    UnknownWidthClass { code: String, range: CodepointRange },
}

impl Error {
    pub fn document(reason: impl Into<String>) -> Self {
        Error::DocumentParse { reason: reason.into() }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            // The io::Error is reported through source().
            Error::SourceRead { path, .. } => write!(f, "failed to read {}", path.display()),
            Error::DocumentParse { reason } => write!(f, "malformed ucd document: {reason}"),
            Error::AttributeParse { attribute, value } => {
                let kind = if attribute.is_range() { "range" } else { "single codepoint" };
                write!(f, "unexpected {} attribute ({kind}): {:?}", attribute.name(), value)
            }
            Error::UnknownWidthClass { code, range } => {
                write!(f, "unrecognized ea {code:?} for {range}")
            }
        }
    }
}

impl error::Error for Error {
    fn source(&self) -> Option<&(dyn error::Error + 'static)> {
        match self {
            Error::SourceRead { source, .. } => Some(source),
            _ => None,
        }
    }
}

impl From<roxmltree::Error> for Error {
    fn from(err: roxmltree::Error) -> Self {
        Error::document(err.to_string())
    }
}
