// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Derives a per-codepoint East Asian Width table from the UCD and measures
//! how small a block-deduplicated lookup table for it would be.

pub mod apperr;
pub mod dedup;
pub mod hash;
pub mod sweep;
pub mod ucd;
pub mod width;
