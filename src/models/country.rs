// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Country reference data.

use serde::{Deserialize, Serialize};

/// A country products can be grouped under.
///
/// Seeded in bulk from `data/countries.json`; read-only afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Country {
    /// Slug (e.g. "italy"), also used as document ID
    pub id: String,
    pub name: String,
    /// Flag emoji
    pub flag: String,
    #[serde(default)]
    pub tagline: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub specialties: Vec<String>,
    #[serde(default)]
    pub region: String,
    #[serde(default = "default_active")]
    pub active: bool,
}

fn default_active() -> bool {
    true
}
