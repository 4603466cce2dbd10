//! # Acquisition Report
//!
//! The nested section → field → value mapping handed to the presentation
//! layer once an acquisition run completes. Sections mirror the meter
//! surface ("info", "energy", …); values are decoded physical quantities.

use serde::Serialize;
use std::collections::BTreeMap;

/// Readings collected from one meter, grouped by section.
#[derive(Debug, Default, Clone, Serialize)]
#[serde(transparent)]
pub struct Report {
    sections: BTreeMap<String, BTreeMap<String, f64>>,
}

impl Report {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a whole section, replacing any previous content.
    pub fn insert_section(&mut self, name: &str, fields: BTreeMap<String, f64>) {
        self.sections.insert(name.to_string(), fields);
    }

    /// Sets a single field, creating the section on demand.
    pub fn set(&mut self, section: &str, field: &str, value: f64) {
        self.sections
            .entry(section.to_string())
            .or_default()
            .insert(field.to_string(), value);
    }

    pub fn is_empty(&self) -> bool {
        self.sections.is_empty()
    }

    /// Renders the report as one JSON object keyed by section.
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }

    /// Renders the report as `{section}_{field}={value}` lines.
    pub fn to_text(&self) -> String {
        let mut out = String::new();
        for (section, fields) in &self.sections {
            for (field, value) in fields {
                out.push_str(&format!("{section}_{field}={value}\n"));
            }
        }
        out
    }
}
