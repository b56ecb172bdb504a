//! Documentation generator for setting catalogs
//!
//! Generates a markdown reference from a [`SchemaRegistry`], grouped by page
//! and section in declaration order.

use crate::config::{SchemaRegistry, SettingDefinition, SettingKind, SideEffect, ValueEncoding};
use std::fmt::Write;

/// Configuration for docs generation
#[derive(Debug, Clone, Default)]
pub struct DocsConfig {
    /// Title for the documentation
    pub title: Option<String>,
    /// Description/introduction text
    pub description: Option<String>,
    /// Only document settings active on this OS build
    pub os_build: Option<u32>,
}

impl DocsConfig {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    #[must_use]
    pub fn with_description(mut self, desc: impl Into<String>) -> Self {
        self.description = Some(desc.into());
        self
    }

    #[must_use]
    pub fn for_build(mut self, build: u32) -> Self {
        self.os_build = Some(build);
        self
    }
}

/// Generate markdown documentation for a catalog
#[must_use]
pub fn generate_docs(registry: &SchemaRegistry, config: DocsConfig) -> String {
    let mut output = String::new();

    let title = config
        .title
        .unwrap_or_else(|| "Settings Reference".to_string());
    let _ = writeln!(output, "# {title}\n");

    if let Some(desc) = config.description {
        let _ = writeln!(output, "{desc}\n");
    }

    for page in registry.pages() {
        let settings: Vec<_> = registry
            .iter()
            .filter(|d| d.page == page && config.os_build.is_none_or(|b| d.is_supported(b)))
            .collect();
        if settings.is_empty() {
            continue;
        }

        let _ = writeln!(output, "## {page}\n");
        let mut current_section: Option<&str> = None;
        for definition in settings {
            if !definition.section.is_empty()
                && current_section != Some(definition.section.as_str())
            {
                let _ = writeln!(output, "### {}\n", definition.section);
                current_section = Some(definition.section.as_str());
            }
            format_setting(&mut output, definition);
        }
    }

    output
}

fn format_setting(out: &mut String, def: &SettingDefinition) {
    let _ = writeln!(out, "#### {} (`{}`)\n", def.label, def.id);

    let mut badges = Vec::new();
    if let Some(build) = def.min_build {
        badges.push(format!("Build {build}+"));
    }
    if def.side_effect != SideEffect::None {
        badges.push(capitalize(def.side_effect.describe()));
    }
    if !badges.is_empty() {
        let _ = writeln!(out, "{}\n", badges.join(" • "));
    }

    if !def.tooltip.is_empty() {
        let _ = writeln!(out, "{}\n", def.tooltip);
    }

    out.push_str("| Property | Value |\n");
    out.push_str("|----------|-------|\n");
    let _ = writeln!(out, "| **Type** | {} |", format_kind(&def.kind));
    let _ = writeln!(out, "| **Location** | `{}` |", def.location);
    let _ = writeln!(out, "| **Encoding** | {} |", format_encoding(def.encoding));
    let _ = writeln!(out, "| **Default** | `{}` |", def.default);

    match &def.kind {
        SettingKind::Switch { on, off } => {
            let _ = writeln!(out, "| **On / Off** | `{on}` / `{off}` |");
        }
        SettingKind::BoundedInteger { min, max, step } => {
            let _ = writeln!(out, "| **Range** | {min} - {max} |");
            let _ = writeln!(out, "| **Step** | {step} |");
        }
        SettingKind::Choice { .. } => {}
    }
    out.push('\n');

    if let SettingKind::Choice { options } = &def.kind {
        out.push_str("**Options:**\n\n");
        for option in options {
            let _ = writeln!(out, "- `{}` - {}", option.value, option.label);
        }
        out.push('\n');
    }

    out.push_str("---\n\n");
}

fn format_kind(kind: &SettingKind) -> &'static str {
    match kind {
        SettingKind::Switch { .. } => "Switch",
        SettingKind::Choice { .. } => "Choice",
        SettingKind::BoundedInteger { .. } => "Integer",
    }
}

fn format_encoding(encoding: ValueEncoding) -> &'static str {
    match encoding {
        ValueEncoding::Dword => "REG_DWORD",
        ValueEncoding::Text => "REG_SZ",
    }
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        None => String::new(),
        Some(first) => first.to_uppercase().chain(chars).collect(),
    }
}

// =============================================================================
// Tests
// =============================================================================
