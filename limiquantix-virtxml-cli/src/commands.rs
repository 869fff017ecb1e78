//! Subcommand implementations.
//!
//! Each command returns the text it would print so that `main` owns stdout
//! and the commands stay testable.

use anyhow::{anyhow, bail, Context, Result};
use serde::Serialize;
use tracing::{debug, info};

use limiquantix_virtxml::schema::{self, domain::Domain, filter::Filter, snapshot::DomainSnapshot};
use limiquantix_virtxml::{load_with, save_document, Document, LoadOptions, Schema};

use crate::cli::DocumentKind;
use crate::config::OutputConfig;

/// A loaded document of one of the supported kinds.
#[derive(Debug, Clone, PartialEq)]
pub enum Loaded {
    Domain(Box<Domain>),
    Snapshot(Box<DomainSnapshot>),
    Filter(Box<Filter>),
}

impl Loaded {
    pub fn kind(&self) -> DocumentKind {
        match self {
            Loaded::Domain(_) => DocumentKind::Domain,
            Loaded::Snapshot(_) => DocumentKind::Snapshot,
            Loaded::Filter(_) => DocumentKind::Filter,
        }
    }

    /// Serialize back to indented XML.
    pub fn to_xml(&self, indent: usize) -> Result<String> {
        let document = match self {
            Loaded::Domain(domain) => save_document(domain.as_ref())?,
            Loaded::Snapshot(snapshot) => save_document(snapshot.as_ref())?,
            Loaded::Filter(filter) => save_document(filter.as_ref())?,
        };
        let mut xml = document.to_xml_pretty(indent)?;
        xml.push('\n');
        Ok(xml)
    }

    pub fn to_json(&self, pretty: bool) -> Result<String> {
        match self {
            Loaded::Domain(domain) => json(domain, pretty),
            Loaded::Snapshot(snapshot) => json(snapshot, pretty),
            Loaded::Filter(filter) => json(filter, pretty),
        }
    }
}

fn json<T: Serialize>(value: &T, pretty: bool) -> Result<String> {
    let text = if pretty {
        serde_json::to_string_pretty(value)?
    } else {
        serde_json::to_string(value)?
    };
    Ok(text)
}

/// Resolve `auto` from the root element name.
pub fn resolve_kind(kind: DocumentKind, root: &str) -> Result<DocumentKind> {
    if kind != DocumentKind::Auto {
        return Ok(kind);
    }
    match root {
        "domain" => Ok(DocumentKind::Domain),
        "domainsnapshot" => Ok(DocumentKind::Snapshot),
        "filter" => Ok(DocumentKind::Filter),
        other => bail!("Cannot detect document kind from root element <{}>", other),
    }
}

fn load_as<T: Schema>(document: &Document, options: &LoadOptions) -> Result<Box<T>> {
    Ok(Box::new(load_with::<T>(&document.root, options)?))
}

/// Parse `xml` and load it with the schema selected by `kind`.
pub fn load_document(xml: &str, kind: DocumentKind, options: &LoadOptions) -> Result<Loaded> {
    let document =
        Document::parse_with_depth(xml, options.max_depth).context("Failed to parse XML")?;
    let kind = resolve_kind(kind, &document.root.name)?;
    debug!(kind = kind.as_str(), root = %document.root.name, "Loading document");

    let loaded = match kind {
        DocumentKind::Domain => Loaded::Domain(load_as(&document, options)?),
        DocumentKind::Snapshot => Loaded::Snapshot(load_as(&document, options)?),
        DocumentKind::Filter => Loaded::Filter(load_as(&document, options)?),
        DocumentKind::Auto => bail!("Document kind is not resolved"),
    };
    Ok(loaded)
}

pub fn check(xml: &str, kind: DocumentKind, options: &LoadOptions) -> Result<String> {
    let loaded = load_document(xml, kind, options)?;
    info!(kind = loaded.kind().as_str(), "Document is valid");
    Ok(format!("ok {}", loaded.kind().as_str()))
}

pub fn format(xml: &str, kind: DocumentKind, options: &LoadOptions, output: &OutputConfig) -> Result<String> {
    load_document(xml, kind, options)?.to_xml(output.indent)
}

pub fn show(xml: &str, kind: DocumentKind, options: &LoadOptions, output: &OutputConfig) -> Result<String> {
    load_document(xml, kind, options)?.to_json(output.json_pretty)
}

/// Layout of one schema type, or the list of known types.
pub fn schema(type_name: Option<&str>, as_json: bool) -> Result<String> {
    let Some(name) = type_name else {
        return Ok(schema::TYPE_NAMES.join("\n"));
    };
    let layout = schema::layout_of(name).ok_or_else(|| {
        anyhow!(
            "Unknown schema type '{}', expected one of: {}",
            name,
            schema::TYPE_NAMES.join(", ")
        )
    })?;
    if as_json {
        json(&layout, true)
    } else {
        Ok(layout.to_string().trim_end().to_string())
    }
}
