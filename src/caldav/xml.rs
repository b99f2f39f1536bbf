//! Parsing of WebDAV multistatus responses.
//!
//! CalDAV servers answer PROPFIND/REPORT with namespaced XML. Matching on
//! local tag names keeps this tolerant of the different prefixes servers use.

use farmhouse_core::{SyncError, SyncResult};

/// One fetched calendar resource with its ICS payload.
#[derive(Debug)]
pub struct ResourceEntry {
    pub href: String,
    pub etag: Option<String>,
    pub data: String,
}

/// One calendar collection discovered under the home set.
#[derive(Debug)]
pub struct CollectionEntry {
    pub href: String,
    pub display_name: Option<String>,
}

/// Extract `calendar-data` resources from a REPORT multistatus response.
pub fn parse_resources(body: &str) -> SyncResult<Vec<ResourceEntry>> {
    let doc = parse_document(body)?;
    let root = doc.root_element();

    let mut resources = Vec::new();
    for response in root.descendants().filter(|n| n.tag_name().name() == "response") {
        let href = response
            .descendants()
            .find(|n| n.tag_name().name() == "href")
            .and_then(|n| n.text())
            .map(|s| s.to_string());
        let Some(href) = href else { continue };

        let etag = response
            .descendants()
            .find(|n| n.tag_name().name() == "getetag")
            .and_then(|n| n.text())
            .map(|s| s.to_string());

        let data = response
            .descendants()
            .find(|n| n.tag_name().name() == "calendar-data")
            .and_then(|n| n.text())
            .map(|s| s.to_string());

        // Only entries that actually carry calendar data.
        if let Some(data) = data {
            resources.push(ResourceEntry { href, etag, data });
        }
    }

    Ok(resources)
}

/// Extract calendar collections from a PROPFIND Depth:1 response on the
/// calendar home set. Non-calendar children (inbox, outbox) are dropped.
pub fn parse_collections(body: &str) -> SyncResult<Vec<CollectionEntry>> {
    let doc = parse_document(body)?;
    let root = doc.root_element();

    let mut collections = Vec::new();
    for response in root.descendants().filter(|n| n.tag_name().name() == "response") {
        let href = response
            .descendants()
            .find(|n| n.tag_name().name() == "href")
            .and_then(|n| n.text())
            .map(|s| s.to_string());
        let Some(href) = href else { continue };

        let is_calendar = response
            .descendants()
            .filter(|n| n.tag_name().name() == "resourcetype")
            .any(|rt| rt.children().any(|c| c.tag_name().name() == "calendar"));
        if !is_calendar {
            continue;
        }

        let display_name = response
            .descendants()
            .find(|n| n.tag_name().name() == "displayname")
            .and_then(|n| n.text())
            .map(|s| s.to_string());

        collections.push(CollectionEntry { href, display_name });
    }

    Ok(collections)
}

/// Extract the href inside a named property, e.g. `current-user-principal`
/// or `calendar-home-set`.
pub fn parse_href_prop(body: &str, prop: &str) -> SyncResult<Option<String>> {
    let doc = parse_document(body)?;
    let href = doc
        .root_element()
        .descendants()
        .find(|n| n.tag_name().name() == prop)
        .and_then(|n| {
            n.descendants()
                .find(|c| c.tag_name().name() == "href")
                .and_then(|c| c.text())
        })
        .map(|s| s.to_string());
    Ok(href)
}

fn parse_document(body: &str) -> SyncResult<roxmltree::Document<'_>> {
    roxmltree::Document::parse(body)
        .map_err(|e| SyncError::Transient(format!("unparsable multistatus response: {e}")))
}
