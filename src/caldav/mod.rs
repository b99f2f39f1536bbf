//! CalDAV adapter: the [`RemoteCalendar`] implementation used in production.
//!
//! Connecting discovers the current-user-principal and calendar-home-set,
//! then locates (or creates) the configured collection. All object
//! operations address `<collection>/<uid>.ics` so that upserts are
//! idempotent by identifier.

pub mod client;
pub mod xml;

use std::time::Duration;

use tracing::{debug, info, warn};

use farmhouse_core::{
    DateRange, ObjectKind, RemoteObject, SyncError, SyncResult, parse_object,
};
use farmhouse_core::CodecConfig;

use crate::config::SyncConfig;
use crate::remote::{Lookup, RemoteCalendar};
use client::DavClient;

const RETRY_BACKOFF: Duration = Duration::from_millis(500);

const PROPFIND_PRINCIPAL: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<d:propfind xmlns:d="DAV:">
  <d:prop>
    <d:current-user-principal/>
  </d:prop>
</d:propfind>"#;

const PROPFIND_HOME_SET: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<d:propfind xmlns:d="DAV:" xmlns:c="urn:ietf:params:xml:ns:caldav">
  <d:prop>
    <c:calendar-home-set/>
  </d:prop>
</d:propfind>"#;

const PROPFIND_COLLECTIONS: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<d:propfind xmlns:d="DAV:" xmlns:c="urn:ietf:params:xml:ns:caldav">
  <d:prop>
    <d:displayname/>
    <d:resourcetype/>
  </d:prop>
</d:propfind>"#;

/// A connected remote calendar collection.
pub struct CalDavRemote {
    client: DavClient,
    collection_url: String,
    codec: CodecConfig,
}

impl CalDavRemote {
    /// Connect, authenticate, and resolve the target collection.
    ///
    /// Any failure before the collection is resolved aborts the cycle: either
    /// the server is unreachable/rejecting us (`Connection`) or no usable
    /// collection exists (`Config`).
    pub async fn connect(config: &SyncConfig) -> SyncResult<Self> {
        let codec = config.codec()?;
        let client = DavClient::new(config)?;
        let origin = origin_of(&config.server_url)?;

        let body = client
            .propfind(&config.server_url, PROPFIND_PRINCIPAL, 0)
            .await
            .map_err(as_connection)?;
        let principal = xml::parse_href_prop(&body, "current-user-principal")?
            .ok_or_else(|| SyncError::Connection("server reported no principal".to_string()))?;
        debug!(principal, "discovered principal");

        let principal_url = join_origin(&origin, &principal);
        let body = client
            .propfind(&principal_url, PROPFIND_HOME_SET, 0)
            .await
            .map_err(as_connection)?;
        let home = xml::parse_href_prop(&body, "calendar-home-set")?.ok_or_else(|| {
            SyncError::Connection("principal reported no calendar home set".to_string())
        })?;
        let home_url = join_origin(&origin, &home);

        let collection_href =
            get_or_create_collection(&client, &home_url, &config.collection).await?;
        let collection_url = join_origin(&origin, &collection_href);
        info!(collection = %collection_url, "connected to remote calendar");

        Ok(CalDavRemote {
            client,
            collection_url,
            codec,
        })
    }

    fn object_url(&self, uid: &str) -> String {
        format!("{}/{}.ics", self.collection_url.trim_end_matches('/'), uid)
    }
}

impl RemoteCalendar for CalDavRemote {
    async fn list_objects(
        &self,
        kind: ObjectKind,
        range: Option<&DateRange>,
    ) -> SyncResult<Vec<RemoteObject>> {
        let body = calendar_query_body(kind, range);
        let response = with_retry("list_objects", || {
            self.client.report(&self.collection_url, &body)
        })
        .await?;

        let mut objects = Vec::new();
        for resource in xml::parse_resources(&response)? {
            match parse_object(&resource.data, &self.codec) {
                Ok(object) => objects.push(object),
                Err(e) => {
                    // One bad object never aborts the listing.
                    warn!(href = %resource.href, error = %e, "skipping malformed object");
                }
            }
        }
        Ok(objects)
    }

    async fn find_by_id(&self, uid: &str) -> SyncResult<Lookup> {
        let url = self.object_url(uid);
        match with_retry("find_by_id", || self.client.get(&url)).await? {
            Some(text) => Ok(Lookup::Found(parse_object(&text, &self.codec)?)),
            None => Ok(Lookup::Absent),
        }
    }

    async fn upsert(&self, uid: &str, ics: &str) -> SyncResult<()> {
        let url = self.object_url(uid);
        with_retry("upsert", || self.client.put(&url, ics)).await
    }

    async fn delete(&self, uid: &str) -> SyncResult<()> {
        let url = self.object_url(uid);
        with_retry("delete", || self.client.delete(&url)).await
    }
}

/// Find the collection by display name, else create it, else degrade to the
/// first collection the server offers. The fallback is logged loudly; with no
/// collection at all the cycle cannot run.
async fn get_or_create_collection(
    client: &DavClient,
    home_url: &str,
    name: &str,
) -> SyncResult<String> {
    let body = client
        .propfind(home_url, PROPFIND_COLLECTIONS, 1)
        .await
        .map_err(as_connection)?;
    let collections = xml::parse_collections(&body)?;

    if let Some(existing) = collections
        .iter()
        .find(|c| c.display_name.as_deref() == Some(name))
    {
        return Ok(existing.href.clone());
    }

    let target = format!("{}/{}/", home_url.trim_end_matches('/'), slugify(name));
    match client.mkcalendar(&target, &mkcalendar_body(name)).await {
        Ok(()) => {
            info!(collection = name, href = %target, "created calendar collection");
            Ok(target)
        }
        Err(create_err) => match collections.first() {
            Some(first) => {
                warn!(
                    collection = name,
                    fallback = %first.href,
                    error = %create_err,
                    "collection missing and creation unsupported, degrading to first available collection"
                );
                Ok(first.href.clone())
            }
            None => Err(SyncError::Config(format!(
                "collection '{name}' cannot be found or created: {create_err}"
            ))),
        },
    }
}

fn mkcalendar_body(name: &str) -> String {
    format!(
        r#"<?xml version="1.0" encoding="UTF-8"?>
<C:mkcalendar xmlns:D="DAV:" xmlns:C="urn:ietf:params:xml:ns:caldav">
  <D:set>
    <D:prop>
      <D:displayname>{name}</D:displayname>
    </D:prop>
  </D:set>
</C:mkcalendar>"#
    )
}

/// Build a calendar-query REPORT filtered to one component kind, with an
/// optional server-side time-range filter.
fn calendar_query_body(kind: ObjectKind, range: Option<&DateRange>) -> String {
    let comp = match kind {
        ObjectKind::ScheduledEvent => "VEVENT",
        ObjectKind::ActionItem => "VTODO",
    };
    let time_range = range
        .map(|r| {
            format!(
                r#"<C:time-range start="{}" end="{}"/>"#,
                r.start_stamp(),
                r.end_stamp()
            )
        })
        .unwrap_or_default();

    format!(
        r#"<C:calendar-query xmlns="DAV:" xmlns:C="urn:ietf:params:xml:ns:caldav">
    <prop>
        <getetag/>
        <C:calendar-data/>
    </prop>
    <C:filter>
        <C:comp-filter name="VCALENDAR">
            <C:comp-filter name="{comp}">{time_range}</C:comp-filter>
        </C:comp-filter>
    </C:filter>
</C:calendar-query>"#
    )
}

/// Retry a remote call once on a transient failure.
async fn with_retry<T, F, Fut>(op: &str, f: F) -> SyncResult<T>
where
    F: Fn() -> Fut,
    Fut: Future<Output = SyncResult<T>>,
{
    match f().await {
        Err(SyncError::Transient(first)) => {
            warn!(op, error = %first, "transient failure, retrying once");
            tokio::time::sleep(RETRY_BACKOFF).await;
            f().await
        }
        other => other,
    }
}

/// Connect-phase failures all abort the cycle as connection errors.
fn as_connection(err: SyncError) -> SyncError {
    match err {
        SyncError::Connection(_) | SyncError::Config(_) => err,
        other => SyncError::Connection(other.to_string()),
    }
}

fn origin_of(url: &str) -> SyncResult<String> {
    let parsed = reqwest::Url::parse(url)
        .map_err(|e| SyncError::Config(format!("invalid server URL '{url}': {e}")))?;
    let host = parsed
        .host_str()
        .ok_or_else(|| SyncError::Config(format!("server URL '{url}' has no host")))?;
    Ok(match parsed.port() {
        Some(port) => format!("{}://{}:{}", parsed.scheme(), host, port),
        None => format!("{}://{}", parsed.scheme(), host),
    })
}

/// Servers return path hrefs; absolute URLs pass through untouched.
fn join_origin(origin: &str, href: &str) -> String {
    if href.starts_with("http://") || href.starts_with("https://") {
        href.to_string()
    } else {
        format!("{origin}{href}")
    }
}

fn slugify(name: &str) -> String {
    let slug: String = name
        .to_ascii_lowercase()
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '-' })
        .collect();
    slug.trim_matches('-').to_string()
}
