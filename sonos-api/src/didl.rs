//! DIDL-Lite metadata
//!
//! Sonos describes every queue entry, saved queue and favourite with a
//! DIDL-Lite document. [`DidlItem::to_didl`] renders the document sent with
//! `AddURIToQueue` and friends; [`parse`] reads `Browse` results.

use xmltree::{Element, XMLNode};

use crate::error::{ApiError, Result};
use crate::operation::escape;

pub const CLASS_MUSIC_TRACK: &str = "object.item.audioItem.musicTrack";
pub const CLASS_BROADCAST: &str = "object.item.audioItem.audioBroadcast";
pub const CLASS_ALBUM: &str = "object.container.album.musicAlbum";
pub const CLASS_PLAYLIST: &str = "object.container.playlistContainer";

const DIDL_OPEN: &str = r#"<DIDL-Lite xmlns:dc="http://purl.org/dc/elements/1.1/" xmlns:upnp="urn:schemas-upnp-org:metadata-1-0/upnp/" xmlns:r="urn:schemas-rinconnetworks-com:metadata-1-0/" xmlns="urn:schemas-upnp-org:metadata-1-0/DIDL-Lite/">"#;

/// One `item` or `container` of a DIDL-Lite document
#[derive(Debug, Clone, PartialEq, Default)]
pub struct DidlItem {
    pub id: String,
    pub parent_id: String,
    pub title: Option<String>,
    pub creator: Option<String>,
    pub album: Option<String>,
    pub album_art_uri: Option<String>,
    pub class: Option<String>,
    pub res: Option<String>,
    pub original_track_number: Option<u32>,
    /// Service account token for the `cdudn` desc element
    pub desc: Option<String>,
    pub container: bool,
}

impl DidlItem {
    pub fn new(id: impl Into<String>, parent_id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            parent_id: parent_id.into(),
            ..Self::default()
        }
    }

    /// Render as a complete DIDL-Lite document
    pub fn to_didl(&self) -> String {
        let tag = if self.container { "container" } else { "item" };
        let mut xml = String::from(DIDL_OPEN);
        xml.push_str(&format!(
            r#"<{tag} id="{}" parentID="{}" restricted="true">"#,
            escape(&self.id),
            escape(&self.parent_id)
        ));
        if let Some(res) = &self.res {
            xml.push_str(&format!(
                r#"<res protocolInfo="sonos.com-http:*:audio/mpeg:*">{}</res>"#,
                escape(res)
            ));
        }
        push_element(&mut xml, "upnp:albumArtURI", self.album_art_uri.as_deref());
        push_element(&mut xml, "dc:title", self.title.as_deref());
        push_element(&mut xml, "upnp:class", self.class.as_deref());
        push_element(&mut xml, "dc:creator", self.creator.as_deref());
        push_element(&mut xml, "upnp:album", self.album.as_deref());
        if let Some(number) = self.original_track_number {
            push_element(&mut xml, "upnp:originalTrackNumber", Some(&number.to_string()));
        }
        if let Some(desc) = &self.desc {
            xml.push_str(&format!(
                r#"<desc id="cdudn" nameSpace="urn:schemas-rinconnetworks-com:metadata-1-0/">{}</desc>"#,
                escape(desc)
            ));
        }
        xml.push_str(&format!("</{tag}></DIDL-Lite>"));
        xml
    }
}

fn push_element(xml: &mut String, name: &str, value: Option<&str>) {
    if let Some(value) = value {
        xml.push_str(&format!("<{name}>{}</{name}>", escape(value)));
    }
}

/// Parse every `item` and `container` in a DIDL-Lite document
///
/// An empty string (what Sonos returns for an empty queue) yields no items.
pub fn parse(xml: &str) -> Result<Vec<DidlItem>> {
    if xml.trim().is_empty() {
        return Ok(Vec::new());
    }
    let root = Element::parse(xml.as_bytes())
        .map_err(|e| ApiError::ParseError(format!("Invalid DIDL-Lite: {e}")))?;

    Ok(root
        .children
        .iter()
        .filter_map(XMLNode::as_element)
        .filter(|e| e.name == "item" || e.name == "container")
        .map(read_item)
        .collect())
}

fn read_item(element: &Element) -> DidlItem {
    let text = |name: &str| {
        element
            .get_child(name)
            .and_then(|e| e.get_text())
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty())
    };
    let attribute = |name: &str| element.attributes.get(name).cloned().unwrap_or_default();

    DidlItem {
        id: attribute("id"),
        parent_id: attribute("parentID"),
        title: text("title"),
        creator: text("creator"),
        album: text("album"),
        album_art_uri: text("albumArtURI"),
        class: text("class"),
        res: text("res"),
        original_track_number: text("originalTrackNumber").and_then(|n| n.parse().ok()),
        desc: text("desc"),
        container: element.name == "container",
    }
}
