//! Kdenlive project view over a [`Document`].
//!
//! A project is an MLT document: a root `mlt` element carrying the project
//! base path, a `profile` with the output frame size, `producer` (or `chain`)
//! elements describing media, and `playlist` tracks whose `entry` children
//! place producers on the timeline.

use std::path::Path;

use ksg_common::{KsgError, KsgResult};
use serde::Serialize;

use crate::document::{Document, Element, Node};
use crate::filter::{Filter, FILTER_TAG};
use crate::rect::Size;

/// Tags that can back a timeline entry.
const MEDIA_SOURCE_TAGS: [&str; 2] = ["producer", "chain"];

/// Output frame dimensions from the project profile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Frame {
    pub width: u32,
    pub height: u32,
}

impl Frame {
    pub fn size(&self) -> Size {
        Size::from((self.width, self.height))
    }
}

/// Position of an entry inside the root element's child list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct EntryLocation {
    /// Child index of the playlist under the root.
    pub playlist: usize,
    /// Child index of the entry under the playlist.
    pub entry: usize,
}

/// A timeline entry, detached from the tree so the tree can be mutated later.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimelineEntry {
    pub location: EntryLocation,
    pub playlist_id: Option<String>,
    pub producer_id: Option<String>,
    pub in_point: String,
    pub out_point: String,
    pub has_filter: bool,
}

/// Media metadata resolved for an entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaSource {
    pub resource: String,
    pub width: u32,
    pub height: u32,
}

impl MediaSource {
    pub fn size(&self) -> Size {
        Size::from((self.width, self.height))
    }
}

/// A loaded Kdenlive project.
#[derive(Debug, Clone)]
pub struct KdenliveProject {
    document: Document,
}

impl KdenliveProject {
    pub fn new(document: Document) -> Self {
        Self { document }
    }

    /// Load a project file from disk.
    pub fn load(path: impl AsRef<Path>) -> KsgResult<Self> {
        let path = path.as_ref();
        let document = Document::load(path)?;
        tracing::debug!(
            path = %path.display(),
            root = document.root.attr("root").unwrap_or_default(),
            "Loaded project"
        );
        Ok(Self::new(document))
    }

    /// Parse a project from an in-memory string.
    pub fn parse(content: &str) -> KsgResult<Self> {
        Ok(Self::new(Document::parse(content)?))
    }

    /// Write the project, with XML declaration, to `path`.
    pub fn save(&self, path: impl AsRef<Path>) -> KsgResult<()> {
        self.document.save(path)?;
        Ok(())
    }

    pub fn document(&self) -> &Document {
        &self.document
    }

    /// Base directory media paths are relative to (`root` attribute).
    pub fn root_dir(&self) -> Option<&str> {
        self.document.root.attr("root")
    }

    /// Output frame size from the `profile` element.
    pub fn profile(&self) -> KsgResult<Frame> {
        let profile = self
            .document
            .root
            .child("profile")
            .ok_or_else(|| KsgError::config("project has no <profile> element"))?;

        Ok(Frame {
            width: positive_dimension(profile.attr("width"))
                .map_err(|e| KsgError::config(format!("profile width {e}")))?,
            height: positive_dimension(profile.attr("height"))
                .map_err(|e| KsgError::config(format!("profile height {e}")))?,
        })
    }

    /// Entries of every playlist except `asset_bin_id`, in document order.
    pub fn timeline_entries(&self, asset_bin_id: &str) -> Vec<TimelineEntry> {
        let mut entries = vec![];

        for (playlist_index, node) in self.document.root.children.iter().enumerate() {
            let playlist = match node {
                Node::Element(e) if e.name == "playlist" => e,
                _ => continue,
            };
            let playlist_id = playlist.attr("id");
            if playlist_id == Some(asset_bin_id) {
                continue;
            }

            for (entry_index, node) in playlist.children.iter().enumerate() {
                let entry = match node {
                    Node::Element(e) if e.name == "entry" => e,
                    _ => continue,
                };
                entries.push(TimelineEntry {
                    location: EntryLocation {
                        playlist: playlist_index,
                        entry: entry_index,
                    },
                    playlist_id: playlist_id.map(str::to_string),
                    producer_id: entry.attr("producer").map(str::to_string),
                    in_point: entry.attr("in").unwrap_or("0").to_string(),
                    out_point: entry.attr("out").unwrap_or("0").to_string(),
                    has_filter: entry.has_child(FILTER_TAG),
                });
            }
        }

        entries
    }

    /// The `producer` or `chain` element with the given id.
    pub fn producer(&self, id: &str) -> Option<&Element> {
        self.document
            .root
            .elements()
            .find(|e| MEDIA_SOURCE_TAGS.contains(&e.name.as_str()) && e.attr("id") == Some(id))
    }

    /// Resolve the media behind an entry.
    ///
    /// `Ok(None)` means the entry references no media element (a blank or a
    /// transition) and should be skipped. Missing or non-positive image
    /// metadata is a data error.
    pub fn media_source(&self, entry: &TimelineEntry) -> KsgResult<Option<MediaSource>> {
        let Some(id) = entry.producer_id.as_deref() else {
            return Ok(None);
        };
        let Some(producer) = self.producer(id) else {
            return Ok(None);
        };

        let resource = producer
            .property("resource")
            .ok_or_else(|| KsgError::data(format!("producer {id} has no resource property")))?;

        let width = positive_dimension(producer.property("meta.media.width").as_deref())
            .map_err(|e| KsgError::data(format!("{resource}: meta.media.width {e}")))?;
        let height = positive_dimension(producer.property("meta.media.height").as_deref())
            .map_err(|e| KsgError::data(format!("{resource}: meta.media.height {e}")))?;

        Ok(Some(MediaSource {
            resource,
            width,
            height,
        }))
    }

    /// Append `filter` to the entry at `location`.
    pub fn attach_filter(&mut self, location: EntryLocation, filter: &Filter) -> KsgResult<()> {
        let entry = self
            .document
            .root
            .element_at_mut(location.playlist)
            .and_then(|playlist| playlist.element_at_mut(location.entry))
            .filter(|e| e.name == "entry")
            .ok_or_else(|| {
                KsgError::data(format!(
                    "no entry at playlist {} / child {}",
                    location.playlist, location.entry
                ))
            })?;

        entry.push_element(filter.to_element());
        tracing::trace!(
            filter = %filter.id,
            playlist = location.playlist,
            entry = location.entry,
            "Attached filter"
        );
        Ok(())
    }

    /// Filters currently attached to the entry at `location`.
    pub fn entry_filters(&self, location: EntryLocation) -> Vec<Filter> {
        self.document
            .root
            .element_at(location.playlist)
            .and_then(|playlist| playlist.element_at(location.entry))
            .map(|entry| {
                entry
                    .children_named(FILTER_TAG)
                    .filter_map(Filter::from_element)
                    .collect()
            })
            .unwrap_or_default()
    }
}

/// Parse a strictly positive pixel dimension.
fn positive_dimension(value: Option<&str>) -> Result<u32, String> {
    let value = value.ok_or_else(|| "is missing".to_string())?;
    match value.trim().parse::<i64>() {
        Ok(v) if v > 0 && v <= u32::MAX as i64 => Ok(v as u32),
        Ok(v) => Err(format!("must be positive, got {v}")),
        Err(_) => Err(format!("is not an integer: {value:?}")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rect::{KeyframePair, Rect};

    const PROJECT: &str = r#"<?xml version="1.0" encoding="utf-8"?>
<mlt root="/home/me/slides" producer="main_bin">
 <profile width="1920" height="1080" frame_rate_num="25"/>
 <producer id="producer0">
  <property name="resource">a.jpg</property>
  <property name="meta.media.width">4000</property>
  <property name="meta.media.height">3000</property>
 </producer>
 <producer id="producer1">
  <property name="resource">tall.jpg</property>
  <property name="meta.media.width">3000</property>
  <property name="meta.media.height">0</property>
 </producer>
 <playlist id="main_bin">
  <entry producer="producer0" in="0" out="999"/>
 </playlist>
 <playlist id="playlist0">
  <entry producer="producer0" in="0" out="125"/>
  <blank length="10"/>
  <entry producer="black_track" in="0" out="50"/>
  <entry producer="producer1" in="10" out="60"/>
 </playlist>
</mlt>
"#;

    #[test]
    fn test_profile_and_root_dir() {
        let project = KdenliveProject::parse(PROJECT).unwrap();
        assert_eq!(
            project.profile().unwrap(),
            Frame {
                width: 1920,
                height: 1080
            }
        );
        assert_eq!(project.root_dir(), Some("/home/me/slides"));
    }

    #[test]
    fn test_profile_errors_are_config_errors() {
        let missing = KdenliveProject::parse("<mlt/>").unwrap();
        assert!(matches!(missing.profile(), Err(KsgError::Config { .. })));

        let zero = KdenliveProject::parse(r#"<mlt><profile width="0" height="1080"/></mlt>"#)
            .unwrap();
        assert!(matches!(zero.profile(), Err(KsgError::Config { .. })));

        let text = KdenliveProject::parse(r#"<mlt><profile width="wide" height="1080"/></mlt>"#)
            .unwrap();
        assert!(matches!(text.profile(), Err(KsgError::Config { .. })));
    }

    #[test]
    fn test_timeline_entries_skip_asset_bin() {
        let project = KdenliveProject::parse(PROJECT).unwrap();
        let entries = project.timeline_entries("main_bin");
        assert_eq!(entries.len(), 3);
        assert!(entries
            .iter()
            .all(|e| e.playlist_id.as_deref() == Some("playlist0")));
        assert_eq!(entries[0].in_point, "0");
        assert_eq!(entries[0].out_point, "125");
        assert!(!entries[0].has_filter);
    }

    #[test]
    fn test_media_source_resolution() {
        let project = KdenliveProject::parse(PROJECT).unwrap();
        let entries = project.timeline_entries("main_bin");

        let media = project.media_source(&entries[0]).unwrap().unwrap();
        assert_eq!(media.resource, "a.jpg");
        assert_eq!((media.width, media.height), (4000, 3000));

        // black_track is not defined in this document
        assert_eq!(project.media_source(&entries[1]).unwrap(), None);

        // zero height
        assert!(matches!(
            project.media_source(&entries[2]),
            Err(KsgError::Data { .. })
        ));
    }

    #[test]
    fn test_unusable_media_metadata_is_a_data_error() {
        let xml = r#"<mlt>
 <producer id="nores">
  <property name="meta.media.width">4000</property>
  <property name="meta.media.height">3000</property>
 </producer>
 <producer id="textwidth">
  <property name="resource">b.jpg</property>
  <property name="meta.media.width">wide</property>
  <property name="meta.media.height">3000</property>
 </producer>
 <playlist id="playlist0">
  <entry producer="nores" in="0" out="10"/>
  <entry producer="textwidth" in="0" out="10"/>
 </playlist>
</mlt>"#;
        let project = KdenliveProject::parse(xml).unwrap();
        let entries = project.timeline_entries("main_bin");
        assert_eq!(entries.len(), 2);

        match project.media_source(&entries[0]) {
            Err(KsgError::Data { message }) => assert!(message.contains("resource")),
            other => panic!("expected data error, got {other:?}"),
        }
        match project.media_source(&entries[1]) {
            Err(KsgError::Data { message }) => {
                assert!(message.contains("meta.media.width"));
                assert!(message.contains("b.jpg"));
            }
            other => panic!("expected data error, got {other:?}"),
        }
    }

    #[test]
    fn test_malformed_project_is_a_parse_error() {
        assert!(matches!(
            KdenliveProject::parse("<mlt><playlist></mlt>"),
            Err(KsgError::Parse { .. })
        ));

        let path = std::env::temp_dir().join("ksg_test_malformed_project.kdenlive");
        std::fs::write(&path, "<mlt><profile width=\"1920\"></mlt>").unwrap();
        assert!(matches!(
            KdenliveProject::load(&path),
            Err(KsgError::Parse { .. })
        ));
        std::fs::remove_file(&path).ok();

        let missing = std::env::temp_dir().join("ksg_test_missing_project.kdenlive");
        let _ = std::fs::remove_file(&missing);
        assert!(matches!(
            KdenliveProject::load(&missing),
            Err(KsgError::FileNotFound { .. })
        ));
    }

    #[test]
    fn test_attach_filter_only_touches_target_entry() {
        let mut project = KdenliveProject::parse(PROJECT).unwrap();
        let entries = project.timeline_entries("main_bin");
        let keyframes = KeyframePair::new(
            "0",
            &Rect::new(0.0, 0.0, 1920.0, 1440.0),
            "125",
            &Rect::new(0.0, 0.0, 2112.0, 1584.0),
        );

        project
            .attach_filter(entries[0].location, &Filter::qtblend(10, &keyframes))
            .unwrap();

        let after = project.timeline_entries("main_bin");
        assert!(after[0].has_filter);
        assert!(!after[1].has_filter);
        assert!(!after[2].has_filter);
        assert_eq!(project.entry_filters(entries[0].location).len(), 1);
        assert_eq!(project.entry_filters(entries[0].location)[0].id, "10");
    }

    #[test]
    fn test_attach_filter_rejects_bad_location() {
        let mut project = KdenliveProject::parse(PROJECT).unwrap();
        let keyframes = KeyframePair::new(
            "0",
            &Rect::new(0.0, 0.0, 1.0, 1.0),
            "1",
            &Rect::new(0.0, 0.0, 1.0, 1.0),
        );
        let result = project.attach_filter(
            EntryLocation {
                playlist: 0,
                entry: 0,
            },
            &Filter::qtblend(10, &keyframes),
        );
        assert!(result.is_err());
    }
}
