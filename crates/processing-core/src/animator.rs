//! The slideshow pass: one transform filter per still-image entry.
//!
//! # Algorithm
//!
//! 1. **Profile:** read the output frame size; fail if it is unusable.
//! 2. **Walk** every playlist except the asset bin, entry by entry.
//! 3. **Resolve** the entry's producer; entries without one are blanks.
//! 4. **Skip** entries that already carry a filter, so re-runs only touch new clips.
//! 5. **Plan** the covering scale and a Ken Burns motion for the image.
//! 6. **Attach** a qtblend filter with the two keyframes and the next filter id.
//!
//! The project is mutated in memory only; callers save it once the pass
//! returns successfully.

use ksg_common::config::AnimationDefaults;
use ksg_common::KsgResult;
use ksg_project_model::filter::Filter;
use ksg_project_model::project::{EntryLocation, Frame, KdenliveProject};
use ksg_project_model::rect::KeyframePair;
use serde::Serialize;

use crate::geometry::{cover, Orientation};
use crate::ken_burns::{plan_motion, Anchor, Effect, EffectPicker, KenBurnsConfig, PanDirection};

/// Configuration for a slideshow pass.
#[derive(Debug, Clone)]
pub struct AnimatorConfig {
    /// Motion planning settings.
    pub ken_burns: KenBurnsConfig,

    /// Id given to the first generated filter; later filters count up.
    pub filter_id_base: u32,

    /// Playlist id excluded from processing.
    pub asset_bin_id: String,
}

impl Default for AnimatorConfig {
    fn default() -> Self {
        Self {
            ken_burns: KenBurnsConfig::default(),
            filter_id_base: 10,
            asset_bin_id: "main_bin".to_string(),
        }
    }
}

impl AnimatorConfig {
    /// Build and validate a configuration from application defaults.
    pub fn from_defaults(defaults: &AnimationDefaults) -> KsgResult<Self> {
        let anchors = defaults
            .anchors
            .iter()
            .map(|name| name.parse::<Anchor>())
            .collect::<KsgResult<Vec<_>>>()?;
        let pans = defaults
            .pans
            .iter()
            .map(|name| name.parse::<PanDirection>())
            .collect::<KsgResult<Vec<_>>>()?;

        let config = Self {
            ken_burns: KenBurnsConfig {
                zoom_factor: defaults.zoom_factor,
                portrait_start_multiplier: defaults.portrait_start_multiplier,
                portrait_end_multiplier: defaults.portrait_end_multiplier,
                anchors,
                pans,
            },
            filter_id_base: defaults.filter_id_base,
            asset_bin_id: defaults.asset_bin_id.clone(),
        };
        config.ken_burns.validate()?;
        Ok(config)
    }
}

/// What happened to a single entry.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum EntryOutcome {
    /// A filter was generated and attached.
    Animated {
        resource: String,
        orientation: Orientation,
        filter_id: u32,
        effect: Effect,
        keyframes: KeyframePair,
    },
    /// The entry already had a filter and was left alone.
    SkippedExisting { resource: String },
    /// The entry references no media element (blank, black track, transition).
    NoMedia { producer_id: Option<String> },
}

/// Outcome of one entry together with where it sits in the timeline.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EntryReport {
    pub playlist_id: Option<String>,
    pub location: EntryLocation,
    pub outcome: EntryOutcome,
}

/// Summary of a slideshow pass.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnimationReport {
    pub frame: Frame,
    pub entries: Vec<EntryReport>,
}

impl AnimationReport {
    pub fn animated(&self) -> usize {
        self.count(|o| matches!(o, EntryOutcome::Animated { .. }))
    }

    pub fn skipped_existing(&self) -> usize {
        self.count(|o| matches!(o, EntryOutcome::SkippedExisting { .. }))
    }

    pub fn without_media(&self) -> usize {
        self.count(|o| matches!(o, EntryOutcome::NoMedia { .. }))
    }

    fn count(&self, predicate: impl Fn(&EntryOutcome) -> bool) -> usize {
        self.entries.iter().filter(|e| predicate(&e.outcome)).count()
    }
}

/// Adds Ken Burns filters to a project.
pub struct SlideshowAnimator<P: EffectPicker> {
    config: AnimatorConfig,
    picker: P,
}

impl<P: EffectPicker> SlideshowAnimator<P> {
    pub fn new(config: AnimatorConfig, picker: P) -> Self {
        Self { config, picker }
    }

    /// Run the pass over `project`.
    pub fn run(&mut self, project: &mut KdenliveProject) -> KsgResult<AnimationReport> {
        self.run_with_progress(project, |_| {})
    }

    /// Run the pass, calling `on_entry` as soon as each entry is decided.
    pub fn run_with_progress(
        &mut self,
        project: &mut KdenliveProject,
        mut on_entry: impl FnMut(&EntryReport),
    ) -> KsgResult<AnimationReport> {
        let frame = project.profile()?;
        let frame_size = frame.size();
        tracing::debug!(
            width = frame.width,
            height = frame.height,
            root = project.root_dir().unwrap_or_default(),
            "Animating project"
        );

        let mut next_filter_id = self.config.filter_id_base;
        let mut reports = vec![];

        for entry in project.timeline_entries(&self.config.asset_bin_id) {
            let outcome = match project.media_source(&entry)? {
                None => {
                    tracing::debug!(producer = ?entry.producer_id, "Entry has no media source");
                    EntryOutcome::NoMedia {
                        producer_id: entry.producer_id.clone(),
                    }
                }
                Some(media) if entry.has_filter => {
                    tracing::debug!(resource = %media.resource, "Filter already present");
                    EntryOutcome::SkippedExisting {
                        resource: media.resource,
                    }
                }
                Some(media) => {
                    let covered = cover(media.size(), frame_size);
                    let motion = plan_motion(
                        &self.config.ken_burns,
                        frame_size,
                        &covered,
                        &mut self.picker,
                    );
                    let keyframes = KeyframePair::new(
                        entry.in_point.as_str(),
                        &motion.start,
                        entry.out_point.as_str(),
                        &motion.end,
                    );

                    let filter_id = next_filter_id;
                    next_filter_id += 1;
                    project.attach_filter(entry.location, &Filter::qtblend(filter_id, &keyframes))?;

                    tracing::debug!(
                        resource = %media.resource,
                        scale = covered.scale,
                        effect = %motion.effect,
                        rect = %keyframes.rect_property(),
                        "Attached filter {filter_id}"
                    );

                    EntryOutcome::Animated {
                        resource: media.resource,
                        orientation: covered.orientation,
                        filter_id,
                        effect: motion.effect,
                        keyframes,
                    }
                }
            };

            let report = EntryReport {
                playlist_id: entry.playlist_id,
                location: entry.location,
                outcome,
            };
            on_entry(&report);
            reports.push(report);
        }

        Ok(AnimationReport {
            frame,
            entries: reports,
        })
    }
}
