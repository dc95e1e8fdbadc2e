//! Picks the lowest-width video representation of a manifest and builds the URL of its first
//! segment.
//!
//! Only the first Period is considered, multi-period manifests are not walked.

use std::sync::LazyLock;

use regex::Regex;
use tracing::debug;
use url::Url;

use crate::mpd::{AdaptationSet, Mpd, Representation, SegmentTemplate};
use crate::DashError;

/// `$$` or a template identifier with an optional `%0<width>d` format tag.
static IDENTIFIER_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\$\$|\$(RepresentationID|Number|Bandwidth|Time)(?:%0(\d+)d)?\$")
        .expect("valid template identifier pattern")
});

/// Which SegmentTemplate addresses the selected representation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum TemplateBinding {
    /// The representation's own template, else the one of the adaptation set that owns it.
    #[default]
    Owning,
    /// The template of the first `video/mp4` adaptation set, whichever set the selected
    /// representation belongs to.
    FirstVideoSet,
}

/// The segment chosen for a manifest.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedSegment {
    /// Absolute segment URL.
    pub url: Url,
    /// Expanded media template, before resolution against the manifest URL.
    pub media: String,
    pub representation_id: String,
    pub width: Option<u32>,
    /// Start time of the first timeline entry as written in the manifest, "0" when absent.
    pub start_time: String,
}

/// Values substituted into a media template.
#[derive(Debug, Clone, Copy)]
pub struct TemplateValues<'a> {
    pub representation_id: &'a str,
    /// Substituted verbatim, zero padded when the identifier carries a format tag.
    pub time: &'a str,
    pub number: u64,
    pub bandwidth: Option<u64>,
}

pub fn resolve_segment(
    mpd: &Mpd,
    manifest_url: &Url,
    binding: TemplateBinding,
) -> Result<ResolvedSegment, DashError> {
    let period = mpd
        .periods
        .first()
        .ok_or_else(|| DashError::manifest("MPD has no Period"))?;
    if mpd.periods.len() > 1 {
        debug!("Manifest has {} periods, only the first one is used", mpd.periods.len());
    }

    let video_sets: Vec<(usize, &AdaptationSet)> = period
        .adaptation_sets
        .iter()
        .enumerate()
        .filter(|(_, set)| set.is_video_mp4())
        .collect();

    let (set_index, owner, representation) = select_lowest_width(&video_sets)?;
    debug!(
        "Selected representation {} (width {:?}) out of {} video adaptation set(s)",
        representation.id,
        representation.width,
        video_sets.len()
    );

    let (template, source) = match binding {
        TemplateBinding::Owning => match (&representation.segment_template, &owner.segment_template) {
            (Some(own), Some(parent)) => (Some(own.inherit_from(parent)), format!("Representation id={}", representation.id)),
            (Some(own), None) => (Some(own.clone()), format!("Representation id={}", representation.id)),
            (None, parent) => (parent.clone(), owner.label(set_index)),
        },
        TemplateBinding::FirstVideoSet => {
            let (first_index, first) = video_sets[0];
            (first.segment_template.clone(), first.label(first_index))
        }
    };

    let template: SegmentTemplate = template.ok_or_else(|| DashError::NoSegmentTemplate(source.clone()))?;
    let media = template
        .media
        .as_deref()
        .ok_or_else(|| DashError::NoSegmentTemplate(format!("{} has no media attribute", source)))?;
    let first_entry = template
        .timeline
        .first()
        .ok_or_else(|| DashError::NoTimelineEntry(source.clone()))?;
    let start_time = first_entry.start_time.clone().unwrap_or_else(|| "0".to_string());

    let media = expand_media_template(
        media,
        &TemplateValues {
            representation_id: &representation.id,
            time: &start_time,
            number: template.start_number.unwrap_or(1),
            bandwidth: representation.bandwidth,
        },
    );

    let url = manifest_url.join(&media).map_err(|e| DashError::InvalidUrl {
        url: media.clone(),
        reason: e.to_string(),
    })?;

    Ok(ResolvedSegment {
        url,
        media,
        representation_id: representation.id.clone(),
        width: representation.width,
        start_time,
    })
}

/// Smallest width wins, ties go to the first representation in document order.
/// Representations without a width come after all others.
fn select_lowest_width<'a>(
    video_sets: &[(usize, &'a AdaptationSet)],
) -> Result<(usize, &'a AdaptationSet, &'a Representation), DashError> {
    video_sets
        .iter()
        .flat_map(|&(index, set)| set.representations.iter().map(move |rep| (index, set, rep)))
        .min_by_key(|(_, _, rep)| match rep.width {
            Some(width) => (false, width),
            None => (true, 0),
        })
        .ok_or(DashError::NoVideoRepresentation)
}

/// Substitutes the DASH template identifiers of a media URL.
///
/// The template is scanned once, so substituted values are never expanded again and `$$`
/// always stands for a literal `$`. Identifiers without a value are left untouched.
pub fn expand_media_template(template: &str, values: &TemplateValues) -> String {
    IDENTIFIER_PATTERN
        .replace_all(template, |caps: &regex::Captures| {
            let Some(identifier) = caps.get(1) else {
                return "$".to_string();
            };
            let width = caps
                .get(2)
                .and_then(|width| width.as_str().parse::<usize>().ok())
                .unwrap_or(0);

            match identifier.as_str() {
                "RepresentationID" => values.representation_id.to_string(),
                "Time" => format!("{:0>width$}", values.time, width = width),
                "Number" => format!("{:0width$}", values.number, width = width),
                "Bandwidth" => match values.bandwidth {
                    Some(bandwidth) => format!("{:0width$}", bandwidth, width = width),
                    None => caps[0].to_string(),
                },
                _ => caps[0].to_string(),
            }
        })
        .into_owned()
}
