use std::fmt::Display;
use std::str::FromStr;

use crate::mpd::xml::{parse_document, XmlElement};
use crate::mpd::{AdaptationSet, Mpd, Period, Representation, SegmentTemplate, TimelineEntry};
use crate::DashError;

/// Parses manifest text into an [`Mpd`].
pub fn parse_mpd(xml: &str) -> Result<Mpd, DashError> {
    let root = parse_document(xml)?;
    mpd_from_tree(&root)
}

/// Builds the manifest model from an already parsed XML tree.
pub fn mpd_from_tree(root: &XmlElement) -> Result<Mpd, DashError> {
    if root.name != "MPD" {
        return Err(DashError::manifest(format!("expected <MPD> root element, found <{}>", root.name)));
    }

    let periods = root
        .children_named("Period")
        .map(parse_period)
        .collect::<Result<Vec<_>, _>>()?;

    if periods.is_empty() {
        return Err(DashError::manifest("MPD has no Period"));
    }

    Ok(Mpd { periods })
}

fn parse_period(period: &XmlElement) -> Result<Period, DashError> {
    let adaptation_sets = period
        .children_named("AdaptationSet")
        .map(parse_adaptation_set)
        .collect::<Result<Vec<_>, _>>()?;

    Ok(Period {
        id: period.attr("id").map(str::to_string),
        adaptation_sets,
    })
}

fn parse_adaptation_set(set: &XmlElement) -> Result<AdaptationSet, DashError> {
    let representations = set
        .children_named("Representation")
        .map(parse_representation)
        .collect::<Result<Vec<_>, _>>()?;

    Ok(AdaptationSet {
        id: set.attr("id").map(str::to_string),
        mime_type: set.attr("mimeType").map(str::to_string),
        representations,
        segment_template: set.first_child("SegmentTemplate").map(parse_segment_template).transpose()?,
    })
}

fn parse_representation(rep: &XmlElement) -> Result<Representation, DashError> {
    let id = rep
        .attr("id")
        .ok_or_else(|| DashError::manifest("Representation without id"))?
        .to_string();

    Ok(Representation {
        width: parse_attr(rep, "width")?,
        bandwidth: parse_attr(rep, "bandwidth")?,
        segment_template: rep.first_child("SegmentTemplate").map(parse_segment_template).transpose()?,
        id,
    })
}

fn parse_segment_template(template: &XmlElement) -> Result<SegmentTemplate, DashError> {
    let timeline = match template.first_child("SegmentTimeline") {
        Some(timeline) => timeline
            .children_named("S")
            .map(parse_timeline_entry)
            .collect(),
        None => Vec::new(),
    };

    Ok(SegmentTemplate {
        media: template.attr("media").map(str::to_string),
        start_number: parse_attr(template, "startNumber")?,
        timeline,
    })
}

fn parse_timeline_entry(entry: &XmlElement) -> TimelineEntry {
    TimelineEntry {
        start_time: entry.attr("t").map(str::to_string),
    }
}

fn parse_attr<T>(element: &XmlElement, name: &str) -> Result<Option<T>, DashError>
where
    T: FromStr,
    T::Err: Display,
{
    element
        .attr(name)
        .map(|value| {
            value.trim().parse::<T>().map_err(|e| {
                DashError::manifest(format!("invalid {}@{} '{}': {}", element.name, name, value, e))
            })
        })
        .transpose()
}
