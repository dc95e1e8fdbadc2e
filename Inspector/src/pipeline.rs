use std::fs;
use std::path::Path;

use dash_player::{resolve_segment, SegmentSource, TemplateBinding};
use mp4_box::boxes::emsg::EmsgBox;
use mp4_box::reader::extract_emsg_boxes;
use tracing::{debug, info, instrument};
use url::Url;

use crate::metadata::{filter_message_data, FilteredMetadata};
use crate::InspectorError;

/// One decoded `emsg` box and the metadata reported for it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmsgEvent {
    pub record: EmsgBox,
    pub metadata: FilteredMetadata,
}

/// Outcome of inspecting a single segment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SegmentReport {
    /// Where the segment came from, when it was downloaded.
    pub segment_url: Option<Url>,
    /// Number of top-level boxes in the segment.
    pub box_count: usize,
    /// Events in file order, empty when the segment has no `emsg` box.
    pub events: Vec<EmsgEvent>,
}

/// Walks the top-level boxes of a segment and decodes its `emsg` boxes.
pub fn inspect_segment(data: &[u8]) -> Result<SegmentReport, mp4_box::Mp4Error> {
    let scan = extract_emsg_boxes(data)?;
    debug!("Segment holds {} top-level boxes, {} emsg", scan.box_count, scan.emsg_boxes.len());

    let events = scan
        .emsg_boxes
        .into_iter()
        .map(|record| {
            debug!("Decoded emsg box: {:?}", record);
            let metadata = filter_message_data(&record.message_data);
            EmsgEvent { record, metadata }
        })
        .collect();

    Ok(SegmentReport {
        segment_url: None,
        box_count: scan.box_count,
        events,
    })
}

/// Reads a segment stored on disk.
pub fn inspect_file(path: &Path) -> Result<SegmentReport, InspectorError> {
    let data = fs::read(path).map_err(|source| InspectorError::Io {
        path: path.display().to_string(),
        source,
    })?;

    inspect_segment(&data).map_err(|source| InspectorError::Segment {
        location: path.display().to_string(),
        source,
    })
}

/// Resolves a manifest to a segment and reports the segment's events.
pub struct Inspector<S: SegmentSource> {
    source: S,
    binding: TemplateBinding,
}

impl<S: SegmentSource> Inspector<S> {
    pub fn new(source: S, binding: TemplateBinding) -> Self {
        Self { source, binding }
    }

    #[instrument(skip(self), fields(binding = ?self.binding))]
    pub async fn inspect_manifest(&self, manifest_url: &str) -> Result<SegmentReport, InspectorError> {
        let manifest_url = parse_manifest_url(manifest_url)?;

        let mpd = self.source.fetch_manifest(&manifest_url).await?;
        let segment = resolve_segment(&mpd, &manifest_url, self.binding)?;
        info!("Fetching segment from URL: {}", segment.url);

        let data = self.source.fetch(&segment.url).await?;
        let mut report = inspect_segment(&data).map_err(|source| InspectorError::Segment {
            location: segment.url.to_string(),
            source,
        })?;
        report.segment_url = Some(segment.url);
        Ok(report)
    }
}

fn parse_manifest_url(manifest_url: &str) -> Result<Url, InspectorError> {
    let url = Url::parse(manifest_url).map_err(|e| InspectorError::InvalidManifestUrl {
        url: manifest_url.to_string(),
        reason: e.to_string(),
    })?;

    match url.scheme() {
        "http" | "https" => Ok(url),
        scheme => Err(InspectorError::InvalidManifestUrl {
            url: manifest_url.to_string(),
            reason: format!("unsupported scheme '{}'", scheme),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use bytes::Bytes;
    use dash_player::DashError;
    use mp4_box::boxes::{emsg::EmsgTiming, generic::Mp4Box};
    use mp4_box::Mp4Error;
    use std::collections::HashMap;
    use std::sync::Mutex;

    const MANIFEST_URL: &str = "http://origin.test/live/manifest.mpd";

    const MANIFEST: &str = r#"<?xml version="1.0"?>
<MPD xmlns="urn:mpeg:dash:schema:mpd:2011" type="dynamic">
  <Period id="0">
    <AdaptationSet mimeType="audio/mp4">
      <SegmentTemplate media="audio-$Time$.m4s"><SegmentTimeline><S t="5" d="10"/></SegmentTimeline></SegmentTemplate>
      <Representation id="audio" bandwidth="64000"/>
    </AdaptationSet>
    <AdaptationSet mimeType="video/mp4">
      <SegmentTemplate media="chunk-$RepresentationID$-$Time$.m4s" timescale="90000">
        <SegmentTimeline><S t="0" d="180000" r="10"/></SegmentTimeline>
      </SegmentTemplate>
      <Representation id="1" width="1280"/>
      <Representation id="2" width="640"/>
      <Representation id="3" width="960"/>
    </AdaptationSet>
  </Period>
</MPD>"#;

    #[derive(Default)]
    struct MemorySource {
        resources: HashMap<String, Bytes>,
        requested: Mutex<Vec<String>>,
    }

    impl MemorySource {
        fn with(mut self, url: &str, data: impl Into<Bytes>) -> Self {
            self.resources.insert(url.to_string(), data.into());
            self
        }
    }

    #[async_trait]
    impl SegmentSource for MemorySource {
        async fn fetch(&self, url: &Url) -> Result<Bytes, DashError> {
            self.requested.lock().unwrap().push(url.to_string());
            self.resources.get(url.as_str()).cloned().ok_or_else(|| DashError::Transport {
                url: url.to_string(),
                status: 404,
                reason: "Not Found".to_string(),
            })
        }
    }

    fn emsg(version: u8, message: &[u8]) -> Vec<u8> {
        let emsg = EmsgBox {
            flags: 0,
            scheme_id_uri: "urn:example:events".into(),
            value: "1".into(),
            timescale: 90000,
            timing: if version == 0 {
                EmsgTiming::PresentationTimeDelta(0)
            } else {
                EmsgTiming::PresentationTime(900000)
            },
            event_duration: 0xFFFF_FFFF,
            id: 12,
            message_data: message.to_vec(),
        };
        let mut buffer = Vec::new();
        emsg.write_box(&mut buffer);
        buffer
    }

    fn segment(emsg_boxes: &[Vec<u8>]) -> Vec<u8> {
        let mut data = vec![0, 0, 0, 16, b's', b't', b'y', b'p', b'm', b's', b'd', b'h', 0, 0, 0, 0];
        for emsg_box in emsg_boxes {
            data.extend_from_slice(emsg_box);
        }
        data.extend_from_slice(&[0, 0, 0, 12, b'm', b'd', b'a', b't', 1, 2, 3, 4]);
        data
    }

    #[test]
    fn reports_filtered_events() {
        let data = segment(&[emsg(0, b"p.id=42,p.ev=splice,x.unknown=9")]);
        let report = inspect_segment(&data).unwrap();

        assert_eq!(report.box_count, 3);
        assert_eq!(report.events.len(), 1);
        let event = &report.events[0];
        assert_eq!(event.record.presentation_time_delta(), Some(0));
        assert!(event.record.is_duration_unknown());
        assert_eq!(
            serde_json::to_string(&event.metadata).unwrap(),
            r#"{"p.id":"42","p.ev":"splice"}"#
        );
    }

    #[test]
    fn segment_without_emsg_is_not_an_error() {
        let report = inspect_segment(&segment(&[])).unwrap();
        assert_eq!(report.box_count, 2);
        assert!(report.events.is_empty());
    }

    #[test]
    fn broken_emsg_aborts_the_segment() {
        let mut data = segment(&[emsg(1, b"p.id=1")]);
        // bump the version byte of the emsg box to 2
        data[16 + 8] = 2;
        assert!(matches!(
            inspect_segment(&data),
            Err(Mp4Error::UnsupportedVersion { version: 2, .. })
        ));

        let mut data = segment(&[]);
        data.truncate(data.len() - 2);
        assert!(matches!(inspect_segment(&data), Err(Mp4Error::MalformedContainer { offset: 16, .. })));
    }

    #[tokio::test]
    async fn resolves_manifest_and_reads_events() {
        let source = MemorySource::default()
            .with(MANIFEST_URL, MANIFEST)
            .with(
                "http://origin.test/live/chunk-2-0.m4s",
                segment(&[emsg(0, b"p.id=42,p.ev=splice"), emsg(1, b"c.up=1,p.tz=CET")]),
            );
        let inspector = Inspector::new(source, TemplateBinding::Owning);

        let report = inspector.inspect_manifest(MANIFEST_URL).await.unwrap();
        assert_eq!(
            report.segment_url.as_ref().map(Url::as_str),
            Some("http://origin.test/live/chunk-2-0.m4s")
        );
        assert_eq!(report.events.len(), 2);
        assert_eq!(report.events[0].metadata.get("p.ev"), Some("splice"));
        assert_eq!(report.events[1].record.presentation_time(), Some(900000));
        assert_eq!(report.events[1].metadata.get("p.tz"), Some("CET"));

        let requested = inspector.source.requested.lock().unwrap().clone();
        assert_eq!(requested, vec![MANIFEST_URL.to_string(), "http://origin.test/live/chunk-2-0.m4s".to_string()]);
    }

    #[tokio::test]
    async fn transport_failure_stops_before_box_parsing() {
        let source = MemorySource::default().with(MANIFEST_URL, MANIFEST);
        let inspector = Inspector::new(source, TemplateBinding::Owning);

        match inspector.inspect_manifest(MANIFEST_URL).await {
            Err(InspectorError::Dash(DashError::Transport { url, status, .. })) => {
                assert_eq!(url, "http://origin.test/live/chunk-2-0.m4s");
                assert_eq!(status, 404);
            }
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[tokio::test]
    async fn manifest_errors_are_reported() {
        let source = MemorySource::default().with(MANIFEST_URL, "<MPD><Period>");
        let inspector = Inspector::new(source, TemplateBinding::Owning);
        assert!(matches!(
            inspector.inspect_manifest(MANIFEST_URL).await,
            Err(InspectorError::Dash(DashError::ManifestParse(_)))
        ));

        let audio_only = MANIFEST.replace("video/mp4", "video/webm");
        let source = MemorySource::default().with(MANIFEST_URL, audio_only);
        let inspector = Inspector::new(source, TemplateBinding::Owning);
        assert!(matches!(
            inspector.inspect_manifest(MANIFEST_URL).await,
            Err(InspectorError::Dash(DashError::NoVideoRepresentation))
        ));
    }

    #[tokio::test]
    async fn malformed_segment_names_the_url() {
        let source = MemorySource::default()
            .with(MANIFEST_URL, MANIFEST)
            .with("http://origin.test/live/chunk-2-0.m4s", vec![0, 0, 0, 64, b'm', b'o', b'o', b'f']);
        let inspector = Inspector::new(source, TemplateBinding::Owning);

        match inspector.inspect_manifest(MANIFEST_URL).await {
            Err(InspectorError::Segment { location, source }) => {
                assert_eq!(location, "http://origin.test/live/chunk-2-0.m4s");
                assert!(matches!(source, Mp4Error::MalformedContainer { offset: 0, .. }));
            }
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[tokio::test]
    async fn rejects_non_http_manifest_urls() {
        let inspector = Inspector::new(MemorySource::default(), TemplateBinding::Owning);
        for url in ["ftp://origin.test/manifest.mpd", "not a url"] {
            assert!(matches!(
                inspector.inspect_manifest(url).await,
                Err(InspectorError::InvalidManifestUrl { .. })
            ));
        }
        assert!(inspector.source.requested.lock().unwrap().is_empty());
    }

    #[test]
    fn reads_segments_from_disk() {
        let path = std::env::temp_dir().join(format!("emsg-inspector-{}.m4s", std::process::id()));
        fs::write(&path, segment(&[emsg(0, b"f.id=abc")])).unwrap();
        let report = inspect_file(&path).unwrap();
        fs::remove_file(&path).unwrap();

        assert_eq!(report.segment_url, None);
        assert_eq!(report.events[0].metadata.get("f.id"), Some("abc"));

        assert!(matches!(inspect_file(&path), Err(InspectorError::Io { .. })));
    }
}
