//! Segment construction.
//!
//! A builder moves through `Empty -> Building -> Sealed`. Entries are signed
//! as they are appended, each signature covering the header and everything
//! appended before it.

use std::fmt;

use crate::addr::IA;
use crate::as_entry::AsEntry;
use crate::descriptor::{AsEntryDescriptor, SegmentDescriptor, TopologyDescription};
use crate::error::CoreError;
use crate::policy::{SegmentPolicy, UnsignedEntries};
use crate::segment::{InfoField, PathSegment, SegmentMeta, SegmentType, SignedAsEntry};
use crate::signer::{EntrySigner, SignedBlob, SignerLookup};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuildState {
    /// No entry appended yet.
    Empty,
    /// At least one entry appended.
    Building,
    /// Complete; no further appends.
    Sealed,
}

impl fmt::Display for BuildState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Empty => write!(f, "Empty"),
            Self::Building => write!(f, "Building"),
            Self::Sealed => write!(f, "Sealed"),
        }
    }
}

/// Accumulates signed AS entries into one path segment.
#[derive(Debug)]
pub struct SegmentBuilder {
    segment: PathSegment,
    seg_type: SegmentType,
    state: BuildState,
}

impl SegmentBuilder {
    pub fn new(info: InfoField, seg_type: SegmentType) -> Self {
        Self {
            segment: PathSegment::new(info),
            seg_type,
            state: BuildState::Empty,
        }
    }

    /// Builder whose header follows `policy`, stamped with the current time.
    ///
    /// The hop count is the descriptor's `nb_hops` as declared; it is not
    /// checked against the number of entries.
    pub fn for_descriptor(
        desc: &SegmentDescriptor,
        policy: &SegmentPolicy,
    ) -> Result<Self, CoreError> {
        let info = InfoField {
            cons_dir: policy.cons_dir,
            shortcut: policy.shortcut,
            peer: policy.peer,
            timestamp: InfoField::timestamp_from_unix(chrono::Utc::now().timestamp())?,
            isd: desc.dst_isd,
            hops: desc.nb_hops,
        };
        Ok(Self::new(info, policy.segment_type))
    }

    pub fn state(&self) -> BuildState {
        self.state
    }

    pub fn len(&self) -> usize {
        self.segment.len()
    }

    pub fn is_empty(&self) -> bool {
        self.segment.is_empty()
    }

    /// Build, sign and append one AS entry.
    ///
    /// `signer` is `None` when no signer is loaded for the entry's domain;
    /// `policy.unsigned_entries` decides whether that is acceptable. On error
    /// the builder is left exactly as it was.
    pub fn append(
        &mut self,
        desc: &AsEntryDescriptor,
        signer: Option<&dyn EntrySigner>,
        policy: &SegmentPolicy,
    ) -> Result<(), CoreError> {
        if self.state == BuildState::Sealed {
            return Err(CoreError::SegmentAlreadySealed);
        }

        let entry = AsEntry::build(desc, policy)?;
        let payload = self.segment.signing_payload(&entry);
        let sign = match signer {
            Some(signer) => signer
                .sign(&payload)
                .map_err(|e| CoreError::SigningUnavailable {
                    ia: entry.ia,
                    reason: e.to_string(),
                })?,
            None => match policy.unsigned_entries {
                UnsignedEntries::Allow => {
                    tracing::warn!(ia = %entry.ia, "no signer loaded, appending unsigned AS entry");
                    SignedBlob::unsigned()
                }
                UnsignedEntries::Reject => {
                    return Err(CoreError::SigningUnavailable {
                        ia: entry.ia,
                        reason: "no signer loaded for this AS".into(),
                    });
                }
            },
        };

        tracing::trace!(
            ia = %entry.ia,
            index = self.segment.len(),
            signed = sign.is_signed(),
            "AS entry appended"
        );
        self.segment.push(SignedAsEntry { entry, sign });
        self.state = BuildState::Building;
        Ok(())
    }

    /// Declare the segment complete and hand out the finished segment.
    pub fn seal(&mut self) -> Result<SegmentMeta, CoreError> {
        if self.state == BuildState::Sealed {
            return Err(CoreError::SegmentAlreadySealed);
        }
        self.state = BuildState::Sealed;
        Ok(SegmentMeta {
            seg_type: self.seg_type,
            segment: self.segment.clone(),
        })
    }
}

/// Build one sealed segment from its descriptor.
pub fn build_segment(
    desc: &SegmentDescriptor,
    signers: &dyn SignerLookup,
    policy: &SegmentPolicy,
) -> Result<SegmentMeta, CoreError> {
    let mut builder = SegmentBuilder::for_descriptor(desc, policy)?;
    for entry in &desc.as_entries {
        let ia: IA = entry.ia.parse()?;
        builder.append(entry, signers.resolve(&ia), policy)?;
    }

    if desc.nb_hops as usize != desc.as_entries.len() {
        tracing::warn!(
            declared = desc.nb_hops,
            entries = desc.as_entries.len(),
            "declared hop count differs from the number of AS entries"
        );
    }

    let meta = builder.seal()?;
    tracing::debug!(
        segment = %meta.logging_id(),
        entries = meta.segment.len(),
        hops = meta.segment.info.hops,
        "segment built"
    );
    Ok(meta)
}

/// Build every segment of a topology, stopping at the first failure.
pub fn build_segments(
    topology: &TopologyDescription,
    signers: &dyn SignerLookup,
    policy: &SegmentPolicy,
) -> Result<Vec<SegmentMeta>, CoreError> {
    let mut segments = Vec::with_capacity(topology.segments.len());
    for (index, desc) in topology.segments.iter().enumerate() {
        let meta = build_segment(desc, signers, policy).map_err(|e| {
            tracing::error!(index, src_as = %desc.src_as, dst_as = %desc.dst_as, error = %e, "segment construction aborted");
            e
        })?;
        segments.push(meta);
    }
    Ok(segments)
}
