//! segpush core: path segment data model and construction.
//!
//! Turns a JSON topology description into sealed, signed path segments:
//! - [`addr`]: ISD-AS identifiers.
//! - [`hop_field`]: the 8-byte hop field encoding.
//! - [`as_entry`]: one AS's contribution to a segment.
//! - [`segment`]: segment header, signed entries and content-derived ids.
//! - [`builder`]: the `Empty -> Building -> Sealed` segment builder.
//! - [`signer`]: the seam through which entries get signed.

pub mod addr;
pub mod as_entry;
pub mod builder;
pub mod descriptor;
pub mod error;
pub mod hop_field;
pub mod policy;
pub mod segment;
pub mod signer;

pub use addr::{Asn, Isd, IA};
pub use as_entry::{AsEntry, HopEntry};
pub use builder::{build_segment, build_segments, BuildState, SegmentBuilder};
pub use descriptor::{AsEntryDescriptor, HopDescriptor, SegmentDescriptor, TopologyDescription};
pub use error::CoreError;
pub use hop_field::{ExpTime, ExpiryPolicy, HopField, IfId};
pub use policy::{SegmentPolicy, TrustVersions, UnsignedEntries};
pub use segment::{InfoField, PathSegment, SegmentId, SegmentMeta, SegmentType, SignedAsEntry};
pub use signer::{
    EntrySigner, NoSigners, NullSigner, SignAlgorithm, SignSource, SignedBlob, SignerError,
    SignerLookup,
};
