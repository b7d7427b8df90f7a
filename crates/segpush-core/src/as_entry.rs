use serde::{Deserialize, Serialize};

use crate::addr::IA;
use crate::descriptor::AsEntryDescriptor;
use crate::error::CoreError;
use crate::hop_field::{HopField, IfId, HOP_FIELD_LEN};
use crate::policy::SegmentPolicy;

/// One hop of an AS entry, together with the links it connects.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HopEntry {
    /// AS on the ingress side (`0-0` at the segment's start).
    pub in_ia: IA,
    pub remote_in_if: IfId,
    pub in_mtu: u16,
    /// AS on the egress side (`0-0` at the segment's end).
    pub out_ia: IA,
    pub remote_out_if: IfId,
    pub raw_hop_field: [u8; HOP_FIELD_LEN],
}

impl HopEntry {
    pub fn hop_field(&self) -> Result<HopField, CoreError> {
        HopField::decode(&self.raw_hop_field)
    }

    fn write_canonical(&self, out: &mut Vec<u8>) {
        out.extend_from_slice(&self.in_ia.to_int().to_be_bytes());
        out.extend_from_slice(&self.remote_in_if.value().to_be_bytes());
        out.extend_from_slice(&self.in_mtu.to_be_bytes());
        out.extend_from_slice(&self.out_ia.to_int().to_be_bytes());
        out.extend_from_slice(&self.remote_out_if.value().to_be_bytes());
        out.extend_from_slice(&self.raw_hop_field);
    }
}

/// One AS's contribution to a path segment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AsEntry {
    pub ia: IA,
    /// Ordered hops. Descriptors currently produce exactly one.
    pub hop_entries: Vec<HopEntry>,
    pub mtu: u16,
    pub cert_ver: u64,
    pub trc_ver: u64,
}

impl AsEntry {
    /// Build an AS entry from its descriptor.
    ///
    /// Every identifier in the descriptor is parsed before anything is
    /// assembled, so a malformed one never yields a partial entry.
    pub fn build(desc: &AsEntryDescriptor, policy: &SegmentPolicy) -> Result<Self, CoreError> {
        let ia: IA = desc.ia.parse()?;
        let in_ia: IA = desc.hop.in_ia.parse()?;
        let out_ia: IA = desc.hop.out_ia.parse()?;
        let in_if = IfId::new(desc.hop.in_if)?;
        let out_if = IfId::new(desc.hop.out_if)?;

        let hop_field = HopField::new(in_if, out_if, policy.expiry);
        let hop = HopEntry {
            in_ia,
            remote_in_if: in_if,
            in_mtu: policy.mtu,
            out_ia,
            remote_out_if: out_if,
            raw_hop_field: hop_field.encode(),
        };

        let (cert_ver, trc_ver) = policy.trust_versions.resolve();
        Ok(Self {
            ia,
            hop_entries: vec![hop],
            mtu: policy.mtu,
            cert_ver,
            trc_ver,
        })
    }

    /// Canonical bytes covered by this entry's signature.
    pub fn canonical_bytes(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(27 + self.hop_entries.len() * 30);
        out.extend_from_slice(&self.ia.to_int().to_be_bytes());
        out.extend_from_slice(&self.cert_ver.to_be_bytes());
        out.extend_from_slice(&self.trc_ver.to_be_bytes());
        out.extend_from_slice(&self.mtu.to_be_bytes());
        out.push(self.hop_entries.len() as u8);
        for hop in &self.hop_entries {
            hop.write_canonical(&mut out);
        }
        out
    }
}
