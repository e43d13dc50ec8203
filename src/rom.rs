//! ROM segment loading: placing `CODE`/`JUMPS`/`VECS` byte ranges from a
//! ROM image into the bus at power-on.
//!
//! The textual map-file format itself is out of scope (the map-file
//! parser is an external collaborator); what we own is the tuple shape
//! the parser is contracted to produce (`(name, start, end)`) and the
//! loader that consumes it.

use crate::devices::bus::Bus;
use crate::error::CoreError;

pub const ROM_BASE: u16 = 0xF000;
pub const ROM_SIZE: usize = 0x1000;

pub const CODE: &str = "CODE";
pub const JUMPS: &str = "JUMPS";
pub const VECS: &str = "VECS";

/// One `(start, end, size)` segment as the map parser is contracted to
/// hand back; `size` is derivable but kept explicit since callers may be
/// handed it directly from an already-parsed map file.
#[derive(Debug, Clone, Copy)]
pub struct SegmentSpec {
    pub name: &'static str,
    pub start: u16,
    pub end: u16,
}

impl SegmentSpec {
    pub fn size(&self) -> usize {
        usize::from(self.end - self.start) + 1
    }
}

struct Segment {
    name: &'static str,
    start: u16,
    bytes: Vec<u8>,
}

/// A loaded ROM: the CODE/JUMPS/VECS byte ranges and the address each
/// starts at, ready to be placed on the bus.
pub struct RomImage {
    segments: Vec<Segment>,
}

impl RomImage {
    /// Slice `blob` (a contiguous $F000-$FFFF image) into the segments
    /// named by `specs`: `offset = segment.start - 0xF000`.
    pub fn from_blob(blob: &[u8], specs: &[SegmentSpec]) -> Result<RomImage, CoreError> {
        if blob.len() != ROM_SIZE {
            return Err(CoreError::SegmentTooLarge {
                name: "<rom>",
                len: blob.len(),
                capacity: ROM_SIZE,
            });
        }
        let mut segments = Vec::with_capacity(specs.len());
        for spec in specs {
            let offset = usize::from(spec.start - ROM_BASE);
            let end = offset + spec.size();
            if end > blob.len() {
                return Err(CoreError::SegmentTooLarge {
                    name: spec.name,
                    len: spec.size(),
                    capacity: blob.len() - offset,
                });
            }
            segments.push(Segment {
                name: spec.name,
                start: spec.start,
                bytes: blob[offset..end].to_vec(),
            });
        }
        Ok(RomImage { segments })
    }

    /// Build a [`RomImage`] directly from already-separated segment
    /// bytes, bypassing the single-blob/offset convention. Used by
    /// `kernel::rom_image` to hand over the synthesized native kernel,
    /// whose segments are generated independently rather than sliced.
    pub(crate) fn from_segments(segments: Vec<(&'static str, u16, Vec<u8>)>) -> RomImage {
        RomImage {
            segments: segments
                .into_iter()
                .map(|(name, start, bytes)| Segment { name, start, bytes })
                .collect(),
        }
    }

    fn segment(&self, name: &str) -> Option<&Segment> {
        self.segments.iter().find(|s| s.name == name)
    }

    /// Place every segment on the bus, after confirming `CODE`, `JUMPS`,
    /// and `VECS` are all present. A missing required segment is a
    /// start-up fatal error.
    pub fn load(&self, bus: &mut Bus) -> Result<(), CoreError> {
        for required in [CODE, JUMPS, VECS] {
            if self.segment(required).is_none() {
                return Err(CoreError::MissingSegment(required));
            }
        }
        for segment in &self.segments {
            bus.load(&segment.bytes, segment.start);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_required_segment_is_rejected() {
        let rom = RomImage::from_segments(vec![(CODE, ROM_BASE, vec![0xEA; 0x0F00])]);
        let mut bus = Bus::new();
        assert!(matches!(
            rom.load(&mut bus),
            Err(CoreError::MissingSegment(JUMPS))
        ));
    }

    #[test]
    fn from_blob_slices_segments_at_the_right_offsets() {
        let mut blob = vec![0u8; ROM_SIZE];
        blob[0xFF00 - 0xF000] = 0x4C;
        let specs = [
            SegmentSpec {
                name: CODE,
                start: 0xF000,
                end: 0xFEFF,
            },
            SegmentSpec {
                name: JUMPS,
                start: 0xFF00,
                end: 0xFF11,
            },
            SegmentSpec {
                name: VECS,
                start: 0xFFFA,
                end: 0xFFFF,
            },
        ];
        let rom = RomImage::from_blob(&blob, &specs).unwrap();
        let mut bus = Bus::new();
        rom.load(&mut bus).unwrap();
        assert_eq!(bus.read(0xFF00), 0x4C);
    }
}
