//! Packed leaf-position codec
//!
//! Delivery rows carry collimator leaf positions as one packed binary
//! field: a fixed-stride array of signed integers per control point, two
//! values per leaf pair (bank A, then bank B), all sharing one element
//! width and one byte order declared by the source system. This module
//! decodes that field into [`LeafPair`] sequences and encodes them back.
//!
//! Positions pass through verbatim, in source units. Unit conversion would
//! silently change clinical values, so none happens anywhere in the
//! pipeline.

use crate::domain::record::LeafPair;
use crate::domain::{AegisError, Result};
use std::str::FromStr;

/// Byte order of packed leaf elements.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ByteOrder {
    Little,
    Big,
}

impl FromStr for ByteOrder {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "little" => Ok(Self::Little),
            "big" => Ok(Self::Big),
            other => Err(format!(
                "Byte order must be \"little\" or \"big\", got \"{other}\""
            )),
        }
    }
}

/// Element width of packed leaf positions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ElementWidth {
    Two,
    Four,
}

impl ElementWidth {
    fn bytes(self) -> usize {
        match self {
            Self::Two => 2,
            Self::Four => 4,
        }
    }
}

/// Fixed-stride codec for one source system's packed leaf-position fields.
///
/// # Examples
///
/// ```
/// use aegis::core::synthesis::leaf::{ByteOrder, LeafCodec};
///
/// # fn example() -> aegis::domain::Result<()> {
/// let codec = LeafCodec::new(2, 2, ByteOrder::Little)?;
/// // Two control points, two leaf pairs each.
/// let blob = [5u8, 0, 251, 255, 10, 0, 246, 255, 0, 0, 0, 0, 1, 0, 255, 255];
/// let points = codec.decode(&blob)?;
/// assert_eq!(points.len(), 2);
/// assert_eq!(points[0][0].bank_a, 5);
/// assert_eq!(points[0][0].bank_b, -5);
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, Copy)]
pub struct LeafCodec {
    leaf_pairs: usize,
    width: ElementWidth,
    byte_order: ByteOrder,
}

impl LeafCodec {
    /// Creates a codec for the given geometry.
    ///
    /// # Arguments
    ///
    /// * `leaf_pairs` - Leaf pairs per control point, at least 1
    /// * `element_width` - Bytes per position element, 2 or 4
    /// * `byte_order` - Byte order of every element
    pub fn new(leaf_pairs: usize, element_width: usize, byte_order: ByteOrder) -> Result<Self> {
        if leaf_pairs == 0 {
            return Err(AegisError::Configuration(
                "Leaf codec needs at least one leaf pair".to_string(),
            ));
        }
        let width = match element_width {
            2 => ElementWidth::Two,
            4 => ElementWidth::Four,
            other => {
                return Err(AegisError::Configuration(format!(
                    "Leaf element width must be 2 or 4, got {other}"
                )));
            }
        };
        Ok(Self {
            leaf_pairs,
            width,
            byte_order,
        })
    }

    /// Bytes occupied by one control point's leaf array.
    pub fn stride(&self) -> usize {
        self.leaf_pairs * 2 * self.width.bytes()
    }

    /// Leaf pairs per control point.
    pub fn leaf_pairs(&self) -> usize {
        self.leaf_pairs
    }

    /// Decodes a packed field into per-control-point leaf pair sequences.
    ///
    /// The field length must be an exact multiple of [`stride`]; anything
    /// else is a malformed record, never a silent truncation.
    ///
    /// [`stride`]: Self::stride
    pub fn decode(&self, blob: &[u8]) -> Result<Vec<Vec<LeafPair>>> {
        let stride = self.stride();
        if blob.len() % stride != 0 {
            return Err(AegisError::MalformedRecord(format!(
                "Packed leaf field of {} bytes is not a multiple of the {}-byte stride \
                 ({} pairs x 2 x {} bytes)",
                blob.len(),
                stride,
                self.leaf_pairs,
                self.width.bytes()
            )));
        }

        let element = self.width.bytes();
        let mut points = Vec::with_capacity(blob.len() / stride);
        for array in blob.chunks_exact(stride) {
            let mut pairs = Vec::with_capacity(self.leaf_pairs);
            for pair_index in 0..self.leaf_pairs {
                let offset = pair_index * 2 * element;
                let bank_a = self.read_element(&array[offset..offset + element]);
                let bank_b = self.read_element(&array[offset + element..offset + 2 * element]);
                pairs.push(LeafPair::new(bank_a, bank_b));
            }
            points.push(pairs);
        }
        Ok(points)
    }

    /// Encodes per-control-point leaf pair sequences back into the packed
    /// form. The inverse of [`decode`]; round-trips byte-for-byte.
    ///
    /// [`decode`]: Self::decode
    pub fn encode(&self, points: &[Vec<LeafPair>]) -> Result<Vec<u8>> {
        let mut out = Vec::with_capacity(points.len() * self.stride());
        for (index, pairs) in points.iter().enumerate() {
            if pairs.len() != self.leaf_pairs {
                return Err(AegisError::MalformedRecord(format!(
                    "Control point {} has {} leaf pairs, expected {}",
                    index,
                    pairs.len(),
                    self.leaf_pairs
                )));
            }
            for pair in pairs {
                self.write_element(pair.bank_a, &mut out)?;
                self.write_element(pair.bank_b, &mut out)?;
            }
        }
        Ok(out)
    }

    fn read_element(&self, bytes: &[u8]) -> i32 {
        match (self.width, self.byte_order) {
            (ElementWidth::Two, ByteOrder::Little) => {
                i16::from_le_bytes([bytes[0], bytes[1]]) as i32
            }
            (ElementWidth::Two, ByteOrder::Big) => i16::from_be_bytes([bytes[0], bytes[1]]) as i32,
            (ElementWidth::Four, ByteOrder::Little) => {
                i32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]])
            }
            (ElementWidth::Four, ByteOrder::Big) => {
                i32::from_be_bytes([bytes[0], bytes[1], bytes[2], bytes[3]])
            }
        }
    }

    fn write_element(&self, value: i32, out: &mut Vec<u8>) -> Result<()> {
        match self.width {
            ElementWidth::Two => {
                let narrow = i16::try_from(value).map_err(|_| {
                    AegisError::MalformedRecord(format!(
                        "Leaf position {value} does not fit a 2-byte element"
                    ))
                })?;
                match self.byte_order {
                    ByteOrder::Little => out.extend_from_slice(&narrow.to_le_bytes()),
                    ByteOrder::Big => out.extend_from_slice(&narrow.to_be_bytes()),
                }
            }
            ElementWidth::Four => match self.byte_order {
                ByteOrder::Little => out.extend_from_slice(&value.to_le_bytes()),
                ByteOrder::Big => out.extend_from_slice(&value.to_be_bytes()),
            },
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    fn codec(pairs: usize, width: usize, order: ByteOrder) -> LeafCodec {
        LeafCodec::new(pairs, width, order).unwrap()
    }

    #[test_case(60, 2 => 240 ; "sixty pairs two bytes")]
    #[test_case(60, 4 => 480 ; "sixty pairs four bytes")]
    #[test_case(1, 2 => 4 ; "single pair")]
    #[test_case(80, 2 => 320 ; "eighty pairs")]
    fn stride(pairs: usize, width: usize) -> usize {
        codec(pairs, width, ByteOrder::Little).stride()
    }

    #[test]
    fn rejects_invalid_geometry() {
        assert!(LeafCodec::new(0, 2, ByteOrder::Little).is_err());
        assert!(LeafCodec::new(60, 3, ByteOrder::Little).is_err());
        assert!(LeafCodec::new(60, 8, ByteOrder::Little).is_err());
    }

    #[test]
    fn byte_order_parses() {
        assert_eq!(ByteOrder::from_str("little"), Ok(ByteOrder::Little));
        assert_eq!(ByteOrder::from_str("big"), Ok(ByteOrder::Big));
        assert!(ByteOrder::from_str("network").is_err());
    }

    #[test]
    fn decode_two_byte_little_endian() {
        let codec = codec(2, 2, ByteOrder::Little);
        // One control point: pairs (5, -5) and (10, -10).
        let blob = [5u8, 0, 251, 255, 10, 0, 246, 255];
        let points = codec.decode(&blob).unwrap();
        assert_eq!(points.len(), 1);
        assert_eq!(
            points[0],
            vec![LeafPair::new(5, -5), LeafPair::new(10, -10)]
        );
    }

    #[test]
    fn decode_four_byte_big_endian() {
        let codec = codec(1, 4, ByteOrder::Big);
        let blob = [0u8, 0, 0, 100, 255, 255, 255, 156];
        let points = codec.decode(&blob).unwrap();
        assert_eq!(points[0], vec![LeafPair::new(100, -100)]);
    }

    #[test]
    fn decode_splits_control_points() {
        let codec = codec(1, 2, ByteOrder::Little);
        // Three control points of one pair each.
        let blob = [1u8, 0, 2, 0, 3, 0, 4, 0, 5, 0, 6, 0];
        let points = codec.decode(&blob).unwrap();
        assert_eq!(points.len(), 3);
        assert_eq!(points[1], vec![LeafPair::new(3, 4)]);
    }

    #[test_case(1 ; "one byte over")]
    #[test_case(7 ; "one byte short of a point")]
    #[test_case(9 ; "partial second point")]
    fn decode_rejects_misaligned_input(extra: usize) {
        let codec = codec(2, 2, ByteOrder::Little);
        let blob = vec![0u8; codec.stride() + extra];
        let err = codec.decode(&blob).unwrap_err();
        assert!(matches!(err, AegisError::MalformedRecord(_)));
    }

    #[test]
    fn decode_rejects_truncated_input() {
        let codec = codec(60, 2, ByteOrder::Little);
        let blob = vec![0u8; codec.stride() - 2];
        assert!(codec.decode(&blob).is_err());
    }

    #[test]
    fn decode_of_empty_field_is_zero_points() {
        let codec = codec(60, 2, ByteOrder::Little);
        assert_eq!(codec.decode(&[]).unwrap().len(), 0);
    }

    #[test]
    fn encode_of_decode_is_identity() {
        let codec = codec(3, 2, ByteOrder::Little);
        // Arbitrary aligned bytes, two control points.
        let blob: Vec<u8> = (0u8..24).map(|b| b.wrapping_mul(37)).collect();
        let decoded = codec.decode(&blob).unwrap();
        let encoded = codec.encode(&decoded).unwrap();
        assert_eq!(encoded, blob);
    }

    #[test]
    fn encode_of_decode_is_identity_big_endian_four_byte() {
        let codec = codec(2, 4, ByteOrder::Big);
        let blob: Vec<u8> = (0u8..32).map(|b| b.wrapping_mul(211)).collect();
        assert_eq!(codec.encode(&codec.decode(&blob).unwrap()).unwrap(), blob);
    }

    #[test]
    fn decode_of_encode_preserves_pairs() {
        let codec = codec(2, 2, ByteOrder::Big);
        let points = vec![
            vec![LeafPair::new(-32768, 32767), LeafPair::new(0, -1)],
            vec![LeafPair::new(42, -42), LeafPair::new(7, 7)],
        ];
        let decoded = codec.decode(&codec.encode(&points).unwrap()).unwrap();
        assert_eq!(decoded, points);
    }

    #[test]
    fn encode_rejects_wrong_pair_count() {
        let codec = codec(2, 2, ByteOrder::Little);
        let points = vec![vec![LeafPair::new(1, 2)]];
        let err = codec.encode(&points).unwrap_err();
        assert!(matches!(err, AegisError::MalformedRecord(_)));
    }

    #[test]
    fn encode_rejects_overflowing_two_byte_value() {
        let codec = codec(1, 2, ByteOrder::Little);
        let points = vec![vec![LeafPair::new(40000, 0)]];
        assert!(codec.encode(&points).is_err());

        // The same value fits a 4-byte element.
        let wide = super::LeafCodec::new(1, 4, ByteOrder::Little).unwrap();
        assert!(wide.encode(&points).is_ok());
    }
}
