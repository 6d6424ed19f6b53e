// src/decoder.rs
// Payload bytes to raw samples

use byteorder::{BigEndian, ByteOrder, LittleEndian};

use crate::error::{IsfError, Result};
use crate::layout::{BinaryLayout, ElementKind, Endianness};

/// Raw digitizing levels, typed by the payload layout.
#[derive(Debug, Clone, PartialEq)]
pub enum SampleArray {
    I8(Vec<i8>),
    I16(Vec<i16>),
    I32(Vec<i32>),
    I64(Vec<i64>),
    U8(Vec<u8>),
    U16(Vec<u16>),
    U32(Vec<u32>),
    U64(Vec<u64>),
    F32(Vec<f32>),
    F64(Vec<f64>),
}

impl SampleArray {
    pub fn len(&self) -> usize {
        match self {
            SampleArray::I8(v) => v.len(),
            SampleArray::I16(v) => v.len(),
            SampleArray::I32(v) => v.len(),
            SampleArray::I64(v) => v.len(),
            SampleArray::U8(v) => v.len(),
            SampleArray::U16(v) => v.len(),
            SampleArray::U32(v) => v.len(),
            SampleArray::U64(v) => v.len(),
            SampleArray::F32(v) => v.len(),
            SampleArray::F64(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Widen every sample to `f64`. 64-bit integers beyond 2^53 lose
    /// their low bits.
    pub fn to_f64(&self) -> Vec<f64> {
        match self {
            SampleArray::I8(v) => v.iter().map(|&r| r as f64).collect(),
            SampleArray::I16(v) => v.iter().map(|&r| r as f64).collect(),
            SampleArray::I32(v) => v.iter().map(|&r| r as f64).collect(),
            SampleArray::I64(v) => v.iter().map(|&r| r as f64).collect(),
            SampleArray::U8(v) => v.iter().map(|&r| r as f64).collect(),
            SampleArray::U16(v) => v.iter().map(|&r| r as f64).collect(),
            SampleArray::U32(v) => v.iter().map(|&r| r as f64).collect(),
            SampleArray::U64(v) => v.iter().map(|&r| r as f64).collect(),
            SampleArray::F32(v) => v.iter().map(|&r| r as f64).collect(),
            SampleArray::F64(v) => v.clone(),
        }
    }
}

/// Decode `point_count` elements from the start of `payload`.
///
/// The element count comes from `point_count`, not from the payload
/// length. Extra payload bytes are ignored; too few is `TruncatedData`.
pub fn decode_samples(
    payload: &[u8],
    layout: &BinaryLayout,
    point_count: usize,
) -> Result<SampleArray> {
    let needed = point_count
        .checked_mul(layout.element_width())
        .ok_or_else(|| IsfError::invalid("NR_PT", point_count))?;
    if payload.len() < needed {
        return Err(IsfError::TruncatedData {
            expected: needed,
            available: payload.len(),
        });
    }

    let bytes = &payload[..needed];
    Ok(match layout.byte_order {
        Endianness::Big => decode_with::<BigEndian>(bytes, layout.kind, point_count),
        Endianness::Little => decode_with::<LittleEndian>(bytes, layout.kind, point_count),
    })
}

/// `bytes` is exactly `count * kind.width()` long.
fn decode_with<B: ByteOrder>(bytes: &[u8], kind: ElementKind, count: usize) -> SampleArray {
    match kind {
        ElementKind::I8 => SampleArray::I8(bytes.iter().map(|&b| b as i8).collect()),
        ElementKind::U8 => SampleArray::U8(bytes.to_vec()),
        ElementKind::I16 => {
            let mut out = vec![0i16; count];
            B::read_i16_into(bytes, &mut out);
            SampleArray::I16(out)
        }
        ElementKind::U16 => {
            let mut out = vec![0u16; count];
            B::read_u16_into(bytes, &mut out);
            SampleArray::U16(out)
        }
        ElementKind::I32 => {
            let mut out = vec![0i32; count];
            B::read_i32_into(bytes, &mut out);
            SampleArray::I32(out)
        }
        ElementKind::U32 => {
            let mut out = vec![0u32; count];
            B::read_u32_into(bytes, &mut out);
            SampleArray::U32(out)
        }
        ElementKind::I64 => {
            let mut out = vec![0i64; count];
            B::read_i64_into(bytes, &mut out);
            SampleArray::I64(out)
        }
        ElementKind::U64 => {
            let mut out = vec![0u64; count];
            B::read_u64_into(bytes, &mut out);
            SampleArray::U64(out)
        }
        ElementKind::F32 => {
            let mut out = vec![0f32; count];
            B::read_f32_into(bytes, &mut out);
            SampleArray::F32(out)
        }
        ElementKind::F64 => {
            let mut out = vec![0f64; count];
            B::read_f64_into(bytes, &mut out);
            SampleArray::F64(out)
        }
    }
}
