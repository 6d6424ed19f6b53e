// src/layout.rs
// Binary layout resolution from header fields

use log::debug;

use crate::error::{IsfError, Result};
use crate::header::Header;

/// ENCDG spellings for binary payloads.
const BINARY_ENCODINGS: [&str; 2] = ["BIN", "BINARY"];

const BYTE_ORDERS: [(&str, Endianness); 2] = [
    ("MSB", Endianness::Big),
    ("LSB", Endianness::Little),
];

const REPRESENTATIONS: [(&str, Representation); 3] = [
    ("RI", Representation::SignedInt),
    ("RP", Representation::UnsignedInt),
    ("FP", Representation::Float),
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Endianness {
    Big,
    Little,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Representation {
    SignedInt,
    UnsignedInt,
    Float,
}

/// Point format of the waveform record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointFormat {
    /// One amplitude per x position.
    Y,
    /// A min/max amplitude pair per x position.
    Env,
}

impl PointFormat {
    pub fn from_header(header: &Header) -> Result<Self> {
        match header.text("PT_FMT")? {
            "Y" => Ok(PointFormat::Y),
            "ENV" => Ok(PointFormat::Env),
            other => Err(IsfError::unsupported(format!(
                "point format '{}'",
                other
            ))),
        }
    }
}

/// Concrete element type of the payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ElementKind {
    I8,
    I16,
    I32,
    I64,
    U8,
    U16,
    U32,
    U64,
    F32,
    F64,
}

impl ElementKind {
    fn new(representation: Representation, width: i64) -> Option<Self> {
        use Representation::*;
        match (representation, width) {
            (SignedInt, 1) => Some(ElementKind::I8),
            (SignedInt, 2) => Some(ElementKind::I16),
            (SignedInt, 4) => Some(ElementKind::I32),
            (SignedInt, 8) => Some(ElementKind::I64),
            (UnsignedInt, 1) => Some(ElementKind::U8),
            (UnsignedInt, 2) => Some(ElementKind::U16),
            (UnsignedInt, 4) => Some(ElementKind::U32),
            (UnsignedInt, 8) => Some(ElementKind::U64),
            (Float, 4) => Some(ElementKind::F32),
            (Float, 8) => Some(ElementKind::F64),
            _ => None,
        }
    }

    pub fn width(self) -> usize {
        match self {
            ElementKind::I8 | ElementKind::U8 => 1,
            ElementKind::I16 | ElementKind::U16 => 2,
            ElementKind::I32 | ElementKind::U32 | ElementKind::F32 => 4,
            ElementKind::I64 | ElementKind::U64 | ElementKind::F64 => 8,
        }
    }

    pub fn representation(self) -> Representation {
        match self {
            ElementKind::I8 | ElementKind::I16 | ElementKind::I32 | ElementKind::I64 => {
                Representation::SignedInt
            }
            ElementKind::U8 | ElementKind::U16 | ElementKind::U32 | ElementKind::U64 => {
                Representation::UnsignedInt
            }
            ElementKind::F32 | ElementKind::F64 => Representation::Float,
        }
    }
}

/// How one payload element is laid out in bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BinaryLayout {
    pub byte_order: Endianness,
    pub kind: ElementKind,
}

impl BinaryLayout {
    pub fn new(byte_order: Endianness, representation: Representation, width: i64) -> Result<Self> {
        let kind = ElementKind::new(representation, width).ok_or_else(|| {
            IsfError::unsupported(format!(
                "{}-byte {:?} elements",
                width, representation
            ))
        })?;
        Ok(BinaryLayout { byte_order, kind })
    }

    /// Resolve the payload layout from `ENCDG`, `PT_FMT`, `BYT_OR`, `BN_FMT`
    /// and `BYT_NR`. `NR_PT` must also be present.
    pub fn from_header(header: &Header) -> Result<Self> {
        let encoding = header.text("ENCDG")?;
        if !BINARY_ENCODINGS.contains(&encoding) {
            return Err(IsfError::unsupported(format!(
                "data encoding '{}'",
                encoding
            )));
        }
        PointFormat::from_header(header)?;

        let byte_order = lookup(header, "BYT_OR", &BYTE_ORDERS)?;
        let representation = lookup(header, "BN_FMT", &REPRESENTATIONS)?;
        let width = header.int("BYT_NR")?;
        header.int("NR_PT")?;

        let layout = BinaryLayout::new(byte_order, representation, width)?;
        debug!("Resolved payload layout {:?}", layout);
        Ok(layout)
    }

    pub fn element_width(&self) -> usize {
        self.kind.width()
    }

    pub fn representation(&self) -> Representation {
        self.kind.representation()
    }
}

fn lookup<T: Copy>(header: &Header, name: &str, table: &[(&str, T)]) -> Result<T> {
    let code = header.text(name)?;
    table
        .iter()
        .find(|(spelling, _)| *spelling == code)
        .map(|(_, value)| *value)
        .ok_or_else(|| IsfError::unsupported(format!("{} '{}'", name, code)))
}
