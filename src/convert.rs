// src/convert.rs
// Digitizing levels to physical units

use crate::decoder::SampleArray;
use crate::error::{IsfError, Result};
use crate::header::Header;
use crate::layout::PointFormat;

/// Affine amplitude transform: `(raw - YOFF) * YMULT + YZERO`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AmplitudeScale {
    pub yoff: f64,
    pub ymult: f64,
    pub yzero: f64,
}

impl AmplitudeScale {
    pub fn from_header(header: &Header) -> Result<Self> {
        Ok(AmplitudeScale {
            yoff: header.float("YOFF")?,
            ymult: header.float("YMULT")?,
            yzero: header.float("YZERO")?,
        })
    }

    pub fn apply(&self, raw: f64) -> f64 {
        (raw - self.yoff) * self.ymult + self.yzero
    }
}

/// Horizontal axis of the record.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TimeAxis {
    pub xzero: f64,
    pub xincr: f64,
    pub points: usize,
}

impl TimeAxis {
    pub fn from_header(header: &Header) -> Result<Self> {
        Ok(TimeAxis {
            xzero: header.float("XZERO")?,
            xincr: header.float("XINCR")?,
            points: header.point_count()?,
        })
    }

    /// Exclusive upper bound of the axis.
    pub fn xstop(&self) -> f64 {
        self.xzero + self.xincr * self.points as f64
    }

    /// X coordinates for the given point format: one per sample for `Y`,
    /// one per min/max pair for `ENV`, spread over `[XZERO, XSTOP - XINCR]`.
    pub fn values(&self, format: PointFormat) -> Result<Vec<f64>> {
        match format {
            PointFormat::Y => Ok((0..self.points)
                .map(|i| self.xzero + i as f64 * self.xincr)
                .collect()),
            PointFormat::Env => {
                if self.points % 2 != 0 {
                    return Err(IsfError::unsupported(format!(
                        "ENV record with odd point count {}",
                        self.points
                    )));
                }
                Ok(linspace(
                    self.xzero,
                    self.xstop() - self.xincr,
                    self.points / 2,
                ))
            }
        }
    }
}

/// `num` evenly spaced values from `start` to `stop`, both included.
pub fn linspace(start: f64, stop: f64, num: usize) -> Vec<f64> {
    match num {
        0 => Vec::new(),
        1 => vec![start],
        _ => {
            let step = (stop - start) / (num - 1) as f64;
            let mut values: Vec<f64> = (0..num).map(|i| start + i as f64 * step).collect();
            values[num - 1] = stop;
            values
        }
    }
}

/// Scale raw samples and build the matching x axis.
pub fn convert(
    samples: &SampleArray,
    header: &Header,
    format: PointFormat,
) -> Result<(Vec<f64>, Vec<f64>)> {
    let axis = TimeAxis::from_header(header)?;
    let x = axis.values(format)?;

    let scale = AmplitudeScale::from_header(header)?;
    let y = samples
        .to_f64()
        .into_iter()
        .map(|raw| scale.apply(raw))
        .collect();

    Ok((x, y))
}
