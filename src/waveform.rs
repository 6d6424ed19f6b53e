// src/waveform.rs
// Physical waveform and its point view

use crate::error::{IsfError, Result};
use crate::layout::PointFormat;

/// One output point.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Point {
    Y { x: f64, y: f64 },
    Env { x: f64, min: f64, max: f64 },
}

/// Scaled x/y arrays of a decoded record.
#[derive(Debug, Clone, PartialEq)]
pub struct PhysicalWaveform {
    format: PointFormat,
    x: Vec<f64>,
    y: Vec<f64>,
}

impl PhysicalWaveform {
    /// `y` must hold one value per x for `Y` and a min/max pair per x for
    /// `ENV`.
    pub fn new(format: PointFormat, x: Vec<f64>, y: Vec<f64>) -> Result<Self> {
        let expected = match format {
            PointFormat::Y => x.len(),
            PointFormat::Env => x.len() * 2,
        };
        if y.len() != expected {
            return Err(IsfError::invalid(
                "NR_PT",
                format!("{} amplitudes for {} x positions", y.len(), x.len()),
            ));
        }
        Ok(PhysicalWaveform { format, x, y })
    }

    pub fn format(&self) -> PointFormat {
        self.format
    }

    pub fn x(&self) -> &[f64] {
        &self.x
    }

    pub fn y(&self) -> &[f64] {
        &self.y
    }

    /// Number of output points: NR_PT for `Y`, NR_PT / 2 for `ENV`.
    pub fn len(&self) -> usize {
        self.x.len()
    }

    pub fn is_empty(&self) -> bool {
        self.x.is_empty()
    }

    /// Iterate the points. Each call starts over from the first point.
    pub fn points(&self) -> Points<'_> {
        Points {
            waveform: self,
            index: 0,
        }
    }

    pub fn into_parts(self) -> (Vec<f64>, Vec<f64>) {
        (self.x, self.y)
    }
}

#[derive(Debug, Clone)]
pub struct Points<'a> {
    waveform: &'a PhysicalWaveform,
    index: usize,
}

impl<'a> Iterator for Points<'a> {
    type Item = Point;

    fn next(&mut self) -> Option<Point> {
        let i = self.index;
        let x = *self.waveform.x.get(i)?;
        self.index += 1;

        let y = &self.waveform.y;
        Some(match self.waveform.format {
            PointFormat::Y => Point::Y { x, y: y[i] },
            PointFormat::Env => Point::Env {
                x,
                min: y[2 * i],
                max: y[2 * i + 1],
            },
        })
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.waveform.len() - self.index;
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for Points<'_> {}

impl<'a> IntoIterator for &'a PhysicalWaveform {
    type Item = Point;
    type IntoIter = Points<'a>;

    fn into_iter(self) -> Points<'a> {
        self.points()
    }
}
