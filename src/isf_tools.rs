// ISFReader Module
// Reads an ISF capture end to end: header, payload, scaling, CSV export

use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Seek, SeekFrom, Write};
use std::path::Path;

use log::debug;

use crate::config::ReaderConfig;
use crate::convert::convert;
use crate::decoder::{decode_samples, SampleArray};
use crate::error::{IsfError, IsfWarning, Result};
use crate::header::{parse_header, Header, PayloadDescriptor};
use crate::layout::{BinaryLayout, PointFormat};
use crate::waveform::{PhysicalWaveform, Point};

/// A fully decoded ISF file.
#[derive(Debug, Clone)]
pub struct IsfFile {
    pub file_path: String,
    pub header: Header,
    pub payload: PayloadDescriptor,
    pub layout: BinaryLayout,
    pub samples: SampleArray,
    pub waveform: PhysicalWaveform,
    pub warnings: Vec<IsfWarning>,
}

impl IsfFile {
    /// Load an ISF file with the default configuration.
    pub fn load<P: AsRef<Path>>(input_file: P) -> Result<Self> {
        Self::load_with(input_file, &ReaderConfig::default())
    }

    pub fn load_with<P: AsRef<Path>>(input_file: P, config: &ReaderConfig) -> Result<Self> {
        let file_handle = File::open(&input_file)?;
        let mut isf = Self::read_from(BufReader::new(file_handle), config)?;
        isf.file_path = input_file.as_ref().to_string_lossy().to_string();
        Ok(isf)
    }

    /// Decode from any seekable source, e.g. a `Cursor` over bytes.
    pub fn read_from<R: Read + Seek>(mut reader: R, config: &ReaderConfig) -> Result<Self> {
        // The payload may start inside this window; it is re-read after seeking.
        // The window size is caller-chosen, so the buffer only grows with
        // the bytes actually read.
        let mut window = Vec::new();
        reader
            .by_ref()
            .take(config.header_window as u64)
            .read_to_end(&mut window)?;

        let parsed = parse_header(&window, config.duplicate_fields)?;
        let header = parsed.header;
        let payload = parsed.payload;

        let layout = BinaryLayout::from_header(&header)?;
        let format = PointFormat::from_header(&header)?;

        reader.seek(SeekFrom::Start(payload.offset as u64))?;
        let mut payload_buf = Vec::new();
        reader
            .take(payload.length as u64)
            .read_to_end(&mut payload_buf)?;
        if payload_buf.len() != payload.length {
            return Err(IsfError::TruncatedData {
                expected: payload.length,
                available: payload_buf.len(),
            });
        }

        let points = header.point_count()?;
        let samples = decode_samples(&payload_buf, &layout, points)?;
        let (x, y) = convert(&samples, &header, format)?;
        let waveform = PhysicalWaveform::new(format, x, y)?;
        debug!("Decoded {} samples as {:?} record", samples.len(), format);

        Ok(IsfFile {
            file_path: String::new(),
            header,
            payload,
            layout,
            samples,
            waveform,
            warnings: parsed.warnings,
        })
    }

    pub fn format(&self) -> PointFormat {
        self.waveform.format()
    }

    /// Write the waveform to a CSV file.
    pub fn write_csv<P: AsRef<Path>>(&self, output_file: P, include_header: bool) -> Result<()> {
        let file = File::create(output_file)?;
        let mut writer = BufWriter::new(file);
        self.write_csv_to(&mut writer, include_header)?;
        writer.flush()?;
        Ok(())
    }

    /// One line per point: `x, y` for Y records, `x, y_min, y_max` for ENV.
    /// With `include_header`, every header field is written first as a
    /// `NAME, value` line.
    pub fn write_csv_to<W: Write>(&self, writer: &mut W, include_header: bool) -> Result<()> {
        if include_header {
            for (name, value) in self.header.iter() {
                writeln!(writer, "{}, {}", name, value)?;
            }
        }

        for point in self.waveform.points() {
            match point {
                Point::Y { x, y } => writeln!(writer, "{:e}, {:e}", x, y)?,
                Point::Env { x, min, max } => writeln!(writer, "{:e}, {:e}, {:e}", x, min, max)?,
            }
        }
        Ok(())
    }
}

/// Decode a file and return its x values, y values and header.
pub fn read_isf<P: AsRef<Path>>(input_file: P) -> Result<(Vec<f64>, Vec<f64>, Header)> {
    let isf = IsfFile::load(input_file)?;
    let (x, y) = isf.waveform.into_parts();
    Ok((x, y, isf.header))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DuplicateFields;
    use crate::layout::ElementKind;
    use std::io::Cursor;
    use tempfile::NamedTempFile;

    fn capture(header: &str, payload: &[u8]) -> Vec<u8> {
        let mut bytes = header.as_bytes().to_vec();
        bytes.extend_from_slice(payload);
        bytes
    }

    fn le_i16(values: &[i16]) -> Vec<u8> {
        values.iter().flat_map(|v| v.to_le_bytes()).collect()
    }

    const Y_HEADER: &str = ":WFMPRE:BYT_NR 2;BIT_NR 16;ENCDG BINARY;BN_FMT RI;BYT_OR LSB;\
NR_PT 4;PT_FMT Y;XUNIT \"s\";XINCR 1;XZERO 0;PT_OFF 0;YUNIT \"V\";YMULT 1;YOFF 0;YZERO 0;\
:CURVE #18";

    #[test]
    fn test_read_y_record() {
        let bytes = capture(Y_HEADER, &le_i16(&[1, 2, 3, 4]));
        let isf = IsfFile::read_from(Cursor::new(bytes), &ReaderConfig::default()).unwrap();

        assert_eq!(isf.layout.kind, ElementKind::I16);
        assert_eq!(isf.payload.length, 8);
        assert_eq!(isf.format(), PointFormat::Y);
        assert!(isf.warnings.is_empty());

        let points: Vec<Point> = isf.waveform.points().collect();
        assert_eq!(
            points,
            vec![
                Point::Y { x: 0.0, y: 1.0 },
                Point::Y { x: 1.0, y: 2.0 },
                Point::Y { x: 2.0, y: 3.0 },
                Point::Y { x: 3.0, y: 4.0 },
            ]
        );
    }

    #[test]
    fn test_truncated_payload() {
        let bytes = capture(Y_HEADER, &le_i16(&[1, 2, 3])[..]);
        let result = IsfFile::read_from(Cursor::new(bytes), &ReaderConfig::default());
        assert!(matches!(
            result,
            Err(IsfError::TruncatedData { expected: 8, available: 6 })
        ));
    }

    #[test]
    fn test_header_window_too_small() {
        let bytes = capture(Y_HEADER, &le_i16(&[1, 2, 3, 4]));
        let config = ReaderConfig::new().with_header_window(32);
        let result = IsfFile::read_from(Cursor::new(bytes), &config);
        assert!(matches!(result, Err(IsfError::MalformedHeader(_))));
    }

    #[test]
    fn test_large_header_window_on_small_file() {
        let bytes = capture(Y_HEADER, &le_i16(&[1, 2, 3, 4]));
        let config = ReaderConfig::new().with_header_window(usize::MAX);
        let isf = IsfFile::read_from(Cursor::new(bytes), &config).unwrap();
        assert_eq!(isf.waveform.y(), &[1.0, 2.0, 3.0, 4.0]);
    }

    #[test]
    fn test_reject_duplicates() {
        let header = Y_HEADER.replace("PT_OFF 0;", "PT_OFF 0;NR_PT 4;");
        let bytes = capture(&header, &le_i16(&[1, 2, 3, 4]));

        let lenient = IsfFile::read_from(Cursor::new(bytes.clone()), &ReaderConfig::default());
        assert!(lenient.is_ok());

        let config = ReaderConfig::new().with_duplicate_fields(DuplicateFields::Reject);
        let strict = IsfFile::read_from(Cursor::new(bytes), &config);
        assert!(matches!(strict, Err(IsfError::MalformedHeader(_))));
    }

    #[test]
    fn test_csv_output() {
        let bytes = capture(Y_HEADER, &le_i16(&[1, 2, 3, 4]));
        let isf = IsfFile::read_from(Cursor::new(bytes), &ReaderConfig::default()).unwrap();

        let mut out = Vec::new();
        isf.write_csv_to(&mut out, false).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert_eq!(text, "0e0, 1e0\n1e0, 2e0\n2e0, 3e0\n3e0, 4e0\n");

        let mut out = Vec::new();
        isf.write_csv_to(&mut out, true).unwrap();
        let text = String::from_utf8(out).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "BYT_NR, 2");
        assert_eq!(lines[2], "ENCDG, BINARY");
        assert_eq!(lines.len(), isf.header.len() + 4);
    }

    #[test]
    fn test_load_from_disk() {
        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file
            .write_all(&capture(Y_HEADER, &le_i16(&[10, 20, 30, 40])))
            .unwrap();
        temp_file.flush().unwrap();

        let isf = IsfFile::load(temp_file.path()).unwrap();
        assert_eq!(isf.file_path, temp_file.path().to_string_lossy());
        assert_eq!(isf.waveform.y(), &[10.0, 20.0, 30.0, 40.0]);

        let (x, y, header) = read_isf(temp_file.path()).unwrap();
        assert_eq!(x, vec![0.0, 1.0, 2.0, 3.0]);
        assert_eq!(y.len(), 4);
        assert_eq!(header.int("NR_PT").unwrap(), 4);
    }
}
