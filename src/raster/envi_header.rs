use std::fmt::Write as _;
use std::io::Write;

use crate::config::SamplingParams;
use crate::error::{HsiError, Result};
use crate::types::SpectralCube;

/// Generator name embedded in every header description.
pub const GENERATOR_VERSION: &str = concat!("voxel-hsi V", env!("CARGO_PKG_VERSION"));

/// Fields of an ENVI header that vary between runs.
///
/// Everything else (data type 4, bsq interleave, little-endian byte
/// order, zero header offset) is fixed.
#[derive(Debug, Clone, PartialEq)]
pub struct EnviHeader {
    pub description: String,
    /// z extent of the cube.
    pub samples: usize,
    /// x extent of the cube.
    pub lines: usize,
    pub bands: usize,
    pub wavelengths: Vec<f64>,
}

impl EnviHeader {
    pub fn for_cube(cube: &SpectralCube, params: &SamplingParams) -> Self {
        Self {
            description: format!("Generated using {GENERATOR_VERSION}"),
            samples: cube.depth(),
            lines: cube.width(),
            bands: cube.bands(),
            wavelengths: params.wavelengths(),
        }
    }

    /// Header text. `interleave` is listed twice and the file ends without a
    /// newline, matching headers produced by earlier generator versions.
    pub fn render(&self) -> String {
        let mut out = String::new();
        out.push_str("ENVI\n");
        let _ = writeln!(out, "description = {{{}}}", self.description);
        let _ = writeln!(out, "samples = {}", self.samples);
        let _ = writeln!(out, "lines = {}", self.lines);
        let _ = writeln!(out, "bands = {}", self.bands);
        out.push_str(
            "header offset = 0\n\
             file type = ENVI Standard\n\
             data type = 4\n\
             interleave = bsq\n\
             sensor type = Unknown\n\
             byte order = 0\n\
             interleave = bsq\n",
        );
        out.push_str("wavelength = {\n");
        let list: Vec<String> = self.wavelengths.iter().map(|w| w.to_string()).collect();
        out.push_str(&list.join(", "));
        out.push('}');
        out
    }

    pub fn parse(text: &str) -> Result<Self> {
        let mut lines = text.lines();
        if lines.next().map(str::trim) != Some("ENVI") {
            return Err(HsiError::Output("header does not start with 'ENVI'".into()));
        }

        let mut description = String::new();
        let mut samples = None;
        let mut lines_field = None;
        let mut bands = None;
        let mut wavelengths = None;

        while let Some(line) = lines.next() {
            let Some((key, value)) = line.split_once('=') else {
                continue;
            };
            let key = key.trim();
            let value = value.trim();

            match key {
                "description" => description = strip_braces(value).to_string(),
                "samples" => samples = Some(parse_count(key, value)?),
                "lines" => lines_field = Some(parse_count(key, value)?),
                "bands" => bands = Some(parse_count(key, value)?),
                "header offset" => expect_field(key, value, "0")?,
                "data type" => expect_field(key, value, "4")?,
                "interleave" => expect_field(key, value, "bsq")?,
                "byte order" => expect_field(key, value, "0")?,
                "wavelength" => {
                    // Brace list, possibly spread over following lines.
                    let mut body = value.to_string();
                    while !body.contains('}') {
                        let Some(next) = lines.next() else {
                            return Err(HsiError::Output("unterminated wavelength list".into()));
                        };
                        body.push_str(next);
                    }
                    wavelengths = Some(parse_wavelengths(strip_braces(&body))?);
                }
                _ => {}
            }
        }

        let missing = |name: &str| HsiError::Output(format!("header missing '{name}'"));
        let header = EnviHeader {
            description,
            samples: samples.ok_or_else(|| missing("samples"))?,
            lines: lines_field.ok_or_else(|| missing("lines"))?,
            bands: bands.ok_or_else(|| missing("bands"))?,
            wavelengths: wavelengths.ok_or_else(|| missing("wavelength"))?,
        };

        if header.wavelengths.len() != header.bands {
            return Err(HsiError::Output(format!(
                "header lists {} wavelengths for {} bands",
                header.wavelengths.len(),
                header.bands
            )));
        }
        Ok(header)
    }
}

/// Write the rendered header to `writer`.
pub fn write_header<W: Write>(writer: &mut W, header: &EnviHeader) -> Result<()> {
    writer.write_all(header.render().as_bytes())?;
    writer.flush()?;
    Ok(())
}

fn strip_braces(value: &str) -> &str {
    value.trim().trim_start_matches('{').trim_end_matches('}').trim()
}

fn parse_count(key: &str, value: &str) -> Result<usize> {
    value
        .parse()
        .map_err(|_| HsiError::Output(format!("invalid {key} value '{value}'")))
}

fn expect_field(key: &str, value: &str, expected: &str) -> Result<()> {
    if value != expected {
        return Err(HsiError::Output(format!(
            "unsupported {key} '{value}', expected '{expected}'"
        )));
    }
    Ok(())
}

fn parse_wavelengths(list: &str) -> Result<Vec<f64>> {
    list.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| {
            s.parse()
                .map_err(|_| HsiError::Output(format!("invalid wavelength '{s}'")))
        })
        .collect()
}
