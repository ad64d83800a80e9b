use crate::error::{HsiError, Result};

/// Dense spectral cube indexed `[band][x][z]`, stored band-sequential.
#[derive(Debug, Clone, PartialEq)]
pub struct SpectralCube {
    bands: usize,
    width: usize,
    depth: usize,
    data: Vec<f32>,
}

impl SpectralCube {
    /// Zero-initialised cube.
    pub fn new(bands: usize, width: usize, depth: usize) -> Self {
        Self {
            bands,
            width,
            depth,
            data: vec![0.0; bands * width * depth],
        }
    }

    /// Wrap existing band-sequential values.
    pub fn from_vec(bands: usize, width: usize, depth: usize, data: Vec<f32>) -> Result<Self> {
        let expected = bands * width * depth;
        if data.len() != expected {
            return Err(HsiError::Output(format!(
                "cube ({bands}, {width}, {depth}) needs {expected} values, got {}",
                data.len()
            )));
        }
        Ok(Self {
            bands,
            width,
            depth,
            data,
        })
    }

    pub fn bands(&self) -> usize {
        self.bands
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn depth(&self) -> usize {
        self.depth
    }

    /// `(bands, width, depth)`.
    pub fn shape(&self) -> (usize, usize, usize) {
        (self.bands, self.width, self.depth)
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    #[inline]
    pub fn index(&self, band: usize, x: usize, z: usize) -> usize {
        debug_assert!(band < self.bands && x < self.width && z < self.depth);
        (band * self.width + x) * self.depth + z
    }

    #[inline]
    pub fn get(&self, band: usize, x: usize, z: usize) -> f32 {
        self.data[self.index(band, x, z)]
    }

    #[inline]
    pub fn add(&mut self, band: usize, x: usize, z: usize, value: f32) {
        let i = self.index(band, x, z);
        self.data[i] += value;
    }

    /// All `width * depth` values of one band, row-major by x then z.
    pub fn band(&self, band: usize) -> &[f32] {
        let plane = self.width * self.depth;
        &self.data[band * plane..(band + 1) * plane]
    }

    /// Add a double-precision contribution, rounding the sum back to f32.
    #[inline]
    pub fn accumulate(&mut self, band: usize, x: usize, z: usize, value: f64) {
        let i = self.index(band, x, z);
        self.data[i] = (f64::from(self.data[i]) + value) as f32;
    }

    /// Per-band values of one column.
    pub fn spectrum_at(&self, x: usize, z: usize) -> Vec<f32> {
        (0..self.bands).map(|k| self.get(k, x, z)).collect()
    }

    pub fn as_slice(&self) -> &[f32] {
        &self.data
    }
}
