//! Binary PGM (P5) image store.
//!
//! Input images are read from `<input_dir>/<name>.pgm` and output images
//! written to `<output_dir>/<name>.pgm`, one byte per cell, maxval 255.

use std::fs::{self, File};
use std::io::BufWriter;
use std::path::{Path, PathBuf};

use image::codecs::pnm::{PnmEncoder, PnmSubtype, SampleEncoding};
use image::{ExtendedColorType, GrayImage, ImageEncoder, ImageFormat};

use crate::error::{EngineError, EngineResult};
use crate::io::GridStore;

#[derive(Debug, Clone)]
pub struct PgmStore {
    input_dir: PathBuf,
    output_dir: PathBuf,
}

impl PgmStore {
    pub fn new(input_dir: impl Into<PathBuf>, output_dir: impl Into<PathBuf>) -> Self {
        Self {
            input_dir: input_dir.into(),
            output_dir: output_dir.into(),
        }
    }

    pub fn input_path(&self, name: &str) -> PathBuf {
        self.input_dir.join(format!("{name}.pgm"))
    }

    pub fn output_path(&self, name: &str) -> PathBuf {
        self.output_dir.join(format!("{name}.pgm"))
    }

    /// Writes an image into the input directory, e.g. to seed a run.
    pub fn write_input(
        &self,
        name: &str,
        width: usize,
        height: usize,
        bytes: &[u8],
    ) -> EngineResult<()> {
        write_pgm(&self.input_dir, &self.input_path(name), width, height, bytes)
    }
}

impl GridStore for PgmStore {
    fn load(&mut self, name: &str, width: usize, height: usize) -> EngineResult<Vec<u8>> {
        let data = fs::read(self.input_path(name))?;
        let pixels: GrayImage =
            image::load_from_memory_with_format(&data, ImageFormat::Pnm)?.into_luma8();

        let (w, h) = pixels.dimensions();
        if (w as usize, h as usize) != (width, height) {
            return Err(EngineError::format(format!(
                "{name}.pgm is {w}x{h}, expected {width}x{height}"
            )));
        }
        Ok(pixels.into_raw())
    }

    fn store(&mut self, name: &str, width: usize, height: usize, bytes: &[u8]) -> EngineResult<()> {
        write_pgm(&self.output_dir, &self.output_path(name), width, height, bytes)
    }
}

fn write_pgm(
    dir: &Path,
    path: &Path,
    width: usize,
    height: usize,
    bytes: &[u8],
) -> EngineResult<()> {
    if bytes.len() != width * height {
        return Err(EngineError::Dimensions {
            width,
            height,
            expected: width * height,
            actual: bytes.len(),
        });
    }
    let (w, h) = (dimension(width)?, dimension(height)?);

    fs::create_dir_all(dir)?;
    let mut out = BufWriter::new(File::create(path)?);
    PnmEncoder::new(&mut out)
        .with_subtype(PnmSubtype::Graymap(SampleEncoding::Binary))
        .write_image(bytes, w, h, ExtendedColorType::L8)?;

    let file = out.into_inner().map_err(|e| e.into_error())?;
    file.sync_all()?;
    Ok(())
}

fn dimension(size: usize) -> EngineResult<u32> {
    u32::try_from(size)
        .map_err(|_| EngineError::format(format!("{size} is too large for a PGM image")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cell::{ALIVE, DEAD};

    #[test]
    fn test_loads_hand_written_image() {
        let dir = tempfile::tempdir().unwrap();
        let mut data = b"P5\n3 2\n255\n".to_vec();
        data.extend_from_slice(&[ALIVE, DEAD, DEAD, DEAD, ALIVE, DEAD]);
        fs::write(dir.path().join("3x2.pgm"), &data).unwrap();

        let mut store = PgmStore::new(dir.path(), dir.path());
        assert_eq!(
            store.load("3x2", 3, 2).unwrap(),
            vec![ALIVE, DEAD, DEAD, DEAD, ALIVE, DEAD]
        );
    }

    #[test]
    fn test_rejects_unreadable_images() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("3x2.pgm"), b"not an image").unwrap();

        let mut store = PgmStore::new(dir.path(), dir.path());
        assert!(matches!(store.load("3x2", 3, 2), Err(EngineError::Image(_))));
        assert!(matches!(store.load("9x9", 9, 9), Err(EngineError::Io(_))));
    }

    #[test]
    fn test_store_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = PgmStore::new(dir.path(), dir.path());
        let bytes = vec![DEAD, ALIVE, ALIVE, DEAD, DEAD, ALIVE, DEAD, DEAD];

        store.store("4x2", 4, 2, &bytes).unwrap();
        assert!(store.output_path("4x2").exists());
        assert_eq!(store.load("4x2", 4, 2).unwrap(), bytes);

        assert!(matches!(store.load("4x2", 2, 4), Err(EngineError::Format(_))));
    }

    #[test]
    fn test_store_rejects_wrong_length() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = PgmStore::new(dir.path(), dir.path());

        assert!(matches!(
            store.store("4x2", 4, 2, &[DEAD; 5]),
            Err(EngineError::Dimensions { expected: 8, actual: 5, .. })
        ));
        assert!(!store.output_path("4x2").exists());
    }
}
