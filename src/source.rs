//! The structurally distinct image sources a run sequences through.
//!
//! Every source carries the same semantic content (top half solid red,
//! bottom half solid green) but reaches the harness through an
//! independent acquisition path, so the identical verification matrix
//! exercises separate code in the upload implementation.

use std::error::Error;
use std::fmt;
use std::io::Cursor;
use std::path::Path;
use std::sync::mpsc;
use std::thread;

use image::{ImageOutputFormat, RgbaImage};

use crate::matrix::{GREEN, RED};

/// Acquisition path a source came through, for diagnostics.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum SourceKind {
    /// PNG decoded from a file.
    File,
    /// Raster synthesized directly in memory.
    Raster,
    /// The synthesized raster after an in-memory PNG encode/decode round
    /// trip.
    PngRoundTrip,
    /// Pixels read back from a framebuffer the raster was rendered into.
    Framebuffer,
}

impl fmt::Display for SourceKind {
    fn fmt(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
        match self {
            SourceKind::File => formatter.write_str("file-decoded image"),
            SourceKind::Raster => formatter.write_str("synthesized raster"),
            SourceKind::PngRoundTrip => formatter.write_str("round-tripped image"),
            SourceKind::Framebuffer => formatter.write_str("framebuffer-derived image"),
        }
    }
}

/// An opaque 2D pixel source with known dimensions.
///
/// Rows are stored top-down as tightly packed RGBA8; row 0 is the top of
/// the image.
#[derive(Debug, Clone)]
pub struct ImageSource {
    kind: SourceKind,
    width: u32,
    height: u32,
    pixels: Vec<u8>,
}

impl ImageSource {
    /// Wraps raw top-down RGBA8 pixels.
    pub fn from_rgba8(kind: SourceKind, width: u32, height: u32, pixels: Vec<u8>) -> ImageSource {
        assert_eq!(pixels.len(), width as usize * height as usize * 4);

        ImageSource {
            kind,
            width,
            height,
            pixels,
        }
    }

    /// Decodes a PNG file into a source.
    pub fn from_png_file(path: &Path) -> Result<ImageSource, AcquisitionError> {
        let image = image::open(path)
            .map_err(|error| AcquisitionError::Decode {
                kind: SourceKind::File,
                error,
            })?
            .to_rgba8();

        Ok(ImageSource::from_rgba_image(SourceKind::File, image))
    }

    /// Decodes an in-memory PNG into a source tagged `kind`.
    pub fn from_png_bytes(kind: SourceKind, bytes: &[u8]) -> Result<ImageSource, AcquisitionError> {
        let image = image::load_from_memory_with_format(bytes, image::ImageFormat::Png)
            .map_err(|error| AcquisitionError::Decode { kind, error })?
            .to_rgba8();

        Ok(ImageSource::from_rgba_image(kind, image))
    }

    /// The synthesized 1×2 reference raster: row 0 red, row 1 green.
    pub fn reference_raster() -> ImageSource {
        let pixels = vec![
            RED[0], RED[1], RED[2], 255, //
            GREEN[0], GREEN[1], GREEN[2], 255,
        ];

        ImageSource::from_rgba8(SourceKind::Raster, 1, 2, pixels)
    }

    fn from_rgba_image(kind: SourceKind, image: RgbaImage) -> ImageSource {
        let (width, height) = image.dimensions();
        ImageSource::from_rgba8(kind, width, height, image.into_raw())
    }

    /// Acquisition path this source came through.
    pub fn kind(&self) -> SourceKind {
        self.kind
    }

    /// Width in pixels.
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Height in pixels.
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Whether a cube-map pass can use this source.
    pub fn is_square(&self) -> bool {
        self.width == self.height
    }

    /// All pixels, top-down RGBA8.
    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }

    /// Row `y` counted from the top, as raw RGBA8 bytes.
    pub fn row(&self, y: u32) -> &[u8] {
        let stride = self.width as usize * 4;
        let offset = y as usize * stride;
        &self.pixels[offset..offset + stride]
    }

    /// PNG-encodes the source in memory.
    pub fn encode_png(&self) -> Result<Vec<u8>, AcquisitionError> {
        let image = RgbaImage::from_raw(self.width, self.height, self.pixels.clone())
            .expect("pixel buffer length matches dimensions");

        let mut bytes = Cursor::new(Vec::new());
        image
            .write_to(&mut bytes, ImageOutputFormat::Png)
            .map_err(|error| AcquisitionError::Encode { error })?;

        Ok(bytes.into_inner())
    }

    /// Decodes `bytes` as a PNG on a worker thread.
    ///
    /// The returned channel sees exactly one message: the decoded
    /// round-trip source, or the decode error.
    pub fn decode_png_in_background(
        bytes: Vec<u8>,
    ) -> mpsc::Receiver<Result<ImageSource, AcquisitionError>> {
        let (sender, receiver) = mpsc::channel();

        thread::spawn(move || {
            let result = ImageSource::from_png_bytes(SourceKind::PngRoundTrip, &bytes);
            sender.send(result).ok();
        });

        receiver
    }
}

/// Error that can be triggered while acquiring an image source.
///
/// Acquisition errors are fatal: the sequencer reports them once and the
/// run terminates without attempting the remaining stages.
#[derive(Debug)]
pub enum AcquisitionError {
    /// A source failed to decode.
    Decode {
        /// Which acquisition path failed.
        kind: SourceKind,
        /// The decoder's error.
        error: image::ImageError,
    },
    /// The round-trip encode failed.
    Encode {
        /// The encoder's error.
        error: image::ImageError,
    },
    /// The decode worker disappeared without resolving.
    NoResolution,
}

impl fmt::Display for AcquisitionError {
    fn fmt(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
        match self {
            AcquisitionError::Decode { kind, error } => {
                write!(formatter, "failed to decode {}: {}", kind, error)
            }
            AcquisitionError::Encode { error } => {
                write!(formatter, "failed to encode the raster: {}", error)
            }
            AcquisitionError::NoResolution => {
                formatter.write_str("decode worker disappeared without resolving")
            }
        }
    }
}

impl Error for AcquisitionError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            AcquisitionError::Decode { error, .. } => Some(error),
            AcquisitionError::Encode { error } => Some(error),
            AcquisitionError::NoResolution => None,
        }
    }
}
