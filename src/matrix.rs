//! The combination space a run exercises: upload mode × row orientation ×
//! binding target, plus the canonical cube-face ordering.

use std::fmt;

use smallvec::{smallvec, SmallVec};

use crate::gl;
use crate::source::ImageSource;

/// Reference red of the two-row test sources.
pub const RED: [u8; 3] = [255, 0, 0];
/// Reference green of the two-row test sources.
pub const GREEN: [u8; 3] = [0, 255, 0];

/// How image data reaches the texture.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum UploadMode {
    /// A single combined allocate-and-upload `glTexImage2D` call.
    TexImage,
    /// Allocation with undefined contents, then a `glTexSubImage2D` write
    /// covering the full extent.
    TexSubImage,
}

impl fmt::Display for UploadMode {
    fn fmt(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
        match self {
            UploadMode::TexImage => formatter.write_str("TexImage2D"),
            UploadMode::TexSubImage => formatter.write_str("TexSubImage2D"),
        }
    }
}

/// One upload/orientation combination and the colors it must produce.
///
/// The expected colors are a function of `flip` alone: the sources store
/// red in their top half, so uploading with reversed rows puts red at the
/// top of the rendered output and green at the bottom.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct TestCase {
    /// Upload path under test.
    pub mode: UploadMode,
    /// Whether source rows are reversed while uploading.
    pub flip: bool,
    /// Color the top sample rectangle must contain.
    pub top_color: [u8; 3],
    /// Color the bottom sample rectangle must contain.
    pub bottom_color: [u8; 3],
}

impl TestCase {
    /// Builds a case; the expected colors follow from `flip`.
    pub fn new(mode: UploadMode, flip: bool) -> TestCase {
        let (top_color, bottom_color) = if flip { (RED, GREEN) } else { (GREEN, RED) };

        TestCase {
            mode,
            flip,
            top_color,
            bottom_color,
        }
    }

    /// The four canonical cases, in the fixed order diagnostics rely on.
    pub fn matrix() -> [TestCase; 4] {
        [
            TestCase::new(UploadMode::TexImage, true),
            TestCase::new(UploadMode::TexImage, false),
            TestCase::new(UploadMode::TexSubImage, true),
            TestCase::new(UploadMode::TexSubImage, false),
        ]
    }
}

/// One face of a cube map, in the canonical +X, -X, +Y, -Y, +Z, -Z order.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum CubeFace {
    /// `TEXTURE_CUBE_MAP_POSITIVE_X`
    PositiveX,
    /// `TEXTURE_CUBE_MAP_NEGATIVE_X`
    NegativeX,
    /// `TEXTURE_CUBE_MAP_POSITIVE_Y`
    PositiveY,
    /// `TEXTURE_CUBE_MAP_NEGATIVE_Y`
    NegativeY,
    /// `TEXTURE_CUBE_MAP_POSITIVE_Z`
    PositiveZ,
    /// `TEXTURE_CUBE_MAP_NEGATIVE_Z`
    NegativeZ,
}

impl CubeFace {
    /// All six faces in canonical order.
    pub const ALL: [CubeFace; 6] = [
        CubeFace::PositiveX,
        CubeFace::NegativeX,
        CubeFace::PositiveY,
        CubeFace::NegativeY,
        CubeFace::PositiveZ,
        CubeFace::NegativeZ,
    ];

    /// The image target uploads and completeness queries use.
    pub fn to_gl_enum(self) -> gl::types::GLenum {
        match self {
            CubeFace::PositiveX => gl::TEXTURE_CUBE_MAP_POSITIVE_X,
            CubeFace::NegativeX => gl::TEXTURE_CUBE_MAP_NEGATIVE_X,
            CubeFace::PositiveY => gl::TEXTURE_CUBE_MAP_POSITIVE_Y,
            CubeFace::NegativeY => gl::TEXTURE_CUBE_MAP_NEGATIVE_Y,
            CubeFace::PositiveZ => gl::TEXTURE_CUBE_MAP_POSITIVE_Z,
            CubeFace::NegativeZ => gl::TEXTURE_CUBE_MAP_NEGATIVE_Z,
        }
    }

    /// Canonical index, the value the face-selector uniform carries.
    pub fn selector(self) -> i32 {
        match self {
            CubeFace::PositiveX => 0,
            CubeFace::NegativeX => 1,
            CubeFace::PositiveY => 2,
            CubeFace::NegativeY => 3,
            CubeFace::PositiveZ => 4,
            CubeFace::NegativeZ => 5,
        }
    }
}

impl fmt::Display for CubeFace {
    fn fmt(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
        match self {
            CubeFace::PositiveX => formatter.write_str("+X"),
            CubeFace::NegativeX => formatter.write_str("-X"),
            CubeFace::PositiveY => formatter.write_str("+Y"),
            CubeFace::NegativeY => formatter.write_str("-Y"),
            CubeFace::PositiveZ => formatter.write_str("+Z"),
            CubeFace::NegativeZ => formatter.write_str("-Z"),
        }
    }
}

/// Destination texture binding.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Binding {
    /// A single 2D texture.
    Flat,
    /// A six-faced cube map.
    Cube,
}

impl Binding {
    /// The binding target passed to `glBindTexture` and `glTexParameteri`.
    pub fn to_gl_enum(self) -> gl::types::GLenum {
        match self {
            Binding::Flat => gl::TEXTURE_2D,
            Binding::Cube => gl::TEXTURE_CUBE_MAP,
        }
    }
}

impl fmt::Display for Binding {
    fn fmt(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Binding::Flat => formatter.write_str("TEXTURE_2D"),
            Binding::Cube => formatter.write_str("TEXTURE_CUBE_MAP"),
        }
    }
}

/// One concrete image target within a binding: the flat texture itself, or
/// a single cube face.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum FaceTarget {
    /// The sole face of a `TEXTURE_2D` binding.
    Flat,
    /// One face of a `TEXTURE_CUBE_MAP` binding.
    Cube(CubeFace),
}

impl FaceTarget {
    /// The image target uploads write through.
    pub fn image_target(&self) -> gl::types::GLenum {
        match self {
            FaceTarget::Flat => gl::TEXTURE_2D,
            FaceTarget::Cube(face) => face.to_gl_enum(),
        }
    }

    /// The face-selector uniform value, `None` for flat bindings.
    pub fn selector(&self) -> Option<i32> {
        match self {
            FaceTarget::Flat => None,
            FaceTarget::Cube(face) => Some(face.selector()),
        }
    }
}

/// A binding together with its ordered face list.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct TargetDescriptor {
    /// The destination binding.
    pub binding: Binding,
}

impl TargetDescriptor {
    /// The flat-binding descriptor.
    pub fn flat() -> TargetDescriptor {
        TargetDescriptor {
            binding: Binding::Flat,
        }
    }

    /// The cube-binding descriptor.
    pub fn cube() -> TargetDescriptor {
        TargetDescriptor {
            binding: Binding::Cube,
        }
    }

    /// Descriptors applicable to `source`, in pass order.
    ///
    /// Cube map faces must be square, so the cube descriptor is included
    /// only when the source is; skipping it is not a failure.
    pub fn for_source(source: &ImageSource) -> SmallVec<[TargetDescriptor; 2]> {
        if source.is_square() {
            smallvec![TargetDescriptor::flat(), TargetDescriptor::cube()]
        } else {
            smallvec![TargetDescriptor::flat()]
        }
    }

    /// Ordered upload/sampling faces: one for flat, six canonical for cube.
    pub fn faces(&self) -> SmallVec<[FaceTarget; 6]> {
        match self.binding {
            Binding::Flat => smallvec![FaceTarget::Flat],
            Binding::Cube => CubeFace::ALL.iter().map(|&face| FaceTarget::Cube(face)).collect(),
        }
    }
}
