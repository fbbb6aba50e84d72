//! Client pixel format/type pair used for every upload of a run.
//!
//! The pair is identified by its symbolic GL spelling (`"RGBA"`,
//! `"UNSIGNED_BYTE"`, ...) and resolved against static tables exactly once,
//! when the test definition is built.

use std::error::Error;
use std::fmt;
use std::str::FromStr;

use fnv::FnvHashMap;
use lazy_static::lazy_static;

use crate::gl;

lazy_static! {
    static ref FORMAT_NAMES: FnvHashMap<&'static str, PixelFormat> = {
        let mut map = FnvHashMap::default();
        map.insert("RGB", PixelFormat::Rgb);
        map.insert("RGBA", PixelFormat::Rgba);
        map
    };
    static ref TYPE_NAMES: FnvHashMap<&'static str, PixelType> = {
        let mut map = FnvHashMap::default();
        map.insert("UNSIGNED_BYTE", PixelType::UnsignedByte);
        map.insert("UNSIGNED_SHORT_5_6_5", PixelType::UnsignedShort565);
        map
    };
}

/// Client-side pixel format of the uploaded data.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum PixelFormat {
    /// Three components, no alpha.
    Rgb,
    /// Four components.
    Rgba,
}

impl PixelFormat {
    /// The symbolic spelling this format resolves from.
    pub fn name(self) -> &'static str {
        match self {
            PixelFormat::Rgb => "RGB",
            PixelFormat::Rgba => "RGBA",
        }
    }

    /// The GL enumeration value passed as the `format` argument.
    pub fn to_gl_enum(self) -> gl::types::GLenum {
        match self {
            PixelFormat::Rgb => gl::RGB,
            PixelFormat::Rgba => gl::RGBA,
        }
    }

    /// Sized internal format requested for the texture storage.
    pub fn internal_format(self) -> gl::types::GLint {
        match self {
            PixelFormat::Rgb => gl::RGB8 as gl::types::GLint,
            PixelFormat::Rgba => gl::RGBA8 as gl::types::GLint,
        }
    }

    /// Number of color components.
    pub fn components(self) -> usize {
        match self {
            PixelFormat::Rgb => 3,
            PixelFormat::Rgba => 4,
        }
    }
}

impl FromStr for PixelFormat {
    type Err = DefinitionError;

    fn from_str(name: &str) -> Result<PixelFormat, DefinitionError> {
        FORMAT_NAMES
            .get(name)
            .copied()
            .ok_or_else(|| DefinitionError::UnknownFormat(name.to_owned()))
    }
}

impl fmt::Display for PixelFormat {
    fn fmt(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
        formatter.write_str(self.name())
    }
}

/// Client-side component datatype paired with a `PixelFormat`.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum PixelType {
    /// One byte per component.
    UnsignedByte,
    /// One 16-bit word per pixel, 5-6-5 packing; RGB only.
    UnsignedShort565,
}

impl PixelType {
    /// The symbolic spelling this type resolves from.
    pub fn name(self) -> &'static str {
        match self {
            PixelType::UnsignedByte => "UNSIGNED_BYTE",
            PixelType::UnsignedShort565 => "UNSIGNED_SHORT_5_6_5",
        }
    }

    /// The GL enumeration value passed as the `type` argument.
    pub fn to_gl_enum(self) -> gl::types::GLenum {
        match self {
            PixelType::UnsignedByte => gl::UNSIGNED_BYTE,
            PixelType::UnsignedShort565 => gl::UNSIGNED_SHORT_5_6_5,
        }
    }

    /// Whether GL accepts this type together with `format`.
    pub fn compatible_with(self, format: PixelFormat) -> bool {
        match self {
            PixelType::UnsignedByte => true,
            PixelType::UnsignedShort565 => format == PixelFormat::Rgb,
        }
    }

    /// Bytes of client memory per pixel for `format`.
    pub fn bytes_per_pixel(self, format: PixelFormat) -> usize {
        match self {
            PixelType::UnsignedByte => format.components(),
            PixelType::UnsignedShort565 => 2,
        }
    }
}

impl FromStr for PixelType {
    type Err = DefinitionError;

    fn from_str(name: &str) -> Result<PixelType, DefinitionError> {
        TYPE_NAMES
            .get(name)
            .copied()
            .ok_or_else(|| DefinitionError::UnknownType(name.to_owned()))
    }
}

impl fmt::Display for PixelType {
    fn fmt(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
        formatter.write_str(self.name())
    }
}

/// Error that can be triggered when building a `TestDefinition`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DefinitionError {
    /// The format name is not in the enumeration table.
    UnknownFormat(String),
    /// The type name is not in the enumeration table.
    UnknownType(String),
    /// The pair is rejected by GL (packed 5-6-5 data must be RGB).
    IncompatiblePair {
        /// The resolved format.
        format: PixelFormat,
        /// The resolved type.
        ty: PixelType,
    },
}

impl fmt::Display for DefinitionError {
    fn fmt(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
        match self {
            DefinitionError::UnknownFormat(name) => {
                write!(formatter, "unknown pixel format name `{}`", name)
            }
            DefinitionError::UnknownType(name) => {
                write!(formatter, "unknown pixel type name `{}`", name)
            }
            DefinitionError::IncompatiblePair { format, ty } => {
                write!(formatter, "pixel type {} cannot be paired with {}", ty, format)
            }
        }
    }
}

impl Error for DefinitionError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names_resolve() {
        assert_eq!("RGBA".parse(), Ok(PixelFormat::Rgba));
        assert_eq!("RGB".parse(), Ok(PixelFormat::Rgb));
        assert_eq!("UNSIGNED_BYTE".parse(), Ok(PixelType::UnsignedByte));
        assert_eq!(
            "UNSIGNED_SHORT_5_6_5".parse(),
            Ok(PixelType::UnsignedShort565)
        );
    }

    #[test]
    fn unknown_names_are_rejected() {
        assert_eq!(
            "BGRA".parse::<PixelFormat>(),
            Err(DefinitionError::UnknownFormat("BGRA".to_owned()))
        );
        assert_eq!(
            "FLOAT".parse::<PixelType>(),
            Err(DefinitionError::UnknownType("FLOAT".to_owned()))
        );
    }

    #[test]
    fn packed_565_requires_rgb() {
        assert!(PixelType::UnsignedShort565.compatible_with(PixelFormat::Rgb));
        assert!(!PixelType::UnsignedShort565.compatible_with(PixelFormat::Rgba));
        assert!(PixelType::UnsignedByte.compatible_with(PixelFormat::Rgba));
    }

    #[test]
    fn pixel_sizes() {
        assert_eq!(
            PixelType::UnsignedByte.bytes_per_pixel(PixelFormat::Rgba),
            4
        );
        assert_eq!(PixelType::UnsignedByte.bytes_per_pixel(PixelFormat::Rgb), 3);
        assert_eq!(
            PixelType::UnsignedShort565.bytes_per_pixel(PixelFormat::Rgb),
            2
        );
    }
}
