//! The uploads under test.
//!
//! Desktop GL has no upload-time row flip; the orientation flag is honored
//! by packing the source's rows in reversed order. All unpack pixel-store
//! state that *does* exist is pinned on every call so no upload ever
//! inherits ambient state.

use std::ptr;

use crate::context::HarnessContext;
use crate::format::{PixelFormat, PixelType};
use crate::gl;
use crate::matrix::{Binding, FaceTarget, TestCase, UploadMode};
use crate::source::ImageSource;

/// Performs one run's uploads with a fixed client format/type pair.
#[derive(Debug, Copy, Clone)]
pub struct UploadExecutor {
    format: PixelFormat,
    ty: PixelType,
}

impl UploadExecutor {
    /// Builds an executor for a pair already validated at definition time.
    pub fn new(format: PixelFormat, ty: PixelType) -> UploadExecutor {
        UploadExecutor { format, ty }
    }

    /// Client pixel format of every upload.
    pub fn format(&self) -> PixelFormat {
        self.format
    }

    /// Client component datatype of every upload.
    pub fn ty(&self) -> PixelType {
        self.ty
    }

    /// Packs `source` into tightly packed client memory for the executor's
    /// format/type, reversing row order when `flip` is set.
    pub fn pack_pixels(&self, source: &ImageSource, flip: bool) -> Vec<u8> {
        let height = source.height();
        let bytes_per_pixel = self.ty.bytes_per_pixel(self.format);
        let mut packed =
            Vec::with_capacity(source.width() as usize * height as usize * bytes_per_pixel);

        for index in 0..height {
            let y = if flip { height - 1 - index } else { index };
            let row = source.row(y);

            match (self.format, self.ty) {
                (PixelFormat::Rgba, PixelType::UnsignedByte) => {
                    packed.extend_from_slice(row);
                }
                (PixelFormat::Rgb, PixelType::UnsignedByte) => {
                    for pixel in row.chunks_exact(4) {
                        packed.extend_from_slice(&pixel[..3]);
                    }
                }
                (PixelFormat::Rgb, PixelType::UnsignedShort565) => {
                    for pixel in row.chunks_exact(4) {
                        let value = (u16::from(pixel[0] >> 3) << 11)
                            | (u16::from(pixel[1] >> 2) << 5)
                            | u16::from(pixel[2] >> 3);
                        packed.extend_from_slice(&value.to_ne_bytes());
                    }
                }
                // rejected when the definition is built
                (PixelFormat::Rgba, PixelType::UnsignedShort565) => unreachable!(),
            }
        }

        packed
    }

    /// Sets nearest min/mag filtering on `binding` so sampling cannot blend
    /// the two source rows.
    pub fn configure_filtering(&self, ctx: &HarnessContext, binding: Binding) {
        let target = binding.to_gl_enum();
        unsafe {
            ctx.gl.TexParameteri(
                target,
                gl::TEXTURE_MIN_FILTER,
                gl::NEAREST as gl::types::GLint,
            );
            ctx.gl.TexParameteri(
                target,
                gl::TEXTURE_MAG_FILTER,
                gl::NEAREST as gl::types::GLint,
            );
        }
    }

    /// Uploads `source` into `face` of the currently bound texture,
    /// following the case's mode and orientation.
    pub fn upload(
        &self,
        ctx: &HarnessContext,
        face: FaceTarget,
        case: &TestCase,
        source: &ImageSource,
    ) {
        let data = self.pack_pixels(source, case.flip);
        let target = face.image_target();
        let width = source.width() as gl::types::GLsizei;
        let height = source.height() as gl::types::GLsizei;
        let format = self.format.to_gl_enum();
        let ty = self.ty.to_gl_enum();
        let internal = self.format.internal_format();
        let gl = &ctx.gl;

        unsafe {
            // unpack state is decided here, per call, never inherited
            gl.PixelStorei(gl::UNPACK_ALIGNMENT, 1);
            gl.PixelStorei(gl::UNPACK_ROW_LENGTH, 0);
            gl.PixelStorei(gl::UNPACK_SKIP_PIXELS, 0);
            gl.PixelStorei(gl::UNPACK_SKIP_ROWS, 0);

            match case.mode {
                UploadMode::TexImage => {
                    gl.TexImage2D(
                        target,
                        0,
                        internal,
                        width,
                        height,
                        0,
                        format,
                        ty,
                        data.as_ptr() as *const _,
                    );
                }
                UploadMode::TexSubImage => {
                    // allocate undefined storage, then cover the full extent
                    gl.TexImage2D(target, 0, internal, width, height, 0, format, ty, ptr::null());
                    gl.TexSubImage2D(
                        target,
                        0,
                        0,
                        0,
                        width,
                        height,
                        format,
                        ty,
                        data.as_ptr() as *const _,
                    );
                }
            }
        }
    }
}
