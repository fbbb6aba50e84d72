//! The linear stage machine driving a whole run.
//!
//! Each stage advances only on success of the previous one: context and
//! capability check, the file-decoded base image, the synthesized raster,
//! the PNG round trip of that raster, the framebuffer-derived copy, and a
//! final residual-error check. Acquisition failures terminate the run;
//! verification mismatches accumulate and never abort it.

use std::path::PathBuf;

use tracing::debug;

use crate::context::{error_name, HarnessContext};
use crate::gl;
use crate::matrix::{Binding, FaceTarget, TargetDescriptor, TestCase, UploadMode};
use crate::program::{ProgramCreationError, QuadProgram};
use crate::report::Reporter;
use crate::source::{AcquisitionError, ImageSource, SourceKind};
use crate::upload::UploadExecutor;
use crate::verify::verify;
use crate::TestDefinition;

/// File name of the reference image inside the resource directory.
pub const REFERENCE_IMAGE: &str = "red-green.png";

/// Terminal state of a run.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum RunOutcome {
    /// All stages ran; `failures` counts the assertions that did not hold.
    Completed {
        /// Failed checks accumulated over the whole run.
        failures: usize,
    },
    /// The capability prologue declined the context; not a failure.
    Skipped,
    /// A fatal error (context, acquisition or program creation) ended the
    /// run before completion.
    Aborted,
}

/// Drives one `TestDefinition` through all of its stages.
pub struct TestSequencer<'a> {
    ctx: HarnessContext,
    executor: UploadExecutor,
    resource_dir: PathBuf,
    reporter: &'a mut dyn Reporter,
}

impl<'a> TestSequencer<'a> {
    /// Runs `definition` to its terminal state, reporting through
    /// `reporter`.
    pub fn run(definition: TestDefinition, reporter: &'a mut dyn Reporter) -> RunOutcome {
        reporter.begin_description(&format!(
            "verify TexImage2D and TexSubImage2D upload paths taking image sources ({}/{})",
            definition.format.name(),
            definition.ty.name(),
        ));

        let ctx = match HarnessContext::new() {
            Ok(ctx) => ctx,
            Err(error) => {
                reporter.report_failure(&format!("context creation failed: {}", error));
                reporter.finish();
                return RunOutcome::Aborted;
            }
        };

        if let Some(prologue) = definition.prologue {
            if !prologue(&ctx) {
                reporter.log_step("required capabilities are missing, skipping");
                reporter.finish();
                return RunOutcome::Skipped;
            }
        }

        let sequencer = TestSequencer {
            ctx,
            executor: UploadExecutor::new(definition.format, definition.ty),
            resource_dir: definition.resource_dir,
            reporter,
        };

        sequencer.run_stages()
    }

    fn run_stages(mut self) -> RunOutcome {
        // file-decoded base image
        let path = self.resource_dir.join(REFERENCE_IMAGE);
        let base = match ImageSource::from_png_file(&path) {
            Ok(source) => source,
            Err(error) => return self.abort(&error.to_string()),
        };
        if let Err(error) = self.run_matrix_pass(&base) {
            return self.abort_on_program(error);
        }
        debug!("base image pass complete");

        // synthesized raster, then its encoded round trip in the background
        let raster = ImageSource::reference_raster();
        if let Err(error) = self.run_matrix_pass(&raster) {
            return self.abort_on_program(error);
        }
        let encoded = match raster.encode_png() {
            Ok(bytes) => bytes,
            Err(error) => return self.abort(&error.to_string()),
        };
        let pending_decode = ImageSource::decode_png_in_background(encoded);
        debug!("raster pass complete, round-trip decode started");

        // round-tripped image; a decode failure ends the run here
        let round_tripped = match pending_decode.recv() {
            Ok(Ok(source)) => source,
            Ok(Err(error)) => return self.abort(&error.to_string()),
            Err(_) => return self.abort(&AcquisitionError::NoResolution.to_string()),
        };
        if let Err(error) = self.run_matrix_pass(&round_tripped) {
            return self.abort_on_program(error);
        }
        debug!("round-tripped image pass complete");

        // framebuffer-derived copy of the same raster
        let derived = match self.derive_framebuffer_source(&raster) {
            Ok(source) => source,
            Err(error) => return self.abort_on_program(error),
        };
        if let Err(error) = self.run_matrix_pass(&derived) {
            return self.abort_on_program(error);
        }
        debug!("framebuffer-derived pass complete");

        // residual-error check
        match self.ctx.pending_error() {
            None => self.reporter.check(true, "no pending GL error"),
            Some(error) => self.reporter.check(
                false,
                &format!("should be no pending GL error, got {}", error_name(error)),
            ),
        }

        let failures = self.reporter.failures();
        self.reporter.finish();
        RunOutcome::Completed { failures }
    }

    /// One full matrix pass: the four cases against the flat binding, then
    /// against the cube binding when the source is square.
    fn run_matrix_pass(&mut self, source: &ImageSource) -> Result<(), ProgramCreationError> {
        self.reporter.log_step(&format!(
            "running the upload matrix against the {} ({}x{})",
            source.kind(),
            source.width(),
            source.height(),
        ));

        for descriptor in TargetDescriptor::for_source(source) {
            let program = match descriptor.binding {
                Binding::Flat => QuadProgram::textured_quad(&self.ctx)?,
                Binding::Cube => QuadProgram::textured_quad_cube(&self.ctx)?,
            };

            for case in TestCase::matrix() {
                self.run_one_iteration(source, &case, &descriptor, &program);
            }

            program.destroy(&self.ctx);
        }

        if !source.is_square() {
            self.reporter
                .log_step("source is not square, cube-map binding skipped");
        }

        Ok(())
    }

    fn run_one_iteration(
        &mut self,
        source: &ImageSource,
        case: &TestCase,
        descriptor: &TargetDescriptor,
        program: &QuadProgram,
    ) {
        self.reporter.log_step(&format!(
            "testing {} with flip={} binding={}",
            case.mode, case.flip, descriptor.binding,
        ));

        let binding = descriptor.binding;
        let texture = self.ctx.gen_texture();
        unsafe {
            self.ctx.gl.BindTexture(binding.to_gl_enum(), texture);
        }
        self.executor.configure_filtering(&self.ctx, binding);

        for face in descriptor.faces() {
            self.executor.upload(&self.ctx, face, case, source);
        }

        verify(&self.ctx, program, descriptor, case, &mut *self.reporter);

        self.ctx.delete_texture(texture);
    }

    /// Canvas-analog acquisition path: the raster is uploaded, drawn to
    /// the offscreen surface and read back as a new square source.
    fn derive_framebuffer_source(
        &mut self,
        raster: &ImageSource,
    ) -> Result<ImageSource, ProgramCreationError> {
        self.reporter
            .log_step("deriving a source from the raster through the framebuffer");

        let program = QuadProgram::textured_quad(&self.ctx)?;
        let texture = self.ctx.gen_texture();
        unsafe {
            self.ctx.gl.BindTexture(gl::TEXTURE_2D, texture);
        }
        self.executor.configure_filtering(&self.ctx, Binding::Flat);
        let case = TestCase::new(UploadMode::TexImage, false);
        self.executor.upload(&self.ctx, FaceTarget::Flat, &case, raster);

        self.ctx.clear_surface([0.0, 0.0, 0.0, 1.0]);
        program.draw(&self.ctx);

        let (width, height) = self.ctx.dimensions();
        // ReadPixels returns rows bottom-up; the unflipped draw put the
        // raster's row 0 at the bottom, so the readback is top-down again
        let pixels = self.ctx.read_rect(0, 0, width, height);

        program.destroy(&self.ctx);
        self.ctx.delete_texture(texture);

        Ok(ImageSource::from_rgba8(
            SourceKind::Framebuffer,
            width,
            height,
            pixels,
        ))
    }

    fn abort(&mut self, message: &str) -> RunOutcome {
        self.reporter.report_failure(message);
        self.reporter.finish();
        RunOutcome::Aborted
    }

    fn abort_on_program(&mut self, error: ProgramCreationError) -> RunOutcome {
        self.abort(&format!("program creation failed: {}", error))
    }
}
