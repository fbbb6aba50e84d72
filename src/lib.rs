/*!
Conformance harness for OpenGL texture image upload paths.

Texconform verifies that `glTexImage2D` and `glTexSubImage2D` correctly
transfer pixel data from structurally different 2D image sources into
texture objects. Each run drives the same fixed matrix of upload
combinations ({whole-image, sub-region} x {normal, flipped row order} x
{`TEXTURE_2D`, `TEXTURE_CUBE_MAP`}) against four sources that share one
semantic content (top half red, bottom half green) but reach the GL through
independent code paths: a PNG decoded from disk, a raster synthesized in
memory, the same raster after an in-memory PNG encode/decode round trip,
and a copy read back from a framebuffer the raster was rendered into.

Correctness is proved by rendering a textured quad into an offscreen
surface and sampling two small rectangles near the top-left and bottom-left
corners; with nearest filtering and a two-row source, their colors are
fully determined by the orientation flag alone.

# Example

```no_run
use texconform::{generate_test, ConsoleReporter, RunOutcome};

let run = generate_test("RGBA", "UNSIGNED_BYTE", "tests/fixture", |_| true).unwrap();

let mut reporter = ConsoleReporter::new();
match run(&mut reporter) {
    RunOutcome::Completed { failures: 0 } => (),
    RunOutcome::Completed { failures } => panic!("{} upload checks failed", failures),
    RunOutcome::Skipped => (),
    RunOutcome::Aborted => panic!("run aborted before completion"),
}
```

The format/type pair names every upload of the run and is resolved from its
symbolic spelling once, at definition time. The capability prologue runs
against the freshly created context; returning `false` ends the run in the
neutral `Skipped` state.
*/
#![warn(missing_docs)]

use std::path::PathBuf;

pub mod gl {
    #![allow(
        missing_docs,
        non_upper_case_globals,
        non_snake_case,
        non_camel_case_types,
        unused
    )]
    #![allow(clippy::all)]

    include!(concat!(env!("OUT_DIR"), "/gl_bindings.rs"));
}

mod context;
mod format;
mod matrix;
mod program;
mod report;
mod sequencer;
mod source;
mod upload;
mod verify;

pub use crate::context::{ContextCreationError, HarnessContext};
pub use crate::format::{DefinitionError, PixelFormat, PixelType};
pub use crate::matrix::{
    Binding, CubeFace, FaceTarget, TargetDescriptor, TestCase, UploadMode, GREEN, RED,
};
pub use crate::program::{ProgramCreationError, QuadProgram};
pub use crate::report::{ConsoleReporter, Reporter};
pub use crate::sequencer::{RunOutcome, TestSequencer};
pub use crate::source::{AcquisitionError, ImageSource, SourceKind};
pub use crate::upload::UploadExecutor;
pub use crate::verify::verify;

/// A fully resolved upload-conformance run, ready to start.
///
/// The format/type names are resolved against the static enumeration tables
/// when the definition is built, so a misspelled or incompatible pair fails
/// here rather than in the middle of a run.
pub struct TestDefinition {
    pub(crate) format: PixelFormat,
    pub(crate) ty: PixelType,
    pub(crate) resource_dir: PathBuf,
    pub(crate) prologue: Option<Box<dyn FnOnce(&HarnessContext) -> bool>>,
}

impl TestDefinition {
    /// Resolves `format_name`/`type_name` and builds a definition.
    ///
    /// `resource_dir` must contain `red-green.png`, the reference image
    /// whose top half is solid red and bottom half solid green.
    pub fn new<P>(
        format_name: &str,
        type_name: &str,
        resource_dir: P,
    ) -> Result<TestDefinition, DefinitionError>
    where
        P: Into<PathBuf>,
    {
        let format: PixelFormat = format_name.parse()?;
        let ty: PixelType = type_name.parse()?;

        if !ty.compatible_with(format) {
            return Err(DefinitionError::IncompatiblePair { format, ty });
        }

        Ok(TestDefinition {
            format,
            ty,
            resource_dir: resource_dir.into(),
            prologue: None,
        })
    }

    /// Installs a capability gate run against the fresh context; returning
    /// `false` terminates the run cleanly in the `Skipped` state.
    pub fn with_prologue<F>(mut self, prologue: F) -> TestDefinition
    where
        F: FnOnce(&HarnessContext) -> bool + 'static,
    {
        self.prologue = Some(Box::new(prologue));
        self
    }

    /// Client pixel format of every upload in this run.
    pub fn format(&self) -> PixelFormat {
        self.format
    }

    /// Client component datatype of every upload in this run.
    pub fn ty(&self) -> PixelType {
        self.ty
    }

    /// Runs the whole sequence, reporting through `reporter`.
    pub fn run(self, reporter: &mut dyn Reporter) -> RunOutcome {
        TestSequencer::run(self, reporter)
    }
}

/// Builds the run for a format/type pair and returns its initializer.
///
/// Name resolution happens eagerly; the returned closure performs no GL
/// work until invoked, at which point it creates the context, runs the
/// prologue and drives the full source/matrix sequence.
pub fn generate_test<P, F>(
    format_name: &str,
    type_name: &str,
    resource_dir: P,
    prologue: F,
) -> Result<impl FnOnce(&mut dyn Reporter) -> RunOutcome, DefinitionError>
where
    P: Into<PathBuf>,
    F: FnOnce(&HarnessContext) -> bool + 'static,
{
    let definition = TestDefinition::new(format_name, type_name, resource_dir)?
        .with_prologue(prologue);
    Ok(move |reporter: &mut dyn Reporter| definition.run(reporter))
}
