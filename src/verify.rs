//! Render-and-sample verification of an uploaded texture.
//!
//! A stale pixel must never masquerade as a pass: the surface is cleared
//! to a sentinel color distinguishable from both expected colors before
//! every draw.

use crate::context::HarnessContext;
use crate::gl;
use crate::matrix::{TargetDescriptor, TestCase};
use crate::program::QuadProgram;
use crate::report::Reporter;

/// Side length of the sampled rectangles.
const SAMPLE_SIZE: u32 = 2;
/// Offset of the sample rectangles from the surface corners.
const SAMPLE_MARGIN: u32 = 4;

const SENTINEL: [f32; 4] = [0.0, 0.0, 0.0, 1.0];

/// Draws the bound texture through `program` for every face of
/// `descriptor` and asserts the sampled corner colors.
///
/// Mismatches are reported through `reporter` and do not abort the
/// remaining faces.
pub fn verify(
    ctx: &HarnessContext,
    program: &QuadProgram,
    descriptor: &TargetDescriptor,
    case: &TestCase,
    reporter: &mut dyn Reporter,
) {
    let (_, height) = ctx.dimensions();

    for face in descriptor.faces() {
        if let Some(selector) = face.selector() {
            program.set_face(ctx, selector);
        }

        ctx.clear_surface(SENTINEL);

        // alpha stays untouched; comparisons are RGB-only
        unsafe {
            ctx.gl.ColorMask(gl::TRUE, gl::TRUE, gl::TRUE, gl::FALSE);
        }
        program.draw(ctx);
        unsafe {
            ctx.gl.ColorMask(gl::TRUE, gl::TRUE, gl::TRUE, gl::TRUE);
        }

        reporter.log_step("checking lower left corner");
        check_rect(ctx, SAMPLE_MARGIN, SAMPLE_MARGIN, case.bottom_color, reporter);

        reporter.log_step("checking upper left corner");
        check_rect(
            ctx,
            SAMPLE_MARGIN,
            height - 2 * SAMPLE_MARGIN,
            case.top_color,
            reporter,
        );
    }
}

fn check_rect(
    ctx: &HarnessContext,
    x: u32,
    y: u32,
    expected: [u8; 3],
    reporter: &mut dyn Reporter,
) {
    let data = ctx.read_rect(x, y, SAMPLE_SIZE, SAMPLE_SIZE);

    let mismatch = data
        .chunks_exact(4)
        .map(|pixel| [pixel[0], pixel[1], pixel[2]])
        .find(|&actual| actual != expected);

    match mismatch {
        None => reporter.check(
            true,
            &format!(
                "rect at ({}, {}) is rgb({}, {}, {})",
                x, y, expected[0], expected[1], expected[2]
            ),
        ),
        Some(actual) => reporter.check(
            false,
            &format!(
                "rect at ({}, {}) should be rgb({}, {}, {}), was rgb({}, {}, {})",
                x, y, expected[0], expected[1], expected[2], actual[0], actual[1], actual[2]
            ),
        ),
    }
}
