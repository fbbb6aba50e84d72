use std::sync::Mutex;

use texconform::{
    verify, ImageSource, PixelFormat, PixelType, QuadProgram, TargetDescriptor, TestCase,
    UploadExecutor, UploadMode,
};

mod support;

use support::RecordingReporter;

static GL_LOCK: Mutex<()> = Mutex::new(());

fn run_case(case: TestCase) -> Option<RecordingReporter> {
    let _lock = GL_LOCK.lock().unwrap();
    support::init_tracing();
    let ctx = support::build_context()?;

    let executor = UploadExecutor::new(PixelFormat::Rgba, PixelType::UnsignedByte);
    let raster = ImageSource::reference_raster();
    let descriptor = TargetDescriptor::flat();
    let program = QuadProgram::textured_quad(&ctx).unwrap();

    let texture = ctx.gen_texture();
    unsafe {
        ctx.gl.BindTexture(texconform::gl::TEXTURE_2D, texture);
    }
    executor.configure_filtering(&ctx, descriptor.binding);
    for face in descriptor.faces() {
        executor.upload(&ctx, face, &case, &raster);
    }

    let mut reporter = RecordingReporter::new();
    verify(&ctx, &program, &descriptor, &case, &mut reporter);

    program.destroy(&ctx);
    ctx.delete_texture(texture);
    assert_eq!(ctx.pending_error(), None);

    Some(reporter)
}

#[test]
fn full_upload_with_flip_puts_red_on_top() {
    let case = TestCase::new(UploadMode::TexImage, true);
    assert_eq!(case.top_color, [255, 0, 0]);
    assert_eq!(case.bottom_color, [0, 255, 0]);

    let Some(reporter) = run_case(case) else { return };

    // one face, two sampled rects, both matching
    assert_eq!(reporter.checks.len(), 2);
    assert!(
        reporter.failed_checks().is_empty(),
        "failed checks: {:?}",
        reporter.failed_checks(),
    );
}

#[test]
fn partial_upload_without_flip_matches_the_full_path() {
    let case = TestCase::new(UploadMode::TexSubImage, false);
    assert_eq!(case.top_color, [0, 255, 0]);
    assert_eq!(case.bottom_color, [255, 0, 0]);

    let Some(reporter) = run_case(case) else { return };

    assert_eq!(reporter.checks.len(), 2);
    assert!(
        reporter.failed_checks().is_empty(),
        "failed checks: {:?}",
        reporter.failed_checks(),
    );
}

#[test]
fn upload_modes_are_asserted_independently() {
    for mode in [UploadMode::TexImage, UploadMode::TexSubImage] {
        let case = TestCase::new(mode, false);
        let Some(reporter) = run_case(case) else { return };

        assert!(
            reporter.failed_checks().is_empty(),
            "{} failed: {:?}",
            mode,
            reporter.failed_checks(),
        );
    }
}
