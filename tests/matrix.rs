use texconform::{
    Binding, CubeFace, ImageSource, SourceKind, TargetDescriptor, TestCase, UploadMode, GREEN, RED,
};

mod support;

#[test]
fn matrix_has_the_four_canonical_cases_in_order() {
    let cases = TestCase::matrix();

    assert_eq!(cases.len(), 4);
    assert_eq!(
        cases[0],
        TestCase {
            mode: UploadMode::TexImage,
            flip: true,
            top_color: RED,
            bottom_color: GREEN,
        }
    );
    assert_eq!(
        cases[1],
        TestCase {
            mode: UploadMode::TexImage,
            flip: false,
            top_color: GREEN,
            bottom_color: RED,
        }
    );
    assert_eq!(
        cases[2],
        TestCase {
            mode: UploadMode::TexSubImage,
            flip: true,
            top_color: RED,
            bottom_color: GREEN,
        }
    );
    assert_eq!(
        cases[3],
        TestCase {
            mode: UploadMode::TexSubImage,
            flip: false,
            top_color: GREEN,
            bottom_color: RED,
        }
    );
}

#[test]
fn expected_colors_are_determined_by_flip_alone() {
    for mode in [UploadMode::TexImage, UploadMode::TexSubImage] {
        let flipped = TestCase::new(mode, true);
        assert_eq!(flipped.top_color, RED);
        assert_eq!(flipped.bottom_color, GREEN);

        let unflipped = TestCase::new(mode, false);
        assert_eq!(unflipped.top_color, GREEN);
        assert_eq!(unflipped.bottom_color, RED);
    }
}

#[test]
fn square_sources_get_flat_then_cube_passes() {
    let square = ImageSource::from_rgba8(SourceKind::Raster, 2, 2, vec![0; 16]);
    let descriptors = TargetDescriptor::for_source(&square);

    assert_eq!(descriptors.len(), 2);
    assert_eq!(descriptors[0].binding, Binding::Flat);
    assert_eq!(descriptors[1].binding, Binding::Cube);
}

#[test]
fn non_square_sources_skip_the_cube_pass() {
    let raster = ImageSource::reference_raster();
    assert!(!raster.is_square());

    let descriptors = TargetDescriptor::for_source(&raster);
    assert_eq!(descriptors.len(), 1);
    assert_eq!(descriptors[0].binding, Binding::Flat);
}

#[test]
fn flat_binding_has_one_implicit_face() {
    let faces = TargetDescriptor::flat().faces();

    assert_eq!(faces.len(), 1);
    assert_eq!(faces[0].selector(), None);
}

#[test]
fn cube_binding_has_six_faces_in_canonical_order() {
    let faces = TargetDescriptor::cube().faces();

    assert_eq!(faces.len(), 6);
    let selectors: Vec<_> = faces.iter().filter_map(|face| face.selector()).collect();
    assert_eq!(selectors, vec![0, 1, 2, 3, 4, 5]);
}

#[test]
fn cube_faces_map_to_consecutive_gl_targets() {
    let base = CubeFace::PositiveX.to_gl_enum();

    for (index, face) in CubeFace::ALL.iter().enumerate() {
        assert_eq!(face.to_gl_enum(), base + index as u32);
        assert_eq!(face.selector(), index as i32);
    }
}
