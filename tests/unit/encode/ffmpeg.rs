use super::*;

fn cfg(alpha: AlphaMode) -> EncodeConfig {
    EncodeConfig {
        width: 640,
        height: 360,
        fps: 30,
        out_path: "out/captions.mov".into(),
        overwrite: true,
        alpha,
    }
}

#[test]
fn validate_rejects_zero_dimensions_and_fps() {
    let mut c = cfg(AlphaMode::Preserve);
    c.width = 0;
    assert!(c.validate().is_err());

    let mut c = cfg(AlphaMode::Preserve);
    c.fps = 0;
    assert!(c.validate().is_err());
}

#[test]
fn odd_dimensions_only_matter_when_flattening() {
    let mut c = cfg(AlphaMode::Preserve);
    c.width = 641;
    assert!(c.validate().is_ok());

    let mut c = cfg(AlphaMode::FlattenOver([0, 0, 0, 255]));
    c.width = 641;
    assert!(c.validate().is_err());
}

#[test]
fn default_mov_config_preserves_alpha() {
    let c = default_mov_config("out/captions.mov", 1920, 1080, 30);
    assert_eq!(c.alpha, AlphaMode::Preserve);
    assert!(c.overwrite);
}

#[test]
fn unpremultiply_round_trips_straight_pixels() {
    // Premul white at 50% alpha -> straight white at 50% alpha.
    let src = [128u8, 128, 128, 128, 0, 0, 0, 0];
    let mut dst = [0u8; 8];
    unpremultiply_rgba8(&mut dst, &src, true).unwrap();
    assert_eq!(dst[3], 128);
    assert!(dst[0] >= 254, "r={}", dst[0]);
    // Fully transparent stays all-zero.
    assert_eq!(&dst[4..], &[0, 0, 0, 0]);
}

#[test]
fn unpremultiply_passes_straight_input_through() {
    let src = [10u8, 20, 30, 40];
    let mut dst = [0u8; 4];
    unpremultiply_rgba8(&mut dst, &src, false).unwrap();
    assert_eq!(dst, src);
}

#[test]
fn flatten_composites_over_background() {
    // Transparent pixel becomes the background; opaque pixel is kept.
    let src = [0u8, 0, 0, 0, 255, 255, 255, 255];
    let mut dst = [0u8; 8];
    flatten_to_opaque_rgba8(&mut dst, &src, true, [10, 20, 30, 255]).unwrap();
    assert_eq!(&dst[..4], &[10, 20, 30, 255]);
    assert_eq!(&dst[4..], &[255, 255, 255, 255]);
}

#[test]
fn flatten_blends_half_transparent_premul() {
    // 50% premul white over black: stays at the premul value.
    let src = [128u8, 128, 128, 128];
    let mut dst = [0u8; 4];
    flatten_to_opaque_rgba8(&mut dst, &src, true, [0, 0, 0, 255]).unwrap();
    assert_eq!(dst, [128, 128, 128, 255]);
}

#[test]
fn buffer_length_mismatch_is_rejected() {
    let src = [0u8; 8];
    let mut dst = [0u8; 4];
    assert!(unpremultiply_rgba8(&mut dst, &src, true).is_err());
    assert!(flatten_to_opaque_rgba8(&mut dst, &src, true, [0, 0, 0, 255]).is_err());
}
