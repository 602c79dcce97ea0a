use super::*;

fn encode_png(width: u32, height: u32) -> Vec<u8> {
    let image = image::RgbaImage::from_pixel(width, height, image::Rgba([10, 20, 30, 255]));
    let mut out = std::io::Cursor::new(Vec::new());
    image
        .write_to(&mut out, image::ImageFormat::Png)
        .expect("encode png");
    out.into_inner()
}

#[test]
fn decodes_small_images_at_full_size() {
    let preview = decode_preview_image(&encode_png(4, 3)).expect("preview");
    assert_eq!((preview.width, preview.height), (4, 3));
    assert_eq!(preview.rgba.len(), 4 * 3 * 4);
    assert_eq!(&preview.rgba[..4], &[10, 20, 30, 255]);
}

#[test]
fn large_images_are_thumbnailed_keeping_aspect() {
    let preview = decode_preview_image(&encode_png(2048, 1024)).expect("preview");
    assert_eq!((preview.width, preview.height), (1024, 512));
}

#[test]
fn undecodable_bytes_report_an_error() {
    assert!(decode_preview_image(b"not an image").is_err());
    assert!(decode_image_for_clipboard(b"").is_err());
}
