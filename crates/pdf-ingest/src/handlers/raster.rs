//! Image to PDF rendering

use crate::dispatch::file_extension;
use crate::types::*;
use image::{DynamicImage, Rgb, RgbImage};
use printpdf::{
    Mm, Op, PdfDocument, PdfPage, PdfSaveOptions, PdfWarnMsg, Pt, RawImage, RawImageData,
    RawImageFormat, XObjectTransform,
};
use std::path::{Path, PathBuf};

/// Millimeters per inch
const MM_PER_INCH: f32 = 25.4;

/// Where the PDF rendering of `image` is written: `<stem>_<ext>.pdf` beside it.
///
/// The name depends only on the image path, so a rerun overwrites its own
/// earlier rendering and never a submitted `<stem>.pdf`.
pub fn image_pdf_path(image: &Path) -> PathBuf {
    let stem = image
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();

    image.with_file_name(format!("{stem}_{}.pdf", file_extension(image)))
}

/// Decode `image`, flatten it and write a single-page PDF to `target`
pub fn convert_image(image: &Path, target: &Path, dpi: f32) -> Result<()> {
    let decoded = ::image::open(image).map_err(|source| IngestError::Image {
        path: image.to_path_buf(),
        source,
    })?;

    let title = image
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| "Image".to_string());

    let bytes = render_image_pdf(&flatten(&decoded), &title, dpi);
    std::fs::write(target, bytes)?;
    Ok(())
}

/// Composite onto white and drop the alpha channel
fn flatten(image: &DynamicImage) -> RgbImage {
    let rgba = image.to_rgba8();
    let mut rgb = RgbImage::new(rgba.width(), rgba.height());

    for (x, y, pixel) in rgba.enumerate_pixels() {
        let alpha = pixel[3] as u32;
        let blend = |c: u8| ((c as u32 * alpha + 255 * (255 - alpha)) / 255) as u8;
        rgb.put_pixel(x, y, Rgb([blend(pixel[0]), blend(pixel[1]), blend(pixel[2])]));
    }

    rgb
}

/// Render an RGB image as a PDF whose only page is exactly the image size at `dpi`
pub fn render_image_pdf(image: &RgbImage, title: &str, dpi: f32) -> Vec<u8> {
    let (width, height) = image.dimensions();
    let width_mm = width as f32 * MM_PER_INCH / dpi;
    let height_mm = height as f32 * MM_PER_INCH / dpi;

    let raw = RawImage {
        pixels: RawImageData::U8(image.as_raw().clone()),
        width: width as usize,
        height: height as usize,
        data_format: RawImageFormat::RGB8,
        tag: Vec::new(),
    };

    let mut doc = PdfDocument::new(title);
    let xobject_id = doc.add_image(&raw);

    let ops = vec![Op::UseXobject {
        id: xobject_id,
        transform: XObjectTransform {
            translate_x: Some(Pt(0.0)),
            translate_y: Some(Pt(0.0)),
            scale_x: None,
            scale_y: None,
            dpi: Some(dpi),
            rotate: None,
        },
    }];

    let page = PdfPage::new(Mm(width_mm), Mm(height_mm), ops);
    doc.with_pages(vec![page]);

    let mut warnings: Vec<PdfWarnMsg> = Vec::new();
    let bytes = doc.save(&PdfSaveOptions::default(), &mut warnings);
    if !warnings.is_empty() {
        log::debug!("{} warnings while writing image PDF {}", warnings.len(), title);
    }

    bytes
}
