//! Group watermark stamping
//!
//! Every page gets the group name drawn near its visual bottom-left corner.
//! The text matrix counters the page's /Rotate so the stamp reads upright in
//! a viewer, and the original content is wrapped in `q … Q` so its graphics
//! state cannot leak into the stamp.

use crate::constants::*;
use crate::options::WatermarkOptions;
use crate::pages::{inherited_attribute, page_media_box, page_rotation, resolve_dictionary};
use crate::types::Result;
use lopdf::{Dictionary, Document, Object, ObjectId, Stream};
use rand::Rng;

/// RGB fill color with components in 0..=1
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
}

impl Color {
    pub const fn rgb(r: f32, g: f32, b: f32) -> Self {
        Self { r, g, b }
    }
}

/// Colors a group stamp may be drawn in
pub const PALETTE: [Color; 7] = [
    Color::rgb(1.0, 0.0, 0.0),      // red
    Color::rgb(0.0, 0.392, 0.0),    // dark green
    Color::rgb(1.0, 0.647, 0.0),    // orange
    Color::rgb(0.498, 1.0, 0.831),  // aquamarine
    Color::rgb(0.580, 0.0, 0.827),  // dark violet
    Color::rgb(0.722, 0.525, 0.043), // dark goldenrod
    Color::rgb(1.0, 0.0, 1.0),      // magenta
];

/// Draw one palette color for a whole group
pub fn pick_color(rng: &mut impl Rng) -> Color {
    PALETTE[rng.random_range(0..PALETTE.len())]
}

/// Stamp `text` onto every page of `doc`, returning the number of pages stamped
pub fn stamp_document(
    doc: &mut Document,
    text: &str,
    color: Color,
    options: &WatermarkOptions,
) -> Result<usize> {
    let font_id = doc.add_object(Dictionary::from_iter(vec![
        ("Type", Object::Name(b"Font".to_vec())),
        ("Subtype", Object::Name(b"Type1".to_vec())),
        ("BaseFont", Object::Name(WATERMARK_BASE_FONT.as_bytes().to_vec())),
        ("Encoding", Object::Name(b"WinAnsiEncoding".to_vec())),
    ]));
    let save_state_id = doc.add_object(Stream::new(Dictionary::new(), b"q\n".to_vec()));

    let encoded = encode_win_ansi(text);
    let page_ids: Vec<ObjectId> = doc.get_pages().values().copied().collect();

    for &page_id in &page_ids {
        let media_box = page_media_box(doc, page_id);
        let rotation = page_rotation(doc, page_id);
        let ops = watermark_operations(&encoded, color, options, media_box, rotation);
        let mark_id = doc.add_object(Stream::new(Dictionary::new(), ops));

        let resources = page_resources_with_font(doc, page_id, font_id);
        let mut contents = vec![Object::Reference(save_state_id)];
        contents.extend(existing_contents(doc, page_id));
        contents.push(Object::Reference(mark_id));

        let page = doc.get_dictionary_mut(page_id)?;
        page.set("Contents", Object::Array(contents));
        page.set("Resources", Object::Dictionary(resources));
    }

    log::debug!("Stamped {} pages with '{}'", page_ids.len(), text);
    Ok(page_ids.len())
}

/// Content stream references of a page, flattening an indirect array
fn existing_contents(doc: &Document, page_id: ObjectId) -> Vec<Object> {
    let Ok(page) = doc.get_dictionary(page_id) else {
        return Vec::new();
    };
    match page.get(b"Contents") {
        Ok(Object::Reference(id)) => match doc.get_object(*id) {
            Ok(Object::Array(items)) => items.clone(),
            _ => vec![Object::Reference(*id)],
        },
        Ok(Object::Array(items)) => items.clone(),
        _ => Vec::new(),
    }
}

/// The page's (possibly inherited) resources with the watermark font added
fn page_resources_with_font(doc: &Document, page_id: ObjectId, font_id: ObjectId) -> Dictionary {
    let mut resources = inherited_attribute(doc, page_id, b"Resources")
        .and_then(|obj| resolve_dictionary(doc, obj))
        .unwrap_or_else(Dictionary::new);

    let mut fonts = resources
        .get(b"Font")
        .ok()
        .and_then(|obj| resolve_dictionary(doc, obj))
        .unwrap_or_else(Dictionary::new);
    fonts.set(WATERMARK_FONT_RESOURCE, Object::Reference(font_id));
    resources.set("Font", Object::Dictionary(fonts));

    resources
}

/// Content stream that restores the page's state and draws the stamp.
///
/// Starts with `Q` to close the `q` placed in front of the page content.
fn watermark_operations(
    text: &[u8],
    color: Color,
    options: &WatermarkOptions,
    media_box: [f32; 4],
    rotation: i64,
) -> Vec<u8> {
    let [a, b, c, d, e, f] = text_matrix(
        media_box,
        rotation,
        mm_to_pt(options.offset_x_mm),
        mm_to_pt(options.offset_y_mm),
    );

    let mut ops = Vec::new();
    ops.extend_from_slice(b"Q\nq\nBT\n");
    ops.extend_from_slice(
        format!("/{} {} Tf\n", WATERMARK_FONT_RESOURCE, options.font_size_pt).as_bytes(),
    );
    ops.extend_from_slice(format!("{} {} {} rg\n", color.r, color.g, color.b).as_bytes());
    ops.extend_from_slice(format!("{} {} {} {} {} {} Tm\n", a, b, c, d, e, f).as_bytes());
    ops.push(b'(');
    ops.extend_from_slice(&escape_literal(text));
    ops.extend_from_slice(b") Tj\nET\nQ\n");
    ops
}

/// Text matrix placing the origin `dx`/`dy` points from the visual
/// bottom-left corner, with the baseline running left to right as displayed.
///
/// Viewers turn a page clockwise by /Rotate; the matrix turns the text
/// counter-clockwise by the same angle.
pub fn text_matrix(media_box: [f32; 4], rotation: i64, dx: f32, dy: f32) -> [f32; 6] {
    let [x0, y0, x1, y1] = media_box;
    match rotation {
        90 => [0.0, 1.0, -1.0, 0.0, x1 - dy, y0 + dx],
        180 => [-1.0, 0.0, 0.0, -1.0, x1 - dx, y1 - dy],
        270 => [0.0, -1.0, 1.0, 0.0, x0 + dy, y1 - dx],
        _ => [1.0, 0.0, 0.0, 1.0, x0 + dx, y0 + dy],
    }
}

/// Encode text for a WinAnsi Type1 font; characters outside it become `?`
pub fn encode_win_ansi(text: &str) -> Vec<u8> {
    text.chars()
        .map(|ch| match ch as u32 {
            code @ 0x20..=0x7E | code @ 0xA0..=0xFF => code as u8,
            0x20AC => 0x80, // €
            0x2013 => 0x96, // –
            0x2014 => 0x97, // —
            _ => b'?',
        })
        .collect()
}

fn escape_literal(bytes: &[u8]) -> Vec<u8> {
    let mut escaped = Vec::with_capacity(bytes.len());
    for &byte in bytes {
        if matches!(byte, b'(' | b')' | b'\\') {
            escaped.push(b'\\');
        }
        escaped.push(byte);
    }
    escaped
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    const A4: [f32; 4] = [0.0, 0.0, 595.0, 842.0];

    /// Where a point in user space ends up after the viewer applies /Rotate
    fn displayed(point: (f32, f32), media_box: [f32; 4], rotation: i64) -> (f32, f32) {
        let [x0, y0, x1, y1] = media_box;
        let (x, y) = (point.0 - x0, point.1 - y0);
        let (w, h) = (x1 - x0, y1 - y0);
        match rotation {
            90 => (y, w - x),
            180 => (w - x, h - y),
            270 => (h - y, x),
            _ => (x, y),
        }
    }

    #[test]
    fn test_stamp_origin_is_bottom_left_for_every_rotation() {
        for rotation in [0, 90, 180, 270] {
            let [a, b, c, d, e, f] = text_matrix(A4, rotation, 14.0, 5.0);
            let origin = displayed((e, f), A4, rotation);
            assert!((origin.0 - 14.0).abs() < 1e-3, "rotation {}", rotation);
            assert!((origin.1 - 5.0).abs() < 1e-3, "rotation {}", rotation);

            // One unit along the baseline moves right on screen, one unit up moves up
            let along = displayed((e + a, f + b), A4, rotation);
            let up = displayed((e + c, f + d), A4, rotation);
            assert!((along.0 - origin.0 - 1.0).abs() < 1e-3);
            assert!((along.1 - origin.1).abs() < 1e-3);
            assert!((up.0 - origin.0).abs() < 1e-3);
            assert!((up.1 - origin.1 - 1.0).abs() < 1e-3);
        }
    }

    #[test]
    fn test_offset_media_box() {
        let m = text_matrix([100.0, 200.0, 700.0, 1000.0], 0, 10.0, 4.0);
        assert_eq!(m, [1.0, 0.0, 0.0, 1.0, 110.0, 204.0]);
    }

    #[test]
    fn test_win_ansi_encoding() {
        assert_eq!(encode_win_ansi("Jörg Müller"), b"J\xf6rg M\xfcller".to_vec());
        assert_eq!(encode_win_ansi("李"), b"?".to_vec());
        assert_eq!(encode_win_ansi("a€"), vec![b'a', 0x80]);
    }

    #[test]
    fn test_literal_escaping() {
        assert_eq!(escape_literal(b"a(b)\\c"), b"a\\(b\\)\\\\c".to_vec());
    }

    #[test]
    fn test_seeded_color_is_reproducible() {
        let first = pick_color(&mut StdRng::seed_from_u64(7));
        let second = pick_color(&mut StdRng::seed_from_u64(7));
        assert_eq!(first, second);
        assert!(PALETTE.contains(&first));
    }
}
