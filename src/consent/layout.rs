//! Page composition on top of lopdf.
//!
//! A [`Composer`] keeps a vertical cursor, starts new pages when text runs
//! past the bottom margin and assembles the page tree on [`Composer::finish`].

use std::io::Write;

use flate2::write::ZlibEncoder;
use flate2::Compression;
use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Dictionary, Document, Object, ObjectId, Stream, StringFormat};

use crate::consent::fonts::{encode_win_ansi, Font};
use crate::consent::signature::SignatureImage;

/// A4 in points.
pub const PAGE_WIDTH: f32 = 595.28;
pub const PAGE_HEIGHT: f32 = 841.89;
pub const MARGIN: f32 = 50.0;

/// Extra leading between wrapped lines and after a paragraph.
const LINE_GAP: f32 = 4.0;
const PARAGRAPH_GAP: f32 = 6.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Align {
    Left,
    Center,
}

#[derive(Debug, Clone, Copy)]
pub struct TextStyle {
    pub size: f32,
    pub font: Font,
    pub align: Align,
}

impl TextStyle {
    pub const fn new(size: f32, font: Font, align: Align) -> Self {
        Self { size, font, align }
    }
}

#[derive(Default)]
struct Page {
    operations: Vec<Operation>,
    images: Vec<(String, ObjectId)>,
}

pub struct Composer {
    doc: Document,
    pages_id: ObjectId,
    fonts: Vec<(Font, ObjectId)>,
    pages: Vec<Page>,
    cursor: f32,
}

impl Composer {
    pub fn new() -> Self {
        let mut doc = Document::with_version("1.7");
        let pages_id = doc.new_object_id();
        let fonts = Font::ALL
            .iter()
            .map(|&font| {
                let id = doc.add_object(dictionary! {
                    "Type" => "Font",
                    "Subtype" => "Type1",
                    "BaseFont" => font.base_font(),
                    "Encoding" => "WinAnsiEncoding",
                });
                (font, id)
            })
            .collect();

        Self {
            doc,
            pages_id,
            fonts,
            pages: vec![Page::default()],
            cursor: PAGE_HEIGHT - MARGIN,
        }
    }

    /// Current baseline position.
    pub fn cursor(&self) -> f32 {
        self.cursor
    }

    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    pub fn space(&mut self, amount: f32) {
        self.cursor -= amount;
    }

    /// Start a new page when less than `needed` points remain above the
    /// page bottom.
    pub fn keep_room(&mut self, needed: f32) {
        if self.cursor < needed {
            self.new_page();
        }
    }

    fn new_page(&mut self) {
        self.pages.push(Page::default());
        self.cursor = PAGE_HEIGHT - MARGIN;
    }

    fn page(&mut self) -> &mut Page {
        // `pages` is never empty: `new` seeds the first page.
        let last = self.pages.len() - 1;
        &mut self.pages[last]
    }

    /// Draw a paragraph, wrapping it to the content width.
    pub fn text(&mut self, text: &str, style: TextStyle) {
        let max_width = PAGE_WIDTH - 2.0 * MARGIN;
        let lines = wrap(text, style.font, style.size, max_width);
        let last = lines.len().saturating_sub(1);

        for (i, line) in lines.iter().enumerate() {
            if self.cursor < MARGIN {
                self.new_page();
            }
            self.draw_line_of_text(line, style);
            if i < last {
                self.cursor -= style.size + LINE_GAP;
            }
        }
        self.cursor -= style.size + PARAGRAPH_GAP;
    }

    fn draw_line_of_text(&mut self, line: &str, style: TextStyle) {
        let x = match style.align {
            Align::Left => MARGIN,
            Align::Center => ((PAGE_WIDTH - style.font.text_width(line, style.size)) / 2.0).max(MARGIN),
        };
        let y = self.cursor;
        self.page().operations.extend([
            Operation::new("BT", vec![]),
            Operation::new("Tf", vec![style.font.resource_name().into(), style.size.into()]),
            Operation::new("rg", vec![0.0f32.into(), 0.0f32.into(), 0.0f32.into()]),
            Operation::new("Td", vec![x.into(), y.into()]),
            Operation::new(
                "Tj",
                vec![Object::String(encode_win_ansi(line), StringFormat::Literal)],
            ),
            Operation::new("ET", vec![]),
        ]);
    }

    /// Stroke a black line.
    pub fn line(&mut self, from: (f32, f32), to: (f32, f32), thickness: f32) {
        self.page().operations.extend([
            Operation::new("q", vec![]),
            Operation::new("w", vec![thickness.into()]),
            Operation::new("RG", vec![0.0f32.into(), 0.0f32.into(), 0.0f32.into()]),
            Operation::new("m", vec![from.0.into(), from.1.into()]),
            Operation::new("l", vec![to.0.into(), to.1.into()]),
            Operation::new("S", vec![]),
            Operation::new("Q", vec![]),
        ]);
    }

    /// Embed `image` and draw it into the box at `origin` (lower-left corner)
    /// with the given `size`.
    pub fn image(
        &mut self,
        image: &SignatureImage,
        origin: (f32, f32),
        size: (f32, f32),
    ) -> std::io::Result<()> {
        let mut dict = dictionary! {
            "Type" => "XObject",
            "Subtype" => "Image",
            "Width" => i64::from(image.width),
            "Height" => i64::from(image.height),
            "ColorSpace" => image.color_space.pdf_name(),
            "BitsPerComponent" => 8i64,
            "Filter" => "FlateDecode",
        };

        if let Some(alpha) = &image.alpha {
            let mask = Stream::new(
                dictionary! {
                    "Type" => "XObject",
                    "Subtype" => "Image",
                    "Width" => i64::from(image.width),
                    "Height" => i64::from(image.height),
                    "ColorSpace" => "DeviceGray",
                    "BitsPerComponent" => 8i64,
                    "Filter" => "FlateDecode",
                },
                deflate(alpha)?,
            );
            let mask_id = self.doc.add_object(mask);
            dict.set("SMask", mask_id);
        }

        let image_id = self.doc.add_object(Stream::new(dict, deflate(&image.samples)?));
        let page = self.page();
        let name = format!("Im{}", page.images.len() + 1);
        page.operations.extend([
            Operation::new("q", vec![]),
            Operation::new(
                "cm",
                vec![
                    size.0.into(),
                    0.0f32.into(),
                    0.0f32.into(),
                    size.1.into(),
                    origin.0.into(),
                    origin.1.into(),
                ],
            ),
            Operation::new("Do", vec![Object::Name(name.clone().into_bytes())]),
            Operation::new("Q", vec![]),
        ]);
        page.images.push((name, image_id));
        Ok(())
    }

    /// Build the page tree and serialize the document.
    pub fn finish(mut self, title: &str) -> Result<Vec<u8>, lopdf::Error> {
        let mut font_resources = Dictionary::new();
        for (font, id) in &self.fonts {
            font_resources.set(font.resource_name(), *id);
        }

        let mut kids = Vec::with_capacity(self.pages.len());
        for page in std::mem::take(&mut self.pages) {
            let content = Content {
                operations: page.operations,
            };
            let content_id = self.doc.add_object(Stream::new(dictionary! {}, content.encode()?));

            let mut xobjects = Dictionary::new();
            for (name, id) in page.images {
                xobjects.set(name, id);
            }

            let page_id = self.doc.add_object(dictionary! {
                "Type" => "Page",
                "Parent" => self.pages_id,
                "MediaBox" => vec![0.into(), 0.into(), PAGE_WIDTH.into(), PAGE_HEIGHT.into()],
                "Contents" => content_id,
                "Resources" => dictionary! {
                    "Font" => font_resources.clone(),
                    "XObject" => xobjects,
                },
            });
            kids.push(Object::Reference(page_id));
        }

        let count = kids.len() as i64;
        self.doc.objects.insert(
            self.pages_id,
            Object::Dictionary(dictionary! {
                "Type" => "Pages",
                "Kids" => kids,
                "Count" => count,
            }),
        );

        let catalog_id = self.doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => self.pages_id,
        });
        let info_id = self.doc.add_object(dictionary! {
            "Title" => Object::String(encode_win_ansi(title), StringFormat::Literal),
            "Producer" => Object::String(b"clinic-gateway".to_vec(), StringFormat::Literal),
        });
        self.doc.trailer.set("Root", catalog_id);
        self.doc.trailer.set("Info", info_id);

        let mut bytes = Vec::new();
        self.doc.save_to(&mut bytes)?;
        Ok(bytes)
    }
}

impl Default for Composer {
    fn default() -> Self {
        Self::new()
    }
}

/// Greedy word wrap. Text that fits is returned as a single line.
pub fn wrap(text: &str, font: Font, size: f32, max_width: f32) -> Vec<String> {
    if font.text_width(text, size) <= max_width {
        return vec![text.to_string()];
    }

    let mut lines = Vec::new();
    let mut line = String::new();
    for word in text.split(' ') {
        let candidate = if line.is_empty() {
            word.to_string()
        } else {
            format!("{line} {word}")
        };
        if !line.is_empty() && font.text_width(&candidate, size) > max_width {
            lines.push(std::mem::replace(&mut line, word.to_string()));
        } else {
            line = candidate;
        }
    }
    if !line.is_empty() {
        lines.push(line);
    }
    lines
}

fn deflate(data: &[u8]) -> std::io::Result<Vec<u8>> {
    let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(data)?;
    encoder.finish()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consent::signature::decode_png;
    use crate::consent::signature::tests::sample_rgba_png;

    const BODY: TextStyle = TextStyle::new(10.0, Font::Regular, Align::Left);

    #[test]
    fn test_short_text_is_one_line() {
        assert_eq!(wrap("Hola", Font::Regular, 10.0, 100.0), vec!["Hola"]);
    }

    #[test]
    fn test_wrap_respects_width() {
        let text = "uno dos tres cuatro cinco seis siete ocho nueve diez";
        let lines = wrap(text, Font::Regular, 10.0, 60.0);
        assert!(lines.len() > 1);
        assert_eq!(lines.join(" "), text);
        for line in &lines {
            if line.contains(' ') {
                assert!(Font::Regular.text_width(line, 10.0) <= 60.0, "{line}");
            }
        }
    }

    #[test]
    fn test_long_word_gets_own_line() {
        let lines = wrap("a supercalifragilistic b", Font::Regular, 10.0, 30.0);
        assert_eq!(lines, vec!["a", "supercalifragilistic", "b"]);
    }

    #[test]
    fn test_cursor_advances() {
        let mut composer = Composer::new();
        let start = composer.cursor();
        composer.text("Linea", BODY);
        assert_eq!(composer.cursor(), start - 16.0);
        composer.space(10.0);
        assert_eq!(composer.cursor(), start - 26.0);
    }

    #[test]
    fn test_overflow_starts_new_page() {
        let mut composer = Composer::new();
        for _ in 0..60 {
            composer.text("Una linea de relleno", BODY);
        }
        assert!(composer.page_count() > 1);

        let pdf = composer.finish("prueba").unwrap();
        assert!(pdf.starts_with(b"%PDF-"));
        let doc = Document::load_mem(&pdf).unwrap();
        assert_eq!(doc.get_pages().len(), 2);
    }

    #[test]
    fn test_keep_room() {
        let mut composer = Composer::new();
        composer.space(PAGE_HEIGHT - 100.0);
        composer.keep_room(150.0);
        assert_eq!(composer.page_count(), 2);
        assert_eq!(composer.cursor(), PAGE_HEIGHT - MARGIN);
    }

    #[test]
    fn test_image_is_embedded_with_mask() {
        let mut composer = Composer::new();
        let image = decode_png(&sample_rgba_png()).unwrap();
        composer.image(&image, (MARGIN, 400.0), (200.0, 60.0)).unwrap();

        let pdf = composer.finish("firma").unwrap();
        let doc = Document::load_mem(&pdf).unwrap();
        let images = doc
            .objects
            .values()
            .filter_map(|o| o.as_stream().ok())
            .filter(|s| matches!(s.dict.get(b"Subtype"), Ok(Object::Name(n)) if n == b"Image"))
            .count();
        assert_eq!(images, 2);
    }
}
