//! PDF rendering of a laid-out report with `printpdf`.

use std::io::BufWriter;

use printpdf::{
    BuiltinFont, Color, Greyscale, IndirectFontRef, Line, Mm, PdfDocument, PdfDocumentReference,
    PdfLayerReference, Point, Rgb,
};

use super::layout::{wrap_text, ReportBlock, ReportDocument};
use super::ReportError;

const PAGE_WIDTH: f32 = 210.0;
const PAGE_HEIGHT: f32 = 297.0;
const MARGIN_X: f32 = 20.0;
const TOP: f32 = 280.0;
const BOTTOM: f32 = 20.0;
const CONTENT_WIDTH: f32 = PAGE_WIDTH - 2.0 * MARGIN_X;
const CELL_PADDING: f32 = 2.0;

const BODY_SIZE: f32 = 11.0;
const BODY_LEADING: f32 = 5.0;
const FOOTER_SIZE: f32 = 9.0;

#[derive(Debug, Clone, Copy)]
enum Face {
    Regular,
    Bold,
    Oblique,
}

fn brand() -> Color {
    // #003087
    Color::Rgb(Rgb::new(0.0, 0.188, 0.529, None))
}

fn black() -> Color {
    Color::Greyscale(Greyscale::new(0.0, None))
}

fn grey() -> Color {
    Color::Greyscale(Greyscale::new(0.5, None))
}

/// Characters of Helvetica at `size` pt that fit in `width` mm, approximately.
fn chars_for(width: f32, size: f32) -> usize {
    // Average glyph width is about half the point size; 1pt = 0.3528mm.
    let glyph = size * 0.5 * 0.3528;
    ((width / glyph).floor() as usize).max(1)
}

/// Writes lines top to bottom, starting a new page when space runs out.
struct PageWriter {
    doc: PdfDocumentReference,
    layer: PdfLayerReference,
    y: Mm,
    pages: usize,
    regular: IndirectFontRef,
    bold: IndirectFontRef,
    oblique: IndirectFontRef,
}

impl PageWriter {
    fn new(title: &str) -> Result<Self, ReportError> {
        let (doc, page1, layer1) =
            PdfDocument::new(title, Mm(PAGE_WIDTH), Mm(PAGE_HEIGHT), "Page 1");
        let layer = doc.get_page(page1).get_layer(layer1);
        let font = |face| {
            doc.add_builtin_font(face)
                .map_err(|e| ReportError::Pdf(format!("PDF font error: {e}")))
        };
        let regular = font(BuiltinFont::Helvetica)?;
        let bold = font(BuiltinFont::HelveticaBold)?;
        let oblique = font(BuiltinFont::HelveticaOblique)?;

        Ok(Self {
            doc,
            layer,
            y: Mm(TOP),
            pages: 1,
            regular,
            bold,
            oblique,
        })
    }

    fn font(&self, face: Face) -> &IndirectFontRef {
        match face {
            Face::Regular => &self.regular,
            Face::Bold => &self.bold,
            Face::Oblique => &self.oblique,
        }
    }

    fn new_page(&mut self) {
        self.pages += 1;
        let (page, layer) = self.doc.add_page(
            Mm(PAGE_WIDTH),
            Mm(PAGE_HEIGHT),
            format!("Page {}", self.pages),
        );
        self.layer = self.doc.get_page(page).get_layer(layer);
        self.y = Mm(TOP);
    }

    /// Break the page unless `height` mm fit above the bottom margin.
    fn reserve(&mut self, height: f32) {
        if self.y.0 - height < BOTTOM {
            self.new_page();
        }
    }

    fn advance(&mut self, height: f32) {
        self.y -= Mm(height);
    }

    fn text(&self, text: &str, size: f32, x: f32, face: Face, color: Color) {
        self.layer.set_fill_color(color);
        self.layer
            .use_text(text, size, Mm(x), self.y, self.font(face));
    }

    fn rule(&self, thickness: f32, color: Color) {
        self.layer.set_outline_color(color);
        self.layer.set_outline_thickness(thickness);
        self.layer.add_line(Line {
            points: vec![
                (Point::new(Mm(MARGIN_X), self.y), false),
                (Point::new(Mm(PAGE_WIDTH - MARGIN_X), self.y), false),
            ],
            is_closed: false,
        });
    }

    /// Wrapped text block at the left margin.
    fn wrapped(&mut self, text: &str, size: f32, leading: f32, face: Face, color: Color) {
        for line in wrap_text(text, chars_for(CONTENT_WIDTH, size)) {
            self.reserve(leading);
            self.advance(leading);
            self.text(&line, size, MARGIN_X, face, color.clone());
        }
    }

    /// One table row; each cell wraps inside its column.
    ///
    /// A row that fits on a page is kept together. A taller row continues
    /// line by line onto the following pages.
    fn row(&mut self, cells: &[(&str, Face, Color)], widths: &[f32]) {
        let wrapped: Vec<Vec<String>> = cells
            .iter()
            .zip(widths)
            .map(|((cell, _, _), width)| {
                wrap_text(cell, chars_for(width - 2.0 * CELL_PADDING, BODY_SIZE))
            })
            .collect();
        let line_count = wrapped.iter().map(Vec::len).max().unwrap_or(1);
        let height = line_count as f32 * BODY_LEADING + 1.0;
        if height <= TOP - BOTTOM {
            self.reserve(height);
        }

        for index in 0..line_count {
            self.reserve(BODY_LEADING);
            self.advance(BODY_LEADING);
            let mut x = MARGIN_X;
            for ((lines, width), (_, face, color)) in wrapped.iter().zip(widths).zip(cells) {
                if let Some(line) = lines.get(index) {
                    self.text(line, BODY_SIZE, x + CELL_PADDING, *face, color.clone());
                }
                x += width;
            }
        }
        self.advance(1.0);
    }

    fn uniform_row(&mut self, cells: &[String], widths: &[f32], face: Face, color: Color) {
        let cells: Vec<(&str, Face, Color)> = cells
            .iter()
            .map(|c| (c.as_str(), face, color.clone()))
            .collect();
        self.row(&cells, widths);
    }

    fn block(&mut self, block: &ReportBlock) {
        match block {
            ReportBlock::Title(text) => {
                self.reserve(10.0);
                self.advance(8.0);
                self.text(text, 20.0, MARGIN_X, Face::Bold, brand());
                self.advance(2.0);
            }
            ReportBlock::Subtitle(text) => {
                self.reserve(7.0);
                self.advance(6.0);
                self.text(text, 12.0, MARGIN_X, Face::Regular, brand());
                self.advance(1.0);
            }
            ReportBlock::Rule => {
                self.reserve(4.0);
                self.advance(2.0);
                self.rule(1.5, brand());
                self.advance(2.0);
            }
            ReportBlock::Heading(text) => {
                // Keep a heading together with at least one line of its body.
                self.reserve(9.0 + BODY_LEADING);
                self.advance(7.0);
                self.text(text, 14.0, MARGIN_X, Face::Bold, brand());
                self.advance(2.0);
            }
            ReportBlock::Paragraph(text) => {
                self.wrapped(text, BODY_SIZE, BODY_LEADING, Face::Regular, black());
            }
            ReportBlock::KeyValue(rows) => {
                let widths = [51.0, CONTENT_WIDTH - 51.0];
                for (label, value) in rows {
                    self.row(
                        &[
                            (label.as_str(), Face::Bold, brand()),
                            (value.as_str(), Face::Regular, black()),
                        ],
                        &widths,
                    );
                }
            }
            ReportBlock::Table {
                columns,
                widths,
                rows,
            } => {
                self.uniform_row(columns, widths, Face::Bold, brand());
                self.rule(0.5, grey());
                for row in rows {
                    self.uniform_row(row, widths, Face::Regular, black());
                }
            }
            ReportBlock::Footer(lines) => {
                for line in lines {
                    self.wrapped(line, FOOTER_SIZE, 4.5, Face::Oblique, grey());
                }
            }
            ReportBlock::Spacer(height) => self.advance(*height),
        }
    }

    fn finish(self) -> Result<Vec<u8>, ReportError> {
        let mut buf = BufWriter::new(Vec::new());
        self.doc
            .save(&mut buf)
            .map_err(|e| ReportError::Pdf(format!("PDF save error: {e}")))?;
        buf.into_inner()
            .map_err(|e| ReportError::Pdf(format!("PDF buffer error: {e}")))
    }
}

/// Render `document` to PDF bytes. Returns the bytes and the page count.
pub fn render_pdf(document: &ReportDocument) -> Result<(Vec<u8>, usize), ReportError> {
    let mut writer = PageWriter::new(&document.title)?;
    for block in &document.blocks {
        writer.block(block);
    }
    let pages = writer.pages;
    Ok((writer.finish()?, pages))
}
