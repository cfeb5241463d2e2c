use crate::chart::{draw_chart, ChartCanvas, ChartOptions};
use crate::colors::Rgb;
use crate::pattern::ToneGrid;

pub const LETTER_WIDTH_PT: f32 = 612.0;
pub const LETTER_HEIGHT_PT: f32 = 792.0;

/// Helvetica cap height as a fraction of the font size.
const CAP_HEIGHT: f32 = 0.718;

/// One PDF page being drawn; collects a content stream.
pub struct PdfCanvas {
    page_width: f32,
    page_height: f32,
    stream: String,
}

impl PdfCanvas {
    pub fn new(page_width: f32, page_height: f32) -> Self {
        Self {
            page_width,
            page_height,
            stream: String::new(),
        }
    }

    pub fn into_stream(self) -> String {
        self.stream
    }

    fn flip(&self, y: f32) -> f32 {
        self.page_height - y
    }
}

fn unit_rgb(color: Rgb) -> (f32, f32, f32) {
    let c = color.into_format::<f32>();
    (c.red, c.green, c.blue)
}

impl ChartCanvas for PdfCanvas {
    fn size(&self) -> (f32, f32) {
        (self.page_width, self.page_height)
    }

    fn fill_rect(&mut self, x: f32, y: f32, w: f32, h: f32, color: Rgb) {
        if w <= 0.0 || h <= 0.0 {
            return;
        }
        let (r, g, b) = unit_rgb(color);
        let bottom = self.flip(y + h);
        self.stream.push_str(&format!(
            "{:.3} {:.3} {:.3} rg {:.3} {:.3} {:.3} {:.3} re f\n",
            r, g, b, x, bottom, w, h
        ));
    }

    fn stroke_line(&mut self, from: (f32, f32), to: (f32, f32), width: f32, color: Rgb) {
        let (r, g, b) = unit_rgb(color);
        let (y0, y1) = (self.flip(from.1), self.flip(to.1));
        self.stream.push_str(&format!(
            "{:.3} {:.3} {:.3} RG {:.3} w {:.3} {:.3} m {:.3} {:.3} l S\n",
            r, g, b, width, from.0, y0, to.0, y1
        ));
    }

    fn text(&mut self, x: f32, y: f32, size: f32, text: &str, color: Rgb) {
        let (r, g, b) = unit_rgb(color);
        let baseline = self.flip(y + size);
        self.stream
            .push_str(&format!("{:.3} {:.3} {:.3} rg\n", r, g, b));
        self.stream.push_str(&text_cmd(
            x,
            baseline,
            size / CAP_HEIGHT,
            &sanitize_text(text),
        ));
    }

    fn text_width(&self, size: f32, text: &str) -> f32 {
        let font_size = size / CAP_HEIGHT;
        let em: f32 = text.chars().map(helvetica_advance).sum();
        em * font_size
    }

    fn hairline(&self) -> f32 {
        0.2
    }
}

/// Approximate Helvetica advance widths, in ems.
fn helvetica_advance(ch: char) -> f32 {
    match ch {
        ' ' | ',' | '.' | ':' | 'I' | 'f' | 't' => 0.278,
        'i' | 'j' | 'l' => 0.222,
        '(' | ')' | '-' | 'r' => 0.333,
        '0'..='9' | '#' | 'L' => 0.556,
        'M' => 0.833,
        'W' => 0.944,
        'm' => 0.833,
        '%' => 0.889,
        'F' | 'T' | 'Z' => 0.611,
        'C' | 'D' | 'H' | 'N' | 'R' | 'U' | 'w' => 0.722,
        'G' | 'O' | 'Q' => 0.778,
        'J' | 'c' | 'k' | 's' | 'v' | 'x' | 'y' | 'z' => 0.5,
        'A'..='Z' => 0.667,
        _ => 0.556,
    }
}

/// Render the chart onto a single Letter page and serialize the document.
pub fn export_chart_pdf(grid: &ToneGrid, colors: &[Rgb], options: &ChartOptions) -> Vec<u8> {
    let mut canvas = PdfCanvas::new(LETTER_WIDTH_PT, LETTER_HEIGHT_PT);
    draw_chart(&mut canvas, grid, colors, options);
    write_pdf_document(&canvas.into_stream(), LETTER_WIDTH_PT, LETTER_HEIGHT_PT)
}

fn text_cmd(x: f32, y: f32, size: f32, text: &str) -> String {
    format!(
        "BT /F1 {:.2} Tf 1 0 0 1 {:.3} {:.3} Tm ({}) Tj ET\n",
        size,
        x,
        y,
        escape_pdf_text(text)
    )
}

/// Serialize one page: catalog, page tree, page, its content stream, and the font.
fn write_pdf_document(content: &str, page_width: f32, page_height: f32) -> Vec<u8> {
    let page = format!(
        "<< /Type /Page /Parent 2 0 R /MediaBox [0 0 {:.1} {:.1}] \
         /Resources << /Font << /F1 5 0 R >> >> /Contents 4 0 R >>",
        page_width, page_height
    );
    let objects: [Vec<u8>; 5] = [
        b"<< /Type /Catalog /Pages 2 0 R >>".to_vec(),
        b"<< /Type /Pages /Kids [3 0 R] /Count 1 >>".to_vec(),
        page.into_bytes(),
        stream_object(content),
        b"<< /Type /Font /Subtype /Type1 /BaseFont /Helvetica >>".to_vec(),
    ];

    let mut out = Vec::with_capacity(content.len() + 1024);
    out.extend_from_slice(b"%PDF-1.4\n%Crochet\n");

    let mut offsets = Vec::with_capacity(objects.len());
    for (id, object) in (1..).zip(&objects) {
        offsets.push(out.len());
        out.extend_from_slice(format!("{} 0 obj\n", id).as_bytes());
        out.extend_from_slice(object);
        out.extend_from_slice(b"\nendobj\n");
    }

    let xref_offset = out.len();
    let size = objects.len() + 1;
    out.extend_from_slice(format!("xref\n0 {}\n0000000000 65535 f \n", size).as_bytes());
    for offset in offsets {
        out.extend_from_slice(format!("{:010} 00000 n \n", offset).as_bytes());
    }
    out.extend_from_slice(
        format!(
            "trailer\n<< /Size {} /Root 1 0 R >>\nstartxref\n{}\n%%EOF",
            size, xref_offset
        )
        .as_bytes(),
    );
    out
}

fn stream_object(stream: &str) -> Vec<u8> {
    let bytes = stream.as_bytes();
    let mut out = Vec::with_capacity(bytes.len() + 64);
    out.extend_from_slice(format!("<< /Length {} >>\nstream\n", bytes.len()).as_bytes());
    out.extend_from_slice(bytes);
    out.extend_from_slice(b"endstream");
    out
}

fn sanitize_text(text: &str) -> String {
    text.chars()
        .map(|ch| {
            if ch.is_ascii() && !ch.is_ascii_control() {
                ch
            } else {
                '?'
            }
        })
        .collect()
}

fn escape_pdf_text(input: &str) -> String {
    input
        .replace('\\', "\\\\")
        .replace('(', "\\(")
        .replace(')', "\\)")
}
