//! Content stream interpretation
//!
//! Walks a page's content operators, tracking the graphics and text state,
//! and records every shown glyph as a [`Char`] and every axis-aligned path
//! segment that is stroked or filled as an [`Edge`]. Glyph boxes run from the
//! font's descent to one em above it. Curves, clipping, colour and XObjects
//! are not interpreted.

use std::collections::HashMap;

use lopdf::content::{Content, Operation};
use lopdf::{Dictionary, Document, Object};
use tracing::trace;

use crate::font::Font;
use crate::geometry::{Char, Edge, Matrix};
use crate::objects::{get, number, resolve_dict};

/// Segments whose extent across their direction is below this are axis-aligned.
const AXIS_EPSILON: f64 = 1e-3;

/// Page box in PDF user space (`llx lly urx ury`).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MediaBox {
    pub llx: f64,
    pub lly: f64,
    pub urx: f64,
    pub ury: f64,
}

impl MediaBox {
    /// US Letter, portrait.
    pub const LETTER: MediaBox = MediaBox {
        llx: 0.0,
        lly: 0.0,
        urx: 612.0,
        ury: 792.0,
    };

    pub fn from_array(values: &[f64]) -> Option<Self> {
        match values {
            [x0, y0, x1, y1] => Some(Self {
                llx: x0.min(*x1),
                lly: y0.min(*y1),
                urx: x0.max(*x1),
                ury: y0.max(*y1),
            }),
            _ => None,
        }
    }

    pub fn width(&self) -> f64 {
        self.urx - self.llx
    }

    pub fn height(&self) -> f64 {
        self.ury - self.lly
    }

    /// User-space point to top-down page coordinates.
    fn to_page(self, (x, y): (f64, f64)) -> (f64, f64) {
        (x - self.llx, self.ury - y)
    }
}

/// Everything recovered from one page's content.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PageObjects {
    pub chars: Vec<Char>,
    pub edges: Vec<Edge>,
}

#[derive(Debug, Clone)]
struct TextState {
    font: Option<Vec<u8>>,
    size: f64,
    char_spacing: f64,
    word_spacing: f64,
    horizontal_scaling: f64,
    leading: f64,
    rise: f64,
}

impl Default for TextState {
    fn default() -> Self {
        Self {
            font: None,
            size: 0.0,
            char_spacing: 0.0,
            word_spacing: 0.0,
            horizontal_scaling: 1.0,
            leading: 0.0,
            rise: 0.0,
        }
    }
}

#[derive(Debug, Clone, Default)]
struct GraphicsState {
    ctm: Matrix,
    text: TextState,
}

#[derive(Debug, Clone, Default)]
struct Subpath {
    points: Vec<(f64, f64)>,
    closed: bool,
}

/// How a painting operator treats the current path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Paint {
    Stroke { close: bool },
    Fill,
    Discard,
}

/// Interprets one content stream against its resources.
pub struct ContentInterpreter<'a> {
    doc: &'a Document,
    fonts: Option<&'a Dictionary>,
    media_box: MediaBox,
    loaded_fonts: HashMap<Vec<u8>, Font>,
    state: GraphicsState,
    stack: Vec<GraphicsState>,
    text_matrix: Matrix,
    line_matrix: Matrix,
    path: Vec<Subpath>,
    objects: PageObjects,
}

impl<'a> ContentInterpreter<'a> {
    pub fn new(doc: &'a Document, resources: Option<&'a Dictionary>, media_box: MediaBox) -> Self {
        let fonts = resources.and_then(|r| r.get(b"Font").ok().and_then(|f| resolve_dict(doc, f)));
        Self {
            doc,
            fonts,
            media_box,
            loaded_fonts: HashMap::new(),
            state: GraphicsState::default(),
            stack: Vec::new(),
            text_matrix: Matrix::IDENTITY,
            line_matrix: Matrix::IDENTITY,
            path: Vec::new(),
            objects: PageObjects::default(),
        }
    }

    /// Decode and run a raw content stream.
    pub fn run(mut self, content: &[u8]) -> lopdf::Result<PageObjects> {
        let content = Content::decode(content)?;
        for operation in &content.operations {
            self.execute(operation);
        }
        Ok(self.objects)
    }

    fn execute(&mut self, op: &Operation) {
        let operands = &op.operands;
        let applied = match op.operator.as_str() {
            "q" => {
                self.stack.push(self.state.clone());
                Some(())
            }
            "Q" => {
                if let Some(state) = self.stack.pop() {
                    self.state = state;
                }
                Some(())
            }
            "cm" => matrix_operand(operands).map(|m| {
                self.state.ctm = m.then(&self.state.ctm);
            }),
            "BT" | "ET" => {
                self.text_matrix = Matrix::IDENTITY;
                self.line_matrix = Matrix::IDENTITY;
                Some(())
            }
            "Tf" => {
                let name = operands.first().and_then(|o| o.as_name().ok());
                let size = operands.get(1).and_then(number);
                name.zip(size).map(|(name, size)| {
                    self.load_font(name);
                    self.state.text.font = Some(name.to_vec());
                    self.state.text.size = size;
                })
            }
            "Tc" => scalar(operands).map(|v| self.state.text.char_spacing = v),
            "Tw" => scalar(operands).map(|v| self.state.text.word_spacing = v),
            "Tz" => scalar(operands).map(|v| self.state.text.horizontal_scaling = v / 100.0),
            "TL" => scalar(operands).map(|v| self.state.text.leading = v),
            "Ts" => scalar(operands).map(|v| self.state.text.rise = v),
            "Td" => pair(operands).map(|(tx, ty)| self.move_line(tx, ty)),
            "TD" => pair(operands).map(|(tx, ty)| {
                self.state.text.leading = -ty;
                self.move_line(tx, ty);
            }),
            "Tm" => matrix_operand(operands).map(|m| {
                self.text_matrix = m;
                self.line_matrix = m;
            }),
            "T*" => {
                self.next_line();
                Some(())
            }
            "Tj" => operands.first().and_then(string_bytes).map(|s| self.show(s)),
            "'" => operands.first().and_then(string_bytes).map(|s| {
                self.next_line();
                self.show(s);
            }),
            "\"" => {
                let spacing = operands.first().and_then(number).zip(operands.get(1).and_then(number));
                let text = operands.get(2).and_then(string_bytes);
                spacing.zip(text).map(|((aw, ac), s)| {
                    self.state.text.word_spacing = aw;
                    self.state.text.char_spacing = ac;
                    self.next_line();
                    self.show(s);
                })
            }
            "TJ" => operands
                .first()
                .and_then(|o| o.as_array().ok())
                .map(|items| self.show_adjusted(items)),
            "m" => pair(operands).map(|(x, y)| {
                let point = self.state.ctm.apply(x, y);
                self.path.push(Subpath {
                    points: vec![point],
                    closed: false,
                });
            }),
            "l" => pair(operands).map(|(x, y)| {
                let point = self.state.ctm.apply(x, y);
                match self.path.last_mut() {
                    Some(sub) if !sub.closed => sub.points.push(point),
                    _ => self.path.push(Subpath {
                        points: vec![point],
                        closed: false,
                    }),
                }
            }),
            "re" => numbers_operand::<4>(operands).map(|[x, y, w, h]| {
                let ctm = self.state.ctm;
                self.path.push(Subpath {
                    points: vec![
                        ctm.apply(x, y),
                        ctm.apply(x + w, y),
                        ctm.apply(x + w, y + h),
                        ctm.apply(x, y + h),
                    ],
                    closed: true,
                });
            }),
            "h" => {
                if let Some(sub) = self.path.last_mut() {
                    sub.closed = true;
                }
                Some(())
            }
            "S" => self.paint(Paint::Stroke { close: false }),
            "s" => self.paint(Paint::Stroke { close: true }),
            "f" | "F" | "f*" | "B" | "B*" | "b" | "b*" => self.paint(Paint::Fill),
            "n" => self.paint(Paint::Discard),
            _ => Some(()),
        };

        if applied.is_none() {
            trace!(operator = %op.operator, "skipped malformed operator");
        }
    }

    fn load_font(&mut self, name: &[u8]) {
        if self.loaded_fonts.contains_key(name) {
            return;
        }
        let font = self
            .fonts
            .and_then(|fonts| get(self.doc, fonts, name))
            .and_then(|o| o.as_dict().ok())
            .map(|font| Font::from_dict(self.doc, font))
            .unwrap_or_else(Font::standard);
        self.loaded_fonts.insert(name.to_vec(), font);
    }

    fn move_line(&mut self, tx: f64, ty: f64) {
        self.line_matrix = Matrix::translation(tx, ty).then(&self.line_matrix);
        self.text_matrix = self.line_matrix;
    }

    fn next_line(&mut self) {
        let leading = self.state.text.leading;
        self.move_line(0.0, -leading);
    }

    fn show_adjusted(&mut self, items: &[Object]) {
        for item in items {
            if let Some(bytes) = string_bytes(item) {
                self.show(bytes);
            } else if let Some(adjust) = number(item) {
                let text = &self.state.text;
                let tx = -adjust / 1000.0 * text.size * text.horizontal_scaling;
                self.text_matrix = Matrix::translation(tx, 0.0).then(&self.text_matrix);
            }
        }
    }

    fn show(&mut self, bytes: &[u8]) {
        let text = &self.state.text;
        let font = text
            .font
            .as_ref()
            .and_then(|name| self.loaded_fonts.get(name))
            .cloned()
            .unwrap_or_else(Font::standard);
        let (size, scale) = (text.size, text.horizontal_scaling);
        let (char_spacing, word_spacing) = (text.char_spacing, text.word_spacing);
        let base = text.rise + font.descent() / 1000.0 * size;

        for code in font.codes(bytes) {
            let advance = font.width(code.value) / 1000.0 * size;
            let to_device = self.text_matrix.then(&self.state.ctm);
            let origin = self.media_box.to_page(to_device.apply(0.0, base));
            let end = self.media_box.to_page(to_device.apply(advance * scale, base));
            let cap = self.media_box.to_page(to_device.apply(0.0, base + size));

            self.objects.chars.push(Char {
                text: font.text(code.value),
                x0: origin.0.min(end.0),
                x1: origin.0.max(end.0),
                top: origin.1.min(cap.1),
                bottom: origin.1.max(cap.1),
                size: (cap.1 - origin.1).hypot(cap.0 - origin.0),
            });

            let spacing = char_spacing + if code.is_word_space() { word_spacing } else { 0.0 };
            let tx = (advance + spacing) * scale;
            self.text_matrix = Matrix::translation(tx, 0.0).then(&self.text_matrix);
        }
    }

    fn paint(&mut self, paint: Paint) -> Option<()> {
        let path = std::mem::take(&mut self.path);
        if paint == Paint::Discard {
            return Some(());
        }
        for sub in &path {
            let close = sub.closed || paint != (Paint::Stroke { close: false });
            let mut segments: Vec<((f64, f64), (f64, f64))> =
                sub.points.windows(2).map(|w| (w[0], w[1])).collect();
            if close && sub.points.len() > 2 {
                if let (Some(&first), Some(&last)) = (sub.points.first(), sub.points.last()) {
                    segments.push((last, first));
                }
            }
            for (a, b) in segments {
                if let Some(edge) = segment_edge(self.media_box.to_page(a), self.media_box.to_page(b)) {
                    self.objects.edges.push(edge);
                }
            }
        }
        Some(())
    }
}

/// The ruling edge for an axis-aligned segment; diagonal and empty segments have none.
fn segment_edge((x0, y0): (f64, f64), (x1, y1): (f64, f64)) -> Option<Edge> {
    let dx = (x1 - x0).abs();
    let dy = (y1 - y0).abs();
    if dy < AXIS_EPSILON && dx >= AXIS_EPSILON {
        Some(Edge::horizontal(x0, x1, y0))
    } else if dx < AXIS_EPSILON && dy >= AXIS_EPSILON {
        Some(Edge::vertical(x0, y0, y1))
    } else {
        None
    }
}

fn string_bytes(obj: &Object) -> Option<&[u8]> {
    match obj {
        Object::String(bytes, _) => Some(bytes),
        _ => None,
    }
}

fn scalar(operands: &[Object]) -> Option<f64> {
    operands.first().and_then(number)
}

fn pair(operands: &[Object]) -> Option<(f64, f64)> {
    numbers_operand::<2>(operands).map(|[a, b]| (a, b))
}

fn numbers_operand<const N: usize>(operands: &[Object]) -> Option<[f64; N]> {
    if operands.len() < N {
        return None;
    }
    let mut values = [0.0; N];
    for (value, operand) in values.iter_mut().zip(operands) {
        *value = number(operand)?;
    }
    Some(values)
}

fn matrix_operand(operands: &[Object]) -> Option<Matrix> {
    numbers_operand::<6>(operands).map(|[a, b, c, d, e, f]| Matrix::new(a, b, c, d, e, f))
}
