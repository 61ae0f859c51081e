//! PDF content stream operators.
//!
//! Content streams are tokenised by `lopdf`; this module lifts the raw
//! `(operator, operands)` pairs into a typed [`Operator`] so the interpreter
//! never has to look at operand vectors.

use lopdf::content::Operation;
use lopdf::Object;

use crate::objects::{name, number};

/// Element of a TJ array.
#[derive(Debug, Clone, PartialEq)]
pub enum TextElement {
    /// String to show
    String(Vec<u8>),
    /// Position adjustment in thousandths of text space (positive moves left)
    Offset(f32),
}

/// A content stream operator.
#[derive(Debug, Clone, PartialEq)]
pub enum Operator {
    // Text positioning operators
    /// Move text position (Td)
    Td {
        /// Horizontal offset
        tx: f32,
        /// Vertical offset
        ty: f32,
    },
    /// Move text position and set leading (TD)
    TD {
        /// Horizontal offset
        tx: f32,
        /// Vertical offset
        ty: f32,
    },
    /// Set text matrix (Tm)
    Tm {
        /// Matrix element a
        a: f32,
        /// Matrix element b
        b: f32,
        /// Matrix element c
        c: f32,
        /// Matrix element d
        d: f32,
        /// Matrix element e (x translation)
        e: f32,
        /// Matrix element f (y translation)
        f: f32,
    },
    /// Move to start of next line (T*)
    TStar,

    // Text showing operators
    /// Show text string (Tj)
    Tj {
        /// Text to show (byte array)
        text: Vec<u8>,
    },
    /// Show text with individual glyph positioning (TJ)
    TJ {
        /// Array of text strings and positioning adjustments
        array: Vec<TextElement>,
    },
    /// Move to next line and show text (')
    Quote {
        /// Text to show
        text: Vec<u8>,
    },
    /// Set spacing, move to next line and show text (")
    DoubleQuote {
        /// Word spacing
        word_space: f32,
        /// Character spacing
        char_space: f32,
        /// Text to show
        text: Vec<u8>,
    },

    // Text state operators
    /// Set character spacing (Tc)
    Tc {
        /// Character spacing
        char_space: f32,
    },
    /// Set word spacing (Tw)
    Tw {
        /// Word spacing
        word_space: f32,
    },
    /// Set horizontal scaling (Tz)
    Tz {
        /// Horizontal scaling percentage
        scale: f32,
    },
    /// Set text leading (TL)
    TL {
        /// Text leading
        leading: f32,
    },
    /// Set font and size (Tf)
    Tf {
        /// Font resource name
        font: String,
        /// Font size
        size: f32,
    },
    /// Set text rendering mode (Tr)
    Tr {
        /// Rendering mode
        render: u8,
    },
    /// Set text rise (Ts)
    Ts {
        /// Text rise
        rise: f32,
    },
    /// Begin text object (BT)
    BeginText,
    /// End text object (ET)
    EndText,

    // Graphics state operators
    /// Save graphics state (q)
    SaveState,
    /// Restore graphics state (Q)
    RestoreState,
    /// Modify current transformation matrix (cm)
    Cm {
        /// Matrix element a
        a: f32,
        /// Matrix element b
        b: f32,
        /// Matrix element c
        c: f32,
        /// Matrix element d
        d: f32,
        /// Matrix element e (x translation)
        e: f32,
        /// Matrix element f (y translation)
        f: f32,
    },
    /// Set line width (w)
    SetLineWidth {
        /// Line width
        width: f32,
    },
    /// Set line dash pattern (d)
    SetDash {
        /// Dash array
        array: Vec<f32>,
        /// Dash phase
        phase: f32,
    },
    /// Set line cap style (J)
    SetLineCap {
        /// 0=butt, 1=round, 2=square
        cap_style: u8,
    },
    /// Set line join style (j)
    SetLineJoin {
        /// 0=miter, 1=round, 2=bevel
        join_style: u8,
    },
    /// Set miter limit (M)
    SetMiterLimit {
        /// Miter limit
        limit: f32,
    },
    /// Set extended graphics state (gs)
    SetExtGState {
        /// Name of the ExtGState dictionary in /ExtGState resources
        dict_name: String,
    },

    // Color operators
    /// Set gray fill color (g)
    SetFillGray {
        /// Gray level
        gray: f32,
    },
    /// Set gray stroke color (G)
    SetStrokeGray {
        /// Gray level
        gray: f32,
    },
    /// Set RGB fill color (rg)
    SetFillRgb {
        /// Red
        r: f32,
        /// Green
        g: f32,
        /// Blue
        b: f32,
    },
    /// Set RGB stroke color (RG)
    SetStrokeRgb {
        /// Red
        r: f32,
        /// Green
        g: f32,
        /// Blue
        b: f32,
    },
    /// Set CMYK fill color (k)
    SetFillCmyk {
        /// Cyan
        c: f32,
        /// Magenta
        m: f32,
        /// Yellow
        y: f32,
        /// Black
        k: f32,
    },
    /// Set CMYK stroke color (K)
    SetStrokeCmyk {
        /// Cyan
        c: f32,
        /// Magenta
        m: f32,
        /// Yellow
        y: f32,
        /// Black
        k: f32,
    },
    /// Set fill color space (cs)
    SetFillColorSpace,
    /// Set stroke color space (CS)
    SetStrokeColorSpace,
    /// Set fill color in the current space (sc / scn)
    SetFillColor {
        /// Numeric components; pattern names are dropped
        components: Vec<f32>,
    },
    /// Set stroke color in the current space (SC / SCN)
    SetStrokeColor {
        /// Numeric components; pattern names are dropped
        components: Vec<f32>,
    },

    // Path construction
    /// Move to (m)
    MoveTo {
        /// X coordinate
        x: f32,
        /// Y coordinate
        y: f32,
    },
    /// Line to (l)
    LineTo {
        /// X coordinate
        x: f32,
        /// Y coordinate
        y: f32,
    },
    /// Cubic Bézier curve (c)
    CurveTo {
        /// First control point x
        x1: f32,
        /// First control point y
        y1: f32,
        /// Second control point x
        x2: f32,
        /// Second control point y
        y2: f32,
        /// End point x
        x3: f32,
        /// End point y
        y3: f32,
    },
    /// Bézier curve with first control point = current point (v)
    CurveToV {
        /// Second control point x
        x2: f32,
        /// Second control point y
        y2: f32,
        /// End point x
        x3: f32,
        /// End point y
        y3: f32,
    },
    /// Bézier curve with second control point = end point (y)
    CurveToY {
        /// First control point x
        x1: f32,
        /// First control point y
        y1: f32,
        /// End point x
        x3: f32,
        /// End point y
        y3: f32,
    },
    /// Close current subpath (h)
    ClosePath,
    /// Rectangle (re)
    Rectangle {
        /// X coordinate
        x: f32,
        /// Y coordinate
        y: f32,
        /// Width
        width: f32,
        /// Height
        height: f32,
    },

    // Path painting
    /// Stroke path (S)
    Stroke,
    /// Close and stroke path (s)
    CloseStroke,
    /// Fill path, non-zero winding (f, F)
    Fill,
    /// Fill path, even-odd (f*)
    FillEvenOdd,
    /// Fill and stroke (B)
    FillStroke,
    /// Fill and stroke, even-odd (B*)
    FillStrokeEvenOdd,
    /// Close, fill and stroke (b)
    CloseFillStroke,
    /// Close, fill and stroke, even-odd (b*)
    CloseFillStrokeEvenOdd,
    /// End path without filling or stroking (n)
    EndPath,
    /// Modify clipping path using non-zero winding rule (W)
    ClipNonZero,
    /// Modify clipping path using even-odd rule (W*)
    ClipEvenOdd,

    // XObjects
    /// Paint XObject (Do)
    Do {
        /// XObject resource name
        name: String,
    },

    /// Any operator without rendering or text-layout significance
    Other(String),
}

fn string(obj: &Object) -> Option<Vec<u8>> {
    match obj {
        Object::String(bytes, _) => Some(bytes.clone()),
        _ => None,
    }
}

fn numbers<const N: usize>(operands: &[Object]) -> Option<[f32; N]> {
    if operands.len() < N {
        return None;
    }
    let mut out = [0.0; N];
    // Trailing operands win when a producer emits extras.
    let start = operands.len() - N;
    for (slot, obj) in out.iter_mut().zip(&operands[start..]) {
        *slot = number(obj)?;
    }
    Some(out)
}

impl Operator {
    /// Convert a tokenised operation into a typed operator.
    ///
    /// Returns `None` when the operands do not fit the operator; such
    /// operations are skipped by the interpreter.
    pub fn from_operation(op: &Operation) -> Option<Operator> {
        let ops = op.operands.as_slice();
        let parsed = match op.operator.as_str() {
            "Td" => {
                let [tx, ty] = numbers(ops)?;
                Operator::Td { tx, ty }
            },
            "TD" => {
                let [tx, ty] = numbers(ops)?;
                Operator::TD { tx, ty }
            },
            "Tm" => {
                let [a, b, c, d, e, f] = numbers(ops)?;
                Operator::Tm { a, b, c, d, e, f }
            },
            "T*" => Operator::TStar,
            "Tj" => Operator::Tj {
                text: string(ops.last()?)?,
            },
            "TJ" => {
                let array = match ops.last()? {
                    Object::Array(items) => items
                        .iter()
                        .filter_map(|item| match item {
                            Object::String(bytes, _) => Some(TextElement::String(bytes.clone())),
                            other => number(other).map(TextElement::Offset),
                        })
                        .collect(),
                    _ => return None,
                };
                Operator::TJ { array }
            },
            "'" => Operator::Quote {
                text: string(ops.last()?)?,
            },
            "\"" => {
                if ops.len() < 3 {
                    return None;
                }
                Operator::DoubleQuote {
                    word_space: number(&ops[0])?,
                    char_space: number(&ops[1])?,
                    text: string(&ops[2])?,
                }
            },
            "Tc" => Operator::Tc {
                char_space: number(ops.last()?)?,
            },
            "Tw" => Operator::Tw {
                word_space: number(ops.last()?)?,
            },
            "Tz" => Operator::Tz {
                scale: number(ops.last()?)?,
            },
            "TL" => Operator::TL {
                leading: number(ops.last()?)?,
            },
            "Tf" => {
                if ops.len() < 2 {
                    return None;
                }
                Operator::Tf {
                    font: name(&ops[0])?,
                    size: number(&ops[1])?,
                }
            },
            "Tr" => Operator::Tr {
                render: number(ops.last()?)? as u8,
            },
            "Ts" => Operator::Ts {
                rise: number(ops.last()?)?,
            },
            "BT" => Operator::BeginText,
            "ET" => Operator::EndText,
            "q" => Operator::SaveState,
            "Q" => Operator::RestoreState,
            "cm" => {
                let [a, b, c, d, e, f] = numbers(ops)?;
                Operator::Cm { a, b, c, d, e, f }
            },
            "w" => Operator::SetLineWidth {
                width: number(ops.last()?)?,
            },
            "d" => {
                if ops.len() < 2 {
                    return None;
                }
                let array = match &ops[0] {
                    Object::Array(items) => items.iter().filter_map(number).collect(),
                    _ => return None,
                };
                Operator::SetDash {
                    array,
                    phase: number(&ops[1])?,
                }
            },
            "J" => Operator::SetLineCap {
                cap_style: number(ops.last()?)? as u8,
            },
            "j" => Operator::SetLineJoin {
                join_style: number(ops.last()?)? as u8,
            },
            "M" => Operator::SetMiterLimit {
                limit: number(ops.last()?)?,
            },
            "gs" => Operator::SetExtGState {
                dict_name: name(ops.last()?)?,
            },
            "g" => Operator::SetFillGray {
                gray: number(ops.last()?)?,
            },
            "G" => Operator::SetStrokeGray {
                gray: number(ops.last()?)?,
            },
            "rg" => {
                let [r, g, b] = numbers(ops)?;
                Operator::SetFillRgb { r, g, b }
            },
            "RG" => {
                let [r, g, b] = numbers(ops)?;
                Operator::SetStrokeRgb { r, g, b }
            },
            "k" => {
                let [c, m, y, k] = numbers(ops)?;
                Operator::SetFillCmyk { c, m, y, k }
            },
            "K" => {
                let [c, m, y, k] = numbers(ops)?;
                Operator::SetStrokeCmyk { c, m, y, k }
            },
            "cs" => Operator::SetFillColorSpace,
            "CS" => Operator::SetStrokeColorSpace,
            "sc" | "scn" => Operator::SetFillColor {
                components: ops.iter().filter_map(number).collect(),
            },
            "SC" | "SCN" => Operator::SetStrokeColor {
                components: ops.iter().filter_map(number).collect(),
            },
            "m" => {
                let [x, y] = numbers(ops)?;
                Operator::MoveTo { x, y }
            },
            "l" => {
                let [x, y] = numbers(ops)?;
                Operator::LineTo { x, y }
            },
            "c" => {
                let [x1, y1, x2, y2, x3, y3] = numbers(ops)?;
                Operator::CurveTo {
                    x1,
                    y1,
                    x2,
                    y2,
                    x3,
                    y3,
                }
            },
            "v" => {
                let [x2, y2, x3, y3] = numbers(ops)?;
                Operator::CurveToV { x2, y2, x3, y3 }
            },
            "y" => {
                let [x1, y1, x3, y3] = numbers(ops)?;
                Operator::CurveToY { x1, y1, x3, y3 }
            },
            "h" => Operator::ClosePath,
            "re" => {
                let [x, y, width, height] = numbers(ops)?;
                Operator::Rectangle {
                    x,
                    y,
                    width,
                    height,
                }
            },
            "S" => Operator::Stroke,
            "s" => Operator::CloseStroke,
            "f" | "F" => Operator::Fill,
            "f*" => Operator::FillEvenOdd,
            "B" => Operator::FillStroke,
            "B*" => Operator::FillStrokeEvenOdd,
            "b" => Operator::CloseFillStroke,
            "b*" => Operator::CloseFillStrokeEvenOdd,
            "n" => Operator::EndPath,
            "W" => Operator::ClipNonZero,
            "W*" => Operator::ClipEvenOdd,
            "Do" => Operator::Do {
                name: name(ops.last()?)?,
            },
            other => Operator::Other(other.to_string()),
        };
        Some(parsed)
    }
}
