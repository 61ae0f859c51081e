//! Graphics state management for content stream execution.
//!
//! This module provides the graphics state machine that tracks transformations,
//! text positioning, colors, and other parameters as operators are executed.

use crate::geometry::Point;
use crate::fonts::FontInfo;
use std::sync::Arc;

/// A 2D transformation matrix.
///
/// PDF uses matrices of the form:
/// ```text
/// [ a  b  0 ]
/// [ c  d  0 ]
/// [ e  f  1 ]
/// ```
///
/// Where (a,b,c,d) define scaling/rotation/skewing and (e,f) define translation.
/// Points are row vectors, so `p' = p × M`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Matrix {
    /// Horizontal scaling component
    pub a: f32,
    /// Rotation/skew component
    pub b: f32,
    /// Rotation/skew component
    pub c: f32,
    /// Vertical scaling component
    pub d: f32,
    /// Horizontal translation
    pub e: f32,
    /// Vertical translation
    pub f: f32,
}

impl Matrix {
    /// Create a matrix from its six components.
    pub fn new(a: f32, b: f32, c: f32, d: f32, e: f32, f: f32) -> Self {
        Self { a, b, c, d, e, f }
    }

    /// Create an identity matrix.
    ///
    /// # Examples
    ///
    /// ```
    /// use pdf_evidence::content::Matrix;
    ///
    /// let m = Matrix::identity();
    /// assert_eq!(m.a, 1.0);
    /// assert_eq!(m.d, 1.0);
    /// assert_eq!(m.e, 0.0);
    /// assert_eq!(m.f, 0.0);
    /// ```
    pub fn identity() -> Self {
        Self::new(1.0, 0.0, 0.0, 1.0, 0.0, 0.0)
    }

    /// Create a translation matrix.
    pub fn translation(tx: f32, ty: f32) -> Self {
        Self::new(1.0, 0.0, 0.0, 1.0, tx, ty)
    }

    /// Create a scaling matrix.
    pub fn scaling(sx: f32, sy: f32) -> Self {
        Self::new(sx, 0.0, 0.0, sy, 0.0, 0.0)
    }

    /// Multiply this matrix with another matrix.
    ///
    /// The result first applies `self`, then `other`. With PDF's row-vector
    /// convention a `cm` operand `M` updates the CTM as `M.multiply(&ctm)`.
    ///
    /// # Examples
    ///
    /// ```
    /// use pdf_evidence::content::Matrix;
    ///
    /// let scale_then_move = Matrix::scaling(2.0, 2.0).multiply(&Matrix::translation(10.0, 0.0));
    /// let p = scale_then_move.transform_point(5.0, 0.0);
    /// assert_eq!(p.x, 20.0);
    /// ```
    pub fn multiply(&self, other: &Matrix) -> Matrix {
        Matrix {
            a: self.a * other.a + self.b * other.c,
            b: self.a * other.b + self.b * other.d,
            c: self.c * other.a + self.d * other.c,
            d: self.c * other.b + self.d * other.d,
            e: self.e * other.a + self.f * other.c + other.e,
            f: self.e * other.b + self.f * other.d + other.f,
        }
    }

    /// Transform a point using this matrix.
    pub fn transform_point(&self, x: f32, y: f32) -> Point {
        Point {
            x: self.a * x + self.c * y + self.e,
            y: self.b * x + self.d * y + self.f,
        }
    }

    /// Get the determinant of this matrix.
    pub fn determinant(&self) -> f32 {
        self.a * self.d - self.b * self.c
    }

    /// Check if this matrix is invertible.
    pub fn is_invertible(&self) -> bool {
        self.determinant().abs() > f32::EPSILON
    }

    /// Convert to a tiny-skia transform.
    pub fn to_transform(&self) -> tiny_skia::Transform {
        tiny_skia::Transform::from_row(self.a, self.b, self.c, self.d, self.e, self.f)
    }
}

impl Default for Matrix {
    fn default() -> Self {
        Self::identity()
    }
}

/// Graphics state parameters.
///
/// Tracks the parameters that affect text placement and painting.
#[derive(Debug, Clone)]
pub struct GraphicsState {
    /// Current transformation matrix (maps user space to page space)
    pub ctm: Matrix,
    /// Text matrix (maps text space to user space)
    pub text_matrix: Matrix,
    /// Text line matrix (saved position at start of line)
    pub text_line_matrix: Matrix,

    // Text state parameters
    /// Character spacing (Tc)
    pub char_space: f32,
    /// Word spacing (Tw)
    pub word_space: f32,
    /// Horizontal scaling percentage (Tz)
    pub horizontal_scaling: f32,
    /// Text leading (TL)
    pub leading: f32,
    /// Current font resource name
    pub font_name: Option<String>,
    /// Resolved font for the current font resource
    pub font: Option<Arc<FontInfo>>,
    /// Current font size (Tf)
    pub font_size: f32,
    /// Text rise (Ts)
    pub text_rise: f32,
    /// Text rendering mode (Tr); 3 is invisible
    pub render_mode: u8,

    // Color parameters
    /// Fill color (RGB)
    pub fill_color_rgb: (f32, f32, f32),
    /// Stroke color (RGB)
    pub stroke_color_rgb: (f32, f32, f32),

    // Line parameters
    /// Line width
    pub line_width: f32,
    /// Line dash pattern ([on1, off1, on2, off2, ...], phase)
    /// Empty array means solid line
    pub dash_pattern: (Vec<f32>, f32),
    /// Line cap style (J): 0=butt cap, 1=round cap, 2=projecting square cap
    pub line_cap: u8,
    /// Line join style (j): 0=miter join, 1=round join, 2=bevel join
    pub line_join: u8,
    /// Miter limit (M)
    pub miter_limit: f32,

    // Transparency parameters (from ExtGState)
    /// Fill alpha (ca)
    pub fill_alpha: f32,
    /// Stroke alpha (CA)
    pub stroke_alpha: f32,
    /// Blend mode (BM)
    pub blend_mode: String,
}

impl GraphicsState {
    /// Create a new graphics state with PDF default values.
    ///
    /// # Examples
    ///
    /// ```
    /// use pdf_evidence::content::GraphicsState;
    ///
    /// let state = GraphicsState::new();
    /// assert_eq!(state.font_size, 12.0);
    /// assert_eq!(state.horizontal_scaling, 100.0);
    /// ```
    pub fn new() -> Self {
        Self::with_ctm(Matrix::identity())
    }

    /// Create a default graphics state whose CTM starts at `ctm`.
    pub fn with_ctm(ctm: Matrix) -> Self {
        Self {
            ctm,
            text_matrix: Matrix::identity(),
            text_line_matrix: Matrix::identity(),
            char_space: 0.0,
            word_space: 0.0,
            horizontal_scaling: 100.0,
            leading: 0.0,
            font_name: None,
            font: None,
            font_size: 12.0,
            text_rise: 0.0,
            render_mode: 0,
            fill_color_rgb: (0.0, 0.0, 0.0),
            stroke_color_rgb: (0.0, 0.0, 0.0),
            line_width: 1.0,
            dash_pattern: (Vec::new(), 0.0),
            line_cap: 0,
            line_join: 0,
            miter_limit: 10.0,
            fill_alpha: 1.0,
            stroke_alpha: 1.0,
            blend_mode: "Normal".to_string(),
        }
    }

    /// Matrix mapping glyph space (in em units) to page space for the
    /// current text position.
    pub fn text_rendering_matrix(&self) -> Matrix {
        let th = self.horizontal_scaling / 100.0;
        let params = Matrix::new(self.font_size * th, 0.0, 0.0, self.font_size, 0.0, self.text_rise);
        params.multiply(&self.text_matrix).multiply(&self.ctm)
    }

    /// Move the text position by `tx` text-space units along the baseline.
    pub fn advance_text(&mut self, tx: f32) {
        self.text_matrix = Matrix::translation(tx, 0.0).multiply(&self.text_matrix);
    }

    /// Start a new line offset by (tx, ty) from the current line start.
    pub fn next_line(&mut self, tx: f32, ty: f32) {
        self.text_line_matrix = Matrix::translation(tx, ty).multiply(&self.text_line_matrix);
        self.text_matrix = self.text_line_matrix;
    }
}

impl Default for GraphicsState {
    fn default() -> Self {
        Self::new()
    }
}

/// Stack of graphics states for save/restore operations.
///
/// PDF's q (save) and Q (restore) operators push and pop graphics states.
#[derive(Debug, Clone)]
pub struct GraphicsStateStack {
    stack: Vec<GraphicsState>,
    initial: GraphicsState,
}

impl GraphicsStateStack {
    /// Create a new graphics state stack with a default initial state.
    pub fn new() -> Self {
        Self::with_state(GraphicsState::new())
    }

    /// Create a stack whose bottom entry is `state`.
    pub fn with_state(state: GraphicsState) -> Self {
        Self {
            stack: Vec::new(),
            initial: state,
        }
    }

    /// Get a reference to the current graphics state.
    pub fn current(&self) -> &GraphicsState {
        self.stack.last().unwrap_or(&self.initial)
    }

    /// Get a mutable reference to the current graphics state.
    pub fn current_mut(&mut self) -> &mut GraphicsState {
        self.stack.last_mut().unwrap_or(&mut self.initial)
    }

    /// Save the current graphics state (q operator).
    pub fn save(&mut self) {
        let state = self.current().clone();
        self.stack.push(state);
    }

    /// Restore the previous graphics state (Q operator).
    ///
    /// Unbalanced restores leave the initial state in place.
    pub fn restore(&mut self) {
        self.stack.pop();
    }

    /// Get the current stack depth.
    ///
    /// The depth is always at least 1 (the initial state).
    pub fn depth(&self) -> usize {
        self.stack.len() + 1
    }
}

impl Default for GraphicsStateStack {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_matrix_translation() {
        let m = Matrix::translation(10.0, 20.0);
        let p = m.transform_point(5.0, 10.0);
        assert_eq!(p.x, 15.0);
        assert_eq!(p.y, 30.0);
    }

    #[test]
    fn test_matrix_multiply_applies_self_first() {
        let m1 = Matrix::translation(10.0, 20.0);
        let m2 = Matrix::scaling(2.0, 2.0);
        // translate, then scale: (5,5) -> (15,25) -> (30,50)
        let p = m1.multiply(&m2).transform_point(5.0, 5.0);
        assert_eq!(p.x, 30.0);
        assert_eq!(p.y, 50.0);
    }

    #[test]
    fn test_matrix_multiply_order() {
        let m1 = Matrix::translation(10.0, 0.0);
        let m2 = Matrix::scaling(2.0, 1.0);
        let p1 = m1.multiply(&m2).transform_point(5.0, 0.0);
        let p2 = m2.multiply(&m1).transform_point(5.0, 0.0);
        assert_ne!(p1.x, p2.x);
    }

    #[test]
    fn test_matrix_determinant() {
        assert_eq!(Matrix::scaling(2.0, 3.0).determinant(), 6.0);
        let degenerate = Matrix::new(1.0, 2.0, 2.0, 4.0, 0.0, 0.0);
        assert!(!degenerate.is_invertible());
    }

    #[test]
    fn test_text_rendering_matrix_includes_font_size_and_ctm() {
        let mut gs = GraphicsState::with_ctm(Matrix::translation(0.0, 100.0));
        gs.font_size = 10.0;
        gs.text_matrix = Matrix::translation(72.0, 0.0);
        let trm = gs.text_rendering_matrix();
        let p = trm.transform_point(1.0, 1.0);
        assert_eq!(p.x, 82.0);
        assert_eq!(p.y, 110.0);
    }

    #[test]
    fn test_advance_text_respects_text_matrix_scale() {
        let mut gs = GraphicsState::new();
        gs.text_matrix = Matrix::new(2.0, 0.0, 0.0, 2.0, 50.0, 50.0);
        gs.advance_text(10.0);
        assert_eq!(gs.text_matrix.e, 70.0);
        assert_eq!(gs.text_matrix.f, 50.0);
    }

    #[test]
    fn test_next_line_moves_line_matrix() {
        let mut gs = GraphicsState::new();
        gs.next_line(72.0, 700.0);
        gs.next_line(0.0, -14.0);
        assert_eq!(gs.text_matrix.e, 72.0);
        assert_eq!(gs.text_matrix.f, 686.0);
        assert_eq!(gs.text_line_matrix, gs.text_matrix);
    }

    #[test]
    fn test_graphics_state_stack_save_restore() {
        let mut stack = GraphicsStateStack::new();
        stack.current_mut().font_size = 14.0;
        stack.save();
        assert_eq!(stack.depth(), 2);
        stack.current_mut().font_size = 16.0;
        stack.restore();
        assert_eq!(stack.depth(), 1);
        assert_eq!(stack.current().font_size, 14.0);
    }

    #[test]
    fn test_graphics_state_stack_restore_limit() {
        let mut stack = GraphicsStateStack::new();
        stack.restore();
        assert_eq!(stack.depth(), 1);
        stack.save();
        stack.save();
        stack.restore();
        stack.restore();
        stack.restore();
        assert_eq!(stack.depth(), 1);
    }
}
