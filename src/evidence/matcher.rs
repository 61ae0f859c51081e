//! Proximity matching between search-term boxes and answer boxes.

use crate::config::TieBreak;
use crate::geometry::Rect;

/// Pick the answer box to highlight.
///
/// Every pair of a search-term box and an answer box is a candidate when
/// their top edges are at most `threshold` apart. Pairs are visited
/// search-major, answer-minor; `tie_break` chooses among candidates.
/// Returns `None` when either side is empty or nothing qualifies.
///
/// # Examples
///
/// ```
/// use pdf_evidence::config::TieBreak;
/// use pdf_evidence::evidence::match_and_mark;
/// use pdf_evidence::geometry::Rect;
///
/// let search = [Rect::new(72.0, 100.0, 300.0, 112.0)];
/// let answers = [Rect::new(250.0, 102.0, 290.0, 114.0), Rect::new(80.0, 500.0, 120.0, 512.0)];
/// let mark = match_and_mark(&search, &answers, 5.0, TieBreak::LastMatch);
/// assert_eq!(mark, Some(answers[0]));
/// ```
pub fn match_and_mark(search: &[Rect], answers: &[Rect], threshold: f32, tie_break: TieBreak) -> Option<Rect> {
    let mut candidates = search.iter().flat_map(|s| {
        answers
            .iter()
            .filter(move |a| (s.y0 - a.y0).abs() <= threshold)
            .map(move |a| (s, a))
    });

    match tie_break {
        TieBreak::FirstMatch => candidates.next().map(|(_, a)| *a),
        TieBreak::LastMatch => candidates.last().map(|(_, a)| *a),
        TieBreak::Closest => {
            let mut best: Option<(f32, Rect)> = None;
            for (s, a) in candidates {
                let distance = centre_distance(s, a);
                if best.map_or(true, |(d, _)| distance < d) {
                    best = Some((distance, *a));
                }
            }
            best.map(|(_, a)| a)
        },
    }
}

fn centre_distance(a: &Rect, b: &Rect) -> f32 {
    let dx = (a.x0 + a.x1) / 2.0 - (b.x0 + b.x1) / 2.0;
    let dy = (a.y0 + a.y1) / 2.0 - (b.y0 + b.y1) / 2.0;
    dx.hypot(dy)
}
