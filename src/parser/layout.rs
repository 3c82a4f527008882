//! Layout analysis: spans into lines, lines into regions.
//!
//! A region is a run of lines that belong together visually (similar spacing,
//! font size and left margin). Each region becomes one page fragment. Pages
//! with a clear vertical gutter are read column by column.

use std::cmp::Ordering;

use super::content::{is_spaceless_script_char, TextSpan};

/// Width of the vertical slices used to look for a gutter.
const SLICE_WIDTH: f32 = 3.0;

/// Narrowest gutter accepted as a column separator.
const MIN_GUTTER_WIDTH: f32 = 12.0;

/// Narrowest column accepted on either side of a gutter.
const MIN_COLUMN_WIDTH: f32 = 80.0;

/// Pages narrower than this are never split into columns.
const MIN_SPLIT_WIDTH: f32 = 250.0;

/// Text spread wider than the largest legal page (200in) is never split.
const MAX_SPLIT_WIDTH: f32 = 14_400.0;

/// A vertical column of the page.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Column {
    /// Left boundary
    pub left: f32,
    /// Right boundary
    pub right: f32,
    /// Column index (0 = leftmost)
    pub index: usize,
}

impl Column {
    /// Whether an x coordinate falls within this column.
    pub fn contains(&self, x: f32) -> bool {
        x >= self.left && x < self.right
    }

    /// Whether a span belongs to this column, judged by its horizontal center.
    pub fn contains_span(&self, span: &TextSpan) -> bool {
        self.contains(span.x + span.width / 2.0)
    }
}

/// Spans sharing a baseline.
#[derive(Debug, Clone)]
pub struct TextLine {
    /// Spans sorted by x
    pub spans: Vec<TextSpan>,
    /// Baseline of the first span
    pub y: f32,
    /// Leftmost x
    pub x: f32,
    /// Character-weighted font size
    pub font_size: f32,
}

impl TextLine {
    /// Build a line from spans, sorting them left to right.
    pub fn from_spans(mut spans: Vec<TextSpan>) -> Self {
        spans.sort_by(|a, b| a.x.partial_cmp(&b.x).unwrap_or(Ordering::Equal));

        let total_chars: usize = spans.iter().map(|s| s.text.chars().count()).sum();
        let weighted: f32 = spans
            .iter()
            .map(|s| s.font_size * s.text.chars().count() as f32)
            .sum();

        let (x, y, first_size) = spans
            .first()
            .map(|s| (s.x, s.y, s.font_size))
            .unwrap_or((0.0, 0.0, 0.0));
        let font_size = if total_chars > 0 {
            weighted / total_chars as f32
        } else {
            first_size
        };

        Self {
            spans,
            y,
            x,
            font_size,
        }
    }

    /// Combined text, inserting a space where spans are visibly apart.
    pub fn text(&self) -> String {
        let mut result = String::new();
        let mut prev: Option<&TextSpan> = None;

        for span in &self.spans {
            if let Some(prev) = prev {
                let gap = span.x - prev.right();
                let threshold = span.font_size * 0.5 * 0.2;
                let both_spaceless = matches!(
                    (prev.text.chars().last(), span.text.chars().next()),
                    (Some(a), Some(b)) if is_spaceless_script_char(a) && is_spaceless_script_char(b)
                );
                let has_space = prev.text.ends_with(char::is_whitespace)
                    || span.text.starts_with(char::is_whitespace);
                if gap > threshold && !both_spaceless && !has_space {
                    result.push(' ');
                }
            }
            result.push_str(&span.text);
            prev = Some(span);
        }

        result
    }

    /// Top edge of the line (bottom-up coordinates).
    pub fn top(&self) -> f32 {
        self.spans
            .iter()
            .map(TextSpan::top)
            .fold(f32::NEG_INFINITY, f32::max)
    }
}

/// Consecutive lines forming one visual block.
#[derive(Debug, Clone)]
pub struct TextRegion {
    /// Lines, top to bottom
    pub lines: Vec<TextLine>,
}

impl TextRegion {
    /// Top edge of the first line (bottom-up coordinates).
    pub fn top(&self) -> f32 {
        self.lines.first().map(TextLine::top).unwrap_or(0.0)
    }

    /// Region text with lines joined by spaces. A trailing hyphen followed
    /// by a lowercase continuation is removed.
    pub fn text(&self) -> String {
        let mut result = String::new();

        for line in &self.lines {
            let text = line.text();
            let text = text.trim();
            if text.is_empty() {
                continue;
            }

            if result.is_empty() {
                result.push_str(text);
                continue;
            }

            let next_lower = text.chars().next().is_some_and(char::is_lowercase);
            if result.ends_with('-') && next_lower {
                result.pop();
            } else {
                let spaceless = matches!(
                    (result.chars().last(), text.chars().next()),
                    (Some(a), Some(b)) if is_spaceless_script_char(a) && is_spaceless_script_char(b)
                );
                if !spaceless {
                    result.push(' ');
                }
            }
            result.push_str(text);
        }

        result
    }
}

/// Group a page's spans into regions in reading order.
///
/// Multi-column pages are read column-major: every region of the left
/// column precedes every region of the right column.
pub fn page_regions(spans: Vec<TextSpan>) -> Vec<TextRegion> {
    if spans.is_empty() {
        return Vec::new();
    }

    let columns = detect_columns(&spans);
    log::debug!("Detected {} column(s)", columns.len());

    let mut per_column: Vec<Vec<TextSpan>> = vec![Vec::new(); columns.len()];
    for span in spans {
        let index = columns
            .iter()
            .position(|c| c.contains_span(&span))
            .unwrap_or(0);
        per_column[index].push(span);
    }

    per_column
        .into_iter()
        .flat_map(|spans| group_lines_into_regions(group_spans_into_lines(spans)))
        .collect()
}

/// Look for a vertical gutter splitting the page into two columns.
pub fn detect_columns(spans: &[TextSpan]) -> Vec<Column> {
    let min_x = spans.iter().map(|s| s.x).fold(f32::INFINITY, f32::min);
    let max_x = spans.iter().map(TextSpan::right).fold(f32::NEG_INFINITY, f32::max);

    let single = || {
        vec![Column {
            left: f32::NEG_INFINITY,
            right: f32::INFINITY,
            index: 0,
        }]
    };

    if spans.is_empty() || !min_x.is_finite() || !max_x.is_finite() {
        return single();
    }

    let page_width = max_x - min_x;
    if page_width < MIN_SPLIT_WIDTH {
        return single();
    }
    if page_width > MAX_SPLIT_WIDTH {
        log::debug!("Text spans {:.0}pt, wider than any page; single column", page_width);
        return single();
    }

    let slices = (page_width / SLICE_WIDTH) as usize + 1;
    let mut occupancy = vec![0usize; slices];
    for span in spans {
        let start = ((span.x - min_x) / SLICE_WIDTH) as usize;
        let end = ((span.right() - min_x) / SLICE_WIDTH) as usize;
        for slot in occupancy
            .iter_mut()
            .take(end.min(slices - 1) + 1)
            .skip(start)
        {
            *slot += 1;
        }
    }

    // Widest empty run in the middle of the page, ties broken toward the center.
    let search = (slices * 15 / 100)..(slices * 85 / 100);
    let center = slices as f32 / 2.0;
    let mut best: Option<(usize, usize)> = None;
    let mut run_start = None;

    let consider = |start: usize, len: usize, best: &mut Option<(usize, usize)>| {
        let better = match *best {
            None => true,
            Some((best_start, best_len)) => {
                let dist = |s: usize, l: usize| (s as f32 + l as f32 / 2.0 - center).abs();
                len > best_len || (len == best_len && dist(start, len) < dist(best_start, best_len))
            }
        };
        if better {
            *best = Some((start, len));
        }
    };

    for i in search.clone() {
        match (occupancy[i], run_start) {
            (0, None) => run_start = Some(i),
            (0, Some(_)) => {}
            (_, Some(start)) => {
                consider(start, i - start, &mut best);
                run_start = None;
            }
            (_, None) => {}
        }
    }
    if let Some(start) = run_start {
        consider(start, search.end - start, &mut best);
    }

    let Some((gap_start, gap_len)) = best else {
        return single();
    };

    let gap_width = gap_len as f32 * SLICE_WIDTH;
    if gap_width < MIN_GUTTER_WIDTH {
        log::debug!("Widest gap {:.1}pt too small for a gutter", gap_width);
        return single();
    }

    let gutter = min_x + (gap_start as f32 + gap_len as f32 / 2.0) * SLICE_WIDTH;
    if gutter - min_x < MIN_COLUMN_WIDTH || max_x - gutter < MIN_COLUMN_WIDTH {
        log::debug!("Column too narrow, treating as single column");
        return single();
    }

    let left = spans
        .iter()
        .filter(|s| s.x + s.width / 2.0 < gutter)
        .count();
    let right = spans.len() - left;
    let min_spans = (spans.len() / 10).max(2);
    if left < min_spans || right < min_spans {
        log::debug!("Spans too imbalanced ({} / {}), treating as single column", left, right);
        return single();
    }

    log::debug!("Gutter at x={:.1} ({:.1}pt wide)", gutter, gap_width);
    vec![
        Column {
            left: f32::NEG_INFINITY,
            right: gutter,
            index: 0,
        },
        Column {
            left: gutter,
            right: f32::INFINITY,
            index: 1,
        },
    ]
}

/// Group spans into lines by baseline, top to bottom.
pub fn group_spans_into_lines(mut spans: Vec<TextSpan>) -> Vec<TextLine> {
    spans.sort_by(|a, b| match b.y.partial_cmp(&a.y).unwrap_or(Ordering::Equal) {
        Ordering::Equal => a.x.partial_cmp(&b.x).unwrap_or(Ordering::Equal),
        other => other,
    });

    let mut lines = Vec::new();
    let mut current: Vec<TextSpan> = Vec::new();
    let mut baseline: Option<f32> = None;

    for span in spans {
        let tolerance = span.font_size * 0.3;
        match baseline {
            Some(y) if (span.y - y).abs() <= tolerance => current.push(span),
            _ => {
                if !current.is_empty() {
                    lines.push(TextLine::from_spans(std::mem::take(&mut current)));
                }
                baseline = Some(span.y);
                current.push(span);
            }
        }
    }

    if !current.is_empty() {
        lines.push(TextLine::from_spans(current));
    }

    lines
}

/// Group lines into regions, breaking on wide spacing, font size changes
/// and indentation changes.
pub fn group_lines_into_regions(lines: Vec<TextLine>) -> Vec<TextRegion> {
    let avg_spacing = average_line_spacing(&lines);
    let mut regions = Vec::new();
    let mut current: Vec<TextLine> = Vec::new();

    for line in lines {
        if let Some(prev) = current.last() {
            if should_break(prev, &line, avg_spacing) {
                regions.push(TextRegion {
                    lines: std::mem::take(&mut current),
                });
            }
        }
        current.push(line);
    }

    if !current.is_empty() {
        regions.push(TextRegion { lines: current });
    }

    regions
}

fn average_line_spacing(lines: &[TextLine]) -> f32 {
    let spacings: Vec<f32> = lines
        .windows(2)
        .map(|w| (w[0].y - w[1].y).abs())
        .filter(|s| *s > 0.1)
        .collect();

    if spacings.is_empty() {
        12.0
    } else {
        spacings.iter().sum::<f32>() / spacings.len() as f32
    }
}

fn should_break(prev: &TextLine, curr: &TextLine, avg_spacing: f32) -> bool {
    let spacing = (prev.y - curr.y).abs();
    spacing > avg_spacing * 1.5
        || (prev.font_size - curr.font_size).abs() > 1.0
        || (prev.x - curr.x).abs() > 20.0
}
