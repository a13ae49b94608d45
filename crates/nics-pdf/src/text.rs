//! Word and line grouping of glyphs

use crate::geometry::Char;

/// Consecutive glyphs on one baseline without a gap wider than the tolerance.
#[derive(Debug, Clone, PartialEq)]
pub struct Word {
    pub text: String,
    pub x0: f64,
    pub x1: f64,
    pub top: f64,
    pub bottom: f64,
}

impl Word {
    fn start(c: &Char) -> Self {
        Self {
            text: c.text.clone(),
            x0: c.x0,
            x1: c.x1,
            top: c.top,
            bottom: c.bottom,
        }
    }

    fn push(&mut self, c: &Char) {
        self.text.push_str(&c.text);
        self.x0 = self.x0.min(c.x0);
        self.x1 = self.x1.max(c.x1);
        self.top = self.top.min(c.top);
        self.bottom = self.bottom.max(c.bottom);
    }
}

/// Group sorted values so that neighbours closer than `tolerance` share a cluster.
///
/// Returns, for each input index, the index of its cluster; clusters are
/// numbered in ascending value order.
pub fn cluster_values(values: &[f64], tolerance: f64) -> Vec<usize> {
    let mut order: Vec<usize> = (0..values.len()).collect();
    order.sort_by(|&a, &b| values[a].total_cmp(&values[b]));

    let mut clusters = vec![0; values.len()];
    let mut current = 0;
    let mut last: Option<f64> = None;
    for i in order {
        if let Some(prev) = last {
            if values[i] > prev + tolerance {
                current += 1;
            }
        }
        clusters[i] = current;
        last = Some(values[i]);
    }
    clusters
}

/// Group objects into rows by their `top`, rows ordered top to bottom.
pub fn cluster_rows<T, F>(objects: &[T], top: F, tolerance: f64) -> Vec<Vec<&T>>
where
    F: Fn(&T) -> f64,
{
    let tops: Vec<f64> = objects.iter().map(&top).collect();
    let clusters = cluster_values(&tops, tolerance);
    let count = clusters.iter().max().map(|m| m + 1).unwrap_or(0);
    let mut rows: Vec<Vec<&T>> = vec![Vec::new(); count];
    for (object, cluster) in objects.iter().zip(clusters) {
        rows[cluster].push(object);
    }
    rows
}

/// Split glyphs into words.
///
/// Glyphs are grouped into lines by `top`, then read left to right; a blank
/// glyph or a horizontal gap above `x_tolerance` ends the current word.
pub fn extract_words(chars: &[Char], x_tolerance: f64, y_tolerance: f64) -> Vec<Word> {
    let mut words = Vec::new();
    for mut line in cluster_rows(chars, |c| c.top, y_tolerance) {
        line.sort_by(|a, b| a.x0.total_cmp(&b.x0));
        let mut current: Option<Word> = None;
        for c in line {
            if c.is_blank() {
                words.extend(current.take());
                continue;
            }
            match current.as_mut() {
                Some(word) if c.x0 <= word.x1 + x_tolerance => word.push(c),
                _ => {
                    words.extend(current.take());
                    current = Some(Word::start(c));
                }
            }
        }
        words.extend(current);
    }
    words
}

/// Plain text of `chars`: lines top to bottom joined by `\n`, words joined by a space.
pub fn extract_text(chars: &[Char], x_tolerance: f64, y_tolerance: f64) -> String {
    let words = extract_words(chars, x_tolerance, y_tolerance);
    cluster_rows(&words, |w| w.top, y_tolerance)
        .into_iter()
        .map(|mut line| {
            line.sort_by(|a, b| a.x0.total_cmp(&b.x0));
            line.iter()
                .map(|w| w.text.as_str())
                .collect::<Vec<_>>()
                .join(" ")
        })
        .collect::<Vec<_>>()
        .join("\n")
}
