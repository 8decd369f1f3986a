//! Text rendering for chat replies.

use crate::matrix::PresenceMatrix;

const PRESENT: &str = "✅";
const ABSENT: &str = "❌";

/// Column labels `Link 1` to `Link n`.
#[must_use]
pub fn link_headers(count: usize) -> Vec<String> {
    (1..=count).map(|i| format!("Link {i}")).collect()
}

/// Render the matrix as a grid table with one column per secondary.
///
/// `headers` labels the secondary columns; missing labels fall back to
/// `Link i`.
#[must_use]
pub fn render_presence_table(matrix: &PresenceMatrix, headers: &[String]) -> String {
    let mut header_row = vec!["Username".to_string()];
    header_row.extend((0..matrix.secondary_count()).map(|i| {
        headers
            .get(i)
            .cloned()
            .unwrap_or_else(|| format!("Link {}", i + 1))
    }));

    let body: Vec<Vec<String>> = matrix
        .rows()
        .iter()
        .map(|row| {
            let mut cells = vec![row.identity.to_string()];
            cells.extend(
                row.present
                    .iter()
                    .map(|present| if *present { PRESENT } else { ABSENT }.to_string()),
            );
            cells
        })
        .collect();

    let widths: Vec<usize> = (0..header_row.len())
        .map(|col| {
            std::iter::once(&header_row)
                .chain(body.iter())
                .filter_map(|row| row.get(col))
                .map(|cell| cell.chars().count())
                .max()
                .unwrap_or(0)
        })
        .collect();

    let mut lines = vec![border(&widths, '-')];
    lines.push(render_row(&header_row, &widths));
    lines.push(border(&widths, '='));
    for row in &body {
        lines.push(render_row(row, &widths));
        lines.push(border(&widths, '-'));
    }
    if body.is_empty() {
        lines.pop();
        lines.push(border(&widths, '-'));
    }
    lines.join("\n")
}

fn border(widths: &[usize], fill: char) -> String {
    let segments: Vec<String> = widths
        .iter()
        .map(|w| fill.to_string().repeat(w + 2))
        .collect();
    format!("+{}+", segments.join("+"))
}

fn render_row(cells: &[String], widths: &[usize]) -> String {
    let padded: Vec<String> = cells
        .iter()
        .zip(widths)
        .map(|(cell, width)| {
            let pad = width.saturating_sub(cell.chars().count());
            format!(" {cell}{} ", " ".repeat(pad))
        })
        .collect();
    format!("|{}|", padded.join("|"))
}

/// Split `text` into pieces of at most `max_chars` characters.
///
/// Splits fall on character boundaries; an empty text yields no pieces.
#[must_use]
pub fn chunk_message(text: &str, max_chars: usize) -> Vec<String> {
    let max_chars = max_chars.max(1);
    let chars: Vec<char> = text.chars().collect();
    chars
        .chunks(max_chars)
        .map(|chunk| chunk.iter().collect())
        .collect()
}
