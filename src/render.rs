use crate::types::Placement;

const MAX_COLS: f64 = 80.0;
const MAX_ROWS: f64 = 40.0;

/// Character grid where crossing outlines join into `+`.
struct Canvas {
    cols: usize,
    cells: Vec<char>,
}

impl Canvas {
    fn new(cols: usize, rows: usize) -> Self {
        Self {
            cols,
            cells: vec![' '; cols * rows],
        }
    }

    fn stroke(&mut self, col: usize, row: usize, glyph: char) {
        let cell = &mut self.cells[row * self.cols + col];
        *cell = match *cell {
            ' ' => glyph,
            c if c == glyph => glyph,
            _ => '+',
        };
    }

    /// Outline between two corner cells, both inclusive.
    fn outline(&mut self, (c0, r0): (usize, usize), (c1, r1): (usize, usize)) {
        for col in c0..=c1 {
            self.stroke(col, r0, '-');
            self.stroke(col, r1, '-');
        }
        for row in r0..=r1 {
            self.stroke(c0, row, '|');
            self.stroke(c1, row, '|');
        }
        for (col, row) in [(c0, r0), (c1, r0), (c0, r1), (c1, r1)] {
            self.cells[row * self.cols + col] = '+';
        }
    }

    /// Writes `text` centred in the interior of an outline, cut to the interior width.
    fn label(&mut self, text: &str, (c0, r0): (usize, usize), (c1, r1): (usize, usize)) {
        if c1 < c0 + 2 || r1 < r0 + 2 {
            return;
        }
        let inner = c1 - c0 - 1;
        let chars: Vec<char> = text.chars().take(inner).collect();
        let row = (r0 + r1) / 2;
        let start = c0 + 1 + (inner - chars.len()) / 2;
        for (i, ch) in chars.into_iter().enumerate() {
            self.cells[row * self.cols + start + i] = ch;
        }
    }

    fn into_string(self) -> String {
        let mut out = String::new();
        for row in self.cells.chunks(self.cols) {
            let line: String = row.iter().collect();
            out.push_str(line.trim_end());
            out.push('\n');
        }
        out
    }
}

/// Draws one sheet as ASCII art: the sheet border, each placement's outline and
/// its panel id centred inside when the outline leaves room for it.
pub fn render_sheet(sheet_width: f64, sheet_height: f64, placements: &[Placement]) -> String {
    if !(sheet_width > 0.0 && sheet_height > 0.0) {
        return String::new();
    }
    // Terminal cells are roughly twice as tall as they are wide
    let scale = f64::min(MAX_COLS / sheet_width, MAX_ROWS / sheet_height);
    let last_col = (sheet_width * scale).round() as usize;
    let last_row = (sheet_height * scale / 2.0).round() as usize;
    if last_col == 0 || last_row == 0 {
        return String::new();
    }

    let col = |x: f64| ((x * scale).round() as usize).min(last_col);
    let row = |y: f64| ((y * scale / 2.0).round() as usize).min(last_row);

    let mut canvas = Canvas::new(last_col + 1, last_row + 1);
    canvas.outline((0, 0), (last_col, last_row));

    for p in placements {
        // Cells come from the edges, so panels sharing a cut share a grid line
        let top_left = (col(p.rect.x), row(p.rect.y));
        let bottom_right = (col(p.rect.right()), row(p.rect.bottom()));
        if bottom_right.0 == top_left.0 || bottom_right.1 == top_left.1 {
            continue;
        }
        canvas.outline(top_left, bottom_right);
        canvas.label(&p.panel_id, top_left, bottom_right);
    }

    canvas.into_string()
}
