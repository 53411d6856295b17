//! ASCII plotting for terminal output.
//!
//! This is intentionally "dumb" (fixed-size grid), optimized for:
//! - quick visual sanity checks in a terminal
//! - deterministic output (helpful for golden tests)
//!
//! Rows are spaced evenly along x by position, like a categorical date axis.
//! Each tier is drawn as a polyline with its own glyph; where lines cross, the
//! tier drawn first (24K) wins.

use crate::domain::{PriceTable, Tier};

/// Glyph used for each tier's line.
pub const TIER_GLYPHS: [(Tier, char); 3] = [(Tier::K24, '#'), (Tier::K22, '+'), (Tier::K18, '.')];

/// Render a table as a fixed-size ASCII chart.
pub fn render_price_plot(table: &PriceTable, width: usize, height: usize) -> String {
    let width = width.max(10);
    let height = height.max(5);

    let (y_min, y_max) = table
        .value_range()
        .map(|(lo, hi)| if hi > lo { (lo, hi) } else { (lo - 1.0, hi + 1.0) })
        .unwrap_or((0.0, 1.0));
    let (y_min, y_max) = pad_range(y_min, y_max, 0.05);

    let mut grid = vec![vec![' '; width]; height];
    let n = table.rows.len();

    for (tier, glyph) in TIER_GLYPHS {
        let mut prev = None;
        for (i, row) in table.rows.iter().enumerate() {
            let x = map_x(i, n, width);
            let y = map_y(row.prices.get(tier), y_min, y_max, height);
            match prev {
                Some((x0, y0)) => draw_line(&mut grid, x0, y0, x, y, glyph),
                None => plot(&mut grid, x, y, glyph),
            }
            prev = Some((x, y));
        }
    }

    // Build final string. We include a small header with ranges.
    let mut out = String::new();
    let x_range = match (table.rows.first(), table.rows.last()) {
        (Some(first), Some(last)) => format!(
            "{} .. {}",
            table.granularity.format_bucket(first.bucket),
            table.granularity.format_bucket(last.bucket)
        ),
        _ => "-".to_string(),
    };
    out.push_str(&format!("Plot: {x_range} | y=[{y_min:.2}, {y_max:.2}]\n"));

    let legend: Vec<String> = TIER_GLYPHS
        .iter()
        .map(|(tier, glyph)| format!("{glyph} {tier}"))
        .collect();
    out.push_str(&format!("Legend: {}\n", legend.join("  ")));

    for row in grid {
        out.push_str(&row.into_iter().collect::<String>());
        out.push('\n');
    }

    out
}

fn pad_range(min: f64, max: f64, frac: f64) -> (f64, f64) {
    let span = (max - min).abs();
    let pad = (span * frac).max(1e-12);
    (min - pad, max + pad)
}

fn map_x(i: usize, n: usize, width: usize) -> usize {
    if n < 2 {
        return 0;
    }
    let u = i as f64 / (n as f64 - 1.0);
    (u * (width as f64 - 1.0)).round() as usize
}

fn map_y(y: f64, y_min: f64, y_max: f64, height: usize) -> usize {
    let height = height.max(2);
    let u = ((y - y_min) / (y_max - y_min)).clamp(0.0, 1.0);
    // y=top is max -> row 0
    (height as f64 - 1.0 - (u * (height as f64 - 1.0))).round() as usize
}

fn plot(grid: &mut [Vec<char>], x: usize, y: usize, ch: char) {
    if let Some(cell) = grid.get_mut(y).and_then(|row| row.get_mut(x)) {
        if *cell == ' ' {
            *cell = ch;
        }
    }
}

/// Integer line drawing (Bresenham-ish).
fn draw_line(grid: &mut [Vec<char>], x0: usize, y0: usize, x1: usize, y1: usize, ch: char) {
    let mut x0 = x0 as isize;
    let mut y0 = y0 as isize;
    let x1 = x1 as isize;
    let y1 = y1 as isize;

    let dx = (x1 - x0).abs();
    let sx = if x0 < x1 { 1 } else { -1 };
    let dy = -(y1 - y0).abs();
    let sy = if y0 < y1 { 1 } else { -1 };
    let mut err = dx + dy;

    loop {
        if x0 >= 0 && y0 >= 0 {
            plot(grid, x0 as usize, y0 as usize, ch);
        }

        if x0 == x1 && y0 == y1 {
            break;
        }
        let e2 = 2 * err;
        if e2 >= dy {
            err += dy;
            x0 += sx;
        }
        if e2 <= dx {
            err += dx;
            y0 += sy;
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;
    use crate::domain::{Granularity, PriceRow, TableKind, TierPrices};

    fn table(rows: &[(NaiveDate, f64, f64, f64)]) -> PriceTable {
        PriceTable {
            kind: TableKind::Historical,
            granularity: Granularity::Monthly,
            rows: rows
                .iter()
                .map(|&(bucket, a, b, c)| PriceRow {
                    bucket,
                    prices: TierPrices::new(a, b, c),
                })
                .collect(),
        }
    }

    #[test]
    fn plot_golden_snapshot_small() {
        let jan = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let feb = NaiveDate::from_ymd_opt(2024, 2, 1).unwrap();
        let txt = render_price_plot(&table(&[(jan, 100.0, 90.0, 80.0), (feb, 110.0, 100.0, 90.0)]), 10, 5);
        let expected = concat!(
            "Plot: 2024-01 .. 2024-02 | y=[78.50, 111.50]\n",
            "Legend: # 24K  + 22K  . 18K\n",
            "     #####\n",
            "#####  +++\n",
            "   ++++   \n",
            "+++  .....\n",
            ".....     \n",
        );
        assert_eq!(txt, expected);
    }

    #[test]
    fn single_row_plots_one_column() {
        let jan = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let txt = render_price_plot(&table(&[(jan, 100.0, 100.0, 100.0)]), 10, 5);
        let grid: Vec<&str> = txt.lines().skip(2).collect();
        assert_eq!(grid.len(), 5);
        // All tiers share one cell; 24K is drawn first.
        assert_eq!(grid.iter().filter(|l| l.starts_with('#')).count(), 1);
        assert!(grid.iter().all(|l| l[1..].trim().is_empty()));
    }

    #[test]
    fn empty_table_renders_blank_grid() {
        let txt = render_price_plot(&table(&[]), 12, 6);
        assert!(txt.starts_with("Plot: - |"));
        assert_eq!(txt.lines().count(), 2 + 6);
    }
}
