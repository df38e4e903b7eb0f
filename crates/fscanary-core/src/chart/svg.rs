//! Minimal SVG line chart.

use std::fmt::Write;

const WIDTH: f64 = 640.0;
const HEIGHT: f64 = 480.0;
const MARGIN_LEFT: f64 = 80.0;
const MARGIN_RIGHT: f64 = 20.0;
const MARGIN_TOP: f64 = 40.0;
const MARGIN_BOTTOM: f64 = 60.0;
const TICKS: usize = 5;

/// A single-series line chart with a y-axis clipped at zero.
#[derive(Debug, Clone)]
pub struct LineChart {
    pub title: String,
    pub x_label: String,
    pub y_label: String,
    pub points: Vec<(f64, f64)>,
}

impl LineChart {
    /// X bounds of the data, widened when all points share one x.
    pub fn x_bounds(&self) -> (f64, f64) {
        let min = self.points.iter().map(|p| p.0).fold(f64::MAX, f64::min);
        let max = self.points.iter().map(|p| p.0).fold(f64::MIN, f64::max);
        if self.points.is_empty() {
            (0.0, 1.0)
        } else if max - min <= f64::EPSILON {
            (min - 0.5, max + 0.5)
        } else {
            (min, max)
        }
    }

    /// Y bounds: always start at 0, with 5% headroom above the largest value.
    pub fn y_bounds(&self) -> (f64, f64) {
        let max = self.points.iter().map(|p| p.1).fold(0.0, f64::max);
        if max <= 0.0 { (0.0, 1.0) } else { (0.0, max * 1.05) }
    }

    pub fn to_svg(&self) -> String {
        let (x_min, x_max) = self.x_bounds();
        let (y_min, y_max) = self.y_bounds();
        let plot_w = WIDTH - MARGIN_LEFT - MARGIN_RIGHT;
        let plot_h = HEIGHT - MARGIN_TOP - MARGIN_BOTTOM;
        let sx = |x: f64| MARGIN_LEFT + (x - x_min) / (x_max - x_min) * plot_w;
        // Negative values are clipped to the axis.
        let sy = |y: f64| MARGIN_TOP + plot_h - (y.max(y_min) - y_min) / (y_max - y_min) * plot_h;

        let mut s = String::new();
        // Writing to a String cannot fail.
        let _ = writeln!(
            s,
            r#"<svg xmlns="http://www.w3.org/2000/svg" width="{WIDTH}" height="{HEIGHT}" viewBox="0 0 {WIDTH} {HEIGHT}">"#
        );
        let _ = writeln!(s, r#"<rect width="100%" height="100%" fill="white"/>"#);
        let _ = writeln!(
            s,
            r#"<text x="{}" y="24" font-family="sans-serif" font-size="16" text-anchor="middle">{}</text>"#,
            WIDTH / 2.0,
            escape(&self.title)
        );

        // Axes
        let x0 = MARGIN_LEFT;
        let y0 = MARGIN_TOP + plot_h;
        let _ = writeln!(
            s,
            r#"<path d="M{x0},{MARGIN_TOP} L{x0},{y0} L{},{y0}" fill="none" stroke="black"/>"#,
            x0 + plot_w
        );

        for i in 0..=TICKS {
            let f = i as f64 / TICKS as f64;
            let xv = x_min + f * (x_max - x_min);
            let yv = y_min + f * (y_max - y_min);
            let _ = writeln!(
                s,
                r#"<text x="{:.1}" y="{:.1}" font-family="sans-serif" font-size="10" text-anchor="middle">{}</text>"#,
                sx(xv),
                y0 + 16.0,
                tick_label(xv)
            );
            let _ = writeln!(
                s,
                r#"<text x="{:.1}" y="{:.1}" font-family="sans-serif" font-size="10" text-anchor="end">{}</text>"#,
                x0 - 6.0,
                sy(yv) + 3.0,
                tick_label(yv)
            );
        }

        let _ = writeln!(
            s,
            r#"<text x="{:.1}" y="{:.1}" font-family="sans-serif" font-size="12" text-anchor="middle">{}</text>"#,
            MARGIN_LEFT + plot_w / 2.0,
            HEIGHT - 16.0,
            escape(&self.x_label)
        );
        let _ = writeln!(
            s,
            r#"<text x="16" y="{:.1}" font-family="sans-serif" font-size="12" text-anchor="middle" transform="rotate(-90 16 {:.1})">{}</text>"#,
            MARGIN_TOP + plot_h / 2.0,
            MARGIN_TOP + plot_h / 2.0,
            escape(&self.y_label)
        );

        if !self.points.is_empty() {
            let coords: Vec<String> = self
                .points
                .iter()
                .map(|&(x, y)| format!("{:.2},{:.2}", sx(x), sy(y)))
                .collect();
            let _ = writeln!(
                s,
                r##"<polyline points="{}" fill="none" stroke="#1f77b4" stroke-width="1.5"/>"##,
                coords.join(" ")
            );
            if self.points.len() == 1 {
                let (x, y) = self.points[0];
                let _ = writeln!(
                    s,
                    r##"<circle cx="{:.2}" cy="{:.2}" r="3" fill="#1f77b4"/>"##,
                    sx(x),
                    sy(y)
                );
            }
        }

        s.push_str("</svg>\n");
        s
    }
}

fn tick_label(v: f64) -> String {
    let a = v.abs();
    if a != 0.0 && !(1e-3..1e6).contains(&a) {
        format!("{v:.2e}")
    } else if a >= 100.0 {
        format!("{v:.0}")
    } else {
        format!("{v:.3}")
    }
}

fn escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chart(points: Vec<(f64, f64)>) -> LineChart {
        LineChart {
            title: "/data <a&b>".into(),
            x_label: "x".into(),
            y_label: "y".into(),
            points,
        }
    }

    #[test]
    fn test_y_axis_starts_at_zero() {
        assert_eq!(chart(vec![(0.0, 5.0), (1.0, 10.0)]).y_bounds(), (0.0, 10.5));
        assert_eq!(chart(vec![(0.0, -3.0)]).y_bounds(), (0.0, 1.0));
        assert_eq!(chart(vec![]).y_bounds(), (0.0, 1.0));
    }

    #[test]
    fn test_single_x_widened() {
        assert_eq!(chart(vec![(4.0, 1.0)]).x_bounds(), (3.5, 4.5));
    }

    #[test]
    fn test_svg_is_well_formed_and_escaped() {
        let svg = chart(vec![(0.0, 1.0), (1.0, 2.0), (2.0, 0.5)]).to_svg();
        assert!(svg.starts_with("<svg"));
        assert!(svg.trim_end().ends_with("</svg>"));
        assert!(svg.contains("<polyline"));
        assert!(svg.contains("/data &lt;a&amp;b&gt;"));
        assert!(!svg.contains("<a&b>"));
    }

    #[test]
    fn test_single_point_gets_marker() {
        let svg = chart(vec![(0.0, 1.0)]).to_svg();
        assert!(svg.contains("<circle"));
    }

    #[test]
    fn test_tick_labels() {
        assert_eq!(tick_label(0.0), "0.000");
        assert_eq!(tick_label(0.5), "0.500");
        assert_eq!(tick_label(1234.4), "1234");
        assert_eq!(tick_label(134217728.0), "1.34e8");
    }
}
