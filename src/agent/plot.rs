use base64::engine::general_purpose::STANDARD;
use base64::Engine;

use crate::transcript::SideArtifact;

const TITLE: &str = "Example Trend";
const POINTS: [(f64, f64); 3] = [(1.0, 4.0), (2.0, 9.0), (3.0, 2.0)];

const WIDTH: f64 = 500.0;
const HEIGHT: f64 = 300.0;
const MARGIN: f64 = 40.0;

/// A fixed illustrative line chart. It does not depend on any paper or answer.
pub fn example_trend() -> SideArtifact {
    let svg = render_svg();
    SideArtifact {
        title: TITLE.to_string(),
        html: format!(
            r#"<img src="data:image/svg+xml;base64,{}" width="500"/>"#,
            STANDARD.encode(svg)
        ),
    }
}

fn render_svg() -> String {
    let (x_min, x_max) = (1.0, 3.0);
    let (y_min, y_max) = (0.0, 10.0);
    let sx = |x: f64| MARGIN + (x - x_min) / (x_max - x_min) * (WIDTH - 2.0 * MARGIN);
    let sy = |y: f64| HEIGHT - MARGIN - (y - y_min) / (y_max - y_min) * (HEIGHT - 2.0 * MARGIN);

    let points = POINTS
        .iter()
        .map(|&(x, y)| format!("{:.1},{:.1}", sx(x), sy(y)))
        .collect::<Vec<_>>()
        .join(" ");

    format!(
        concat!(
            r#"<svg xmlns="http://www.w3.org/2000/svg" width="{w}" height="{h}" viewBox="0 0 {w} {h}">"#,
            r#"<rect width="100%" height="100%" fill="white"/>"#,
            r#"<text x="{cx}" y="24" text-anchor="middle" font-family="sans-serif" font-size="16">{title}</text>"#,
            r#"<line x1="{m}" y1="{b}" x2="{r}" y2="{b}" stroke="black"/>"#,
            r#"<line x1="{m}" y1="{m}" x2="{m}" y2="{b}" stroke="black"/>"#,
            r#"<polyline points="{points}" fill="none" stroke="steelblue" stroke-width="2"/>"#,
            "</svg>"
        ),
        w = WIDTH,
        h = HEIGHT,
        cx = WIDTH / 2.0,
        title = TITLE,
        m = MARGIN,
        b = HEIGHT - MARGIN,
        r = WIDTH - MARGIN,
        points = points,
    )
}
