//! SVG backend: serializes a [`Scene`] into a standalone document.

use crate::palette::to_hex;
use crate::scene::{Primitive, Scene};

/// Escape text for use in element content and attribute values.
pub fn escape_xml(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            _ => out.push(c),
        }
    }
    out
}

pub fn render(scene: &Scene) -> String {
    let mut out = format!(
        r#"<svg xmlns="http://www.w3.org/2000/svg" width="{w}" height="{h}" viewBox="0 0 {w} {h}">"#,
        w = scene.width,
        h = scene.height
    );
    out.push('\n');
    out.push_str(&format!("<style>\n{}\n</style>\n", scene.style.css()));
    for primitive in &scene.primitives {
        out.push_str(&primitive_markup(primitive));
        out.push('\n');
    }
    out.push_str("</svg>\n");
    out
}

/// One primitive as a single SVG element.
fn primitive_markup(primitive: &Primitive) -> String {
    match primitive {
        Primitive::Rect {
            x,
            y,
            width,
            height,
            class,
            fill,
            stroke,
        } => {
            let class_attr = class
                .map(|c| format!(r#" class="{}""#, c.as_str()))
                .unwrap_or_default();
            let fill_attr = fill
                .map(|c| format!(r#" fill="{}""#, to_hex(c)))
                .unwrap_or_default();
            let stroke_attr = stroke
                .map(|c| format!(r#" stroke="{}""#, to_hex(c)))
                .unwrap_or_default();
            format!(
                r#"<rect x="{:.1}" y="{:.1}" width="{:.1}" height="{:.1}"{}{}{} />"#,
                x, y, width, height, class_attr, fill_attr, stroke_attr
            )
        }
        Primitive::Line { x1, y1, x2, y2, class } => format!(
            r#"<line x1="{:.1}" y1="{:.1}" x2="{:.1}" y2="{:.1}" class="{}" />"#,
            x1,
            y1,
            x2,
            y2,
            class.as_str()
        ),
        Primitive::Path { points, class } => {
            let d = points
                .iter()
                .enumerate()
                .map(|(i, (x, y))| format!("{}{:.1},{:.1}", if i == 0 { "M" } else { "L" }, x, y))
                .collect::<Vec<_>>()
                .join(" ");
            format!(r#"<path d="{}" class="{}" />"#, d, class.as_str())
        }
        Primitive::Text {
            x,
            y,
            content,
            class,
            anchor,
            fill,
        } => {
            let fill_attr = fill
                .map(|c| format!(r#" fill="{}""#, to_hex(c)))
                .unwrap_or_default();
            format!(
                r#"<text x="{:.1}" y="{:.1}" class="{}" text-anchor="{}"{}>{}</text>"#,
                x,
                y,
                class.as_str(),
                anchor.as_str(),
                fill_attr,
                escape_xml(content)
            )
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::{Anchor, Class, PlotArea, SceneBuilder, SceneStyle};
    use plotters::style::RGBColor;

    #[test]
    fn test_header_and_style_block() {
        let scene = SceneBuilder::new(720, 360, SceneStyle::default()).finish();
        let svg = render(&scene);
        assert!(svg.starts_with(
            r#"<svg xmlns="http://www.w3.org/2000/svg" width="720" height="360" viewBox="0 0 720 360">"#
        ));
        for class in [
            "axis", "grid", "label", "title", "tick", "bar", "line", "cell", "legend", "note",
            "country",
        ] {
            assert!(svg.contains(&format!(".{} {{", class)), "missing class {}", class);
        }
        assert!(svg.contains(r##"<rect x="0.0" y="0.0" width="720.0" height="360.0" fill="#ffffff" />"##));
        assert!(svg.trim_end().ends_with("</svg>"));
    }

    #[test]
    fn test_primitives_serialized_in_order() {
        let area = PlotArea::inset(100, 100, 10.0);
        let mut b = SceneBuilder::new(100, 100, SceneStyle::default());
        b.axes(&area)
            .polyline(vec![(10.0, 90.0), (50.0, 40.0), (90.0, 10.0)])
            .text(50.0, 5.0, "a", Class::Label, Anchor::Middle);
        let svg = render(&b.finish());

        let line_at = svg.find("<line").unwrap();
        let path_at = svg.find("<path").unwrap();
        let text_at = svg.find("<text").unwrap();
        assert!(line_at < path_at && path_at < text_at);
        assert!(svg.contains(r#"<path d="M10.0,90.0 L50.0,40.0 L90.0,10.0" class="line" />"#));
    }

    #[test]
    fn test_rect_attributes() {
        let rect = Primitive::Rect {
            x: 1.0,
            y: 2.0,
            width: 3.0,
            height: 4.0,
            class: Some(Class::Country),
            fill: Some(RGBColor(0, 128, 128)),
            stroke: Some(RGBColor(255, 255, 255)),
        };
        assert_eq!(
            primitive_markup(&rect),
            r##"<rect x="1.0" y="2.0" width="3.0" height="4.0" class="country" fill="#008080" stroke="#ffffff" />"##
        );
        let bare = Primitive::Rect {
            x: 0.0,
            y: 0.0,
            width: 1.0,
            height: 1.0,
            class: None,
            fill: None,
            stroke: None,
        };
        assert_eq!(primitive_markup(&bare), r#"<rect x="0.0" y="0.0" width="1.0" height="1.0" />"#);
    }

    #[test]
    fn test_text_is_escaped() {
        let mut b = SceneBuilder::new(10, 10, SceneStyle::default());
        b.colored_text(1.0, 2.0, "R&D <x>", Class::Cell, RGBColor(255, 255, 255));
        let svg = render(&b.finish());
        assert!(svg.contains(
            r##"<text x="1.0" y="2.0" class="cell" text-anchor="middle" fill="#ffffff">R&amp;D &lt;x&gt;</text>"##
        ));
    }
}
