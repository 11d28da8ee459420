//! Minimal immediate-mode SVG canvas for review pages.

use std::fmt::Write as FmtWrite;

#[derive(Debug, Clone)]
enum SvgElement {
    Line {
        x1: f64,
        y1: f64,
        x2: f64,
        y2: f64,
        stroke: &'static str,
        width: f64,
    },
    Rect {
        x: f64,
        y: f64,
        w: f64,
        h: f64,
        stroke: &'static str,
    },
    Circle {
        cx: f64,
        cy: f64,
        r: f64,
        fill: &'static str,
    },
    Text {
        x: f64,
        y: f64,
        content: String,
        size: f64,
        anchor: &'static str,
        rotate: bool,
    },
}

/// Coordinates in points, origin top-left.
pub struct Canvas {
    width: f64,
    height: f64,
    elements: Vec<SvgElement>,
}

impl Canvas {
    pub fn new(width: f64, height: f64) -> Self {
        Self {
            width,
            height,
            elements: Vec::new(),
        }
    }

    pub fn line(&mut self, x1: f64, y1: f64, x2: f64, y2: f64, stroke: &'static str, width: f64) {
        self.elements.push(SvgElement::Line {
            x1,
            y1,
            x2,
            y2,
            stroke,
            width,
        });
    }

    pub fn frame(&mut self, x: f64, y: f64, w: f64, h: f64) {
        self.elements.push(SvgElement::Rect {
            x,
            y,
            w,
            h,
            stroke: "#000000",
        });
    }

    pub fn marker(&mut self, cx: f64, cy: f64, r: f64, fill: &'static str) {
        self.elements.push(SvgElement::Circle { cx, cy, r, fill });
    }

    pub fn text(&mut self, x: f64, y: f64, content: &str, size: f64, anchor: &'static str) {
        self.elements.push(SvgElement::Text {
            x,
            y,
            content: content.to_string(),
            size,
            anchor,
            rotate: false,
        });
    }

    pub fn text_vertical(&mut self, x: f64, y: f64, content: &str, size: f64) {
        self.elements.push(SvgElement::Text {
            x,
            y,
            content: content.to_string(),
            size,
            anchor: "middle",
            rotate: true,
        });
    }

    pub fn to_svg(&self) -> String {
        let mut svg = String::new();
        let _ = write!(
            svg,
            r#"<svg xmlns="http://www.w3.org/2000/svg" width="{w}" height="{h}" viewBox="0 0 {w} {h}" font-family="Helvetica, Arial, sans-serif">"#,
            w = self.width,
            h = self.height
        );
        let _ = write!(
            svg,
            r##"<rect x="0" y="0" width="{}" height="{}" fill="#ffffff"/>"##,
            self.width, self.height
        );
        for element in &self.elements {
            render_element(&mut svg, element);
        }
        svg.push_str("</svg>");
        svg
    }
}

fn render_element(svg: &mut String, element: &SvgElement) {
    match element {
        SvgElement::Line {
            x1,
            y1,
            x2,
            y2,
            stroke,
            width,
        } => {
            let _ = write!(
                svg,
                r#"<line x1="{:.2}" y1="{:.2}" x2="{:.2}" y2="{:.2}" stroke="{}" stroke-width="{}"/>"#,
                x1, y1, x2, y2, stroke, width
            );
        }
        SvgElement::Rect { x, y, w, h, stroke } => {
            let _ = write!(
                svg,
                r#"<rect x="{:.2}" y="{:.2}" width="{:.2}" height="{:.2}" fill="none" stroke="{}"/>"#,
                x, y, w, h, stroke
            );
        }
        SvgElement::Circle { cx, cy, r, fill } => {
            let _ = write!(
                svg,
                r#"<circle cx="{:.2}" cy="{:.2}" r="{}" fill="{}"/>"#,
                cx, cy, r, fill
            );
        }
        SvgElement::Text {
            x,
            y,
            content,
            size,
            anchor,
            rotate,
        } => {
            let transform = if *rotate {
                format!(r#" transform="rotate(-90 {:.2} {:.2})""#, x, y)
            } else {
                String::new()
            };
            let _ = write!(
                svg,
                r#"<text x="{:.2}" y="{:.2}" font-size="{}" text-anchor="{}"{}>{}</text>"#,
                x,
                y,
                size,
                anchor,
                transform,
                escape_xml(content)
            );
        }
    }
}

fn escape_xml(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for character in text.chars() {
        match character {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            other => escaped.push(other),
        }
    }
    escaped
}

#[cfg(test)]
mod tests {
    use super::{Canvas, escape_xml};

    #[test]
    fn renders_elements_in_insertion_order() {
        let mut canvas = Canvas::new(100.0, 50.0);
        canvas.line(0.0, 0.0, 10.0, 10.0, "#000000", 1.0);
        canvas.text(5.0, 5.0, "PbPb & PP", 10.0, "start");

        let svg = canvas.to_svg();
        assert!(svg.starts_with("<svg"));
        assert!(svg.ends_with("</svg>"));
        let line = svg.find("<line").expect("line element");
        let text = svg.find("<text").expect("text element");
        assert!(line < text);
        assert!(svg.contains("PbPb &amp; PP"));
    }

    #[test]
    fn escapes_markup_characters() {
        assert_eq!(escape_xml(r#"<a href="x">"#), "&lt;a href=&quot;x&quot;&gt;");
    }
}
