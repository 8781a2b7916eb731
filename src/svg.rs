//! SVG serializer: converts [`DrawCommand`] lists into standalone SVG
//! strings. Serialization only; all geometry is decided upstream by the
//! layout engine.

use super::draw::DrawCommand;

/// Render a list of drawing commands as an SVG document string.
///
/// `width` and `height` define the SVG viewBox dimensions.
pub fn render_svg(commands: &[DrawCommand], width: f64, height: f64) -> String {
    let mut svg = String::with_capacity(commands.len() * 120 + 256);
    svg.push_str(&format!(
        r#"<svg xmlns="http://www.w3.org/2000/svg" width="{width}" height="{height}" viewBox="0 0 {width} {height}">"#,
    ));

    for cmd in commands {
        match cmd {
            DrawCommand::FillRect { rect, color } => {
                svg.push_str(&format!(
                    r#"<rect x="{}" y="{}" width="{}" height="{}" fill="{}"/>"#,
                    rect.x, rect.y, rect.w, rect.h, color,
                ));
            }
            DrawCommand::StrokeRect { rect, color } => {
                svg.push_str(&format!(
                    r#"<rect x="{}" y="{}" width="{}" height="{}" stroke="{}" fill="none"/>"#,
                    rect.x, rect.y, rect.w, rect.h, color,
                ));
            }
            DrawCommand::Line { from, to, color } => {
                svg.push_str(&format!(
                    r#"<line x1="{}" y1="{}" x2="{}" y2="{}" stroke="{}"/>"#,
                    from.x, from.y, to.x, to.y, color,
                ));
            }
            DrawCommand::Text {
                position,
                text,
                color,
                font_size,
            } => {
                svg.push_str(&format!(
                    r#"<text x="{}" y="{}" fill="{}" style="font-size:{}px; font-family:Arial">{}</text>"#,
                    position.x,
                    position.y,
                    color,
                    font_size,
                    escape_xml(text),
                ));
            }
        }
    }

    svg.push_str("</svg>");
    svg
}

fn escape_xml(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}
