//! KML document rendering.

use crate::palette::ColorPalette;
use crate::types::MatchedArea;
use geo::{Geometry, Polygon};
use std::fmt::{self, Write};

const KML_NAMESPACE: &str = "http://www.opengis.net/kml/2.2";
const INDENT: &str = "  ";

/// Indenting XML writer over an in-memory buffer.
struct KmlWriter {
    buffer: String,
    depth: usize,
}

impl KmlWriter {
    fn new() -> Self {
        Self { buffer: String::new(), depth: 0 }
    }

    fn indent(&mut self) {
        for _ in 0..self.depth {
            self.buffer.push_str(INDENT);
        }
    }

    fn open(&mut self, tag: &str, attrs: &[(&str, &str)]) -> fmt::Result {
        self.indent();
        write!(self.buffer, "<{}", tag)?;
        for (name, value) in attrs {
            write!(self.buffer, " {}=\"{}\"", name, escape(value))?;
        }
        writeln!(self.buffer, ">")?;
        self.depth += 1;
        Ok(())
    }

    fn close(&mut self, tag: &str) -> fmt::Result {
        self.depth -= 1;
        self.indent();
        writeln!(self.buffer, "</{}>", tag)
    }

    fn leaf(&mut self, tag: &str, text: impl fmt::Display) -> fmt::Result {
        self.indent();
        writeln!(self.buffer, "<{tag}>{}</{tag}>", escape(&text.to_string()))
    }

    fn into_string(self) -> String {
        self.buffer
    }
}

fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            _ => out.push(c),
        }
    }
    out
}

/// Style id for a class; placemarks reference it as `#q{class}`.
pub fn style_id(class: usize) -> String {
    format!("q{}", class)
}

/// Render a full KML document: one style per palette entry, one placemark per area.
pub fn render_kml(palette: &ColorPalette, areas: &[MatchedArea<'_>]) -> Result<String, fmt::Error> {
    let mut w = KmlWriter::new();
    writeln!(w.buffer, r#"<?xml version="1.0" encoding="UTF-8"?>"#)?;
    w.open("kml", &[("xmlns", KML_NAMESPACE)])?;
    w.open("Document", &[])?;

    for (class, color) in palette.fills().iter().enumerate() {
        write_style(&mut w, palette, &style_id(class), color)?;
    }

    for area in areas {
        w.open("Placemark", &[])?;
        w.leaf("name", &area.id)?;
        w.leaf("styleUrl", format!("#{}", style_id(area.quintile_class)))?;
        write_geometry(&mut w, area.geometry)?;
        w.close("Placemark")?;
    }

    w.close("Document")?;
    w.close("kml")?;
    Ok(w.into_string())
}

fn write_style(
    w: &mut KmlWriter,
    palette: &ColorPalette,
    id: &str,
    fill: impl fmt::Display,
) -> fmt::Result {
    w.open("Style", &[("id", id)])?;

    w.open("PolyStyle", &[])?;
    w.leaf("color", fill)?;
    w.leaf("fill", 1)?;
    w.leaf("outline", 1)?;
    w.close("PolyStyle")?;

    w.open("LineStyle", &[])?;
    w.leaf("color", palette.border)?;
    w.leaf("width", palette.border_width)?;
    w.close("LineStyle")?;

    w.close("Style")
}

fn write_geometry(w: &mut KmlWriter, geometry: &Geometry<f64>) -> fmt::Result {
    match geometry {
        Geometry::Polygon(polygon) => write_polygon(w, polygon),
        Geometry::MultiPolygon(multi) => {
            w.open("MultiGeometry", &[])?;
            for polygon in multi {
                write_polygon(w, polygon)?;
            }
            w.close("MultiGeometry")
        }
        _ => {
            tracing::debug!("Skipping non-polygon geometry");
            Ok(())
        }
    }
}

/// Exterior ring only; holes are not carried into the output.
fn write_polygon(w: &mut KmlWriter, polygon: &Polygon<f64>) -> fmt::Result {
    w.open("Polygon", &[])?;
    w.open("outerBoundaryIs", &[])?;
    w.open("LinearRing", &[])?;
    w.leaf("coordinates", ring_coordinates(polygon))?;
    w.close("LinearRing")?;
    w.close("outerBoundaryIs")?;
    w.close("Polygon")
}

/// `lon,lat,0` triples separated by spaces, in ring order.
pub fn ring_coordinates(polygon: &Polygon<f64>) -> String {
    polygon
        .exterior()
        .coords()
        .map(|c| format!("{},{},0", c.x, c.y))
        .collect::<Vec<_>>()
        .join(" ")
}
