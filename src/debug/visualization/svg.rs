// src/debug/visualization/svg.rs
use super::cells::wrap_fragments;
use crate::math::{point_distribution::CellArray, types::Point2D};
use crate::sim::error::{SimError, SimResult};
use bevy::log::info;
use std::path::Path;
use svg::{Document, Node};
use svg::node::element::{Circle, Rectangle, Style, Text as TextElement};

/// Pixelbreite der längeren Seite.
const SVG_PIXEL_SIZE: f64 = 800.0;

// ===================================================================================
// HILFS-STRUCT für die SVG-Erstellung
// ===================================================================================
/// Sammelt die Elemente einer SVG-Datei; Koordinaten sind Gebietskoordinaten.
struct SvgBuilder {
    document: Document,
}

impl SvgBuilder {
    /// Grundgerüst mit ViewBox, Stil und Hintergrund. Die ViewBox reicht um
    /// `margin` über das Gebiet hinaus, damit Randfragmente sichtbar bleiben.
    fn new(width: f64, height: f64, margin: f64) -> Self {
        let view_w = width + 2.0 * margin;
        let view_h = height + 2.0 * margin;
        let scale = SVG_PIXEL_SIZE / view_w.max(view_h);

        let stroke_w_normal = (width + height) / 2.0 * 0.003;
        let stroke_w_thin = (width + height) / 2.0 * 0.0015;
        let font_size = (width + height) / 2.0 * 0.015;

        let style = Style::new(format!(
            ".domain {{ fill: #ffffff; stroke: #888888; stroke-width: {stroke_w_normal}; }}
.cell {{ fill: rgba(80, 170, 255, 0.5); stroke: #0055aa; stroke-width: {stroke_w_normal}; }}
.fragment {{ fill: rgba(80, 170, 255, 0.25); stroke: #0055aa; stroke-width: {stroke_w_thin}; stroke-dasharray: 0.05,0.05; }}
.density-area {{ fill: none; stroke: #ff9900; stroke-width: {stroke_w_thin}; }}
.label {{ font-family: monospace; font-size: {font_size:.3}px; fill: #000000; text-anchor: middle; dominant-baseline: middle; }}"
        ));

        let document = Document::new()
            .set("width", view_w * scale)
            .set("height", view_h * scale)
            .set("viewBox", (-margin, -margin, view_w, view_h))
            .add(style)
            .add(
                Rectangle::new()
                    .set("x", -margin)
                    .set("y", -margin)
                    .set("width", view_w)
                    .set("height", view_h)
                    .set("fill", "#f0f0f0"),
            );

        Self { document }
    }

    fn draw_rect(&mut self, x: f64, y: f64, width: f64, height: f64, class: &str) {
        let rect = Rectangle::new()
            .set("x", x)
            .set("y", y)
            .set("width", width)
            .set("height", height)
            .set("class", class);
        self.add(rect);
    }

    fn draw_circle(&mut self, center: Point2D, radius: f64, class: &str) {
        let circle = Circle::new()
            .set("cx", center.x)
            .set("cy", center.y)
            .set("r", radius)
            .set("class", class);
        self.add(circle);
    }

    fn draw_text(&mut self, pos: Point2D, text: &str, class: &str) {
        let label = TextElement::new(text)
            .set("x", pos.x)
            .set("y", pos.y)
            .set("class", class);
        self.add(label);
    }

    fn add<T: Into<Box<dyn Node>>>(&mut self, node: T) {
        self.document.append(node);
    }

    fn save(self, path: &Path) -> SimResult<()> {
        svg::save(path, &self.document).map_err(|source| SimError::Export {
            path: path.to_path_buf(),
            source,
        })?;
        info!("SVG '{}' wurde erstellt.", path.display());
        Ok(())
    }
}

/// Schreibt das Zellfeld als SVG: Gebiet, Zellen mit ihren Randfragmenten,
/// optional die Dichte-Messkreise mit ihrem Dichtewert und Zellnummern.
pub fn export_cells_svg(cells: &CellArray, path: &Path, show_density: bool) -> SimResult<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(|source| SimError::Export {
            path: path.to_path_buf(),
            source,
        })?;
    }

    let domain = cells.domain();
    let max_radius = cells.radii().iter().copied().fold(0.0, f64::max);
    let mut svg = SvgBuilder::new(domain.width(), domain.height(), max_radius);
    svg.draw_rect(0.0, 0.0, domain.width(), domain.height(), "domain");

    for (&center, &radius) in cells.centers().iter().zip(cells.radii()) {
        for (i, fragment) in wrap_fragments(center, radius, domain).into_iter().enumerate() {
            svg.draw_circle(fragment, radius, if i == 0 { "cell" } else { "fragment" });
        }
    }

    if show_density {
        let density = cells.density();
        for (&point, &value) in density.points().iter().zip(density.values()) {
            svg.draw_circle(point, density.sampling_radius(), "density-area");
            svg.draw_text(point, &format!("{:.2}", value), "label");
        }
    } else {
        for (i, &center) in cells.centers().iter().enumerate() {
            svg.draw_text(center, &i.to_string(), "label");
        }
    }

    svg.save(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::point_distribution::SpacingConfig;
    use rand::{SeedableRng, rngs::StdRng};

    #[test]
    fn test_export_writes_every_cell() {
        let config = SpacingConfig::new()
            .with_cells(4)
            .with_dimensions(4.0, 4.0)
            .with_radius(0.3, 0.1)
            .with_neighbours(2)
            .with_grid_spacing(1.0);
        let mut rng = StdRng::seed_from_u64(21);
        let mut cells = CellArray::new(config, &mut rng).unwrap();
        cells.seed_positions(&mut rng);

        let path = std::env::temp_dir().join(format!("cell_spacing_sim_{}.svg", std::process::id()));
        export_cells_svg(&cells, &path, true).unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        assert!(content.matches("class=\"cell\"").count() == 4);
        assert_eq!(
            content.matches("class=\"density-area\"").count(),
            cells.density().len()
        );
        let _ = std::fs::remove_file(&path);
    }
}
