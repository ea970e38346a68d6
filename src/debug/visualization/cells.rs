// src/debug/visualization/cells.rs
use crate::math::types::{Point2D, TorusDomain};
use crate::sim::resources::{CellSimulation, ControlPanel};
use bevy::prelude::*;

/// Kantenlänge der Darstellung in Pixeln (längere Seite des Gebiets).
const VIEW_SIZE_PX: f32 = 640.0;

/// Alle Mittelpunkte, an denen ein Kreis gezeichnet werden muss, damit er
/// über die Gebietsränder hinweg korrekt erscheint: der Kreis selbst plus eine
/// Kopie je überschrittener Kante, an Ecken zusätzlich die diagonale Kopie.
pub fn wrap_fragments(center: Point2D, radius: f64, domain: &TorusDomain) -> Vec<Point2D> {
    let shift = |value: f64, extent: f64| -> Option<f64> {
        if value - radius < 0.0 {
            Some(extent)
        } else if value + radius > extent {
            Some(-extent)
        } else {
            None
        }
    };
    let dx = shift(center.x, domain.width());
    let dy = shift(center.y, domain.height());

    let mut fragments = vec![center];
    if let Some(dx) = dx {
        fragments.push(Point2D::new(center.x + dx, center.y));
    }
    if let Some(dy) = dy {
        fragments.push(Point2D::new(center.x, center.y + dy));
    }
    if let (Some(dx), Some(dy)) = (dx, dy) {
        fragments.push(Point2D::new(center.x + dx, center.y + dy));
    }
    fragments
}

/// Abbildung Gebietskoordinaten -> Bildschirm (Ursprung in der Bildmitte).
fn to_screen(p: Point2D, domain: &TorusDomain) -> Vec2 {
    let scale = VIEW_SIZE_PX / domain.width().max(domain.height()) as f32;
    Vec2::new(
        (p.x - 0.5 * domain.width()) as f32 * scale,
        (p.y - 0.5 * domain.height()) as f32 * scale,
    )
}

fn to_screen_length(length: f64, domain: &TorusDomain) -> f32 {
    length as f32 * VIEW_SIZE_PX / domain.width().max(domain.height()) as f32
}

/// Zeichnet Gebietsrand, Zellen samt Randfragmenten und optional die Dichte-Messkreise.
pub fn draw_cells_system(
    mut gizmos: Gizmos,
    sim: Res<CellSimulation>,
    panel: Res<ControlPanel>,
) {
    let Some(cells) = sim.cells() else {
        return;
    };
    let domain = cells.domain();

    let size = Vec2::new(
        to_screen_length(domain.width(), domain),
        to_screen_length(domain.height(), domain),
    );
    gizmos.rect_2d(Vec2::ZERO, 0.0, size, Color::GRAY);

    if panel.show_density_areas {
        let density = cells.density();
        let r = to_screen_length(density.sampling_radius(), domain);
        for (&point, &value) in density.points().iter().zip(density.values()) {
            let color = Color::rgba(1.0, 0.6, 0.0, 0.15 + 0.85 * value as f32);
            gizmos.circle_2d(to_screen(point, domain), r, color);
        }
    }

    let cell_color = Color::rgb(0.3, 0.7, 1.0);
    let fragment_color = Color::rgba(0.3, 0.7, 1.0, 0.4);
    for (&center, &radius) in cells.centers().iter().zip(cells.radii()) {
        let r = to_screen_length(radius, domain);
        for (i, fragment) in wrap_fragments(center, radius, domain).into_iter().enumerate() {
            let color = if i == 0 { cell_color } else { fragment_color };
            gizmos.circle_2d(to_screen(fragment, domain), r, color);
        }
    }
}
