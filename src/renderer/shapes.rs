//! Shape primitives for the 2D draw list

use glam::Vec2;
use std::f32::consts::PI;

/// Linear RGBA, components in 0.0 - 1.0
pub type Color = [f32; 4];

pub const WHITE: Color = [1.0, 1.0, 1.0, 1.0];

/// Unpack a 0xRRGGBB color
pub fn rgb(hex: u32) -> Color {
    rgba(hex, 1.0)
}

pub fn rgba(hex: u32, alpha: f32) -> Color {
    [
        ((hex >> 16) & 0xff) as f32 / 255.0,
        ((hex >> 8) & 0xff) as f32 / 255.0,
        (hex & 0xff) as f32 / 255.0,
        alpha.clamp(0.0, 1.0),
    ]
}

/// Same color, alpha scaled
pub fn fade(color: Color, alpha: f32) -> Color {
    [color[0], color[1], color[2], (color[3] * alpha).clamp(0.0, 1.0)]
}

/// CSS `rgba()` string for canvas fill/stroke styles
pub fn css(color: Color) -> String {
    format!(
        "rgba({}, {}, {}, {:.3})",
        (color[0] * 255.0).round() as u8,
        (color[1] * 255.0).round() as u8,
        (color[2] * 255.0).round() as u8,
        color[3]
    )
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextAlign {
    Left,
    Center,
}

/// One draw command
#[derive(Debug, Clone, PartialEq)]
pub enum Shape {
    Rect {
        min: Vec2,
        size: Vec2,
        color: Color,
    },
    Circle {
        center: Vec2,
        radius: f32,
        color: Color,
    },
    /// Stroked circle outline
    Ring {
        center: Vec2,
        radius: f32,
        width: f32,
        color: Color,
    },
    /// Closed filled polygon with an optional outline
    Polygon {
        points: Vec<Vec2>,
        fill: Color,
        stroke: Option<Color>,
    },
    /// Open stroked path
    Polyline {
        points: Vec<Vec2>,
        width: f32,
        color: Color,
    },
    Text {
        pos: Vec2,
        text: String,
        size: f32,
        align: TextAlign,
        color: Color,
    },
}

pub fn rect(min: Vec2, size: Vec2, color: Color) -> Shape {
    Shape::Rect { min, size, color }
}

pub fn circle(center: Vec2, radius: f32, color: Color) -> Shape {
    Shape::Circle {
        center,
        radius,
        color,
    }
}

pub fn ring(center: Vec2, radius: f32, width: f32, color: Color) -> Shape {
    Shape::Ring {
        center,
        radius,
        width,
        color,
    }
}

pub fn text(pos: Vec2, text: impl Into<String>, size: f32, align: TextAlign, color: Color) -> Shape {
    Shape::Text {
        pos,
        text: text.into(),
        size,
        align,
        color,
    }
}

/// Regular polygon with the first vertex at `rotation` radians
pub fn regular_polygon(center: Vec2, radius: f32, sides: u32, rotation: f32, fill: Color) -> Shape {
    let sides = sides.max(3);
    let points = (0..sides)
        .map(|i| {
            let theta = rotation + (i as f32 / sides as f32) * 2.0 * PI;
            center + Vec2::new(theta.cos(), theta.sin()) * radius
        })
        .collect();
    Shape::Polygon {
        points,
        fill,
        stroke: Some(WHITE),
    }
}

/// Arrowhead hull; `facing` is +1 for nose up, -1 for nose down
pub fn ship(center: Vec2, radius: f32, facing: f32, fill: Color) -> Shape {
    let f = facing.signum();
    let points = vec![
        center + Vec2::new(0.0, -radius * f),
        center + Vec2::new(-radius * 0.8, radius * 0.8 * f),
        center + Vec2::new(0.0, radius * 0.3 * f),
        center + Vec2::new(radius * 0.8, radius * 0.8 * f),
    ];
    Shape::Polygon {
        points,
        fill,
        stroke: Some(WHITE),
    }
}

/// Background and foreground of a health bar centered over an entity.
/// Empty when the fraction is full.
pub fn health_bar(center_x: f32, top_y: f32, width: f32, fraction: f32) -> Vec<Shape> {
    if fraction >= 1.0 {
        return Vec::new();
    }
    let height = 4.0;
    let min = Vec2::new(center_x - width / 2.0, top_y);
    vec![
        rect(min, Vec2::new(width, height), rgb(0xff0000)),
        rect(
            min,
            Vec2::new(width * fraction.clamp(0.0, 1.0), height),
            rgb(0x00ff00),
        ),
    ]
}

/// Faded path through a bullet's recent positions
pub fn trail(points: impl IntoIterator<Item = Vec2>, color: Color) -> Option<Shape> {
    let points: Vec<Vec2> = points.into_iter().collect();
    if points.len() < 2 {
        return None;
    }
    Some(Shape::Polyline {
        points,
        width: 2.0,
        color: fade(color, 0.3),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rgb_unpacks_channels() {
        assert_eq!(rgb(0xff0000), [1.0, 0.0, 0.0, 1.0]);
        assert_eq!(rgba(0x00ff00, 2.0)[3], 1.0);
        assert_eq!(css(rgb(0x00ffff)), "rgba(0, 255, 255, 1.000)");
    }

    #[test]
    fn test_health_bar_hidden_when_full() {
        assert!(health_bar(0.0, 0.0, 40.0, 1.0).is_empty());
        let bar = health_bar(100.0, 50.0, 40.0, 0.25);
        assert_eq!(bar.len(), 2);
        match &bar[1] {
            Shape::Rect { min, size, .. } => {
                assert_eq!(*min, Vec2::new(80.0, 50.0));
                assert_eq!(size.x, 10.0);
            }
            other => panic!("unexpected shape {other:?}"),
        }
    }

    #[test]
    fn test_regular_polygon_vertices_on_radius() {
        let Shape::Polygon { points, .. } = regular_polygon(Vec2::ZERO, 10.0, 6, 0.0, WHITE) else {
            panic!("expected polygon");
        };
        assert_eq!(points.len(), 6);
        assert!(points.iter().all(|p| (p.length() - 10.0).abs() < 1e-4));
    }

    #[test]
    fn test_trail_needs_two_points() {
        assert!(trail([Vec2::ZERO], WHITE).is_none());
        assert!(trail([Vec2::ZERO, Vec2::ONE], WHITE).is_some());
    }
}
