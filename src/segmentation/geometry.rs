use imageproc::geometry::convex_hull;
use imageproc::point::Point;

use crate::models::RotatedRect;

const ANGLE_EPS: f64 = 1e-6;

/// Minimum-area enclosing rectangle of a point set (rotating calipers over
/// the convex hull).
///
/// The angle is normalised to `[0, 90)` degrees so axis-aligned shapes come
/// out with an exact zero rotation. Returns `None` for an empty set.
pub fn min_area_rect(points: &[Point<i32>]) -> Option<RotatedRect> {
    let hull = if points.len() < 3 {
        points.to_vec()
    } else {
        convex_hull(points)
    };
    match hull.len() {
        0 => None,
        1 => Some(RotatedRect {
            center: (hull[0].x as f32, hull[0].y as f32),
            size: (0.0, 0.0),
            angle: 0.0,
        }),
        _ => Some(calipers(&hull)),
    }
}

fn calipers(hull: &[Point<i32>]) -> RotatedRect {
    let n = hull.len();
    let mut best: Option<(f64, RotatedRect)> = None;

    for i in 0..n {
        let p = hull[i];
        let q = hull[(i + 1) % n];
        let (dx, dy) = ((q.x - p.x) as f64, (q.y - p.y) as f64);
        let len = dx.hypot(dy);
        if len == 0.0 {
            continue;
        }

        let u = (dx / len, dy / len);
        let v = (-u.1, u.0);

        let (mut min_u, mut max_u) = (f64::INFINITY, f64::NEG_INFINITY);
        let (mut min_v, mut max_v) = (f64::INFINITY, f64::NEG_INFINITY);
        for h in hull {
            let (x, y) = (h.x as f64, h.y as f64);
            let pu = x * u.0 + y * u.1;
            let pv = x * v.0 + y * v.1;
            min_u = min_u.min(pu);
            max_u = max_u.max(pu);
            min_v = min_v.min(pv);
            max_v = max_v.max(pv);
        }

        let (w, h) = (max_u - min_u, max_v - min_v);
        let area = w * h;
        if best.as_ref().is_some_and(|(best_area, _)| area >= *best_area) {
            continue;
        }

        let (mid_u, mid_v) = ((min_u + max_u) * 0.5, (min_v + max_v) * 0.5);
        let center = (mid_u * u.0 + mid_v * v.0, mid_u * u.1 + mid_v * v.1);
        best = Some((area, oriented(center, (w, h), u.1.atan2(u.0).to_degrees())));
    }

    best.map(|(_, rect)| rect).unwrap_or(RotatedRect {
        center: (hull[0].x as f32, hull[0].y as f32),
        size: (0.0, 0.0),
        angle: 0.0,
    })
}

fn oriented(center: (f64, f64), size: (f64, f64), angle: f64) -> RotatedRect {
    // A quarter turn describes the same rectangle with its sides swapped.
    let quarter_turns = (angle / 90.0).round();
    let (angle, size) = if (angle - quarter_turns * 90.0).abs() < ANGLE_EPS {
        let odd = (quarter_turns as i64).rem_euclid(2) == 1;
        (0.0, if odd { (size.1, size.0) } else { size })
    } else {
        let reduced = angle.rem_euclid(180.0);
        if reduced >= 90.0 {
            (reduced - 90.0, (size.1, size.0))
        } else {
            (reduced, size)
        }
    };

    RotatedRect {
        center: (center.0 as f32, center.1 as f32),
        size: (size.0 as f32, size.1 as f32),
        angle: angle as f32,
    }
}
