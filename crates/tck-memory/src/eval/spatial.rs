use tck_core::{predicate::GeoShape, value::GeoPoint};

/// Mean earth radius in meters.
const EARTH_RADIUS_METERS: f64 = 6_371_008.8;

/// Great-circle distance between two points.
#[must_use]
pub fn distance_meters(a: GeoPoint, b: GeoPoint) -> f64 {
    let (lat_a, lat_b) = (a.latitude.to_radians(), b.latitude.to_radians());
    let d_lat = lat_b - lat_a;
    let d_lon = (b.longitude - a.longitude).to_radians();

    let h = (d_lat / 2.0).sin().powi(2) + lat_a.cos() * lat_b.cos() * (d_lon / 2.0).sin().powi(2);

    2.0 * EARTH_RADIUS_METERS * h.sqrt().min(1.0).asin()
}

#[must_use]
pub fn within(shape: &GeoShape, point: GeoPoint) -> bool {
    match shape {
        GeoShape::Circle {
            center,
            radius_meters,
        } => distance_meters(*center, point) <= *radius_meters,
        GeoShape::BoundingBox {
            top_left,
            bottom_right,
        } => {
            let latitude = (bottom_right.latitude..=top_left.latitude).contains(&point.latitude);
            // A box whose left edge lies east of its right edge crosses the antimeridian.
            let longitude = if top_left.longitude <= bottom_right.longitude {
                (top_left.longitude..=bottom_right.longitude).contains(&point.longitude)
            } else {
                point.longitude >= top_left.longitude || point.longitude <= bottom_right.longitude
            };

            latitude && longitude
        }
        GeoShape::Polygon(vertices) => in_polygon(vertices, point),
    }
}

// Even-odd ray casting in the (longitude, latitude) plane.
fn in_polygon(vertices: &[GeoPoint], point: GeoPoint) -> bool {
    let (x, y) = (point.longitude, point.latitude);
    let mut inside = false;
    let mut previous = vertices.len().wrapping_sub(1);

    for (current, a) in vertices.iter().enumerate() {
        let b = vertices[previous];
        if (a.latitude > y) != (b.latitude > y)
            && x < (b.longitude - a.longitude) * (y - a.latitude) / (b.latitude - a.latitude)
                + a.longitude
        {
            inside = !inside;
        }
        previous = current;
    }

    inside
}

///
/// TESTS
///

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn one_degree_of_latitude_is_about_111_km() {
        let d = distance_meters(GeoPoint::new(40.0, -71.0), GeoPoint::new(41.0, -71.0));

        assert!((d - 111_195.0).abs() < 100.0, "{d}");
    }

    #[test]
    fn circle_includes_its_center_only_within_radius() {
        let shape = GeoShape::Circle {
            center: GeoPoint::new(40.0, -71.0),
            radius_meters: 10_000.0,
        };

        assert!(within(&shape, GeoPoint::new(40.0, -71.0)));
        assert!(within(&shape, GeoPoint::new(40.05, -71.05)));
        assert!(!within(&shape, GeoPoint::new(41.0, -72.0)));
    }

    #[test]
    fn bounding_box_edges_and_antimeridian() {
        let shape = GeoShape::BoundingBox {
            top_left: GeoPoint::new(40.5, -71.5),
            bottom_right: GeoPoint::new(39.5, -70.5),
        };
        assert!(within(&shape, GeoPoint::new(40.0, -71.0)));
        assert!(within(&shape, GeoPoint::new(40.5, -70.5)));
        assert!(!within(&shape, GeoPoint::new(41.0, -71.0)));

        let wrapping = GeoShape::BoundingBox {
            top_left: GeoPoint::new(10.0, 170.0),
            bottom_right: GeoPoint::new(-10.0, -170.0),
        };
        assert!(within(&wrapping, GeoPoint::new(0.0, 179.0)));
        assert!(within(&wrapping, GeoPoint::new(0.0, -175.0)));
        assert!(!within(&wrapping, GeoPoint::new(0.0, 0.0)));
    }

    #[test]
    fn polygon_contains_interior_points() {
        let square = GeoShape::Polygon(vec![
            GeoPoint::new(0.0, 0.0),
            GeoPoint::new(0.0, 10.0),
            GeoPoint::new(10.0, 10.0),
            GeoPoint::new(10.0, 0.0),
        ]);

        assert!(within(&square, GeoPoint::new(5.0, 5.0)));
        assert!(!within(&square, GeoPoint::new(15.0, 5.0)));
    }
}
