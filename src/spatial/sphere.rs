/// Radius of the obstructing body (Earth-like, in kilometres).
pub const EARTH_RADIUS: f64 = 6371.0;

/// Lift applied to points given at zero altitude so that a line of sight
/// starting on the surface never grazes the sphere at its own endpoint.
pub const ACCURACY: f64 = 0.001;

pub const ORIGIN: [f64; 3] = [0.0, 0.0, 0.0];

/// Converts geo-coordinates (degrees) to a right-handed Cartesian frame with
/// the sphere's centre as origin, X through (0, 0), Y pointing east and Z
/// pointing north.
///
/// The radius is `surface + altitude`, or `surface + accuracy` when the
/// altitude is zero.
pub fn to_cartesian(
    latitude: f64,
    longitude: f64,
    altitude: f64,
    surface: f64,
    accuracy: f64,
) -> [f64; 3] {
    let lift = if altitude == 0.0 { accuracy } else { altitude };
    let r = surface + lift;

    let theta = longitude.to_radians();
    let phi = (90.0 - latitude).to_radians();

    let (sin_theta, cos_theta) = theta.sin_cos();
    let (sin_phi, cos_phi) = phi.sin_cos();

    [
        r * sin_phi * cos_theta,
        r * sin_phi * sin_theta,
        r * cos_phi,
    ]
}

pub fn difference(u: [f64; 3], v: [f64; 3]) -> [f64; 3] {
    [u[0] - v[0], u[1] - v[1], u[2] - v[2]]
}

pub fn dot_product(u: [f64; 3], v: [f64; 3]) -> f64 {
    u[0] * v[0] + u[1] * v[1] + u[2] * v[2]
}

pub fn cross_product(u: [f64; 3], v: [f64; 3]) -> [f64; 3] {
    [
        u[1] * v[2] - u[2] * v[1],
        u[2] * v[0] - u[0] * v[2],
        u[0] * v[1] - u[1] * v[0],
    ]
}

pub fn length_squared(u: [f64; 3]) -> f64 {
    dot_product(u, u)
}

/// Tells whether the segment between `u` and `v` stays clear of the sphere of
/// `radius` centred at the origin (touching counts as blocked).
///
/// This is the point-line distance with the origin as the reference point,
/// evaluated without the final negation and division. The result is
/// unspecified when either endpoint lies at or inside the sphere.
pub fn visible(u: [f64; 3], v: [f64; 3], radius: f64) -> bool {
    let d = difference(v, u);
    let l2d = length_squared(d);
    let t = dot_product(d, u);
    t > 0.0 || t < -l2d || length_squared(cross_product(u, v)) > l2d * radius * radius
}

pub fn distance(u: [f64; 3], v: [f64; 3]) -> f64 {
    length_squared(difference(u, v)).sqrt()
}
