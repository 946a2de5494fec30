//! Visual encoding: pure, monotonic, bounded mappings from domain scalars
//! to display dimensions. Applied at render time only; the records
//! themselves never carry pixel values.

/// Node display size range in pixels.
pub const NODE_SIZE_MIN: f64 = 10.0;
pub const NODE_SIZE_MAX: f64 = 40.0;

/// Edge display width range in pixels.
pub const EDGE_WIDTH_MIN: f64 = 1.0;
pub const EDGE_WIDTH_MAX: f64 = 5.0;

/// `importance` in [0,1] to node diameter in pixels.
pub fn node_size(importance: f64) -> f64 {
    NODE_SIZE_MIN + unit(importance) * (NODE_SIZE_MAX - NODE_SIZE_MIN)
}

/// `weight` in [0,1] to edge stroke width in pixels.
pub fn edge_width(weight: f64) -> f64 {
    EDGE_WIDTH_MIN + unit(weight) * (EDGE_WIDTH_MAX - EDGE_WIDTH_MIN)
}

fn unit(value: f64) -> f64 {
    if value.is_finite() {
        value.clamp(0.0, 1.0)
    } else {
        0.0
    }
}
