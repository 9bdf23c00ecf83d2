//! HWPUNIT conversions. 1440 units per inch, 20 per point.

pub const HWPUNIT_PER_INCH: f64 = 1440.0;
pub const HWPUNIT_PER_POINT: f64 = 20.0;
pub const HWPUNIT_PER_MM: f64 = HWPUNIT_PER_INCH / 25.4;

pub fn inch_to_hwpunit(inches: f64) -> i32 {
    (inches * HWPUNIT_PER_INCH).round() as i32
}

pub fn mm_to_hwpunit(mm: f64) -> i32 {
    (mm * HWPUNIT_PER_MM).round() as i32
}

pub fn pt_to_hwpunit(pt: f64) -> i32 {
    (pt * HWPUNIT_PER_POINT).round() as i32
}

pub fn hwpunit_to_mm(units: i32) -> f64 {
    units as f64 / HWPUNIT_PER_MM
}

pub fn hwpunit_to_pt(units: i32) -> f64 {
    units as f64 / HWPUNIT_PER_POINT
}
