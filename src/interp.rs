use nalgebra::RealField;

// Return the interpolation factor t that places v between v0 and v1
pub fn find_t<T: RealField + Copy>(v0: T, v1: T, v: T) -> T {
    (v - v0) / (v1 - v0)
}

// Linear interpolation
pub fn lerp<T: RealField + Copy>(a: T, b: T, t: T) -> T {
    a + (b - a) * t
}

// Component-wise linear interpolation between two arrays by factor t
pub fn lerp_array<T: RealField + Copy, const N: usize>(p0: [T; N], p1: [T; N], t: T) -> [T; N] {
    std::array::from_fn(|k| lerp(p0[k], p1[k], t))
}
