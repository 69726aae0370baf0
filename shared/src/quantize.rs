// Heights travel as a signed byte on the wire and in `Position`, but all column math
// (object z + height, body tops, step reach) is done in `i32` so intermediate values
// never wrap. These helpers are the only place the two representations meet.

use crate::collision::settings::{MAX_Z, MIN_Z};

/// Clamp a working height back into the stored `i8` range.
pub fn quantize_z(z: i32) -> i8 {
    z.clamp(MIN_Z, MAX_Z) as i8
}

/// Widen a stored height for column math.
#[inline]
pub fn dequantize_z(z: i8) -> i32 {
    z as i32
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn in_range_heights_are_unchanged() {
        for z in [-128, -1, 0, 1, 20, 127] {
            assert_eq!(dequantize_z(quantize_z(z)), z);
        }
    }

    #[test]
    fn out_of_range_heights_clamp() {
        assert_eq!(quantize_z(400), i8::MAX);
        assert_eq!(quantize_z(-400), i8::MIN);
    }
}
