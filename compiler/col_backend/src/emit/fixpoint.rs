//! One-byte fixed point with three fractional bits, the `FLOAT` argument.

const SCALE: f64 = 8.0;

/// Encode `value` if it is exactly representable.
#[allow(
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss,
    reason = "range and integrality are checked before the cast"
)]
pub fn encode(value: f64) -> Option<u8> {
    let scaled = value * SCALE;
    if scaled.fract() != 0.0 || !(0.0..=255.0).contains(&scaled) {
        return None;
    }
    Some(scaled as u8)
}

pub fn decode(byte: u8) -> f64 {
    f64::from(byte) / SCALE
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_representable() {
        assert_eq!(encode(0.5), Some(4));
        assert_eq!(encode(1.125), Some(9));
        assert_eq!(encode(31.875), Some(255));
        assert_eq!(decode(9), 1.125);
    }

    #[test]
    fn test_not_representable() {
        assert_eq!(encode(0.1), None);
        assert_eq!(encode(-0.5), None);
        assert_eq!(encode(32.0), None);
        assert_eq!(encode(f64::NAN), None);
    }
}
