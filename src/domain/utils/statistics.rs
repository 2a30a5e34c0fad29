/// Target of the structured allocation events, separate from the regular engine log.
pub const ANALYTICS_TARGET: &str = "node_composer::analytics";

/// Number of bytes in one GiB, the unit capacities are requested in.
pub const BYTES_PER_GIB: u64 = 1024 * 1024 * 1024;

pub fn bytes_to_gib(bytes: u64) -> f64 {
    bytes as f64 / BYTES_PER_GIB as f64
}

pub fn gib_to_bytes(gib: f64) -> u64 {
    (gib * BYTES_PER_GIB as f64).ceil() as u64
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn converts_whole_gibibytes() {
        assert_eq!(bytes_to_gib(100 * BYTES_PER_GIB), 100.0);
        assert_eq!(gib_to_bytes(2.0), 2 * BYTES_PER_GIB);
    }

    #[test]
    fn rounds_partial_gibibytes_up_when_converting_to_bytes() {
        assert_eq!(gib_to_bytes(0.5), BYTES_PER_GIB / 2);
        assert!(gib_to_bytes(1.000_000_000_1) > BYTES_PER_GIB);
    }
}
