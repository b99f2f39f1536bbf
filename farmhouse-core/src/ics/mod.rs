//! iCalendar codec between local records and wire text.

mod generate;
mod parse;

pub use generate::encode_record;
pub use parse::parse_object;

use chrono_tz::Tz;

/// Settings the codec needs on both directions.
#[derive(Debug, Clone)]
pub struct CodecConfig {
    /// Namespace for deterministic identifiers (`origin-task-<id>@<ns>`).
    pub namespace: String,
    /// Local time zone for wall-clock start/due moments.
    pub timezone: Tz,
    /// Size of the local priority scale (1 = high .. levels = low).
    pub priority_levels: u8,
}

impl Default for CodecConfig {
    fn default() -> Self {
        CodecConfig {
            namespace: "farmhouse".to_string(),
            timezone: chrono_tz::UTC,
            priority_levels: 5,
        }
    }
}

/// Map a local priority onto the protocol's 1-9 scale, clamped.
pub(crate) fn priority_to_wire(local: u8, levels: u8) -> u8 {
    if levels <= 1 {
        return 5;
    }
    let local = local.clamp(1, levels) as u32;
    let span = (levels - 1) as u32;
    // Linear with rounding to nearest so the mapping inverts exactly.
    let wire = 1 + (2 * (local - 1) * 8 + span) / (2 * span);
    wire.clamp(1, 9) as u8
}

/// Inverse of [`priority_to_wire`].
pub(crate) fn priority_from_wire(wire: u8, levels: u8) -> u8 {
    if levels <= 1 {
        return 1;
    }
    let wire = wire.clamp(1, 9) as u32;
    let span = (levels - 1) as u32;
    let local = 1 + (2 * (wire - 1) * span + 8) / 16;
    local.clamp(1, levels as u32) as u8
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_priority_mapping_is_linear_on_default_scale() {
        assert_eq!(priority_to_wire(1, 5), 1);
        assert_eq!(priority_to_wire(2, 5), 3);
        assert_eq!(priority_to_wire(3, 5), 5);
        assert_eq!(priority_to_wire(4, 5), 7);
        assert_eq!(priority_to_wire(5, 5), 9);
    }

    #[test]
    fn test_priority_mapping_clamps_out_of_range_values() {
        assert_eq!(priority_to_wire(0, 5), 1);
        assert_eq!(priority_to_wire(12, 5), 9);
        assert_eq!(priority_from_wire(0, 5), 1);
        assert_eq!(priority_from_wire(14, 5), 5);
    }

    #[test]
    fn test_priority_roundtrips_for_every_scale_size() {
        for levels in 2..=9u8 {
            for local in 1..=levels {
                let wire = priority_to_wire(local, levels);
                assert!((1..=9).contains(&wire));
                assert_eq!(
                    priority_from_wire(wire, levels),
                    local,
                    "levels={levels} local={local} wire={wire}"
                );
            }
        }
    }
}
