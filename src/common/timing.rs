// src/common/timing.rs

use core::time::Duration;

// Values follow the DHT11 datasheet family. Nominal pulse widths are listed
// for reference; the driver only enforces the budgets and the bit threshold.

// === Host Start Signal ===

/// Minimum time the host holds the line low to wake the sensor.
pub const START_SIGNAL_LOW: Duration = Duration::from_millis(18);
/// Time the host drives the line high before releasing it (20-40 us window).
pub const START_SIGNAL_RELEASE: Duration = Duration::from_micros(30);

// === Sensor Response ===

/// Nominal length of the sensor's response low pulse.
pub const RESPONSE_LOW_NOMINAL: Duration = Duration::from_micros(80);
/// Nominal length of the sensor's response high pulse.
pub const RESPONSE_HIGH_NOMINAL: Duration = Duration::from_micros(80);
/// Budget for each phase of the response handshake.
pub const RESPONSE_PHASE_TIMEOUT: Duration = Duration::from_micros(100);

// === Data Bits ===

/// Nominal low marker preceding every data bit.
pub const BIT_START_LOW_NOMINAL: Duration = Duration::from_micros(50);
/// Budget for the low marker and for the high phase of a single bit.
pub const BIT_PHASE_TIMEOUT: Duration = Duration::from_micros(100);
/// High phases at least this long decode to 1, shorter ones to 0.
pub const BIT_ONE_THRESHOLD: Duration = Duration::from_micros(28);

/// Number of data bits in one transaction (five bytes).
pub const FRAME_BITS: usize = 40;

/// Converts `duration` into ticks of a counter running at `tick_hz`.
///
/// Rounds down and saturates at `u32::MAX`.
pub fn duration_to_ticks(duration: Duration, tick_hz: u32) -> u32 {
    let ticks = duration.as_nanos() * u128::from(tick_hz) / 1_000_000_000;
    u32::try_from(ticks).unwrap_or(u32::MAX)
}

// --- Unit Tests ---
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_microsecond_counter_maps_one_to_one() {
        assert_eq!(duration_to_ticks(BIT_ONE_THRESHOLD, 1_000_000), 28);
        assert_eq!(duration_to_ticks(START_SIGNAL_LOW, 1_000_000), 18_000);
    }

    #[test]
    fn test_faster_counter_scales_budgets() {
        // 48 MHz peripheral clock without a prescaler
        assert_eq!(duration_to_ticks(RESPONSE_PHASE_TIMEOUT, 48_000_000), 4_800);
        assert_eq!(duration_to_ticks(Duration::from_nanos(500), 1_000_000), 0);
    }

    #[test]
    fn test_overflow_saturates() {
        assert_eq!(duration_to_ticks(Duration::from_secs(10_000), u32::MAX), u32::MAX);
    }
}
