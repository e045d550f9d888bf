// src/sensor/analog.rs

//! Conversions for the node's analog inputs: the MCU's internal temperature
//! sensor and a resistive soil humidity probe, both sampled by a 12-bit ADC
//! against a 3.0 V reference. Channel setup and sampling stay with the HAL.

/// Largest value of a 12-bit conversion.
pub const ADC_FULL_SCALE: u16 = (1 << 12) - 1;
/// ADC reference voltage in millivolts.
pub const ADC_REFERENCE_MV: f32 = 3000.0;

/// Internal sensor output at 25 C, in millivolts.
pub const TEMP_SENSOR_V25_MV: f32 = 760.0;
/// Internal sensor slope, in millivolts per degree.
pub const TEMP_SENSOR_SLOPE_MV_PER_C: f32 = 2.5;

/// Dry fraction below which the probe reads 0 %.
pub const SOIL_DRY_OFFSET: f32 = 0.25;
/// Percent per unit of wet fraction above the offset.
pub const SOIL_SCALE: f32 = 400.0;

/// Converts a raw conversion into millivolts.
#[inline]
pub fn raw_to_millivolts(raw: u16) -> f32 {
    f32::from(raw) * ADC_REFERENCE_MV / f32::from(ADC_FULL_SCALE)
}

/// Board temperature in degrees Celsius from the internal sensor channel.
pub fn board_temperature_celsius(raw: u16) -> f32 {
    (raw_to_millivolts(raw) - TEMP_SENSOR_V25_MV) / TEMP_SENSOR_SLOPE_MV_PER_C + 25.0
}

/// Soil humidity in percent, clamped to `0..=100` and truncated.
///
/// The probe's output falls as moisture rises, so a full-scale reading is
/// bone dry.
pub fn soil_humidity_percent(raw: u16) -> u8 {
    let wet = 1.0 - f32::from(raw.min(ADC_FULL_SCALE)) / f32::from(ADC_FULL_SCALE);
    let percent = (wet - SOIL_DRY_OFFSET) * SOIL_SCALE;
    if percent < 0.0 {
        0
    } else if percent < 100.0 {
        percent as u8
    } else {
        100
    }
}
