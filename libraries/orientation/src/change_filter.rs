// Dispatch gate that keeps imperceptible orientation changes from reaching the listener
use crate::data::OrientationData;

/// Smallest per-axis change, in degrees, worth an event
pub const ORIENTATION_THRESHOLD: f64 = 0.1;

fn is_angle_different(candidate: Option<f64>, last: Option<f64>) -> bool {
    match (candidate, last) {
        (Some(a), Some(b)) => (a - b).abs() >= ORIENTATION_THRESHOLD,
        (None, None) => false,
        // Gaining or losing an axis is always significant
        _ => true,
    }
}

/// True if any axis moved by at least [`ORIENTATION_THRESHOLD`] or changed presence
pub fn is_significantly_different(candidate: &OrientationData, last: &OrientationData) -> bool {
    is_angle_different(candidate.alpha, last.alpha)
        || is_angle_different(candidate.beta, last.beta)
        || is_angle_different(candidate.gamma, last.gamma)
}

/// Decide whether `candidate` should be dispatched given the last dispatched sample.
///
/// Inactive samples never pass. A sample with no angles at all always passes:
/// it tells the page the device cannot report orientation.
pub fn should_fire_event(candidate: &OrientationData, last_dispatched: &OrientationData) -> bool {
    if !candidate.all_available_sensors_are_active {
        return false;
    }

    if !candidate.has_any_angle() {
        return true;
    }

    is_significantly_different(candidate, last_dispatched)
}
