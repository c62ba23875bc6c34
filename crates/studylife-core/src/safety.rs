//! Emergency detection.

/// Whether a chat message should trigger SOS mode.
///
/// Case-insensitive substring match on "emergency" or "sos". Over-triggering
/// is accepted: "lasso" activates SOS, "helpsos" must too.
pub fn is_emergency(text: &str) -> bool {
    let lowered = text.to_lowercase();
    lowered.contains("emergency") || lowered.contains("sos")
}
