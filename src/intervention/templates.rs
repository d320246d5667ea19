//! Facilitator message copy. Warm, neutral, non-judgmental.

pub(crate) const PARTNER_FALLBACK: &str = "your partner";
pub(crate) const GOAL_FALLBACK: &str = "your goal";

pub(crate) const SILENCE_VISUAL: &str = "Taking a moment...";
pub(crate) const GOAL_DRIFT_VISUAL: &str = "Shall we return to the topic?";
pub(crate) const ESCALATION_PAUSE: &str =
    "I sense some tension rising. Would a 2-minute break help?";
pub(crate) const ICEBREAKER_GOAL: &str = "To start us off: What would a successful outcome from this conversation look like for each of you?";
pub(crate) const TIME_2_MIN: &str = "About 2 minutes remaining.";
pub(crate) const TIME_1_MIN: &str = "One minute left to wrap up.";

pub(crate) fn balance_visual(name: &str) -> String {
    format!("{name} hasn't shared their perspective yet")
}

pub(crate) fn balance_voice(name: &str) -> String {
    format!(
        "I notice the conversation has been a bit one-sided. {name}, would you like to share your thoughts?"
    )
}

pub(crate) fn time_five_minutes(goal: &str) -> String {
    let topic = if goal.trim().is_empty() {
        GOAL_FALLBACK
    } else {
        goal
    };
    format!(
        "You have about 5 minutes left. You mentioned wanting to discuss {topic} - would you like to touch on that?"
    )
}

/// Warning copy for a remaining-time threshold expressed in minutes.
pub(crate) fn time_warning(minutes: u64, goal: &str) -> String {
    match minutes {
        5 => time_five_minutes(goal),
        2 => TIME_2_MIN.to_string(),
        1 => TIME_1_MIN.to_string(),
        other => format!("About {other} minutes remaining."),
    }
}
