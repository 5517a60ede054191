//! Turn pacing reminders.
//!
//! The pacer nudges the model toward concluding the adventure near the
//! session's target turn count. Reminders are prefixed to the outgoing
//! player utterance and never reach the persisted transcript; all tiers
//! share [`REMINDER_MARKER`] so the adapter can strip them deterministically.

/// Fixed prefix of every pacing reminder.
pub const REMINDER_MARKER: &str = "(Rappel narrateur :";

/// Turns remaining at or below which the wrap-up tier kicks in.
const WRAP_UP_WINDOW: i64 = 3;

/// The turn about to be played, given how many narrator replies exist.
pub fn current_turn(narrator_turns: usize) -> i64 {
    narrator_turns as i64 + 1
}

/// Select the pacing reminder for this exchange, if any.
///
/// `narrator_turns` is the number of narrator replies already in the
/// transcript; `target_turns` is the session's target, `None` or zero when
/// pacing is disabled.
pub fn pacing_reminder(narrator_turns: usize, target_turns: Option<i64>) -> Option<String> {
    let target = target_turns.filter(|t| *t > 0)?;
    let turn = current_turn(narrator_turns);

    if turn > target {
        Some(format!(
            "{REMINDER_MARKER} tour {turn} sur {target}. Le nombre de tours prévu est dépassé. \
             Conclus l'aventure MAINTENANT, de façon naturelle et satisfaisante.)"
        ))
    } else if target - turn <= WRAP_UP_WINDOW {
        Some(format!(
            "{REMINDER_MARKER} tour {turn} sur {target}. La fin approche. Resserre l'intrigue \
             pour amener une conclusion satisfaisante d'ici le tour {target}.)"
        ))
    } else {
        Some(format!("{REMINDER_MARKER} tour {turn} sur {target}.)"))
    }
}

/// Prefix a reminder to an outgoing utterance, blank-line separated so the
/// adapter can locate and remove it later.
pub fn annotate(message: &str, reminder: Option<&str>) -> String {
    match reminder {
        Some(reminder) => format!("{reminder}\n\n{message}"),
        None => message.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_target_no_reminder() {
        assert_eq!(pacing_reminder(4, None), None);
        assert_eq!(pacing_reminder(4, Some(0)), None);
    }

    #[test]
    fn test_plain_tier() {
        let reminder = pacing_reminder(0, Some(10)).unwrap();
        assert!(reminder.starts_with(REMINDER_MARKER));
        assert!(reminder.contains("tour 1 sur 10"));
        assert!(!reminder.contains("fin approche"));
        assert!(!reminder.contains("MAINTENANT"));
    }

    #[test]
    fn test_wrap_up_tier() {
        // Turn 8 of 10: two turns left, inside the wrap-up window.
        let reminder = pacing_reminder(7, Some(10)).unwrap();
        assert!(reminder.contains("tour 8 sur 10"));
        assert!(reminder.contains("fin approche"));
    }

    #[test]
    fn test_wrap_up_tier_on_final_turn() {
        let reminder = pacing_reminder(9, Some(10)).unwrap();
        assert!(reminder.contains("tour 10 sur 10"));
        assert!(reminder.contains("fin approche"));
    }

    #[test]
    fn test_urgent_tier() {
        // Turn 11 of 10: past the target.
        let reminder = pacing_reminder(10, Some(10)).unwrap();
        assert!(reminder.contains("tour 11 sur 10"));
        assert!(reminder.contains("MAINTENANT"));
    }

    #[test]
    fn test_annotate_round_trip_shape() {
        let reminder = pacing_reminder(0, Some(12));
        let annotated = annotate("j'ouvre la porte", reminder.as_deref());
        let (prefix, rest) = annotated.split_once("\n\n").unwrap();
        assert!(prefix.starts_with(REMINDER_MARKER));
        assert_eq!(rest, "j'ouvre la porte");
    }

    #[test]
    fn test_annotate_without_reminder() {
        assert_eq!(annotate("j'ouvre la porte", None), "j'ouvre la porte");
    }
}
