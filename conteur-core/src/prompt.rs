//! Opening prompt assembly.
//!
//! A new adventure starts with one instruction prompt built from the theme
//! body and the fixed instruction fragments, sent with an empty prior
//! transcript. Assembly is pure: validation failures are reported, nothing
//! external is touched.

use crate::catalog::{self, ThemeCatalog};
use crate::error::ChatError;

/// Smallest accepted target turn count.
pub const MIN_TURNS: i64 = 10;

/// Largest accepted target turn count.
pub const MAX_TURNS: i64 = 20;

/// A validated, assembled opening.
#[derive(Debug, Clone)]
pub struct Opening {
    /// The full instruction prompt to send as the sole first message.
    pub prompt: String,

    /// The player name, trimmed.
    pub player_name: String,

    /// The validated target turn count.
    pub target_turns: i64,
}

/// Assemble the opening prompt for a new adventure.
///
/// Hard failures: empty trimmed player name, unknown theme, target turn
/// count outside [MIN_TURNS, MAX_TURNS]. Unrecognized age bands and
/// address-forms fall back to default fragments instead of failing.
///
/// Fragment order is fixed: theme body, separator, choice format, tone and
/// surprise, language, immersion, inventory, age, address-form, name usage,
/// turn budget.
pub fn assemble_opening(
    catalog: &ThemeCatalog,
    theme_name: &str,
    age_group: &str,
    gender: &str,
    player_name: &str,
    turn_count: Option<i64>,
) -> Result<Opening, ChatError> {
    let player_name = player_name.trim();
    if player_name.is_empty() {
        return Err(ChatError::InvalidPlayerName);
    }

    let theme = catalog
        .get(theme_name)
        .ok_or_else(|| ChatError::InvalidTheme(theme_name.to_string()))?;

    let target_turns = turn_count
        .filter(|t| (MIN_TURNS..=MAX_TURNS).contains(t))
        .ok_or(ChatError::InvalidTurnCount)?;

    let name_rule = catalog::PLAYER_NAME_TEMPLATE
        .trim()
        .replace("{player_name}", player_name);
    let turn_rule = catalog::TURN_BUDGET_TEMPLATE
        .trim()
        .replace("{turn_count}", &target_turns.to_string());

    let fragments = [
        theme.body.trim(),
        "---",
        catalog::CHOICE_FORMAT_RULE.trim(),
        catalog::TONE_SURPRISE_RULE.trim(),
        catalog::LANGUAGE_RULE.trim(),
        catalog::IMMERSION_RULE.trim(),
        catalog::INVENTORY_RULE.trim(),
        catalog::age_rule(age_group).trim(),
        catalog::address_rule(gender).trim(),
        name_rule.as_str(),
        turn_rule.as_str(),
    ];

    Ok(Opening {
        prompt: fragments.join("\n\n"),
        player_name: player_name.to_string(),
        target_turns,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assemble(turn_count: Option<i64>) -> Result<Opening, ChatError> {
        assemble_opening(
            ThemeCatalog::builtin(),
            "Fantasy Médiévale",
            "Adulte",
            "Garçon",
            "Max",
            turn_count,
        )
    }

    #[test]
    fn test_fragments_in_fixed_order() {
        let opening = assemble(Some(12)).unwrap();
        let prompt = &opening.prompt;

        let markers = [
            "Maître du Donjon",             // theme body
            "\n\n---\n\n",                  // separator
            "Lorsque tu présentes des choix", // choice format
            "STYLE DE NARRATION",           // tone/surprise
            "rester en langue française",   // language
            "IMMERSION STRICTE",            // immersion
            "GESTION INVENTAIRE",           // inventory
            "Public Adulte",                // age
            "au masculin",                  // address-form
            "Le nom du joueur est Max",     // name usage
            "INFO DURÉE STRICTE",           // turn budget
        ];

        let mut last = 0;
        for marker in markers {
            let position = prompt[last..]
                .find(marker)
                .unwrap_or_else(|| panic!("marker '{marker}' missing or out of order"));
            last += position + marker.len();
        }
    }

    #[test]
    fn test_each_fragment_appears_once() {
        let opening = assemble(Some(12)).unwrap();
        for marker in ["IMMERSION STRICTE", "GESTION INVENTAIRE", "INFO DURÉE STRICTE"] {
            assert_eq!(
                opening.prompt.matches(marker).count(),
                1,
                "marker '{marker}' should appear exactly once"
            );
        }
    }

    #[test]
    fn test_templates_are_filled() {
        let opening = assemble(Some(12)).unwrap();
        assert!(opening.prompt.contains("Que décides-tu, Max ?"));
        assert!(opening.prompt.contains("**12ème échange**"));
        assert!(!opening.prompt.contains("{player_name}"));
        assert!(!opening.prompt.contains("{turn_count}"));
        assert_eq!(opening.target_turns, 12);
    }

    #[test]
    fn test_turn_count_bounds() {
        assert!(matches!(assemble(Some(5)), Err(ChatError::InvalidTurnCount)));
        assert!(matches!(assemble(Some(25)), Err(ChatError::InvalidTurnCount)));
        assert!(matches!(assemble(None), Err(ChatError::InvalidTurnCount)));
        assert!(assemble(Some(10)).is_ok());
        assert!(assemble(Some(20)).is_ok());
    }

    #[test]
    fn test_invalid_player_name() {
        let result = assemble_opening(
            ThemeCatalog::builtin(),
            "Fantasy Médiévale",
            "Adulte",
            "Garçon",
            "   ",
            Some(12),
        );
        assert!(matches!(result, Err(ChatError::InvalidPlayerName)));
    }

    #[test]
    fn test_unknown_theme() {
        let result = assemble_opening(
            ThemeCatalog::builtin(),
            "Cyberpunk",
            "Adulte",
            "Garçon",
            "Max",
            Some(12),
        );
        assert!(matches!(result, Err(ChatError::InvalidTheme(name)) if name == "Cyberpunk"));
    }

    #[test]
    fn test_lenient_age_and_address_fallback() {
        let opening = assemble_opening(
            ThemeCatalog::builtin(),
            "Western Spaghetti",
            "Centenaire",
            "Autre",
            "Léa",
            Some(15),
        )
        .unwrap();
        assert!(opening.prompt.contains("Public Adulte"));
        assert!(opening.prompt.contains("au masculin"));
    }

    #[test]
    fn test_player_name_is_trimmed() {
        let opening = assemble_opening(
            ThemeCatalog::builtin(),
            "Fantasy Médiévale",
            "Enfant",
            "Fille",
            "  Zoé  ",
            Some(10),
        )
        .unwrap();
        assert_eq!(opening.player_name, "Zoé");
        assert!(opening.prompt.contains("Le nom du joueur est Zoé"));
        assert!(opening.prompt.contains("Public Enfant"));
        assert!(opening.prompt.contains("au féminin"));
    }
}
