//! Theme and instruction catalog.
//!
//! All narrative themes and instruction fragments are French texts shipped
//! with the crate. The catalog is an immutable table built once and injected
//! into the orchestrator; nothing in the core mutates it.

/// Rule constraining the whole adventure to French.
pub const LANGUAGE_RULE: &str = include_str!("prompts/langue.txt");

/// Rule keeping the narrator in character.
pub const IMMERSION_RULE: &str = include_str!("prompts/immersion.txt");

/// Rule for tracking the player's inventory.
pub const INVENTORY_RULE: &str = include_str!("prompts/inventaire.txt");

/// Rule fixing the A)/B)/C) choice presentation format.
pub const CHOICE_FORMAT_RULE: &str = include_str!("prompts/format_choix.txt");

/// Rule asking for expressive narration and plot twists.
pub const TONE_SURPRISE_RULE: &str = include_str!("prompts/ton_surprise.txt");

const AGE_CHILD_RULE: &str = include_str!("prompts/age_enfant.txt");
const AGE_ADULT_RULE: &str = include_str!("prompts/age_adulte.txt");

const ADDRESS_BOY_RULE: &str = include_str!("prompts/adresse_garcon.txt");
const ADDRESS_GIRL_RULE: &str = include_str!("prompts/adresse_fille.txt");

/// Name-usage rule with a `{player_name}` placeholder.
pub const PLAYER_NAME_TEMPLATE: &str = include_str!("prompts/nom_joueur.txt");

/// Turn-budget rule with a `{turn_count}` placeholder.
pub const TURN_BUDGET_TEMPLATE: &str = include_str!("prompts/duree.txt");

/// Age band for which the child-friendly fragment is selected.
pub const AGE_CHILD: &str = "Enfant";

/// Address-form for which the feminine-agreement fragment is selected.
pub const ADDRESS_GIRL: &str = "Fille";

/// Age fragment for an age band. Unrecognized bands fall back to the adult
/// fragment rather than failing.
pub fn age_rule(age_group: &str) -> &'static str {
    if age_group == AGE_CHILD {
        AGE_CHILD_RULE
    } else {
        AGE_ADULT_RULE
    }
}

/// Address-form fragment. Unrecognized forms fall back to the masculine
/// fragment rather than failing.
pub fn address_rule(gender: &str) -> &'static str {
    if gender == ADDRESS_GIRL {
        ADDRESS_GIRL_RULE
    } else {
        ADDRESS_BOY_RULE
    }
}

/// A narrative theme: display name (also its id), list icon, and the opening
/// prompt body handed to the model verbatim.
#[derive(Debug, Clone)]
pub struct Theme {
    pub name: String,
    pub icon: String,
    pub body: String,
}

impl Theme {
    pub fn new(name: impl Into<String>, icon: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            icon: icon.into(),
            body: body.into(),
        }
    }
}

/// Immutable lookup table of themes, keyed by display name.
#[derive(Debug, Clone)]
pub struct ThemeCatalog {
    themes: Vec<Theme>,
}

impl ThemeCatalog {
    /// Build a catalog from a list of themes.
    pub fn new(themes: Vec<Theme>) -> Self {
        Self { themes }
    }

    /// The catalog of built-in French themes.
    pub fn builtin() -> &'static ThemeCatalog {
        &BUILTIN
    }

    /// Look up a theme by name.
    pub fn get(&self, name: &str) -> Option<&Theme> {
        self.themes.iter().find(|t| t.name == name)
    }

    /// All themes, in catalog order.
    pub fn themes(&self) -> &[Theme] {
        &self.themes
    }
}

lazy_static::lazy_static! {
    static ref BUILTIN: ThemeCatalog = ThemeCatalog::new(vec![
        Theme::new("Fantasy Médiévale", "⚔️", include_str!("prompts/theme_fantasy.txt")),
        Theme::new("Enquête de disparition mystère", "❓", include_str!("prompts/theme_enquete.txt")),
        Theme::new("Exploration Spatiale", "🚀", include_str!("prompts/theme_espace.txt")),
        Theme::new("Pirates des Caraïbes", "🏴‍☠️", include_str!("prompts/theme_pirates.txt")),
        Theme::new("Western Spaghetti", "🤠", include_str!("prompts/theme_western.txt")),
        Theme::new("Histoire d'Amour", "❤️", include_str!("prompts/theme_amour.txt")),
        Theme::new("Piégé dans le Jeu", "🎮", include_str!("prompts/theme_jeu.txt")),
        Theme::new("Survie Post-Apocalyptique", "☣️", include_str!("prompts/theme_apocalypse.txt")),
    ]);
}
