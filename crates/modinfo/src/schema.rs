use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use thiserror::Error;

pub const RECOMMENDED_MAX_ID_LENGTH: usize = 64;

#[derive(Debug, Error)]
pub enum ModInfoError {
    #[error("criteria {0} has no conditions")]
    EmptyCriteria(String),
    #[error("duplicate criteria id: {0}")]
    DuplicateCriteria(String),
    #[error("action group {group} references unknown criteria {criteria}")]
    UnknownCriteria { group: String, criteria: String },
    #[error("action group {0} still carries an unstaged sql statement")]
    UnstagedSql(String),
}

/// Root of a `.modinfo` document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModInfo {
    pub id: String,
    pub version: String,
    #[serde(default)]
    pub properties: Properties,
    #[serde(default)]
    pub dependencies: Vec<ChildMod>,
    #[serde(default)]
    pub references: Vec<ChildMod>,
    #[serde(default)]
    pub action_criteria: Vec<Criteria>,
    #[serde(default)]
    pub action_groups: Vec<ActionGroup>,
}

impl ModInfo {
    pub fn new(id: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            version: version.into(),
            properties: Properties::default(),
            dependencies: Vec::new(),
            references: Vec::new(),
            action_criteria: Vec::new(),
            action_groups: Vec::new(),
        }
    }

    /// Advisory checks from the modding guide. Violations are worth a
    /// warning, never an error.
    pub fn id_recommendations(&self) -> Vec<String> {
        let mut warnings = Vec::new();
        if self.id.len() >= RECOMMENDED_MAX_ID_LENGTH {
            warnings.push(format!(
                "mod id should be less than {RECOMMENDED_MAX_ID_LENGTH} characters"
            ));
        }
        if !self.id.is_ascii() {
            warnings.push("mod id should be composed solely of ASCII characters".to_string());
        }
        if self.id.chars().any(|ch| ch.is_ascii_uppercase())
            || self.id.contains('_')
            || self.id.contains(char::is_whitespace)
        {
            warnings.push(
                "mod id should use lowercase characters and dashes instead of underscores or spaces"
                    .to_string(),
            );
        }
        warnings
    }

    /// Structural checks the game would otherwise surface at load time.
    pub fn validate(&self) -> Result<(), ModInfoError> {
        let mut criteria_ids = HashSet::new();
        for criteria in &self.action_criteria {
            if criteria.conditions.is_empty() {
                return Err(ModInfoError::EmptyCriteria(criteria.id.clone()));
            }
            if !criteria_ids.insert(criteria.id.as_str()) {
                return Err(ModInfoError::DuplicateCriteria(criteria.id.clone()));
            }
        }
        for group in &self.action_groups {
            if !criteria_ids.contains(group.criteria.as_str()) {
                return Err(ModInfoError::UnknownCriteria {
                    group: group.id.clone(),
                    criteria: group.criteria.clone(),
                });
            }
        }
        Ok(())
    }
}

/// Optional mod metadata shown on the Add-Ons screen. All fields are
/// technically optional; at minimum name, description and authors are worth
/// setting.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Properties {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub authors: Option<String>,
    /// `false` for mods touching the gameplay database; `true` is usually for
    /// UI or localization only mods.
    #[serde(default)]
    pub affects_saved_games: Option<bool>,
    #[serde(default)]
    pub package: Option<String>,
    #[serde(default)]
    pub package_sort_index: Option<i64>,
    #[serde(default)]
    pub show_in_browser: Option<bool>,
    #[serde(default)]
    pub enabled_by_default: Option<bool>,
}

impl Properties {
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.description.is_none()
            && self.authors.is_none()
            && self.affects_saved_games.is_none()
            && self.package.is_none()
            && self.package_sort_index.is_none()
            && self.show_in_browser.is_none()
            && self.enabled_by_default.is_none()
    }

    /// Warnings for the minimum metadata the Add-Ons screen expects.
    pub fn recommendations(&self) -> Vec<String> {
        let mut warnings = Vec::new();
        if self.name.is_none() {
            warnings.push("modinfo properties should include a name".to_string());
        }
        if self.description.is_none() {
            warnings.push("modinfo properties should include a description".to_string());
        }
        if self.authors.is_none() {
            warnings.push("modinfo properties should include an author(s)".to_string());
        }
        warnings
    }
}

/// Entry of a `Dependencies` or `References` element.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChildMod {
    /// Matches the mod id in the other mod's `.modinfo` root.
    pub id: String,
    /// Matches the `Name` property of the other mod.
    pub title: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameMode {
    WorldBuilder,
    SinglePlayer,
    HotSeat,
    MultiPlayer,
}

impl GameMode {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::WorldBuilder => "WorldBuilder",
            Self::SinglePlayer => "SinglePlayer",
            Self::HotSeat => "HotSeat",
            Self::MultiPlayer => "MultiPlayer",
        }
    }
}

/// Conditions an action group can be gated on.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Condition {
    AlwaysMet,
    NeverMet,
    /// Met while the current game age matches.
    AgeInUse { age: String },
    /// Met when the age was previously played; the current age does not
    /// count, and advanced starts do not count either.
    AgeWasUsed { age: String },
    /// Met when the age is the current one or was previously played.
    AgeEverInUse { age: String },
    ConfigurationValueMatches {
        group: String,
        configuration_id: String,
        value: String,
    },
    /// Met when the parameter matches any of the listed values.
    ConfigurationValueContains {
        group: String,
        configuration_id: String,
        value: Vec<String>,
    },
    MapInUse { path: String },
    RuleSetInUse { ruleset: String },
    GameModeInUse { game_mode: GameMode },
    LeaderPlayable { leader: String },
    CivilizationPlayable { civilization: String },
    /// Met while a mod (or official DLC) with this id is active. A version,
    /// when given, must match exactly.
    ModInUse {
        value: String,
        #[serde(default)]
        version: Option<String>,
    },
}

/// Named condition set action groups reference by id.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Criteria {
    pub id: String,
    /// Met when any condition holds instead of all of them.
    #[serde(default)]
    pub any: bool,
    pub conditions: Vec<Condition>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Scope {
    Shell,
    Game,
}

impl Scope {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Shell => "shell",
            Self::Game => "game",
        }
    }
}

/// Item of an `UpdateDatabase` action: either a file the mod ships, or a raw
/// SQL statement the build step still has to write to disk.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum DatabaseItem {
    File(String),
    Sql { sql: String },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Action {
    ImportFiles { items: Vec<String> },
    UpdateDatabase { items: Vec<DatabaseItem> },
    UpdateText { items: Vec<String> },
    UiScripts { items: Vec<String> },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActionGroup {
    pub id: String,
    pub scope: Scope,
    /// Id of the criteria gating this group.
    pub criteria: String,
    pub actions: Vec<Action>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> ModInfo {
        let mut info = ModInfo::new("fxs-new-policies", "1");
        info.action_criteria.push(Criteria {
            id: "antiquity-age-current".to_string(),
            any: false,
            conditions: vec![Condition::AgeInUse {
                age: "AGE_ANTIQUITY".to_string(),
            }],
        });
        info.action_groups.push(ActionGroup {
            id: "antiquity-game".to_string(),
            scope: Scope::Game,
            criteria: "antiquity-age-current".to_string(),
            actions: vec![Action::UpdateDatabase {
                items: vec![DatabaseItem::File(
                    "data/antiquity-traditions.xml".to_string(),
                )],
            }],
        });
        info
    }

    #[test]
    fn clean_id_has_no_recommendations() {
        assert!(sample().id_recommendations().is_empty());
    }

    #[test]
    fn sloppy_id_collects_every_recommendation() {
        let bad_id = format!("Ä{} WITH_SPACE", "a".repeat(RECOMMENDED_MAX_ID_LENGTH));
        let info = ModInfo::new(bad_id, "1.0");
        let warnings = info.id_recommendations();
        assert_eq!(warnings.len(), 3);
        assert!(warnings[0].contains("less than"));
        assert!(warnings[1].contains("ASCII"));
        assert!(warnings[2].contains("lowercase"));
    }

    #[test]
    fn missing_properties_collect_recommendations() {
        let warnings = Properties::default().recommendations();
        assert_eq!(warnings.len(), 3);
        let partial = Properties {
            name: Some("Antiquity Policies".to_string()),
            ..Properties::default()
        };
        let warnings = partial.recommendations();
        assert_eq!(warnings.len(), 2);
        assert!(warnings.iter().all(|w| !w.contains("a name")));
    }

    #[test]
    fn validate_accepts_the_sample() {
        sample().validate().expect("sample should validate");
    }

    #[test]
    fn validate_rejects_empty_criteria() {
        let mut info = sample();
        info.action_criteria[0].conditions.clear();
        assert!(matches!(
            info.validate(),
            Err(ModInfoError::EmptyCriteria(_))
        ));
    }

    #[test]
    fn validate_rejects_duplicate_criteria_ids() {
        let mut info = sample();
        let duplicate = info.action_criteria[0].clone();
        info.action_criteria.push(duplicate);
        assert!(matches!(
            info.validate(),
            Err(ModInfoError::DuplicateCriteria(_))
        ));
    }

    #[test]
    fn validate_rejects_unknown_criteria_reference() {
        let mut info = sample();
        info.action_groups[0].criteria = "no-such-criteria".to_string();
        assert!(matches!(
            info.validate(),
            Err(ModInfoError::UnknownCriteria { .. })
        ));
    }

    #[test]
    fn mod_description_round_trips_through_json() {
        let raw = r#"{
            "id": "fxs-new-policies",
            "version": "1",
            "properties": {"name": "Antiquity Policies"},
            "action_criteria": [
                {"id": "always", "conditions": [{"kind": "always_met"}]}
            ],
            "action_groups": [
                {
                    "id": "g",
                    "scope": "game",
                    "criteria": "always",
                    "actions": [
                        {"kind": "update_database", "items": ["data/a.xml", {"sql": "SELECT 1"}]}
                    ]
                }
            ]
        }"#;
        let info: ModInfo = serde_json::from_str(raw).expect("parse");
        assert_eq!(info.id, "fxs-new-policies");
        let Action::UpdateDatabase { items } = &info.action_groups[0].actions[0] else {
            panic!("expected update_database action");
        };
        assert!(matches!(items[0], DatabaseItem::File(_)));
        assert!(matches!(items[1], DatabaseItem::Sql { .. }));
    }
}
