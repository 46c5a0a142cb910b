use crate::schema::{
    Action, ActionGroup, ChildMod, Condition, Criteria, DatabaseItem, ModInfo, ModInfoError,
    Properties,
};

fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            other => out.push(other),
        }
    }
    out
}

struct XmlWriter {
    out: String,
    depth: usize,
}

impl XmlWriter {
    fn new() -> Self {
        Self {
            out: String::from("<?xml version=\"1.0\" encoding=\"utf-8\"?>\n"),
            depth: 0,
        }
    }

    fn line(&mut self, text: &str) {
        for _ in 0..self.depth {
            self.out.push_str("    ");
        }
        self.out.push_str(text);
        self.out.push('\n');
    }

    fn attrs(pairs: &[(&str, &str)]) -> String {
        pairs
            .iter()
            .map(|(name, value)| format!(" {name}=\"{}\"", escape(value)))
            .collect()
    }

    fn open(&mut self, tag: &str, attrs: &[(&str, &str)]) {
        self.line(&format!("<{tag}{}>", Self::attrs(attrs)));
        self.depth += 1;
    }

    fn close(&mut self, tag: &str) {
        self.depth -= 1;
        self.line(&format!("</{tag}>"));
    }

    fn leaf(&mut self, tag: &str, text: &str) {
        self.line(&format!("<{tag}>{}</{tag}>", escape(text)));
    }

    fn empty(&mut self, tag: &str, attrs: &[(&str, &str)]) {
        self.line(&format!("<{tag}{}/>", Self::attrs(attrs)));
    }
}

fn bool_text(value: bool) -> &'static str {
    if value {
        "1"
    } else {
        "0"
    }
}

/// Renders the document in the game's `.modinfo` XML format. Every inline SQL
/// statement must have been staged to a file first.
pub fn render_modinfo(info: &ModInfo) -> Result<String, ModInfoError> {
    let mut w = XmlWriter::new();
    w.open(
        "Mod",
        &[
            ("id", info.id.as_str()),
            ("version", info.version.as_str()),
            ("xmlns", "ModInfo"),
        ],
    );
    render_properties(&mut w, &info.properties);
    render_child_mods(&mut w, "Dependencies", &info.dependencies);
    render_child_mods(&mut w, "References", &info.references);
    if !info.action_criteria.is_empty() {
        w.open("ActionCriteria", &[]);
        for criteria in &info.action_criteria {
            render_criteria(&mut w, criteria);
        }
        w.close("ActionCriteria");
    }
    if !info.action_groups.is_empty() {
        w.open("ActionGroups", &[]);
        for group in &info.action_groups {
            render_group(&mut w, group)?;
        }
        w.close("ActionGroups");
    }
    w.close("Mod");
    Ok(w.out)
}

fn render_properties(w: &mut XmlWriter, properties: &Properties) {
    if properties.is_empty() {
        return;
    }
    w.open("Properties", &[]);
    if let Some(name) = &properties.name {
        w.leaf("Name", name);
    }
    if let Some(description) = &properties.description {
        w.leaf("Description", description);
    }
    if let Some(authors) = &properties.authors {
        w.leaf("Authors", authors);
    }
    if let Some(affects) = properties.affects_saved_games {
        w.leaf("AffectsSavedGames", bool_text(affects));
    }
    if let Some(package) = &properties.package {
        w.leaf("Package", package);
    }
    if let Some(index) = properties.package_sort_index {
        w.leaf("PackageSortIndex", &index.to_string());
    }
    if let Some(show) = properties.show_in_browser {
        w.leaf("ShowInBrowser", bool_text(show));
    }
    if let Some(enabled) = properties.enabled_by_default {
        w.leaf("EnabledByDefault", bool_text(enabled));
    }
    w.close("Properties");
}

fn render_child_mods(w: &mut XmlWriter, tag: &str, mods: &[ChildMod]) {
    if mods.is_empty() {
        return;
    }
    w.open(tag, &[]);
    for child in mods {
        w.empty(
            "Mod",
            &[("id", child.id.as_str()), ("title", child.title.as_str())],
        );
    }
    w.close(tag);
}

fn render_criteria(w: &mut XmlWriter, criteria: &Criteria) {
    let mut attrs = vec![("id", criteria.id.as_str())];
    if criteria.any {
        attrs.push(("any", "1"));
    }
    w.open("Criteria", &attrs);
    for condition in &criteria.conditions {
        render_condition(w, condition);
    }
    w.close("Criteria");
}

fn render_condition(w: &mut XmlWriter, condition: &Condition) {
    match condition {
        Condition::AlwaysMet => w.empty("AlwaysMet", &[]),
        Condition::NeverMet => w.empty("NeverMet", &[]),
        Condition::AgeInUse { age } => render_age(w, "AgeInUse", age),
        Condition::AgeWasUsed { age } => render_age(w, "AgeWasUsed", age),
        Condition::AgeEverInUse { age } => render_age(w, "AgeEverInUse", age),
        Condition::ConfigurationValueMatches {
            group,
            configuration_id,
            value,
        } => {
            w.open("ConfigurationValueMatches", &[]);
            w.leaf("Group", group);
            w.leaf("ConfigurationId", configuration_id);
            w.leaf("Value", value);
            w.close("ConfigurationValueMatches");
        }
        Condition::ConfigurationValueContains {
            group,
            configuration_id,
            value,
        } => {
            w.open("ConfigurationValueContains", &[]);
            w.leaf("Group", group);
            w.leaf("ConfigurationId", configuration_id);
            w.leaf("Value", &value.join(","));
            w.close("ConfigurationValueContains");
        }
        Condition::MapInUse { path } => {
            w.open("MapInUse", &[]);
            w.leaf("Path", path);
            w.close("MapInUse");
        }
        Condition::RuleSetInUse { ruleset } => {
            w.open("RuleSetInUse", &[]);
            w.leaf("RuleSet", ruleset);
            w.close("RuleSetInUse");
        }
        Condition::GameModeInUse { game_mode } => {
            w.open("GameModeInUse", &[]);
            w.leaf("GameMode", game_mode.as_str());
            w.close("GameModeInUse");
        }
        Condition::LeaderPlayable { leader } => {
            w.open("LeaderPlayable", &[]);
            w.leaf("Leader", leader);
            w.close("LeaderPlayable");
        }
        Condition::CivilizationPlayable { civilization } => {
            w.open("CivilizationPlayable", &[]);
            w.leaf("Civilization", civilization);
            w.close("CivilizationPlayable");
        }
        Condition::ModInUse { value, version } => {
            w.open("ModInUse", &[]);
            w.leaf("Value", value);
            if let Some(version) = version {
                w.leaf("Version", version);
            }
            w.close("ModInUse");
        }
    }
}

fn render_age(w: &mut XmlWriter, tag: &str, age: &str) {
    w.open(tag, &[]);
    w.leaf("Age", age);
    w.close(tag);
}

fn render_group(w: &mut XmlWriter, group: &ActionGroup) -> Result<(), ModInfoError> {
    w.open(
        "ActionGroup",
        &[
            ("id", group.id.as_str()),
            ("scope", group.scope.as_str()),
            ("criteria", group.criteria.as_str()),
        ],
    );
    w.open("Actions", &[]);
    for action in &group.actions {
        match action {
            Action::ImportFiles { items } => render_items(w, "ImportFiles", items),
            Action::UpdateText { items } => render_items(w, "UpdateText", items),
            Action::UiScripts { items } => render_items(w, "UIScripts", items),
            Action::UpdateDatabase { items } => {
                w.open("UpdateDatabase", &[]);
                for item in items {
                    match item {
                        DatabaseItem::File(path) => w.leaf("Item", path),
                        DatabaseItem::Sql { .. } => {
                            return Err(ModInfoError::UnstagedSql(group.id.clone()));
                        }
                    }
                }
                w.close("UpdateDatabase");
            }
        }
    }
    w.close("Actions");
    w.close("ActionGroup");
    Ok(())
}

fn render_items(w: &mut XmlWriter, tag: &str, items: &[String]) {
    w.open(tag, &[]);
    for item in items {
        w.leaf("Item", item);
    }
    w.close(tag);
}
