//! Catalog of admin settings fields and their bindings into the tree.

use crate::path::{self, Path};
use crate::value::{ConfigTree, ConfigValue};
use log::warn;
use serde::Serialize;

/// Group a field is shown under.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldSection {
    General,
    Appearance,
    Content,
    Categories,
}

impl FieldSection {
    pub fn title(self) -> &'static str {
        match self {
            FieldSection::General => "General Settings",
            FieldSection::Appearance => "Appearance Settings",
            FieldSection::Content => "Text Content",
            FieldSection::Categories => "Cookie Categories",
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            FieldSection::General => "Configure general cookie consent behavior.",
            FieldSection::Appearance => "Customize the appearance of the cookie consent modals.",
            FieldSection::Content => "Customize the text content displayed in the modals.",
            FieldSection::Categories => {
                "Configure cookie categories. Necessary cookies are always enabled and cannot be disabled."
            }
        }
    }
}

/// Input widget kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum FieldKind {
    /// Fixed choices as `(value, label)` pairs.
    Select {
        options: &'static [(&'static str, &'static str)],
    },
    Text,
    Textarea,
    /// Submits `"1"` when checked and nothing when unchecked.
    Checkbox,
}

/// One admin field bound to a bracket-notation path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SettingsField {
    pub id: &'static str,
    pub field_name: &'static str,
    pub label: &'static str,
    pub description: &'static str,
    pub section: FieldSection,
    pub kind: FieldKind,
}

impl SettingsField {
    /// Path of the bound leaf. Catalog names are always well-formed.
    pub fn path(&self) -> Path {
        Path::parse_field_name(self.field_name).unwrap_or_else(|err| {
            warn!("catalog field {} has a malformed name: {err}", self.id);
            Path::parse(self.field_name)
        })
    }
}

const CONSENT_LAYOUTS: &[(&str, &str)] = &[
    ("box", "Box"),
    ("box wide", "Box Wide"),
    ("box inline", "Box Inline"),
    ("cloud", "Cloud"),
    ("cloud inline", "Cloud Inline"),
    ("bar", "Bar"),
    ("bar inline", "Bar Inline"),
];

const CONSENT_POSITIONS: &[(&str, &str)] = &[
    ("top", "Top"),
    ("top left", "Top Left"),
    ("top center", "Top Center"),
    ("top right", "Top Right"),
    ("middle", "Middle"),
    ("middle left", "Middle Left"),
    ("middle center", "Middle Center"),
    ("middle right", "Middle Right"),
    ("bottom", "Bottom"),
    ("bottom left", "Bottom Left"),
    ("bottom center", "Bottom Center"),
    ("bottom right", "Bottom Right"),
];

const PREFERENCES_LAYOUTS: &[(&str, &str)] = &[("box", "Box"), ("bar", "Bar"), ("bar wide", "Bar Wide")];

const PREFERENCES_POSITIONS: &[(&str, &str)] = &[("left", "Left"), ("right", "Right")];

const FIELDS: &[SettingsField] = &[
    SettingsField {
        id: "mode",
        field_name: "mode",
        label: "Consent Mode",
        description: "Choose between opt-in and opt-out mode.",
        section: FieldSection::General,
        kind: FieldKind::Select {
            options: &[
                ("opt-in", "Opt-in (default, GDPR compliant)"),
                ("opt-out", "Opt-out"),
            ],
        },
    },
    SettingsField {
        id: "auto_show",
        field_name: "autoShow",
        label: "Auto Show",
        description: "Automatically show the consent modal if consent is not valid.",
        section: FieldSection::General,
        kind: FieldKind::Checkbox,
    },
    SettingsField {
        id: "disable_page_interaction",
        field_name: "disablePageInteraction",
        label: "Disable Page Interaction",
        description: "Create dark overlay and disable page scroll until consent.",
        section: FieldSection::General,
        kind: FieldKind::Checkbox,
    },
    SettingsField {
        id: "hide_from_bots",
        field_name: "hideFromBots",
        label: "Hide from Bots",
        description: "Stop the plugin execution if a bot/crawler is detected.",
        section: FieldSection::General,
        kind: FieldKind::Checkbox,
    },
    SettingsField {
        id: "consent_modal_layout",
        field_name: "guiOptions[consentModal][layout]",
        label: "Consent Modal Layout",
        description: "Choose the layout for the consent modal.",
        section: FieldSection::Appearance,
        kind: FieldKind::Select {
            options: CONSENT_LAYOUTS,
        },
    },
    SettingsField {
        id: "consent_modal_position",
        field_name: "guiOptions[consentModal][position]",
        label: "Consent Modal Position",
        description: "Choose the position for the consent modal.",
        section: FieldSection::Appearance,
        kind: FieldKind::Select {
            options: CONSENT_POSITIONS,
        },
    },
    SettingsField {
        id: "preferences_modal_layout",
        field_name: "guiOptions[preferencesModal][layout]",
        label: "Preferences Modal Layout",
        description: "Choose the layout for the preferences modal.",
        section: FieldSection::Appearance,
        kind: FieldKind::Select {
            options: PREFERENCES_LAYOUTS,
        },
    },
    SettingsField {
        id: "preferences_modal_position",
        field_name: "guiOptions[preferencesModal][position]",
        label: "Preferences Modal Position",
        description: "Choose the position for the preferences modal.",
        section: FieldSection::Appearance,
        kind: FieldKind::Select {
            options: PREFERENCES_POSITIONS,
        },
    },
    SettingsField {
        id: "consent_modal_title",
        field_name: "language[translations][en][consentModal][title]",
        label: "Consent Modal Title",
        description: "Title displayed in the consent modal.",
        section: FieldSection::Content,
        kind: FieldKind::Text,
    },
    SettingsField {
        id: "consent_modal_description",
        field_name: "language[translations][en][consentModal][description]",
        label: "Consent Modal Description",
        description: "Description displayed in the consent modal.",
        section: FieldSection::Content,
        kind: FieldKind::Textarea,
    },
    SettingsField {
        id: "accept_all_btn",
        field_name: "language[translations][en][consentModal][acceptAllBtn]",
        label: "\"Accept All\" Button Text",
        description: "Text for the \"Accept All\" button.",
        section: FieldSection::Content,
        kind: FieldKind::Text,
    },
    SettingsField {
        id: "reject_all_btn",
        field_name: "language[translations][en][consentModal][acceptNecessaryBtn]",
        label: "\"Reject All\" Button Text",
        description: "Text for the \"Reject All\" button.",
        section: FieldSection::Content,
        kind: FieldKind::Text,
    },
    SettingsField {
        id: "manage_preferences_btn",
        field_name: "language[translations][en][consentModal][showPreferencesBtn]",
        label: "\"Manage Preferences\" Button Text",
        description: "Text for the \"Manage Preferences\" button.",
        section: FieldSection::Content,
        kind: FieldKind::Text,
    },
    SettingsField {
        id: "preferences_modal_title",
        field_name: "language[translations][en][preferencesModal][title]",
        label: "Preferences Modal Title",
        description: "Title displayed in the preferences modal.",
        section: FieldSection::Content,
        kind: FieldKind::Text,
    },
    SettingsField {
        id: "analytics_enabled",
        field_name: "categories[analytics][enabled]",
        label: "Enable Analytics by Default",
        description: "Enable analytics cookies by default (only in opt-out mode).",
        section: FieldSection::Categories,
        kind: FieldKind::Checkbox,
    },
    SettingsField {
        id: "marketing_enabled",
        field_name: "categories[marketing][enabled]",
        label: "Enable Marketing by Default",
        description: "Enable marketing cookies by default (only in opt-out mode).",
        section: FieldSection::Categories,
        kind: FieldKind::Checkbox,
    },
];

/// All admin fields in display order.
pub fn catalog() -> &'static [SettingsField] {
    FIELDS
}

/// Look up a field by its bracket-notation name.
pub fn field_by_name(field_name: &str) -> Option<&'static SettingsField> {
    FIELDS.iter().find(|field| field.field_name == field_name)
}

/// Stored value bound to `field`, or the empty sentinel when unset.
pub fn field_value<'a>(overrides: &'a ConfigTree, field: &SettingsField) -> &'a ConfigValue {
    path::read(overrides, &field.path())
}
