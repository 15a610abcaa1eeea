//! Steps that rewrite text and enumerated values on nodes and actions.

use anyhow::Result;

use crate::document::{Object, actions_mut, legacy_nodes_mut, map_string};
use crate::migration::traits::{Generation, MigrationStep};

/// Legacy node color keywords and the hex values that replaced them.
pub const LEGACY_NODE_COLORS: &[(&str, &str)] = &[
    ("default", "#ffffff"),
    ("green", "#65eb59"),
    ("pink", "#fa39ac"),
    ("yellow", "#f7e346"),
    ("blue", "#52b1ff"),
    ("purple", "#ae66d6"),
    ("red", "#f9484f"),
    ("khaki", "#b5ad88"),
    ("orange", "#ffab50"),
];

/// Node fields that hold rich text.
const NODE_TEXT_FIELDS: &[&str] = &["description", "preExecutionText"];

/// Action fields that hold rich text.
const ACTION_TEXT_FIELDS: &[&str] = &[
    "description",
    "postExecutionSuccessText",
    "postExecutionFailureText",
];

/// Text the old editor saved when a node field was never edited.
const NODE_PLACEHOLDERS: &[(&str, &str)] = &[
    ("description", "<p>Description text goes here.</p>"),
    ("preExecutionText", "<p>Node has not been executed.</p>"),
];

/// Text the old editor saved when an action field was never edited.
const ACTION_PLACEHOLDERS: &[(&str, &str)] = &[
    ("description", "<p>Enter your description here.</p>"),
    (
        "postExecutionSuccessText",
        "<p>Enter your successful post-execution message here.</p>",
    ),
    (
        "postExecutionFailureText",
        "<p>Enter your unsuccessful post-execution message here.</p>",
    ),
];

/// Generation 4: node colors move from keywords to hex codes.
///
/// Values outside the keyword set (including hex codes already in use) are
/// left untouched.
#[derive(Debug)]
pub struct MapLegacyNodeColors;

impl MapLegacyNodeColors {
    pub fn hex_for(keyword: &str) -> Option<&'static str> {
        LEGACY_NODE_COLORS
            .iter()
            .find(|(legacy, _)| *legacy == keyword)
            .map(|(_, hex)| *hex)
    }
}

impl MigrationStep for MapLegacyNodeColors {
    fn target_generation(&self) -> Generation {
        4
    }

    fn description(&self) -> &str {
        "Map legacy node color keywords to hex codes"
    }

    fn apply(&self, root: &mut Object) -> Result<()> {
        for node in legacy_nodes_mut(root) {
            map_string(node, "color", |color| Self::hex_for(color).map(str::to_string));
        }
        Ok(())
    }
}

/// Generation 5: plain text fields become paragraph markup.
#[derive(Debug)]
pub struct WrapRichText;

impl WrapRichText {
    fn wrap(text: &str) -> Option<String> {
        if text.is_empty() {
            None
        } else {
            Some(format!("<p>{}</p>", text))
        }
    }
}

impl MigrationStep for WrapRichText {
    fn target_generation(&self) -> Generation {
        5
    }

    fn description(&self) -> &str {
        "Wrap node and action text in paragraph markup"
    }

    fn apply(&self, root: &mut Object) -> Result<()> {
        for node in legacy_nodes_mut(root) {
            for field in NODE_TEXT_FIELDS {
                map_string(node, field, Self::wrap);
            }
            for action in actions_mut(node) {
                for field in ACTION_TEXT_FIELDS {
                    map_string(action, field, Self::wrap);
                }
            }
        }
        Ok(())
    }
}

/// Generation 6: editor placeholder text is cleared.
#[derive(Debug)]
pub struct ClearPlaceholderText;

impl ClearPlaceholderText {
    fn clear(object: &mut Object, placeholders: &[(&str, &str)]) {
        for (field, placeholder) in placeholders {
            map_string(object, field, |text| {
                (text == *placeholder).then(String::new)
            });
        }
    }
}

impl MigrationStep for ClearPlaceholderText {
    fn target_generation(&self) -> Generation {
        6
    }

    fn description(&self) -> &str {
        "Clear placeholder text from nodes and actions"
    }

    fn apply(&self, root: &mut Object) -> Result<()> {
        for node in legacy_nodes_mut(root) {
            Self::clear(node, NODE_PLACEHOLDERS);
            for action in actions_mut(node) {
                Self::clear(action, ACTION_PLACEHOLDERS);
            }
        }
        Ok(())
    }
}
