use serde::{Deserialize, Serialize};

const DEFAULT_INDENT_STEP: u32 = 40;
const DEFAULT_LINK_PLACEHOLDER: &str = "https://";
const DEFAULT_LINK_TARGET: &str = "_blank";
const DEFAULT_LINK_REL: &str = "noopener noreferrer";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorConfig {
    pub indent_step: u32,
    pub link_placeholder: String,
    pub link_target: String,
    pub link_rel: String,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            indent_step: DEFAULT_INDENT_STEP,
            link_placeholder: DEFAULT_LINK_PLACEHOLDER.to_string(),
            link_target: DEFAULT_LINK_TARGET.to_string(),
            link_rel: DEFAULT_LINK_REL.to_string(),
        }
    }
}

impl EditorConfig {
    pub fn from_json_str(s: &str) -> Result<Self, serde_json::Error> {
        let config: Self = serde_json::from_str(s)?;
        Ok(config.with_defaults())
    }

    pub fn with_defaults(mut self) -> Self {
        if self.indent_step == 0 {
            self.indent_step = DEFAULT_INDENT_STEP;
        }
        self
    }
}
