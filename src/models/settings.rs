use super::Point;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Unknown strings deserialize as `bottom-left`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", from = "String")]
pub enum Corner {
    TopLeft,
    TopRight,
    #[default]
    BottomLeft,
    BottomRight,
}

impl Corner {
    pub const ALL: [Corner; 4] = [
        Corner::BottomLeft,
        Corner::BottomRight,
        Corner::TopLeft,
        Corner::TopRight,
    ];

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "top-left" => Some(Self::TopLeft),
            "top-right" => Some(Self::TopRight),
            "bottom-left" => Some(Self::BottomLeft),
            "bottom-right" => Some(Self::BottomRight),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::TopLeft => "top-left",
            Self::TopRight => "top-right",
            Self::BottomLeft => "bottom-left",
            Self::BottomRight => "bottom-right",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::TopLeft => "Top Left",
            Self::TopRight => "Top Right",
            Self::BottomLeft => "Bottom Left",
            Self::BottomRight => "Bottom Right",
        }
    }

    pub fn is_left(&self) -> bool {
        matches!(self, Self::TopLeft | Self::BottomLeft)
    }

    pub fn is_top(&self) -> bool {
        matches!(self, Self::TopLeft | Self::TopRight)
    }
}

impl From<String> for Corner {
    fn from(value: String) -> Self {
        Self::parse(&value).unwrap_or_default()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Settings {
    pub position: Option<Point>,
    pub always_on_top: bool,
    pub is_expanded: bool,
    pub corner: Corner,
    pub widget_settings: Value,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            position: None,
            always_on_top: true,
            is_expanded: false,
            corner: Corner::BottomLeft,
            widget_settings: Value::Object(Map::new()),
            extra: Map::new(),
        }
    }
}

impl Settings {
    pub const KNOWN_KEYS: [&'static str; 5] = [
        "position",
        "alwaysOnTop",
        "isExpanded",
        "corner",
        "widgetSettings",
    ];

    /// Off only for a literal `false` at `general.snapToTaskbar`.
    pub fn snap_to_taskbar(&self) -> bool {
        self.widget_settings.pointer("/general/snapToTaskbar") != Some(&Value::Bool(false))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn unknown_corner_falls_back_to_bottom_left() {
        let corner: Corner = serde_json::from_value(json!("middle")).expect("deserialize");
        assert_eq!(corner, Corner::BottomLeft);
        let corner: Corner = serde_json::from_value(json!("top-right")).expect("deserialize");
        assert_eq!(corner, Corner::TopRight);
        assert_eq!(serde_json::to_value(Corner::TopRight).unwrap(), json!("top-right"));
    }

    #[test]
    fn snap_to_taskbar_defaults_on() {
        let mut settings = Settings::default();
        assert!(settings.snap_to_taskbar());

        settings.widget_settings = json!({ "general": { "snapToTaskbar": true } });
        assert!(settings.snap_to_taskbar());

        // only a literal `false` disables it
        settings.widget_settings = json!({ "general": { "snapToTaskbar": 0 } });
        assert!(settings.snap_to_taskbar());

        settings.widget_settings = json!({ "general": { "snapToTaskbar": false } });
        assert!(!settings.snap_to_taskbar());
    }

    #[test]
    fn extra_keys_are_kept_next_to_known_ones() {
        let settings: Settings = serde_json::from_value(json!({
            "corner": "top-left",
            "theme": "dark",
        }))
        .expect("deserialize");
        assert_eq!(settings.corner, Corner::TopLeft);
        assert!(settings.always_on_top);
        assert_eq!(settings.extra.get("theme"), Some(&json!("dark")));

        let out = serde_json::to_value(&settings).expect("serialize");
        assert_eq!(out["theme"], json!("dark"));
        assert_eq!(out["position"], Value::Null);
        assert_eq!(out["widgetSettings"], json!({}));
    }
}
