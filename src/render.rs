use std::fmt::Write as _;

use serde::Serialize;

/// Read-only view the renderer consumes.
///
/// While `loading` is set the remaining fields belong to an unfinished
/// resolution cycle and must be ignored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CardSnapshot {
    pub loading: bool,
    pub link: String,
    pub title: String,
    pub desc: String,
    pub image: String,
    pub theme_color: String,
}

impl CardSnapshot {
    /// Plain-text card used by the CLI. Writes the loading marker alone while
    /// a cycle is unfinished; the image line is omitted when there is none.
    pub fn to_text(&self) -> String {
        if self.loading {
            return "[loading]\n".to_owned();
        }

        let mut out = String::new();
        let _ = writeln!(out, "Title: {}", self.title);
        let _ = writeln!(out, "Desc: {}", self.desc);
        let _ = writeln!(out, "Link: {}", self.link);
        if !self.image.is_empty() {
            let _ = writeln!(out, "Image: {}", self.image);
        }
        let _ = writeln!(out, "Accent: {}", self.theme_color);
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snapshot() -> CardSnapshot {
        CardSnapshot {
            loading: false,
            link: "https://example.com".to_owned(),
            title: "Example".to_owned(),
            desc: "A page".to_owned(),
            image: String::new(),
            theme_color: "#fff".to_owned(),
        }
    }

    #[test]
    fn loading_renders_the_marker_alone() {
        let mut snap = snapshot();
        snap.loading = true;
        assert_eq!(snap.to_text(), "[loading]\n");
    }

    #[test]
    fn image_line_is_omitted_when_empty() {
        let text = snapshot().to_text();
        assert!(text.contains("Title: Example"));
        assert!(!text.contains("Image:"));
        assert!(text.ends_with("Accent: #fff\n"));
    }

    #[test]
    fn json_field_names_match_the_widget_properties() {
        let json = serde_json::to_string(&snapshot()).unwrap();
        assert!(json.contains(r##""themeColor":"#fff""##));
        assert!(json.contains(r#""loading":false"#));
    }
}
