//! Colour-type classification.
//!
//! The classifier itself lives in `analytics`, which attaches a colour type to
//! every row at load; this module builds it from the dashboard settings.

pub use analytics::{ColorClassifier, DEFAULT_INDEPENDENT_MARKERS};
use configuration::DashboardSettings;

pub fn classifier(settings: &DashboardSettings) -> ColorClassifier {
    ColorClassifier::new(
        settings.independent_color_markers.iter().cloned(),
        settings.color_match_case_sensitive,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use core_types::ColorType;

    #[test]
    fn default_settings_match_the_default_classifier() {
        let c = classifier(&DashboardSettings::default());
        assert_eq!(c.markers(), ColorClassifier::default().markers());
        assert_eq!(c.classify("Silver"), ColorType::Independent);
        assert_eq!(c.classify("silver"), ColorType::Assorted);
    }

    #[test]
    fn configured_markers_replace_the_defaults() {
        let settings = DashboardSettings {
            independent_color_markers: vec!["neon".to_string()],
            color_match_case_sensitive: false,
            ..DashboardSettings::default()
        };
        let c = classifier(&settings);
        assert_eq!(c.classify("NEON Pink"), ColorType::Independent);
        assert_eq!(c.classify("Black"), ColorType::Assorted);
    }
}
