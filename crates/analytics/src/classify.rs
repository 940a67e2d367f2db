use core_types::ColorType;

/// The marker substrings used when nothing else is configured.
pub const DEFAULT_INDEPENDENT_MARKERS: [&str; 5] = ["White", "Black", "Gold", "Silver", "Metallic"];

/// Splits ink colours into single solid colour sets and mixed sets.
///
/// A colour is `Independent` when it contains any marker as a substring,
/// otherwise `Assorted`.
#[derive(Debug, Clone)]
pub struct ColorClassifier {
    markers: Vec<String>,
    case_sensitive: bool,
}

impl ColorClassifier {
    pub fn new<I, S>(markers: I, case_sensitive: bool) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let markers = markers
            .into_iter()
            .map(Into::into)
            .map(|m: String| if case_sensitive { m } else { m.to_lowercase() })
            .filter(|m| !m.is_empty())
            .collect();
        Self {
            markers,
            case_sensitive,
        }
    }

    pub fn markers(&self) -> &[String] {
        &self.markers
    }

    pub fn classify(&self, ink_color: &str) -> ColorType {
        let hit = if self.case_sensitive {
            self.markers.iter().any(|m| ink_color.contains(m.as_str()))
        } else {
            let lowered = ink_color.to_lowercase();
            self.markers.iter().any(|m| lowered.contains(m.as_str()))
        };

        if hit {
            ColorType::Independent
        } else {
            ColorType::Assorted
        }
    }
}

impl Default for ColorClassifier {
    fn default() -> Self {
        Self::new(DEFAULT_INDEPENDENT_MARKERS, true)
    }
}
