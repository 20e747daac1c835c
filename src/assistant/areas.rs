// Closed set of neighbourhoods that have a description file and can be match-scored

use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Area {
    /// Lowercase name as it is matched in user text
    pub name: &'static str,
    pub display_name: &'static str,
    /// File stem of the description resource
    pub resource_key: &'static str,
}

impl Area {
    const fn new(name: &'static str, display_name: &'static str, resource_key: &'static str) -> Self {
        Self {
            name,
            display_name,
            resource_key,
        }
    }

    /// `<dir>/<resource_key>.txt`
    #[inline]
    pub fn description_path(&self, dir: &Path) -> PathBuf {
        dir.join(format!("{}.txt", self.resource_key))
    }
}

/// Lookup order matters: the first area found in the text wins
pub const AREAS: [Area; 10] = [
    Area::new("koramangala", "Koramangala", "koramangala"),
    Area::new("hsr layout", "HSR Layout", "hsr_layout"),
    Area::new("indiranagar", "Indiranagar", "indiranagar"),
    Area::new("jayanagar", "Jayanagar", "jayanagar"),
    Area::new("whitefield", "Whitefield", "whitefield"),
    Area::new("marathahalli", "Marathahalli", "marathahalli"),
    Area::new("electronic city", "Electronic City", "electronic_city"),
    Area::new("jp nagar", "JP Nagar", "jp_nagar"),
    Area::new("majestic", "Majestic", "majestic"),
    Area::new("nagasandra", "Nagasandra", "nagasandra"),
];

/// First area (in table order) whose name occurs in `text`, ignoring case
#[inline]
pub fn find_area(text: &str) -> Option<&'static Area> {
    let text = text.to_lowercase();
    AREAS.iter().find(|area| text.contains(area.name))
}
