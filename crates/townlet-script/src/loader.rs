//! RON content loader

use crate::error::{Error, Result};
use crate::schema::ContentFile;
use ron::extensions::Extensions;
use std::collections::HashSet;
use std::fs;
use std::path::Path;
use townlet_core::{Catalog, DefId};

/// Loader for RON catalog content
///
/// Content accumulates across calls; ids must be unique over everything
/// loaded. Cross-references are checked once at the end by `finish`.
pub struct Loader {
    catalog: Catalog,
    rules_loaded: bool,
}

impl Loader {
    /// Create a loader with an empty catalog and default rules
    pub fn new() -> Self {
        Self::extending(Catalog::new())
    }

    /// Create a loader that adds to existing content
    pub fn extending(catalog: Catalog) -> Self {
        Self {
            catalog,
            rules_loaded: false,
        }
    }

    /// Load content from a RON string
    ///
    /// `rules` may be written without a `Some(...)` wrapper.
    pub fn load_str(&mut self, content: &str) -> Result<()> {
        let file: ContentFile = ron::Options::default()
            .with_default_extension(Extensions::IMPLICIT_SOME)
            .from_str(content)?;
        self.load_content(file)
    }

    /// Merge parsed content
    ///
    /// Nothing is merged if any id in `file` is a duplicate.
    pub fn load_content(&mut self, file: ContentFile) -> Result<()> {
        let mut buildings = HashSet::new();
        for def in &file.buildings {
            if self.catalog.buildings.contains_key(&def.id) || !buildings.insert(&def.id) {
                return Err(Error::DuplicateDefinition(def.id.to_string()));
            }
            if def.max_level == 0 {
                return Err(Error::InvalidSchema(format!(
                    "building {} has max_level 0",
                    def.id
                )));
            }
        }

        let mut quests = HashSet::new();
        for quest in &file.story_quests {
            if self.catalog.story_quest(&quest.id).is_some() || !quests.insert(&quest.id) {
                return Err(Error::DuplicateDefinition(quest.id.to_string()));
            }
            if quest.count == 0 {
                return Err(Error::InvalidSchema(format!(
                    "story quest {} has count 0",
                    quest.id
                )));
            }
        }

        let mut templates: HashSet<&DefId> =
            self.catalog.quest_pools.iter().map(|t| &t.id).collect();
        for template in file.quest_pools.iter() {
            if !templates.insert(&template.id) {
                return Err(Error::DuplicateDefinition(template.id.to_string()));
            }
        }

        if file.rules.is_some() && self.rules_loaded {
            return Err(Error::DuplicateDefinition("rules".to_string()));
        }

        tracing::debug!(
            target: "townlet::script",
            buildings = file.buildings.len(),
            story_quests = file.story_quests.len(),
            templates = file.quest_pools.iter().count(),
            rules = file.rules.is_some(),
            "loaded content"
        );

        for def in file.buildings {
            self.catalog.add_building(def);
        }
        self.catalog.story_quests.extend(file.story_quests);
        let pools = &mut self.catalog.quest_pools;
        pools.build.extend(file.quest_pools.build);
        pools.collect.extend(file.quest_pools.collect);
        pools.upgrade.extend(file.quest_pools.upgrade);
        pools.spend.extend(file.quest_pools.spend);
        if let Some(rules) = file.rules {
            self.catalog.rules = rules;
            self.rules_loaded = true;
        }
        Ok(())
    }

    /// Load a single RON file
    pub fn load_file(&mut self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)?;
        tracing::debug!(target: "townlet::script", path = %path.display(), "reading content file");
        self.load_str(&content)
    }

    /// Load all RON files from a directory, recursing into subdirectories
    ///
    /// Entries are visited in name order so building display order is stable.
    pub fn load_directory(&mut self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();

        if !path.is_dir() {
            return Err(Error::Io(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                format!("Not a directory: {:?}", path),
            )));
        }

        let mut entries = fs::read_dir(path)?
            .map(|entry| entry.map(|e| e.path()))
            .collect::<std::io::Result<Vec<_>>>()?;
        entries.sort();

        for file_path in entries {
            if file_path.extension().map(|e| e == "ron").unwrap_or(false) {
                self.load_file(&file_path)?;
            } else if file_path.is_dir() {
                self.load_directory(&file_path)?;
            }
        }

        Ok(())
    }

    /// Get the current content (for inspection during loading)
    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    /// Check cross-references and return the finished catalog
    pub fn finish(self) -> Result<Catalog> {
        let catalog = self.catalog;
        let check = |referenced_by: String, building: &DefId| {
            if catalog.building(building).is_some() {
                Ok(())
            } else {
                Err(Error::UnknownBuilding {
                    referenced_by,
                    building: building.to_string(),
                })
            }
        };

        for quest in &catalog.story_quests {
            if let Some(target) = quest.goal.building_target() {
                check(format!("story quest {}", quest.id), target)?;
            }
        }
        for template in catalog.quest_pools.iter() {
            if let Some(target) = template.goal.building_target() {
                check(format!("quest template {}", template.id), target)?;
            }
        }
        for kind in &catalog.rules.energy_exempt {
            check("rules.energy_exempt".to_string(), kind)?;
        }

        Ok(catalog)
    }
}

impl Default for Loader {
    fn default() -> Self {
        Self::new()
    }
}
