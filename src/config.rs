use anyhow::{Context, Result};
use mirage_core::{BlockId, DimensionId, RegistryKey};
use mirage_teleport::{
    BookEntry, DestinationTable, DimensionClass, DimensionRegistry, SearchBounds,
    TeleportSettings,
};
use mirage_world::{block_id_by_name, TerrainProfile, VoxelWorld};
use serde::{Deserialize, Serialize};
use std::{fs, path::Path};
use tracing::warn;

pub const DEFAULT_CONFIG_PATH: &str = "config/mirage.toml";

/// Scenario seed used when neither the config nor the command line sets one.
const DEFAULT_SEED: u64 = 0x4D49_5241_4745;

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct MirageConfig {
    pub search: SearchBounds,
    /// Registry name of the void platform block.
    pub platform_block: String,
    #[serde(rename = "dimension")]
    pub dimensions: Vec<DimensionConfig>,
    #[serde(rename = "book")]
    pub books: Vec<BookEntry>,
    pub scenario: ScenarioConfig,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct DimensionConfig {
    pub id: DimensionId,
    #[serde(default)]
    pub mirage: bool,
    #[serde(default)]
    pub subterranean: bool,
    #[serde(default = "default_height")]
    pub height: i32,
    #[serde(default)]
    pub terrain: TerrainProfile,
}

fn default_height() -> i32 {
    256
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct ScenarioConfig {
    pub seed: u64,
    /// Spawn column in the overworld; the player starts on the ground there.
    pub spawn: [f64; 2],
    /// Ticks between steps, recorded as the book-use tick.
    pub tick_interval: u64,
    #[serde(rename = "step")]
    pub steps: Vec<ScenarioStep>,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ScenarioStep {
    /// Direct teleport request to a dimension.
    Teleport { to: DimensionId },
    /// Use a book; without `book`, the one belonging to the current dimension.
    Book {
        #[serde(default)]
        book: Option<RegistryKey>,
    },
}

impl Default for ScenarioConfig {
    fn default() -> Self {
        let step = |path: &str| {
            DimensionId::parse(path)
                .map(|to| ScenarioStep::Teleport { to })
                .ok()
        };
        let book = || Some(ScenarioStep::Book { book: None });
        Self {
            seed: DEFAULT_SEED,
            spawn: [0.5, 0.5],
            tick_interval: 200,
            steps: [
                step("caveland"),
                book(),
                step("the_void"),
                book(),
                step("caveland"),
                step("frost_mountains"),
                book(),
            ]
            .into_iter()
            .flatten()
            .collect(),
        }
    }
}

impl Default for MirageConfig {
    fn default() -> Self {
        Self {
            search: SearchBounds::default(),
            platform_block: "mossy_cobblestone".to_string(),
            dimensions: default_dimensions(),
            books: DestinationTable::mirage_books().to_entries(),
            scenario: ScenarioConfig::default(),
        }
    }
}

fn default_dimensions() -> Vec<DimensionConfig> {
    let surface = |base_height, amplitude, sea_level| TerrainProfile::Surface {
        base_height,
        amplitude,
        sea_level,
    };
    let table = [
        ("overworld", false, false, 256, TerrainProfile::default()),
        (
            "caveland",
            true,
            true,
            128,
            TerrainProfile::Cavern {
                floor: 24,
                ceiling: 56,
            },
        ),
        (
            "cavenia",
            true,
            true,
            128,
            TerrainProfile::Cavern {
                floor: 32,
                ceiling: 72,
            },
        ),
        ("frost_mountains", true, false, 256, surface(96, 24.0, 40)),
        ("wide_desert", true, false, 256, surface(66, 3.0, 30)),
        ("the_void", true, false, 256, TerrainProfile::Void),
        ("dark_forest", true, false, 256, surface(70, 8.0, 60)),
        ("crown_cliffs", true, false, 256, surface(110, 30.0, 62)),
    ];

    table
        .into_iter()
        .filter_map(|(path, mirage, subterranean, height, terrain)| {
            Some(DimensionConfig {
                id: DimensionId::parse(path).ok()?,
                mirage,
                subterranean,
                height,
                terrain,
            })
        })
        .collect()
}

impl MirageConfig {
    /// Load from the default path, falling back to defaults on errors.
    pub fn load() -> Self {
        Self::load_from_path(Path::new(DEFAULT_CONFIG_PATH))
    }

    /// Load configuration from an explicit path, falling back to defaults on errors.
    pub fn load_from_path(path: &Path) -> Self {
        match fs::read_to_string(path) {
            Ok(contents) => match toml::from_str::<MirageConfig>(&contents) {
                Ok(cfg) => cfg,
                Err(err) => {
                    warn!("Failed to parse {}: {err}. Using defaults", path.display());
                    MirageConfig::default()
                }
            },
            Err(err) => {
                if err.kind() != std::io::ErrorKind::NotFound {
                    warn!("Failed to read {}: {err}. Using defaults", path.display());
                } else {
                    warn!(
                        "Mirage config not found at {}. Using defaults",
                        path.display()
                    );
                }
                MirageConfig::default()
            }
        }
    }

    /// Load configuration, returning errors to the caller.
    pub fn load_strict(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        let cfg = toml::from_str::<MirageConfig>(&contents)
            .with_context(|| format!("failed to parse {}", path.display()))?;
        cfg.platform_block_id()?;
        Ok(cfg)
    }

    /// Save configuration to an explicit path.
    pub fn save_to_path(&self, path: &Path) -> Result<()> {
        let toml = toml::to_string_pretty(self)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, toml)?;
        Ok(())
    }

    pub fn platform_block_id(&self) -> Result<BlockId> {
        block_id_by_name(&self.platform_block)
            .with_context(|| format!("unknown platform block `{}`", self.platform_block))
    }

    pub fn teleport_settings(&self) -> Result<TeleportSettings> {
        Ok(TeleportSettings {
            search: self.search.clone(),
            platform_block: self.platform_block_id()?,
            ..TeleportSettings::default()
        })
    }

    pub fn dimension_registry(&self) -> DimensionRegistry {
        DimensionRegistry::from_classes(self.dimensions.iter().map(|dimension| DimensionClass {
            id: dimension.id.clone(),
            mirage: dimension.mirage,
            subterranean: dimension.subterranean,
        }))
    }

    pub fn destinations(&self) -> DestinationTable {
        DestinationTable::from_entries(self.books.iter().cloned())
    }

    /// Empty world with every configured dimension registered.
    pub fn build_world(&self, seed: u64) -> VoxelWorld {
        let mut world = VoxelWorld::new(seed);
        for dimension in &self.dimensions {
            world.add_dimension(
                dimension.id.clone(),
                dimension.height,
                dimension.terrain.clone(),
            );
        }
        world
    }

    /// Seed to run with: the command line wins over the config file.
    pub fn effective_seed(&self, override_seed: Option<u64>) -> u64 {
        override_seed.unwrap_or(self.scenario.seed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mirage_core::{BlockPos, DimensionClassifier, WorldQuery};
    use tempfile::tempdir;

    #[test]
    fn default_config_roundtrips_through_toml() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join("mirage.toml");
        let cfg = MirageConfig::default();
        cfg.save_to_path(&path).unwrap();

        let loaded = MirageConfig::load_strict(&path).unwrap();
        assert_eq!(loaded, cfg);
        assert_eq!(loaded.books.len(), 7);
        assert_eq!(loaded.scenario.steps.len(), 7);
    }

    #[test]
    fn missing_or_broken_files_fall_back_to_defaults() {
        let dir = tempdir().unwrap();
        let missing = dir.path().join("absent.toml");
        assert_eq!(MirageConfig::load_from_path(&missing), MirageConfig::default());
        assert!(MirageConfig::load_strict(&missing).is_err());

        let broken = dir.path().join("broken.toml");
        fs::write(&broken, "search = [not toml").unwrap();
        assert_eq!(MirageConfig::load_from_path(&broken), MirageConfig::default());
        assert!(MirageConfig::load_strict(&broken).is_err());
    }

    #[test]
    fn partial_file_keeps_other_defaults() {
        let cfg: MirageConfig = toml::from_str(
            r#"
            platform_block = "stone"

            [search]
            radius = 12

            [[dimension]]
            id = "mirage:caveland"
            mirage = true
            subterranean = true
            height = 96
            terrain = { kind = "cavern", floor = 20, ceiling = 40 }

            [[scenario.step]]
            kind = "teleport"
            to = "mirage:caveland"

            [[scenario.step]]
            kind = "book"
            "#,
        )
        .unwrap();

        assert_eq!(cfg.search.radius, 12);
        assert_eq!(cfg.search.max_attempts, 50);
        assert_eq!(cfg.platform_block_id().unwrap(), mirage_world::BLOCK_STONE);
        assert_eq!(cfg.dimensions.len(), 1);
        assert_eq!(cfg.books.len(), 7);
        assert_eq!(cfg.scenario.seed, DEFAULT_SEED);
        assert_eq!(
            cfg.scenario.steps,
            vec![
                ScenarioStep::Teleport {
                    to: DimensionId::parse("caveland").unwrap()
                },
                ScenarioStep::Book { book: None },
            ]
        );

        let registry = cfg.dimension_registry();
        let caveland = DimensionId::parse("caveland").unwrap();
        assert!(registry.is_member_of_mirage_group(&caveland));
        assert!(registry.is_subterranean_style(&caveland));
    }

    #[test]
    fn shipped_config_parses() {
        let path = Path::new(env!("CARGO_MANIFEST_DIR")).join(DEFAULT_CONFIG_PATH);
        let cfg = MirageConfig::load_strict(&path).unwrap();
        assert_eq!(cfg.search, SearchBounds::default());
        assert_eq!(cfg.dimensions.len(), 4);
        assert_eq!(cfg.destinations().len(), 3);
        assert_eq!(cfg.scenario.seed, DEFAULT_SEED);
        assert_eq!(cfg.scenario.steps.len(), 6);
    }

    #[test]
    fn unknown_platform_block_is_rejected_strictly() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("mirage.toml");
        fs::write(&path, "platform_block = \"cheese\"").unwrap();
        let err = MirageConfig::load_strict(&path).unwrap_err();
        assert!(format!("{err:#}").contains("cheese"));
    }

    #[test]
    fn one_block_tall_surface_dimension_generates() {
        let cfg: MirageConfig = toml::from_str(
            r#"
            [[dimension]]
            id = "mirage:overworld"
            height = 1
            "#,
        )
        .unwrap();
        let mut world = cfg.build_world(3);
        let overworld = world.dimension_mut(&DimensionId::overworld()).unwrap();
        assert!(overworld.generate_around(BlockPos::new(0, 0, 0), 1) > 0);
        assert_eq!(overworld.height_limit(), 1);
        assert!(overworld.is_solid(BlockPos::new(0, 0, 0)));
    }

    #[test]
    fn build_world_registers_every_dimension() {
        let cfg = MirageConfig::default();
        let world = cfg.build_world(cfg.effective_seed(Some(9)));
        assert_eq!(world.seed(), 9);
        for dimension in &cfg.dimensions {
            assert!(world.dimension(&dimension.id).is_some(), "{}", dimension.id);
        }
    }
}
