use std::{collections::HashMap, env, fs, path::PathBuf, str::FromStr};

use derive_deref::{Deref, DerefMut};
use directories::BaseDirs;
use lazy_static::lazy_static;
use serde::{Deserialize, de::Deserializer};

use crate::builder::{BuilderSettings, MenuAction};
use crate::core::types::AggFunc;
use crate::panel::FilterMode;

const CONFIG: &str = include_str!("../.config/config.json5");

#[derive(Clone, Debug, Deserialize, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub data_dir: PathBuf,
    #[serde(default)]
    pub config_dir: PathBuf,
}

#[derive(Clone, Debug, Default, Deserialize)]
pub struct PivotSettings {
    #[serde(default)]
    pub default_agg_func: AggFunc,
}

#[derive(Clone, Debug, Default, Deserialize)]
pub struct FilterSettings {
    #[serde(default)]
    pub default_mode: FilterMode,
}

#[derive(Clone, Debug, Default, Deserialize)]
pub struct Config {
    #[serde(default, flatten)]
    pub config: AppConfig,
    /// Report store directory; `<data_dir>/store` when unset
    #[serde(default)]
    pub store_dir: Option<PathBuf>,
    #[serde(default)]
    pub pivot: PivotSettings,
    #[serde(default)]
    pub filter: FilterSettings,
    #[serde(default)]
    pub menu_labels: MenuLabels,
}

lazy_static! {
    pub static ref PROJECT_NAME: String = env!("CARGO_CRATE_NAME").to_uppercase().to_string();
    pub static ref DATA_FOLDER: Option<PathBuf> =
        env::var(format!("{}_DATA", PROJECT_NAME.clone()))
            .ok()
            .map(PathBuf::from);
    pub static ref CONFIG_FOLDER: Option<PathBuf> =
        env::var(format!("{}_CONFIG", PROJECT_NAME.clone()))
            .ok()
            .map(PathBuf::from);
}

impl Config {
    pub fn from_path(config_path: Option<&PathBuf>) -> Result<Self, config::ConfigError> {
        let default_config: Config =
            json5::from_str(CONFIG).map_err(|e| config::ConfigError::Message(e.to_string()))?;
        let data_dir = get_data_dir();
        let config_dir = get_config_dir();
        let mut builder = config::Config::builder()
            .set_default("data_dir", data_dir.to_string_lossy().to_string())?
            .set_default("config_dir", config_dir.to_string_lossy().to_string())?;

        let home_cfg = default_home_config_path();
        let selected_path = if let Some(p) = config_path {
            expand_tilde(p)
        } else {
            // First run: seed ~/.reportbuilder-config.json5 with the embedded defaults
            if !home_cfg.exists() {
                if let Some(parent) = home_cfg.parent() {
                    let _ = fs::create_dir_all(parent);
                }
                let _ = fs::write(&home_cfg, CONFIG);
            }
            home_cfg
        };

        builder = builder.add_source(
            config::File::from(selected_path).format(config::FileFormat::Json5).required(true),
        );

        let mut cfg: Self = builder.build()?.try_deserialize()?;

        for (action, label) in default_config.menu_labels.iter() {
            cfg.menu_labels.entry(*action).or_insert_with(|| label.clone());
        }

        Ok(cfg)
    }

    pub fn store_dir(&self) -> PathBuf {
        self.store_dir
            .as_ref()
            .map(expand_tilde)
            .unwrap_or_else(|| self.config.data_dir.join("store"))
    }
}

impl From<&Config> for BuilderSettings {
    fn from(config: &Config) -> Self {
        Self {
            default_agg_func: config.pivot.default_agg_func,
            filter_mode: config.filter.default_mode,
            menu_labels: config.menu_labels.0.clone(),
        }
    }
}

fn expand_tilde(path: &PathBuf) -> PathBuf {
    if let Some(s) = path.to_str() {
        if s.starts_with('~') {
            if let Some(base) = BaseDirs::new() {
                return PathBuf::from(s.replacen('~', base.home_dir().to_str().unwrap_or(""), 1));
            }
        }
    }
    path.clone()
}

fn default_home_config_path() -> PathBuf {
    if let Some(base) = BaseDirs::new() {
        return base.home_dir().join(".reportbuilder-config.json5");
    }
    PathBuf::from(".reportbuilder-config.json5")
}

pub fn get_data_dir() -> PathBuf {
    if let Some(s) = DATA_FOLDER.clone() {
        s
    } else {
        PathBuf::from(".").join(".data")
    }
}

pub fn get_config_dir() -> PathBuf {
    if let Some(s) = CONFIG_FOLDER.clone() {
        s
    } else {
        PathBuf::from(".").join(".config")
    }
}

/// Menu label overrides keyed by menu action id
#[derive(Clone, Debug, Default, Deref, DerefMut)]
pub struct MenuLabels(pub HashMap<MenuAction, String>);

impl<'de> Deserialize<'de> for MenuLabels {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let parsed_map = HashMap::<String, String>::deserialize(deserializer)?;

        let labels = parsed_map
            .into_iter()
            .map(|(id, label)| {
                MenuAction::from_str(&id)
                    .map(|action| (action, label))
                    .map_err(serde::de::Error::custom)
            })
            .collect::<Result<HashMap<_, _>, _>>()?;

        Ok(MenuLabels(labels))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::ClientAction;
    use crate::core::models::LifecycleAction;
    use pretty_assertions::assert_eq;
    use std::io::Write;

    fn write_config(contents: &str) -> (tempfile::TempDir, PathBuf) {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json5");
        let mut file = fs::File::create(&path).unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        (dir, path)
    }

    #[test]
    fn test_embedded_defaults_parse() {
        let cfg: Config = json5::from_str(CONFIG).unwrap();
        assert_eq!(cfg.pivot.default_agg_func, AggFunc::Sum);
        assert_eq!(cfg.filter.default_mode, FilterMode::Basic);
        assert_eq!(cfg.menu_labels.len(), 12);
    }

    #[test]
    fn test_user_file_overrides_and_defaults_fill_in() {
        let (_dir, path) = write_config(
            r#"{
                store_dir: "/tmp/reports",
                pivot: { default_agg_func: "count" },
                filter: { default_mode: "advanced" },
                menu_labels: { save_as: "Save a copy" },
            }"#,
        );
        let cfg = Config::from_path(Some(&path)).unwrap();

        assert_eq!(cfg.pivot.default_agg_func, AggFunc::Count);
        assert_eq!(cfg.filter.default_mode, FilterMode::Advanced);
        assert_eq!(cfg.store_dir(), PathBuf::from("/tmp/reports"));

        let settings = BuilderSettings::from(&cfg);
        assert_eq!(settings.default_agg_func, AggFunc::Count);
        assert_eq!(settings.filter_mode, FilterMode::Advanced);
        let label = |action: MenuAction| settings.menu_labels.get(&action).map(String::as_str);
        assert_eq!(label(MenuAction::Client(ClientAction::SaveAs)), Some("Save a copy"));
        assert_eq!(label(MenuAction::Server(LifecycleAction::Publish)), Some("Publish"));
    }

    #[test]
    fn test_unknown_menu_label_is_an_error() {
        let (_dir, path) = write_config(r#"{ menu_labels: { launch: "Go" } }"#);
        assert!(Config::from_path(Some(&path)).is_err());
    }

    #[test]
    fn test_store_dir_defaults_under_data_dir() {
        let (_dir, path) = write_config("{}");
        let cfg = Config::from_path(Some(&path)).unwrap();
        assert_eq!(cfg.store_dir(), cfg.config.data_dir.join("store"));
    }
}
