use crate::file_util::{self, DEFAULT_HOMEDIR};
use fieldlab_domain::{flerr, to_fl, ErrorKind, FlResult};
use serde::{Deserialize, Serialize};
use std::{fs, path::PathBuf};

const CFG_DEFAULT: &str = r#"
    darkmode = false
    # current_db_path =
    # export_folder =
    "#;

pub fn get_default_cfg() -> Cfg {
    toml::from_str(CFG_DEFAULT).expect("default config broken")
}

pub fn get_cfg_path() -> FlResult<PathBuf> {
    Ok(dirs::home_dir()
        .ok_or_else(|| flerr!(Io, "where is your home? cannot load config"))?
        .join(".fieldlab")
        .join("fl_cfg.toml"))
}

pub fn get_cfg() -> FlResult<Cfg> {
    let cfg_toml_path = get_cfg_path()?;
    if cfg_toml_path.exists() {
        let toml_str = file_util::read_to_string(cfg_toml_path)?;
        toml::from_str(&toml_str).map_err(to_fl(ErrorKind::Decode))
    } else {
        Ok(get_default_cfg())
    }
}

pub fn write_cfg(cfg: &Cfg) -> FlResult<()> {
    let cfg_path = get_cfg_path()?;
    if let Some(cfg_parent) = cfg_path.parent() {
        fs::create_dir_all(cfg_parent).map_err(to_fl(ErrorKind::Io))?;
    }
    let cfg_str = toml::to_string_pretty(cfg).map_err(to_fl(ErrorKind::Encode))?;
    file_util::write(cfg_path, cfg_str)
}

pub fn get_log_folder() -> PathBuf {
    DEFAULT_HOMEDIR.join("logs")
}

#[derive(Deserialize, Serialize, Debug, Clone, Default, PartialEq, Eq)]
pub struct Cfg {
    /// database file opened on startup
    pub current_db_path: Option<String>,
    export_folder: Option<String>,
    pub darkmode: bool,
}

impl Cfg {
    pub fn export_folder(&self) -> FlResult<&str> {
        match self.export_folder.as_deref() {
            None => DEFAULT_HOMEDIR
                .to_str()
                .ok_or_else(|| flerr!(Io, "could not get homedir")),
            Some(ef) => Ok(ef),
        }
    }
}
