use std::fs;
use std::path::PathBuf;
use tracing::{error, info};

pub struct PortablePathManager;

impl PortablePathManager {
    /// Récupère le répertoire racine de l'application (là où se trouve l'exécutable).
    pub fn root_dir() -> PathBuf {
        let exe_dir = match std::env::current_exe() {
            Ok(mut path) => {
                path.pop(); // Enlève le nom de l'exécutable pour garder le dossier
                path
            }
            Err(e) => {
                error!(
                    "Failed to get current exe path: {}. Falling back to current_dir.",
                    e
                );
                return std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
            }
        };

        if cfg!(debug_assertions) {
            // In development the executable lives in target/debug at the workspace root
            let mut path = exe_dir.clone();
            path.pop(); // remove debug
            path.pop(); // remove target

            let core_path = path.join("apps").join("core");
            if core_path.exists() {
                return core_path;
            }
        }

        exe_dir
    }

    /// Récupère le répertoire de données principal (./data).
    pub fn data_dir() -> PathBuf {
        Self::root_dir().join("data")
    }

    /// Récupère le répertoire des modèles de stress (./data/models/mental_health).
    pub fn models_dir() -> PathBuf {
        Self::data_dir().join("models").join("mental_health")
    }

    /// Récupère le répertoire des journaux (./data/logs).
    pub fn logs_dir() -> PathBuf {
        Self::data_dir().join("logs")
    }

    /// Crée les dossiers passés en paramètre s'ils n'existent pas.
    pub fn ensure_dirs(dirs: &[&PathBuf]) -> Result<(), std::io::Error> {
        for dir in dirs {
            if !dir.exists() {
                info!("Creating directory: {:?}", dir);
                fs::create_dir_all(dir)?;
            }
        }
        Ok(())
    }
}
