//! Rover configuration file – reads/writes `~/.rover/config.toml`.
//!
//! ```toml
//! [perception]
//! grid_size = 200
//! scale = 10.0
//!
//! [runtime]
//! tick_hz = 10.0
//! max_ticks = 50
//! yaw_rate_deg = 0.0
//! start_pose = { x = 100.0, y = 100.0, yaw_deg = 0.0 }
//!
//! [camera]
//! id = "front_rgb"
//! horizon = 90
//! ```
//!
//! Every section and field is optional; missing values take their defaults.

use std::fs;
use std::path::{Path, PathBuf};

use rover_perception::PerceptionConfig;
use rover_runtime::tick_period;
use rover_types::{Pose, RoverError};
use serde::{Deserialize, Serialize};

/// Loop timing and the pose the rover starts from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RuntimeConfig {
    pub tick_hz: f64,
    /// Stop after this many ticks; run until Ctrl-C when absent.
    pub max_ticks: Option<u64>,
    /// Heading change applied to the simulated pose every tick (degrees).
    pub yaw_rate_deg: f64,
    pub start_pose: Pose,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            tick_hz: 10.0,
            max_ticks: Some(50),
            yaw_rate_deg: 0.0,
            start_pose: Pose::new(100.0, 100.0, 0.0),
        }
    }
}

/// Yellow sample patch painted into the simulated frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TargetPatchConfig {
    pub row: u32,
    pub col: u32,
    pub size: u32,
}

/// Simulated camera scene.  Frame dimensions come from `[perception]`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraConfig {
    pub id: String,
    pub horizon: u32,
    pub target: Option<TargetPatchConfig>,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            id: "front_rgb".to_string(),
            horizon: 90,
            target: Some(TargetPatchConfig {
                row: 110,
                col: 150,
                size: 8,
            }),
        }
    }
}

/// Persisted configuration stored in `~/.rover/config.toml`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub perception: PerceptionConfig,
    pub runtime: RuntimeConfig,
    pub camera: CameraConfig,
}

/// Return the path to `~/.rover/config.toml`.
pub fn config_path() -> PathBuf {
    config_path_for_home(
        &std::env::var("HOME")
            .or_else(|_| std::env::var("USERPROFILE"))
            .unwrap_or_else(|_| ".".to_string()),
    )
}

pub(crate) fn config_path_for_home(home: &str) -> PathBuf {
    PathBuf::from(home).join(".rover").join("config.toml")
}

/// Load the config from disk.  Returns `None` if the file does not exist.
pub fn load() -> Result<Option<Config>, RoverError> {
    load_from(&config_path())
}

/// Load, apply environment overrides and validate.
pub(crate) fn load_from(path: &Path) -> Result<Option<Config>, RoverError> {
    if !path.exists() {
        return Ok(None);
    }
    let raw = fs::read_to_string(path).map_err(|e| {
        RoverError::Config(format!("failed to read {}: {e}", path.display()))
    })?;
    let mut cfg: Config = toml::from_str(&raw)
        .map_err(|e| RoverError::Config(format!("failed to parse {}: {e}", path.display())))?;
    apply_env_overrides(&mut cfg);
    cfg.perception.validate()?;
    tick_period(cfg.runtime.tick_hz)?;
    Ok(Some(cfg))
}

/// Apply `ROVER_*` environment variable overrides to `cfg`.
///
/// Values that do not parse are ignored.
///
/// | Variable | Config field |
/// |---|---|
/// | `ROVER_GRID_SIZE` | `perception.grid_size` |
/// | `ROVER_SCALE` | `perception.scale` |
/// | `ROVER_TICK_HZ` | `runtime.tick_hz` |
/// | `ROVER_MAX_TICKS` | `runtime.max_ticks` |
pub fn apply_env_overrides(cfg: &mut Config) {
    if let Some(size) = env_parse::<usize>("ROVER_GRID_SIZE") {
        cfg.perception.grid_size = size;
    }
    if let Some(scale) = env_parse::<f64>("ROVER_SCALE") {
        cfg.perception.scale = scale;
    }
    if let Some(hz) = env_parse::<f64>("ROVER_TICK_HZ") {
        cfg.runtime.tick_hz = hz;
    }
    if let Some(max) = env_parse::<u64>("ROVER_MAX_TICKS") {
        cfg.runtime.max_ticks = Some(max);
    }
}

fn env_parse<T: std::str::FromStr>(name: &str) -> Option<T> {
    std::env::var(name).ok()?.trim().parse().ok()
}

/// Save the config to disk, creating `~/.rover/` if necessary.
pub fn save(cfg: &Config) -> Result<(), RoverError> {
    save_to(cfg, &config_path())
}

pub(crate) fn save_to(cfg: &Config, path: &Path) -> Result<(), RoverError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .map_err(|e| RoverError::Config(format!("failed to create config directory: {e}")))?;
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            fs::set_permissions(parent, fs::Permissions::from_mode(0o700)).map_err(|e| {
                RoverError::Config(format!("failed to set config directory permissions: {e}"))
            })?;
        }
    }
    let raw = toml::to_string_pretty(cfg)
        .map_err(|e| RoverError::Config(format!("failed to serialize config: {e}")))?;
    let write_err = |e: std::io::Error| {
        RoverError::Config(format!("failed to write {}: {e}", path.display()))
    };
    #[cfg(unix)]
    {
        use std::io::Write;
        use std::os::unix::fs::OpenOptionsExt;
        fs::OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(true)
            .mode(0o600)
            .open(path)
            .and_then(|mut f| f.write_all(raw.as_bytes()))
            .map_err(write_err)?;
    }
    #[cfg(not(unix))]
    fs::write(path, raw).map_err(write_err)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[cfg(unix)]
    #[test]
    fn config_file_is_owner_only() {
        use std::os::unix::fs::PermissionsExt;
        let dir = tempfile::tempdir().expect("tmp dir");
        let path = config_path_for_home(&dir.path().to_string_lossy());

        save_to(&Config::default(), &path).expect("save");

        let file_mode = std::fs::metadata(&path).expect("file").permissions().mode() & 0o777;
        assert_eq!(file_mode, 0o600);
        let dir_mode = std::fs::metadata(path.parent().unwrap())
            .expect("dir")
            .permissions()
            .mode()
            & 0o777;
        assert_eq!(dir_mode, 0o700);
    }

    #[test]
    fn roundtrip_default_config() {
        let dir = tempfile::tempdir().expect("tmp dir");
        let path = config_path_for_home(&dir.path().to_string_lossy());

        save_to(&Config::default(), &path).expect("save");
        let loaded = load_from(&path).expect("load ok").expect("some");

        assert_eq!(loaded.perception.dest_quad(), PerceptionConfig::default().dest_quad());
        assert_eq!(loaded.runtime.start_pose, Pose::new(100.0, 100.0, 0.0));
        assert_eq!(loaded.camera.horizon, 90);
    }

    #[test]
    fn partial_file_keeps_defaults() {
        let dir = tempfile::tempdir().expect("tmp dir");
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[runtime]\ntick_hz = 4.0\n\n[camera]\nhorizon = 70\n")
            .expect("write");

        let cfg = load_from(&path).expect("load ok").expect("some");
        assert!((cfg.runtime.tick_hz - 4.0).abs() < f64::EPSILON);
        assert_eq!(cfg.runtime.start_pose, RuntimeConfig::default().start_pose);
        assert_eq!(cfg.camera.horizon, 70);
        assert_eq!(cfg.camera.id, "front_rgb");
        assert_eq!(cfg.perception.source_quad, PerceptionConfig::default().source_quad);
    }

    #[test]
    fn invalid_perception_section_is_rejected() {
        let dir = tempfile::tempdir().expect("tmp dir");
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[perception]\nscale = -1.0\n").expect("write");

        assert!(matches!(load_from(&path), Err(RoverError::Config(_))));
    }

    #[test]
    fn unusable_tick_rate_is_rejected_at_load() {
        let dir = tempfile::tempdir().expect("tmp dir");
        for hz in ["1e20", "1e-30"] {
            let path = dir.path().join(format!("config-{hz}.toml"));
            std::fs::write(&path, format!("[runtime]\ntick_hz = {hz}\n")).expect("write");
            assert!(matches!(load_from(&path), Err(RoverError::Config(_))));
        }
    }

    #[test]
    fn frame_size_alone_moves_rectification_target() {
        let dir = tempfile::tempdir().expect("tmp dir");
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[perception]\nframe_width = 640\nframe_height = 480\n")
            .expect("write");

        let cfg = load_from(&path).expect("load ok").expect("some");
        assert_eq!(cfg.perception.dest_quad()[0], [315.0, 474.0]);
    }

    #[test]
    fn malformed_toml_is_a_config_error() {
        let dir = tempfile::tempdir().expect("tmp dir");
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[runtime\n").expect("write");

        let err = load_from(&path).unwrap_err();
        assert!(err.to_string().contains("failed to parse"));
    }

    #[test]
    fn config_path_points_to_rover_dir() {
        let p = config_path_for_home("/home/testuser");
        assert_eq!(p, PathBuf::from("/home/testuser/.rover/config.toml"));
    }

    #[test]
    fn load_from_returns_none_when_missing() {
        let dir = tempfile::tempdir().expect("tmp dir");
        let path = config_path_for_home(&dir.path().to_string_lossy());
        assert!(load_from(&path).expect("no error").is_none());
    }

    #[test]
    fn apply_env_overrides_changes_grid_size() {
        // SAFETY: single-threaded test; no data races on env vars.
        unsafe { std::env::set_var("ROVER_GRID_SIZE", "64") };
        let mut cfg = Config::default();
        apply_env_overrides(&mut cfg);
        assert_eq!(cfg.perception.grid_size, 64);
        unsafe { std::env::remove_var("ROVER_GRID_SIZE") };
    }

    #[test]
    fn apply_env_overrides_changes_max_ticks() {
        // SAFETY: single-threaded test; no data races on env vars.
        unsafe { std::env::set_var("ROVER_MAX_TICKS", "3") };
        let mut cfg = Config::default();
        apply_env_overrides(&mut cfg);
        assert_eq!(cfg.runtime.max_ticks, Some(3));
        unsafe { std::env::remove_var("ROVER_MAX_TICKS") };
    }

    #[test]
    fn apply_env_overrides_ignores_invalid_scale() {
        // SAFETY: single-threaded test; no data races on env vars.
        unsafe { std::env::set_var("ROVER_SCALE", "ten") };
        let mut cfg = Config::default();
        apply_env_overrides(&mut cfg);
        assert!((cfg.perception.scale - 10.0).abs() < f64::EPSILON);
        unsafe { std::env::remove_var("ROVER_SCALE") };
    }
}
