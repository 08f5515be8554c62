use std::collections::HashMap;
use std::fs;
use std::path::{
  Path,
  PathBuf
};

use anyhow::{
  Context,
  anyhow
};
use tracing::{
  debug,
  info,
  trace,
  warn
};

use crate::rest::{
  DEFAULT_TABLE,
  RemoteSettings
};
use crate::task_panel::FlightPolicy;

const RC_FILE_NAME: &str =
  ".taskboardrc";

/// Environment variables folded in
/// after the rc file.
const ENV_KEYS: [(&str, &str); 2] = [
  ("TASKBOARD_URL", "remote.url"),
  ("TASKBOARD_KEY", "remote.key")
];

#[derive(Debug, Clone)]
pub struct Config {
  map: HashMap<String, String>,
  pub loaded_files: Vec<PathBuf>
}

impl Default for Config {
  fn default() -> Self {
    let mut map = HashMap::new();
    map.insert(
      "remote.table".to_string(),
      DEFAULT_TABLE.to_string()
    );
    map.insert(
      "panel.single_flight".to_string(),
      "off".to_string()
    );
    map.insert(
      "color".to_string(),
      "on".to_string()
    );

    Self {
      map,
      loaded_files: vec![]
    }
  }
}

impl Config {
  #[tracing::instrument(skip(
    rc_override
  ))]
  pub fn load(
    rc_override: Option<&Path>
  ) -> anyhow::Result<Self> {
    let mut cfg = Config::default();

    let rc = resolve_rc_path(
      rc_override
    )?;
    if let Some(path) = rc {
      info!(rc = %path.display(), "loading taskboardrc");
      cfg.load_file(&path)?;
    } else {
      warn!(
        "no taskboardrc found; using \
         defaults"
      );
    }

    cfg.apply_env(|key| {
      std::env::var(key).ok()
    });

    Ok(cfg)
  }

  /// Folds `TASKBOARD_URL` and
  /// `TASKBOARD_KEY` over the file
  /// values.
  pub fn apply_env<F>(
    &mut self,
    lookup: F
  ) where
    F: Fn(&str) -> Option<String>
  {
    for (var, key) in ENV_KEYS {
      if let Some(value) = lookup(var)
        && !value.trim().is_empty()
      {
        debug!(var, key, "applying environment override");
        self.map.insert(
          key.to_string(),
          value.trim().to_string()
        );
      }
    }
  }

  #[tracing::instrument(skip(
    self, overrides
  ))]
  pub fn apply_overrides<I>(
    &mut self,
    overrides: I
  ) where
    I: IntoIterator<
      Item = (String, String)
    >
  {
    for (k, v) in overrides {
      let key = k
        .strip_prefix("rc.")
        .unwrap_or(&k)
        .to_string();
      debug!(key = %key, "applying override");
      self.map.insert(key, v);
    }
  }

  pub fn get(
    &self,
    key: &str
  ) -> Option<String> {
    self.map.get(key).cloned()
  }

  pub fn get_bool(
    &self,
    key: &str
  ) -> Option<bool> {
    self
      .map
      .get(key)
      .map(|v| parse_bool(v))
  }

  pub fn remote_settings(
    &self
  ) -> anyhow::Result<RemoteSettings> {
    let url =
      self.get("remote.url").ok_or_else(
        || {
          anyhow!(
            "remote.url is not set; \
             configure it in \
             ~/.taskboardrc or \
             TASKBOARD_URL"
          )
        }
      )?;
    let api_key =
      self.get("remote.key").ok_or_else(
        || {
          anyhow!(
            "remote.key is not set; \
             configure it in \
             ~/.taskboardrc or \
             TASKBOARD_KEY"
          )
        }
      )?;
    let table = self
      .get("remote.table")
      .unwrap_or_else(|| {
        DEFAULT_TABLE.to_string()
      });

    Ok(RemoteSettings {
      url,
      api_key,
      table
    })
  }

  pub fn flight_policy(
    &self
  ) -> FlightPolicy {
    if self
      .get_bool("panel.single_flight")
      .unwrap_or(false)
    {
      FlightPolicy::SingleFlight
    } else {
      FlightPolicy::Unguarded
    }
  }

  pub fn color(&self) -> bool {
    self.get_bool("color").unwrap_or(true)
  }

  fn load_file(
    &mut self,
    path: &Path
  ) -> anyhow::Result<()> {
    self.load_nested(path, &mut Vec::new())
  }

  /// `chain` holds the canonical paths
  /// of the files currently being read,
  /// outermost first.
  #[tracing::instrument(skip(
    self, chain
  ))]
  fn load_nested(
    &mut self,
    path: &Path,
    chain: &mut Vec<PathBuf>
  ) -> anyhow::Result<()> {
    let path = expand_tilde(path);
    let canonical =
      fs::canonicalize(&path)
        .unwrap_or_else(|_| path.clone());
    if chain.contains(&canonical) {
      warn!(
          file = %path.display(),
          "include cycle; skipping"
      );
      return Ok(());
    }

    let text =
      fs::read_to_string(&path)
        .with_context(|| {
          format!(
            "failed to read {}",
            path.display()
          )
        })?;

    self
      .loaded_files
      .push(path.clone());

    let base_dir = path
      .parent()
      .map(|p| p.to_path_buf())
      .unwrap_or_else(|| {
        PathBuf::from(".")
      });

    for (line_num, raw_line) in
      text.lines().enumerate()
    {
      let mut line = raw_line.trim();
      if let Some((before, _)) =
        line.split_once('#')
      {
        line = before.trim();
      }

      if line.is_empty() {
        continue;
      }

      if let Some(include_rest) =
        line.strip_prefix("include ")
      {
        let include_path =
          resolve_include_path(
            &base_dir,
            include_rest.trim()
          )?;
        debug!(
            file = %path.display(),
            include = %include_path.display(),
            line = line_num + 1,
            "processing include"
        );

        if include_path.exists() {
          chain.push(canonical.clone());
          self.load_nested(
            &include_path,
            chain
          )?;
          chain.pop();
        } else {
          warn!(include = %include_path.display(), "include file does not exist; skipping");
        }
        continue;
      }

      let (k, v) = line
        .split_once('=')
        .ok_or_else(|| {
          anyhow!(
            "invalid config line \
             {}:{}: {}",
            path.display(),
            line_num + 1,
            raw_line
          )
        })?;

      let key = k.trim().to_string();
      let value = v.trim().to_string();
      trace!(key = %key, "loaded config key");
      self.map.insert(key, value);
    }

    Ok(())
  }
}

#[tracing::instrument(skip(
  override_path
))]
fn resolve_rc_path(
  override_path: Option<&Path>
) -> anyhow::Result<Option<PathBuf>> {
  if let Some(path) = override_path {
    return Ok(Some(path.to_path_buf()));
  }

  if let Ok(rc_env) =
    std::env::var("TASKBOARDRC")
  {
    if rc_env == "/dev/null" {
      return Ok(None);
    }
    return Ok(Some(PathBuf::from(
      rc_env
    )));
  }

  let Some(home) = dirs::home_dir()
  else {
    warn!(
      "cannot determine home \
       directory; skipping \
       taskboardrc lookup"
    );
    return Ok(None);
  };
  let candidate = home.join(RC_FILE_NAME);
  if candidate.exists() {
    return Ok(Some(candidate));
  }

  Ok(None)
}

fn resolve_include_path(
  base_dir: &Path,
  include: &str
) -> anyhow::Result<PathBuf> {
  if include.trim().is_empty() {
    return Err(anyhow!(
      "include path cannot be empty"
    ));
  }

  let raw = PathBuf::from(include);
  let expanded = expand_tilde(&raw);
  if expanded.is_absolute() {
    Ok(expanded)
  } else {
    Ok(base_dir.join(expanded))
  }
}

fn expand_tilde(
  path: &Path
) -> PathBuf {
  let text = path.to_string_lossy();
  if let Some(rest) =
    text.strip_prefix("~/")
    && let Some(home) = dirs::home_dir()
  {
    return home.join(rest);
  }
  path.to_path_buf()
}

fn parse_bool(s: &str) -> bool {
  matches!(
    s.trim()
      .to_ascii_lowercase()
      .as_str(),
    "1" | "y" | "yes" | "on" | "true"
  )
}
