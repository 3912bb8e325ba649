use std::{
    collections::HashMap,
    env,
    fs,
    io::{BufRead, BufReader},
    path::{Path, PathBuf},
    time::Duration,
};

use directories::BaseDirs;

#[derive(Debug, Clone)]
pub struct Config {
    inner: HashMap<String, String>,
    pub config_path: PathBuf,
}

impl Config {
    pub fn load() -> Self {
        Self::load_from(&default_config_path())
    }

    /// Load defaults, then the rc file at `path` (if any), then the environment.
    pub fn load_from(path: &Path) -> Self {
        let mut map = default_map();
        read_rc_file(path, &mut map);

        // Overlay environment variables (take precedence)
        for (k, v) in env::vars() {
            if is_config_key(&k) {
                map.insert(k, v);
            }
        }

        Self { inner: map, config_path: path.to_path_buf() }
    }

    pub fn get(&self, key: &str) -> Option<String> {
        self.inner.get(key).cloned()
    }

    pub fn set(&mut self, key: &str, value: impl Into<String>) {
        self.inner.insert(key.to_string(), value.into());
    }

    pub fn get_u64(&self, key: &str) -> Option<u64> {
        self.get(key).and_then(|v| v.trim().parse::<u64>().ok())
    }

    pub fn get_list(&self, key: &str) -> Vec<u32> {
        self.get(key).map(|v| parse_list(&v)).unwrap_or_default()
    }

    pub fn port(&self) -> u16 {
        self.get("NGCCM_PORT")
            .and_then(|v| v.trim().parse::<u16>().ok())
            .unwrap_or(DEFAULT_PORT)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.get_u64("NGCCM_TIMEOUT").unwrap_or(DEFAULT_TIMEOUT_SECS))
    }

    /// Program and leading arguments used to launch the ngccm tool.
    pub fn tool(&self) -> (String, Vec<String>) {
        let raw = self.get("NGCCM_TOOL").unwrap_or_else(|| DEFAULT_TOOL.into());
        let mut parts = raw.split_whitespace().map(str::to_string);
        match parts.next() {
            Some(program) => (program, parts.collect()),
            None => (DEFAULT_TOOL.to_string(), Vec::new()),
        }
    }
}

pub const DEFAULT_TOOL: &str = "ngccm";
pub const DEFAULT_PORT: u16 = 64000;
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Merge the `KEY=value` lines of the rc file at `path` into `map`, if it exists.
fn read_rc_file(path: &Path, map: &mut HashMap<String, String>) {
    let Ok(file) = fs::File::open(path) else {
        return;
    };
    let reader = BufReader::new(file);
    for line in reader.lines().map_while(Result::ok) {
        if let Some((k, v)) = parse_line(&line) {
            map.insert(k, v);
        }
    }
}

fn parse_line(line: &str) -> Option<(String, String)> {
    let line = line.trim();
    if line.is_empty() || line.starts_with('#') {
        return None;
    }
    line.split_once('=')
        .map(|(k, v)| (k.trim().to_string(), v.trim().to_string()))
}

/// Parse a comma-separated list of numbers, skipping anything that does not parse.
pub fn parse_list(v: &str) -> Vec<u32> {
    v.split(',')
        .filter_map(|s| s.trim().parse::<u32>().ok())
        .collect()
}

fn is_config_key(k: &str) -> bool {
    const KEYS: &[&str] = &["TESTSTAND_NAME", "FE_CRATES", "TEMP_SLOTS"];

    KEYS.contains(&k) || k.starts_with("NGCCM_")
}

fn default_config_path() -> PathBuf {
    let base = BaseDirs::new()
        .map(|b| b.config_dir().to_path_buf())
        .unwrap_or_else(|| PathBuf::from("~/.config"));
    base.join("ngccmctl").join(".ngccmrc")
}

fn default_map() -> HashMap<String, String> {
    let mut m = HashMap::new();
    m.insert("NGCCM_TOOL".into(), DEFAULT_TOOL.into());
    m.insert("NGCCM_PORT".into(), DEFAULT_PORT.to_string());
    m.insert("NGCCM_TIMEOUT".into(), DEFAULT_TIMEOUT_SECS.to_string());
    m.insert("TESTSTAND_NAME".into(), "hf".into());
    m.insert("FE_CRATES".into(), "1".into());
    m.insert("TEMP_SLOTS".into(), "1".into());
    m
}
