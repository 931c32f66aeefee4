// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Data directory resolution.

use std::path::{Path, PathBuf};

use tracing::warn;

const APP_DIR: &str = "labelwerk";

/// Return the application data directory, creating it if needed.
pub fn data_dir() -> PathBuf {
    let dir = resolve(|key| std::env::var(key).ok());
    if let Err(err) = std::fs::create_dir_all(&dir) {
        warn!(path = %dir.display(), error = %err, "cannot create data directory");
    }
    dir
}

/// `$XDG_DATA_HOME/labelwerk`, else `$HOME/.local/share/labelwerk`, else
/// `/tmp/labelwerk`.
pub fn resolve<F>(lookup: F) -> PathBuf
where
    F: Fn(&str) -> Option<String>,
{
    let non_empty = |key: &str| lookup(key).filter(|v| !v.is_empty());

    let base = if let Some(xdg) = non_empty("XDG_DATA_HOME") {
        PathBuf::from(xdg)
    } else if let Some(home) = non_empty("HOME") {
        Path::new(&home).join(".local").join("share")
    } else {
        PathBuf::from("/tmp")
    };
    base.join(APP_DIR)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn xdg_wins_over_home() {
        let dir = resolve(|key| match key {
            "XDG_DATA_HOME" => Some("/xdg".into()),
            "HOME" => Some("/home/u".into()),
            _ => None,
        });
        assert_eq!(dir, PathBuf::from("/xdg/labelwerk"));
    }

    #[test]
    fn home_then_tmp() {
        let dir = resolve(|key| (key == "HOME").then(|| "/home/u".to_string()));
        assert_eq!(dir, PathBuf::from("/home/u/.local/share/labelwerk"));

        assert_eq!(resolve(|_| None), PathBuf::from("/tmp/labelwerk"));
    }
}
