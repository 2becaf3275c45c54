use std::{
    env,
    ffi::OsString,
    path::{
        Path,
        PathBuf,
    },
};

/// The set of temporary directories which are considered trash.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TempRoots {
    roots: Vec<PathBuf>,
}

impl TempRoots {
    /// Resolve the user scoped and the system wide temp directory of the current platform.
    pub fn from_env() -> Self {
        Self::from_candidates(platform_candidates(|key| env::var_os(key)))
    }

    /// Use an explicit list of roots instead of the platform defaults.
    pub fn from_paths<I: IntoIterator<Item = PathBuf>>(paths: I) -> Self {
        Self::from_candidates(paths.into_iter().map(Some).collect())
    }

    fn from_candidates(candidates: Vec<Option<PathBuf>>) -> Self {
        let mut roots: Vec<PathBuf> = Vec::with_capacity(candidates.len());
        for candidate in candidates.into_iter().flatten() {
            /* The same directory must never be counted twice, e.g. when TMPDIR=/tmp */
            let normalized = dunce::canonicalize(&candidate).unwrap_or(candidate);
            if roots.contains(&normalized) {
                continue;
            }

            roots.push(normalized);
        }

        Self { roots }
    }

    /// All configured roots, including the ones which currently do not exist.
    pub fn configured(&self) -> &[PathBuf] {
        &self.roots
    }

    /// All roots which currently exist as a directory.
    pub fn existing(&self) -> impl Iterator<Item = &Path> {
        self.roots.iter().map(PathBuf::as_path).filter(|root| {
            let exists = root.is_dir();
            if !exists {
                log::debug!("Skipping missing temp root {}", root.display());
            }
            exists
        })
    }

    pub fn len(&self) -> usize {
        self.roots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.roots.is_empty()
    }
}

#[cfg(windows)]
fn platform_candidates<F: Fn(&str) -> Option<OsString>>(lookup: F) -> Vec<Option<PathBuf>> {
    vec![
        non_empty(lookup("TEMP")).map(PathBuf::from),
        non_empty(lookup("WINDIR")).map(|windir| PathBuf::from(windir).join("Temp")),
    ]
}

#[cfg(not(windows))]
fn platform_candidates<F: Fn(&str) -> Option<OsString>>(lookup: F) -> Vec<Option<PathBuf>> {
    vec![
        non_empty(lookup("TMPDIR")).map(PathBuf::from),
        Some(PathBuf::from("/tmp")),
    ]
}

fn non_empty(value: Option<OsString>) -> Option<OsString> {
    value.filter(|value| !value.is_empty())
}
