use crate::utils::error::{Result, ShimError};
use std::path::{Path, PathBuf};

/// A prebuilt SDK library matching one OS/architecture pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlatformArtifact {
    pub os: &'static str,
    pub arch: &'static str,
    pub dir: &'static str,
    pub file_name: &'static str,
}

impl PlatformArtifact {
    pub fn relative_path(&self) -> PathBuf {
        Path::new(self.dir).join(self.file_name)
    }

    pub fn resolve(&self, dist_dir: &Path) -> PathBuf {
        dist_dir.join(self.relative_path())
    }
}

// macOS ships a single universal library for both architectures.
pub const ARTIFACTS: &[PlatformArtifact] = &[
    PlatformArtifact {
        os: "windows",
        arch: "x86",
        dir: "win32",
        file_name: "steam_api.dll",
    },
    PlatformArtifact {
        os: "windows",
        arch: "x86_64",
        dir: "win64",
        file_name: "steam_api64.dll",
    },
    PlatformArtifact {
        os: "linux",
        arch: "x86",
        dir: "linux32",
        file_name: "libsteam_api.so",
    },
    PlatformArtifact {
        os: "linux",
        arch: "x86_64",
        dir: "linux64",
        file_name: "libsteam_api.so",
    },
    PlatformArtifact {
        os: "macos",
        arch: "x86_64",
        dir: "osx",
        file_name: "libsteam_api.dylib",
    },
    PlatformArtifact {
        os: "macos",
        arch: "aarch64",
        dir: "osx",
        file_name: "libsteam_api.dylib",
    },
];

pub fn select(os: &str, arch: &str) -> Result<&'static PlatformArtifact> {
    ARTIFACTS
        .iter()
        .find(|artifact| artifact.os == os && artifact.arch == arch)
        .ok_or_else(|| ShimError::UnsupportedPlatform {
            os: os.to_string(),
            arch: arch.to_string(),
        })
}

/// Artifact for the running process.
pub fn current() -> Result<&'static PlatformArtifact> {
    select(std::env::consts::OS, std::env::consts::ARCH)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_select_supported_pairs() {
        let win64 = select("windows", "x86_64").unwrap();
        assert_eq!(win64.relative_path(), Path::new("win64").join("steam_api64.dll"));

        let linux64 = select("linux", "x86_64").unwrap();
        assert_eq!(
            linux64.resolve(Path::new("dist")),
            Path::new("dist").join("linux64").join("libsteam_api.so")
        );

        let arm = select("macos", "aarch64").unwrap();
        let intel = select("macos", "x86_64").unwrap();
        assert_eq!(arm.relative_path(), intel.relative_path());
    }

    #[test]
    fn test_exactly_five_artifacts() {
        let paths: HashSet<PathBuf> = ARTIFACTS.iter().map(|a| a.relative_path()).collect();
        assert_eq!(paths.len(), 5);
    }

    #[test]
    fn test_unsupported_pairs_fail() {
        for (os, arch) in [
            ("linux", "aarch64"),
            ("windows", "aarch64"),
            ("freebsd", "x86_64"),
            ("android", "arm"),
            ("macos", "x86"),
        ] {
            match select(os, arch) {
                Err(ShimError::UnsupportedPlatform { os: o, arch: a }) => {
                    assert_eq!(o, os);
                    assert_eq!(a, arch);
                }
                other => panic!("expected unsupported platform for {os}/{arch}, got {other:?}"),
            }
        }
    }
}
