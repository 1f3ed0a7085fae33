use crate::checksum_verifier::ChecksumVerifier;
use crate::config::JvmConfig;
use crate::error::ESResult;
use crate::foojay::{
    ArchiveType, FoojayDiscoApi, FoojayDiscoApiError, FoojayPackageInfo, FoojayPackageListInfo,
};
use crate::http_client::new_http_client;
use crate::java_version::JavaVersion;
use crate::jdk_manager::{Jdk, JdkManager, JdkManagerError, Provider};
use crate::progress::new_progress_bar;
use crate::release_file_parser::read_release_java_version;
use error_stack::{Report, ResultExt};
use indicatif::ProgressBar;
use itertools::Itertools;
use sha2::Sha256;
use std::collections::HashSet;
use std::io::BufWriter;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Provider of JDKs installed by this tool.
pub const MANAGED_PROVIDER: &str = "jvm";
/// Provider of the JDK pointed to by `JAVA_HOME`.
pub const JAVA_HOME_PROVIDER: &str = "javahome";

pub struct LocalJdkManager {
    config: JvmConfig,
    install_dir: PathBuf,
    foojay: FoojayDiscoApi,
    client: ureq::Agent,
    quiet: bool,
}

impl LocalJdkManager {
    pub fn new(config: JvmConfig, quiet: bool) -> Self {
        let install_dir = config.install_dir();
        Self {
            config,
            install_dir,
            foojay: FoojayDiscoApi::new(),
            client: new_http_client(),
            quiet,
        }
    }

    fn list_managed_jdks(&self) -> ESResult<Vec<Jdk>, JdkManagerError> {
        list_jdks_in(&self.install_dir)
    }

    fn java_home_jdk(&self) -> Option<Jdk> {
        let home = PathBuf::from(std::env::var_os("JAVA_HOME").filter(|h| !h.is_empty())?);
        let canonical_home = home.canonicalize().ok()?;
        if let Ok(install_dir) = self.install_dir.canonicalize() {
            if canonical_home.starts_with(install_dir) {
                // Already listed as a managed JDK.
                return None;
            }
        }
        let version = read_jdk_version(&home)?;
        Some(Jdk {
            version,
            id: JAVA_HOME_PROVIDER.to_string(),
            provider: JAVA_HOME_PROVIDER.to_string(),
            home,
        })
    }

    fn to_available_jdk(&self, package: FoojayPackageListInfo) -> Jdk {
        let id = managed_id(package.java_version.major(), &package.distribution);
        Jdk {
            home: self.install_dir.join(&id),
            version: package.java_version,
            id,
            provider: MANAGED_PROVIDER.to_string(),
        }
    }

    fn download_and_unpack(
        &self,
        package: &FoojayPackageListInfo,
        info: &FoojayPackageInfo,
        target: &Path,
    ) -> ESResult<(), JdkManagerError> {
        std::fs::create_dir_all(&self.install_dir)
            .change_context(JdkManagerError::Install)
            .attach_with(|| {
                format!("Could not create install directory {}", self.install_dir.display())
            })?;
        let temp_dir = tempfile::Builder::new()
            .prefix(".jdk-download")
            .tempdir_in(&self.install_dir)
            .change_context(JdkManagerError::Install)
            .attach("Failed to create temporary directory")?;

        let archive_path = temp_dir.path().join("archive");
        download_verified(
            &self.client,
            &info.direct_download_uri,
            &info.checksum,
            &archive_path,
            self.quiet,
        )?;

        let unpack_dir = temp_dir.path().join("unpacked");
        if !self.quiet {
            eprintln!("Unpacking {}...", package.java_version);
        }
        match package.archive_type {
            ArchiveType::TarGz => unpack_tar_gz(&archive_path, &unpack_dir),
            ArchiveType::Zip => unpack_zip(&archive_path, &unpack_dir),
            ArchiveType::Unknown(ref archive_type) => Err(Report::new(JdkManagerError::Install)
                .attach(format!("Don't know how to unpack {}", archive_type))),
        }?;

        let from_dir = single_child_dir(&unpack_dir)?.unwrap_or(unpack_dir);
        if target.exists() {
            debug!("Replacing existing JDK at {}", target.display());
            std::fs::remove_dir_all(target)
                .change_context(JdkManagerError::Install)
                .attach_with(|| format!("Unable to clean JDK folder ({})", target.display()))?;
        }
        std::fs::rename(&from_dir, target)
            .change_context(JdkManagerError::Install)
            .attach_with(|| format!("Unable to move to JDK folder ({})", target.display()))?;
        temp_dir
            .close()
            .change_context(JdkManagerError::Install)
            .attach("Failed to cleanup temporary directory")?;
        Ok(())
    }
}

impl JdkManager for LocalJdkManager {
    fn list_installed_jdks(&self) -> ESResult<Vec<Jdk>, JdkManagerError> {
        let mut jdks = self.list_managed_jdks()?;
        jdks.extend(self.java_home_jdk());
        Ok(jdks)
    }

    fn list_available_jdks(&self) -> ESResult<Vec<Jdk>, JdkManagerError> {
        let mut seen = HashSet::new();
        let mut jdks = Vec::new();
        for distribution in &self.config.distributions {
            let packages = self
                .foojay
                .list_latest_packages(&self.config, distribution)
                .change_context(JdkManagerError::Discovery)
                .attach_with(|| format!("Failed to list packages of {}", distribution))?;
            for package in packages {
                let jdk = self.to_available_jdk(package);
                // Several archive types of the same build may be listed.
                if seen.insert(jdk.id.clone()) {
                    jdks.push(jdk);
                }
            }
        }
        Ok(jdks)
    }

    fn list_providers(&self, install_root: &Path) -> Vec<Provider> {
        vec![
            Provider {
                name: MANAGED_PROVIDER.to_string(),
                description: format!(
                    "JDKs installed in {} from the Foojay Disco API (distributions: {})",
                    install_root.display(),
                    self.config.distributions.iter().join(", ")
                ),
            },
            Provider {
                name: JAVA_HOME_PROVIDER.to_string(),
                description: "The JDK pointed to by the JAVA_HOME environment variable"
                    .to_string(),
            },
        ]
    }

    fn install(&self, jdk: &Jdk) -> ESResult<Jdk, JdkManagerError> {
        if !self.can_update(jdk) {
            return Err(Report::new(JdkManagerError::Install)
                .attach(format!("JDKs from '{}' cannot be installed", jdk.provider)));
        }
        let Some((major, distribution)) = parse_managed_id(&jdk.id) else {
            return Err(Report::new(JdkManagerError::Install)
                .attach(format!("Not a managed JDK id: {}", jdk.id)));
        };
        if !self.quiet {
            eprintln!("Looking up latest build of {}...", jdk.id);
        }
        let (package, info) = self
            .foojay
            .get_latest_package_info(&self.config, distribution, major)
            .map_err(package_lookup_error)
            .attach_with(|| format!("JDK: {}", jdk.id))?;

        let target = self.install_dir.join(&jdk.id);
        self.download_and_unpack(&package, &info, &target)?;

        let home = jdk_home(&target);
        let version = read_jdk_version(&home).unwrap_or(package.java_version);
        Ok(Jdk {
            version,
            id: jdk.id.clone(),
            provider: MANAGED_PROVIDER.to_string(),
            home,
        })
    }

    fn uninstall_jdk(&self, jdk: &Jdk) -> ESResult<(), JdkManagerError> {
        if !self.can_update(jdk) {
            return Err(Report::new(JdkManagerError::Uninstall)
                .attach(format!("JDKs from '{}' cannot be uninstalled", jdk.provider)));
        }
        let path = self.install_dir.join(&jdk.id);
        std::fs::remove_dir_all(&path)
            .change_context(JdkManagerError::Uninstall)
            .attach_with(|| format!("Failed to remove JDK at {}", path.display()))
    }

    fn can_update(&self, jdk: &Jdk) -> bool {
        jdk.provider == MANAGED_PROVIDER
    }
}

/// Only a lookup that worked and found nothing means the JDK is not available.
fn package_lookup_error(report: Report<FoojayDiscoApiError>) -> Report<JdkManagerError> {
    let context = match report.current_context() {
        FoojayDiscoApiError::NoPackage => JdkManagerError::NotAvailable,
        _ => JdkManagerError::Install,
    };
    report.change_context(context)
}

fn managed_id(major: u32, distribution: &str) -> String {
    format!("{}-{}", major, distribution)
}

fn parse_managed_id(id: &str) -> Option<(u32, &str)> {
    let (major, distribution) = id.split_once('-')?;
    if distribution.is_empty() {
        return None;
    }
    Some((major.parse().ok()?, distribution))
}

/// Lists the JDKs in `install_dir`, one per directory. Directories starting with `.` are
/// in-progress downloads.
fn list_jdks_in(install_dir: &Path) -> ESResult<Vec<Jdk>, JdkManagerError> {
    if !install_dir.exists() {
        return Ok(Vec::new());
    }
    let entries = std::fs::read_dir(install_dir)
        .change_context(JdkManagerError::Discovery)
        .attach_with(|| format!("Failed to read {}", install_dir.display()))?;
    let mut jdks = Vec::new();
    for entry in entries {
        let entry = entry
            .change_context(JdkManagerError::Discovery)
            .attach_with(|| format!("Failed to read entry of {}", install_dir.display()))?;
        let Some(id) = entry.file_name().to_str().map(str::to_string) else {
            warn!("Skipping non-UTF-8 entry {:?}", entry.file_name());
            continue;
        };
        if id.starts_with('.') || !entry.path().is_dir() {
            continue;
        }
        let home = jdk_home(&entry.path());
        let Some(version) = read_jdk_version(&home) else {
            warn!("Skipping {}, no readable release file", entry.path().display());
            continue;
        };
        jdks.push(Jdk {
            version,
            id,
            provider: MANAGED_PROVIDER.to_string(),
            home,
        });
    }
    Ok(jdks)
}

/// macOS archives nest the actual JDK home in `Contents/Home`.
fn jdk_home(dir: &Path) -> PathBuf {
    let mac_home = dir.join("Contents").join("Home");
    if !dir.join("release").exists() && mac_home.join("release").exists() {
        mac_home
    } else {
        dir.to_path_buf()
    }
}

fn read_jdk_version(home: &Path) -> Option<JavaVersion> {
    let raw = match read_release_java_version(home) {
        Ok(Some(raw)) => raw,
        Ok(None) => return None,
        Err(e) => {
            debug!("No release file in {}: {}", home.display(), e);
            return None;
        }
    };
    match raw.parse() {
        Ok(version) => Some(version),
        Err(e) => {
            warn!("Unparseable JAVA_VERSION '{}' in {}: {:?}", raw, home.display(), e);
            None
        }
    }
}

fn download_verified(
    client: &ureq::Agent,
    url: &url::Url,
    checksum: &str,
    to: &Path,
    quiet: bool,
) -> ESResult<(), JdkManagerError> {
    if !quiet {
        eprintln!("Downloading {}", url);
    }
    let response = client
        .get(url.as_str())
        .call()
        .change_context(JdkManagerError::Install)
        .attach_with(|| format!("Failed to download {}", url))?;
    if !response.status().is_success() {
        return Err(Report::new(JdkManagerError::Install)
            .attach(format!("Failed to download {}", url))
            .attach(format!("Status code: {}", response.status())));
    }
    let progress = if quiet {
        ProgressBar::hidden()
    } else {
        new_progress_bar(response.body().content_length())
    };
    let mut reader = progress.wrap_read(response.into_body().into_reader());
    let file = std::fs::File::create(to)
        .change_context(JdkManagerError::Install)
        .attach_with(|| format!("Failed to create {}", to.display()))?;
    let mut verifier = ChecksumVerifier::<Sha256, _>::new(checksum, BufWriter::new(file))
        .change_context(JdkManagerError::Install)?;
    std::io::copy(&mut reader, &mut verifier)
        .change_context(JdkManagerError::Install)
        .attach_with(|| format!("Failed to download {}", url))?;
    progress.finish_and_clear();
    verifier
        .verify()
        .change_context(JdkManagerError::Install)
        .attach_with(|| format!("Download of {} is corrupt", url))?
        .into_inner()
        .map_err(|e| e.into_error())
        .change_context(JdkManagerError::Install)
        .attach_with(|| format!("Failed to write {}", to.display()))?;
    Ok(())
}

fn unpack_tar_gz(archive: &Path, to: &Path) -> ESResult<(), JdkManagerError> {
    let file = std::fs::File::open(archive)
        .change_context(JdkManagerError::Install)
        .attach_with(|| format!("Failed to open {}", archive.display()))?;
    let mut tar = tar::Archive::new(flate2::read::GzDecoder::new(file));
    tar.set_preserve_permissions(true);
    tar.set_overwrite(true);
    tar.unpack(to)
        .change_context(JdkManagerError::Install)
        .attach("Failed to unpack tar.gz archive")
}

fn unpack_zip(archive: &Path, to: &Path) -> ESResult<(), JdkManagerError> {
    let file = std::fs::File::open(archive)
        .change_context(JdkManagerError::Install)
        .attach_with(|| format!("Failed to open {}", archive.display()))?;
    zip::ZipArchive::new(file)
        .and_then(|mut zip| zip.extract(to))
        .change_context(JdkManagerError::Install)
        .attach("Failed to unpack zip archive")
}

/// If `dir` contains exactly one entry and it is a directory, returns it.
fn single_child_dir(dir: &Path) -> ESResult<Option<PathBuf>, JdkManagerError> {
    let entries = std::fs::read_dir(dir)
        .and_then(|entries| {
            entries
                .map(|res| res.map(|e| e.path()))
                .collect::<Result<Vec<_>, std::io::Error>>()
        })
        .change_context(JdkManagerError::Install)
        .attach_with(|| format!("Failed to read {}", dir.display()))?;
    Ok(match entries.as_slice() {
        [single] if single.is_dir() => Some(single.clone()),
        _ => None,
    })
}

#[cfg(test)]
mod test {
    use super::*;
    use tempfile::TempDir;

    fn fake_jdk(root: &Path, id: &str, release: &str) -> PathBuf {
        let home = root.join(id);
        std::fs::create_dir_all(home.join("bin")).unwrap();
        std::fs::write(home.join("release"), release).unwrap();
        home
    }

    #[test]
    fn test_list_jdks_in() {
        let root = TempDir::new().unwrap();
        fake_jdk(root.path(), "17-temurin", "JAVA_VERSION=\"17.0.2\"\n");
        fake_jdk(root.path(), "8-zulu", "JAVA_VERSION=\"1.8.0_292\"\n");
        fake_jdk(root.path(), ".jdk-download1234", "JAVA_VERSION=\"21\"\n");
        std::fs::create_dir_all(root.path().join("broken")).unwrap();
        std::fs::write(root.path().join("stray-file"), "").unwrap();

        let mut jdks = list_jdks_in(root.path()).unwrap();
        jdks.sort();
        assert_eq!(
            vec![("8-zulu", 8), ("17-temurin", 17)],
            jdks.iter()
                .map(|j| (j.id.as_str(), j.major_version()))
                .collect::<Vec<_>>()
        );
        assert_eq!(root.path().join("17-temurin"), jdks[1].home);
        assert_eq!(MANAGED_PROVIDER, jdks[1].provider);
    }

    #[test]
    fn test_list_jdks_in_missing_dir() {
        let root = TempDir::new().unwrap();
        assert!(list_jdks_in(&root.path().join("nope")).unwrap().is_empty());
    }

    #[test]
    fn test_mac_layout() {
        let root = TempDir::new().unwrap();
        let mac_home = root.path().join("21-temurin").join("Contents").join("Home");
        std::fs::create_dir_all(&mac_home).unwrap();
        std::fs::write(mac_home.join("release"), "JAVA_VERSION=\"21.0.1\"\n").unwrap();

        let jdks = list_jdks_in(root.path()).unwrap();
        assert_eq!(1, jdks.len());
        assert_eq!(mac_home, jdks[0].home);
    }

    #[test]
    fn test_package_lookup_errors() {
        let missing = package_lookup_error(Report::new(FoojayDiscoApiError::NoPackage));
        assert!(matches!(
            missing.current_context(),
            JdkManagerError::NotAvailable
        ));
        for cause in [
            FoojayDiscoApiError::Api,
            FoojayDiscoApiError::InvalidDistribution,
            FoojayDiscoApiError::UnsupportedPlatform,
        ] {
            let failed = package_lookup_error(Report::new(cause));
            assert!(matches!(failed.current_context(), JdkManagerError::Install));
        }
    }

    #[test]
    fn test_managed_ids() {
        assert_eq!("17-temurin", managed_id(17, "temurin"));
        assert_eq!(Some((17, "temurin")), parse_managed_id("17-temurin"));
        assert_eq!(Some((21, "zulu-prime")), parse_managed_id("21-zulu-prime"));
        assert_eq!(None, parse_managed_id("temurin"));
        assert_eq!(None, parse_managed_id("x-temurin"));
        assert_eq!(None, parse_managed_id("17-"));
    }

    #[test]
    fn test_download_uses_https_only_client() {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        listener.set_nonblocking(true).unwrap();
        let url = url::Url::parse(&format!(
            "http://{}/jdk.tar.gz",
            listener.local_addr().unwrap()
        ))
        .unwrap();
        let dir = TempDir::new().unwrap();

        let result = download_verified(
            &new_http_client(),
            &url,
            "2cf24dba5fb0a30e26e83b2ac5b9e29e1b161e5c1fa7425e73043362938b9824",
            &dir.path().join("archive"),
            true,
        );
        assert!(result.is_err());
        assert!(matches!(
            listener.accept(),
            Err(e) if e.kind() == std::io::ErrorKind::WouldBlock
        ));
        assert!(!dir.path().join("archive").exists());
    }

    #[test]
    fn test_single_child_dir() {
        let root = TempDir::new().unwrap();
        std::fs::create_dir_all(root.path().join("jdk-17.0.2+8")).unwrap();
        assert_eq!(
            Some(root.path().join("jdk-17.0.2+8")),
            single_child_dir(root.path()).unwrap()
        );
        std::fs::write(root.path().join("extra"), "").unwrap();
        assert_eq!(None, single_child_dir(root.path()).unwrap());
    }
}
