use crate::config::JvmConfig;
use crate::error::ESResult;
use crate::http_client::new_http_client;
use crate::java_version::JavaVersion;
use derive_more::Display;
use error_stack::{Report, ResultExt};
use serde::Deserialize;
use std::error::Error;
use tracing::debug;
use url::Url;

const FOOJAY_BASE_URL: &str = "https://api.foojay.io/disco/v3.0";

#[derive(Debug, Display)]
pub enum FoojayDiscoApiError {
    #[display("Foojay Disco API error")]
    Api,
    #[display("Invalid distribution")]
    InvalidDistribution,
    #[display("Unsupported platform")]
    UnsupportedPlatform,
    #[display("No matching package")]
    NoPackage,
}

impl Error for FoojayDiscoApiError {}

fn detected_foojay_arch() -> ESResult<&'static str, FoojayDiscoApiError> {
    match std::env::consts::ARCH {
        "x86" => Ok("x86"),
        "x86_64" => Ok("x64"),
        "aarch64" => Ok("arm64"),
        arch => Err(Report::new(FoojayDiscoApiError::UnsupportedPlatform).attach(format!(
            "Unsupported architecture: {}, try setting forced_architecture in the config",
            arch
        ))),
    }
}

fn detected_foojay_os(libc: &str) -> ESResult<&'static str, FoojayDiscoApiError> {
    match std::env::consts::OS {
        "macos" => Ok("macos"),
        "windows" => Ok("windows"),
        "linux" => {
            if libc == "musl" {
                Ok("linux-musl")
            } else {
                Ok("linux")
            }
        }
        os => Err(Report::new(FoojayDiscoApiError::UnsupportedPlatform).attach(format!(
            "Unsupported OS: {}, try setting forced_os in the config",
            os
        ))),
    }
}

pub struct FoojayDiscoApi {
    client: ureq::Agent,
}

impl FoojayDiscoApi {
    pub fn new() -> Self {
        Self {
            client: new_http_client(),
        }
    }

    /// The latest GA package of every major version in `distribution`, for this platform.
    pub fn list_latest_packages(
        &self,
        config: &JvmConfig,
        distribution: &str,
    ) -> ESResult<Vec<FoojayPackageListInfo>, FoojayDiscoApiError> {
        let url = packages_url(config, distribution, None)?;
        let packages = self
            .call_foojay_api::<FoojayPackageListInfo>(url)
            .attach_with(|| format!("Distribution: {}", distribution))?;
        Ok(packages
            .into_iter()
            .filter(|p| {
                if let ArchiveType::Unknown(archive_type) = &p.archive_type {
                    debug!("Unknown archive type: {}", archive_type);
                    return false;
                }
                true
            })
            .collect())
    }

    pub fn get_latest_package_info(
        &self,
        config: &JvmConfig,
        distribution: &str,
        major: u32,
    ) -> ESResult<(FoojayPackageListInfo, FoojayPackageInfo), FoojayDiscoApiError> {
        let url = packages_url(config, distribution, Some(major))?;
        self.call_foojay_api::<FoojayPackageListInfo>(url)?
            .into_iter()
            .find_map(|p| -> Option<ESResult<_, FoojayDiscoApiError>> {
                if !p.latest_build_available {
                    return None;
                }
                if let ArchiveType::Unknown(archive_type) = &p.archive_type {
                    debug!("Unknown archive type: {}", archive_type);
                    return None;
                }
                self.call_foojay_api_single(p.links.pkg_info_uri.clone())
                    .map(|mut info: FoojayPackageInfo| {
                        if matches!(info.checksum_type, ChecksumType::Unknown(ref ct) if ct.is_empty()) {
                            try_fill_checksum(&self.client, &mut info);
                        }
                        if let ChecksumType::Unknown(checksum_type) = &info.checksum_type {
                            debug!("Unknown checksum type: {}", checksum_type);
                            None
                        } else {
                            Some((p, info))
                        }
                    })
                    .transpose()
            })
            .ok_or_else(|| {
                Report::new(FoojayDiscoApiError::NoPackage).attach(format!(
                    "No latest package available for JDK {} in distribution {}",
                    major, distribution
                ))
            })?
    }

    fn call_foojay_api<T: for<'a> Deserialize<'a>>(
        &self,
        url: Url,
    ) -> ESResult<Vec<T>, FoojayDiscoApiError> {
        debug!("GET {}", url);
        let response = self
            .client
            .get(url.as_str())
            .call()
            .change_context(FoojayDiscoApiError::Api)?;
        let status_code = response.status();
        let data: FoojayResult<T> = response
            .into_body()
            .read_json()
            .change_context(FoojayDiscoApiError::Api)?;

        if status_code.is_success() {
            Ok(data.result)
        } else {
            match data.message.as_str() {
                "Requested distribution not found" => {
                    Err(Report::new(FoojayDiscoApiError::InvalidDistribution))
                }
                _ => Err(Report::new(FoojayDiscoApiError::Api)
                    .attach(format!("Unknown message: {}", data.message))
                    .attach(format!("Status code: {}", status_code))),
            }
        }
    }

    fn call_foojay_api_single<T: for<'a> Deserialize<'a>>(
        &self,
        url: Url,
    ) -> ESResult<T, FoojayDiscoApiError> {
        let result: Vec<T> = self.call_foojay_api(url)?;
        let count = result.len();
        let mut iter = result.into_iter();
        match (iter.next(), count) {
            (Some(single), 1) => Ok(single),
            _ => Err(Report::new(FoojayDiscoApiError::Api)
                .attach(format!("Expected exactly one result, got {}", count))),
        }
    }
}

fn packages_url(
    config: &JvmConfig,
    distribution: &str,
    major: Option<u32>,
) -> ESResult<Url, FoojayDiscoApiError> {
    let arch = match &config.forced_architecture {
        Some(arch) => arch.clone(),
        None => detected_foojay_arch()?.to_string(),
    };
    let libc = config.forced_libc.clone();
    let os = match &config.forced_os {
        Some(os) => os.clone(),
        None => detected_foojay_os(&libc)?.to_string(),
    };
    let mut params = vec![
        // We don't want to handle JREs yet.
        ("package_type", "jdk".to_string()),
        // We need to be able to download it.
        ("directly_downloadable", "true".to_string()),
        ("release_status", "ga".to_string()),
        ("latest", "available".to_string()),
        ("distribution", distribution.to_string()),
        ("operating_system", os.clone()),
        ("architecture", arch),
    ];
    if let Some(major) = major {
        params.push(("jdk_version", major.to_string()));
    }
    if os == "linux" || os == "linux-musl" {
        params.push(("libc_type", libc));
    }
    Url::parse_with_params(&format!("{}/packages", FOOJAY_BASE_URL), &params)
        .change_context(FoojayDiscoApiError::Api)
}

/// Attempt to fill in the missing checksum data using known checksum URL patterns.
fn try_fill_checksum(client: &ureq::Agent, info: &mut FoojayPackageInfo) {
    for suffix in &["sha256", "sha256.text"] {
        let url = format!("{}.{}", info.direct_download_uri, suffix);
        let response = match client.get(&url).call() {
            Ok(response) => response,
            Err(e) => {
                debug!("No checksum at {}: {}", url, e);
                continue;
            }
        };
        if !response.status().is_success() {
            continue;
        }
        let Ok(checksum) = response.into_body().read_to_string() else {
            continue;
        };
        let checksum = checksum.trim();
        if checksum.len() == 64 {
            info.checksum = checksum.to_string();
            info.checksum_type = ChecksumType::Sha256;
            return;
        }
    }
}

#[derive(Debug, Deserialize)]
struct FoojayResult<T> {
    message: String,
    result: Vec<T>,
}

#[derive(Debug, Deserialize)]
pub struct FoojayPackageListInfo {
    pub archive_type: ArchiveType,
    pub distribution: String,
    pub java_version: JavaVersion,
    pub latest_build_available: bool,
    pub links: FoojayPackageLinks,
}

#[derive(Debug, Clone, Deserialize)]
pub enum ArchiveType {
    #[serde(rename = "tar.gz")]
    TarGz,
    #[serde(rename = "zip")]
    Zip,
    #[serde(untagged)]
    Unknown(String),
}

#[derive(Debug, Deserialize)]
pub struct FoojayPackageLinks {
    pub pkg_info_uri: Url,
}

#[derive(Debug, Deserialize)]
pub struct FoojayPackageInfo {
    pub direct_download_uri: Url,
    pub checksum: String,
    pub checksum_type: ChecksumType,
}

#[derive(Debug, Clone, Deserialize)]
pub enum ChecksumType {
    #[serde(rename = "sha256")]
    Sha256,
    #[serde(untagged)]
    Unknown(String),
}
