use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;


/// Environment variable pointing at an explicit configuration file.
pub const CONFIG_ENV_VAR: &str = "JOBTRANSLATOR_CONFIG";

#[derive(Error, Debug)]
pub enum TranslatorConfigError {
  #[error("Filesystem error: {0}")]
  FilesystemError(#[from] std::io::Error),
  #[error("IO Error: {0}")]
  ConfyError(#[from] confy::ConfyError),
  #[error("Configuration file '{0}' not found")]
  ConfigNotFound(PathBuf),
}

/// Settings for one recognised cluster, selected by a hostname substring.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct SiteProfile {
  pub name: String,
  /// Substring of the local hostname that selects this profile. The fallback profile has none.
  pub host_pattern: Option<String>,
  /// Sites the bulk resubmission tool allows jobs to run on.
  pub sites: Vec<String>,
  pub requirements: String,
  /// Directory the container image tag is appended to. No image directive when unset.
  pub singularity_image_prefix: Option<String>,
  pub project_name: Option<String>,
}

impl SiteProfile {
  pub fn matches(&self, hostname: &str) -> bool {
    self
      .host_pattern
      .as_deref()
      .is_some_and(|pattern| hostname.contains(pattern))
  }

  pub fn sites_arg(&self) -> String {
    self.sites.join(",")
  }

  pub fn singularity_image(&self, image_tag: &str) -> Option<String> {
    self
      .singularity_image_prefix
      .as_ref()
      .map(|prefix| format!("{}{}", prefix, image_tag))
  }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct TranslatorConfig {
  pub query_command: String,
  pub submit_command: String,
  pub default_batch_script: String,
  pub legacy_image: String,
  pub current_image: String,
  /// Build architectures containing this marker get the current image.
  pub current_arch_marker: String,
  pub profiles: Vec<SiteProfile>,
  pub fallback_profile: SiteProfile,
}

impl TranslatorConfig {
  /// Picks the first profile whose host pattern is contained in `hostname`.
  pub fn select_profile(&self, hostname: &str) -> &SiteProfile {
    self
      .profiles
      .iter()
      .find(|profile| profile.matches(hostname))
      .unwrap_or(&self.fallback_profile)
  }

  /// Container image tag for the given build architecture.
  pub fn image_for_arch(&self, scram_arch: Option<&str>, force_legacy: bool) -> &str {
    match scram_arch {
      Some(arch) if !force_legacy && arch.contains(&self.current_arch_marker) => {
        &self.current_image
      }
      _ => &self.legacy_image,
    }
  }
}

const UCSD_SITES: &[&str] = &[
  "T2_US_UCSD",
  "T2_US_Caltech",
  "T2_US_MIT",
  "T2_US_Purdue",
  "T2_US_Wisconsin",
  "T2_US_Nebraska",
  "T3_US_UCR",
  "T3_US_Baylor",
  "T3_US_Colorado",
  "T3_US_NotreDame",
  "T3_US_Cornell",
  "T3_US_Rice",
  "T3_US_Rutgers",
  "T3_US_UCD",
  "T3_US_TAMU",
  "T3_US_TTU",
  "T3_US_FIU",
  "T3_US_FIT",
  "T3_US_UMD",
  "T3_US_OSU",
  "T3_US_OSG",
  "T3_US_UMiss",
  "T3_US_PuertoRico",
];

const GRID_SITES: &[&str] = &[
  "T2_CH_CERN",
  "T2_BE_IIHE",
  "T2_CN_Beijing",
  "T2_RU_IHEP",
  "T2_BE_UCL",
  "T2_AT_Vienna",
  "T2_BR_SPRACE",
  "T2_BR_UERJ",
  "T2_CH_CSCS",
  "T2_DE_DESY",
  "T2_DE_RWTH",
  "T2_EE_Estonia",
  "T2_ES_CIEMAT",
  "T2_ES_IFCA",
  "T2_FI_HIP",
  "T2_FR_CCIN2P3",
  "T2_FR_GRIF_IRFU",
  "T2_FR_GRIF_LLR",
  "T2_FR_IPHC",
  "T2_GR_Ioannina",
  "T2_HU_Budapest",
  "T2_IN_TIFR",
  "T2_IT_Bari",
  "T2_IT_Legnaro",
  "T2_IT_Pisa",
  "T2_IT_Rome",
  "T2_KR_KNU",
  "T2_PK_NCP",
  "T2_PL_Swierk",
  "T2_PL_Warsaw",
  "T2_PT_NCG_Lisbon",
  "T2_RU_INR",
  "T2_RU_ITEP",
  "T2_RU_JINR",
  "T2_RU_PNPI",
  "T2_RU_RRC_KI",
  "T2_RU_SINP",
  "T2_TH_CUNSTDA",
  "T2_TR_METU",
  "T2_UA_KIPT",
  "T2_UK_London_Brunel",
  "T2_UK_London_IC",
  "T2_UK_SGrid_Bristol",
  "T2_UK_SGrid_RALPP",
  "T3_CO_Uniandes",
  "T3_FR_IPNL",
  "T3_GR_IASA",
  "T3_HU_Debrecen",
  "T3_IT_Bologna",
  "T3_IT_Napoli",
  "T3_IT_Perugia",
  "T3_IT_Trieste",
  "T3_KR_KNU",
  "T3_MX_Cinvestav",
  "T3_RU_FIAN",
  "T3_TW_NCU",
  "T3_TW_NTU_HEP",
  "T3_UK_London_QMUL",
  "T3_UK_SGrid_Oxford",
  "T3_CN_PKU",
];

const UCSD_REQUIREMENTS: &str = r#"(HAS_SINGULARITY=?=True && HAS_CVMFS_cms_cern_ch =?= true) || (regexp("(uaf-[0-9]{1,2}|uafino)\.", TARGET.Machine) && !(TARGET.SlotID>(TotalSlots<14 ? 3:7) && regexp("uaf-[0-9]", TARGET.machine)))"#;

const GENERIC_REQUIREMENTS: &str = "(HAS_SINGULARITY=?=True && HAS_CVMFS_cms_cern_ch =?= true) || (!isUndefined(NODE_MOUNTS_CVMFS) && NODE_MOUNTS_CVMFS)";

fn to_strings(values: &[&str]) -> Vec<String> {
  values.iter().map(|s| s.to_string()).collect()
}

impl Default for SiteProfile {
  fn default() -> Self {
    Self {
      name: "generic".into(),
      host_pattern: None,
      sites: to_strings(GRID_SITES),
      requirements: GENERIC_REQUIREMENTS.into(),
      singularity_image_prefix: None,
      project_name: None,
    }
  }
}

impl Default for TranslatorConfig {
  fn default() -> Self {
    let ucsd = SiteProfile {
      name: "ucsd".into(),
      host_pattern: Some("t2.ucsd.edu".into()),
      sites: to_strings(UCSD_SITES),
      requirements: UCSD_REQUIREMENTS.into(),
      singularity_image_prefix: Some("/cvmfs/singularity.opensciencegrid.org/cmssw/".into()),
      project_name: Some("cmssurfandturf".into()),
    };
    Self {
      query_command: "condor_q".into(),
      submit_command: "condor_submit".into(),
      default_batch_script: "condor_executable.sh".into(),
      legacy_image: "cms:rhel6-m202006".into(),
      current_image: "cms:rhel7-m202006".into(),
      current_arch_marker: "slc7".into(),
      profiles: vec![ucsd],
      fallback_profile: SiteProfile::default(),
    }
  }
}

/// Loads the configuration without ever creating a file:
/// - `$JOBTRANSLATOR_CONFIG` when set, which must point at an existing file
/// - the per-user `jobtranslator/config` file when it exists
/// - the built-in defaults otherwise
pub fn get_translator_config() -> Result<TranslatorConfig, TranslatorConfigError> {
  if let Some(path) = std::env::var_os(CONFIG_ENV_VAR).filter(|p| !p.is_empty()) {
    return get_translator_config_from(Path::new(&path));
  }
  let cfg_path = confy::get_configuration_file_path("jobtranslator", "config")?;
  if cfg_path.is_file() {
    log::debug!("Loading configuration from '{}'", cfg_path.display());
    return Ok(confy::load_path(cfg_path)?);
  }
  Ok(TranslatorConfig::default())
}

pub fn get_translator_config_from(path: &Path) -> Result<TranslatorConfig, TranslatorConfigError> {
  if !path.is_file() {
    return Err(TranslatorConfigError::ConfigNotFound(path.to_path_buf()));
  }
  log::debug!("Loading configuration from '{}'", path.display());
  Ok(confy::load_path(path)?)
}

pub fn set_translator_config(
  path: &Path,
  config: &TranslatorConfig,
) -> Result<(), TranslatorConfigError> {
  confy::store_path(path, config)?;
  Ok(())
}
