//! Pipeline configuration.
//!
//! Every field has a default that reproduces the behavior of the reference
//! data deliveries, so an empty TOML file is a valid configuration.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{ModelError, Result};
use crate::role::{ClassificationFamily, Role};
use crate::source::SourceKind;

/// Default projected reference system of all inputs and outputs.
pub const DEFAULT_CRS: &str = "EPSG:2056";

/// Top-level configuration loaded from `--config`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PipelineConfig {
    pub roles: RoleFragments,
    pub generations: GenerationSignatures,
    pub exemption: ExemptionTokens,
    pub spreadsheet: SpreadsheetLayout,
    pub input: InputLayout,
    /// Reference system assigned to spreadsheet geometry and assumed for
    /// containers without a `crs` member.
    pub crs: String,
    /// Column whose unique value overrides the file-name region token.
    pub region_column: String,
    /// Output root used when `--output-dir` is not given.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output_root: Option<PathBuf>,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            roles: RoleFragments::default(),
            generations: GenerationSignatures::default(),
            exemption: ExemptionTokens::default(),
            spreadsheet: SpreadsheetLayout::default(),
            input: InputLayout::default(),
            crs: DEFAULT_CRS.to_string(),
            region_column: "Kanton".to_string(),
            output_root: None,
        }
    }
}

impl PipelineConfig {
    /// Loads and validates a TOML configuration file.
    pub fn from_path(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path).map_err(|source| ModelError::ConfigRead {
            path: path.to_path_buf(),
            source,
        })?;
        let config: PipelineConfig =
            toml::from_str(&text).map_err(|source| ModelError::ConfigParse {
                path: path.to_path_buf(),
                source,
            })?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        for role in Role::ALL {
            if self.roles.fragment(role).trim().is_empty() {
                return Err(ModelError::InvalidConfig {
                    message: format!("empty name fragment for role {role}"),
                });
            }
        }
        for kind in SourceKind::ALL {
            let signature = self.generations.for_kind(kind);
            if signature.legacy == signature.current {
                return Err(ModelError::InvalidConfig {
                    message: format!(
                        "generation signatures for {kind} must differ (both {})",
                        signature.legacy
                    ),
                });
            }
        }
        if let Some(token) = self
            .exemption
            .exempt
            .iter()
            .find(|token| self.exemption.not_exempt.contains(token))
        {
            return Err(ModelError::InvalidConfig {
                message: format!("exemption token '{token}' is both true and false"),
            });
        }
        Ok(())
    }
}

/// Name fragments matched (case-insensitive substring) against column names.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RoleFragments {
    pub length: String,
    pub exemption: String,
    pub pers: String,
    pub ofg: String,
    pub gw: String,
    pub interval: String,
}

impl Default for RoleFragments {
    fn default() -> Self {
        Self {
            length: "IDLaenge".to_string(),
            exemption: "KBfrei".to_string(),
            pers: "AmpelCodePers".to_string(),
            ofg: "AmpelCodeOFG".to_string(),
            gw: "AmpelCodeGW".to_string(),
            interval: "Intervall".to_string(),
        }
    }
}

impl RoleFragments {
    pub fn fragment(&self, role: Role) -> &str {
        match role {
            Role::Length => &self.length,
            Role::Exemption => &self.exemption,
            Role::Classification(ClassificationFamily::Pers) => &self.pers,
            Role::Classification(ClassificationFamily::Ofg) => &self.ofg,
            Role::Classification(ClassificationFamily::Gw) => &self.gw,
            Role::Interval => &self.interval,
        }
    }
}

/// A known generation of the underlying data model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SchemaGeneration {
    Legacy,
    Current,
}

/// Resolved-subset column counts of the two known generations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GenerationSignature {
    pub legacy: usize,
    pub current: usize,
}

impl Default for GenerationSignature {
    fn default() -> Self {
        Self {
            legacy: 5,
            current: 6,
        }
    }
}

impl GenerationSignature {
    pub fn generation(&self, column_count: usize) -> Option<SchemaGeneration> {
        if column_count == self.legacy {
            Some(SchemaGeneration::Legacy)
        } else if column_count == self.current {
            Some(SchemaGeneration::Current)
        } else {
            None
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GenerationSignatures {
    pub spreadsheet: GenerationSignature,
    pub geo: GenerationSignature,
}

impl GenerationSignatures {
    pub fn for_kind(&self, kind: SourceKind) -> GenerationSignature {
        match kind {
            SourceKind::Spreadsheet => self.spreadsheet,
            SourceKind::Geo => self.geo,
        }
    }
}

/// Raw exemption tokens and their canonical meaning. Matching is exact after
/// trimming surrounding whitespace.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ExemptionTokens {
    pub exempt: Vec<String>,
    pub not_exempt: Vec<String>,
}

impl Default for ExemptionTokens {
    fn default() -> Self {
        Self {
            exempt: ["true", "TRUE", "1"].map(String::from).to_vec(),
            not_exempt: ["false", "FALSE", "N", "0"].map(String::from).to_vec(),
        }
    }
}

/// Shape of the spreadsheet exports.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SpreadsheetLayout {
    /// Zero-based index of the header record. Records of empty cells
    /// (`,,,,`) count; empty lines do not.
    pub header_row: usize,
    /// Records dropped directly below the header before the first segment.
    pub skipped_rows_after_header: usize,
    /// Leading columns dropped after reading (row-index artifacts).
    pub dropped_leading_columns: usize,
    /// Literal treated as a missing value.
    pub null_token: String,
    pub easting_column: String,
    pub northing_column: String,
}

impl Default for SpreadsheetLayout {
    fn default() -> Self {
        Self {
            header_row: 3,
            skipped_rows_after_header: 0,
            dropped_leading_columns: 1,
            null_token: "<Nul>".to_string(),
            easting_column: "Ort_E-Coord".to_string(),
            northing_column: "Ort_N-Coord".to_string(),
        }
    }
}

/// Subdirectories of the input root holding each source kind.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct InputLayout {
    pub spreadsheet_dir: PathBuf,
    pub geo_dir: PathBuf,
}

impl Default for InputLayout {
    fn default() -> Self {
        Self {
            spreadsheet_dir: PathBuf::from("csv"),
            geo_dir: PathBuf::from("xtf"),
        }
    }
}

impl InputLayout {
    pub fn dir_for(&self, root: &Path, kind: SourceKind) -> PathBuf {
        match kind {
            SourceKind::Spreadsheet => root.join(&self.spreadsheet_dir),
            SourceKind::Geo => root.join(&self.geo_dir),
        }
    }
}
