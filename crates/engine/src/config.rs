use std::collections::BTreeMap;

use serde::Deserialize;

use crate::error::MergeError;

/// Run configuration for a judging merge.
///
/// ```toml
/// name = "4-round judging merge"
///
/// [judges.isaak]
/// file = "outputs/rankings_isaak_4r.csv"
///
/// [judges.noah]
/// file = "outputs/rankings_noah_4r.csv"
///
/// [aux]
/// file = "outputs/n_results_peptides.csv"
/// ```
#[derive(Debug, Deserialize)]
pub struct MergeConfig {
    pub name: String,
    pub judges: BTreeMap<String, JudgeConfig>,
    #[serde(default)]
    pub aux: Option<AuxConfig>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct JudgeConfig {
    pub file: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AuxConfig {
    pub file: String,
}

impl MergeConfig {
    pub fn from_toml(toml_str: &str) -> Result<Self, MergeError> {
        let config: MergeConfig =
            toml::from_str(toml_str).map_err(|e| MergeError::ConfigParse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), MergeError> {
        if self.judges.is_empty() {
            return Err(MergeError::ConfigValidation(
                "at least one judge is required".into(),
            ));
        }
        for (name, judge) in &self.judges {
            if judge.file.is_empty() {
                return Err(MergeError::ConfigValidation(format!(
                    "judge '{name}' has an empty file path"
                )));
            }
        }
        if let Some(aux) = &self.aux {
            if aux.file.is_empty() {
                return Err(MergeError::ConfigValidation(
                    "aux section has an empty file path".into(),
                ));
            }
        }
        Ok(())
    }
}
