// Copyright 2024 Adobe. All rights reserved.
// This file is licensed to you under the Apache License,
// Version 2.0 (http://www.apache.org/licenses/LICENSE-2.0)
// or the MIT license (http://opensource.org/licenses/MIT),
// at your option.

// Unless required by applicable law or agreed to in writing,
// this software is distributed on an "AS IS" BASIS, WITHOUT
// WARRANTIES OR REPRESENTATIONS OF ANY KIND, either express or
// implied. See the LICENSE-MIT and LICENSE-APACHE files for the
// specific language governing permissions and limitations under
// each license.

#[cfg(feature = "file_io")]
use std::path::Path;

use config::{Config, FileFormat};
use serde_derive::{Deserialize, Serialize};

use crate::{Error, Result};

const VERSION: u32 = 1;

// trait used to validate user input to make sure user supplied configurations are valid
pub(crate) trait SettingsValidate {
    // returns error if settings are invalid
    fn validate(&self) -> Result<()> {
        Ok(())
    }
}

/// Limits applied while a container is being decompressed.
///
/// Every guard except `threshold` can be disabled by setting it to `None`.
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct ExtractSettings {
    /// Number of decompressed bytes below which the compression ratio is not
    /// checked. Small containers legitimately compress very well.
    ///
    /// The default value is 1,000,000 bytes.
    pub threshold: u64,

    /// Maximum ratio between decompressed bytes and container (or entry)
    /// compressed size.
    ///
    /// The default value is 100.
    pub max_compression_ratio: Option<u64>,

    /// Absolute cap on the total number of decompressed bytes.
    ///
    /// The default value is 1 GiB.
    pub max_extracted_size: Option<u64>,

    /// Maximum number of entries a container may declare.
    ///
    /// The default value is 1000.
    pub max_entries: Option<usize>,

    /// Number of unreadable entries skipped before the archive is rejected.
    ///
    /// The default value is 100.
    pub max_malformed_entries: usize,

    /// Whether per-entry ZIP comments are read.
    ///
    /// The default value is false.
    pub extract_comments: bool,
}

impl Default for ExtractSettings {
    fn default() -> Self {
        ExtractSettings {
            threshold: 1_000_000,
            max_compression_ratio: Some(100),
            max_extracted_size: Some(1024 * 1024 * 1024),
            max_entries: Some(1000),
            max_malformed_entries: 100,
            extract_comments: false,
        }
    }
}

impl SettingsValidate for ExtractSettings {
    fn validate(&self) -> Result<()> {
        if self.max_compression_ratio == Some(0) {
            return Err(Error::BadParam(
                "extract.max_compression_ratio must be greater than zero".into(),
            ));
        }
        Ok(())
    }
}

/// How a failed format check affects the verdict.
#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ConstraintLevel {
    /// The check failing invalidates the token.
    Fail,
    /// The check failing is reported as a warning.
    Warn,
    /// The check failing is reported as information.
    Inform,
    /// The check is not executed.
    Ignore,
}

/// Levels of the container format checks.
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct FormatConstraints {
    /// An ASiC-E container carries a `mimetype` entry.
    pub mimetype_present: ConstraintLevel,
    /// The `mimetype` entry is the first entry and is stored uncompressed.
    pub mimetype_first_and_stored: ConstraintLevel,
    /// The declared container type matches the container structure.
    pub mimetype_matches_structure: ConstraintLevel,
    /// A signature filename is not used twice.
    pub signature_not_duplicated: ConstraintLevel,
    /// An ASiC-E signature is bound to a manifest.
    pub manifest_present: ConstraintLevel,
    /// Exactly one manifest claims the signature.
    pub manifest_unambiguous: ConstraintLevel,
    /// Manifest names follow the naming convention of the container type.
    pub filename_adherence: ConstraintLevel,
    /// A signature or timestamp covers at least one container document.
    pub signed_files_present: ConstraintLevel,
    /// Every manifest entry exists in the container.
    pub manifest_entries_found: ConstraintLevel,
    /// Every manifest digest matches the content it references.
    pub manifest_entries_intact: ConstraintLevel,
    /// Every document in the container is covered by a signature or timestamp.
    pub all_files_signed: ConstraintLevel,
    /// Archive manifests form a single ordered chain and the last one covers
    /// the whole container.
    pub archive_manifest_chain: ConstraintLevel,
    /// A content timestamp manifest covers no signature or timestamp.
    pub timestamp_coverage: ConstraintLevel,
}

impl Default for FormatConstraints {
    fn default() -> Self {
        FormatConstraints {
            mimetype_present: ConstraintLevel::Fail,
            mimetype_first_and_stored: ConstraintLevel::Warn,
            mimetype_matches_structure: ConstraintLevel::Warn,
            signature_not_duplicated: ConstraintLevel::Fail,
            manifest_present: ConstraintLevel::Fail,
            manifest_unambiguous: ConstraintLevel::Fail,
            filename_adherence: ConstraintLevel::Warn,
            signed_files_present: ConstraintLevel::Fail,
            manifest_entries_found: ConstraintLevel::Fail,
            manifest_entries_intact: ConstraintLevel::Fail,
            all_files_signed: ConstraintLevel::Warn,
            archive_manifest_chain: ConstraintLevel::Warn,
            timestamp_coverage: ConstraintLevel::Fail,
        }
    }
}

impl SettingsValidate for FormatConstraints {}

/// Settings for configuring resolution and format checks.
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct VerifySettings {
    /// Whether XAdES signatures are handled.
    ///
    /// The default value is true.
    pub xades: bool,

    /// Whether CAdES signatures are handled.
    ///
    /// The default value is true.
    pub cades: bool,

    /// Whether ASiCManifest digests are recomputed against the referenced
    /// content.
    ///
    /// The default value is true.
    pub check_manifest_digests: bool,

    /// Whether a `package.zip` nested in an ASiC-S container is opened.
    ///
    /// The default value is true.
    pub open_nested_container: bool,

    /// Levels of the individual format checks.
    pub constraints: FormatConstraints,
}

impl Default for VerifySettings {
    fn default() -> Self {
        VerifySettings {
            xades: true,
            cades: true,
            check_manifest_digests: true,
            open_nested_container: true,
            constraints: FormatConstraints::default(),
        }
    }
}

impl SettingsValidate for VerifySettings {
    fn validate(&self) -> Result<()> {
        if !self.xades && !self.cades {
            return Err(Error::BadParam(
                "at least one of verify.xades and verify.cades must be enabled".into(),
            ));
        }
        self.constraints.validate()
    }
}

/// Settings for configuring extraction and validation of containers.
///
/// A `Settings` value is passed explicitly to each
/// [`ContainerValidator`](crate::ContainerValidator); there is no process-wide
/// configuration.
#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
pub struct Settings {
    /// Version of the configuration.
    pub version: u32,
    /// Settings for configuring the secure extractor.
    pub extract: ExtractSettings,
    /// Settings for configuring resolution and format checks.
    pub verify: VerifySettings,
}

impl Settings {
    /// Creates a new Settings instance with default values.
    ///
    /// # Examples
    ///
    /// ```
    /// # use asic_container::settings::Settings;
    /// # fn main() -> asic_container::Result<()> {
    /// let settings = Settings::new().with_json(r#"{"extract": {"max_entries": 10}}"#)?;
    /// assert_eq!(settings.extract.max_entries, Some(10));
    /// # Ok(())
    /// # }
    /// ```
    pub fn new() -> Self {
        Self::default()
    }

    /// Update this `Settings` instance from a string representation.
    ///
    /// The provided configuration is overlaid on top of the current values, so
    /// partial documents only change the fields they name.
    ///
    /// # Arguments
    /// * `settings_str` - The configuration string
    /// * `format` - The format of the configuration ("json" or "toml")
    pub fn update_from_str(&mut self, settings_str: &str, format: &str) -> Result<()> {
        // a failed update leaves the current values untouched
        *self = self.clone().with_string(settings_str, format)?;
        Ok(())
    }

    /// Load settings from JSON string using the builder pattern.
    pub fn with_json(self, json: &str) -> Result<Self> {
        self.with_string(json, "json")
    }

    /// Load settings from TOML string using the builder pattern.
    ///
    /// # Examples
    ///
    /// ```
    /// # use asic_container::settings::Settings;
    /// # fn main() -> asic_container::Result<()> {
    /// let settings = Settings::new().with_toml(
    ///     r#"
    ///         [extract]
    ///         max_compression_ratio = 50
    ///     "#,
    /// )?;
    /// assert_eq!(settings.extract.max_compression_ratio, Some(50));
    /// # Ok(())
    /// # }
    /// ```
    pub fn with_toml(self, toml: &str) -> Result<Self> {
        self.with_string(toml, "toml")
    }

    /// Load settings from a file using the builder pattern.
    ///
    /// The file format (JSON or TOML) is inferred from the file extension.
    #[cfg(feature = "file_io")]
    pub fn with_file<P: AsRef<Path>>(self, path: P) -> Result<Self> {
        let path = path.as_ref();
        let ext = path
            .extension()
            .ok_or(Error::BadParam(
                "settings file must have json or toml extension".into(),
            ))?
            .to_str()
            .ok_or(Error::BadParam("invalid settings file name".into()))?;
        let setting_buf = std::fs::read(path).map_err(Error::IoError)?;
        self.with_string(&String::from_utf8_lossy(&setting_buf), ext)
    }

    fn with_string(self, settings_str: &str, format: &str) -> Result<Self> {
        let f = match format.to_lowercase().as_str() {
            "json" => FileFormat::Json,
            "toml" => FileFormat::Toml,
            _ => return Err(Error::UnsupportedType),
        };

        let current_config = Config::try_from(&self).map_err(|e| Error::OtherError(Box::new(e)))?;

        // overlay, allows for partial changes
        let updated_config = Config::builder()
            .add_source(current_config)
            .add_source(config::File::from_str(settings_str, f))
            .build()
            .map_err(|e| Error::BadParam(format!("could not parse configuration: {e}")))?;

        let settings = updated_config
            .try_deserialize::<Settings>()
            .map_err(|e| Error::BadParam(e.to_string()))?;

        settings.validate()?;

        Ok(settings)
    }

    /// Sets a value at the specified dot-separated path using the builder
    /// pattern.
    ///
    /// # Examples
    ///
    /// ```
    /// # use asic_container::settings::Settings;
    /// # fn main() -> asic_container::Result<()> {
    /// let settings = Settings::default()
    ///     .with_value("extract.max_entries", 1)?
    ///     .with_value("verify.cades", false)?;
    /// assert_eq!(settings.extract.max_entries, Some(1));
    /// # Ok(())
    /// # }
    /// ```
    pub fn with_value<T: Into<config::Value>>(self, path: &str, value: T) -> Result<Self> {
        let config = Config::try_from(&self).map_err(|e| Error::OtherError(Box::new(e)))?;

        let updated_config = Config::builder()
            .add_source(config)
            .set_override(path, value)
            .map_err(|e| Error::BadParam(format!("Invalid path '{path}': {e}")))?
            .build()
            .map_err(|e| Error::OtherError(Box::new(e)))?;

        let updated_settings = updated_config
            .try_deserialize::<Settings>()
            .map_err(|e| Error::BadParam(format!("Invalid value for '{path}': {e}")))?;

        updated_settings.validate()?;

        Ok(updated_settings)
    }

    /// Sets a value at the specified path, modifying this Settings instance in
    /// place.
    pub fn set_value<T: Into<config::Value>>(&mut self, path: &str, value: T) -> Result<()> {
        *self = self.clone().with_value(path, value)?;
        Ok(())
    }

    /// Gets a value at the specified dot-separated path.
    pub fn get_value<'de, T: serde::de::Deserialize<'de>>(&self, path: &str) -> Result<T> {
        let config = Config::try_from(self).map_err(|e| Error::OtherError(Box::new(e)))?;

        config
            .get::<T>(path)
            .map_err(|e| Error::BadParam(format!("Failed to get value at '{path}': {e}")))
    }
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            version: VERSION,
            extract: Default::default(),
            verify: Default::default(),
        }
    }
}

impl SettingsValidate for Settings {
    fn validate(&self) -> Result<()> {
        if self.version > VERSION {
            return Err(Error::VersionCompatibility(
                "settings version too new".into(),
            ));
        }
        self.extract.validate()?;
        self.verify.validate()
    }
}

/// Conversion into [`Settings`] from the forms callers usually hold.
pub trait IntoSettings {
    /// Convert this type into Settings
    fn into_settings(self) -> Result<Settings>;
}

impl IntoSettings for Settings {
    fn into_settings(self) -> Result<Settings> {
        Ok(self)
    }
}

/// JSON or TOML text; JSON is tried first.
impl IntoSettings for &str {
    fn into_settings(self) -> Result<Settings> {
        let mut settings = Settings::default();
        settings
            .update_from_str(self, "json")
            .or_else(|_| settings.update_from_str(self, "toml"))?;
        Ok(settings)
    }
}

impl IntoSettings for String {
    fn into_settings(self) -> Result<Settings> {
        self.as_str().into_settings()
    }
}

impl IntoSettings for serde_json::Value {
    fn into_settings(self) -> Result<Settings> {
        let json_str = serde_json::to_string(&self).map_err(Error::JsonError)?;
        let mut settings = Settings::default();
        settings.update_from_str(&json_str, "json")?;
        Ok(settings)
    }
}

#[cfg(test)]
pub mod tests {
    #![allow(clippy::panic)]
    #![allow(clippy::unwrap_used)]

    use super::*;

    #[test]
    fn test_get_defaults() {
        let settings = Settings::default();

        assert_eq!(settings.extract, ExtractSettings::default());
        assert_eq!(settings.extract.threshold, 1_000_000);
        assert_eq!(settings.extract.max_compression_ratio, Some(100));
        assert_eq!(settings.extract.max_entries, Some(1000));
        assert_eq!(settings.extract.max_malformed_entries, 100);
        assert!(!settings.extract.extract_comments);
        assert_eq!(settings.verify, VerifySettings::default());
    }

    #[test]
    fn test_partial_loading() {
        let modified = toml::toml! {
            [extract]
            max_compression_ratio = 50
            extract_comments = true

            [verify.constraints]
            all_files_signed = "fail"
        }
        .to_string();

        let settings = Settings::new().with_toml(&modified).unwrap();

        assert_eq!(settings.extract.max_compression_ratio, Some(50));
        assert!(settings.extract.extract_comments);
        assert_eq!(
            settings.verify.constraints.all_files_signed,
            ConstraintLevel::Fail
        );

        // untouched values keep their defaults
        assert_eq!(settings.extract.max_entries, Some(1000));
        assert_eq!(
            settings.verify.constraints.filename_adherence,
            FormatConstraints::default().filename_adherence
        );
    }

    #[test]
    fn test_json_can_disable_guards() {
        let mut settings = Settings::default();
        settings
            .update_from_str(
                r#"{"extract": {"max_compression_ratio": null, "max_entries": null}}"#,
                "json",
            )
            .unwrap();

        assert_eq!(settings.extract.max_compression_ratio, None);
        assert_eq!(settings.extract.max_entries, None);
        assert_eq!(settings.extract.max_extracted_size, Some(1024 * 1024 * 1024));
    }

    #[test]
    fn test_bad_setting() {
        let modified = toml::toml! {
            [extract]
            threshold = "lots"
            max_entries = -12
        }
        .to_string();

        assert!(Settings::new().with_toml(&modified).is_err());
        assert!(Settings::new().with_json("{}").is_ok());
        assert!(matches!(
            Settings::new().with_string("x", "yaml"),
            Err(Error::UnsupportedType)
        ));
    }

    #[test]
    fn test_validation_rejects_nonsense() {
        assert!(Settings::new()
            .with_value("extract.max_compression_ratio", 0)
            .is_err());
        assert!(Settings::new()
            .with_json(r#"{"verify": {"xades": false, "cades": false}}"#)
            .is_err());
        assert!(matches!(
            Settings::new().with_json(r#"{"version": 99}"#),
            Err(Error::VersionCompatibility(_))
        ));
    }

    #[test]
    fn test_get_and_set_value() {
        let mut settings = Settings::default();
        settings.set_value("extract.max_entries", 3).unwrap();

        assert_eq!(settings.extract.max_entries, Some(3));
        assert_eq!(settings.get_value::<usize>("extract.max_entries").unwrap(), 3);
        assert!(settings.get_value::<bool>("verify.cades").unwrap());
    }

    #[test]
    fn test_failed_update_keeps_settings() {
        let mut settings = Settings::default();
        settings.set_value("extract.max_entries", 5).unwrap();

        assert!(settings.update_from_str("{ not json", "json").is_err());
        assert_eq!(settings.extract.max_entries, Some(5));

        assert!(settings
            .set_value("extract.max_compression_ratio", 0)
            .is_err());
        assert_eq!(settings.extract.max_entries, Some(5));
        assert_eq!(settings.extract.max_compression_ratio, Some(100));
    }

    #[test]
    fn test_into_settings() {
        let from_str = r#"{"extract": {"threshold": 10}}"#.into_settings().unwrap();
        assert_eq!(from_str.extract.threshold, 10);

        let from_toml = "[extract]\nthreshold = 20\n".to_string().into_settings().unwrap();
        assert_eq!(from_toml.extract.threshold, 20);

        let from_value = serde_json::json!({"verify": {"cades": false}})
            .into_settings()
            .unwrap();
        assert!(!from_value.verify.cades);
    }

    #[cfg(feature = "file_io")]
    #[test]
    fn test_with_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        std::fs::write(&path, r#"{"extract": {"max_entries": 7}}"#).unwrap();

        let settings = Settings::new().with_file(&path).unwrap();
        assert_eq!(settings.extract.max_entries, Some(7));

        let bad = dir.path().join("settings");
        std::fs::write(&bad, "{}").unwrap();
        assert!(Settings::new().with_file(&bad).is_err());
    }
}
