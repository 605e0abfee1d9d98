//! Cleaning profiles: the column catalog, date formats, numeric defaults and
//! derived-column definitions that drive one pipeline run.
//!
//! [`CleaningProfile::retail()`] is the built-in profile for retail order
//! extracts. Profiles can be saved to and loaded from YAML so the catalog can
//! be extended for extracts carrying extra columns.

use std::{fs::File, io::BufReader, path::Path};

use anyhow::{Context, Result, ensure};
use heck::ToSnakeCase;
use serde::{Deserialize, Serialize};

use crate::{
    data::Value,
    dates::{self, DEFAULT_DATE_FORMATS, DatePattern},
    derive::{self, DerivedColumn},
    error::CleanError,
    schema::ColumnType,
};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogEntry {
    pub source: String,
    pub name: String,
}

impl CatalogEntry {
    pub fn new(source: &str, name: &str) -> Self {
        Self {
            source: source.to_string(),
            name: name.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NumericField {
    pub source: String,
    pub name: String,
    pub datatype: ColumnType,
    #[serde(default)]
    pub default: f64,
}

impl NumericField {
    fn new(source: &str, name: &str, datatype: ColumnType, default: f64) -> Self {
        Self {
            source: source.to_string(),
            name: name.to_string(),
            datatype,
            default,
        }
    }

    pub fn default_value(&self) -> Value {
        match self.datatype {
            ColumnType::Integer => Value::Integer(self.default as i64),
            _ => Value::Float(self.default),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CleaningProfile {
    pub catalog: Vec<CatalogEntry>,
    pub date_columns: Vec<String>,
    #[serde(default = "CleaningProfile::default_date_formats")]
    pub date_formats: Vec<String>,
    pub numeric_columns: Vec<NumericField>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub derived: Vec<String>,
}

impl Default for CleaningProfile {
    fn default() -> Self {
        Self::retail()
    }
}

impl CleaningProfile {
    pub fn retail() -> Self {
        let catalog = [
            ("Row ID", "row_id"),
            ("Order ID", "order_id"),
            ("Order Date", "order_date"),
            ("Ship Date", "ship_date"),
            ("Ship Mode", "ship_mode"),
            ("Customer ID", "customer_id"),
            ("Product ID", "product_id"),
            ("Sub-Category", "sub_category"),
            ("Product Name", "product_name"),
        ]
        .iter()
        .map(|(source, name)| CatalogEntry::new(source, name))
        .collect();
        CleaningProfile {
            catalog,
            date_columns: vec!["order_date".to_string(), "ship_date".to_string()],
            date_formats: Self::default_date_formats(),
            numeric_columns: vec![
                NumericField::new("Sales", "sales", ColumnType::Float, 0.0),
                NumericField::new("Quantity", "quantity", ColumnType::Integer, 0.0),
                NumericField::new("Discount", "discount", ColumnType::Float, 0.0),
                NumericField::new("Profit", "profit", ColumnType::Float, 0.0),
            ],
            derived: vec![
                "cost_estimate = sales - profit".to_string(),
                "discount_amount = sales * discount".to_string(),
            ],
        }
    }

    fn default_date_formats() -> Vec<String> {
        DEFAULT_DATE_FORMATS.iter().map(|f| f.to_string()).collect()
    }

    pub fn date_patterns(&self) -> Result<Vec<DatePattern>, CleanError> {
        dates::parse_patterns(&self.date_formats)
    }

    pub fn derived_columns(&self) -> Result<Vec<DerivedColumn>, CleanError> {
        derive::parse_derived_columns(&self.derived)
    }

    pub fn validate(&self) -> Result<()> {
        ensure!(
            !self.date_formats.is_empty() || self.date_columns.is_empty(),
            "Profile lists date columns but no date formats"
        );
        self.date_patterns()?;
        self.derived_columns()?;
        for field in &self.numeric_columns {
            ensure!(
                field.datatype.is_numeric(),
                "Numeric column '{}' must be Integer or Float, not {}",
                field.name,
                field.datatype
            );
            ensure!(
                field.default.is_finite(),
                "Default for '{}' must be a finite number",
                field.name
            );
            if field.datatype == ColumnType::Integer {
                ensure!(
                    field.default.fract() == 0.0,
                    "Default for integer column '{}' must be a whole number",
                    field.name
                );
            }
        }
        let mut names = self
            .catalog
            .iter()
            .map(|entry| entry.name.as_str())
            .collect::<Vec<_>>();
        names.sort_unstable();
        if let Some(pair) = names.windows(2).find(|pair| pair[0] == pair[1]) {
            anyhow::bail!("Catalog maps more than one column to '{}'", pair[0]);
        }
        Ok(())
    }

    /// Adds a snake_case catalog entry for every header the catalog does not
    /// already cover.
    pub fn extend_catalog_from_headers(&mut self, headers: &[String]) -> usize {
        let numeric_sources = self
            .numeric_columns
            .iter()
            .map(|field| field.source.to_ascii_lowercase())
            .collect::<Vec<_>>();
        let mut added = 0usize;
        for header in headers {
            let covered = self
                .catalog
                .iter()
                .any(|entry| entry.source == *header || entry.name == *header)
                || numeric_sources.contains(&header.to_ascii_lowercase());
            let canonical = header.to_snake_case();
            if covered || canonical.is_empty() || canonical == *header {
                continue;
            }
            self.catalog.push(CatalogEntry::new(header, &canonical));
            added += 1;
        }
        added
    }

    pub fn load(path: &Path) -> Result<Self> {
        let file = File::open(path).with_context(|| format!("Opening profile file {path:?}"))?;
        let reader = BufReader::new(file);
        let profile: CleaningProfile =
            serde_yaml::from_reader(reader).context("Parsing profile YAML")?;
        profile
            .validate()
            .with_context(|| format!("Validating profile {path:?}"))?;
        Ok(profile)
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        let file = File::create(path).with_context(|| format!("Creating profile file {path:?}"))?;
        serde_yaml::to_writer(file, self).context("Writing profile YAML")
    }

    pub fn to_yaml_string(&self) -> Result<String> {
        serde_yaml::to_string(self).context("Serializing profile to YAML string")
    }
}
