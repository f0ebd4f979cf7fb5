//! Input and output file names of each pipeline.
//!
//! The vendor file names are fixed; only the folder they live in varies.

use std::path::{Path, PathBuf};

/// Raw-data export as delivered.
pub const RAW_DATA_CSV: &str = "EthiFinance ESG ratings - Universe - Raw Datas.csv";
/// Workbook conversion of [`RAW_DATA_CSV`].
pub const RAW_DATA_XLSX: &str = "EthiFinance ESG ratings - Universe - Raw Datas.xlsx";
pub const RAW_DATA_PREPROCESSED: &str =
    "EthiFinance ESG ratings - Universe - Raw Datas - Preprocessed.xlsx";

// The yearly raw-data exports carry two spaces before the year.
pub const RAW_DATA_2023: &str = "EthiFinance ESG ratings - Universe - Raw Datas -  2023.xlsx";
pub const RAW_DATA_2024: &str = "EthiFinance ESG ratings - Universe - Raw Datas -  2024.xlsx";
pub const JOB_FRANCE_OUTPUT: &str = "EthiFinance ESG ratings - Universe - Job in France.xlsx";

pub const RATINGS_2024: &str = "EthiFinance ESG ratings - Universe - Ratings - 2024.xlsx";
pub const RATINGS_2025: &str = "EthiFinance ESG ratings - Universe - Ratings - 2025.csv";
pub const RATINGS_OUTPUT: &str = "EthiFinance ESG ratings - Universe - Ratings - Preprocessed.xlsx";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UniverseConfig {
    pub raw_csv: PathBuf,
    pub raw_xlsx: PathBuf,
    pub output: PathBuf,
}

impl UniverseConfig {
    pub fn in_dir(dir: &Path) -> Self {
        Self {
            raw_csv: dir.join(RAW_DATA_CSV),
            raw_xlsx: dir.join(RAW_DATA_XLSX),
            output: dir.join(RAW_DATA_PREPROCESSED),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobFranceConfig {
    pub previous: PathBuf,
    pub current: PathBuf,
    pub output: PathBuf,
}

impl JobFranceConfig {
    pub fn in_dir(dir: &Path) -> Self {
        Self {
            previous: dir.join(RAW_DATA_2023),
            current: dir.join(RAW_DATA_2024),
            output: dir.join(JOB_FRANCE_OUTPUT),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RatingsConfig {
    pub previous: PathBuf,
    pub current: PathBuf,
    pub output: PathBuf,
}

impl RatingsConfig {
    pub fn in_dir(dir: &Path) -> Self {
        Self {
            previous: dir.join(RATINGS_2024),
            current: dir.join(RATINGS_2025),
            output: dir.join(RATINGS_OUTPUT),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_paths_are_joined_to_data_dir() {
        let config = JobFranceConfig::in_dir(Path::new("/exports"));
        assert_eq!(
            config.current,
            PathBuf::from("/exports/EthiFinance ESG ratings - Universe - Raw Datas -  2024.xlsx")
        );
        assert!(RatingsConfig::in_dir(Path::new("d")).current.ends_with(RATINGS_2025));
    }
}
