//! Start-request validation and the in-sample / out-of-sample split.

use thiserror::Error;

use edgeforge_core::domain::bar::first_unordered;
use edgeforge_core::Bar;

use crate::settings::{OptimizationSettings, SettingsError};

#[derive(Debug, Error)]
pub enum InputError {
    #[error("no bars provided")]
    EmptyBars,
    #[error("bar {index} is not strictly after the previous bar")]
    UnorderedBars { index: usize },
    #[error("bar {index} has non-finite or inconsistent OHLCV values")]
    InvalidBar { index: usize },
    #[error(
        "{bars} bars leave {in_sample} in-sample and {out_of_sample} out-of-sample; both must be non-empty"
    )]
    InsufficientBars {
        bars: usize,
        in_sample: usize,
        out_of_sample: usize,
    },
    #[error(transparent)]
    Settings(#[from] SettingsError),
}

/// Index of the first out-of-sample bar.
pub fn split_index(total_bars: usize, in_sample_percentage: f64) -> usize {
    ((total_bars as f64 * in_sample_percentage).floor() as usize).min(total_bars)
}

/// Check settings and bars; returns the split index on success.
pub fn validate_request(bars: &[Bar], settings: &OptimizationSettings) -> Result<usize, InputError> {
    settings.validate()?;

    if bars.is_empty() {
        return Err(InputError::EmptyBars);
    }
    if let Some(index) = bars.iter().position(|b| !b.is_sane()) {
        return Err(InputError::InvalidBar { index });
    }
    if let Some(index) = first_unordered(bars) {
        return Err(InputError::UnorderedBars { index });
    }

    let split = split_index(bars.len(), settings.in_sample_percentage);
    if split == 0 || split == bars.len() {
        return Err(InputError::InsufficientBars {
            bars: bars.len(),
            in_sample: split,
            out_of_sample: bars.len() - split,
        });
    }
    Ok(split)
}
