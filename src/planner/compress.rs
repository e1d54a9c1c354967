//! JPEG recompression / compress plan (§4.6.3). Either a fixed resize% +
//! quality pair, or a target-size search that steps resize% down in 5-point
//! increments (floor 30) and then quality down in 5-point increments (floor
//! 40), picking the first combination whose heuristic size estimate clears
//! the target.

use super::InputSpec;
use crate::collector;
use crate::jpeg::codec;
use crate::model::{ExtensionSet, PlanItem, JPEG_EXTENSIONS};
use serde::Serialize;
use std::path::PathBuf;

#[derive(Debug, Clone, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum CompressMode {
    Fixed { resize_percent: u32, quality: u8 },
    TargetSize { target_bytes: u64 },
}

#[derive(Debug, Clone, serde::Deserialize)]
pub struct CompressRequest {
    pub inputs: Vec<PathBuf>,
    pub recursive: bool,
    pub mode: CompressMode,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CompressExtra {
    pub resize_percent: u32,
    pub quality: u8,
    pub estimated_bytes: u64,
}

const RESIZE_FLOOR: u32 = 30;
const RESIZE_STEP: u32 = 5;
const QUALITY_FLOOR: u32 = 40;
const QUALITY_STEP: u32 = 5;

/// Heuristic encoded-size model: `size ≈ source_size × (r/100)^2 × (q/100)^1.25`.
fn estimate_size(source_size: u64, resize_percent: u32, quality: u32) -> f64 {
    let r = resize_percent as f64 / 100.0;
    let q = quality as f64 / 100.0;
    source_size as f64 * r.powi(2) * q.powf(1.25)
}

/// Search the resize/quality grid for the least-aggressive combination whose
/// total estimated size across all inputs clears `target_bytes`. Falls back
/// to the floor combination (30% resize, 40% quality) if nothing in the grid
/// clears it — callers still get the smallest settings this solver offers.
fn solve_target_size(source_sizes: &[u64], target_bytes: u64) -> (u32, u32) {
    let total: u64 = source_sizes.iter().sum();
    if total == 0 {
        return (100, 100);
    }

    let mut resize = 100u32;
    while resize >= RESIZE_FLOOR {
        let mut quality = 100u32;
        while quality >= QUALITY_FLOOR {
            let estimated: f64 = source_sizes
                .iter()
                .map(|&s| estimate_size(s, resize, quality))
                .sum();
            if estimated <= target_bytes as f64 {
                return (resize, quality);
            }
            quality = quality.saturating_sub(QUALITY_STEP);
        }
        resize = resize.saturating_sub(RESIZE_STEP);
    }
    (RESIZE_FLOOR, QUALITY_FLOOR)
}

pub fn plan(request: &CompressRequest) -> Vec<PlanItem<CompressExtra>> {
    let input = InputSpec {
        inputs: request.inputs.clone(),
        recursive: request.recursive,
    };
    let outcome = collector::collect(&input.inputs, input.recursive, &ExtensionSet::from_list(JPEG_EXTENSIONS));

    let (resize_percent, quality) = match request.mode {
        CompressMode::Fixed { resize_percent, quality } => (resize_percent, quality as u32),
        CompressMode::TargetSize { target_bytes } => {
            let sizes: Vec<u64> = outcome.files.iter().map(|f| f.size).collect();
            solve_target_size(&sizes, target_bytes)
        }
    };

    outcome
        .files
        .into_iter()
        .map(|file| {
            let estimated = estimate_size(file.size, resize_percent, quality).round() as u64;
            if codec::dimensions(&file.path).is_err() {
                return PlanItem::skipped(
                    file.path.clone(),
                    "not a readable JPEG",
                    CompressExtra { resize_percent, quality: quality as u8, estimated_bytes: 0 },
                );
            }
            PlanItem::ready(
                file.path.clone(),
                Some(file.path.clone()),
                CompressExtra {
                    resize_percent,
                    quality: quality as u8,
                    estimated_bytes: estimated,
                },
            )
        })
        .collect()
}
