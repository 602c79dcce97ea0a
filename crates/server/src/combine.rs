//! Pixel-wise combination of two images into one result per operation.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use image::{imageops::FilterType, RgbImage};
use shared::protocol::RESULT_KEY_SUFFIX;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CombineOp {
    Xor,
    Add,
    Sub,
    Avg,
    Max,
    Min,
    And,
    Or,
}

/// Every operation, in the order results are reported.
pub const OPERATIONS: [CombineOp; 8] = [
    CombineOp::Xor,
    CombineOp::Add,
    CombineOp::Sub,
    CombineOp::Avg,
    CombineOp::Max,
    CombineOp::Min,
    CombineOp::And,
    CombineOp::Or,
];

impl CombineOp {
    pub fn name(self) -> &'static str {
        match self {
            CombineOp::Xor => "xor",
            CombineOp::Add => "add",
            CombineOp::Sub => "sub",
            CombineOp::Avg => "avg",
            CombineOp::Max => "max",
            CombineOp::Min => "min",
            CombineOp::And => "and",
            CombineOp::Or => "or",
        }
    }

    pub fn result_key(self) -> String {
        format!("{}{RESULT_KEY_SUFFIX}", self.name())
    }

    pub fn file_name(self) -> String {
        format!("{}.png", self.result_key())
    }

    pub fn from_file_name(file_name: &str) -> Option<Self> {
        OPERATIONS
            .into_iter()
            .find(|op| op.file_name() == file_name)
    }

    pub fn apply(self, a: u8, b: u8) -> u8 {
        match self {
            CombineOp::Xor => a ^ b,
            // Clamps at 255 rather than wrapping like a raw u8 add.
            CombineOp::Add => a.saturating_add(b),
            CombineOp::Sub => a.abs_diff(b),
            CombineOp::Avg => ((u16::from(a) + u16::from(b)) / 2) as u8,
            CombineOp::Max => a.max(b),
            CombineOp::Min => a.min(b),
            CombineOp::And => a & b,
            CombineOp::Or => a | b,
        }
    }
}

/// Decodes both inputs as RGB; the second is resized to the first's size.
pub fn decode_pair(image1: &[u8], image2: &[u8]) -> Result<(RgbImage, RgbImage)> {
    let first = image::load_from_memory(image1)
        .context("image1 is not a readable image")?
        .to_rgb8();
    let mut second = image::load_from_memory(image2)
        .context("image2 is not a readable image")?
        .to_rgb8();

    if first.dimensions() != second.dimensions() {
        tracing::debug!(
            from = ?second.dimensions(),
            to = ?first.dimensions(),
            "resizing image2 to match image1"
        );
        second = image::imageops::resize(&second, first.width(), first.height(), FilterType::Lanczos3);
    }
    Ok((first, second))
}

pub fn apply_op(op: CombineOp, first: &RgbImage, second: &RgbImage) -> RgbImage {
    let mut out = RgbImage::new(first.width(), first.height());
    for ((dst, a), b) in out.pixels_mut().zip(first.pixels()).zip(second.pixels()) {
        for channel in 0..3 {
            dst.0[channel] = op.apply(a.0[channel], b.0[channel]);
        }
    }
    out
}

/// Runs every operation and writes `{op}_result.png` into `output_dir`.
pub fn combine_into(
    image1: &[u8],
    image2: &[u8],
    output_dir: &Path,
) -> Result<Vec<(CombineOp, PathBuf)>> {
    let (first, second) = decode_pair(image1, image2)?;
    std::fs::create_dir_all(output_dir)
        .with_context(|| format!("failed to create output dir '{}'", output_dir.display()))?;

    let mut written = Vec::with_capacity(OPERATIONS.len());
    for op in OPERATIONS {
        let path = output_dir.join(op.file_name());
        apply_op(op, &first, &second)
            .save(&path)
            .with_context(|| format!("failed to write {} result", op.name()))?;
        tracing::debug!(op = op.name(), path = %path.display(), "wrote combine result");
        written.push((op, path));
    }
    Ok(written)
}

/// Removes request directories under `output_dir` beyond the newest `keep`.
/// `current` always survives; directories not named by a request id are left
/// alone. Returns how many were removed.
pub fn sweep_request_dirs(output_dir: &Path, current: &Path, keep: usize) -> Result<usize> {
    let mut older = Vec::new();
    for entry in std::fs::read_dir(output_dir)
        .with_context(|| format!("failed to list '{}'", output_dir.display()))?
    {
        let entry = entry?;
        let path = entry.path();
        let is_request_dir = entry.file_type()?.is_dir()
            && entry
                .file_name()
                .to_str()
                .is_some_and(|name| Uuid::parse_str(name).is_ok());
        if !is_request_dir || path == current {
            continue;
        }
        let modified = entry.metadata()?.modified()?;
        older.push((modified, path));
    }

    older.sort_by(|a, b| b.0.cmp(&a.0));
    let mut removed = 0;
    for (_, path) in older.into_iter().skip(keep.saturating_sub(1)) {
        std::fs::remove_dir_all(&path)
            .with_context(|| format!("failed to remove '{}'", path.display()))?;
        tracing::debug!(path = %path.display(), "swept old request output");
        removed += 1;
    }
    Ok(removed)
}

#[cfg(test)]
#[path = "tests/combine_tests.rs"]
mod tests;
