use std::fmt::Write as _;
use std::fs;
use std::path::Path;

use crate::error::HmmError;

/// Frame-major cepstral features, as exchanged with template matchers.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureMatrix {
    pub label: String,
    pub marker: String,
    frames: Vec<Vec<f64>>,
}

impl FeatureMatrix {
    /// Every frame must have the same number of coefficients.
    pub fn new(
        label: impl Into<String>,
        marker: impl Into<String>,
        frames: Vec<Vec<f64>>,
    ) -> Result<Self, HmmError> {
        let label = label.into();
        let marker = marker.into();
        if label.contains('\n') || marker.contains('\n') {
            return Err(HmmError::invalid_input(
                "feature label and marker must be single-line",
            ));
        }
        if let Some(width) = frames.first().map(Vec::len) {
            if let Some(idx) = frames.iter().position(|f| f.len() != width) {
                return Err(HmmError::invalid_input(format!(
                    "frame #{idx} has {} coefficients, expected {width}",
                    frames[idx].len()
                )));
            }
        }
        Ok(Self {
            label,
            marker,
            frames,
        })
    }

    pub fn frames(&self) -> &[Vec<f64>] {
        &self.frames
    }

    pub fn frame_count(&self) -> usize {
        self.frames.len()
    }

    pub fn width(&self) -> usize {
        self.frames.first().map_or(0, Vec::len)
    }
}

/// Black-box audio front-end producing a feature matrix for one file.
pub trait FeatureExtractor: Send + Sync {
    fn extract(&self, audio_path: &Path) -> Result<FeatureMatrix, HmmError>;
}

/// Label line, marker line, frame count line, then one line per frame of
/// space-separated coefficients with six decimals.
pub fn format_feature_file(features: &FeatureMatrix) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{}", features.label);
    let _ = writeln!(out, "{}", features.marker);
    let _ = writeln!(out, "{}", features.frame_count());
    for frame in &features.frames {
        let line = frame
            .iter()
            .map(|c| format!("{c:.6}"))
            .collect::<Vec<_>>()
            .join(" ");
        let _ = writeln!(out, "{line}");
    }
    out
}

const MAX_PREALLOC_FRAMES: usize = 4096;

pub fn parse_feature_file(contents: &str) -> Result<FeatureMatrix, HmmError> {
    const CONTEXT: &str = "parse feature file";
    let mut lines = contents.lines();
    let label = lines
        .next()
        .ok_or_else(|| HmmError::parse(CONTEXT, 1, "missing label line"))?;
    let marker = lines
        .next()
        .ok_or_else(|| HmmError::parse(CONTEXT, 2, "missing marker line"))?;
    let count_line = lines
        .next()
        .ok_or_else(|| HmmError::parse(CONTEXT, 3, "missing frame count"))?;
    let frame_count = count_line
        .trim()
        .parse::<usize>()
        .map_err(|e| HmmError::parse(CONTEXT, 3, format!("invalid frame count: {e}")))?;

    // The header is untrusted; frames beyond this grow the vector as read.
    let mut frames = Vec::with_capacity(frame_count.min(MAX_PREALLOC_FRAMES));
    for (offset, line) in lines.take(frame_count).enumerate() {
        let line_no = offset + 4;
        let frame = line
            .split_whitespace()
            .map(|field| {
                field.parse::<f64>().map_err(|e| {
                    HmmError::parse(CONTEXT, line_no, format!("invalid coefficient '{field}': {e}"))
                })
            })
            .collect::<Result<Vec<_>, _>>()?;
        frames.push(frame);
    }
    if frames.len() != frame_count {
        return Err(HmmError::parse(
            CONTEXT,
            frames.len() + 4,
            format!("expected {frame_count} frames, found {}", frames.len()),
        ));
    }
    FeatureMatrix::new(label.trim_end(), marker.trim_end(), frames)
}

pub fn write_feature_file(path: &Path, features: &FeatureMatrix) -> Result<(), HmmError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|e| HmmError::io("create feature directory", e))?;
    }
    fs::write(path, format_feature_file(features)).map_err(|e| HmmError::io("write feature file", e))
}

pub fn read_feature_file(path: &Path) -> Result<FeatureMatrix, HmmError> {
    let contents = fs::read_to_string(path).map_err(|e| HmmError::io("read feature file", e))?;
    parse_feature_file(&contents)
}

/// Runs `extractor` on `audio_path` and stores the result under `out_path`.
pub fn extract_to_file(
    extractor: &dyn FeatureExtractor,
    audio_path: &Path,
    out_path: &Path,
) -> Result<FeatureMatrix, HmmError> {
    let features = extractor.extract(audio_path)?;
    write_feature_file(out_path, &features)?;
    tracing::debug!(
        audio = %audio_path.display(),
        out = %out_path.display(),
        frames = features.frame_count(),
        width = features.width(),
        "features: wrote feature file"
    );
    Ok(features)
}
