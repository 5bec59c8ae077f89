//! Audio transformer - builds tool arguments for an operation and runs them

use super::options::{
    EchoOptions, ReverbOptions, SpeedOptions, TrimOptions, NORMALIZE_FILTER,
};
use crate::tool::{ToolRunner, TransformError};
use crate::validator::ValidationError;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use wavesmith_core::constants::OUTPUT_FORMAT;

#[derive(Debug, Clone, PartialEq)]
pub enum AudioOperation {
    Reverb(ReverbOptions),
    Echo(EchoOptions),
    SpeedPitch(SpeedOptions),
    Normalize,
    Trim(TrimOptions),
    /// Concatenate all inputs in upload order.
    Merge,
}

impl AudioOperation {
    pub fn name(&self) -> &'static str {
        match self {
            AudioOperation::Reverb(_) => "reverb",
            AudioOperation::Echo(_) => "echo",
            AudioOperation::SpeedPitch(_) => "change_speed_and_pitch",
            AudioOperation::Normalize => "normalize",
            AudioOperation::Trim(_) => "trim",
            AudioOperation::Merge => "merge",
        }
    }

    /// Message shown to clients when the tool fails for this operation.
    pub fn failure_message(&self) -> &'static str {
        match self {
            AudioOperation::Reverb(_) => "Error applying reverb",
            AudioOperation::Echo(_) => "Error applying echo",
            AudioOperation::SpeedPitch(_) => "Error changing speed and pitch",
            AudioOperation::Normalize => "Error normalizing audio",
            AudioOperation::Trim(_) => "Error trimming audio",
            AudioOperation::Merge => "Error merging audio",
        }
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        match self {
            AudioOperation::Echo(options) => options.validate(),
            AudioOperation::SpeedPitch(options) => options.validate(),
            AudioOperation::Trim(options) => options.validate(),
            AudioOperation::Reverb(_) | AudioOperation::Normalize | AudioOperation::Merge => Ok(()),
        }
    }

    pub fn check_input_count(&self, actual: usize) -> Result<(), ValidationError> {
        let ok = match self {
            AudioOperation::Merge => actual >= 2,
            _ => actual == 1,
        };
        if ok {
            return Ok(());
        }
        Err(ValidationError::InputCount {
            operation: self.name(),
            expected: if matches!(self, AudioOperation::Merge) { 2 } else { 1 },
            actual,
        })
    }

    /// Full argument list for the tool, inputs in the given order.
    pub fn build_args(&self, inputs: &[PathBuf], output: &Path) -> Vec<String> {
        let mut args: Vec<String> = ["-hide_banner", "-nostdin", "-y"]
            .iter()
            .map(|s| s.to_string())
            .collect();

        if let AudioOperation::Trim(trim) = self {
            args.extend(["-ss".to_string(), trim.start_arg()]);
        }

        for input in inputs {
            args.extend(["-i".to_string(), input.to_string_lossy().to_string()]);
        }

        match self {
            AudioOperation::Reverb(options) => {
                args.extend(["-af".to_string(), options.filter_expression()]);
            }
            AudioOperation::Echo(options) => {
                args.extend(["-af".to_string(), options.filter_expression()]);
            }
            AudioOperation::SpeedPitch(options) => {
                args.extend(["-af".to_string(), options.filter_expression()]);
            }
            AudioOperation::Normalize => {
                args.extend(["-af".to_string(), NORMALIZE_FILTER.to_string()]);
            }
            AudioOperation::Trim(trim) => {
                args.extend(["-t".to_string(), trim.duration_arg()]);
            }
            AudioOperation::Merge => {
                args.extend([
                    "-filter_complex".to_string(),
                    concat_filter(inputs.len()),
                    "-map".to_string(),
                    "[out]".to_string(),
                ]);
            }
        }

        args.extend([
            "-f".to_string(),
            OUTPUT_FORMAT.to_string(),
            output.to_string_lossy().to_string(),
        ]);
        args
    }
}

/// `[0:a][1:a]...concat=n=N:v=0:a=1[out]`
fn concat_filter(count: usize) -> String {
    let labels: String = (0..count).map(|i| format!("[{}:a]", i)).collect();
    format!("{}concat=n={}:v=0:a=1[out]", labels, count)
}

/// Runs [`AudioOperation`]s through a [`ToolRunner`].
#[derive(Clone)]
pub struct AudioTransformer {
    runner: Arc<dyn ToolRunner>,
}

impl AudioTransformer {
    pub fn new(runner: Arc<dyn ToolRunner>) -> Self {
        Self { runner }
    }

    pub fn runner(&self) -> &Arc<dyn ToolRunner> {
        &self.runner
    }

    #[tracing::instrument(skip(self, operation, inputs, output), fields(operation = operation.name(), inputs = inputs.len()))]
    pub async fn apply(
        &self,
        operation: &AudioOperation,
        inputs: &[PathBuf],
        output: &Path,
    ) -> Result<(), TransformError> {
        operation.check_input_count(inputs.len())?;
        operation.validate()?;

        for input in inputs {
            tokio::fs::metadata(input)
                .await
                .map_err(|source| TransformError::MissingInput {
                    path: input.clone(),
                    source,
                })?;
        }

        let args = operation.build_args(inputs, output);
        tracing::debug!(args = ?args, "Invoking media tool");
        self.runner.run(&args).await?;
        tracing::info!(output = %output.display(), "Audio transformation completed");
        Ok(())
    }
}
