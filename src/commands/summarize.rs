//! `player-ci summarize`

use std::path::PathBuf;

use junit_summary::{SummaryOutcome, TestIndex};

use super::CommandError;
use crate::config::{CiEnvironment, SummarySettings};

/// Command-line inputs for the summarizer
#[derive(Debug, Clone, Default)]
pub struct SummarizeArgs {
    /// Android JUnit results file
    pub android: Option<PathBuf>,
    /// iOS JUnit results file
    pub ios: Option<PathBuf>,
    /// Directory of test sources used to locate failing tests
    pub test_root: Option<PathBuf>,
}

/// Summarize results and append the Markdown to the job summary.
pub fn run(
    args: &SummarizeArgs,
    settings: &SummarySettings,
    env: &CiEnvironment,
) -> Result<SummaryOutcome, CommandError> {
    let index = match &args.test_root {
        Some(root) => TestIndex::scan(root, &settings.index_options())?,
        None => TestIndex::default(),
    };

    let inputs = env.platform_inputs(args.android.clone(), args.ios.clone());
    let outcome = junit_summary::summarize(&inputs, &index, &settings.summary_options())?;

    match env.append_step_summary(&outcome.markdown) {
        Ok(Some(path)) => tracing::info!(path = %path.display(), "appended job summary"),
        Ok(None) => tracing::debug!("no job summary destination configured"),
        Err(source) => {
            return Err(CommandError::SummaryWrite {
                path: env.step_summary_path.clone().unwrap_or_default(),
                source,
            })
        }
    }

    Ok(outcome)
}
