//! Job lifecycle: begin, link and count input, end.

use super::report;
use crate::error::CommandError;
use crate::extractor::SourceExtractor;
use crate::reply::Reply;
use crate::state::{AppState, JobStep, VerificationJob};
use rollcall_core::{IdentitySet, IgnoreSet, Source, SourceRole};

/// Start a new job, discarding the current one.
pub fn begin(state: &mut AppState) -> Vec<Reply> {
    state.job = VerificationJob::begin();
    tracing::info!("Job {} started", state.job.id);
    vec![Reply::text("Send me the main thread link.")]
}

/// Drop the job and the browser session. The ignore set survives.
pub async fn end<E: SourceExtractor + ?Sized>(state: &mut AppState, extractor: &mut E) -> Vec<Reply> {
    tracing::info!("Job {} cleared", state.job.id);
    state.reset_job();
    extractor.release().await;
    vec![Reply::text(
        "Job cleared. Ignore list is still active. Start fresh with /start.",
    )]
}

/// Non-command text, interpreted according to the current step.
pub async fn text<E: SourceExtractor + ?Sized>(
    state: &mut AppState,
    extractor: &mut E,
    text: &str,
) -> Vec<Reply> {
    match state.job.step {
        JobStep::Idle => vec![Reply::text("Use /start first.")],
        JobStep::AwaitingPrimaryLink => primary_link(state, extractor, text).await,
        JobStep::AwaitingVerificationCount => verification_count(state, text),
        JobStep::AwaitingVerificationLinks => verification_links(state, extractor, text).await,
    }
}

async fn primary_link<E: SourceExtractor + ?Sized>(
    state: &mut AppState,
    extractor: &mut E,
    text: &str,
) -> Vec<Reply> {
    let Ok(source) = Source::new(text, SourceRole::Primary) else {
        return vec![Reply::text("Please send a valid link (e.g., https://...).")];
    };

    let outcome = extract_filtered(extractor, &state.ignored, &source).await;
    match outcome {
        Ok(identities) if identities.is_empty() => vec![Reply::text(
            "No identities found in the link! Ensure credentials are valid.",
        )],
        Ok(identities) => {
            let count = identities.len();
            state.job.primary = Some(identities);
            state.job.step = JobStep::AwaitingVerificationCount;
            vec![Reply::text(format!(
                "Extracted {count} identities from the link. Now send the number of verification links."
            ))]
        }
        Err(notice) => vec![Reply::text(notice.to_string())],
    }
}

fn verification_count(state: &mut AppState, text: &str) -> Vec<Reply> {
    let text = text.trim();
    if text.is_empty() || !text.chars().all(|c| c.is_ascii_digit()) {
        return vec![Reply::text("Please enter a valid number.")];
    }

    let max = state.max_verification_links;
    // Digit strings too long for usize are over any bound.
    match text.parse::<usize>() {
        Ok(0) => vec![Reply::text("Please enter a number greater than 0.")],
        Ok(count) if count > max => too_many(max),
        Err(_) => too_many(max),
        Ok(count) => {
            state.job.open_slots(count);
            state.job.step = JobStep::AwaitingVerificationLinks;
            vec![Reply::text(format!(
                "Send me {count} verification links separated by commas (e.g., link1, link2, link3)."
            ))]
        }
    }
}

fn too_many(max: usize) -> Vec<Reply> {
    vec![Reply::text(format!("Please enter a number no greater than {max}."))]
}

async fn verification_links<E: SourceExtractor + ?Sized>(
    state: &mut AppState,
    extractor: &mut E,
    text: &str,
) -> Vec<Reply> {
    let links: Vec<&str> = text.split(',').map(str::trim).collect();
    let expected = state.job.secondaries.len();
    if links.len() != expected {
        return vec![Reply::text(format!(
            "Please provide exactly {expected} links separated by commas."
        ))];
    }

    let mut sources = Vec::with_capacity(links.len());
    for (index, link) in links.iter().enumerate() {
        let position = index + 1;
        match Source::new(link, SourceRole::Secondary(position)) {
            Ok(source) => sources.push(source),
            Err(_) => {
                return vec![Reply::text(format!(
                    "Invalid link at position {position}: '{link}'. All inputs must be valid URLs."
                ))]
            }
        }
    }

    for (index, source) in sources.iter().enumerate() {
        let position = index + 1;
        let outcome = extract_filtered(extractor, &state.ignored, source).await;
        match outcome {
            Ok(identities) if identities.is_empty() => {
                state.job.clear_slots();
                return vec![Reply::text(format!(
                    "No identities found in link {position}: '{}'! Ensure credentials are valid.",
                    source.url()
                ))];
            }
            Ok(identities) => state.job.secondaries[index] = Some(identities),
            Err(notice) => {
                state.job.clear_slots();
                return vec![Reply::text(
                    notice.for_link(position, source.url()).to_string(),
                )];
            }
        }
    }

    extractor.release().await;
    let mut replies = report::list(state);
    replies.extend(report::summary(state));
    state.job.step = JobStep::Idle;
    tracing::info!("Job {} complete", state.job.id);
    replies
}

/// Extract one source and drop ignored identities.
async fn extract_filtered<E: SourceExtractor + ?Sized>(
    extractor: &mut E,
    ignored: &IgnoreSet,
    source: &Source,
) -> Result<IdentitySet, CommandError> {
    match extractor.extract(source).await {
        Ok(identities) => {
            let raw = identities.len();
            let kept = identities.without_ignored(ignored);
            tracing::info!(
                "{}: {} identities ({} ignored)",
                source,
                kept.len(),
                raw - kept.len()
            );
            Ok(kept)
        }
        Err(e) => {
            tracing::error!("Extraction failed for {}: {}", source, e);
            Err(CommandError::from(e))
        }
    }
}
