//! Record a voice note and review the generated cards
//!
//! 1. Capture from the microphone (or `--file`) until Enter
//! 2. Transcribe, then let the user edit the transcript
//! 3. Generate candidate cards and pick which ones to keep
//! 4. Bulk-create the selection

use anyhow::{Context, Result};
use console::style;
use std::io::Write;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use voicecards_core::audio::{AudioSource, FileSource, MemorySource};
use voicecards_core::view::{format_elapsed, selection_summary};
use voicecards_core::{AppContext, Card, SharedWorkflow, WorkflowError, WorkflowState};

use crate::app::{self, require_session};
use crate::interactive;

pub async fn run(ctx: &mut AppContext, file: Option<PathBuf>) -> Result<()> {
    require_session(ctx).await?;

    let live = file.is_none();
    let source = audio_source(ctx, file)?;
    let workflow = ctx.workflow();

    let created: Arc<Mutex<Vec<Card>>> = Arc::default();
    let sink = created.clone();
    workflow
        .on_cards_created(move |cards| {
            sink.lock()
                .unwrap_or_else(|e| e.into_inner())
                .extend_from_slice(cards);
        })
        .await;

    workflow.start_recording(source.as_ref()).await?;
    if live {
        capture_until_enter(&workflow).await?;
    }

    println!("{}", style("Transcribing...").dim());
    workflow.stop_and_transcribe().await?;
    let snapshot = workflow.snapshot().await;
    if snapshot.state == WorkflowState::Idle {
        interactive::error(snapshot.error.as_deref().unwrap_or("Transcription failed"));
        std::process::exit(1);
    }

    if !review_transcript(&workflow).await? || !review_candidates(&workflow).await? {
        workflow.close().await;
        interactive::info("Discarded");
        return Ok(());
    }

    let created = std::mem::take(&mut *created.lock().unwrap_or_else(|e| e.into_inner()));
    ctx.cards.prepend(&created);
    interactive::success(&format!("Created {} cards", created.len()));
    for card in &created {
        app::print_card_line(card);
    }
    Ok(())
}

fn audio_source(ctx: &AppContext, file: Option<PathBuf>) -> Result<Box<dyn AudioSource>> {
    if let Some(path) = file {
        return Ok(Box::new(FileSource::new(path)));
    }
    if ctx.is_mock() {
        return Ok(Box::new(MemorySource::silence()?));
    }
    microphone()
}

#[cfg(feature = "microphone")]
fn microphone() -> Result<Box<dyn AudioSource>> {
    Ok(Box::new(voicecards_core::audio::MicrophoneSource::new()))
}

#[cfg(not(feature = "microphone"))]
fn microphone() -> Result<Box<dyn AudioSource>> {
    anyhow::bail!(
        "This build has no microphone support.\n\
         Pass a recording with --file PATH, try --mock, or rebuild with --features microphone"
    )
}

/// Tick the elapsed counter once per second until Enter is pressed
async fn capture_until_enter(workflow: &SharedWorkflow) -> Result<()> {
    println!("Recording... press {} to stop", style("Enter").bold());

    let mut stop = tokio::task::spawn_blocking(app::wait_for_enter);
    let mut ticker = tokio::time::interval(Duration::from_secs(1));
    ticker.tick().await;

    loop {
        tokio::select! {
            result = &mut stop => {
                result.context("Key listener failed")??;
                println!();
                return Ok(());
            }
            _ = ticker.tick() => {
                workflow.tick().await;
                let elapsed = workflow.with(|wf| wf.recording_time()).await;
                print!("\r  {} {}", style("●").red(), format_elapsed(elapsed));
                std::io::stdout().flush().ok();
            }
        }
    }
}

/// Edit the transcript and generate candidates; false when the user gives up
async fn review_transcript(workflow: &SharedWorkflow) -> Result<bool> {
    let actions = ["Generate cards", "Edit transcript", "Discard"];
    loop {
        let snapshot = workflow.snapshot().await;
        if snapshot.state == WorkflowState::Results {
            return Ok(true);
        }

        interactive::header("Transcript");
        println!("{}", snapshot.transcript);
        println!();
        if let Some(error) = &snapshot.error {
            interactive::error(error);
        }

        match interactive::select("What next?", &actions, Some(0))? {
            0 => {
                println!("{}", style("Generating cards...").dim());
                match workflow.generate().await {
                    Ok(_) | Err(WorkflowError::EmptyTranscript) => {}
                    Err(e) => return Err(e.into()),
                }
            }
            1 => {
                let text = interactive::input("Transcript", Some(&snapshot.transcript))?;
                workflow.set_transcript(text).await?;
            }
            _ => return Ok(false),
        }
    }
}

/// Pick candidates and create them; false when the user gives up
async fn review_candidates(workflow: &SharedWorkflow) -> Result<bool> {
    loop {
        let snapshot = workflow.snapshot().await;
        if snapshot.state == WorkflowState::Idle {
            return Ok(true);
        }

        interactive::header("Generated cards");
        if snapshot.candidates.is_empty() {
            interactive::info("No cards could be generated from this transcript");
            return Ok(false);
        }
        if let Some(error) = &snapshot.error {
            interactive::error(error);
        }
        let items: Vec<String> = snapshot
            .candidates
            .iter()
            .map(|c| format!("{} - {}", c.title, style(&c.content).dim()))
            .collect();
        let picked = interactive::multi_select(
            "Select the cards to keep (space toggles)",
            &items,
            &snapshot.selected,
        )?;

        for (index, was_selected) in snapshot.selected.iter().enumerate() {
            if *was_selected != picked.contains(&index) {
                workflow.toggle(index).await?;
            }
        }

        let actions = [selection_summary(picked.len()), "Discard".to_string()];
        if interactive::select("Confirm", &actions, Some(0))? != 0 {
            return Ok(false);
        }
        match workflow.confirm().await {
            Ok(_) => {}
            Err(WorkflowError::EmptySelection) => {}
            Err(e) => return Err(e.into()),
        }
    }
}
