//! Phase state inspection and history commands.

use anyhow::Result;
use std::path::Path;

use phasewatch::history;
use phasewatch::layout::ProjectLayout;
use phasewatch::mode::Mode;
use phasewatch::store::DocumentStore;
use phasewatch::tracker::PhaseTracker;

pub fn cmd_status(project_dir: &Path) -> Result<()> {
    let tracker = PhaseTracker::new(ProjectLayout::new(project_dir));
    let decision = tracker.mode();

    println!();
    println!("Phasewatch Project Status");
    println!("=========================");
    println!();

    if let Some(error) = decision.error {
        println!("Mode:  {}", console::style("error").red());
        println!("       {}", error);
        println!();
        return Ok(());
    }

    let mode_text = match decision.mode {
        Mode::Builtin => "built-in (setup)",
        Mode::Framework => "framework",
        Mode::Error => "error",
    };
    println!("Mode:          {}", mode_text);

    let state = tracker.derived_state();
    println!(
        "Current phase: {}",
        state.current_phase.as_deref().unwrap_or("-")
    );

    let phases = tracker.phases();
    if phases.is_empty() {
        println!("Completed:     {}", state.completed.len());
    } else {
        println!(
            "Completed:     {} of {}",
            state.completed.len(),
            phases.len()
        );
    }
    if state.frozen {
        println!("Design freeze: {}", console::style("active").yellow());
    }

    let entries = tracker.named_history();
    println!();
    if entries.is_empty() {
        println!("No history recorded yet.");
    } else {
        println!("Recent activity:");
        for named in entries.iter().rev().take(5) {
            println!(
                "  {}  {} ({})",
                named.entry.timestamp, named.phase_name, named.entry.status
            );
        }
    }
    println!();
    Ok(())
}

pub fn cmd_history(project_dir: &Path) -> Result<()> {
    let tracker = PhaseTracker::new(ProjectLayout::new(project_dir));
    let entries = tracker.named_history();

    if entries.is_empty() {
        println!("No history recorded yet.");
        return Ok(());
    }

    for named in &entries {
        let mut line = format!(
            "{}  {:<12} {}",
            named.entry.timestamp, named.entry.status, named.phase_name
        );
        if let Some(target) = &named.entry.target {
            line.push_str(&format!(" -> {}", target));
        }
        if let Some(comment) = &named.entry.comment {
            line.push_str(&format!("  {}", console::style(comment).dim()));
        }
        println!("{}", line);
    }
    Ok(())
}

pub fn cmd_intervene(
    project_dir: &Path,
    phase: &str,
    status: &str,
    comment: Option<&str>,
    target: Option<&str>,
) -> Result<()> {
    let store = DocumentStore::new(ProjectLayout::new(project_dir));
    let entry = history::append_intervention(&store, phase, status, comment, target)?;
    println!("Recorded {} for phase {}", entry.status, entry.phase);
    Ok(())
}

pub fn cmd_reset(project_dir: &Path, force: bool) -> Result<()> {
    use dialoguer::Confirm;

    if !force {
        let confirm = Confirm::new()
            .with_prompt("This will erase the phase history. Are you sure?")
            .default(false)
            .interact()
            .unwrap_or(false);

        if !confirm {
            println!("Reset cancelled");
            return Ok(());
        }
    }

    let store = DocumentStore::new(ProjectLayout::new(project_dir));
    history::reset(&store)?;
    println!("Reset complete");
    Ok(())
}
