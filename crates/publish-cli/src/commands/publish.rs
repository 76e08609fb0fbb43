//! Publish command implementation

use std::path::Path;
use std::time::Duration;

use colored::Colorize;

use publish_core::{
    ChangeSet, PublishConfig, PublishOrchestrator, PublishOutcome, PublishReport, Secret,
    Settings, format_elapsed,
};
use publish_fs::display_size;
use publish_scm::provider_for;

use crate::cli::PublishArgs;
use crate::error::Result;

/// Run the publish command
///
/// Loads the configuration from `cwd` (or `--config`), applies the flags
/// and settings credentials, then runs the orchestrator.
pub fn run_publish(cwd: &Path, args: &PublishArgs) -> Result<()> {
    let mut config = PublishConfig::load_or_default(args.config.as_deref(), cwd)?;
    apply_overrides(&mut config, args);
    let settings = Settings::load_or_default(args.settings.as_deref())?;
    config.apply_settings(&settings);

    if config.skip_deployment {
        if !args.json {
            println!("{} skip-deployment is set: nothing published.", "SKIPPED".yellow().bold());
        }
        return Ok(());
    }

    if !args.json {
        println!(
            "{} Publishing {} to {}",
            "=>".blue().bold(),
            config.content.display().to_string().cyan(),
            config.pub_scm_url.cyan()
        );
    }

    let repository = config.repository()?;
    let provider = provider_for(&repository.url)?;
    let outcome = PublishOrchestrator::new(&config, provider.as_ref()).run()?;

    let PublishOutcome::Completed(report) = outcome else {
        return Ok(());
    };

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_report(&report, &config);
    }
    Ok(())
}

/// Fold command-line flags into `config`. Repeatable flags extend the lists.
pub fn apply_overrides(config: &mut PublishConfig, args: &PublishArgs) {
    if let Some(url) = &args.url {
        config.pub_scm_url = url.clone();
    }
    if let Some(content) = &args.content {
        config.content = content.clone();
    }
    if let Some(dir) = &args.checkout_directory {
        config.checkout_directory = dir.clone();
    }
    if let Some(sub) = &args.sub_directory {
        config.sub_directory = Some(sub.clone());
    }
    if let Some(branch) = &args.branch {
        config.scm_branch = Some(branch.clone());
    }
    if let Some(message) = &args.message {
        config.checkin_comment = message.clone();
    }
    if let Some(username) = &args.username {
        config.username = Some(username.clone());
    }
    if let Some(password) = &args.password {
        config.password = Some(Secret::new(password.clone()));
    }
    if let Some(server_id) = &args.server_id {
        config.server_id = Some(server_id.clone());
    }

    config.try_update |= args.try_update;
    config.dry_run |= args.dry_run;
    config.skip_checkin |= args.skip_checkin;
    config.skip_deleted_files |= args.skip_deleted_files;
    config.add_unique_directory |= args.add_unique_directory;
    if args.no_remote_creation {
        config.automatic_remote_path_creation = false;
    }

    config.ignore_paths_to_delete.extend(args.ignore_paths.iter().cloned());
    config.protected_names.extend(args.protected_names.iter().cloned());
    config
        .extra_normalize_extensions
        .extend(args.normalize_extensions.iter().cloned());
}

fn print_report(report: &PublishReport, config: &PublishConfig) {
    let changes = &report.changes;
    println!(
        "   Content consists of {} directories and {} files = {}",
        changes.stats.directories,
        changes.stats.files,
        display_size(changes.stats.total_bytes)
    );
    println!(
        "   Publishing content to SCM will result in {} addition(s), {} update(s), {} delete(s)",
        changes.added.len(),
        changes.updated.len(),
        changes.deleted.len()
    );

    if report.dry_run {
        print_changes(changes);
        println!(
            "{} No changes were made to {}",
            "DRY-RUN".yellow().bold(),
            config.pub_scm_url
        );
        return;
    }

    match &report.check_in {
        Some(check_in) => println!(
            "{} Checked in {} file(s) to revision {} in {}",
            "OK".green().bold(),
            check_in.files,
            check_in.revision.as_deref().unwrap_or("-"),
            format_elapsed(Duration::from_secs(check_in.elapsed_secs))
        ),
        None => println!(
            "{} Changes staged in {}; check-in skipped.",
            "OK".green().bold(),
            config.checkout_directory.cyan()
        ),
    }
}

fn print_changes(changes: &ChangeSet) {
    for path in &changes.added {
        println!("   {} {}", "- addition".green(), path);
    }
    for path in &changes.updated {
        println!("   {} {}", "- update  ".yellow(), path);
    }
    for path in &changes.deleted {
        println!("   {} {}", "- delete  ".red(), path);
    }
}
