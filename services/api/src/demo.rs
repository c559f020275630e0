use crate::infra::{default_guild_config, InMemoryLootStore, DEMO_GUILD, DEMO_TIER};
use crate::routes::summarize_by_member;
use chrono::{Local, NaiveDate};
use clap::Args;
use guild_loot::config::LootConfig;
use guild_loot::error::AppError;
use guild_loot::workflows::loot::{
    AttendanceImporter, BoardEntry, GuildId, ItemPriority, LootPriorityService, MemberId, Rank,
    SubmissionId, SubmissionStatus, SubmissionValidation, TierId,
};
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Args, Debug, Default)]
pub(crate) struct DemoArgs {
    /// Reporting date (YYYY-MM-DD). Defaults to today.
    #[arg(long, value_parser = crate::infra::parse_date)]
    pub(crate) today: Option<NaiveDate>,
    /// Member whose competition view is printed at the end.
    #[arg(long, default_value = "thrall")]
    pub(crate) member: String,
    /// Rank used for the sample loot score line.
    #[arg(long, default_value_t = 50)]
    pub(crate) rank: u8,
}

#[derive(Args, Debug)]
pub(crate) struct AttendanceSummaryArgs {
    /// Officer attendance export (CSV)
    #[arg(long)]
    pub(crate) csv: PathBuf,
    /// Evaluation date for the rolling window (defaults to today)
    #[arg(long, value_parser = crate::infra::parse_date)]
    pub(crate) today: Option<NaiveDate>,
}

pub(crate) fn run_attendance_summary(args: AttendanceSummaryArgs) -> Result<(), AppError> {
    let AttendanceSummaryArgs { csv, today } = args;
    let today = today.unwrap_or_else(|| Local::now().date_naive());

    let records = AttendanceImporter::from_path(&csv)?;
    let config = default_guild_config();
    let members = summarize_by_member(&records, &config, today);

    println!(
        "Attendance summary as of {} ({} records from {})",
        today,
        records.len(),
        csv.display()
    );
    println!(
        "Rolling window: {} weeks | cap {:.1}",
        config.rolling_window_weeks, config.max_attendance_bonus
    );
    for view in members {
        let summary = &view.summary;
        let flag = if summary.vetoed() { " [no-call/no-show]" } else { "" };
        println!(
            "- {}: {} events | {} signed up | {} attended | +{:.1}{}",
            view.member_id,
            summary.events_in_window,
            summary.signed_up,
            summary.attended,
            summary.contribution,
            flag
        );
    }

    Ok(())
}

pub(crate) fn run_demo(args: DemoArgs) -> Result<(), AppError> {
    let DemoArgs {
        today,
        member,
        rank,
    } = args;
    let today = today.unwrap_or_else(|| Local::now().date_naive());

    let store = Arc::new(InMemoryLootStore::demo(today));
    let service = LootPriorityService::new(store.clone(), LootConfig::default());
    let guild = GuildId::new(DEMO_GUILD);
    let tier = TierId::new(DEMO_TIER);

    println!("Guild loot priority demo ({} / {}, as of {})", guild, tier, today);
    println!("Roster:");
    for member in store.members() {
        println!(
            "  - {} ({}, {})",
            member.display_name, member.role, member.class_color
        );
    }

    println!("\nWishlist review");
    let draft_id = SubmissionId::new(format!("anduin-{DEMO_TIER}"));
    if let Some(draft) = store
        .submissions()
        .into_iter()
        .find(|submission| submission.id == draft_id)
    {
        let validation = service.validate(&draft)?;
        render_validation(&draft_id, &validation);
        match service.transition_status(&draft_id, SubmissionStatus::Pending) {
            Ok(submission) => println!(
                "  {} -> {}",
                submission.id,
                submission.status.label()
            ),
            Err(err) => println!("  Submission held back: {}", err),
        }
    }

    println!("\nLoot scores at rank {}", rank);
    match Rank::new(rank) {
        Ok(rank) => {
            for member in store.members() {
                match service.loot_score(&guild, &member.id, rank, today) {
                    Ok(breakdown) => println!(
                        "  - {}: {} (attendance +{:.1}, role {:+.1}{})",
                        member.display_name,
                        breakdown.display_total(),
                        breakdown.attendance_contribution,
                        breakdown.role_modifier,
                        if breakdown.attendance.vetoed() {
                            ", no-call/no-show"
                        } else {
                            ""
                        }
                    ),
                    Err(err) => println!("  - {}: unavailable ({})", member.display_name, err),
                }
            }
        }
        Err(err) => println!("  Skipped: {}", err),
    }

    println!("\nPriority board");
    for entry in service.priority_board(&guild, &tier, today)? {
        match entry {
            BoardEntry::Resolved(priority) => render_priority(&priority),
            BoardEntry::Failed {
                item_name, reason, ..
            } => println!("  {}: could not be resolved ({})", item_name, reason),
        }
    }

    let member_id = MemberId::new(member);
    println!("\nCompetition for {}", member_id);
    match service.member_competition(&guild, &member_id, &tier) {
        Ok(views) if views.is_empty() => println!("  No active wishlist"),
        Ok(views) => {
            for view in views {
                let rivals: Vec<&str> = view
                    .competitors
                    .iter()
                    .map(|entry| entry.display_name.as_str())
                    .collect();
                let rivals = if rivals.is_empty() {
                    "uncontested".to_string()
                } else {
                    rivals.join(", ")
                };
                println!(
                    "  - rank {} slot {}: {} ({})",
                    view.rank,
                    view.slot.number(),
                    view.item_name,
                    rivals
                );
            }
        }
        Err(err) => println!("  Unavailable: {}", err),
    }

    Ok(())
}

fn render_validation(id: &SubmissionId, validation: &SubmissionValidation) {
    println!(
        "- {}: {} selections, {}",
        id,
        validation.selection_count,
        if validation.is_acceptable() {
            "acceptable"
        } else {
            "needs changes"
        }
    );
    for report in &validation.reports {
        println!(
            "    {}: {}/{} points{}",
            report.label,
            report.allocation_points,
            report.max_points,
            if report.is_clean() { "" } else { " (violations)" }
        );
    }
    for message in validation.messages() {
        println!("    ! {}", message);
    }
}

fn render_priority(priority: &ItemPriority) {
    println!(
        "  {} [{}] {} claimant(s)",
        priority.item.name,
        priority.item.classification.label(),
        priority.claimants
    );
    for (position, listing) in priority.listings.iter().enumerate() {
        println!(
            "    {}. {} rank {} score {:.1}{}",
            position + 1,
            listing.display_name,
            listing.rank,
            listing.loot_score,
            if listing.is_tied() { " (tied)" } else { "" }
        );
    }
    for tie in &priority.ties {
        let names: Vec<&str> = tie
            .members
            .iter()
            .map(|entry| entry.display_name.as_str())
            .collect();
        println!("    tie at rank {}: {}", tie.rank, names.join(", "));
    }
}
