//! Console rendering for probe reports and patch tables

use colored::{ColoredString, Colorize};
use tabled::settings::Style;
use tabled::{Table, Tabled};

use sumaprobe_api_core::patch::{ScheduledUpdate, SystemPatchState};
use sumaprobe_api_core::probe::ProbeReport;
use sumaprobe_api_core::ApiResponse;

#[derive(Tabled)]
struct ChannelRow {
    #[tabled(rename = "Label")]
    label: String,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Arch")]
    arch: String,
    #[tabled(rename = "Packages")]
    packages: String,
    #[tabled(rename = "Systems")]
    systems: String,
}

#[derive(Tabled)]
struct SystemRow {
    #[tabled(rename = "System")]
    name: String,
    #[tabled(rename = "ID")]
    id: i64,
    #[tabled(rename = "Last check-in")]
    last_checkin: String,
    #[tabled(rename = "Upgradable")]
    upgradable: usize,
}

#[derive(Tabled)]
struct JobRow {
    #[tabled(rename = "System")]
    name: String,
    #[tabled(rename = "ID")]
    id: i64,
    #[tabled(rename = "Packages")]
    packages: usize,
    #[tabled(rename = "Job")]
    job_id: i64,
}

pub fn print_probe_report(report: &ProbeReport) {
    print_response("login", &report.login);
    println!("session token: {}", report.session_token);

    if report.outcome.is_success() {
        println!(
            "{} {} channel(s)",
            "listing:".bold(),
            report.channels.len()
        );
        let rows = report.channels.iter().map(|channel| ChannelRow {
            label: channel.label.clone(),
            name: opt(&channel.name),
            arch: opt(&channel.arch_name),
            packages: opt(&channel.packages),
            systems: opt(&channel.systems),
        });
        println!("{}", Table::new(rows).with(Style::modern()));
    } else {
        println!(
            "{} channel listing failed with status {}",
            "error:".red().bold(),
            report.listing_status
        );
    }

    match &report.logout {
        Some(response) => print_response("logout", response),
        None => println!("logout: skipped, session already torn down"),
    }
}

pub fn print_system_table(states: &[SystemPatchState]) {
    let rows = states.iter().map(|state| SystemRow {
        name: state.system.name.clone(),
        id: state.system.id,
        last_checkin: opt(&state.system.last_checkin),
        upgradable: state.packages.len(),
    });
    println!("{}", Table::new(rows).with(Style::modern()));
}

pub fn print_scheduled_jobs(scheduled: &[ScheduledUpdate]) {
    if scheduled.is_empty() {
        println!("nothing to schedule, all systems are up to date");
        return;
    }
    let rows = scheduled.iter().map(|update| JobRow {
        name: update.system.name.clone(),
        id: update.system.id,
        packages: update.package_count,
        job_id: update.job_id,
    });
    println!("{}", Table::new(rows).with(Style::modern()));
}

fn print_response(call: &str, response: &ApiResponse) {
    let label = format!("{call}:");
    println!(
        "{} {} {}",
        label.as_str().bold(),
        status_colored(response.status),
        response.body
    );
}

fn status_colored(status: u16) -> ColoredString {
    let text = status.to_string();
    if (200..300).contains(&status) {
        text.as_str().green()
    } else {
        text.as_str().red()
    }
}

fn opt<T: ToString>(value: &Option<T>) -> String {
    value
        .as_ref()
        .map(ToString::to_string)
        .unwrap_or_else(|| "-".to_string())
}
