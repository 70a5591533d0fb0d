//! Plain-text rendering of the overview and the terminal stand-ins for the host shell.

use programs_core::{
    ErrorPanel, FormEntryRequest, FormEntrySink, Navigator, OverviewView, Program,
    WorkspaceLauncher, WorkspaceOptions,
};
use std::fmt::Write;

pub fn render_view(view: &OverviewView) -> String {
    let mut out = String::new();
    match view {
        OverviewView::Loading => out.push_str("Loading...\n"),
        OverviewView::Error {
            header_title,
            error,
        } => {
            let _ = writeln!(out, "{header_title}");
            render_error(&mut out, error);
        }
        OverviewView::Empty {
            header_title,
            display_text,
            catalog_error,
        } => {
            let _ = writeln!(out, "{header_title}");
            let noun = display_text.to_lowercase();
            let _ = writeln!(out, "There are no {noun} to display for this patient");
            let _ = writeln!(out, "Record {noun}: `care-programs add <patient>`");
            if let Some(error) = catalog_error {
                render_error(&mut out, error);
            }
        }
        OverviewView::Populated {
            header_title,
            revalidating,
            add_label,
            add_enabled,
            fully_enrolled,
            catalog_error,
            headers,
            rows,
            pagination,
        } => {
            let refreshing = if *revalidating { " (refreshing)" } else { "" };
            let add = if *add_enabled {
                format!("[{add_label}]")
            } else {
                format!("({add_label} unavailable)")
            };
            let _ = writeln!(out, "{header_title}{refreshing}  {add}");
            if let Some(notice) = fully_enrolled {
                let _ = writeln!(out, "{}: {}", notice.title, notice.subtitle);
            }
            if let Some(error) = catalog_error {
                render_error(&mut out, error);
            }

            let titles: Vec<&str> = headers.iter().map(|h| h.header.as_str()).collect();
            let _ = writeln!(out, "{}", titles.join(" | "));
            for row in rows {
                let _ = writeln!(
                    out,
                    "{} | {} | {} ({})",
                    row.display,
                    row.status,
                    row.action.label(),
                    row.id
                );
            }
            let _ = writeln!(
                out,
                "Page {}/{}, {} of {} items. {}: {}",
                pagination.page_number,
                pagination.total_pages,
                pagination.current_items,
                pagination.total_items,
                pagination.dashboard_link_label,
                pagination.dashboard_link_url
            );
        }
    }
    out
}

pub fn render_programs(programs: &[Program]) -> String {
    if programs.is_empty() {
        return "No eligible programs.\n".into();
    }
    programs
        .iter()
        .map(|p| format!("{} ({})\n", p.display, p.uuid))
        .collect()
}

fn render_error(out: &mut String, error: &ErrorPanel) {
    let status = error
        .status
        .map(|s| format!(" [HTTP {s}]"))
        .unwrap_or_default();
    let _ = writeln!(
        out,
        "Error loading {}{status}: {}",
        error.section.to_lowercase(),
        error.message
    );
}

/// Prints what a browser shell would do with each launch request.
#[derive(Clone, Copy, Debug, Default)]
pub struct TerminalShell;

impl FormEntrySink for TerminalShell {
    fn open(&self, request: FormEntryRequest) {
        match request.encounter_uuid {
            Some(encounter) => {
                println!("open form {} for encounter {encounter}", request.form_uuid)
            }
            None => println!("open form {}", request.form_uuid),
        }
    }
}

impl WorkspaceLauncher for TerminalShell {
    fn launch(&self, workspace_id: &str, options: WorkspaceOptions) {
        match options.workspace_title {
            Some(title) => println!("launch workspace {workspace_id} \"{title}\""),
            None => println!("launch workspace {workspace_id}"),
        }
    }
}

impl Navigator for TerminalShell {
    fn navigate(&self, to: &str) {
        println!("navigate to {to}");
    }
}
