//! Launch commands and the collaborators that carry them out.
//!
//! The overview never opens forms or navigates itself. It builds a [`Command`] and hands it to
//! an injected [`CommandHandler`], fire-and-forget. [`LaunchDispatcher`] is the handler used by
//! real front ends: it fans a command out to the form-entry, workspace and navigation
//! collaborators supplied by the host shell.

use crate::constants::{FORM_ENTRY_WORKSPACE, PROGRAMS_FORM_WORKSPACE};
use serde::Serialize;
use std::sync::Mutex;

/// Which row action produced a form-entry command.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum ActionKind {
    Enroll,
    Discontinue,
}

/// Open a specific form for a patient.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, utoipa::ToSchema)]
pub struct FormEntryCommand {
    pub action: ActionKind,
    pub form_uuid: String,
    pub patient_uuid: String,
    /// Set when an existing encounter should be edited rather than a new one created.
    pub encounter_uuid: Option<String>,
    /// Used as the workspace title.
    pub form_name: Option<String>,
}

/// Everything the overview can ask its host to do.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, utoipa::ToSchema)]
#[serde(tag = "command", rename_all = "snake_case")]
pub enum Command {
    /// Open the program enrollment workspace ("Add" / empty-state call to action).
    LaunchProgramsWorkspace { patient_uuid: String },
    /// Open an enrollment or discontinuation form.
    FormEntry { form: FormEntryCommand },
}

/// Receives commands from the overview. Implementations must not block on the outcome.
pub trait CommandHandler: Send + Sync {
    fn dispatch(&self, command: Command);
}

/// Payload published to the form-entry subsystem.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FormEntryRequest {
    pub form_uuid: String,
    pub encounter_uuid: Option<String>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct WorkspaceOptions {
    pub workspace_title: Option<String>,
}

/// Host form-entry surface.
pub trait FormEntrySink: Send + Sync {
    fn open(&self, request: FormEntryRequest);
}

/// Host workspace manager.
pub trait WorkspaceLauncher: Send + Sync {
    fn launch(&self, workspace_id: &str, options: WorkspaceOptions);
}

/// Host router.
pub trait Navigator: Send + Sync {
    fn navigate(&self, to: &str);
}

/// [`CommandHandler`] that drives the host collaborators.
pub struct LaunchDispatcher<F, W, N> {
    form_entry: F,
    workspace: W,
    navigator: N,
    spa_base: String,
}

impl<F, W, N> LaunchDispatcher<F, W, N>
where
    F: FormEntrySink,
    W: WorkspaceLauncher,
    N: Navigator,
{
    pub fn new(form_entry: F, workspace: W, navigator: N, spa_base: impl Into<String>) -> Self {
        Self {
            form_entry,
            workspace,
            navigator,
            spa_base: spa_base.into(),
        }
    }

    /// Publish the form, open the form-entry workspace and navigate to the patient's chart.
    fn launch_form_entry(&self, form: FormEntryCommand) {
        self.form_entry.open(FormEntryRequest {
            form_uuid: form.form_uuid,
            encounter_uuid: form.encounter_uuid,
        });
        self.workspace.launch(
            FORM_ENTRY_WORKSPACE,
            WorkspaceOptions {
                workspace_title: form.form_name,
            },
        );
        self.navigator
            .navigate(&format!("{}/patient/{}/chart", self.spa_base, form.patient_uuid));
    }
}

impl<F, W, N> CommandHandler for LaunchDispatcher<F, W, N>
where
    F: FormEntrySink,
    W: WorkspaceLauncher,
    N: Navigator,
{
    fn dispatch(&self, command: Command) {
        tracing::info!(?command, "dispatching programs command");
        match command {
            Command::LaunchProgramsWorkspace { .. } => self
                .workspace
                .launch(PROGRAMS_FORM_WORKSPACE, WorkspaceOptions::default()),
            Command::FormEntry { form } => self.launch_form_entry(form),
        }
    }
}

/// [`CommandHandler`] that only records what it was sent.
#[derive(Debug, Default)]
pub struct CommandLog {
    commands: Mutex<Vec<Command>>,
}

impl CommandLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Commands dispatched so far, oldest first.
    pub fn commands(&self) -> Vec<Command> {
        match self.commands.lock() {
            Ok(guard) => guard.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    /// Most recent command, if any.
    pub fn last(&self) -> Option<Command> {
        self.commands().pop()
    }
}

impl CommandHandler for CommandLog {
    fn dispatch(&self, command: Command) {
        tracing::debug!(?command, "recording programs command");
        match self.commands.lock() {
            Ok(mut guard) => guard.push(command),
            Err(poisoned) => poisoned.into_inner().push(command),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[derive(Debug, PartialEq, Eq)]
    enum Effect {
        FormEntry(FormEntryRequest),
        Workspace(String, WorkspaceOptions),
        Navigate(String),
    }

    #[derive(Clone, Default)]
    struct Recorder(Arc<Mutex<Vec<Effect>>>);

    impl Recorder {
        fn effects(&self) -> Vec<Effect> {
            std::mem::take(&mut *self.0.lock().expect("recorder lock"))
        }

        fn push(&self, effect: Effect) {
            self.0.lock().expect("recorder lock").push(effect);
        }
    }

    impl FormEntrySink for Recorder {
        fn open(&self, request: FormEntryRequest) {
            self.push(Effect::FormEntry(request));
        }
    }

    impl WorkspaceLauncher for Recorder {
        fn launch(&self, workspace_id: &str, options: WorkspaceOptions) {
            self.push(Effect::Workspace(workspace_id.into(), options));
        }
    }

    impl Navigator for Recorder {
        fn navigate(&self, to: &str) {
            self.push(Effect::Navigate(to.into()));
        }
    }

    fn dispatcher(recorder: &Recorder) -> LaunchDispatcher<Recorder, Recorder, Recorder> {
        LaunchDispatcher::new(
            recorder.clone(),
            recorder.clone(),
            recorder.clone(),
            "/openmrs/spa",
        )
    }

    #[test]
    fn form_entry_publishes_form_then_opens_workspace_then_navigates() {
        let recorder = Recorder::default();
        dispatcher(&recorder).dispatch(Command::FormEntry {
            form: FormEntryCommand {
                action: ActionKind::Discontinue,
                form_uuid: "hiv-discontinue".into(),
                patient_uuid: "patient-1".into(),
                encounter_uuid: None,
                form_name: Some("HIV Discontinuation".into()),
            },
        });

        assert_eq!(
            recorder.effects(),
            vec![
                Effect::FormEntry(FormEntryRequest {
                    form_uuid: "hiv-discontinue".into(),
                    encounter_uuid: None,
                }),
                Effect::Workspace(
                    "patient-form-entry-workspace".into(),
                    WorkspaceOptions {
                        workspace_title: Some("HIV Discontinuation".into())
                    }
                ),
                Effect::Navigate("/openmrs/spa/patient/patient-1/chart".into()),
            ]
        );
    }

    #[test]
    fn programs_workspace_only_opens_workspace() {
        let recorder = Recorder::default();
        dispatcher(&recorder).dispatch(Command::LaunchProgramsWorkspace {
            patient_uuid: "patient-1".into(),
        });

        assert_eq!(
            recorder.effects(),
            vec![Effect::Workspace(
                "programs-form-workspace".into(),
                WorkspaceOptions::default()
            )]
        );
    }

    #[test]
    fn command_log_keeps_dispatch_order() {
        let log = CommandLog::new();
        assert!(log.last().is_none());

        log.dispatch(Command::LaunchProgramsWorkspace {
            patient_uuid: "a".into(),
        });
        log.dispatch(Command::LaunchProgramsWorkspace {
            patient_uuid: "b".into(),
        });

        assert_eq!(log.commands().len(), 2);
        assert_eq!(
            log.last(),
            Some(Command::LaunchProgramsWorkspace {
                patient_uuid: "b".into()
            })
        );
    }

    #[test]
    fn commands_serialise_with_tag() {
        let json = serde_json::to_value(Command::LaunchProgramsWorkspace {
            patient_uuid: "p".into(),
        })
        .expect("serialise");
        assert_eq!(
            json,
            serde_json::json!({"command": "launch_programs_workspace", "patient_uuid": "p"})
        );
    }
}
