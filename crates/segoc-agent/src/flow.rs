// SPDX-FileCopyrightText: 2026 SEGOC Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The reporting conversation as a pure state machine.
//!
//! [`transition`] is the only place that decides whether an input is
//! accepted. It never mutates its arguments: the caller commits the returned
//! [`Transition`] or, on error, keeps its state untouched.

use std::fmt;

use chrono::{DateTime, Utc};
use segoc_core::{CompletedReport, ConversationStep, FlowError, ReportDraft, ReportField};

/// Label of the cancel button offered after `start`.
pub const CANCEL_LABEL: &str = "Cancelar atendimiento";

/// Labels of the two `start` buttons.
pub const ON_SITE_LABEL: &str = "Estoy en la obra";
pub const OFF_DUTY_LABEL: &str = "No me encuentro en servicio";

pub const GOODBYE: &str = "Gracias por tu tiempo. ¡Hasta luego!";
pub const COMPLETION: &str = "¡Perfecto! Hemos registrado toda la información. Gracias por completar el reporte diario. 📋✅";

pub fn welcome(worker_name: &str) -> String {
    format!("Hola {worker_name}, comenzemos con la gestión del día")
}

/// Bot question shown on entering `step`.
pub fn prompt(step: ConversationStep) -> Option<&'static str> {
    match step {
        ConversationStep::ConfirmSite => Some("Por favor indíquenos en qué obra se encuentra"),
        ConversationStep::ConfirmSector => {
            Some("Por favor indíquenos en qué sector de la obra se encuentra")
        }
        ConversationStep::DeclareActivity => {
            Some("Por favor indique qué actividad se está realizando")
        }
        ConversationStep::DeclareProgress => {
            Some("Por favor indique el progreso de la actividad en %")
        }
        ConversationStep::DeclareExpenses => Some(
            "Por favor, indique si hay algún gasto en materiales. Seleccione una opción o escriba los detalles:",
        ),
        _ => None,
    }
}

/// Where the conversation currently is.
///
/// The completed report only exists inside `Finished`.
#[derive(Debug, Clone, PartialEq)]
pub enum ConversationState {
    Start,
    ConfirmSite,
    ConfirmSector,
    DeclareActivity,
    DeclareProgress,
    DeclareExpenses,
    Finished(Box<CompletedReport>),
    Cancelled,
}

impl ConversationState {
    pub fn step(&self) -> ConversationStep {
        match self {
            ConversationState::Start => ConversationStep::Start,
            ConversationState::ConfirmSite => ConversationStep::ConfirmSite,
            ConversationState::ConfirmSector => ConversationStep::ConfirmSector,
            ConversationState::DeclareActivity => ConversationStep::DeclareActivity,
            ConversationState::DeclareProgress => ConversationStep::DeclareProgress,
            ConversationState::DeclareExpenses => ConversationStep::DeclareExpenses,
            ConversationState::Finished(_) => ConversationStep::Finished,
            ConversationState::Cancelled => ConversationStep::Cancelled,
        }
    }

    /// State for an active step. `Finished` needs a report, so it has no
    /// counterpart here.
    pub fn active(step: ConversationStep) -> Option<Self> {
        match step {
            ConversationStep::Start => Some(ConversationState::Start),
            ConversationStep::ConfirmSite => Some(ConversationState::ConfirmSite),
            ConversationStep::ConfirmSector => Some(ConversationState::ConfirmSector),
            ConversationStep::DeclareActivity => Some(ConversationState::DeclareActivity),
            ConversationStep::DeclareProgress => Some(ConversationState::DeclareProgress),
            ConversationStep::DeclareExpenses => Some(ConversationState::DeclareExpenses),
            ConversationStep::Finished | ConversationStep::Cancelled => None,
        }
    }

    pub fn is_terminal(&self) -> bool {
        self.step().is_terminal()
    }

    pub fn report(&self) -> Option<&CompletedReport> {
        match self {
            ConversationState::Finished(report) => Some(report.as_ref()),
            _ => None,
        }
    }
}

impl fmt::Display for ConversationState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.step())
    }
}

/// An input to the state machine.
#[derive(Debug, Clone, PartialEq)]
pub enum FlowEvent {
    /// The user answered, by button or free text.
    Reply {
        text: String,
        next: ConversationStep,
        field: Option<ReportField>,
    },
    /// The user asked to correct an earlier answer.
    Back { target: ConversationStep },
}

/// Side effects the engine performs after committing a transition.
#[derive(Debug, Clone, PartialEq)]
pub enum FlowAction {
    /// Ask the question of this step.
    Prompt(ConversationStep),
    /// Say goodbye after a cancellation.
    Farewell,
    /// Hand the finished report to the sink and announce it.
    Record,
}

/// An accepted input: the state and draft to commit plus follow-up actions.
#[derive(Debug, Clone, PartialEq)]
pub struct Transition {
    pub from: ConversationStep,
    pub state: ConversationState,
    pub draft: ReportDraft,
    pub actions: Vec<FlowAction>,
}

/// Decides the outcome of `event` at `state`.
pub fn transition(
    state: &ConversationState,
    draft: &ReportDraft,
    event: &FlowEvent,
    now: DateTime<Utc>,
) -> Result<Transition, FlowError> {
    let from = state.step();
    if from.is_terminal() {
        return Err(FlowError::SessionClosed { step: from });
    }

    match event {
        FlowEvent::Reply { text, next, field } => reply(from, draft, text, *next, *field, now),
        FlowEvent::Back { target } => back(from, draft, *target),
    }
}

fn reply(
    from: ConversationStep,
    draft: &ReportDraft,
    text: &str,
    next: ConversationStep,
    field: Option<ReportField>,
    now: DateTime<Utc>,
) -> Result<Transition, FlowError> {
    let mut draft = draft.clone();

    if next == ConversationStep::Cancelled {
        if let Some(field) = field {
            if text != CANCEL_LABEL {
                check_field(from, Some(field))?;
                draft.set_field(field, text);
            }
        }
        return Ok(Transition {
            from,
            state: ConversationState::Cancelled,
            draft,
            actions: vec![FlowAction::Farewell],
        });
    }

    if from.successor() != Some(next) {
        return Err(FlowError::InvalidTransition { from, to: next });
    }
    if let Some(field) = check_field(from, field)? {
        if text.trim().is_empty() {
            return Err(FlowError::BlankAnswer { step: from });
        }
        draft.set_field(field, text);
    }

    if next == ConversationStep::Finished {
        let report = draft.freeze(now)?;
        return Ok(Transition {
            from,
            state: ConversationState::Finished(Box::new(report)),
            draft,
            actions: vec![FlowAction::Record],
        });
    }

    let state =
        ConversationState::active(next).ok_or(FlowError::InvalidTransition { from, to: next })?;
    Ok(Transition {
        from,
        state,
        draft,
        actions: vec![FlowAction::Prompt(next)],
    })
}

/// The field given must be the one `step` collects.
fn check_field(
    step: ConversationStep,
    field: Option<ReportField>,
) -> Result<Option<ReportField>, FlowError> {
    match (step.field(), field) {
        (None, None) => Ok(None),
        (Some(expected), Some(given)) if expected == given => Ok(Some(given)),
        (Some(expected), None) => Err(FlowError::MissingField { step, expected }),
        (_, Some(given)) => Err(FlowError::FieldMismatch { step, field: given }),
    }
}

fn back(
    from: ConversationStep,
    draft: &ReportDraft,
    target: ConversationStep,
) -> Result<Transition, FlowError> {
    let invalid = FlowError::InvalidBackNavigation { from, to: target };
    let (Some(current), Some(wanted)) = (from.position(), target.position()) else {
        return Err(invalid);
    };
    let past_site = ConversationStep::ConfirmSite.position().unwrap_or(1);
    if current <= past_site || wanted >= current {
        return Err(invalid);
    }
    let state = ConversationState::active(target).ok_or(invalid)?;
    Ok(Transition {
        from,
        state,
        draft: draft.clone(),
        actions: Vec::new(),
    })
}

/// What a menu entry does when chosen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReplyAction {
    /// Answer with the label and move to the next step.
    Select,
    /// End the session without a report.
    Cancel,
    /// Open the free-text input with this placeholder.
    FreeText { placeholder: &'static str },
    /// Jump back to an earlier step.
    Back(ConversationStep),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReplyOption {
    pub label: String,
    pub action: ReplyAction,
}

impl ReplyOption {
    fn new(label: impl Into<String>, action: ReplyAction) -> Self {
        Self {
            label: label.into(),
            action,
        }
    }
}

/// Predefined answers for each collecting step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MenuCatalog {
    pub sites: Vec<String>,
    pub sectors: Vec<String>,
    pub activities: Vec<String>,
    pub progress: Vec<String>,
    pub expenses: Vec<String>,
}

impl MenuCatalog {
    fn choices(&self, step: ConversationStep) -> &[String] {
        match step {
            ConversationStep::ConfirmSite => &self.sites,
            ConversationStep::ConfirmSector => &self.sectors,
            ConversationStep::DeclareActivity => &self.activities,
            ConversationStep::DeclareProgress => &self.progress,
            ConversationStep::DeclareExpenses => &self.expenses,
            _ => &[],
        }
    }
}

impl From<&segoc_config::model::DemoConfig> for MenuCatalog {
    fn from(demo: &segoc_config::model::DemoConfig) -> Self {
        Self {
            sites: demo.sites.clone(),
            sectors: demo.sectors.clone(),
            activities: demo.activities.clone(),
            progress: demo.progress.clone(),
            expenses: demo.expenses.clone(),
        }
    }
}

impl Default for MenuCatalog {
    fn default() -> Self {
        Self::from(&segoc_config::model::DemoConfig::default())
    }
}

fn free_text(step: ConversationStep) -> Option<(&'static str, &'static str)> {
    match step {
        ConversationStep::ConfirmSite => Some(("Escribir otra obra", "Escriba el nombre de la obra...")),
        ConversationStep::ConfirmSector => {
            Some(("Escribir otro sector", "Escriba el sector donde se encuentra..."))
        }
        ConversationStep::DeclareActivity => Some((
            "Escribir otra actividad",
            "Escriba la actividad que está realizando...",
        )),
        ConversationStep::DeclareProgress => Some((
            "Escribir porcentaje personalizado",
            "Escriba el porcentaje de progreso (ej: 35%)...",
        )),
        ConversationStep::DeclareExpenses => Some((
            "Escribir gastos personalizados",
            "Escriba los gastos en materiales (ej: Ladrillos $50.000, Cemento $30.000)...",
        )),
        _ => None,
    }
}

fn corrections(step: ConversationStep) -> &'static [(&'static str, ConversationStep)] {
    const ANY_EARLIER: (&str, ConversationStep) =
        ("Corregir opciones anteriores", ConversationStep::Start);
    match step {
        ConversationStep::ConfirmSector => {
            &[("Corregir obra en proceso", ConversationStep::ConfirmSite)]
        }
        ConversationStep::DeclareActivity => &[
            ("Corregir sector de la obra", ConversationStep::ConfirmSector),
            ANY_EARLIER,
        ],
        ConversationStep::DeclareProgress => &[
            ("Corregir actividad en proceso", ConversationStep::DeclareActivity),
            ANY_EARLIER,
        ],
        ConversationStep::DeclareExpenses => &[
            ("Corregir progreso de la actividad", ConversationStep::DeclareProgress),
            ANY_EARLIER,
        ],
        _ => &[],
    }
}

/// Buttons offered at `step`, in display order. Empty for terminal steps.
pub fn menu(step: ConversationStep, catalog: &MenuCatalog) -> Vec<ReplyOption> {
    if step.is_terminal() {
        return Vec::new();
    }
    if step == ConversationStep::Start {
        return vec![
            ReplyOption::new(ON_SITE_LABEL, ReplyAction::Select),
            ReplyOption::new(OFF_DUTY_LABEL, ReplyAction::Cancel),
        ];
    }

    let mut options: Vec<ReplyOption> = catalog
        .choices(step)
        .iter()
        .map(|label| ReplyOption::new(label.clone(), ReplyAction::Select))
        .collect();
    if let Some((label, placeholder)) = free_text(step) {
        options.push(ReplyOption::new(label, ReplyAction::FreeText { placeholder }));
    }
    for (label, target) in corrections(step) {
        options.push(ReplyOption::new(*label, ReplyAction::Back(*target)));
    }
    options.push(ReplyOption::new(CANCEL_LABEL, ReplyAction::Cancel));
    options
}

/// Placeholder of the free-text input at `step`, if it has one.
pub fn placeholder(step: ConversationStep) -> Option<&'static str> {
    free_text(step).map(|(_, placeholder)| placeholder)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use segoc_core::{SessionId, WorkerIdentity};

    fn start_time() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 2, 8, 0, 0).unwrap()
    }

    fn draft() -> ReportDraft {
        ReportDraft::new(
            SessionId("s-1".into()),
            WorkerIdentity::demo(1, "Usuario Demo", start_time()),
            "+54 9 11 1234-5678",
            start_time(),
        )
    }

    fn reply(text: &str, next: ConversationStep, field: Option<ReportField>) -> FlowEvent {
        FlowEvent::Reply {
            text: text.to_string(),
            next,
            field,
        }
    }

    fn walk(answers: &[&str]) -> (ConversationState, ReportDraft) {
        let mut state = ConversationState::Start;
        let mut draft = draft();
        let opening = reply(ON_SITE_LABEL, ConversationStep::ConfirmSite, None);
        let first = transition(&state, &draft, &opening, start_time()).unwrap();
        state = first.state;
        draft = first.draft;
        for answer in answers {
            let step = state.step();
            let event = reply(answer, step.successor().unwrap(), step.field());
            let t = transition(&state, &draft, &event, start_time()).unwrap();
            state = t.state;
            draft = t.draft;
        }
        (state, draft)
    }

    #[test]
    fn start_advances_without_writing_a_field() {
        let t = transition(
            &ConversationState::Start,
            &draft(),
            &reply(ON_SITE_LABEL, ConversationStep::ConfirmSite, None),
            start_time(),
        )
        .unwrap();
        assert_eq!(t.state, ConversationState::ConfirmSite);
        assert_eq!(t.actions, vec![FlowAction::Prompt(ConversationStep::ConfirmSite)]);
        assert_eq!(t.draft, draft());
    }

    #[test]
    fn full_walk_finishes_with_report() {
        let (state, _) = walk(&[
            "Obra Centro Comercial",
            "Sector A - Planta Baja",
            "Pintura",
            "75%",
            "No hubo gastos hoy",
        ]);
        let report = state.report().expect("finished");
        assert_eq!(report.site(), "Obra Centro Comercial");
        assert_eq!(report.expenses(), "No hubo gastos hoy");
        assert!(report.end_time() >= report.start_time());
    }

    #[test]
    fn skipping_ahead_is_rejected() {
        let err = transition(
            &ConversationState::ConfirmSite,
            &draft(),
            &reply("x", ConversationStep::DeclareActivity, Some(ReportField::Site)),
            start_time(),
        )
        .unwrap_err();
        assert_eq!(
            err,
            FlowError::InvalidTransition {
                from: ConversationStep::ConfirmSite,
                to: ConversationStep::DeclareActivity,
            }
        );
    }

    #[test]
    fn wrong_or_missing_field_is_rejected() {
        let wrong = transition(
            &ConversationState::ConfirmSector,
            &draft(),
            &reply("x", ConversationStep::DeclareActivity, Some(ReportField::Site)),
            start_time(),
        );
        assert!(matches!(wrong, Err(FlowError::FieldMismatch { .. })));

        let missing = transition(
            &ConversationState::ConfirmSector,
            &draft(),
            &reply("x", ConversationStep::DeclareActivity, None),
            start_time(),
        );
        assert_eq!(
            missing.unwrap_err(),
            FlowError::MissingField {
                step: ConversationStep::ConfirmSector,
                expected: ReportField::Sector,
            }
        );
    }

    #[test]
    fn blank_answer_stays_on_the_step() {
        let err = transition(
            &ConversationState::ConfirmSite,
            &draft(),
            &reply("  ", ConversationStep::ConfirmSector, Some(ReportField::Site)),
            start_time(),
        )
        .unwrap_err();
        assert_eq!(
            err,
            FlowError::BlankAnswer {
                step: ConversationStep::ConfirmSite
            }
        );
    }

    #[test]
    fn cancel_with_sentinel_writes_nothing() {
        for state in [
            ConversationState::Start,
            ConversationState::ConfirmSite,
            ConversationState::DeclareExpenses,
        ] {
            let field = state.step().field();
            let t = transition(
                &state,
                &draft(),
                &reply(CANCEL_LABEL, ConversationStep::Cancelled, field),
                start_time(),
            )
            .unwrap();
            assert_eq!(t.state, ConversationState::Cancelled);
            assert_eq!(t.actions, vec![FlowAction::Farewell]);
            assert!(t.draft.missing_fields().len() == 5);
        }
    }

    #[test]
    fn terminal_states_reject_everything() {
        let (finished, draft) = walk(&["a", "b", "c", "d", "e"]);
        let err = transition(
            &finished,
            &draft,
            &FlowEvent::Back {
                target: ConversationStep::ConfirmSite,
            },
            start_time(),
        )
        .unwrap_err();
        assert_eq!(
            err,
            FlowError::SessionClosed {
                step: ConversationStep::Finished
            }
        );
        assert!(
            transition(
                &ConversationState::Cancelled,
                &draft,
                &reply("x", ConversationStep::Cancelled, None),
                start_time()
            )
            .is_err()
        );
    }

    #[test]
    fn back_navigation_keeps_fields() {
        let (state, draft) = walk(&["Obra Industrial Sur", "Sector C - Segundo Piso", "Plomería"]);
        assert_eq!(state, ConversationState::DeclareProgress);

        let t = transition(
            &state,
            &draft,
            &FlowEvent::Back {
                target: ConversationStep::Start,
            },
            start_time(),
        )
        .unwrap();
        assert_eq!(t.state, ConversationState::Start);
        assert_eq!(t.draft.field(ReportField::Activity), Some("Plomería"));
        assert!(t.actions.is_empty());
    }

    #[test]
    fn back_navigation_limits() {
        let d = draft();
        let back = |state: ConversationState, target| {
            transition(&state, &d, &FlowEvent::Back { target }, start_time())
        };
        assert!(back(ConversationState::ConfirmSite, ConversationStep::Start).is_err());
        assert!(back(ConversationState::ConfirmSector, ConversationStep::ConfirmSector).is_err());
        assert!(back(ConversationState::ConfirmSector, ConversationStep::DeclareActivity).is_err());
        assert!(back(ConversationState::DeclareActivity, ConversationStep::Finished).is_err());
        assert!(back(ConversationState::ConfirmSector, ConversationStep::ConfirmSite).is_ok());
    }

    #[test]
    fn menus_follow_the_demo_layout() {
        let catalog = MenuCatalog::default();
        let start: Vec<_> = menu(ConversationStep::Start, &catalog)
            .into_iter()
            .map(|o| o.label)
            .collect();
        assert_eq!(start, vec![ON_SITE_LABEL, OFF_DUTY_LABEL]);

        let expenses = menu(ConversationStep::DeclareExpenses, &catalog);
        assert_eq!(expenses.len(), 2 + 1 + 2 + 1);
        assert_eq!(expenses.last().unwrap().action, ReplyAction::Cancel);
        assert!(expenses.iter().any(|o| o.action == ReplyAction::Back(ConversationStep::Start)));

        let site = menu(ConversationStep::ConfirmSite, &catalog);
        assert!(!site.iter().any(|o| matches!(o.action, ReplyAction::Back(_))));
        assert!(menu(ConversationStep::Finished, &catalog).is_empty());
    }

    #[test]
    fn every_collecting_step_has_prompt_and_placeholder() {
        for step in &ConversationStep::ACTIVE[1..] {
            assert!(prompt(*step).is_some());
            assert!(placeholder(*step).is_some());
        }
        assert!(placeholder(ConversationStep::Start).is_none());
        assert_eq!(
            welcome("Usuario Demo 2"),
            "Hola Usuario Demo 2, comenzemos con la gestión del día"
        );
    }
}
